use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Session lifetime: 8 hours, measured from creation or the last refresh.
pub const SESSION_DURATION_MS: i64 = 8 * 60 * 60 * 1000;

/// An authenticated admin session. Timestamps are epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub id: String,
    pub username: String,
    pub created_at: i64,
    pub expires_at: i64,
}

impl AuthSession {
    /// Opens a new session for `username` starting at `now_ms`.
    pub fn create(username: impl Into<String>, now_ms: i64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            username: username.into(),
            created_at: now_ms,
            expires_at: now_ms + SESSION_DURATION_MS,
        }
    }

    /// Returns a copy whose expiry is pushed to `now_ms + SESSION_DURATION_MS`.
    pub fn refreshed(&self, now_ms: i64) -> Self {
        Self {
            expires_at: now_ms + SESSION_DURATION_MS,
            ..self.clone()
        }
    }

    /// Expired strictly after `expires_at`; the boundary instant is still valid.
    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        now_ms > self.expires_at
    }
}

/// A missing session counts as expired.
pub fn is_session_expired(session: Option<&AuthSession>, now_ms: i64) -> bool {
    session.is_none_or(|s| s.is_expired_at(now_ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_boundary() {
        let t0 = 1_700_000_000_000;
        let session = AuthSession::create("admin", t0);

        assert!(!is_session_expired(Some(&session), t0 + SESSION_DURATION_MS - 1));
        assert!(!is_session_expired(Some(&session), t0 + SESSION_DURATION_MS));
        assert!(is_session_expired(Some(&session), t0 + SESSION_DURATION_MS + 1));
        assert!(is_session_expired(None, t0));
    }

    #[test]
    fn test_refresh_extends_expiry() {
        let session = AuthSession::create("admin", 1_000);
        let refreshed = session.refreshed(5_000);

        assert!(refreshed.expires_at > session.expires_at);
        assert_eq!(refreshed.id, session.id);
        assert_eq!(refreshed.created_at, 1_000);
    }

    #[test]
    fn test_session_json_shape() {
        let session = AuthSession::create("admin", 42);
        let value = serde_json::to_value(&session).unwrap();

        assert_eq!(value["createdAt"], 42);
        assert_eq!(value["expiresAt"], 42 + SESSION_DURATION_MS);
        assert!(Uuid::parse_str(value["id"].as_str().unwrap()).is_ok());
    }
}
