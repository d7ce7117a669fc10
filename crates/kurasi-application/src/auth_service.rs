//! Admin authentication and session lifecycle.
//!
//! One admin account gates the console. The persisted [`AuthRecord`] holds the
//! active session and the dark-mode preference; the service keeps an in-memory
//! copy behind a `tokio::sync::Mutex` and writes through on every change.

use std::sync::Arc;

use kurasi_core::Result;
use kurasi_core::auth::password::{hash_password_blocking, verify_password_blocking};
use kurasi_core::auth::{AuthRecord, AuthRepository, AuthSession};
use kurasi_core::clock::Clock;
use kurasi_core::config::{AdminConfig, AdminCredential, FALLBACK_ADMIN_PASSWORD};
use tokio::sync::Mutex;

pub struct AuthService {
    repository: Arc<dyn AuthRepository>,
    clock: Arc<dyn Clock>,
    admin: AdminConfig,
    state: Mutex<AuthRecord>,
}

impl AuthService {
    /// Creates the service and loads the persisted auth record.
    pub fn new(
        repository: Arc<dyn AuthRepository>,
        clock: Arc<dyn Clock>,
        admin: AdminConfig,
    ) -> Result<Self> {
        let record = repository.load()?;
        if admin.credential() == AdminCredential::Fallback {
            tracing::warn!(
                "No admin password configured; the built-in fallback password is active"
            );
        }
        Ok(Self {
            repository,
            clock,
            admin,
            state: Mutex::new(record),
        })
    }

    /// Checks `password` against the configured credential.
    ///
    /// Plaintext and fallback credentials are hashed first so every path runs
    /// the key derivation.
    async fn password_matches(&self, password: &str) -> Result<bool> {
        let stored = match self.admin.credential() {
            AdminCredential::Hash(hash) => hash,
            AdminCredential::Plain(expected) => hash_password_blocking(expected).await?,
            AdminCredential::Fallback => {
                hash_password_blocking(FALLBACK_ADMIN_PASSWORD.to_string()).await?
            }
        };
        verify_password_blocking(password.to_string(), stored).await
    }

    /// Writes `next` and makes it current. On failure the current record stays.
    fn commit(&self, current: &mut AuthRecord, next: AuthRecord) -> Result<()> {
        self.repository.save(&next)?;
        *current = next;
        Ok(())
    }

    /// Attempts to sign in as the admin.
    ///
    /// # Returns
    ///
    /// - `Ok(true)`: credentials matched; a fresh session is persisted
    /// - `Ok(false)`: unknown user or wrong password; nothing changes
    pub async fn login(&self, username: &str, password: &str) -> Result<bool> {
        // Derive before checking the username so both failures cost the same.
        let password_ok = self.password_matches(password).await?;
        let username_ok = username == self.admin.username;
        if !(username_ok && password_ok) {
            tracing::warn!("Rejected login attempt for '{}'", username);
            return Ok(false);
        }

        let mut state = self.state.lock().await;
        let mut next = state.clone();
        next.session = Some(AuthSession::create(username, self.clock.now_ms()));
        self.commit(&mut state, next)?;
        self.repository.clear_legacy_flag()?;

        tracing::info!("Admin '{}' logged in", username);
        Ok(true)
    }

    /// Whether a valid session exists, applying the state transitions:
    /// a legacy "logged in" marker is upgraded to a real session, and an
    /// expired session is cleared.
    pub async fn check_auth(&self) -> Result<bool> {
        let mut state = self.state.lock().await;
        let now = self.clock.now_ms();

        match state.session.as_ref().map(|s| s.is_expired_at(now)) {
            None => {
                if !self.repository.legacy_flag()? {
                    return Ok(false);
                }
                let mut next = state.clone();
                next.session = Some(AuthSession::create(self.admin.username.clone(), now));
                self.commit(&mut state, next)?;
                self.repository.clear_legacy_flag()?;
                tracing::info!("Upgraded legacy login marker to a session");
                Ok(true)
            }
            Some(true) => {
                let mut next = state.clone();
                next.session = None;
                self.commit(&mut state, next)?;
                tracing::info!("Session expired");
                Ok(false)
            }
            Some(false) => Ok(true),
        }
    }

    /// Extends a live session to a full lifetime from now.
    pub async fn refresh_session_if_active(&self) -> Result<bool> {
        let mut state = self.state.lock().await;
        let now = self.clock.now_ms();

        let Some(refreshed) = state
            .session
            .as_ref()
            .filter(|s| !s.is_expired_at(now))
            .map(|s| s.refreshed(now))
        else {
            return Ok(false);
        };
        let mut next = state.clone();
        next.session = Some(refreshed);
        self.commit(&mut state, next)?;
        tracing::debug!("Session refreshed");
        Ok(true)
    }

    /// Ends the session and clears the legacy marker.
    pub async fn logout(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        let mut next = state.clone();
        next.session = None;
        self.commit(&mut state, next)?;
        self.repository.clear_legacy_flag()?;
        tracing::info!("Logged out");
        Ok(())
    }

    pub async fn session(&self) -> Option<AuthSession> {
        self.state.lock().await.session.clone()
    }

    pub async fn dark_mode(&self) -> bool {
        self.state.lock().await.dark_mode
    }

    /// Flips the preference and returns the new value.
    pub async fn toggle_dark_mode(&self) -> Result<bool> {
        let mut state = self.state.lock().await;
        let mut next = state.clone();
        next.dark_mode = !next.dark_mode;
        let value = next.dark_mode;
        self.commit(&mut state, next)?;
        Ok(value)
    }

    pub async fn set_dark_mode(&self, enabled: bool) -> Result<()> {
        let mut state = self.state.lock().await;
        let mut next = state.clone();
        next.dark_mode = enabled;
        self.commit(&mut state, next)
    }
}
