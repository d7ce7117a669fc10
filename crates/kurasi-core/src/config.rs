//! Console configuration.
//!
//! Loaded from `config.toml` by the infrastructure layer, then adjusted by
//! environment overrides. Credentials are read from here and never persisted
//! by the engine.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
/// Used when neither a password hash nor a password is configured.
pub const FALLBACK_ADMIN_PASSWORD: &str = "admin123";
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5678/webhook/cms-kurasi-ai";
pub const DEFAULT_REMOTE_TIMEOUT_SECS: u64 = 30;

pub const ENV_ADMIN_USERNAME: &str = "KURASI_ADMIN_USERNAME";
pub const ENV_ADMIN_PASSWORD_HASH: &str = "KURASI_ADMIN_PASSWORD_HASH";
pub const ENV_ADMIN_PASSWORD: &str = "KURASI_ADMIN_PASSWORD";
pub const ENV_API_BASE_URL: &str = "KURASI_API_BASE_URL";
pub const ENV_DATA_DIR: &str = "KURASI_DATA_DIR";

/// The single admin credential gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminConfig {
    #[serde(default = "default_username")]
    pub username: String,
    /// Stored hash as produced by `auth::hash_password`. Preferred over `password`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    /// Plaintext fallback. Read from config or env only, never written back.
    #[serde(default, skip_serializing)]
    pub password: Option<String>,
}

fn default_username() -> String {
    DEFAULT_ADMIN_USERNAME.to_string()
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            username: default_username(),
            password_hash: None,
            password: None,
        }
    }
}

/// How a login password is checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminCredential {
    Hash(String),
    Plain(String),
    /// Nothing configured; the built-in fallback password applies.
    Fallback,
}

impl AdminConfig {
    /// Resolves the credential: hash first, then plaintext, then the fallback.
    pub fn credential(&self) -> AdminCredential {
        if let Some(hash) = self.password_hash.as_ref().filter(|h| !h.is_empty()) {
            return AdminCredential::Hash(hash.clone());
        }
        if let Some(password) = self.password.as_ref().filter(|p| !p.is_empty()) {
            return AdminCredential::Plain(password.clone());
        }
        AdminCredential::Fallback
    }
}

/// Remote blob store endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_REMOTE_TIMEOUT_SECS
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl RemoteConfig {
    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    pub fn save_url(&self) -> String {
        self.endpoint("save-data")
    }

    pub fn get_url(&self) -> String {
        self.endpoint("get-data")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory for persisted state. `None` means the platform data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

/// Root configuration of the console.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleConfig {
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl ConsoleConfig {
    /// Applies `KURASI_*` overrides. Empty values are ignored.
    ///
    /// # Arguments
    ///
    /// * `lookup` - Variable lookup, usually `|k| std::env::var(k).ok()`
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(username) = get(ENV_ADMIN_USERNAME) {
            self.admin.username = username;
        }
        if let Some(hash) = get(ENV_ADMIN_PASSWORD_HASH) {
            self.admin.password_hash = Some(hash);
        }
        if let Some(password) = get(ENV_ADMIN_PASSWORD) {
            self.admin.password = Some(password);
        }
        if let Some(base_url) = get(ENV_API_BASE_URL) {
            self.remote.base_url = base_url;
        }
        if let Some(data_dir) = get(ENV_DATA_DIR) {
            self.storage.data_dir = Some(PathBuf::from(data_dir));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = ConsoleConfig::default();
        assert_eq!(config.admin.username, "admin");
        assert_eq!(config.admin.credential(), AdminCredential::Fallback);
        assert_eq!(
            config.remote.save_url(),
            "http://localhost:5678/webhook/cms-kurasi-ai/save-data"
        );
        assert_eq!(config.remote.timeout_secs, 30);
        assert!(config.storage.data_dir.is_none());
    }

    #[test]
    fn test_credential_precedence() {
        let mut admin = AdminConfig {
            password: Some("plain".to_string()),
            ..AdminConfig::default()
        };
        assert_eq!(admin.credential(), AdminCredential::Plain("plain".to_string()));

        admin.password_hash = Some("hash".to_string());
        assert_eq!(admin.credential(), AdminCredential::Hash("hash".to_string()));

        admin.password_hash = Some(String::new());
        assert_eq!(admin.credential(), AdminCredential::Plain("plain".to_string()));
    }

    #[test]
    fn test_plaintext_password_is_never_serialized() {
        let mut config = ConsoleConfig::default();
        config.admin.password = Some("plain".to_string());
        config.admin.password_hash = Some("hash".to_string());

        let value = serde_json::to_value(&config).unwrap();
        assert!(value["admin"].get("password").is_none());
        assert_eq!(value["admin"]["password_hash"], "hash");
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_ADMIN_USERNAME, "root"),
            (ENV_API_BASE_URL, "https://example.test/hook/"),
            (ENV_DATA_DIR, "/tmp/kurasi"),
            (ENV_ADMIN_PASSWORD, ""),
        ]);
        let mut config = ConsoleConfig::default();
        config.apply_env_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.admin.username, "root");
        assert_eq!(config.admin.password, None);
        assert_eq!(config.remote.get_url(), "https://example.test/hook/get-data");
        assert_eq!(config.storage.data_dir, Some(PathBuf::from("/tmp/kurasi")));
    }

    #[test]
    fn test_partial_toml() {
        let config: ConsoleConfig = toml::from_str(
            r#"
[admin]
password = "pw"

[remote]
timeout_secs = 5
"#,
        )
        .unwrap();
        assert_eq!(config.admin.username, "admin");
        assert_eq!(config.remote.base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.remote.timeout_secs, 5);
    }
}
