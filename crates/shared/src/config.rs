//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
///
/// Loaded once at startup; not reloadable.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Outbound mail configuration.
    pub mail: MailConfig,
    /// Object storage configuration for bulk-batch archival.
    pub storage: StorageConfig,
    /// Role-flag defaults applied to newly created members.
    #[serde(default)]
    pub member_defaults: MemberDefaults,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Outbound mail configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    /// SMTP relay host.
    pub smtp_host: String,
    /// SMTP relay port.
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    /// SMTP username.
    pub smtp_username: String,
    /// SMTP password.
    pub smtp_password: String,
    /// Sender address for all outbound mail.
    pub sender: String,
    /// Public base URL used in mail bodies.
    pub domain_url: String,
}

fn default_smtp_port() -> u16 {
    587
}

/// Object storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Storage service kind: `fs` (local, dev) or `s3`.
    #[serde(default = "default_storage_service")]
    pub service: String,
    /// Root path (fs) or key prefix (s3).
    #[serde(default = "default_storage_root")]
    pub root: String,
    /// Bucket name (s3 only).
    #[serde(default)]
    pub bucket: String,
    /// Endpoint URL (s3 only).
    #[serde(default)]
    pub endpoint: String,
    /// Region (s3 only).
    #[serde(default = "default_storage_region")]
    pub region: String,
    /// Access key id (s3 only).
    #[serde(default)]
    pub access_key_id: String,
    /// Secret access key (s3 only).
    #[serde(default)]
    pub secret_access_key: String,
}

fn default_storage_service() -> String {
    "fs".to_string()
}

fn default_storage_root() -> String {
    "/tmp/tamarind-archive".to_string()
}

fn default_storage_region() -> String {
    "auto".to_string()
}

/// Role-flag defaults for newly created members.
#[derive(Debug, Clone, Deserialize)]
pub struct MemberDefaults {
    /// Whether new members are approved immediately.
    #[serde(default = "default_true")]
    pub is_approved: bool,
    /// Whether new members are active immediately.
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Default for MemberDefaults {
    fn default() -> Self {
        Self {
            is_approved: true,
            is_active: true,
        }
    }
}

fn default_true() -> bool {
    true
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("TAMARIND").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_defaults() {
        let defaults = MemberDefaults::default();
        assert!(defaults.is_approved);
        assert!(defaults.is_active);
    }

    #[test]
    fn test_default_pool_sizes() {
        assert_eq!(default_max_connections(), 10);
        assert_eq!(default_min_connections(), 1);
    }

    #[test]
    fn test_default_storage_is_fs() {
        assert_eq!(default_storage_service(), "fs");
    }
}
