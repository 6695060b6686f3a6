//! Configuration module for landlot-server.
//!
//! Handles loading configuration from TOML files, CLI arguments,
//! and environment variables. Also handles admin secret hashing.

pub mod file;

use crate::config::file::FileConfig;
use landlot_core::messaging::twilio::TwilioConfig;
use landlot_core::payments::razorpay::RazorpayConfig;
use landlot_core::processors::BroadcasterConfig;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("password hashing error: {0}")]
    HashError(String),

    #[error("DATABASE_URL environment variable not set")]
    MissingDatabaseUrl,
}

/// Admin settings that can be reloaded at runtime.
#[derive(Debug, Clone)]
pub struct AdminSettings {
    /// Argon2 hash of the admin secret.
    pub secret_hash: String,
}

/// Payment settings that can be reloaded at runtime.
#[derive(Debug, Clone)]
pub struct PaymentSettings {
    /// Default listing fee in whole rupees.
    pub listing_fee_inr: i64,
}

/// Reloadable configuration sections shared with request handlers.
///
/// Messaging and gateway credentials are baked into their clients at
/// startup and require a restart to change.
#[derive(Clone)]
pub struct SharedConfig {
    pub admin: Arc<RwLock<AdminSettings>>,
    pub payment: Arc<RwLock<PaymentSettings>>,
}

/// Loaded configuration result containing all parts.
pub struct LoadedConfig {
    pub listen: SocketAddr,
    pub admin: AdminSettings,
    pub payment: PaymentSettings,
    pub twilio: TwilioConfig,
    pub razorpay: RazorpayConfig,
    pub broadcaster: BroadcasterConfig,
}

impl LoadedConfig {
    /// Convert the reloadable sections into a SharedConfig.
    pub fn into_shared(self) -> SharedConfig {
        SharedConfig {
            admin: Arc::new(RwLock::new(self.admin)),
            payment: Arc::new(RwLock::new(self.payment)),
        }
    }
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: std::path::PathBuf,
    listen_override: Option<SocketAddr>,
}

impl ConfigLoader {
    /// Create a new config loader.
    pub fn new(config_path: impl AsRef<Path>, listen_override: Option<SocketAddr>) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            listen_override,
        }
    }

    /// Load and process the configuration.
    ///
    /// This will:
    /// 1. Read the TOML file
    /// 2. Apply CLI overrides
    /// 3. Validate the configuration
    /// 4. Hash the admin secret if it's plaintext (and rewrite the file)
    /// 5. Build the loaded configuration
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        // Read the config file
        let config_content = std::fs::read_to_string(&self.config_path)?;
        let mut file_config: FileConfig = toml::from_str(&config_content)?;

        // Apply CLI overrides
        if let Some(listen) = self.listen_override {
            file_config.server.listen = listen;
        }

        // Validate the configuration
        self.validate(&file_config)?;

        // Hash admin secret if needed and rewrite config
        let secret_hash = if file_config.is_admin_secret_hashed() {
            file_config.admin.secret.clone()
        } else {
            let hash = self.hash_secret(&file_config.admin.secret)?;
            file_config.admin.secret = hash.clone();
            self.rewrite_config(&file_config)?;
            tracing::info!("Admin secret hashed and config file updated");
            hash
        };

        // Build the config parts
        Ok(self.build_loaded_config(file_config, secret_hash))
    }

    /// Reload the configuration (used during SIGHUP).
    ///
    /// Returns a LoadedConfig whose reloadable sections can be applied to
    /// a SharedConfig.
    pub fn reload(&self) -> Result<LoadedConfig, ConfigError> {
        self.load()
    }

    fn validate(&self, config: &FileConfig) -> Result<(), ConfigError> {
        if !config.messaging.from_address.contains(':') {
            return Err(ConfigError::ValidationError(format!(
                "messaging from_address {} is not channel-qualified",
                config.messaging.from_address
            )));
        }
        if config.payment.listing_fee_inr <= 0 {
            return Err(ConfigError::ValidationError(
                "payment listing_fee_inr must be positive".to_string(),
            ));
        }
        if config.broadcast.max_concurrent_sends == 0 {
            return Err(ConfigError::ValidationError(
                "broadcast max_concurrent_sends must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    fn hash_secret(&self, plaintext: &str) -> Result<String, ConfigError> {
        use argon2::{
            Argon2, PasswordHasher,
            password_hash::{SaltString, rand_core::OsRng},
        };

        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| ConfigError::HashError(e.to_string()))
    }

    fn rewrite_config(&self, config: &FileConfig) -> Result<(), ConfigError> {
        let toml_string = toml::to_string_pretty(config)?;

        // Write atomically: write to temp file, then rename
        let temp_path = self.config_path.with_extension("toml.tmp");
        std::fs::write(&temp_path, toml_string)?;
        std::fs::rename(&temp_path, &self.config_path)?;

        Ok(())
    }

    fn build_loaded_config(&self, file_config: FileConfig, secret_hash: String) -> LoadedConfig {
        LoadedConfig {
            listen: file_config.server.listen,
            admin: AdminSettings { secret_hash },
            payment: PaymentSettings {
                listing_fee_inr: file_config.payment.listing_fee_inr,
            },
            twilio: TwilioConfig {
                account_sid: file_config.messaging.account_sid,
                auth_token: file_config.messaging.auth_token,
                from_address: file_config.messaging.from_address,
                api_base: file_config.messaging.api_base,
            },
            razorpay: RazorpayConfig {
                key_id: file_config.payment.key_id,
                key_secret: file_config.payment.key_secret,
                api_base: file_config.payment.api_base,
            },
            broadcaster: BroadcasterConfig {
                max_concurrent_sends: file_config.broadcast.max_concurrent_sends,
                send_timeout: Duration::from_secs(file_config.broadcast.send_timeout_secs),
            },
        }
    }
}

/// Get the database URL from the environment.
pub fn get_database_url() -> Result<String, ConfigError> {
    std::env::var("DATABASE_URL").map_err(|_| ConfigError::MissingDatabaseUrl)
}
