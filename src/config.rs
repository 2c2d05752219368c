use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: String,
    pub storage: StorageConfig,
    /// Enables dangerous operations like purge. Must never be true in production.
    pub test_mode: bool,
}

#[derive(Debug, Clone)]
pub enum StorageBackend {
    Local,
    Redb,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Directory holding the collection blobs or the database file
    pub data_dir: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let bind_address =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| "./data".to_string());

        let test_mode = std::env::var("TEST_MODE")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        let backend = match std::env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "local".to_string())
            .to_lowercase()
            .as_str()
        {
            "redb" => StorageBackend::Redb,
            _ => StorageBackend::Local,
        };

        let config = Config {
            bind_address,
            storage: StorageConfig { backend, data_dir },
            test_mode,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.bind_address.is_empty() {
            return Err(ConfigError::ValidationError(
                "BIND_ADDRESS cannot be empty".to_string(),
            ));
        }

        if self.storage.data_dir.is_empty() {
            return Err(ConfigError::ValidationError(
                "DATA_DIR cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}
