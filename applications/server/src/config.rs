/// Server configuration
use crate::error::{Result, ServerError};
use cadence_core::ordering::RebalancePolicy;
use cadence_core::OrderKey;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_server")]
    pub server: ServerSettings,

    #[serde(default = "default_storage")]
    pub storage: StorageSettings,

    #[serde(default = "default_ordering")]
    pub ordering: OrderingSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    #[serde(default = "default_database_url")]
    pub database_url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

/// Tuning for album and playlist ordering
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OrderingSettings {
    /// Positions added on each side of the insert point per rebalance expansion
    #[serde(default = "default_rebalance_radius")]
    pub rebalance_radius: usize,

    /// Spacing between rebalanced keys, in whole positions
    #[serde(default = "default_rebalance_step_units")]
    pub rebalance_step_units: u32,

    /// Attempts per ordering operation when the database is busy
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl ServerConfig {
    /// Load configuration from file and environment
    ///
    /// Reads `path` when given (it must exist), otherwise `config.toml` when
    /// present. `CADENCE_`-prefixed variables override both, with `__`
    /// between section and key (`CADENCE_STORAGE__DATABASE_URL`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path).required(true));
            }
            None => {
                let default_path = Path::new("config.toml");
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix("CADENCE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| ServerError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.storage.database_url.is_empty() {
            return Err(ServerError::Config(
                "Database URL is required (set CADENCE_STORAGE__DATABASE_URL)".to_string(),
            ));
        }

        if self.storage.max_connections == 0 {
            return Err(ServerError::Config(
                "storage.max_connections must be at least 1".to_string(),
            ));
        }

        if self.ordering.rebalance_radius == 0 {
            return Err(ServerError::Config(
                "ordering.rebalance_radius must be at least 1".to_string(),
            ));
        }

        if self.ordering.rebalance_step_units == 0 {
            return Err(ServerError::Config(
                "ordering.rebalance_step_units must be at least 1".to_string(),
            ));
        }

        if self.ordering.max_attempts == 0 {
            return Err(ServerError::Config(
                "ordering.max_attempts must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Rebalance policy for the ordering service
    pub fn rebalance_policy(&self) -> RebalancePolicy {
        RebalancePolicy {
            radius: self.ordering.rebalance_radius,
            step: i64::from(self.ordering.rebalance_step_units) * OrderKey::UNIT,
        }
    }
}

// Default values
fn default_server() -> ServerSettings {
    ServerSettings {
        host: default_host(),
        port: default_port(),
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_storage() -> StorageSettings {
    StorageSettings {
        database_url: default_database_url(),
        max_connections: default_max_connections(),
    }
}

fn default_database_url() -> String {
    "sqlite://./data/cadence.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_ordering() -> OrderingSettings {
    OrderingSettings {
        rebalance_radius: default_rebalance_radius(),
        rebalance_step_units: default_rebalance_step_units(),
        max_attempts: default_max_attempts(),
    }
}

fn default_rebalance_radius() -> usize {
    5
}

fn default_rebalance_step_units() -> u32 {
    10
}

fn default_max_attempts() -> u32 {
    3
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server: default_server(),
            storage: default_storage(),
            ordering: default_ordering(),
        }
    }
}
