use anyhow::Context;
use config::{Config, Environment};
use serde::Deserialize;

use crate::context::StoreConfig;
use crate::store::PostgresDocumentStoreConfig;

fn default_db_host() -> String {
    "127.0.0.1".to_string()
}

fn default_db_credential() -> String {
    "postgres".to_string()
}

fn default_bind_address() -> String {
    "0.0.0.0:8080".to_string()
}

/// Settings of the catalog service, read from the environment once at startup
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogSettings {
    #[serde(default)]
    pub use_in_memory_db: bool,
    #[serde(default = "default_db_host")]
    pub db_host: String,
    #[serde(default = "default_db_credential")]
    pub db_username: String,
    #[serde(default = "default_db_credential")]
    pub db_password: String,
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

impl CatalogSettings {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_environment(Environment::default())
    }

    fn from_environment(environment: Environment) -> anyhow::Result<Self> {
        Config::builder()
            .add_source(environment.try_parsing(true))
            .build()
            .context("Failed to read settings")?
            .try_deserialize()
            .context("Failed to parse settings")
    }

    pub fn store_config(&self) -> StoreConfig {
        if self.use_in_memory_db {
            StoreConfig::InMemory
        } else {
            StoreConfig::Postgres(PostgresDocumentStoreConfig {
                hostname: self.db_host.clone(),
                username: self.db_username.clone(),
                password: self.db_password.clone(),
            })
        }
    }
}

#[cfg(test)]
mod settings_tests {
    use std::collections::HashMap;

    use super::*;

    fn settings_from(vars: &[(&str, &str)]) -> CatalogSettings {
        let source: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        CatalogSettings::from_environment(Environment::default().source(Some(source)))
            .expect("Failed to parse settings")
    }

    #[test]
    fn test_defaults() {
        let settings = settings_from(&[]);
        assert!(!settings.use_in_memory_db);
        assert_eq!(settings.bind_address, "0.0.0.0:8080");
        match settings.store_config() {
            StoreConfig::Postgres(config) => {
                assert_eq!(config.hostname, "127.0.0.1");
                assert_eq!(config.username, "postgres");
                assert_eq!(config.password, "postgres");
            }
            StoreConfig::InMemory => panic!("Postgres expected by default"),
        }
    }

    #[test]
    fn test_overrides() {
        let settings = settings_from(&[
            ("USE_IN_MEMORY_DB", "true"),
            ("DB_HOST", "db.internal"),
            ("BIND_ADDRESS", "127.0.0.1:9000"),
        ]);
        assert!(settings.use_in_memory_db);
        assert_eq!(settings.db_host, "db.internal");
        assert_eq!(settings.bind_address, "127.0.0.1:9000");
        assert!(matches!(settings.store_config(), StoreConfig::InMemory));
    }
}
