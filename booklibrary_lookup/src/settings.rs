use anyhow::Context;
use config::{Config, Environment};
use serde::Deserialize;

use crate::genre_suggester::DEFAULT_OPENAI_URL;
use crate::open_library::DEFAULT_OPEN_LIBRARY_URL;

fn default_open_library_url() -> String {
    DEFAULT_OPEN_LIBRARY_URL.to_string()
}

fn default_openai_url() -> String {
    DEFAULT_OPENAI_URL.to_string()
}

fn default_bind_address() -> String {
    "0.0.0.0:8081".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct LookupSettings {
    /// Genre suggestions are disabled when missing
    #[serde(default)]
    pub openai_api_key: Option<String>,
    #[serde(default = "default_open_library_url")]
    pub open_library_url: String,
    #[serde(default = "default_openai_url")]
    pub openai_url: String,
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

impl LookupSettings {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_environment(Environment::default())
    }

    fn from_environment(environment: Environment) -> anyhow::Result<Self> {
        Config::builder()
            .add_source(environment)
            .build()
            .context("Failed to read settings")?
            .try_deserialize()
            .context("Failed to parse settings")
    }
}
