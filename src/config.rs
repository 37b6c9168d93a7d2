use config::{ConfigError, Environment, Map};
use serde::Deserialize;
use std::time::Duration;

use crate::gateway::StripeSettings;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_address: String,
    pub stripe_secret_key: String,
    pub stripe_api_base: String,
    pub stripe_timeout_ms: u64,
    pub db_max_connections: u32,
    /// Comma separated list of dashboard origins
    pub allowed_origins: String,
    pub rate_limit_per_minute: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(Environment::default())
    }

    /// Load from an explicit variable map instead of the process environment
    pub fn from_source(vars: Map<String, String>) -> Result<Self, ConfigError> {
        Self::load(Environment::default().source(Some(vars)))
    }

    fn load(environment: Environment) -> Result<Self, ConfigError> {
        config::Config::builder()
            .set_default("bind_address", "0.0.0.0:8080")?
            .set_default("stripe_secret_key", "")?
            .set_default("stripe_api_base", "https://api.stripe.com")?
            .set_default("stripe_timeout_ms", 15_000_i64)?
            .set_default("db_max_connections", 20_i64)?
            .set_default("allowed_origins", "http://localhost:3000")?
            .set_default("rate_limit_per_minute", 300_i64)?
            .add_source(environment.try_parsing(true))
            .build()?
            .try_deserialize()
    }

    pub fn allowed_origins(&self) -> Vec<String> {
        self.allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn stripe_settings(&self) -> StripeSettings {
        StripeSettings {
            secret_key: self.stripe_secret_key.clone(),
            api_base: self.stripe_api_base.clone(),
            timeout: Duration::from_millis(self.stripe_timeout_ms),
        }
    }
}
