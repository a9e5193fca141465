use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub settlement: SettlementRules,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

/// Business knobs an operator tunes without a deploy.
#[derive(Debug, Deserialize, Clone)]
pub struct SettlementRules {
    /// Default penalty applied when a refund request does not carry one,
    /// as a percentage of the original amount.
    #[serde(default)]
    pub default_penalty_percent: f64,
    /// Currency the books are kept in.
    #[serde(default = "default_currency")]
    pub settlement_currency: String,
}

fn default_currency() -> String {
    "IRR".to_string()
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(config::File::with_name("config/default"))
            // Add in the current environment file; optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Environment variables with a prefix of SAFAR
            // E.g. `SAFAR__DATABASE__URL=postgres://...`
            .add_source(config::Environment::with_prefix("SAFAR").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
