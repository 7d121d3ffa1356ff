//! Process configuration for the `effectkit` binary
//!
//! Sources, lowest priority first:
//! 1. Built-in defaults
//! 2. Config file (`EFFECTKIT_CONFIG_PATH`, default `effectkit.toml`, optional)
//! 3. Environment variables prefixed `EFFECTKIT_` (nested keys use `__`)
//!
//! A `.env` file is loaded into the environment before reading.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::handlers::{MemoryStore, RetryingStore};
use crate::runtime::Val;

const DEFAULT_CONFIG_PATH: &str = "effectkit.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Secret that request cookies are checked against
    pub secret: String,

    /// Default tracing filter when `RUST_LOG` is unset
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreConfig {
    /// Simulated latency of every store call
    #[serde(default)]
    pub latency_ms: u64,

    /// Total attempts per store call (1 = no retries)
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Seed records: id -> payload
    #[serde(default)]
    pub records: HashMap<String, String>,
}

fn default_log_filter() -> String {
    "info".to_string()
}

fn default_retries() -> u32 {
    1
}

impl Config {
    /// Load configuration from defaults, file and environment
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let path = std::env::var("EFFECTKIT_CONFIG_PATH")
            .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        Self::from_sources(&path, Self::environment())
    }

    /// `EFFECTKIT_` variables; nested keys use `__` (`EFFECTKIT_STORE__RETRIES`)
    pub fn environment() -> config::Environment {
        config::Environment::with_prefix("EFFECTKIT")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    /// Defaults, then the optional file at `path`, then `environment`
    pub fn from_sources(path: &str, environment: config::Environment) -> Result<Self> {
        Self::builder(path)?
            .add_source(environment)
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }

    /// Defaults plus an optional file, without the environment layer
    pub fn builder(
        path: &str,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
        let builder = config::Config::builder()
            .set_default("secret", "SECRET")?
            .set_default("log_filter", default_log_filter())?
            .set_default("store.latency_ms", 0)?
            .set_default("store.retries", i64::from(default_retries()))?
            .add_source(config::File::with_name(path).required(false));
        Ok(builder)
    }

    /// The record answered to `getConfig`
    pub fn record(&self) -> Val {
        Val::obj([("secret", Val::from(self.secret.clone()))])
    }

    /// Memory store seeded from the configured records, with retries if asked
    pub fn store(&self) -> RetryingStore<MemoryStore> {
        let mut store = MemoryStore::seeded(self.store.records.clone());
        if self.store.latency_ms > 0 {
            store = store.with_latency(Duration::from_millis(self.store.latency_ms));
        }
        RetryingStore::new(store, self.store.retries, Duration::from_millis(50))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maplit::hashmap;

    #[test]
    fn test_defaults_without_file() {
        let config: Config = Config::builder("does-not-exist.toml")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.secret, "SECRET");
        assert_eq!(config.log_filter, "info");
        assert_eq!(config.store.retries, 1);
        assert!(config.store.records.is_empty());
        assert_eq!(config.record().get("secret"), Some(&Val::from("SECRET")));
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = std::env::temp_dir().join(format!("effectkit-config-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("effectkit.toml");
        std::fs::write(
            &path,
            "secret = \"S\"\n[store]\nretries = 3\n[store.records]\nr1 = \"P\"\n",
        )
        .unwrap();

        let config: Config = Config::builder(path.to_str().unwrap())
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.secret, "S");
        assert_eq!(config.store.retries, 3);
        assert_eq!(config.store.records.get("r1").map(String::as_str), Some("P"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_prefixed_environment_overrides_defaults() {
        let vars = hashmap! {
            "EFFECTKIT_SECRET".to_string() => "FROM_ENV".to_string(),
            "EFFECTKIT_STORE__RETRIES".to_string() => "4".to_string(),
            "EFFECTKIT_STORE__RECORDS__R9".to_string() => "Q".to_string(),
        };
        let environment = Config::environment().source(Some(vars.into_iter().collect()));

        let config = Config::from_sources("does-not-exist.toml", environment).unwrap();

        assert_eq!(config.secret, "FROM_ENV");
        assert_eq!(config.store.retries, 4);
        assert_eq!(config.store.records.get("r9").map(String::as_str), Some("Q"));
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn test_double_underscore_after_prefix_is_not_a_field() {
        let vars = hashmap! {
            "EFFECTKIT__SECRET".to_string() => "WRONG".to_string(),
        };
        let environment = Config::environment().source(Some(vars.into_iter().collect()));

        let config = Config::from_sources("does-not-exist.toml", environment).unwrap();

        assert_eq!(config.secret, "SECRET");
    }
}
