//! Configuration for the Brokerage House and the Market Exchange.
//!
//! Values come from, in increasing priority:
//! - built-in defaults
//! - an optional TOML file
//! - environment variables:
//!   - `BH_BIND_ADDR`  interface both servers bind to (default "0.0.0.0")
//!   - `BH_PORT`       Brokerage House port (default 30000)
//!   - `MEE_PORT`      Market Exchange port (default 30010)
//!   - `MEE_ADDR`      host the Brokerage House dials for the exchange
//!   - `BH_ADDR`       host the exchange dials for the Brokerage House
//!   - `BH_ERROR_LOG`  error log path
//!   - `BH_MIX_LOG`    mix log path
//!   - `BH_VERBOSE`    "1"/"true" to log output records
//! - command-line flags, applied by the binaries

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use brokerage_core::MarketConfig;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid value {value:?} for {key}")]
    Env { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Interface to bind to (e.g. "0.0.0.0" or "127.0.0.1").
    pub bind_addr: String,

    /// Brokerage House port.
    pub port: u16,

    /// Market Exchange port.
    pub mee_port: u16,

    /// Host running the Market Exchange.
    pub mee_host: String,

    /// Host running the Brokerage House.
    pub bh_host: String,

    pub error_log: PathBuf,
    pub mix_log: PathBuf,

    /// Append output records to the mix log.
    pub verbose: bool,

    /// Upper bound on simultaneously connected workers.
    pub max_workers: usize,

    /// Customers in the generated in-memory data set.
    pub customers: usize,

    pub market: MarketSettings,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bind_addr: "0.0.0.0".to_string(),
            port: 30000,
            mee_port: 30010,
            mee_host: "127.0.0.1".to_string(),
            bh_host: "127.0.0.1".to_string(),
            error_log: PathBuf::from("BrokerageHouse_Error.log"),
            mix_log: PathBuf::from("BrokerageHouse_Mix.log"),
            verbose: false,
            max_workers: 1024,
            customers: 100,
            market: MarketSettings::default(),
        }
    }
}

/// Exchange tuning, in plain numbers so it reads well in TOML.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MarketSettings {
    pub price_low: f64,
    pub price_high: f64,
    pub price_period_secs: u64,
    pub trading_floor_delay_ms: u64,
    pub feed_batch_size: usize,
    pub feed_flush_interval_ms: u64,
    /// How often the engine task advances the exchange clock.
    pub tick_interval_ms: u64,
}

impl Default for MarketSettings {
    fn default() -> Self {
        let m = MarketConfig::default();
        MarketSettings {
            price_low: m.price_low,
            price_high: m.price_high,
            price_period_secs: m.price_period.as_secs(),
            trading_floor_delay_ms: millis(m.trading_floor_delay),
            feed_batch_size: m.feed_batch_size,
            feed_flush_interval_ms: millis(m.feed_flush_interval),
            tick_interval_ms: 50,
        }
    }
}

impl MarketSettings {
    pub fn market_config(&self) -> MarketConfig {
        MarketConfig {
            price_low: self.price_low,
            price_high: self.price_high,
            price_period: Duration::from_secs(self.price_period_secs.max(1)),
            trading_floor_delay: Duration::from_millis(self.trading_floor_delay_ms),
            feed_batch_size: self.feed_batch_size.max(1),
            feed_flush_interval: Duration::from_millis(self.feed_flush_interval_ms),
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

impl Config {
    /// Defaults, then `path` if given, then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Config::default(),
        };
        config.apply_env(|key| env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Override fields from `lookup`, normally the process environment.
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(v) = lookup("BH_BIND_ADDR") {
            self.bind_addr = v;
        }
        if let Some(v) = lookup("BH_PORT") {
            self.port = parse("BH_PORT", v)?;
        }
        if let Some(v) = lookup("MEE_PORT") {
            self.mee_port = parse("MEE_PORT", v)?;
        }
        if let Some(v) = lookup("MEE_ADDR") {
            self.mee_host = v;
        }
        if let Some(v) = lookup("BH_ADDR") {
            self.bh_host = v;
        }
        if let Some(v) = lookup("BH_ERROR_LOG") {
            self.error_log = PathBuf::from(v);
        }
        if let Some(v) = lookup("BH_MIX_LOG") {
            self.mix_log = PathBuf::from(v);
        }
        if let Some(v) = lookup("BH_VERBOSE") {
            self.verbose = match v.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" | "" => false,
                _ => return Err(ConfigError::Env { key: "BH_VERBOSE", value: v }),
            };
        }
        Ok(())
    }

    /// `bind_addr:port` the Brokerage House listens on.
    pub fn bh_listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    /// `bind_addr:mee_port` the Market Exchange listens on.
    pub fn mee_listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.mee_port)
    }

    /// Where the Brokerage House sends trade requests.
    pub fn mee_target(&self) -> String {
        format!("{}:{}", self.mee_host, self.mee_port)
    }

    /// Where the Market Exchange sends its transactions.
    pub fn bh_target(&self) -> String {
        format!("{}:{}", self.bh_host, self.port)
    }
}

fn parse<T: FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .parse::<T>()
        .map_err(|_| ConfigError::Env { key, value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let c = Config::default();
        assert_eq!(c.bh_listen_addr(), "0.0.0.0:30000");
        assert_eq!(c.mee_target(), "127.0.0.1:30010");
        assert_eq!(c.market.feed_batch_size, 20);
    }

    #[test]
    fn toml_fills_only_what_it_names() {
        let c: Config = toml::from_str(
            r#"
            port = 31000
            verbose = true

            [market]
            feed_batch_size = 5
            "#,
        )
        .unwrap();
        assert_eq!(c.port, 31000);
        assert!(c.verbose);
        assert_eq!(c.mee_port, 30010);
        assert_eq!(c.market.feed_batch_size, 5);
        assert_eq!(c.market.price_low, 20.0);
    }

    #[test]
    fn environment_overrides() {
        let mut c = Config::default();
        c.apply_env(env_of(&[
            ("BH_PORT", "32000"),
            ("MEE_ADDR", "exchange.local"),
            ("BH_MIX_LOG", "/tmp/mix.log"),
            ("BH_VERBOSE", "true"),
        ]))
        .unwrap();
        assert_eq!(c.port, 32000);
        assert_eq!(c.mee_target(), "exchange.local:30010");
        assert_eq!(c.mix_log, PathBuf::from("/tmp/mix.log"));
        assert!(c.verbose);
    }

    #[test]
    fn bad_port_is_rejected() {
        let mut c = Config::default();
        let err = c.apply_env(env_of(&[("MEE_PORT", "ninety")])).unwrap_err();
        assert!(matches!(err, ConfigError::Env { key: "MEE_PORT", .. }));
    }
}
