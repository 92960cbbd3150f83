//! Layered configuration for the FI back-office pipeline.
//!
//! Configuration is loaded in layers with increasing priority:
//! 1. Compiled-in defaults (everything under `./data`, 300 ms GUI throttle)
//! 2. TOML configuration file (if provided)
//! 3. Environment variable overrides (prefix `FI_BOP_`, nested with `__`)

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

/// Default GUI throttle interval: 300 ms.
fn default_throttle_ms() -> u64 {
    300
}

/// Default GUI publication cap: 100 rows.
fn default_max_publications() -> u32 {
    100
}

/// Default generated rows per bond for the price and depth streams.
///
/// The production data set used 1 000 000 rows per bond; the default here
/// keeps `--generate` runs fast. Override via config or `FI_BOP_DATAGEN__*`.
fn default_quote_rows_per_bond() -> u64 {
    1_000
}

/// Default generated trades and inquiries per bond.
fn default_events_per_bond() -> u64 {
    10
}

/// Top-level application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Input and output file locations.
    pub paths: PathsConfig,
    /// GUI throttle parameters.
    pub gui: GuiConfig,
    /// Data-generator row counts.
    pub datagen: DataGenConfig,
    /// Ticker whose bonds the pipeline manages.
    pub ticker: String,
}

/// Input and output file locations.
#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    /// Directory all default file paths live under.
    pub data_dir: PathBuf,
    /// Trade ingress file.
    pub trade_input: PathBuf,
    /// Price ingress file.
    pub price_input: PathBuf,
    /// Market-depth ingress file.
    pub market_data_input: PathBuf,
    /// Inquiry ingress file.
    pub inquiry_input: PathBuf,
    /// Position history output.
    pub position_output: PathBuf,
    /// Risk history output.
    pub risk_output: PathBuf,
    /// Streaming history output.
    pub streaming_output: PathBuf,
    /// Throttled GUI price output.
    pub gui_output: PathBuf,
    /// Execution history output.
    pub execution_output: PathBuf,
    /// Inquiry history output.
    pub inquiry_output: PathBuf,
}

/// GUI throttle parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct GuiConfig {
    /// Minimum interval between published prices, in milliseconds.
    #[serde(default = "default_throttle_ms")]
    pub throttle_ms: u64,
    /// Maximum number of prices ever published.
    #[serde(default = "default_max_publications")]
    pub max_publications: u32,
}

/// Data-generator row counts.
#[derive(Debug, Clone, Deserialize)]
pub struct DataGenConfig {
    /// Price rows generated per bond.
    #[serde(default = "default_quote_rows_per_bond")]
    pub price_rows_per_bond: u64,
    /// Depth rows generated per bond.
    #[serde(default = "default_quote_rows_per_bond")]
    pub depth_rows_per_bond: u64,
    /// Trades generated per bond.
    #[serde(default = "default_events_per_bond")]
    pub trades_per_bond: u64,
    /// Inquiries generated per bond.
    #[serde(default = "default_events_per_bond")]
    pub inquiries_per_bond: u64,
}

impl AppConfig {
    /// Load configuration using layered sources.
    ///
    /// 1. Compiled-in defaults (all files under `./data`).
    /// 2. TOML file at `config_path` (if `Some`).
    /// 3. Environment variable overrides with prefix `FI_BOP_` and `__` as
    ///    the nesting separator (e.g., `FI_BOP_GUI__THROTTLE_MS=500`).
    pub fn load(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("paths.data_dir", "./data")?
            .set_default("paths.trade_input", "./data/trades.txt")?
            .set_default("paths.price_input", "./data/prices.txt")?
            .set_default("paths.market_data_input", "./data/marketdata.txt")?
            .set_default("paths.inquiry_input", "./data/inquiries.txt")?
            .set_default("paths.position_output", "./data/position.out")?
            .set_default("paths.risk_output", "./data/risk.out")?
            .set_default("paths.streaming_output", "./data/streaming.out")?
            .set_default("paths.gui_output", "./data/gui.out")?
            .set_default("paths.execution_output", "./data/execution.out")?
            .set_default("paths.inquiry_output", "./data/allinquiry.out")?
            .set_default("gui.throttle_ms", 300i64)?
            .set_default("gui.max_publications", 100i64)?
            .set_default("datagen.price_rows_per_bond", 1_000i64)?
            .set_default("datagen.depth_rows_per_bond", 1_000i64)?
            .set_default("datagen.trades_per_bond", 10i64)?
            .set_default("datagen.inquiries_per_bond", 10i64)?
            .set_default("ticker", "T")?;

        if let Some(path) = config_path {
            let path_str = path.to_str().context("config path is not valid UTF-8")?;
            builder = builder.add_source(File::with_name(path_str).required(true));
        }

        // The prefix separator must be `_` explicitly: the `config` crate
        // otherwise reuses the nesting separator and would look for the
        // prefix `FI_BOP__`.
        builder = builder.add_source(
            Environment::with_prefix("FI_BOP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let cfg: AppConfig = builder
            .build()
            .context("failed to build configuration")?
            .try_deserialize()
            .context("failed to deserialize configuration")?;

        cfg.validate()?;
        Ok(cfg)
    }

    /// Validate configuration invariants.
    fn validate(&self) -> Result<()> {
        if self.ticker.is_empty() {
            bail!("ticker must not be empty");
        }
        if self.gui.max_publications == 0 {
            bail!("gui.max_publications must be positive");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;

    /// Serializes tests that manipulate environment variables. Recovers from
    /// poisoned state so a panic in one test does not cascade.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn lock_env() -> std::sync::MutexGuard<'static, ()> {
        ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn clear_env() {
        std::env::remove_var("FI_BOP_GUI__THROTTLE_MS");
        std::env::remove_var("FI_BOP_TICKER");
    }

    fn write_temp_toml(content: &str) -> (tempfile::NamedTempFile, PathBuf) {
        let mut f = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("create temp file");
        write!(f, "{}", content).expect("write temp file");
        let path = f.path().to_path_buf();
        (f, path)
    }

    #[test]
    fn test_load_defaults_only() {
        let _lock = lock_env();
        clear_env();

        let cfg = AppConfig::load(None).expect("load defaults");
        assert_eq!(cfg.ticker, "T");
        assert_eq!(cfg.gui.throttle_ms, 300);
        assert_eq!(cfg.gui.max_publications, 100);
        assert_eq!(cfg.datagen.trades_per_bond, 10);
        assert_eq!(cfg.paths.gui_output, PathBuf::from("./data/gui.out"));
    }

    #[test]
    fn test_load_from_toml() {
        let _lock = lock_env();
        clear_env();

        let toml_content = r#"
ticker = "T"

[gui]
throttle_ms = 500
max_publications = 50

[paths]
data_dir = "/tmp/fi"
trade_input = "/tmp/fi/trades.txt"

[datagen]
price_rows_per_bond = 100
"#;
        let (_f, path) = write_temp_toml(toml_content);
        let cfg = AppConfig::load(Some(path)).expect("load from toml");

        assert_eq!(cfg.gui.throttle_ms, 500);
        assert_eq!(cfg.gui.max_publications, 50);
        assert_eq!(cfg.paths.trade_input, PathBuf::from("/tmp/fi/trades.txt"));
        assert_eq!(cfg.datagen.price_rows_per_bond, 100);
        // Unset values keep their defaults.
        assert_eq!(cfg.datagen.trades_per_bond, 10);
    }

    #[test]
    fn test_env_var_overrides() {
        let _lock = lock_env();
        clear_env();
        std::env::set_var("FI_BOP_GUI__THROTTLE_MS", "750");

        let cfg = AppConfig::load(None).expect("load with env override");
        assert_eq!(cfg.gui.throttle_ms, 750);

        clear_env();
    }

    #[test]
    fn test_empty_ticker_rejected() {
        let _lock = lock_env();
        clear_env();

        let (_f, path) = write_temp_toml("ticker = \"\"\n");
        let result = AppConfig::load(Some(path));
        assert!(result.is_err());
        assert!(format!("{}", result.unwrap_err()).contains("ticker"));
    }

    #[test]
    fn test_zero_publication_cap_rejected() {
        let _lock = lock_env();
        clear_env();

        let (_f, path) = write_temp_toml("[gui]\nmax_publications = 0\n");
        let result = AppConfig::load(Some(path));
        assert!(result.is_err());
    }
}
