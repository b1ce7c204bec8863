use crate::reader_csv::LoaderOptions;
use std::env;
use std::path::PathBuf;
use tracing::warn;

pub const DEFAULT_DATA_FILE: &str = "Binance_BTCAUD_1h.csv";
pub const DEFAULT_PRICE_COLUMN: &str = "close";
pub const DEFAULT_TIMESTAMP_COLUMN: &str = "date";
pub const DEFAULT_THRESHOLD_PERCENT: f64 = 10.0;

/// Settings for a detection run
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub data_file: PathBuf,
    pub price_column: String,
    /// Empty string in the environment disables timestamps
    pub timestamp_column: Option<String>,
    pub threshold_percent: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            price_column: DEFAULT_PRICE_COLUMN.to_string(),
            timestamp_column: Some(DEFAULT_TIMESTAMP_COLUMN.to_string()),
            threshold_percent: DEFAULT_THRESHOLD_PERCENT,
        }
    }
}

impl AppConfig {
    /// Reads `TROUGH_*` variables from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as `from_env` with an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let threshold_percent = match lookup("TROUGH_THRESHOLD_PERCENT") {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                warn!(value = %raw, "invalid TROUGH_THRESHOLD_PERCENT, using default");
                defaults.threshold_percent
            }),
            None => defaults.threshold_percent,
        };

        let timestamp_column = match lookup("TROUGH_TIMESTAMP_COLUMN") {
            Some(raw) if raw.trim().is_empty() => None,
            Some(raw) => Some(raw.trim().to_string()),
            None => defaults.timestamp_column,
        };

        Self {
            data_file: lookup("TROUGH_DATA_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_file),
            price_column: lookup("TROUGH_PRICE_COLUMN")
                .map(|column| column.trim().to_string())
                .unwrap_or(defaults.price_column),
            timestamp_column,
            threshold_percent,
        }
    }

    pub fn loader_options(&self, reverse: bool) -> LoaderOptions {
        LoaderOptions {
            price_column: self.price_column.clone(),
            timestamp_column: self.timestamp_column.clone(),
            reverse,
        }
    }
}
