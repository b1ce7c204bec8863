use crate::price_series::{PriceSeries, SeriesError};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors raised while turning a file into a `PriceSeries`
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("No header row with a '{0}' column")]
    MissingColumn(String),

    #[error("Line {line}: missing '{column}' field")]
    MissingField { line: u64, column: String },

    #[error("Line {line}: invalid price '{value}'")]
    InvalidPrice { line: u64, value: String },

    #[error(transparent)]
    Series(#[from] SeriesError),
}

/// Which columns to read and how to order the rows
#[derive(Debug, Clone)]
pub struct LoaderOptions {
    pub price_column: String,
    pub timestamp_column: Option<String>,
    /// Reverse the rows after loading (for newest-first exports)
    pub reverse: bool,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            price_column: "close".to_string(),
            timestamp_column: Some("date".to_string()),
            reverse: false,
        }
    }
}

pub struct ReaderBtcFile {}

impl ReaderBtcFile {
    /// Loads one price column of a candle CSV file.
    ///
    /// Rows before the header (such as the CryptoDataDownload banner) are
    /// skipped; the header is the first row naming the price column.
    pub fn read_price_series(
        file_path: impl AsRef<Path>,
        options: &LoaderOptions,
    ) -> Result<PriceSeries, LoadError> {
        let path = file_path.as_ref();
        let file = File::open(path).map_err(|source| LoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let reader = BufReader::new(file);

        let mut series = Self::parse_price_series(reader, options)?;
        if let Some(tag) = tag_from_path(path) {
            series = series.tagged(tag);
        }

        info!(
            file = %path.display(),
            column = %options.price_column,
            samples = series.len(),
            "price series loaded"
        );
        Ok(series)
    }

    pub fn parse_price_series<R: Read>(
        reader: R,
        options: &LoaderOptions,
    ) -> Result<PriceSeries, LoadError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut columns: Option<(usize, Option<usize>)> = None;
        let mut prices = Vec::new();
        let mut timestamps = Vec::new();

        for result in csv_reader.records() {
            let record = result?;
            let line = record.position().map(|pos| pos.line()).unwrap_or(0);

            let Some((price_index, timestamp_index)) = columns else {
                columns = find_header(&record, options);
                if columns.is_none() {
                    debug!(line, "skipping row before header");
                }
                continue;
            };

            if record.iter().all(str::is_empty) {
                continue;
            }

            let raw = record.get(price_index).ok_or_else(|| LoadError::MissingField {
                line,
                column: options.price_column.clone(),
            })?;
            let price = raw
                .parse::<f64>()
                .ok()
                .filter(|price| price.is_finite() && *price > 0.0)
                .ok_or_else(|| LoadError::InvalidPrice {
                    line,
                    value: raw.to_string(),
                })?;
            prices.push(price);

            if let Some(timestamp_index) = timestamp_index {
                let timestamp = record.get(timestamp_index).ok_or_else(|| LoadError::MissingField {
                    line,
                    column: options.timestamp_column.clone().unwrap_or_default(),
                })?;
                timestamps.push(timestamp.to_string());
            }
        }

        let Some((_, timestamp_index)) = columns else {
            return Err(LoadError::MissingColumn(options.price_column.clone()));
        };

        if options.reverse {
            prices.reverse();
            timestamps.reverse();
        }

        match timestamp_index {
            Some(_) => Ok(PriceSeries::with_timestamps(prices, timestamps)?),
            None => Ok(PriceSeries::new(prices)),
        }
    }

    /// Raw lines of the file, header and banner included.
    pub fn read_lines(file_path: impl AsRef<Path>) -> Result<Vec<String>, LoadError> {
        let path = file_path.as_ref();
        let io_error = |source| LoadError::Io {
            path: path.display().to_string(),
            source,
        };

        let file = File::open(path).map_err(io_error)?;
        BufReader::new(file)
            .lines()
            .collect::<Result<Vec<_>, _>>()
            .map_err(io_error)
    }
}

fn find_header(record: &csv::StringRecord, options: &LoaderOptions) -> Option<(usize, Option<usize>)> {
    let position = |name: &str| {
        record
            .iter()
            .position(|field| field.eq_ignore_ascii_case(name.trim()))
    };

    let price_index = position(&options.price_column)?;
    let timestamp_index = options.timestamp_column.as_deref().and_then(|name| {
        let index = position(name);
        if index.is_none() {
            warn!(column = name, "timestamp column not found, loading prices only");
        }
        index
    });

    Some((price_index, timestamp_index))
}

/// `Binance_BTCAUD_1h.csv` -> `BTCAUD`
fn tag_from_path(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let symbol = stem.split('_').nth(1)?;

    let looks_like_symbol = symbol.len() >= 3
        && symbol
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit());
    looks_like_symbol.then(|| symbol.to_string())
}
