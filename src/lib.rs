//! Trough (local bottom) detection for crypto price series.
//!
//! Load a price column from a candle CSV with [`ReaderBtcFile`], then run
//! [`find_troughs`] over the resulting [`PriceSeries`]:
//!
//! ```no_run
//! use btc_trough_detector::{find_troughs, LoaderOptions, ReaderBtcFile};
//!
//! let series = ReaderBtcFile::read_price_series("Binance_BTCAUD_1h.csv", &LoaderOptions::default())?;
//! for trough in find_troughs(&series, 10.0)? {
//!     println!("{} {:.2} +{:.2}%", trough.index, trough.price, trough.recovery_percent);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod price_series;
pub mod reader_csv;
pub mod report;
pub mod trough_detector;

pub use config::AppConfig;
pub use price_series::{PriceSeries, SeriesError};
pub use reader_csv::{LoadError, LoaderOptions, ReaderBtcFile};
pub use report::{render_json, render_text, TroughReport};
pub use trough_detector::{find_troughs, DetectorError, Trough, TroughDetector};
