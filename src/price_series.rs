use thiserror::Error;

/// Errors raised while building a `PriceSeries`
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SeriesError {
    #[error("{prices} prices but {timestamps} timestamps")]
    TimestampMismatch { prices: usize, timestamps: usize },
}

/// Ordered price samples under analysis, oldest first.
///
/// Built once by the loader (or by hand in tests) and then only read.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    prices: Vec<f64>,
    timestamps: Option<Vec<String>>,
    tag: Option<String>,
}

impl PriceSeries {
    pub fn new(prices: Vec<f64>) -> Self {
        Self {
            prices,
            timestamps: None,
            tag: None,
        }
    }

    /// Series with one timestamp per price.
    pub fn with_timestamps(prices: Vec<f64>, timestamps: Vec<String>) -> Result<Self, SeriesError> {
        if prices.len() != timestamps.len() {
            return Err(SeriesError::TimestampMismatch {
                prices: prices.len(),
                timestamps: timestamps.len(),
            });
        }

        Ok(Self {
            prices,
            timestamps: Some(timestamps),
            tag: None,
        })
    }

    /// Free-form label for the market the prices come from, e.g. `BTCAUD`.
    pub fn tagged(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn prices(&self) -> &[f64] {
        &self.prices
    }

    pub fn timestamps(&self) -> Option<&[String]> {
        self.timestamps.as_deref()
    }

    pub fn timestamp(&self, index: usize) -> Option<&str> {
        self.timestamps
            .as_ref()
            .and_then(|ts| ts.get(index))
            .map(String::as_str)
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

impl From<Vec<f64>> for PriceSeries {
    fn from(prices: Vec<f64>) -> Self {
        Self::new(prices)
    }
}
