use crate::price_series::PriceSeries;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

/// Errors raised for bad analysis parameters
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DetectorError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// A local minimum confirmed by a later recovery of at least the threshold
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trough {
    /// Index of the minimum in the series
    pub index: usize,
    pub price: f64,
    /// Rise from `price` to the peak of the recovery run, in percent
    pub recovery_percent: f64,
    /// Sample at which the recovery first reached the threshold
    pub confirmed_index: usize,
    /// Sample at which `recovery_percent` was measured
    pub peak_index: usize,
}

/// Single-pass trough detector with a percentage recovery threshold.
///
/// The detector keeps no state between calls; one instance can be shared
/// across threads and reused for any number of series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TroughDetector {
    threshold_percent: f64,
}

impl TroughDetector {
    /// `threshold_percent` is a percentage, so `10.0` means 10%.
    pub fn new(threshold_percent: f64) -> Result<Self, DetectorError> {
        if !threshold_percent.is_finite() || threshold_percent <= 0.0 {
            return Err(DetectorError::InvalidArgument(format!(
                "threshold must be a positive percentage, got {}",
                threshold_percent
            )));
        }
        Ok(Self { threshold_percent })
    }

    pub fn threshold_percent(&self) -> f64 {
        self.threshold_percent
    }

    pub fn find_troughs(&self, series: &PriceSeries) -> Result<Vec<Trough>, DetectorError> {
        let prices = series.prices();
        if prices.len() < 2 {
            return Err(DetectorError::InvalidArgument(format!(
                "series needs at least 2 samples, got {}",
                prices.len()
            )));
        }
        if let Some((index, price)) = prices
            .iter()
            .enumerate()
            .find(|(_, price)| !price.is_finite() || **price <= 0.0)
        {
            return Err(DetectorError::InvalidArgument(format!(
                "sample {} must be a positive price, got {}",
                index, price
            )));
        }

        let mut troughs = Vec::new();
        let mut candidate_index = 0;
        let mut candidate_price = prices[0];
        let mut run: Option<RecoveryRun> = None;

        for (i, &price) in prices.iter().enumerate().skip(1) {
            if let Some(open) = run.as_mut() {
                if price > open.peak_price {
                    open.peak_price = price;
                    open.peak_index = i;
                    continue;
                }
                if price == open.peak_price {
                    continue;
                }

                // The run is over; look for the next minimum from here.
                troughs.push(open.finish());
                run = None;
                candidate_index = i;
                candidate_price = price;
                continue;
            }

            if price < candidate_price {
                candidate_index = i;
                candidate_price = price;
            } else if recovery_percent(candidate_price, price) >= self.threshold_percent {
                debug!(
                    index = candidate_index,
                    price = candidate_price,
                    confirmed_index = i,
                    "trough confirmed"
                );
                run = Some(RecoveryRun {
                    trough_index: candidate_index,
                    trough_price: candidate_price,
                    confirmed_index: i,
                    peak_index: i,
                    peak_price: price,
                });
            }
        }

        if let Some(open) = run {
            troughs.push(open.finish());
        }

        debug!(
            samples = prices.len(),
            threshold = self.threshold_percent,
            troughs = troughs.len(),
            "trough scan finished"
        );

        Ok(troughs)
    }
}

/// Shorthand for `TroughDetector::new(threshold_percent)?.find_troughs(series)`.
pub fn find_troughs(series: &PriceSeries, threshold_percent: f64) -> Result<Vec<Trough>, DetectorError> {
    TroughDetector::new(threshold_percent)?.find_troughs(series)
}

/// A confirmed trough whose recovery may still be climbing
struct RecoveryRun {
    trough_index: usize,
    trough_price: f64,
    confirmed_index: usize,
    peak_index: usize,
    peak_price: f64,
}

impl RecoveryRun {
    fn finish(&self) -> Trough {
        Trough {
            index: self.trough_index,
            price: self.trough_price,
            recovery_percent: recovery_percent(self.trough_price, self.peak_price),
            confirmed_index: self.confirmed_index,
            peak_index: self.peak_index,
        }
    }
}

fn recovery_percent(from: f64, to: f64) -> f64 {
    (to - from) / from * 100.0
}
