use crate::price_series::PriceSeries;
use crate::trough_detector::Trough;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Trough with its timestamp resolved from the series
#[derive(Debug, Clone, Serialize)]
pub struct TroughEntry {
    #[serde(flatten)]
    pub trough: Trough,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TroughReport {
    pub source: String,
    pub tag: Option<String>,
    pub threshold_percent: f64,
    pub samples: usize,
    pub generated_at: DateTime<Utc>,
    pub troughs: Vec<TroughEntry>,
}

impl TroughReport {
    pub fn new(source: impl Into<String>, series: &PriceSeries, threshold_percent: f64, troughs: Vec<Trough>) -> Self {
        let troughs = troughs
            .into_iter()
            .map(|trough| TroughEntry {
                timestamp: series.timestamp(trough.index).map(str::to_string),
                trough,
            })
            .collect();

        Self {
            source: source.into(),
            tag: series.tag().map(str::to_string),
            threshold_percent,
            samples: series.len(),
            generated_at: Utc::now(),
            troughs,
        }
    }
}

impl fmt::Display for TroughReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "📈 Troughs in {}", self.source)?;
        if let Some(tag) = &self.tag {
            writeln!(f, "🏷️  Market: {}", tag)?;
        }
        writeln!(
            f,
            "📊 Samples: {} | Threshold: {:.2}%",
            self.samples, self.threshold_percent
        )?;
        writeln!(f, "{}", "=".repeat(80))?;

        if self.troughs.is_empty() {
            return writeln!(f, "No troughs confirmed");
        }

        writeln!(
            f,
            "{:>8} {:>14} {:>11} {:>10} {:>8}  {}",
            "index", "price", "recovery", "confirmed", "peak", "timestamp"
        )?;
        writeln!(f, "{}", "-".repeat(80))?;

        for entry in &self.troughs {
            let trough = &entry.trough;
            writeln!(
                f,
                "{:>8} {:>14.2} {:>10.2}% {:>10} {:>8}  {}",
                trough.index,
                trough.price,
                trough.recovery_percent,
                trough.confirmed_index,
                trough.peak_index,
                entry.timestamp.as_deref().unwrap_or("--")
            )?;
        }

        writeln!(f, "{}", "-".repeat(80))?;
        writeln!(f, "✅ {} trough(s) confirmed", self.troughs.len())
    }
}

pub fn render_text(report: &TroughReport) -> String {
    report.to_string()
}

pub fn render_json(report: &TroughReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trough_detector::find_troughs;

    fn sample_report() -> TroughReport {
        let series = PriceSeries::with_timestamps(
            vec![100.0, 90.0, 95.0, 80.0, 88.0, 100.0],
            (0..6).map(|h| format!("2024-01-01 0{}:00:00", h)).collect(),
        )
        .unwrap()
        .tagged("BTCAUD");
        let troughs = find_troughs(&series, 10.0).unwrap();
        TroughReport::new("Binance_BTCAUD_1h.csv", &series, 10.0, troughs)
    }

    #[test]
    fn report_resolves_timestamps() {
        let report = sample_report();

        assert_eq!(report.samples, 6);
        assert_eq!(report.tag.as_deref(), Some("BTCAUD"));
        assert_eq!(report.troughs.len(), 1);
        assert_eq!(report.troughs[0].timestamp.as_deref(), Some("2024-01-01 03:00:00"));
    }

    #[test]
    fn text_lists_each_trough() {
        let text = render_text(&sample_report());

        assert!(text.contains("Market: BTCAUD"));
        assert!(text.contains("80.00"));
        assert!(text.contains("25.00%"));
        assert!(text.contains("1 trough(s) confirmed"));
    }

    #[test]
    fn display_matches_render_text() {
        let report = sample_report();
        let text = render_text(&report);

        assert_eq!(text, format!("{}", report));
        assert!(text.starts_with("📈 Troughs in Binance_BTCAUD_1h.csv\n"));
        assert!(text.ends_with("✅ 1 trough(s) confirmed\n"));
    }

    #[test]
    fn text_for_empty_result() {
        let series = PriceSeries::new(vec![5.0, 4.0]);
        let report = TroughReport::new("x.csv", &series, 10.0, Vec::new());
        assert!(render_text(&report).contains("No troughs confirmed"));
    }

    #[test]
    fn json_flattens_trough_fields() {
        let json = render_json(&sample_report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        let trough = &value["troughs"][0];
        assert_eq!(trough["index"], 3);
        assert_eq!(trough["price"], 80.0);
        assert_eq!(trough["recovery_percent"], 25.0);
        assert_eq!(trough["timestamp"], "2024-01-01 03:00:00");
        assert_eq!(value["threshold_percent"], 10.0);
    }
}
