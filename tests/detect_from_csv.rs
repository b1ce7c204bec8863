use approx::assert_relative_eq;
use btc_trough_detector::{
    find_troughs, render_json, DetectorError, LoadError, LoaderOptions, ReaderBtcFile,
    TroughDetector, TroughReport,
};
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

fn sample_file() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data/Binance_BTCAUD_1h_sample.csv")
}

fn chronological() -> LoaderOptions {
    LoaderOptions {
        reverse: true,
        ..LoaderOptions::default()
    }
}

#[test]
fn test_detect_troughs_in_sample_export() {
    let series = ReaderBtcFile::read_price_series(sample_file(), &chronological()).unwrap();

    assert_eq!(series.len(), 24);
    assert_eq!(series.tag(), Some("BTCAUD"));
    assert_eq!(series.timestamp(0), Some("2024-01-01 00:00:00"));

    let troughs = find_troughs(&series, 5.0).unwrap();
    let indices: Vec<usize> = troughs.iter().map(|t| t.index).collect();
    assert_eq!(indices, vec![3, 11, 19]);

    assert_eq!(troughs[1].price, 57900.0);
    assert_eq!(troughs[1].confirmed_index, 14);
    assert_eq!(troughs[1].peak_index, 16);
    assert_relative_eq!(troughs[1].recovery_percent, 12.089810017271157, epsilon = 1e-9);
    assert_eq!(series.timestamp(troughs[1].index), Some("2024-01-01 11:00:00"));
}

#[test]
fn test_higher_threshold_keeps_only_deep_trough() {
    let series = ReaderBtcFile::read_price_series(sample_file(), &chronological()).unwrap();
    let troughs = find_troughs(&series, 10.0).unwrap();

    assert_eq!(troughs.len(), 1);
    assert_eq!(troughs[0].index, 11);
    assert_eq!(troughs[0].confirmed_index, 15);
}

#[test]
fn test_row_order_matters() {
    let newest_first =
        ReaderBtcFile::read_price_series(sample_file(), &LoaderOptions::default()).unwrap();
    let troughs = find_troughs(&newest_first, 5.0).unwrap();

    assert_eq!(troughs.len(), 1);
    assert_eq!(troughs[0].index, 12);
    assert_eq!(newest_first.timestamp(0), Some("2024-01-01 23:00:00"));
}

#[test]
fn test_report_from_loaded_series() {
    let series = ReaderBtcFile::read_price_series(sample_file(), &chronological()).unwrap();
    let detector = TroughDetector::new(10.0).unwrap();
    let troughs = detector.find_troughs(&series).unwrap();

    let report = TroughReport::new("sample", &series, detector.threshold_percent(), troughs);
    let value: serde_json::Value = serde_json::from_str(&render_json(&report).unwrap()).unwrap();

    assert_eq!(value["tag"], "BTCAUD");
    assert_eq!(value["samples"], 24);
    assert_eq!(value["troughs"][0]["timestamp"], "2024-01-01 11:00:00");
}

#[test]
fn test_single_row_file_is_a_detector_error() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "date,close").unwrap();
    writeln!(file, "2024-01-01,100.0").unwrap();

    let series = ReaderBtcFile::read_price_series(file.path(), &LoaderOptions::default()).unwrap();
    let err = find_troughs(&series, 10.0).unwrap_err();
    assert!(matches!(err, DetectorError::InvalidArgument(_)));
}

#[test]
fn test_loader_errors_are_distinct() {
    let missing = ReaderBtcFile::read_price_series("no_such_file.csv", &LoaderOptions::default());
    assert!(matches!(missing, Err(LoadError::Io { .. })));

    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "date,close").unwrap();
    writeln!(file, "2024-01-01,100.0").unwrap();
    writeln!(file, "2024-01-02,n/a").unwrap();

    let bad = ReaderBtcFile::read_price_series(file.path(), &LoaderOptions::default());
    assert!(matches!(bad, Err(LoadError::InvalidPrice { line: 3, .. })));
}

#[test]
fn test_read_lines_returns_raw_file() {
    let lines = ReaderBtcFile::read_lines(sample_file()).unwrap();

    assert_eq!(lines.len(), 26);
    assert_eq!(lines[0], "https://www.CryptoDataDownload.com");
    assert!(lines[1].starts_with("unix,date,symbol"));
}
