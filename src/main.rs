use anyhow::{Context, Result};
use btc_trough_detector::{
    render_json, render_text, AppConfig, DetectorError, LoadError, ReaderBtcFile, TroughDetector,
    TroughReport,
};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about = "Find price bottoms in crypto candle CSV files")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Detect troughs and print a report
    Detect {
        #[command(flatten)]
        source: SourceArgs,

        /// Minimum recovery, in percent, that confirms a trough
        #[arg(short, long, allow_negative_numbers = true)]
        threshold: Option<f64>,

        /// Timestamp column to attach to each trough
        #[arg(long)]
        timestamp_column: Option<String>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the parsed price column, one value per line
    Prices {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Print the raw lines of the data file
    Print {
        /// CSV file (defaults to TROUGH_DATA_FILE)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// CSV file (defaults to TROUGH_DATA_FILE)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Price column name
    #[arg(short, long)]
    column: Option<String>,

    /// Reverse rows after loading (newest-first exports)
    #[arg(long)]
    reverse: bool,
}

impl SourceArgs {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(file) = &self.file {
            config.data_file = file.clone();
        }
        if let Some(column) = &self.column {
            config.price_column = column.clone();
        }
    }
}

fn init_logging() -> Result<WorkerGuard> {
    std::fs::create_dir_all("logs").context("failed to create logs directory")?;

    let file_appender = rolling::daily("logs", "btc_troughs.log");
    let (file_writer, guard) = non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,btc_trough_detector=debug"));

    // stdout carries the report, so the console layer writes to stderr
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true)
                .with_target(true)
                .with_level(true),
        )
        .with(
            fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .json(),
        )
        .init();

    Ok(guard)
}

fn run(cli: Cli) -> Result<()> {
    let mut config = AppConfig::from_env();

    match cli.command {
        Command::Detect {
            source,
            threshold,
            timestamp_column,
            json,
        } => {
            source.apply(&mut config);
            if let Some(threshold) = threshold {
                config.threshold_percent = threshold;
            }
            if let Some(column) = timestamp_column {
                config.timestamp_column = Some(column);
            }

            // Reject bad parameters before touching the file
            let detector = TroughDetector::new(config.threshold_percent)?;

            let start_time = Instant::now();
            let series = ReaderBtcFile::read_price_series(&config.data_file, &config.loader_options(source.reverse))?;
            let troughs = detector.find_troughs(&series)?;
            info!(
                troughs = troughs.len(),
                elapsed = ?start_time.elapsed(),
                "detection finished"
            );

            let report = TroughReport::new(
                config.data_file.display().to_string(),
                &series,
                detector.threshold_percent(),
                troughs,
            );
            if json {
                println!("{}", render_json(&report)?);
            } else {
                print!("{}", render_text(&report));
            }
        }
        Command::Prices { source } => {
            source.apply(&mut config);
            let series = ReaderBtcFile::read_price_series(&config.data_file, &config.loader_options(source.reverse))?;
            for price in series.prices() {
                println!("{}", price);
            }
        }
        Command::Print { file } => {
            let path = file.unwrap_or(config.data_file);
            for line in ReaderBtcFile::read_lines(&path)? {
                println!("{}", line);
            }
        }
    }

    Ok(())
}

/// 2 for bad analysis parameters, 1 for everything else (bad input data, I/O)
fn exit_code(err: &anyhow::Error) -> i32 {
    if err.downcast_ref::<DetectorError>().is_some() {
        2
    } else {
        1
    }
}

fn main() {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let guard = match init_logging() {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("⚠️  Logging disabled: {:#}", e);
            None
        }
    };

    if let Err(e) = run(cli) {
        if let Some(load_error) = e.downcast_ref::<LoadError>() {
            error!("❌ Failed to load price data: {}", load_error);
        } else {
            error!("❌ {:#}", e);
        }
        if guard.is_none() {
            eprintln!("Error: {:#}", e);
        }
        // process::exit skips destructors; flush the log file first
        drop(guard);
        std::process::exit(exit_code(&e));
    }
}
