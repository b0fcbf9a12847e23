//! CLI entry point for the bike-share trip report.
//!
//! Provides subcommands for producing the full report, running the cleaning
//! pipeline on its own, and computing a one-off Haversine distance.

use anyhow::Result;
use bikeshare_report::analyzers::analyzer::analyze;
use bikeshare_report::{
    config::ReportConfig,
    distance::{GeoPoint, haversine_m},
    output::{print_json, print_pretty},
    parser::load_rides,
    pipeline::{CleanOptions, clean},
};
use clap::{Parser, Subcommand};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "bikeshare_report")]
#[command(about = "Clean bike-share trip data and chart ride timing, duration and distance", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean a trip CSV and write the summary JSON, hourly CSV and charts
    Report {
        /// Trip CSV with the 16-column source schema
        #[arg(value_name = "CSV")]
        input: PathBuf,

        /// Directory to write the report into
        #[arg(short, long, default_value = "report")]
        output_dir: PathBuf,

        /// JSON config file (defaults to $REPORT_CONFIG, then built-in defaults)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Fail on the first malformed row instead of dropping it
        #[arg(long, default_value_t = false)]
        strict: bool,
    },
    /// Run only the cleaning pipeline and report what was dropped
    Clean {
        #[arg(value_name = "CSV")]
        input: PathBuf,

        /// Fail on the first malformed row instead of dropping it
        #[arg(long, default_value_t = false)]
        strict: bool,

        /// Log the full cleaning report as JSON instead of a debug dump
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Great-circle distance in meters between two points given in degrees
    Distance {
        #[arg(allow_negative_numbers = true)]
        from_lat: f64,
        #[arg(allow_negative_numbers = true)]
        from_lng: f64,
        #[arg(allow_negative_numbers = true)]
        to_lat: f64,
        #[arg(allow_negative_numbers = true)]
        to_lng: f64,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/bikeshare_report.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("bikeshare_report.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Report {
            input,
            output_dir,
            config,
            strict,
        } => {
            let config_path =
                config.or_else(|| std::env::var_os("REPORT_CONFIG").map(PathBuf::from));
            let mut config = ReportConfig::load_or_default(config_path.as_deref())?;
            config.strict |= strict;

            let report = analyze(&input, &output_dir, &config)?;

            info!(
                rides = report.cleaning.retained,
                peak_hour = report.timing.peak_hour,
                busiest_weekday = report.timing.busiest_weekday,
                output_dir = %output_dir.display(),
                "Report complete"
            );
        }
        Commands::Clean {
            input,
            strict,
            json,
        } => {
            let raw = load_rides(&input)?;
            let cleaned = clean(raw, &CleanOptions { strict })?;

            if json {
                print_json(&cleaned.report)?;
            } else {
                print_pretty(&cleaned.report);
                info!(
                    rows_read = cleaned.report.rows_read,
                    retained = cleaned.report.retained,
                    missing_required = cleaned.report.missing_required,
                    malformed = cleaned.report.malformed,
                    too_short = cleaned.report.too_short,
                    "Cleaning summary"
                );
            }
        }
        Commands::Distance {
            from_lat,
            from_lng,
            to_lat,
            to_lng,
        } => {
            let from = GeoPoint::new(from_lat, from_lng)?;
            let to = GeoPoint::new(to_lat, to_lng)?;
            let meters = haversine_m(from, to);

            info!(meters, "Haversine distance");
            println!("{meters:.1}");
        }
    }

    Ok(())
}
