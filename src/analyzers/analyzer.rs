use crate::analyzers::duration::duration_by_membership;
use crate::analyzers::timing::{hourly_rows, ride_timing};
use crate::analyzers::trend::distance_trend;
use crate::analyzers::types::Report;
use crate::chart::{render_durations, render_timing, render_trend};
use crate::config::ReportConfig;
use crate::output::{write_json, write_records};
use crate::parser::load_rides;
use crate::pipeline::{CleanOptions, CleanedRides, clean};
use anyhow::Result;
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Runs the three aggregation passes over already cleaned rides.
pub fn build_report(cleaned: &CleanedRides, config: &ReportConfig) -> Report {
    let rides = cleaned.rides();

    let timing = ride_timing(rides, &config.timing);
    let durations = duration_by_membership(
        rides,
        &config.durations.filter,
        config.durations.bin_width_min,
    );
    let trend = distance_trend(rides, &config.trend);

    info!(
        timing_rides = timing.total,
        duration_groups = durations.len(),
        trend_series = trend.len(),
        "Aggregation complete"
    );

    Report {
        generated_at: Utc::now(),
        cleaning: cleaned.report.clone(),
        timing,
        durations,
        trend,
    }
}

/// Writes `summary.json`, `hourly_counts.csv` and the three SVG charts into
/// `output_dir`, creating it if needed. Returns the written paths.
pub fn write_report(
    report: &Report,
    output_dir: &Path,
    config: &ReportConfig,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(output_dir)?;
    let size = (config.chart.width, config.chart.height);

    let summary_path = output_dir.join("summary.json");
    write_json(&summary_path, report)?;

    let hourly_path = output_dir.join("hourly_counts.csv");
    write_records(&hourly_path, &hourly_rows(&report.timing))?;

    let timing_path = output_dir.join("timing.svg");
    render_timing(&report.timing, &timing_path, size)?;

    let durations_path = output_dir.join("durations.svg");
    render_durations(&report.durations, &durations_path, size)?;

    let trend_path = output_dir.join("trend.svg");
    render_trend(&report.trend, &trend_path, size)?;

    Ok(vec![
        summary_path,
        hourly_path,
        timing_path,
        durations_path,
        trend_path,
    ])
}

/// Loads and cleans `input`, aggregates it, and writes the report to `output_dir`.
#[tracing::instrument(
    skip_all,
    fields(input = %input.display(), output_dir = %output_dir.display())
)]
pub fn analyze(input: &Path, output_dir: &Path, config: &ReportConfig) -> Result<Report> {
    let raw = load_rides(input)?;
    let cleaned = clean(
        raw,
        &CleanOptions {
            strict: config.strict,
        },
    )?;

    let report = build_report(&cleaned, config);
    let written = write_report(&report, output_dir, config)?;

    info!(files = written.len(), "Report written");
    Ok(report)
}
