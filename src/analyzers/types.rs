//! Summary types produced by the aggregation passes.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::analyzers::utility::{HistogramBin, LinearFit};
use crate::pipeline::CleaningReport;
use crate::ride::{MemberType, RideableType};

pub const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Ride counts for a single bike type.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RideableCounts {
    pub total: usize,
    pub by_hour: [usize; 24],
}

/// When rides happen: counts by hour of day, weekday and bike type.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimingSummary {
    pub total: usize,
    pub by_hour: [usize; 24],
    /// Monday first.
    pub by_weekday: [usize; 7],
    pub by_rideable_type: BTreeMap<RideableType, RideableCounts>,
    pub peak_hour: Option<u32>,
    pub busiest_weekday: Option<&'static str>,
}

/// Five-number summary plus mean and spread.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DistributionStats {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// Ride duration distribution, in minutes, for one member type and year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DurationGroup {
    pub member_casual: MemberType,
    pub year: i32,
    pub stats: DistributionStats,
    pub histogram: Vec<HistogramBin>,
    #[serde(skip)]
    pub minutes: Vec<f64>,
}

impl DurationGroup {
    pub fn label(&self) -> String {
        format!("{} {}", self.member_casual, self.year)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendPoint {
    pub duration_min: f64,
    pub distance_m: f64,
}

/// Distance against duration for one value of the equity flag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSeries {
    pub is_equity: Option<bool>,
    pub points: Vec<TrendPoint>,
    pub fit: Option<LinearFit>,
}

impl TrendSeries {
    pub fn label(&self) -> &'static str {
        match self.is_equity {
            Some(true) => "equity",
            Some(false) => "non-equity",
            None => "unflagged",
        }
    }
}

/// Everything written to `summary.json`.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub cleaning: CleaningReport,
    pub timing: TimingSummary,
    pub durations: Vec<DurationGroup>,
    pub trend: Vec<TrendSeries>,
}

/// One row of `hourly_counts.csv`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyRow {
    pub hour: u32,
    pub total: usize,
    pub classic_bike: usize,
    pub docked_bike: usize,
    pub electric_bike: usize,
}
