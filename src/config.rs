//! Report configuration.
//!
//! Stored as a JSON file on disk; every section is optional:
//! ```json
//! {
//!   "strict": false,
//!   "timing": {},
//!   "durations": { "filter": { "max_duration_secs": 7200 }, "bin_width_min": 5.0 },
//!   "trend": { "member_casual": "member", "start_from": "2020-05-01", "start_until": "2020-06-01" },
//!   "chart": { "width": 1200, "height": 900 }
//! }
//! ```

use anyhow::{Context, Result, ensure};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::analyzers::filter::RideFilter;
use crate::ride::MemberType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DurationConfig {
    pub filter: RideFilter,
    pub bin_width_min: f64,
}

impl Default for DurationConfig {
    fn default() -> Self {
        Self {
            filter: RideFilter::default().duration_secs(None, Some(2 * 60 * 60)),
            bin_width_min: 5.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 900,
        }
    }
}

/// Filters and chart settings for the three report questions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub strict: bool,
    pub timing: RideFilter,
    pub durations: DurationConfig,
    pub trend: RideFilter,
    pub chart: ChartConfig,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            strict: false,
            timing: RideFilter::default(),
            durations: DurationConfig::default(),
            trend: default_trend_filter(),
            chart: ChartConfig::default(),
        }
    }
}

/// Members riding in May 2020, the only month with equity flags.
fn default_trend_filter() -> RideFilter {
    let mut filter = RideFilter::default()
        .member_casual(MemberType::Member)
        .duration_secs(None, Some(60 * 60))
        .distance_m(Some(f64::MIN_POSITIVE), Some(20_000.0));

    if let (Some(from), Some(until)) = (
        NaiveDate::from_ymd_opt(2020, 5, 1),
        NaiveDate::from_ymd_opt(2020, 6, 1),
    ) {
        filter = filter.between(from, until);
    }
    filter
}

impl ReportConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config '{}'", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("parsing config '{}'", path.display()))?;
        config
            .validate()
            .with_context(|| format!("invalid config '{}'", path.display()))?;
        Ok(config)
    }

    /// Checks values serde accepts but the report cannot use.
    pub fn validate(&self) -> Result<()> {
        let width = self.durations.bin_width_min;
        ensure!(
            width.is_finite() && width > 0.0,
            "durations.bin_width_min must be a positive number, got {width}"
        );
        ensure!(
            self.chart.width > 0 && self.chart.height > 0,
            "chart width and height must be positive"
        );
        Ok(())
    }

    /// Loads `path` when given, otherwise falls back to the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }
}
