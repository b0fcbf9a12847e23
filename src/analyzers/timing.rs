//! When are rides taken? Counts by hour of day, weekday and bike type.

use chrono::{Datelike, Timelike};

use crate::analyzers::filter::RideFilter;
use crate::analyzers::types::{HourlyRow, TimingSummary, WEEKDAYS};
use crate::ride::{Ride, RideableType};

pub fn ride_timing(rides: &[Ride], filter: &RideFilter) -> TimingSummary {
    let mut summary = TimingSummary::default();

    for ride in filter.apply(rides) {
        let hour = ride.start_date.hour() as usize;
        let weekday = ride.start_date.weekday().num_days_from_monday() as usize;

        summary.total += 1;
        summary.by_hour[hour] += 1;
        summary.by_weekday[weekday] += 1;

        let per_type = summary
            .by_rideable_type
            .entry(ride.rideable_type)
            .or_default();
        per_type.total += 1;
        per_type.by_hour[hour] += 1;
    }

    summary.peak_hour = argmax(&summary.by_hour).map(|h| h as u32);
    summary.busiest_weekday = argmax(&summary.by_weekday).map(|d| WEEKDAYS[d]);
    summary
}

/// Index of the largest non-zero count; ties go to the earliest index.
fn argmax(counts: &[usize]) -> Option<usize> {
    counts
        .iter()
        .enumerate()
        .filter(|(_, c)| **c > 0)
        .fold(None, |best: Option<(usize, usize)>, (i, &c)| match best {
            Some((_, b)) if b >= c => best,
            _ => Some((i, c)),
        })
        .map(|(i, _)| i)
}

/// Flattens the hourly counts into one row per hour for CSV export.
pub fn hourly_rows(summary: &TimingSummary) -> Vec<HourlyRow> {
    let count = |t: RideableType, hour: usize| {
        summary
            .by_rideable_type
            .get(&t)
            .map_or(0, |c| c.by_hour[hour])
    };

    (0..24)
        .map(|hour| HourlyRow {
            hour: hour as u32,
            total: summary.by_hour[hour],
            classic_bike: count(RideableType::ClassicBike, hour),
            docked_bike: count(RideableType::DockedBike, hour),
            electric_bike: count(RideableType::ElectricBike, hour),
        })
        .collect()
}
