//! Distance against duration, split by equity flag, with a fitted trend line.

use std::collections::BTreeMap;

use crate::analyzers::filter::RideFilter;
use crate::analyzers::types::{TrendPoint, TrendSeries};
use crate::analyzers::utility::linear_fit;
use crate::ride::Ride;

/// One series per equity flag value present in the matching rides,
/// ordered unflagged, non-equity, equity.
pub fn distance_trend(rides: &[Ride], filter: &RideFilter) -> Vec<TrendSeries> {
    let mut series: BTreeMap<Option<bool>, Vec<TrendPoint>> = BTreeMap::new();

    for ride in filter.apply(rides) {
        series.entry(ride.is_equity).or_default().push(TrendPoint {
            duration_min: ride.duration_minutes(),
            distance_m: ride.distance_m,
        });
    }

    series
        .into_iter()
        .map(|(is_equity, points)| {
            let xy: Vec<(f64, f64)> = points
                .iter()
                .map(|p| (p.duration_min, p.distance_m))
                .collect();
            TrendSeries {
                is_equity,
                fit: linear_fit(&xy),
                points,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::filter::fixtures::ride;
    use crate::ride::{MemberType, RideableType};

    fn flagged(secs: i64, distance_m: f64, is_equity: Option<bool>) -> Ride {
        let mut r = ride(
            "2020-05-10 09:00:00",
            secs,
            distance_m,
            MemberType::Member,
            RideableType::ClassicBike,
        );
        r.is_equity = is_equity;
        r
    }

    #[test]
    fn test_series_split_by_equity_flag() {
        let rides = vec![
            flagged(600, 2000.0, Some(true)),
            flagged(1200, 4000.0, Some(true)),
            flagged(600, 1500.0, Some(false)),
            flagged(300, 800.0, None),
        ];
        let series = distance_trend(&rides, &RideFilter::default());

        let flags: Vec<_> = series.iter().map(|s| s.is_equity).collect();
        assert_eq!(flags, vec![None, Some(false), Some(true)]);
        assert_eq!(series[2].label(), "equity");
        assert_eq!(series[2].points.len(), 2);
    }

    #[test]
    fn test_fit_tracks_distance_per_minute() {
        let rides = vec![
            flagged(600, 2000.0, Some(true)),
            flagged(1200, 4000.0, Some(true)),
            flagged(1800, 6000.0, Some(true)),
        ];
        let series = distance_trend(&rides, &RideFilter::default());
        let fit = series[0].fit.unwrap();

        // 10, 20, 30 minutes -> 2, 4, 6 km
        assert!((fit.slope - 200.0).abs() < 1e-9);
        assert!(fit.intercept.abs() < 1e-6);
        assert!((fit.r_squared - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_single_point_has_no_fit() {
        let series = distance_trend(&[flagged(600, 2000.0, Some(false))], &RideFilter::default());
        assert_eq!(series.len(), 1);
        assert!(series[0].fit.is_none());
    }

    #[test]
    fn test_filter_limits_subset() {
        let mut casual = flagged(600, 2000.0, None);
        casual.member_casual = MemberType::Casual;
        let rides = vec![casual, flagged(600, 0.0, None), flagged(900, 3000.0, None)];

        let filter = RideFilter::default()
            .member_casual(MemberType::Member)
            .distance_m(Some(1.0), None);
        let series = distance_trend(&rides, &filter);

        assert_eq!(series.len(), 1);
        assert_eq!(series[0].points.len(), 1);
        assert_eq!(series[0].points[0].distance_m, 3000.0);
    }
}
