//! How does ride duration differ between members and casual riders, per year?

use std::collections::BTreeMap;

use crate::analyzers::filter::RideFilter;
use crate::analyzers::types::{DistributionStats, DurationGroup};
use crate::analyzers::utility::{histogram, mean, quantile, stddev};
use crate::ride::{MemberType, Ride};

/// Summarizes `values` (any order). All zeros for empty input.
pub fn distribution_stats(values: &[f64]) -> DistributionStats {
    if values.is_empty() {
        return DistributionStats::default();
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let avg = mean(&sorted);
    DistributionStats {
        count: sorted.len(),
        mean: avg,
        std_dev: stddev(&sorted, avg),
        min: sorted[0],
        q1: quantile(&sorted, 0.25),
        median: quantile(&sorted, 0.5),
        q3: quantile(&sorted, 0.75),
        max: sorted[sorted.len() - 1],
    }
}

/// Groups matching rides by (member type, year) and summarizes their
/// durations in minutes. Groups are ordered by member type, then year.
pub fn duration_by_membership(
    rides: &[Ride],
    filter: &RideFilter,
    bin_width_min: f64,
) -> Vec<DurationGroup> {
    let mut groups: BTreeMap<(MemberType, i32), Vec<f64>> = BTreeMap::new();

    for ride in filter.apply(rides) {
        groups
            .entry((ride.member_casual, ride.year()))
            .or_default()
            .push(ride.duration_minutes());
    }

    groups
        .into_iter()
        .map(|((member_casual, year), minutes)| DurationGroup {
            member_casual,
            year,
            stats: distribution_stats(&minutes),
            histogram: histogram(&minutes, bin_width_min),
            minutes,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::filter::fixtures::ride;
    use crate::ride::RideableType;

    fn member(start: &str, secs: i64) -> Ride {
        ride(start, secs, 1000.0, MemberType::Member, RideableType::ClassicBike)
    }

    fn casual(start: &str, secs: i64) -> Ride {
        ride(start, secs, 1000.0, MemberType::Casual, RideableType::DockedBike)
    }

    #[test]
    fn test_distribution_stats() {
        let stats = distribution_stats(&[4.0, 1.0, 3.0, 2.0]);

        assert_eq!(stats.count, 4);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 4.0);
        assert_eq!(stats.median, 2.5);
        assert_eq!(stats.q1, 1.75);
        assert_eq!(stats.q3, 3.25);
        assert_eq!(stats.mean, 2.5);
    }

    #[test]
    fn test_distribution_stats_empty() {
        assert_eq!(distribution_stats(&[]), DistributionStats::default());
    }

    #[test]
    fn test_groups_by_member_type_and_year() {
        let rides = vec![
            member("2020-05-01 08:00:00", 600),
            member("2020-07-01 08:00:00", 1200),
            member("2021-05-01 08:00:00", 300),
            casual("2020-05-01 08:00:00", 1800),
            casual("2021-05-01 08:00:00", 2400),
        ];
        let groups = duration_by_membership(&rides, &RideFilter::default(), 5.0);

        let keys: Vec<_> = groups.iter().map(|g| (g.member_casual, g.year)).collect();
        assert_eq!(
            keys,
            vec![
                (MemberType::Member, 2020),
                (MemberType::Member, 2021),
                (MemberType::Casual, 2020),
                (MemberType::Casual, 2021),
            ]
        );

        let members_2020 = &groups[0];
        assert_eq!(members_2020.stats.count, 2);
        assert_eq!(members_2020.stats.mean, 15.0);
        assert_eq!(members_2020.minutes.len(), 2);
        assert_eq!(members_2020.label(), "member 2020");
        assert_eq!(
            members_2020.histogram.iter().map(|b| b.count).sum::<usize>(),
            2
        );
    }

    #[test]
    fn test_duration_bounds_exclude_outliers() {
        let rides = vec![
            member("2020-05-01 08:00:00", 600),
            member("2020-05-02 08:00:00", 86_400),
        ];
        let filter = RideFilter::default().duration_secs(None, Some(7200));
        let groups = duration_by_membership(&rides, &filter, 5.0);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].stats.max, 10.0);
    }
}
