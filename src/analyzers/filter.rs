//! Row predicates shared by the aggregation passes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::ride::{MemberType, Ride, RideableType};

/// Optional bounds on a ride. Unset fields match everything.
///
/// Date bounds apply to `start_date`: `start_from` is inclusive and
/// `start_until` exclusive. Duration and distance bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RideFilter {
    pub start_from: Option<NaiveDate>,
    pub start_until: Option<NaiveDate>,
    pub min_duration_secs: Option<i64>,
    pub max_duration_secs: Option<i64>,
    pub min_distance_m: Option<f64>,
    pub max_distance_m: Option<f64>,
    pub member_casual: Option<MemberType>,
    pub rideable_type: Option<RideableType>,
}

impl RideFilter {
    pub fn between(mut self, from: NaiveDate, until: NaiveDate) -> Self {
        self.start_from = Some(from);
        self.start_until = Some(until);
        self
    }

    pub fn duration_secs(mut self, min: Option<i64>, max: Option<i64>) -> Self {
        self.min_duration_secs = min;
        self.max_duration_secs = max;
        self
    }

    pub fn distance_m(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min_distance_m = min;
        self.max_distance_m = max;
        self
    }

    pub fn member_casual(mut self, member_casual: MemberType) -> Self {
        self.member_casual = Some(member_casual);
        self
    }

    pub fn rideable_type(mut self, rideable_type: RideableType) -> Self {
        self.rideable_type = Some(rideable_type);
        self
    }

    pub fn matches(&self, ride: &Ride) -> bool {
        let day = ride.start_day();

        self.start_from.is_none_or(|d| day >= d)
            && self.start_until.is_none_or(|d| day < d)
            && self.min_duration_secs.is_none_or(|s| ride.duration_secs >= s)
            && self.max_duration_secs.is_none_or(|s| ride.duration_secs <= s)
            && self.min_distance_m.is_none_or(|m| ride.distance_m >= m)
            && self.max_distance_m.is_none_or(|m| ride.distance_m <= m)
            && self.member_casual.is_none_or(|m| ride.member_casual == m)
            && self.rideable_type.is_none_or(|t| ride.rideable_type == t)
    }

    pub fn apply<'a>(&'a self, rides: &'a [Ride]) -> impl Iterator<Item = &'a Ride> + 'a {
        rides.iter().filter(move |r| self.matches(r))
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::NaiveDateTime;

    use crate::ride::{MemberType, Ride, RideableType};

    /// A ride starting at `start` (`%Y-%m-%d %H:%M:%S`) for tests.
    pub fn ride(
        start: &str,
        duration_secs: i64,
        distance_m: f64,
        member_casual: MemberType,
        rideable_type: RideableType,
    ) -> Ride {
        let start_date = NaiveDateTime::parse_from_str(start, "%Y-%m-%d %H:%M:%S").unwrap();
        Ride {
            duration_secs,
            start_date,
            end_date: start_date + chrono::Duration::seconds(duration_secs),
            start_station_id: Some(31000),
            start_station_name: None,
            end_station_id: Some(31001),
            end_station_name: None,
            member_casual,
            rideable_type,
            is_equity: None,
            distance_m,
        }
    }
}
