//! Ride records: the raw CSV row and the typed, cleaned ride.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::RowError;

/// Column names of the source file, in file order.
pub const COLUMNS: [&str; 16] = [
    "duration",
    "start_date",
    "end_date",
    "start_station_id",
    "start_station_name",
    "end_station_id",
    "end_station_name",
    "bike_number",
    "member_casual",
    "ride_id",
    "rideable_type",
    "start_lat",
    "start_lng",
    "end_lat",
    "end_lng",
    "is_equity",
];

/// Rides at or below this many seconds are dropped as implausible.
pub const MIN_RIDE_SECS: i64 = 60;

/// A single row deserialized from the trip CSV. Every field is kept as text
/// so type errors surface in the cleaning pipeline with the offending value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawRide {
    #[serde(skip)]
    pub line: u64,

    pub duration: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub start_station_id: Option<String>,
    pub start_station_name: Option<String>,
    pub end_station_id: Option<String>,
    pub end_station_name: Option<String>,
    pub bike_number: Option<String>,
    pub member_casual: Option<String>,
    pub ride_id: Option<String>,
    pub rideable_type: Option<String>,
    pub start_lat: Option<String>,
    pub start_lng: Option<String>,
    pub end_lat: Option<String>,
    pub end_lng: Option<String>,
    pub is_equity: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberType {
    Member,
    Casual,
}

impl MemberType {
    pub const ALL: [MemberType; 2] = [MemberType::Member, MemberType::Casual];

    pub fn as_str(&self) -> &'static str {
        match self {
            MemberType::Member => "member",
            MemberType::Casual => "casual",
        }
    }
}

impl FromStr for MemberType {
    type Err = RowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MemberType::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| RowError::UnknownCategory {
                field: "member_casual",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for MemberType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RideableType {
    ClassicBike,
    DockedBike,
    ElectricBike,
}

impl RideableType {
    pub const ALL: [RideableType; 3] = [
        RideableType::ClassicBike,
        RideableType::DockedBike,
        RideableType::ElectricBike,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RideableType::ClassicBike => "classic_bike",
            RideableType::DockedBike => "docked_bike",
            RideableType::ElectricBike => "electric_bike",
        }
    }
}

impl FromStr for RideableType {
    type Err = RowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RideableType::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| RowError::UnknownCategory {
                field: "rideable_type",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for RideableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A cleaned ride. Only produced by the cleaning pipeline; read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ride {
    pub duration_secs: i64,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub start_station_id: Option<i64>,
    pub start_station_name: Option<String>,
    pub end_station_id: Option<i64>,
    pub end_station_name: Option<String>,
    pub member_casual: MemberType,
    pub rideable_type: RideableType,
    pub is_equity: Option<bool>,
    pub distance_m: f64,
}

impl Ride {
    pub fn duration_minutes(&self) -> f64 {
        self.duration_secs as f64 / 60.0
    }

    pub fn start_day(&self) -> NaiveDate {
        self.start_date.date()
    }

    pub fn year(&self) -> i32 {
        self.start_date.year()
    }
}

/// Equity memberships were only flagged in May 2020.
pub fn in_equity_window(ts: NaiveDateTime) -> bool {
    ts.year() == 2020 && ts.month() == 5
}

const MISSING_TOKENS: [&str; 4] = ["na", "nan", "null", "none"];

/// Returns the trimmed value, or `None` when the field is empty or a
/// missing-value token such as `NA`.
pub fn present(value: Option<&str>) -> Option<&str> {
    let v = value?.trim();
    if v.is_empty() || MISSING_TOKENS.iter().any(|t| t.eq_ignore_ascii_case(v)) {
        None
    } else {
        Some(v)
    }
}

pub fn parse_float(field: &'static str, value: &str) -> Result<f64, RowError> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| RowError::InvalidNumber {
            field,
            value: value.to_string(),
        })
}

/// Parses an integer, also accepting integral decimals such as `31000.0`
/// which spreadsheet exports produce for nullable integer columns.
pub fn parse_integer(field: &'static str, value: &str) -> Result<i64, RowError> {
    if let Ok(v) = value.parse::<i64>() {
        return Ok(v);
    }

    match value.parse::<f64>() {
        Ok(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64 => Ok(v as i64),
        _ => Err(RowError::InvalidNumber {
            field,
            value: value.to_string(),
        }),
    }
}

const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

pub fn parse_timestamp(field: &'static str, value: &str) -> Result<NaiveDateTime, RowError> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .ok_or_else(|| RowError::InvalidTimestamp {
            field,
            value: value.to_string(),
        })
}

pub fn parse_bool(field: &'static str, value: &str) -> Result<bool, RowError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "1.0" | "yes" => Ok(true),
        "false" | "0" | "0.0" | "no" => Ok(false),
        _ => Err(RowError::InvalidBool {
            field,
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_type_levels() {
        assert_eq!("member".parse::<MemberType>(), Ok(MemberType::Member));
        assert_eq!("Casual".parse::<MemberType>(), Ok(MemberType::Casual));
        assert_eq!(
            "guest".parse::<MemberType>(),
            Err(RowError::UnknownCategory {
                field: "member_casual",
                value: "guest".into()
            })
        );
    }

    #[test]
    fn test_rideable_type_levels() {
        for level in RideableType::ALL {
            assert_eq!(level.as_str().parse::<RideableType>(), Ok(level));
        }
        assert!("scooter".parse::<RideableType>().is_err());
    }

    #[test]
    fn test_present_treats_tokens_as_missing() {
        assert_eq!(present(None), None);
        assert_eq!(present(Some("  ")), None);
        assert_eq!(present(Some("NaN")), None);
        assert_eq!(present(Some("NA")), None);
        assert_eq!(present(Some(" 38.9 ")), Some("38.9"));
    }

    #[test]
    fn test_parse_integer_accepts_integral_decimal() {
        assert_eq!(parse_integer("duration", "100"), Ok(100));
        assert_eq!(parse_integer("duration", "31000.0"), Ok(31000));
        assert!(parse_integer("duration", "12.5").is_err());
        assert!(parse_integer("duration", "abc").is_err());
    }

    #[test]
    fn test_parse_float_rejects_non_finite() {
        assert_eq!(parse_float("start_lat", "38.5"), Ok(38.5));
        assert!(parse_float("start_lat", "inf").is_err());
        assert!(parse_float("start_lat", "north").is_err());
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = NaiveDate::from_ymd_opt(2020, 5, 1)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap();
        assert_eq!(parse_timestamp("start_date", "2020-05-01 08:30:00"), Ok(expected));
        assert_eq!(parse_timestamp("start_date", "2020-05-01T08:30:00"), Ok(expected));
        assert_eq!(parse_timestamp("start_date", "05/01/2020 08:30"), Ok(expected));
        assert!(parse_timestamp("start_date", "yesterday").is_err());
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("is_equity", "True"), Ok(true));
        assert_eq!(parse_bool("is_equity", "0.0"), Ok(false));
        assert!(parse_bool("is_equity", "maybe").is_err());
    }

    #[test]
    fn test_equity_window() {
        let may = parse_timestamp("start_date", "2020-05-31 23:59:59").unwrap();
        let june = parse_timestamp("start_date", "2020-06-01 00:00:00").unwrap();
        let may_2021 = parse_timestamp("start_date", "2021-05-10 12:00:00").unwrap();
        assert!(in_equity_window(may));
        assert!(!in_equity_window(june));
        assert!(!in_equity_window(may_2021));
    }
}
