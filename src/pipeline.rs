//! The cleaning pipeline: raw CSV rows in, validated [`Ride`]s out.
//!
//! Each stage is a standalone function so it can be tested on its own:
//!
//! 1. [`drop_missing`] drops rows without coordinates or duration
//! 2. [`drop_identifiers`] removes `bike_number` and `ride_id`
//! 3. [`to_radians`] parses coordinates and converts them to radians
//! 4. [`derive_distance`] computes the Haversine distance per row
//! 5. [`coerce_types`] parses the remaining columns into typed values
//! 6. [`filter_duration`] drops rides of [`MIN_RIDE_SECS`] or less
//!
//! [`clean`] runs them in order and collects a [`CleaningReport`].

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::distance::{GeoPoint, RadianPoint, great_circle_m};
use crate::error::{CleanError, RowError, serialize_display};
use crate::ride::{
    MIN_RIDE_SECS, MemberType, RawRide, Ride, RideableType, in_equity_window, parse_bool,
    parse_float, parse_integer, parse_timestamp, present,
};

/// A row the pipeline refused, with its source line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rejection {
    pub line: u64,
    #[serde(serialize_with = "serialize_display")]
    pub error: RowError,
}

/// Output of a fallible stage: rows that passed and rows that did not.
#[derive(Debug)]
pub struct Stage<T> {
    pub kept: Vec<T>,
    pub rejected: Vec<Rejection>,
}

impl<T> From<Vec<T>> for Stage<T> {
    fn from(kept: Vec<T>) -> Self {
        Stage {
            kept,
            rejected: Vec::new(),
        }
    }
}

impl<T> Stage<T> {
    fn run<I, F>(rows: Vec<I>, line_of: fn(&I) -> u64, mut f: F) -> Self
    where
        F: FnMut(I) -> Result<T, RowError>,
    {
        let mut kept = Vec::with_capacity(rows.len());
        let mut rejected = Vec::new();

        for row in rows {
            let line = line_of(&row);
            match f(row) {
                Ok(v) => kept.push(v),
                Err(error) => rejected.push(Rejection { line, error }),
            }
        }

        Stage { kept, rejected }
    }
}

/// A raw row with the identifier columns dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TripRecord {
    pub line: u64,
    pub duration: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub start_station_id: Option<String>,
    pub start_station_name: Option<String>,
    pub end_station_id: Option<String>,
    pub end_station_name: Option<String>,
    pub member_casual: Option<String>,
    pub rideable_type: Option<String>,
    pub start_lat: Option<String>,
    pub start_lng: Option<String>,
    pub end_lat: Option<String>,
    pub end_lng: Option<String>,
    pub is_equity: Option<String>,
}

/// A trip whose endpoints have been parsed and converted to radians.
#[derive(Debug, Clone, PartialEq)]
pub struct Positioned {
    pub trip: TripRecord,
    pub start: RadianPoint,
    pub end: RadianPoint,
}

/// A trip with its derived distance.
#[derive(Debug, Clone, PartialEq)]
pub struct Measured {
    pub trip: TripRecord,
    pub distance_m: f64,
}

/// Counts per stage plus every rejected row.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CleaningReport {
    pub rows_read: usize,
    pub missing_required: usize,
    pub malformed: usize,
    pub too_short: usize,
    pub retained: usize,
    pub rejections: Vec<Rejection>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CleanOptions {
    /// Fail on the first malformed row instead of dropping it.
    pub strict: bool,
}

/// Result of a cleaning run. The rides are read-only from here on.
#[derive(Debug)]
pub struct CleanedRides {
    rides: Vec<Ride>,
    pub report: CleaningReport,
}

impl CleanedRides {
    pub fn rides(&self) -> &[Ride] {
        &self.rides
    }

    pub fn len(&self) -> usize {
        self.rides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rides.is_empty()
    }
}

const REQUIRED: [&str; 5] = ["start_lat", "start_lng", "end_lat", "end_lng", "duration"];

pub fn drop_missing(rows: Vec<RawRide>) -> Stage<RawRide> {
    Stage::run(
        rows,
        |r| r.line,
        |row| {
            let values = [
                &row.start_lat,
                &row.start_lng,
                &row.end_lat,
                &row.end_lng,
                &row.duration,
            ];
            let missing = REQUIRED
                .iter()
                .zip(values)
                .find(|(_, v)| present(v.as_deref()).is_none())
                .map(|(field, _)| *field);

            match missing {
                Some(field) => Err(RowError::MissingField(field)),
                None => Ok(row),
            }
        },
    )
}

pub fn drop_identifiers(rows: Vec<RawRide>) -> Vec<TripRecord> {
    rows.into_iter()
        .map(|r| TripRecord {
            line: r.line,
            duration: r.duration,
            start_date: r.start_date,
            end_date: r.end_date,
            start_station_id: r.start_station_id,
            start_station_name: r.start_station_name,
            end_station_id: r.end_station_id,
            end_station_name: r.end_station_name,
            member_casual: r.member_casual,
            rideable_type: r.rideable_type,
            start_lat: r.start_lat,
            start_lng: r.start_lng,
            end_lat: r.end_lat,
            end_lng: r.end_lng,
            is_equity: r.is_equity,
        })
        .collect()
}

fn required<'a>(field: &'static str, value: &'a Option<String>) -> Result<&'a str, RowError> {
    present(value.as_deref()).ok_or(RowError::MissingField(field))
}

fn endpoint(
    lat_field: &'static str,
    lat: &Option<String>,
    lng_field: &'static str,
    lng: &Option<String>,
) -> Result<GeoPoint, RowError> {
    let lat = parse_float(lat_field, required(lat_field, lat)?)?;
    let lng = parse_float(lng_field, required(lng_field, lng)?)?;
    GeoPoint::new(lat, lng)
}

pub fn to_radians(rows: Vec<TripRecord>) -> Stage<Positioned> {
    Stage::run(
        rows,
        |t| t.line,
        |trip| {
            let start = endpoint("start_lat", &trip.start_lat, "start_lng", &trip.start_lng)?;
            let end = endpoint("end_lat", &trip.end_lat, "end_lng", &trip.end_lng)?;
            Ok(Positioned {
                trip,
                start: start.to_radians(),
                end: end.to_radians(),
            })
        },
    )
}

pub fn derive_distance(rows: Vec<Positioned>) -> Vec<Measured> {
    rows.into_iter()
        .map(|p| Measured {
            distance_m: great_circle_m(p.start, p.end),
            trip: p.trip,
        })
        .collect()
}

fn optional_integer(field: &'static str, value: &Option<String>) -> Result<Option<i64>, RowError> {
    present(value.as_deref())
        .map(|v| parse_integer(field, v))
        .transpose()
}

fn optional_text(value: Option<String>) -> Option<String> {
    present(value.as_deref()).map(str::to_string)
}

/// Parses the typed columns of a single measured trip.
pub fn coerce(measured: Measured) -> Result<Ride, RowError> {
    let Measured { trip, distance_m } = measured;

    let duration_secs = parse_integer("duration", required("duration", &trip.duration)?)?;
    let start_date = parse_timestamp("start_date", required("start_date", &trip.start_date)?)?;
    let end_date = parse_timestamp("end_date", required("end_date", &trip.end_date)?)?;
    let member_casual: MemberType = required("member_casual", &trip.member_casual)?.parse()?;
    let rideable_type: RideableType = required("rideable_type", &trip.rideable_type)?.parse()?;
    let start_station_id = optional_integer("start_station_id", &trip.start_station_id)?;
    let end_station_id = optional_integer("end_station_id", &trip.end_station_id)?;
    let is_equity = present(trip.is_equity.as_deref())
        .map(|v| parse_bool("is_equity", v))
        .transpose()?;

    if is_equity.is_some() && !in_equity_window(start_date) {
        return Err(RowError::EquityOutsideWindow(start_date));
    }

    Ok(Ride {
        duration_secs,
        start_date,
        end_date,
        start_station_id,
        start_station_name: optional_text(trip.start_station_name),
        end_station_id,
        end_station_name: optional_text(trip.end_station_name),
        member_casual,
        rideable_type,
        is_equity,
        distance_m,
    })
}

pub fn coerce_types(rows: Vec<Measured>) -> Stage<Ride> {
    Stage::run(rows, |m| m.trip.line, coerce)
}

/// Keeps rides longer than [`MIN_RIDE_SECS`]; returns the number dropped.
pub fn filter_duration(rides: Vec<Ride>) -> (Vec<Ride>, usize) {
    let before = rides.len();
    let kept: Vec<Ride> = rides
        .into_iter()
        .filter(|r| r.duration_secs > MIN_RIDE_SECS)
        .collect();
    let dropped = before - kept.len();
    (kept, dropped)
}

/// Runs every stage over the parsed rows. Rows the parser could not decode
/// are counted as malformed before any stage runs.
///
/// # Errors
///
/// In strict mode, returns [`CleanError::Row`] for the first malformed row.
/// Rows that are merely missing required values are always dropped.
#[tracing::instrument(
    skip_all,
    fields(rows = parsed.kept.len() + parsed.rejected.len(), strict = options.strict)
)]
pub fn clean(
    parsed: Stage<RawRide>,
    options: &CleanOptions,
) -> Result<CleanedRides, CleanError> {
    let Stage { kept: rows, rejected } = parsed;
    let mut report = CleaningReport {
        rows_read: rows.len() + rejected.len(),
        ..Default::default()
    };
    absorb(&mut report, rejected, options)?;

    let present_rows = drop_missing(rows);
    debug!(
        kept = present_rows.kept.len(),
        dropped = present_rows.rejected.len(),
        "Dropped rows with missing values"
    );
    absorb(&mut report, present_rows.rejected, options)?;

    let trips = drop_identifiers(present_rows.kept);

    let positioned = to_radians(trips);
    debug!(
        kept = positioned.kept.len(),
        dropped = positioned.rejected.len(),
        "Converted coordinates to radians"
    );
    absorb(&mut report, positioned.rejected, options)?;

    let measured = derive_distance(positioned.kept);

    let typed = coerce_types(measured);
    debug!(
        kept = typed.kept.len(),
        dropped = typed.rejected.len(),
        "Coerced column types"
    );
    absorb(&mut report, typed.rejected, options)?;

    let (rides, too_short) = filter_duration(typed.kept);
    report.too_short = too_short;
    report.retained = rides.len();

    info!(
        rows_read = report.rows_read,
        retained = report.retained,
        missing_required = report.missing_required,
        malformed = report.malformed,
        too_short = report.too_short,
        "Cleaning complete"
    );

    Ok(CleanedRides { rides, report })
}

fn absorb(
    report: &mut CleaningReport,
    rejected: Vec<Rejection>,
    options: &CleanOptions,
) -> Result<(), CleanError> {
    for rejection in rejected {
        if rejection.error.is_malformed() {
            if options.strict {
                return Err(CleanError::Row {
                    line: rejection.line,
                    source: rejection.error,
                });
            }
            warn!(line = rejection.line, error = %rejection.error, "Dropping malformed row");
            report.malformed += 1;
        } else {
            debug!(line = rejection.line, error = %rejection.error, "Dropping incomplete row");
            report.missing_required += 1;
        }
        report.rejections.push(rejection);
    }
    Ok(())
}
