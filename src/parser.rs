//! CSV reader for raw bike-share trip records.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ByteRecord, ReaderBuilder, StringRecord, Trim};
use tracing::debug;

use crate::error::{CleanError, RowError};
use crate::pipeline::{Rejection, Stage};
use crate::ride::{COLUMNS, RawRide};

/// Reads every row of a trip CSV into [`RawRide`] records.
///
/// Rows that cannot be decoded (wrong field count, invalid UTF-8) come back
/// as rejections with their line so the cleaning run can count or refuse them.
///
/// # Errors
///
/// Returns [`CleanError::MissingColumns`] if the header lacks any of the
/// 16 source columns, or a CSV error for an unreadable header or stream.
pub fn parse_rides<R: Read>(reader: R) -> Result<Stage<RawRide>, CleanError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    check_headers(rdr.headers()?)?;
    let headers = rdr.byte_headers()?.clone();

    let mut kept = Vec::new();
    let mut rejected = Vec::new();
    for result in rdr.byte_records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();

        match decode(&record, &headers) {
            Ok(mut raw) => {
                raw.line = line;
                kept.push(raw);
            }
            Err(error) => rejected.push(Rejection { line, error }),
        }
    }

    debug!(
        rows = kept.len(),
        undecodable = rejected.len(),
        "Parsed raw ride rows"
    );
    Ok(Stage { kept, rejected })
}

fn decode(record: &ByteRecord, headers: &ByteRecord) -> Result<RawRide, RowError> {
    if record.len() != headers.len() {
        return Err(RowError::MalformedRecord(format!(
            "expected {} fields, found {}",
            headers.len(),
            record.len()
        )));
    }

    record
        .deserialize(Some(headers))
        .map_err(|e| RowError::MalformedRecord(e.to_string()))
}

/// Opens `path` and parses it with [`parse_rides`].
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn load_rides(path: &Path) -> Result<Stage<RawRide>, CleanError> {
    let file = File::open(path)?;
    parse_rides(file)
}

fn check_headers(headers: &StringRecord) -> Result<(), CleanError> {
    let missing: Vec<String> = COLUMNS
        .iter()
        .filter(|col| !headers.iter().any(|h| h == **col))
        .map(|col| col.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(CleanError::MissingColumns(missing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "duration,start_date,end_date,start_station_id,start_station_name,end_station_id,end_station_name,bike_number,member_casual,ride_id,rideable_type,start_lat,start_lng,end_lat,end_lng,is_equity";

    #[test]
    fn test_parse_empty_body_returns_no_rows() {
        let rows = parse_rides(format!("{HEADER}\n").as_bytes()).unwrap();
        assert!(rows.kept.is_empty());
        assert!(rows.rejected.is_empty());
    }

    #[test]
    fn test_parse_single_row() {
        let csv = format!(
            "{HEADER}\n100,2020-05-01 08:00:00,2020-05-01 08:01:40,31000,A St,31001,B St,W001,member,R1,classic_bike,38.0,-77.0,38.0,-77.0,\n"
        );
        let rows = parse_rides(csv.as_bytes()).unwrap().kept;

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.line, 2);
        assert_eq!(row.duration.as_deref(), Some("100"));
        assert_eq!(row.member_casual.as_deref(), Some("member"));
        assert_eq!(row.start_lng.as_deref(), Some("-77.0"));
        assert_eq!(row.is_equity, None);
    }

    #[test]
    fn test_columns_may_be_reordered() {
        let csv = "is_equity,end_lng,end_lat,start_lng,start_lat,rideable_type,ride_id,member_casual,bike_number,end_station_name,end_station_id,start_station_name,start_station_id,end_date,start_date,duration\n\
                   ,-77.0,38.0,-77.0,38.0,docked_bike,R9,casual,W9,,,,,2021-01-01 00:10:00,2021-01-01 00:00:00,600\n";
        let rows = parse_rides(csv.as_bytes()).unwrap().kept;

        assert_eq!(rows[0].duration.as_deref(), Some("600"));
        assert_eq!(rows[0].rideable_type.as_deref(), Some("docked_bike"));
    }

    #[test]
    fn test_missing_columns_reported() {
        let csv = "duration,start_date\n100,2020-05-01 08:00:00\n";
        let err = parse_rides(csv.as_bytes()).unwrap_err();

        match err {
            CleanError::MissingColumns(cols) => {
                assert_eq!(cols.len(), 14);
                assert!(cols.contains(&"start_lat".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    const GOOD_ROW: &str = "100,2020-05-01 08:00:00,2020-05-01 08:01:40,31000,A St,31001,B St,W001,member,R1,classic_bike,38.0,-77.0,38.0,-77.0,";

    #[test]
    fn test_ragged_row_rejected_others_kept() {
        let csv = format!("{HEADER}\n{GOOD_ROW}\n100,2020-05-01\n{GOOD_ROW}\n");
        let rows = parse_rides(csv.as_bytes()).unwrap();

        assert_eq!(rows.kept.len(), 2);
        assert_eq!(rows.kept[1].line, 4);
        assert_eq!(rows.rejected.len(), 1);
        assert_eq!(rows.rejected[0].line, 3);
        assert_eq!(
            rows.rejected[0].error,
            RowError::MalformedRecord("expected 16 fields, found 2".into())
        );
    }

    #[test]
    fn test_invalid_utf8_row_rejected_others_kept() {
        let mut csv = format!("{HEADER}\n{GOOD_ROW}\n").into_bytes();
        csv.extend_from_slice(
            b"100,2020-05-01 08:00:00,2020-05-01 08:01:40,31000,\xff\xfe,31001,B St,W002,member,R2,classic_bike,38.0,-77.0,38.0,-77.0,\n",
        );
        csv.extend_from_slice(format!("{GOOD_ROW}\n").as_bytes());

        let rows = parse_rides(csv.as_slice()).unwrap();

        assert_eq!(rows.kept.len(), 2);
        assert_eq!(rows.rejected.len(), 1);
        assert_eq!(rows.rejected[0].line, 3);
        assert!(matches!(
            rows.rejected[0].error,
            RowError::MalformedRecord(_)
        ));
    }
}
