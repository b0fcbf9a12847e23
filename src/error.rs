//! Error types for loading and cleaning ride records.

use chrono::NaiveDateTime;
use serde::Serializer;
use thiserror::Error;

/// Why a single CSV row was rejected by the cleaning pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RowError {
    #[error("malformed record: {0}")]
    MalformedRecord(String),

    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("field `{field}` is not a valid number: {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("field `{field}` is not a valid timestamp: {value:?}")]
    InvalidTimestamp { field: &'static str, value: String },

    #[error("field `{field}` has unrecognized value {value:?}")]
    UnknownCategory { field: &'static str, value: String },

    #[error("field `{field}` is not a valid boolean: {value:?}")]
    InvalidBool { field: &'static str, value: String },

    #[error("coordinate out of range: lat={lat}, lng={lng}")]
    CoordinateOutOfRange { lat: f64, lng: f64 },

    #[error("equity flag set on ride starting {0}, outside May 2020")]
    EquityOutsideWindow(NaiveDateTime),
}

impl RowError {
    /// Missing values are ordinary drops; everything else is malformed input.
    pub fn is_malformed(&self) -> bool {
        !matches!(self, RowError::MissingField(_))
    }
}

/// Failure of a whole cleaning run, as opposed to a single dropped row.
#[derive(Debug, Error)]
pub enum CleanError {
    #[error("missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("line {line}: {source}")]
    Row {
        line: u64,
        #[source]
        source: RowError,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Serializes any error through its `Display` message.
pub(crate) fn serialize_display<E, S>(error: &E, serializer: S) -> Result<S::Ok, S::Error>
where
    E: std::fmt::Display,
    S: Serializer,
{
    serializer.collect_str(error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_is_not_malformed() {
        assert!(!RowError::MissingField("start_lat").is_malformed());
        assert!(
            RowError::UnknownCategory {
                field: "member_casual",
                value: "guest".into()
            }
            .is_malformed()
        );
        assert!(RowError::MalformedRecord("expected 16 fields, found 2".into()).is_malformed());
    }

    #[test]
    fn test_missing_columns_message() {
        let err = CleanError::MissingColumns(vec!["start_lat".into(), "end_lng".into()]);
        assert_eq!(
            err.to_string(),
            "missing required column(s): start_lat, end_lng"
        );
    }

    #[test]
    fn test_row_error_message_includes_line() {
        let err = CleanError::Row {
            line: 7,
            source: RowError::InvalidNumber {
                field: "duration",
                value: "abc".into(),
            },
        };
        assert_eq!(
            err.to_string(),
            "line 7: field `duration` is not a valid number: \"abc\""
        );
    }
}
