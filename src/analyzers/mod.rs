//! Read-only aggregation passes over cleaned rides.
//!
//! Each pass takes the cleaned rides plus a [`filter::RideFilter`] and
//! returns a serializable summary ready for charting. Passes share no
//! mutable state.

pub mod analyzer;
pub mod duration;
pub mod filter;
pub mod timing;
pub mod trend;
pub mod types;
pub mod utility;
