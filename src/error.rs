use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

use crate::data::window::WindowKind;

pub type IntradayResult<T> = Result<T, IntradayError>;

#[derive(Debug, Error)]
pub enum IntradayError {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] IoError),
}

/// Errors related to bar data, sessions and data frames.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("Session contains no bars")]
    EmptySession,

    #[error("Session mixes trading dates: expected {expected}, found {found}")]
    MixedDates { expected: NaiveDate, found: NaiveDate },

    #[error("Bars are not strictly increasing in time: {current} follows {previous}")]
    UnorderedBars {
        previous: NaiveTime,
        current: NaiveTime,
    },

    #[error("Non-finite '{field}' price in bar at {time}")]
    NonFinitePrice { time: NaiveTime, field: &'static str },

    #[error("Missing required column: '{0}'")]
    MissingColumn(String),

    #[error("Missing value in column '{column}' at row {row}")]
    MissingValue { column: &'static str, row: usize },

    #[error("Data frame error: {0}")]
    DataFrame(String),

    #[error("Failed timestamp conversion: {0}")]
    TimestampConversion(String),
}

/// Errors related to analyzer and cleaning configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid trading hours (open: {open}, close: {close}): open must be before close")]
    InvalidTradingHours { open: NaiveTime, close: NaiveTime },

    #[error("Failed to parse configuration")]
    Parse(#[from] serde_json::Error),
}

/// Errors related to file I/O and serialization of reports.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("IO operation failed")]
    Io(#[from] std::io::Error),

    #[error("Serialization failed")]
    Json(#[from] serde_json::Error),

    #[error("File system error: {0}")]
    FileSystem(String),
}

/// A reducer was asked for a value from a window that holds no bars.
///
/// This is expected for days without pre-market trading or when the session
/// high prints on the last bar. The analyzer turns it into a missing field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Window '{window}' contains no bars")]
pub struct EmptyWindow {
    pub window: WindowKind,
}
