use chrono::{NaiveDate, NaiveTime};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, IntradayResult};

// ================================================================================================
// Trading Hours
// ================================================================================================

/// Exchange-local regular trading hours used to carve a day into windows.
///
/// # Semantics
/// - Pre-market: `time < market_open`.
/// - Market: `market_open <= time <= market_close` (closed on both sides).
/// - Bars after `market_close` belong to neither window.
///
/// The default is the US equity session expressed in Pacific time
/// (06:30 to 13:00).
///
/// # Example
/// ```
/// # use chrono::NaiveTime;
/// # use intraday::prelude::*;
/// let hours = TradingHours::new(
///     NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
///     NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
/// )
/// .unwrap();
/// assert!(hours.market_open() < hours.market_close());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawTradingHours")]
pub struct TradingHours {
    market_open: NaiveTime,
    market_close: NaiveTime,
}

#[derive(Deserialize)]
struct RawTradingHours {
    market_open: NaiveTime,
    market_close: NaiveTime,
}

impl TryFrom<RawTradingHours> for TradingHours {
    type Error = ConfigError;

    fn try_from(raw: RawTradingHours) -> Result<Self, Self::Error> {
        Self::validated(raw.market_open, raw.market_close)
    }
}

impl Default for TradingHours {
    fn default() -> Self {
        Self {
            market_open: NaiveTime::from_hms_opt(6, 30, 0).unwrap_or(NaiveTime::MIN),
            market_close: NaiveTime::from_hms_opt(13, 0, 0).unwrap_or(NaiveTime::MIN),
        }
    }
}

impl TradingHours {
    /// Creates trading hours.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidTradingHours`] if `market_open >= market_close`.
    /// Sessions wrapping midnight are not supported.
    pub fn new(market_open: NaiveTime, market_close: NaiveTime) -> IntradayResult<Self> {
        Ok(Self::validated(market_open, market_close)?)
    }

    /// Parses trading hours from JSON, e.g.
    /// `{"market_open": "09:30:00", "market_close": "16:00:00"}`.
    pub fn from_json_str(json: &str) -> IntradayResult<Self> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e).into())
    }

    pub fn market_open(&self) -> NaiveTime {
        self.market_open
    }

    pub fn market_close(&self) -> NaiveTime {
        self.market_close
    }

    fn validated(market_open: NaiveTime, market_close: NaiveTime) -> Result<Self, ConfigError> {
        if market_open >= market_close {
            return Err(ConfigError::InvalidTradingHours {
                open: market_open,
                close: market_close,
            });
        }
        Ok(Self {
            market_open,
            market_close,
        })
    }
}

// ================================================================================================
// Cleaning
// ================================================================================================

/// How provider UTC timestamps are turned into exchange-local wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocalClock {
    /// A named time zone; daylight saving time is applied.
    Zone(Tz),
    /// A constant offset from UTC in minutes (e.g. `-420` for UTC-7).
    FixedOffset { minutes: i32 },
}

impl Default for LocalClock {
    fn default() -> Self {
        Self::Zone(chrono_tz::America::Los_Angeles)
    }
}

/// Configuration for turning raw provider aggregates into a [`Session`].
///
/// [`Session`]: crate::data::session::Session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningConfig {
    /// Clock used to localize timestamps.
    pub clock: LocalClock,

    /// Drop rows flagged as over-the-counter when an `otc` column is present.
    pub drop_otc: bool,

    /// Keep only bars on this local date.
    ///
    /// - `None`: all bars are kept; bars spanning two local dates are rejected
    ///   when the session is built.
    pub trading_date: Option<NaiveDate>,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            clock: LocalClock::default(),
            drop_otc: true,
            trading_date: None,
        }
    }
}

impl CleaningConfig {
    pub fn with_clock(self, clock: LocalClock) -> Self {
        Self { clock, ..self }
    }

    pub fn with_drop_otc(self, drop_otc: bool) -> Self {
        Self { drop_otc, ..self }
    }

    pub fn with_trading_date(self, date: NaiveDate) -> Self {
        Self {
            trading_date: Some(date),
            ..self
        }
    }

    pub fn from_json_str(json: &str) -> IntradayResult<Self> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e).into())
    }
}
