use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::data::domain::{Count, Price, Volume};

/// One minute of trading for a single instrument.
///
/// `date` and `time` are exchange-local; the conversion from provider UTC
/// timestamps happens during cleaning, never here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Calendar date of the bar (exchange-local).
    pub date: NaiveDate,
    /// Start of the minute (exchange-local).
    pub time: NaiveTime,

    /// The opening price.
    pub open: Price,
    /// The highest price reached during the minute.
    pub high: Price,
    /// The lowest price reached during the minute.
    pub low: Price,
    /// The closing price.
    pub close: Price,
    /// Volume weighted average price.
    pub vwap: Price,

    /// Shares traded during the minute.
    pub volume: Volume,
    /// Number of trades executed during the minute.
    pub trades: Count,
}

impl Bar {
    /// Returns the first price field that is NaN or infinite, if any.
    pub fn non_finite_price(&self) -> Option<&'static str> {
        [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
            ("vwap", self.vwap),
        ]
        .into_iter()
        .find(|(_, px)| !px.is_finite())
        .map(|(field, _)| field)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 12).unwrap()
    }

    pub fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    /// Bar with explicit OHLC and volume; VWAP is the close, one trade per 100 shares.
    pub fn bar(time: NaiveTime, open: f32, high: f32, low: f32, close: f32, volume: i64) -> Bar {
        Bar {
            date: day(),
            time,
            open: Price(open),
            high: Price(high),
            low: Price(low),
            close: Price(close),
            vwap: Price(close),
            volume: Volume(volume),
            trades: Count(volume / 100),
        }
    }

    /// Bar that only matters for its high and low.
    pub fn hl(time: NaiveTime, high: f32, low: f32) -> Bar {
        let mid = (high + low) / 2.0;
        bar(time, mid, high, low, mid, 100)
    }
}
