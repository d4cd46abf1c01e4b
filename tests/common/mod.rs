#![allow(dead_code)]

use chrono::{NaiveDate, NaiveTime};
use intraday::prelude::*;

pub fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 12).expect("valid date")
}

pub fn hm(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).expect("valid time")
}

/// Minimal bar builder; unspecified prices sit between `high` and `low`.
pub struct BarBuilder {
    time: NaiveTime,
    open: Option<f32>,
    high: f32,
    low: f32,
    close: Option<f32>,
    volume: i64,
}

pub fn at(h: u32, m: u32) -> BarBuilder {
    BarBuilder {
        time: hm(h, m),
        open: None,
        high: 10.0,
        low: 10.0,
        close: None,
        volume: 100,
    }
}

impl BarBuilder {
    pub fn high(self, high: f32) -> Self {
        Self {
            high,
            low: self.low.min(high),
            ..self
        }
    }

    pub fn low(self, low: f32) -> Self {
        Self {
            low,
            high: self.high.max(low),
            ..self
        }
    }

    pub fn open(self, open: f32) -> Self {
        Self {
            open: Some(open),
            high: self.high.max(open),
            low: self.low.min(open),
            ..self
        }
    }

    pub fn close(self, close: f32) -> Self {
        Self {
            close: Some(close),
            high: self.high.max(close),
            low: self.low.min(close),
            ..self
        }
    }

    pub fn volume(self, volume: i64) -> Self {
        Self { volume, ..self }
    }

    pub fn build(self) -> Bar {
        let mid = (self.high + self.low) / 2.0;
        Bar {
            date: day(),
            time: self.time,
            open: Price(self.open.unwrap_or(mid)),
            high: Price(self.high),
            low: Price(self.low),
            close: Price(self.close.unwrap_or(mid)),
            vwap: Price(mid),
            volume: Volume(self.volume),
            trades: Count(self.volume / 10),
        }
    }
}

pub fn session(builders: impl IntoIterator<Item = BarBuilder>) -> Session {
    Session::new(builders.into_iter().map(BarBuilder::build).collect()).expect("valid session")
}

pub fn fixture_path(name: &str) -> String {
    format!("{}/tests/fixtures/{name}", env!("CARGO_MANIFEST_DIR"))
}
