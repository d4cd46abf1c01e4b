use std::sync::Arc;

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use polars::{
    df,
    frame::DataFrame,
    prelude::{DataType, Field, IntoLazy, NamedFrom, PlSmallStr, Schema, SchemaRef, col},
};
use strum::{Display, EnumCount, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::{
    data::domain::Price,
    error::IntradayResult,
    report::{
        io::{Report, ReportName, ToSchema},
        polars_ext::polars_to_intraday_error,
    },
    summary::SessionSummary,
};

/// Columns of the session summary table, in output order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    EnumIter,
    EnumCount,
    IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum SummaryCol {
    Date,
    Ticker,
    Pmhigh,
    PmhighTime,
    Pmlow,
    PmlowTime,
    Pmvol,
    Open,
    High,
    HighTime,
    Low,
    LowTime,
    Lowph,
    LowphTime,
    Close,
    Volume,
}

impl From<SummaryCol> for PlSmallStr {
    fn from(value: SummaryCol) -> Self {
        value.as_str().into()
    }
}

impl SummaryCol {
    pub fn name(&self) -> PlSmallStr {
        (*self).into()
    }

    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    pub fn dtype(&self) -> DataType {
        match self {
            Self::Date => DataType::Date,
            Self::Ticker => DataType::String,
            Self::Pmhigh | Self::Pmlow | Self::Open | Self::High | Self::Low | Self::Lowph
            | Self::Close => DataType::Float32,
            Self::PmhighTime | Self::PmlowTime | Self::HighTime | Self::LowTime
            | Self::LowphTime => DataType::Time,
            Self::Pmvol | Self::Volume => DataType::Int64,
        }
    }

    pub fn field(&self) -> Field {
        Field::new(self.name(), self.dtype())
    }
}

/// One row per analyzed session, in the order the summaries were given.
#[derive(Debug, Clone)]
pub struct SummaryTable {
    df: DataFrame,
}

impl SummaryTable {
    #[tracing::instrument(skip(summaries), fields(rows = summaries.len()))]
    pub fn from_summaries(summaries: &[SessionSummary]) -> IntradayResult<Self> {
        let price = |f: fn(&SessionSummary) -> Option<Price>| -> Vec<Option<f32>> {
            summaries.iter().map(|s| f(s).map(|p| p.0)).collect()
        };
        let time = |f: fn(&SessionSummary) -> Option<NaiveTime>| -> Vec<Option<i64>> {
            summaries.iter().map(|s| f(s).map(nanos_since_midnight)).collect()
        };

        let dates: Vec<i32> = summaries.iter().map(|s| days_since_epoch(s.date)).collect();
        let tickers: Vec<&str> = summaries.iter().map(|s| s.ticker.as_str()).collect();
        let pmvol: Vec<i64> = summaries.iter().map(|s| s.pmvol.0).collect();
        let volume: Vec<i64> = summaries.iter().map(|s| s.volume.0).collect();

        let raw = df!(
            SummaryCol::Date.as_str() => dates,
            SummaryCol::Ticker.as_str() => tickers,
            SummaryCol::Pmhigh.as_str() => price(|s| s.pmhigh),
            SummaryCol::PmhighTime.as_str() => time(|s| s.pmhigh_time),
            SummaryCol::Pmlow.as_str() => price(|s| s.pmlow),
            SummaryCol::PmlowTime.as_str() => time(|s| s.pmlow_time),
            SummaryCol::Pmvol.as_str() => pmvol,
            SummaryCol::Open.as_str() => price(|s| s.open),
            SummaryCol::High.as_str() => price(|s| s.high),
            SummaryCol::HighTime.as_str() => time(|s| s.high_time),
            SummaryCol::Low.as_str() => price(|s| s.low),
            SummaryCol::LowTime.as_str() => time(|s| s.low_time),
            SummaryCol::Lowph.as_str() => price(|s| s.lowph),
            SummaryCol::LowphTime.as_str() => time(|s| s.lowph_time),
            SummaryCol::Close.as_str() => price(|s| s.close),
            SummaryCol::Volume.as_str() => volume,
        )
        .map_err(|e| polars_to_intraday_error("session summary table", e))?;

        let casts = SummaryCol::iter()
            .map(|c| col(c).cast(c.dtype()))
            .collect::<Vec<_>>();

        let df = raw
            .lazy()
            .select(casts)
            .collect()
            .map_err(|e| polars_to_intraday_error("session summary table", e))?;

        Ok(Self { df })
    }

    pub fn len(&self) -> usize {
        self.df.height()
    }

    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }
}

impl Report for SummaryTable {
    fn as_df(&self) -> &DataFrame {
        &self.df
    }

    fn as_df_mut(&mut self) -> &mut DataFrame {
        &mut self.df
    }
}

impl ReportName for SummaryTable {
    fn base_name(&self) -> String {
        "session_summary".to_string()
    }
}

impl ToSchema for SummaryTable {
    fn to_schema() -> SchemaRef {
        Arc::new(Schema::from_iter(SummaryCol::iter().map(|c| c.field())))
    }
}

/// Days from 0001-01-01 to 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

fn days_since_epoch(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

fn nanos_since_midnight(time: NaiveTime) -> i64 {
    i64::from(time.num_seconds_from_midnight()) * 1_000_000_000 + i64::from(time.nanosecond())
}
