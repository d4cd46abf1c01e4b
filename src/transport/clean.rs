use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use itertools::izip;
use polars::prelude::{
    ChunkedArray, DataFrame, DataType, DatetimeType, Float32Type, Int64Type, IntoLazy, Logical,
    SortMultipleOptions, TimeUnit, col, lit,
};
use tracing::debug;

use crate::{
    config::{CleaningConfig, LocalClock},
    data::{
        bar::Bar,
        domain::{Count, Price, Volume},
        session::Session,
    },
    error::{DataError, IntradayResult},
    transport::schema::AggCol,
};

/// Turns a frame of raw provider minute aggregates into a validated [`Session`].
///
/// # Steps
/// 1. Check that every column in [`AggCol::REQUIRED`] is present.
/// 2. Drop over-the-counter rows if `cfg.drop_otc` and an `otc` column exists
///    (a null flag counts as not OTC).
/// 3. Cast to the cleaned schema, rename `transactions` to `trades` and sort
///    by timestamp.
/// 4. Localize each UTC timestamp with `cfg.clock` and split it into date and time.
/// 5. Keep only `cfg.trading_date`, if set, and build the session.
///
/// # Errors
/// - [`DataError::MissingColumn`] if a required column is absent.
/// - [`DataError::MissingValue`] if a required cell is null. `row` indexes the
///   cleaned, time-sorted frame.
/// - [`DataError::DataFrame`] if a cast or collect fails.
/// - Any error from [`Session::new`], e.g. no bars left after filtering.
#[tracing::instrument(skip(df, cfg), fields(rows = df.height()))]
pub fn session_from_aggs(df: DataFrame, cfg: &CleaningConfig) -> IntradayResult<Session> {
    if let Some(missing) = AggCol::REQUIRED
        .iter()
        .find(|c| df.column(c.as_str()).is_err())
    {
        return Err(DataError::MissingColumn(missing.to_string()).into());
    }
    let has_otc = df.column(AggCol::Otc.as_str()).is_ok();
    let raw_rows = df.height();

    let mut lf = df.lazy();
    if has_otc && cfg.drop_otc {
        lf = lf.filter(col(AggCol::Otc).fill_null(lit(false)).not());
    }

    let cleaned = lf
        .select([
            col(AggCol::Timestamp).cast(AggCol::Timestamp.dtype()),
            col(AggCol::Open).cast(AggCol::Open.dtype()),
            col(AggCol::High).cast(AggCol::High.dtype()),
            col(AggCol::Low).cast(AggCol::Low.dtype()),
            col(AggCol::Close).cast(AggCol::Close.dtype()),
            col(AggCol::Vwap).cast(AggCol::Vwap.dtype()),
            col(AggCol::Volume).cast(AggCol::Volume.dtype()),
            col(AggCol::Transactions)
                .cast(AggCol::Trades.dtype())
                .alias(AggCol::Trades.as_str()),
        ])
        .sort([AggCol::Timestamp], SortMultipleOptions::default())
        .collect()
        .map_err(|e| DataError::DataFrame(format!("Failed to clean aggregates: {e}")))?;
    debug!(dropped = raw_rows - cleaned.height(), "Dropped OTC rows");

    let bars = extract_bars(&cleaned, cfg.clock)?;
    let total = bars.len();
    let bars: Vec<Bar> = match cfg.trading_date {
        Some(date) => bars.into_iter().filter(|b| b.date == date).collect(),
        None => bars,
    };

    debug!(kept = bars.len(), dropped = total - bars.len(), "Filtered by trading date");
    Session::new(bars)
}

fn extract_bars(df: &DataFrame, clock: LocalClock) -> IntradayResult<Vec<Bar>> {
    let len = df.height();
    if len == 0 {
        return Ok(Vec::new());
    }

    let ts_dt_logical = df.dt_logical(AggCol::Timestamp)?;
    let ts_ca = ts_dt_logical.physical();
    let open_ca = df.f32_ca(AggCol::Open)?;
    let high_ca = df.f32_ca(AggCol::High)?;
    let low_ca = df.f32_ca(AggCol::Low)?;
    let close_ca = df.f32_ca(AggCol::Close)?;
    let vwap_ca = df.f32_ca(AggCol::Vwap)?;
    let vol_ca = df.i64_ca(AggCol::Volume)?;
    let trades_ca = df.i64_ca(AggCol::Trades)?;

    let mut bars = Vec::with_capacity(len);

    for (row, (ts, o, h, l, c, vw, v, n)) in izip!(
        ts_ca.into_iter(),
        open_ca.into_iter(),
        high_ca.into_iter(),
        low_ca.into_iter(),
        close_ca.into_iter(),
        vwap_ca.into_iter(),
        vol_ca.into_iter(),
        trades_ca.into_iter()
    )
    .enumerate()
    {
        let missing = |col: AggCol| DataError::MissingValue {
            column: col.as_str(),
            row,
        };

        let ts_val = ts.ok_or_else(|| missing(AggCol::Timestamp))?;
        let utc = DateTime::<Utc>::from_timestamp_micros(ts_val).ok_or_else(|| {
            DataError::TimestampConversion(format!(
                "Failed to convert Timestamp ({ts_val}) from microseconds to UTC DateTime"
            ))
        })?;
        let local = localize(clock, utc);

        bars.push(Bar {
            date: local.date(),
            time: local.time(),
            open: Price(o.ok_or_else(|| missing(AggCol::Open))?),
            high: Price(h.ok_or_else(|| missing(AggCol::High))?),
            low: Price(l.ok_or_else(|| missing(AggCol::Low))?),
            close: Price(c.ok_or_else(|| missing(AggCol::Close))?),
            vwap: Price(vw.ok_or_else(|| missing(AggCol::Vwap))?),
            volume: Volume(v.ok_or_else(|| missing(AggCol::Volume))?),
            trades: Count(n.ok_or_else(|| missing(AggCol::Trades))?),
        });
    }

    Ok(bars)
}

/// Exchange-local wall-clock time of a UTC instant.
pub fn localize(clock: LocalClock, utc: DateTime<Utc>) -> NaiveDateTime {
    match clock {
        LocalClock::Zone(tz) => utc.with_timezone(&tz).naive_local(),
        LocalClock::FixedOffset { minutes } => {
            utc.naive_utc() + TimeDelta::minutes(i64::from(minutes))
        }
    }
}

// ================================================================================================
// Column Accessors
// ================================================================================================

trait DataFrameExt {
    fn dt_logical(&self, col: AggCol) -> IntradayResult<Logical<DatetimeType, Int64Type>>;
    fn f32_ca(&self, col: AggCol) -> IntradayResult<&ChunkedArray<Float32Type>>;
    fn i64_ca(&self, col: AggCol) -> IntradayResult<&ChunkedArray<Int64Type>>;
}

impl DataFrameExt for DataFrame {
    fn dt_logical(&self, col: AggCol) -> IntradayResult<Logical<DatetimeType, Int64Type>> {
        let s = self
            .column(col.as_str())
            .map_err(|_| DataError::DataFrame(format!("Failed to get column {col:?}")))?;

        if matches!(s.dtype(), DataType::Datetime(TimeUnit::Microseconds, _)) {
            return s.datetime().cloned().map_err(|_| {
                DataError::DataFrame(format!("Column {col:?} is not Datetime")).into()
            });
        }

        let casted = s
            .cast(&DataType::Datetime(TimeUnit::Microseconds, None))
            .map_err(|e| {
                DataError::DataFrame(format!("Failed to cast {col:?} to Microseconds: {e}"))
            })?;

        casted.datetime().cloned().map_err(|_| {
            DataError::DataFrame(format!("Cast produced invalid Datetime for {col:?}")).into()
        })
    }

    fn f32_ca(&self, col: AggCol) -> IntradayResult<&ChunkedArray<Float32Type>> {
        self.column(col.as_str())
            .map_err(|_| DataError::DataFrame(format!("Failed to get column {col:?}")).into())
            .and_then(|s| {
                s.f32().map_err(|_| {
                    DataError::DataFrame(format!("Column {col:?} is not Float32")).into()
                })
            })
    }

    fn i64_ca(&self, col: AggCol) -> IntradayResult<&ChunkedArray<Int64Type>> {
        self.column(col.as_str())
            .map_err(|_| DataError::DataFrame(format!("Failed to get column {col:?}")).into())
            .and_then(|s| {
                s.i64().map_err(|_| {
                    DataError::DataFrame(format!("Column {col:?} is not Int64")).into()
                })
            })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::IntradayError;
    use chrono::{NaiveDate, NaiveTime, TimeZone};
    use polars::{df, prelude::NamedFrom};

    fn utc_ms(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> i64 {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0)
            .unwrap()
            .timestamp_millis()
    }

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    /// 2024-03-12 is in PDT (UTC-7): 13:29Z is 06:29 local.
    fn raw_frame() -> DataFrame {
        df!(
            "timestamp" => &[
                utc_ms(2024, 3, 12, 13, 31),
                utc_ms(2024, 3, 12, 13, 29),
                utc_ms(2024, 3, 12, 13, 30),
            ],
            "open" => &[10.5f64, 10.0, 10.2],
            "high" => &[11.0f64, 10.4, 10.9],
            "low" => &[10.4f64, 9.9, 10.1],
            "close" => &[10.8f64, 10.2, 10.5],
            "volume" => &[3_000.0f64, 1_000.0, 2_000.0],
            "vwap" => &[10.7f64, 10.1, 10.4],
            "transactions" => &[30i64, 10, 20],
            "otc" => &[false, false, true],
        )
        .unwrap()
    }

    #[test]
    fn test_cleaning_sorts_localizes_and_drops_otc() {
        let session = session_from_aggs(raw_frame(), &CleaningConfig::default()).unwrap();

        assert_eq!(session.date(), NaiveDate::from_ymd_opt(2024, 3, 12).unwrap());
        let times: Vec<_> = session.bars().iter().map(|b| b.time).collect();
        assert_eq!(times, vec![hm(6, 29), hm(6, 31)]);

        let first = &session.bars()[0];
        assert_eq!(first.open, Price(10.0));
        assert_eq!(first.volume, Volume(1_000));
        assert_eq!(first.trades, Count(10));
    }

    #[test]
    fn test_keeping_otc_rows() {
        let cfg = CleaningConfig::default().with_drop_otc(false);
        let session = session_from_aggs(raw_frame(), &cfg).unwrap();
        assert_eq!(session.len(), 3);
        assert_eq!(session.bars()[1].time, hm(6, 30));
    }

    #[test]
    fn test_frame_without_otc_column() {
        let mut df = raw_frame();
        df.drop_in_place("otc").unwrap();
        let session = session_from_aggs(df, &CleaningConfig::default()).unwrap();
        assert_eq!(session.len(), 3);
    }

    #[test]
    fn test_zone_and_fixed_offset_differ_in_winter() {
        // 2024-01-16 is in PST (UTC-8).
        let df = df!(
            "timestamp" => &[utc_ms(2024, 1, 16, 14, 30)],
            "open" => &[1.0f64],
            "high" => &[1.0f64],
            "low" => &[1.0f64],
            "close" => &[1.0f64],
            "volume" => &[1i64],
            "vwap" => &[1.0f64],
            "transactions" => &[1i64],
        )
        .unwrap();

        let zoned = session_from_aggs(df.clone(), &CleaningConfig::default()).unwrap();
        assert_eq!(zoned.bars()[0].time, hm(6, 30));

        let fixed = CleaningConfig::default().with_clock(LocalClock::FixedOffset { minutes: -420 });
        let fixed = session_from_aggs(df, &fixed).unwrap();
        assert_eq!(fixed.bars()[0].time, hm(7, 30));
    }

    #[test]
    fn test_trading_date_filter() {
        let df = df!(
            "timestamp" => &[utc_ms(2024, 3, 12, 20, 0), utc_ms(2024, 3, 13, 13, 30)],
            "open" => &[1.0f64, 2.0],
            "high" => &[1.0f64, 2.0],
            "low" => &[1.0f64, 2.0],
            "close" => &[1.0f64, 2.0],
            "volume" => &[1i64, 2],
            "vwap" => &[1.0f64, 2.0],
            "transactions" => &[1i64, 2],
        )
        .unwrap();

        // Two local dates without a filter cannot form a session.
        let res = session_from_aggs(df.clone(), &CleaningConfig::default());
        assert!(matches!(
            res,
            Err(IntradayError::Data(DataError::MixedDates { .. }))
        ));

        let day = NaiveDate::from_ymd_opt(2024, 3, 13).unwrap();
        let cfg = CleaningConfig::default().with_trading_date(day);
        let session = session_from_aggs(df.clone(), &cfg).unwrap();
        assert_eq!(session.date(), day);
        assert_eq!(session.bars()[0].open, Price(2.0));

        let none = CleaningConfig::default()
            .with_trading_date(NaiveDate::from_ymd_opt(2024, 3, 14).unwrap());
        assert!(matches!(
            session_from_aggs(df, &none),
            Err(IntradayError::Data(DataError::EmptySession))
        ));
    }

    #[test]
    fn test_missing_column() {
        let mut df = raw_frame();
        df.drop_in_place("vwap").unwrap();
        let res = session_from_aggs(df, &CleaningConfig::default());
        assert!(matches!(
            res,
            Err(IntradayError::Data(DataError::MissingColumn(c))) if c == "vwap"
        ));
    }

    #[test]
    fn test_null_cell_is_reported_with_row() {
        let df = df!(
            "timestamp" => &[utc_ms(2024, 3, 12, 13, 30), utc_ms(2024, 3, 12, 13, 31)],
            "open" => &[1.0f64, 1.0],
            "high" => &[1.0f64, 1.0],
            "low" => &[Some(1.0f64), None],
            "close" => &[1.0f64, 1.0],
            "volume" => &[1i64, 1],
            "vwap" => &[1.0f64, 1.0],
            "transactions" => &[1i64, 1],
        )
        .unwrap();

        let res = session_from_aggs(df, &CleaningConfig::default());
        assert!(matches!(
            res,
            Err(IntradayError::Data(DataError::MissingValue { column: "low", row: 1 }))
        ));
    }

    #[test]
    fn test_localize_fixed_offset() {
        let utc = Utc.with_ymd_and_hms(2024, 3, 12, 3, 0, 0).unwrap();
        let local = localize(LocalClock::FixedOffset { minutes: -420 }, utc);
        assert_eq!(local.date(), NaiveDate::from_ymd_opt(2024, 3, 11).unwrap());
        assert_eq!(local.time(), hm(20, 0));
    }
}
