use tracing::debug;

use crate::{
    config::TradingHours,
    data::{
        bar::Bar,
        session::Session,
        window::{Extremum, TimePredicate, Window, WindowKind},
    },
    error::{EmptyWindow, IntradayResult},
    summary::SessionSummary,
};

/// Derives a [`SessionSummary`] from one day of minute bars.
///
/// The analyzer owns its [`TradingHours`]; it holds no other state, so one
/// instance can be shared across threads and used for any number of sessions.
///
/// # Ordering
/// Some queries depend on the *time* found by an earlier one: the low after
/// the high is searched only in bars strictly after `high_time`, and the
/// pre-market low only in pre-market bars strictly after `pmhigh_time`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionAnalyzer {
    hours: TradingHours,
}

impl SessionAnalyzer {
    pub fn new(hours: TradingHours) -> Self {
        Self { hours }
    }

    pub fn trading_hours(&self) -> TradingHours {
        self.hours
    }

    /// Validates `bars` into a [`Session`] and analyzes it.
    ///
    /// # Errors
    /// Fails with [`DataError::EmptySession`] when `bars` is empty, or with the
    /// other [`Session::new`] validation errors.
    ///
    /// [`DataError::EmptySession`]: crate::error::DataError::EmptySession
    pub fn analyze_bars(&self, bars: Vec<Bar>, ticker: &str) -> IntradayResult<SessionSummary> {
        let session = Session::new(bars)?;
        Ok(self.analyze(&session, ticker))
    }

    #[tracing::instrument(skip(self, session), fields(date = %session.date(), bars = session.len()))]
    pub fn analyze(&self, session: &Session, ticker: &str) -> SessionSummary {
        let open_t = self.hours.market_open();
        let close_t = self.hours.market_close();

        let market = session.window(WindowKind::Market, TimePredicate::Between(open_t, close_t));
        let pre_market = session.window(WindowKind::PreMarket, TimePredicate::Before(open_t));

        let open = session
            .window(WindowKind::FromOpen, TimePredicate::AtOrAfter(open_t))
            .first()
            .map(|b| b.open);
        let close = session
            .window(WindowKind::UntilClose, TimePredicate::AtOrBefore(close_t))
            .last()
            .map(|b| b.close);

        let high = market.highest();
        let low = market.lowest();
        let lowph = lowest_after(&market, &high, WindowKind::PostHigh);

        let pmvol = pre_market.total_volume();
        let volume = pmvol + market.total_volume();

        let pmhigh = pre_market.highest();
        let pmlow = lowest_after(&pre_market, &pmhigh, WindowKind::PostPreMarketHigh);

        let (open, close) = (settle(open), settle(close));
        let (high, low, lowph) = (settle(high), settle(low), settle(lowph));
        let (pmhigh, pmlow) = (settle(pmhigh), settle(pmlow));

        SessionSummary {
            date: session.date(),
            ticker: ticker.to_string(),
            pmhigh: pmhigh.map(|e| e.price),
            pmhigh_time: pmhigh.map(|e| e.time),
            pmlow: pmlow.map(|e| e.price),
            pmlow_time: pmlow.map(|e| e.time),
            pmvol,
            open,
            high: high.map(|e| e.price),
            high_time: high.map(|e| e.time),
            low: low.map(|e| e.price),
            low_time: low.map(|e| e.time),
            lowph: lowph.map(|e| e.price),
            lowph_time: lowph.map(|e| e.time),
            close,
            volume,
        }
    }
}

/// Lowest low among the bars of `window` strictly after the time of `anchor`.
///
/// An empty `window` propagates its own [`EmptyWindow`], so the diagnostic
/// names the window that was empty first.
fn lowest_after(
    window: &Window<'_>,
    anchor: &Result<Extremum, EmptyWindow>,
    kind: WindowKind,
) -> Result<Extremum, EmptyWindow> {
    let anchor = anchor.as_ref().map_err(|e| *e)?;
    window
        .refine(kind, TimePredicate::After(anchor.time))
        .lowest()
}

/// Converts a reducer outcome into a summary field, logging empty windows.
fn settle<T>(outcome: Result<T, EmptyWindow>) -> Option<T> {
    match outcome {
        Ok(value) => Some(value),
        Err(EmptyWindow { window }) => {
            debug!(%window, "Empty window, field left unset");
            None
        }
    }
}
