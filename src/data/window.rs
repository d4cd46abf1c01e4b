use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use crate::{
    data::{
        bar::Bar,
        domain::{Price, Volume},
    },
    error::EmptyWindow,
};

// ================================================================================================
// Predicates
// ================================================================================================

/// A condition on a bar's time of day.
///
/// This is a closed set of comparisons, not an expression language. Narrower
/// windows are built by refining an existing [`Window`] with another predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimePredicate {
    /// `time < t`
    Before(NaiveTime),
    /// `time <= t`
    AtOrBefore(NaiveTime),
    /// `time > t`
    After(NaiveTime),
    /// `time >= t`
    AtOrAfter(NaiveTime),
    /// `start <= time <= end` (closed on both sides).
    Between(NaiveTime, NaiveTime),
}

impl TimePredicate {
    pub fn matches(&self, time: NaiveTime) -> bool {
        match *self {
            Self::Before(t) => time < t,
            Self::AtOrBefore(t) => time <= t,
            Self::After(t) => time > t,
            Self::AtOrAfter(t) => time >= t,
            Self::Between(start, end) => start <= time && time <= end,
        }
    }
}

/// Label attached to every window so that empty-window diagnostics name the
/// query that came up empty.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum WindowKind {
    /// The whole session, unfiltered.
    Session,
    /// Bars strictly before the market open.
    PreMarket,
    /// Bars between market open and market close, both inclusive.
    Market,
    /// Market bars strictly after the time of the session high.
    PostHigh,
    /// Pre-market bars strictly after the time of the pre-market high.
    PostPreMarketHigh,
    /// Bars at or after the market open (no upper bound).
    FromOpen,
    /// Bars at or before the market close (no lower bound).
    UntilClose,
    /// Anything built ad hoc by a caller.
    Custom,
}

// ================================================================================================
// Window
// ================================================================================================

/// The bar that won an extremum query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extremum {
    pub price: Price,
    pub time: NaiveTime,
}

/// A time-filtered view of a session's bars, in original order.
///
/// Windows borrow from the session and are recomputed whenever a different
/// predicate is needed; they never own or mutate bars.
#[derive(Debug, Clone, PartialEq)]
pub struct Window<'a> {
    kind: WindowKind,
    bars: Vec<&'a Bar>,
}

/// Returns every bar whose time satisfies `predicate`, in the order given.
///
/// An empty result is a valid window, not an error.
pub fn filter_window<'a, I>(bars: I, kind: WindowKind, predicate: TimePredicate) -> Window<'a>
where
    I: IntoIterator<Item = &'a Bar>,
{
    Window {
        kind,
        bars: bars
            .into_iter()
            .filter(|bar| predicate.matches(bar.time))
            .collect(),
    }
}

impl<'a> Window<'a> {
    pub fn kind(&self) -> WindowKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bars(&self) -> &[&'a Bar] {
        &self.bars
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Bar> + '_ {
        self.bars.iter().copied()
    }

    /// Narrows this window with a further predicate.
    ///
    /// Equivalent to filtering the original session with both predicates.
    pub fn refine(&self, kind: WindowKind, predicate: TimePredicate) -> Window<'a> {
        filter_window(self.iter(), kind, predicate)
    }

    /// Highest `high` in the window. Among bars sharing the maximum, the
    /// earliest one wins.
    pub fn highest(&self) -> Result<Extremum, EmptyWindow> {
        self.iter()
            .reduce(|best, bar| {
                if bar.high > best.high || (bar.high == best.high && bar.time < best.time) {
                    bar
                } else {
                    best
                }
            })
            .map(|b| Extremum {
                price: b.high,
                time: b.time,
            })
            .ok_or_else(|| self.empty())
    }

    /// Lowest `low` in the window. Among bars sharing the minimum, the latest
    /// one wins.
    pub fn lowest(&self) -> Result<Extremum, EmptyWindow> {
        self.iter()
            .reduce(|best, bar| {
                if bar.low < best.low || (bar.low == best.low && bar.time > best.time) {
                    bar
                } else {
                    best
                }
            })
            .map(|b| Extremum {
                price: b.low,
                time: b.time,
            })
            .ok_or_else(|| self.empty())
    }

    /// Earliest bar in the window.
    pub fn first(&self) -> Result<&'a Bar, EmptyWindow> {
        self.iter().min_by_key(|b| b.time).ok_or_else(|| self.empty())
    }

    /// Latest bar in the window.
    pub fn last(&self) -> Result<&'a Bar, EmptyWindow> {
        self.iter().max_by_key(|b| b.time).ok_or_else(|| self.empty())
    }

    /// Sum of bar volumes; zero for an empty window.
    pub fn total_volume(&self) -> Volume {
        self.iter().map(|b| b.volume).sum()
    }

    fn empty(&self) -> EmptyWindow {
        EmptyWindow { window: self.kind }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::data::bar::fixtures::{bar, hl, hm};

    fn sample() -> Vec<Bar> {
        vec![
            bar(hm(6, 0), 10.0, 10.5, 9.5, 10.0, 300),
            bar(hm(6, 29), 10.0, 12.0, 9.8, 11.0, 200),
            bar(hm(6, 30), 11.0, 11.5, 10.5, 11.2, 1_000),
            bar(hm(9, 0), 11.2, 20.0, 11.0, 19.0, 5_000),
            bar(hm(13, 0), 15.0, 15.5, 14.5, 15.0, 700),
            bar(hm(13, 1), 15.0, 16.0, 14.0, 15.5, 50),
        ]
    }

    #[test]
    fn test_predicates() {
        let t = hm(6, 30);
        assert!(TimePredicate::Before(t).matches(hm(6, 29)));
        assert!(!TimePredicate::Before(t).matches(t));
        assert!(TimePredicate::AtOrBefore(t).matches(t));
        assert!(TimePredicate::After(t).matches(hm(6, 31)));
        assert!(!TimePredicate::After(t).matches(t));
        assert!(TimePredicate::AtOrAfter(t).matches(t));

        let market = TimePredicate::Between(hm(6, 30), hm(13, 0));
        assert!(market.matches(hm(6, 30)));
        assert!(market.matches(hm(13, 0)));
        assert!(!market.matches(hm(13, 1)));
        assert!(!market.matches(hm(6, 29)));
    }

    #[test]
    fn test_filter_window_keeps_order_and_bounds() {
        let bars = sample();
        let market = filter_window(
            &bars,
            WindowKind::Market,
            TimePredicate::Between(hm(6, 30), hm(13, 0)),
        );
        let times: Vec<_> = market.iter().map(|b| b.time).collect();
        assert_eq!(times, vec![hm(6, 30), hm(9, 0), hm(13, 0)]);
        assert_eq!(market.kind(), WindowKind::Market);
    }

    #[test]
    fn test_filter_window_empty_is_not_an_error() {
        let bars = sample();
        let w = filter_window(&bars, WindowKind::Custom, TimePredicate::Before(hm(4, 0)));
        assert!(w.is_empty());
        assert_eq!(w.total_volume(), Volume(0));
        assert_eq!(
            w.highest(),
            Err(EmptyWindow {
                window: WindowKind::Custom
            })
        );
        assert!(w.lowest().is_err());
        assert!(w.first().is_err());
        assert!(w.last().is_err());
    }

    #[test]
    fn test_filter_window_does_not_touch_input() {
        let bars = sample();
        let before = bars.clone();
        let _ = filter_window(&bars, WindowKind::Custom, TimePredicate::After(hm(7, 0)));
        let _ = filter_window(&bars, WindowKind::Custom, TimePredicate::Before(hm(7, 0)));
        assert_eq!(bars, before);
    }

    #[test]
    fn test_refine_equals_conjunction() {
        let bars = sample();
        let outer = TimePredicate::Between(hm(6, 0), hm(13, 0));
        let inner = TimePredicate::After(hm(6, 29));

        let refined = filter_window(&bars, WindowKind::Custom, outer).refine(WindowKind::Custom, inner);
        let direct: Vec<&Bar> = bars
            .iter()
            .filter(|b| outer.matches(b.time) && inner.matches(b.time))
            .collect();

        assert_eq!(refined.bars(), direct.as_slice());
    }

    #[test]
    fn test_highest_prefers_earliest_on_tie() {
        let bars = vec![
            hl(hm(7, 0), 15.0, 14.0),
            hl(hm(8, 0), 20.0, 14.0),
            hl(hm(9, 0), 20.0, 14.0),
            hl(hm(10, 0), 19.0, 14.0),
        ];
        let w = filter_window(&bars, WindowKind::Market, TimePredicate::AtOrAfter(hm(0, 0)));
        assert_eq!(
            w.highest().unwrap(),
            Extremum {
                price: Price(20.0),
                time: hm(8, 0)
            }
        );
    }

    #[test]
    fn test_lowest_prefers_latest_on_tie() {
        let bars = vec![
            hl(hm(7, 0), 15.0, 9.0),
            hl(hm(8, 0), 15.0, 8.0),
            hl(hm(9, 0), 15.0, 8.0),
            hl(hm(10, 0), 15.0, 8.5),
        ];
        let w = filter_window(&bars, WindowKind::Market, TimePredicate::AtOrAfter(hm(0, 0)));
        assert_eq!(
            w.lowest().unwrap(),
            Extremum {
                price: Price(8.0),
                time: hm(9, 0)
            }
        );
    }

    #[test]
    fn test_tie_breaks_do_not_depend_on_input_order() {
        // Reversed slice: the reducers must still pick by time, not position.
        let bars = vec![
            hl(hm(9, 0), 20.0, 8.0),
            hl(hm(8, 0), 20.0, 8.0),
        ];
        let w = filter_window(&bars, WindowKind::Custom, TimePredicate::AtOrAfter(hm(0, 0)));
        assert_eq!(w.highest().unwrap().time, hm(8, 0));
        assert_eq!(w.lowest().unwrap().time, hm(9, 0));
        assert_eq!(w.first().unwrap().time, hm(8, 0));
        assert_eq!(w.last().unwrap().time, hm(9, 0));
    }

    #[test]
    fn test_total_volume() {
        let bars = sample();
        let pm = filter_window(&bars, WindowKind::PreMarket, TimePredicate::Before(hm(6, 30)));
        assert_eq!(pm.total_volume(), Volume(500));
    }

    #[test]
    fn test_window_kind_display() {
        assert_eq!(WindowKind::PostPreMarketHigh.to_string(), "post_pre_market_high");
        assert_eq!(WindowKind::Market.to_string(), "market");
    }
}
