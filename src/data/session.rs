use chrono::NaiveDate;
use serde::Serialize;

use crate::{
    data::{
        bar::Bar,
        window::{TimePredicate, Window, WindowKind, filter_window},
    },
    error::{DataError, IntradayResult},
};

/// One trading day of minute bars for a single instrument.
///
/// # Invariants
/// Enforced by [`Session::new`], so every `Session` in hand satisfies them:
/// - at least one bar,
/// - all bars share the same date,
/// - times are strictly increasing (gaps allowed, duplicates not),
/// - every price is finite.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    bars: Box<[Bar]>,
}

impl Session {
    /// Validates `bars` and freezes them into a session.
    ///
    /// # Errors
    /// - [`DataError::EmptySession`] if `bars` is empty.
    /// - [`DataError::MixedDates`] if a bar's date differs from the first bar's.
    /// - [`DataError::UnorderedBars`] if a bar's time is not after its predecessor's.
    /// - [`DataError::NonFinitePrice`] if any price is NaN or infinite.
    pub fn new(bars: Vec<Bar>) -> IntradayResult<Self> {
        let first = bars.first().ok_or(DataError::EmptySession)?;
        let date = first.date;

        for bar in &bars {
            if bar.date != date {
                return Err(DataError::MixedDates {
                    expected: date,
                    found: bar.date,
                }
                .into());
            }
            if let Some(field) = bar.non_finite_price() {
                return Err(DataError::NonFinitePrice {
                    time: bar.time,
                    field,
                }
                .into());
            }
        }

        if let Some(pair) = bars.windows(2).find(|w| w[1].time <= w[0].time) {
            return Err(DataError::UnorderedBars {
                previous: pair[0].time,
                current: pair[1].time,
            }
            .into());
        }

        Ok(Self {
            bars: bars.into_boxed_slice(),
        })
    }

    /// The trading date shared by every bar.
    pub fn date(&self) -> NaiveDate {
        self.bars[0].date
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Always `false`; kept for API symmetry with [`Window`].
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// All bars whose time satisfies `predicate`.
    pub fn window(&self, kind: WindowKind, predicate: TimePredicate) -> Window<'_> {
        filter_window(self.bars.iter(), kind, predicate)
    }
}

impl<'a> IntoIterator for &'a Session {
    type Item = &'a Bar;
    type IntoIter = std::slice::Iter<'a, Bar>;

    fn into_iter(self) -> Self::IntoIter {
        self.bars.iter()
    }
}
