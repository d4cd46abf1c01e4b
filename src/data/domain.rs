use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{impl_add_sub_sum_primitive, impl_from_primitive};

// ================================================================================================
// Domain Strong Types (NewTypes)
// ================================================================================================

/// Represents a price level in the quote currency.
///
/// Used for: Open, High, Low, Close and VWAP. Stored as `f32`, which is the precision
/// minute aggregates are delivered in after cleaning.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Price(pub f32);
impl_from_primitive!(Price, f32);

impl Price {
    pub fn is_finite(&self) -> bool {
        self.0.is_finite()
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Represents a traded amount of the instrument, either for one bar or summed
/// over a window.
///
/// Bars arrive as 32-bit counts; the wrapper is 64-bit so that day-level sums
/// cannot overflow.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Volume(pub i64);
impl_from_primitive!(Volume, i64);
impl_add_sub_sum_primitive!(Volume, i64);

impl fmt::Display for Volume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Represents a generic count (e.g., number of trades in a bar).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Count(pub i64);
impl_from_primitive!(Count, i64);
impl_add_sub_sum_primitive!(Count, i64);
