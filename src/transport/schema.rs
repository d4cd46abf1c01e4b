use std::sync::Arc;

use polars::prelude::{DataType, Field, PlSmallStr, Schema, SchemaRef, TimeUnit};
use strum::{Display, EnumString, IntoStaticStr};

/// Column vocabulary of provider minute aggregates.
///
/// Raw frames carry `transactions` and optionally `otc`; cleaned frames carry
/// `trades` instead and never carry `otc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum AggCol {
    /// Bar start in epoch milliseconds, UTC.
    Timestamp,

    Open,
    High,
    Low,
    Close,
    Vwap,
    Volume,

    /// Trade count as delivered by the provider.
    Transactions,
    /// Trade count after cleaning.
    Trades,

    /// Over-the-counter flag.
    Otc,
}

impl From<AggCol> for PlSmallStr {
    fn from(value: AggCol) -> Self {
        value.as_str().into()
    }
}

impl AggCol {
    /// Columns a raw frame must provide.
    pub const REQUIRED: [AggCol; 8] = [
        Self::Timestamp,
        Self::Open,
        Self::High,
        Self::Low,
        Self::Close,
        Self::Vwap,
        Self::Volume,
        Self::Transactions,
    ];

    pub fn name(&self) -> PlSmallStr {
        (*self).into()
    }

    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    /// The dtype of this column in a cleaned frame.
    pub fn dtype(&self) -> DataType {
        match self {
            Self::Timestamp => DataType::Datetime(TimeUnit::Milliseconds, None),
            Self::Open | Self::High | Self::Low | Self::Close | Self::Vwap => DataType::Float32,
            Self::Volume | Self::Transactions | Self::Trades => DataType::Int64,
            Self::Otc => DataType::Boolean,
        }
    }

    pub fn field(&self) -> Field {
        Field::new(self.name(), self.dtype())
    }
}

/// Schema of a cleaned aggregate frame, in column order.
pub fn cleaned_aggs_schema() -> SchemaRef {
    let s = Schema::from_iter([
        AggCol::Timestamp.field(),
        AggCol::Open.field(),
        AggCol::High.field(),
        AggCol::Low.field(),
        AggCol::Close.field(),
        AggCol::Vwap.field(),
        AggCol::Volume.field(),
        AggCol::Trades.field(),
    ]);

    Arc::new(s)
}

#[cfg(test)]
mod test {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_names_are_snake_case() {
        assert_eq!(AggCol::Transactions.as_str(), "transactions");
        assert_eq!(AggCol::Vwap.to_string(), "vwap");
        assert_eq!(AggCol::from_str("otc").unwrap(), AggCol::Otc);
    }

    #[test]
    fn test_cleaned_schema_excludes_raw_only_columns() {
        let schema = cleaned_aggs_schema();
        assert_eq!(schema.len(), 8);
        assert!(schema.get(AggCol::Trades.as_str()).is_some());
        assert!(schema.get(AggCol::Transactions.as_str()).is_none());
        assert!(schema.get(AggCol::Otc.as_str()).is_none());
        assert_eq!(
            schema.get(AggCol::Open.as_str()),
            Some(&DataType::Float32)
        );
    }
}
