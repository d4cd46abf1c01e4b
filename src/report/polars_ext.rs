use polars::prelude::{
    DataFrame, DataType, JsonFormat, JsonWriter, LazyFrame, SchemaRef, SerWriter, col,
};
use serde_json::Value;

use crate::error::{DataError, IntradayError, IntradayResult, IoError};

pub(super) fn polars_to_intraday_error(report: &str, e: polars::error::PolarsError) -> IntradayError {
    IntradayError::Data(DataError::DataFrame(format!(
        "Error while building {report}: {e}"
    )))
}

pub trait DataFrameExt {
    fn to_json_rows(&self) -> IntradayResult<Vec<serde_json::Map<String, Value>>>;
}

impl DataFrameExt for DataFrame {
    fn to_json_rows(&self) -> IntradayResult<Vec<serde_json::Map<String, Value>>> {
        let height = self.height();
        if height == 0 {
            return Ok(Vec::new());
        }

        // Heuristic: approx 2^6 bytes per cell.
        let estimated_row_size = self.width() * (1 << 6);
        let mut buf = Vec::with_capacity(height * estimated_row_size);

        JsonWriter::new(&mut buf)
            .with_json_format(JsonFormat::Json)
            .finish(&mut self.clone())
            .map_err(|e| DataError::DataFrame(e.to_string()))?;

        let json_val: Value = serde_json::from_slice(&buf).map_err(IoError::Json)?;

        match json_val {
            Value::Array(rows) => {
                let mut out_vec = Vec::with_capacity(rows.len());
                for v in rows {
                    if let Value::Object(map) = v {
                        out_vec.push(map);
                    }
                }
                Ok(out_vec)
            }
            _ => {
                Err(DataError::DataFrame("Polars JSON output was not an array".to_string()).into())
            }
        }
    }
}

pub trait LazyFrameExt {
    /// Renders `Date` columns as `YYYY-MM-DD` and `Time` columns as `HH:MM:SS` strings.
    /// Nulls stay null.
    fn with_readable_temporals(self, schema: SchemaRef) -> Self;
}

impl LazyFrameExt for LazyFrame {
    fn with_readable_temporals(self, schema: SchemaRef) -> Self {
        let temporal_exprs = schema
            .iter()
            .filter_map(|(name, dtype)| {
                let fmt = match dtype {
                    DataType::Date => "%Y-%m-%d",
                    DataType::Time => "%H:%M:%S",
                    _ => return None,
                };
                Some(col(name.as_str()).dt().to_string(fmt).alias(name.as_str()))
            })
            .collect::<Vec<_>>();

        if temporal_exprs.is_empty() {
            return self;
        }

        self.with_columns(temporal_exprs)
    }
}
