use std::{fs, path::Path};

use polars::{
    frame::DataFrame,
    prelude::{CsvWriterOptions, IntoLazy, LazyFrame, PlPath, SchemaRef, SinkOptions, SinkTarget},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};
use tracing::info;

use crate::{
    error::{DataError, IntradayResult, IoError},
    report::polars_ext::{DataFrameExt, LazyFrameExt},
};

// ================================================================================================
// Traits
// ================================================================================================

/// Defines a common interface for tabular reports.
pub trait Report {
    /// Access the underlying DataFrame (Immutable).
    fn as_df(&self) -> &DataFrame;

    /// Access the underlying DataFrame (Mutable).
    fn as_df_mut(&mut self) -> &mut DataFrame;
}

pub trait ReportName {
    fn base_name(&self) -> String;

    fn filename(&self, ext: FileExtension) -> String {
        format!("{}.{}", self.base_name(), ext)
    }
}

pub trait ToSchema {
    /// Returns the canonical schema for this report type.
    fn to_schema() -> SchemaRef;
}

pub trait AsFormattedLazyFrame {
    fn as_formatted_lf(&self) -> LazyFrame;
}

pub trait ToJson {
    /// Serializes the report to a generic JSON Value.
    /// Returns a `Value::Array` containing row objects.
    fn to_json(&self) -> IntradayResult<serde_json::Value>;
}

pub trait ToCsv {
    /// Writes the report to a CSV file in the target directory.
    ///
    /// # Formatting
    /// - Dates are written as `YYYY-MM-DD`, times as `HH:MM:SS`.
    /// - Missing values are written as empty fields.
    ///
    /// # Arguments
    /// - `dir`: Target directory. Created if it doesn't exist.
    /// - `opts`: CSV writing options (delimiter, headers, etc.).
    ///
    /// # Side Effects
    /// - Creates the directory if missing.
    /// - Overwrites the file if it exists.
    fn to_csv(
        &self,
        dir: impl AsRef<Path>,
        opts: Option<&CsvWriterOptions>,
        sink_opts: Option<&SinkOptions>,
    ) -> IntradayResult<()>;
}

// ================================================================================================
// Blanket Implementations
// ================================================================================================

impl<T> AsFormattedLazyFrame for T
where
    T: Report + ToSchema,
{
    fn as_formatted_lf(&self) -> LazyFrame {
        self.as_df()
            .clone()
            .lazy()
            .with_readable_temporals(T::to_schema())
    }
}

impl<T> ToJson for T
where
    T: Report + ToSchema,
{
    fn to_json(&self) -> IntradayResult<serde_json::Value> {
        let rows = self
            .as_formatted_lf()
            .collect()
            .map_err(|e| DataError::DataFrame(e.to_string()))?
            .to_json_rows()?;
        Ok(Value::Array(rows.into_iter().map(Value::Object).collect()))
    }
}

impl<T> ToCsv for T
where
    T: Report + ReportName + ToSchema,
{
    fn to_csv(
        &self,
        dir: impl AsRef<Path>,
        opts: Option<&CsvWriterOptions>,
        sink_opts: Option<&SinkOptions>,
    ) -> IntradayResult<()> {
        let dir = dir.as_ref();
        let file_path = dir.join(self.filename(FileExtension::Csv));

        if !dir.exists() {
            fs::create_dir_all(dir).map_err(|e| {
                IoError::FileSystem(format!(
                    "Failed to create directory {}: {}",
                    dir.display(),
                    e
                ))
            })?;
        }

        let uri = file_path.to_str().ok_or_else(|| {
            IoError::FileSystem(format!(
                "Path contains invalid UTF-8 characters: {}",
                file_path.display()
            ))
        })?;
        let target = SinkTarget::Path(PlPath::new(uri));
        let options = opts.cloned().unwrap_or_default();
        let sink_opts = sink_opts.cloned().unwrap_or_default();

        let lf = self.as_formatted_lf();

        let sink_plan = lf
            .sink_csv(target, options, None, sink_opts)
            .map_err(|e| DataError::DataFrame(format!("Failed to build CSV sink plan: {e}")))?;

        let _ = sink_plan.collect().map_err(|e| {
            DataError::DataFrame(format!(
                "Failed to write CSV to '{}': {e}",
                file_path.display()
            ))
        })?;

        info!(path = %file_path.display(), "Wrote CSV report");
        Ok(())
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    EnumIter,
    IntoStaticStr,
)]
#[strum(serialize_all = "lowercase")]
pub enum FileExtension {
    Csv,
    Json,
}
