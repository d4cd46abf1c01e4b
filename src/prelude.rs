// 1. Traits
pub use crate::report::io::{AsFormattedLazyFrame, Report, ReportName, ToCsv, ToJson, ToSchema};

// 2. Core Types
pub use crate::analyzer::SessionAnalyzer;
pub use crate::data::bar::Bar;
pub use crate::data::session::Session;
pub use crate::data::window::{Extremum, TimePredicate, Window, WindowKind, filter_window};
pub use crate::summary::SessionSummary;

// 3. Domain Types
pub use crate::data::domain::{Count, Price, Volume};

// 4. Configurations
pub use crate::config::{CleaningConfig, LocalClock, TradingHours};

// 5. Errors
pub use crate::error::{ConfigError, DataError, EmptyWindow, IntradayError, IntradayResult, IoError};

// 6. Cleaning & Reports
pub use crate::report::io::FileExtension;
pub use crate::report::summary::{SummaryCol, SummaryTable};
pub use crate::transport::clean::session_from_aggs;
pub use crate::transport::schema::AggCol;
