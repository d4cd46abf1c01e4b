//! Minute-bar session analytics.
//!
//! A trading day of one-minute OHLCV bars is carved into time windows
//! (pre-market, regular market, after the session high, ...) and reduced to a
//! [`SessionSummary`](summary::SessionSummary): pre-market high and low,
//! market open, session high and low, the low after the high, the close and
//! volumes. Raw provider aggregates are cleaned into sessions with
//! [`session_from_aggs`](transport::clean::session_from_aggs), and summaries
//! can be collected into a [`SummaryTable`](report::summary::SummaryTable) for
//! CSV or JSON output.

pub mod analyzer;
pub mod config;
pub mod data;
pub mod error;
mod macros;
pub mod prelude;
pub mod report;
pub mod summary;
pub mod transport;
