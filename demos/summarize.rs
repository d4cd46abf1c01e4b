//! Summarizes one or more days of provider minute aggregates.
//!
//! ```text
//! cargo run --example summarize -- ACME tests/fixtures/aggs/acme_2024-03-12.csv
//! ```
//!
//! Each CSV holds one trading day with the columns `timestamp` (epoch ms, UTC),
//! `open`, `high`, `low`, `close`, `volume`, `vwap`, `transactions` and
//! optionally `otc`. Set `RUST_LOG=intraday=debug` to see empty windows.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use intraday::prelude::*;
use polars::prelude::{LazyCsvReader, LazyFileListReader, PlPath};
use rayon::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: summarize <TICKER> <AGGS_CSV>...";

fn main() -> Result<()> {
    init_tracing();

    let mut args = env::args().skip(1);
    let ticker = args.next().context(USAGE)?;
    let files = args.map(PathBuf::from).collect::<Vec<_>>();
    if files.is_empty() {
        bail!(USAGE);
    }

    let analyzer = SessionAnalyzer::default();
    let cfg = CleaningConfig::default();

    let mut summaries = files
        .par_iter()
        .map(|path| summarize(path, &ticker, &analyzer, &cfg))
        .collect::<Result<Vec<_>>>()?;
    summaries.sort_by_key(|s| s.date);

    let table = SummaryTable::from_summaries(&summaries)?;
    let json = serde_json::to_string_pretty(&table.to_json()?)?;
    println!("{json}");

    let out = Path::new("demos/reports");
    table.to_csv(out, None, None)?;
    fs::write(out.join(table.filename(FileExtension::Json)), json)?;
    info!(dir = %out.display(), sessions = table.len(), "Wrote summary table");

    Ok(())
}

fn summarize(
    path: &Path,
    ticker: &str,
    analyzer: &SessionAnalyzer,
    cfg: &CleaningConfig,
) -> Result<SessionSummary> {
    let uri = path
        .to_str()
        .with_context(|| format!("Path is not valid UTF-8: {}", path.display()))?;

    let df = LazyCsvReader::new(PlPath::new(uri))
        .with_has_header(true)
        .finish()
        .and_then(|lf| lf.collect())
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let session = session_from_aggs(df, cfg)
        .with_context(|| format!("Failed to clean {}", path.display()))?;

    Ok(analyzer.analyze(&session, ticker))
}

// ================================================================================================
// Tracing Configuration
// ================================================================================================

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_thread_names(true)
        .init();
}
