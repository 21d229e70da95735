//! WPT Triage - daily disabled/flaky/slow web-platform-tests report
//!
//! A single invocation fetches every upstream source, merges them per test
//! path and writes `index.html`, `common.json` and `data.csv`. Any source
//! that cannot be fetched aborts the run with a non-zero exit status.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, Level};

use wpt_triage_core::{HttpFetcher, OutputPaths, RunConfig};

#[derive(Parser, Debug)]
#[command(name = "wpt-triage")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Disabled/flaky/slow web-platform-tests report", long_about = None)]
struct Cli {
    /// Directory holding index.html, common.json and data.csv
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn run_config(&self) -> RunConfig {
        RunConfig {
            output: OutputPaths::new(&self.out_dir),
            ..RunConfig::default()
        }
    }
}

fn today() -> String {
    chrono::Local::now().date_naive().format("%Y-%m-%d").to_string()
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    wpt_triage_core::init_tracing(cli.json, level);

    let config = cli.run_config();
    let fetcher = HttpFetcher::new().context("Failed to create HTTP client")?;
    let date = today();

    info!(date = %date, out_dir = %config.output.out_dir.display(), "starting run");
    let summary = wpt_triage_core::run(&fetcher, &config, &date)
        .await
        .context("Triage run failed")?;

    println!(
        "{}: {} paths (found in 3: {}, in 2: {}, in 1: {})",
        summary.date,
        summary.records,
        summary.counts.in3,
        summary.counts.in2,
        summary.counts.in1()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_arguments_is_a_full_run() {
        let cli = Cli::try_parse_from(["wpt-triage"]).unwrap();
        assert_eq!(cli.out_dir, PathBuf::from("."));
        assert!(!cli.verbose);
        assert!(!cli.json);
        assert_eq!(cli.run_config().output, OutputPaths::default());
    }

    #[test]
    fn out_dir_only_changes_output_paths() {
        let cli = Cli::try_parse_from(["wpt-triage", "--out-dir", "/srv/report"]).unwrap();
        let config = cli.run_config();
        assert_eq!(config.output.trend_csv(), PathBuf::from("/srv/report/data.csv"));
        assert_eq!(config.urls, wpt_triage_core::SourceUrls::default());
    }

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn today_is_iso_date() {
        let date = today();
        assert_eq!(date.len(), 10);
        assert!(chrono::NaiveDate::parse_from_str(&date, "%Y-%m-%d").is_ok());
    }
}
