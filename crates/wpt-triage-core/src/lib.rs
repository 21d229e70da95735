//! WPT Triage Core Library
//!
//! Aggregates disabled, flaky, slow and timeout annotations for
//! web-platform-tests from Gecko metadata, Chromium and WebKit expectation
//! files and the WPT issue tracker, merges them per test path, and produces
//! the daily report, the JSON snapshot and the trend log.

pub mod config;
pub mod domain;
pub mod fetch;
pub mod merge;
pub mod pipeline;
pub mod report;
pub mod snapshot;
pub mod sources;
pub mod telemetry;
pub mod trend;

pub use config::{OutputPaths, RetryPolicy, RunConfig, SourceUrls};
pub use domain::{
    classify, Observation, Result, Source, SourceObservation, Status, TriageError, UnifiedRecord,
};
pub use fetch::{fetch_with_retry, AttemptError, Fetch, HttpFetcher, StaticFetcher};
pub use merge::{normalize_path, MatchKey, MergeOutcome, MergeStats, UnifiedCollection};
pub use pipeline::{collect, default_scans, run, RunSummary, Scan, ScanKind};
pub use report::{build_report, Report, ReportCounts, SingleCategory};
pub use snapshot::{read_snapshot, write_snapshot};
pub use sources::{ParseOutcome, SkipReason};
pub use telemetry::init_tracing;
pub use trend::{update_trend, TrendEntry, TrendLog};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
