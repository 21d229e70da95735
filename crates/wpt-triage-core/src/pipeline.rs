//! One full run: fetch every source in order, merge, write artifacts.
//!
//! Fetches and merges are strictly sequential so the collection's
//! first-seen order is deterministic. Nothing is written until every source
//! has been fetched.

use anyhow::{Context, Result};
use tracing::info;

use crate::config::{RetryPolicy, RunConfig, SourceUrls};
use crate::domain::{Observation, Source};
use crate::fetch::{fetch_with_retry, Fetch};
use crate::merge::{MergeStats, UnifiedCollection};
use crate::report::{build_report, ReportCounts};
use crate::snapshot::write_snapshot;
use crate::sources::expectations::ExpectationsParser;
use crate::sources::searchfox::ScanMode;
use crate::sources::{collect_observations, issues, searchfox, ParseOutcome};
use crate::trend::{update_trend, TrendEntry};

/// Payload format of a scan.
#[derive(Debug, Clone)]
pub enum ScanKind {
    Searchfox(ScanMode),
    Expectations(ExpectationsParser),
    Issues,
}

/// One fetch-and-merge step.
#[derive(Debug, Clone)]
pub struct Scan {
    pub source: Source,
    pub url: String,
    pub kind: ScanKind,
}

impl Scan {
    fn bug_only(&self) -> bool {
        matches!(&self.kind, ScanKind::Searchfox(mode) if mode.bug_only())
    }

    fn parse(&self, body: &[u8]) -> crate::domain::Result<Vec<ParseOutcome>> {
        match &self.kind {
            ScanKind::Searchfox(mode) => searchfox::parse(&String::from_utf8_lossy(body), mode),
            ScanKind::Expectations(parser) => Ok(parser.parse(&String::from_utf8_lossy(body))),
            ScanKind::Issues => issues::parse(body),
        }
    }
}

/// The production scan order.
pub fn default_scans(urls: &SourceUrls) -> Vec<Scan> {
    let scan = |source, url: &String, kind| Scan {
        source,
        url: url.clone(),
        kind,
    };
    vec![
        scan(Source::Mozilla, &urls.mozilla_disabled, ScanKind::Searchfox(ScanMode::Plain)),
        scan(Source::Mozilla, &urls.mozilla_bugzilla, ScanKind::Searchfox(ScanMode::BugOnly)),
        scan(
            Source::Mozilla,
            &urls.mozilla_timeout,
            ScanKind::Searchfox(ScanMode::ForcedResult("[ Timeout ]".to_string())),
        ),
        scan(Source::Mozilla, &urls.mozilla_flaky, ScanKind::Searchfox(ScanMode::Plain)),
        scan(
            Source::Chromium,
            &urls.chromium_expectations,
            ScanKind::Expectations(ExpectationsParser::chromium()),
        ),
        scan(
            Source::Chromium,
            &urls.chromium_never_fix,
            ScanKind::Expectations(ExpectationsParser::chromium()),
        ),
        scan(
            Source::Chromium,
            &urls.chromium_slow,
            ScanKind::Expectations(ExpectationsParser::chromium()),
        ),
        scan(
            Source::Webkit,
            &urls.webkit_expectations,
            ScanKind::Expectations(ExpectationsParser::webkit()),
        ),
        scan(Source::WebPlatformTests, &urls.wpt_issues_api, ScanKind::Issues),
    ]
}

/// Fetch and merge every scan into a fresh collection.
pub async fn collect<F>(
    fetcher: &F,
    scans: &[Scan],
    retry: &RetryPolicy,
) -> crate::domain::Result<UnifiedCollection>
where
    F: Fetch + ?Sized,
{
    let mut collection = UnifiedCollection::new();
    for scan in scans {
        let body = fetch_with_retry(fetcher, &scan.url, retry).await?;
        let (observations, tally): (Vec<Observation>, _) =
            collect_observations(scan.source.name(), scan.parse(&body)?);
        let stats: MergeStats = collection.extend_from(scan.source, &observations, scan.bug_only());
        info!(
            source = %scan.source,
            url = %scan.url,
            observations = tally.observations,
            skipped = tally.skipped,
            malformed = tally.malformed,
            merged = stats.merged,
            created = stats.created,
            dropped = stats.dropped,
            "scan merged"
        );
    }
    Ok(collection)
}

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub date: String,
    pub records: usize,
    pub counts: ReportCounts,
}

/// Perform one run dated `today` (`YYYY-MM-DD`).
///
/// Order: snapshot, report, trend. A render failure leaves the snapshot in
/// place and the trend log untouched.
pub async fn run<F>(fetcher: &F, config: &RunConfig, today: &str) -> Result<RunSummary>
where
    F: Fetch + ?Sized,
{
    let scans = default_scans(&config.urls);
    let collection = collect(fetcher, &scans, &config.retry).await?;
    let records = collection.into_records();
    info!(records = records.len(), "collection complete");

    let snapshot_path = config.output.snapshot_json();
    write_snapshot(&snapshot_path, &records)
        .with_context(|| format!("write {:?}", snapshot_path))?;

    let report = build_report(&records, &config.urls, today)?;
    let html_path = config.output.report_html();
    std::fs::write(&html_path, &report.html).with_context(|| format!("write {:?}", html_path))?;

    let trend_path = config.output.trend_csv();
    update_trend(&trend_path, &TrendEntry::new(today, &report.counts))
        .with_context(|| format!("update {:?}", trend_path))?;

    info!(
        date = today,
        in4 = report.counts.in4,
        in3 = report.counts.in3,
        in2 = report.counts.in2,
        in1 = report.counts.in1(),
        "report written"
    );

    Ok(RunSummary {
        date: today.to_string(),
        records: records.len(),
        counts: report.counts,
    })
}
