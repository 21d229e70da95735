//! Run configuration: upstream URLs, retry policy, output locations.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

const SEARCHFOX: &str = "https://searchfox.org/mozilla-central/search";
const CHROMIUM_WEB_TESTS: &str =
    "https://raw.githubusercontent.com/chromium/chromium/master/third_party/blink/web_tests";
const FLAKY_ISSUE_QUERY: &str = "q=is%3Aissue+label%3Aflaky";

/// Upstream locations of every source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceUrls {
    pub mozilla_disabled: String,
    pub mozilla_bugzilla: String,
    pub mozilla_timeout: String,
    pub mozilla_flaky: String,
    pub chromium_expectations: String,
    pub chromium_never_fix: String,
    pub chromium_slow: String,
    pub webkit_expectations: String,
    pub wpt_issues_api: String,
    /// Human-facing issue list, linked from the report header.
    pub wpt_issues_html: String,
}

impl Default for SourceUrls {
    fn default() -> Self {
        Self {
            mozilla_disabled: format!(
                "{SEARCHFOX}?q=disabled%3A&case=true&regexp=false&path=testing%2Fweb-platform%2Fmeta"
            ),
            mozilla_bugzilla: format!(
                "{SEARCHFOX}?q=bugzilla&case=true&path=testing%2Fweb-platform%2Fmeta"
            ),
            mozilla_timeout: format!(
                "{SEARCHFOX}?q=%5C%5BTIMEOUT%2C+OK%5C%5D%7C%5C%5BOK%2C+TIMEOUT%5C%5D%7C%3A+TIMEOUT&path=testing%2Fweb-platform%2Fmeta&case=true&regexp=true"
            ),
            mozilla_flaky: format!(
                "{SEARCHFOX}?q=%5C%5B%28PASS%7CFAIL%2C+PASS%29&path=testing%2Fweb-platform%2Fmeta&case=true&regexp=true"
            ),
            chromium_expectations: format!("{CHROMIUM_WEB_TESTS}/TestExpectations"),
            chromium_never_fix: format!("{CHROMIUM_WEB_TESTS}/NeverFixTests"),
            chromium_slow: format!("{CHROMIUM_WEB_TESTS}/SlowTests"),
            webkit_expectations:
                "https://raw.githubusercontent.com/WebKit/webkit/master/LayoutTests/TestExpectations"
                    .to_string(),
            wpt_issues_api: format!(
                "https://api.github.com/search/issues?{FLAKY_ISSUE_QUERY}+repo%3Aweb-platform-tests/wpt"
            ),
            wpt_issues_html: format!(
                "https://github.com/web-platform-tests/wpt/issues?utf8=%E2%9C%93&{FLAKY_ISSUE_QUERY}"
            ),
        }
    }
}

/// Bounded retry with geometric backoff between attempts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            initial_delay_ms: 1_000,
            multiplier: 3,
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after the given failed attempt (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = u64::from(self.multiplier).saturating_pow(attempt.saturating_sub(1));
        Duration::from_millis(self.initial_delay_ms.saturating_mul(factor))
    }
}

/// Where a run writes its artifacts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputPaths {
    pub out_dir: PathBuf,
}

impl Default for OutputPaths {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("."),
        }
    }
}

impl OutputPaths {
    pub fn new(out_dir: impl AsRef<Path>) -> Self {
        Self {
            out_dir: out_dir.as_ref().to_path_buf(),
        }
    }

    pub fn report_html(&self) -> PathBuf {
        self.out_dir.join("index.html")
    }

    pub fn snapshot_json(&self) -> PathBuf {
        self.out_dir.join("common.json")
    }

    pub fn trend_csv(&self) -> PathBuf {
        self.out_dir.join("data.csv")
    }
}

/// Everything one run needs.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RunConfig {
    pub urls: SourceUrls,
    pub retry: RetryPolicy,
    pub output: OutputPaths,
}
