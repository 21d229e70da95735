//! WPT issue tracker search results.
//!
//! Only titles shaped like `/path is flaky ...` are recognised. Only the
//! first page of search results is read.

use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;

use super::{ParseOutcome, SkipReason};
use crate::domain::{Observation, Result, TriageError};

#[derive(Debug, Clone, Deserialize)]
pub struct Issue {
    pub title: String,
    pub html_url: String,
}

#[derive(Debug, Deserialize)]
struct SearchPage {
    #[serde(default)]
    items: Vec<Issue>,
}

fn title_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(/[^ ]+) (?:is|are) (?:disabled|flaky|slow)").expect("title pattern is valid")
    })
}

pub fn parse_issue(issue: &Issue) -> ParseOutcome {
    let Some(caps) = title_re().captures(&issue.title) else {
        return ParseOutcome::Skipped(SkipReason::NoPattern);
    };
    let bug = issue
        .html_url
        .strip_prefix("https://")
        .unwrap_or(&issue.html_url);
    ParseOutcome::Observation(Observation::new(Some(bug.to_string()), &caps[1], None))
}

/// Parse a GitHub issue search response body.
pub fn parse(body: &[u8]) -> Result<Vec<ParseOutcome>> {
    let page: SearchPage = serde_json::from_slice(body).map_err(|e| TriageError::Payload {
        source_name: "web-platform-tests".to_string(),
        reason: e.to_string(),
    })?;
    Ok(page.items.iter().map(parse_issue).collect())
}
