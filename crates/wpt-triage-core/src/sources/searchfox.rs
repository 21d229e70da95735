//! Gecko metadata via searchfox search result pages.
//!
//! The page embeds its results as a JSON literal on the line after the first
//! `<script>` line: `var results = {...};`.

use serde::Deserialize;

use super::{ParseOutcome, SkipReason};
use crate::domain::{Observation, Result, TriageError};

const META_PREFIX: &str = "testing/web-platform/meta";
const INI_SUFFIX: &str = ".ini";
const BUG_SEPARATOR: &str = " https://";
const DATA_MARKER: &str = "var results = ";

/// How a searchfox scan contributes to the collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanMode {
    Plain,
    /// Only enrich paths already seen; never create records.
    BugOnly,
    /// Replace every occurrence's result text with this value.
    ForcedResult(String),
}

impl ScanMode {
    pub fn bug_only(&self) -> bool {
        matches!(self, ScanMode::BugOnly)
    }
}

#[derive(Debug, Deserialize)]
struct SearchResults {
    #[serde(default)]
    test: TestResults,
}

#[derive(Debug, Default, Deserialize)]
struct TestResults {
    #[serde(rename = "Textual Occurrences", default)]
    textual_occurrences: Vec<Occurrence>,
}

#[derive(Debug, Deserialize)]
struct Occurrence {
    path: String,
    #[serde(default)]
    lines: Vec<OccurrenceLine>,
}

#[derive(Debug, Deserialize)]
struct OccurrenceLine {
    line: String,
}

/// Locate the embedded results literal.
fn data_line(page: &str) -> Option<&str> {
    let mut lines = page.lines();
    lines.find(|l| l.contains("<script>"))?;
    let line = lines.next()?;
    let (_, data) = line.split_once(DATA_MARKER)?;
    let data = data.trim_end();
    Some(data.strip_suffix(';').unwrap_or(data))
}

/// `testing/web-platform/meta/dom/foo.html.ini` -> `/dom/foo.html`.
pub fn metadata_path(path: &str) -> &str {
    let path = path.strip_prefix(META_PREFIX).unwrap_or(path);
    path.strip_suffix(INI_SUFFIX).unwrap_or(path)
}

fn parse_occurrence(occurrence: &Occurrence, mode: &ScanMode) -> ParseOutcome {
    let Some(first) = occurrence.lines.first() else {
        return ParseOutcome::Malformed(format!("{}: occurrence without lines", occurrence.path));
    };

    let (results, bug) = match first.line.split_once(BUG_SEPARATOR) {
        Some((before, after)) => (before, after.split(' ').next()),
        None => (first.line.as_str(), None),
    };

    if results.contains("fission") {
        return ParseOutcome::Skipped(SkipReason::Fission);
    }

    let results = match mode {
        ScanMode::ForcedResult(forced) => forced.as_str(),
        _ => results,
    };

    ParseOutcome::Observation(Observation::new(
        bug.map(str::to_string),
        metadata_path(&occurrence.path),
        Some(results.to_string()),
    ))
}

/// Parse a searchfox result page.
pub fn parse(page: &str, mode: &ScanMode) -> Result<Vec<ParseOutcome>> {
    let data = data_line(page).ok_or_else(|| TriageError::Payload {
        source_name: "searchfox".to_string(),
        reason: "results data line not found".to_string(),
    })?;
    let results: SearchResults = serde_json::from_str(data).map_err(|e| TriageError::Payload {
        source_name: "searchfox".to_string(),
        reason: e.to_string(),
    })?;

    Ok(results
        .test
        .textual_occurrences
        .iter()
        .map(|occ| parse_occurrence(occ, mode))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page(occurrences: serde_json::Value) -> String {
        let data = json!({ "test": { "Textual Occurrences": occurrences } });
        format!(
            "<html>\n<body>\n<script>\nvar results = {};\n</script>\n</body>\n",
            data
        )
    }

    fn occurrence(path: &str, line: &str) -> serde_json::Value {
        json!({ "path": path, "lines": [{ "line": line, "lno": 3 }] })
    }

    #[test]
    fn test_metadata_path() {
        assert_eq!(
            metadata_path("testing/web-platform/meta/dom/foo.html.ini"),
            "/dom/foo.html"
        );
        assert_eq!(metadata_path("other/thing"), "other/thing");
    }

    #[test]
    fn test_splits_result_and_bug() {
        let body = page(json!([occurrence(
            "testing/web-platform/meta/css/a.html.ini",
            "  disabled: https://bugzilla.mozilla.org/show_bug.cgi?id=123 extra"
        )]));
        let outcomes = parse(&body, &ScanMode::Plain).unwrap();
        assert_eq!(
            outcomes,
            vec![ParseOutcome::Observation(Observation::new(
                Some("bugzilla.mozilla.org/show_bug.cgi?id=123".to_string()),
                "/css/a.html",
                Some("  disabled:".to_string()),
            ))]
        );
    }

    #[test]
    fn test_no_bug_when_separator_missing() {
        let body = page(json!([occurrence(
            "testing/web-platform/meta/css/b.html.ini",
            "expected: [PASS, FAIL]"
        )]));
        let obs = parse(&body, &ScanMode::Plain).unwrap()[0]
            .clone()
            .into_observation()
            .unwrap();
        assert_eq!(obs.bug, None);
        assert_eq!(obs.results.as_deref(), Some("expected: [PASS, FAIL]"));
    }

    #[test]
    fn test_fission_occurrences_are_dropped() {
        let body = page(json!([occurrence(
            "testing/web-platform/meta/css/c.html.ini",
            "disabled: if fission: https://bugzilla.mozilla.org/1"
        )]));
        assert_eq!(
            parse(&body, &ScanMode::Plain).unwrap(),
            vec![ParseOutcome::Skipped(SkipReason::Fission)]
        );
    }

    #[test]
    fn test_forced_result_overrides_text() {
        let body = page(json!([occurrence(
            "testing/web-platform/meta/css/d.html.ini",
            "expected: TIMEOUT"
        )]));
        let mode = ScanMode::ForcedResult("[ Timeout ]".to_string());
        let obs = parse(&body, &mode).unwrap()[0]
            .clone()
            .into_observation()
            .unwrap();
        assert_eq!(obs.results.as_deref(), Some("[ Timeout ]"));
    }

    #[test]
    fn test_occurrence_without_lines_is_malformed() {
        let body = page(json!([{ "path": "testing/web-platform/meta/e.html.ini", "lines": [] }]));
        assert!(matches!(
            parse(&body, &ScanMode::Plain).unwrap()[0],
            ParseOutcome::Malformed(_)
        ));
    }

    #[test]
    fn test_missing_data_line_is_payload_error() {
        let err = parse("<html>no script here</html>", &ScanMode::Plain).unwrap_err();
        assert!(matches!(err, TriageError::Payload { .. }));
    }

    #[test]
    fn test_empty_occurrence_list() {
        let body = page(json!([]));
        assert!(parse(&body, &ScanMode::Plain).unwrap().is_empty());
    }
}
