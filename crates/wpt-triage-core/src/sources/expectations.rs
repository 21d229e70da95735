//! Blink/WebKit `TestExpectations`-style files.
//!
//! ```text
//! crbug.com/123 [ Release ] external/wpt/foo/bar.html [ Slow ]
//! ```

use regex::Regex;

use super::{ParseOutcome, SkipReason};
use crate::domain::Observation;

/// Result tags that carry no reliability signal.
const NOISE_TAGS: [&str; 2] = [" DumpJSConsoleLogInStdErr", "ImageOnly"];

/// Tags of a stable failure rather than a disabled/flaky/slow test.
const STABLE_FAILURES: [&str; 2] = ["[ Failure ]", "[ ]"];

/// Line parser for one expectations file flavour.
#[derive(Debug, Clone)]
pub struct ExpectationsParser {
    marker: String,
    line_re: Regex,
}

impl ExpectationsParser {
    /// `marker` is the directory that roots the WPT import, e.g. `external/wpt/`.
    pub fn new(marker: &str) -> Self {
        let pattern = format!(
            r"^((?:webkit|crbug)[^ ]+)? ?(?:\[ (?:Release|Debug) \] )?{}([^ ]+) (\[.+\])",
            regex::escape(marker)
        );
        Self {
            marker: marker.to_string(),
            line_re: Regex::new(&pattern).expect("expectations pattern is valid"),
        }
    }

    pub fn chromium() -> Self {
        Self::new("external/wpt/")
    }

    pub fn webkit() -> Self {
        Self::new("imported/w3c/web-platform-tests")
    }

    pub fn parse_line(&self, line: &str) -> ParseOutcome {
        if line.starts_with('#') {
            return ParseOutcome::Skipped(SkipReason::Comment);
        }
        if !line.contains(&self.marker) {
            return ParseOutcome::Skipped(SkipReason::NoMarker);
        }
        let Some(caps) = self.line_re.captures(line) else {
            return ParseOutcome::Skipped(SkipReason::NoPattern);
        };

        let mut results = caps[3].to_string();
        for tag in NOISE_TAGS {
            results = results.replace(tag, "");
        }
        if STABLE_FAILURES.contains(&results.as_str()) {
            return ParseOutcome::Skipped(SkipReason::StableFailure);
        }

        ParseOutcome::Observation(Observation::new(
            caps.get(1).map(|m| m.as_str().to_string()),
            &caps[2],
            Some(results),
        ))
    }

    pub fn parse(&self, text: &str) -> Vec<ParseOutcome> {
        text.lines().map(|line| self.parse_line(line)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observation(outcome: ParseOutcome) -> Observation {
        outcome.into_observation().expect("observation")
    }

    #[test]
    fn test_bug_config_path_and_result() {
        let obs = observation(
            ExpectationsParser::chromium()
                .parse_line("crbug.com/123 [ Release ] external/wpt/foo/bar.html [ Slow ]"),
        );
        assert_eq!(
            obs,
            Observation::new(
                Some("crbug.com/123".to_string()),
                "foo/bar.html",
                Some("[ Slow ]".to_string())
            )
        );
    }

    #[test]
    fn test_line_without_bug() {
        let obs = observation(
            ExpectationsParser::chromium().parse_line("external/wpt/a/b.html [ Pass Timeout ]"),
        );
        assert_eq!(obs.bug, None);
        assert_eq!(obs.path, "a/b.html");
        assert_eq!(obs.results.as_deref(), Some("[ Pass Timeout ]"));
    }

    #[test]
    fn test_stable_failure_is_dropped() {
        let parser = ExpectationsParser::chromium();
        assert_eq!(
            parser.parse_line("external/wpt/baz.html [ Failure ]"),
            ParseOutcome::Skipped(SkipReason::StableFailure)
        );
        assert_eq!(
            parser.parse_line("crbug.com/9 external/wpt/baz.html [ Failure DumpJSConsoleLogInStdErr ]"),
            ParseOutcome::Skipped(SkipReason::StableFailure)
        );
    }

    #[test]
    fn test_noise_tags_are_removed() {
        let obs = observation(
            ExpectationsParser::chromium()
                .parse_line("external/wpt/x.html [ Pass Failure DumpJSConsoleLogInStdErr ]"),
        );
        assert_eq!(obs.results.as_deref(), Some("[ Pass Failure ]"));
    }

    #[test]
    fn test_comments_and_unrelated_lines() {
        let parser = ExpectationsParser::chromium();
        assert_eq!(
            parser.parse_line("# crbug.com/1 external/wpt/a.html [ Skip ]"),
            ParseOutcome::Skipped(SkipReason::Comment)
        );
        assert_eq!(
            parser.parse_line("fast/dom/a.html [ Skip ]"),
            ParseOutcome::Skipped(SkipReason::NoMarker)
        );
        assert_eq!(
            parser.parse_line("external/wpt/no-result.html"),
            ParseOutcome::Skipped(SkipReason::NoPattern)
        );
    }

    #[test]
    fn test_webkit_marker_keeps_leading_slash() {
        let obs = observation(ExpectationsParser::webkit().parse_line(
            "webkit.org/b/555 imported/w3c/web-platform-tests/dom/x.html [ Skip ]",
        ));
        assert_eq!(obs.bug.as_deref(), Some("webkit.org/b/555"));
        assert_eq!(obs.path, "/dom/x.html");
    }

    #[test]
    fn test_parse_whole_file() {
        let text = "# header\n\ncrbug.com/1 external/wpt/a.html [ Skip ]\nexternal/wpt/b.html [ Failure ]\n";
        let outcomes = ExpectationsParser::chromium().parse(text);
        let observations: Vec<_> = outcomes
            .into_iter()
            .filter_map(ParseOutcome::into_observation)
            .collect();
        assert_eq!(observations.len(), 1);
        assert_eq!(observations[0].path, "a.html");
    }
}
