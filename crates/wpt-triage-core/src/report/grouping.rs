//! Bucketing records by cross-engine agreement and single-engine category.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::{Result, Source, TriageError, UnifiedRecord};

/// Category of a record seen by exactly one source.
///
/// Unlike [`crate::domain::Status`], timeouts are kept apart from slow tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SingleCategory {
    Flaky,
    Slow,
    Timeout,
    Disabled,
}

/// Sources counted for a record: the engines that reported it, or the issue
/// tracker alone when no engine did.
pub fn products(record: &UnifiedRecord) -> Vec<Source> {
    let engines = record.engines();
    if engines.is_empty() && record.has(Source::WebPlatformTests) {
        vec![Source::WebPlatformTests]
    } else {
        engines
    }
}

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(\[ (Slow|Timeout|Skip|WontFix) \]|disabled)").expect("tag pattern is valid")
    })
}

/// Map a known tag to its category.
fn category_for_tag(tag: &str) -> Option<SingleCategory> {
    match tag {
        "[ Slow ]" => Some(SingleCategory::Slow),
        "[ Timeout ]" => Some(SingleCategory::Timeout),
        "disabled" | "[ Skip ]" | "[ WontFix ]" => Some(SingleCategory::Disabled),
        _ => None,
    }
}

/// Categorise a record reported by exactly `source`.
///
/// The first recognised tag in the results decides; no tag means flaky. An
/// engine entry without any results text cannot be categorised and is an
/// [`TriageError::InconsistentClassification`].
pub fn single_category(record: &UnifiedRecord, source: Source) -> Result<SingleCategory> {
    let inconsistent = |results: Option<&str>| TriageError::InconsistentClassification {
        path: record.path.clone(),
        results: results.map(str::to_string),
    };

    let results = record.get(source).and_then(|o| o.results.as_deref());
    let Some(results) = results else {
        return if source == Source::WebPlatformTests {
            Ok(SingleCategory::Flaky)
        } else {
            Err(inconsistent(None))
        };
    };

    match tag_re().find(results) {
        None => Ok(SingleCategory::Flaky),
        Some(m) => category_for_tag(m.as_str()).ok_or_else(|| inconsistent(Some(results))),
    }
}

/// Aggregate counts for one run; also the trend row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportCounts {
    pub in4: usize,
    pub in3: usize,
    pub in2: usize,
    pub flaky: usize,
    pub slow: usize,
    pub timeout: usize,
    pub disabled: usize,
}

impl ReportCounts {
    /// Records seen by a single source.
    pub fn in1(&self) -> usize {
        self.flaky + self.slow + self.timeout + self.disabled
    }

    /// Trend row order: in4, in3, in2, flaky, slow, timeout, disabled.
    pub fn as_row(&self) -> [usize; 7] {
        [
            self.in4,
            self.in3,
            self.in2,
            self.flaky,
            self.slow,
            self.timeout,
            self.disabled,
        ]
    }
}

/// Records bucketed for the report, each bucket in collection order.
#[derive(Debug, Default)]
pub struct Grouped<'a> {
    pub in4: Vec<&'a UnifiedRecord>,
    pub in3: Vec<&'a UnifiedRecord>,
    pub in2: Vec<&'a UnifiedRecord>,
    pub flaky: Vec<&'a UnifiedRecord>,
    pub slow: Vec<&'a UnifiedRecord>,
    pub timeout: Vec<&'a UnifiedRecord>,
    pub disabled: Vec<&'a UnifiedRecord>,
}

impl<'a> Grouped<'a> {
    pub fn counts(&self) -> ReportCounts {
        ReportCounts {
            in4: self.in4.len(),
            in3: self.in3.len(),
            in2: self.in2.len(),
            flaky: self.flaky.len(),
            slow: self.slow.len(),
            timeout: self.timeout.len(),
            disabled: self.disabled.len(),
        }
    }
}

/// Bucket every record. Fails on the first inconsistent single-source record.
pub fn group(records: &[UnifiedRecord]) -> Result<Grouped<'_>> {
    let mut grouped = Grouped::default();
    for record in records {
        let products = products(record);
        match products.as_slice() {
            [] => {}
            [only] => match single_category(record, *only)? {
                SingleCategory::Flaky => grouped.flaky.push(record),
                SingleCategory::Slow => grouped.slow.push(record),
                SingleCategory::Timeout => grouped.timeout.push(record),
                SingleCategory::Disabled => grouped.disabled.push(record),
            },
            [_, _] => grouped.in2.push(record),
            [_, _, _] => grouped.in3.push(record),
            _ => grouped.in4.push(record),
        }
    }
    Ok(grouped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SourceObservation;

    fn record(path: &str, entries: &[(Source, Option<&str>)]) -> UnifiedRecord {
        let mut iter = entries.iter();
        let (first, results) = iter.next().expect("at least one source");
        let mut r = UnifiedRecord::new(
            path,
            *first,
            SourceObservation::new(None, results.map(str::to_string)),
        );
        for (source, results) in iter {
            r.per_source
                .insert(*source, SourceObservation::new(None, results.map(str::to_string)));
        }
        r
    }

    #[test]
    fn test_products_exclude_issue_tracker_unless_alone() {
        let both = record(
            "/a.html",
            &[(Source::Chromium, Some("[ Skip ]")), (Source::WebPlatformTests, None)],
        );
        assert_eq!(products(&both), vec![Source::Chromium]);

        let alone = record("/b.html", &[(Source::WebPlatformTests, None)]);
        assert_eq!(products(&alone), vec![Source::WebPlatformTests]);
    }

    #[test]
    fn test_single_category_tags() {
        let cases = [
            ("[ Slow ]", SingleCategory::Slow),
            ("[ Timeout ]", SingleCategory::Timeout),
            ("[ Skip ]", SingleCategory::Disabled),
            ("[ WontFix ]", SingleCategory::Disabled),
            ("  disabled: if os == 'win'", SingleCategory::Disabled),
            ("[ Pass Failure ]", SingleCategory::Flaky),
            ("", SingleCategory::Flaky),
        ];
        for (results, expected) in cases {
            let r = record("/a.html", &[(Source::Chromium, Some(results))]);
            assert_eq!(single_category(&r, Source::Chromium).unwrap(), expected, "{results}");
        }
    }

    #[test]
    fn test_first_tag_wins() {
        let r = record("/a.html", &[(Source::Chromium, Some("[ Timeout ] [ Slow ]"))]);
        assert_eq!(
            single_category(&r, Source::Chromium).unwrap(),
            SingleCategory::Timeout
        );
    }

    #[test]
    fn test_issue_tracker_only_is_flaky() {
        let r = record("/a.html", &[(Source::WebPlatformTests, None)]);
        assert_eq!(
            single_category(&r, Source::WebPlatformTests).unwrap(),
            SingleCategory::Flaky
        );
    }

    #[test]
    fn test_engine_without_results_is_inconsistent() {
        let r = record("/a.html", &[(Source::Webkit, None)]);
        let err = group(std::slice::from_ref(&r)).unwrap_err();
        match err {
            TriageError::InconsistentClassification { path, results } => {
                assert_eq!(path, "/a.html");
                assert_eq!(results, None);
            }
            other => panic!("expected InconsistentClassification, got {:?}", other),
        }
    }

    #[test]
    fn test_two_engines_land_in_found_in_two() {
        let records = vec![
            record(
                "/a.html",
                &[(Source::Mozilla, Some("disabled:")), (Source::Chromium, Some("[ Slow ]"))],
            ),
            record("/b.html", &[(Source::Chromium, Some("[ Slow ]"))]),
        ];
        let grouped = group(&records).unwrap();
        assert_eq!(grouped.in2.len(), 1);
        assert_eq!(grouped.in2[0].path, "/a.html");
        assert_eq!(grouped.slow.len(), 1);
        assert_eq!(grouped.counts().in1(), 1);
    }

    #[test]
    fn test_counts_row_order() {
        let records = vec![
            record(
                "/a.html",
                &[
                    (Source::Mozilla, Some("disabled:")),
                    (Source::Chromium, Some("[ Skip ]")),
                    (Source::Webkit, Some("[ Skip ]")),
                ],
            ),
            record("/b.html", &[(Source::Webkit, Some("[ Pass Failure ]"))]),
            record("/c.html", &[(Source::Chromium, Some("[ Timeout ]"))]),
            record("/d.html", &[(Source::Mozilla, Some("disabled:"))]),
        ];
        let counts = group(&records).unwrap().counts();
        assert_eq!(counts.as_row(), [0, 1, 0, 1, 0, 1, 1]);
    }
}
