//! Coarse status categories derived from raw result strings.

use serde::{Deserialize, Serialize};

/// Category of a source observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Disabled,
    Slow,
    Flaky,
    /// No result text; the source only asserts the test is known.
    Absent,
}

impl Status {
    pub const fn label(self) -> &'static str {
        match self {
            Status::Disabled => "disabled",
            Status::Slow => "slow",
            Status::Flaky => "flaky",
            Status::Absent => "absent",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Map a raw result string to a [`Status`].
///
/// The `disabled` check runs before the exact slow tags, and anything else
/// non-empty is flaky.
pub fn classify(results: Option<&str>) -> Status {
    let Some(results) = results.filter(|r| !r.is_empty()) else {
        return Status::Absent;
    };

    if results.contains("disabled") || results == "[ Skip ]" || results == "[ WontFix ]" {
        Status::Disabled
    } else if results == "[ Slow ]" || results == "[ Timeout ]" {
        Status::Slow
    } else {
        Status::Flaky
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_absent() {
        assert_eq!(classify(None), Status::Absent);
        assert_eq!(classify(Some("")), Status::Absent);
    }

    #[test]
    fn test_classify_disabled() {
        assert_eq!(classify(Some("[ Skip ]")), Status::Disabled);
        assert_eq!(classify(Some("[ WontFix ]")), Status::Disabled);
        assert_eq!(classify(Some("  disabled: if debug")), Status::Disabled);
    }

    #[test]
    fn test_classify_disabled_wins_over_slow() {
        assert_eq!(classify(Some("disabled [ Slow ]")), Status::Disabled);
    }

    #[test]
    fn test_classify_slow() {
        assert_eq!(classify(Some("[ Slow ]")), Status::Slow);
        assert_eq!(classify(Some("[ Timeout ]")), Status::Slow);
    }

    #[test]
    fn test_classify_everything_else_is_flaky() {
        assert_eq!(classify(Some("anything else")), Status::Flaky);
        assert_eq!(classify(Some("[ Pass Failure ]")), Status::Flaky);
        // Accumulated tags no longer equal a single slow tag.
        assert_eq!(classify(Some("[ Slow ] [ Timeout ]")), Status::Flaky);
    }
}
