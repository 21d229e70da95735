//! Source parsers.
//!
//! Each parser turns one raw payload into [`ParseOutcome`]s, one per line or
//! occurrence. Only payloads whose envelope cannot be decoded at all are
//! errors; everything finer-grained is a skip.

pub mod expectations;
pub mod issues;
pub mod searchfox;

use crate::domain::Observation;

/// Result of parsing one line or occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    Observation(Observation),
    /// Irrelevant by rule (comment, fission, stable failure, no marker).
    Skipped(SkipReason),
    /// Looked relevant but did not have the expected shape.
    Malformed(String),
}

impl ParseOutcome {
    pub fn into_observation(self) -> Option<Observation> {
        match self {
            ParseOutcome::Observation(obs) => Some(obs),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Comment,
    NoMarker,
    Fission,
    StableFailure,
    NoPattern,
}

/// Tally of a parsed payload, for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseTally {
    pub observations: usize,
    pub skipped: usize,
    pub malformed: usize,
}

/// Split outcomes into observations, logging what was dropped.
pub fn collect_observations(
    source: &str,
    outcomes: impl IntoIterator<Item = ParseOutcome>,
) -> (Vec<Observation>, ParseTally) {
    let mut tally = ParseTally::default();
    let mut observations = Vec::new();
    for outcome in outcomes {
        match outcome {
            ParseOutcome::Observation(obs) => {
                tally.observations += 1;
                observations.push(obs);
            }
            ParseOutcome::Skipped(reason) => {
                tally.skipped += 1;
                tracing::trace!(source, ?reason, "skipped");
            }
            ParseOutcome::Malformed(detail) => {
                tally.malformed += 1;
                tracing::warn!(source, %detail, "malformed entry dropped");
            }
        }
    }
    (observations, tally)
}
