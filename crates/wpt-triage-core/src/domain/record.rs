//! Unified per-path records and the observations that feed them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::source::Source;
use super::status::{classify, Status};

/// One parsed line or occurrence from a source, before merging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub bug: Option<String>,
    /// Path as the source spells it; may lack the leading slash.
    pub path: String,
    pub results: Option<String>,
}

impl Observation {
    pub fn new(bug: Option<String>, path: impl Into<String>, results: Option<String>) -> Self {
        Self {
            bug,
            path: path.into(),
            results,
        }
    }
}

/// What one source says about one path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceObservation {
    pub bug: Option<String>,
    pub results: Option<String>,
    pub status: Status,
}

impl SourceObservation {
    pub fn new(bug: Option<String>, results: Option<String>) -> Self {
        let status = classify(results.as_deref());
        Self {
            bug,
            results,
            status,
        }
    }

    /// Fold a later observation from the same source into this one.
    ///
    /// Without a bug yet, the bug is filled in and results are space-joined;
    /// the status computed at first observation is kept. Once a bug is
    /// known, the later observation replaces this one wholesale.
    pub fn absorb(&mut self, bug: Option<&str>, results: Option<&str>) {
        if self.bug.is_some() {
            *self = SourceObservation::new(bug.map(str::to_string), results.map(str::to_string));
            return;
        }
        self.bug = bug.map(str::to_string);
        self.results = match (self.results.take(), results) {
            (Some(existing), Some(more)) => Some(format!("{existing} {more}")),
            (existing, more) => existing.or_else(|| more.map(str::to_string)),
        };
    }
}

/// Cross-source status of one test path.
///
/// Serializes as `{"path": ..., "<source>": {bug, results, status}, ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnifiedRecord {
    pub path: String,
    #[serde(flatten)]
    pub per_source: BTreeMap<Source, SourceObservation>,
}

impl UnifiedRecord {
    pub fn new(path: impl Into<String>, source: Source, observation: SourceObservation) -> Self {
        let mut per_source = BTreeMap::new();
        per_source.insert(source, observation);
        Self {
            path: path.into(),
            per_source,
        }
    }

    pub fn get(&self, source: Source) -> Option<&SourceObservation> {
        self.per_source.get(&source)
    }

    pub fn has(&self, source: Source) -> bool {
        self.per_source.contains_key(&source)
    }

    /// Engines that reported this path, in display priority.
    pub fn engines(&self) -> Vec<Source> {
        Source::ENGINES
            .iter()
            .copied()
            .filter(|s| self.has(*s))
            .collect()
    }
}
