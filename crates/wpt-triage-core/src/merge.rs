//! Path normalisation and cross-source merging.
//!
//! [`UnifiedCollection`] owns every [`UnifiedRecord`] of a run in first-seen
//! order. Merging is a two-step operation: [`UnifiedCollection::matching`]
//! resolves a key to the set of record handles it hits, then the update is
//! applied to each handle.
//!
//! Wildcard entries from the issue tracker (`/css/grid/*`) fan out to every
//! record under the prefix. That fan-out is intentional.

use std::collections::HashMap;

use crate::domain::{Observation, Source, SourceObservation, UnifiedRecord};

/// Canonical form of a source path: always leading-slash-prefixed.
pub fn normalize_path(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

/// How an incoming path selects existing records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchKey {
    Exact(String),
    /// Matches every record whose path starts with the prefix.
    Prefix(String),
}

impl MatchKey {
    /// Derive the key for an already-normalised path.
    pub fn for_path(path: &str, source: Source) -> Self {
        match path.strip_suffix('*') {
            Some(prefix) if source.supports_wildcards() => MatchKey::Prefix(prefix.to_string()),
            _ => MatchKey::Exact(path.to_string()),
        }
    }

    fn hits(&self, candidate: &str) -> bool {
        match self {
            MatchKey::Exact(path) => candidate == path,
            MatchKey::Prefix(prefix) => candidate.starts_with(prefix.as_str()),
        }
    }
}

/// What a single `add_observation` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Folded into this many existing records.
    Merged(usize),
    Created,
    /// Bug-only scan found nothing to enrich.
    Dropped,
}

/// Per-scan merge counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub merged: usize,
    pub created: usize,
    pub dropped: usize,
}

impl MergeStats {
    fn record(&mut self, outcome: MergeOutcome) {
        match outcome {
            MergeOutcome::Merged(n) => self.merged += n,
            MergeOutcome::Created => self.created += 1,
            MergeOutcome::Dropped => self.dropped += 1,
        }
    }
}

/// Insertion-ordered records plus an exact-path index.
#[derive(Debug, Clone, Default)]
pub struct UnifiedCollection {
    records: Vec<UnifiedRecord>,
    by_path: HashMap<String, usize>,
}

impl UnifiedCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[UnifiedRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<UnifiedRecord> {
        self.records
    }

    pub fn get(&self, path: &str) -> Option<&UnifiedRecord> {
        self.by_path.get(path).map(|&i| &self.records[i])
    }

    /// Handles of every record the key selects, in insertion order.
    ///
    /// Exact keys use the index; prefix keys scan the whole collection.
    pub fn matching(&self, key: &MatchKey) -> Vec<usize> {
        match key {
            MatchKey::Exact(path) => self.by_path.get(path).copied().into_iter().collect(),
            MatchKey::Prefix(_) => self
                .records
                .iter()
                .enumerate()
                .filter(|(_, r)| key.hits(&r.path))
                .map(|(i, _)| i)
                .collect(),
        }
    }

    /// Merge one observation from `source`.
    ///
    /// Every matched record absorbs it (see [`SourceObservation::absorb`]
    /// for the same-source rule). With no match, a new record is
    /// appended unless `bug_only` is set. A wildcard path that matches
    /// nothing is stored verbatim, trailing `*` included.
    pub fn add_observation(
        &mut self,
        source: Source,
        observation: &Observation,
        bug_only: bool,
    ) -> MergeOutcome {
        let path = normalize_path(&observation.path);
        let key = MatchKey::for_path(&path, source);
        let handles = self.matching(&key);

        if handles.is_empty() {
            if bug_only {
                return MergeOutcome::Dropped;
            }
            let entry = SourceObservation::new(observation.bug.clone(), observation.results.clone());
            self.by_path.insert(path.clone(), self.records.len());
            self.records.push(UnifiedRecord::new(path, source, entry));
            return MergeOutcome::Created;
        }

        for &handle in &handles {
            let record = &mut self.records[handle];
            match record.per_source.get_mut(&source) {
                Some(existing) => {
                    existing.absorb(observation.bug.as_deref(), observation.results.as_deref())
                }
                None => {
                    record.per_source.insert(
                        source,
                        SourceObservation::new(
                            observation.bug.clone(),
                            observation.results.clone(),
                        ),
                    );
                }
            }
        }
        MergeOutcome::Merged(handles.len())
    }

    /// Merge a batch of observations from one scan, in order.
    pub fn extend_from(
        &mut self,
        source: Source,
        observations: &[Observation],
        bug_only: bool,
    ) -> MergeStats {
        let mut stats = MergeStats::default();
        for observation in observations {
            stats.record(self.add_observation(source, observation, bug_only));
        }
        stats
    }
}
