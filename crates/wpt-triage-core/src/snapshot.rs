//! `common.json`: the full unified collection, rewritten every run.

use std::path::Path;

use crate::domain::{Result, UnifiedRecord};

/// Write the snapshot as a JSON array of records.
pub fn write_snapshot(path: &Path, records: &[UnifiedRecord]) -> Result<()> {
    let content = serde_json::to_string(records)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Read a snapshot written by [`write_snapshot`].
pub fn read_snapshot(path: &Path) -> Result<Vec<UnifiedRecord>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
