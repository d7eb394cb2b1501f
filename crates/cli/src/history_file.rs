//! Loading a parent's success history from a JSON file.

use std::path::Path;

use anyhow::{Context, Result};

use cyclic_dependency::History;

/// Read a JSON array of success records.
///
/// Records whose schedule times collide at whole-second precision collapse
/// to the first one read.
pub fn load(path: &Path) -> Result<History> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read history file {}", path.display()))?;
    let history: History = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse history file {}", path.display()))?;
    tracing::debug!(path = %path.display(), records = history.len(), "loaded history");
    Ok(history)
}
