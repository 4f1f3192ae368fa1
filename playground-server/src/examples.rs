//! Example catalog loaded from a directory at startup.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use playground::core::types::ExampleEntry;
use tracing::{debug, warn};

/// Load one example per regular file in `dir`.
///
/// `name` is the file stem and `value` the file contents. Entries are ordered
/// by name so the catalog is stable across platforms. A missing directory
/// yields an empty catalog.
pub fn load_examples(dir: &Path) -> Result<Vec<ExampleEntry>> {
    if !dir.exists() {
        warn!(dir = %dir.display(), "examples directory not found, serving empty catalog");
        return Ok(Vec::new());
    }

    let mut entries = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("read {}", dir.display()))? {
        let entry = entry.context("read entry")?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let name = match path.file_stem().and_then(|stem| stem.to_str()) {
            Some(name) if !name.starts_with('.') => name.to_string(),
            _ => {
                debug!(path = %path.display(), "skipping example file");
                continue;
            }
        };
        let value =
            fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
        entries.push(ExampleEntry { name, value });
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}
