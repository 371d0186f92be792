// Latest dated file discovery

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;

/// Find the newest dated file in `dir` whose name matches `pattern`.
///
/// The pattern must contain one capture group holding the date stamp
/// (e.g. `^instrument-list-(\d{8})\.csv$`); the lexicographically greatest
/// stamp wins. A missing directory or no matching file is `Ok(None)`;
/// whether that is fatal is the caller's call.
pub fn latest_dated_file(dir: &Path, pattern: &str) -> Result<Option<PathBuf>, String> {
    let regex =
        Regex::new(pattern).map_err(|e| format!("invalid filename pattern {pattern:?}: {e}"))?;

    if !dir.exists() {
        return Ok(None);
    }

    let entries = fs::read_dir(dir).map_err(|e| format!("cannot read {}: {e}", dir.display()))?;

    let mut stamped: Vec<(String, String)> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| format!("cannot read {}: {e}", dir.display()))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if let Some(stamp) = regex.captures(&name).and_then(|c| c.get(1)) {
            stamped.push((stamp.as_str().to_string(), name));
        }
    }

    stamped.sort();
    Ok(stamped.pop().map(|(_, name)| dir.join(name)))
}
