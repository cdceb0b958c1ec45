//! Trace file selection.

use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tangle_core::{Error, Result};
use tracing::debug;

/// Name of the single trace log written for a non-build-mode compile.
pub const CANONICAL_TRACE_FILE: &str = "trace.json";

/// The trace log chosen from a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceSelection {
    pub path: PathBuf,
    /// Numbered trace files that were considered; 0 for the canonical file.
    pub candidates: usize,
}

fn is_numbered_trace(name: &str) -> bool {
    static PATTERN: LazyLock<Option<Regex>> =
        LazyLock::new(|| Regex::new(r"^trace\.\d+\.json$").ok());
    PATTERN.as_ref().is_some_and(|re| re.is_match(name))
}

/// Picks the trace log to correlate.
///
/// `trace.json` wins when present. Otherwise the largest `trace.<n>.json`
/// is taken, on the grounds that the biggest partial trace covers the most
/// of the project. Size ties go to the lexicographically last name.
pub fn select_trace_file(dir: &Path) -> Result<TraceSelection> {
    let canonical = dir.join(CANONICAL_TRACE_FILE);
    if canonical.is_file() {
        return Ok(TraceSelection {
            path: canonical,
            candidates: 0,
        });
    }

    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => {
            return Err(Error::TraceFileMissing {
                dir: dir.to_path_buf(),
            })
        }
    };

    let mut numbered: Vec<(u64, String, PathBuf)> = Vec::new();
    for entry in entries.filter_map(|e| e.ok()) {
        let name = entry.file_name().to_string_lossy().into_owned();
        if !is_numbered_trace(&name) {
            continue;
        }
        let Ok(metadata) = entry.metadata() else {
            continue;
        };
        if metadata.is_file() {
            numbered.push((metadata.len(), name, entry.path()));
        }
    }

    let candidates = numbered.len();
    let chosen = numbered.into_iter().max_by(|a, b| (a.0, &a.1).cmp(&(b.0, &b.1)));
    match chosen {
        Some((size, name, path)) => {
            debug!(file = %name, size, candidates, "selected numbered trace file");
            Ok(TraceSelection { path, candidates })
        }
        None => Err(Error::TraceFileMissing {
            dir: dir.to_path_buf(),
        }),
    }
}
