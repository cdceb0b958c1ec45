//! Trace log to [`LatencySummary`].

use crate::attribution::Attributor;
use crate::events::{read_events, TraceEvent};
use crate::select::select_trace_file;
use chrono::Utc;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tangle_core::paths::{absolutize, display_path};
use tangle_core::settings::TraceSettings;
use tangle_core::{LatencySummary, Result, ARTIFACT_VERSION};
use tracing::{debug, info};

const MICROS_PER_MILLI: f64 = 1000.0;

/// Aggregates event durations per source file.
#[derive(Debug)]
pub struct LatencyCorrelator {
    root: PathBuf,
    attributor: Attributor,
}

impl LatencyCorrelator {
    /// `root` anchors relative paths found in the trace.
    pub fn new(root: impl Into<PathBuf>, attributor: Attributor) -> Self {
        Self {
            root: root.into(),
            attributor,
        }
    }

    pub fn from_settings(root: impl Into<PathBuf>, settings: &TraceSettings) -> Self {
        Self::new(root, Attributor::with_fields(&settings.path_fields))
    }

    /// Selects the trace log in `trace_dir` and summarizes it.
    ///
    /// # Errors
    ///
    /// `TraceFileMissing` when the directory holds no trace log, `Json` when
    /// the chosen log is not a trace.
    pub fn correlate_dir(&self, trace_dir: &Path) -> Result<LatencySummary> {
        let selection = select_trace_file(trace_dir)?;
        let events = read_events(&selection.path)?;
        let mut summary = self.summarize(trace_dir, &events);
        if selection.candidates > 1 {
            let name = selection
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            summary.notes.push(format!(
                "Used {name}, the largest of {} numbered trace files.",
                selection.candidates
            ));
        }
        Ok(summary)
    }

    /// Summarizes already-parsed events.
    pub fn summarize(&self, trace_dir: &Path, events: &[TraceEvent]) -> LatencySummary {
        let mut per_file_ms: BTreeMap<String, f64> = BTreeMap::new();
        let mut per_file_breakdown_ms: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();
        let mut timed = 0usize;
        let mut attributed = 0usize;

        for event in events {
            let Some(duration_us) = event.duration_us() else {
                continue;
            };
            timed += 1;
            let Some(raw_path) = event.args().and_then(|args| self.attributor.attribute(args))
            else {
                continue;
            };
            attributed += 1;

            let key = display_path(&absolutize(&self.root, Path::new(&raw_path)));
            let ms = duration_us / MICROS_PER_MILLI;
            *per_file_ms.entry(key.clone()).or_insert(0.0) += ms;
            let name = if event.name.is_empty() {
                "(unnamed)".to_string()
            } else {
                event.name.clone()
            };
            *per_file_breakdown_ms
                .entry(key)
                .or_default()
                .entry(name)
                .or_insert(0.0) += ms;
        }

        let mut notes = Vec::new();
        if attributed == 0 {
            notes.push(format!(
                "No trace events could be attributed to source files ({timed} of {} events carried a duration).",
                events.len()
            ));
        }

        debug!(events = events.len(), timed, attributed, "correlated trace events");
        info!(files = per_file_ms.len(), "latency summary ready");

        LatencySummary {
            version: ARTIFACT_VERSION,
            generated_at: Utc::now(),
            root_path: self.root.clone(),
            trace_dir_path: trace_dir.to_path_buf(),
            per_file_ms,
            per_file_breakdown_ms,
            notes,
        }
    }
}
