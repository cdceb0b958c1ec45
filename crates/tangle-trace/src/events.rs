//! Trace-event log parsing.
//!
//! A log is either a bare JSON array of events or an object with a
//! `traceEvents` array. Only `name`, `dur` and `args` are read; other event
//! fields (`ph`, `ts`, `pid`, ...) are ignored.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::Path;
use tangle_core::{Error, Result};
use tracing::{debug, warn};

/// One trace event.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TraceEvent {
    #[serde(default)]
    pub name: String,
    /// Duration in microseconds, when the event carries one.
    #[serde(default)]
    pub dur: Option<Value>,
    /// Free-form argument bag.
    #[serde(default)]
    pub args: Option<Value>,
}

impl TraceEvent {
    /// Numeric, finite, non-negative duration in microseconds.
    pub fn duration_us(&self) -> Option<f64> {
        self.dur
            .as_ref()
            .and_then(Value::as_f64)
            .filter(|d| d.is_finite() && *d >= 0.0)
    }

    pub fn args(&self) -> Option<&Map<String, Value>> {
        self.args.as_ref().and_then(Value::as_object)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TraceLog {
    Events(Vec<Value>),
    Wrapped {
        #[serde(rename = "traceEvents")]
        trace_events: Vec<Value>,
    },
}

/// Reads and parses a trace log.
pub fn read_events(path: &Path) -> Result<Vec<TraceEvent>> {
    let content = std::fs::read_to_string(path)?;
    parse_events(&content).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Parses trace log text.
///
/// A log cut off mid-write (the producer was killed) is an unterminated
/// array, possibly ending inside an event; it is parsed up to the last
/// complete entry. Entries that are not event objects are skipped.
pub fn parse_events(content: &str) -> std::result::Result<Vec<TraceEvent>, serde_json::Error> {
    let log = match serde_json::from_str::<TraceLog>(content) {
        Ok(log) => log,
        Err(err) if err.is_eof() && content.trim_start().starts_with('[') => {
            let entries = complete_entries(content);
            warn!(
                events = entries.len(),
                "trace log was truncated; using the complete events only"
            );
            TraceLog::Events(entries)
        }
        Err(err) => return Err(err),
    };

    let raw = match log {
        TraceLog::Events(events) => events,
        TraceLog::Wrapped { trace_events } => trace_events,
    };
    let total = raw.len();
    let events: Vec<TraceEvent> = raw
        .into_iter()
        .filter_map(|value| serde_json::from_value(value).ok())
        .collect();
    if events.len() < total {
        debug!(skipped = total - events.len(), "skipped malformed trace entries");
    }
    Ok(events)
}

/// Reads the entries of a possibly unterminated JSON array one value at a
/// time, stopping at the first entry that does not parse.
fn complete_entries(content: &str) -> Vec<Value> {
    let Some(mut rest) = content.trim_start().strip_prefix('[') else {
        return Vec::new();
    };
    let mut entries = Vec::new();
    loop {
        rest = rest.trim_start();
        if rest.is_empty() || rest.starts_with(']') {
            break;
        }
        let mut stream = serde_json::Deserializer::from_str(rest).into_iter::<Value>();
        match stream.next() {
            Some(Ok(value)) => entries.push(value),
            _ => break,
        }
        rest = rest[stream.byte_offset()..].trim_start();
        match rest.strip_prefix(',') {
            Some(next) => rest = next,
            None => break,
        }
    }
    entries
}
