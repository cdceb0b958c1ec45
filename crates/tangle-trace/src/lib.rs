//! Tangle Trace - per-file latency from trace-event logs.
//!
//! Reads the trace log a type checker (or any tool emitting the common
//! trace-event format) wrote to a directory, attributes each timed event to
//! a source file, and produces a [`tangle_core::LatencySummary`] that
//! [`tangle_core::build_dataset`] merges onto the dependency graph.
//!
//! # Example
//!
//! ```no_run
//! use tangle_trace::{Attributor, LatencyCorrelator};
//! use std::path::Path;
//!
//! let correlator = LatencyCorrelator::new("/repo", Attributor::default());
//! let summary = correlator.correlate_dir(Path::new("/repo/.tangle/trace"))?;
//! for (file, ms) in &summary.per_file_ms {
//!     println!("{ms:>10.1} ms  {file}");
//! }
//! # Ok::<(), tangle_core::Error>(())
//! ```

pub mod attribution;
pub mod correlator;
pub mod events;
pub mod runner;
pub mod select;

pub use attribution::{AnyValueRule, Attributor, FieldPriorityRule, PathRule};
pub use correlator::LatencyCorrelator;
pub use events::{parse_events, read_events, TraceEvent};
pub use runner::{default_trace_dir, TraceRunner};
pub use select::{select_trace_file, TraceSelection, CANONICAL_TRACE_FILE};
