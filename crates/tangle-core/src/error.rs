//! Error types for Tangle core.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for Tangle operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal errors. Each one aborts the current step before any artifact is written.
///
/// Unresolvable references and traces with no attributable events are not
/// errors: the former are dropped edges, the latter become a note in the
/// latency summary.
#[derive(Debug, Error)]
pub enum Error {
    /// No project configuration could be located.
    #[error("No project configuration found (searched from {searched})")]
    ConfigurationNotFound {
        /// Directory the search started from, or the explicit path that was missing.
        searched: PathBuf,
    },

    /// The project configuration exists but could not be parsed.
    #[error("Failed to parse project configuration {path}:\n{}", diagnostics.join("\n"))]
    ConfigurationParse {
        /// Configuration file that failed.
        path: PathBuf,
        /// Diagnostic text, one entry per problem.
        diagnostics: Vec<String>,
    },

    /// A source file could not be parsed at all.
    #[error("Failed to parse {path}: {message}")]
    SourceParse {
        /// Source file that failed.
        path: PathBuf,
        /// Parser summary.
        message: String,
    },

    /// No trace log was found in the trace directory.
    #[error("No trace file found in {dir}")]
    TraceFileMissing {
        /// Directory that was searched.
        dir: PathBuf,
    },

    /// The external trace producer failed.
    #[error("Trace tool failed: {message}")]
    TraceTool {
        /// What went wrong.
        message: String,
    },

    /// A JSON artifact or trace log could not be read.
    #[error("JSON parse error in {path}: {source}")]
    Json {
        /// File being read.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// TOML parsing error in `.tangle.toml`.
    #[error("TOML parse error in {file}: {source}")]
    Toml {
        /// Path to the TOML file with the error.
        file: PathBuf,
        /// The underlying TOML parsing error.
        #[source]
        source: toml::de::Error,
    },

    /// Settings are well-formed TOML but semantically invalid.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the configuration error.
        message: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for the configuration failures that make the whole run unrecoverable.
    pub fn is_configuration_failure(&self) -> bool {
        matches!(
            self,
            Error::ConfigurationNotFound { .. } | Error::ConfigurationParse { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_joins_diagnostics_with_newlines() {
        let err = Error::ConfigurationParse {
            path: PathBuf::from("tsconfig.json"),
            diagnostics: vec!["first".into(), "second".into()],
        };
        let message = err.to_string();
        assert!(message.ends_with("first\nsecond"));
        assert!(err.is_configuration_failure());
    }

    #[test]
    fn test_trace_errors_are_not_configuration_failures() {
        let err = Error::TraceFileMissing {
            dir: PathBuf::from("trace"),
        };
        assert!(!err.is_configuration_failure());
    }
}
