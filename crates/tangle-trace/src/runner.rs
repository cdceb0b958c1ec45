//! Invocation of the external trace producer.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tangle_core::settings::TraceSettings;
use tangle_core::{Error, Result};
use tracing::{info, warn};

/// Runs `<command> <args...> <trace dir>` in the project root.
#[derive(Debug, Clone)]
pub struct TraceRunner {
    command: String,
    args: Vec<String>,
    keep_going: bool,
}

impl TraceRunner {
    pub fn new(command: impl Into<String>, args: Vec<String>, keep_going: bool) -> Self {
        Self {
            command: command.into(),
            args,
            keep_going,
        }
    }

    pub fn from_settings(settings: &TraceSettings) -> Self {
        Self::new(settings.command.clone(), settings.args.clone(), settings.keep_going)
    }

    pub fn keep_going(mut self, keep_going: bool) -> Self {
        self.keep_going = keep_going;
        self
    }

    fn command_line(&self, trace_dir: &Path) -> String {
        let mut parts = vec![self.command.clone()];
        parts.extend(self.args.iter().cloned());
        parts.push(trace_dir.display().to_string());
        parts.join(" ")
    }

    /// Runs the producer, creating `trace_dir` first.
    ///
    /// The child's stdout is sent to stderr so this process's stdout stays
    /// machine-readable. A non-zero exit is an error unless `keep_going` is
    /// set, in which case it is logged and whatever trace was written is used.
    pub fn run(&self, project_root: &Path, trace_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(trace_dir)?;
        let command_line = self.command_line(trace_dir);
        info!(command = %command_line, "running trace producer");

        let status = Command::new(&self.command)
            .args(&self.args)
            .arg(trace_dir)
            .current_dir(project_root)
            .stdin(Stdio::null())
            .stdout(std::io::stderr())
            .status()
            .map_err(|e| Error::TraceTool {
                message: format!("failed to start `{}`: {e}", self.command),
            })?;

        if status.success() {
            return Ok(());
        }
        let message = format!("`{command_line}` exited with {status}");
        if self.keep_going {
            warn!("{message}; continuing with the trace written so far");
            Ok(())
        } else {
            Err(Error::TraceTool { message })
        }
    }
}

/// Default trace directory under an output directory.
pub fn default_trace_dir(output_dir: &Path) -> PathBuf {
    output_dir.join("trace")
}
