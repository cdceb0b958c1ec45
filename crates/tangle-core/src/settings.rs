//! Tool settings loaded from `.tangle.toml`.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default settings file name, looked up in the project root.
pub const SETTINGS_FILE_NAME: &str = ".tangle.toml";

/// Tangle configuration loaded from `.tangle.toml`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TangleSettings {
    /// Graph construction options.
    #[serde(default)]
    pub analysis: AnalysisSettings,

    /// Trace producer and correlation options.
    #[serde(default)]
    pub trace: TraceSettings,

    /// Where artifacts are written.
    #[serde(default)]
    pub output: OutputSettings,
}

/// Inclusion policy for the graph builder.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AnalysisSettings {
    /// Follow references into `node_modules`.
    #[serde(default)]
    pub include_dependency_packages: bool,

    /// Keep ambient declaration files (`.d.ts`) as nodes.
    #[serde(default)]
    pub include_declaration_files: bool,
}

/// External trace producer configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TraceSettings {
    /// Program that writes trace logs.
    #[serde(default = "default_trace_command")]
    pub command: String,

    /// Arguments; the trace directory is appended last.
    #[serde(default = "default_trace_args")]
    pub args: Vec<String>,

    /// Treat a non-zero exit of the trace producer as a warning.
    #[serde(default)]
    pub keep_going: bool,

    /// Extra argument names to try first when attributing events to files.
    #[serde(default)]
    pub path_fields: Vec<String>,
}

impl Default for TraceSettings {
    fn default() -> Self {
        Self {
            command: default_trace_command(),
            args: default_trace_args(),
            keep_going: false,
            path_fields: Vec::new(),
        }
    }
}

/// Artifact output configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputSettings {
    /// Output directory, relative to the project root unless absolute.
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

fn default_trace_command() -> String {
    "npx".to_string()
}

fn default_trace_args() -> Vec<String> {
    vec![
        "tsc".to_string(),
        "--noEmit".to_string(),
        "--generateTrace".to_string(),
    ]
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".tangle")
}

impl TangleSettings {
    /// Loads settings for a project.
    ///
    /// An explicit path must exist. Without one, `<root>/.tangle.toml` is
    /// used when present and defaults otherwise.
    pub fn load(project_root: &Path, explicit: Option<&Path>) -> Result<Self> {
        let settings_path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let path = project_root.join(SETTINGS_FILE_NAME);
                if !path.exists() {
                    return Ok(Self::default());
                }
                path
            }
        };

        let content = std::fs::read_to_string(&settings_path)?;
        let settings: TangleSettings =
            toml::from_str(&content).map_err(|source| Error::Toml {
                file: settings_path.clone(),
                source,
            })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Checks values that deserialize fine but cannot work.
    pub fn validate(&self) -> Result<()> {
        if self.trace.command.trim().is_empty() {
            return Err(Error::InvalidConfig {
                message: "trace.command must not be empty".to_string(),
            });
        }
        if self.trace.path_fields.iter().any(|f| f.trim().is_empty()) {
            return Err(Error::InvalidConfig {
                message: "trace.path_fields must not contain empty names".to_string(),
            });
        }
        Ok(())
    }

    /// Output directory resolved against the project root.
    pub fn output_dir(&self, project_root: &Path) -> PathBuf {
        crate::paths::absolutize(project_root, &self.output.dir)
    }
}
