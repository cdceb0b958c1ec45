//! Per-invocation project context shared by all commands.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tangle_core::paths::absolutize;
use tangle_core::TangleSettings;
use tangle_trace::default_trace_dir;

pub const GRAPH_FILE: &str = "graph.json";
pub const LATENCY_FILE: &str = "latency.json";
pub const DATASET_FILE: &str = "dataset.json";

/// Project root, tool settings and the resolved output directory.
#[derive(Debug, Clone)]
pub struct ProjectContext {
    pub root: PathBuf,
    pub settings: TangleSettings,
    pub output_dir: PathBuf,
}

impl ProjectContext {
    /// Resolves the root and loads `.tangle.toml`.
    ///
    /// `out_dir` overrides `[output] dir`. Relative paths given on the command
    /// line are taken relative to the working directory.
    pub fn load(root: &Path, settings_path: Option<&Path>, out_dir: Option<&Path>) -> Result<Self> {
        let root = root
            .canonicalize()
            .with_context(|| format!("Project root {} is not accessible", root.display()))?;
        let settings_path = settings_path.map(cli_path).transpose()?;
        let settings = TangleSettings::load(&root, settings_path.as_deref())
            .context("Failed to load tangle settings")?;
        let output_dir = match out_dir {
            Some(dir) => cli_path(dir)?,
            None => settings.output_dir(&root),
        };

        Ok(Self {
            root,
            settings,
            output_dir,
        })
    }

    pub fn graph_path(&self) -> PathBuf {
        self.output_dir.join(GRAPH_FILE)
    }

    pub fn latency_path(&self) -> PathBuf {
        self.output_dir.join(LATENCY_FILE)
    }

    pub fn dataset_path(&self) -> PathBuf {
        self.output_dir.join(DATASET_FILE)
    }

    pub fn trace_dir(&self) -> PathBuf {
        default_trace_dir(&self.output_dir)
    }
}

/// Makes a command-line path absolute against the working directory.
pub fn cli_path(path: &Path) -> Result<PathBuf> {
    let cwd = std::env::current_dir().context("Failed to read the working directory")?;
    Ok(absolutize(&cwd, path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_use_dot_tangle() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ProjectContext::load(dir.path(), None, None).unwrap();
        let root = dir.path().canonicalize().unwrap();

        assert_eq!(ctx.root, root);
        assert_eq!(ctx.graph_path(), root.join(".tangle/graph.json"));
        assert_eq!(ctx.trace_dir(), root.join(".tangle/trace"));
    }

    #[test]
    fn test_settings_output_dir_and_override() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".tangle.toml"), "[output]\ndir = \"reports\"\n").unwrap();
        let root = dir.path().canonicalize().unwrap();

        let ctx = ProjectContext::load(dir.path(), None, None).unwrap();
        assert_eq!(ctx.dataset_path(), root.join("reports/dataset.json"));

        let elsewhere = root.join("elsewhere");
        let ctx = ProjectContext::load(dir.path(), None, Some(&elsewhere)).unwrap();
        assert_eq!(ctx.latency_path(), elsewhere.join("latency.json"));
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ProjectContext::load(&dir.path().join("nope"), None, None).is_err());
    }
}
