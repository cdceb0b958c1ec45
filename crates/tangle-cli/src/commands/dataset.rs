use crate::context::{cli_path, ProjectContext};
use crate::summary;
use anyhow::{Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};
use tangle_core::{build_dataset, read_artifact, write_artifact, Graph, LatencySummary};
use tracing::info;

#[derive(Args, Debug, Clone, Default)]
pub struct DatasetArgs {
    /// Graph artifact (default: <out-dir>/graph.json)
    #[arg(long, value_name = "FILE")]
    pub graph: Option<PathBuf>,

    /// Latency summary artifact (default: <out-dir>/latency.json)
    ///
    /// A missing file yields a graph-only dataset.
    #[arg(long, value_name = "FILE")]
    pub latency: Option<PathBuf>,
}

/// Reads a latency summary if one exists at `path`.
///
/// Absence is not an error; a file that exists but does not parse is.
pub fn read_optional_latency(path: &Path) -> Result<Option<LatencySummary>> {
    if !path.is_file() {
        info!(path = %path.display(), "no latency summary; building graph-only dataset");
        return Ok(None);
    }
    let summary = read_artifact(path)
        .with_context(|| format!("Failed to read latency summary {}", path.display()))?;
    Ok(Some(summary))
}

/// `tangle build-dataset`: merges existing artifacts.
pub fn run(ctx: &ProjectContext, args: &DatasetArgs, output: Option<PathBuf>) -> Result<PathBuf> {
    let graph_path = match &args.graph {
        Some(path) => cli_path(path)?,
        None => ctx.graph_path(),
    };
    let latency_path = match &args.latency {
        Some(path) => cli_path(path)?,
        None => ctx.latency_path(),
    };

    let graph: Graph = read_artifact(&graph_path)
        .with_context(|| format!("Failed to read graph {}", graph_path.display()))?;
    let latency = read_optional_latency(&latency_path)?;
    let dataset = build_dataset(graph, latency);

    let path = match output {
        Some(path) => cli_path(&path)?,
        None => ctx.dataset_path(),
    };
    write_artifact(&path, &dataset)
        .with_context(|| format!("Failed to write dataset to {}", path.display()))?;
    summary::print_dataset(&dataset, &path);
    Ok(path)
}
