use super::analyze::{self, AnalyzeArgs};
use super::trace::{self, TraceArgs};
use crate::context::{cli_path, ProjectContext};
use crate::summary;
use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tangle_core::{build_dataset, write_artifact};
use tracing::warn;

#[derive(Args, Debug, Clone, Default)]
pub struct PipelineArgs {
    #[command(flatten)]
    pub analyze: AnalyzeArgs,

    #[command(flatten)]
    pub trace: TraceArgs,

    /// Build the dataset from the graph alone
    #[arg(long)]
    pub skip_trace: bool,
}

/// `tangle run`: analyze, trace, merge.
///
/// Analysis failures are fatal. Trace failures are logged and the dataset is
/// built from the graph alone. Artifacts are written only after every step
/// has finished.
pub fn run(ctx: &ProjectContext, args: &PipelineArgs, output: Option<PathBuf>) -> Result<PathBuf> {
    let graph = analyze::build_graph(ctx, &args.analyze)?;

    let latency = if args.skip_trace {
        None
    } else {
        match trace::collect(ctx, &args.trace) {
            Ok(latency) => Some(latency),
            Err(err) => {
                warn!("continuing without latency: {err:#}");
                None
            }
        }
    };

    let graph_path = ctx.graph_path();
    write_artifact(&graph_path, &graph)
        .with_context(|| format!("Failed to write graph to {}", graph_path.display()))?;
    summary::print_graph(&graph, &graph_path);

    if let Some(latency) = &latency {
        let latency_path = ctx.latency_path();
        write_artifact(&latency_path, latency).with_context(|| {
            format!("Failed to write latency summary to {}", latency_path.display())
        })?;
        summary::print_latency(latency, &latency_path);
    }

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
