use crate::context::{cli_path, ProjectContext};
use crate::summary;
use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tangle_core::{write_artifact, LatencySummary};
use tangle_trace::{LatencyCorrelator, TraceRunner};
use tracing::info;

#[derive(Args, Debug, Clone, Default)]
pub struct TraceArgs {
    /// Directory the trace producer writes into (default: <out-dir>/trace)
    #[arg(long, value_name = "DIR")]
    pub trace_dir: Option<PathBuf>,

    /// Correlate an existing trace directory without running the producer
    #[arg(long)]
    pub skip_run: bool,

    /// Tolerate a non-zero exit from the trace producer
    #[arg(long)]
    pub keep_going: bool,
}

impl TraceArgs {
    pub fn trace_dir(&self, ctx: &ProjectContext) -> Result<PathBuf> {
        match &self.trace_dir {
            Some(dir) => cli_path(dir),
            None => Ok(ctx.trace_dir()),
        }
    }
}

/// Runs the producer (unless skipped) and correlates the trace directory.
pub fn collect(ctx: &ProjectContext, args: &TraceArgs) -> Result<LatencySummary> {
    let trace_dir = args.trace_dir(ctx)?;

    if args.skip_run {
        info!(dir = %trace_dir.display(), "using existing trace directory");
    } else {
        TraceRunner::from_settings(&ctx.settings.trace)
            .keep_going(args.keep_going || ctx.settings.trace.keep_going)
            .run(&ctx.root, &trace_dir)
            .context("Trace producer failed")?;
    }

    LatencyCorrelator::from_settings(ctx.root.clone(), &ctx.settings.trace)
        .correlate_dir(&trace_dir)
        .with_context(|| format!("Failed to correlate trace in {}", trace_dir.display()))
}

/// `tangle trace`: writes the latency summary artifact.
pub fn run(ctx: &ProjectContext, args: &TraceArgs, output: Option<PathBuf>) -> Result<PathBuf> {
    let latency = collect(ctx, args)?;
    let path = match output {
        Some(path) => cli_path(&path)?,
        None => ctx.latency_path(),
    };
    write_artifact(&path, &latency)
        .with_context(|| format!("Failed to write latency summary to {}", path.display()))?;
    summary::print_latency(&latency, &path);
    Ok(path)
}
