//! Tangle CLI - dependency cycles, depth and latency for TypeScript projects.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tangle_cli::commands::{self, AnalyzeArgs, DatasetArgs, PipelineArgs, TraceArgs};
use tangle_cli::ProjectContext;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "tangle", version)]
#[command(about = "Find import cycles, measure dependency depth and correlate type-check latency", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Project root; node ids are relative to it
    #[arg(long, short = 'r', global = true, value_name = "DIR", default_value = ".")]
    root: PathBuf,

    /// Tool settings file (default: <root>/.tangle.toml when present)
    #[arg(long, global = true, value_name = "FILE")]
    settings: Option<PathBuf>,

    /// Artifact directory (overrides [output] dir)
    #[arg(long, global = true, value_name = "DIR")]
    out_dir: Option<PathBuf>,

    /// Verbose output (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the dependency graph and write graph.json
    Analyze {
        #[command(flatten)]
        args: AnalyzeArgs,

        /// Output file (default: <out-dir>/graph.json)
        #[arg(long, short = 'o', value_name = "FILE")]
        output: Option<PathBuf>,

        /// Also print the graph JSON to stdout
        #[arg(long)]
        print: bool,
    },

    /// Run the trace producer and write latency.json
    Trace {
        #[command(flatten)]
        args: TraceArgs,

        /// Output file (default: <out-dir>/latency.json)
        #[arg(long, short = 'o', value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Merge graph.json and latency.json into dataset.json
    BuildDataset {
        #[command(flatten)]
        args: DatasetArgs,

        /// Output file (default: <out-dir>/dataset.json)
        #[arg(long, short = 'o', value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Analyze, trace and merge in one step
    Run {
        #[command(flatten)]
        args: PipelineArgs,

        /// Dataset output file (default: <out-dir>/dataset.json)
        #[arg(long, short = 'o', value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "warn",
            1 => "tangle=info,warn",
            2 => "tangle=debug,info",
            _ => "tangle=trace,debug",
        })
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let ctx = ProjectContext::load(&cli.root, cli.settings.as_deref(), cli.out_dir.as_deref())?;

    let written = match cli.command {
        Command::Analyze {
            args,
            output,
            print,
        } => commands::analyze::run(&ctx, &args, output, print)?,
        Command::Trace { args, output } => commands::trace::run(&ctx, &args, output)?,
        Command::BuildDataset { args, output } => commands::dataset::run(&ctx, &args, output)?,
        Command::Run { args, output } => commands::pipeline::run(&ctx, &args, output)?,
    };
    tracing::debug!(path = %written.display(), "done");
    Ok(())
}
