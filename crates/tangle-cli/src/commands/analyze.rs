use crate::context::{cli_path, ProjectContext};
use crate::summary;
use anyhow::{Context, Result};
use clap::Args;
use std::io::Write;
use std::path::PathBuf;
use tangle_backend_ts::{AnalyzeOptions, InclusionPolicy, ProjectAnalyzer};
use tangle_core::{write_artifact, Graph};

#[derive(Args, Debug, Clone, Default)]
pub struct AnalyzeArgs {
    /// Project configuration (tsconfig.json or a directory containing one)
    ///
    /// Searched upward from the project root when omitted.
    #[arg(long, short = 'p', value_name = "PATH")]
    pub project: Option<PathBuf>,

    /// Follow references into node_modules
    #[arg(long)]
    pub include_dependency_packages: bool,

    /// Keep ambient declaration files (.d.ts) as graph nodes
    #[arg(long)]
    pub include_declaration_files: bool,
}

impl AnalyzeArgs {
    /// Command-line flags can only widen what `.tangle.toml` allows.
    pub fn policy(&self, ctx: &ProjectContext) -> InclusionPolicy {
        let configured = InclusionPolicy::from_settings(&ctx.settings);
        InclusionPolicy {
            include_dependency_packages: self.include_dependency_packages
                || configured.include_dependency_packages,
            include_declaration_files: self.include_declaration_files
                || configured.include_declaration_files,
        }
    }
}

/// Builds the graph without writing anything.
pub fn build_graph(ctx: &ProjectContext, args: &AnalyzeArgs) -> Result<Graph> {
    let config_path = args.project.as_deref().map(cli_path).transpose()?;
    let analyzer = ProjectAnalyzer::new(AnalyzeOptions {
        project_root: ctx.root.clone(),
        config_path,
        policy: args.policy(ctx),
    });
    analyzer
        .analyze()
        .with_context(|| format!("Failed to analyze {}", ctx.root.display()))
}

/// `tangle analyze`: writes the graph artifact.
pub fn run(ctx: &ProjectContext, args: &AnalyzeArgs, output: Option<PathBuf>, print: bool) -> Result<PathBuf> {
    let graph = build_graph(ctx, args)?;
    let path = match output {
        Some(path) => cli_path(&path)?,
        None => ctx.graph_path(),
    };
    write_artifact(&path, &graph)
        .with_context(|| format!("Failed to write graph to {}", path.display()))?;

    if print {
        let mut stdout = std::io::stdout().lock();
        serde_json::to_writer_pretty(&mut stdout, &graph).context("Failed to print graph")?;
        writeln!(stdout)?;
    }
    summary::print_graph(&graph, &path);
    Ok(path)
}
