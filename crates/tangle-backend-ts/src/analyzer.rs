//! End-to-end graph construction for one project.

use crate::builder::{GraphBuilder, InclusionPolicy};
use crate::file_set;
use crate::resolver::TsModuleResolver;
use crate::syntax::OxcReferenceExtractor;
use crate::tsconfig::ProjectConfig;
use std::path::PathBuf;
use std::time::Instant;
use tangle_core::{assemble_graph, Graph, Result};
use tracing::{debug, info};

/// Inputs for [`ProjectAnalyzer`].
#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    /// Project root. Node ids are relative to it.
    pub project_root: PathBuf,
    /// Explicit `tsconfig.json` (file or directory); searched upward from the
    /// root when absent.
    pub config_path: Option<PathBuf>,
    pub policy: InclusionPolicy,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            project_root: PathBuf::from("."),
            config_path: None,
            policy: InclusionPolicy::default(),
        }
    }
}

/// TypeScript/JavaScript project analyzer.
///
/// Locates and parses the project configuration, expands its file set,
/// builds the raw graph with oxc, and assembles the final [`Graph`].
///
/// # Examples
///
/// ```no_run
/// use tangle_backend_ts::{AnalyzeOptions, InclusionPolicy, ProjectAnalyzer};
/// use std::path::PathBuf;
///
/// let graph = ProjectAnalyzer::new(AnalyzeOptions {
///     project_root: PathBuf::from("game"),
///     config_path: Some(PathBuf::from("game/tsconfig.app.json")),
///     policy: InclusionPolicy {
///         include_declaration_files: true,
///         ..Default::default()
///     },
/// })
/// .analyze()?;
///
/// for scc in graph.sccs.iter().filter(|c| c.cyclic) {
///     println!("cycle: {}", scc.members.join(" -> "));
/// }
/// # Ok::<(), tangle_core::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct ProjectAnalyzer {
    options: AnalyzeOptions,
}

impl ProjectAnalyzer {
    pub fn new(options: AnalyzeOptions) -> Self {
        Self { options }
    }

    /// Runs the analysis.
    ///
    /// # Errors
    ///
    /// `ConfigurationNotFound` / `ConfigurationParse` when the project
    /// configuration is missing or invalid, `Io` when the root is unreadable.
    /// Unresolvable references and unparseable source files are not errors.
    pub fn analyze(&self) -> Result<Graph> {
        let start = Instant::now();
        let root = self.options.project_root.canonicalize()?;

        // Canonical so ids computed from config-relative paths share the root's prefix.
        let explicit = self
            .options
            .config_path
            .as_ref()
            .map(|path| path.canonicalize().unwrap_or_else(|_| path.clone()));
        let config_path = ProjectConfig::locate(&root, explicit.as_deref())?;
        let config = ProjectConfig::load(&config_path)?;
        debug!(config = %config.path.display(), "loaded project configuration");

        let files = file_set::expand(&config)?;
        let resolver = TsModuleResolver::new(Some(config.path.clone()));
        resolver.check_config()?;
        let builder = GraphBuilder::new(OxcReferenceExtractor::new(), resolver, self.options.policy);
        let raw = builder.build(&root, &files);

        let graph = assemble_graph(raw, Some(config.path));
        info!(
            nodes = graph.stats.node_count,
            edges = graph.stats.edge_count,
            sccs = graph.stats.scc_count,
            cyclic = graph.stats.cyclic_scc_count,
            max_depth = graph.stats.max_depth,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "analysis complete"
        );
        Ok(graph)
    }
}
