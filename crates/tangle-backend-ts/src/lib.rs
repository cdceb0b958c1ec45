//! TypeScript/JavaScript backend for tangle.
//!
//! Locates and parses `tsconfig.json`, expands its file set, extracts import
//! references with oxc, resolves them with `oxc_resolver`, and hands the raw
//! graph to [`tangle_core::assemble_graph`].
//!
//! # Example
//!
//! ```no_run
//! use tangle_backend_ts::{AnalyzeOptions, ProjectAnalyzer};
//! use std::path::PathBuf;
//!
//! let analyzer = ProjectAnalyzer::new(AnalyzeOptions {
//!     project_root: PathBuf::from("."),
//!     ..Default::default()
//! });
//!
//! let graph = analyzer.analyze()?;
//! println!("{} files, {} cycle groups", graph.stats.node_count, graph.stats.cyclic_scc_count);
//! # Ok::<(), tangle_core::Error>(())
//! ```

pub mod analyzer;
pub mod builder;
pub mod file_set;
pub mod resolver;
pub mod syntax;
pub mod tsconfig;

pub use analyzer::{AnalyzeOptions, ProjectAnalyzer};
pub use builder::{GraphBuilder, InclusionPolicy};
pub use resolver::{ModuleResolver, TsModuleResolver};
pub use syntax::{OxcReferenceExtractor, Reference, ReferenceExtractor};
pub use tsconfig::{CompilerOptions, ProjectConfig};
