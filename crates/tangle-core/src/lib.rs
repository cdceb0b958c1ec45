//! Tangle Core - dependency graph model and graph algorithms.
//!
//! This crate holds everything about a dependency graph that does not need
//! a parser: the artifact types, path identity helpers, the strongly
//! connected components engine, the DAG depth engine, graph assembly and
//! the latency merge step.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐   ┌──────────────────┐
//! │ tangle-backend-ts│   │   tangle-trace   │
//! │ (config, parse,  │   │ (trace events →  │
//! │  resolve, build) │   │  LatencySummary) │
//! └────────┬─────────┘   └────────┬─────────┘
//!          │ RawGraph             │
//!          ▼                      │
//! ┌──────────────────┐            │
//! │   tangle-core    │◄───────────┘
//! │ scc → depth →    │  build_dataset()
//! │ assemble_graph   │
//! └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use tangle_core::{assemble_graph, Edge, EdgeKind, RawGraph};
//! use std::path::PathBuf;
//!
//! let mut raw = RawGraph::new(PathBuf::from("/repo"));
//! raw.add_scoped("a.ts", PathBuf::from("/repo/a.ts"));
//! raw.add_scoped("b.ts", PathBuf::from("/repo/b.ts"));
//! raw.edges.push(Edge::new("a.ts", "b.ts", EdgeKind::StaticImport, "./b"));
//!
//! let graph = assemble_graph(raw, None);
//! assert_eq!(graph.stats.max_depth, 1);
//! assert_eq!(graph.stats.longest_chain, vec!["a.ts", "b.ts"]);
//! ```

pub mod assemble;
pub mod dataset;
pub mod depth;
pub mod error;
pub mod paths;
pub mod scc;
pub mod settings;
pub mod types;

pub use assemble::assemble_graph;
pub use dataset::{build_dataset, read_artifact, write_artifact};
pub use depth::{analyze_depths, DepthAnalysis};
pub use error::{Error, Result};
pub use scc::{ComponentFinder, SccResult};
pub use settings::TangleSettings;
pub use types::{
    Dataset, Edge, EdgeKind, Graph, GraphStats, LatencySummary, Node, RawGraph,
    StronglyConnectedComponent, ARTIFACT_VERSION,
};
