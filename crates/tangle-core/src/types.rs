//! Core data types for Tangle artifacts.
//!
//! Every artifact is serialized with camelCase keys and carries a
//! [`ARTIFACT_VERSION`] plus a generation timestamp.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

/// Version stamped into every artifact.
pub const ARTIFACT_VERSION: u32 = 1;

/// Syntactic shape of the reference that produced an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeKind {
    /// `import x from "./x"`
    StaticImport,
    /// `import("./x")`
    DynamicImport,
    /// `export { x } from "./x"` and `export * from "./x"`
    ReExport,
    /// `require("./x")`
    LegacyRequire,
}

impl EdgeKind {
    /// Returns the artifact name for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::StaticImport => "static-import",
            EdgeKind::DynamicImport => "dynamic-import",
            EdgeKind::ReExport => "re-export",
            EdgeKind::LegacyRequire => "legacy-require",
        }
    }
}

impl std::fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A directed reference from one file to another.
///
/// Parallel edges between the same pair are kept as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    /// Importing node id.
    pub from: String,
    /// Imported node id.
    pub to: String,
    /// Reference shape.
    pub kind: EdgeKind,
    /// Raw specifier text, for display only.
    pub specifier: String,
}

impl Edge {
    /// Creates an edge.
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        kind: EdgeKind,
        specifier: impl Into<String>,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            kind,
            specifier: specifier.into(),
        }
    }

    /// True if the edge points back at its own source file.
    pub fn is_self_edge(&self) -> bool {
        self.from == self.to
    }
}

/// One source file in the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Slash-delimited path relative to the project root.
    pub id: String,
    /// Resolved filesystem path.
    pub absolute_path: PathBuf,
    /// Number of edge records pointing at this node.
    pub in_degree: usize,
    /// Number of edge records leaving this node.
    pub out_degree: usize,
    /// Strongly connected component this node belongs to.
    pub component_id: usize,
    /// Longest distance (in component hops) from any root component.
    pub depth: usize,
    /// Longest distance (in component hops) to any leaf component.
    pub depth_to_leaf: usize,
    /// Total attributed latency, if a latency summary was merged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<f64>,
    /// Attributed latency per trace event name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency_breakdown_ms: Option<BTreeMap<String, f64>>,
}

/// A maximal set of mutually reachable nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StronglyConnectedComponent {
    /// Discovery-order id.
    pub id: usize,
    /// Member node ids, sorted. Never empty.
    pub members: Vec<String>,
    /// True when the members form a dependency cycle (more than one member,
    /// or a single member importing itself).
    pub cyclic: bool,
}

/// Aggregate statistics over a [`Graph`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub scc_count: usize,
    #[serde(default)]
    pub cyclic_scc_count: usize,
    pub max_depth: usize,
    pub max_depth_to_leaf: usize,
    /// Node ids with no incoming edges.
    pub roots: Vec<String>,
    /// Node ids with no outgoing edges.
    pub leaves: Vec<String>,
    /// Component ids with no incoming edges in the condensation.
    #[serde(default)]
    pub root_components: Vec<usize>,
    /// Component ids with no outgoing edges in the condensation.
    #[serde(default)]
    pub leaf_components: Vec<usize>,
    /// One representative root-to-leaf node chain achieving `max_depth`.
    pub longest_chain: Vec<String>,
    pub longest_chain_depth: usize,
    /// Sum of merged node latencies. Set by the merge step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_latency_ms: Option<f64>,
}

/// The dependency graph artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Graph {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub root_path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_path: Option<PathBuf>,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub sccs: Vec<StronglyConnectedComponent>,
    pub stats: GraphStats,
}

impl Graph {
    /// Looks up a node by id.
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }
}

/// Per-file latency totals correlated from a trace log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatencySummary {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub root_path: PathBuf,
    pub trace_dir_path: PathBuf,
    /// Absolute path → total milliseconds.
    pub per_file_ms: BTreeMap<String, f64>,
    /// Absolute path → event name → milliseconds.
    pub per_file_breakdown_ms: BTreeMap<String, BTreeMap<String, f64>>,
    /// Diagnostics, e.g. when nothing could be attributed.
    #[serde(default)]
    pub notes: Vec<String>,
}

/// The merged artifact consumed by the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub graph: Graph,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency_summary: Option<LatencySummary>,
}

/// Builder output: raw edges plus every node id the builder minted.
///
/// Node ids are assigned once per path through [`RawGraph::intern`] and are
/// never regenerated for the rest of the run.
#[derive(Debug, Clone, Default)]
pub struct RawGraph {
    /// Project root the ids are relative to.
    pub root: PathBuf,
    /// Ids of the in-scope files, in traversal order.
    pub scoped: Vec<String>,
    /// Id → absolute path for every id seen (scoped files and edge targets).
    pub paths: HashMap<String, PathBuf>,
    /// Edges in traversal order.
    pub edges: Vec<Edge>,
}

impl RawGraph {
    /// Creates an empty raw graph rooted at `root`.
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            ..Default::default()
        }
    }

    /// Returns the id for `path`, registering it on first sight.
    pub fn intern(&mut self, path: &std::path::Path) -> String {
        let id = crate::paths::node_id(&self.root, path);
        self.paths
            .entry(id.clone())
            .or_insert_with(|| crate::paths::normalize(path));
        id
    }

    /// Registers an in-scope file under an explicit id.
    pub fn add_scoped(&mut self, id: impl Into<String>, path: PathBuf) {
        let id = id.into();
        self.paths.entry(id.clone()).or_insert(path);
        self.scoped.push(id);
    }
}
