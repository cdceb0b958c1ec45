//! Graph assembly: SCC condensation, depth metrics, degrees, final artifact.

use crate::depth::analyze_depths;
use crate::scc::ComponentFinder;
use crate::types::{Graph, GraphStats, Node, RawGraph, StronglyConnectedComponent, ARTIFACT_VERSION};
use chrono::Utc;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::PathBuf;
use tracing::debug;

/// Turns builder output into the final [`Graph`] artifact.
///
/// The node set is every scoped file plus every edge endpoint, sorted by id.
/// Edges keep their traversal order. Given the same raw graph, two calls
/// produce identical artifacts apart from `generated_at`.
pub fn assemble_graph(raw: RawGraph, config_path: Option<PathBuf>) -> Graph {
    let RawGraph {
        root,
        scoped,
        paths,
        edges,
    } = raw;

    let node_ids: Vec<String> = scoped
        .into_iter()
        .chain(edges.iter().flat_map(|e| [e.from.clone(), e.to.clone()]))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let sccs = ComponentFinder::new(
        &node_ids,
        edges.iter().map(|e| (e.from.as_str(), e.to.as_str())),
    )
    .find();
    debug!(
        nodes = node_ids.len(),
        edges = edges.len(),
        components = sccs.len(),
        "computed strongly connected components"
    );

    // Condensation: one edge per distinct component pair, no self-pairs
    let mut seen_pairs = HashSet::new();
    let mut condensed = Vec::new();
    let mut self_referencing = HashSet::new();
    for edge in &edges {
        let (Some(from), Some(to)) = (sccs.component_of(&edge.from), sccs.component_of(&edge.to))
        else {
            continue;
        };
        if from == to {
            if edge.is_self_edge() {
                self_referencing.insert(from);
            }
            continue;
        }
        if seen_pairs.insert((from, to)) {
            condensed.push((from, to));
        }
    }

    let component_ids: Vec<usize> = (0..sccs.len()).collect();
    let depths = analyze_depths(&component_ids, &condensed);

    let mut in_degree: HashMap<&str, usize> = HashMap::new();
    let mut out_degree: HashMap<&str, usize> = HashMap::new();
    for edge in &edges {
        *out_degree.entry(edge.from.as_str()).or_default() += 1;
        *in_degree.entry(edge.to.as_str()).or_default() += 1;
    }

    let nodes: Vec<Node> = node_ids
        .iter()
        .map(|id| {
            let component_id = sccs.component_of(id).unwrap_or_default();
            Node {
                id: id.clone(),
                absolute_path: paths
                    .get(id)
                    .cloned()
                    .unwrap_or_else(|| crate::paths::absolutize(&root, id)),
                in_degree: in_degree.get(id.as_str()).copied().unwrap_or(0),
                out_degree: out_degree.get(id.as_str()).copied().unwrap_or(0),
                component_id,
                depth: depths.depth.get(&component_id).copied().unwrap_or(0),
                depth_to_leaf: depths.depth_to_leaf.get(&component_id).copied().unwrap_or(0),
                latency_ms: None,
                latency_breakdown_ms: None,
            }
        })
        .collect();

    let components: Vec<StronglyConnectedComponent> = sccs
        .components()
        .iter()
        .enumerate()
        .map(|(id, members)| {
            let mut members = members.clone();
            members.sort();
            StronglyConnectedComponent {
                id,
                cyclic: members.len() > 1 || self_referencing.contains(&id),
                members,
            }
        })
        .collect();

    let longest_chain: Vec<String> = depths
        .longest_chain
        .iter()
        .filter_map(|&component| components.get(component))
        .filter_map(|component| component.members.first().cloned())
        .collect();

    let stats = GraphStats {
        node_count: nodes.len(),
        edge_count: edges.len(),
        scc_count: components.len(),
        cyclic_scc_count: components.iter().filter(|c| c.cyclic).count(),
        max_depth: depths.max_depth,
        max_depth_to_leaf: depths.max_depth_to_leaf,
        roots: nodes
            .iter()
            .filter(|n| n.in_degree == 0)
            .map(|n| n.id.clone())
            .collect(),
        leaves: nodes
            .iter()
            .filter(|n| n.out_degree == 0)
            .map(|n| n.id.clone())
            .collect(),
        root_components: depths.roots.clone(),
        leaf_components: depths.leaves.clone(),
        longest_chain_depth: longest_chain.len().saturating_sub(1),
        longest_chain,
        total_latency_ms: None,
    };

    Graph {
        version: ARTIFACT_VERSION,
        generated_at: Utc::now(),
        root_path: root,
        config_path,
        nodes,
        edges,
        sccs: components,
        stats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Edge, EdgeKind};

    fn raw_graph(files: &[&str], edges: &[(&str, &str)]) -> RawGraph {
        let mut raw = RawGraph::new(PathBuf::from("/repo"));
        for file in files {
            raw.add_scoped(*file, PathBuf::from("/repo").join(file));
        }
        for (from, to) in edges {
            raw.edges
                .push(Edge::new(*from, *to, EdgeKind::StaticImport, format!("./{to}")));
        }
        raw
    }

    #[test]
    fn test_pure_cycle_plus_isolated_file() {
        let raw = raw_graph(
            &["a.ts", "b.ts", "c.ts", "d.ts"],
            &[("a.ts", "b.ts"), ("b.ts", "c.ts"), ("c.ts", "a.ts")],
        );
        let graph = assemble_graph(raw, None);

        assert_eq!(graph.stats.scc_count, 2);
        assert_eq!(graph.stats.edge_count, 3);
        assert_eq!(graph.stats.cyclic_scc_count, 1);

        let cycle = graph.sccs.iter().find(|c| c.members.len() == 3).unwrap();
        assert_eq!(cycle.members, vec!["a.ts", "b.ts", "c.ts"]);
        assert!(cycle.cyclic);
        for node in &graph.nodes {
            assert_eq!(node.depth, 0);
            assert_eq!(node.depth_to_leaf, 0);
        }

        // Node-level: every cycle member has an incoming and outgoing edge
        assert_eq!(graph.stats.roots, vec!["d.ts"]);
        assert_eq!(graph.stats.leaves, vec!["d.ts"]);

        // Component-level: the cycle and d.ts are both roots and leaves
        let d = graph.node("d.ts").unwrap().component_id;
        let mut expected = vec![cycle.id, d];
        expected.sort();
        let mut roots = graph.stats.root_components.clone();
        roots.sort();
        let mut leaves = graph.stats.leaf_components.clone();
        leaves.sort();
        assert_eq!(roots, expected);
        assert_eq!(leaves, expected);
    }

    #[test]
    fn test_diamond() {
        let raw = raw_graph(
            &["a.ts", "b.ts", "c.ts", "d.ts"],
            &[
                ("a.ts", "b.ts"),
                ("a.ts", "c.ts"),
                ("b.ts", "d.ts"),
                ("c.ts", "d.ts"),
            ],
        );
        let graph = assemble_graph(raw, None);

        assert_eq!(graph.stats.scc_count, 4);
        assert_eq!(graph.node("d.ts").unwrap().depth, 2);
        assert_eq!(graph.node("a.ts").unwrap().depth, 0);
        assert_eq!(graph.node("a.ts").unwrap().depth_to_leaf, 2);
        assert_eq!(graph.stats.max_depth, 2);
        assert_eq!(graph.stats.longest_chain.len(), 3);
        assert_eq!(graph.stats.longest_chain_depth, 2);
        assert_eq!(graph.stats.longest_chain.first().map(String::as_str), Some("a.ts"));
        assert_eq!(graph.stats.longest_chain.last().map(String::as_str), Some("d.ts"));
    }

    #[test]
    fn test_edge_targets_outside_scope_become_nodes() {
        let mut raw = raw_graph(&["a.ts"], &[]);
        let target = raw.intern(std::path::Path::new("/repo/node_modules/pkg/index.d.ts"));
        raw.edges
            .push(Edge::new("a.ts", target.clone(), EdgeKind::StaticImport, "pkg"));

        let graph = assemble_graph(raw, None);

        let node = graph.node(&target).unwrap();
        assert_eq!(
            node.absolute_path,
            PathBuf::from("/repo/node_modules/pkg/index.d.ts")
        );
        assert_eq!(node.in_degree, 1);
    }

    #[test]
    fn test_self_edge_marks_singleton_cyclic() {
        let raw = raw_graph(&["a.ts", "b.ts"], &[("a.ts", "a.ts"), ("a.ts", "b.ts")]);
        let graph = assemble_graph(raw, None);

        assert_eq!(graph.stats.scc_count, 2);
        let a = graph.node("a.ts").unwrap();
        assert!(graph.sccs[a.component_id].cyclic);
        assert_eq!(a.in_degree, 1);
        assert_eq!(a.out_degree, 2);
        assert_eq!(a.depth_to_leaf, 1);
    }

    #[test]
    fn test_parallel_edges_each_count_toward_degree() {
        let mut raw = raw_graph(&["a.ts", "b.ts"], &[("a.ts", "b.ts")]);
        raw.edges
            .push(Edge::new("a.ts", "b.ts", EdgeKind::DynamicImport, "./b.js"));
        let graph = assemble_graph(raw, None);

        assert_eq!(graph.stats.edge_count, 2);
        assert_eq!(graph.node("a.ts").unwrap().out_degree, 2);
        assert_eq!(graph.node("b.ts").unwrap().in_degree, 2);
        assert_eq!(graph.stats.max_depth, 1);
    }

    #[test]
    fn test_nodes_are_sorted_and_output_is_deterministic() {
        let build = || {
            raw_graph(
                &["z.ts", "m.ts", "a.ts"],
                &[("z.ts", "m.ts"), ("m.ts", "a.ts"), ("a.ts", "z.ts")],
            )
        };
        let first = assemble_graph(build(), None);
        let second = assemble_graph(build(), None);

        let ids: Vec<&str> = first.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["a.ts", "m.ts", "z.ts"]);
        assert_eq!(first.nodes, second.nodes);
        assert_eq!(first.edges, second.edges);
        assert_eq!(first.sccs, second.sccs);
        assert_eq!(first.stats, second.stats);
    }

    #[test]
    fn test_empty_project() {
        let graph = assemble_graph(RawGraph::new(PathBuf::from("/repo")), None);

        assert_eq!(graph.stats.node_count, 0);
        assert!(graph.stats.longest_chain.is_empty());
        assert_eq!(graph.stats.longest_chain_depth, 0);
    }
}
