//! Longest-path depth metrics over the condensed component DAG.

use std::collections::{HashMap, VecDeque};
use tracing::warn;

/// Depth metrics for every component of a condensed graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepthAnalysis {
    /// Longest distance from any root component.
    pub depth: HashMap<usize, usize>,
    /// Longest distance to any leaf component.
    pub depth_to_leaf: HashMap<usize, usize>,
    /// Components with no incoming edges, in input order.
    pub roots: Vec<usize>,
    /// Components with no outgoing edges, in input order.
    pub leaves: Vec<usize>,
    /// One root-to-leaf chain ending at the deepest component.
    pub longest_chain: Vec<usize>,
    pub max_depth: usize,
    pub max_depth_to_leaf: usize,
}

/// Computes forward depth, reverse depth and a representative longest chain.
///
/// `edges` must be acyclic and free of self-pairs; it is the output of SCC
/// condensation. Duplicate pairs only cost time.
///
/// When several components share the maximum depth, the one appearing last
/// in `component_ids` is used as the chain's end. Along the chain, a
/// component keeps the first predecessor that reached its final depth.
pub fn analyze_depths(component_ids: &[usize], edges: &[(usize, usize)]) -> DepthAnalysis {
    let count = component_ids.len();
    let position: HashMap<usize, usize> = component_ids
        .iter()
        .enumerate()
        .map(|(pos, &id)| (id, pos))
        .collect();

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); count];
    let mut in_degree = vec![0usize; count];
    for &(from, to) in edges {
        let (Some(&f), Some(&t)) = (position.get(&from), position.get(&to)) else {
            continue;
        };
        if f == t {
            continue;
        }
        children[f].push(t);
        in_degree[t] += 1;
    }

    let roots: Vec<usize> = (0..count).filter(|&c| in_degree[c] == 0).collect();
    let leaves: Vec<usize> = (0..count).filter(|&c| children[c].is_empty()).collect();

    let order = topological_order(&children, &in_degree, &roots);

    // Forward pass: longest distance from a root
    let mut depth = vec![0usize; count];
    let mut predecessor: Vec<Option<usize>> = vec![None; count];
    for &component in &order {
        for &child in &children[component] {
            if depth[component] + 1 > depth[child] {
                depth[child] = depth[component] + 1;
                predecessor[child] = Some(component);
            }
        }
    }

    let mut deepest: Option<usize> = None;
    let mut max_depth = 0;
    for component in 0..count {
        if deepest.is_none() || depth[component] >= max_depth {
            max_depth = depth[component];
            deepest = Some(component);
        }
    }

    let mut longest_chain = Vec::new();
    let mut cursor = deepest;
    while let Some(component) = cursor {
        longest_chain.push(component_ids[component]);
        cursor = predecessor[component];
    }
    longest_chain.reverse();

    // Reverse pass: longest distance to a leaf
    let mut depth_to_leaf = vec![0usize; count];
    for &component in order.iter().rev() {
        for &child in &children[component] {
            if depth_to_leaf[child] + 1 > depth_to_leaf[component] {
                depth_to_leaf[component] = depth_to_leaf[child] + 1;
            }
        }
    }
    let max_depth_to_leaf = depth_to_leaf.iter().copied().max().unwrap_or(0);

    DepthAnalysis {
        depth: (0..count).map(|c| (component_ids[c], depth[c])).collect(),
        depth_to_leaf: (0..count)
            .map(|c| (component_ids[c], depth_to_leaf[c]))
            .collect(),
        roots: roots.into_iter().map(|c| component_ids[c]).collect(),
        leaves: leaves.into_iter().map(|c| component_ids[c]).collect(),
        longest_chain,
        max_depth,
        max_depth_to_leaf,
    }
}

/// Kahn's algorithm seeded from the roots.
fn topological_order(children: &[Vec<usize>], in_degree: &[usize], roots: &[usize]) -> Vec<usize> {
    let mut remaining = in_degree.to_vec();
    let mut queue: VecDeque<usize> = roots.iter().copied().collect();
    let mut order = Vec::with_capacity(children.len());

    while let Some(component) = queue.pop_front() {
        order.push(component);
        for &child in &children[component] {
            remaining[child] -= 1;
            if remaining[child] == 0 {
                queue.push_back(child);
            }
        }
    }

    if order.len() < children.len() {
        // Only reachable with a cyclic input, which condensation rules out
        warn!(
            ordered = order.len(),
            total = children.len(),
            "component graph is not acyclic; depths for the remainder are partial"
        );
        let mut placed = vec![false; children.len()];
        for &component in &order {
            placed[component] = true;
        }
        order.extend((0..children.len()).filter(|&c| !placed[c]));
    }

    order
}
