//! Strongly connected components using Tarjan's algorithm.
//!
//! Detects cycle groups in the file dependency graph.
//! Time complexity: O(V + E) where V = files, E = references
//! Space complexity: O(V)
//!
//! The depth-first search runs on an explicit frame stack instead of native
//! recursion, so long import chains cannot overflow the thread stack.

use std::collections::HashMap;
use tracing::debug;

/// Components found by [`ComponentFinder::find`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SccResult {
    component_of: HashMap<String, usize>,
    components: Vec<Vec<String>>,
}

impl SccResult {
    /// Component id of a node.
    pub fn component_of(&self, node: &str) -> Option<usize> {
        self.component_of.get(node).copied()
    }

    /// Members of a component, in the order Tarjan popped them.
    pub fn members(&self, component: usize) -> Option<&[String]> {
        self.components.get(component).map(Vec::as_slice)
    }

    /// All components indexed by id.
    pub fn components(&self) -> &[Vec<String>] {
        &self.components
    }

    /// Number of components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// True if there are no components (empty input).
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

/// Tarjan's SCC over an explicit node list and edge list.
///
/// Duplicate edges are harmless; the adjacency is only used for reachability.
pub struct ComponentFinder {
    ids: Vec<String>,
    adjacency: Vec<Vec<usize>>,
}

/// One suspended `strongconnect` call: the node and the next edge to examine.
struct Frame {
    node: usize,
    next_edge: usize,
}

struct TarjanState {
    index: Vec<Option<usize>>,
    low_link: Vec<usize>,
    on_stack: Vec<bool>,
    stack: Vec<usize>,
    next_index: usize,
}

impl TarjanState {
    fn new(size: usize) -> Self {
        Self {
            index: vec![None; size],
            low_link: vec![0; size],
            on_stack: vec![false; size],
            stack: Vec::new(),
            next_index: 0,
        }
    }

    fn visit(&mut self, v: usize) {
        self.index[v] = Some(self.next_index);
        self.low_link[v] = self.next_index;
        self.next_index += 1;
        self.stack.push(v);
        self.on_stack[v] = true;
    }
}

impl ComponentFinder {
    /// Creates a finder from node ids and `(from, to)` pairs.
    ///
    /// Repeated node ids are collapsed onto their first occurrence. Edges with
    /// an endpoint outside `nodes` are ignored.
    pub fn new<'e, I>(nodes: &[String], edges: I) -> Self
    where
        I: IntoIterator<Item = (&'e str, &'e str)>,
    {
        let mut ids = Vec::with_capacity(nodes.len());
        let mut position: HashMap<&str, usize> = HashMap::with_capacity(nodes.len());
        for id in nodes {
            if !position.contains_key(id.as_str()) {
                position.insert(id.as_str(), ids.len());
                ids.push(id.clone());
            }
        }

        let mut adjacency = vec![Vec::new(); ids.len()];
        for (from, to) in edges {
            match (position.get(from), position.get(to)) {
                (Some(&f), Some(&t)) => adjacency[f].push(t),
                _ => debug!(from, to, "edge endpoint outside node set, ignoring"),
            }
        }

        Self { ids, adjacency }
    }

    /// Runs Tarjan's algorithm.
    ///
    /// Nodes are started in input order, so component ids follow that order's
    /// DFS discovery. Membership depends only on reachability.
    pub fn find(&self) -> SccResult {
        let size = self.ids.len();
        let mut state = TarjanState::new(size);
        let mut frames: Vec<Frame> = Vec::new();
        let mut assigned: Vec<Option<usize>> = vec![None; size];
        let mut components: Vec<Vec<usize>> = Vec::new();

        for start in 0..size {
            if state.index[start].is_some() {
                continue;
            }
            state.visit(start);
            frames.push(Frame {
                node: start,
                next_edge: 0,
            });

            while let Some(frame) = frames.last_mut() {
                let v = frame.node;

                if let Some(&w) = self.adjacency[v].get(frame.next_edge) {
                    frame.next_edge += 1;
                    match state.index[w] {
                        None => {
                            state.visit(w);
                            frames.push(Frame {
                                node: w,
                                next_edge: 0,
                            });
                        }
                        Some(w_index) if state.on_stack[w] => {
                            state.low_link[v] = state.low_link[v].min(w_index);
                        }
                        Some(_) => {}
                    }
                    continue;
                }

                // All edges of v examined: return to the caller frame
                frames.pop();
                if let Some(parent) = frames.last() {
                    let p = parent.node;
                    state.low_link[p] = state.low_link[p].min(state.low_link[v]);
                }

                // Found SCC root
                if state.index[v] == Some(state.low_link[v]) {
                    let id = components.len();
                    let mut members = Vec::new();
                    while let Some(w) = state.stack.pop() {
                        state.on_stack[w] = false;
                        assigned[w] = Some(id);
                        members.push(w);
                        if w == v {
                            break;
                        }
                    }
                    components.push(members);
                }
            }
        }

        let component_of = assigned
            .iter()
            .enumerate()
            .filter_map(|(node, component)| component.map(|c| (self.ids[node].clone(), c)))
            .collect();
        let components = components
            .into_iter()
            .map(|members| members.into_iter().map(|m| self.ids[m].clone()).collect())
            .collect();

        SccResult {
            component_of,
            components,
        }
    }
}
