//! Component dependency graph on top of petgraph::StableDiGraph
//!
//! An edge `A -> B` means "A declares it uses B". Failures therefore travel
//! against the edges: everyone upstream of B along incoming edges is hit when
//! B goes down.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use petgraph::algo::{condensation, tarjan_scc, toposort};
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use petgraph::{Direction, Graph};

use crate::error::{Diagnostic, DiagnosticKind};
use crate::model::DependencyNode;

/// Directed component graph keyed by manifest id.
pub struct DependencyGraph {
    inner: StableDiGraph<DependencyNode, ()>,
    index: HashMap<String, NodeIndex>,
    /// Declaration order, used for every deterministic iteration.
    order: Vec<NodeIndex>,
}

impl std::fmt::Debug for DependencyGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependencyGraph")
            .field("node_count", &self.inner.node_count())
            .field("edge_count", &self.inner.edge_count())
            .finish()
    }
}

impl DependencyGraph {
    pub fn new() -> Self {
        DependencyGraph {
            inner: StableDiGraph::new(),
            index: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Build the graph in one pass over the declared nodes.
    ///
    /// Edges naming an undeclared id are dropped and reported. A repeated id
    /// keeps its first declaration.
    pub fn build(nodes: Vec<DependencyNode>) -> (Self, Vec<Diagnostic>) {
        let mut graph = DependencyGraph::new();
        let mut diagnostics = Vec::new();

        for node in nodes {
            if graph.contains(&node.id) {
                diagnostics.push(
                    Diagnostic::new(
                        DiagnosticKind::DuplicateManifestEntry,
                        node.id.clone(),
                        "component declared more than once, keeping the first declaration",
                    )
                    .warn(),
                );
                continue;
            }
            graph.add_node(node);
        }

        for &source in &graph.order.clone() {
            let (source_id, targets) = {
                let node = &graph.inner[source];
                (node.id.clone(), node.forward_edges.clone())
            };
            for target_id in targets {
                match graph.index.get(&target_id) {
                    Some(&target) => {
                        graph.inner.add_edge(source, target, ());
                    }
                    None => diagnostics.push(
                        Diagnostic::new(
                            DiagnosticKind::DanglingEdge,
                            format!("{} -> {}", source_id, target_id),
                            "edge target is not a declared component, ignoring edge",
                        )
                        .warn(),
                    ),
                }
            }
        }

        (graph, diagnostics)
    }

    /// Add a node without wiring its forward edges.
    pub fn add_node(&mut self, node: DependencyNode) -> NodeIndex {
        let id = node.id.clone();
        let idx = self.inner.add_node(node);
        self.index.insert(id, idx);
        self.order.push(idx);
        idx
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn node(&self, id: &str) -> Option<&DependencyNode> {
        self.index.get(id).map(|&idx| &self.inner[idx])
    }

    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.node_count() == 0
    }

    /// Nodes in declaration order.
    pub fn nodes(&self) -> impl Iterator<Item = &DependencyNode> {
        self.order.iter().map(move |&idx| &self.inner[idx])
    }

    /// Declared targets that exist in the graph, sorted.
    pub fn dependencies(&self, id: &str) -> Vec<&str> {
        self.neighbors(id, Direction::Outgoing)
    }

    /// Reverse edges: components declaring a connection to `id`, sorted.
    pub fn dependents(&self, id: &str) -> Vec<&str> {
        self.neighbors(id, Direction::Incoming)
    }

    fn neighbors(&self, id: &str, direction: Direction) -> Vec<&str> {
        let Some(&idx) = self.index.get(id) else {
            return Vec::new();
        };
        let ids: BTreeSet<&str> = self
            .inner
            .edges_directed(idx, direction)
            .map(|edge| self.inner[other_end(edge.source(), edge.target(), idx)].id.as_str())
            .collect();
        ids.into_iter().collect()
    }

    /// Every component transitively depending on `id`, excluding `id` itself.
    ///
    /// Breadth-first over incoming edges with a visited set seeded with the
    /// start node, so cycles terminate and nothing is counted twice.
    pub fn transitive_dependents(&self, id: &str) -> BTreeSet<&str> {
        let mut impacted = BTreeSet::new();
        let Some(&start) = self.index.get(id) else {
            return impacted;
        };

        let mut visited: HashSet<NodeIndex> = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);

        while let Some(current) = queue.pop_front() {
            for edge in self.inner.edges_directed(current, Direction::Incoming) {
                let dependent = other_end(edge.source(), edge.target(), current);
                if visited.insert(dependent) {
                    impacted.insert(self.inner[dependent].id.as_str());
                    queue.push_back(dependent);
                }
            }
        }

        impacted
    }

    /// Size of [`Self::transitive_dependents`].
    pub fn blast_radius(&self, id: &str) -> usize {
        self.transitive_dependents(id).len()
    }

    /// Groups of components that depend on each other in a loop.
    ///
    /// Each cycle is sorted; cycles are ordered by their first member.
    pub fn cycles(&self) -> Vec<Vec<String>> {
        let mut cycles: Vec<Vec<String>> = tarjan_scc(&self.inner)
            .into_iter()
            .filter(|scc| {
                scc.len() > 1 || self.inner.find_edge(scc[0], scc[0]).is_some()
            })
            .map(|scc| {
                let mut ids: Vec<String> =
                    scc.iter().map(|&idx| self.inner[idx].id.clone()).collect();
                ids.sort();
                ids
            })
            .collect();
        cycles.sort();
        cycles
    }

    /// Longest forward chain starting at each entry point, longest first.
    ///
    /// Cycles are collapsed first, so a chain passes through a cycle as one
    /// step that lists all of its members. Computed by dynamic programming in
    /// topological order; no recursion.
    pub fn longest_chains(&self) -> Vec<Vec<String>> {
        let mut plain: Graph<NodeIndex, ()> = Graph::new();
        let mut mapped = HashMap::new();
        for &idx in &self.order {
            mapped.insert(idx, plain.add_node(idx));
        }
        for edge in self.inner.edge_references() {
            if edge.source() != edge.target() {
                plain.add_edge(mapped[&edge.source()], mapped[&edge.target()], ());
            }
        }

        let condensed = condensation(plain, true);
        let Ok(topo) = toposort(&condensed, None) else {
            return Vec::new();
        };

        let members = |c: NodeIndex| -> Vec<String> {
            let mut ids: Vec<String> = condensed[c]
                .iter()
                .map(|&idx| self.inner[idx].id.clone())
                .collect();
            ids.sort();
            ids
        };

        // Best chain length (in nodes) from each component to a sink, walking
        // the topological order backwards so successors are settled first.
        let mut best_len: HashMap<NodeIndex, usize> = HashMap::new();
        let mut best_next: HashMap<NodeIndex, NodeIndex> =
            HashMap::new();
        for &c in topo.iter().rev() {
            let own = condensed[c].len();
            let mut successors: Vec<_> = condensed.neighbors(c).collect();
            successors.sort_by_key(|s| members(*s));
            let mut best: Option<(usize, NodeIndex)> = None;
            for s in successors {
                let len = best_len[&s];
                if best.is_none_or(|(l, _)| len > l) {
                    best = Some((len, s));
                }
            }
            match best {
                Some((len, next)) => {
                    best_len.insert(c, own + len);
                    best_next.insert(c, next);
                }
                None => {
                    best_len.insert(c, own);
                }
            }
        }

        let mut chains: Vec<Vec<String>> = topo
            .iter()
            .filter(|&&c| {
                condensed
                    .neighbors_directed(c, Direction::Incoming)
                    .next()
                    .is_none()
            })
            .map(|&root| {
                let mut chain = Vec::new();
                let mut current = Some(root);
                while let Some(c) = current {
                    chain.extend(members(c));
                    current = best_next.get(&c).copied();
                }
                chain
            })
            .collect();

        chains.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        chains
    }
}

/// The endpoint of an edge that is not `from`; a self loop yields `from`.
fn other_end(source: NodeIndex, target: NodeIndex, from: NodeIndex) -> NodeIndex {
    if source == from { target } else { source }
}

impl Default for DependencyGraph {
    fn default() -> Self {
        Self::new()
    }
}
