//! Dense re-indexing into a read-only CSR graph.

use crate::graph::{BipartiteGraph, NodeKind, WeightedGraphRef};
use std::collections::BTreeMap;

/// Frozen bipartite graph with dense `usize` node ids.
///
/// Layout: node `v` has neighbors `neighbors[offsets[v]..offsets[v + 1]]`
/// (sorted ascending) with matching `weights`. `kinds[v]` tags the node type.
/// Only star nodes keep a textual label.
#[derive(Debug, Clone)]
pub struct IndexedGraph {
    offsets: Vec<usize>,
    neighbors: Vec<usize>,
    weights: Vec<f64>,
    kinds: Vec<NodeKind>,
    star_labels: BTreeMap<usize, String>,
}

impl IndexedGraph {
    /// Assign dense ids to the live nodes of `graph` in first-seen order.
    pub fn from_bipartite(graph: BipartiteGraph) -> Self {
        let mut dense = vec![usize::MAX; graph.nodes.len()];
        let mut next = 0usize;
        for id in graph.live_ids() {
            dense[id] = next;
            next += 1;
        }

        let mut offsets = Vec::with_capacity(next + 1);
        offsets.push(0);
        let mut neighbors = Vec::with_capacity(graph.edge_entries());
        let mut weights = Vec::with_capacity(graph.edge_entries());
        let mut kinds = Vec::with_capacity(next);
        let mut star_labels = BTreeMap::new();

        let mut row: Vec<(usize, f64)> = Vec::new();
        for node in graph.nodes.into_iter().filter(|n| n.live) {
            let v = kinds.len();
            row.clear();
            row.extend(node.edges.iter().map(|(&nbr, &w)| (dense[nbr], w)));
            row.sort_unstable_by_key(|&(nbr, _)| nbr);
            for &(nbr, w) in &row {
                debug_assert_ne!(nbr, usize::MAX, "edge to a removed node");
                neighbors.push(nbr);
                weights.push(w);
            }
            offsets.push(neighbors.len());

            if node.kind == NodeKind::Star {
                star_labels.insert(v, node.key.to_string());
            }
            kinds.push(node.kind);
        }

        Self { offsets, neighbors, weights, kinds, star_labels }
    }

    pub fn node_count(&self) -> usize {
        self.kinds.len()
    }

    /// Neighbors of `node`, ascending.
    pub fn neighbors(&self, node: usize) -> &[usize] {
        &self.neighbors[self.offsets[node]..self.offsets[node + 1]]
    }

    pub fn degree(&self, node: usize) -> usize {
        self.offsets[node + 1] - self.offsets[node]
    }

    pub fn edge_count(&self) -> usize {
        self.neighbors.len()
    }

    pub fn kind(&self, node: usize) -> NodeKind {
        self.kinds[node]
    }

    pub fn is_star(&self, node: usize) -> bool {
        self.kinds[node] == NodeKind::Star
    }

    /// Star node ids in ascending order.
    pub fn star_nodes(&self) -> Vec<usize> {
        self.star_labels.keys().copied().collect()
    }

    pub fn star_count(&self) -> usize {
        self.star_labels.len()
    }

    /// Label (`P_<id>`) of a star node; `None` for attribute nodes.
    pub fn star_label(&self, node: usize) -> Option<&str> {
        self.star_labels.get(&node).map(String::as_str)
    }

    /// Find a star node by its label.
    pub fn find_star(&self, label: &str) -> Option<usize> {
        self.star_labels.iter().find(|(_, l)| l.as_str() == label).map(|(&v, _)| v)
    }

    /// Weight of the directed entry `from -> to`.
    pub fn weight(&self, from: usize, to: usize) -> Option<f64> {
        let (nbrs, wts) = self.neighbors_and_weights_ref(from);
        nbrs.binary_search(&to).ok().map(|i| wts[i])
    }

    /// Node counts per type letter.
    pub fn counts_by_letter(&self, star_letter: char) -> BTreeMap<char, usize> {
        let mut counts = BTreeMap::new();
        for kind in &self.kinds {
            let letter = match kind {
                NodeKind::Star => star_letter,
                NodeKind::Attribute(l) => *l,
            };
            *counts.entry(letter).or_insert(0) += 1;
        }
        counts
    }
}

impl WeightedGraphRef for IndexedGraph {
    fn node_count(&self) -> usize {
        self.kinds.len()
    }

    fn neighbors_and_weights_ref(&self, node: usize) -> (&[usize], &[f64]) {
        let range = self.offsets[node]..self.offsets[node + 1];
        (&self.neighbors[range.clone()], &self.weights[range])
    }
}
