//! Graph adapter trait and the build-time bipartite graph.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// A weighted graph view that can return **borrowed** neighbor + weight slices.
///
/// CSR-style: a node has a contiguous neighbor list and a contiguous weight
/// list, with matching indices.
pub trait WeightedGraphRef {
    fn node_count(&self) -> usize;

    /// Return `(neighbors, weights)` for a node.
    ///
    /// Requirements:
    /// - `neighbors.len() == weights.len()`
    /// - weights are non-negative
    fn neighbors_and_weights_ref(&self, node: usize) -> (&[usize], &[f64]);

    fn out_degree(&self, node: usize) -> usize {
        self.neighbors_and_weights_ref(node).0.len()
    }
}

/// Type tag of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKind {
    Star,
    /// Attribute node carrying its type letter.
    Attribute(char),
}

/// Type-tagged node identity, rendered as `<letter>_<id>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey {
    pub letter: char,
    pub id: String,
}

impl NodeKey {
    pub fn new(letter: char, id: impl Into<String>) -> Self {
        Self { letter, id: id.into() }
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.letter, self.id)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct BuildNode {
    pub(crate) key: NodeKey,
    pub(crate) kind: NodeKind,
    pub(crate) edges: HashMap<usize, f64>,
    pub(crate) live: bool,
}

/// Mutable, string-keyed bipartite graph used before indexing.
///
/// Nodes are interned in first-seen order; removed nodes stay in the arena
/// as dead slots so existing ids remain stable.
#[derive(Debug, Clone)]
pub struct BipartiteGraph {
    star_letter: char,
    lookup: HashMap<NodeKey, usize>,
    pub(crate) nodes: Vec<BuildNode>,
}

impl BipartiteGraph {
    pub fn new(star_letter: char) -> Self {
        Self { star_letter, lookup: HashMap::new(), nodes: Vec::new() }
    }

    pub fn star_letter(&self) -> char {
        self.star_letter
    }

    /// Intern `key`, returning its slot and whether it was newly created.
    pub(crate) fn intern(&mut self, key: NodeKey) -> (usize, bool) {
        if let Some(&id) = self.lookup.get(&key) {
            return (id, false);
        }
        let id = self.nodes.len();
        let kind = if key.letter == self.star_letter {
            NodeKind::Star
        } else {
            NodeKind::Attribute(key.letter)
        };
        self.lookup.insert(key.clone(), id);
        self.nodes.push(BuildNode { key, kind, edges: HashMap::new(), live: true });
        (id, true)
    }

    /// Set `w(a, b) = w(b, a) = weight`.
    pub(crate) fn set_symmetric(&mut self, a: usize, b: usize, weight: f64) {
        debug_assert_ne!(a, b);
        self.nodes[a].edges.insert(b, weight);
        self.nodes[b].edges.insert(a, weight);
    }

    /// Remove every edge of `id` from both endpoints.
    pub(crate) fn detach(&mut self, id: usize) {
        let edges = std::mem::take(&mut self.nodes[id].edges);
        for nbr in edges.into_keys() {
            self.nodes[nbr].edges.remove(&id);
        }
    }

    /// Detach and drop `id` from the graph.
    pub(crate) fn remove(&mut self, id: usize) {
        self.detach(id);
        let node = &mut self.nodes[id];
        node.live = false;
        self.lookup.remove(&node.key);
    }

    pub(crate) fn live_ids(&self) -> impl Iterator<Item = usize> + '_ {
        self.nodes.iter().enumerate().filter(|(_, n)| n.live).map(|(i, _)| i)
    }

    /// Number of live nodes.
    pub fn node_count(&self) -> usize {
        self.lookup.len()
    }

    pub fn star_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.live && n.kind == NodeKind::Star).count()
    }

    /// Number of directed edge entries (each symmetric edge counts twice).
    pub fn edge_entries(&self) -> usize {
        self.nodes.iter().filter(|n| n.live).map(|n| n.edges.len()).sum()
    }

    pub fn contains(&self, key: &NodeKey) -> bool {
        self.lookup.contains_key(key)
    }

    pub fn kind(&self, key: &NodeKey) -> Option<NodeKind> {
        self.lookup.get(key).map(|&id| self.nodes[id].kind)
    }

    pub fn degree(&self, key: &NodeKey) -> Option<usize> {
        self.lookup.get(key).map(|&id| self.nodes[id].edges.len())
    }

    /// Weight of the directed entry `from -> to`.
    pub fn weight(&self, from: &NodeKey, to: &NodeKey) -> Option<f64> {
        let a = *self.lookup.get(from)?;
        let b = *self.lookup.get(to)?;
        self.nodes[a].edges.get(&b).copied()
    }

    /// Live nodes as `(key, kind, degree)` in first-seen order.
    pub fn nodes(&self) -> impl Iterator<Item = (&NodeKey, NodeKind, usize)> + '_ {
        self.nodes
            .iter()
            .filter(|n| n.live)
            .map(|n| (&n.key, n.kind, n.edges.len()))
    }

    /// Outgoing `(neighbor key, weight)` entries of `key`.
    pub fn edges(&self, key: &NodeKey) -> Vec<(&NodeKey, f64)> {
        self.lookup
            .get(key)
            .map(|&id| {
                self.nodes[id]
                    .edges
                    .iter()
                    .map(|(&nbr, &w)| (&self.nodes[nbr].key, w))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Live node counts per type letter.
    pub fn counts_by_letter(&self) -> BTreeMap<char, usize> {
        let mut counts = BTreeMap::new();
        for n in self.nodes.iter().filter(|n| n.live) {
            *counts.entry(n.key.letter).or_insert(0) += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_is_idempotent_and_tags_kinds() {
        let mut g = BipartiteGraph::new('P');
        let (p, new_p) = g.intern(NodeKey::new('P', "1"));
        let (a, new_a) = g.intern(NodeKey::new('A', "x"));
        let (p2, again) = g.intern(NodeKey::new('P', "1"));
        assert!(new_p && new_a && !again);
        assert_eq!(p, p2);
        assert_ne!(p, a);
        assert_eq!(g.kind(&NodeKey::new('P', "1")), Some(NodeKind::Star));
        assert_eq!(g.kind(&NodeKey::new('A', "x")), Some(NodeKind::Attribute('A')));
    }

    #[test]
    fn remove_detaches_both_sides() {
        let mut g = BipartiteGraph::new('P');
        let (p, _) = g.intern(NodeKey::new('P', "1"));
        let (a, _) = g.intern(NodeKey::new('A', "x"));
        let (b, _) = g.intern(NodeKey::new('A', "y"));
        g.set_symmetric(p, a, 0.5);
        g.set_symmetric(p, b, 0.5);
        g.remove(a);

        assert!(!g.contains(&NodeKey::new('A', "x")));
        assert_eq!(g.degree(&NodeKey::new('P', "1")), Some(1));
        assert_eq!(g.node_count(), 2);
        assert_eq!(g.edge_entries(), 2);
    }

    #[test]
    fn key_renders_with_underscore() {
        assert_eq!(NodeKey::new('V', "kdd").to_string(), "V_kdd");
    }
}
