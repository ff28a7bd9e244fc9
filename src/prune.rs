//! Pruning of low-information nodes and edge re-weighting.

use crate::config::WeightingScheme;
use crate::graph::{BipartiteGraph, NodeKind};
use std::collections::BTreeMap;

/// What a [`prune`] pass removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneReport {
    /// Attribute nodes removed, per type letter.
    pub removed_by_letter: BTreeMap<char, usize>,
    /// Star nodes removed because they had no neighbors left.
    pub isolated_stars: usize,
}

impl PruneReport {
    pub fn removed_attributes(&self) -> usize {
        self.removed_by_letter.values().sum()
    }
}

/// Remove attribute nodes with degree <= 1, then isolated star nodes.
///
/// An attribute touching a single star carries no similarity signal. This is a
/// single pass: attributes are not revisited after star isolates go away.
pub fn prune(graph: &mut BipartiteGraph) -> PruneReport {
    let mut report = PruneReport::default();

    let weak: Vec<usize> = graph
        .live_ids()
        .filter(|&id| {
            let n = &graph.nodes[id];
            matches!(n.kind, NodeKind::Attribute(_)) && n.edges.len() <= 1
        })
        .collect();
    for id in weak {
        *report.removed_by_letter.entry(graph.nodes[id].key.letter).or_insert(0) += 1;
        graph.remove(id);
    }

    let isolated: Vec<usize> = graph
        .live_ids()
        .filter(|&id| {
            let n = &graph.nodes[id];
            n.kind == NodeKind::Star && n.edges.is_empty()
        })
        .collect();
    report.isolated_stars = isolated.len();
    for id in isolated {
        graph.remove(id);
    }

    for (letter, count) in &report.removed_by_letter {
        tracing::info!(%letter, count, "removed attribute nodes with degree <= 1");
    }
    tracing::info!(count = report.isolated_stars, "removed isolated star nodes");
    report
}

/// Apply `scheme` to the pruned graph.
///
/// Under [`WeightingScheme::Metadata`] every edge leaving an attribute node
/// `n` becomes `1 / degree(n)`; star-side entries keep their weights, so the
/// graph may become asymmetric.
pub fn normalize(graph: &mut BipartiteGraph, scheme: WeightingScheme) {
    match scheme {
        WeightingScheme::Publication => {
            tracing::info!("using the publication weighting scheme");
        }
        WeightingScheme::Metadata => {
            tracing::info!("using the metadata weighting scheme");
            for node in graph.nodes.iter_mut().filter(|n| n.live) {
                if node.kind == NodeKind::Star || node.edges.is_empty() {
                    continue;
                }
                let w = 1.0 / node.edges.len() as f64;
                for weight in node.edges.values_mut() {
                    *weight = w;
                }
            }
        }
    }
}
