//! Bipartite graph construction from records.

use crate::config::AttributeSchema;
use crate::error::Result;
use crate::graph::{BipartiteGraph, NodeKey};
use crate::record::Record;

/// Incrementally builds a [`BipartiteGraph`] from records.
///
/// Every record spreads a total weight of 1 over its attribute occurrences,
/// so a paper with ten authors and one venue does not let authorship dominate.
#[derive(Debug)]
pub struct GraphBuilder {
    schema: AttributeSchema,
    graph: BipartiteGraph,
    records: usize,
    duplicate_ids: usize,
}

impl GraphBuilder {
    pub fn new(schema: AttributeSchema) -> Self {
        let graph = BipartiteGraph::new(schema.star_letter());
        Self { schema, graph, records: 0, duplicate_ids: 0 }
    }

    pub fn schema(&self) -> &AttributeSchema {
        &self.schema
    }

    /// Add one record's star node and its weighted attribute edges.
    ///
    /// A repeated record id replaces the edges of the earlier record.
    pub fn add_record(&mut self, record: &Record) {
        debug_assert_eq!(record.values.len(), self.schema.len());
        self.records += 1;

        let (star, created) = self.graph.intern(NodeKey::new(self.schema.star_letter(), record.id.as_str()));
        if !created {
            self.duplicate_ids += 1;
            tracing::warn!(id = %record.id, "duplicate record id, replacing earlier edges");
            self.graph.detach(star);
        }

        let occurrences = record.occurrence_count();
        if occurrences == 0 {
            return;
        }
        let weight = 1.0 / occurrences as f64;

        for ((_, letter), values) in self.schema.attributes().iter().zip(&record.values) {
            for value in values {
                let (attr, _) = self.graph.intern(NodeKey::new(*letter, value.as_str()));
                self.graph.set_symmetric(star, attr, weight);
            }
        }
    }

    /// Records seen so far, duplicates included.
    pub fn records(&self) -> usize {
        self.records
    }

    pub fn duplicate_ids(&self) -> usize {
        self.duplicate_ids
    }

    pub fn finish(self) -> BipartiteGraph {
        self.graph
    }
}

/// Build a graph from a fallible record stream, aborting on the first error.
///
/// Returns the graph and the number of records read.
pub fn build_graph<I>(schema: AttributeSchema, records: I) -> Result<(BipartiteGraph, usize)>
where
    I: IntoIterator<Item = Result<Record>>,
{
    let mut builder = GraphBuilder::new(schema);
    for record in records {
        builder.add_record(&record?);
    }
    if builder.duplicate_ids() > 0 {
        tracing::warn!(duplicates = builder.duplicate_ids(), "records with repeated ids were replaced");
    }
    let n = builder.records();
    Ok((builder.finish(), n))
}
