//! End-to-end orchestration: records -> graph -> transitions -> walks -> output.

use crate::builder::build_graph;
use crate::config::{AttributeSchema, SimConfig};
use crate::error::Result;
use crate::index::IndexedGraph;
use crate::output::{write_similarities, BatchWriter};
use crate::prune::{normalize, prune, PruneReport};
use crate::random_walk::{simulate, SimilarityResult, TwoHopConfig};
use crate::record::RecordReader;
use crate::transition::TransitionTable;
use rand::Rng;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::time::Instant;

/// Everything computed before output is written.
#[derive(Debug, Clone)]
pub struct Similarities {
    pub graph: IndexedGraph,
    pub result: SimilarityResult,
    pub prune: PruneReport,
    /// Records read from the input.
    pub records: usize,
    /// Base seed actually used.
    pub seed: u64,
}

/// Summary of a completed run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub records: usize,
    pub stars: usize,
    pub nodes: usize,
    pub prune: PruneReport,
    pub triples: usize,
    pub self_loop_rate: f64,
    pub seed: u64,
}

/// Build the graph from `input` and compute all star similarities.
///
/// Configuration is validated before the first line is read.
pub fn compute<R: BufRead>(config: &SimConfig, input: R) -> Result<Similarities> {
    let schema = config.validate()?;
    compute_with_schema(config, schema, input)
}

fn compute_with_schema<R: BufRead>(
    config: &SimConfig,
    schema: AttributeSchema,
    input: R,
) -> Result<Similarities> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.workers)
        .thread_name(|i| format!("starsim-worker-{i}"))
        .build()?;

    let t = Instant::now();
    let reader = RecordReader::new(input, &config.id_field, &schema);
    let (mut graph, records) = build_graph(schema.clone(), reader)?;
    tracing::info!(
        records,
        nodes = graph.node_count(),
        elapsed_ms = t.elapsed().as_millis() as u64,
        "read the graph"
    );

    let t = Instant::now();
    let report = prune(&mut graph);
    for (letter, count) in graph.counts_by_letter() {
        tracing::info!(%letter, count, "nodes in the network");
    }
    normalize(&mut graph, config.weighting);
    let graph = IndexedGraph::from_bipartite(graph);
    tracing::info!(
        nodes = graph.node_count(),
        stars = graph.star_count(),
        edges = graph.edge_count(),
        elapsed_ms = t.elapsed().as_millis() as u64,
        "pruned and indexed the graph"
    );

    let t = Instant::now();
    let table = TransitionTable::estimate(&graph, &pool);
    tracing::info!(
        workers = config.workers,
        elapsed_ms = t.elapsed().as_millis() as u64,
        "estimated transition probabilities"
    );

    let seed = config.seed.unwrap_or_else(|| rand::rng().random());
    tracing::debug!(seed, "random walk seed");
    let t = Instant::now();
    let walk_config = TwoHopConfig { walks_per_node: config.walks_per_node, seed };
    let result = simulate(&table, &graph.star_nodes(), walk_config, &pool);
    tracing::info!(
        sources = result.sources().len(),
        elapsed_ms = t.elapsed().as_millis() as u64,
        "computed random walks"
    );
    tracing::info!("random walk self-loop rate {:.6}", result.self_loop_rate());

    Ok(Similarities { graph, result, prune: report, records, seed })
}

/// Write computed similarities through a [`BatchWriter`].
pub fn write<W: Write>(config: &SimConfig, sims: &Similarities, output: W) -> Result<usize> {
    let t = Instant::now();
    let mut out = BatchWriter::with_threshold(output, config.flush_threshold);
    let triples = write_similarities(&sims.graph, &sims.result, &mut out)?;
    out.finish()?;
    tracing::info!(triples, elapsed_ms = t.elapsed().as_millis() as u64, "wrote similarities");
    Ok(triples)
}

/// Compute similarities from `input` and stream them to `output`.
pub fn run<R: BufRead, W: Write>(config: &SimConfig, input: R, output: W) -> Result<RunSummary> {
    let sims = compute(config, input)?;
    let triples = write(config, &sims, output)?;
    Ok(summarize(&sims, triples))
}

/// File-based [`run`]. The output file is only created once the similarities
/// have been computed.
pub fn run_paths(config: &SimConfig, input: &Path, output: &Path) -> Result<RunSummary> {
    let schema = config.validate()?;
    let started = Instant::now();
    let sims = compute_with_schema(config, schema, BufReader::new(File::open(input)?))?;
    let triples = write(config, &sims, BufWriter::new(File::create(output)?))?;
    tracing::info!(
        output = %output.display(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "process completed"
    );
    Ok(summarize(&sims, triples))
}

fn summarize(sims: &Similarities, triples: usize) -> RunSummary {
    RunSummary {
        records: sims.records,
        stars: sims.graph.star_count(),
        nodes: sims.graph.node_count(),
        prune: sims.prune.clone(),
        triples,
        self_loop_rate: sims.result.self_loop_rate(),
        seed: sims.seed,
    }
}
