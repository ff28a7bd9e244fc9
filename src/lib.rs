//! # starsim
//!
//! Similarity between "star" entities (e.g. publications) that share metadata
//! (authors, venues, keywords, ...), estimated with two-hop random walks over a
//! weighted star/attribute bipartite graph.
//!
//! Pipeline, each stage finishing before the next starts:
//!
//! 1. [`builder`]: records -> [`BipartiteGraph`], each record spreading weight 1
//!    over its attribute values.
//! 2. [`prune()`]: drop attributes touching at most one star, then isolated stars.
//! 3. [`normalize()`]: optional per-attribute re-weighting.
//! 4. [`IndexedGraph`]: dense ids and a CSR layout.
//! 5. [`TransitionTable`]: per-node distributions, computed on a worker pool.
//! 6. [`random_walk`]: `N` two-hop walks per star, self-loops set aside.
//! 7. [`output`]: `<source> <target> <score>` lines in bounded batches.
//!
//! ```no_run
//! use starsim::{run_paths, SimConfig, WeightingScheme};
//! use std::path::Path;
//!
//! let config = SimConfig::new(
//!     vec!["authors".into(), "venue".into()],
//!     WeightingScheme::Publication,
//!     10_000,
//!     4,
//! )
//! .with_seed(42);
//! let summary = run_paths(&config, Path::new("papers.jsonl"), Path::new("sims.txt"))?;
//! println!("{} pairs, self-loop rate {:.4}", summary.triples, summary.self_loop_rate);
//! # Ok::<(), starsim::Error>(())
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod graph;
pub mod index;
pub mod output;
pub mod pipeline;
pub mod prune;
pub mod random_walk;
pub mod record;
pub mod transition;

pub use builder::{build_graph, GraphBuilder};
pub use config::{AttributeSchema, SimConfig, WeightingScheme};
pub use error::{Error, Result};
pub use graph::{BipartiteGraph, NodeKey, NodeKind, WeightedGraphRef};
pub use index::IndexedGraph;
pub use output::{write_similarities, BatchWriter};
pub use pipeline::{compute, run, run_paths, RunSummary, Similarities};
pub use prune::{normalize, prune, PruneReport};
pub use random_walk::{
    normalize_tally, simulate, source_similarity, two_hop_tally, LandingTally, SimilarityResult,
    SourceSimilarity, TwoHopConfig,
};
pub use record::{Record, RecordReader};
pub use transition::TransitionTable;
