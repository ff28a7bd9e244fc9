//! Two-hop random-walk similarity.
//!
//! For a star node `s`, `N` walks of exactly two steps are simulated
//! (star -> attribute -> star). The landing frequencies, with returns to `s`
//! set aside as self-loops, estimate how close every other star is to `s`.
//!
//! Draws are pooled by first hop: all walks that went through attribute `a`
//! share `a`'s distribution, so their second hops are drawn as one batch.
//! This is the same process as simulating every walk on its own.

use crate::transition::TransitionTable;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use rayon::ThreadPool;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TwoHopConfig {
    /// Number of two-hop walks per source node.
    pub walks_per_node: usize,
    pub seed: u64,
}

impl Default for TwoHopConfig {
    fn default() -> Self {
        Self { walks_per_node: 10_000, seed: 42 }
    }
}

/// Raw second-hop tallies for one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LandingTally {
    /// `(node, count)` for every landing other than the source, by node id.
    pub landings: Vec<(usize, usize)>,
    /// Walks that came back to the source.
    pub self_loops: usize,
}

impl LandingTally {
    /// Total number of walks tallied.
    pub fn total(&self) -> usize {
        self.self_loops + self.landings.iter().map(|&(_, c)| c).sum::<usize>()
    }
}

/// Normalized similarity distribution of one source.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceSimilarity {
    pub source: usize,
    /// `(target, score)` sorted by target; scores sum to 1 unless empty.
    pub scores: Vec<(usize, f64)>,
    pub self_loops: usize,
}

/// Run `walks` two-hop walks from `source` and tally the landings.
pub fn two_hop_tally<R: Rng>(
    table: &TransitionTable,
    source: usize,
    walks: usize,
    rng: &mut R,
) -> LandingTally {
    let (first, _) = table.distribution(source);
    let mut first_counts = vec![0usize; first.len()];
    for _ in 0..walks {
        first_counts[table.sample_position(source, rng)] += 1;
    }

    let mut landings: BTreeMap<usize, usize> = BTreeMap::new();
    let mut self_loops = 0usize;
    for (&hop, &count) in first.iter().zip(&first_counts) {
        for _ in 0..count {
            let dest = table.sample(hop, rng);
            if dest == source {
                self_loops += 1;
            } else {
                *landings.entry(dest).or_insert(0) += 1;
            }
        }
    }

    LandingTally { landings: landings.into_iter().collect(), self_loops }
}

/// Normalize a tally over the walks that did not return to the source.
pub fn normalize_tally(source: usize, tally: LandingTally) -> SourceSimilarity {
    let kept = tally.total() - tally.self_loops;
    let scores = if kept == 0 {
        Vec::new()
    } else {
        let denom = kept as f64;
        tally.landings.into_iter().map(|(t, c)| (t, c as f64 / denom)).collect()
    };
    SourceSimilarity { source, scores, self_loops: tally.self_loops }
}

/// Similarity distribution of a single source.
pub fn source_similarity<R: Rng>(
    table: &TransitionTable,
    source: usize,
    walks: usize,
    rng: &mut R,
) -> SourceSimilarity {
    normalize_tally(source, two_hop_tally(table, source, walks, rng))
}

/// Similarity distributions for a set of sources.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityResult {
    walks_per_node: usize,
    sources: Vec<SourceSimilarity>,
}

impl SimilarityResult {
    pub fn walks_per_node(&self) -> usize {
        self.walks_per_node
    }

    pub fn sources(&self) -> &[SourceSimilarity] {
        &self.sources
    }

    pub fn get(&self, source: usize) -> Option<&SourceSimilarity> {
        self.sources
            .binary_search_by_key(&source, |s| s.source)
            .ok()
            .map(|i| &self.sources[i])
    }

    pub fn total_self_loops(&self) -> usize {
        self.sources.iter().map(|s| s.self_loops).sum()
    }

    /// Fraction of all walks that returned to their source.
    pub fn self_loop_rate(&self) -> f64 {
        let walks = self.walks_per_node * self.sources.len();
        if walks == 0 {
            return 0.0;
        }
        self.total_self_loops() as f64 / walks as f64
    }

    /// Number of `(source, target)` pairs with a score.
    pub fn pair_count(&self) -> usize {
        self.sources.iter().map(|s| s.scores.len()).sum()
    }
}

/// Compute similarities for every node in `sources` on `pool`.
///
/// Each source draws from its own generator seeded by `(config.seed, source)`,
/// so the result does not depend on the pool size or scheduling.
pub fn simulate(
    table: &TransitionTable,
    sources: &[usize],
    config: TwoHopConfig,
    pool: &ThreadPool,
) -> SimilarityResult {
    let mut sorted = sources.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let per_source: Vec<SourceSimilarity> = pool.install(|| {
        sorted
            .par_iter()
            .map(|&s| {
                let mut rng = ChaCha8Rng::seed_from_u64(source_seed(config.seed, s));
                source_similarity(table, s, config.walks_per_node, &mut rng)
            })
            .collect()
    });

    SimilarityResult { walks_per_node: config.walks_per_node, sources: per_source }
}

pub(crate) fn source_seed(seed: u64, source: usize) -> u64 {
    mix64(seed ^ (source as u64).wrapping_mul(0x9e3779b97f4a7c15))
}

fn mix64(mut x: u64) -> u64 {
    x ^= x >> 30;
    x = x.wrapping_mul(0xbf58476d1ce4e5b9);
    x ^= x >> 27;
    x = x.wrapping_mul(0x94d049bb133111eb);
    x ^= x >> 31;
    x
}
