//! Transition probability estimation.
//!
//! Each node's outgoing weights are normalized into a categorical distribution
//! \(p(v \to u) = w(v, u) / \sum_x w(v, x)\), and an alias table is built next
//! to it so that a single draw costs O(1).
//!
//! Rows are independent, so the node range is cut into one contiguous
//! partition per worker and the partitions are joined back in index order.

use crate::graph::WeightedGraphRef;
use rand::Rng;
use rayon::prelude::*;
use rayon::ThreadPool;
use std::ops::Range;

/// Per-node transition distributions with alias tables, in CSR layout.
#[derive(Debug, Clone)]
pub struct TransitionTable {
    offsets: Vec<usize>,
    targets: Vec<usize>,
    probs: Vec<f64>,
    alias_j: Vec<u32>,
    alias_q: Vec<f64>,
}

#[derive(Debug, Default)]
struct Partition {
    degrees: Vec<usize>,
    targets: Vec<usize>,
    probs: Vec<f64>,
    alias_j: Vec<u32>,
    alias_q: Vec<f64>,
}

impl TransitionTable {
    /// Estimate transition distributions for every node of `graph` on `pool`.
    ///
    /// # Panics
    ///
    /// If a node has no neighbors or zero total weight. Pruning removes such
    /// nodes, so this is an invariant violation.
    pub fn estimate<G: WeightedGraphRef + Sync>(graph: &G, pool: &ThreadPool) -> Self {
        let n = graph.node_count();
        let parts = pool.current_num_threads().max(1);
        let chunk = n.div_ceil(parts).max(1);
        let ranges: Vec<Range<usize>> = (0..n).step_by(chunk).map(|s| s..(s + chunk).min(n)).collect();

        let partitions: Vec<Partition> =
            pool.install(|| ranges.into_par_iter().map(|r| estimate_partition(graph, r)).collect());

        let mut table = Self {
            offsets: Vec::with_capacity(n + 1),
            targets: Vec::new(),
            probs: Vec::new(),
            alias_j: Vec::new(),
            alias_q: Vec::new(),
        };
        table.offsets.push(0);
        for part in partitions {
            for deg in part.degrees {
                let last = table.offsets[table.offsets.len() - 1];
                table.offsets.push(last + deg);
            }
            table.targets.extend(part.targets);
            table.probs.extend(part.probs);
            table.alias_j.extend(part.alias_j);
            table.alias_q.extend(part.alias_q);
        }
        debug_assert_eq!(table.offsets.len(), n + 1);
        table
    }

    /// Sequential estimation, used where no pool is at hand.
    pub fn estimate_sequential<G: WeightedGraphRef>(graph: &G) -> Self {
        let n = graph.node_count();
        let part = estimate_partition(graph, 0..n);
        let mut offsets = Vec::with_capacity(n + 1);
        offsets.push(0);
        for deg in part.degrees {
            offsets.push(offsets[offsets.len() - 1] + deg);
        }
        Self {
            offsets,
            targets: part.targets,
            probs: part.probs,
            alias_j: part.alias_j,
            alias_q: part.alias_q,
        }
    }

    /// `(targets, probabilities)` of node `v`.
    pub fn distribution(&self, v: usize) -> (&[usize], &[f64]) {
        let r = self.offsets[v]..self.offsets[v + 1];
        (&self.targets[r.clone()], &self.probs[r])
    }

    /// Draw a neighbor position of `v` (an index into `distribution(v).0`).
    #[inline]
    pub fn sample_position<R: Rng>(&self, v: usize, rng: &mut R) -> usize {
        let r = self.offsets[v]..self.offsets[v + 1];
        alias_draw(&self.alias_j[r.clone()], &self.alias_q[r], rng)
    }

    /// Draw a neighbor of `v`.
    #[inline]
    pub fn sample<R: Rng>(&self, v: usize, rng: &mut R) -> usize {
        self.targets[self.offsets[v] + self.sample_position(v, rng)]
    }
}

impl WeightedGraphRef for TransitionTable {
    fn node_count(&self) -> usize {
        self.offsets.len() - 1
    }

    fn neighbors_and_weights_ref(&self, node: usize) -> (&[usize], &[f64]) {
        self.distribution(node)
    }
}

fn estimate_partition<G: WeightedGraphRef>(graph: &G, nodes: Range<usize>) -> Partition {
    let mut part = Partition::default();
    for v in nodes {
        let (nbrs, wts) = graph.neighbors_and_weights_ref(v);
        debug_assert_eq!(nbrs.len(), wts.len());
        let total: f64 = wts.iter().sum();
        assert!(
            !nbrs.is_empty() && total > 0.0,
            "node {v} has no outgoing weight; prune the graph before estimating transitions"
        );

        let start = part.probs.len();
        part.probs.extend(wts.iter().map(|w| w / total));
        let (j, q) = alias_setup(&part.probs[start..]);

        part.degrees.push(nbrs.len());
        part.targets.extend_from_slice(nbrs);
        part.alias_j.extend(j);
        part.alias_q.extend(q);
    }
    part
}

/// Walker/Vose alias table for a normalized distribution.
fn alias_setup(probs: &[f64]) -> (Vec<u32>, Vec<f64>) {
    let k = probs.len();
    let mut q = vec![0.0f64; k];
    let mut j: Vec<u32> = (0..k).map(alias_index).collect();

    let mut smaller: Vec<usize> = Vec::with_capacity(k);
    let mut larger: Vec<usize> = Vec::with_capacity(k);

    for kk in 0..k {
        q[kk] = (k as f64) * probs[kk];
        if q[kk] < 1.0 {
            smaller.push(kk);
        } else {
            larger.push(kk);
        }
    }

    while let (Some(small), Some(large)) = (smaller.pop(), larger.pop()) {
        j[small] = alias_index(large);
        q[large] = q[large] + q[small] - 1.0;
        if q[large] < 1.0 {
            smaller.push(large);
        } else {
            larger.push(large);
        }
    }

    // Leftovers differ from 1.0 only by rounding.
    for kk in smaller.into_iter().chain(larger) {
        q[kk] = 1.0;
    }

    (j, q)
}

/// Row position as stored in `alias_j`.
///
/// # Panics
///
/// If a row has more than `u32::MAX` entries.
fn alias_index(i: usize) -> u32 {
    u32::try_from(i).unwrap_or_else(|_| panic!("alias row position {i} does not fit in u32"))
}

#[inline]
fn alias_draw<R: Rng>(j: &[u32], q: &[f64], rng: &mut R) -> usize {
    debug_assert_eq!(j.len(), q.len());
    let k = j.len();
    if k == 1 {
        return 0;
    }
    let kk = rng.random_range(0..k);
    if rng.random::<f64>() < q[kk] {
        kk
    } else {
        j[kk] as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[derive(Debug, Clone)]
    struct RefWeightedAdj {
        adj: Vec<Vec<usize>>,
        wts: Vec<Vec<f64>>,
    }

    impl WeightedGraphRef for RefWeightedAdj {
        fn node_count(&self) -> usize {
            self.adj.len()
        }

        fn neighbors_and_weights_ref(&self, node: usize) -> (&[usize], &[f64]) {
            (&self.adj[node], &self.wts[node])
        }
    }

    fn star_graph() -> RefWeightedAdj {
        // 0, 1, 2 are stars around attribute 3; node 0 also touches 4.
        RefWeightedAdj {
            adj: vec![vec![3, 4], vec![3], vec![3], vec![0, 1, 2], vec![0, 1]],
            wts: vec![vec![0.5, 0.5], vec![1.0], vec![1.0], vec![0.5, 1.0, 1.0], vec![0.5, 0.5]],
        }
    }

    fn pool(n: usize) -> ThreadPool {
        rayon::ThreadPoolBuilder::new().num_threads(n).build().unwrap()
    }

    fn assert_close(a: f64, b: f64, eps: f64) {
        assert!((a - b).abs() <= eps, "expected |{a} - {b}| <= {eps}");
    }

    #[test]
    fn rows_sum_to_one() {
        let g = star_graph();
        let t = TransitionTable::estimate(&g, &pool(2));
        for v in 0..g.node_count() {
            let (_, p) = t.distribution(v);
            assert_close(p.iter().sum::<f64>(), 1.0, 1e-12);
        }
        let (targets, p) = t.distribution(3);
        assert_eq!(targets, &[0, 1, 2]);
        assert_close(p[0], 0.2, 1e-12);
        assert_close(p[1], 0.4, 1e-12);
    }

    #[test]
    fn partitioning_does_not_change_the_table() {
        let g = star_graph();
        let seq = TransitionTable::estimate_sequential(&g);
        for workers in [1, 2, 3, 8] {
            let par = TransitionTable::estimate(&g, &pool(workers));
            assert_eq!(par.offsets, seq.offsets);
            assert_eq!(par.targets, seq.targets);
            assert_eq!(par.probs, seq.probs);
            assert_eq!(par.alias_j, seq.alias_j);
            assert_eq!(par.alias_q, seq.alias_q);
        }
    }

    #[test]
    #[should_panic(expected = "no outgoing weight")]
    fn empty_row_is_an_invariant_violation() {
        let g = RefWeightedAdj { adj: vec![vec![]], wts: vec![vec![]] };
        let _ = TransitionTable::estimate_sequential(&g);
    }

    #[test]
    fn alias_draw_distribution_smoke() {
        let probs = [0.1, 0.6, 0.3];
        let (j, q) = alias_setup(&probs);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut counts = [0usize; 3];
        let n = 100_000;
        for _ in 0..n {
            counts[alias_draw(&j, &q, &mut rng)] += 1;
        }
        for (c, p) in counts.iter().zip(probs) {
            assert_close(*c as f64 / n as f64, p, 0.01);
        }
    }

    #[test]
    fn table_draws_follow_row_weights() {
        // Node 3 sits past other rows, with probabilities 0.2 / 0.4 / 0.4.
        let g = star_graph();
        let t = TransitionTable::estimate(&g, &pool(2));
        let mut rng = ChaCha8Rng::seed_from_u64(19);
        let mut counts = [0usize; 3];
        let n = 100_000;
        for _ in 0..n {
            counts[t.sample(3, &mut rng)] += 1;
        }
        assert_close(counts[0] as f64 / n as f64, 0.2, 0.01);
        assert_close(counts[1] as f64 / n as f64, 0.4, 0.01);
        assert_close(counts[2] as f64 / n as f64, 0.4, 0.01);
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    #[should_panic(expected = "does not fit in u32")]
    fn oversized_alias_row_is_rejected() {
        alias_index(u32::MAX as usize + 1);
    }

    #[test]
    fn single_neighbor_always_drawn() {
        let g = star_graph();
        let t = TransitionTable::estimate_sequential(&g);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..100 {
            assert_eq!(t.sample(1, &mut rng), 3);
        }
    }
}
