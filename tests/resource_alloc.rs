use stats_alloc::{Region, StatsAlloc, INSTRUMENTED_SYSTEM};
use std::alloc::System;
use std::io;

#[global_allocator]
static GLOBAL: &StatsAlloc<System> = &INSTRUMENTED_SYSTEM;

#[test]
fn batch_writer_allocations_do_not_grow_with_line_count() {
    // Allocation counts, not RSS: portable across OSes/CI.
    let labels: Vec<String> = (0..1_000).map(|i| format!("P_{i}")).collect();
    let n = 50_000usize;

    // Collecting every line first allocates per line.
    let r_collect = Region::new(&GLOBAL);
    let lines: Vec<String> = (0..n)
        .map(|i| format!("{} {} {:.6}\n", labels[i % 1_000], labels[(i + 1) % 1_000], 0.5))
        .collect();
    let s_collect = r_collect.change();
    assert_eq!(lines.len(), n);
    drop(lines);

    // The batch writer reuses one buffer across flushes.
    let r_stream = Region::new(&GLOBAL);
    let mut w = starsim::BatchWriter::with_threshold(io::sink(), 4_096);
    for i in 0..n {
        w.write_triple(&labels[i % 1_000], &labels[(i + 1) % 1_000], 0.5).unwrap();
    }
    let batches = w.batches();
    w.finish().unwrap();
    let s_stream = r_stream.change();

    assert!(batches > 100, "expected many flushes, got {batches}");

    let a_collect = s_collect.allocations;
    let a_stream = s_stream.allocations;
    assert!(
        a_stream * 10 < a_collect,
        "expected streaming allocations << collecting allocations (collect={a_collect}, stream={a_stream})"
    );
}
