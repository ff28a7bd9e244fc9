//! Batched writing of similarity triples.

use crate::config::DEFAULT_FLUSH_THRESHOLD;
use crate::error::{Error, Result};
use crate::index::IndexedGraph;
use crate::random_walk::SimilarityResult;
use std::fmt::Write as _;
use std::io::{self, Write};

/// Text writer that buffers lines and writes them out in large batches.
///
/// The buffer is written whenever it grows past the threshold and is reused
/// afterwards, so memory stays bounded no matter how many lines go through.
#[derive(Debug)]
pub struct BatchWriter<W: Write> {
    inner: W,
    buf: String,
    threshold: usize,
    lines: usize,
    batches: usize,
}

impl<W: Write> BatchWriter<W> {
    pub fn new(inner: W) -> Self {
        Self::with_threshold(inner, DEFAULT_FLUSH_THRESHOLD)
    }

    pub fn with_threshold(inner: W, threshold: usize) -> Self {
        Self {
            inner,
            buf: String::with_capacity(threshold.saturating_add(256).min(1 << 24)),
            threshold,
            lines: 0,
            batches: 0,
        }
    }

    /// Append `<source> <target> <score>` with six decimals.
    pub fn write_triple(&mut self, source: &str, target: &str, score: f64) -> io::Result<()> {
        writeln!(self.buf, "{source} {target} {score:.6}").map_err(io::Error::other)?;
        self.lines += 1;
        if self.buf.len() > self.threshold {
            self.write_batch()?;
        }
        Ok(())
    }

    fn write_batch(&mut self) -> io::Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        self.inner.write_all(self.buf.as_bytes())?;
        self.batches += 1;
        tracing::debug!(bytes = self.buf.len(), batch = self.batches, "wrote output batch");
        self.buf.clear();
        Ok(())
    }

    /// Lines written so far, buffered or not.
    pub fn lines(&self) -> usize {
        self.lines
    }

    /// Batches handed to the inner writer so far.
    pub fn batches(&self) -> usize {
        self.batches
    }

    /// Bytes currently held in the buffer.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Write what is left, flush, and return the inner writer.
    pub fn finish(mut self) -> io::Result<W> {
        self.write_batch()?;
        self.inner.flush()?;
        Ok(self.inner)
    }
}

/// Stream one line per `(source, target, score)` of `result` into `out`.
///
/// Returns the number of lines written.
pub fn write_similarities<W: Write>(
    graph: &IndexedGraph,
    result: &SimilarityResult,
    out: &mut BatchWriter<W>,
) -> Result<usize> {
    let mut written = 0usize;
    for sim in result.sources() {
        let source = graph.star_label(sim.source).ok_or(Error::UnlabeledNode(sim.source))?;
        for &(target, score) in &sim.scores {
            let target = graph.star_label(target).ok_or(Error::UnlabeledNode(target))?;
            out.write_triple(source, target, score)?;
            written += 1;
        }
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_six_decimals() {
        let mut w = BatchWriter::new(Vec::new());
        w.write_triple("P_1", "P_2", 0.5).unwrap();
        w.write_triple("P_1", "P_3", 1.0 / 3.0).unwrap();
        let bytes = w.finish().unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "P_1 P_2 0.500000\nP_1 P_3 0.333333\n");
    }

    #[test]
    fn flushes_only_past_threshold() {
        let mut w = BatchWriter::with_threshold(Vec::new(), 40);
        w.write_triple("P_1", "P_2", 0.25).unwrap(); // 17 bytes
        w.write_triple("P_1", "P_3", 0.25).unwrap(); // 34 bytes
        assert_eq!(w.batches(), 0);
        assert_eq!(w.buffered(), 34);
        w.write_triple("P_1", "P_4", 0.5).unwrap(); // 51 > 40
        assert_eq!(w.batches(), 1);
        assert_eq!(w.buffered(), 0);
        assert_eq!(w.lines(), 3);
        let out = String::from_utf8(w.finish().unwrap()).unwrap();
        assert_eq!(out.lines().count(), 3);
    }

    #[test]
    fn finish_on_empty_writes_nothing() {
        let w = BatchWriter::new(Vec::new());
        assert!(w.finish().unwrap().is_empty());
    }

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("disk full"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn io_failure_propagates() {
        let mut w = BatchWriter::with_threshold(Broken, 1);
        assert!(w.write_triple("P_1", "P_2", 1.0).is_err());
    }
}
