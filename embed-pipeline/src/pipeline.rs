use std::io::{BufRead, Write};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::info;

use crate::config::PipelineConfig;
use crate::encoder::{BatchEncoder, SentenceEncoder};
use crate::error::Result;
use crate::normalize::TextNormalizer;
use crate::reader::LineReader;
use crate::writer::VectorWriter;

/// Cumulative counters for one pipeline run
#[derive(Debug, Clone, Copy, Default)]
pub struct RunStats {
    /// Input lines processed so far
    pub lines: usize,
    /// Bytes appended to the output sink so far
    pub bytes_written: u64,
    /// Wall-clock time since the run started
    pub elapsed: Duration,
}

/// Drives the full read → normalize → encode → write sequence.
///
/// Groups are processed strictly one at a time in input order; no group is
/// touched before the previous group's write has completed. Memory stays
/// bounded by one group of text plus one group's matrix. Any stage error
/// aborts the run, leaving whatever complete groups were already flushed in
/// the sink.
pub struct EmbeddingPipeline {
    config: PipelineConfig,
    normalizer: TextNormalizer,
    encoder: Arc<dyn SentenceEncoder>,
}

impl EmbeddingPipeline {
    /// Create a pipeline; fails if the config's sizes are unusable
    pub fn new(
        config: PipelineConfig,
        normalizer: TextNormalizer,
        encoder: Arc<dyn SentenceEncoder>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            normalizer,
            encoder,
        })
    }

    /// Output dimensionality of the attached encoder
    pub fn dimension(&self) -> usize {
        self.encoder.dimension()
    }

    /// Run the pipeline from `source` to `sink` until the source is
    /// exhausted; see [`run_with_progress`](Self::run_with_progress).
    pub fn run<R: BufRead, W: Write>(&self, source: R, sink: W) -> Result<RunStats> {
        self.run_with_progress(source, sink, |_| {})
    }

    /// Run the pipeline, invoking `progress` after every completed group.
    ///
    /// Both handles are owned by the run: the source is consumed and the
    /// sink is flushed on success, dropped (closed) on every path. The
    /// returned stats hold the final line count, byte count, and elapsed
    /// wall-clock time.
    pub fn run_with_progress<R, W, F>(&self, source: R, sink: W, mut progress: F) -> Result<RunStats>
    where
        R: BufRead,
        W: Write,
        F: FnMut(&RunStats),
    {
        let started = Instant::now();
        let mut stats = RunStats::default();
        let mut next_report = self.config.progress_interval;

        let reader = LineReader::new(source, self.config.read_buffer_size);
        let batch_encoder = BatchEncoder::new(self.encoder.clone(), self.config.batch_size);
        let mut writer = VectorWriter::new(sink, self.encoder.dimension(), self.config.encoding)?;

        for group in reader {
            let group = group?;

            let mut normalized = Vec::with_capacity(group.len());
            for unit in &group {
                normalized.push(self.normalizer.normalize(unit)?);
            }

            let matrix = batch_encoder.encode_group(&normalized)?;
            writer.write_matrix(&matrix)?;

            stats.lines += group.len();
            stats.bytes_written = writer.bytes_written();
            stats.elapsed = started.elapsed();
            progress(&stats);

            if self.config.progress_interval > 0 && stats.lines >= next_report {
                info!(
                    lines = stats.lines,
                    elapsed_s = stats.elapsed.as_secs_f64(),
                    "embedding progress"
                );
                next_report += self.config.progress_interval;
            }
        }

        stats.bytes_written = writer.finish()?;
        stats.elapsed = started.elapsed();
        info!(
            lines = stats.lines,
            bytes = stats.bytes_written,
            elapsed_s = stats.elapsed.as_secs_f64(),
            "embedding run complete"
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NormalizerOptions;
    use crate::encoder::HashEncoder;
    use crate::normalize::WhitespaceSegmenter;
    use std::io::Cursor;

    fn pipeline(read_buffer_size: usize, batch_size: usize, dim: usize) -> EmbeddingPipeline {
        let config = PipelineConfig {
            read_buffer_size,
            batch_size,
            ..Default::default()
        };
        let normalizer = TextNormalizer::new(
            NormalizerOptions {
                tokenize: true,
                lower_case: true,
            },
            Box::new(WhitespaceSegmenter),
        );
        EmbeddingPipeline::new(config, normalizer, Arc::new(HashEncoder::new(dim, false))).unwrap()
    }

    fn run_to_vec(p: &EmbeddingPipeline, input: &str) -> (RunStats, Vec<u8>) {
        let mut out = Vec::new();
        let stats = p.run(Cursor::new(input.to_string()), &mut out).unwrap();
        (stats, out)
    }

    #[test]
    fn test_one_row_per_input_line() {
        let p = pipeline(3, 2, 8);
        let (stats, out) = run_to_vec(&p, "one\ntwo\nthree\nfour\nfive\n");
        assert_eq!(stats.lines, 5);
        assert_eq!(out.len(), 5 * 8 * 4);
        assert_eq!(stats.bytes_written, out.len() as u64);
    }

    #[test]
    fn test_empty_input_produces_empty_output() {
        let p = pipeline(4, 4, 8);
        let (stats, out) = run_to_vec(&p, "");
        assert_eq!(stats.lines, 0);
        assert!(out.is_empty());
    }

    #[test]
    fn test_single_line_minimal_sizes() {
        let p = pipeline(1, 1, 4);
        let (stats, out) = run_to_vec(&p, "hello\n");
        assert_eq!(stats.lines, 1);
        assert_eq!(out.len(), 4 * 4);
    }

    #[test]
    fn test_whitespace_only_line_still_yields_a_row() {
        let p = pipeline(10, 10, 4);
        let (stats, out) = run_to_vec(&p, "   \n");
        assert_eq!(stats.lines, 1);
        assert_eq!(out.len(), 4 * 4);
    }

    #[test]
    fn test_output_independent_of_buffer_and_batch_sizes() {
        let input = "Alpha one.\nBeta two!\nGamma.\nDelta four?\nEpsilon\n";
        let (_, baseline) = run_to_vec(&pipeline(10_000, 32, 16), input);
        for (b, k) in [(1, 1), (2, 3), (5, 2), (3, 7)] {
            let (_, out) = run_to_vec(&pipeline(b, k, 16), input);
            assert_eq!(out, baseline, "B={} K={}", b, k);
        }
    }

    #[test]
    fn test_rerun_is_byte_identical() {
        let p = pipeline(2, 2, 16);
        let input = "Repeatable input.\nSecond line.\n";
        let (_, first) = run_to_vec(&p, input);
        let (_, second) = run_to_vec(&p, input);
        assert_eq!(first, second);
    }

    #[test]
    fn test_progress_callback_sees_monotonic_lines() {
        let p = pipeline(2, 1, 4);
        let mut seen = Vec::new();
        let mut out = Vec::new();
        p.run_with_progress(
            Cursor::new("a\nb\nc\nd\ne\n".to_string()),
            &mut out,
            |s| seen.push(s.lines),
        )
        .unwrap();
        assert_eq!(seen, vec![2, 4, 5]);
    }

    #[test]
    fn test_invalid_config_rejected_at_construction() {
        let config = PipelineConfig {
            read_buffer_size: 0,
            ..Default::default()
        };
        let normalizer =
            TextNormalizer::new(NormalizerOptions::default(), Box::new(WhitespaceSegmenter));
        assert!(
            EmbeddingPipeline::new(config, normalizer, Arc::new(HashEncoder::new(4, false)))
                .is_err()
        );
    }
}
