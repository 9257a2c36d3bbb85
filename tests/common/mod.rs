use embed_pipeline::{
    EmbeddingPipeline, HashEncoder, NormalizerOptions, PipelineConfig, TextNormalizer,
    WhitespaceSegmenter,
};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Test utilities and common setup functions
pub struct TestHelper;

impl TestHelper {
    /// Build a pipeline over the deterministic hash encoder
    pub fn pipeline(
        read_buffer_size: usize,
        batch_size: usize,
        dimension: usize,
    ) -> EmbeddingPipeline {
        let config = PipelineConfig {
            read_buffer_size,
            batch_size,
            normalizer: NormalizerOptions {
                tokenize: true,
                lower_case: true,
            },
            ..Default::default()
        };
        let normalizer = TextNormalizer::new(config.normalizer, Box::new(WhitespaceSegmenter));
        EmbeddingPipeline::new(config, normalizer, Arc::new(HashEncoder::new(dimension, false)))
            .expect("valid test pipeline config")
    }

    /// Write input lines to a file inside `dir` and return its path
    pub fn write_input(dir: &TempDir, name: &str, lines: &[&str]) -> PathBuf {
        let path = dir.path().join(name);
        let mut content = lines.join("\n");
        if !lines.is_empty() {
            content.push('\n');
        }
        fs::write(&path, content).expect("write test input");
        path
    }

    /// Run a pipeline from an input file to an output file, returning the
    /// processed line count
    pub fn run_file(pipeline: &EmbeddingPipeline, input: &Path, output: &Path) -> usize {
        let source = BufReader::new(File::open(input).expect("open test input"));
        let sink = BufWriter::new(File::create(output).expect("create test output"));
        pipeline.run(source, sink).expect("pipeline run").lines
    }
}
