use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{PipelineError, Result};

/// Binary encoding of a single embedding value in the output file.
///
/// The element width and byte order travel with the model configuration so
/// that every stage writes the same layout; the output carries no header to
/// announce it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ValueEncoding {
    /// Little-endian IEEE 754 single precision (4 bytes)
    #[default]
    F32Le,
    /// Big-endian IEEE 754 single precision (4 bytes)
    F32Be,
}

impl ValueEncoding {
    /// Width in bytes of one encoded value
    pub fn width(&self) -> usize {
        4
    }
}

/// Text normalization switches applied before sub-word segmentation.
///
/// These mirror the flags stored alongside a trained model; the segmentation
/// model itself is applied unconditionally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NormalizerOptions {
    /// Apply word-level tokenization before segmentation
    pub tokenize: bool,
    /// Case-fold the text before segmentation
    pub lower_case: bool,
}

/// Configuration for one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Lines held in memory per read group (B)
    pub read_buffer_size: usize,
    /// Sentences submitted to the encoder per call (K)
    pub batch_size: usize,
    /// Normalization switches carried from the model
    pub normalizer: NormalizerOptions,
    /// Binary layout of output values
    pub encoding: ValueEncoding,
    /// Report progress every this many lines (0 disables)
    pub progress_interval: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            read_buffer_size: 10_000,
            batch_size: 32,
            normalizer: NormalizerOptions::default(),
            encoding: ValueEncoding::default(),
            progress_interval: 10_000,
        }
    }
}

impl PipelineConfig {
    /// Check that the buffering knobs are usable.
    ///
    /// The read buffer (B) and the encoder batch (K) are independent sizes;
    /// both must be at least 1.
    pub fn validate(&self) -> Result<()> {
        if self.read_buffer_size == 0 {
            return Err(PipelineError::configuration(
                "read buffer size must be at least 1",
            ));
        }
        if self.batch_size == 0 {
            return Err(PipelineError::configuration("batch size must be at least 1"));
        }
        Ok(())
    }
}

/// Sidecar configuration describing the embedding model.
///
/// Loaded once before the pipeline starts, typically from a JSON file saved
/// next to the model weights. Carries the normalization flags the model was
/// trained with, its output dimensionality, and an optional sub-word
/// tokenizer file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSpec {
    /// Output dimensionality of the encoder (D)
    pub dimension: usize,
    /// Word-tokenize inputs before segmentation
    #[serde(default)]
    pub tokenize: bool,
    /// Lower-case inputs before segmentation
    #[serde(default)]
    pub lower_case: bool,
    /// L2-normalize embedding vectors
    #[serde(default)]
    pub normalize: bool,
    /// Sub-word tokenizer definition (HuggingFace `tokenizer.json`), if any
    #[serde(default)]
    pub tokenizer_file: Option<PathBuf>,
    /// Output value layout
    #[serde(default)]
    pub encoding: ValueEncoding,
}

impl ModelSpec {
    /// Load a model spec from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let spec: ModelSpec = serde_json::from_str(&raw)
            .map_err(|e| PipelineError::model_spec(format!("{}: {}", path.display(), e)))?;
        spec.validate()?;
        Ok(spec)
    }

    /// Check the spec for values the pipeline cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.dimension == 0 {
            return Err(PipelineError::model_spec(
                "embedding dimension must be at least 1",
            ));
        }
        Ok(())
    }

    /// Normalization switches carried by this model
    pub fn normalizer_options(&self) -> NormalizerOptions {
        NormalizerOptions {
            tokenize: self.tokenize,
            lower_case: self.lower_case,
        }
    }
}
