use std::sync::Arc;

use tracing::debug;

use crate::error::{PipelineError, Result};

/// The embedding model's encode capability.
///
/// Maps an ordered list of normalized strings to one fixed-width vector per
/// string, in the same order. The implementation is free to exploit hardware
/// batching internally; from the pipeline's side the call is opaque,
/// blocking, and synchronous.
pub trait SentenceEncoder: Send + Sync {
    /// Fixed output dimensionality (D) of every vector
    fn dimension(&self) -> usize;

    /// Encode a batch of normalized strings, one row per input, input order
    fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// One group's embeddings as a row-major (rows × dim) f32 matrix
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingMatrix {
    dim: usize,
    data: Vec<f32>,
}

impl EmbeddingMatrix {
    /// Create an empty matrix with the given row width
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            data: Vec::new(),
        }
    }

    /// Append one row; the row width must match the matrix width
    pub fn push_row(&mut self, row: &[f32]) -> Result<()> {
        if row.len() != self.dim {
            return Err(PipelineError::DimensionMismatch {
                expected: self.dim,
                actual: row.len(),
            });
        }
        self.data.extend_from_slice(row);
        Ok(())
    }

    /// Row width (D)
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        if self.dim == 0 {
            0
        } else {
            self.data.len() / self.dim
        }
    }

    /// Row-major view of all values
    pub fn values(&self) -> &[f32] {
        &self.data
    }

    /// One row by index, if present
    pub fn row(&self, index: usize) -> Option<&[f32]> {
        let start = index.checked_mul(self.dim)?;
        self.data.get(start..start + self.dim)
    }
}

/// Partitions a group into fixed-size batches and re-assembles the encoder's
/// per-batch output into one ordered matrix.
///
/// Row i of the result always corresponds to unit i of the group; the batch
/// size only changes how the work is submitted, never the output.
pub struct BatchEncoder {
    encoder: Arc<dyn SentenceEncoder>,
    batch_size: usize,
}

impl BatchEncoder {
    /// Create a batch encoder submitting up to `batch_size` units per call
    pub fn new(encoder: Arc<dyn SentenceEncoder>, batch_size: usize) -> Self {
        Self {
            encoder,
            batch_size: batch_size.max(1),
        }
    }

    /// The configured batch size (K)
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Encode one group of normalized units into an (N × D) matrix.
    ///
    /// Encoder failures propagate unmodified; a batch whose output has the
    /// wrong row count or width is a contract violation and fails the run.
    pub fn encode_group(&self, units: &[String]) -> Result<EmbeddingMatrix> {
        let dim = self.encoder.dimension();
        let mut matrix = EmbeddingMatrix::new(dim);

        for batch in units.chunks(self.batch_size) {
            let rows = self.encoder.encode_batch(batch)?;
            if rows.len() != batch.len() {
                return Err(PipelineError::RowCountMismatch {
                    expected: batch.len(),
                    actual: rows.len(),
                });
            }
            for row in &rows {
                matrix.push_row(row)?;
            }
            debug!(batch_len = batch.len(), "encoded batch");
        }

        Ok(matrix)
    }
}

/// Deterministic stand-in encoder derived from an md5 digest of the text.
///
/// Every value is a sinusoid of the text's hash, so identical inputs always
/// produce identical vectors at negligible CPU cost. Serves as the built-in
/// model for smoke runs and as the encoder used throughout the tests.
pub struct HashEncoder {
    dimension: usize,
    normalize: bool,
}

impl HashEncoder {
    /// Create a hash encoder with the given output dimensionality
    pub fn new(dimension: usize, normalize: bool) -> Self {
        Self {
            dimension: dimension.max(1),
            normalize,
        }
    }

    fn encode_one(&self, text: &str) -> Vec<f32> {
        let digest = md5::compute(text.as_bytes());
        let mut seed_bytes = [0u8; 8];
        seed_bytes.copy_from_slice(&digest.0[..8]);
        let seed = u64::from_le_bytes(seed_bytes);
        let mut row: Vec<f32> = (0..self.dimension)
            .map(|i| (((seed >> (i % 32)) as u32) as f32 * 1e-4).sin())
            .collect();
        if self.normalize {
            l2_normalize_in_place(&mut row);
        }
        row
    }
}

impl SentenceEncoder for HashEncoder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.encode_one(t)).collect())
    }
}

/// Scale a vector to unit L2 norm; zero vectors are left untouched
pub fn l2_normalize_in_place(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}
