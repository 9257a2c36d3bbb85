use std::io::Write;

use tracing::debug;

use crate::config::ValueEncoding;
use crate::encoder::EmbeddingMatrix;
use crate::error::{PipelineError, Result};

/// Appends embedding matrices to a binary sink in arrival order.
///
/// Rows are written row-major in the fixed-width encoding chosen at
/// construction; the file carries no header, delimiters, or record count.
/// Each write returns only after the underlying call completes, so an abort
/// leaves the sink truncated at a group boundary, never mid-row.
pub struct VectorWriter<W: Write> {
    sink: W,
    dim: usize,
    encoding: ValueEncoding,
    rows_written: usize,
    bytes_written: u64,
}

impl<W: Write> VectorWriter<W> {
    /// Create a writer for matrices of the given row width
    pub fn new(sink: W, dim: usize, encoding: ValueEncoding) -> Result<Self> {
        if dim == 0 {
            return Err(PipelineError::configuration(
                "vector dimension must be at least 1",
            ));
        }
        Ok(Self {
            sink,
            dim,
            encoding,
            rows_written: 0,
            bytes_written: 0,
        })
    }

    /// Append one group's matrix and return the bytes written for it.
    ///
    /// The matrix width must match the writer's; a mismatch means the
    /// encoder broke its dimensionality contract.
    pub fn write_matrix(&mut self, matrix: &EmbeddingMatrix) -> Result<u64> {
        if matrix.dim() != self.dim {
            return Err(PipelineError::DimensionMismatch {
                expected: self.dim,
                actual: matrix.dim(),
            });
        }

        let values = matrix.values();
        let bytes = match self.encoding {
            // On little-endian hosts an f32 slice already has the output
            // layout, so it can be written as one byte slice.
            ValueEncoding::F32Le if cfg!(target_endian = "little") => {
                let raw: &[u8] = bytemuck::cast_slice(values);
                self.sink.write_all(raw)?;
                raw.len() as u64
            }
            ValueEncoding::F32Le => {
                for v in values {
                    self.sink.write_all(&v.to_le_bytes())?;
                }
                (values.len() * 4) as u64
            }
            ValueEncoding::F32Be => {
                for v in values {
                    self.sink.write_all(&v.to_be_bytes())?;
                }
                (values.len() * 4) as u64
            }
        };

        self.rows_written += matrix.rows();
        self.bytes_written += bytes;
        debug!(
            rows = matrix.rows(),
            total_rows = self.rows_written,
            "wrote group"
        );
        Ok(bytes)
    }

    /// Total rows written so far
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Total bytes written so far
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Flush the sink and return the total byte count, consuming the writer
    pub fn finish(mut self) -> Result<u64> {
        self.sink.flush()?;
        Ok(self.bytes_written)
    }
}
