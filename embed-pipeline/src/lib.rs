//! # embed-pipeline
//!
//! A streaming batch pipeline that turns a text file of sentences into a
//! binary file of fixed-width embedding vectors, in input order, under
//! bounded memory.
//!
//! ## Features
//!
//! - Memory-bounded line reading: the input is consumed in groups of at
//!   most B lines, independent of total file size
//! - Normalization matching the model: optional word tokenization and case
//!   folding, plus unconditional sub-word segmentation
//! - Fixed-size batching into a pluggable [`SentenceEncoder`], with strict
//!   order-preserving re-assembly
//! - Incremental, synchronous binary output: row-major f32 vectors with no
//!   header, truncatable only at group boundaries
//!
//! ## Quick Start
//!
//! ```rust
//! use embed_pipeline::{
//!     EmbeddingPipeline, HashEncoder, NormalizerOptions, PipelineConfig,
//!     TextNormalizer, WhitespaceSegmenter,
//! };
//! use std::io::Cursor;
//! use std::sync::Arc;
//!
//! # fn example() -> embed_pipeline::Result<()> {
//! let normalizer = TextNormalizer::new(
//!     NormalizerOptions { tokenize: true, lower_case: true },
//!     Box::new(WhitespaceSegmenter),
//! );
//! let encoder = Arc::new(HashEncoder::new(300, true));
//! let pipeline = EmbeddingPipeline::new(PipelineConfig::default(), normalizer, encoder)?;
//!
//! let mut output = Vec::new();
//! let stats = pipeline.run(Cursor::new("Hello world.\nA second sentence.\n"), &mut output)?;
//! assert_eq!(stats.lines, 2);
//! assert_eq!(output.len(), 2 * 300 * 4);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod config;
pub mod encoder;
pub mod error;
pub mod normalize;
pub mod pipeline;
pub mod reader;
pub mod writer;

// Re-export public API
pub use config::{ModelSpec, NormalizerOptions, PipelineConfig, ValueEncoding};
pub use encoder::{BatchEncoder, EmbeddingMatrix, HashEncoder, SentenceEncoder};
pub use error::{PipelineError, Result};
pub use normalize::{Segmenter, TextNormalizer, WhitespaceSegmenter, WordPieceSegmenter};
pub use pipeline::{EmbeddingPipeline, RunStats};
pub use reader::LineReader;
pub use writer::VectorWriter;
