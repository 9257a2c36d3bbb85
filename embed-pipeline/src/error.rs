use thiserror::Error;

/// Errors that can occur while running the embedding pipeline
#[derive(Error, Debug)]
pub enum PipelineError {
    /// IO error from the input source or output sink
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error during text normalization or sub-word segmentation
    #[error("Normalization error: {0}")]
    Normalization(String),

    /// Error reported by the sentence encoder
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Configuration error (invalid sizes, unusable model spec)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Error loading or interpreting the model spec sidecar
    #[error("Model spec error: {0}")]
    ModelSpec(String),

    /// Encoder returned a row of the wrong width
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Encoder returned the wrong number of rows for a batch
    #[error("Batch row count mismatch: expected {expected}, got {actual}")]
    RowCountMismatch { expected: usize, actual: usize },
}

impl PipelineError {
    /// Create a new normalization error
    pub fn normalization<S: Into<String>>(message: S) -> Self {
        Self::Normalization(message.into())
    }

    /// Create a new encoding error
    pub fn encoding<S: Into<String>>(message: S) -> Self {
        Self::Encoding(message.into())
    }

    /// Create a new configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration(message.into())
    }

    /// Create a new model spec error
    pub fn model_spec<S: Into<String>>(message: S) -> Self {
        Self::ModelSpec(message.into())
    }
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_error_creation() {
        let error = PipelineError::encoding("batch rejected");
        assert!(matches!(error, PipelineError::Encoding(_)));
        assert_eq!(error.to_string(), "Encoding error: batch rejected");

        let error = PipelineError::configuration("batch size must be >= 1");
        assert!(matches!(error, PipelineError::Configuration(_)));
        assert_eq!(
            error.to_string(),
            "Configuration error: batch size must be >= 1"
        );
    }

    #[test]
    fn test_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let pipeline_error: PipelineError = io_error.into();
        assert!(matches!(pipeline_error, PipelineError::Io(_)));
    }

    #[test]
    fn test_dimension_mismatch_error() {
        let error = PipelineError::DimensionMismatch {
            expected: 384,
            actual: 768,
        };
        assert_eq!(
            error.to_string(),
            "Embedding dimension mismatch: expected 384, got 768"
        );
    }
}
