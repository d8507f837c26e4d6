use std::io;

use thiserror::Error;

use crate::model::{ClusterId, QuestionId};

#[derive(Error, Debug)]
pub enum DedupError {
    #[error("Embedding provider error: {0}")]
    Provider(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("Stored question {question_id} has dimension {found}, expected {expected}")]
    StoredDimensionMismatch {
        question_id: QuestionId,
        expected: usize,
        found: usize,
    },

    #[error("Similarity is not a finite number; an embedding holds NaN or infinity")]
    NonFiniteSimilarity,

    #[error("Embedding provider returned an empty vector")]
    EmptyEmbedding,

    #[error("Cluster not found: {0}")]
    ClusterNotFound(ClusterId),

    #[error("Invalid argument: {0}")]
    InvalidArg(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl DedupError {
    /// Provider failures are transient from the caller's point of view;
    /// nothing was written, so the same question can be submitted again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DedupError::Provider(_))
    }
}

pub type Result<T> = std::result::Result<T, DedupError>;

#[cfg(test)]
mod tests {
    use super::DedupError;

    #[test]
    fn only_provider_errors_are_retryable() {
        assert!(DedupError::Provider("timeout".into()).is_retryable());
        assert!(!DedupError::Storage("disk full".into()).is_retryable());
        assert!(!DedupError::ClusterNotFound(3).is_retryable());
    }

    #[test]
    fn messages_name_the_offending_question() {
        let err = DedupError::StoredDimensionMismatch {
            question_id: 7,
            expected: 2,
            found: 3,
        };
        assert_eq!(
            err.to_string(),
            "Stored question 7 has dimension 3, expected 2"
        );
    }
}
