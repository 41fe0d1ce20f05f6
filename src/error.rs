//! Failure kinds raised by the analysis steps.
//!
//! Every variant is fatal to the step that detects it. Loading and orchestration code wraps
//! these in `anyhow::Error` with context; library callers can match on them directly.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// A message has a missing or unparseable timestamp
    #[error("invalid timestamp on message {index} (author: {author})")]
    InvalidTimestamp { index: usize, author: String },

    /// The role table maps one author to more than one role
    #[error("author '{author}' maps to more than one role ('{first}' and '{second}')")]
    DuplicateRoleMapping { author: String, first: String, second: String },

    /// No replies are available to compute latency percentages from
    #[error("insufficient data: {0}")]
    InsufficientData(String),

    /// Fewer than two authors qualify for text clustering
    #[error("insufficient corpus: {qualifying} qualifying author(s), at least 2 required")]
    InsufficientCorpus { qualifying: usize },

    /// A role outside the configured taxonomy reached the reply graph
    #[error("unknown role '{0}' is not part of the role taxonomy")]
    UnknownRole(String),

    /// Latency bucket boundaries are unusable
    #[error("invalid latency boundaries {boundaries:?}: {reason}")]
    InvalidBoundaries { boundaries: Vec<f64>, reason: String },

    /// A reply latency fell outside every bucket
    #[error("reply latency of {minutes} minutes on message {index} falls outside every bucket")]
    UnbucketedLatency { index: usize, minutes: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_offender() {
        let err = AnalysisError::InvalidTimestamp { index: 3, author: "alice".to_string() };
        assert_eq!(err.to_string(), "invalid timestamp on message 3 (author: alice)");

        let err = AnalysisError::UnknownRole("Coach".to_string());
        assert!(err.to_string().contains("Coach"));

        let err = AnalysisError::InsufficientCorpus { qualifying: 1 };
        assert!(err.to_string().contains("1 qualifying author"));
    }

    #[test]
    fn test_converts_into_anyhow() {
        fn fails() -> anyhow::Result<()> {
            Err(AnalysisError::InsufficientData("no replies".to_string()))?;
            Ok(())
        }

        let err = fails().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AnalysisError>(),
            Some(AnalysisError::InsufficientData(_))
        ));
    }
}
