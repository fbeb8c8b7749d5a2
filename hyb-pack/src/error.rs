use thiserror::Error;

/// Failures attached to a single interaction record.
///
/// Every variant is recoverable at the batch level: the offending record is
/// skipped and reported, the remaining records are processed.
#[derive(Debug, Error)]
pub enum HybridError {
    #[error("malformed input: {0}")]
    MalformedInput(String),
    #[error("invalid base pair {0}-{1}")]
    InvalidPair(char, char),
    #[error("inconsistent diagram: {0}")]
    DiagramConsistency(String),
    #[error("{sub} not found in window [{lower}, {upper}) of a {len} nt sequence")]
    NotFound {
        sub: String,
        lower: usize,
        upper: usize,
        len: usize,
    },
    #[error("sequence {0} is missing from the sequence table")]
    UnknownSequence(String),
}

impl HybridError {
    pub fn malformed<S: Into<String>>(msg: S) -> Self {
        HybridError::MalformedInput(msg.into())
    }

    /// true for the grammar/pattern family of errors
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            HybridError::MalformedInput(_)
                | HybridError::InvalidPair(..)
                | HybridError::DiagramConsistency(_)
        )
    }
}
