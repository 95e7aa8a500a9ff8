//! Error types for clustered top-K computation.

use std::fmt;

/// Errors that can occur during top-K computation.
#[derive(Debug, Clone, PartialEq)]
pub enum TopKError {
    /// A configuration value is out of range (non-positive bins, K, items,
    /// or latent factors), or a weight block does not match its declared shape.
    InvalidConfiguration(String),

    /// Two arrays that must be index-aligned have different lengths.
    /// This is a contract violation by the caller or a collaborator.
    InconsistentInputLengths {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A per-cluster bound or sort table could not be allocated.
    /// Fatal for the cluster, not for the process.
    AllocationFailure { what: &'static str, elements: usize },

    /// Verification mode found a pruned result that differs from brute force.
    VerificationFailed { user_id: u32, rank: usize },

    /// Reading an input file failed.
    Io(String),

    /// An input file was readable but malformed.
    Parse { line: usize, message: String },
}

impl fmt::Display for TopKError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopKError::InvalidConfiguration(msg) => {
                write!(f, "invalid configuration: {}", msg)
            }
            TopKError::InconsistentInputLengths {
                what,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "inconsistent input lengths for {}: expected {}, got {}",
                    what, expected, actual
                )
            }
            TopKError::AllocationFailure { what, elements } => {
                write!(f, "failed to allocate {} ({} elements)", what, elements)
            }
            TopKError::VerificationFailed { user_id, rank } => {
                write!(
                    f,
                    "top-K for user {} differs from brute force at rank {}",
                    user_id, rank
                )
            }
            TopKError::Io(msg) => write!(f, "io error: {}", msg),
            TopKError::Parse { line, message } => {
                write!(f, "parse error on line {}: {}", line, message)
            }
        }
    }
}

impl std::error::Error for TopKError {}

impl From<std::io::Error> for TopKError {
    fn from(e: std::io::Error) -> Self {
        TopKError::Io(e.to_string())
    }
}

pub(crate) fn check_len(what: &'static str, expected: usize, actual: usize) -> Result<(), TopKError> {
    if expected == actual {
        Ok(())
    } else {
        Err(TopKError::InconsistentInputLengths {
            what,
            expected,
            actual,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_mentions_lengths() {
        let e = TopKError::InconsistentInputLengths {
            what: "theta_ucs",
            expected: 4,
            actual: 3,
        };
        let s = e.to_string();
        assert!(s.contains("theta_ucs"));
        assert!(s.contains('4') && s.contains('3'));
    }

    #[test]
    fn test_check_len() {
        assert!(check_len("x", 2, 2).is_ok());
        assert!(matches!(
            check_len("x", 2, 1),
            Err(TopKError::InconsistentInputLengths { expected: 2, actual: 1, .. })
        ));
    }
}
