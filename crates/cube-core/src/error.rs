//! Error taxonomy for the cube engine.
//!
//! Parsing and import errors surface synchronously; move application is
//! atomic (validated before any mutation); solver errors abort the attempt
//! and are never retried internally.

use serde::{Deserialize, Serialize};

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, CubeError>;

/// All failure modes of the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CubeError {
    /// Move or sequence notation did not match the grammar.
    Parse { token: String, reason: String },
    /// A structurally valid move that is illegal for this cube size.
    InvalidMove { notation: String, reason: String },
    /// An imported state is malformed or unreachable from solved.
    InvalidState { reason: String },
    /// A solver phase could not match any known case.
    Unsolvable { phase: String, reason: String },
    /// The strategy does not support this cube size.
    UnsupportedSize { strategy: String, size: usize },
}

impl CubeError {
    pub(crate) fn parse(token: impl Into<String>, reason: impl Into<String>) -> Self {
        CubeError::Parse {
            token: token.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_move(notation: impl Into<String>, reason: impl Into<String>) -> Self {
        CubeError::InvalidMove {
            notation: notation.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_state(reason: impl Into<String>) -> Self {
        CubeError::InvalidState {
            reason: reason.into(),
        }
    }

    pub(crate) fn unsolvable(phase: impl Into<String>, reason: impl Into<String>) -> Self {
        CubeError::Unsolvable {
            phase: phase.into(),
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for CubeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CubeError::Parse { token, reason } => {
                write!(f, "cannot parse '{}': {}", token, reason)
            }
            CubeError::InvalidMove { notation, reason } => {
                write!(f, "illegal move '{}': {}", notation, reason)
            }
            CubeError::InvalidState { reason } => write!(f, "invalid cube state: {}", reason),
            CubeError::Unsolvable { phase, reason } => {
                write!(f, "unsolvable state in phase '{}': {}", phase, reason)
            }
            CubeError::UnsupportedSize { strategy, size } => {
                write!(f, "{} does not support {}x{} cubes", strategy, size, size)
            }
        }
    }
}

impl std::error::Error for CubeError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_context() {
        let err = CubeError::parse("Q2", "unknown face");
        assert!(err.to_string().contains("Q2"));

        let err = CubeError::UnsupportedSize {
            strategy: "CFOP".into(),
            size: 5,
        };
        assert!(err.to_string().contains("CFOP"));
    }
}
