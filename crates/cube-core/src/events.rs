//! Engine events as plain data.
//!
//! The core does not publish anything; the [`Cube`](crate::Cube) facade
//! returns these values and the surrounding application transports them
//! however it likes.

use crate::moves::{Move, MoveSequence};
use crate::solver::SolutionResult;
use serde::{Deserialize, Serialize};

/// Something observable happened to a cube.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CubeEvent {
    /// A single move was applied.
    MoveApplied {
        mv: Move,
        /// State string before the move.
        before: String,
        /// State string after the move.
        after: String,
    },
    /// A scramble sequence was applied.
    ScrambleApplied { sequence: MoveSequence },
    /// A solver produced a verified solution.
    SolveCompleted {
        strategy: String,
        total_moves: usize,
        solution: SolutionResult,
    },
}
