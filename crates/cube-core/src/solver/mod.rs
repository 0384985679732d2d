//! Solving strategies.
//!
//! Each strategy is a pipeline of phase functions over a working clone of
//! the input state. Phases only emit moves that keep earlier phases intact,
//! and `solve` verifies the clone actually ends solved before returning.

pub(crate) mod phases;

mod cfop;
mod layer_by_layer;

pub use cfop::Cfop;
pub use layer_by_layer::LayerByLayer;

use crate::error::Result;
use crate::moves::MoveSequence;
use crate::state::CubeState;
use serde::{Deserialize, Serialize};

/// Solving phase tags shared by the strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Cross,
    FirstLayerCorners,
    MiddleEdges,
    LastLayerCross,
    LastLayerCorners,
    CornerPermutation,
    EdgePermutation,
    F2L,
    Oll,
    Pll,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::Cross => "Cross",
            Phase::FirstLayerCorners => "First-layer corners",
            Phase::MiddleEdges => "Middle-layer edges",
            Phase::LastLayerCross => "Last-layer cross",
            Phase::LastLayerCorners => "Last-layer corner orientation",
            Phase::CornerPermutation => "Last-layer corner permutation",
            Phase::EdgePermutation => "Last-layer edge permutation",
            Phase::F2L => "F2L",
            Phase::Oll => "OLL",
            Phase::Pll => "PLL",
        };
        write!(f, "{}", name)
    }
}

/// One step of a produced solution. Read-only once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolutionStep {
    pub phase: Phase,
    /// Named algorithm used, when the step came from a case table.
    pub algorithm: Option<String>,
    pub moves: MoveSequence,
    pub explanation: String,
}

/// Complete solution produced by a strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolutionResult {
    pub strategy: String,
    pub steps: Vec<SolutionStep>,
    /// All step moves concatenated and optimized.
    pub sequence: MoveSequence,
}

impl SolutionResult {
    pub(crate) fn new(strategy: &str, steps: Vec<SolutionStep>) -> SolutionResult {
        let mut sequence = MoveSequence::new();
        for step in &steps {
            sequence.extend(&step.moves);
        }
        SolutionResult {
            strategy: strategy.to_string(),
            steps,
            sequence: sequence.optimize(),
        }
    }

    pub(crate) fn empty(strategy: &str) -> SolutionResult {
        SolutionResult {
            strategy: strategy.to_string(),
            steps: Vec::new(),
            sequence: MoveSequence::new(),
        }
    }

    pub fn total_moves(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Moves per phase, in step order.
    pub fn phase_breakdown(&self) -> Vec<(Phase, usize)> {
        self.steps.iter().map(|s| (s.phase, s.moves.len())).collect()
    }

    /// Human-readable walkthrough of the solution.
    pub fn explain(&self) -> String {
        if self.steps.is_empty() {
            return format!("{}: already solved, no moves needed", self.strategy);
        }
        let mut out = format!("{} solution ({} moves):\n", self.strategy, self.total_moves());
        for (i, step) in self.steps.iter().enumerate() {
            out.push_str(&format!("\nStep {}: {}\n", i + 1, step.phase));
            if let Some(name) = &step.algorithm {
                out.push_str(&format!("Algorithm: {}\n", name));
            }
            out.push_str(&format!("Moves: {}\n", step.moves));
            out.push_str(&format!("{}\n", step.explanation));
        }
        out
    }
}

/// Which phases of a strategy are already complete for a given state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseReport {
    pub entries: Vec<(Phase, bool)>,
}

impl PhaseReport {
    pub fn complete(&self, phase: Phase) -> Option<bool> {
        self.entries
            .iter()
            .find(|(p, _)| *p == phase)
            .map(|(_, done)| *done)
    }

    pub fn all_complete(&self) -> bool {
        self.entries.iter().all(|(_, done)| *done)
    }
}

/// A solving strategy: a fixed phase pipeline with pattern lookups.
pub trait SolverStrategy {
    fn name(&self) -> &'static str;

    fn supports_size(&self, size: usize) -> bool;

    /// Produce a move sequence that solves `state` when applied to it.
    /// Solving an already-solved state yields an empty result.
    fn solve(&mut self, state: &CubeState) -> Result<SolutionResult>;

    /// Report which phases of this strategy are already complete.
    fn analyze(&self, state: &CubeState) -> PhaseReport;
}
