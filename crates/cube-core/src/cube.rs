//! High-level cube facade.
//!
//! Owns a [`CubeState`] and wraps the move engine, scrambler, and solvers
//! into the surface collaborators consume: apply with events, undo/redo,
//! scramble, validate, and report.

use crate::engine::MoveEngine;
use crate::error::{CubeError, Result};
use crate::events::CubeEvent;
use crate::moves::{Move, MoveSequence};
use crate::scramble::Scrambler;
use crate::solver::{SolutionResult, SolverStrategy};
use crate::state::{Color, CubeState, Face, PieceCounts};
use serde::{Deserialize, Serialize};

/// Summary of a cube for display layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CubeInfo {
    pub size: usize,
    pub is_solved: bool,
    pub move_count: usize,
    pub pieces: PieceCounts,
    pub is_valid: bool,
    pub has_scramble: bool,
    pub scramble_length: usize,
}

/// A cube session: state plus the last scramble applied to it.
#[derive(Debug, Clone)]
pub struct Cube {
    state: CubeState,
    scramble: Option<MoveSequence>,
}

impl Cube {
    /// Create a solved cube of the given size.
    pub fn new(size: usize) -> Result<Cube> {
        Ok(Cube {
            state: CubeState::new(size)?,
            scramble: None,
        })
    }

    /// Adopt an existing state.
    pub fn from_state(state: CubeState) -> Cube {
        Cube {
            state,
            scramble: None,
        }
    }

    pub fn state(&self) -> &CubeState {
        &self.state
    }

    pub fn size(&self) -> usize {
        self.state.size()
    }

    pub fn is_solved(&self) -> bool {
        self.state.is_solved()
    }

    pub fn move_count(&self) -> usize {
        self.state.move_count()
    }

    /// Reset to solved, clearing history and scramble.
    pub fn reset(&mut self) -> Result<()> {
        self.state = CubeState::new(self.state.size())?;
        self.scramble = None;
        Ok(())
    }

    /// Apply one move and report it as an event.
    pub fn apply(&mut self, mv: Move) -> Result<CubeEvent> {
        let before = self.state.to_state_string();
        MoveEngine::apply(&mut self.state, mv)?;
        Ok(CubeEvent::MoveApplied {
            mv,
            before,
            after: self.state.to_state_string(),
        })
    }

    /// Parse and apply one move in notation.
    pub fn apply_notation(&mut self, token: &str) -> Result<CubeEvent> {
        self.apply(Move::from_notation(token)?)
    }

    /// Apply a whole sequence.
    pub fn apply_sequence(&mut self, seq: &MoveSequence) -> Result<()> {
        MoveEngine::apply_sequence(&mut self.state, seq)
    }

    /// Undo the latest move, if any.
    pub fn undo(&mut self) -> Option<Move> {
        MoveEngine::undo(&mut self.state)
    }

    /// Redo the most recently undone move, if any.
    pub fn redo(&mut self) -> Option<Move> {
        MoveEngine::redo(&mut self.state)
    }

    /// Scramble with a random seed.
    pub fn scramble(&mut self, length: usize) -> Result<CubeEvent> {
        self.scramble_with(Scrambler::new(), length)
    }

    /// Scramble reproducibly.
    pub fn scramble_seeded(&mut self, length: usize, seed: u64) -> Result<CubeEvent> {
        self.scramble_with(Scrambler::with_seed(seed), length)
    }

    fn scramble_with(&mut self, mut scrambler: Scrambler, length: usize) -> Result<CubeEvent> {
        let seq = scrambler.generate(self.state.size(), length)?;
        MoveEngine::apply_sequence(&mut self.state, &seq)?;
        self.scramble = Some(seq.clone());
        Ok(CubeEvent::ScrambleApplied { sequence: seq })
    }

    /// The last scramble applied, if any.
    pub fn last_scramble(&self) -> Option<&MoveSequence> {
        self.scramble.as_ref()
    }

    /// Solve by replaying the inverse of the applied history. This is the
    /// trivial teaching helper, not a solving strategy.
    pub fn solve_with_reverse(&mut self) -> Result<MoveSequence> {
        let applied: Vec<Move> = self.state.history()[..self.state.move_count()].to_vec();
        if applied.is_empty() {
            return Err(CubeError::invalid_state("no applied moves to reverse"));
        }
        let solution = MoveSequence::from(applied).inverse().optimize();
        MoveEngine::apply_sequence(&mut self.state, &solution)?;
        Ok(solution)
    }

    /// Run a solving strategy against the current state and report the
    /// verified solution as an event. The cube itself is not mutated;
    /// callers decide whether to apply the sequence.
    pub fn solve_with(&self, strategy: &mut dyn SolverStrategy) -> Result<CubeEvent> {
        let solution = strategy.solve(&self.state)?;
        Ok(CubeEvent::SolveCompleted {
            strategy: solution.strategy.clone(),
            total_moves: solution.total_moves(),
            solution,
        })
    }

    /// Apply a previously produced solution.
    pub fn apply_solution(&mut self, solution: &SolutionResult) -> Result<()> {
        self.apply_sequence(&solution.sequence)
    }

    pub fn face_colors(&self, face: Face) -> Vec<Vec<Color>> {
        self.state.face_colors(face)
    }

    pub fn all_face_colors(&self) -> Vec<(Face, Vec<Vec<Color>>)> {
        self.state.all_face_colors()
    }

    pub fn to_state_string(&self) -> String {
        self.state.to_state_string()
    }

    /// Group-theoretic validity of the current state.
    pub fn validate(&self) -> Result<()> {
        self.state.validate_invariants()
    }

    pub fn piece_counts(&self) -> PieceCounts {
        self.state.piece_counts()
    }

    pub fn info(&self) -> CubeInfo {
        CubeInfo {
            size: self.state.size(),
            is_solved: self.state.is_solved(),
            move_count: self.state.move_count(),
            pieces: self.state.piece_counts(),
            is_valid: self.state.validate_invariants().is_ok(),
            has_scramble: self.scramble.is_some(),
            scramble_length: self.scramble.as_ref().map(|s| s.len()).unwrap_or(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::LayerByLayer;

    #[test]
    fn apply_reports_before_and_after() {
        let mut cube = Cube::new(3).unwrap();
        let before = cube.to_state_string();
        let event = cube.apply_notation("R").unwrap();
        match event {
            CubeEvent::MoveApplied {
                mv,
                before: b,
                after,
            } => {
                assert_eq!(mv.to_notation(), "R");
                assert_eq!(b, before);
                assert_eq!(after, cube.to_state_string());
                assert_ne!(b, after);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn scramble_then_reverse_solves() {
        let mut cube = Cube::new(3).unwrap();
        let event = cube.scramble_seeded(25, 42).unwrap();
        match &event {
            CubeEvent::ScrambleApplied { sequence } => assert_eq!(sequence.len(), 25),
            other => panic!("unexpected event {:?}", other),
        }
        assert!(!cube.is_solved());
        assert!(cube.last_scramble().is_some());

        cube.solve_with_reverse().unwrap();
        assert!(cube.is_solved());
    }

    #[test]
    fn solve_with_strategy_emits_event_without_mutating() {
        let mut cube = Cube::new(3).unwrap();
        cube.scramble_seeded(20, 7).unwrap();
        let scrambled = cube.to_state_string();

        let mut solver = LayerByLayer::new();
        let event = cube.solve_with(&mut solver).unwrap();
        assert_eq!(cube.to_state_string(), scrambled);

        match event {
            CubeEvent::SolveCompleted { solution, .. } => {
                cube.apply_solution(&solution).unwrap();
                assert!(cube.is_solved());
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn reset_clears_everything() {
        let mut cube = Cube::new(4).unwrap();
        cube.scramble_seeded(30, 9).unwrap();
        cube.reset().unwrap();
        assert!(cube.is_solved());
        assert_eq!(cube.move_count(), 0);
        assert!(cube.last_scramble().is_none());
    }

    #[test]
    fn info_summarizes_session() {
        let mut cube = Cube::new(2).unwrap();
        cube.scramble_seeded(10, 3).unwrap();
        let info = cube.info();
        assert_eq!(info.size, 2);
        assert!(!info.is_solved);
        assert!(info.is_valid);
        assert_eq!(info.move_count, 10);
        assert_eq!(info.scramble_length, 10);
        assert_eq!(info.pieces.corners, 8);
    }

    #[test]
    fn undo_redo_round_trip() {
        let mut cube = Cube::new(3).unwrap();
        cube.apply_notation("R").unwrap();
        cube.apply_notation("U").unwrap();
        assert_eq!(cube.undo().unwrap().to_notation(), "U");
        assert_eq!(cube.redo().unwrap().to_notation(), "U");
        cube.undo();
        cube.undo();
        assert!(cube.is_solved());
    }
}
