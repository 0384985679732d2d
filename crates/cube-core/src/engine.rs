//! Move application.
//!
//! Every turn reduces to repeating a single clockwise quarter-turn map for
//! one of the six faces: positions permute inside the turned layers and each
//! sticker's facing direction rotates with the same cycle. Slice moves and
//! whole-cube rotations reuse the face maps on different layer ranges.

use crate::error::{CubeError, Result};
use crate::moves::{Move, MoveSequence, Slice, Target};
use crate::state::{Axis, CubeState, Face, Position};

/// Stateless move engine. All state lives in the [`CubeState`] it is applied
/// to.
pub struct MoveEngine;

impl MoveEngine {
    /// Validate `mv` against the cube size, then apply it and record it in
    /// the state's history (truncating any undone tail). Validation happens
    /// before any mutation, so a failed apply leaves the state untouched.
    pub fn apply(state: &mut CubeState, mv: Move) -> Result<()> {
        Self::check(state, mv)?;
        apply_unchecked(state, mv);
        state.record_move(mv);
        Ok(())
    }

    /// Apply every move of a sequence in order. Stops at the first illegal
    /// move, leaving the moves before it applied.
    pub fn apply_sequence(state: &mut CubeState, seq: &MoveSequence) -> Result<()> {
        for &mv in seq {
            Self::apply(state, mv)?;
        }
        Ok(())
    }

    /// Check a move against a cube size without applying it.
    pub fn check(state: &CubeState, mv: Move) -> Result<()> {
        let n = state.size();
        match mv.target {
            Target::Face(_) => {
                if mv.depth == 0 || usize::from(mv.depth) > n - 1 {
                    return Err(CubeError::invalid_move(
                        mv.to_notation(),
                        format!(
                            "a {}x{} cube has no {}-layer wide turn; use a rotation to turn everything",
                            n, n, mv.depth
                        ),
                    ));
                }
            }
            Target::Slice(_) => {
                if n % 2 == 0 {
                    return Err(CubeError::invalid_move(
                        mv.to_notation(),
                        format!(
                            "a {}x{} cube has no central slice; use wide turns instead",
                            n, n
                        ),
                    ));
                }
            }
            Target::Rotation(_) => {}
        }
        Ok(())
    }

    /// Undo the most recent applied move, if any, and return it.
    pub fn undo(state: &mut CubeState) -> Option<Move> {
        let cursor = state.history_cursor();
        if cursor == 0 {
            return None;
        }
        let mv = state.history()[cursor - 1];
        apply_unchecked(state, mv.inverse());
        state.set_history_cursor(cursor - 1);
        Some(mv)
    }

    /// Re-apply the most recently undone move, if any, and return it.
    pub fn redo(state: &mut CubeState) -> Option<Move> {
        let cursor = state.history_cursor();
        if cursor >= state.history().len() {
            return None;
        }
        let mv = state.history()[cursor];
        apply_unchecked(state, mv);
        state.set_history_cursor(cursor + 1);
        Some(mv)
    }
}

/// The face whose clockwise quarter-turn map realizes this move.
fn transform_face(target: Target) -> Face {
    match target {
        Target::Face(f) => f,
        Target::Slice(Slice::M) => Face::L,
        Target::Slice(Slice::E) => Face::D,
        Target::Slice(Slice::S) => Face::F,
        Target::Rotation(Axis::X) => Face::R,
        Target::Rotation(Axis::Y) => Face::U,
        Target::Rotation(Axis::Z) => Face::F,
    }
}

/// Whether a position lies in the layers turned by `mv` on an n-cube.
fn selects(mv: Move, n: usize, pos: Position) -> bool {
    let depth = usize::from(mv.depth);
    match mv.target {
        Target::Face(Face::R) => pos.x >= n - depth,
        Target::Face(Face::L) => pos.x < depth,
        Target::Face(Face::U) => pos.y >= n - depth,
        Target::Face(Face::D) => pos.y < depth,
        Target::Face(Face::F) => pos.z >= n - depth,
        Target::Face(Face::B) => pos.z < depth,
        Target::Slice(Slice::M) => pos.x == (n - 1) / 2,
        Target::Slice(Slice::E) => pos.y == (n - 1) / 2,
        Target::Slice(Slice::S) => pos.z == (n - 1) / 2,
        Target::Rotation(_) => true,
    }
}

/// One clockwise quarter turn of `face` applied to a position.
pub(crate) fn rotate_position(face: Face, n: usize, p: Position) -> Position {
    let m = n - 1;
    match face {
        Face::R => Position::new(p.x, p.z, m - p.y),
        Face::L => Position::new(p.x, m - p.z, p.y),
        Face::U => Position::new(m - p.z, p.y, p.x),
        Face::D => Position::new(p.z, p.y, m - p.x),
        Face::F => Position::new(p.y, m - p.x, p.z),
        Face::B => Position::new(m - p.y, p.x, p.z),
    }
}

/// One clockwise quarter turn of `face` applied to a sticker direction.
pub(crate) fn rotate_direction(face: Face, d: Face) -> Face {
    match face {
        Face::R => match d {
            Face::F => Face::U,
            Face::U => Face::B,
            Face::B => Face::D,
            Face::D => Face::F,
            other => other,
        },
        Face::L => match d {
            Face::F => Face::D,
            Face::D => Face::B,
            Face::B => Face::U,
            Face::U => Face::F,
            other => other,
        },
        Face::U => match d {
            Face::F => Face::L,
            Face::L => Face::B,
            Face::B => Face::R,
            Face::R => Face::F,
            other => other,
        },
        Face::D => match d {
            Face::F => Face::R,
            Face::R => Face::B,
            Face::B => Face::L,
            Face::L => Face::F,
            other => other,
        },
        Face::F => match d {
            Face::U => Face::R,
            Face::R => Face::D,
            Face::D => Face::L,
            Face::L => Face::U,
            other => other,
        },
        Face::B => match d {
            Face::U => Face::L,
            Face::L => Face::D,
            Face::D => Face::R,
            Face::R => Face::U,
            other => other,
        },
    }
}

/// Apply a pre-validated move.
pub(crate) fn apply_unchecked(state: &mut CubeState, mv: Move) {
    let n = state.size();
    let face = transform_face(mv.target);
    let turns = mv.direction.quarter_turns();
    for cubie in state.arena_mut().iter_mut() {
        if !selects(mv, n, cubie.pos) {
            continue;
        }
        for _ in 0..turns {
            cubie.pos = rotate_position(face, n, cubie.pos);
            for sticker in cubie.stickers.iter_mut() {
                sticker.facing = rotate_direction(face, sticker.facing);
            }
        }
    }
    state.rebuild_occupancy();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scramble::Scrambler;

    fn apply_notation(state: &mut CubeState, text: &str) {
        let seq = MoveSequence::from_notation(text).unwrap();
        MoveEngine::apply_sequence(state, &seq).unwrap();
    }

    #[test]
    fn quarter_turn_moves_expected_pieces() {
        let mut state = CubeState::new(3).unwrap();
        apply_notation(&mut state, "R");
        // The UR edge ends at BR with its white sticker facing back.
        let piece = state.cubie_at(Position::new(2, 1, 0)).unwrap();
        assert_eq!(piece.home, Position::new(2, 2, 1));
        assert_eq!(
            piece.sticker_on(Face::B),
            Some(crate::state::Color::White)
        );
        assert!(!state.is_solved());
    }

    #[test]
    fn four_quarter_turns_are_identity() {
        for token in ["R", "U", "F", "L", "D", "B", "M", "E", "S", "x", "y", "z"] {
            let mut state = CubeState::new(3).unwrap();
            for _ in 0..4 {
                apply_notation(&mut state, token);
            }
            assert!(state.is_solved(), "{}*4 should solve", token);
        }
    }

    #[test]
    fn move_inverse_law() {
        let solved = CubeState::new(3).unwrap().to_state_string();
        for token in ["R", "U'", "F2", "Rw", "M", "E'", "x", "z2"] {
            let mut state = CubeState::new(3).unwrap();
            let mv = Move::from_notation(token).unwrap();
            MoveEngine::apply(&mut state, mv).unwrap();
            MoveEngine::apply(&mut state, mv.inverse()).unwrap();
            assert_eq!(state.to_state_string(), solved, "{} then inverse", token);
        }
    }

    #[test]
    fn sequence_inverse_law() {
        let mut state = CubeState::new(3).unwrap();
        let seq = MoveSequence::from_notation("R U2 F' Rw M E2 B L'").unwrap();
        let before = state.to_state_string();
        MoveEngine::apply_sequence(&mut state, &seq).unwrap();
        MoveEngine::apply_sequence(&mut state, &seq.inverse()).unwrap();
        assert_eq!(state.to_state_string(), before);
    }

    #[test]
    fn whole_cube_rotation_keeps_cube_solved() {
        let mut state = CubeState::new(3).unwrap();
        apply_notation(&mut state, "x y z'");
        assert!(state.is_solved());
    }

    #[test]
    fn invariants_hold_under_random_scrambles() {
        for size in [2, 3, 4, 5] {
            let mut scrambler = Scrambler::with_seed(7 + size as u64);
            let (_, state) = scrambler.scramble_new(size, 40).unwrap();
            state
                .validate_invariants()
                .unwrap_or_else(|e| panic!("size {}: {}", size, e));
        }
    }

    #[test]
    fn invariants_hold_under_slices_and_rotations() {
        let mut state = CubeState::new(3).unwrap();
        apply_notation(&mut state, "M E S x R U' z M' Rw2 y' F B2 E'");
        state.validate_invariants().unwrap();
        let text = state.to_state_string();
        let back = CubeState::from_state_string(&text).unwrap();
        assert_eq!(back.to_state_string(), text);
    }

    #[test]
    fn slice_on_even_cube_is_rejected() {
        let mut state = CubeState::new(4).unwrap();
        let before = state.to_state_string();
        let err = MoveEngine::apply(&mut state, Move::from_notation("M").unwrap()).unwrap_err();
        assert!(matches!(err, CubeError::InvalidMove { .. }));
        // Atomic: nothing changed and nothing was recorded.
        assert_eq!(state.to_state_string(), before);
        assert_eq!(state.move_count(), 0);
    }

    #[test]
    fn oversized_wide_turn_is_rejected() {
        let mut state = CubeState::new(3).unwrap();
        let err =
            MoveEngine::apply(&mut state, Move::from_notation("3Rw").unwrap()).unwrap_err();
        assert!(matches!(err, CubeError::InvalidMove { .. }));

        let mut small = CubeState::new(2).unwrap();
        let err =
            MoveEngine::apply(&mut small, Move::from_notation("Rw").unwrap()).unwrap_err();
        assert!(matches!(err, CubeError::InvalidMove { .. }));
    }

    #[test]
    fn wide_turn_on_big_cube_moves_inner_layer() {
        let mut state = CubeState::new(4).unwrap();
        apply_notation(&mut state, "Rw");
        // An inner x-layer piece moved with the wide turn.
        assert!(!state.is_solved());
        apply_notation(&mut state, "Rw'");
        assert!(state.is_solved());
    }

    #[test]
    fn undo_redo_linear_history() {
        let mut state = CubeState::new(3).unwrap();
        apply_notation(&mut state, "R U F");
        assert_eq!(state.move_count(), 3);

        let undone = MoveEngine::undo(&mut state).unwrap();
        assert_eq!(undone.to_notation(), "F");
        assert_eq!(state.move_count(), 2);

        let redone = MoveEngine::redo(&mut state).unwrap();
        assert_eq!(redone.to_notation(), "F");
        assert_eq!(state.move_count(), 3);
        assert!(MoveEngine::redo(&mut state).is_none());

        // Undo twice, then a fresh move truncates the redo tail.
        MoveEngine::undo(&mut state);
        MoveEngine::undo(&mut state);
        apply_notation(&mut state, "D");
        assert_eq!(state.move_count(), 2);
        assert_eq!(state.history().len(), 2);
        assert!(MoveEngine::redo(&mut state).is_none());

        // Undoing everything returns to solved.
        while MoveEngine::undo(&mut state).is_some() {}
        assert!(state.is_solved());
    }
}
