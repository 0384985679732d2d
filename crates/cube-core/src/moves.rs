//! Move representation and standard notation.
//!
//! Supports face turns (`R`, `U'`, `F2`), wide turns (`Rw`, `3Rw2`), slice
//! moves (`M`, `E`, `S`) and whole-cube rotations (`x`, `y`, `z`).

use crate::error::{CubeError, Result};
use crate::state::{Axis, Face};
use serde::{Deserialize, Serialize};

/// Turn direction: clockwise, counterclockwise, or a half turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Cw,
    Ccw,
    Half,
}

impl Direction {
    /// Number of clockwise quarter turns this direction stands for.
    pub fn quarter_turns(self) -> u8 {
        match self {
            Direction::Cw => 1,
            Direction::Half => 2,
            Direction::Ccw => 3,
        }
    }

    fn from_quarter_turns(turns: u8) -> Option<Direction> {
        match turns % 4 {
            1 => Some(Direction::Cw),
            2 => Some(Direction::Half),
            3 => Some(Direction::Ccw),
            _ => None,
        }
    }

    pub fn inverse(self) -> Direction {
        match self {
            Direction::Cw => Direction::Ccw,
            Direction::Ccw => Direction::Cw,
            Direction::Half => Direction::Half,
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            Direction::Cw => "",
            Direction::Ccw => "'",
            Direction::Half => "2",
        }
    }
}

/// Inner-slice moves, defined only on odd-sized cubes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Slice {
    /// Middle layer between L and R; follows L.
    M,
    /// Equatorial layer between U and D; follows D.
    E,
    /// Standing layer between F and B; follows F.
    S,
}

impl Slice {
    pub fn letter(self) -> char {
        match self {
            Slice::M => 'M',
            Slice::E => 'E',
            Slice::S => 'S',
        }
    }

    pub fn axis(self) -> Axis {
        match self {
            Slice::M => Axis::X,
            Slice::E => Axis::Y,
            Slice::S => Axis::Z,
        }
    }
}

/// What a move turns: an outer face (with a wide depth), an inner slice, or
/// the whole cube.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Target {
    Face(Face),
    Slice(Slice),
    Rotation(Axis),
}

/// A single immutable move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub target: Target,
    pub direction: Direction,
    /// Layers turned together, counted from the face. 1 for plain turns,
    /// 2+ for wide turns. Always 1 for slices and rotations.
    pub depth: u8,
}

impl Move {
    pub fn face(face: Face, direction: Direction) -> Move {
        Move {
            target: Target::Face(face),
            direction,
            depth: 1,
        }
    }

    pub fn wide(face: Face, direction: Direction, depth: u8) -> Move {
        Move {
            target: Target::Face(face),
            direction,
            depth,
        }
    }

    pub fn slice(slice: Slice, direction: Direction) -> Move {
        Move {
            target: Target::Slice(slice),
            direction,
            depth: 1,
        }
    }

    pub fn rotation(axis: Axis, direction: Direction) -> Move {
        Move {
            target: Target::Rotation(axis),
            direction,
            depth: 1,
        }
    }

    /// Axis the move rotates around.
    pub fn axis(&self) -> Axis {
        match self.target {
            Target::Face(f) => f.axis(),
            Target::Slice(s) => s.axis(),
            Target::Rotation(a) => a,
        }
    }

    /// The outer face, for face moves.
    pub fn outer_face(&self) -> Option<Face> {
        match self.target {
            Target::Face(f) => Some(f),
            _ => None,
        }
    }

    pub fn is_rotation(&self) -> bool {
        matches!(self.target, Target::Rotation(_))
    }

    /// Move that undoes this one. A half turn is self-inverse.
    pub fn inverse(&self) -> Move {
        Move {
            target: self.target,
            direction: self.direction.inverse(),
            depth: self.depth,
        }
    }

    /// Parse one token of standard notation.
    pub fn from_notation(token: &str) -> Result<Move> {
        let token = token.trim();
        if token.is_empty() {
            return Err(CubeError::parse(token, "empty move token"));
        }
        let mut chars = token.chars().peekable();

        let mut digits = String::new();
        while let Some(c) = chars.peek().copied() {
            if c.is_ascii_digit() {
                digits.push(c);
                chars.next();
            } else {
                break;
            }
        }
        let prefix_depth = if digits.is_empty() {
            None
        } else {
            let d: u8 = digits
                .parse()
                .map_err(|_| CubeError::parse(token, "layer prefix out of range"))?;
            if d < 2 {
                return Err(CubeError::parse(token, "layer prefix must be at least 2"));
            }
            Some(d)
        };

        let letter = chars
            .next()
            .ok_or_else(|| CubeError::parse(token, "missing face letter"))?;
        let mut wide = false;
        if chars.peek() == Some(&'w') {
            wide = true;
            chars.next();
        }
        let direction = match chars.next() {
            None => Direction::Cw,
            Some('\'') => Direction::Ccw,
            Some('2') => Direction::Half,
            Some(c) => {
                return Err(CubeError::parse(token, format!("unexpected '{}'", c)));
            }
        };
        if chars.next().is_some() {
            return Err(CubeError::parse(token, "trailing characters"));
        }

        let target = match letter {
            'U' => Target::Face(Face::U),
            'D' => Target::Face(Face::D),
            'L' => Target::Face(Face::L),
            'R' => Target::Face(Face::R),
            'F' => Target::Face(Face::F),
            'B' => Target::Face(Face::B),
            'M' => Target::Slice(Slice::M),
            'E' => Target::Slice(Slice::E),
            'S' => Target::Slice(Slice::S),
            'x' => Target::Rotation(Axis::X),
            'y' => Target::Rotation(Axis::Y),
            'z' => Target::Rotation(Axis::Z),
            c => {
                return Err(CubeError::parse(token, format!("unknown face '{}'", c)));
            }
        };

        let depth = match target {
            Target::Face(_) => {
                if wide {
                    // `Rw` is two layers; `3Rw` takes the prefix.
                    prefix_depth.unwrap_or(2)
                } else {
                    // A bare prefix such as `3R` also reads as a wide turn.
                    prefix_depth.unwrap_or(1)
                }
            }
            Target::Slice(_) | Target::Rotation(_) => {
                if wide || prefix_depth.is_some() {
                    return Err(CubeError::parse(
                        token,
                        "wide markers only apply to face moves",
                    ));
                }
                1
            }
        };

        Ok(Move {
            target,
            direction,
            depth,
        })
    }

    /// Canonical notation for this move; the exact inverse of parsing.
    pub fn to_notation(&self) -> String {
        let mut out = String::new();
        match self.target {
            Target::Face(f) => {
                if self.depth >= 3 {
                    out.push_str(&self.depth.to_string());
                }
                out.push(f.letter());
                if self.depth >= 2 {
                    out.push('w');
                }
            }
            Target::Slice(s) => out.push(s.letter()),
            Target::Rotation(Axis::X) => out.push('x'),
            Target::Rotation(Axis::Y) => out.push('y'),
            Target::Rotation(Axis::Z) => out.push('z'),
        }
        out.push_str(self.direction.suffix());
        out
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_notation())
    }
}

// ==================== Sequences ====================

/// An ordered sequence of moves (an algorithm).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveSequence {
    moves: Vec<Move>,
}

impl MoveSequence {
    pub fn new() -> MoveSequence {
        MoveSequence { moves: Vec::new() }
    }

    /// Parse a whitespace-separated notation string.
    pub fn from_notation(text: &str) -> Result<MoveSequence> {
        let mut moves = Vec::new();
        for token in text.split_whitespace() {
            moves.push(Move::from_notation(token)?);
        }
        Ok(MoveSequence { moves })
    }

    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn push(&mut self, mv: Move) {
        self.moves.push(mv);
    }

    pub fn extend(&mut self, other: &MoveSequence) {
        self.moves.extend_from_slice(&other.moves);
    }

    pub fn to_notation(&self) -> String {
        self.moves
            .iter()
            .map(|m| m.to_notation())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Reverse the order and invert every move.
    pub fn inverse(&self) -> MoveSequence {
        MoveSequence {
            moves: self.moves.iter().rev().map(|m| m.inverse()).collect(),
        }
    }

    /// Merge consecutive moves on the same target and depth, dropping runs
    /// that cancel to the identity. Runs until no merge applies, so the
    /// result is a fixed point and optimizing twice changes nothing.
    pub fn optimize(&self) -> MoveSequence {
        let mut current = self.moves.clone();
        loop {
            let mut merged = Vec::with_capacity(current.len());
            let mut i = 0;
            while i < current.len() {
                let head = current[i];
                let mut turns = u32::from(head.direction.quarter_turns());
                let mut j = i + 1;
                while j < current.len()
                    && current[j].target == head.target
                    && current[j].depth == head.depth
                {
                    turns += u32::from(current[j].direction.quarter_turns());
                    j += 1;
                }
                if let Some(direction) = Direction::from_quarter_turns((turns % 4) as u8) {
                    merged.push(Move {
                        target: head.target,
                        direction,
                        depth: head.depth,
                    });
                }
                i = j;
            }
            if merged == current {
                return MoveSequence { moves: merged };
            }
            current = merged;
        }
    }
}

impl From<Vec<Move>> for MoveSequence {
    fn from(moves: Vec<Move>) -> Self {
        MoveSequence { moves }
    }
}

impl std::fmt::Display for MoveSequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_notation())
    }
}

impl<'a> IntoIterator for &'a MoveSequence {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.moves.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_canonical_tokens() {
        for token in [
            "R", "R'", "R2", "U", "D'", "L2", "F", "B'", "Rw", "Rw2", "3Rw", "3Rw'", "4Uw2", "M",
            "M'", "E2", "S", "x", "y'", "z2",
        ] {
            let mv = Move::from_notation(token).unwrap();
            assert_eq!(mv.to_notation(), token, "round trip failed for {}", token);
        }
    }

    #[test]
    fn bare_depth_prefix_reads_as_wide() {
        let mv = Move::from_notation("3R").unwrap();
        assert_eq!(mv.depth, 3);
        assert_eq!(mv.to_notation(), "3Rw");
    }

    #[test]
    fn rejects_malformed_tokens() {
        for token in ["", "Q", "R3", "R''", "Mw", "2M", "xw", "2x", "1R", "Rw2'"] {
            assert!(
                Move::from_notation(token).is_err(),
                "token {:?} should fail",
                token
            );
        }
    }

    #[test]
    fn inverse_rules() {
        let r = Move::from_notation("R").unwrap();
        assert_eq!(r.inverse().to_notation(), "R'");
        let r2 = Move::from_notation("R2").unwrap();
        assert_eq!(r2.inverse(), r2);
        let m = Move::from_notation("M'").unwrap();
        assert_eq!(m.inverse().to_notation(), "M");
    }

    #[test]
    fn sequence_parse_reports_bad_token() {
        let err = MoveSequence::from_notation("R U Q2 F").unwrap_err();
        match err {
            CubeError::Parse { token, .. } => assert_eq!(token, "Q2"),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn sequence_inverse_reverses_and_inverts() {
        let seq = MoveSequence::from_notation("R U2 F'").unwrap();
        assert_eq!(seq.inverse().to_notation(), "F U2 R'");
    }

    #[test]
    fn optimize_merges_same_face_runs() {
        let cases = [
            ("R R", "R2"),
            ("R R'", ""),
            ("R R2", "R'"),
            ("R2 R2", ""),
            ("R U R'", "R U R'"),
            ("L L L L", ""),
            ("R Rw", "R Rw"), // different depths stay separate
        ];
        for (input, expected) in cases {
            let seq = MoveSequence::from_notation(input).unwrap();
            assert_eq!(seq.optimize().to_notation(), expected, "input {}", input);
        }
    }

    #[test]
    fn optimize_reaches_fixed_point_across_cancellations() {
        // Removing the inner pair exposes an outer pair.
        let seq = MoveSequence::from_notation("R L L' R'").unwrap();
        assert_eq!(seq.optimize().to_notation(), "");
    }

    #[test]
    fn optimize_is_idempotent() {
        let seq = MoveSequence::from_notation("R R U U2 F F' M M M").unwrap();
        let once = seq.optimize();
        let twice = once.optimize();
        assert_eq!(once, twice);
    }

    #[test]
    fn serde_round_trip() {
        let seq = MoveSequence::from_notation("R U R' U' 3Rw2 M x").unwrap();
        let json = serde_json::to_string(&seq).unwrap();
        let back: MoveSequence = serde_json::from_str(&json).unwrap();
        assert_eq!(back, seq);
    }
}
