//! Last-layer pattern recognition.
//!
//! Case tables are built once per matcher instance: for every named OLL and
//! PLL algorithm the inverse is applied to a solved cube, and the resulting
//! last-layer signature is recorded for each baked-in U rotation. Looking up
//! a query is a single hash probe with no rotating of the query state.
//!
//! The signatures are complete encodings of the last layer: the OLL
//! signature captures every corner twist and edge flip, the PLL signature
//! the face offset of every side sticker. Two states share a signature
//! exactly when they share the encoded pattern, so a matched entry's recipe
//! solves the query by the same moves that solved its own key.

use crate::algorithms::{AlgorithmDb, Category};
use crate::engine::MoveEngine;
use crate::error::Result;
use crate::moves::{Direction, Move, MoveSequence};
use crate::state::{Color, CubeState, Face, Position};
use std::collections::HashMap;

/// How many recent queries the recognition cache retains.
const CACHE_CAPACITY: usize = 16;

/// A recognized last-layer case with the moves that solve it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch {
    pub name: &'static str,
    pub category: Category,
    /// U turns to apply before the algorithm.
    pub pre_u: u8,
    /// U turns to apply after the algorithm (PLL alignment).
    pub post_u: u8,
    pub algorithm: MoveSequence,
}

impl PatternMatch {
    /// The complete move sequence: setup turns, algorithm, closing turns.
    pub fn full_sequence(&self) -> MoveSequence {
        let mut seq = MoveSequence::new();
        for _ in 0..self.pre_u {
            seq.push(Move::face(Face::U, Direction::Cw));
        }
        seq.extend(&self.algorithm);
        for _ in 0..self.post_u {
            seq.push(Move::face(Face::U, Direction::Cw));
        }
        seq
    }
}

#[derive(Debug, Clone, Copy)]
struct CaseEntry {
    name: &'static str,
    alg_index: usize,
    pre_u: u8,
    post_u: u8,
}

/// Precomputed last-layer case matcher with a bounded LRU result cache.
///
/// Tables are immutable after construction. The cache makes `recognize`
/// take `&mut self`; share instances per thread or synchronize externally.
pub struct PatternMatcher {
    oll_algs: Vec<(&'static str, MoveSequence)>,
    pll_algs: Vec<(&'static str, MoveSequence)>,
    oll_table: HashMap<u32, CaseEntry>,
    pll_table: HashMap<u32, CaseEntry>,
    cache: Vec<((Category, u32), Option<PatternMatch>)>,
}

impl Default for PatternMatcher {
    fn default() -> Self {
        Self::standard()
    }
}

impl PatternMatcher {
    /// Build a matcher from the standard algorithm database.
    pub fn standard() -> PatternMatcher {
        Self::from_db(&AlgorithmDb::standard())
    }

    /// Build a matcher from an injected database.
    pub fn from_db(db: &AlgorithmDb) -> PatternMatcher {
        let oll_algs: Vec<(&'static str, MoveSequence)> = db
            .by_category(Category::Oll)
            .iter()
            .map(|a| (a.name, a.moves.clone()))
            .collect();
        let pll_algs: Vec<(&'static str, MoveSequence)> = db
            .by_category(Category::Pll)
            .iter()
            .map(|a| (a.name, a.moves.clone()))
            .collect();

        let mut matcher = PatternMatcher {
            oll_algs,
            pll_algs,
            oll_table: HashMap::new(),
            pll_table: HashMap::new(),
            cache: Vec::new(),
        };
        matcher
            .build_tables()
            .expect("table construction applies only legal 3x3 moves");
        matcher
    }

    fn build_tables(&mut self) -> Result<()> {
        let u = Move::face(Face::U, Direction::Cw);

        for alg_index in 0..self.oll_algs.len() {
            let (name, alg) = (
                self.oll_algs[alg_index].0,
                self.oll_algs[alg_index].1.clone(),
            );
            let mut base = CubeState::new(3)?;
            MoveEngine::apply_sequence(&mut base, &alg.inverse())?;
            for k in 0..4u8 {
                let mut rotated = base.clone();
                for _ in 0..k {
                    MoveEngine::apply(&mut rotated, u)?;
                }
                if let Some(sig) = oll_signature(&rotated) {
                    self.oll_table.entry(sig).or_insert(CaseEntry {
                        name,
                        alg_index,
                        pre_u: (4 - k) % 4,
                        post_u: 0,
                    });
                }
            }
        }

        for alg_index in 0..self.pll_algs.len() {
            let (name, alg) = (
                self.pll_algs[alg_index].0,
                self.pll_algs[alg_index].1.clone(),
            );
            for m in 0..4u8 {
                let mut base = CubeState::new(3)?;
                for _ in 0..m {
                    MoveEngine::apply(&mut base, u)?;
                }
                MoveEngine::apply_sequence(&mut base, &alg.inverse())?;
                for k in 0..4u8 {
                    let mut rotated = base.clone();
                    for _ in 0..k {
                        MoveEngine::apply(&mut rotated, u)?;
                    }
                    if let Some(sig) = pll_signature(&rotated) {
                        self.pll_table.entry(sig).or_insert(CaseEntry {
                            name,
                            alg_index,
                            pre_u: (4 - k) % 4,
                            post_u: (4 - m) % 4,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Number of distinct signatures per table.
    pub fn table_sizes(&self) -> (usize, usize) {
        (self.oll_table.len(), self.pll_table.len())
    }

    /// Recognize the last-layer configuration: an OLL case while the last
    /// layer is unoriented, a PLL case afterwards. Returns `None` for
    /// states outside the tables (wrong size, mid-solve, unknown case).
    pub fn recognize(&mut self, state: &CubeState) -> Option<PatternMatch> {
        match oll_signature(state) {
            Some(0) => self.recognize_pll(state),
            Some(_) => self.recognize_oll(state),
            None => None,
        }
    }

    /// Recognize an orientation (OLL) case.
    pub fn recognize_oll(&mut self, state: &CubeState) -> Option<PatternMatch> {
        let sig = oll_signature(state)?;
        self.lookup(Category::Oll, sig)
    }

    /// Recognize a permutation (PLL) case. Only meaningful once the last
    /// layer is oriented.
    pub fn recognize_pll(&mut self, state: &CubeState) -> Option<PatternMatch> {
        let sig = pll_signature(state)?;
        self.lookup(Category::Pll, sig)
    }

    fn lookup(&mut self, category: Category, sig: u32) -> Option<PatternMatch> {
        let key = (category, sig);
        if let Some(i) = self.cache.iter().position(|(k, _)| *k == key) {
            let hit = self.cache.remove(i);
            let result = hit.1.clone();
            self.cache.insert(0, hit);
            return result;
        }
        let table = match category {
            Category::Oll => &self.oll_table,
            Category::Pll => &self.pll_table,
            _ => return None,
        };
        let algs = match category {
            Category::Oll => &self.oll_algs,
            _ => &self.pll_algs,
        };
        let result = table.get(&sig).map(|entry| PatternMatch {
            name: entry.name,
            category,
            pre_u: entry.pre_u,
            post_u: entry.post_u,
            algorithm: algs[entry.alg_index].1.clone(),
        });
        self.cache.insert(0, (key, result.clone()));
        self.cache.truncate(CACHE_CAPACITY);
        result
    }
}

// ==================== Signatures ====================

const LL_CORNERS: [Position; 4] = [
    Position { x: 2, y: 2, z: 2 }, // URF
    Position { x: 2, y: 2, z: 0 }, // UBR
    Position { x: 0, y: 2, z: 0 }, // ULB
    Position { x: 0, y: 2, z: 2 }, // UFL
];

const LL_EDGES: [Position; 4] = [
    Position { x: 1, y: 2, z: 2 }, // UF
    Position { x: 2, y: 2, z: 1 }, // UR
    Position { x: 1, y: 2, z: 0 }, // UB
    Position { x: 0, y: 2, z: 1 }, // UL
];

fn up_color(state: &CubeState) -> Option<Color> {
    state
        .cubie_at(Position::new(1, 2, 1))
        .and_then(|c| c.sticker_on(Face::U))
}

/// Complete orientation encoding of the last layer: 2 bits of twist per
/// corner and 1 flip bit per edge. Zero means fully oriented. Only defined
/// on 3x3 states whose last-layer pieces all carry the up color.
pub fn oll_signature(state: &CubeState) -> Option<u32> {
    if state.size() != 3 {
        return None;
    }
    let up = up_color(state)?;
    let mut sig = 0u32;
    for (i, &pos) in LL_CORNERS.iter().enumerate() {
        let cubie = state.cubie_at(pos)?;
        let facing = cubie.facing_of(up)?;
        let triple = state.corner_triple(pos);
        let twist = triple.iter().position(|&f| f == facing)? as u32;
        sig |= twist << (2 * i);
    }
    for (i, &pos) in LL_EDGES.iter().enumerate() {
        let cubie = state.cubie_at(pos)?;
        let facing = cubie.facing_of(up)?;
        let flip = if facing == Face::U { 0u32 } else { 1 };
        sig |= flip << (8 + i);
    }
    Some(sig)
}

/// Complete permutation encoding of an oriented last layer: for each of the
/// twelve side stickers, the 2-bit cyclic offset between the face it shows
/// on and the face its color belongs to. Zero means solved.
pub fn pll_signature(state: &CubeState) -> Option<u32> {
    if state.size() != 3 {
        return None;
    }
    let mut home_index = HashMap::new();
    for (i, &face) in Face::SIDE_CYCLE.iter().enumerate() {
        let center = state.cubie_at(center_of(face))?;
        home_index.insert(center.sticker_on(face)?, i);
    }
    let mut sig = 0u32;
    let mut bit = 0;
    for (i, &face) in Face::SIDE_CYCLE.iter().enumerate() {
        let grid = state.face_colors(face);
        for col in 0..3 {
            let color = grid[0][col];
            let home = *home_index.get(&color)?;
            let offset = ((home + 4 - i) % 4) as u32;
            sig |= offset << bit;
            bit += 2;
        }
    }
    Some(sig)
}

fn center_of(face: Face) -> Position {
    match face {
        Face::U => Position::new(1, 2, 1),
        Face::D => Position::new(1, 0, 1),
        Face::F => Position::new(1, 1, 2),
        Face::B => Position::new(1, 1, 0),
        Face::R => Position::new(2, 1, 1),
        Face::L => Position::new(0, 1, 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_after(notation: &str) -> CubeState {
        let mut state = CubeState::new(3).unwrap();
        let seq = MoveSequence::from_notation(notation).unwrap();
        MoveEngine::apply_sequence(&mut state, &seq).unwrap();
        state
    }

    #[test]
    fn solved_signatures_are_zero() {
        let state = CubeState::new(3).unwrap();
        assert_eq!(oll_signature(&state), Some(0));
        assert_eq!(pll_signature(&state), Some(0));
    }

    #[test]
    fn signatures_undefined_off_three() {
        let state = CubeState::new(4).unwrap();
        assert_eq!(oll_signature(&state), None);
    }

    #[test]
    fn every_oll_case_recognized_in_all_rotations() {
        let mut matcher = PatternMatcher::standard();
        let names: Vec<&'static str> = matcher.oll_algs.iter().map(|(n, _)| *n).collect();
        let algs: Vec<MoveSequence> =
            matcher.oll_algs.iter().map(|(_, a)| a.clone()).collect();
        for (name, alg) in names.iter().zip(&algs) {
            let mut base = CubeState::new(3).unwrap();
            MoveEngine::apply_sequence(&mut base, &alg.inverse()).unwrap();
            for k in 0..4 {
                let mut rotated = base.clone();
                for _ in 0..k {
                    MoveEngine::apply(&mut rotated, Move::face(Face::U, Direction::Cw)).unwrap();
                }
                let found = matcher
                    .recognize_oll(&rotated)
                    .unwrap_or_else(|| panic!("{} rotation {} not recognized", name, k));
                assert_eq!(found.name, *name, "rotation {} of {}", k, name);

                // The recipe actually orients the layer.
                let mut work = rotated.clone();
                MoveEngine::apply_sequence(&mut work, &found.full_sequence()).unwrap();
                assert_eq!(oll_signature(&work), Some(0), "{} rotation {}", name, k);
            }
        }
    }

    #[test]
    fn every_pll_case_recognized_and_solved_in_all_rotations() {
        let mut matcher = PatternMatcher::standard();
        let names: Vec<&'static str> = matcher.pll_algs.iter().map(|(n, _)| *n).collect();
        let algs: Vec<MoveSequence> =
            matcher.pll_algs.iter().map(|(_, a)| a.clone()).collect();
        for (name, alg) in names.iter().zip(&algs) {
            let mut base = CubeState::new(3).unwrap();
            MoveEngine::apply_sequence(&mut base, &alg.inverse()).unwrap();
            for k in 0..4 {
                let mut rotated = base.clone();
                for _ in 0..k {
                    MoveEngine::apply(&mut rotated, Move::face(Face::U, Direction::Cw)).unwrap();
                }
                let found = matcher
                    .recognize_pll(&rotated)
                    .unwrap_or_else(|| panic!("{} rotation {} not recognized", name, k));
                assert_eq!(found.name, *name, "rotation {} of {}", k, name);

                let mut work = rotated.clone();
                MoveEngine::apply_sequence(&mut work, &found.full_sequence()).unwrap();
                assert!(work.is_solved(), "{} rotation {} did not solve", name, k);
            }
        }
    }

    #[test]
    fn recognize_dispatches_between_oll_and_pll() {
        let mut matcher = PatternMatcher::standard();

        // Sune case: orientation pending.
        let state = state_after("R U2 R' U' R U' R'");
        let found = matcher.recognize(&state).unwrap();
        assert_eq!(found.category, Category::Oll);

        // T-perm case: oriented, permutation pending.
        let t = AlgorithmDb::standard()
            .get(Category::Pll, "T")
            .unwrap()
            .moves
            .clone();
        let mut state = CubeState::new(3).unwrap();
        MoveEngine::apply_sequence(&mut state, &t.inverse()).unwrap();
        let found = matcher.recognize(&state).unwrap();
        assert_eq!(found.category, Category::Pll);
    }

    #[test]
    fn unknown_states_return_none() {
        let mut matcher = PatternMatcher::standard();
        // After a bare R the front face shows a Yellow sticker in its top
        // row, so no permutation signature exists and nothing matches.
        let state = state_after("R");
        assert!(matcher.recognize_pll(&state).is_none());
    }

    #[test]
    fn cache_is_bounded_and_consistent() {
        let mut matcher = PatternMatcher::standard();
        let state = state_after("R U2 R' U' R U' R'");
        let first = matcher.recognize_oll(&state).unwrap();
        let second = matcher.recognize_oll(&state).unwrap();
        assert_eq!(first, second);
        for auf in ["U", "U2", "U'", "U U"] {
            let s = state_after(&format!("R U2 R' U' R U' R' {}", auf));
            assert!(matcher.recognize_oll(&s).is_some());
        }
        assert!(matcher.cache.len() <= CACHE_CAPACITY);
    }
}
