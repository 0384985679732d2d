//! Scramble generation.
//!
//! Sequences are drawn uniformly from the legal move set for the cube size
//! and filtered so no two consecutive moves turn the same face and no move
//! recreates an `R L R` style sandwich on one axis. Seeded scrambles are
//! reproducible bit-for-bit on every platform: the generator below is a
//! self-contained PCG-style PRNG (64-bit LCG state with an xorshift-rotate
//! output) seeded as `seed + 1`, and selections take the output modulo the
//! option count in face, depth, direction order.

use crate::engine::MoveEngine;
use crate::error::{CubeError, Result};
use crate::moves::{Direction, Move, MoveSequence, Target};
use crate::state::{CubeState, Face, MAX_SIZE, MIN_SIZE};

const SCRAMBLE_FACES: [Face; 6] = [Face::U, Face::D, Face::L, Face::R, Face::F, Face::B];
const DIRECTIONS: [Direction; 3] = [Direction::Cw, Direction::Ccw, Direction::Half];

/// Pseudo-random scramble generator.
pub struct Scrambler {
    rng: SimpleRng,
}

impl Default for Scrambler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scrambler {
    /// Create a scrambler seeded from the operating system.
    pub fn new() -> Self {
        Self {
            rng: SimpleRng::new(),
        }
    }

    /// Create a scrambler with a fixed seed for reproducible sequences.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: SimpleRng::with_seed(seed),
        }
    }

    /// Generate a cancellation-free scramble for an n-sized cube. Cubes of
    /// size 4 and up draw wide turns (depth up to n/2) so inner layers get
    /// mixed as well.
    pub fn generate(&mut self, size: usize, length: usize) -> Result<MoveSequence> {
        if !(MIN_SIZE..=MAX_SIZE).contains(&size) {
            return Err(CubeError::invalid_state(format!(
                "cube size must be between {} and {}, got {}",
                MIN_SIZE, MAX_SIZE, size
            )));
        }
        if length == 0 {
            return Err(CubeError::invalid_state(
                "scramble length must be at least 1",
            ));
        }
        let max_depth = if size >= 4 { size / 2 } else { 1 };

        let mut moves: Vec<Move> = Vec::with_capacity(length);
        while moves.len() < length {
            let face = SCRAMBLE_FACES[self.rng.next_usize(SCRAMBLE_FACES.len())];
            let depth = 1 + self.rng.next_usize(max_depth) as u8;
            let direction = DIRECTIONS[self.rng.next_usize(DIRECTIONS.len())];
            let candidate = Move {
                target: Target::Face(face),
                direction,
                depth,
            };
            if Self::rejected(&moves, candidate) {
                continue;
            }
            moves.push(candidate);
        }
        Ok(MoveSequence::from(moves))
    }

    /// Generate a scramble and apply it to a fresh solved cube, returning
    /// both the sequence and the scrambled state.
    pub fn scramble_new(
        &mut self,
        size: usize,
        length: usize,
    ) -> Result<(MoveSequence, CubeState)> {
        let seq = self.generate(size, length)?;
        let mut state = CubeState::new(size)?;
        MoveEngine::apply_sequence(&mut state, &seq)?;
        Ok((seq, state))
    }

    /// A candidate is rejected when it repeats the previous face, or when it
    /// shares an axis with the previous move and repeats the face of the
    /// move before that (`R L R` with no perpendicular turn between).
    fn rejected(moves: &[Move], candidate: Move) -> bool {
        let face = match candidate.outer_face() {
            Some(f) => f,
            None => return false,
        };
        let prev = match moves.last() {
            Some(m) => m,
            None => return false,
        };
        if prev.outer_face() == Some(face) {
            return true;
        }
        if prev.axis() == candidate.axis() {
            if let Some(prev2) = moves.len().checked_sub(2).map(|i| &moves[i]) {
                if prev2.outer_face() == Some(face) {
                    return true;
                }
            }
        }
        false
    }
}

/// Simple PCG-style PRNG, platform independent and wasm friendly.
struct SimpleRng {
    state: u64,
}

impl SimpleRng {
    fn new() -> Self {
        // Use getrandom for WASM-compatible random seeding.
        let mut seed_bytes = [0u8; 8];
        getrandom::getrandom(&mut seed_bytes).unwrap_or_else(|_| {
            // Fallback: use a static counter if getrandom fails
            static COUNTER: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(1);
            let counter = COUNTER.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            seed_bytes = counter.to_le_bytes();
        });
        let seed = u64::from_le_bytes(seed_bytes);
        Self::with_seed(seed)
    }

    fn with_seed(seed: u64) -> Self {
        Self {
            state: seed.wrapping_add(1),
        }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let xorshifted = (((self.state >> 18) ^ self.state) >> 27) as u32;
        let rot = (self.state >> 59) as u32;
        (xorshifted.rotate_right(rot)) as u64
    }

    fn next_usize(&mut self, bound: usize) -> usize {
        (self.next_u64() as usize) % bound
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_scrambles_are_deterministic() {
        let a = Scrambler::with_seed(42).generate(3, 20).unwrap();
        let b = Scrambler::with_seed(42).generate(3, 20).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 20);

        let c = Scrambler::with_seed(43).generate(3, 20).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn no_repeated_or_sandwiched_faces() {
        let seq = Scrambler::with_seed(9).generate(3, 200).unwrap();
        let moves = seq.moves();
        for window in moves.windows(2) {
            assert_ne!(window[0].outer_face(), window[1].outer_face());
        }
        for window in moves.windows(3) {
            let (a, b, c) = (window[0], window[1], window[2]);
            if a.axis() == b.axis() && b.axis() == c.axis() {
                assert_ne!(a.outer_face(), c.outer_face(), "sandwich in {}", seq);
            }
        }
    }

    #[test]
    fn small_cubes_draw_only_outer_turns() {
        let seq = Scrambler::with_seed(5).generate(3, 100).unwrap();
        assert!(seq.moves().iter().all(|m| m.depth == 1));
    }

    #[test]
    fn big_cubes_draw_wide_turns() {
        let seq = Scrambler::with_seed(5).generate(5, 200).unwrap();
        assert!(seq.moves().iter().all(|m| m.depth <= 2));
        assert!(seq.moves().iter().any(|m| m.depth == 2));
    }

    #[test]
    fn scramble_new_returns_mixed_state() {
        let mut scrambler = Scrambler::with_seed(11);
        let (seq, state) = scrambler.scramble_new(3, 25).unwrap();
        assert_eq!(seq.len(), 25);
        assert!(!state.is_solved());
        assert_eq!(state.move_count(), 25);
    }

    #[test]
    fn rejects_degenerate_requests() {
        assert!(Scrambler::with_seed(1).generate(1, 10).is_err());
        assert!(Scrambler::with_seed(1).generate(3, 0).is_err());
    }
}
