//! The CFOP method: Cross, F2L, OLL, PLL.
//!
//! OLL and PLL go through the injected pattern matcher; when a state falls
//! outside the tables the strategy degrades to the two-look equivalents
//! instead of failing.

use crate::algorithms::{AlgorithmDb, Category};
use crate::error::{CubeError, Result};
use crate::moves::MoveSequence;
use crate::pattern::PatternMatcher;
use crate::state::{CubeState, Face};

use super::phases::{
    self, cross_solved, first_two_layers_solved, middle_slots, pos_of_faces, slot_solved,
    top_corners_oriented, top_corners_solved, top_edges_oriented, top_oriented, FaceColors, Work,
};
use super::{Phase, PhaseReport, SolutionResult, SolutionStep, SolverStrategy};

/// CFOP solver for 3x3 cubes with pattern-matched last-layer cases.
pub struct Cfop {
    matcher: PatternMatcher,
    swap_alg: MoveSequence,
    edge_algs: Vec<(&'static str, MoveSequence)>,
}

impl Default for Cfop {
    fn default() -> Self {
        Self::new()
    }
}

impl Cfop {
    /// Build with a freshly constructed standard matcher.
    pub fn new() -> Cfop {
        Self::with_matcher(PatternMatcher::standard())
    }

    /// Build around an externally owned matcher (dependency injection; tests
    /// substitute their own instance).
    pub fn with_matcher(matcher: PatternMatcher) -> Cfop {
        let db = AlgorithmDb::standard();
        let alg = |name: &str| {
            db.get(Category::Pll, name)
                .map(|a| a.moves.clone())
                .expect("standard database carries the named permutation")
        };
        Cfop {
            matcher,
            swap_alg: alg("T"),
            edge_algs: vec![
                ("Ua", alg("Ua")),
                ("Ub", alg("Ub")),
                ("H", alg("H")),
                ("Z", alg("Z")),
            ],
        }
    }

    /// Two-look completion of the last layer from any post-F2L position.
    fn finish_last_layer(&mut self, work: &mut Work, fc: &FaceColors) -> Result<()> {
        if !top_edges_oriented(&work.state, fc) {
            phases::solve_top_cross(work, fc)?;
        }
        if !top_corners_oriented(&work.state, fc) {
            phases::orient_top_corners(work, fc)?;
        }
        if !top_corners_solved(&work.state, fc) {
            phases::permute_top_corners(work, fc, &self.swap_alg)?;
        }
        if !work.state.is_solved() {
            phases::permute_top_edges(work, fc, &self.edge_algs)?;
        }
        Ok(())
    }
}

impl SolverStrategy for Cfop {
    fn name(&self) -> &'static str {
        "CFOP"
    }

    fn supports_size(&self, size: usize) -> bool {
        size == 3
    }

    fn solve(&mut self, state: &CubeState) -> Result<SolutionResult> {
        let n = state.size();
        if !self.supports_size(n) {
            return Err(CubeError::UnsupportedSize {
                strategy: self.name().to_string(),
                size: n,
            });
        }
        state
            .validate_invariants()
            .map_err(|e| CubeError::unsolvable("precheck", e.to_string()))?;
        if state.is_solved() {
            return Ok(SolutionResult::empty(self.name()));
        }

        let fc = FaceColors::resolve(state)?;
        let mut work = Work::new(state.clone());
        let mut steps = Vec::new();

        // Cross.
        if !cross_solved(&work.state, &fc) {
            phases::solve_cross(&mut work, &fc)?;
            let moves = work.take_step_moves();
            steps.push(SolutionStep {
                phase: Phase::Cross,
                algorithm: None,
                moves,
                explanation: "Build the bottom cross, matching each side center".to_string(),
            });
        }

        // F2L: four corner-edge pairs, preserving every pair already done.
        let mut solved_slots: Vec<(Face, Face)> = middle_slots()
            .into_iter()
            .filter(|&(a, t)| {
                slot_solved(&work.state, &fc, pos_of_faces(n, &[Face::D, a, t]))
                    && slot_solved(&work.state, &fc, pos_of_faces(n, &[a, t]))
            })
            .collect();
        for (a, t) in middle_slots() {
            if solved_slots.contains(&(a, t)) {
                continue;
            }
            phases::solve_f2l_pair(&mut work, &fc, a, t, &solved_slots)?;
            solved_slots.push((a, t));
            let moves = work.take_step_moves();
            if !moves.is_empty() {
                steps.push(SolutionStep {
                    phase: Phase::F2L,
                    algorithm: None,
                    moves,
                    explanation: format!("Pair and insert the {}{} corner-edge pair", a, t),
                });
            }
        }

        // OLL.
        if !top_oriented(&work.state, &fc) {
            if let Some(case) = self.matcher.recognize_oll(&work.state) {
                work.apply_seq(&case.full_sequence())?;
                let moves = work.take_step_moves();
                steps.push(SolutionStep {
                    phase: Phase::Oll,
                    algorithm: Some(case.name.to_string()),
                    moves,
                    explanation: format!(
                        "Orient the last layer with {} so the top face is one color",
                        case.name
                    ),
                });
            }
            if !top_oriented(&work.state, &fc) {
                // Outside the table (or a non-canonical position): two-look.
                phases::solve_top_cross(&mut work, &fc)?;
                phases::orient_top_corners(&mut work, &fc)?;
                let moves = work.take_step_moves();
                if !moves.is_empty() {
                    steps.push(SolutionStep {
                        phase: Phase::Oll,
                        algorithm: Some("two-look OLL".to_string()),
                        moves,
                        explanation: "Orient the last layer in two looks: cross, then corners"
                            .to_string(),
                    });
                }
            }
        }

        // PLL.
        if !work.state.is_solved() {
            let matched = self.matcher.recognize_pll(&work.state);
            if let Some(case) = matched {
                work.apply_seq(&case.full_sequence())?;
                let moves = work.take_step_moves();
                steps.push(SolutionStep {
                    phase: Phase::Pll,
                    algorithm: Some(case.name.to_string()),
                    moves,
                    explanation: format!(
                        "Permute the last layer with {} to finish the cube",
                        case.name
                    ),
                });
            }
            if !work.state.is_solved() {
                self.finish_last_layer(&mut work, &fc)?;
                let moves = work.take_step_moves();
                if !moves.is_empty() {
                    steps.push(SolutionStep {
                        phase: Phase::Pll,
                        algorithm: Some("two-look PLL".to_string()),
                        moves,
                        explanation: "Permute the last layer in two looks: corners, then edges"
                            .to_string(),
                    });
                }
            }
        }

        if !work.state.is_solved() {
            return Err(CubeError::unsolvable(
                "final check",
                "phases completed but the cube is not solved",
            ));
        }
        Ok(SolutionResult::new(self.name(), steps))
    }

    fn analyze(&self, state: &CubeState) -> PhaseReport {
        if !self.supports_size(state.size()) {
            return PhaseReport { entries: Vec::new() };
        }
        let fc = match FaceColors::resolve(state) {
            Ok(fc) => fc,
            Err(_) => return PhaseReport { entries: Vec::new() },
        };
        PhaseReport {
            entries: vec![
                (Phase::Cross, cross_solved(state, &fc)),
                (Phase::F2L, first_two_layers_solved(state, &fc)),
                (Phase::Oll, top_oriented(state, &fc)),
                (Phase::Pll, state.is_solved()),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::MoveEngine;
    use crate::scramble::Scrambler;

    fn verify_solution(state: &CubeState, result: &SolutionResult) {
        let mut check = state.clone();
        MoveEngine::apply_sequence(&mut check, &result.sequence).unwrap();
        assert!(check.is_solved(), "sequence failed to solve: {}", result.sequence);
    }

    #[test]
    fn solves_scrambled_three_by_three() {
        let mut solver = Cfop::new();
        for seed in 0..1000u64 {
            let (_, state) = Scrambler::with_seed(seed).scramble_new(3, 20).unwrap();
            let result = solver
                .solve(&state)
                .unwrap_or_else(|e| panic!("seed {}: {}", seed, e));
            verify_solution(&state, &result);
        }
    }

    /// Scenario from the double sexy-move scramble: eight moves in, the
    /// cube must read unsolved, CFOP must solve it, and the optimized
    /// solution stays within the documented 80-move bound.
    #[test]
    fn double_sexy_scramble_scenario() {
        let mut state = CubeState::new(3).unwrap();
        let scramble = MoveSequence::from_notation("R U R' U' R U R' U'").unwrap();
        MoveEngine::apply_sequence(&mut state, &scramble).unwrap();
        assert!(!state.is_solved());

        let mut solver = Cfop::new();
        let result = solver.solve(&state).unwrap();
        verify_solution(&state, &result);
        assert!(
            result.total_moves() <= 80,
            "solution used {} moves",
            result.total_moves()
        );
    }

    #[test]
    fn solved_state_yields_empty_solution() {
        let mut solver = Cfop::new();
        let state = CubeState::new(3).unwrap();
        let result = solver.solve(&state).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn rejects_unsupported_sizes() {
        let mut solver = Cfop::new();
        for size in [2, 4, 5] {
            let state = CubeState::new(size).unwrap();
            let err = solver.solve(&state).unwrap_err();
            assert!(matches!(err, CubeError::UnsupportedSize { .. }), "size {}", size);
        }
    }

    #[test]
    fn produced_sequences_are_already_optimized() {
        let mut solver = Cfop::new();
        for seed in [8u64, 21, 77] {
            let (_, state) = Scrambler::with_seed(seed).scramble_new(3, 20).unwrap();
            let result = solver.solve(&state).unwrap();
            assert_eq!(result.sequence.optimize(), result.sequence);
            assert!(result.sequence.moves().iter().all(|m| !m.is_rotation()));
        }
    }

    #[test]
    fn last_layer_steps_name_their_cases() {
        // A pure OLL position: the inverse of an OLL algorithm.
        let db = AlgorithmDb::standard();
        let sune = db.get(Category::Oll, "OLL 27").unwrap().moves.clone();
        let mut state = CubeState::new(3).unwrap();
        MoveEngine::apply_sequence(&mut state, &sune.inverse()).unwrap();

        let mut solver = Cfop::new();
        let result = solver.solve(&state).unwrap();
        verify_solution(&state, &result);
        assert!(result
            .steps
            .iter()
            .any(|s| s.phase == Phase::Oll && s.algorithm.is_some()));
    }

    #[test]
    fn analyze_tracks_cfop_phases() {
        let solver = Cfop::new();
        let solved = CubeState::new(3).unwrap();
        assert!(solver.analyze(&solved).all_complete());

        let mut broken = CubeState::new(3).unwrap();
        MoveEngine::apply_sequence(
            &mut broken,
            &MoveSequence::from_notation("R U R' U'").unwrap(),
        )
        .unwrap();
        let report = solver.analyze(&broken);
        assert_eq!(report.complete(Phase::Cross), Some(true));
        assert_eq!(report.complete(Phase::F2L), Some(false));
    }
}
