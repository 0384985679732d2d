//! The beginner layer-by-layer method.

use crate::algorithms::{AlgorithmDb, Category};
use crate::error::{CubeError, Result};
use crate::moves::MoveSequence;
use crate::state::CubeState;

use super::phases::{
    self, bottom_corners_solved, cross_solved, first_layer_solved, middle_edges_solved,
    top_corners_oriented, top_corners_solved, top_edges_oriented, FaceColors, Work,
};
use super::{Phase, PhaseReport, SolutionResult, SolutionStep, SolverStrategy};

/// Layer-by-layer solver for 2x2 and 3x3 cubes. Seven sequential sub-solves
/// on 3x3; the edge phases fall away on 2x2.
pub struct LayerByLayer {
    swap_alg: MoveSequence,
    edge_algs: Vec<(&'static str, MoveSequence)>,
}

impl Default for LayerByLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerByLayer {
    pub fn new() -> LayerByLayer {
        let db = AlgorithmDb::standard();
        let alg = |name: &str| {
            db.get(Category::Pll, name)
                .map(|a| a.moves.clone())
                .expect("standard database carries the named permutation")
        };
        LayerByLayer {
            swap_alg: alg("T"),
            edge_algs: vec![
                ("Ua", alg("Ua")),
                ("Ub", alg("Ub")),
                ("H", alg("H")),
                ("Z", alg("Z")),
            ],
        }
    }

    fn push_step(
        steps: &mut Vec<SolutionStep>,
        work: &mut Work,
        phase: Phase,
        algorithm: Option<String>,
        explanation: &str,
    ) {
        let moves = work.take_step_moves();
        if !moves.is_empty() {
            steps.push(SolutionStep {
                phase,
                algorithm,
                moves,
                explanation: explanation.to_string(),
            });
        }
    }
}

impl SolverStrategy for LayerByLayer {
    fn name(&self) -> &'static str {
        "Layer by Layer"
    }

    fn supports_size(&self, size: usize) -> bool {
        size == 2 || size == 3
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

        if n == 3 && !cross_solved(&work.state, &fc) {
            phases::solve_cross(&mut work, &fc)?;
            Self::push_step(
                &mut steps,
                &mut work,
                Phase::Cross,
                None,
                "Place the four bottom edges around the bottom face, matching each side center",
            );
        }
        if !bottom_corners_solved(&work.state, &fc) {
            phases::solve_first_layer_corners(&mut work, &fc)?;
            Self::push_step(
                &mut steps,
                &mut work,
                Phase::FirstLayerCorners,
                Some("R U R' U'".to_string()),
                "Drop each bottom corner into its slot by repeating the slot trigger",
            );
        }
        if n == 3 && !middle_edges_solved(&work.state, &fc) {
            phases::solve_middle_edges(&mut work, &fc)?;
            Self::push_step(
                &mut steps,
                &mut work,
                Phase::MiddleEdges,
                None,
                "Insert the four middle-layer edges with the right and left insert sequences",
            );
        }
        if n == 3 && !top_edges_oriented(&work.state, &fc) {
            phases::solve_top_cross(&mut work, &fc)?;
            Self::push_step(
                &mut steps,
                &mut work,
                Phase::LastLayerCross,
                Some("F R U R' U' F'".to_string()),
                "Flip top edges until the top cross appears",
            );
        }
        if !top_corners_oriented(&work.state, &fc) {
            phases::orient_top_corners(&mut work, &fc)?;
            Self::push_step(
                &mut steps,
                &mut work,
                Phase::LastLayerCorners,
                Some("R' D' R D".to_string()),
                "Twist each top corner in place until the whole top face matches",
            );
        }
        if !top_corners_solved(&work.state, &fc) {
            phases::permute_top_corners(&mut work, &fc, &self.swap_alg)?;
            Self::push_step(
                &mut steps,
                &mut work,
                Phase::CornerPermutation,
                Some("T".to_string()),
                "Swap top corners pairwise until each sits between its own centers",
            );
        }
        if n == 3 && !work.state.is_solved() {
            let used = phases::permute_top_edges(&mut work, &fc, &self.edge_algs)?;
            Self::push_step(
                &mut steps,
                &mut work,
                Phase::EdgePermutation,
                Some(used.join(", ")),
                "Cycle the remaining top edges into place",
            );
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
        let n = state.size();
        if !self.supports_size(n) {
            return PhaseReport { entries: Vec::new() };
        }
        let fc = match FaceColors::resolve(state) {
            Ok(fc) => fc,
            Err(_) => return PhaseReport { entries: Vec::new() },
        };
        let mut entries = Vec::new();
        if n == 3 {
            entries.push((Phase::Cross, cross_solved(state, &fc)));
        }
        entries.push((Phase::FirstLayerCorners, first_layer_solved(state, &fc)));
        if n == 3 {
            entries.push((Phase::MiddleEdges, middle_edges_solved(state, &fc)));
            entries.push((Phase::LastLayerCross, top_edges_oriented(state, &fc)));
        }
        entries.push((Phase::LastLayerCorners, top_corners_oriented(state, &fc)));
        entries.push((Phase::CornerPermutation, top_corners_solved(state, &fc)));
        if n == 3 {
            entries.push((Phase::EdgePermutation, state.is_solved()));
        }
        PhaseReport { entries }
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
        let mut solver = LayerByLayer::new();
        for seed in 0..1000u64 {
            let (_, state) = Scrambler::with_seed(seed).scramble_new(3, 20).unwrap();
            let result = solver
                .solve(&state)
                .unwrap_or_else(|e| panic!("seed {}: {}", seed, e));
            verify_solution(&state, &result);
        }
    }

    #[test]
    fn solves_scrambled_two_by_two() {
        let mut solver = LayerByLayer::new();
        for seed in 0..300u64 {
            let (_, state) = Scrambler::with_seed(seed).scramble_new(2, 15).unwrap();
            let result = solver
                .solve(&state)
                .unwrap_or_else(|e| panic!("seed {}: {}", seed, e));
            verify_solution(&state, &result);
        }
    }

    #[test]
    fn produced_sequences_are_already_optimized() {
        let mut solver = LayerByLayer::new();
        for seed in [3u64, 17, 99] {
            let (_, state) = Scrambler::with_seed(seed).scramble_new(3, 20).unwrap();
            let result = solver.solve(&state).unwrap();
            assert_eq!(result.sequence.optimize(), result.sequence);
            assert!(result.sequence.moves().iter().all(|m| !m.is_rotation()));
        }
    }

    #[test]
    fn solved_state_yields_empty_solution() {
        let mut solver = LayerByLayer::new();
        let state = CubeState::new(3).unwrap();
        let result = solver.solve(&state).unwrap();
        assert!(result.is_empty());
        assert!(result.steps.is_empty());
    }

    #[test]
    fn rejects_unsupported_sizes() {
        let mut solver = LayerByLayer::new();
        let state = CubeState::new(4).unwrap();
        let err = solver.solve(&state).unwrap_err();
        assert!(matches!(err, CubeError::UnsupportedSize { .. }));
    }

    #[test]
    fn analyze_reports_phase_progress() {
        let solver = LayerByLayer::new();
        let solved = CubeState::new(3).unwrap();
        assert!(solver.analyze(&solved).all_complete());

        let mut broken = CubeState::new(3).unwrap();
        MoveEngine::apply_sequence(
            &mut broken,
            &MoveSequence::from_notation("F2 R2 D L").unwrap(),
        )
        .unwrap();
        let report = solver.analyze(&broken);
        assert_eq!(report.complete(Phase::Cross), Some(false));
        assert!(!report.all_complete());
    }

    #[test]
    fn solution_steps_follow_phase_order() {
        let mut solver = LayerByLayer::new();
        let (_, state) = Scrambler::with_seed(123).scramble_new(3, 20).unwrap();
        let result = solver.solve(&state).unwrap();
        let order = [
            Phase::Cross,
            Phase::FirstLayerCorners,
            Phase::MiddleEdges,
            Phase::LastLayerCross,
            Phase::LastLayerCorners,
            Phase::CornerPermutation,
            Phase::EdgePermutation,
        ];
        let mut last = 0;
        for step in &result.steps {
            let idx = order.iter().position(|p| *p == step.phase).unwrap();
            assert!(idx >= last, "phase {} out of order", step.phase);
            last = idx;
        }
        assert!(!result.explain().is_empty());
    }
}
