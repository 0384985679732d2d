//! Basic example of using the cube engine

use cube_core::{Cfop, Cube, LayerByLayer, MoveSequence, SolverStrategy};

fn main() {
    // Scramble a 3x3 reproducibly
    println!("Scrambling a 3x3 cube...\n");
    let mut cube = Cube::new(3).expect("3 is a supported size");
    cube.scramble_seeded(25, 42).expect("scramble succeeds");

    println!("Scramble: {}", cube.last_scramble().expect("just scrambled"));
    println!("State: {}", cube.to_state_string());
    println!("Solved: {}\n", cube.is_solved());

    // Solve with both strategies
    for strategy in &mut [
        Box::new(LayerByLayer::new()) as Box<dyn SolverStrategy>,
        Box::new(Cfop::new()) as Box<dyn SolverStrategy>,
    ] {
        match strategy.solve(cube.state()) {
            Ok(result) => {
                println!(
                    "{} solves it in {} moves",
                    result.strategy,
                    result.total_moves()
                );
                for (phase, moves) in result.phase_breakdown() {
                    println!("  {}: {} moves", phase, moves);
                }
            }
            Err(e) => println!("{} failed: {}", strategy.name(), e),
        }
    }

    // Apply a hand-written algorithm and undo it
    println!("\n--- Notation round trip ---\n");
    let sexy = MoveSequence::from_notation("R U R' U'").expect("valid notation");
    cube.reset().expect("reset succeeds");
    cube.apply_sequence(&sexy).expect("legal moves");
    println!("After {}: solved = {}", sexy, cube.is_solved());
    while cube.undo().is_some() {}
    println!("After undoing everything: solved = {}", cube.is_solved());
}
