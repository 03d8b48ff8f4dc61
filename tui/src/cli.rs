//! Batch mode: solve to completion and print the result.

use crate::{args::Args, tui::tui};
use rmaze_lib::{Phase, Solver};

pub(crate) fn run(args: Args) {
    let Args {
        maze,
        solver,
        delay_ms,
        no_tui,
    } = args;
    if no_tui {
        let mut search = solver.solver(&maze);
        match search.run(None) {
            Phase::Finished => print!("{}", maze.plaintext()),
            Phase::NoSolution => println!("No solution."),
            _ => (),
        }
    } else if let Err(e) = tui(&maze, solver, delay_ms) {
        eprintln!("TUI error: {}", e);
    }
}
