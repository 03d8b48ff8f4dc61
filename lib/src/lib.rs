//! __rmaze__ is a suite of animated maze solvers sharing one bit-packed
//! cell store.
//!
//! A maze is a rectangular 4-connected grid with a fixed entry on the top
//! row and a fixed exit on the bottom row, loaded from a compact binary
//! format. A solver explores the grid one step at a time; each step
//! mutates the shared cell store and returns a [`Phase`] token, so a
//! renderer can observe mid-search state between steps.
//!
//! Four algorithms are provided: breadth-first and depth-first baselines,
//! a bidirectional race between two teams of cooperative walkers, and a
//! dead-end pruning pipeline. All of them run on a single thread; the
//! multi-walker solvers are round-robin schedulers over logical workers.
//!
//! This is the library crate. There is also a
//! [command-line tool with a TUI](../rmaze_tui/index.html) that animates
//! the search in a terminal.
//!
//! # Example
//!
//! ```rust
//! use rmaze_lib::{Maze, Phase, Solver, SolverKind};
//!
//! // A 4x4 maze with no internal walls.
//! let maze = Maze::new(4, 4).unwrap();
//!
//! // Drives the breadth-first solver to completion.
//! let mut solver = SolverKind::Bfs.solver(&maze);
//! assert_eq!(solver.run(None), Phase::Finished);
//! println!("{}", maze.plaintext());
//! ```

mod cells;
mod error;
mod parse;
pub mod search;
mod world;

pub use cells::{CellFlags, Direction, Position};
pub use error::Error;
pub use search::{steps, Phase, Solver, SolverKind};
pub use world::Maze;
