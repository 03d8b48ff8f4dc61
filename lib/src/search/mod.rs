//! The solving algorithms.

use crate::{
    cells::{CellFlags, Position},
    error::Error,
    world::Maze,
};
use std::{fmt, str::FromStr};

mod bfs;
mod branches;
mod dfs;
mod prune;
mod race;

pub use bfs::Bfs;
pub use branches::Branches;
pub use dfs::Dfs;
pub use prune::Prune;
pub use race::Race;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// What one solver step did.
///
/// A solver emits a finite sequence of these, terminated by exactly one
/// of [`Finished`](Phase::Finished) or [`NoSolution`](Phase::NoSolution).
/// Between steps the cell store reflects the solver's current view and
/// may be read by a renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Phase {
    /// Exploration advanced; cell state may change on the next call.
    Searching,
    /// Path marking: the just-updated cell now carries `ON_PATH`.
    Backtracking,
    /// Terminal. No more cells will be mutated; the end is on the path.
    Finished,
    /// Terminal. No path exists; the store holds partial exploration.
    NoSolution,
}

impl Phase {
    /// Whether this token ends the step sequence.
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Finished | Phase::NoSolution)
    }
}

/// A maze solver driven one step at a time.
pub trait Solver {
    /// Advances the solver by one step and reports what it did.
    ///
    /// Once a terminal phase has been returned, further calls return the
    /// same phase and leave the cell store untouched.
    fn step(&mut self) -> Phase;

    /// Steps until a terminal phase, or until `max_steps` is exceeded.
    ///
    /// Returns the terminal phase, or [`Phase::Searching`] /
    /// [`Phase::Backtracking`] if `max_steps` ran out first.
    fn run(&mut self, max_steps: Option<u64>) -> Phase {
        let mut step_count = 0;
        loop {
            let phase = self.step();
            if phase.is_terminal() {
                return phase;
            }
            step_count += 1;
            if let Some(max) = max_steps {
                if step_count >= max {
                    return phase;
                }
            }
        }
    }
}

/// The lazy token sequence of a solver, ending at the terminal phase.
pub struct Steps<'s, S: Solver + ?Sized> {
    solver: &'s mut S,
    done: bool,
}

impl<S: Solver + ?Sized> Iterator for Steps<'_, S> {
    type Item = Phase;

    fn next(&mut self) -> Option<Phase> {
        if self.done {
            return None;
        }
        let phase = self.solver.step();
        self.done = phase.is_terminal();
        Some(phase)
    }
}

/// Adapts a solver into an iterator over its phase tokens.
pub fn steps<S: Solver + ?Sized>(solver: &mut S) -> Steps<'_, S> {
    Steps {
        solver,
        done: false,
    }
}

/// Which solving algorithm to run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SolverKind {
    /// Breadth-first search from the start.
    Bfs,
    /// Depth-first search with grey-trail erasure.
    Dfs,
    /// Two teams of walkers racing from both ends until they meet.
    Race,
    /// Dead-end pruning with a skeleton walker and a reverse search.
    Prune,
}

impl Default for SolverKind {
    fn default() -> Self {
        SolverKind::Bfs
    }
}

impl SolverKind {
    /// Constructs the chosen solver over a freshly reset cell store.
    pub fn solver<'a>(self, maze: &'a Maze) -> Box<dyn Solver + 'a> {
        match self {
            SolverKind::Bfs => Box::new(Bfs::new(maze)),
            SolverKind::Dfs => Box::new(Dfs::new(maze)),
            SolverKind::Race => Box::new(Race::new(maze)),
            SolverKind::Prune => Box::new(Prune::new(maze)),
        }
    }
}

impl fmt::Display for SolverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SolverKind::Bfs => "bfs",
            SolverKind::Dfs => "dfs",
            SolverKind::Race => "race",
            SolverKind::Prune => "prune",
        };
        f.write_str(name)
    }
}

impl FromStr for SolverKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "bfs" => Ok(SolverKind::Bfs),
            "dfs" => Ok(SolverKind::Dfs),
            "race" => Ok(SolverKind::Race),
            "prune" => Ok(SolverKind::Prune),
            _ => Err(Error::UnknownSolver(s.to_string())),
        }
    }
}

/// The path-marking tail shared by every reconstruction: a precomputed
/// cell list marked `ON_PATH` one cell per step.
pub(crate) struct PathMarker {
    cells: Vec<Position>,
    next: usize,
}

impl PathMarker {
    pub(crate) fn new(cells: Vec<Position>) -> Self {
        PathMarker { cells, next: 0 }
    }

    /// Marks the next cell, or reports [`Phase::Finished`] once done.
    pub(crate) fn step(&mut self, maze: &Maze) -> Phase {
        match self.cells.get(self.next) {
            Some(&pos) => {
                maze.mark(pos, CellFlags::ON_PATH);
                self.next += 1;
                Phase::Backtracking
            }
            None => Phase::Finished,
        }
    }
}

/// Collects `from` and every ancestor along the parent pointers, ending
/// at the cell that has none (the search origin).
pub(crate) fn parent_chain(maze: &Maze, from: Position) -> Vec<Position> {
    let mut chain = vec![from];
    let mut curr = from;
    while let Some(dir) = maze.flags(curr).parent_dir() {
        curr = curr.step(dir);
        chain.push(curr);
    }
    chain
}
