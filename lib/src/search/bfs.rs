//! Breadth-first search.

use crate::{
    cells::{CellFlags, Direction, Position},
    search::{parent_chain, PathMarker, Phase, Solver},
    world::Maze,
};
use std::collections::VecDeque;

/// Neighbor expansion order.
const EXPANSION: [Direction; 4] = [
    Direction::South,
    Direction::West,
    Direction::East,
    Direction::North,
];

enum State {
    Search,
    Mark(PathMarker),
    Done(Phase),
}

/// A breadth-first solver: FIFO frontier, parent-pointer reconstruction.
///
/// The only solver here that finds shortest paths.
pub struct Bfs<'a> {
    maze: &'a Maze,
    frontier: VecDeque<Position>,
    visit_counter: i32,
    state: State,
}

impl<'a> Bfs<'a> {
    /// Creates the solver over a freshly reset cell store.
    pub fn new(maze: &'a Maze) -> Self {
        let start = maze.start();
        maze.mark(start, CellFlags::VISITED);
        maze.set_visit_order(start, 1);
        let mut frontier = VecDeque::new();
        frontier.push_back(start);
        Bfs {
            maze,
            frontier,
            visit_counter: 1,
            state: State::Search,
        }
    }

    fn search(&mut self) -> Phase {
        let pos = match self.frontier.pop_front() {
            Some(pos) => pos,
            None => {
                self.state = State::Done(Phase::NoSolution);
                return Phase::NoSolution;
            }
        };
        if pos == self.maze.end() {
            let mut path = parent_chain(self.maze, pos);
            path.reverse();
            self.state = State::Mark(PathMarker::new(path));
            return Phase::Searching;
        }
        for &dir in &EXPANSION {
            if !self.maze.can_move(pos, dir) {
                continue;
            }
            let next = pos.step(dir);
            if self.maze.visit_order(next) >= 0 {
                continue;
            }
            self.maze
                .mark(next, CellFlags::VISITED | CellFlags::parent(dir.opposite()));
            self.visit_counter += 1;
            self.maze.set_visit_order(next, self.visit_counter);
            self.frontier.push_back(next);
        }
        Phase::Searching
    }
}

impl Solver for Bfs<'_> {
    fn step(&mut self) -> Phase {
        match &mut self.state {
            State::Search => self.search(),
            State::Mark(marker) => {
                let phase = marker.step(self.maze);
                if phase.is_terminal() {
                    self.state = State::Done(phase);
                }
                phase
            }
            State::Done(phase) => *phase,
        }
    }
}
