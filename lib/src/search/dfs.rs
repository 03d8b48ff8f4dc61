//! Depth-first search.

use crate::{
    cells::{CellFlags, Direction, Position},
    search::{parent_chain, PathMarker, Phase, Solver},
    world::Maze,
};

/// Neighbor probe order.
const PROBES: [Direction; 4] = [
    Direction::South,
    Direction::East,
    Direction::West,
    Direction::North,
];

enum State {
    Search,
    Mark(PathMarker),
    Done(Phase),
}

/// A depth-first solver.
///
/// Cells keep `VISITED` and `ON_STACK` only while the walker's trail
/// runs through them; popping erases the grey trail again and stamps
/// exhausted junctions with `DEAD_JUNCTION`. The visit-order array is
/// the durable visited sentinel, so erased cells are not re-entered.
pub struct Dfs<'a> {
    maze: &'a Maze,
    stack: Vec<(Position, Option<Direction>)>,
    visit_counter: i32,
    state: State,
}

impl<'a> Dfs<'a> {
    /// Creates the solver over a freshly reset cell store.
    pub fn new(maze: &'a Maze) -> Self {
        let start = maze.start();
        maze.mark(start, CellFlags::VISITED | CellFlags::ON_STACK);
        maze.set_visit_order(start, 1);
        Dfs {
            maze,
            stack: vec![(start, None)],
            visit_counter: 1,
            state: State::Search,
        }
    }

    fn search(&mut self) -> Phase {
        let (pos, came_by) = match self.stack.last() {
            Some(&top) => top,
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
        for &dir in &PROBES {
            if Some(dir.opposite()) == came_by {
                continue;
            }
            if !self.maze.can_move(pos, dir) {
                continue;
            }
            let next = pos.step(dir);
            if self.maze.visit_order(next) >= 0 {
                continue;
            }
            self.maze.mark(
                next,
                CellFlags::VISITED | CellFlags::ON_STACK | CellFlags::parent(dir.opposite()),
            );
            self.visit_counter += 1;
            self.maze.set_visit_order(next, self.visit_counter);
            self.stack.push((next, Some(dir)));
            return Phase::Searching;
        }
        // Exhausted: pop and erase the grey trail.
        self.stack.pop();
        self.maze
            .clear(pos, CellFlags::ON_STACK | CellFlags::VISITED);
        if self.maze.is_junction(pos) {
            self.maze.mark(pos, CellFlags::DEAD_JUNCTION);
        }
        Phase::Searching
    }
}

impl Solver for Dfs<'_> {
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
