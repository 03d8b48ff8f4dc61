//! Dead-end pruning with a skeleton walker and a reverse search.

use crate::{
    cells::{CellFlags, Direction, Position},
    search::{PathMarker, Phase, Solver},
    world::Maze,
};
use log::warn;
use std::collections::VecDeque;

/// Number of row bands, one pruner each.
const BANDS: usize = 4;

/// Reverse-search frontier pops per step.
const POPS_PER_STEP: usize = 2;

/// Neighbor expansion order of the reverse search.
const EXPANSION: [Direction; 4] = [
    Direction::South,
    Direction::West,
    Direction::East,
    Direction::North,
];

/// The row band `[start, end)` covered by pruner `i`, distributing the
/// remainder rows over the leading bands one row each.
fn band_rows(height: isize, i: usize) -> (isize, isize) {
    let bands = BANDS as isize;
    let i = i as isize;
    let base = height / bands;
    let rem = height % bands;
    let start = i * base + i.min(rem);
    let end = (i + 1) * base + (i + 1).min(rem);
    (start, end)
}

/// The walkable directions out of `pos` whose targets are not pruned,
/// as a count plus one representative (the last such direction).
fn open_moves(maze: &Maze, pos: Position, skip: Option<Direction>) -> (usize, Option<Direction>) {
    let mut count = 0;
    let mut found = None;
    for &dir in &Direction::ALL {
        if Some(dir) == skip {
            continue;
        }
        if maze.can_move(pos, dir) && !maze.has(pos.step(dir), CellFlags::PRUNED) {
            count += 1;
            found = Some(dir);
        }
    }
    (count, found)
}

enum PrunerPhase {
    /// Sweeping the band one row per step, stacking dead ends.
    Scan { row: isize },
    /// Pruning one stacked cell per step.
    Prune,
}

/// A cell handed to the band above or below.
struct Handoff(Position);

struct Pruner {
    id: u8,
    row_start: isize,
    row_end: isize,
    phase: PrunerPhase,
    stack: Vec<Position>,
    /// Cells received from the neighboring bands.
    inbound: VecDeque<Position>,
}

impl Pruner {
    fn new(maze: &Maze, id: u8) -> Self {
        let (row_start, row_end) = band_rows(maze.height(), id as usize);
        let phase = if row_start < row_end {
            PrunerPhase::Scan { row: row_start }
        } else {
            PrunerPhase::Prune
        };
        Pruner {
            id,
            row_start,
            row_end,
            phase,
            stack: Vec::new(),
            inbound: VecDeque::new(),
        }
    }

    /// One pruner step. A dead-end neighbor outside this band is handed
    /// back for routing to the band that owns its row.
    fn step(&mut self, maze: &Maze) -> Option<Handoff> {
        match self.phase {
            PrunerPhase::Scan { row } => {
                for col in 0..maze.width() {
                    let pos = Position::new(row, col);
                    if pos == maze.start() || pos == maze.end() {
                        continue;
                    }
                    if open_moves(maze, pos, None).0 <= 1 {
                        self.stack.push(pos);
                    }
                }
                self.phase = if row + 1 < self.row_end {
                    PrunerPhase::Scan { row: row + 1 }
                } else {
                    PrunerPhase::Prune
                };
                None
            }
            PrunerPhase::Prune => {
                while let Some(pos) = self.inbound.pop_front() {
                    self.stack.push(pos);
                }
                let pos = self.stack.pop()?;
                if maze.has(pos, CellFlags::PRUNED) {
                    return None;
                }
                maze.mark(pos, CellFlags::PRUNED);
                maze.set_owner(pos, self.id);

                // Pruning may have turned the sole remaining neighbor
                // into a dead end as well.
                let (count, dir) = open_moves(maze, pos, None);
                if count != 1 {
                    return None;
                }
                let next = pos.step(dir?);
                if next == maze.start() || next == maze.end() {
                    return None;
                }
                if open_moves(maze, next, None).0 <= 1 {
                    if next.row >= self.row_start && next.row < self.row_end {
                        self.stack.push(next);
                    } else {
                        return Some(Handoff(next));
                    }
                }
                None
            }
        }
    }
}

/// The forward walker, coasting down the unpruned skeleton.
struct SkeletonWalker {
    pos: Position,
    came_from: Option<Direction>,
    /// Every move taken, for path replay.
    trail: Vec<Direction>,
    /// The cell where the reverse search was met, if any.
    overlap: Option<Position>,
    finished: bool,
}

impl SkeletonWalker {
    fn new(maze: &Maze) -> Self {
        let start = maze.start();
        maze.mark(start, CellFlags::VISITED_FWD);
        SkeletonWalker {
            pos: start,
            came_from: None,
            trail: Vec::new(),
            overlap: None,
            finished: false,
        }
    }

    /// Advances one cell when the pruners have collapsed the choice to a
    /// single exit; otherwise waits for more pruning.
    ///
    /// Returns true when the walker reached the end on its own.
    fn step(&mut self, maze: &Maze) -> bool {
        if self.finished {
            return false;
        }
        if maze.flags(self.pos).intersects(CellFlags::PARENT_MASK) {
            self.overlap = Some(self.pos);
            self.finished = true;
            return false;
        }
        if self.pos == maze.end() {
            self.finished = true;
            return true;
        }
        let (count, dir) = open_moves(maze, self.pos, self.came_from);
        match count {
            1 => {
                if let Some(dir) = dir {
                    self.pos = self.pos.step(dir);
                    self.trail.push(dir);
                    maze.mark(self.pos, CellFlags::VISITED_FWD);
                    self.came_from = Some(dir.opposite());
                }
            }
            0 => self.finished = true,
            _ => {}
        }
        false
    }
}

/// The backward breadth-first search over unpruned cells.
struct ReverseSearch {
    frontier: VecDeque<Position>,
    finished: bool,
}

impl ReverseSearch {
    fn new(maze: &Maze) -> Self {
        let end = maze.end();
        maze.mark(end, CellFlags::VISITED_REV);
        let mut frontier = VecDeque::new();
        frontier.push_back(end);
        ReverseSearch {
            frontier,
            finished: false,
        }
    }

    /// Processes up to two frontier pops. Returns true when the start
    /// was dequeued.
    fn step(&mut self, maze: &Maze) -> bool {
        let mut reached_start = false;
        for _ in 0..POPS_PER_STEP {
            let pos = match self.frontier.pop_front() {
                Some(pos) => pos,
                None => {
                    self.finished = true;
                    break;
                }
            };
            if maze.has(pos, CellFlags::PRUNED) {
                continue;
            }
            if pos == maze.start() {
                reached_start = true;
            }
            for &dir in &EXPANSION {
                if !maze.can_move(pos, dir) {
                    continue;
                }
                let next = pos.step(dir);
                if maze.has(next, CellFlags::PRUNED) || maze.has(next, CellFlags::VISITED_REV) {
                    continue;
                }
                maze.mark(
                    next,
                    CellFlags::VISITED_REV | CellFlags::parent(dir.opposite()),
                );
                self.frontier.push_back(next);
            }
        }
        reached_start
    }
}

enum State {
    Search,
    Mark(PathMarker),
    Done(Phase),
}

/// The pruning pipeline solver.
///
/// Four pruners flood dead-end corridors off the maze band by band
/// while a forward walker coasts down the surviving skeleton and a
/// backward breadth-first search expands from the end; whichever side
/// closes the gap first ends the round loop.
pub struct Prune<'a> {
    maze: &'a Maze,
    pruners: Vec<Pruner>,
    walker: SkeletonWalker,
    reverse: ReverseSearch,
    first_exit: bool,
    state: State,
}

impl<'a> Prune<'a> {
    /// Creates the solver over a freshly reset cell store.
    pub fn new(maze: &'a Maze) -> Self {
        Prune {
            maze,
            pruners: (0..BANDS as u8).map(|id| Pruner::new(maze, id)).collect(),
            walker: SkeletonWalker::new(maze),
            reverse: ReverseSearch::new(maze),
            first_exit: false,
            state: State::Search,
        }
    }

    fn search(&mut self) -> Phase {
        if !self.first_exit && !(self.walker.finished && self.reverse.finished) {
            for i in 0..self.pruners.len() {
                if let Some(Handoff(pos)) = self.pruners[i].step(self.maze) {
                    let target = if pos.row < self.pruners[i].row_start {
                        i - 1
                    } else {
                        i + 1
                    };
                    self.pruners[target].inbound.push_back(pos);
                }
            }
            if self.walker.step(self.maze) {
                self.first_exit = true;
            }
            if self.reverse.step(self.maze) {
                self.first_exit = true;
            }
            if !self.first_exit && self.walker.overlap.is_none() {
                return Phase::Searching;
            }
        }
        if self.first_exit || self.walker.overlap.is_some() {
            self.state = State::Mark(PathMarker::new(self.reconstruct()));
            Phase::Searching
        } else {
            self.state = State::Done(Phase::NoSolution);
            Phase::NoSolution
        }
    }

    /// Replays the walker's trail from the start, then follows the
    /// reverse search's parent hints the rest of the way to the end.
    fn reconstruct(&self) -> Vec<Position> {
        let maze = self.maze;
        let mut path = vec![maze.start()];
        let mut curr = maze.start();
        for &dir in &self.walker.trail {
            curr = curr.step(dir);
            path.push(curr);
        }
        while curr != maze.end() {
            match maze.flags(curr).parent_dir() {
                Some(dir) => {
                    curr = curr.step(dir);
                    path.push(curr);
                }
                None => {
                    warn!("no parent hint at {:?}; truncating path", curr);
                    break;
                }
            }
        }
        path
    }
}

impl Solver for Prune<'_> {
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
