//! Two teams of walkers racing from both ends.

use crate::{
    cells::{CellFlags, Direction, Position},
    search::{parent_chain, Branches, PathMarker, Phase, Solver},
    world::Maze,
};
use log::warn;

/// Walkers per team.
const TEAM_SIZE: u8 = 3;

/// Total walker count; ids 0..2 are forward, 3..5 reverse.
const WALKERS: u8 = 2 * TEAM_SIZE;

/// Which end a walker set out from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Team {
    /// Start-to-end.
    Forward,
    /// End-to-start.
    Reverse,
}

impl Team {
    fn of(id: u8) -> Self {
        if id < TEAM_SIZE {
            Team::Forward
        } else {
            Team::Reverse
        }
    }

    fn visited(self) -> CellFlags {
        match self {
            Team::Forward => CellFlags::VISITED_FWD,
            Team::Reverse => CellFlags::VISITED_REV,
        }
    }

    /// The rival team's visit bit.
    fn rival(self) -> CellFlags {
        match self {
            Team::Forward => CellFlags::VISITED_REV,
            Team::Reverse => CellFlags::VISITED_FWD,
        }
    }
}

/// A junction on a walker's private stack.
#[derive(Debug)]
struct Junction {
    at: Position,
    /// Direction that leads back toward the previous junction.
    came_from: Option<Direction>,
    branches: Branches,
}

#[derive(Debug)]
enum WalkerState {
    /// Choosing a branch at the junction on top of the stack.
    Junction,
    /// Streaming down a single-exit corridor.
    Corridor(Direction),
    /// Rewinding from an abandoned junction to its parent.
    Backtrack { to: Position },
}

/// What one walker step produced.
enum Outcome {
    Moved,
    /// Crossed into the rival team's territory (or reached the goal).
    Found,
    /// Stack exhausted; the walker retires.
    Dead,
}

struct Walker {
    id: u8,
    team: Team,
    stack: Vec<Junction>,
    state: WalkerState,
    /// The walker's current cell.
    pos: Position,
    finished: bool,
}

impl Walker {
    fn new(maze: &Maze, id: u8) -> Self {
        let team = Team::of(id);
        let spawn = match team {
            Team::Forward => maze.start(),
            Team::Reverse => maze.end(),
        };
        Walker {
            id,
            team,
            stack: vec![Junction {
                at: spawn,
                came_from: None,
                branches: Branches::new(maze, spawn, id),
            }],
            state: WalkerState::Junction,
            pos: spawn,
            finished: false,
        }
    }

    /// Whether the cell at `pos` ends the race for this walker.
    ///
    /// Checked before staking any claim, so the rival's ownership trail
    /// at the collision cell survives for reconstruction.
    fn collides(&self, maze: &Maze, pos: Position) -> bool {
        (self.team == Team::Forward && pos == maze.end()) || maze.has(pos, self.team.rival())
    }

    fn step(&mut self, maze: &Maze) -> Outcome {
        match self.state {
            WalkerState::Junction => self.step_junction(maze),
            WalkerState::Corridor(dir) => self.step_corridor(maze, dir),
            WalkerState::Backtrack { to } => self.step_backtrack(maze, to),
        }
    }

    fn step_junction(&mut self, maze: &Maze) -> Outcome {
        let at = match self.stack.last() {
            Some(junction) => junction.at,
            None => return Outcome::Dead,
        };
        if self.collides(maze, at) {
            self.pos = at;
            return Outcome::Found;
        }
        maze.mark(at, self.team.visited());
        maze.set_owner(at, self.id);

        let choice = match self.stack.last_mut() {
            Some(junction) => junction.branches.next_mt(maze, at),
            None => None,
        };
        match choice {
            Some(dir) => {
                self.pos = at;
                self.state = WalkerState::Corridor(dir);
            }
            None => {
                let junction = match self.stack.pop() {
                    Some(junction) => junction,
                    None => return Outcome::Dead,
                };
                if maze.is_junction(junction.at) {
                    maze.mark(junction.at, CellFlags::DEAD_JUNCTION);
                } else {
                    maze.clear(junction.at, CellFlags::TEAM_MASK | CellFlags::VISITED);
                }
                match self.stack.last_mut() {
                    Some(parent) => {
                        // Retire the branch we originally came through.
                        let parent_at = parent.at;
                        parent.branches.pop_current(maze, parent_at);
                        self.pos = junction.at;
                        self.state = WalkerState::Backtrack { to: parent_at };
                    }
                    None => return Outcome::Dead,
                }
            }
        }
        Outcome::Moved
    }

    fn step_corridor(&mut self, maze: &Maze, dir: Direction) -> Outcome {
        let next = self.pos.step(dir);
        let back = dir.opposite();
        if self.collides(maze, next) {
            // Leave the rival's team bit and ownership untouched; the
            // dummy junction records where we broke through.
            self.stack.push(Junction {
                at: next,
                came_from: Some(back),
                branches: Branches::new(maze, next, self.id),
            });
            self.pos = next;
            return Outcome::Found;
        }
        maze.mark(next, self.team.visited() | CellFlags::parent(back));
        maze.set_owner(next, self.id);
        self.pos = next;

        let mut branches = Branches::new(maze, next, self.id);
        branches.remove(back);
        if branches.len() == 1 {
            if let Some(ahead) = branches.next() {
                self.state = WalkerState::Corridor(ahead);
            }
        } else {
            self.stack.push(Junction {
                at: next,
                came_from: Some(back),
                branches,
            });
            self.state = WalkerState::Junction;
        }
        Outcome::Moved
    }

    fn step_backtrack(&mut self, maze: &Maze, to: Position) -> Outcome {
        if !maze.is_junction(self.pos) {
            maze.clear(self.pos, CellFlags::TEAM_MASK);
        }
        if self.pos == to {
            self.state = WalkerState::Junction;
            return Outcome::Moved;
        }
        match maze.flags(self.pos).parent_dir() {
            Some(dir) => self.pos = self.pos.step(dir),
            None => self.state = WalkerState::Junction,
        }
        Outcome::Moved
    }
}

enum State {
    Search,
    Mark(PathMarker),
    Done(Phase),
}

/// The bidirectional multi-walker solver.
///
/// Three walkers set out from each end. Every round steps the live
/// walkers in id order until one crosses a cell claimed by the rival
/// team; the path is then spliced together from a parent-pointer
/// backtrack on the forward side and a stack-guided corridor walk on
/// the reverse side.
pub struct Race<'a> {
    maze: &'a Maze,
    walkers: Vec<Walker>,
    state: State,
}

impl<'a> Race<'a> {
    /// Creates the solver over a freshly reset cell store.
    pub fn new(maze: &'a Maze) -> Self {
        let walkers = (0..WALKERS).map(|id| Walker::new(maze, id)).collect();
        Race {
            maze,
            walkers,
            state: State::Search,
        }
    }

    fn search(&mut self) -> Phase {
        let mut reporter = None;
        for i in 0..self.walkers.len() {
            if self.walkers[i].finished {
                continue;
            }
            match self.walkers[i].step(self.maze) {
                Outcome::Moved => {}
                Outcome::Dead => self.walkers[i].finished = true,
                Outcome::Found => {
                    reporter = Some(i);
                    break;
                }
            }
        }
        if let Some(i) = reporter {
            let path = self.reconstruct(i);
            self.state = State::Mark(PathMarker::new(path));
            return Phase::Searching;
        }
        if self.walkers.iter().all(|w| w.finished) {
            self.state = State::Done(Phase::NoSolution);
            return Phase::NoSolution;
        }
        Phase::Searching
    }

    /// The first open neighbor of `pos` carrying `flags`, if any.
    fn neighbor_with(&self, pos: Position, flags: CellFlags) -> Option<Position> {
        Direction::ALL
            .iter()
            .filter(|&&dir| self.maze.can_move(pos, dir))
            .map(|&dir| pos.step(dir))
            .find(|&next| self.maze.has(next, flags))
    }

    /// Splices the full start-to-end path around the collision cell.
    fn reconstruct(&self, reporter: usize) -> Vec<Position> {
        let collision = self.walkers[reporter].pos;
        let mut path = Vec::new();

        // Forward half: strict parent-pointer backtrack to the start.
        let fwd_anchor = if self.maze.has(collision, CellFlags::VISITED_FWD) {
            Some(collision)
        } else {
            self.neighbor_with(collision, CellFlags::VISITED_FWD)
        };
        if let Some(anchor) = fwd_anchor {
            let mut half = parent_chain(self.maze, anchor);
            half.reverse();
            path.extend(half);
        }

        // Reverse half: segment walk guided by a reverse walker's stack.
        // A reporting reverse walker carries the collision on top of its
        // own stack; otherwise the cell ownership names a reverse walker
        // whose stack covers the collision's surroundings.
        let rev_anchor = if self.maze.has(collision, CellFlags::VISITED_REV) {
            Some(collision)
        } else {
            self.neighbor_with(collision, CellFlags::VISITED_REV)
        };
        let rev_walker = if self.walkers[reporter].team == Team::Reverse {
            Some(&self.walkers[reporter])
        } else if let Some(anchor) = rev_anchor {
            match self.maze.owner(anchor) {
                Some(id) if id >= TEAM_SIZE => Some(&self.walkers[id as usize]),
                owner => {
                    warn!("no reverse walker owns {:?} ({:?})", anchor, owner);
                    None
                }
            }
        } else {
            None
        };
        if let Some(walker) = rev_walker {
            self.walk_reverse_half(walker, collision, &mut path);
        }

        path.push(self.maze.end());
        path
    }

    /// Walks the reverse walker's stack from the collision back to its
    /// spawn, crossing each corridor segment cell by cell.
    fn walk_reverse_half(&self, walker: &Walker, collision: Position, path: &mut Vec<Position>) {
        let stack = &walker.stack;
        if stack.is_empty() {
            return;
        }
        let k = stack
            .iter()
            .rposition(|junction| junction.at == collision)
            .unwrap_or(stack.len() - 1);
        for i in (1..=k).rev() {
            path.push(stack[i].at);
            let out = match stack[i].came_from {
                Some(dir) => dir,
                None => {
                    warn!("junction {:?} has no way back; truncating path", stack[i].at);
                    return;
                }
            };
            if !self.walk_segment(walker, stack[i].at, out, stack[i - 1].at, path) {
                return;
            }
        }
    }

    /// Crosses one corridor from `from` (exiting via `out`) to `goal`,
    /// appending every intermediate cell. Returns false on failure.
    fn walk_segment(
        &self,
        walker: &Walker,
        from: Position,
        out: Direction,
        goal: Position,
        path: &mut Vec<Position>,
    ) -> bool {
        let maze = self.maze;
        let mut curr = from.step(out);
        let mut last = out;
        let mut fuel = (maze.width() * maze.height()) as usize;
        while curr != goal {
            path.push(curr);
            let step_in = Direction::ALL
                .iter()
                .copied()
                .find(|&dir| maze.can_move(curr, dir) && curr.step(dir) == goal);
            if let Some(dir) = step_in {
                curr = curr.step(dir);
                break;
            }
            let forward = |owned: bool| {
                Direction::ALL.iter().copied().find(|&dir| {
                    if dir == last.opposite() || !maze.can_move(curr, dir) {
                        return false;
                    }
                    let next = curr.step(dir);
                    maze.has(next, CellFlags::VISITED_REV)
                        && (!owned || maze.owner(next) == Some(walker.id))
                })
            };
            // Ownership can lag behind reality where walkers shared a
            // corridor, so fall back to any reverse-visited neighbor.
            let dir = match forward(true).or_else(|| forward(false)) {
                Some(dir) => dir,
                None => {
                    warn!("corridor walk stuck at {:?}; truncating path", curr);
                    return false;
                }
            };
            curr = curr.step(dir);
            last = dir;
            fuel -= 1;
            if fuel == 0 {
                warn!("corridor walk did not converge toward {:?}", goal);
                return false;
            }
        }
        true
    }
}

impl Solver for Race<'_> {
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
