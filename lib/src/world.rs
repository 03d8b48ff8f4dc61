//! The maze.

use crate::{
    cells::{CellFlags, Direction, Position},
    error::Error,
};
use std::{cell::Cell, fmt::Write};

/// The cell store: a rectangular 4-connected grid maze.
///
/// All dynamic search state lives in one packed flag word per cell, in a
/// dense row-major array, with a parallel visit-order array and a dense
/// cell-to-owner map beside it. State words sit in [`Cell`]s so that a
/// solver holding a shared reference can mutate them between steps while
/// a renderer reads the same store.
pub struct Maze {
    width: isize,
    height: isize,

    /// The state word of every cell, row-major.
    ///
    /// This vector is allocated once per maze and never resized.
    cells: Vec<Cell<CellFlags>>,

    /// Discovery index per cell; −1 means not yet visited.
    orders: Vec<Cell<i32>>,

    /// The walker that last claimed each cell, if any.
    owners: Vec<Cell<Option<u8>>>,
}

impl Maze {
    /// Creates a maze with the given dimensions and no internal walls.
    pub fn new(width: isize, height: isize) -> Result<Self, Error> {
        if width <= 0 || height <= 0 {
            return Err(Error::NonPositiveSize(width, height));
        }
        let size = (width * height) as usize;
        Ok(Maze {
            width,
            height,
            cells: vec![Cell::new(CellFlags::empty()); size],
            orders: vec![Cell::new(-1); size],
            owners: vec![Cell::new(None); size],
        })
    }

    pub fn width(&self) -> isize {
        self.width
    }

    pub fn height(&self) -> isize {
        self.height
    }

    /// The fixed entry cell, on the top row.
    pub fn start(&self) -> Position {
        Position::new(0, self.width / 2)
    }

    /// The fixed exit cell, on the bottom row.
    pub fn end(&self) -> Position {
        Position::new(self.height - 1, self.width / 2)
    }

    fn index(&self, pos: Position) -> Option<usize> {
        if pos.row >= 0 && pos.row < self.height && pos.col >= 0 && pos.col < self.width {
            Some((pos.row * self.width + pos.col) as usize)
        } else {
            None
        }
    }

    /// Iterates over every cell position in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.height).flat_map(move |row| (0..self.width).map(move |col| Position::new(row, col)))
    }

    /// The state word at `pos`. Out-of-bounds positions read as empty,
    /// which is what rejects edge moves in [`can_move`](Self::can_move).
    pub fn flags(&self, pos: Position) -> CellFlags {
        match self.index(pos) {
            Some(i) => self.cells[i].get(),
            None => CellFlags::empty(),
        }
    }

    /// Whether the cell at `pos` has all of `flags` set.
    pub fn has(&self, pos: Position, flags: CellFlags) -> bool {
        self.flags(pos).contains(flags)
    }

    /// ORs `flags` into the state word at `pos`. Idempotent.
    pub fn mark(&self, pos: Position, flags: CellFlags) {
        if let Some(i) = self.index(pos) {
            let cell = &self.cells[i];
            cell.set(cell.get() | flags);
        }
    }

    /// Clears `flags` from the state word at `pos`. Idempotent.
    pub fn clear(&self, pos: Position, flags: CellFlags) {
        if let Some(i) = self.index(pos) {
            let cell = &self.cells[i];
            cell.set(cell.get() - flags);
        }
    }

    /// Records a wall on the edge between `pos` and its neighbor.
    ///
    /// Walls are stored on the east and south edges only, so westward and
    /// northward walls land on the neighbor's word.
    pub fn set_wall(&self, pos: Position, dir: Direction) {
        match dir {
            Direction::East => self.mark(pos, CellFlags::EAST_WALL),
            Direction::South => self.mark(pos, CellFlags::SOUTH_WALL),
            Direction::West => self.mark(pos.step(Direction::West), CellFlags::EAST_WALL),
            Direction::North => self.mark(pos.step(Direction::North), CellFlags::SOUTH_WALL),
        }
    }

    /// Whether a walker at `pos` may move one cell in `dir`.
    ///
    /// True iff both cells are in bounds and no wall separates them.
    /// Symmetric: `can_move(p, d) == can_move(p.step(d), d.opposite())`.
    pub fn can_move(&self, pos: Position, dir: Direction) -> bool {
        if self.index(pos).is_none() {
            return false;
        }
        let next = pos.step(dir);
        if self.index(next).is_none() {
            return false;
        }
        match dir {
            Direction::East => !self.has(pos, CellFlags::EAST_WALL),
            Direction::South => !self.has(pos, CellFlags::SOUTH_WALL),
            Direction::West => !self.has(next, CellFlags::EAST_WALL),
            Direction::North => !self.has(next, CellFlags::SOUTH_WALL),
        }
    }

    /// The number of open edges at `pos`.
    pub fn exits(&self, pos: Position) -> usize {
        Direction::ALL
            .iter()
            .filter(|&&d| self.can_move(pos, d))
            .count()
    }

    /// Whether `pos` is a true junction, i.e. has more than two exits.
    pub fn is_junction(&self, pos: Position) -> bool {
        self.exits(pos) > 2
    }

    /// The discovery index of `pos`, or −1 if not yet visited.
    pub fn visit_order(&self, pos: Position) -> i32 {
        match self.index(pos) {
            Some(i) => self.orders[i].get(),
            None => -1,
        }
    }

    pub fn set_visit_order(&self, pos: Position, order: i32) {
        if let Some(i) = self.index(pos) {
            self.orders[i].set(order);
        }
    }

    /// The walker that last claimed `pos`, if any.
    pub fn owner(&self, pos: Position) -> Option<u8> {
        self.index(pos).and_then(|i| self.owners[i].get())
    }

    pub fn set_owner(&self, pos: Position, owner: u8) {
        if let Some(i) = self.index(pos) {
            self.owners[i].set(Some(owner));
        }
    }

    /// Clears all search state in place, keeping only the wall bits.
    ///
    /// Afterwards the visit-order array is −1 everywhere and the owner
    /// map is empty. Solvers assume a freshly reset store.
    pub fn reset(&self) {
        for cell in &self.cells {
            cell.set(cell.get() & CellFlags::WALLS);
        }
        for order in &self.orders {
            order.set(-1);
        }
        for owner in &self.owners {
            owner.set(None);
        }
    }

    /// Dumps the maze as text, two characters per cell.
    ///
    /// * `S` / `E` mark the entry and exit;
    /// * `*` marks the solution path;
    /// * `o` marks explored cells, `x` pruned ones, `.` untouched ones;
    /// * `|` and `-` draw the east and south walls.
    pub fn plaintext(&self) -> String {
        let mut str = String::new();
        for row in 0..self.height {
            let mut line = String::new();
            let mut under = String::new();
            for col in 0..self.width {
                let pos = Position::new(row, col);
                let flags = self.flags(pos);
                let state = if pos == self.start() {
                    'S'
                } else if pos == self.end() {
                    'E'
                } else if flags.contains(CellFlags::ON_PATH) {
                    '*'
                } else if flags.contains(CellFlags::PRUNED) {
                    'x'
                } else if flags.intersects(
                    CellFlags::VISITED | CellFlags::VISITED_FWD | CellFlags::VISITED_REV,
                ) {
                    'o'
                } else {
                    '.'
                };
                line.push(state);
                line.push(if flags.contains(CellFlags::EAST_WALL) {
                    '|'
                } else {
                    ' '
                });
                under.push(if flags.contains(CellFlags::SOUTH_WALL) {
                    '-'
                } else {
                    ' '
                });
                under.push(' ');
            }
            writeln!(str, "{}", line.trim_end()).unwrap();
            if row != self.height - 1 {
                writeln!(str, "{}", under.trim_end()).unwrap();
            }
        }
        str
    }
}
