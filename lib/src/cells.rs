//! Cells in the maze grid.

use bitflags::bitflags;
pub use Direction::{East, North, South, West};

/// A cell position, row 0 at the top.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Position {
    pub row: isize,
    pub col: isize,
}

impl Position {
    pub const fn new(row: isize, col: isize) -> Self {
        Position { row, col }
    }

    /// The adjacent position in the given direction.
    ///
    /// No bounds check; the result may lie outside the grid.
    pub fn step(self, dir: Direction) -> Self {
        match dir {
            North => Position::new(self.row - 1, self.col),
            East => Position::new(self.row, self.col + 1),
            South => Position::new(self.row + 1, self.col),
            West => Position::new(self.row, self.col - 1),
        }
    }
}

/// One of the four cardinal directions.
///
/// An absent or not-yet-chosen direction is `Option<Direction>`,
/// not an extra variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    /// All four directions, in slot order.
    pub const ALL: [Direction; 4] = [North, East, South, West];

    /// The opposite direction.
    pub const fn opposite(self) -> Self {
        match self {
            North => South,
            East => West,
            South => North,
            West => East,
        }
    }

    /// Fixed slot index: N = 0, E = 1, S = 2, W = 3.
    pub const fn index(self) -> usize {
        match self {
            North => 0,
            East => 1,
            South => 2,
            West => 3,
        }
    }
}

bitflags! {
    /// The packed per-cell state word.
    ///
    /// Walls are written once by the loader; everything else is search
    /// state that [`Maze::reset`](crate::Maze::reset) clears in place.
    pub struct CellFlags: u32 {
        /// Wall on the east edge of this cell.
        const EAST_WALL = 1;
        /// Wall on the south edge of this cell.
        const SOUTH_WALL = 1 << 1;
        /// Generic visited marker for the single-walker solvers.
        const VISITED = 1 << 2;
        /// On the final solution path.
        const ON_PATH = 1 << 3;

        /// The parent cell lies to the north.
        const PARENT_NORTH = 1 << 4;
        /// The parent cell lies to the east.
        const PARENT_EAST = 1 << 5;
        /// The parent cell lies to the south.
        const PARENT_SOUTH = 1 << 6;
        /// The parent cell lies to the west.
        const PARENT_WEST = 1 << 7;

        /// Currently on the depth-first stack.
        const ON_STACK = 1 << 8;

        /// The branch to the north is known exhausted.
        const DEAD_NORTH = 1 << 12;
        /// The branch to the east is known exhausted.
        const DEAD_EAST = 1 << 13;
        /// The branch to the south is known exhausted.
        const DEAD_SOUTH = 1 << 14;
        /// The branch to the west is known exhausted.
        const DEAD_WEST = 1 << 15;

        /// The branch to the north is claimed by some walker.
        const OCCUPIED_NORTH = 1 << 16;
        /// The branch to the east is claimed by some walker.
        const OCCUPIED_EAST = 1 << 17;
        /// The branch to the south is claimed by some walker.
        const OCCUPIED_SOUTH = 1 << 18;
        /// The branch to the west is claimed by some walker.
        const OCCUPIED_WEST = 1 << 19;

        /// Visited by the forward (start-to-end) team.
        const VISITED_FWD = 1 << 20;
        /// Visited by the reverse (end-to-start) team.
        const VISITED_REV = 1 << 21;
        /// A true junction (more than two exits) whose exploration
        /// is exhausted.
        const DEAD_JUNCTION = 1 << 22;
        /// Dead-corridor cell eliminated from the skeleton.
        const PRUNED = 1 << 23;

        /// The immutable wall bits.
        const WALLS = Self::EAST_WALL.bits | Self::SOUTH_WALL.bits;
        /// All four parent bits. At most one is ever set per cell.
        const PARENT_MASK = Self::PARENT_NORTH.bits
            | Self::PARENT_EAST.bits
            | Self::PARENT_SOUTH.bits
            | Self::PARENT_WEST.bits;
        /// Both team-visit bits.
        const TEAM_MASK = Self::VISITED_FWD.bits | Self::VISITED_REV.bits;
    }
}

impl CellFlags {
    /// The parent bit pointing in the given direction.
    pub fn parent(dir: Direction) -> Self {
        match dir {
            North => Self::PARENT_NORTH,
            East => Self::PARENT_EAST,
            South => Self::PARENT_SOUTH,
            West => Self::PARENT_WEST,
        }
    }

    /// The dead-branch bit for the given direction.
    pub fn dead_branch(dir: Direction) -> Self {
        match dir {
            North => Self::DEAD_NORTH,
            East => Self::DEAD_EAST,
            South => Self::DEAD_SOUTH,
            West => Self::DEAD_WEST,
        }
    }

    /// The occupied-branch bit for the given direction.
    pub fn occupied(dir: Direction) -> Self {
        match dir {
            North => Self::OCCUPIED_NORTH,
            East => Self::OCCUPIED_EAST,
            South => Self::OCCUPIED_SOUTH,
            West => Self::OCCUPIED_WEST,
        }
    }

    /// The direction toward the parent cell, if a parent is recorded.
    pub fn parent_dir(self) -> Option<Direction> {
        Direction::ALL
            .iter()
            .copied()
            .find(|&d| self.contains(Self::parent(d)))
    }
}
