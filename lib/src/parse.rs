//! Decoding the compact binary maze format.

use crate::{
    cells::{CellFlags, Position},
    error::Error,
    world::Maze,
};

/// Bytes in the fixed-size header.
const HEADER_LEN: usize = 12;

/// Cells packed into each 32-bit body word.
const CELLS_PER_WORD: usize = 16;

impl Maze {
    /// Decodes a maze from its compact binary encoding.
    ///
    /// The format is little-endian throughout. The header holds three
    /// 32-bit signed integers: width, height, and a solvability hint that
    /// is read but unused. The body is a sequence of 32-bit words, each
    /// packing sixteen cells in row-major order at two bits per cell, low
    /// bits first: bit 0 is the east wall, bit 1 the south wall. Words
    /// are consumed contiguously; rows are not padded to word boundaries.
    pub fn from_bytes(data: &[u8]) -> Result<Self, Error> {
        if data.len() < HEADER_LEN {
            return Err(Error::TruncatedHeader(data.len()));
        }
        let width = read_i32(data, 0) as isize;
        let height = read_i32(data, 4) as isize;
        let _solvable = read_i32(data, 8);

        let maze = Maze::new(width, height)?;

        let body = &data[HEADER_LEN..];
        let cell_count = (width * height) as usize;
        let need = (cell_count + CELLS_PER_WORD - 1) / CELLS_PER_WORD * 4;
        if body.len() < need {
            return Err(Error::TruncatedBody {
                need,
                got: body.len(),
            });
        }

        for i in 0..cell_count {
            let word = u32::from_le_bytes(body[i / CELLS_PER_WORD * 4..][..4].try_into().unwrap());
            let bits = word >> (i % CELLS_PER_WORD * 2) & 0b11;
            let pos = Position::new(i as isize / width, i as isize % width);
            if bits & 0b01 != 0 {
                maze.mark(pos, CellFlags::EAST_WALL);
            }
            if bits & 0b10 != 0 {
                maze.mark(pos, CellFlags::SOUTH_WALL);
            }
        }
        Ok(maze)
    }
}

fn read_i32(data: &[u8], offset: usize) -> i32 {
    i32::from_le_bytes(data[offset..offset + 4].try_into().unwrap())
}
