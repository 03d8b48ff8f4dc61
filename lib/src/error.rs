//! All kinds of errors in this crate.

use displaydoc::Display;
use thiserror::Error;

/// All kinds of errors in this crate.
#[derive(Clone, Debug, PartialEq, Eq, Display, Error)]
pub enum Error {
    /// Maze header is truncated: got {0} bytes, need 12.
    TruncatedHeader(usize),
    /// Maze dimensions must be positive, got {0}x{1}.
    NonPositiveSize(isize, isize),
    /// Maze body is truncated: got {got} bytes, need {need}.
    TruncatedBody {
        /// Bytes required for every cell.
        need: usize,
        /// Bytes actually present.
        got: usize,
    },
    /// Unknown solver name: {0:?}.
    UnknownSolver(String),
}
