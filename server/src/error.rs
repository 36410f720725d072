use std::io;

use thiserror::Error;

/// Invalid bomb geometry handed to the board.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoardError {
    #[error("Board must have at least one row and one column")]
    Empty,

    #[error("Row {row} has {found} cells, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// Board file could not be read or does not follow the board file format.
#[derive(Debug, Error)]
pub enum BoardFileError {
    #[error("Failed to read board file: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid board file header: {0:?}")]
    InvalidHeader(String),

    #[error("Board file declares {expected} rows but contains {found}")]
    RowCount { expected: usize, found: usize },

    #[error("Line {line}: expected {expected} cells, found {found}")]
    RowLength {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("Line {line}: invalid cell {token:?}, expected 0 or 1")]
    InvalidCell { line: usize, token: String },

    #[error(transparent)]
    Board(#[from] BoardError),
}

/// Reasons a client session ended abnormally.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Connection error: {0}")]
    Io(#[from] io::Error),

    #[error("Game coordinator is no longer running")]
    CoordinatorGone,
}

/// Fatal server startup and runtime errors.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to bind {addr}: {source}")]
    Bind { addr: String, source: io::Error },

    #[error(transparent)]
    Board(#[from] BoardError),

    #[error(transparent)]
    BoardFile(#[from] BoardFileError),
}
