//! Loader for fixed boards.
//!
//! The first line holds `WIDTH HEIGHT`, followed by exactly `HEIGHT` lines of
//! `WIDTH` space-separated cells, `1` for a bomb and `0` for a safe cell.
//! Trailing blank lines are ignored.

use std::path::Path;

use tracing::{info, instrument};

use crate::error::BoardFileError;

/// Reads and parses the board file at `path`.
#[instrument(level = "trace")]
pub fn load(path: &Path) -> Result<Vec<Vec<bool>>, BoardFileError> {
    let contents = std::fs::read_to_string(path)?;
    let bombs = parse(&contents)?;
    info!(
        "Loaded {}x{} board from {}",
        bombs.first().map_or(0, Vec::len),
        bombs.len(),
        path.display()
    );
    Ok(bombs)
}

/// Parses board file contents into a row-major bomb matrix.
pub fn parse(contents: &str) -> Result<Vec<Vec<bool>>, BoardFileError> {
    let mut lines = contents.lines().map(str::trim_end);

    let header = lines.next().unwrap_or_default();
    let (width, height) =
        parse_header(header).ok_or_else(|| BoardFileError::InvalidHeader(header.to_string()))?;

    let body: Vec<&str> = lines.collect();
    let found = body
        .iter()
        .rposition(|line| !line.is_empty())
        .map_or(0, |last| last + 1);
    if found != height {
        return Err(BoardFileError::RowCount {
            expected: height,
            found,
        });
    }

    body[..found]
        .iter()
        .enumerate()
        .map(|(index, line)| parse_row(line, index + 2, width))
        .collect()
}

fn parse_header(header: &str) -> Option<(usize, usize)> {
    let mut parts = header.split_whitespace();
    let width = parts.next()?.parse().ok()?;
    let height = parts.next()?.parse().ok()?;
    if parts.next().is_some() || width == 0 || height == 0 {
        return None;
    }
    Some((width, height))
}

/// `line` is the 1-based line number in the file, for error messages.
fn parse_row(row: &str, line: usize, width: usize) -> Result<Vec<bool>, BoardFileError> {
    let cells = row
        .split_whitespace()
        .map(|token| match token {
            "0" => Ok(false),
            "1" => Ok(true),
            _ => Err(BoardFileError::InvalidCell {
                line,
                token: token.to_string(),
            }),
        })
        .collect::<Result<Vec<_>, _>>()?;

    if cells.len() != width {
        return Err(BoardFileError::RowLength {
            line,
            expected: width,
            found: cells.len(),
        });
    }
    Ok(cells)
}
