use std::ops::{Index, IndexMut};

use crate::error::BoardError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellState {
    Untouched,
    Flagged,
    Dug,
}

#[derive(Debug, Clone)]
pub struct Cell {
    pub bomb: bool,
    /// Bombs currently held by the up to 8 surrounding cells.
    pub adjacent: u8,
    pub state: CellState,
}

impl Cell {
    pub fn new(bomb: bool) -> Self {
        Self {
            bomb,
            adjacent: 0,
            state: CellState::Untouched,
        }
    }

    pub fn symbol(&self) -> char {
        match self.state {
            CellState::Untouched => '-',
            CellState::Flagged => 'F',
            CellState::Dug if self.adjacent == 0 => ' ',
            CellState::Dug => char::from(b'0' + self.adjacent),
        }
    }
}

/// In-bounds grid coordinate. `x` is the column, `y` the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pos {
    pub x: usize,
    pub y: usize,
}

const OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// The up to 8 positions surrounding `pos` on a `width` x `height` grid.
pub fn neighbors(pos: Pos, width: usize, height: usize) -> impl Iterator<Item = Pos> {
    OFFSETS.into_iter().filter_map(move |(dx, dy)| {
        let x = pos.x.checked_add_signed(dx)?;
        let y = pos.y.checked_add_signed(dy)?;
        (x < width && y < height).then_some(Pos { x, y })
    })
}

/// Fixed-size rectangular store, row-major.
#[derive(Debug, Clone)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    cells: Vec<T>,
}

impl<T> Grid<T> {
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self, BoardError> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        if width == 0 {
            return Err(BoardError::Empty);
        }

        if let Some((row, found)) = rows
            .iter()
            .map(Vec::len)
            .enumerate()
            .find(|&(_, len)| len != width)
        {
            return Err(BoardError::Ragged {
                row,
                expected: width,
                found,
            });
        }

        Ok(Self {
            width,
            height,
            cells: rows.into_iter().flatten().collect(),
        })
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Grid<U> {
        Grid {
            width: self.width,
            height: self.height,
            cells: self.cells.into_iter().map(f).collect(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Resolves raw client coordinates, `None` when off the grid.
    pub fn pos(&self, x: i64, y: i64) -> Option<Pos> {
        let x = usize::try_from(x).ok()?;
        let y = usize::try_from(y).ok()?;
        (x < self.width && y < self.height).then_some(Pos { x, y })
    }

    pub fn get(&self, pos: Pos) -> Option<&T> {
        if pos.x < self.width && pos.y < self.height {
            self.cells.get(pos.x + pos.y * self.width)
        } else {
            None
        }
    }

    pub fn positions(&self) -> impl Iterator<Item = Pos> + use<T> {
        let (width, height) = (self.width, self.height);
        (0..height).flat_map(move |y| (0..width).map(move |x| Pos { x, y }))
    }

    pub fn rows(&self) -> impl Iterator<Item = &[T]> {
        self.cells.chunks(self.width)
    }
}

impl<T> Index<Pos> for Grid<T> {
    type Output = T;

    fn index(&self, pos: Pos) -> &T {
        assert!(pos.x < self.width && pos.y < self.height, "{pos:?} off grid");
        &self.cells[pos.x + pos.y * self.width]
    }
}

impl<T> IndexMut<Pos> for Grid<T> {
    fn index_mut(&mut self, pos: Pos) -> &mut T {
        assert!(pos.x < self.width && pos.y < self.height, "{pos:?} off grid");
        &mut self.cells[pos.x + pos.y * self.width]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn around(x: usize, y: usize, width: usize, height: usize) -> Vec<(usize, usize)> {
        let mut found: Vec<_> = neighbors(Pos { x, y }, width, height)
            .map(|p| (p.x, p.y))
            .collect();
        found.sort();
        found
    }

    #[test]
    fn neighbors_of_corner_edge_and_center() {
        assert_eq!(around(0, 0, 3, 3), vec![(0, 1), (1, 0), (1, 1)]);
        assert_eq!(
            around(1, 0, 3, 3),
            vec![(0, 0), (0, 1), (1, 1), (2, 0), (2, 1)]
        );
        assert_eq!(around(1, 1, 3, 3).len(), 8);
        assert!(around(0, 0, 1, 1).is_empty());
    }

    #[test]
    fn from_rows_rejects_bad_geometry() {
        assert_eq!(
            Grid::<bool>::from_rows(vec![]).unwrap_err(),
            BoardError::Empty
        );
        assert_eq!(
            Grid::<bool>::from_rows(vec![vec![]]).unwrap_err(),
            BoardError::Empty
        );
        assert_eq!(
            Grid::from_rows(vec![vec![true, false], vec![false]]).unwrap_err(),
            BoardError::Ragged {
                row: 1,
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn pos_resolves_only_in_bounds() {
        let grid = Grid::from_rows(vec![vec![0; 3]; 2]).unwrap();
        assert_eq!(grid.pos(2, 1), Some(Pos { x: 2, y: 1 }));
        assert_eq!(grid.pos(3, 1), None);
        assert_eq!(grid.pos(0, 2), None);
        assert_eq!(grid.pos(-1, 0), None);
        assert_eq!(grid.pos(i64::MAX, i64::MIN), None);
    }

    #[test]
    fn rows_are_row_major() {
        let grid = Grid::from_rows(vec![vec![1, 2, 3], vec![4, 5, 6]]).unwrap();
        let rows: Vec<&[i32]> = grid.rows().collect();
        assert_eq!(rows, vec![&[1, 2, 3][..], &[4, 5, 6][..]]);
        assert_eq!(grid[Pos { x: 0, y: 1 }], 4);
        assert_eq!(grid.get(Pos { x: 3, y: 0 }), None);
        assert_eq!(grid.positions().count(), 6);
    }

    #[test]
    fn dug_symbols() {
        let mut cell = Cell::new(false);
        assert_eq!(cell.symbol(), '-');
        cell.state = CellState::Flagged;
        assert_eq!(cell.symbol(), 'F');
        cell.state = CellState::Dug;
        assert_eq!(cell.symbol(), ' ');
        cell.adjacent = 8;
        assert_eq!(cell.symbol(), '8');
    }
}
