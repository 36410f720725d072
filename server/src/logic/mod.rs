use rand::Rng;
use tracing::{debug, info, instrument};

use crate::{
    data::{Cell, CellState, Grid, Pos, neighbors},
    error::BoardError,
};

/// Chance that any given cell of a random board holds a bomb.
pub const BOMB_PROBABILITY: f64 = 0.25;

/// The shared minesweeper board.
///
/// Not synchronized: it is owned by the game coordinator and only ever
/// touched from that one task.
#[derive(Debug, Clone)]
pub struct Board {
    cells: Grid<Cell>,
}

impl Board {
    /// Builds a board from a bomb placement given as rows of cells.
    ///
    /// Fails when the placement is empty or its rows differ in length.
    #[instrument(level = "trace", skip(bombs))]
    pub fn new(bombs: Vec<Vec<bool>>) -> Result<Self, BoardError> {
        let mut cells = Grid::from_rows(bombs)?.map(Cell::new);
        let (width, height) = (cells.width(), cells.height());

        let mut bomb_count = 0;
        for pos in cells.positions() {
            if cells[pos].bomb {
                bomb_count += 1;
                for neighbor in neighbors(pos, width, height) {
                    cells[neighbor].adjacent += 1;
                }
            }
        }

        info!(
            "Created board: {}x{} with {} bombs",
            width, height, bomb_count
        );
        Ok(Self { cells })
    }

    /// Random board where each cell holds a bomb with [`BOMB_PROBABILITY`].
    pub fn random(width: usize, height: usize) -> Result<Self, BoardError> {
        Self::random_with(&mut rand::rng(), width, height)
    }

    pub fn random_with<R: Rng + ?Sized>(
        rng: &mut R,
        width: usize,
        height: usize,
    ) -> Result<Self, BoardError> {
        let bombs = (0..height)
            .map(|_| {
                (0..width)
                    .map(|_| rng.random_bool(BOMB_PROBABILITY))
                    .collect()
            })
            .collect();
        Self::new(bombs)
    }

    pub fn width(&self) -> usize {
        self.cells.width()
    }

    pub fn height(&self) -> usize {
        self.cells.height()
    }

    pub fn pos(&self, x: i64, y: i64) -> Option<Pos> {
        self.cells.pos(x, y)
    }

    pub fn cell(&self, pos: Pos) -> Option<&Cell> {
        self.cells.get(pos)
    }

    /// Digs the untouched cell at `(x, y)` and reports whether it held a bomb.
    ///
    /// Off-board coordinates and cells that are already flagged or dug are
    /// left alone and report `false`. A dug bomb is removed and stops
    /// counting towards its neighbors. When the dug cell has no bombs around
    /// it (with or without a bomb of its own), the surrounding untouched
    /// cells are revealed as well, spreading through every further cell
    /// without bombs around it.
    #[instrument(level = "trace", skip(self))]
    pub fn dig(&mut self, x: i64, y: i64) -> bool {
        let Some(pos) = self.pos(x, y) else {
            debug!("Ignoring dig outside the board at ({}, {})", x, y);
            return false;
        };

        let cell = &mut self.cells[pos];
        if cell.state != CellState::Untouched {
            debug!("Ignoring dig on {:?} cell ({}, {})", cell.state, x, y);
            return false;
        }

        cell.state = CellState::Dug;
        let hit = cell.bomb;
        if hit {
            cell.bomb = false;
            for neighbor in neighbors(pos, self.width(), self.height()) {
                self.cells[neighbor].adjacent -= 1;
            }
        }

        // A cell never counts its own bomb, so removing it above leaves
        // this count untouched.
        if self.cells[pos].adjacent == 0 {
            let revealed = self.flood_reveal(pos);
            debug!("Dig at ({}, {}) revealed {} more cells", x, y, revealed);
        }

        hit
    }

    /// Reveals every untouched cell reachable from `origin` through cells
    /// with no adjacent bombs. Returns the number of cells dug.
    fn flood_reveal(&mut self, origin: Pos) -> usize {
        let (width, height) = (self.width(), self.height());
        let mut pending = vec![origin];
        let mut revealed = 0;

        while let Some(pos) = pending.pop() {
            for neighbor in neighbors(pos, width, height) {
                let cell = &mut self.cells[neighbor];
                if cell.state != CellState::Untouched {
                    continue;
                }

                cell.state = CellState::Dug;
                revealed += 1;
                if cell.adjacent == 0 {
                    pending.push(neighbor);
                }
            }
        }

        revealed
    }

    #[instrument(level = "trace", skip(self))]
    pub fn flag(&mut self, x: i64, y: i64) {
        self.transition(x, y, CellState::Untouched, CellState::Flagged);
    }

    #[instrument(level = "trace", skip(self))]
    pub fn deflag(&mut self, x: i64, y: i64) {
        self.transition(x, y, CellState::Flagged, CellState::Untouched);
    }

    fn transition(&mut self, x: i64, y: i64, from: CellState, to: CellState) {
        if let Some(pos) = self.pos(x, y) {
            let cell = &mut self.cells[pos];
            if cell.state == from {
                cell.state = to;
                debug!("Cell ({}, {}) {:?} -> {:?}", x, y, from, to);
            }
        }
    }

    /// Wire view of the board: one line per row, cells separated by spaces.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.width() * self.height() * 2);
        for (y, row) in self.cells.rows().enumerate() {
            if y > 0 {
                out.push('\n');
            }
            for (x, cell) in row.iter().enumerate() {
                if x > 0 {
                    out.push(' ');
                }
                out.push(cell.symbol());
            }
        }
        out
    }
}
