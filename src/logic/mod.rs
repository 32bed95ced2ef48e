use std::fmt;

use rand::Rng;
use tracing::{debug, info, warn};

use minefield_common::models::{DisplayState, GameState, StepOutcome};

use crate::{data::Tile, error::BoardError};

/// Size used when the requested dimensions are unusable.
pub const FALLBACK_SIZE: usize = 10;

const NEIGHBOUR_OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// In-bounds Moore neighbourhood of `(row, column)`, the cell itself excluded.
pub(crate) fn neighbours(
    rows: usize,
    columns: usize,
    row: usize,
    column: usize,
) -> impl Iterator<Item = (usize, usize)> {
    NEIGHBOUR_OFFSETS
        .into_iter()
        .filter_map(move |(dr, dc)| {
            let new_row = row.checked_add_signed(dr)?;
            let new_column = column.checked_add_signed(dc)?;
            (new_row < rows && new_column < columns).then_some((new_row, new_column))
        })
}

/// Largest tile count a board may have. Bigger requests fall back like a zero
/// dimension does.
pub const MAX_AREA: usize = 1 << 24;

fn validate_params(rows: usize, columns: usize, mines: usize) -> (usize, usize, usize) {
    let (rows, columns, area) = match rows.checked_mul(columns) {
        Some(area) if (1..=MAX_AREA).contains(&area) => (rows, columns, area),
        _ => {
            warn!(
                "Invalid board size {}x{}, falling back to {}x{}",
                rows, columns, FALLBACK_SIZE, FALLBACK_SIZE
            );
            (FALLBACK_SIZE, FALLBACK_SIZE, FALLBACK_SIZE * FALLBACK_SIZE)
        }
    };

    let mut max_mines = if mines == 0 || mines > area {
        warn!(
            "Invalid mine count {} for {} tiles, falling back to {}",
            mines,
            area,
            area / 4
        );
        area / 4
    } else {
        mines
    };

    // (0, 0) can never hold a mine.
    if max_mines > area - 1 {
        warn!(
            "Mine count {} leaves no safe tile, capping at {}",
            max_mines,
            area - 1
        );
        max_mines = area - 1;
    }

    (rows, columns, max_mines)
}

/// The playing field and the state of the game played on it.
///
/// Tiles are stored in row-major order. A board is built with [`Board::new`],
/// filled once with [`Board::populate`] (or [`Board::populate_with`] /
/// [`Board::place_mine`] for a chosen layout) and then played with
/// [`Board::step`] and [`Board::toggle_mark`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    pub(crate) rows: usize,
    pub(crate) columns: usize,
    pub(crate) max_mines: usize,
    pub(crate) mines_placed: usize,
    pub(crate) game_time: u64,
    pub(crate) game_state: GameState,
    pub(crate) tiles: Vec<Tile>,
}

impl Board {
    /// Builds an empty board.
    ///
    /// A zero dimension, or a size above [`MAX_AREA`] tiles, turns the board
    /// into a 10x10 one. The mine count is then
    /// checked against the resulting area: zero or more mines than tiles falls
    /// back to a quarter of the area, and the count is finally capped so that
    /// (0, 0) can stay free.
    pub fn new(rows: usize, columns: usize, mines: usize) -> Self {
        let (rows, columns, max_mines) = validate_params(rows, columns, mines);
        debug!(
            "Creating board: {}x{} with up to {} mines",
            rows, columns, max_mines
        );

        Self {
            rows,
            columns,
            max_mines,
            mines_placed: 0,
            game_time: 0,
            game_state: GameState::Ongoing,
            tiles: vec![Tile::default(); rows * columns],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn max_mines(&self) -> usize {
        self.max_mines
    }

    pub fn mines_placed(&self) -> usize {
        self.mines_placed
    }

    pub fn game_time(&self) -> u64 {
        self.game_time
    }

    pub fn game_state(&self) -> GameState {
        self.game_state
    }

    pub fn tile(&self, row: usize, column: usize) -> Option<&Tile> {
        self.index(row, column).map(|index| &self.tiles[index])
    }

    fn index(&self, row: usize, column: usize) -> Option<usize> {
        (row < self.rows && column < self.columns).then_some(row * self.columns + column)
    }

    /// Places mines at uniformly random positions until `max_mines` are down.
    pub fn populate(&mut self) {
        self.populate_with(&mut rand::rng());
    }

    /// Same as [`Board::populate`], drawing positions from `rng`.
    pub fn populate_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let mut attempts = 0_usize;
        while self.mines_placed < self.max_mines {
            let row = rng.random_range(0..self.rows);
            let column = rng.random_range(0..self.columns);
            self.place_mine(row, column);
            attempts += 1;
        }
        info!(
            "Placed {} mines on {}x{} board in {} attempts",
            self.mines_placed, self.rows, self.columns, attempts
        );
    }

    /// Puts a mine on `(row, column)` and bumps the counts of its neighbours.
    ///
    /// Returns `false` without touching the board when the position is outside
    /// the board, is (0, 0), already holds a mine, or all mines are placed.
    pub fn place_mine(&mut self, row: usize, column: usize) -> bool {
        let Some(index) = self.index(row, column) else {
            return false;
        };
        if self.mines_placed >= self.max_mines
            || (row == 0 && column == 0)
            || self.tiles[index].is_mined()
        {
            return false;
        }

        self.tiles[index].set_mined(true);
        self.mines_placed += 1;
        for (r, c) in neighbours(self.rows, self.columns, row, column) {
            self.tiles[r * self.columns + c].increment_adjacent_mines();
        }
        true
    }

    /// Steps on a tile.
    ///
    /// Hitting a mine reveals every mine and loses the game. Otherwise the tile
    /// is revealed, and if none of its neighbours is mined the reveal spreads
    /// through the connected zero-count region and its numbered border.
    pub fn step(&mut self, row: usize, column: usize) -> Result<StepOutcome, BoardError> {
        let Some(index) = self.index(row, column) else {
            warn!("Invalid step position: ({}, {})", row, column);
            return Err(BoardError::InvalidCoordinate { row, column });
        };

        if self.game_state.is_terminal() {
            debug!("Ignoring step on finished game at ({}, {})", row, column);
            return Err(BoardError::GameOver);
        }

        if self.tiles[index].is_mined() {
            let mut revealed = 0;
            for tile in self.tiles.iter_mut().filter(|tile| tile.is_mined()) {
                tile.reveal();
                revealed += 1;
            }
            self.game_state = GameState::Lost;
            info!(
                "Stepped on mine at ({}, {}), game lost, revealed {} mines",
                row, column, revealed
            );
            return Ok(StepOutcome::Lost);
        }

        self.tiles[index].reveal();
        let adjacent = self.tiles[index].adjacent_mines();
        debug!(
            "Revealed ({}, {}) with {} adjacent mines",
            row, column, adjacent
        );
        if adjacent == 0 {
            let spread = self.flood_reveal(row, column);
            debug!(
                "Flood fill from ({}, {}) revealed {} tiles",
                row, column, spread
            );
        }

        Ok(StepOutcome::Continue)
    }

    /// Reveals everything reachable from `(row, column)` through zero-count
    /// tiles. The `revealed` flag is the visited set.
    fn flood_reveal(&mut self, row: usize, column: usize) -> usize {
        let mut revealed = 0;
        let mut pending = vec![(row, column)];

        while let Some((row, column)) = pending.pop() {
            for (r, c) in neighbours(self.rows, self.columns, row, column) {
                let tile = &mut self.tiles[r * self.columns + c];
                if tile.is_revealed() {
                    continue;
                }

                tile.reveal();
                revealed += 1;
                if tile.adjacent_mines() == 0 {
                    pending.push((r, c));
                }
            }
        }

        revealed
    }

    /// Flags or unflags a hidden tile. Has no effect on the game state.
    pub fn toggle_mark(&mut self, row: usize, column: usize) -> Result<(), BoardError> {
        let Some(index) = self.index(row, column) else {
            warn!("Invalid mark position: ({}, {})", row, column);
            return Err(BoardError::InvalidCoordinate { row, column });
        };

        if self.game_state.is_terminal() {
            debug!("Ignoring mark on finished game at ({}, {})", row, column);
            return Err(BoardError::GameOver);
        }

        let tile = &mut self.tiles[index];
        if tile.is_revealed() {
            debug!("Ignoring mark on revealed tile ({}, {})", row, column);
            return Err(BoardError::AlreadyRevealed { row, column });
        }

        tile.toggle_mark();
        debug!(
            "Tile ({}, {}) {}",
            row,
            column,
            if tile.is_marked() { "marked" } else { "unmarked" }
        );
        Ok(())
    }

    /// Returns `true` and wins the game when the marked tiles are exactly the
    /// mined ones. Scans the whole board, so call it after every move.
    pub fn check_all_mines_marked(&mut self) -> bool {
        match self.game_state {
            GameState::Won => return true,
            GameState::Lost => return false,
            GameState::Ongoing => {}
        }

        if self
            .tiles
            .iter()
            .any(|tile| tile.is_marked() != tile.is_mined())
        {
            return false;
        }

        self.game_state = GameState::Won;
        info!(
            "All {} mines marked, game won in {}s",
            self.mines_placed, self.game_time
        );
        true
    }

    /// Mines that still lack a correct flag.
    pub fn mines_remaining(&self) -> usize {
        let flagged = self
            .tiles
            .iter()
            .filter(|tile| tile.is_correctly_flagged())
            .count();
        self.mines_placed - flagged
    }

    /// `(rows * columns / max_mines) * 20 - game_time`. Slow games on sparse
    /// boards go negative.
    pub fn score(&self) -> i64 {
        let difficulty = self
            .tiles
            .len()
            .checked_div(self.max_mines)
            .unwrap_or(0);
        difficulty as i64 * 20 - self.game_time as i64
    }

    pub fn increment_game_time(&mut self) {
        self.game_time += 1;
    }

    pub fn reset_game_time(&mut self) {
        self.game_time = 0;
    }

    pub fn display_grid(&self) -> Vec<Vec<DisplayState>> {
        self.tiles
            .iter()
            .map(|tile| tile.into())
            .collect::<Vec<DisplayState>>()
            .chunks(self.columns)
            .map(|chunk| chunk.to_vec())
            .collect()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.tiles.chunks(self.columns) {
            for tile in row {
                write!(f, "{}", tile.display_state())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
