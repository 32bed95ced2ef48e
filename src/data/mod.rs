use minefield_common::models::DisplayState;

/// A single cell of the board.
///
/// A tile is never both marked and revealed: revealing clears the mark, and the
/// board refuses to mark a revealed tile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tile {
    mined: bool,
    adjacent: u8,
    revealed: bool,
    marked: bool,
}

impl Tile {
    /// Rebuilds a tile from stored parts. Used when restoring a snapshot.
    pub(crate) fn from_parts(mined: bool, adjacent: u8, revealed: bool, marked: bool) -> Self {
        Self {
            mined,
            adjacent,
            revealed,
            marked,
        }
    }

    pub fn is_mined(&self) -> bool {
        self.mined
    }

    /// Number of mined tiles among the eight neighbours.
    pub fn adjacent_mines(&self) -> u8 {
        self.adjacent
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    pub fn is_marked(&self) -> bool {
        self.marked
    }

    pub fn is_correctly_flagged(&self) -> bool {
        self.marked && self.mined
    }

    pub(crate) fn set_mined(&mut self, value: bool) {
        self.mined = value;
    }

    pub(crate) fn increment_adjacent_mines(&mut self) {
        self.adjacent += 1;
    }

    pub(crate) fn reveal(&mut self) {
        self.revealed = true;
        self.marked = false;
    }

    /// Flips the mark. The board checks that the tile is still hidden.
    pub(crate) fn toggle_mark(&mut self) {
        self.marked = !self.marked;
    }

    pub fn display_state(&self) -> DisplayState {
        match (self.revealed, self.marked) {
            (false, false) => DisplayState::Hidden,
            (false, true) => DisplayState::Flagged,
            (true, _) if self.mined => DisplayState::Mine,
            (true, _) => DisplayState::Count {
                adjacent: self.adjacent,
            },
        }
    }
}

impl From<&Tile> for DisplayState {
    fn from(value: &Tile) -> Self {
        value.display_state()
    }
}
