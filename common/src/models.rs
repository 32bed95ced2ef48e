use std::fmt;

use serde::{Deserialize, Serialize};

/// What a frontend is allowed to see of a single tile.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(tag = "state")]
pub enum DisplayState {
    #[serde(rename = "hidden")]
    Hidden,
    #[serde(rename = "flagged")]
    Flagged,
    #[serde(rename = "mine")]
    Mine,
    #[serde(rename = "count")]
    Count { adjacent: u8 },
}

impl fmt::Display for DisplayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hidden => f.write_str("[ ]"),
            Self::Flagged => f.write_str("[?]"),
            Self::Mine => f.write_str(" * "),
            Self::Count { adjacent } => write!(f, " {adjacent} "),
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pos {
    pub row: usize,
    pub column: usize,
}

impl Pos {
    pub fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct GameParams {
    pub rows: usize,
    pub columns: usize,
    pub mines: usize,
}

impl Default for GameParams {
    fn default() -> Self {
        Self {
            rows: 10,
            columns: 15,
            mines: 20,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum GameState {
    #[default]
    #[serde(rename = "ongoing")]
    Ongoing,
    #[serde(rename = "won")]
    Won,
    #[serde(rename = "lost")]
    Lost,
}

impl GameState {
    /// `true` once the game has been won or lost. No transition leaves a terminal state.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Ongoing)
    }
}

/// Result of stepping on a tile that was inside the board.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum StepOutcome {
    #[serde(rename = "continue")]
    Continue,
    #[serde(rename = "lost")]
    Lost,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_state_symbols() {
        assert_eq!(DisplayState::Hidden.to_string(), "[ ]");
        assert_eq!(DisplayState::Flagged.to_string(), "[?]");
        assert_eq!(DisplayState::Mine.to_string(), " * ");
        assert_eq!(DisplayState::Count { adjacent: 0 }.to_string(), " 0 ");
        assert_eq!(DisplayState::Count { adjacent: 3 }.to_string(), " 3 ");
    }

    #[test]
    fn only_ongoing_is_not_terminal() {
        assert!(!GameState::Ongoing.is_terminal());
        assert!(GameState::Won.is_terminal());
        assert!(GameState::Lost.is_terminal());
    }
}
