use std::{io, path::PathBuf};

use thiserror::Error;

/// A rejected move. The board is left exactly as it was.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BoardError {
    #[error("({row}, {column}) is outside the board")]
    InvalidCoordinate { row: usize, column: usize },
    #[error("({row}, {column}) is already revealed")]
    AlreadyRevealed { row: usize, column: usize },
    #[error("the game is already over")]
    GameOver,
}

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("no save found at {}", path.display())]
    NotFound { path: PathBuf },
    #[error("save file I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("save data is not a valid snapshot: {0}")]
    Format(#[from] serde_json::Error),
    #[error("snapshot version {found} is not supported (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
    #[error("snapshot is inconsistent: {0}")]
    Corrupt(String),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Board(#[from] BoardError),
    #[error(transparent)]
    Save(#[from] SaveError),
}

/// A line of driver input that is not a command.
#[derive(Debug, Error)]
pub enum InputError {
    #[error(transparent)]
    Text(#[from] minefield_common::protocol::ParseCommandError),
    #[error("invalid JSON command: {0}")]
    Json(#[from] serde_json::Error),
}
