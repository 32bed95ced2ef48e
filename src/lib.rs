//! Rules engine for a grid-based mine-detection puzzle.
//!
//! The engine owns the board: mine placement, the reveal that spreads through
//! empty regions, marking, and deciding when a game is won or lost. Everything a
//! player sees goes through [`Board::display_grid`], so any frontend can sit on
//! top of it.
//!
//! ```rust
//! use minefield::{Board, GameState, StepOutcome};
//!
//! let mut board = Board::new(3, 3, 1);
//! assert!(board.place_mine(2, 2));
//!
//! assert_eq!(board.step(0, 0), Ok(StepOutcome::Continue));
//! board.toggle_mark(2, 2)?;
//! assert!(board.check_all_mines_marked());
//! assert_eq!(board.game_state(), GameState::Won);
//! # Ok::<(), minefield::BoardError>(())
//! ```
//!
//! Around the board sit the collaborators a running game needs: [`GameClock`]
//! to advance game time, [`SaveStore`] to keep a game on disk, and [`Session`],
//! which ties them together for a driver such as the bundled terminal binary.

pub mod clock;
pub mod config;
pub mod data;
pub mod error;
pub mod logic;
pub mod save;
pub mod session;
pub mod terminal;

pub use clock::{GameClock, SharedBoard};
pub use config::Settings;
pub use data::Tile;
pub use error::{BoardError, InputError, SaveError, SessionError};
pub use logic::Board;
pub use save::{BoardSnapshot, SaveStore};
pub use session::{Event, Session};

pub use minefield_common::{models::*, protocol::*};
