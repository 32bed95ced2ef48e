use std::{path::PathBuf, sync::Arc, time::Duration};

use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use minefield_common::{
    models::{GameParams, GameState},
    protocol::Command,
};

use crate::{
    clock::{GameClock, SharedBoard},
    config::Settings,
    error::{BoardError, SessionError},
    logic::Board,
    save::SaveStore,
};

/// What a command did, for the driver to report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The move was applied and the game goes on.
    Continue,
    Won { score: i64, game_time: u64 },
    Lost { game_time: u64 },
    NewGame {
        rows: usize,
        columns: usize,
        mines: usize,
    },
    Saved { path: PathBuf },
    Loaded { state: GameState, game_time: u64 },
    Shown,
    Quit,
}

/// One game in progress: the board, the clock that times it and the place it
/// is saved to.
pub struct Session {
    board: SharedBoard,
    clock: GameClock,
    store: SaveStore,
    tick: Duration,
}

fn fresh_board(params: GameParams) -> Board {
    let mut board = Board::new(params.rows, params.columns, params.mines);
    board.populate();
    board
}

impl Session {
    /// Opens a populated board sized by `settings` and starts its clock.
    pub fn start(settings: &Settings) -> Self {
        info!(
            "Starting session: {}x{} with {} mines, saving to {}",
            settings.opening.rows,
            settings.opening.columns,
            settings.opening.mines,
            settings.save_path.display()
        );
        Self::with_board(
            fresh_board(settings.opening),
            SaveStore::new(settings.save_path.clone()),
            settings.tick,
        )
    }

    /// Wraps an already prepared board. The clock only runs for an ongoing game.
    pub fn with_board(board: Board, store: SaveStore, tick: Duration) -> Self {
        let ongoing = !board.game_state().is_terminal();
        let board = Arc::new(Mutex::new(board));
        let clock = if ongoing {
            GameClock::start(board.clone(), tick)
        } else {
            GameClock::stopped()
        };

        Self {
            board,
            clock,
            store,
            tick,
        }
    }

    pub fn board(&self) -> SharedBoard {
        self.board.clone()
    }

    pub fn is_clock_running(&self) -> bool {
        self.clock.is_running()
    }

    #[instrument(level = "trace", skip(self))]
    pub async fn apply(&mut self, command: Command) -> Result<Event, SessionError> {
        match command {
            Command::Step { pos } => {
                self.play(|board| board.step(pos.row, pos.column).map(|_| ()))
                    .await
            }
            Command::Mark { pos } => {
                self.play(|board| board.toggle_mark(pos.row, pos.column))
                    .await
            }
            Command::NewGame { params } => {
                let board = fresh_board(params);
                let event = Event::NewGame {
                    rows: board.rows(),
                    columns: board.columns(),
                    mines: board.mines_placed(),
                };
                self.replace(board).await;
                Ok(event)
            }
            Command::Save => {
                let board = self.board.lock().await;
                self.store.save(&board).await?;
                Ok(Event::Saved {
                    path: self.store.path().to_path_buf(),
                })
            }
            Command::Load => {
                let board = self.store.load().await?;
                let event = Event::Loaded {
                    state: board.game_state(),
                    game_time: board.game_time(),
                };
                self.replace(board).await;
                Ok(event)
            }
            Command::Show => Ok(Event::Shown),
            Command::Quit => {
                self.clock.stop().await;
                info!("Session ended");
                Ok(Event::Quit)
            }
        }
    }

    /// Applies a move, then checks for a win the way every move is followed
    /// up, and stops the clock once the game is decided.
    async fn play(
        &mut self,
        action: impl FnOnce(&mut Board) -> Result<(), BoardError>,
    ) -> Result<Event, SessionError> {
        let event = {
            let mut board = self.board.lock().await;
            action(&mut board)?;
            board.check_all_mines_marked();
            match board.game_state() {
                GameState::Ongoing => Event::Continue,
                GameState::Won => Event::Won {
                    score: board.score(),
                    game_time: board.game_time(),
                },
                GameState::Lost => Event::Lost {
                    game_time: board.game_time(),
                },
            }
        };

        if event != Event::Continue {
            debug!("Game decided: {:?}", event);
            self.clock.stop().await;
        }
        Ok(event)
    }

    /// Swaps in a different game, restarting the clock if it is still going.
    async fn replace(&mut self, board: Board) {
        self.clock.stop().await;
        let ongoing = !board.game_state().is_terminal();
        *self.board.lock().await = board;
        if ongoing {
            self.clock = GameClock::start(self.board.clone(), self.tick);
        }
    }
}
