use std::{sync::Arc, time::Duration};

use tokio::{sync::Mutex, task::JoinHandle, time};
use tracing::{debug, trace};

use crate::logic::Board;

pub type SharedBoard = Arc<Mutex<Board>>;

const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Advances a board's game time once per period while the game is ongoing.
///
/// The ticking task ends on its own when the game is won or lost. [`GameClock::stop`]
/// ends it earlier and may be called any number of times.
#[derive(Debug)]
pub struct GameClock {
    task: Option<JoinHandle<()>>,
}

impl GameClock {
    /// Spawns the ticking task. Must be called from within a tokio runtime.
    pub fn start(board: SharedBoard, period: Duration) -> Self {
        let period = period.max(MIN_PERIOD);
        debug!("Starting game clock with a {:?} period", period);
        Self {
            task: Some(tokio::spawn(tick(board, period))),
        }
    }

    /// A clock that is not running, for sessions that start out finished.
    pub fn stopped() -> Self {
        Self { task: None }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    pub async fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
            debug!("Game clock stopped");
        }
    }
}

impl Drop for GameClock {
    fn drop(&mut self) {
        if let Some(task) = &self.task {
            task.abort();
        }
    }
}

async fn tick(board: SharedBoard, period: Duration) {
    let mut interval = time::interval(period);
    // The first tick completes immediately.
    interval.tick().await;

    loop {
        interval.tick().await;

        let mut board = board.lock().await;
        if board.game_state().is_terminal() {
            debug!(
                "Game over at {}s, game clock finishing",
                board.game_time()
            );
            break;
        }
        board.increment_game_time();
        trace!("Game time is now {}s", board.game_time());
    }
}
