use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use minefield_common::models::GameState;

use crate::{
    data::Tile,
    error::SaveError,
    logic::{Board, MAX_AREA, neighbours},
};

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TileRecord {
    pub mined: bool,
    pub adjacent: u8,
    pub revealed: bool,
    pub marked: bool,
}

/// Everything needed to resume a game, independent of how `Board` stores it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BoardSnapshot {
    pub version: u32,
    pub rows: usize,
    pub columns: usize,
    pub max_mines: usize,
    pub mines_placed: usize,
    pub game_time: u64,
    pub game_state: GameState,
    /// Row-major, `rows * columns` entries.
    pub tiles: Vec<TileRecord>,
}

impl From<&Board> for BoardSnapshot {
    fn from(board: &Board) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            rows: board.rows,
            columns: board.columns,
            max_mines: board.max_mines,
            mines_placed: board.mines_placed,
            game_time: board.game_time,
            game_state: board.game_state,
            tiles: board
                .tiles
                .iter()
                .map(|tile| TileRecord {
                    mined: tile.is_mined(),
                    adjacent: tile.adjacent_mines(),
                    revealed: tile.is_revealed(),
                    marked: tile.is_marked(),
                })
                .collect(),
        }
    }
}

fn corrupt(message: impl Into<String>) -> SaveError {
    SaveError::Corrupt(message.into())
}

impl TryFrom<BoardSnapshot> for Board {
    type Error = SaveError;

    fn try_from(snapshot: BoardSnapshot) -> Result<Self, Self::Error> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SaveError::UnsupportedVersion {
                found: snapshot.version,
                expected: SNAPSHOT_VERSION,
            });
        }

        let BoardSnapshot {
            rows,
            columns,
            max_mines,
            mines_placed,
            game_time,
            game_state,
            tiles,
            ..
        } = snapshot;

        if rows == 0 || columns == 0 {
            return Err(corrupt(format!("board size {rows}x{columns}")));
        }
        let area = rows
            .checked_mul(columns)
            .ok_or_else(|| corrupt(format!("board size {rows}x{columns} overflows")))?;
        if area > MAX_AREA {
            return Err(corrupt(format!("board size {rows}x{columns} is too large")));
        }
        if tiles.len() != area {
            return Err(corrupt(format!(
                "{} tiles for a {}x{} board",
                tiles.len(),
                rows,
                columns
            )));
        }
        if max_mines >= area {
            return Err(corrupt(format!("{max_mines} mines for {area} tiles")));
        }
        if mines_placed > max_mines {
            return Err(corrupt(format!(
                "{mines_placed} mines placed but at most {max_mines} allowed"
            )));
        }

        let mined = tiles.iter().filter(|tile| tile.mined).count();
        if mined != mines_placed {
            return Err(corrupt(format!(
                "{mined} mined tiles but {mines_placed} mines placed"
            )));
        }
        if tiles[0].mined {
            return Err(corrupt("tile (0, 0) is mined"));
        }

        for (index, tile) in tiles.iter().enumerate() {
            let (row, column) = (index / columns, index % columns);
            if tile.marked && tile.revealed {
                return Err(corrupt(format!(
                    "tile ({row}, {column}) is both marked and revealed"
                )));
            }
            let expected = neighbours(rows, columns, row, column)
                .filter(|&(r, c)| tiles[r * columns + c].mined)
                .count();
            if usize::from(tile.adjacent) != expected {
                return Err(corrupt(format!(
                    "tile ({row}, {column}) counts {} adjacent mines, found {expected}",
                    tile.adjacent
                )));
            }
        }

        let mine_revealed = tiles.iter().any(|tile| tile.mined && tile.revealed);
        match game_state {
            GameState::Ongoing if mine_revealed => {
                return Err(corrupt("ongoing game with a revealed mine"));
            }
            GameState::Won if tiles.iter().any(|tile| tile.marked != tile.mined) => {
                return Err(corrupt("won game whose marks differ from its mines"));
            }
            GameState::Lost if !mine_revealed => {
                return Err(corrupt("lost game without a revealed mine"));
            }
            _ => {}
        }

        Ok(Self {
            rows,
            columns,
            max_mines,
            mines_placed,
            game_time,
            game_state,
            tiles: tiles
                .into_iter()
                .map(|tile| {
                    Tile::from_parts(tile.mined, tile.adjacent, tile.revealed, tile.marked)
                })
                .collect(),
        })
    }
}

impl Board {
    /// Encodes the whole game as a JSON snapshot.
    pub fn serialize(&self) -> Result<Vec<u8>, SaveError> {
        Ok(serde_json::to_vec(&BoardSnapshot::from(self))?)
    }

    /// Restores a game written by [`Board::serialize`].
    ///
    /// Fails with [`SaveError::Corrupt`] when the snapshot breaks a board
    /// invariant: tile count, mine bounds, a mined (0, 0), a tile both marked and
    /// revealed, a wrong adjacent count, or a game state its tiles contradict.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, SaveError> {
        let snapshot: BoardSnapshot = serde_json::from_slice(bytes)?;
        Self::try_from(snapshot)
    }
}

/// Stores one saved game in a file.
#[derive(Debug, Clone)]
pub struct SaveStore {
    path: PathBuf,
}

impl SaveStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    #[instrument(level = "trace", skip(self, board), fields(path = %self.path.display()))]
    pub async fn save(&self, board: &Board) -> Result<(), SaveError> {
        let bytes = board.serialize()?;
        tokio::fs::write(&self.path, &bytes).await.map_err(|e| {
            warn!("Failed to write save {}: {}", self.path.display(), e);
            SaveError::Io(e)
        })?;
        info!(
            "Saved {}x{} game ({} bytes) to {}",
            board.rows(),
            board.columns(),
            bytes.len(),
            self.path.display()
        );
        Ok(())
    }

    #[instrument(level = "trace", skip(self), fields(path = %self.path.display()))]
    pub async fn load(&self) -> Result<Board, SaveError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No save at {}", self.path.display());
                return Err(SaveError::NotFound {
                    path: self.path.clone(),
                });
            }
            Err(e) => return Err(SaveError::Io(e)),
        };

        let board = Board::deserialize(&bytes)?;
        info!(
            "Loaded {}x{} game from {}",
            board.rows(),
            board.columns(),
            self.path.display()
        );
        Ok(board)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        std::env::temp_dir().join(format!(
            "minefield-{}-{}-{}.json",
            name,
            std::process::id(),
            n
        ))
    }

    fn played_board(seed: u64) -> Board {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut board = Board::new(7, 9, 12);
        board.populate_with(&mut rng);
        board.step(0, 0).unwrap();
        for row in 0..board.rows() {
            for column in 0..board.columns() {
                if board.tile(row, column).unwrap().is_mined() && (row + column) % 2 == 0 {
                    board.toggle_mark(row, column).unwrap();
                }
            }
        }
        let _ = board.toggle_mark(6, 8);
        for _ in 0..42 {
            board.increment_game_time();
        }
        board
    }

    #[test]
    fn round_trip_keeps_everything() {
        for seed in 0..5 {
            let board = played_board(seed);
            let restored = Board::deserialize(&board.serialize().unwrap()).unwrap();
            assert_eq!(restored, board);
            assert_eq!(restored.display_grid(), board.display_grid());
            assert_eq!(restored.game_time(), 42);
        }
    }

    #[test]
    fn round_trip_of_finished_games() {
        let mut lost = Board::new(3, 3, 1);
        lost.place_mine(2, 2);
        lost.step(2, 2).unwrap();
        let restored = Board::deserialize(&lost.serialize().unwrap()).unwrap();
        assert_eq!(restored.game_state(), GameState::Lost);
        assert_eq!(restored, lost);

        let mut won = Board::new(3, 3, 1);
        won.place_mine(2, 2);
        won.toggle_mark(2, 2).unwrap();
        assert!(won.check_all_mines_marked());
        let restored = Board::deserialize(&won.serialize().unwrap()).unwrap();
        assert_eq!(restored.game_state(), GameState::Won);
    }

    #[test]
    fn unpopulated_board_round_trips() {
        let board = Board::new(4, 4, 3);
        let restored = Board::deserialize(&board.serialize().unwrap()).unwrap();
        assert_eq!(restored, board);
    }

    #[test]
    fn rejects_other_versions() {
        let mut snapshot = BoardSnapshot::from(&played_board(1));
        snapshot.version = 2;
        let bytes = serde_json::to_vec(&snapshot).unwrap();
        assert!(matches!(
            Board::deserialize(&bytes),
            Err(SaveError::UnsupportedVersion {
                found: 2,
                expected: SNAPSHOT_VERSION
            })
        ));
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            Board::deserialize(b"not json"),
            Err(SaveError::Format(_))
        ));
        assert!(matches!(
            Board::deserialize(br#"{"version":1}"#),
            Err(SaveError::Format(_))
        ));
    }

    #[test]
    fn rejects_inconsistent_snapshots() {
        let board = played_board(3);
        let good = BoardSnapshot::from(&board);

        let mut short = good.clone();
        short.tiles.pop();

        let mut both = good.clone();
        let hidden = both.tiles.iter().position(|t| !t.revealed).unwrap();
        both.tiles[hidden].revealed = true;
        both.tiles[hidden].marked = true;

        let mut miscounted = good.clone();
        miscounted.tiles[1].adjacent += 1;

        let mut corner = good.clone();
        corner.tiles[0].mined = true;

        let mut overfull = good.clone();
        overfull.mines_placed = overfull.max_mines + 1;

        let mut empty = good.clone();
        empty.rows = 0;

        let mut huge = good.clone();
        huge.rows = MAX_AREA;

        for snapshot in [short, both, miscounted, corner, overfull, empty, huge] {
            let bytes = serde_json::to_vec(&snapshot).unwrap();
            assert!(
                matches!(Board::deserialize(&bytes), Err(SaveError::Corrupt(_))),
                "accepted {snapshot:?}"
            );
        }
    }

    #[test]
    fn rejects_game_states_the_tiles_contradict() {
        let mut ongoing = Board::new(3, 3, 1);
        ongoing.place_mine(2, 2);
        let ongoing = BoardSnapshot::from(&ongoing);

        let mut won_unmarked = ongoing.clone();
        won_unmarked.game_state = GameState::Won;

        let mut won_extra_mark = ongoing.clone();
        won_extra_mark.game_state = GameState::Won;
        won_extra_mark.tiles[8].marked = true;
        won_extra_mark.tiles[4].marked = true;

        let mut lost_hidden = ongoing.clone();
        lost_hidden.game_state = GameState::Lost;

        let mut ongoing_exposed = ongoing.clone();
        ongoing_exposed.tiles[8].revealed = true;

        for snapshot in [won_unmarked, won_extra_mark, lost_hidden, ongoing_exposed] {
            let bytes = serde_json::to_vec(&snapshot).unwrap();
            assert!(
                matches!(Board::deserialize(&bytes), Err(SaveError::Corrupt(_))),
                "accepted {snapshot:?}"
            );
        }

        let mut won = ongoing.clone();
        won.game_state = GameState::Won;
        won.tiles[8].marked = true;
        let restored = Board::deserialize(&serde_json::to_vec(&won).unwrap()).unwrap();
        assert_eq!(restored.game_state(), GameState::Won);
    }

    #[tokio::test]
    async fn store_round_trip() {
        let store = SaveStore::new(temp_path("round-trip"));
        let board = played_board(4);

        store.save(&board).await.unwrap();
        let loaded = store.load().await.unwrap();
        assert_eq!(loaded, board);

        tokio::fs::remove_file(store.path()).await.unwrap();
    }

    #[tokio::test]
    async fn missing_save_is_not_found() {
        let store = SaveStore::new(temp_path("missing"));
        match store.load().await {
            Err(SaveError::NotFound { path }) => assert_eq!(path, store.path()),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreadable_save_is_distinct_from_missing() {
        let store = SaveStore::new(temp_path("garbled"));
        tokio::fs::write(store.path(), b"{]").await.unwrap();
        assert!(matches!(store.load().await, Err(SaveError::Format(_))));
        tokio::fs::remove_file(store.path()).await.unwrap();

        let dir = SaveStore::new(std::env::temp_dir());
        assert!(matches!(dir.load().await, Err(SaveError::Io(_))));
    }
}
