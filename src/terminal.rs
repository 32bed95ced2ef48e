//! Text input and output for the interactive driver.

use minefield_common::{models::GameState, protocol::Command};

use crate::{error::InputError, logic::Board, session::Event};

pub const HELP: &str = "\
commands:
  step <row> <column>         (s)  step on a tile
  mark <row> <column>         (m)  flag or unflag a hidden tile
  new [<rows> <columns> <mines>] (n)  start a new game
  save | load                      save or restore the game
  show                             print the board again
  quit                        (q)  leave
JSON works too: {\"action\":\"step\",\"pos\":{\"row\":2,\"column\":3}}";

/// Reads a command in either its text or its JSON form.
pub fn parse_line(line: &str) -> Result<Command, InputError> {
    let line = line.trim();
    if line.starts_with('{') {
        Ok(serde_json::from_str::<Command>(line)?)
    } else {
        Ok(line.parse::<Command>()?)
    }
}

/// `mm : ss`. Minutes are padded to two digits and shown in full past 99.
pub fn format_game_time(seconds: u64) -> String {
    format!("{:02} : {:02}", seconds / 60, seconds % 60)
}

/// The board with row and column numbers and a status line underneath.
pub fn render_board(board: &Board) -> String {
    let mut out = String::from("    ");
    for column in 0..board.columns() {
        out.push_str(&format!("{column:^3}"));
    }
    out.push('\n');

    for (row, line) in board.display_grid().iter().enumerate() {
        out.push_str(&format!("{row:>3} "));
        for state in line {
            out.push_str(&state.to_string());
        }
        out.push('\n');
    }

    let status = match board.game_state() {
        GameState::Ongoing => "playing",
        GameState::Won => "won",
        GameState::Lost => "lost",
    };
    out.push_str(&format!(
        "mines left: {}   time: {}   {}",
        board.mines_remaining(),
        format_game_time(board.game_time()),
        status
    ));
    out
}

pub fn describe(event: &Event) -> String {
    match event {
        Event::Continue | Event::Shown => String::new(),
        Event::Won { score, game_time } => format!(
            "All mines marked correctly, you win! Time {}, final score {}",
            format_game_time(*game_time),
            score
        ),
        Event::Lost { game_time } => format!(
            "You stepped on a mine after {}. Use `new` to play again.",
            format_game_time(*game_time)
        ),
        Event::NewGame {
            rows,
            columns,
            mines,
        } => format!("New game: {rows}x{columns} with {mines} mines"),
        Event::Saved { path } => format!("Game saved to {}", path.display()),
        Event::Loaded { state, .. } => match state {
            GameState::Ongoing => "Game loaded.".to_string(),
            _ => "Game loaded (already finished).".to_string(),
        },
        Event::Quit => "Bye.".to_string(),
    }
}
