use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{GameParams, Pos};

/// A request from the player (or a test harness) to the game session.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(tag = "action")]
pub enum Command {
    #[serde(rename = "step")]
    Step { pos: Pos },
    #[serde(rename = "mark")]
    Mark { pos: Pos },
    #[serde(rename = "new")]
    NewGame {
        #[serde(default)]
        params: GameParams,
    },
    #[serde(rename = "save")]
    Save,
    #[serde(rename = "load")]
    Load,
    #[serde(rename = "show")]
    Show,
    #[serde(rename = "quit")]
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseCommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command `{0}`")]
    Unknown(String),
    #[error("`{command}` expects {expected}")]
    Arguments {
        command: &'static str,
        expected: &'static str,
    },
    #[error("`{0}` is not a non-negative integer")]
    Number(String),
}

fn number(word: &str) -> Result<usize, ParseCommandError> {
    word.parse()
        .map_err(|_| ParseCommandError::Number(word.to_string()))
}

fn pos(command: &'static str, args: &[&str]) -> Result<Pos, ParseCommandError> {
    match args {
        [row, column] => Ok(Pos::new(number(row)?, number(column)?)),
        _ => Err(ParseCommandError::Arguments {
            command,
            expected: "<row> <column>",
        }),
    }
}

fn no_args(command: &'static str, args: &[&str]) -> Result<(), ParseCommandError> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(ParseCommandError::Arguments {
            command,
            expected: "no arguments",
        })
    }
}

/// Text form: `step 2 3` (`s`), `mark 0 1` (`m`), `new [rows columns mines]` (`n`),
/// `save`, `load`, `show`, `quit` (`q`).
impl FromStr for Command {
    type Err = ParseCommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((head, args)) = words.split_first() else {
            return Err(ParseCommandError::Empty);
        };

        match head.to_ascii_lowercase().as_str() {
            "step" | "s" => Ok(Self::Step {
                pos: pos("step", args)?,
            }),
            "mark" | "m" => Ok(Self::Mark {
                pos: pos("mark", args)?,
            }),
            "new" | "n" => match args {
                [] => Ok(Self::NewGame {
                    params: GameParams::default(),
                }),
                [rows, columns, mines] => Ok(Self::NewGame {
                    params: GameParams {
                        rows: number(rows)?,
                        columns: number(columns)?,
                        mines: number(mines)?,
                    },
                }),
                _ => Err(ParseCommandError::Arguments {
                    command: "new",
                    expected: "either nothing or <rows> <columns> <mines>",
                }),
            },
            "save" => no_args("save", args).map(|_| Self::Save),
            "load" => no_args("load", args).map(|_| Self::Load),
            "show" => no_args("show", args).map(|_| Self::Show),
            "quit" | "q" | "exit" => no_args("quit", args).map(|_| Self::Quit),
            _ => Err(ParseCommandError::Unknown(head.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_text_commands() {
        assert_eq!(
            "step 2 3".parse::<Command>(),
            Ok(Command::Step {
                pos: Pos::new(2, 3)
            })
        );
        assert_eq!(
            "  M 0 1 ".parse::<Command>(),
            Ok(Command::Mark {
                pos: Pos::new(0, 1)
            })
        );
        assert_eq!(
            "new 8 9 10".parse::<Command>(),
            Ok(Command::NewGame {
                params: GameParams {
                    rows: 8,
                    columns: 9,
                    mines: 10
                }
            })
        );
        assert_eq!(
            "new".parse::<Command>(),
            Ok(Command::NewGame {
                params: GameParams::default()
            })
        );
        assert_eq!("save".parse::<Command>(), Ok(Command::Save));
        assert_eq!("q".parse::<Command>(), Ok(Command::Quit));
    }

    #[test]
    fn rejects_malformed_commands() {
        assert_eq!("".parse::<Command>(), Err(ParseCommandError::Empty));
        assert_eq!(
            "dig 1 1".parse::<Command>(),
            Err(ParseCommandError::Unknown("dig".to_string()))
        );
        assert_eq!(
            "step -1 2".parse::<Command>(),
            Err(ParseCommandError::Number("-1".to_string()))
        );
        assert!(matches!(
            "step 1".parse::<Command>(),
            Err(ParseCommandError::Arguments { command: "step", .. })
        ));
        assert!(matches!(
            "new 1 2".parse::<Command>(),
            Err(ParseCommandError::Arguments { command: "new", .. })
        ));
        assert!(matches!(
            "save now".parse::<Command>(),
            Err(ParseCommandError::Arguments { command: "save", .. })
        ));
    }
}
