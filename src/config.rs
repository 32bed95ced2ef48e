use std::{env, path::PathBuf, str::FromStr, time::Duration};

use tracing::warn;

use minefield_common::models::GameParams;

pub const DEFAULT_SAVE_PATH: &str = "minefield.save.json";
pub const DEFAULT_TICK_MILLIS: u64 = 1000;

/// Runtime settings, taken from `MINEFIELD_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub save_path: PathBuf,
    pub tick: Duration,
    pub opening: GameParams,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            save_path: PathBuf::from(DEFAULT_SAVE_PATH),
            tick: Duration::from_millis(DEFAULT_TICK_MILLIS),
            opening: GameParams::default(),
        }
    }
}

fn parse_or<T: FromStr>(name: &str, value: Option<String>, default: T) -> T {
    match value {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring unparsable {}={:?}", name, raw);
            default
        }),
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds settings from any variable source. Unset or unparsable values
    /// keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let save_path = lookup("MINEFIELD_SAVE_PATH")
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.save_path);

        let tick_millis = parse_or(
            "MINEFIELD_TICK_MILLIS",
            lookup("MINEFIELD_TICK_MILLIS"),
            DEFAULT_TICK_MILLIS,
        )
        .max(1);

        let opening = GameParams {
            rows: parse_or("MINEFIELD_ROWS", lookup("MINEFIELD_ROWS"), defaults.opening.rows),
            columns: parse_or(
                "MINEFIELD_COLUMNS",
                lookup("MINEFIELD_COLUMNS"),
                defaults.opening.columns,
            ),
            mines: parse_or("MINEFIELD_MINES", lookup("MINEFIELD_MINES"), defaults.opening.mines),
        };

        Self {
            save_path,
            tick: Duration::from_millis(tick_millis),
            opening,
        }
    }
}
