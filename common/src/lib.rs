//! Types shared between the minefield engine and whatever drives it.
//!
//! Nothing in here knows how a board works; these are the values that cross
//! the boundary between the rules engine and a frontend.

pub mod models;
pub mod protocol;
