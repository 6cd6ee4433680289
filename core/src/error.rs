use thiserror::Error;

use crate::{CellIndex, SessionState};

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Bet must be positive and within the current balance")]
    InvalidBet,
    #[error("Bomb count must leave at least one safe cell")]
    InvalidBombCount,
    #[error("Tile {0} has already been revealed")]
    AlreadyRevealed(CellIndex),
    #[error("Tile {0} is outside the board")]
    OutOfRange(CellIndex),
    #[error("No safe tiles revealed yet, nothing to cash out")]
    NothingToCashOut,
    #[error("Operation not allowed while {0:?}")]
    WrongState(SessionState),
}

pub type Result<T> = core::result::Result<T, SessionError>;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Grid size must be at least 2")]
    GridTooSmall,
    #[error("Default bomb count must leave at least one safe cell")]
    InvalidBombCount,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Balance storage is unavailable")]
    Unavailable,
    #[error("Balance storage rejected the value: {0}")]
    Rejected(alloc::string::String),
}
