#![no_std]

extern crate alloc;

use core::ops::RangeInclusive;
use serde::{Deserialize, Serialize};

pub use error::*;
pub use generator::*;
pub use payout::*;
pub use session::*;
pub use snapshot::*;
pub use store::*;
pub use types::*;

mod error;
mod generator;
mod payout;
mod session;
mod snapshot;
mod store;
mod types;

pub const DEFAULT_GRID_SIZE: Coord = 5;
pub const DEFAULT_BOMB_COUNT: CellCount = 3;
pub const DEFAULT_STARTING_BALANCE: Credits = 1000;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Side of the square board.
    pub grid_size: Coord,
    /// Bomb count preselected for a new round.
    pub bomb_count: CellCount,
    /// Balance used when the store has nothing saved and on a balance reset.
    pub starting_balance: Credits,
}

impl SessionConfig {
    pub fn new(
        grid_size: Coord,
        bomb_count: CellCount,
        starting_balance: Credits,
    ) -> core::result::Result<Self, ConfigError> {
        let config = Self {
            grid_size,
            bomb_count,
            starting_balance,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> core::result::Result<(), ConfigError> {
        if self.grid_size < 2 {
            return Err(ConfigError::GridTooSmall);
        }
        if !self.bomb_range().contains(&self.bomb_count) {
            return Err(ConfigError::InvalidBombCount);
        }
        Ok(())
    }

    pub const fn cell_count(&self) -> CellCount {
        cell_count(self.grid_size)
    }

    /// Bomb counts a round can be started with: at least one mine, at least one safe cell.
    pub const fn bomb_range(&self) -> RangeInclusive<CellCount> {
        1..=self.cell_count().saturating_sub(1)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            bomb_count: DEFAULT_BOMB_COUNT,
            starting_balance: DEFAULT_STARTING_BALANCE,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RevealOutcome {
    Safe {
        hit_count: CellCount,
        multiplier: Multiplier,
    },
    HitMine,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CashOut {
    pub hit_count: CellCount,
    pub multiplier: Multiplier,
    pub payout: Amount,
}
