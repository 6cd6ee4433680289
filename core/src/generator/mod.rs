use alloc::collections::BTreeSet;
use alloc::vec::Vec;
use serde::Serialize;

use crate::*;
pub use random::*;

mod random;

pub trait MineGenerator {
    /// Picks `bomb_count` distinct cells out of `cell_count`.
    ///
    /// Implementations must reject `bomb_count == 0` and `bomb_count >= cell_count`.
    fn generate(&mut self, cell_count: CellCount, bomb_count: CellCount) -> Result<MineSet>;
}

/// Shared precondition for every generator: at least one mine and at least one safe cell.
pub fn check_bomb_count(cell_count: CellCount, bomb_count: CellCount) -> Result<()> {
    if bomb_count == 0 || bomb_count >= cell_count {
        Err(SessionError::InvalidBombCount)
    } else {
        Ok(())
    }
}

/// Mine positions of a single round.
///
/// Only built through [`MineSet::from_indices`] or a [`MineGenerator`], so the
/// set always leaves at least one safe cell.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MineSet {
    mines: BTreeSet<CellIndex>,
    cell_count: CellCount,
}

impl MineSet {
    pub fn from_indices(cell_count: CellCount, indices: &[CellIndex]) -> Result<Self> {
        let mut mines = BTreeSet::new();
        for &index in indices {
            if index >= cell_count {
                return Err(SessionError::OutOfRange(index));
            }
            mines.insert(index);
        }
        let count = mines.len() as CellCount;
        check_bomb_count(cell_count, count)?;
        Ok(Self { mines, cell_count })
    }

    pub fn contains(&self, index: CellIndex) -> bool {
        self.mines.contains(&index)
    }

    pub fn len(&self) -> CellCount {
        self.mines.len() as CellCount
    }

    pub fn is_empty(&self) -> bool {
        self.mines.is_empty()
    }

    pub fn cell_count(&self) -> CellCount {
        self.cell_count
    }

    pub fn safe_cell_count(&self) -> CellCount {
        self.cell_count.saturating_sub(self.len())
    }

    pub fn iter(&self) -> impl Iterator<Item = CellIndex> + '_ {
        self.mines.iter().copied()
    }
}

/// Generator that always hands out the same layout.
///
/// Used to script rounds where the mine positions must be known up front.
#[derive(Clone, Debug, PartialEq)]
pub struct FixedMineGenerator {
    indices: Vec<CellIndex>,
}

impl FixedMineGenerator {
    pub fn new(indices: &[CellIndex]) -> Self {
        Self {
            indices: indices.to_vec(),
        }
    }
}

impl MineGenerator for FixedMineGenerator {
    fn generate(&mut self, cell_count: CellCount, bomb_count: CellCount) -> Result<MineSet> {
        check_bomb_count(cell_count, bomb_count)?;
        let mines = MineSet::from_indices(cell_count, &self.indices)?;
        if mines.len() != bomb_count {
            log::warn!(
                "Fixed layout has {} mines but {} were requested",
                mines.len(),
                bomb_count
            );
            return Err(SessionError::InvalidBombCount);
        }
        Ok(mines)
    }
}
