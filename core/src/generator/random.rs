use alloc::vec;

use super::*;

/// Uniform placement without replacement, seeded so a layout can be replayed.
#[derive(Clone, Debug)]
pub struct RandomMineGenerator {
    rng: rand::rngs::SmallRng,
}

impl RandomMineGenerator {
    pub fn new(seed: u64) -> Self {
        use rand::prelude::*;

        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl MineGenerator for RandomMineGenerator {
    fn generate(&mut self, cell_count: CellCount, bomb_count: CellCount) -> Result<MineSet> {
        use rand::prelude::*;

        check_bomb_count(cell_count, bomb_count)?;

        let mut mine_mask = vec![false; cell_count.into()];
        let mut free_cells = cell_count;
        let mut mines = BTreeSet::new();

        // every draw lands on the k-th still-free cell, so no draw is ever rejected
        while (mines.len() as CellCount) < bomb_count {
            let mut place: CellCount = self.rng.random_range(0..free_cells);
            for (i, cell) in mine_mask.iter_mut().enumerate() {
                if *cell {
                    continue;
                }
                if place == 0 {
                    *cell = true;
                    mines.insert(i as CellIndex);
                    free_cells -= 1;
                    break;
                }
                place -= 1;
            }
        }

        log::debug!(
            "Placed {} mines over {} cells",
            mines.len(),
            cell_count
        );
        Ok(MineSet { mines, cell_count })
    }
}
