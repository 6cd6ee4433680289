use serde::{Deserialize, Serialize};

use crate::*;

/// What happened in the most recent transition that touched the board.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LastOutcome {
    Safe(CellIndex),
    HitMine(CellIndex),
    CashedOut { payout: Amount },
}

/// Everything a render surface needs to redraw labels and controls.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub state: SessionState,
    pub balance: Amount,
    pub bet: Credits,
    pub hit_count: CellCount,
    pub multiplier_current: Multiplier,
    pub multiplier_next: Option<Multiplier>,
    pub cashout_value: Amount,
    pub active: bool,
    pub last_revealed: Option<CellIndex>,
    pub last_outcome: Option<LastOutcome>,
}

impl Snapshot {
    pub const fn can_bet(&self) -> bool {
        self.state.accepts_bet()
    }

    pub const fn can_cash_out(&self) -> bool {
        self.active && self.hit_count > 0
    }
}

/// Receives a [`Snapshot`] after every state transition.
pub trait RenderSurface {
    fn render(&mut self, snapshot: &Snapshot);
}

impl<F: FnMut(&Snapshot)> RenderSurface for F {
    fn render(&mut self, snapshot: &Snapshot) {
        self(snapshot)
    }
}
