use core::fmt;
use serde::{Deserialize, Serialize};

use crate::*;

/// Payout factor in hundredths, so `1.13` is stored as `113`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Multiplier(u32);

impl Multiplier {
    pub const ZERO: Self = Self(0);

    pub const fn from_hundredths(hundredths: u32) -> Self {
        Self(hundredths)
    }

    pub const fn hundredths(self) -> u32 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.0) / 100.0
    }

    /// Exact amount won by cashing out `bet` at this multiplier.
    pub const fn apply(self, bet: Credits) -> Amount {
        Amount(bet.saturating_mul(self.0 as u64))
    }
}

impl fmt::Display for Multiplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

/// Credit amount in hundredths, so payouts like `7 × 1.13 = 7.91` stay exact.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Amount(u64);

impl Amount {
    pub const ZERO: Self = Self(0);

    pub const fn from_credits(credits: Credits) -> Self {
        Self(credits.saturating_mul(100))
    }

    pub const fn from_hundredths(hundredths: u64) -> Self {
        Self(hundredths)
    }

    pub const fn hundredths(self) -> u64 {
        self.0
    }

    /// Whole credits, dropping any fraction.
    pub const fn whole_credits(self) -> Credits {
        self.0 / 100
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn as_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub const fn saturating_add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }

    pub const fn saturating_sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

/// Multipliers for 1 through 19 consecutive safe reveals.
const PAYOUT_TABLE: [Multiplier; 19] = [
    Multiplier(113),
    Multiplier(135),
    Multiplier(164),
    Multiplier(200),
    Multiplier(248),
    Multiplier(310),
    Multiplier(392),
    Multiplier(660),
    Multiplier(880),
    Multiplier(1_200),
    Multiplier(1_680),
    Multiplier(2_427),
    Multiplier(3_641),
    Multiplier(5_722),
    Multiplier(9_537),
    Multiplier(17_167),
    Multiplier(34_335),
    Multiplier(80_116),
    Multiplier(240_000),
];

/// Highest hit count with a payout entry.
pub const MAX_PAYING_HITS: CellCount = PAYOUT_TABLE.len() as CellCount;

/// Multiplier earned after `hit_count` safe reveals; zero outside the table.
pub const fn multiplier(hit_count: CellCount) -> Multiplier {
    if hit_count == 0 || hit_count > MAX_PAYING_HITS {
        Multiplier::ZERO
    } else {
        PAYOUT_TABLE[hit_count as usize - 1]
    }
}

/// Multiplier the next safe reveal would earn, if the table has one.
pub const fn next_multiplier(hit_count: CellCount) -> Option<Multiplier> {
    match hit_count.checked_add(1) {
        Some(next) if next <= MAX_PAYING_HITS => Some(multiplier(next)),
        _ => None,
    }
}

pub const fn payout(bet: Credits, hit_count: CellCount) -> Amount {
    multiplier(hit_count).apply(bet)
}
