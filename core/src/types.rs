/// Side length of the square board.
pub type Coord = u8;

/// Count type used for bomb counts, hit counts and total-cell counts.
pub type CellCount = u16;

/// Row-major index of a single cell, `0..size²`.
pub type CellIndex = u16;

/// Whole credits: balance, bet and payout amounts.
pub type Credits = u64;

pub const fn mult(a: Coord, b: Coord) -> CellCount {
    let a = a as CellCount;
    let b = b as CellCount;
    a.saturating_mul(b)
}

/// Number of cells on a square board of side `size`.
pub const fn cell_count(size: Coord) -> CellCount {
    mult(size, size)
}
