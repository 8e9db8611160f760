//! Static row-pattern priority tables for the greedy packer.
//!
//! Priority is iteration order: earlier entries win.
//!
//! ```text
//! width 4  tier 0: 1111
//!          tier 1: 1110 1101 1011 0111
//!          tier 2: 1001 1010 0101          (split pairs)
//!          tier 3: 0011 0110 1100          (joined pairs)
//!          tier 4: 0001 0010 0100 1000
//! width 2  pairs:  ..11 → col 0   .11. → col 1   11.. → col 2
//!          single: bit 0/1 → col 0 (clears ..11), bit 2/3 → col 2 (clears 11..)
//! width 1  lowest set bit first
//! ```

/// Width-4 tiers. A row matches when its whole mask equals a tier entry; the
/// load always starts at group 0 and clears the row.
pub const FULL_ROW_TIERS: [&[u8]; 5] = [
  &[0b1111],
  &[0b1110, 0b1101, 0b1011, 0b0111],
  &[0b1001, 0b1010, 0b0101],
  &[0b0011, 0b0110, 0b1100],
  &[0b0001, 0b0010, 0b0100, 0b1000],
];

/// A masked match inside one row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RowPattern {
  /// Bits that must all be set.
  pub mask: u8,
  /// First access group of the load.
  pub column: u8,
  /// Bits cleared when the pattern is taken.
  pub clears: u8,
}

impl RowPattern {
  const fn new(mask: u8, column: u8, clears: u8) -> Self {
    Self { mask, column, clears }
  }

  #[inline]
  pub fn matches(&self, row: u8) -> bool {
    row & self.mask == self.mask
  }
}

/// Width-2 adjacent pairs.
pub const PAIR_PATTERNS: [RowPattern; 3] = [
  RowPattern::new(0b0011, 0, 0b0011),
  RowPattern::new(0b0110, 1, 0b0110),
  RowPattern::new(0b1100, 2, 0b1100),
];

/// Width-2 loads over a lone bit, aligned to the even pair holding it.
pub const SINGLE_PAIR_PATTERNS: [RowPattern; 4] = [
  RowPattern::new(0b0001, 0, 0b0011),
  RowPattern::new(0b0010, 0, 0b0011),
  RowPattern::new(0b0100, 2, 0b1100),
  RowPattern::new(0b1000, 2, 0b1100),
];

/// Width-4 tier of a row mask, if it is non-empty.
pub fn full_row_tier(mask: u8) -> Option<usize> {
  FULL_ROW_TIERS.iter().position(|tier| tier.contains(&mask))
}

#[cfg(test)]
#[path = "patterns_test.rs"]
mod patterns_test;
