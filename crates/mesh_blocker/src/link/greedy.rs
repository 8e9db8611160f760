//! Greedy packer - fill the load catalogue in order, one width tier at a
//! time, taking row patterns in priority order.
//!
//! Each pass only runs while the next catalogue slot has its width, and a
//! pass stops as soon as the slot width changes. Passes repeat until the
//! bitmap is clear or the catalogue is used up.

use crate::geometry::LoadCatalogue;
use crate::link::gather::ConnectivityMap;
use crate::link::patterns::{RowPattern, FULL_ROW_TIERS, PAIR_PATTERNS, SINGLE_PAIR_PATTERNS};
use crate::types::LoadWidth;

/// One load assigned to a bitmap row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Placement {
  /// Bitmap row (neighbor index * rows per neighbor + neighbor row).
  pub row: usize,
  /// First access group covered.
  pub column: u8,
  pub width: LoadWidth,
}

impl Placement {
  pub fn new(row: usize, column: u8, width: LoadWidth) -> Self {
    Self { row, column, width }
  }

  /// Row bits this load can cover.
  #[inline]
  pub fn mask(&self) -> u8 {
    self.width.mask() << self.column
  }
}

/// Placements filled so far, in catalogue order.
struct Fill<'a> {
  widths: &'a [LoadWidth],
  placements: Vec<Placement>,
}

impl Fill<'_> {
  /// Width of the next free catalogue slot.
  #[inline]
  fn next_width(&self) -> Option<LoadWidth> {
    self.widths.get(self.placements.len()).copied()
  }

  #[inline]
  fn place(&mut self, row: usize, column: u8, width: LoadWidth) {
    self.placements.push(Placement::new(row, column, width));
  }
}

/// Pack `map` into the catalogue. On success the map is cleared and the
/// placements are returned in catalogue order (placement `i` has width
/// `catalogue.widths()[i]`). On failure the map is left untouched.
pub fn pack_greedy(map: &mut ConnectivityMap, catalogue: &LoadCatalogue) -> Option<Vec<Placement>> {
  let mut work = map.clone();
  let mut fill = Fill {
    widths: catalogue.widths(),
    placements: Vec::with_capacity(catalogue.len()),
  };

  while fill.next_width().is_some() && !work.is_clear() {
    let before = fill.placements.len();

    full_rows(&mut work, &mut fill);
    row_patterns(&mut work, &mut fill, &PAIR_PATTERNS);
    row_patterns(&mut work, &mut fill, &SINGLE_PAIR_PATTERNS);
    single_bits(&mut work, &mut fill);

    if fill.placements.len() == before {
      break;
    }
  }

  if !work.is_clear() {
    return None;
  }
  *map = work;
  Some(fill.placements)
}

/// Width-4 tiers: whole-row matches, load at group 0, row cleared.
fn full_rows(work: &mut ConnectivityMap, fill: &mut Fill) {
  for tier in FULL_ROW_TIERS {
    if fill.next_width() != Some(LoadWidth::Four) {
      return;
    }
    for row in 0..work.len() {
      if tier.contains(&work.row(row)) {
        fill.place(row, 0, LoadWidth::Four);
        work.set_row(row, 0);
        if fill.next_width() != Some(LoadWidth::Four) {
          break;
        }
      }
    }
  }
}

/// Width-2 pass over one pattern table. Patterns are tried in order within
/// each row, so a row can take several loads in one pass.
fn row_patterns(work: &mut ConnectivityMap, fill: &mut Fill, patterns: &[RowPattern]) {
  if fill.next_width() != Some(LoadWidth::Two) {
    return;
  }
  for row in 0..work.len() {
    for pattern in patterns {
      if pattern.matches(work.row(row)) {
        fill.place(row, pattern.column, LoadWidth::Two);
        work.clear_bits(row, pattern.clears);
        if fill.next_width() != Some(LoadWidth::Two) {
          return;
        }
      }
    }
  }
}

/// Width-1 pass: lowest set bit first, row by row.
fn single_bits(work: &mut ConnectivityMap, fill: &mut Fill) {
  if fill.next_width() != Some(LoadWidth::One) {
    return;
  }
  for row in 0..work.len() {
    for bit in 0..4u8 {
      if work.row(row) & (1 << bit) != 0 {
        fill.place(row, bit, LoadWidth::One);
        work.clear_bits(row, 1 << bit);
        if fill.next_width() != Some(LoadWidth::One) {
          return;
        }
      }
    }
  }
}

#[cfg(test)]
#[path = "greedy_test.rs"]
mod greedy_test;
