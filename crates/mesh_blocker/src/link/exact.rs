//! Exact packer - backtracking search over catalogue slots.
//!
//! Slot `i` must take a load of `catalogue.widths()[i]`. At each slot the
//! search tries every placement that covers at least one bit, most bits
//! first, and falls back to the next option when the rest of the catalogue
//! cannot finish the job.
//!
//! ```text
//! prune:  nonzero rows  > slots left       (one load covers one row)
//!         set bits      > groups left      (capacity of remaining widths)
//!         (slot, rows)  already failed     (memoized)
//! ```
//!
//! The search runs on a copy of the bitmap; the caller's map only changes on
//! success.

use std::collections::HashSet;

use smallvec::SmallVec;

use crate::constants::ACCESS_GROUPS;
use crate::geometry::LoadCatalogue;
use crate::link::gather::ConnectivityMap;
use crate::link::greedy::Placement;
use crate::types::LoadWidth;

/// Pack `map` into the catalogue, finding a packing whenever one exists.
///
/// Returns placements in catalogue order and clears the map on success. On
/// failure the map is unchanged.
pub fn pack_exact(map: &mut ConnectivityMap, catalogue: &LoadCatalogue) -> Option<Vec<Placement>> {
  let widths = catalogue.widths();

  // Groups coverable by slots `i..`.
  let mut capacity_from = vec![0u32; widths.len() + 1];
  for i in (0..widths.len()).rev() {
    capacity_from[i] = capacity_from[i + 1] + widths[i].groups() as u32;
  }

  let mut search = Search {
    widths,
    capacity_from,
    failed: HashSet::new(),
    placements: Vec::with_capacity(widths.len()),
  };
  let mut rows = map.rows().to_vec();

  if !search.solve(0, &mut rows) {
    return None;
  }
  *map = ConnectivityMap::from_rows(rows, map.rows_per_neighbor());
  Some(search.placements)
}

struct Search<'a> {
  widths: &'a [LoadWidth],
  capacity_from: Vec<u32>,
  failed: HashSet<(usize, Vec<u8>)>,
  placements: Vec<Placement>,
}

impl Search<'_> {
  fn solve(&mut self, slot: usize, rows: &mut [u8]) -> bool {
    if rows.iter().all(|&r| r == 0) {
      return true;
    }
    let Some(&width) = self.widths.get(slot) else {
      return false;
    };

    let remaining = self.widths.len() - slot;
    let nonzero = rows.iter().filter(|&&r| r != 0).count();
    let bits: u32 = rows.iter().map(|r| r.count_ones()).sum();
    if nonzero > remaining || bits > self.capacity_from[slot] {
      return false;
    }
    if self.failed.contains(&(slot, rows.to_vec())) {
      return false;
    }

    for option in options(rows, width) {
      let before = rows[option.row];
      rows[option.row] &= !option.mask();
      self.placements.push(option);

      if self.solve(slot + 1, rows) {
        return true;
      }

      self.placements.pop();
      rows[option.row] = before;
    }

    self.failed.insert((slot, rows.to_vec()));
    false
  }
}

/// Placements of `width` that cover at least one bit, most bits first.
/// Options covering the same bits of a row are kept once (leftmost column).
fn options(rows: &[u8], width: LoadWidth) -> SmallVec<[Placement; 16]> {
  let positions = (ACCESS_GROUPS - width.groups()) as u8;
  let mut found: SmallVec<[(u32, Placement); 16]> = SmallVec::new();

  for (row, &bits) in rows.iter().enumerate() {
    if bits == 0 {
      continue;
    }
    let mut covered_seen: SmallVec<[u8; 4]> = SmallVec::new();
    for column in 0..=positions {
      let placement = Placement::new(row, column, width);
      let covered = bits & placement.mask();
      if covered == 0 || covered_seen.contains(&covered) {
        continue;
      }
      covered_seen.push(covered);
      found.push((covered.count_ones(), placement));
    }
  }

  found.sort_by(|a, b| b.0.cmp(&a.0));
  found.into_iter().map(|(_, placement)| placement).collect()
}

#[cfg(test)]
#[path = "exact_test.rs"]
mod exact_test;
