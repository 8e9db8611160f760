//! Gather cross-block links and build the connectivity bitmap.
//!
//! ```text
//! neighbor 0: rows 0 .. R          R = rows_per_neighbor
//! neighbor 1: rows R .. 2R
//! ...
//! row mask bit g = node in access group g of that neighbor row
//! ```

use std::collections::HashSet;

use smallvec::SmallVec;

use crate::block::Block;
use crate::constants::ROW_MASK;
use crate::error::{BlockError, Operation, SplitReason};
use crate::geometry::BlockGeometry;
use crate::mesh::MeshContext;
use crate::types::{BlockId, NodeId};

/// Foreign nodes one block reads from a single neighbor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NeighborLinks {
  pub block: BlockId,
  /// Distinct target nodes, in encounter order.
  pub nodes: Vec<NodeId>,
}

/// Group every foreign link target of `block` by owning neighbor.
///
/// Each target node is listed once even when several boundary nodes link to
/// it. Neighbors and nodes keep encounter order over the boundary list.
pub fn gather_links(block: &Block, ctx: &MeshContext) -> SmallVec<[NeighborLinks; 8]> {
  let mut seen: HashSet<NodeId> = HashSet::new();
  let mut groups: SmallVec<[NeighborLinks; 8]> = SmallVec::new();

  for &node in &block.boundary {
    for &target in ctx.links(node) {
      let owner = ctx.owner(target);
      if owner == block.id || !seen.insert(target) {
        continue;
      }
      match groups.iter_mut().find(|g| g.block == owner) {
        Some(group) => group.nodes.push(target),
        None => groups.push(NeighborLinks {
          block: owner,
          nodes: vec![target],
        }),
      }
    }
  }
  groups
}

/// Per-neighbor, per-row access masks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectivityMap {
  rows: Vec<u8>,
  rows_per_neighbor: usize,
}

impl ConnectivityMap {
  /// Empty map with `rows_per_neighbor` rows for each of `neighbors`.
  pub fn new(neighbors: usize, rows_per_neighbor: usize) -> Self {
    Self {
      rows: vec![0; neighbors * rows_per_neighbor],
      rows_per_neighbor,
    }
  }

  /// Map over explicit row masks. Bits above the four access groups are
  /// dropped.
  pub fn from_rows(rows: Vec<u8>, rows_per_neighbor: usize) -> Self {
    Self {
      rows: rows.into_iter().map(|r| r & ROW_MASK).collect(),
      rows_per_neighbor,
    }
  }

  #[inline]
  pub fn len(&self) -> usize {
    self.rows.len()
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.rows.is_empty()
  }

  #[inline]
  pub fn rows(&self) -> &[u8] {
    &self.rows
  }

  #[inline]
  pub fn row(&self, row: usize) -> u8 {
    self.rows[row]
  }

  #[inline]
  pub fn rows_per_neighbor(&self) -> usize {
    self.rows_per_neighbor
  }

  #[inline]
  pub fn set_bits(&mut self, row: usize, mask: u8) {
    self.rows[row] |= mask & ROW_MASK;
  }

  #[inline]
  pub fn set_row(&mut self, row: usize, mask: u8) {
    self.rows[row] = mask & ROW_MASK;
  }

  #[inline]
  pub fn clear_bits(&mut self, row: usize, mask: u8) {
    self.rows[row] &= !mask;
  }

  /// True once every access has been covered.
  pub fn is_clear(&self) -> bool {
    self.rows.iter().all(|&r| r == 0)
  }

  /// Total set bits across all rows.
  pub fn bit_count(&self) -> u32 {
    self.rows.iter().map(|r| r.count_ones()).sum()
  }

  pub fn nonzero_rows(&self) -> usize {
    self.rows.iter().filter(|&&r| r != 0).count()
  }

  /// `(neighbor index, neighbor row)` of a bitmap row.
  #[inline]
  pub fn neighbor_of(&self, row: usize) -> (usize, usize) {
    (row / self.rows_per_neighbor, row % self.rows_per_neighbor)
  }
}

/// Build the connectivity bitmap from gathered links.
///
/// The outer error is fatal (a neighbor node without a published slot); the
/// inner one asks for a split when a node sits below the addressable rows.
#[tracing::instrument(skip_all, name = "link::build_connectivity", fields(block = block))]
pub fn build_connectivity(
  block: BlockId,
  links: &[NeighborLinks],
  ctx: &MeshContext,
  geometry: &BlockGeometry,
) -> Result<Result<ConnectivityMap, SplitReason>, BlockError> {
  geometry.check(Operation::LinkPacking)?;
  let rows_per_neighbor = geometry.rows_per_neighbor;
  let mut map = ConnectivityMap::new(links.len(), rows_per_neighbor);

  for (index, group) in links.iter().enumerate() {
    for &node in &group.nodes {
      let coord = ctx.coord(node).ok_or(BlockError::UnmappedNode {
        block,
        neighbor: group.block,
        node,
      })?;
      let row = coord.row as usize;
      if row >= rows_per_neighbor {
        return Ok(Err(SplitReason::RowOverflow {
          neighbor: group.block,
          node,
          row,
          rows_per_neighbor,
        }));
      }
      let group_bit = geometry.group_of(coord.column as usize);
      map.set_bits(index * rows_per_neighbor + row, 1 << group_bit);
    }
  }
  Ok(Ok(map))
}

#[cfg(test)]
#[path = "gather_test.rs"]
mod gather_test;
