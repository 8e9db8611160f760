//! Block records: node membership, slot grid and load-descriptor table.
//!
//! ```text
//! Block
//! ├── id, state              (BlockState: raw → shaped → slotted → linked)
//! ├── boundary: Vec<NodeId>  nodes with at least one cross-block link
//! ├── interior: Vec<NodeId>  nodes with no cross-block link
//! ├── slots: SlotGrid        width x height, slot → node or empty
//! └── loads: LoadTable       one entry per catalogue position
//! ```

use rayon::prelude::*;
use smallvec::SmallVec;

use crate::constants::{DESCRIPTOR_BLOCK_SHIFT, DESCRIPTOR_ROW_SHIFT};
use crate::error::{BlockError, Operation};
use crate::geometry::BlockGeometry;
use crate::mesh::MeshContext;
use crate::types::{BlockId, BlockState, LoadWidth, NodeFlag, NodeId};

// =============================================================================
// SlotGrid
// =============================================================================

/// Fixed-size, row-major grid of node slots.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlotGrid {
  width: usize,
  height: usize,
  slots: Vec<Option<NodeId>>,
}

impl SlotGrid {
  pub fn new(width: usize, height: usize) -> Self {
    Self {
      width,
      height,
      slots: vec![None; width * height],
    }
  }

  #[inline]
  pub fn width(&self) -> usize {
    self.width
  }

  #[inline]
  pub fn height(&self) -> usize {
    self.height
  }

  /// Total number of slots.
  #[inline]
  pub fn capacity(&self) -> usize {
    self.slots.len()
  }

  #[inline]
  pub fn get(&self, index: usize) -> Option<NodeId> {
    self.slots.get(index).copied().flatten()
  }

  #[inline]
  pub fn get_at(&self, column: usize, row: usize) -> Option<NodeId> {
    if column >= self.width {
      return None;
    }
    self.get(row * self.width + column)
  }

  #[inline]
  pub(crate) fn set(&mut self, index: usize, node: NodeId) {
    self.slots[index] = Some(node);
  }

  pub(crate) fn clear(&mut self) {
    self.slots.fill(None);
  }

  /// Occupied slots as `(index, node)`, in slot order.
  pub fn occupied(&self) -> impl Iterator<Item = (usize, NodeId)> + '_ {
    self
      .slots
      .iter()
      .enumerate()
      .filter_map(|(index, slot)| slot.map(|node| (index, node)))
  }

  pub fn is_empty(&self) -> bool {
    self.slots.iter().all(Option::is_none)
  }
}

// =============================================================================
// Load descriptors
// =============================================================================

/// One fixed-width fetch from a neighbor block's memory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LoadDescriptor {
  /// Neighbor block to read from.
  pub block: BlockId,
  /// Row inside the neighbor's slot grid.
  pub row: u8,
  /// First access group of the load.
  pub column: u8,
  /// Groups covered, starting at `column`.
  pub width: LoadWidth,
}

impl LoadDescriptor {
  /// Packed form consumed by the accelerator: `block << 8 | row << 4 | column`.
  #[inline]
  pub fn encode(&self) -> u32 {
    (self.block << DESCRIPTOR_BLOCK_SHIFT)
      | ((self.row as u32) << DESCRIPTOR_ROW_SHIFT)
      | self.column as u32
  }

  /// Access groups read by this load as a row mask.
  #[inline]
  pub fn group_mask(&self) -> u8 {
    self.width.mask() << self.column
  }

  /// True when the load reads slot `(column, row)` of its block.
  pub fn covers(&self, column: usize, row: usize, group_width: usize) -> bool {
    let group = column / group_width;
    row == self.row as usize && self.group_mask() & (1 << group) != 0
  }
}

/// Load-descriptor table; position `i` holds a load of catalogue width `i`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadTable {
  entries: Vec<Option<LoadDescriptor>>,
}

impl LoadTable {
  pub fn new(size: usize) -> Self {
    Self {
      entries: vec![None; size],
    }
  }

  #[inline]
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  #[inline]
  pub fn get(&self, position: usize) -> Option<LoadDescriptor> {
    self.entries.get(position).copied().flatten()
  }

  #[inline]
  pub(crate) fn set(&mut self, position: usize, descriptor: LoadDescriptor) {
    self.entries[position] = Some(descriptor);
  }

  pub(crate) fn clear(&mut self) {
    self.entries.fill(None);
  }

  /// Filled descriptors, in table order.
  pub fn iter(&self) -> impl Iterator<Item = &LoadDescriptor> + '_ {
    self.entries.iter().flatten()
  }

  /// Number of filled positions.
  pub fn filled(&self) -> usize {
    self.entries.iter().filter(|e| e.is_some()).count()
  }

  pub fn is_empty(&self) -> bool {
    self.filled() == 0
  }

  /// Packed table; unfilled positions encode as 0.
  pub fn encoded(&self) -> Vec<u32> {
    self
      .entries
      .iter()
      .map(|e| e.map_or(0, |d| d.encode()))
      .collect()
  }
}

// =============================================================================
// Block
// =============================================================================

/// A fixed-capacity memory block holding a subset of mesh nodes.
#[derive(Clone, Debug)]
pub struct Block {
  pub(crate) id: BlockId,
  pub(crate) state: BlockState,
  pub(crate) boundary: Vec<NodeId>,
  pub(crate) interior: Vec<NodeId>,
  pub(crate) slots: SlotGrid,
  pub(crate) loads: LoadTable,
}

impl Block {
  /// Empty raw block.
  pub fn new(id: BlockId, geometry: &BlockGeometry) -> Self {
    Self {
      id,
      state: BlockState::Raw,
      boundary: Vec::new(),
      interior: Vec::new(),
      slots: SlotGrid::new(geometry.slot_width, geometry.slot_height),
      loads: LoadTable::new(geometry.catalogue.len()),
    }
  }

  /// Raw block whose members are split into boundary and interior nodes.
  /// Members keep their given order within each class.
  pub(crate) fn classify(
    id: BlockId,
    members: &[NodeId],
    ctx: &MeshContext,
    geometry: &BlockGeometry,
  ) -> Self {
    let mut block = Self::new(id, geometry);
    for &node in members {
      if ctx.has_foreign_link(node) {
        block.boundary.push(node);
      } else {
        block.interior.push(node);
      }
    }
    block
  }

  #[inline]
  pub fn id(&self) -> BlockId {
    self.id
  }

  #[inline]
  pub fn state(&self) -> BlockState {
    self.state
  }

  #[inline]
  pub fn boundary(&self) -> &[NodeId] {
    &self.boundary
  }

  #[inline]
  pub fn interior(&self) -> &[NodeId] {
    &self.interior
  }

  #[inline]
  pub fn slots(&self) -> &SlotGrid {
    &self.slots
  }

  /// Load table; meaningful once the block is linked.
  #[inline]
  pub fn loads(&self) -> &LoadTable {
    &self.loads
  }

  /// Number of owned nodes.
  #[inline]
  pub fn len(&self) -> usize {
    self.boundary.len() + self.interior.len()
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Owned nodes, boundary first.
  pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
    self.boundary.iter().chain(self.interior.iter()).copied()
  }

  /// Mark the shape as final (raw → shaped). Returns false if the block was
  /// already past raw.
  pub fn finalize_shape(&mut self) -> bool {
    if self.state != BlockState::Raw {
      return false;
    }
    self.state = BlockState::Shaped;
    true
  }

  /// Blocks linked from this block's boundary, in encounter order.
  pub fn neighbor_blocks(&self, ctx: &MeshContext) -> SmallVec<[BlockId; 8]> {
    ctx.neighbor_blocks(self.id, &self.boundary)
  }

  /// Reset every owned node to its unvisited flag (interior → 1,
  /// boundary → 2).
  pub(crate) fn rearm_flags(&self, ctx: &mut MeshContext) {
    for &node in &self.interior {
      ctx.set_flag(node, NodeFlag::Interior);
    }
    for &node in &self.boundary {
      ctx.set_flag(node, NodeFlag::Boundary);
    }
  }
}

/// Look up a block by id.
pub(crate) fn lookup(blocks: &[Block], id: BlockId, operation: Operation) -> Result<&Block, BlockError> {
  blocks.get(id as usize).ok_or(BlockError::UnknownBlock {
    operation,
    block: id,
    block_count: blocks.len(),
  })
}

/// Check that every listed neighbor exists and has reached `required`.
/// Returns the first neighbor that lags behind.
pub(crate) fn lagging_neighbor(
  blocks: &[Block],
  neighbors: &[BlockId],
  required: BlockState,
  operation: Operation,
) -> Result<Option<BlockId>, BlockError> {
  for &neighbor in neighbors {
    if lookup(blocks, neighbor, operation)?.state < required {
      return Ok(Some(neighbor));
    }
  }
  Ok(None)
}

/// Build one raw block per id in `0..block_count` from the context's owner
/// table and arm every node flag.
///
/// Classification runs in parallel across blocks; flags are written
/// afterwards, each block arming only its own nodes.
#[tracing::instrument(skip_all, name = "block::build_blocks", fields(block_count = block_count))]
pub fn build_blocks(
  ctx: &mut MeshContext,
  block_count: usize,
  geometry: &BlockGeometry,
) -> Result<Vec<Block>, BlockError> {
  geometry.check(Operation::Partition)?;
  let mut members: Vec<Vec<NodeId>> = vec![Vec::new(); block_count];
  for (node, &owner) in ctx.owners().iter().enumerate() {
    let list = members
      .get_mut(owner as usize)
      .ok_or(BlockError::UnknownOwner {
        node: node as NodeId,
        owner,
        block_count,
      })?;
    list.push(node as NodeId);
  }

  let blocks: Vec<Block> = {
    let shared: &MeshContext = ctx;
    members
      .par_iter()
      .enumerate()
      .map(|(id, nodes)| Block::classify(id as BlockId, nodes, shared, geometry))
      .collect()
  };

  for block in &blocks {
    block.rearm_flags(ctx);
  }

  tracing::debug!(
    blocks = blocks.len(),
    nodes = ctx.node_count(),
    "built blocks from owner table"
  );

  Ok(blocks)
}

#[cfg(test)]
#[path = "block_test.rs"]
mod block_test;
