//! Slot mapping - write a block's nodes into its slot grid and publish each
//! node's `(column, row)` to the shared context.
//!
//! ```text
//! slot index:  0 .. boundary.len()        ordered boundary nodes
//!              boundary.len() .. len()    interior nodes
//!              len() .. capacity          empty
//! ```

use std::collections::HashSet;

use crate::block::{lookup, Block};
use crate::constants::slot_to_coord;
use crate::error::{BlockError, Operation, Outcome, SplitReason};
use crate::geometry::BlockGeometry;
use crate::mesh::MeshContext;
use crate::ordering::order_boundary;
use crate::types::{BlockId, BlockState, NodeId, SlotCoord};

/// Fill the block's slot grid from an ordered boundary sequence followed by
/// the interior nodes, then advance the block to [`BlockState::Slotted`].
///
/// `order` must be a permutation of the block's boundary nodes. Node ids and
/// the order are checked before any slot is written.
#[tracing::instrument(skip_all, name = "slots::map_slots", fields(block = block.id))]
pub fn map_slots(
  block: &mut Block,
  order: &[NodeId],
  ctx: &mut MeshContext,
  geometry: &BlockGeometry,
) -> Result<Outcome<()>, BlockError> {
  if block.state >= BlockState::Slotted {
    return Ok(Outcome::Skipped);
  }
  if block.state < BlockState::Shaped {
    return Err(BlockError::ShapeNotFinal {
      operation: Operation::SlotMapping,
      block: block.id,
      state: block.state,
    });
  }
  geometry.check(Operation::SlotMapping)?;

  if let Some(&node) = order
    .iter()
    .chain(block.interior.iter())
    .find(|&&n| !ctx.contains(n))
  {
    return Err(BlockError::NodeOutOfRange {
      operation: Operation::SlotMapping,
      block: Some(block.id),
      node,
      node_count: ctx.node_count(),
    });
  }
  check_order(block, order)?;

  let nodes = order.len() + block.interior.len();
  let slots = block.slots.capacity();
  if nodes > slots {
    let reason = SplitReason::GridOverflow { nodes, slots };
    tracing::debug!(block = block.id, %reason, "block needs split");
    return Ok(Outcome::NeedsSplit(reason));
  }

  block.slots.clear();
  let width = geometry.slot_width;
  for (index, &node) in order.iter().chain(block.interior.iter()).enumerate() {
    block.slots.set(index, node);
    let (column, row) = slot_to_coord(index, width);
    ctx.set_coord(node, Some(SlotCoord::new(column as u16, row as u16)));
  }

  block.state = BlockState::Slotted;
  tracing::debug!(block = block.id, nodes, "slots assigned");
  Ok(Outcome::Done(()))
}

/// `order` must hold every boundary node of `block` exactly once.
fn check_order(block: &Block, order: &[NodeId]) -> Result<(), BlockError> {
  let mismatch = |node| BlockError::BoundaryOrderMismatch { block: block.id, node };
  let mut remaining: HashSet<NodeId> = block.boundary.iter().copied().collect();
  for &node in order {
    if !remaining.remove(&node) {
      return Err(mismatch(node));
    }
  }
  match block.boundary.iter().find(|n| remaining.contains(n)) {
    Some(&node) => Err(mismatch(node)),
    None => Ok(()),
  }
}

/// Order a block's boundary and map it into slots in one step.
///
/// Non-fatal outcomes from the ordering stage are passed through unchanged.
#[tracing::instrument(skip_all, name = "slots::map_block", fields(block = id))]
pub fn map_block(
  blocks: &mut [Block],
  id: BlockId,
  ctx: &mut MeshContext,
  geometry: &BlockGeometry,
) -> Result<Outcome<()>, BlockError> {
  let order = match order_boundary(blocks, id, ctx, geometry)? {
    Outcome::Done(order) => order,
    Outcome::Skipped => return Ok(Outcome::Skipped),
    Outcome::RetryLater { neighbor } => return Ok(Outcome::RetryLater { neighbor }),
    Outcome::NeedsSplit(reason) => return Ok(Outcome::NeedsSplit(reason)),
  };

  lookup(blocks, id, Operation::SlotMapping)?;
  map_slots(&mut blocks[id as usize], &order, ctx, geometry)
}

#[cfg(test)]
#[path = "slots_test.rs"]
mod slots_test;
