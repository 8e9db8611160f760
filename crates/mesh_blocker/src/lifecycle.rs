//! Lifecycle resets - drop a block back to an earlier state and discard the
//! results gained since.
//!
//! ```text
//!            reset_to_shaped                    reset_to_slotted
//! linked ─────────────────────► shaped   linked ────────────────► slotted
//! slotted ────────────────────► shaped   slotted/shaped/raw: no-op
//! ```

use smallvec::SmallVec;

use crate::block::{lookup, Block};
use crate::error::{BlockError, Operation};
use crate::mesh::MeshContext;
use crate::types::{BlockId, BlockState};

impl Block {
  /// Clear the slot grid, load table and published coordinates, re-arm node
  /// flags and drop the state to at most [`BlockState::Shaped`].
  ///
  /// A raw block stays raw; its shape is still owned by the partitioner.
  pub fn reset_to_shaped(&mut self, ctx: &mut MeshContext) {
    self.slots.clear();
    self.loads.clear();
    for node in self.nodes() {
      ctx.set_coord(node, None);
    }
    self.rearm_flags(ctx);
    self.state = self.state.min(BlockState::Shaped);
  }

  /// Clear the load table of a linked block so it can be packed again.
  /// No-op below [`BlockState::Linked`].
  pub fn reset_to_slotted(&mut self) {
    if self.state <= BlockState::Slotted {
      return;
    }
    self.loads.clear();
    self.state = BlockState::Slotted;
  }
}

/// Invalidate a block's mapping after its shape changed.
///
/// The block is reset to shaped, and every linked neighbor is reset to
/// slotted because its descriptors point at coordinates that no longer hold.
/// Returns the neighbors that were reset.
#[tracing::instrument(skip_all, name = "lifecycle::remap_block", fields(block = id))]
pub fn remap_block(
  blocks: &mut [Block],
  id: BlockId,
  ctx: &mut MeshContext,
) -> Result<SmallVec<[BlockId; 8]>, BlockError> {
  let neighbors = lookup(blocks, id, Operation::Lifecycle)?.neighbor_blocks(ctx);
  for &neighbor in &neighbors {
    lookup(blocks, neighbor, Operation::Lifecycle)?;
  }

  blocks[id as usize].reset_to_shaped(ctx);

  let mut reset = SmallVec::new();
  for neighbor in neighbors {
    let block = &mut blocks[neighbor as usize];
    if block.state == BlockState::Linked {
      block.reset_to_slotted();
      reset.push(neighbor);
    }
  }

  tracing::debug!(block = id, neighbors_reset = reset.len(), "block remapped");
  Ok(reset)
}

#[cfg(test)]
#[path = "lifecycle_test.rs"]
mod lifecycle_test;
