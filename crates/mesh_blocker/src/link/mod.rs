//! Link packing - derive which neighbor memory a block must fetch and pack
//! it into the fixed load-descriptor table.
//!
//! # Pipeline
//!
//! ```text
//! boundary links ──gather──► per-neighbor node lists
//!                ──bitmap──► ConnectivityMap (rows x 4-bit masks)
//!                ──pack────► Vec<Placement>  (greedy or exact)
//!                ──publish─► LoadTable        (block, row, column, width)
//! ```
//!
//! Packing only reads neighbor coordinates, so every neighbor must already be
//! slotted. A failed packing leaves the block slotted with an empty table.

pub mod exact;
pub mod gather;
pub mod greedy;
pub mod patterns;

pub use exact::pack_exact;
pub use gather::{build_connectivity, gather_links, ConnectivityMap, NeighborLinks};
pub use greedy::{pack_greedy, Placement};

use crate::block::{lagging_neighbor, lookup, Block, LoadDescriptor, LoadTable};
use crate::error::{BlockError, Operation, Outcome, SplitReason};
use crate::geometry::{BlockGeometry, PackStrategy};
use crate::mesh::MeshContext;
use crate::types::{BlockId, BlockState};

/// Summary of one successful packing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PackingStats {
  /// Loads placed per width, widest first (4, 2, 1).
  pub loads_by_width: [usize; 3],
  /// Access-group bits the loads cover.
  pub bits_packed: u32,
  /// Neighbor blocks read from.
  pub neighbors: usize,
}

impl PackingStats {
  pub fn total_loads(&self) -> usize {
    self.loads_by_width.iter().sum()
  }
}

/// Pack a block's cross-block loads with the geometry's configured strategy.
pub fn pack_links(
  blocks: &mut [Block],
  id: BlockId,
  ctx: &MeshContext,
  geometry: &BlockGeometry,
) -> Result<Outcome<PackingStats>, BlockError> {
  pack_links_with(blocks, id, ctx, geometry, geometry.strategy)
}

/// Pack a block's cross-block loads with an explicit allocator.
///
/// - `Skipped` when the block is already linked.
/// - `RetryLater` while a neighbor is not slotted yet.
/// - `NeedsSplit` on row or catalogue overflow; the block stays slotted and
///   its load table is untouched.
#[tracing::instrument(skip_all, name = "link::pack_links", fields(block = id, ?strategy))]
pub fn pack_links_with(
  blocks: &mut [Block],
  id: BlockId,
  ctx: &MeshContext,
  geometry: &BlockGeometry,
  strategy: PackStrategy,
) -> Result<Outcome<PackingStats>, BlockError> {
  geometry.check(Operation::LinkPacking)?;
  let block = lookup(blocks, id, Operation::LinkPacking)?;

  if block.state >= BlockState::Linked {
    return Ok(Outcome::Skipped);
  }
  if block.state < BlockState::Slotted {
    return Err(BlockError::SlotsNotAssigned {
      block: id,
      state: block.state,
    });
  }

  let neighbors = block.neighbor_blocks(ctx);
  if let Some(neighbor) = lagging_neighbor(blocks, &neighbors, BlockState::Slotted, Operation::LinkPacking)? {
    tracing::debug!(block = id, neighbor, "neighbor not slotted, retry later");
    return Ok(Outcome::RetryLater { neighbor });
  }

  let links = {
    let _span = tracing::debug_span!("gather").entered();
    gather_links(block, ctx)
  };
  if links.is_empty() {
    return Err(BlockError::NoLinkedNodes { block: id });
  }

  let mut map = match build_connectivity(id, &links, ctx, geometry)? {
    Ok(map) => map,
    Err(reason) => return Ok(needs_split(id, reason)),
  };
  let bits = map.bit_count();

  let placements = {
    let _span = tracing::debug_span!("allocate", bits).entered();
    match strategy {
      PackStrategy::Greedy => pack_greedy(&mut map, &geometry.catalogue),
      PackStrategy::Exact => pack_exact(&mut map, &geometry.catalogue),
    }
  };
  let Some(placements) = placements else {
    let reason = SplitReason::PackingOverflow {
      bits,
      slots: geometry.catalogue.len(),
    };
    return Ok(needs_split(id, reason));
  };

  let _span = tracing::debug_span!("publish").entered();
  let mut table = LoadTable::new(geometry.catalogue.len());
  let mut stats = PackingStats {
    bits_packed: bits,
    neighbors: links.len(),
    ..Default::default()
  };
  for (position, placement) in placements.iter().enumerate() {
    let (neighbor, row) = map.neighbor_of(placement.row);
    table.set(
      position,
      LoadDescriptor {
        block: links[neighbor].block,
        row: row as u8,
        column: placement.column,
        width: placement.width,
      },
    );
    stats.loads_by_width[placement.width.rank()] += 1;
  }

  let block = &mut blocks[id as usize];
  block.loads = table;
  block.state = BlockState::Linked;

  tracing::debug!(
    block = id,
    loads = stats.total_loads(),
    neighbors = stats.neighbors,
    "links packed"
  );
  Ok(Outcome::Done(stats))
}

fn needs_split<T>(id: BlockId, reason: SplitReason) -> Outcome<T> {
  tracing::debug!(block = id, %reason, "block needs split");
  Outcome::NeedsSplit(reason)
}
