//! Boundary ordering - turn a block's boundary set into one cyclic walk.
//!
//! # Algorithm
//!
//! 1. **Pick a start**: prefer a node that lies on the outer mesh boundary
//!    and has a single same-block boundary link (the open end of a loop), then
//!    a node with exactly two such links, then any boundary node.
//! 2. **Flood fill**: walk same-block boundary links breadth-first, recording
//!    the last neighbor block seen along the way.
//! 3. **Reseed**: when the walk runs dry before every node is placed, restart
//!    from a loop end next to the last neighbor block, else any free node
//!    next to it, else the next loop end or free node.
//! 4. **Rotate**: start the cycle at the run of nodes linked to the busiest
//!    neighbor block.
//!
//! ```text
//!  flags:  Boundary(2) ──enqueue──► Queued(3) ──place──► Done(4)
//! ```
//!
//! Only flags of nodes owned by the block being ordered are written.

use std::collections::VecDeque;

use smallvec::SmallVec;

use crate::block::{lagging_neighbor, lookup, Block};
use crate::error::{BlockError, Operation, Outcome, SplitReason};
use crate::geometry::BlockGeometry;
use crate::mesh::MeshContext;
use crate::types::{BlockId, BlockState, NodeFlag, NodeId};

/// Compute the canonical cyclic ordering of a block's boundary nodes.
///
/// Returns `Skipped` once the block is slotted, `NeedsSplit` when the block
/// has more boundary nodes than `geometry.max_boundary`, and `RetryLater`
/// while a neighbor's shape is not final. None of these touch node flags.
#[tracing::instrument(skip_all, name = "ordering::order_boundary", fields(block = id))]
pub fn order_boundary(
  blocks: &[Block],
  id: BlockId,
  ctx: &mut MeshContext,
  geometry: &BlockGeometry,
) -> Result<Outcome<Vec<NodeId>>, BlockError> {
  geometry.check(Operation::BoundaryOrdering)?;
  let block = lookup(blocks, id, Operation::BoundaryOrdering)?;

  if block.state >= BlockState::Slotted {
    return Ok(Outcome::Skipped);
  }
  if block.is_empty() {
    return Err(BlockError::EmptyBlock { block: id });
  }
  if block.boundary.len() > geometry.max_boundary {
    let reason = SplitReason::OverCapacity {
      boundary: block.boundary.len(),
      max: geometry.max_boundary,
    };
    tracing::debug!(block = id, %reason, "block needs split");
    return Ok(Outcome::NeedsSplit(reason));
  }
  if block.state < BlockState::Shaped {
    return Err(BlockError::ShapeNotFinal {
      operation: Operation::BoundaryOrdering,
      block: id,
      state: block.state,
    });
  }

  let neighbors = block.neighbor_blocks(ctx);
  let lagging = lagging_neighbor(blocks, &neighbors, BlockState::Shaped, Operation::BoundaryOrdering)?;
  if let Some(neighbor) = lagging {
    tracing::debug!(block = id, neighbor, "neighbor shape not final, retry later");
    return Ok(Outcome::RetryLater { neighbor });
  }

  if block.boundary.is_empty() {
    return Ok(Outcome::Done(Vec::new()));
  }

  for &node in &block.boundary {
    ctx.set_flag(node, NodeFlag::Boundary);
  }

  let mut order = walk_boundary(block, ctx)?;
  rotate_to_busiest(&mut order, id, ctx);
  Ok(Outcome::Done(order))
}

/// Boundary walk state for one block.
struct Walk<'a> {
  block: &'a Block,
  order: Vec<NodeId>,
  queue: VecDeque<NodeId>,
  /// Mesh-boundary loop ends still available as seeds.
  loop_ends: VecDeque<NodeId>,
  last_linked: Option<BlockId>,
}

impl Walk<'_> {
  /// Same-block links of `node` that sit on the block boundary.
  fn boundary_links(&self, node: NodeId, ctx: &MeshContext) -> usize {
    ctx
      .links(node)
      .iter()
      .filter(|&&l| ctx.owner(l) == self.block.id && ctx.flag(l).is_boundary_class())
      .count()
  }

  /// Place `node` and queue its free same-block boundary neighbors.
  fn visit(&mut self, node: NodeId, ctx: &mut MeshContext) {
    self.order.push(node);
    let links: SmallVec<[NodeId; 8]> = SmallVec::from_slice(ctx.links(node));
    for link in links {
      let owner = ctx.owner(link);
      if owner == self.block.id {
        if ctx.flag(link) == NodeFlag::Boundary {
          ctx.set_flag(link, NodeFlag::Queued);
          self.queue.push_back(link);
        }
      } else {
        self.last_linked = Some(owner);
      }
    }
    ctx.set_flag(node, NodeFlag::Done);
  }

  fn next_seed(&mut self, ctx: &MeshContext) -> Result<NodeId, BlockError> {
    let last_linked = self.last_linked;
    let touches_last = move |node: NodeId| match last_linked {
      Some(neighbor) => ctx.links_to_block(node, neighbor),
      None => false,
    };

    self.loop_ends.retain(|&n| ctx.flag(n) == NodeFlag::Boundary);
    if let Some(position) = self.loop_ends.iter().position(|&n| touches_last(n)) {
      if let Some(node) = self.loop_ends.remove(position) {
        return Ok(node);
      }
    }

    let block = self.block;
    let free = move || {
      block
        .boundary
        .iter()
        .copied()
        .filter(move |&n| ctx.flag(n) == NodeFlag::Boundary)
    };
    if let Some(node) = free().find(|&n| touches_last(n)) {
      return Ok(node);
    }
    self
      .loop_ends
      .pop_front()
      .or_else(|| free().next())
      .ok_or(BlockError::NoFreeNode {
        block: block.id,
        placed: self.order.len(),
        expected: block.boundary.len(),
      })
  }
}

fn walk_boundary(block: &Block, ctx: &mut MeshContext) -> Result<Vec<NodeId>, BlockError> {
  let expected = block.boundary.len();
  let mut walk = Walk {
    block,
    order: Vec::with_capacity(expected),
    queue: VecDeque::new(),
    loop_ends: VecDeque::new(),
    last_linked: None,
  };

  let start = {
    let _span = tracing::debug_span!("select_start").entered();
    let mut two_link = None;
    for &node in &block.boundary {
      let links = walk.boundary_links(node, ctx);
      if links == 2 && two_link.is_none() {
        two_link = Some(node);
      }
      if links == 1 && ctx.is_on_mesh_boundary(node) {
        walk.loop_ends.push_back(node);
      }
    }
    walk
      .loop_ends
      .pop_front()
      .or(two_link)
      .unwrap_or(block.boundary[0])
  };

  // The start node goes in first with a single queued neighbor, so the walk
  // heads off in one direction around the cycle.
  walk.order.push(start);
  ctx.set_flag(start, NodeFlag::Done);
  let first = ctx
    .links(start)
    .iter()
    .copied()
    .find(|&l| ctx.owner(l) == block.id && ctx.flag(l) == NodeFlag::Boundary);
  if let Some(first) = first {
    ctx.set_flag(first, NodeFlag::Queued);
    walk.queue.push_back(first);
  }

  {
    let _span = tracing::debug_span!("flood_fill").entered();
    for _ in 0..ctx.node_count() {
      if walk.order.len() == expected {
        break;
      }
      let node = match walk.queue.pop_front() {
        Some(node) => node,
        None => {
          let seed = walk.next_seed(ctx)?;
          ctx.set_flag(seed, NodeFlag::Queued);
          tracing::trace!(block = block.id, seed, "boundary walk reseeded");
          seed
        }
      };
      walk.visit(node, ctx);
    }
  }

  if walk.order.len() != expected {
    return Err(BlockError::NoFreeNode {
      block: block.id,
      placed: walk.order.len(),
      expected,
    });
  }
  Ok(walk.order)
}

/// Neighbor block linked from the most nodes of `order`. Each node counts
/// once per neighbor; ties go to the neighbor encountered first.
fn busiest_neighbor(order: &[NodeId], id: BlockId, ctx: &MeshContext) -> Option<BlockId> {
  let mut counts: SmallVec<[(BlockId, usize); 8]> = SmallVec::new();
  for &node in order {
    for neighbor in ctx.neighbor_blocks(id, &[node]) {
      match counts.iter_mut().find(|(b, _)| *b == neighbor) {
        Some((_, count)) => *count += 1,
        None => counts.push((neighbor, 1)),
      }
    }
  }

  let mut best: Option<(BlockId, usize)> = None;
  for (neighbor, count) in counts {
    if best.map_or(true, |(_, max)| count > max) {
      best = Some((neighbor, count));
    }
  }
  best.map(|(neighbor, _)| neighbor)
}

/// Rotate `order` so it starts where the run of nodes linked to the busiest
/// neighbor begins. A run that wraps past the end of the walk is followed
/// back to its first node.
fn rotate_to_busiest(order: &mut [NodeId], id: BlockId, ctx: &MeshContext) {
  let _span = tracing::debug_span!("rotate").entered();
  let Some(busiest) = busiest_neighbor(order, id, ctx) else {
    return;
  };
  let linked = |node: NodeId| ctx.links_to_block(node, busiest);

  let start = match order.last() {
    Some(&last) if linked(last) => {
      let mut start = order.len() - 1;
      while start > 0 && linked(order[start - 1]) {
        start -= 1;
      }
      start
    }
    _ => order.iter().position(|&n| linked(n)).unwrap_or(0),
  };
  order.rotate_left(start);
}

#[cfg(test)]
#[path = "ordering_test.rs"]
mod ordering_test;
