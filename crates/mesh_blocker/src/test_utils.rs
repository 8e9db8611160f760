//! Grid mesh fixtures shared by the unit tests.
//!
//! ```text
//! width = 8, height = 4, tile = 4 x 4
//!
//!   0  1  2  3 |  4  5  6  7
//!   8  9 10 11 | 12 13 14 15      block 0 | block 1
//!  16 17 18 19 | 20 21 22 23
//!  24 25 26 27 | 28 29 30 31
//! ```
//!
//! Node `y * width + x` links to its 4-neighborhood. Blocks are rectangular
//! tiles numbered row-major; nodes on the outer edge of the grid are marked as
//! mesh-boundary nodes.

use crate::block::{build_blocks, Block};
use crate::constants::DEFAULT_MAX_DEGREE;
use crate::geometry::BlockGeometry;
use crate::mesh::MeshContext;
use crate::types::{BlockId, NodeId};

/// Context for a `width x height` grid cut into `tile_w x tile_h` blocks.
/// Returns the context and the number of blocks.
pub fn grid_context(width: usize, height: usize, tile_w: usize, tile_h: usize) -> (MeshContext, usize) {
  let tiles_x = width.div_ceil(tile_w);
  let tiles_y = height.div_ceil(tile_h);

  let owners: Vec<BlockId> = (0..width * height)
    .map(|i| {
      let (x, y) = (i % width, i / width);
      ((y / tile_h) * tiles_x + x / tile_w) as BlockId
    })
    .collect();

  let mut ctx = MeshContext::new(owners, DEFAULT_MAX_DEGREE);
  for y in 0..height {
    for x in 0..width {
      let node = (y * width + x) as NodeId;
      if x + 1 < width {
        ctx.link(node, node + 1).unwrap();
      }
      if y + 1 < height {
        ctx.link(node, node + width as NodeId).unwrap();
      }
      let on_edge = x == 0 || y == 0 || x + 1 == width || y + 1 == height;
      ctx.set_mesh_boundary(node, on_edge).unwrap();
    }
  }
  (ctx, tiles_x * tiles_y)
}

/// Grid mesh with every block built and its shape finalized.
pub fn grid_mesh(
  width: usize,
  height: usize,
  tile_w: usize,
  tile_h: usize,
  geometry: &BlockGeometry,
) -> (MeshContext, Vec<Block>) {
  let (mut ctx, block_count) = grid_context(width, height, tile_w, tile_h);
  let mut blocks = build_blocks(&mut ctx, block_count, geometry).unwrap();
  for block in &mut blocks {
    block.finalize_shape();
  }
  (ctx, blocks)
}

/// True when every cyclically consecutive pair of `order` is linked.
pub fn is_linked_cycle(ctx: &MeshContext, order: &[NodeId]) -> bool {
  if order.len() < 2 {
    return true;
  }
  (0..order.len()).all(|i| {
    let next = order[(i + 1) % order.len()];
    ctx.links(order[i]).contains(&next)
  })
}
