use super::*;
use crate::geometry::BlockGeometry;
use crate::link::pack_links;
use crate::slots::map_block;
use crate::test_utils::grid_mesh;
use crate::types::NodeFlag;

fn linked_mesh(width: usize, height: usize) -> (MeshContext, Vec<Block>, BlockGeometry) {
  let geometry = BlockGeometry::default();
  let (mut ctx, mut blocks) = grid_mesh(width, height, 4, 4, &geometry);
  let count = blocks.len() as BlockId;
  for id in 0..count {
    assert!(map_block(&mut blocks, id, &mut ctx, &geometry).unwrap().is_done());
  }
  for id in 0..count {
    assert!(pack_links(&mut blocks, id, &ctx, &geometry).unwrap().is_done());
  }
  (ctx, blocks, geometry)
}

#[test]
fn test_reset_to_shaped_clears_everything() {
  let (mut ctx, mut blocks, _) = linked_mesh(8, 4);
  blocks[0].reset_to_shaped(&mut ctx);

  let block = &blocks[0];
  assert_eq!(block.state(), BlockState::Shaped);
  assert!(block.slots().is_empty());
  assert!(block.loads().is_empty());
  for node in block.nodes() {
    assert_eq!(ctx.coord(node), None, "node {} keeps a coordinate", node);
  }
  assert!(block.boundary().iter().all(|&n| ctx.flag(n) == NodeFlag::Boundary));
  assert!(block.interior().iter().all(|&n| ctx.flag(n) == NodeFlag::Interior));
  // Neighbor data is untouched.
  assert!(ctx.coord(4).is_some());
}

/// A reset block runs through the pipeline again.
#[test]
fn test_reset_block_can_be_remapped() {
  let (mut ctx, mut blocks, geometry) = linked_mesh(8, 4);
  let table = blocks[0].loads().clone();
  blocks[0].reset_to_shaped(&mut ctx);

  assert!(map_block(&mut blocks, 0, &mut ctx, &geometry).unwrap().is_done());
  assert!(pack_links(&mut blocks, 0, &ctx, &geometry).unwrap().is_done());
  assert_eq!(blocks[0].loads(), &table);
}

#[test]
fn test_reset_to_shaped_keeps_raw() {
  let geometry = BlockGeometry::default();
  let mut ctx = MeshContext::new(vec![0, 0], 4);
  let mut block = Block::new(0, &geometry);
  block.reset_to_shaped(&mut ctx);
  assert_eq!(block.state(), BlockState::Raw);
}

#[test]
fn test_reset_to_slotted() {
  let (_ctx, mut blocks, _) = linked_mesh(8, 4);

  blocks[0].reset_to_slotted();
  assert_eq!(blocks[0].state(), BlockState::Slotted);
  assert!(blocks[0].loads().is_empty());
  assert!(!blocks[0].slots().is_empty(), "slots survive");

  blocks[0].state = BlockState::Shaped;
  blocks[0].reset_to_slotted();
  assert_eq!(blocks[0].state(), BlockState::Shaped, "no-op below linked");
}

#[test]
fn test_remap_resets_linked_neighbors() {
  let (mut ctx, mut blocks, geometry) = linked_mesh(12, 12);

  let reset = remap_block(&mut blocks, 4, &mut ctx).unwrap();
  assert_eq!(reset.as_slice(), &[1, 3, 5, 7]);
  assert_eq!(blocks[4].state(), BlockState::Shaped);
  for &id in &reset {
    assert_eq!(blocks[id as usize].state(), BlockState::Slotted);
    assert!(blocks[id as usize].loads().is_empty());
  }
  assert_eq!(blocks[0].state(), BlockState::Linked, "diagonal block untouched");

  // Neighbors wait for the remapped block before packing again.
  let outcome = pack_links(&mut blocks, 1, &ctx, &geometry).unwrap();
  assert_eq!(outcome, crate::error::Outcome::RetryLater { neighbor: 4 });

  assert!(map_block(&mut blocks, 4, &mut ctx, &geometry).unwrap().is_done());
  for id in [1, 3, 4, 5, 7] {
    assert!(pack_links(&mut blocks, id, &ctx, &geometry).unwrap().is_done());
  }
}

#[test]
fn test_remap_unknown_block() {
  let (mut ctx, mut blocks, _) = linked_mesh(8, 4);
  let err = remap_block(&mut blocks, 9, &mut ctx).unwrap_err();
  assert_eq!(err.code(), 2403);
  assert_eq!(err.operation(), Operation::Lifecycle);
}
