use super::*;
use crate::slots::map_block;
use crate::test_utils::grid_mesh;

fn mapped_pair() -> (MeshContext, Vec<Block>, BlockGeometry) {
  let geometry = BlockGeometry::default();
  let (mut ctx, mut blocks) = grid_mesh(8, 4, 4, 4, &geometry);
  for id in 0..2 {
    assert!(map_block(&mut blocks, id, &mut ctx, &geometry).unwrap().is_done());
  }
  (ctx, blocks, geometry)
}

#[test]
fn test_gather_groups_by_neighbor() {
  let (ctx, blocks, _) = mapped_pair();
  let links = gather_links(&blocks[0], &ctx);
  assert_eq!(links.len(), 1);
  assert_eq!(
    links[0],
    NeighborLinks {
      block: 1,
      nodes: vec![4, 12, 20, 28]
    }
  );
}

/// A target reached from two boundary nodes is listed once.
#[test]
fn test_gather_dedupes_targets() {
  let mut ctx = MeshContext::new(vec![0, 0, 1], 4);
  ctx.link(0, 1).unwrap();
  ctx.link(0, 2).unwrap();
  ctx.link(1, 2).unwrap();
  let geometry = BlockGeometry::default();
  let blocks = crate::block::build_blocks(&mut ctx, 2, &geometry).unwrap();

  let links = gather_links(&blocks[0], &ctx);
  assert_eq!(links.len(), 1);
  assert_eq!(links[0].nodes, vec![2]);
}

#[test]
fn test_connectivity_bits_follow_groups() {
  let (ctx, blocks, geometry) = mapped_pair();
  let links = gather_links(&blocks[0], &ctx);
  let map = build_connectivity(0, &links, &ctx, &geometry).unwrap().unwrap();

  // Block 1's boundary sits in slots 0..4: row 0, group 0.
  assert_eq!(map.rows(), &[0b0001, 0, 0, 0]);
  assert_eq!(map.bit_count(), 1);
}

#[test]
fn test_unmapped_neighbor_is_fatal() {
  let geometry = BlockGeometry::default();
  let (mut ctx, mut blocks) = grid_mesh(8, 4, 4, 4, &geometry);
  map_block(&mut blocks, 0, &mut ctx, &geometry).unwrap();

  let links = gather_links(&blocks[0], &ctx);
  let err = build_connectivity(0, &links, &ctx, &geometry).unwrap_err();
  assert_eq!(
    err,
    BlockError::UnmappedNode {
      block: 0,
      neighbor: 1,
      node: 4
    }
  );
  assert_eq!(err.code(), 2413);
}

#[test]
fn test_map_helpers() {
  let mut map = ConnectivityMap::from_rows(vec![0b1_0001, 0, 0b0110, 0], 2);
  assert_eq!(map.row(0), 0b0001, "bits above the groups are dropped");
  assert_eq!(map.nonzero_rows(), 2);
  assert_eq!(map.bit_count(), 3);
  assert_eq!(map.neighbor_of(3), (1, 1));

  map.clear_bits(2, 0b0010);
  assert_eq!(map.row(2), 0b0100);
  map.set_row(2, 0);
  map.clear_bits(0, 0b1111);
  assert!(map.is_clear());
}
