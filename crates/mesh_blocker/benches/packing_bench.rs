//! Link packing benchmarks.
//!
//! - **allocators**: greedy vs exact on random connectivity bitmaps
//! - **pipeline**: build, map and pack every block of a tiled grid mesh

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mesh_blocker::{
  build_blocks, map_block, pack_exact, pack_greedy, pack_links, BlockGeometry, BlockId,
  ConnectivityMap, LoadCatalogue, MeshContext, NodeId,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// =============================================================================
// Fixtures
// =============================================================================

/// Random bitmaps with `rows` rows; roughly one bit in three set.
fn random_maps(count: usize, rows: usize, seed: u64) -> Vec<ConnectivityMap> {
  let mut rng = StdRng::seed_from_u64(seed);
  (0..count)
    .map(|_| {
      let rows = (0..rows)
        .map(|_| (0..4).filter(|_| rng.random_bool(0.3)).fold(0u8, |m, b| m | (1 << b)))
        .collect();
      ConnectivityMap::from_rows(rows, 4)
    })
    .collect()
}

/// `size x size` grid mesh cut into `tile x tile` blocks.
fn grid_context(size: usize, tile: usize) -> (MeshContext, usize) {
  let tiles = size.div_ceil(tile);
  let owners = (0..size * size)
    .map(|i| ((i / size / tile) * tiles + (i % size) / tile) as BlockId)
    .collect();
  let mut ctx = MeshContext::new(owners, 8);
  for y in 0..size {
    for x in 0..size {
      let node = (y * size + x) as NodeId;
      if x + 1 < size {
        ctx.link(node, node + 1).unwrap();
      }
      if y + 1 < size {
        ctx.link(node, node + size as NodeId).unwrap();
      }
    }
  }
  (ctx, tiles * tiles)
}

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_allocators(c: &mut Criterion) {
  let catalogue = LoadCatalogue::default();
  let mut group = c.benchmark_group("allocators");

  for rows in [4, 8, 16] {
    let maps = random_maps(64, rows, 0xb10c);

    group.bench_with_input(BenchmarkId::new("greedy", rows), &maps, |b, maps| {
      b.iter(|| {
        for map in maps {
          let mut map = map.clone();
          black_box(pack_greedy(&mut map, &catalogue));
        }
      });
    });

    group.bench_with_input(BenchmarkId::new("exact", rows), &maps, |b, maps| {
      b.iter(|| {
        for map in maps {
          let mut map = map.clone();
          black_box(pack_exact(&mut map, &catalogue));
        }
      });
    });
  }

  group.finish();
}

fn bench_pipeline(c: &mut Criterion) {
  let geometry = BlockGeometry::default();
  let mut group = c.benchmark_group("pipeline");

  for size in [32, 64] {
    group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
      b.iter(|| {
        let (mut ctx, count) = grid_context(size, 8);
        let mut blocks = build_blocks(&mut ctx, count, &geometry).unwrap();
        for block in &mut blocks {
          block.finalize_shape();
        }
        for id in 0..count as BlockId {
          let _ = map_block(&mut blocks, id, &mut ctx, &geometry).unwrap();
        }
        for id in 0..count as BlockId {
          let _ = black_box(pack_links(&mut blocks, id, &ctx, &geometry).unwrap());
        }
      });
    });
  }

  group.finish();
}

criterion_group!(benches, bench_allocators, bench_pipeline);
criterion_main!(benches);
