//! mesh_blocker - Map finite-element mesh blocks onto fixed-width accelerator
//! memory
//!
//! A mesh is cut into fixed-capacity blocks by an external partitioner. For
//! every block this crate computes a canonical slot layout for the nodes it
//! owns and a packed table of load descriptors naming the fixed-width chunks
//! of neighbor memory the block must fetch each step.
//!
//! # Stages
//!
//! - **Boundary ordering** ([`ordering`]): one cyclic walk over the boundary
//!   nodes, rotated to start at the busiest neighbor
//! - **Slot mapping** ([`slots`]): boundary first, then interior, row-major;
//!   publishes `(column, row)` per node
//! - **Link packing** ([`link`]): connectivity bitmap packed into the load
//!   catalogue by a greedy or an exact allocator
//! - **Lifecycle** ([`lifecycle`]): resets that discard slot or link results
//!
//! Stages return `Err(BlockError)` for malformed input and
//! `Ok(Outcome)` otherwise, so a driver can requeue blocks that report
//! `RetryLater` and split blocks that report `NeedsSplit`.
//!
//! # Example
//!
//! ```ignore
//! use mesh_blocker::{build_blocks, map_block, pack_links, BlockGeometry, MeshContext};
//!
//! let geometry = BlockGeometry::default();
//! let mut ctx = MeshContext::new(owners, 8);
//! for (a, b) in edges {
//!     ctx.link(a, b)?;
//! }
//!
//! let mut blocks = build_blocks(&mut ctx, block_count, &geometry)?;
//! for block in &mut blocks {
//!     block.finalize_shape();
//! }
//! for id in 0..block_count as u32 {
//!     map_block(&mut blocks, id, &mut ctx, &geometry)?;
//! }
//! for id in 0..block_count as u32 {
//!     let stats = pack_links(&mut blocks, id, &ctx, &geometry)?;
//! }
//! ```

pub mod constants;
pub mod error;
pub mod geometry;
pub mod types;

pub use constants::{coord_to_slot, slot_to_coord, SLOT_COUNT, SLOT_HEIGHT, SLOT_WIDTH};
pub use error::{BlockError, GeometryError, Operation, Outcome, SplitReason};
pub use geometry::{BlockGeometry, LoadCatalogue, PackStrategy};
pub use types::{BlockId, BlockState, LoadWidth, NodeFlag, NodeId, SlotCoord};

// Shared adjacency context
pub mod mesh;
pub use mesh::MeshContext;

// Block records and construction
pub mod block;
pub use block::{build_blocks, Block, LoadDescriptor, LoadTable, SlotGrid};

pub mod ordering;
pub use ordering::order_boundary;

pub mod slots;
pub use slots::{map_block, map_slots};

// Cross-block load packing
pub mod link;
pub use link::{pack_exact, pack_greedy, pack_links, pack_links_with, ConnectivityMap, PackingStats, Placement};

pub mod lifecycle;
pub use lifecycle::remap_block;

#[cfg(test)]
pub(crate) mod test_utils;
