//! MeshContext - shared, index-keyed mesh state.
//!
//! Holds the fixed-degree adjacency table plus every per-node field the
//! blocking stages read or write: owning block, processing flag, published
//! slot coordinate and the outer-mesh-boundary marker.
//!
//! # Ownership
//!
//! A node's mutable fields (flag and coordinate) belong to its owning block.
//! A stage running for block `b` only writes fields of nodes owned by `b`,
//! and only reads a neighbor's coordinates once that neighbor has reached
//! [`BlockState::Slotted`](crate::types::BlockState::Slotted).
//!
//! ```text
//! node n:  links[n * max_degree .. n * max_degree + degree[n]]
//!          owners[n]  flags[n]  coords[n]  on_mesh_boundary[n]
//! ```

use smallvec::SmallVec;

use crate::error::{BlockError, Operation};
use crate::types::{BlockId, NodeFlag, NodeId, SlotCoord};

/// Shared mesh adjacency context.
#[derive(Clone, Debug)]
pub struct MeshContext {
  max_degree: usize,
  /// Flat adjacency table, `max_degree` entries per node.
  links: Vec<NodeId>,
  degree: Vec<u16>,
  owners: Vec<BlockId>,
  flags: Vec<NodeFlag>,
  coords: Vec<Option<SlotCoord>>,
  on_mesh_boundary: Vec<bool>,
}

impl MeshContext {
  /// Create a context with one node per entry of `owners` and no links.
  pub fn new(owners: Vec<BlockId>, max_degree: usize) -> Self {
    let node_count = owners.len();
    Self {
      max_degree,
      links: vec![0; node_count * max_degree],
      degree: vec![0; node_count],
      owners,
      flags: vec![NodeFlag::default(); node_count],
      coords: vec![None; node_count],
      on_mesh_boundary: vec![false; node_count],
    }
  }

  #[inline]
  pub fn node_count(&self) -> usize {
    self.owners.len()
  }

  #[inline]
  pub fn max_degree(&self) -> usize {
    self.max_degree
  }

  #[inline]
  pub fn contains(&self, node: NodeId) -> bool {
    (node as usize) < self.node_count()
  }

  fn check_node(&self, node: NodeId) -> Result<(), BlockError> {
    if self.contains(node) {
      Ok(())
    } else {
      Err(BlockError::NodeOutOfRange {
        operation: Operation::MeshSetup,
        block: None,
        node,
        node_count: self.node_count(),
      })
    }
  }

  /// Link two nodes in both directions. Linking an already linked pair or a
  /// node to itself is a no-op.
  pub fn link(&mut self, a: NodeId, b: NodeId) -> Result<(), BlockError> {
    self.check_node(a)?;
    self.check_node(b)?;
    if a == b || self.links(a).contains(&b) {
      return Ok(());
    }
    for (node, other) in [(a, b), (b, a)] {
      if self.degree[node as usize] as usize >= self.max_degree {
        return Err(BlockError::DegreeOverflow {
          node,
          other,
          max_degree: self.max_degree,
        });
      }
    }
    self.push_link(a, b);
    self.push_link(b, a);
    Ok(())
  }

  fn push_link(&mut self, node: NodeId, other: NodeId) {
    let n = node as usize;
    let slot = n * self.max_degree + self.degree[n] as usize;
    self.links[slot] = other;
    self.degree[n] += 1;
  }

  /// Nodes linked to `node`, in insertion order.
  #[inline]
  pub fn links(&self, node: NodeId) -> &[NodeId] {
    let n = node as usize;
    let start = n * self.max_degree;
    &self.links[start..start + self.degree[n] as usize]
  }

  #[inline]
  pub fn owner(&self, node: NodeId) -> BlockId {
    self.owners[node as usize]
  }

  #[inline]
  pub fn owners(&self) -> &[BlockId] {
    &self.owners
  }

  #[inline]
  pub fn flag(&self, node: NodeId) -> NodeFlag {
    self.flags[node as usize]
  }

  #[inline]
  pub(crate) fn set_flag(&mut self, node: NodeId, flag: NodeFlag) {
    self.flags[node as usize] = flag;
  }

  /// Published slot coordinate, once the owning block is slotted.
  #[inline]
  pub fn coord(&self, node: NodeId) -> Option<SlotCoord> {
    self.coords[node as usize]
  }

  #[inline]
  pub(crate) fn set_coord(&mut self, node: NodeId, coord: Option<SlotCoord>) {
    self.coords[node as usize] = coord;
  }

  /// True when the node lies on the outer boundary of the mesh.
  #[inline]
  pub fn is_on_mesh_boundary(&self, node: NodeId) -> bool {
    self.on_mesh_boundary[node as usize]
  }

  pub fn set_mesh_boundary(&mut self, node: NodeId, on_boundary: bool) -> Result<(), BlockError> {
    self.check_node(node)?;
    self.on_mesh_boundary[node as usize] = on_boundary;
    Ok(())
  }

  /// True when any link of `node` lands in `block`.
  #[inline]
  pub fn links_to_block(&self, node: NodeId, block: BlockId) -> bool {
    self.links(node).iter().any(|&l| self.owner(l) == block)
  }

  /// True when any link of `node` leaves its owning block.
  #[inline]
  pub fn has_foreign_link(&self, node: NodeId) -> bool {
    let owner = self.owner(node);
    self.links(node).iter().any(|&l| self.owner(l) != owner)
  }

  /// Distinct blocks other than `block` reached from `nodes`, in encounter
  /// order.
  pub fn neighbor_blocks(&self, block: BlockId, nodes: &[NodeId]) -> SmallVec<[BlockId; 8]> {
    let mut found: SmallVec<[BlockId; 8]> = SmallVec::new();
    for &node in nodes {
      for &link in self.links(node) {
        let owner = self.owner(link);
        if owner != block && !found.contains(&owner) {
          found.push(owner);
        }
      }
    }
    found
  }
}

#[cfg(test)]
#[path = "mesh_test.rs"]
mod mesh_test;
