//! Error and outcome types.
//!
//! Stages report three kinds of result:
//!
//! - **Fatal** conditions ([`BlockError`]) mean the mesh is malformed or an
//!   invariant was broken. They are returned as `Err` and should halt the run.
//! - **Retryable** and **capacity** conditions are ordinary values of
//!   [`Outcome`], so a driver can requeue or split the block.
//! - **Success** is `Outcome::Done`, or `Outcome::Skipped` when the block was
//!   already at or past the target state.

use std::fmt;

use thiserror::Error;

use crate::types::{BlockId, BlockState, NodeId};

/// Operation that raised an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
  MeshSetup,
  Partition,
  BoundaryOrdering,
  SlotMapping,
  LinkPacking,
  Lifecycle,
}

impl fmt::Display for Operation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      Operation::MeshSetup => "mesh setup",
      Operation::Partition => "partition",
      Operation::BoundaryOrdering => "boundary ordering",
      Operation::SlotMapping => "slot mapping",
      Operation::LinkPacking => "link packing",
      Operation::Lifecycle => "lifecycle",
    };
    f.write_str(name)
  }
}

/// Fatal structural error.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BlockError {
  #[error("{operation}: node {node} is out of range (mesh has {node_count} nodes)")]
  NodeOutOfRange {
    operation: Operation,
    block: Option<BlockId>,
    node: NodeId,
    node_count: usize,
  },

  #[error("mesh setup: node {node} already has {max_degree} links, cannot link node {other}")]
  DegreeOverflow {
    node: NodeId,
    other: NodeId,
    max_degree: usize,
  },

  #[error("partition: node {node} is owned by block {owner} but only {block_count} blocks exist")]
  UnknownOwner {
    node: NodeId,
    owner: BlockId,
    block_count: usize,
  },

  #[error("{operation}: block {block} does not exist ({block_count} blocks)")]
  UnknownBlock {
    operation: Operation,
    block: BlockId,
    block_count: usize,
  },

  #[error("{operation}: invalid geometry: {source}")]
  InvalidGeometry {
    operation: Operation,
    #[source]
    source: GeometryError,
  },

  #[error("boundary ordering: block {block} has zero size")]
  EmptyBlock { block: BlockId },

  #[error("{operation}: block {block} is {state}; its shape must be finalized first")]
  ShapeNotFinal {
    operation: Operation,
    block: BlockId,
    state: BlockState,
  },

  #[error(
    "boundary ordering: can't find a free boundary node in block {block} \
     (ordered {placed} of {expected})"
  )]
  NoFreeNode {
    block: BlockId,
    placed: usize,
    expected: usize,
  },

  #[error(
    "slot mapping: boundary order of block {block} is not a permutation of its \
     boundary nodes (node {node} is missing, repeated or foreign)"
  )]
  BoundaryOrderMismatch { block: BlockId, node: NodeId },

  #[error("link packing: block {block} is {state}; no slot assignments defined")]
  SlotsNotAssigned { block: BlockId, state: BlockState },

  #[error("link packing: no linked nodes found for block {block}")]
  NoLinkedNodes { block: BlockId },

  #[error(
    "link packing: block {block} reads node {node} of block {neighbor}, \
     which has no slot coordinate"
  )]
  UnmappedNode {
    block: BlockId,
    neighbor: BlockId,
    node: NodeId,
  },
}

impl BlockError {
  /// Operation that raised this error.
  pub fn operation(&self) -> Operation {
    match self {
      BlockError::NodeOutOfRange { operation, .. }
      | BlockError::UnknownBlock { operation, .. }
      | BlockError::ShapeNotFinal { operation, .. }
      | BlockError::InvalidGeometry { operation, .. } => *operation,
      BlockError::DegreeOverflow { .. } => Operation::MeshSetup,
      BlockError::UnknownOwner { .. } => Operation::Partition,
      BlockError::EmptyBlock { .. } | BlockError::NoFreeNode { .. } => Operation::BoundaryOrdering,
      BlockError::BoundaryOrderMismatch { .. } => Operation::SlotMapping,
      BlockError::SlotsNotAssigned { .. }
      | BlockError::NoLinkedNodes { .. }
      | BlockError::UnmappedNode { .. } => Operation::LinkPacking,
    }
  }

  /// Stable numeric code for diagnostics.
  pub fn code(&self) -> u32 {
    match self {
      BlockError::DegreeOverflow { .. } => 2401,
      BlockError::UnknownOwner { .. } => 2402,
      BlockError::UnknownBlock { .. } => 2403,
      BlockError::NodeOutOfRange { operation: Operation::MeshSetup, .. } => 2404,
      BlockError::InvalidGeometry { .. } => 2405,
      BlockError::EmptyBlock { .. } => 2409,
      BlockError::ShapeNotFinal { .. } => 2410,
      BlockError::NoFreeNode { .. } => 2411,
      BlockError::NodeOutOfRange { .. } => 2412,
      BlockError::UnmappedNode { .. } => 2413,
      BlockError::SlotsNotAssigned { .. } => 2414,
      BlockError::NoLinkedNodes { .. } => 2415,
      BlockError::BoundaryOrderMismatch { .. } => 2416,
    }
  }

  /// Block the error refers to, if any.
  pub fn block(&self) -> Option<BlockId> {
    match self {
      BlockError::NodeOutOfRange { block, .. } => *block,
      BlockError::DegreeOverflow { .. }
      | BlockError::UnknownOwner { .. }
      | BlockError::InvalidGeometry { .. } => None,
      BlockError::UnknownBlock { block, .. }
      | BlockError::EmptyBlock { block }
      | BlockError::ShapeNotFinal { block, .. }
      | BlockError::NoFreeNode { block, .. }
      | BlockError::BoundaryOrderMismatch { block, .. }
      | BlockError::SlotsNotAssigned { block, .. }
      | BlockError::NoLinkedNodes { block }
      | BlockError::UnmappedNode { block, .. } => Some(*block),
    }
  }
}

/// Geometry configuration error.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GeometryError {
  #[error("load catalogue is empty")]
  EmptyCatalogue,

  #[error("load width {0} is not one of 4, 2, 1")]
  UnknownWidth(u8),

  #[error("load catalogue must be widest first (position {position} is wider than its predecessor)")]
  CatalogueOrder { position: usize },

  #[error("slot grid dimensions must be >= 1 (got {width} x {height})")]
  ZeroDimension { width: usize, height: usize },

  #[error("slot width {slot_width} must equal 4 access groups of {group_width} columns")]
  GroupMismatch {
    slot_width: usize,
    group_width: usize,
  },

  #[error("rows per neighbor must be in 1..={max} (got {rows})")]
  RowsPerNeighbor { rows: usize, max: usize },

  #[error("slot grid height {height} exceeds the descriptor row range {max}")]
  GridTooTall { height: usize, max: usize },
}

/// Why a block must be split before it can be mapped or packed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SplitReason {
  /// More boundary nodes than the boundary limit.
  OverCapacity { boundary: usize, max: usize },

  /// More nodes than slots in the grid.
  GridOverflow { nodes: usize, slots: usize },

  /// A neighbor node sits below the rows addressable per neighbor.
  RowOverflow {
    neighbor: BlockId,
    node: NodeId,
    row: usize,
    rows_per_neighbor: usize,
  },

  /// The load catalogue cannot cover the connectivity bitmap.
  PackingOverflow { bits: u32, slots: usize },
}

impl fmt::Display for SplitReason {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      SplitReason::OverCapacity { boundary, max } => {
        write!(f, "too many boundary nodes: {} (max {})", boundary, max)
      }
      SplitReason::GridOverflow { nodes, slots } => {
        write!(f, "{} nodes do not fit in {} slots", nodes, slots)
      }
      SplitReason::RowOverflow {
        neighbor,
        node,
        row,
        rows_per_neighbor,
      } => write!(
        f,
        "node {} of block {} sits in row {} (only {} rows addressable)",
        node, neighbor, row, rows_per_neighbor
      ),
      SplitReason::PackingOverflow { bits, slots } => {
        write!(f, "too many loads required: {} groups over {} slots", bits, slots)
      }
    }
  }
}

/// Non-fatal result of a stage.
#[must_use]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome<T> {
  /// Stage ran and the block advanced.
  Done(T),

  /// Block was already at or past the target state; nothing changed.
  Skipped,

  /// A neighbor has not reached the required state yet. Requeue the block.
  RetryLater { neighbor: BlockId },

  /// The block's shape does not fit the hardware limits.
  NeedsSplit(SplitReason),
}

impl<T> Outcome<T> {
  /// True for `Done` and `Skipped`.
  #[inline]
  pub fn is_success(&self) -> bool {
    matches!(self, Outcome::Done(_) | Outcome::Skipped)
  }

  #[inline]
  pub fn is_done(&self) -> bool {
    matches!(self, Outcome::Done(_))
  }

  #[inline]
  pub fn is_skipped(&self) -> bool {
    matches!(self, Outcome::Skipped)
  }

  #[inline]
  pub fn is_retry(&self) -> bool {
    matches!(self, Outcome::RetryLater { .. })
  }

  /// Split reason, if the block needs splitting.
  #[inline]
  pub fn split_reason(&self) -> Option<SplitReason> {
    match self {
      Outcome::NeedsSplit(reason) => Some(*reason),
      _ => None,
    }
  }

  /// Value carried by `Done`.
  pub fn done(self) -> Option<T> {
    match self {
      Outcome::Done(value) => Some(value),
      _ => None,
    }
  }

  /// Map the `Done` value, keeping every other variant.
  pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U> {
    match self {
      Outcome::Done(value) => Outcome::Done(f(value)),
      Outcome::Skipped => Outcome::Skipped,
      Outcome::RetryLater { neighbor } => Outcome::RetryLater { neighbor },
      Outcome::NeedsSplit(reason) => Outcome::NeedsSplit(reason),
    }
  }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;
