//! Core data types shared by every blocking stage.

use std::fmt;

/// Global mesh node index.
pub type NodeId = u32;

/// Block index. Blocks are addressed by their position in the block slice.
pub type BlockId = u32;

/// Per-node processing flag.
///
/// The numeric values match the flag table consumed by the partitioner, so
/// the ordering `Interior < Boundary < Queued < Done` is meaningful: any flag
/// at or above `Boundary` marks a node of the boundary class.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum NodeFlag {
  /// Interior node, not yet visited.
  #[default]
  Interior = 1,

  /// Boundary node, not yet visited.
  Boundary = 2,

  /// Boundary node queued by the boundary walk.
  Queued = 3,

  /// Boundary node placed in the ordering.
  Done = 4,
}

impl NodeFlag {
  /// True for boundary-class flags (`Boundary`, `Queued`, `Done`).
  #[inline]
  pub fn is_boundary_class(self) -> bool {
    self >= NodeFlag::Boundary
  }

  /// Raw flag value.
  #[inline]
  pub fn value(self) -> u8 {
    self as u8
  }
}

/// Published slot address of a node inside its owning block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SlotCoord {
  pub column: u16,
  pub row: u16,
}

impl SlotCoord {
  #[inline]
  pub fn new(column: u16, row: u16) -> Self {
    Self { column, row }
  }
}

/// Monotonic processing stage of a block.
///
/// Stages only advance, except through the explicit resets in
/// [`lifecycle`](crate::lifecycle).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum BlockState {
  /// Shape still owned by the partitioner.
  #[default]
  Raw = 0,

  /// Node membership finalized.
  Shaped = 1,

  /// Every node has a slot and a published coordinate.
  Slotted = 2,

  /// Load-descriptor table packed.
  Linked = 3,
}

impl BlockState {
  /// Raw state tag value.
  #[inline]
  pub fn tag(self) -> u8 {
    self as u8
  }
}

impl fmt::Display for BlockState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      BlockState::Raw => "raw",
      BlockState::Shaped => "shaped",
      BlockState::Slotted => "slotted",
      BlockState::Linked => "linked",
    };
    write!(f, "{} ({})", name, self.tag())
  }
}

/// Number of contiguous access groups one load descriptor covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LoadWidth {
  One,
  Two,
  Four,
}

impl LoadWidth {
  /// Every width, widest first.
  pub const ALL: [LoadWidth; 3] = [LoadWidth::Four, LoadWidth::Two, LoadWidth::One];

  /// Access groups covered by a load of this width.
  #[inline]
  pub const fn groups(self) -> usize {
    match self {
      LoadWidth::One => 1,
      LoadWidth::Two => 2,
      LoadWidth::Four => 4,
    }
  }

  /// Bit mask of the covered groups when the load starts at group 0.
  #[inline]
  pub const fn mask(self) -> u8 {
    ((1u16 << self.groups()) - 1) as u8
  }

  /// Parse a raw width value (4, 2 or 1).
  pub fn from_groups(groups: u8) -> Option<Self> {
    match groups {
      1 => Some(LoadWidth::One),
      2 => Some(LoadWidth::Two),
      4 => Some(LoadWidth::Four),
      _ => None,
    }
  }

  /// Index into width-keyed arrays ordered widest first.
  #[inline]
  pub(crate) fn rank(self) -> usize {
    match self {
      LoadWidth::Four => 0,
      LoadWidth::Two => 1,
      LoadWidth::One => 2,
    }
  }
}

impl fmt::Display for LoadWidth {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.groups())
  }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;
