//! BlockGeometry - hardware geometry configuration for block mapping and
//! link packing.

use crate::constants::{
  ACCESS_GROUPS, DEFAULT_LOAD_WIDTHS, GROUP_WIDTH, MAX_BOUNDARY, MAX_DESCRIPTOR_ROWS,
  ROWS_PER_NEIGHBOR, SLOT_HEIGHT, SLOT_WIDTH,
};
use crate::error::{BlockError, GeometryError, Operation};
use crate::types::LoadWidth;

/// Fixed sequence of load widths every block must pack into, widest first.
///
/// The catalogue length is the size of each block's load-descriptor table;
/// position `i` of the table always holds a load of width `widths()[i]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadCatalogue {
  widths: Vec<LoadWidth>,
}

impl LoadCatalogue {
  /// Build a catalogue, rejecting empty or not-widest-first sequences.
  pub fn new(widths: Vec<LoadWidth>) -> Result<Self, GeometryError> {
    if widths.is_empty() {
      return Err(GeometryError::EmptyCatalogue);
    }
    if let Some(position) = widths.windows(2).position(|w| w[1] > w[0]) {
      return Err(GeometryError::CatalogueOrder {
        position: position + 1,
      });
    }
    Ok(Self { widths })
  }

  /// Build a catalogue from raw width values (4, 2, 1).
  pub fn from_groups(groups: &[u8]) -> Result<Self, GeometryError> {
    let widths = groups
      .iter()
      .map(|&g| LoadWidth::from_groups(g).ok_or(GeometryError::UnknownWidth(g)))
      .collect::<Result<Vec<_>, _>>()?;
    Self::new(widths)
  }

  /// Widths in table order.
  #[inline]
  pub fn widths(&self) -> &[LoadWidth] {
    &self.widths
  }

  /// Width at a table position.
  #[inline]
  pub fn get(&self, position: usize) -> Option<LoadWidth> {
    self.widths.get(position).copied()
  }

  /// Number of descriptor slots.
  #[inline]
  pub fn len(&self) -> usize {
    self.widths.len()
  }

  /// Always false; catalogues are never empty.
  #[inline]
  pub fn is_empty(&self) -> bool {
    self.widths.is_empty()
  }

  /// Total access groups the whole table can cover.
  pub fn capacity(&self) -> usize {
    self.widths.iter().map(|w| w.groups()).sum()
  }

  /// Number of slots of each width, widest first.
  pub fn slots_by_width(&self) -> [usize; 3] {
    let mut counts = [0; 3];
    for width in &self.widths {
      counts[width.rank()] += 1;
    }
    counts
  }
}

impl Default for LoadCatalogue {
  fn default() -> Self {
    Self {
      widths: DEFAULT_LOAD_WIDTHS
        .iter()
        .filter_map(|&g| LoadWidth::from_groups(g))
        .collect(),
    }
  }
}

/// Allocator used by the link packer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PackStrategy {
  /// Priority-ordered pattern matching, one width tier at a time.
  #[default]
  Greedy,

  /// Backtracking search that finds a packing whenever one exists.
  Exact,
}

/// Hardware geometry for one accelerator configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockGeometry {
  /// Slot grid width in columns.
  pub slot_width: usize,

  /// Slot grid height in rows.
  pub slot_height: usize,

  /// Columns per access group. `slot_width` must equal 4 groups.
  pub group_width: usize,

  /// Maximum boundary nodes per block.
  pub max_boundary: usize,

  /// Bitmap rows contributed by each neighbor block.
  pub rows_per_neighbor: usize,

  /// Load widths every block packs into.
  pub catalogue: LoadCatalogue,

  /// Allocator used by [`pack_links`](crate::link::pack_links).
  pub strategy: PackStrategy,
}

impl BlockGeometry {
  /// Total slots per block.
  #[inline]
  pub fn slot_count(&self) -> usize {
    self.slot_width * self.slot_height
  }

  /// Access group of a slot column.
  #[inline]
  pub fn group_of(&self, column: usize) -> usize {
    column / self.group_width
  }

  /// Replace the load catalogue.
  pub fn with_catalogue(mut self, catalogue: LoadCatalogue) -> Self {
    self.catalogue = catalogue;
    self
  }

  /// Replace the packing strategy.
  pub fn with_strategy(mut self, strategy: PackStrategy) -> Self {
    self.strategy = strategy;
    self
  }

  pub fn validate(&self) -> Result<(), GeometryError> {
    if self.slot_width == 0 || self.slot_height == 0 || self.group_width == 0 {
      return Err(GeometryError::ZeroDimension {
        width: self.slot_width,
        height: self.slot_height,
      });
    }
    if self.group_width * ACCESS_GROUPS != self.slot_width {
      return Err(GeometryError::GroupMismatch {
        slot_width: self.slot_width,
        group_width: self.group_width,
      });
    }
    if self.rows_per_neighbor == 0 || self.rows_per_neighbor > MAX_DESCRIPTOR_ROWS {
      return Err(GeometryError::RowsPerNeighbor {
        rows: self.rows_per_neighbor,
        max: MAX_DESCRIPTOR_ROWS,
      });
    }
    if self.slot_height > MAX_DESCRIPTOR_ROWS {
      return Err(GeometryError::GridTooTall {
        height: self.slot_height,
        max: MAX_DESCRIPTOR_ROWS,
      });
    }
    if self.catalogue.is_empty() {
      return Err(GeometryError::EmptyCatalogue);
    }
    Ok(())
  }

  /// [`validate`](Self::validate) as a fatal error of `operation`.
  pub(crate) fn check(&self, operation: Operation) -> Result<(), BlockError> {
    self
      .validate()
      .map_err(|source| BlockError::InvalidGeometry { operation, source })
  }
}

impl Default for BlockGeometry {
  fn default() -> Self {
    Self {
      slot_width: SLOT_WIDTH,
      slot_height: SLOT_HEIGHT,
      group_width: GROUP_WIDTH,
      max_boundary: MAX_BOUNDARY,
      rows_per_neighbor: ROWS_PER_NEIGHBOR,
      catalogue: LoadCatalogue::default(),
      strategy: PackStrategy::Greedy,
    }
  }
}

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;
