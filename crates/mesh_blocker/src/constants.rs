//! Default hardware geometry for accelerator memory blocks.
//!
//! These constants describe the reference accelerator layout. Every value can
//! be overridden through [`BlockGeometry`](crate::geometry::BlockGeometry);
//! the constants only seed its `Default` impl.
//!
//! # Slot Grid Layout
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         BLOCK SLOT GRID (16 x 16)                       │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  column:   0  1  2  3 │ 4  5  6  7 │ 8  9 10 11 │12 13 14 15            │
//! │           └─ group 0 ─┘└─ group 1 ─┘└─ group 2 ─┘└─ group 3 ─┘          │
//! │  row 0:   [boundary nodes in cyclic order .......................]      │
//! │  row 1:   [... boundary continues, then interior nodes ..........]      │
//! │  ...                                                                    │
//! │  row 15:  [interior nodes, trailing slots left empty]                   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Slots are filled row-major, so slot `i` sits at
//! `(column, row) = (i % SLOT_WIDTH, i / SLOT_WIDTH)`.
//!
//! # Access Bitmap
//!
//! The accelerator fetches neighbor memory one row at a time, in groups of
//! `GROUP_WIDTH` columns. Each neighbor block contributes `ROWS_PER_NEIGHBOR`
//! rows to a block's connectivity bitmap; every row is a 4-bit mask with bit
//! `g` set when group `g` of that neighbor row holds a node this block reads.
//!
//! ```text
//! bitmap row = neighbor_index * ROWS_PER_NEIGHBOR + neighbor_row
//! bit        = column / GROUP_WIDTH            (column >> 2 by default)
//! ```
//!
//! # Load Descriptor Encoding
//!
//! ```text
//! descriptor = block << 8 | row << 4 | column_group
//! ```

/// Slot grid width in columns.
pub const SLOT_WIDTH: usize = 16;

/// Slot grid height in rows.
pub const SLOT_HEIGHT: usize = 16;

/// Total slots in a block (16 x 16 = 256).
pub const SLOT_COUNT: usize = SLOT_WIDTH * SLOT_HEIGHT;

/// Number of access groups per row. Fixed: bitmap rows are 4-bit masks.
pub const ACCESS_GROUPS: usize = 4;

/// Mask covering every access group of a row (0b1111).
pub const ROW_MASK: u8 = (1 << ACCESS_GROUPS) - 1;

/// Columns per access group.
pub const GROUP_WIDTH: usize = SLOT_WIDTH / ACCESS_GROUPS;

/// Maximum number of boundary nodes a block may own.
pub const MAX_BOUNDARY: usize = 64;

/// Bitmap rows contributed by each neighbor block.
pub const ROWS_PER_NEIGHBOR: usize = 4;

/// Largest row index a load descriptor can carry (4-bit field).
pub const MAX_DESCRIPTOR_ROWS: usize = 16;

/// Shift of the block id inside an encoded descriptor.
pub const DESCRIPTOR_BLOCK_SHIFT: u32 = 8;

/// Shift of the row inside an encoded descriptor.
pub const DESCRIPTOR_ROW_SHIFT: u32 = 4;

/// Default load-width catalogue, widest first. Its length is the size of
/// every block's load-descriptor table.
pub const DEFAULT_LOAD_WIDTHS: [u8; 16] = [4, 4, 4, 4, 2, 2, 2, 2, 2, 2, 1, 1, 1, 1, 1, 1];

/// Default maximum number of links per node in the adjacency table.
pub const DEFAULT_MAX_DEGREE: usize = 8;

/// Convert a slot index to `(column, row)` for a grid of the given width.
#[inline(always)]
pub const fn slot_to_coord(index: usize, width: usize) -> (usize, usize) {
  (index % width, index / width)
}

/// Convert `(column, row)` to a slot index for a grid of the given width.
#[inline(always)]
pub const fn coord_to_slot(column: usize, row: usize, width: usize) -> usize {
  row * width + column
}

#[cfg(test)]
#[path = "constants_test.rs"]
mod constants_test;
