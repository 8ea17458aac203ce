//! Occupancy grid for a single floor.
//!
//! A floor is a fixed `width × length` grid of cells (columns × rows). Every
//! cell is either empty or references exactly one placed item. Items cover a
//! rectangular footprint anchored at their top-left cell; placement is
//! all-or-nothing and removal always clears the whole item.
//!
//! ```
//! use officeplan_logic::catalog::{ItemKind, ItemSpec};
//! use officeplan_logic::grid::{Cell, OccupancyGrid};
//!
//! let mut grid = OccupancyGrid::new(5, 5).unwrap();
//! let desk = ItemSpec::menu(ItemKind::TableSmall);
//! grid.place(desk, Cell::new(0, 0)).unwrap();
//! assert!(grid.is_occupied(Cell::new(0, 1)));
//! grid.remove(Cell::new(0, 1));
//! assert!(grid.is_empty());
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::ItemSpec;

/// A zero-based `(row, col)` cell coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub row: u32,
    pub col: u32,
}

impl Cell {
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Rectangular cell extent of an item: `width` columns by `height` rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Footprint {
    pub width: u32,
    pub height: u32,
}

impl Footprint {
    pub const UNIT: Footprint = Footprint::new(1, 1);

    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl fmt::Display for Footprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}×{}", self.width, self.height)
    }
}

/// Grid-local identifier of a placed item. Never reused within one grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemHandle(u32);

impl ItemHandle {
    pub fn raw(self) -> u32 {
        self.0
    }
}

/// An item sitting on the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedItem {
    pub handle: ItemHandle,
    pub spec: ItemSpec,
    pub anchor: Cell,
}

impl PlacedItem {
    pub fn footprint(&self) -> Footprint {
        self.spec.footprint
    }

    /// Every cell covered by this item, row-major.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        footprint_cells(self.anchor, self.spec.footprint)
    }

    pub fn covers(&self, cell: Cell) -> bool {
        let fp = self.spec.footprint;
        cell.row >= self.anchor.row
            && cell.col >= self.anchor.col
            && u64::from(cell.row) < u64::from(self.anchor.row) + u64::from(fp.height)
            && u64::from(cell.col) < u64::from(self.anchor.col) + u64::from(fp.width)
    }
}

/// Cells covered by `footprint` anchored at `anchor`, row-major.
pub fn footprint_cells(anchor: Cell, footprint: Footprint) -> impl Iterator<Item = Cell> {
    (0..footprint.height).flat_map(move |r| {
        (0..footprint.width).map(move |c| Cell::new(anchor.row + r, anchor.col + c))
    })
}

/// Invalid grid construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("grid dimensions must be positive, got {width}×{length}")]
    ZeroDimension { width: u32, length: u32 },
    #[error("grid of {width}×{length} cells is too large")]
    TooLarge { width: u32, length: u32 },
}

/// Why a placement was rejected. The grid is unchanged in every case.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaceError {
    #[error("item footprint {0} must be at least 1×1")]
    EmptyFootprint(Footprint),
    #[error("item {footprint} at {anchor} does not fit in the {width}×{length} grid")]
    OutOfBounds {
        anchor: Cell,
        footprint: Footprint,
        width: u32,
        length: u32,
    },
    #[error("space is already occupied at {cell}")]
    Occupied { cell: Cell, by: ItemHandle },
}

/// Upper bound on cell count; keeps the flat cell vector sane.
pub const MAX_CELLS: u64 = 1 << 24;

/// Fixed-size occupancy grid. Cells are stored flat, `row * width + col`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccupancyGrid {
    width: u32,
    length: u32,
    cells: Vec<Option<ItemHandle>>,
    items: BTreeMap<ItemHandle, PlacedItem>,
    next_handle: u32,
}

impl OccupancyGrid {
    /// Create an empty grid with `width` columns and `length` rows.
    pub fn new(width: u32, length: u32) -> Result<Self, GridError> {
        if width == 0 || length == 0 {
            return Err(GridError::ZeroDimension { width, length });
        }
        let count = u64::from(width) * u64::from(length);
        if count > MAX_CELLS {
            return Err(GridError::TooLarge { width, length });
        }
        Ok(Self {
            width,
            length,
            cells: vec![None; count as usize],
            items: BTreeMap::new(),
            next_handle: 0,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn length(&self) -> u32 {
        self.length
    }

    /// Raw cell slots in linear order.
    pub fn cells(&self) -> &[Option<ItemHandle>] {
        &self.cells
    }

    /// Linear index of `cell`, or `None` if outside the grid.
    pub fn index_of(&self, cell: Cell) -> Option<usize> {
        if cell.row >= self.length || cell.col >= self.width {
            return None;
        }
        Some(cell.row as usize * self.width as usize + cell.col as usize)
    }

    /// Cell coordinate of a linear index.
    pub fn cell_at(&self, index: usize) -> Option<Cell> {
        if index >= self.cells.len() {
            return None;
        }
        let width = self.width as usize;
        Some(Cell::new((index / width) as u32, (index % width) as u32))
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.index_of(cell).is_some()
    }

    pub fn handle_at(&self, cell: Cell) -> Option<ItemHandle> {
        self.index_of(cell).and_then(|i| self.cells[i])
    }

    pub fn item_at(&self, cell: Cell) -> Option<&PlacedItem> {
        self.handle_at(cell).and_then(|h| self.items.get(&h))
    }

    pub fn item(&self, handle: ItemHandle) -> Option<&PlacedItem> {
        self.items.get(&handle)
    }

    pub fn is_occupied(&self, cell: Cell) -> bool {
        self.handle_at(cell).is_some()
    }

    /// Placed items in placement order.
    pub fn items(&self) -> impl Iterator<Item = &PlacedItem> {
        self.items.values()
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Check whether `footprint` could be placed at `anchor`, without mutating.
    ///
    /// Bounds are checked before availability, so an oversized item reports
    /// `OutOfBounds` even if the in-bounds part is also occupied.
    pub fn check_placement(&self, footprint: Footprint, anchor: Cell) -> Result<(), PlaceError> {
        if footprint.is_empty() {
            return Err(PlaceError::EmptyFootprint(footprint));
        }
        let fits_rows =
            u64::from(anchor.row) + u64::from(footprint.height) <= u64::from(self.length);
        let fits_cols = u64::from(anchor.col) + u64::from(footprint.width) <= u64::from(self.width);
        if !fits_rows || !fits_cols {
            return Err(PlaceError::OutOfBounds {
                anchor,
                footprint,
                width: self.width,
                length: self.length,
            });
        }
        for cell in footprint_cells(anchor, footprint) {
            if let Some(by) = self.handle_at(cell) {
                return Err(PlaceError::Occupied { cell, by });
            }
        }
        Ok(())
    }

    /// Place `spec` with its top-left corner at `anchor`.
    ///
    /// Either every covered cell is written or none is.
    pub fn place(&mut self, spec: ItemSpec, anchor: Cell) -> Result<ItemHandle, PlaceError> {
        self.check_placement(spec.footprint, anchor)?;

        let handle = ItemHandle(self.next_handle);
        self.next_handle += 1;
        for cell in footprint_cells(anchor, spec.footprint) {
            if let Some(i) = self.index_of(cell) {
                self.cells[i] = Some(handle);
            }
        }
        log::debug!(
            "placed {} ({}) at {} as #{}",
            spec.label,
            spec.footprint,
            anchor,
            handle.0
        );
        self.items.insert(
            handle,
            PlacedItem {
                handle,
                spec,
                anchor,
            },
        );
        Ok(handle)
    }

    /// Remove whatever item covers `cell`. Empty or out-of-range cells are a no-op.
    pub fn remove(&mut self, cell: Cell) -> Option<PlacedItem> {
        let handle = self.handle_at(cell)?;
        self.remove_item(handle)
    }

    /// Remove an item by handle, clearing every cell of its footprint.
    pub fn remove_item(&mut self, handle: ItemHandle) -> Option<PlacedItem> {
        let item = self.items.remove(&handle)?;
        for cell in item.cells() {
            if let Some(i) = self.index_of(cell) {
                if self.cells[i] == Some(handle) {
                    self.cells[i] = None;
                }
            }
        }
        log::debug!("removed {} from {}", item.spec.label, item.anchor);
        Some(item)
    }

    /// First anchor in row-major order where `footprint` fits.
    pub fn first_free_anchor(&self, footprint: Footprint) -> Option<Cell> {
        if footprint.is_empty() || footprint.width > self.width || footprint.height > self.length {
            return None;
        }
        (0..=self.length - footprint.height)
            .flat_map(|row| (0..=self.width - footprint.width).map(move |col| Cell::new(row, col)))
            .find(|&anchor| self.check_placement(footprint, anchor).is_ok())
    }

    /// Remove every item.
    pub fn clear(&mut self) {
        self.cells.iter_mut().for_each(|c| *c = None);
        self.items.clear();
    }
}

/// ASCII map, one line per row: `.` for empty, the item kind's symbol otherwise.
impl fmt::Display for OccupancyGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.length {
            for col in 0..self.width {
                let ch = self
                    .item_at(Cell::new(row, col))
                    .map_or('.', |item| item.spec.kind.symbol());
                write!(f, "{ch}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
