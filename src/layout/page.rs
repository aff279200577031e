use std::fmt;

use serde::Serialize;

use super::grid::{Cell, GridOccupancy, Span};
use super::item::{ItemId, PlacedItem};
use crate::utils::{Point, Size};

/// In-memory identity of a page, stable across reorders.
///
/// Unlike the page index, this is never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PageId(pub u64);

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Maps between page-local points and cells.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellGeometry {
    pub columns: usize,
    pub rows: usize,
    pub page_size: Size,
}

impl CellGeometry {
    pub fn cell_width(&self) -> f64 {
        self.page_size.w / self.columns as f64
    }

    pub fn cell_height(&self) -> f64 {
        self.page_size.h / self.rows as f64
    }

    /// Centre of the rectangle covered by `span` placed at `origin`.
    pub fn region_center(&self, origin: Cell, span: Span) -> Point {
        Point::new(
            (origin.x as f64 + span.x as f64 / 2.) * self.cell_width(),
            (origin.y as f64 + span.y as f64 / 2.) * self.cell_height(),
        )
    }

    pub fn cell_center(&self, cell: Cell) -> Point {
        self.region_center(cell, Span::ONE)
    }

    /// The cell containing the point, clamped into the grid.
    pub fn cell_at(&self, point: Point) -> Cell {
        let x = (point.x / self.cell_width()).floor().max(0.) as usize;
        let y = (point.y / self.cell_height()).floor().max(0.) as usize;
        Cell::new(
            x.min(self.columns.saturating_sub(1)),
            y.min(self.rows.saturating_sub(1)),
        )
    }
}

/// One screen of the canvas.
#[derive(Debug, Clone)]
pub struct Page {
    id: PageId,
    grid: GridOccupancy,
    items: Vec<PlacedItem>,
}

impl Page {
    pub fn new(id: PageId, columns: usize, rows: usize) -> Self {
        Self {
            id,
            grid: GridOccupancy::new(columns, rows),
            items: Vec::new(),
        }
    }

    pub fn id(&self) -> PageId {
        self.id
    }

    pub fn grid(&self) -> &GridOccupancy {
        &self.grid
    }

    pub fn items(&self) -> &[PlacedItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item(&self, id: ItemId) -> Option<&PlacedItem> {
        self.items.iter().find(|placed| placed.id() == id)
    }

    pub fn item_mut(&mut self, id: ItemId) -> Option<&mut PlacedItem> {
        self.items.iter_mut().find(|placed| placed.id() == id)
    }

    pub fn occupant(&self, cell: Cell) -> Option<&PlacedItem> {
        self.grid.occupant(cell).and_then(|id| self.item(id))
    }

    /// Places an item, marking its cells.
    ///
    /// Returns the item back if its region is not vacant.
    pub fn insert(&mut self, placed: PlacedItem) -> Result<(), PlacedItem> {
        if !self.grid.mark(placed.cell, placed.span(), placed.id()) {
            return Err(placed);
        }
        self.items.push(placed);
        Ok(())
    }

    pub fn remove(&mut self, id: ItemId) -> Option<PlacedItem> {
        let idx = self.items.iter().position(|placed| placed.id() == id)?;
        self.grid.clear_item(id);
        Some(self.items.remove(idx))
    }

    /// Removes every item.
    pub fn clear(&mut self) -> Vec<PlacedItem> {
        self.grid.clear();
        std::mem::take(&mut self.items)
    }

    /// Sets the stored page index of every item.
    pub fn relabel(&mut self, index: usize) {
        for placed in &mut self.items {
            placed.page = index;
        }
    }

    #[cfg(test)]
    pub fn verify_invariants(&self, index: usize) {
        let mut grid = GridOccupancy::new(self.grid.columns(), self.grid.rows());
        for placed in &self.items {
            assert_eq!(placed.page, index, "item {} has a stale page index", placed.id());
            assert!(
                grid.mark(placed.cell, placed.span(), placed.id()),
                "item {} overlaps another item or leaves the grid",
                placed.id()
            );
            if !placed.is_folder() {
                assert!(placed.contents.is_empty(), "only folders have contents");
            }
        }
        assert_eq!(grid, self.grid, "occupancy must match the placed items");
    }
}
