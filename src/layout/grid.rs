//! Per-page cell occupancy.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::item::ItemId;

/// Grid coordinate, `x` is the column and `y` the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub x: usize,
    pub y: usize,
}

impl Cell {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// Number of columns and rows an item covers. Both are at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub x: usize,
    pub y: usize,
}

impl Span {
    pub const ONE: Span = Span { x: 1, y: 1 };

    pub fn new(x: usize, y: usize) -> Self {
        Self {
            x: x.max(1),
            y: y.max(1),
        }
    }
}

/// Which item, if any, covers each cell of a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridOccupancy {
    columns: usize,
    rows: usize,
    cells: Vec<Option<ItemId>>,
}

impl GridOccupancy {
    pub fn new(columns: usize, rows: usize) -> Self {
        Self {
            columns,
            rows,
            cells: vec![None; columns * rows],
        }
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    fn idx(&self, cell: Cell) -> Option<usize> {
        (cell.x < self.columns && cell.y < self.rows).then(|| cell.y * self.columns + cell.x)
    }

    /// Whether a span placed at `origin` stays inside the grid.
    pub fn fits(&self, origin: Cell, span: Span) -> bool {
        origin.x + span.x <= self.columns && origin.y + span.y <= self.rows
    }

    pub fn occupant(&self, cell: Cell) -> Option<ItemId> {
        self.idx(cell).and_then(|idx| self.cells[idx])
    }

    pub fn is_occupied(&self, cell: Cell) -> bool {
        self.occupant(cell).is_some()
    }

    fn region(origin: Cell, span: Span) -> impl Iterator<Item = Cell> {
        (origin.y..origin.y + span.y)
            .flat_map(move |y| (origin.x..origin.x + span.x).map(move |x| Cell::new(x, y)))
    }

    /// Whether every cell of the region is free, treating cells of `ignore` as free.
    ///
    /// Regions that do not fit in the grid are never vacant.
    pub fn is_region_vacant(&self, origin: Cell, span: Span, ignore: Option<ItemId>) -> bool {
        if !self.fits(origin, span) {
            return false;
        }

        Self::region(origin, span).all(|cell| match self.occupant(cell) {
            None => true,
            Some(id) => Some(id) == ignore,
        })
    }

    /// Marks the region as covered by `id`.
    ///
    /// Returns `false` and changes nothing if the region does not fit or overlaps another item.
    pub fn mark(&mut self, origin: Cell, span: Span, id: ItemId) -> bool {
        if !self.is_region_vacant(origin, span, Some(id)) {
            return false;
        }

        for cell in Self::region(origin, span) {
            let idx = cell.y * self.columns + cell.x;
            self.cells[idx] = Some(id);
        }
        true
    }

    /// Frees every cell covered by `id`.
    pub fn clear_item(&mut self, id: ItemId) {
        for cell in &mut self.cells {
            if *cell == Some(id) {
                *cell = None;
            }
        }
    }

    pub fn clear(&mut self) {
        self.cells.fill(None);
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }

    /// Whether any region of the given span is vacant.
    pub fn has_vacancy(&self, span: Span, ignore: Option<ItemId>) -> bool {
        self.origins(span)
            .any(|origin| self.is_region_vacant(origin, span, ignore))
    }

    /// Every origin where `span` fits, in reading order.
    pub fn origins(&self, span: Span) -> impl Iterator<Item = Cell> {
        let max_x = (self.columns + 1).saturating_sub(span.x);
        let max_y = (self.rows + 1).saturating_sub(span.y);
        (0..max_y).flat_map(move |y| (0..max_x).map(move |x| Cell::new(x, y)))
    }
}

/// Draws the grid with one character per cell: `.` when vacant, otherwise the last base-36 digit
/// of the occupant id.
impl fmt::Display for GridOccupancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.columns.max(1)) {
            for cell in row {
                let c = match cell {
                    None => '.',
                    Some(ItemId(id)) => char::from_digit((id % 36) as u32, 36).unwrap_or('?'),
                };
                write!(f, "{c}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;

    use super::*;

    #[test]
    fn mark_and_query() {
        let mut grid = GridOccupancy::new(4, 3);
        assert!(grid.is_empty());
        assert!(grid.mark(Cell::new(1, 1), Span::new(2, 2), ItemId(7)));
        assert_eq!(grid.occupant(Cell::new(2, 2)), Some(ItemId(7)));
        assert_eq!(grid.occupant(Cell::new(0, 0)), None);
        assert_eq!(grid.occupied_count(), 4);

        assert_snapshot!(grid.to_string(), @r"
        ....
        .77.
        .77.
        ");
    }

    #[test]
    fn overlapping_mark_is_rejected() {
        let mut grid = GridOccupancy::new(4, 4);
        assert!(grid.mark(Cell::new(0, 0), Span::new(2, 2), ItemId(1)));
        assert!(!grid.mark(Cell::new(1, 1), Span::new(2, 2), ItemId(2)));
        assert_eq!(grid.occupant(Cell::new(2, 2)), None);
        assert_eq!(grid.occupied_count(), 4);
    }

    #[test]
    fn out_of_bounds_mark_is_rejected() {
        let mut grid = GridOccupancy::new(4, 4);
        assert!(!grid.mark(Cell::new(3, 0), Span::new(2, 1), ItemId(1)));
        assert!(grid.is_empty());
    }

    #[test]
    fn ignore_treats_own_cells_as_free() {
        let mut grid = GridOccupancy::new(4, 4);
        grid.mark(Cell::new(0, 0), Span::new(2, 1), ItemId(1));
        assert!(!grid.is_region_vacant(Cell::new(1, 0), Span::new(2, 1), None));
        assert!(grid.is_region_vacant(Cell::new(1, 0), Span::new(2, 1), Some(ItemId(1))));
        assert!(!grid.is_region_vacant(Cell::new(1, 0), Span::new(2, 1), Some(ItemId(2))));
    }

    #[test]
    fn clear_item_frees_its_cells() {
        let mut grid = GridOccupancy::new(3, 3);
        grid.mark(Cell::new(0, 0), Span::new(3, 1), ItemId(1));
        grid.mark(Cell::new(0, 1), Span::ONE, ItemId(2));
        grid.clear_item(ItemId(1));
        assert_eq!(grid.occupied_count(), 1);
        assert_eq!(grid.occupant(Cell::new(0, 1)), Some(ItemId(2)));
    }

    #[test]
    fn origins_respect_span() {
        let grid = GridOccupancy::new(3, 2);
        let origins: Vec<_> = grid.origins(Span::new(2, 2)).collect();
        assert_eq!(origins, vec![Cell::new(0, 0), Cell::new(1, 0)]);
        assert_eq!(grid.origins(Span::new(4, 1)).count(), 0);
    }

    #[test]
    fn vacancy_detection() {
        let mut grid = GridOccupancy::new(2, 2);
        grid.mark(Cell::new(0, 0), Span::ONE, ItemId(1));
        grid.mark(Cell::new(1, 1), Span::ONE, ItemId(2));
        assert!(grid.has_vacancy(Span::ONE, None));
        assert!(!grid.has_vacancy(Span::new(2, 1), None));
        assert!(grid.has_vacancy(Span::new(2, 1), Some(ItemId(1))));
    }
}
