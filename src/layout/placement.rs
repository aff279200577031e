//! Deciding where a dragged item lands.
//!
//! Candidate regions are scored by the Euclidean distance from the query point to the centre of
//! the region. Candidates are scanned in reading order and the first minimum wins, so ties go to
//! the smallest row, then the smallest column.

use ordered_float::NotNan;

use super::grid::{Cell, GridOccupancy, Span};
use super::item::{Item, ItemId};
use super::page::{CellGeometry, Page};
use crate::utils::Point;

/// How close to the centre of a cell the pointer must be, as a fraction of the cell width, for
/// folder interactions with the item in that cell.
pub const FOLDER_INTERACTION_RADIUS: f64 = 0.55;

/// Candidate origin closest to `point`. A NaN point matches nothing.
fn nearest(
    origins: impl Iterator<Item = Cell>,
    geo: &CellGeometry,
    point: Point,
    span: Span,
) -> Option<Cell> {
    origins
        .filter_map(|origin| {
            let d = geo.region_center(origin, span).distance(point);
            NotNan::new(d).ok().map(|d| (d, origin))
        })
        .min_by_key(|&(d, _)| d)
        .map(|(_, origin)| origin)
}

/// Nearest region of `span` whose cells are all vacant, treating cells of `ignore` as vacant.
pub fn find_nearest_vacant_area(
    grid: &GridOccupancy,
    geo: &CellGeometry,
    point: Point,
    span: Span,
    ignore: Option<ItemId>,
) -> Option<Cell> {
    let vacant = grid
        .origins(span)
        .filter(|&origin| grid.is_region_vacant(origin, span, ignore));
    nearest(vacant, geo, point, span)
}

/// Nearest region of `span` regardless of occupancy.
///
/// Always returns a candidate: a span larger than the grid resolves to the top-left origin.
pub fn find_nearest_area(
    grid: &GridOccupancy,
    geo: &CellGeometry,
    point: Point,
    span: Span,
) -> Cell {
    let clamped = Span::new(span.x.min(grid.columns()), span.y.min(grid.rows()));
    nearest(grid.origins(clamped), geo, point, clamped).unwrap_or(Cell::new(0, 0))
}

/// What the dragged item is hovering over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverTarget {
    /// Nothing to interact with; the item would be placed normally.
    Placement,
    /// A folder that accepts the dragged item.
    Folder { cell: Cell, folder: ItemId },
    /// An item that can be combined with the dragged item into a new folder.
    FolderCandidate { cell: Cell, item: ItemId },
}

/// Resolves the folder interaction available at `point` for `dragged`.
pub fn resolve_hover(
    page: &Page,
    geo: &CellGeometry,
    point: Point,
    dragged: &Item,
    folder_capacity: usize,
) -> HoverTarget {
    let cell = find_nearest_area(page.grid(), geo, point, Span::ONE);
    let Some(occupant) = page.occupant(cell) else {
        return HoverTarget::Placement;
    };

    if occupant.id() == dragged.id {
        return HoverTarget::Placement;
    }

    let max_distance = FOLDER_INTERACTION_RADIUS * geo.cell_width();
    if geo.cell_center(cell).distance(point) > max_distance {
        return HoverTarget::Placement;
    }

    if occupant.folder_accepts(dragged, folder_capacity) {
        return HoverTarget::Folder {
            cell,
            folder: occupant.id(),
        };
    }

    if !occupant.is_folder()
        && folder_capacity >= 2
        && occupant.item.kind.is_shortcut_like()
        && dragged.kind.is_shortcut_like()
    {
        return HoverTarget::FolderCandidate {
            cell,
            item: occupant.id(),
        };
    }

    HoverTarget::Placement
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::item::{ItemKind, PlacedItem};
    use crate::layout::page::PageId;
    use crate::utils::Size;

    fn geometry() -> CellGeometry {
        CellGeometry {
            columns: 4,
            rows: 4,
            page_size: Size::new(400., 400.),
        }
    }

    fn page_with(items: &[(u64, ItemKind, Cell, Span)]) -> Page {
        let mut page = Page::new(PageId(1), 4, 4);
        for &(id, kind, cell, span) in items {
            let item = Item::new(id, kind).with_span(span);
            page.insert(PlacedItem::new(item, 0, cell)).unwrap();
        }
        page
    }

    #[test]
    fn vacant_area_prefers_nearest() {
        let geo = geometry();
        let page = page_with(&[(1, ItemKind::Application, Cell::new(1, 1), Span::ONE)]);

        // Pointer on the occupied cell: the closest free neighbour is above it in reading order.
        let found = find_nearest_vacant_area(
            page.grid(),
            &geo,
            Point::new(150., 150.),
            Span::ONE,
            None,
        );
        assert_eq!(found, Some(Cell::new(1, 0)));

        // Ignoring the occupant makes its own cell available.
        let found = find_nearest_vacant_area(
            page.grid(),
            &geo,
            Point::new(150., 150.),
            Span::ONE,
            Some(ItemId(1)),
        );
        assert_eq!(found, Some(Cell::new(1, 1)));
    }

    #[test]
    fn ties_break_in_reading_order() {
        let geo = geometry();
        let page = page_with(&[]);
        // Exactly at the corner shared by four cells.
        let found =
            find_nearest_vacant_area(page.grid(), &geo, Point::new(200., 200.), Span::ONE, None);
        assert_eq!(found, Some(Cell::new(1, 1)));
    }

    #[test]
    fn nan_point_finds_no_area() {
        let geo = geometry();
        let page = page_with(&[]);
        let point = Point::new(f64::NAN, 100.);

        let found = find_nearest_vacant_area(page.grid(), &geo, point, Span::ONE, None);
        assert_eq!(found, None);
        assert_eq!(
            find_nearest_area(page.grid(), &geo, point, Span::ONE),
            Cell::new(0, 0)
        );
    }

    #[test]
    fn vacant_area_scores_span_centre() {
        let geo = geometry();
        let page = page_with(&[]);
        // A 2x2 span centred on the pointer.
        let found = find_nearest_vacant_area(
            page.grid(),
            &geo,
            Point::new(300., 300.),
            Span::new(2, 2),
            None,
        );
        assert_eq!(found, Some(Cell::new(2, 2)));
    }

    #[test]
    fn no_vacant_area_for_span() {
        let geo = geometry();
        let page = page_with(&[
            (1, ItemKind::Widget, Cell::new(0, 0), Span::new(4, 2)),
            (2, ItemKind::Widget, Cell::new(0, 2), Span::new(3, 2)),
        ]);
        let found = find_nearest_vacant_area(
            page.grid(),
            &geo,
            Point::new(350., 350.),
            Span::new(2, 1),
            None,
        );
        assert_eq!(found, None);
        let found =
            find_nearest_vacant_area(page.grid(), &geo, Point::new(0., 0.), Span::ONE, None);
        assert_eq!(found, Some(Cell::new(3, 2)));
    }

    #[test]
    fn nearest_area_ignores_occupancy() {
        let geo = geometry();
        let page = page_with(&[(1, ItemKind::Application, Cell::new(1, 1), Span::ONE)]);
        let found = find_nearest_area(page.grid(), &geo, Point::new(150., 150.), Span::ONE);
        assert_eq!(found, Cell::new(1, 1));

        // Oversized spans still produce a candidate.
        let found = find_nearest_area(page.grid(), &geo, Point::new(150., 150.), Span::new(9, 9));
        assert_eq!(found, Cell::new(0, 0));
    }

    #[test]
    fn hover_over_shortcut_is_folder_candidate() {
        let geo = geometry();
        let page = page_with(&[(1, ItemKind::Shortcut, Cell::new(2, 2), Span::ONE)]);
        let dragged = Item::new(9, ItemKind::Application);

        assert_eq!(
            resolve_hover(&page, &geo, Point::new(250., 250.), &dragged, 16),
            HoverTarget::FolderCandidate {
                cell: Cell::new(2, 2),
                item: ItemId(1),
            }
        );

        // Near the edge of the cell is too far from its centre.
        assert_eq!(
            resolve_hover(&page, &geo, Point::new(295., 295.), &dragged, 16),
            HoverTarget::Placement
        );
    }

    #[test]
    fn hover_over_widget_is_plain_placement() {
        let geo = geometry();
        let page = page_with(&[(1, ItemKind::Widget, Cell::new(0, 0), Span::ONE)]);
        let dragged = Item::new(9, ItemKind::Application);
        assert_eq!(
            resolve_hover(&page, &geo, Point::new(50., 50.), &dragged, 16),
            HoverTarget::Placement
        );

        let dragged_widget = Item::new(10, ItemKind::Widget);
        let page = page_with(&[(1, ItemKind::Shortcut, Cell::new(0, 0), Span::ONE)]);
        assert_eq!(
            resolve_hover(&page, &geo, Point::new(50., 50.), &dragged_widget, 16),
            HoverTarget::Placement
        );
    }

    #[test]
    fn hover_over_folder_merges() {
        let geo = geometry();
        let page = page_with(&[(5, ItemKind::Folder, Cell::new(3, 0), Span::ONE)]);
        let dragged = Item::new(9, ItemKind::Shortcut);
        assert_eq!(
            resolve_hover(&page, &geo, Point::new(350., 50.), &dragged, 16),
            HoverTarget::Folder {
                cell: Cell::new(3, 0),
                folder: ItemId(5),
            }
        );
        // A full folder is just an obstacle.
        assert_eq!(
            resolve_hover(&page, &geo, Point::new(350., 50.), &dragged, 0),
            HoverTarget::Placement
        );
    }

    #[test]
    fn hovering_own_cell_is_placement() {
        let geo = geometry();
        let page = page_with(&[(1, ItemKind::Shortcut, Cell::new(0, 0), Span::ONE)]);
        let dragged = Item::new(1, ItemKind::Shortcut);
        assert_eq!(
            resolve_hover(&page, &geo, Point::new(50., 50.), &dragged, 16),
            HoverTarget::Placement
        );
    }
}
