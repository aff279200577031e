//! Layout of the paged canvas.
//!
//! The canvas is a horizontal strip of [`Page`]s, each a grid of cells holding items. The user
//! scrolls between pages, drags items between cells and pages, and in the preview layout drags
//! whole pages around to reorder them.
//!
//! [`Canvas`] owns every piece of interaction state. Its methods are split by concern across
//! `layout_impl/`:
//!
//! - `drag.rs`: item drags, folder creation and page hover
//! - `pages.rs`: preview mode, page reordering, adding and deleting pages
//! - `render.rs`: per-frame page transforms
//!
//! Nothing here blocks or runs in the background except the persistence worker. Time comes from
//! the [`Clock`]; timers are [`Alarm`](crate::utils::alarm::Alarm)s checked in
//! [`Canvas::advance_animations`].

use std::rc::Rc;
use std::time::Duration;

use deckgrid_config::{Config, TransitionEffect};

use self::drag::{DragSession, ForeignDropHandler};
use self::grid::Cell;
use self::item::{Item, ItemId, PlacedItem};
use self::page::{CellGeometry, Page, PageId};
use self::preview::PreviewReorderEngine;
use self::scroll::{ScrollController, ScrollOptions};
use self::transition::TransformStrategy;
use self::wallpaper::WallpaperOffsetInterpolator;
use crate::animation::Clock;
use crate::input::PointerRouting;
use crate::persistence::{PersistOp, Persistence};
use crate::utils::{IdCounter, Point, Size};

pub mod animated_value;
pub mod drag;
pub mod grid;
pub mod item;
pub mod page;
pub mod placement;
pub mod preview;
pub mod scroll;
pub mod snapshot;
pub mod transition;
pub mod wallpaper;

mod layout_impl;

pub use layout_impl::pages::{ConfirmationRequest, DeletePage};


/// Scale of the pages in the spring-loaded layout.
pub const SPRING_LOADED_SCALE: f64 = 0.8;

/// Number of page thumbnails per row in the preview layout.
pub const PREVIEW_COLUMNS: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    pub columns: usize,
    pub rows: usize,
    pub page_size: Size,
    pub page_count: usize,
    pub default_page: usize,
    pub max_pages: usize,
    pub scroll: ScrollOptions,
    /// Horizontal travel before a pointer drag scrolls the canvas.
    pub touch_slop: f64,
    pub folder_creation_delay: Duration,
    pub page_hover_delay: Duration,
    /// Width of the strips along the left and right edges that switch pages while dragging.
    pub edge_scroll_zone: f64,
    pub folder_capacity: usize,
    pub pinch_slop: f64,
    pub transition_effect: TransitionEffect,
    pub fade_adjacent_pages: bool,
    pub wallpaper_fixed: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl Options {
    pub fn from_config(config: &Config) -> Self {
        let ms = |ms: u32| Duration::from_millis(u64::from(ms));

        Self {
            columns: usize::from(config.grid.columns),
            rows: usize::from(config.grid.rows),
            page_size: Size::new(config.geometry.page_width.0, config.geometry.page_height.0),
            page_count: usize::from(config.pages.count),
            default_page: usize::from(config.pages.default_page),
            max_pages: usize::from(config.pages.max_pages),
            scroll: ScrollOptions {
                snap_velocity: config.scroll.snap_velocity.0,
                overscroll: config.scroll.overscroll,
                overscroll_damp_factor: config.scroll.overscroll_damp_factor.0,
            },
            touch_slop: config.scroll.touch_slop.0,
            folder_creation_delay: ms(config.drag.folder_creation_delay_ms),
            page_hover_delay: ms(config.drag.page_hover_delay_ms),
            edge_scroll_zone: config.drag.edge_scroll_zone.0,
            folder_capacity: usize::from(config.drag.folder_capacity),
            pinch_slop: config.drag.pinch_slop.0,
            transition_effect: config.transition_effect,
            fade_adjacent_pages: config.fade_adjacent_pages,
            wallpaper_fixed: config.wallpaper.fixed,
        }
    }

    pub fn cell_geometry(&self) -> CellGeometry {
        CellGeometry {
            columns: self.columns,
            rows: self.rows,
            page_size: self.page_size,
        }
    }
}

#[derive(Debug)]
pub struct Canvas {
    pages: Vec<Page>,
    /// Index of the home page.
    default_page: usize,
    scroll: ScrollController,
    strategy: TransformStrategy,
    wallpaper: WallpaperOffsetInterpolator,
    /// Ongoing item drag.
    drag: Option<DragSession>,
    /// Whether the preview layout is shown.
    preview: bool,
    /// Ongoing page drag in the preview layout.
    reorder: Option<PreviewReorderEngine>,
    /// Pages whose drag-over highlight changed since the last frame.
    invalidated: Vec<PageId>,
    pub(crate) input: PointerRouting,
    persistence: Persistence,
    foreign_drop_handler: Option<Box<dyn ForeignDropHandler>>,
    page_ids: IdCounter,
    item_ids: IdCounter,
    clock: Clock,
    options: Rc<Options>,
}

impl Canvas {
    pub fn new(clock: Clock, config: &Config) -> Self {
        Self::with_options(clock, Options::from_config(config))
    }

    pub fn with_options(clock: Clock, options: Options) -> Self {
        let options = Rc::new(options);

        let mut page_ids = IdCounter::new();
        let pages = (0..options.page_count)
            .map(|_| Page::new(PageId(page_ids.next()), options.columns, options.rows))
            .collect();
        let default_page = options.default_page.min(options.page_count.saturating_sub(1));

        let scroll = ScrollController::new(
            options.page_count,
            options.page_size.w,
            default_page,
            options.scroll,
            clock.clone(),
        );

        let mut wallpaper = WallpaperOffsetInterpolator::new(
            options.page_size.is_landscape(),
            options.wallpaper_fixed,
        );
        wallpaper.sync_to_scroll(scroll.offset(), options.page_count, options.page_size.w);
        wallpaper.jump_to_final();

        Self {
            pages,
            default_page,
            scroll,
            strategy: TransformStrategy::new(options.transition_effect),
            wallpaper,
            drag: None,
            preview: false,
            reorder: None,
            invalidated: Vec::new(),
            input: PointerRouting::default(),
            persistence: Persistence::disabled(),
            foreign_drop_handler: None,
            page_ids,
            item_ids: IdCounter::new(),
            clock,
            options,
        }
    }

    pub fn set_persistence(&mut self, persistence: Persistence) {
        self.persistence = persistence;
    }

    pub fn set_foreign_drop_handler(&mut self, handler: Box<dyn ForeignDropHandler>) {
        self.foreign_drop_handler = Some(handler);
    }

    /// Applies a changed config. Pages and items stay as they are.
    pub fn update_config(&mut self, config: &Config) {
        let mut options = Options::from_config(config);
        // These only take effect at creation.
        options.columns = self.options.columns;
        options.rows = self.options.rows;
        options.page_count = self.options.page_count;
        options.default_page = self.options.default_page;

        if options.page_size != self.options.page_size {
            self.scroll.set_page_width(options.page_size.w);
            self.wallpaper.set_landscape(options.page_size.is_landscape());
        }
        self.scroll.set_options(options.scroll);
        self.strategy.set_effect(options.transition_effect);
        self.wallpaper.set_fixed(options.wallpaper_fixed);

        self.options = Rc::new(options);
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn default_page(&self) -> usize {
        self.default_page
    }

    pub fn scroll(&self) -> &ScrollController {
        &self.scroll
    }

    pub fn drag(&self) -> Option<&DragSession> {
        self.drag.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn is_preview(&self) -> bool {
        self.preview
    }

    pub fn reorder(&self) -> Option<&PreviewReorderEngine> {
        self.reorder.as_ref()
    }

    pub fn wallpaper_offset(&self) -> (f64, f64) {
        self.wallpaper.current()
    }

    pub fn transition_effect(&self) -> TransitionEffect {
        self.strategy.effect()
    }

    fn cell_geometry(&self) -> CellGeometry {
        self.options.cell_geometry()
    }

    /// Finds a placed item by id, returning its page index.
    pub fn find_item(&self, id: ItemId) -> Option<(usize, &PlacedItem)> {
        self.pages
            .iter()
            .enumerate()
            .find_map(|(idx, page)| page.item(id).map(|placed| (idx, placed)))
    }

    /// Folder holding the item, if any.
    fn find_folder_of(&self, id: ItemId) -> Option<(usize, ItemId)> {
        self.pages.iter().enumerate().find_map(|(idx, page)| {
            page.items()
                .iter()
                .find(|placed| placed.contents.iter().any(|inner| inner.id == id))
                .map(|folder| (idx, folder.id()))
        })
    }

    fn contains_item(&self, id: ItemId) -> bool {
        self.find_item(id).is_some() || self.find_folder_of(id).is_some()
    }

    /// Item under a viewport point on the current page.
    pub fn item_at(&self, pos: Point) -> Option<ItemId> {
        if self.preview {
            return None;
        }

        let page = self.pages.get(self.scroll.current_page())?;
        let cell = self.cell_geometry().cell_at(pos);
        page.grid().occupant(cell)
    }

    /// Puts an item on the canvas.
    ///
    /// Returns `false` if the page does not exist, the region is not vacant or the id is already
    /// in use.
    pub fn add_item(&mut self, item: Item, page: usize, cell: Cell) -> bool {
        let dragged = self.drag.as_ref().and_then(DragSession::item);
        if self.contains_item(item.id) || dragged.is_some_and(|dragged| dragged.id == item.id) {
            warn!("item {} is already on the canvas", item.id);
            return false;
        }

        let Some(target) = self.pages.get_mut(page) else {
            return false;
        };

        let op = PersistOp::AddItem {
            item: item.clone(),
            page,
            cell,
        };
        let id = item.id;
        if target.insert(PlacedItem::new(item, page, cell)).is_err() {
            debug!("no room for item {id} at {cell:?} on page {page}");
            return false;
        }

        self.item_ids.skip_past(id.0);
        self.persistence.send(op);
        true
    }

    /// Removes an item from the canvas or from the folder holding it.
    ///
    /// Removing the item being dragged cancels the drag first.
    pub fn remove_item(&mut self, id: ItemId) -> bool {
        if self.drag.as_ref().and_then(|drag| drag.source_item()) == Some(id) {
            debug!("item {id} removed while being dragged");
            self.drag_cancel();
        }

        if let Some((page_idx, _)) = self.find_item(id) {
            let Some(placed) = self.pages[page_idx].remove(id) else {
                return false;
            };

            for inner in &placed.contents {
                self.persistence.send(PersistOp::DeleteItem { id: inner.id });
            }
            self.persistence.send(PersistOp::DeleteItem { id });
            return true;
        }

        if let Some((page_idx, folder)) = self.find_folder_of(id) {
            if let Some(folder) = self.pages[page_idx].item_mut(folder) {
                folder.contents.retain(|inner| inner.id != id);
            }
            self.persistence.send(PersistOp::DeleteItem { id });
            return true;
        }

        false
    }

    /// Scrolls to a page with an animation.
    pub fn snap_to_page(&mut self, page: usize) {
        if self.preview {
            return;
        }
        self.scroll.snap_to_page(page);
    }

    pub fn snap_to_default_page(&mut self) {
        self.snap_to_page(self.default_page);
    }

    /// Shows a page without animating.
    pub fn set_current_page(&mut self, page: usize) {
        self.scroll.set_current_page(page);
    }

    /// Starts scrolling with the pointer. Not possible in the preview layout or while dragging.
    pub fn scroll_gesture_begin(&mut self, timestamp: Duration) -> bool {
        if self.preview || self.drag.is_some() {
            return false;
        }
        self.scroll.gesture_begin(timestamp)
    }

    pub fn scroll_gesture_update(&mut self, delta_x: f64, timestamp: Duration) -> Option<bool> {
        let redraw = self.scroll.gesture_update(delta_x, timestamp)?;
        if redraw {
            self.wallpaper.sync_to_scroll(
                self.scroll.offset(),
                self.pages.len(),
                self.options.page_size.w,
            );
        }
        Some(redraw)
    }

    /// Ends the scroll gesture. Returns the page the canvas settles on.
    pub fn scroll_gesture_end(&mut self, timestamp: Duration) -> Option<usize> {
        let page = self.scroll.gesture_end(timestamp)?;
        debug!("scroll gesture ended, settling on page {page}");
        Some(page)
    }

    pub fn scroll_gesture_cancel(&mut self) {
        self.scroll.gesture_cancel();
    }

    /// Advances animations and fires due alarms.
    ///
    /// Returns `true` while something is still moving.
    pub fn advance_animations(&mut self) -> bool {
        let now = self.clock.now();

        let mut ongoing = self.scroll.advance_animations();
        self.dispatch_alarms();

        self.wallpaper.sync_to_scroll(
            self.scroll.offset(),
            self.pages.len(),
            self.options.page_size.w,
        );
        ongoing |= self.wallpaper.advance(now);

        ongoing
    }

    /// Time of the next pending alarm, for scheduling wakeups.
    pub fn next_alarm_deadline(&self) -> Option<Duration> {
        let drag = self.drag.as_ref()?;
        [&drag.folder_alarm, &drag.page_hover_alarm]
            .into_iter()
            .filter_map(|alarm| alarm.deadline())
            .min()
    }

    #[cfg(test)]
    fn verify_invariants(&self) {
        use std::collections::HashSet;

        assert!(self.pages.len() <= self.options.max_pages.max(self.options.page_count));
        assert_eq!(self.scroll.page_count(), self.pages.len());
        if self.pages.is_empty() {
            return;
        }

        assert!(self.default_page < self.pages.len());
        assert!(self.scroll.current_page() < self.pages.len());

        let mut page_ids = HashSet::new();
        let mut item_ids = HashSet::new();
        for (idx, page) in self.pages.iter().enumerate() {
            assert!(page_ids.insert(page.id()), "page ids must be unique");
            page.verify_invariants(idx);

            for placed in page.items() {
                assert!(item_ids.insert(placed.id()), "item ids must be unique");
                assert!(placed.contents.len() <= self.options.folder_capacity);
                for inner in &placed.contents {
                    assert!(inner.kind.is_shortcut_like());
                    assert!(item_ids.insert(inner.id), "item ids must be unique");
                }
            }
        }

        if let Some(drag) = &self.drag {
            assert!(self.reorder.is_none(), "item and page drags are exclusive");
            assert!(!self.preview, "items are not dragged in the preview layout");
            if let Some(id) = drag.source_item() {
                assert!(self.find_item(id).is_some(), "dragged item must stay on the canvas");
            }
        }

        if let Some(reorder) = &self.reorder {
            assert!(self.preview);
            assert_eq!(reorder.infos().len(), self.pages.len());
        }
    }
}
