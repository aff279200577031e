//! Preview layout and page management.

use serde::Serialize;

use crate::layout::page::{Page, PageId};
use crate::layout::preview::PreviewReorderEngine;
use crate::layout::{Canvas, PREVIEW_COLUMNS};
use crate::persistence::PersistOp;
use crate::utils::Point;

/// A page that holds items and needs the user's go-ahead before deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConfirmationRequest {
    pub page: PageId,
    pub item_count: usize,
}

/// Result of [`Canvas::delete_page`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletePage {
    Deleted,
    /// Pass the request back to [`Canvas::confirm_delete_page`] with the answer.
    NeedsConfirmation(ConfirmationRequest),
    Rejected,
}

impl Canvas {
    pub(crate) fn page_index(&self, id: PageId) -> Option<usize> {
        self.pages.iter().position(|page| page.id() == id)
    }

    /// Switches to the preview layout. Not possible while dragging an item.
    pub fn enter_preview(&mut self) -> bool {
        if self.preview {
            return false;
        }
        if self.drag.is_some() {
            debug!("not entering the preview layout during a drag");
            return false;
        }

        self.scroll.gesture_cancel();
        self.scroll.stop_animation();
        self.preview = true;
        debug!("entered the preview layout");
        true
    }

    /// Leaves the preview layout, cancelling any page drag.
    pub fn exit_preview(&mut self) -> bool {
        if !self.preview {
            return false;
        }

        if self.reorder.take().is_some() {
            debug!("page reorder cancelled");
        }
        self.preview = false;
        debug!("left the preview layout");
        true
    }

    /// Slot of the preview layout under a viewport point.
    ///
    /// Points past the last page map to the last slot.
    pub fn preview_slot_at(&self, pos: Point) -> Option<usize> {
        let count = self.pages.len();
        let size = self.options.page_size;
        if count == 0 || pos.x < 0. || pos.y < 0. || pos.x >= size.w || pos.y >= size.h {
            return None;
        }

        let rows = count.div_ceil(PREVIEW_COLUMNS);
        let col = (pos.x / (size.w / PREVIEW_COLUMNS as f64)) as usize;
        let row = (pos.y / (size.h / rows as f64)) as usize;
        Some((row * PREVIEW_COLUMNS + col).min(count - 1))
    }

    /// Starts dragging the page at `page` in the preview layout.
    pub fn preview_drag_begin(&mut self, page: usize) -> bool {
        if !self.preview {
            return false;
        }

        debug_assert!(self.reorder.is_none(), "only one page drag can be active");
        if self.reorder.is_some() {
            warn!("ignoring page drag start: another page drag is active");
            return false;
        }

        let Some(engine) = PreviewReorderEngine::new(self.pages.len(), page) else {
            return false;
        };
        debug!("started dragging page {page}");
        self.reorder = Some(engine);
        true
    }

    /// Moves the dragged page to the slot under `pos`.
    ///
    /// Returns `true` if the displayed order changed.
    pub fn preview_drag_update(&mut self, pos: Point) -> bool {
        let Some(slot) = self.preview_slot_at(pos) else {
            return false;
        };
        let Some(reorder) = &mut self.reorder else {
            return false;
        };

        reorder.drag_over(slot)
    }

    /// Commits the displayed order. Returns `true` if any page moved.
    pub fn preview_drag_drop(&mut self) -> bool {
        let Some(reorder) = self.reorder.take() else {
            return false;
        };
        if reorder.is_noop() {
            debug!("page drag ended where it started");
            return false;
        }

        let default_id = self.pages.get(self.default_page).map(Page::id);
        let current_id = self.pages.get(self.scroll.current_page()).map(Page::id);

        let mut old: Vec<_> = std::mem::take(&mut self.pages)
            .into_iter()
            .map(Some)
            .collect();
        self.pages = reorder
            .show_order()
            .into_iter()
            .filter_map(|idx| old[idx].take())
            .collect();

        for info in reorder.moved() {
            let idx = info.show_index;
            let page = &mut self.pages[idx];
            page.relabel(idx);
            for placed in page.items() {
                self.persistence.send(PersistOp::MoveItem {
                    id: placed.id(),
                    page: idx,
                    cell: placed.cell,
                });
            }
        }

        if let Some(idx) = default_id.and_then(|id| self.page_index(id)) {
            if idx != self.default_page {
                self.default_page = idx;
                self.persistence.send(PersistOp::SetDefaultPage { page: idx });
            }
        }
        if let Some(idx) = current_id.and_then(|id| self.page_index(id)) {
            self.scroll.set_current_page(idx);
        }

        debug!("reordered pages: {:?}", reorder.show_order());
        true
    }

    /// Abandons the page drag, keeping the order.
    pub fn preview_drag_cancel(&mut self) -> bool {
        self.reorder.take().is_some()
    }

    /// Appends an empty page. Returns its index.
    pub fn add_page(&mut self) -> Option<usize> {
        if self.reorder.is_some() {
            return None;
        }
        if self.pages.len() >= self.options.max_pages {
            debug!("not adding a page: {} is the limit", self.options.max_pages);
            return None;
        }

        let id = PageId(self.page_ids.next());
        self.pages
            .push(Page::new(id, self.options.columns, self.options.rows));
        self.scroll.set_page_count(self.pages.len());
        Some(self.pages.len() - 1)
    }

    pub fn set_default_page(&mut self, page: usize) -> bool {
        if page >= self.pages.len() {
            return false;
        }

        if page != self.default_page {
            self.default_page = page;
            self.persistence.send(PersistOp::SetDefaultPage { page });
        }
        true
    }

    /// Deletes a page from the preview layout.
    ///
    /// Empty pages go right away. Pages with items need confirmation. The last remaining page
    /// cannot be deleted.
    pub fn delete_page(&mut self, page: usize) -> DeletePage {
        if !self.preview || self.reorder.is_some() {
            return DeletePage::Rejected;
        }
        if self.pages.len() <= 1 {
            debug!("not deleting the only page");
            return DeletePage::Rejected;
        }
        let Some(target) = self.pages.get(page) else {
            return DeletePage::Rejected;
        };

        if !target.is_empty() {
            return DeletePage::NeedsConfirmation(ConfirmationRequest {
                page: target.id(),
                item_count: target.items().len(),
            });
        }

        self.remove_page(page);
        DeletePage::Deleted
    }

    /// Answers a [`ConfirmationRequest`]. Returns `true` if the page was deleted.
    pub fn confirm_delete_page(&mut self, request: ConfirmationRequest, accepted: bool) -> bool {
        if !accepted {
            debug!("deletion of page {} declined", request.page);
            return false;
        }
        if self.drag.is_some() || self.reorder.is_some() || self.pages.len() <= 1 {
            return false;
        }
        let Some(idx) = self.page_index(request.page) else {
            debug!("page {} is already gone", request.page);
            return false;
        };

        self.remove_page(idx);
        true
    }

    fn remove_page(&mut self, idx: usize) {
        let mut page = self.pages.remove(idx);
        for placed in page.clear() {
            for inner in &placed.contents {
                self.persistence.send(PersistOp::DeleteItem { id: inner.id });
            }
            self.persistence
                .send(PersistOp::DeleteItem { id: placed.id() });
        }

        for (i, page) in self.pages.iter_mut().enumerate().skip(idx) {
            page.relabel(i);
            for placed in page.items() {
                self.persistence.send(PersistOp::MoveItem {
                    id: placed.id(),
                    page: i,
                    cell: placed.cell,
                });
            }
        }

        let last = self.pages.len() - 1;
        let old_default = self.default_page;
        // Deleting the home page makes the page before it the new home.
        self.default_page = if idx <= old_default && old_default > 0 {
            old_default - 1
        } else {
            old_default.min(last)
        };
        if idx <= old_default {
            self.persistence.send(PersistOp::SetDefaultPage {
                page: self.default_page,
            });
        }

        let current = self.scroll.current_page();
        let current = if idx < current {
            current - 1
        } else {
            current.min(last)
        };
        self.scroll.set_page_count(self.pages.len());
        self.scroll.set_current_page(current);

        debug!("deleted page {idx} ({})", page.id());
    }
}
