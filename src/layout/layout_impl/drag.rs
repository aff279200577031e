//! Dragging items around the canvas.

use crate::layout::drag::{
    AlarmKind, DragPayload, DragPhase, DragSession, DragSource, DropOutcome,
};
use crate::layout::grid::{Cell, Span};
use crate::layout::item::{Item, ItemId, ItemKind, PlacedItem};
use crate::layout::placement::{
    find_nearest_area, find_nearest_vacant_area, resolve_hover, HoverTarget,
};
use crate::layout::{Canvas, SPRING_LOADED_SCALE};
use crate::persistence::PersistOp;
use crate::utils::alarm::AlarmToken;
use crate::utils::Point;

/// A viewport point resolved against the pages.
#[derive(Debug, Clone, Copy)]
struct PagePoint {
    /// Page under the point, if any.
    page: Option<usize>,
    /// The point relative to that page.
    local: Point,
}

impl Canvas {
    /// Starts dragging an item placed on the canvas.
    ///
    /// Returns `false` if the item does not exist or a drag cannot start right now.
    pub fn drag_item_begin(&mut self, id: ItemId, pointer: Point) -> bool {
        let Some((page, placed)) = self.find_item(id) else {
            warn!("cannot drag item {id}: not on the canvas");
            return false;
        };

        let session = DragSession::new(
            DragPayload::Item(placed.item.clone()),
            DragSource::Canvas {
                page,
                cell: placed.cell,
            },
            pointer,
        );
        self.start_drag(session)
    }

    /// Starts dragging a new item onto the canvas, for example from the app list.
    pub fn drag_external_begin(&mut self, item: Item, pointer: Point) -> bool {
        if self.contains_item(item.id) {
            warn!("cannot drag item {} in: already on the canvas", item.id);
            return false;
        }

        let id = item.id;
        let session = DragSession::new(DragPayload::Item(item), DragSource::External, pointer);
        let started = self.start_drag(session);
        if started {
            self.item_ids.skip_past(id.0);
        }
        started
    }

    /// Starts dragging data that is not an item.
    pub fn drag_foreign_begin(&mut self, mime: String, pointer: Point) -> bool {
        let session = DragSession::new(DragPayload::Foreign { mime }, DragSource::External, pointer);
        self.start_drag(session)
    }

    fn start_drag(&mut self, session: DragSession) -> bool {
        debug_assert!(self.drag.is_none(), "only one drag can be active");
        if self.drag.is_some() {
            warn!("ignoring drag start: another drag is active");
            return false;
        }

        if self.preview {
            debug!("ignoring item drag start in the preview layout");
            return false;
        }

        self.scroll.gesture_cancel();
        self.scroll.stop_animation();

        debug!(
            "drag started: {:?} from {:?}",
            session.payload, session.source
        );
        self.drag = Some(session);
        true
    }

    /// Resolves a viewport point to a page and a point on it.
    fn locate(&self, pointer: Point, spring_loaded: bool) -> PagePoint {
        let size = self.options.page_size;
        if self.pages.is_empty() || size.w <= 0. {
            return PagePoint {
                page: None,
                local: pointer,
            };
        }

        let scale = if spring_loaded {
            SPRING_LOADED_SCALE
        } else {
            1.
        };
        let x = self.scroll.offset() + size.w / 2. + (pointer.x - size.w / 2.) / scale;
        let y = size.h / 2. + (pointer.y - size.h / 2.) / scale;

        let page = (x / size.w).floor();
        if page < 0. || page >= self.pages.len() as f64 {
            return PagePoint {
                page: None,
                local: Point::new(x, y),
            };
        }

        PagePoint {
            page: Some(page as usize),
            local: Point::new(x - page * size.w, y),
        }
    }

    /// Page to switch to if the pointer stays where it is.
    fn page_hover_target(&self, session: &DragSession, page: Option<usize>) -> Option<usize> {
        let current = self.scroll.target_page();
        if session.spring_loaded {
            if let Some(page) = page.filter(|&page| page != current) {
                return Some(page);
            }
        }

        let edge = self.options.edge_scroll_zone;
        if session.pointer.x < edge {
            current.checked_sub(1)
        } else if session.pointer.x > self.options.page_size.w - edge {
            Some(current + 1).filter(|&page| page < self.pages.len())
        } else {
            None
        }
    }

    /// Moves the ongoing drag. Returns `false` if there is no drag.
    pub fn drag_update(&mut self, pointer: Point) -> bool {
        // Alarms due before this move fire first.
        self.dispatch_alarms();

        let Some(mut session) = self.drag.take() else {
            return false;
        };

        let now = self.clock.now();
        session.pointer = pointer;
        if session.phase == DragPhase::Started {
            session.phase = DragPhase::HoveringPage;
        }

        let PagePoint { page, local } = self.locate(pointer, session.spring_loaded);
        if page != session.hover_page {
            trace!("drag moved from page {:?} to {page:?}", session.hover_page);
            if let Some(old) = session.hover_page {
                self.invalidate_page(old);
            }
            if let Some(new) = page {
                self.invalidate_page(new);
            }
            session.hover_page = page;
            session.clear_folder_candidate();
        }

        let hover_target = self.page_hover_target(&session, page);
        if hover_target != session.page_hover_target {
            session.page_hover_target = hover_target;
            match hover_target {
                Some(target) => {
                    trace!("arming page hover alarm for page {target}");
                    session
                        .page_hover_alarm
                        .set(now, self.options.page_hover_delay);
                }
                None => session.page_hover_alarm.cancel(),
            }
        }

        let geo = self.cell_geometry();
        let hover = page.zip(session.item()).map(|(idx, item)| {
            resolve_hover(
                &self.pages[idx],
                &geo,
                local,
                item,
                self.options.folder_capacity,
            )
        });

        session.target_cell = match (page, hover) {
            (Some(idx), Some(HoverTarget::Placement)) => {
                session.clear_folder_candidate();
                find_nearest_vacant_area(
                    self.pages[idx].grid(),
                    &geo,
                    local,
                    session.span,
                    session.source_item(),
                )
            }
            (_, Some(HoverTarget::Folder { cell, .. })) => {
                session.clear_folder_candidate();
                Some(cell)
            }
            (_, Some(HoverTarget::FolderCandidate { cell, item })) => {
                if session.folder_candidate != Some((cell, item)) {
                    session.clear_folder_candidate();
                    session.folder_candidate = Some((cell, item));
                    session
                        .folder_alarm
                        .set(now, self.options.folder_creation_delay);
                }
                Some(cell)
            }
            (Some(idx), None) => {
                Some(find_nearest_area(self.pages[idx].grid(), &geo, local, Span::ONE))
            }
            (None, _) => None,
        };

        self.drag = Some(session);
        true
    }

    /// Fires every due alarm of the ongoing drag.
    pub fn dispatch_alarms(&mut self) {
        let now = self.clock.now();
        let Some(drag) = &mut self.drag else {
            return;
        };

        let mut due: Vec<_> = [AlarmKind::FolderCreation, AlarmKind::PageHover]
            .into_iter()
            .filter_map(|kind| {
                let deadline = drag.alarm(kind).deadline()?;
                let token = drag.alarm_mut(kind).take_due(now)?;
                Some((deadline, kind, token))
            })
            .collect();
        due.sort_by_key(|(deadline, _, _)| *deadline);

        for (_, kind, token) in due {
            self.on_alarm(kind, token);
        }
    }

    /// Acts on an alarm firing. Returns `false` if the firing is stale.
    fn on_alarm(&mut self, kind: AlarmKind, token: AlarmToken) -> bool {
        let Some(drag) = &mut self.drag else {
            return false;
        };

        if !drag.is_current(kind, token) {
            trace!("ignoring stale {kind:?} alarm");
            return false;
        }

        match kind {
            AlarmKind::FolderCreation => {
                let Some((cell, item)) = drag.folder_candidate else {
                    return false;
                };
                debug!("folder with item {item} at {cell:?} is pending");
                drag.phase = DragPhase::FolderPending;
            }
            AlarmKind::PageHover => {
                let Some(target) = drag.page_hover_target.take() else {
                    return false;
                };
                debug!("switching to page {target} while dragging");
                self.scroll.snap_to_page(target);
            }
        }

        true
    }

    /// Drops the dragged payload at `pointer`.
    ///
    /// Returns `None` if there is no drag.
    pub fn drag_drop(&mut self, pointer: Point) -> Option<DropOutcome> {
        self.drag_update(pointer);
        let mut session = self.drag.take()?;
        session.cancel_alarms();
        if let Some(page) = session.hover_page {
            self.invalidate_page(page);
        }

        let outcome = match &session.payload {
            DragPayload::Item(item) => {
                let item = item.clone();
                self.drop_item(&session, item)
            }
            DragPayload::Foreign { mime } => self.drop_foreign(&session, mime),
        };

        debug!("drag ended: {outcome:?}");
        Some(outcome)
    }

    /// Abandons the ongoing drag, leaving everything as it was.
    pub fn drag_cancel(&mut self) -> Option<DropOutcome> {
        let mut session = self.drag.take()?;
        session.cancel_alarms();
        if let Some(page) = session.hover_page {
            self.invalidate_page(page);
        }

        debug!("drag cancelled");
        Some(DropOutcome::Cancelled)
    }

    fn drop_item(&mut self, session: &DragSession, item: Item) -> DropOutcome {
        let PagePoint { page, local } = self.locate(session.pointer, session.spring_loaded);
        let Some(page) = page else {
            debug!("item {} dropped outside of the pages", item.id);
            return DropOutcome::Cancelled;
        };

        let geo = self.cell_geometry();
        let hover = resolve_hover(
            &self.pages[page],
            &geo,
            local,
            &item,
            self.options.folder_capacity,
        );
        match hover {
            HoverTarget::Folder { folder, .. } => return self.merge_into_folder(item, page, folder),
            HoverTarget::FolderCandidate { cell, item: other }
                if session.creates_folder_with(cell, other) =>
            {
                return self.create_folder(item, page, other);
            }
            _ => (),
        }

        let Some(cell) = find_nearest_vacant_area(
            self.pages[page].grid(),
            &geo,
            local,
            item.span,
            session.source_item(),
        ) else {
            debug!("no room for item {} on page {page}", item.id);
            return DropOutcome::OutOfSpace;
        };

        match session.source {
            DragSource::Canvas { .. } => self.move_item(item.id, page, cell),
            DragSource::External => {
                let op = PersistOp::AddItem {
                    item: item.clone(),
                    page,
                    cell,
                };
                if self.pages[page]
                    .insert(PlacedItem::new(item, page, cell))
                    .is_err()
                {
                    return DropOutcome::OutOfSpace;
                }
                self.persistence.send(op);
                DropOutcome::Placed { page, cell }
            }
        }
    }

    fn move_item(&mut self, id: ItemId, page: usize, cell: Cell) -> DropOutcome {
        let Some((origin, _)) = self.find_item(id) else {
            return DropOutcome::Cancelled;
        };
        let Some(mut placed) = self.pages[origin].remove(id) else {
            return DropOutcome::Cancelled;
        };

        let from = placed.cell;
        placed.page = page;
        placed.cell = cell;
        if let Err(mut placed) = self.pages[page].insert(placed) {
            warn!("error moving item {id} to {cell:?} on page {page}, putting it back");
            placed.page = origin;
            placed.cell = from;
            let _ = self.pages[origin].insert(placed);
            return DropOutcome::OutOfSpace;
        }

        self.persistence.send(PersistOp::MoveItem { id, page, cell });
        DropOutcome::Moved { page, cell }
    }

    /// Takes the dragged item off the canvas if it was on it.
    fn take_dragged(&mut self, id: ItemId) {
        if let Some((page, _)) = self.find_item(id) {
            self.pages[page].remove(id);
        }
    }

    fn merge_into_folder(&mut self, item: Item, page: usize, folder: ItemId) -> DropOutcome {
        if self.pages[page].item(folder).is_none() {
            return DropOutcome::Cancelled;
        }

        self.take_dragged(item.id);
        if let Some(target) = self.pages[page].item_mut(folder) {
            target.contents.push(item.clone());
        }

        self.persistence.send(PersistOp::AddToFolder { item, folder });
        DropOutcome::MergedIntoFolder { folder }
    }

    fn create_folder(&mut self, item: Item, page: usize, other: ItemId) -> DropOutcome {
        let Some(target) = self.pages[page].remove(other) else {
            return DropOutcome::Cancelled;
        };

        let cell = target.cell;
        let folder_item = Item::new(self.item_ids.next(), ItemKind::Folder);
        let folder = folder_item.id;
        let mut placed = PlacedItem::new(folder_item.clone(), page, cell);
        placed.contents = vec![target.item.clone(), item.clone()];

        if self.pages[page].insert(placed).is_err() {
            warn!("error creating a folder at {cell:?} on page {page}");
            let _ = self.pages[page].insert(target);
            return DropOutcome::Cancelled;
        }
        self.take_dragged(item.id);

        debug!("created folder {folder} from items {other} and {}", item.id);
        self.persistence.send(PersistOp::AddItem {
            item: folder_item,
            page,
            cell,
        });
        self.persistence.send(PersistOp::AddToFolder {
            item: target.item,
            folder,
        });
        self.persistence.send(PersistOp::AddToFolder { item, folder });
        DropOutcome::CreatedFolder { folder }
    }

    fn drop_foreign(&mut self, session: &DragSession, mime: &str) -> DropOutcome {
        let PagePoint { page, local } = self.locate(session.pointer, session.spring_loaded);
        let Some(page) = page else {
            return DropOutcome::Rejected;
        };

        let cell = find_nearest_area(
            self.pages[page].grid(),
            &self.cell_geometry(),
            local,
            Span::ONE,
        );
        let handled = self
            .foreign_drop_handler
            .as_mut()
            .is_some_and(|handler| handler.accept_drop(mime, page, cell));

        if handled {
            DropOutcome::Handled
        } else {
            debug!("could not handle this drop: {mime}");
            DropOutcome::Rejected
        }
    }
}
