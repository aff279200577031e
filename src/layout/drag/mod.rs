//! State of an ongoing item drag.

use std::fmt;

use serde::Serialize;

use super::grid::{Cell, Span};
use super::item::{Item, ItemId};
use crate::utils::alarm::{Alarm, AlarmToken};
use crate::utils::Point;

/// What is being dragged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragPayload {
    Item(Item),
    /// Data from outside the launcher that is not an item, such as a file or a text snippet.
    Foreign { mime: String },
}

/// Where the dragged payload came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DragSource {
    /// An item already placed on the canvas. It stays in place, hidden, until the drop.
    Canvas { page: usize, cell: Cell },
    /// A new item or foreign data. Nothing is on the canvas until the drop.
    External,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DragPhase {
    /// The drag has begun but the pointer has not moved yet.
    Started,
    /// The pointer is moving over a page.
    HoveringPage,
    /// The folder dwell elapsed over an item; dropping now creates a folder.
    FolderPending,
    /// The pointer left a pending folder cell; dropping places the item normally.
    Resolving,
}

/// How a drag ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DropOutcome {
    /// A new item was placed.
    Placed { page: usize, cell: Cell },
    /// An existing item moved.
    Moved { page: usize, cell: Cell },
    MergedIntoFolder { folder: ItemId },
    CreatedFolder { folder: ItemId },
    /// No room for the item; it went back where it came from.
    OutOfSpace,
    /// Foreign data nobody could handle.
    Rejected,
    /// Foreign data taken by the drop handler.
    Handled,
    Cancelled,
}

/// Timers a drag can arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmKind {
    FolderCreation,
    PageHover,
}

/// Takes foreign data dropped on the canvas.
pub trait ForeignDropHandler {
    /// Returns `true` if the handler took the data.
    fn accept_drop(&mut self, mime: &str, page: usize, cell: Cell) -> bool;
}

impl fmt::Debug for dyn ForeignDropHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ForeignDropHandler")
    }
}

#[derive(Debug)]
pub struct DragSession {
    pub payload: DragPayload,
    pub source: DragSource,
    pub span: Span,
    pub phase: DragPhase,
    /// Pointer position within the viewport.
    pub pointer: Point,
    /// Pages are shown shrunk with their neighbours visible.
    pub spring_loaded: bool,
    /// Page under the pointer, if any.
    pub hover_page: Option<usize>,
    /// Cell the payload would land on, as of the last move.
    pub target_cell: Option<Cell>,
    /// Item the pointer dwells on for folder creation, with its cell.
    pub folder_candidate: Option<(Cell, ItemId)>,
    pub folder_alarm: Alarm,
    /// Page to switch to once the hover alarm fires.
    pub page_hover_target: Option<usize>,
    pub page_hover_alarm: Alarm,
}

impl DragSession {
    pub fn new(payload: DragPayload, source: DragSource, pointer: Point) -> Self {
        let span = match &payload {
            DragPayload::Item(item) => item.span,
            DragPayload::Foreign { .. } => Span::ONE,
        };

        Self {
            payload,
            source,
            span,
            phase: DragPhase::Started,
            pointer,
            spring_loaded: source == DragSource::External,
            hover_page: None,
            target_cell: None,
            folder_candidate: None,
            folder_alarm: Alarm::new(),
            page_hover_target: None,
            page_hover_alarm: Alarm::new(),
        }
    }

    pub fn item(&self) -> Option<&Item> {
        match &self.payload {
            DragPayload::Item(item) => Some(item),
            DragPayload::Foreign { .. } => None,
        }
    }

    /// Id of the dragged item if it is on the canvas.
    pub fn source_item(&self) -> Option<ItemId> {
        match self.source {
            DragSource::Canvas { .. } => self.item().map(|item| item.id),
            DragSource::External => None,
        }
    }

    pub fn alarm(&self, kind: AlarmKind) -> &Alarm {
        match kind {
            AlarmKind::FolderCreation => &self.folder_alarm,
            AlarmKind::PageHover => &self.page_hover_alarm,
        }
    }

    pub fn alarm_mut(&mut self, kind: AlarmKind) -> &mut Alarm {
        match kind {
            AlarmKind::FolderCreation => &mut self.folder_alarm,
            AlarmKind::PageHover => &mut self.page_hover_alarm,
        }
    }

    /// Forgets the folder candidate. A pending folder reverts to normal placement.
    pub fn clear_folder_candidate(&mut self) {
        if self.folder_candidate.take().is_some() {
            self.folder_alarm.cancel();
        }
        if self.phase == DragPhase::FolderPending {
            self.phase = DragPhase::Resolving;
        }
    }

    pub fn cancel_alarms(&mut self) {
        self.folder_alarm.cancel();
        self.page_hover_alarm.cancel();
    }

    /// Whether dropping now would create a folder with the item at `cell`.
    pub fn creates_folder_with(&self, cell: Cell, item: ItemId) -> bool {
        self.phase == DragPhase::FolderPending && self.folder_candidate == Some((cell, item))
    }

    pub fn is_current(&self, kind: AlarmKind, token: AlarmToken) -> bool {
        self.alarm(kind).is_current(token)
    }
}
