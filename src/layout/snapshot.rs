//! Serializable view of the canvas state, for replays and snapshot tests.

use serde::Serialize;

use super::drag::{DragPhase, DragSource};
use super::grid::{Cell, Span};
use super::item::{ItemId, ItemKind};
use super::page::PageId;
use super::preview::PreviewInfo;
use super::scroll::ScrollState;
use super::Canvas;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanvasSnapshot {
    pub pages: Vec<PageSnapshot>,
    pub default_page: usize,
    pub scroll: ScrollState,
    pub preview: bool,
    /// Displayed page order while a page is dragged in the preview layout.
    pub reorder: Option<Vec<PreviewInfo>>,
    pub drag: Option<DragSnapshot>,
    pub wallpaper_offset: (f64, f64),
    pub transition_effect: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageSnapshot {
    pub id: PageId,
    /// Occupancy rendered row by row, `.` for a free cell.
    pub grid: String,
    pub items: Vec<ItemSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemSnapshot {
    pub id: ItemId,
    pub kind: ItemKind,
    pub cell: Cell,
    pub span: Span,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub contents: Vec<ItemId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DragSnapshot {
    pub phase: DragPhase,
    pub source: DragSource,
    pub spring_loaded: bool,
    pub hover_page: Option<usize>,
    pub target_cell: Option<Cell>,
}

impl Canvas {
    pub fn snapshot(&self) -> CanvasSnapshot {
        let pages = self
            .pages
            .iter()
            .map(|page| PageSnapshot {
                id: page.id(),
                grid: page.grid().to_string(),
                items: page
                    .items()
                    .iter()
                    .map(|placed| ItemSnapshot {
                        id: placed.id(),
                        kind: placed.item.kind,
                        cell: placed.cell,
                        span: placed.span(),
                        contents: placed.contents.iter().map(|inner| inner.id).collect(),
                    })
                    .collect(),
            })
            .collect();

        CanvasSnapshot {
            pages,
            default_page: self.default_page,
            scroll: self.scroll.state(),
            preview: self.preview,
            reorder: self.reorder.as_ref().map(|reorder| reorder.infos().to_vec()),
            drag: self.drag.as_ref().map(|drag| DragSnapshot {
                phase: drag.phase,
                source: drag.source,
                spring_loaded: drag.spring_loaded,
                hover_page: drag.hover_page,
                target_cell: drag.target_cell,
            }),
            wallpaper_offset: self.wallpaper.current(),
            transition_effect: self.strategy.effect().name(),
        }
    }
}
