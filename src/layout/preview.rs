//! Reordering whole pages in the preview layout.
//!
//! While a page is dragged around the preview, every page keeps its real position
//! (`actual_index`) and gets a displayed position (`show_index`). Hovering the dragged page over
//! another slot shifts the pages in between by one slot toward the slot the dragged page left,
//! so the displayed positions always form a permutation of the real ones.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PreviewInfo {
    /// Position of the page in the canvas.
    pub actual_index: usize,
    /// Position the page is displayed at.
    pub show_index: usize,
    /// Position the page was displayed at before the last shift, to animate from.
    pub from_index: usize,
}

impl PreviewInfo {
    fn new(index: usize) -> Self {
        Self {
            actual_index: index,
            show_index: index,
            from_index: index,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PreviewReorderEngine {
    infos: Vec<PreviewInfo>,
    /// Actual index of the dragged page.
    dragged: usize,
}

impl PreviewReorderEngine {
    /// Starts reordering `page_count` pages by dragging the page at `dragged`.
    ///
    /// Returns `None` if `dragged` is not a page.
    pub fn new(page_count: usize, dragged: usize) -> Option<Self> {
        if dragged >= page_count {
            return None;
        }

        Some(Self {
            infos: (0..page_count).map(PreviewInfo::new).collect(),
            dragged,
        })
    }

    pub fn dragged(&self) -> usize {
        self.dragged
    }

    pub fn infos(&self) -> &[PreviewInfo] {
        &self.infos
    }

    /// Slot the dragged page is currently displayed at.
    pub fn vacant(&self) -> usize {
        self.infos[self.dragged].show_index
    }

    /// Moves the dragged page to slot `over`. Returns `false` if nothing changed.
    pub fn drag_over(&mut self, over: usize) -> bool {
        let over = over.min(self.infos.len() - 1);
        let vacant = self.vacant();
        if over == vacant {
            return false;
        }

        for info in &mut self.infos {
            let show = info.show_index;
            info.from_index = show;

            if info.actual_index == self.dragged {
                info.show_index = over;
            } else if over < vacant && (over..vacant).contains(&show) {
                info.show_index = show + 1;
            } else if vacant < over && (vacant + 1..=over).contains(&show) {
                info.show_index = show - 1;
            }
        }

        true
    }

    /// Actual indices of the pages in displayed order.
    pub fn show_order(&self) -> Vec<usize> {
        let mut order = vec![0; self.infos.len()];
        for info in &self.infos {
            order[info.show_index] = info.actual_index;
        }
        order
    }

    /// Whether dropping now would leave every page where it is.
    pub fn is_noop(&self) -> bool {
        self.infos
            .iter()
            .all(|info| info.actual_index == info.show_index)
    }

    /// Pages whose displayed position differs from their real one.
    pub fn moved(&self) -> impl Iterator<Item = &PreviewInfo> + '_ {
        self.infos
            .iter()
            .filter(|info| info.actual_index != info.show_index)
    }
}
