use deckgrid_config::TransitionEffect;

use crate::layout::transition::{PageRenderer, PageTransform};
use crate::layout::Canvas;

impl Canvas {
    /// Marks a page for redraw on the next frame.
    pub(crate) fn invalidate_page(&mut self, idx: usize) {
        let Some(page) = self.pages.get(idx) else {
            return;
        };

        let id = page.id();
        if !self.invalidated.contains(&id) {
            self.invalidated.push(id);
        }
    }

    /// Transform of the page at `idx` for the current scroll position.
    pub fn page_transform(&mut self, idx: usize) -> PageTransform {
        let size = self.options.page_size;
        if self.preview {
            return self.strategy.reset(size);
        }

        let progress = self.scroll.page_progress(idx);
        let overscroll = self.scroll.overscroll();
        let last = self.pages.len().saturating_sub(1);

        if overscroll < 0. && idx == 0 {
            return self.strategy.apply_left_overscroll(progress, size);
        }
        if overscroll > 0. && idx == last {
            return self.strategy.apply_right_overscroll(progress, size);
        }

        let mut transform = self.strategy.apply(progress, size);
        if self.options.fade_adjacent_pages && idx != self.scroll.current_page() {
            transform.alpha *= 1. - progress.abs();
        }
        transform
    }

    /// Pushes the transform of every page to the renderer, then the pending invalidations.
    pub fn render_frame(&mut self, renderer: &mut dyn PageRenderer) {
        for idx in 0..self.pages.len() {
            let transform = self.page_transform(idx);
            renderer.apply_transform(self.pages[idx].id(), &transform);
        }

        for id in self.invalidated.drain(..) {
            renderer.invalidate(id);
        }
    }

    /// Switches the transition effect, resetting every page so nothing of the old one lingers.
    pub fn set_transition_effect(
        &mut self,
        effect: TransitionEffect,
        renderer: &mut dyn PageRenderer,
    ) {
        if effect == self.strategy.effect() {
            return;
        }

        let identity = self.strategy.reset(self.options.page_size);
        for page in &self.pages {
            renderer.apply_transform(page.id(), &identity);
        }

        debug!("transition effect changed to {}", effect.name());
        self.strategy.set_effect(effect);
    }
}
