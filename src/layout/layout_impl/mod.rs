//! Methods of [`Canvas`](super::Canvas), split by category:
//!
//! - `drag.rs` - Item drags, drops, folder creation and page hover
//! - `pages.rs` - Preview layout, page reordering, adding and deleting pages
//! - `render.rs` - Page transforms and invalidation

mod drag;
pub(crate) mod pages;
mod render;
