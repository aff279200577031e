use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use super::grid::{Cell, Span};

/// Identity of an item record, shared with the item store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
#[serde(rename_all = "kebab-case")]
pub enum ItemKind {
    Application,
    Shortcut,
    Folder,
    Widget,
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ItemKinds: u8 {
        const APPLICATION = 1;
        const SHORTCUT = 1 << 1;
        const FOLDER = 1 << 2;
        const WIDGET = 1 << 3;

        /// Kinds that can be combined into folders.
        const SHORTCUT_LIKE = Self::APPLICATION.bits() | Self::SHORTCUT.bits();
    }
}

impl From<ItemKind> for ItemKinds {
    fn from(kind: ItemKind) -> Self {
        match kind {
            ItemKind::Application => ItemKinds::APPLICATION,
            ItemKind::Shortcut => ItemKinds::SHORTCUT,
            ItemKind::Folder => ItemKinds::FOLDER,
            ItemKind::Widget => ItemKinds::WIDGET,
        }
    }
}

impl ItemKind {
    pub fn is_shortcut_like(self) -> bool {
        ItemKinds::SHORTCUT_LIKE.contains(self.into())
    }
}

/// An item that can live on the canvas or inside a folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub kind: ItemKind,
    pub span: Span,
}

impl Item {
    pub fn new(id: u64, kind: ItemKind) -> Self {
        Self {
            id: ItemId(id),
            kind,
            span: Span::ONE,
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }
}

/// An item placed on a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedItem {
    pub item: Item,
    /// Index of the page, as stored by the item store.
    pub page: usize,
    pub cell: Cell,
    /// Items inside, for folders.
    pub contents: Vec<Item>,
}

impl PlacedItem {
    pub fn new(item: Item, page: usize, cell: Cell) -> Self {
        Self {
            item,
            page,
            cell,
            contents: Vec::new(),
        }
    }

    pub fn id(&self) -> ItemId {
        self.item.id
    }

    pub fn span(&self) -> Span {
        self.item.span
    }

    pub fn is_folder(&self) -> bool {
        self.item.kind == ItemKind::Folder
    }

    /// Whether `item` can be dropped into this folder.
    pub fn folder_accepts(&self, item: &Item, capacity: usize) -> bool {
        self.is_folder()
            && item.kind.is_shortcut_like()
            && self.contents.len() < capacity
            && !self.contents.iter().any(|inner| inner.id == item.id)
    }
}
