//! Scripted interaction sessions.
//!
//! A script is a JSON array of [`Command`]s run against a fresh canvas on a manual clock. The
//! report lists what every command returned and which changes it queued for persistence, followed
//! by the final state.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, Context as _};
use async_channel::Receiver;
use deckgrid_config::{Config, TransitionEffect};
use serde::{Deserialize, Serialize};

use crate::animation::Clock;
use crate::input::PointerEvent;
use crate::layout::drag::DropOutcome;
use crate::layout::grid::Cell;
use crate::layout::item::{Item, ItemId};
use crate::layout::page::PageId;
use crate::layout::snapshot::CanvasSnapshot;
use crate::layout::transition::{PageRenderer, PageTransform};
use crate::layout::{Canvas, DeletePage};
use crate::persistence::{PersistOp, Persistence};
use crate::utils::Point;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub enum Command {
    AddItem {
        item: Item,
        page: usize,
        cell: Cell,
    },
    RemoveItem {
        id: ItemId,
    },
    /// Moves the clock to the event time, then handles the event.
    Pointer(PointerEvent),
    /// Moves the clock forward by this many milliseconds and advances animations.
    Advance(u64),
    DragItem {
        id: ItemId,
        pos: Point,
    },
    DragExternal {
        item: Item,
        pos: Point,
    },
    DragForeign {
        mime: String,
        pos: Point,
    },
    DragMove {
        pos: Point,
    },
    Drop {
        pos: Point,
    },
    CancelDrag,
    SnapToPage(usize),
    EnterPreview,
    ExitPreview,
    PreviewDrag {
        page: usize,
    },
    PreviewMove {
        pos: Point,
    },
    PreviewDrop,
    PreviewCancel,
    AddPage,
    DeletePage {
        page: usize,
        /// Answer to give if the page holds items.
        #[serde(default)]
        confirm: bool,
    },
    SetDefaultPage(usize),
    SetEffect(String),
    /// Renders a frame and reports the page transforms.
    Frame,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Script {
    pub commands: Vec<Command>,
}

impl Script {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents =
            fs::read_to_string(path).with_context(|| format!("error reading {path:?}"))?;
        Self::parse(&contents).with_context(|| format!("error parsing {path:?}"))
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

/// What a single command did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Step {
    pub index: usize,
    /// Time of the clock after the command, in milliseconds.
    pub time: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accepted: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<DropOutcome>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub persisted: Vec<PersistOp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame: Option<Vec<(PageId, PageTransform)>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub steps: Vec<Step>,
    pub final_state: CanvasSnapshot,
}

#[derive(Default)]
struct CollectingRenderer {
    transforms: Vec<(PageId, PageTransform)>,
}

impl PageRenderer for CollectingRenderer {
    fn apply_transform(&mut self, page: PageId, transform: &PageTransform) {
        self.transforms.push((page, *transform));
    }

    fn invalidate(&mut self, page: PageId) {
        trace!("page {page} invalidated");
    }
}

struct Session {
    canvas: Canvas,
    clock: Clock,
    persisted: Receiver<PersistOp>,
}

impl Session {
    fn new(config: &Config) -> Self {
        let clock = Clock::with_time(Duration::ZERO);
        let mut canvas = Canvas::new(clock.clone(), config);
        let (persistence, persisted) = Persistence::channel();
        canvas.set_persistence(persistence);

        Self {
            canvas,
            clock,
            persisted,
        }
    }

    fn run(&mut self, index: usize, command: &Command) -> anyhow::Result<Step> {
        let mut step = Step {
            index,
            time: 0,
            accepted: None,
            outcome: None,
            persisted: Vec::new(),
            frame: None,
        };

        let canvas = &mut self.canvas;
        match command {
            Command::AddItem { item, page, cell } => {
                step.accepted = Some(canvas.add_item(item.clone(), *page, *cell));
            }
            Command::RemoveItem { id } => step.accepted = Some(canvas.remove_item(*id)),
            Command::Pointer(event) => {
                self.clock.set_time(event.time);
                canvas.advance_animations();
                step.outcome = canvas.handle_pointer(*event);
            }
            Command::Advance(ms) => {
                self.clock.advance(Duration::from_millis(*ms));
                canvas.advance_animations();
            }
            Command::DragItem { id, pos } => {
                step.accepted = Some(canvas.drag_item_begin(*id, *pos));
            }
            Command::DragExternal { item, pos } => {
                step.accepted = Some(canvas.drag_external_begin(item.clone(), *pos));
            }
            Command::DragForeign { mime, pos } => {
                step.accepted = Some(canvas.drag_foreign_begin(mime.clone(), *pos));
            }
            Command::DragMove { pos } => step.accepted = Some(canvas.drag_update(*pos)),
            Command::Drop { pos } => step.outcome = canvas.drag_drop(*pos),
            Command::CancelDrag => step.outcome = canvas.drag_cancel(),
            Command::SnapToPage(page) => canvas.snap_to_page(*page),
            Command::EnterPreview => step.accepted = Some(canvas.enter_preview()),
            Command::ExitPreview => step.accepted = Some(canvas.exit_preview()),
            Command::PreviewDrag { page } => {
                step.accepted = Some(canvas.preview_drag_begin(*page));
            }
            Command::PreviewMove { pos } => {
                step.accepted = Some(canvas.preview_drag_update(*pos));
            }
            Command::PreviewDrop => step.accepted = Some(canvas.preview_drag_drop()),
            Command::PreviewCancel => step.accepted = Some(canvas.preview_drag_cancel()),
            Command::AddPage => step.accepted = Some(canvas.add_page().is_some()),
            Command::DeletePage { page, confirm } => {
                let deleted = match canvas.delete_page(*page) {
                    DeletePage::Deleted => true,
                    DeletePage::NeedsConfirmation(request) => {
                        canvas.confirm_delete_page(request, *confirm)
                    }
                    DeletePage::Rejected => false,
                };
                step.accepted = Some(deleted);
            }
            Command::SetDefaultPage(page) => {
                step.accepted = Some(canvas.set_default_page(*page));
            }
            Command::SetEffect(name) => {
                let effect: TransitionEffect = name.parse().map_err(|err| anyhow!("{err}"))?;
                let mut renderer = CollectingRenderer::default();
                canvas.set_transition_effect(effect, &mut renderer);
            }
            Command::Frame => {
                let mut renderer = CollectingRenderer::default();
                canvas.render_frame(&mut renderer);
                step.frame = Some(renderer.transforms);
            }
        }

        step.time = self.clock.now().as_millis() as u64;
        step.persisted = std::iter::from_fn(|| self.persisted.try_recv().ok()).collect();
        Ok(step)
    }
}

/// Runs a script against a fresh canvas.
pub fn run(config: &Config, script: &Script) -> anyhow::Result<Report> {
    let mut session = Session::new(config);

    let steps = script
        .commands
        .iter()
        .enumerate()
        .map(|(index, command)| {
            session
                .run(index, command)
                .with_context(|| format!("error running command {index}"))
        })
        .collect::<anyhow::Result<_>>()?;

    Ok(Report {
        steps,
        final_state: session.canvas.snapshot(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::item::ItemKind;

    #[test]
    fn parses_commands() {
        let script = Script::parse(
            r#"[
                {"add-item": {"item": {"id": 1, "kind": "application", "span": {"x": 1, "y": 1}},
                              "page": 2, "cell": {"x": 0, "y": 0}}},
                {"pointer": {"id": 0, "phase": "down", "pos": {"x": 10, "y": 20}, "time": 16}},
                {"advance": 250},
                "enter-preview",
                {"delete-page": {"page": 1}},
                {"set-effect": "cube-in"}
            ]"#,
        )
        .unwrap();

        assert_eq!(script.commands.len(), 6);
        assert_eq!(
            script.commands[0],
            Command::AddItem {
                item: Item::new(1, ItemKind::Application),
                page: 2,
                cell: Cell::new(0, 0),
            }
        );
        let Command::Pointer(event) = &script.commands[1] else {
            panic!("expected a pointer event");
        };
        assert_eq!(event.time, Duration::from_millis(16));
        assert_eq!(
            script.commands[4],
            Command::DeletePage {
                page: 1,
                confirm: false
            }
        );
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(Script::parse(r#"[{"drop": {"pos": {"x": 0, "y": 0}, "extra": 1}}]"#).is_err());
    }

    #[test]
    fn drag_session_is_reported() {
        let script = Script::parse(
            r#"[
                {"add-item": {"item": {"id": 1, "kind": "application", "span": {"x": 1, "y": 1}},
                              "page": 2, "cell": {"x": 0, "y": 0}}},
                {"add-item": {"item": {"id": 2, "kind": "shortcut", "span": {"x": 1, "y": 1}},
                              "page": 2, "cell": {"x": 1, "y": 0}}},
                {"drag-item": {"id": 2, "pos": {"x": 405, "y": 240}}},
                {"drag-move": {"pos": {"x": 135, "y": 240}}},
                {"advance": 300},
                {"drop": {"pos": {"x": 135, "y": 240}}}
            ]"#,
        )
        .unwrap();

        let report = run(&Config::default(), &script).unwrap();
        assert_eq!(report.steps.len(), 6);
        assert_eq!(report.steps[4].time, 300);
        assert_eq!(
            report.steps[5].outcome,
            Some(DropOutcome::CreatedFolder { folder: ItemId(3) })
        );
        assert_eq!(report.steps[5].persisted.len(), 3);

        let page = &report.final_state.pages[2];
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].contents, vec![ItemId(1), ItemId(2)]);
    }

    #[test]
    fn bad_effect_name_fails_with_context() {
        let script = Script::parse(r#"[{"set-effect": "wobbly"}]"#).unwrap();
        let err = run(&Config::default(), &script).unwrap_err();
        assert_eq!(err.to_string(), "error running command 0");
    }
}
