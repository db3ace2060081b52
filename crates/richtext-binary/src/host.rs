//! The extension as a whole, wired to one [`Editor`].
//!
//! [`BinaryBlocks`] installs the validator, listens to committed changes, and keeps one
//! [`BlockPresenter`] plus one layout per binary block currently in the document.
//!
//! A host event loop looks like:
//!
//! ```rust
//! use richtext_binary::{BinaryBlockConfig, BinaryBlocks, Measurement, PresenterEvent, sample_document};
//! use richtext_core::{Editor, NodeId};
//!
//! let mut editor = Editor::new(sample_document());
//! let mut blocks = BinaryBlocks::new(BinaryBlockConfig::default());
//! let measure = |_: NodeId| -> Option<Measurement> { None };
//!
//! blocks.install(&mut editor).unwrap();
//! blocks.sync(&editor, &measure);
//!
//! let first = blocks.blocks().next().unwrap();
//! blocks
//!     .handle_event(&mut editor, first, PresenterEvent::PointerEnter { x: 4.0, y: 2.0 })
//!     .unwrap();
//! assert_eq!(blocks.view(editor.document(), first).unwrap().tooltip.text, "hi");
//! ```

use crate::config::BinaryBlockConfig;
use crate::insertion::{InsertOutcome, append_digit};
use crate::layout::{LayoutRegistry, LineLayout, MeasurementProvider};
use crate::presenter::{BlockPresenter, BlockView, EventDisposition, PresenterEvent};
use crate::shortcut::apply_fence_shortcut;
use crate::validator::BinaryValidator;
use richtext_core::{BlockKind, CoreError, Document, DocumentChange, Editor, NodeId};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::mpsc::{self, Receiver};
use tracing::{debug, info, trace};

/// What [`BinaryBlocks::sync`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Blocks that got a presenter.
    pub mounted: Vec<NodeId>,
    /// Blocks whose presenter was dropped.
    pub unmounted: Vec<NodeId>,
    /// Blocks whose content was re-read after a change.
    pub refreshed: Vec<NodeId>,
}

impl SyncReport {
    /// Returns `true` if nothing happened.
    pub fn is_empty(&self) -> bool {
        self.mounted.is_empty() && self.unmounted.is_empty() && self.refreshed.is_empty()
    }
}

/// Binary block extension state for one editor.
pub struct BinaryBlocks {
    config: BinaryBlockConfig,
    changes: Option<Receiver<DocumentChange>>,
    presenters: BTreeMap<NodeId, BlockPresenter>,
    layouts: LayoutRegistry,
}

impl BinaryBlocks {
    /// Create the extension. Nothing happens until [`BinaryBlocks::install`].
    pub fn new(config: BinaryBlockConfig) -> Self {
        Self {
            config,
            changes: None,
            presenters: BTreeMap::new(),
            layouts: LayoutRegistry::new(),
        }
    }

    /// The configuration.
    pub fn config(&self) -> &BinaryBlockConfig {
        &self.config
    }

    /// Returns `true` once [`BinaryBlocks::install`] ran.
    pub fn is_installed(&self) -> bool {
        self.changes.is_some()
    }

    /// Register the validator with `editor`, subscribe to its changes and validate the
    /// existing content. Returns `Ok(true)` if existing content had to be corrected.
    pub fn install(&mut self, editor: &mut Editor) -> Result<bool, CoreError> {
        editor.register_normalizer(BinaryValidator::new(self.config.whitespace));

        let (tx, rx) = mpsc::channel();
        editor.subscribe(move |change: &DocumentChange| {
            if change.touched.is_empty() {
                return;
            }
            if tx.send(change.clone()).is_err() {
                trace!("binary blocks dropped; change not forwarded");
            }
        });
        self.changes = Some(rx);

        let corrected = editor.normalize_all()?;
        info!(
            whitespace = ?self.config.whitespace,
            corrected,
            "binary blocks installed"
        );
        Ok(corrected)
    }

    /// Bring presenters and layouts up to date with `editor`: deliver pending changes and
    /// mount or unmount blocks that appeared or disappeared.
    pub fn sync(&mut self, editor: &Editor, provider: &dyn MeasurementProvider) -> SyncReport {
        let doc = editor.document();
        let pending: Vec<DocumentChange> = self
            .changes
            .as_ref()
            .map(|rx| rx.try_iter().collect())
            .unwrap_or_default();

        let mut report = SyncReport::default();
        let mut refreshed = BTreeSet::new();
        for change in &pending {
            refreshed.extend(self.handle_change(doc, change, provider));
        }

        let live: BTreeSet<NodeId> = doc
            .elements_matching(|element| element.kind == BlockKind::BinaryCode)
            .into_iter()
            .map(|(_, element)| element.id)
            .collect();

        let gone: Vec<NodeId> = self
            .presenters
            .keys()
            .filter(|id| !live.contains(id))
            .copied()
            .collect();
        for id in gone {
            self.presenters.remove(&id);
            self.layouts.unmount(id);
            refreshed.remove(&id);
            debug!(block = %id, "binary block unmounted");
            report.unmounted.push(id);
        }

        for id in live {
            if self.presenters.contains_key(&id) {
                continue;
            }
            self.presenters
                .insert(id, BlockPresenter::new(id, &self.config, doc));
            self.layouts.on_mount(id, provider);
            refreshed.remove(&id);
            debug!(block = %id, "binary block mounted");
            report.mounted.push(id);
        }

        report.refreshed = refreshed.into_iter().collect();
        report
    }

    /// Deliver one change to every presenter it touches. Returns the refreshed blocks.
    pub fn handle_change(
        &mut self,
        doc: &Document,
        change: &DocumentChange,
        provider: &dyn MeasurementProvider,
    ) -> Vec<NodeId> {
        let mut refreshed = Vec::new();
        for (id, presenter) in self.presenters.iter_mut() {
            if presenter.on_document_change(doc, change) {
                self.layouts.refresh(*id, provider);
                refreshed.push(*id);
            }
        }
        refreshed
    }

    /// Deliver a UI event to the presenter of `block`. Digit controls append to `block`
    /// through `editor`.
    pub fn handle_event(
        &mut self,
        editor: &mut Editor,
        block: NodeId,
        event: PresenterEvent,
    ) -> Result<EventDisposition, CoreError> {
        let Some(presenter) = self.presenters.get_mut(&block) else {
            return Ok(EventDisposition::Ignored);
        };
        // Commits since the last sync may not have reached the presenter yet.
        presenter.refresh(editor.document());
        match presenter.handle_event(event) {
            EventDisposition::AppendDigit(digit) => match append_digit(editor, block, digit)? {
                InsertOutcome::Inserted { .. } => {
                    presenter.refresh(editor.document());
                    Ok(EventDisposition::Handled)
                }
                InsertOutcome::Skipped(_) | InsertOutcome::BlockMissing(_) => {
                    Ok(EventDisposition::Ignored)
                }
            },
            other => Ok(other),
        }
    }

    /// Handle a typed space. Returns `Ok(true)` if the fence shortcut consumed it.
    pub fn handle_space(&mut self, editor: &mut Editor) -> Result<bool, CoreError> {
        if !self.config.fence_shortcut {
            return Ok(false);
        }
        apply_fence_shortcut(editor)
    }

    /// The viewport was resized: recompute every mounted block's layout.
    pub fn on_resize(&mut self, provider: &dyn MeasurementProvider) {
        self.layouts.on_resize(provider);
    }

    /// Mounted binary blocks, in id order.
    pub fn blocks(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.presenters.keys().copied()
    }

    /// Presenter of `block`.
    pub fn presenter(&self, block: NodeId) -> Option<&BlockPresenter> {
        self.presenters.get(&block)
    }

    /// Last computed layout of `block`.
    pub fn layout(&self, block: NodeId) -> Option<LineLayout> {
        self.layouts.layout(block)
    }

    /// Renderable view of `block`.
    pub fn view(&self, doc: &Document, block: NodeId) -> Option<BlockView> {
        let presenter = self.presenters.get(&block)?;
        let layout = self.layouts.layout(block).unwrap_or(LineLayout::UNAVAILABLE);
        presenter.view(doc, layout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Measurement;
    use richtext_core::{Node, Path, Point, Selection};

    fn no_measure(_: NodeId) -> Option<Measurement> {
        None
    }

    #[test]
    fn test_install_corrects_existing_content() {
        let mut editor = Editor::from_nodes(vec![Node::block(BlockKind::BinaryCode, "01a1")]);
        let mut blocks = BinaryBlocks::new(BinaryBlockConfig::default());
        assert!(!blocks.is_installed());
        assert_eq!(blocks.install(&mut editor), Ok(true));
        assert_eq!(editor.document().string(&Path::from([0])), "011");

        let report = blocks.sync(&editor, &no_measure);
        assert_eq!(report.mounted.len(), 1);
        assert!(report.refreshed.is_empty());
    }

    #[test]
    fn test_toggle_mounts_and_unmounts() {
        let mut editor = Editor::from_nodes(vec![Node::block(BlockKind::Paragraph, "0 1 a")]);
        let mut blocks = BinaryBlocks::new(BinaryBlockConfig::default());
        blocks.install(&mut editor).unwrap();
        assert!(blocks.sync(&editor, &no_measure).is_empty());

        editor
            .set_selection(Selection::collapsed(Point::new([0, 0], 0)))
            .unwrap();
        editor.toggle_block(BlockKind::BinaryCode).unwrap();
        assert_eq!(editor.document().string(&Path::from([0])), "01");
        let report = blocks.sync(&editor, &no_measure);
        assert_eq!(report.mounted.len(), 1);

        editor.toggle_block(BlockKind::BinaryCode).unwrap();
        let report = blocks.sync(&editor, &no_measure);
        assert_eq!(report.unmounted.len(), 1);
        assert!(report.mounted.is_empty());
        assert_eq!(blocks.blocks().count(), 0);
    }

    #[test]
    fn test_fence_shortcut_can_be_disabled() {
        let config = BinaryBlockConfig {
            fence_shortcut: false,
            ..BinaryBlockConfig::default()
        };
        let mut editor = Editor::from_nodes(vec![Node::block(BlockKind::Paragraph, "```")]);
        editor
            .set_selection(Selection::collapsed(Point::new([0, 0], 3)))
            .unwrap();
        let mut blocks = BinaryBlocks::new(config);
        blocks.install(&mut editor).unwrap();
        assert_eq!(blocks.handle_space(&mut editor), Ok(false));
        assert_eq!(editor.document().string(&Path::from([0])), "```");
    }
}
