//! Editor state and the mutation commit path.
//!
//! # Overview
//!
//! [`Editor`] owns the [`Document`], the current [`Selection`] and the registered
//! [`Normalizer`]s. Every mutation primitive goes through one commit path:
//!
//! 1. Apply the requested [`Operation`]s (the selection is transformed along with them)
//! 2. Run the normalization pass over every dirty element until it settles
//! 3. Increment the version number and notify subscribers with a [`DocumentChange`]
//!
//! Normalization is part of the commit, so by the time a mutation method returns (and by
//! the time any subscriber runs) the document already satisfies every registered rule.
//! A commit that fails halfway is rolled back and leaves document and selection untouched.
//!
//! # Example
//!
//! ```rust
//! use richtext_core::{BlockKind, Editor, Node, Path, Point, Selection};
//!
//! let mut editor = Editor::from_nodes(vec![Node::block(BlockKind::Paragraph, "Hello")]);
//!
//! editor.subscribe(|change| {
//!     println!("Version {} -> {}: {:?}", change.old_version, change.new_version, change.kind);
//! });
//!
//! editor.set_selection(Selection::collapsed(Point::new([0, 0], 5))).unwrap();
//! editor.insert_text(", World!").unwrap();
//!
//! assert_eq!(editor.document().string(&Path::from([0])), "Hello, World!");
//! assert_eq!(editor.version(), 2);
//! ```

use crate::document::Document;
use crate::error::CoreError;
use crate::node::{Alignment, BlockKind, Node, NodeId};
use crate::normalize::{EnsureTextChild, MAX_ITERATIONS_PER_DIRTY_PATH, Normalizer};
use crate::ops::{NodeProperties, Operation};
use crate::path::{Path, Point, Selection};
use std::collections::BTreeSet;
use std::ops::Range;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Change kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// Document content or structure modified
    DocumentModified,
    /// Selection moved without a document edit
    SelectionChanged,
}

/// Change record delivered to subscribers.
#[derive(Debug, Clone)]
pub struct DocumentChange {
    /// Change kind
    pub kind: ChangeKind,
    /// Version before the change
    pub old_version: u64,
    /// Version after the change
    pub new_version: u64,
    /// Applied operations in order, normalization corrections included.
    pub operations: Arc<[Operation]>,
    /// Ids of every element on the path of an applied operation (ancestors included), plus
    /// the ids inside removed subtrees.
    pub touched: Vec<NodeId>,
}

impl DocumentChange {
    /// Returns `true` if the subtree of the element `id` was touched by this change.
    pub fn touches(&self, id: NodeId) -> bool {
        self.touched.contains(&id)
    }
}

/// Change callback function type
pub type ChangeCallback = Box<dyn FnMut(&DocumentChange) + Send>;

/// Operations applied so far by the commit in progress.
pub(crate) struct Pending {
    applied: Vec<Operation>,
    dirty: Vec<Path>,
    touched: BTreeSet<NodeId>,
    selection_before: Option<Selection>,
}

/// Headless rich-text editor: document, selection, normalizers and subscribers.
pub struct Editor {
    document: Document,
    selection: Option<Selection>,
    version: u64,
    normalizers: Vec<Box<dyn Normalizer>>,
    callbacks: Vec<ChangeCallback>,
}

impl Editor {
    /// Create an editor over `document` with no selection.
    pub fn new(document: Document) -> Self {
        Self {
            document,
            selection: None,
            version: 0,
            normalizers: Vec::new(),
            callbacks: Vec::new(),
        }
    }

    /// Create an editor over a document built from `nodes`.
    pub fn from_nodes(nodes: Vec<Node>) -> Self {
        Self::new(Document::new(nodes))
    }

    /// The document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The current selection, if any.
    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    /// Current version number (incremented by every effective change).
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Check if state has changed since a version
    pub fn has_changed_since(&self, version: u64) -> bool {
        self.version > version
    }

    /// Subscribe to change notifications
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&DocumentChange) + Send + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    /// Register a content rule. Rules run in registration order, after the kernel's own.
    ///
    /// Registration does not re-check existing content; call [`Editor::normalize_all`]
    /// for that.
    pub fn register_normalizer<N>(&mut self, normalizer: N)
    where
        N: Normalizer + 'static,
    {
        debug!(normalizer = normalizer.name(), "registered normalizer");
        self.normalizers.push(Box::new(normalizer));
    }

    /// Run every rule over every element of the document.
    pub fn normalize_all(&mut self) -> Result<bool, CoreError> {
        let all: Vec<Path> = self
            .document
            .elements_matching(|_| true)
            .into_iter()
            .map(|(path, _)| path)
            .collect();
        self.transact(|_, pending| {
            pending.dirty.extend(all);
            Ok(())
        })
    }

    /// Replace the selection. Both points must address existing text.
    pub fn set_selection(&mut self, selection: Selection) -> Result<(), CoreError> {
        self.document.validate_point(&selection.anchor)?;
        self.document.validate_point(&selection.focus)?;
        if self.selection.as_ref() == Some(&selection) {
            return Ok(());
        }
        self.selection = Some(selection);
        self.bump_selection_version();
        Ok(())
    }

    /// Drop the selection (the editor loses its cursor context).
    pub fn clear_selection(&mut self) {
        if self.selection.take().is_some() {
            self.bump_selection_version();
        }
    }

    /// Insert `text` at the selection, replacing selected text first.
    ///
    /// Returns `Ok(false)` without changes when there is no selection. The selection ends
    /// collapsed after the inserted text.
    pub fn insert_text(&mut self, text: &str) -> Result<bool, CoreError> {
        let Some(selection) = self.selection.clone() else {
            debug!("insert_text without selection ignored");
            return Ok(false);
        };
        let removals = self.selected_text_removals(&selection);
        let start = selection.start().clone();
        self.transact(|editor, pending| {
            for op in removals {
                editor.apply_op(pending, op)?;
            }
            editor.apply_op(
                pending,
                Operation::InsertText {
                    path: start.path.clone(),
                    offset: start.offset,
                    text: text.to_string(),
                },
            )?;
            editor.selection = Some(Selection::collapsed(Point {
                path: start.path.clone(),
                offset: start.offset + text.chars().count(),
            }));
            Ok(())
        })
    }

    /// Insert `text` at an explicit location. The selection only moves if it sits in the
    /// same text at or after `at`.
    pub fn insert_text_at(&mut self, at: &Point, text: &str) -> Result<bool, CoreError> {
        self.document.validate_point(at)?;
        let op = Operation::InsertText {
            path: at.path.clone(),
            offset: at.offset,
            text: text.to_string(),
        };
        self.transact(|editor, pending| editor.apply_op(pending, op))
    }

    /// Delete the characters `range` of the text at `path`.
    pub fn delete_range(&mut self, path: &Path, range: Range<usize>) -> Result<bool, CoreError> {
        let op = self.removal(path, range)?;
        self.transact(|editor, pending| editor.apply_op(pending, op))
    }

    /// Replace the characters `range` of the text at `path` with `text`, as one change.
    pub fn replace_text(
        &mut self,
        path: &Path,
        range: Range<usize>,
        text: &str,
    ) -> Result<bool, CoreError> {
        let offset = range.start;
        let removal = self.removal(path, range)?;
        let insertion = Operation::InsertText {
            path: path.clone(),
            offset,
            text: text.to_string(),
        };
        self.transact(|editor, pending| {
            editor.apply_op(pending, removal)?;
            editor.apply_op(pending, insertion)
        })
    }

    /// Insert `node` so that it ends up at `path`. Returns the id assigned to the node when
    /// it is an element.
    pub fn insert_node(&mut self, path: &Path, mut node: Node) -> Result<Option<NodeId>, CoreError> {
        self.document.assign_ids(&mut node);
        let id = node.as_element().map(|element| element.id);
        let op = Operation::InsertNode {
            path: path.clone(),
            node,
        };
        self.transact(|editor, pending| editor.apply_op(pending, op))?;
        Ok(id)
    }

    /// Remove the node at `path`.
    pub fn remove_node(&mut self, path: &Path) -> Result<bool, CoreError> {
        let node = self
            .document
            .node(path)
            .cloned()
            .ok_or_else(|| CoreError::InvalidPath(path.clone()))?;
        let op = Operation::RemoveNode {
            path: path.clone(),
            node,
        };
        self.transact(|editor, pending| editor.apply_op(pending, op))
    }

    /// Change the block type of the element at `path`.
    pub fn set_block_kind(&mut self, path: &Path, kind: BlockKind) -> Result<bool, CoreError> {
        let op = self.set_node(path, |props| props.kind = kind)?;
        self.transact(|editor, pending| editor.apply_op(pending, op))
    }

    /// Set or clear the alignment of the element at `path`.
    pub fn set_alignment(
        &mut self,
        path: &Path,
        align: Option<Alignment>,
    ) -> Result<bool, CoreError> {
        let op = self.set_node(path, |props| props.align = align)?;
        self.transact(|editor, pending| editor.apply_op(pending, op))
    }

    /// Apply externally produced operations as one change.
    pub fn apply_operations(&mut self, ops: Vec<Operation>) -> Result<bool, CoreError> {
        self.transact(|editor, pending| {
            for op in ops {
                editor.apply_op(pending, op)?;
            }
            Ok(())
        })
    }

    /// Run `f` as one change: everything it applies is normalized, committed and notified
    /// together, or rolled back together on error.
    pub(crate) fn transact<F>(&mut self, f: F) -> Result<bool, CoreError>
    where
        F: FnOnce(&mut Self, &mut Pending) -> Result<(), CoreError>,
    {
        let mut pending = Pending {
            applied: Vec::new(),
            dirty: Vec::new(),
            touched: BTreeSet::new(),
            selection_before: self.selection.clone(),
        };
        if let Err(err) = f(self, &mut pending) {
            self.rollback(pending);
            return Err(err);
        }
        if let Err(err) = self.normalize_dirty(&mut pending) {
            warn!(error = %err, "normalization failed; rolling back");
            self.rollback(pending);
            return Err(err);
        }
        if pending.applied.is_empty() {
            return Ok(false);
        }

        let old_version = self.version;
        self.version += 1;
        let change = DocumentChange {
            kind: ChangeKind::DocumentModified,
            old_version,
            new_version: self.version,
            operations: pending.applied.into(),
            touched: pending.touched.into_iter().collect(),
        };
        debug!(
            version = self.version,
            operations = change.operations.len(),
            "document change committed"
        );
        self.notify_callbacks(&change);
        Ok(true)
    }

    /// Apply one operation inside a change.
    pub(crate) fn apply_op(&mut self, pending: &mut Pending, mut op: Operation) -> Result<(), CoreError> {
        if op.is_noop() {
            return Ok(());
        }
        self.reconcile(&mut op);
        op.apply(&mut self.document)?;

        pending.dirty = pending
            .dirty
            .drain(..)
            .filter_map(|path| op.transform_path(&path))
            .collect();
        pending.dirty.extend(op.dirty_paths());

        match &op {
            Operation::RemoveNode { path, node } => {
                if let Some(parent) = path.parent() {
                    pending.touched.extend(self.document.element_ids_along(&parent));
                }
                node.for_each_element_id(&mut |id| {
                    pending.touched.insert(id);
                });
            }
            _ => pending
                .touched
                .extend(self.document.element_ids_along(op.path())),
        }

        if let Some(selection) = self.selection.take() {
            self.selection = self.transform_selection(selection, &op);
        }
        pending.applied.push(op);
        Ok(())
    }

    /// Make the payload of `op` match the document so that its inverse is exact.
    fn reconcile(&mut self, op: &mut Operation) {
        match op {
            Operation::InsertNode { node, .. } => self.document.assign_ids(node),
            Operation::RemoveNode { path, node } => {
                if let Some(actual) = self.document.node(path) {
                    *node = actual.clone();
                }
            }
            Operation::RemoveText { path, offset, text } => {
                if let Some(span) = self.document.text(path) {
                    let len = text.chars().count();
                    let actual: String = span.text.chars().skip(*offset).take(len).collect();
                    if actual.chars().count() == len {
                        *text = actual;
                    }
                }
            }
            Operation::SetNode {
                path, properties, ..
            } => {
                if let Some(element) = self.document.element(path) {
                    *properties = NodeProperties {
                        kind: element.kind.clone(),
                        align: element.align,
                    };
                }
            }
            Operation::InsertText { .. } => {}
        }
    }

    fn normalize_dirty(&mut self, pending: &mut Pending) -> Result<(), CoreError> {
        let budget = pending.dirty.len().max(1) * MAX_ITERATIONS_PER_DIRTY_PATH;
        let mut iterations = 0;
        loop {
            // Deepest paths last, so children are normalized before their ancestors.
            pending
                .dirty
                .sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
            pending.dirty.dedup();
            let Some(path) = pending.dirty.pop() else {
                return Ok(());
            };
            iterations += 1;
            if iterations > budget {
                return Err(CoreError::NormalizationLoop(iterations));
            }
            for op in self.corrections_for(&path) {
                self.apply_op(pending, op)?;
            }
        }
    }

    fn corrections_for(&self, path: &Path) -> Vec<Operation> {
        let Some(element) = self.document.element(path) else {
            return Vec::new();
        };
        let builtin = EnsureTextChild.normalize(&self.document, path, element);
        if !builtin.is_empty() {
            return builtin;
        }
        for normalizer in &self.normalizers {
            let ops = normalizer.normalize(&self.document, path, element);
            if !ops.is_empty() {
                trace!(
                    normalizer = normalizer.name(),
                    path = %path,
                    operations = ops.len(),
                    "normalizer produced corrections"
                );
                return ops;
            }
        }
        Vec::new()
    }

    fn rollback(&mut self, pending: Pending) {
        for op in pending.applied.iter().rev() {
            if let Err(err) = op.inverse().apply(&mut self.document) {
                warn!(error = %err, "failed to revert operation during rollback");
            }
        }
        self.selection = pending.selection_before;
    }

    fn transform_selection(&self, selection: Selection, op: &Operation) -> Option<Selection> {
        let anchor = op
            .transform_point(&selection.anchor)
            .or_else(|| self.fallback_point(op.path()));
        let focus = op
            .transform_point(&selection.focus)
            .or_else(|| self.fallback_point(op.path()));
        Some(Selection::new(anchor?, focus?))
    }

    /// Nearest surviving text position after the node at `removed` disappeared.
    fn fallback_point(&self, removed: &Path) -> Option<Point> {
        if let Some(index) = removed.last()
            && index > 0
            && let Some(parent) = removed.parent()
        {
            let previous = parent.child(index - 1);
            if let Some(point) = self.document.end_point(&previous) {
                return Some(point);
            }
        }
        if let Some(parent) = removed.parent()
            && !parent.is_empty()
            && let Some(point) = self.document.start_point(&parent)
        {
            return Some(point);
        }
        self.document.start_point(&Path::root())
    }

    fn selected_text_removals(&self, selection: &Selection) -> Vec<Operation> {
        if selection.is_collapsed() {
            return Vec::new();
        }
        let (start, end) = (selection.start(), selection.end());
        self.document
            .descendants()
            .filter_map(|(path, node)| {
                let span = node.as_text()?;
                if path < start.path || path > end.path {
                    return None;
                }
                let from = if path == start.path { start.offset } else { 0 };
                let to = if path == end.path {
                    end.offset
                } else {
                    span.char_len()
                };
                (to > from).then(|| Operation::RemoveText {
                    text: span.text.chars().skip(from).take(to - from).collect(),
                    path,
                    offset: from,
                })
            })
            .collect()
    }

    fn removal(&self, path: &Path, range: Range<usize>) -> Result<Operation, CoreError> {
        let span = self
            .document
            .node(path)
            .ok_or_else(|| CoreError::InvalidPath(path.clone()))?
            .as_text()
            .ok_or_else(|| CoreError::NotText(path.clone()))?;
        if range.start > range.end || range.end > span.char_len() {
            return Err(CoreError::InvalidOffset {
                path: path.clone(),
                offset: range.end.max(range.start),
            });
        }
        Ok(Operation::RemoveText {
            path: path.clone(),
            offset: range.start,
            text: span
                .text
                .chars()
                .skip(range.start)
                .take(range.end - range.start)
                .collect(),
        })
    }

    pub(crate) fn set_node<F>(&self, path: &Path, edit: F) -> Result<Operation, CoreError>
    where
        F: FnOnce(&mut NodeProperties),
    {
        let element = self
            .document
            .node(path)
            .ok_or_else(|| CoreError::InvalidPath(path.clone()))?
            .as_element()
            .ok_or_else(|| CoreError::NotElement(path.clone()))?;
        let properties = NodeProperties {
            kind: element.kind.clone(),
            align: element.align,
        };
        let mut new_properties = properties.clone();
        edit(&mut new_properties);
        Ok(Operation::SetNode {
            path: path.clone(),
            properties,
            new_properties,
        })
    }

    /// Overwrite the selection inside a change (no separate notification).
    pub(crate) fn put_selection(&mut self, selection: Option<Selection>) {
        self.selection = selection;
    }

    fn bump_selection_version(&mut self) {
        let old_version = self.version;
        self.version += 1;
        let change = DocumentChange {
            kind: ChangeKind::SelectionChanged,
            old_version,
            new_version: self.version,
            operations: Arc::from(Vec::new()),
            touched: Vec::new(),
        };
        self.notify_callbacks(&change);
    }

    /// Notify all callbacks
    fn notify_callbacks(&mut self, change: &DocumentChange) {
        for callback in &mut self.callbacks {
            callback(change);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Element;
    use std::sync::Mutex;

    struct NoDigits;

    impl Normalizer for NoDigits {
        fn name(&self) -> &'static str {
            "no-digits"
        }

        fn normalize(&self, doc: &Document, path: &Path, element: &Element) -> Vec<Operation> {
            if element.kind != BlockKind::CodeBlock {
                return Vec::new();
            }
            doc.descendants_at(path)
                .filter_map(|(text_path, node)| {
                    let span = node.as_text()?;
                    let index = span.text.chars().position(|ch| ch.is_ascii_digit())?;
                    Some(Operation::RemoveText {
                        path: text_path,
                        offset: index,
                        text: span.text.chars().nth(index)?.to_string(),
                    })
                })
                .collect()
        }
    }

    /// Keeps inserting text forever.
    struct NeverSettles;

    impl Normalizer for NeverSettles {
        fn name(&self) -> &'static str {
            "never-settles"
        }

        fn normalize(&self, _doc: &Document, path: &Path, _element: &Element) -> Vec<Operation> {
            vec![Operation::InsertText {
                path: path.child(0),
                offset: 0,
                text: "x".to_string(),
            }]
        }
    }

    fn editor() -> Editor {
        Editor::from_nodes(vec![
            Node::block(BlockKind::Paragraph, "abc"),
            Node::block(BlockKind::CodeBlock, "xyz"),
        ])
    }

    #[test]
    fn test_insert_without_selection_is_noop() {
        let mut editor = editor();
        assert_eq!(editor.insert_text("q"), Ok(false));
        assert_eq!(editor.version(), 0);
    }

    #[test]
    fn test_normalizer_runs_before_subscribers() {
        let mut editor = editor();
        editor.register_normalizer(NoDigits);

        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        editor.subscribe(move |change| {
            seen_clone.lock().unwrap().push((change.kind, change.operations.len()));
        });

        editor
            .insert_text_at(&Point::new([1, 0], 1), "1a2")
            .unwrap();
        assert_eq!(editor.document().string(&Path::from([1])), "xayz");

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0], (ChangeKind::DocumentModified, 3));
    }

    #[test]
    fn test_non_terminating_rule_rolls_back() {
        let mut editor = editor();
        editor.register_normalizer(NeverSettles);
        editor
            .set_selection(Selection::collapsed(Point::new([0, 0], 1)))
            .unwrap();
        let version = editor.version();

        let err = editor.insert_text("!").unwrap_err();
        assert!(matches!(err, CoreError::NormalizationLoop(_)));
        assert_eq!(editor.document().string(&Path::from([0])), "abc");
        assert_eq!(editor.selection(), Some(&Selection::collapsed(Point::new([0, 0], 1))));
        assert_eq!(editor.version(), version);
    }

    #[test]
    fn test_empty_element_gets_text_child() {
        let mut editor = editor();
        editor
            .insert_node(&Path::from([1]), Node::element(BlockKind::Paragraph, vec![]))
            .unwrap();
        assert_eq!(editor.document().end_point(&Path::from([1])), Some(Point::new([1, 0], 0)));
    }

    #[test]
    fn test_expanded_selection_is_replaced() {
        let mut editor = editor();
        editor
            .set_selection(Selection::new(Point::new([0, 0], 1), Point::new([1, 0], 2)))
            .unwrap();
        editor.insert_text("-").unwrap();
        assert_eq!(editor.document().string(&Path::from([0])), "a-");
        assert_eq!(editor.document().string(&Path::from([1])), "z");
        assert_eq!(
            editor.selection(),
            Some(&Selection::collapsed(Point::new([0, 0], 2)))
        );
    }

    #[test]
    fn test_removing_selected_block_relocates_cursor() {
        let mut editor = editor();
        editor
            .set_selection(Selection::collapsed(Point::new([1, 0], 2)))
            .unwrap();
        editor.remove_node(&Path::from([1])).unwrap();
        assert_eq!(
            editor.selection(),
            Some(&Selection::collapsed(Point::new([0, 0], 3)))
        );
    }

    #[test]
    fn test_same_selection_does_not_bump_version() {
        let mut editor = editor();
        let caret = Selection::collapsed(Point::new([0, 0], 0));
        editor.set_selection(caret.clone()).unwrap();
        editor.set_selection(caret).unwrap();
        assert_eq!(editor.version(), 1);
    }
}
