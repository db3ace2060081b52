//! Block-type, alignment and mark toggles.
//!
//! These are the commands a toolbar button or hotkey dispatches: convert the selected
//! blocks to a kind (or back to paragraphs when the kind is already active), wrapping and
//! unwrapping list containers as needed, or flip a mark on the selected text.

use crate::error::CoreError;
use crate::node::{Alignment, BlockKind, Element, Mark, Node, NodeId, TextSpan};
use crate::ops::Operation;
use crate::path::{Path, Point, Selection};
use crate::state::{Editor, Pending};
use std::ops::Range;
use tracing::debug;

/// A selection point expressed relative to its enclosing block's identity.
struct BlockAnchor {
    block: NodeId,
    rest: Vec<usize>,
    offset: usize,
}

/// The selected part of one text span.
struct SpanSlice {
    parent: Path,
    index: usize,
    span: TextSpan,
    range: Range<usize>,
}

impl SpanSlice {
    fn path(&self) -> Path {
        self.parent.child(self.index)
    }

    /// Spans replacing this one and the position of the re-marked piece among them, or
    /// `None` if the mark is already as requested.
    fn pieces(&self, mark: Mark, on: bool) -> Option<(Vec<TextSpan>, usize)> {
        if self.span.marks.has(mark) == on {
            return None;
        }
        let mut marked = self.span.marks;
        marked.set(mark, on);
        let chars: Vec<char> = self.span.text.chars().collect();
        let before: String = chars[..self.range.start].iter().collect();
        let middle: String = chars[self.range.clone()].iter().collect();
        let after: String = chars[self.range.end..].iter().collect();

        let mut pieces = Vec::with_capacity(3);
        if !before.is_empty() {
            pieces.push(TextSpan::new(before).with_marks(self.span.marks));
        }
        let middle_index = pieces.len();
        pieces.push(TextSpan::new(middle).with_marks(marked));
        if !after.is_empty() {
            pieces.push(TextSpan::new(after).with_marks(self.span.marks));
        }
        Some((pieces, middle_index))
    }
}

impl Editor {
    /// Returns `true` if `mark` is set on all selected text. For a collapsed selection,
    /// the span holding the caret decides.
    pub fn is_mark_active(&self, mark: Mark) -> bool {
        let Some(selection) = self.selection() else {
            return false;
        };
        if selection.is_collapsed() {
            return self
                .document()
                .text(&selection.focus.path)
                .is_some_and(|span| span.marks.has(mark));
        }
        let slices = self.selected_slices(selection);
        !slices.is_empty() && slices.iter().all(|slice| slice.span.marks.has(mark))
    }

    /// Toggle `mark` on the selected text, splitting spans at the selection edges.
    ///
    /// The mark is cleared if every selected character has it and set otherwise. The
    /// selection ends up covering the same characters. A collapsed selection changes
    /// nothing.
    pub fn toggle_mark(&mut self, mark: Mark) -> Result<bool, CoreError> {
        let Some(selection) = self.selection().cloned() else {
            return Ok(false);
        };
        if selection.is_collapsed() {
            debug!(?mark, "toggle_mark with collapsed selection ignored");
            return Ok(false);
        }
        let on = !self.is_mark_active(mark);
        let slices = self.selected_slices(&selection);
        if slices.is_empty() {
            return Ok(false);
        }

        let mut plans = Vec::with_capacity(slices.len());
        let mut start = selection.start().clone();
        let mut end = selection.end().clone();
        let last = slices.len() - 1;
        let mut shift = 0;
        for (i, slice) in slices.iter().enumerate() {
            if i > 0 && slices[i - 1].parent != slice.parent {
                shift = 0;
            }
            let index = slice.index + shift;
            let plan = slice.pieces(mark, on);
            match &plan {
                Some((pieces, middle)) => {
                    let path = slice.parent.child(index + middle);
                    if i == 0 {
                        start = Point::new(path.clone(), 0);
                    }
                    if i == last {
                        end = Point::new(path, slice.range.len());
                    }
                    shift += pieces.len() - 1;
                }
                None => {
                    if i == 0 {
                        start = Point::new(slice.parent.child(index), start.offset);
                    }
                    if i == last {
                        end = Point::new(slice.parent.child(index), end.offset);
                    }
                }
            }
            plans.push(plan);
        }
        let restored = if selection.is_backward() {
            Selection::new(end, start)
        } else {
            Selection::new(start, end)
        };

        self.transact(|editor, pending| {
            // Later spans first, so earlier paths stay valid.
            for (slice, plan) in slices.iter().zip(plans).rev() {
                let Some((pieces, _)) = plan else {
                    continue;
                };
                let mut at = slice.path();
                editor.apply_op(
                    pending,
                    Operation::RemoveNode {
                        path: at.clone(),
                        node: Node::Text(slice.span.clone()),
                    },
                )?;
                for piece in pieces {
                    editor.apply_op(
                        pending,
                        Operation::InsertNode {
                            path: at.clone(),
                            node: Node::Text(piece),
                        },
                    )?;
                    at = at
                        .next_sibling()
                        .ok_or_else(|| CoreError::InvalidPath(at.clone()))?;
                }
            }
            editor.put_selection(Some(restored));
            Ok(())
        })
    }

    /// Returns `true` if a block touched by the selection (or one of its ancestors) has
    /// `kind`.
    pub fn is_block_active(&self, kind: &BlockKind) -> bool {
        let Some(selection) = self.selection() else {
            return false;
        };
        let doc = self.document();
        doc.blocks_in_selection(selection)
            .iter()
            .any(|(path, element)| {
                element.kind == *kind
                    || path
                        .ancestors()
                        .iter()
                        .any(|ancestor| doc.element(ancestor).is_some_and(|e| e.kind == *kind))
            })
    }

    /// Returns `true` if a block touched by the selection has alignment `align`.
    pub fn is_alignment_active(&self, align: Alignment) -> bool {
        let Some(selection) = self.selection() else {
            return false;
        };
        self.document()
            .blocks_in_selection(selection)
            .iter()
            .any(|(_, element)| element.align == Some(align))
    }

    /// Toggle the selected blocks to `kind`.
    ///
    /// - If `kind` is already active, the blocks become paragraphs.
    /// - List kinds turn the blocks into list items wrapped in one list container.
    /// - Blocks inside a list are lifted out of it first (splitting the list).
    ///
    /// Returns `Ok(false)` when there is no selection.
    pub fn toggle_block(&mut self, kind: BlockKind) -> Result<bool, CoreError> {
        let Some(selection) = self.selection().cloned() else {
            return Ok(false);
        };
        let ids: Vec<NodeId> = self
            .document()
            .blocks_in_selection(&selection)
            .iter()
            .map(|(_, element)| element.id)
            .collect();
        if ids.is_empty() {
            return Ok(false);
        }
        let active = self.is_block_active(&kind);
        let anchor = self.block_anchor(&selection.anchor);
        let focus = self.block_anchor(&selection.focus);
        let target = if active {
            BlockKind::Paragraph
        } else if kind.is_list() {
            BlockKind::ListItem
        } else {
            kind.clone()
        };

        self.transact(|editor, pending| {
            for id in ids.iter().rev() {
                editor.lift_out_of_list(pending, *id)?;
            }
            for id in &ids {
                let Some(path) = editor.document().path_of(*id) else {
                    continue;
                };
                let op = editor.set_node(&path, |props| props.kind = target.clone())?;
                editor.apply_op(pending, op)?;
            }
            if !active && kind.is_list() {
                editor.wrap_in_list(pending, &ids, kind.clone())?;
            }
            // Lifting and wrapping remove and re-insert nodes; put the selection back on the
            // same blocks.
            if let (Some(anchor), Some(focus)) = (&anchor, &focus)
                && let (Some(anchor), Some(focus)) =
                    (editor.resolve_anchor(anchor), editor.resolve_anchor(focus))
            {
                editor.put_selection(Some(Selection::new(anchor, focus)));
            }
            Ok(())
        })
    }

    /// Toggle the alignment of the selected blocks.
    pub fn toggle_alignment(&mut self, align: Alignment) -> Result<bool, CoreError> {
        let Some(selection) = self.selection().cloned() else {
            return Ok(false);
        };
        let new_align = if self.is_alignment_active(align) {
            None
        } else {
            Some(align)
        };
        let paths: Vec<Path> = self
            .document()
            .blocks_in_selection(&selection)
            .into_iter()
            .map(|(path, _)| path)
            .collect();
        self.transact(|editor, pending| {
            for path in &paths {
                let op = editor.set_node(path, |props| props.align = new_align)?;
                editor.apply_op(pending, op)?;
            }
            Ok(())
        })
    }

    /// Move the element `id` out of its list container, splitting the list around it.
    fn lift_out_of_list(&mut self, pending: &mut Pending, id: NodeId) -> Result<(), CoreError> {
        let Some(path) = self.document().path_of(id) else {
            return Ok(());
        };
        let (Some(list_path), Some(index)) = (path.parent(), path.last()) else {
            return Ok(());
        };
        let Some(list) = self.document().element(&list_path) else {
            return Ok(());
        };
        if !list.kind.is_list() {
            return Ok(());
        }
        let list_kind = list.kind.clone();
        let list_align = list.align;
        let len = list.children.len();

        let mut trailing = Vec::new();
        for i in (index + 1..len).rev() {
            trailing.push(self.take_node(pending, &list_path.child(i))?);
        }
        trailing.reverse();
        let item = self.take_node(pending, &path)?;

        let after = list_path
            .next_sibling()
            .ok_or_else(|| CoreError::InvalidPath(list_path.clone()))?;
        self.apply_op(
            pending,
            Operation::InsertNode {
                path: after.clone(),
                node: item,
            },
        )?;
        if !trailing.is_empty() {
            let mut rest = Element::new(list_kind, trailing);
            rest.align = list_align;
            let rest_path = after
                .next_sibling()
                .ok_or_else(|| CoreError::InvalidPath(after.clone()))?;
            self.apply_op(
                pending,
                Operation::InsertNode {
                    path: rest_path,
                    node: Node::Element(rest),
                },
            )?;
        }
        if index == 0 {
            self.take_node(pending, &list_path)?;
        }
        Ok(())
    }

    /// Wrap the elements `ids` in a new `kind` container. Contiguous siblings share one
    /// container; anything else is wrapped individually.
    fn wrap_in_list(
        &mut self,
        pending: &mut Pending,
        ids: &[NodeId],
        kind: BlockKind,
    ) -> Result<(), CoreError> {
        let paths: Vec<Path> = ids
            .iter()
            .filter_map(|id| self.document().path_of(*id))
            .collect();
        let Some(first) = paths.first().cloned() else {
            return Ok(());
        };
        let contiguous = paths.windows(2).all(|pair| {
            pair[0].parent() == pair[1].parent()
                && pair[0].last().map(|i| i + 1) == pair[1].last()
        });

        if contiguous {
            let mut nodes = Vec::with_capacity(paths.len());
            for path in paths.iter().rev() {
                nodes.push(self.take_node(pending, path)?);
            }
            nodes.reverse();
            return self.apply_op(
                pending,
                Operation::InsertNode {
                    path: first,
                    node: Node::element(kind, nodes),
                },
            );
        }

        for path in paths.iter().rev() {
            let node = self.take_node(pending, path)?;
            self.apply_op(
                pending,
                Operation::InsertNode {
                    path: path.clone(),
                    node: Node::element(kind.clone(), vec![node]),
                },
            )?;
        }
        Ok(())
    }

    fn selected_slices(&self, selection: &Selection) -> Vec<SpanSlice> {
        let (start, end) = (selection.start(), selection.end());
        self.document()
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
                if to <= from {
                    return None;
                }
                Some(SpanSlice {
                    parent: path.parent()?,
                    index: path.last()?,
                    span: span.clone(),
                    range: from..to,
                })
            })
            .collect()
    }

    fn block_anchor(&self, point: &Point) -> Option<BlockAnchor> {
        let (block_path, element) = self.document().enclosing_block(&point.path)?;
        Some(BlockAnchor {
            block: element.id,
            rest: point.path.as_slice()[block_path.len()..].to_vec(),
            offset: point.offset,
        })
    }

    fn resolve_anchor(&self, anchor: &BlockAnchor) -> Option<Point> {
        let base = self.document().path_of(anchor.block)?;
        let mut indices = base.as_slice().to_vec();
        indices.extend_from_slice(&anchor.rest);
        let point = Point {
            path: Path::new(indices),
            offset: anchor.offset,
        };
        self.document().validate_point(&point).ok()?;
        Some(point)
    }

    fn take_node(&mut self, pending: &mut Pending, path: &Path) -> Result<Node, CoreError> {
        let node = self
            .document()
            .node(path)
            .cloned()
            .ok_or_else(|| CoreError::InvalidPath(path.clone()))?;
        self.apply_op(
            pending,
            Operation::RemoveNode {
                path: path.clone(),
                node: node.clone(),
            },
        )?;
        Ok(node)
    }
}
