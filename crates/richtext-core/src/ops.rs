//! Document operations.
//!
//! Every change to a [`Document`] is expressed as an ordered list of [`Operation`]s in
//! character offsets (Unicode scalar values). Operations carry enough data to be inverted,
//! which the [`Editor`](crate::Editor) uses to roll back a commit that fails halfway.
//!
//! Semantics:
//! - Paths and offsets refer to the document **at the time the operation is applied**.
//! - Operations inside one change must be applied **in order**.

use crate::document::Document;
use crate::error::CoreError;
use crate::node::{Alignment, BlockKind, Node};
use crate::path::{Path, Point};

/// Element properties rewritten by [`Operation::SetNode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeProperties {
    /// Block type tag.
    pub kind: BlockKind,
    /// Alignment attribute.
    pub align: Option<Alignment>,
}

/// A single, invertible document edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Insert `text` into the text node at `path`, before character `offset`.
    InsertText {
        /// Path of the text node.
        path: Path,
        /// Character offset.
        offset: usize,
        /// Inserted text.
        text: String,
    },
    /// Remove `text` from the text node at `path`, starting at character `offset`.
    RemoveText {
        /// Path of the text node.
        path: Path,
        /// Character offset.
        offset: usize,
        /// Exact removed text.
        text: String,
    },
    /// Insert `node` so that it ends up at `path`.
    InsertNode {
        /// Final path of the inserted node.
        path: Path,
        /// Inserted node.
        node: Node,
    },
    /// Remove the node at `path`.
    RemoveNode {
        /// Path of the removed node.
        path: Path,
        /// Exact removed node.
        node: Node,
    },
    /// Rewrite the properties of the element at `path`.
    SetNode {
        /// Path of the element.
        path: Path,
        /// Properties before the change.
        properties: NodeProperties,
        /// Properties after the change.
        new_properties: NodeProperties,
    },
}

impl Operation {
    /// Path addressed by this operation.
    pub fn path(&self) -> &Path {
        match self {
            Operation::InsertText { path, .. }
            | Operation::RemoveText { path, .. }
            | Operation::InsertNode { path, .. }
            | Operation::RemoveNode { path, .. }
            | Operation::SetNode { path, .. } => path,
        }
    }

    /// Returns `true` if applying this operation would not change the document.
    pub fn is_noop(&self) -> bool {
        match self {
            Operation::InsertText { text, .. } | Operation::RemoveText { text, .. } => {
                text.is_empty()
            }
            Operation::SetNode {
                properties,
                new_properties,
                ..
            } => properties == new_properties,
            Operation::InsertNode { .. } | Operation::RemoveNode { .. } => false,
        }
    }

    /// The operation that undoes this one.
    pub fn inverse(&self) -> Operation {
        match self.clone() {
            Operation::InsertText { path, offset, text } => {
                Operation::RemoveText { path, offset, text }
            }
            Operation::RemoveText { path, offset, text } => {
                Operation::InsertText { path, offset, text }
            }
            Operation::InsertNode { path, node } => Operation::RemoveNode { path, node },
            Operation::RemoveNode { path, node } => Operation::InsertNode { path, node },
            Operation::SetNode {
                path,
                properties,
                new_properties,
            } => Operation::SetNode {
                path,
                properties: new_properties,
                new_properties: properties,
            },
        }
    }

    /// Apply this operation to `doc`.
    pub fn apply(&self, doc: &mut Document) -> Result<(), CoreError> {
        match self {
            Operation::InsertText { path, offset, text } => {
                let span = text_mut(doc, path)?;
                let at = byte_offset(&span.text, *offset).ok_or_else(|| {
                    CoreError::InvalidOffset {
                        path: path.clone(),
                        offset: *offset,
                    }
                })?;
                span.text.insert_str(at, text);
                Ok(())
            }
            Operation::RemoveText { path, offset, text } => {
                let span = text_mut(doc, path)?;
                let invalid = || CoreError::InvalidOffset {
                    path: path.clone(),
                    offset: *offset,
                };
                let start = byte_offset(&span.text, *offset).ok_or_else(invalid)?;
                let end = byte_offset(&span.text, offset + text.chars().count())
                    .ok_or_else(invalid)?;
                span.text.replace_range(start..end, "");
                Ok(())
            }
            Operation::InsertNode { path, node } => {
                let (parent, index) = split_path(path)?;
                let children = doc
                    .children_mut(&parent)
                    .ok_or_else(|| CoreError::InvalidPath(path.clone()))?;
                if index > children.len() {
                    return Err(CoreError::InvalidPath(path.clone()));
                }
                children.insert(index, node.clone());
                Ok(())
            }
            Operation::RemoveNode { path, .. } => {
                let (parent, index) = split_path(path)?;
                let children = doc
                    .children_mut(&parent)
                    .ok_or_else(|| CoreError::InvalidPath(path.clone()))?;
                if index >= children.len() {
                    return Err(CoreError::InvalidPath(path.clone()));
                }
                children.remove(index);
                Ok(())
            }
            Operation::SetNode {
                path,
                new_properties,
                ..
            } => {
                let node = doc
                    .node_mut(path)
                    .ok_or_else(|| CoreError::InvalidPath(path.clone()))?;
                let element = node
                    .as_element_mut()
                    .ok_or_else(|| CoreError::NotElement(path.clone()))?;
                element.kind = new_properties.kind.clone();
                element.align = new_properties.align;
                Ok(())
            }
        }
    }

    /// Where `path` ends up after this operation; `None` if the node was removed.
    pub fn transform_path(&self, path: &Path) -> Option<Path> {
        match self {
            Operation::InsertNode { path: at, .. } => {
                let mut moved = path.clone();
                let depth = at.len();
                if depth == 0 || depth > path.len() {
                    return Some(moved);
                }
                let level = depth - 1;
                if at.as_slice()[..level] == path.as_slice()[..level]
                    && at.as_slice()[level] <= path.as_slice()[level]
                {
                    moved.indices_mut()[level] += 1;
                }
                Some(moved)
            }
            Operation::RemoveNode { path: at, .. } => {
                if at.contains(path) {
                    return None;
                }
                let mut moved = path.clone();
                let depth = at.len();
                if depth == 0 || depth > path.len() {
                    return Some(moved);
                }
                let level = depth - 1;
                if at.as_slice()[..level] == path.as_slice()[..level]
                    && at.as_slice()[level] < path.as_slice()[level]
                {
                    moved.indices_mut()[level] -= 1;
                }
                Some(moved)
            }
            Operation::InsertText { .. }
            | Operation::RemoveText { .. }
            | Operation::SetNode { .. } => Some(path.clone()),
        }
    }

    /// Where `point` ends up after this operation; `None` if its text was removed.
    ///
    /// Insertions at a point's exact offset push the point forward.
    pub fn transform_point(&self, point: &Point) -> Option<Point> {
        match self {
            Operation::InsertText { path, offset, text } if *path == point.path => {
                let mut moved = point.clone();
                if *offset <= point.offset {
                    moved.offset += text.chars().count();
                }
                Some(moved)
            }
            Operation::RemoveText { path, offset, text } if *path == point.path => {
                let mut moved = point.clone();
                if point.offset > *offset {
                    let removed = text.chars().count();
                    moved.offset -= removed.min(point.offset - offset);
                }
                Some(moved)
            }
            _ => {
                let path = self.transform_path(&point.path)?;
                Some(Point {
                    path,
                    offset: point.offset,
                })
            }
        }
    }

    /// Element paths whose subtree changed and must be normalized after this operation.
    pub(crate) fn dirty_paths(&self) -> Vec<Path> {
        match self {
            Operation::InsertText { path, .. } | Operation::RemoveText { path, .. } => {
                path.ancestors()
            }
            Operation::SetNode { path, .. } => {
                let mut paths = path.ancestors();
                paths.push(path.clone());
                paths
            }
            Operation::InsertNode { path, node } => {
                let mut paths = path.ancestors();
                collect_element_paths(node, path.clone(), &mut paths);
                paths
            }
            Operation::RemoveNode { path, .. } => path.ancestors(),
        }
    }
}

fn collect_element_paths(node: &Node, path: Path, out: &mut Vec<Path>) {
    if let Node::Element(element) = node {
        for (index, child) in element.children.iter().enumerate() {
            collect_element_paths(child, path.child(index), out);
        }
        out.push(path);
    }
}

fn split_path(path: &Path) -> Result<(Path, usize), CoreError> {
    match (path.parent(), path.last()) {
        (Some(parent), Some(index)) => Ok((parent, index)),
        _ => Err(CoreError::InvalidPath(path.clone())),
    }
}

fn text_mut<'a>(
    doc: &'a mut Document,
    path: &Path,
) -> Result<&'a mut crate::node::TextSpan, CoreError> {
    doc.node_mut(path)
        .ok_or_else(|| CoreError::InvalidPath(path.clone()))?
        .as_text_mut()
        .ok_or_else(|| CoreError::NotText(path.clone()))
}

/// Byte index of the `char_offset`-th character; `None` past the end.
pub(crate) fn byte_offset(text: &str, char_offset: usize) -> Option<usize> {
    if char_offset == 0 {
        return Some(0);
    }
    text.char_indices()
        .map(|(index, _)| index)
        .chain(std::iter::once(text.len()))
        .nth(char_offset)
}
