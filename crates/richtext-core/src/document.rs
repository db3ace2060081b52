//! Document tree and read-only queries.
//!
//! [`Document`] owns the ordered top-level nodes. All mutation goes through
//! [`Operation`](crate::Operation)s applied by the [`Editor`](crate::Editor); the query
//! methods here are what normalizers, presenters and commands read from.

use crate::error::CoreError;
use crate::node::{Element, Node, NodeId, TextSpan};
use crate::path::{Path, Point, Selection};
use std::collections::HashSet;

/// An ordered tree of block nodes.
#[derive(Debug, Clone, Default)]
pub struct Document {
    children: Vec<Node>,
    next_id: u64,
}

impl Document {
    /// Create a document, assigning fresh ids to every element.
    pub fn new(mut children: Vec<Node>) -> Self {
        let mut next_id = 0;
        for child in &mut children {
            assign_fresh(child, &mut next_id);
        }
        Self { children, next_id }
    }

    /// Top-level nodes.
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Returns `true` if the document has no top-level nodes.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Node at `path`. The root path addresses no node.
    pub fn node(&self, path: &Path) -> Option<&Node> {
        let (first, rest) = path.as_slice().split_first()?;
        let mut node = self.children.get(*first)?;
        for &index in rest {
            node = node.children().get(index)?;
        }
        Some(node)
    }

    /// Element at `path`.
    pub fn element(&self, path: &Path) -> Option<&Element> {
        self.node(path)?.as_element()
    }

    /// Text span at `path`.
    pub fn text(&self, path: &Path) -> Option<&TextSpan> {
        self.node(path)?.as_text()
    }

    /// Current path of the element with `id`.
    pub fn path_of(&self, id: NodeId) -> Option<Path> {
        self.element_by_id(id).map(|(path, _)| path)
    }

    /// Element with `id` and its current path.
    pub fn element_by_id(&self, id: NodeId) -> Option<(Path, &Element)> {
        self.descendants().find_map(|(path, node)| match node {
            Node::Element(element) if element.id == id => Some((path, element)),
            _ => None,
        })
    }

    /// Depth-first, pre-order traversal of the whole document.
    pub fn descendants(&self) -> Descendants<'_> {
        let stack = self
            .children
            .iter()
            .enumerate()
            .rev()
            .map(|(index, node)| (Path::new(vec![index]), node))
            .collect();
        Descendants { stack }
    }

    /// Depth-first traversal of the subtree at `path`, starting with the node itself.
    ///
    /// The root path yields the whole document.
    pub fn descendants_at(&self, path: &Path) -> Descendants<'_> {
        if path.is_empty() {
            return self.descendants();
        }
        let stack = self
            .node(path)
            .map(|node| vec![(path.clone(), node)])
            .unwrap_or_default();
        Descendants { stack }
    }

    /// All elements satisfying `predicate`, in document order.
    pub fn elements_matching<F>(&self, predicate: F) -> Vec<(Path, &Element)>
    where
        F: Fn(&Element) -> bool,
    {
        self.descendants()
            .filter_map(|(path, node)| match node {
                Node::Element(element) if predicate(element) => Some((path, element)),
                _ => None,
            })
            .collect()
    }

    /// All leaf blocks (elements whose children are all text spans), in document order.
    pub fn leaf_blocks(&self) -> Vec<(Path, &Element)> {
        self.elements_matching(Element::is_leaf_block)
    }

    /// Concatenated text of the subtree at `path`.
    pub fn string(&self, path: &Path) -> String {
        let mut out = String::new();
        if path.is_empty() {
            for child in &self.children {
                child.collect_text(&mut out);
            }
        } else if let Some(node) = self.node(path) {
            node.collect_text(&mut out);
        }
        out
    }

    /// First text position inside the subtree at `path`.
    pub fn start_point(&self, path: &Path) -> Option<Point> {
        self.descendants_at(path)
            .find(|(_, node)| matches!(node, Node::Text(_)))
            .map(|(path, _)| Point { path, offset: 0 })
    }

    /// Last text position inside the subtree at `path`.
    pub fn end_point(&self, path: &Path) -> Option<Point> {
        self.descendants_at(path)
            .filter_map(|(path, node)| node.as_text().map(|span| (path, span.char_len())))
            .last()
            .map(|(path, offset)| Point { path, offset })
    }

    /// Nearest leaf block containing (or equal to) `path`.
    pub fn enclosing_block(&self, path: &Path) -> Option<(Path, &Element)> {
        let mut candidates = path.ancestors();
        candidates.push(path.clone());
        candidates.into_iter().rev().find_map(|candidate| {
            let element = self.element(&candidate)?;
            element.is_leaf_block().then_some((candidate, element))
        })
    }

    /// Leaf blocks touched by `selection`, in document order.
    pub fn blocks_in_selection(&self, selection: &Selection) -> Vec<(Path, &Element)> {
        let Some((first, _)) = self.enclosing_block(&selection.start().path) else {
            return Vec::new();
        };
        let Some((last, _)) = self.enclosing_block(&selection.end().path) else {
            return Vec::new();
        };
        self.leaf_blocks()
            .into_iter()
            .filter(|(path, _)| *path >= first && *path <= last)
            .collect()
    }

    /// Check that `point` addresses an existing text and an in-bounds offset.
    pub fn validate_point(&self, point: &Point) -> Result<(), CoreError> {
        let node = self
            .node(&point.path)
            .ok_or_else(|| CoreError::InvalidPath(point.path.clone()))?;
        let span = node
            .as_text()
            .ok_or_else(|| CoreError::NotText(point.path.clone()))?;
        if point.offset > span.char_len() {
            return Err(CoreError::InvalidOffset {
                path: point.path.clone(),
                offset: point.offset,
            });
        }
        Ok(())
    }

    /// Ids of the elements along `path` (outermost first), including the node at `path`
    /// when it is an element.
    pub fn element_ids_along(&self, path: &Path) -> Vec<NodeId> {
        let mut ids = Vec::new();
        let mut level = self.children.as_slice();
        for &index in path.as_slice() {
            let Some(node) = level.get(index) else {
                break;
            };
            match node {
                Node::Element(element) => {
                    ids.push(element.id);
                    level = &element.children;
                }
                Node::Text(_) => break,
            }
        }
        ids
    }

    pub(crate) fn node_mut(&mut self, path: &Path) -> Option<&mut Node> {
        let (first, rest) = path.as_slice().split_first()?;
        let mut node = self.children.get_mut(*first)?;
        for &index in rest {
            node = match node {
                Node::Element(element) => element.children.get_mut(index)?,
                Node::Text(_) => return None,
            };
        }
        Some(node)
    }

    /// Child list of the node at `parent` (the top-level list for the root path).
    pub(crate) fn children_mut(&mut self, parent: &Path) -> Option<&mut Vec<Node>> {
        if parent.is_empty() {
            return Some(&mut self.children);
        }
        self.node_mut(parent)?
            .as_element_mut()
            .map(|element| &mut element.children)
    }

    /// Give every unassigned (or colliding) element id in `node` a fresh id.
    pub(crate) fn assign_ids(&mut self, node: &mut Node) {
        let mut taken: HashSet<NodeId> = HashSet::new();
        for child in &self.children {
            child.for_each_element_id(&mut |id| {
                taken.insert(id);
            });
        }
        assign_missing(node, &mut self.next_id, &mut taken);
    }
}

fn assign_fresh(node: &mut Node, next_id: &mut u64) {
    if let Node::Element(element) = node {
        *next_id += 1;
        element.id = NodeId(*next_id);
        for child in &mut element.children {
            assign_fresh(child, next_id);
        }
    }
}

fn assign_missing(node: &mut Node, next_id: &mut u64, taken: &mut HashSet<NodeId>) {
    if let Node::Element(element) = node {
        if !element.id.is_assigned() || taken.contains(&element.id) {
            *next_id += 1;
            element.id = NodeId(*next_id);
        }
        taken.insert(element.id);
        for child in &mut element.children {
            assign_missing(child, next_id, taken);
        }
    }
}

/// Pre-order iterator returned by [`Document::descendants`].
pub struct Descendants<'a> {
    stack: Vec<(Path, &'a Node)>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = (Path, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let (path, node) = self.stack.pop()?;
        for (index, child) in node.children().iter().enumerate().rev() {
            self.stack.push((path.child(index), child));
        }
        Some((path, node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{BlockKind, Marks};

    fn sample() -> Document {
        Document::new(vec![
            Node::element(
                BlockKind::Paragraph,
                vec![Node::text("ab"), Node::marked("cd", Marks::bold())],
            ),
            Node::element(
                BlockKind::BulletedList,
                vec![
                    Node::block(BlockKind::ListItem, "one"),
                    Node::block(BlockKind::ListItem, "two"),
                ],
            ),
            Node::block(BlockKind::BinaryCode, "0101"),
        ])
    }

    #[test]
    fn test_ids_are_unique_and_resolvable() {
        let doc = sample();
        let ids: Vec<NodeId> = doc
            .descendants()
            .filter_map(|(_, node)| node.as_element().map(|e| e.id))
            .collect();
        let unique: HashSet<NodeId> = ids.iter().copied().collect();
        assert_eq!(ids.len(), 5);
        assert_eq!(unique.len(), 5);
        for id in ids {
            let path = doc.path_of(id).unwrap();
            assert_eq!(doc.element(&path).unwrap().id, id);
        }
    }

    #[test]
    fn test_end_point_is_last_text() {
        let doc = sample();
        assert_eq!(doc.end_point(&Path::from([0])), Some(Point::new([0, 1], 2)));
        assert_eq!(doc.end_point(&Path::from([1])), Some(Point::new([1, 1, 0], 3)));
        assert_eq!(doc.start_point(&Path::from([2])), Some(Point::new([2, 0], 0)));
    }

    #[test]
    fn test_enclosing_block_skips_list_wrapper() {
        let doc = sample();
        let (path, element) = doc.enclosing_block(&Path::from([1, 0, 0])).unwrap();
        assert_eq!(path, Path::from([1, 0]));
        assert_eq!(element.kind, BlockKind::ListItem);
    }

    #[test]
    fn test_blocks_in_selection_spans_document_order() {
        let doc = sample();
        let selection = Selection::new(Point::new([2, 0], 1), Point::new([1, 1, 0], 0));
        let kinds: Vec<BlockKind> = doc
            .blocks_in_selection(&selection)
            .into_iter()
            .map(|(_, e)| e.kind.clone())
            .collect();
        assert_eq!(kinds, vec![BlockKind::ListItem, BlockKind::BinaryCode]);
    }

    #[test]
    fn test_validate_point_reports_bad_offsets() {
        let doc = sample();
        assert!(doc.validate_point(&Point::new([2, 0], 4)).is_ok());
        assert_eq!(
            doc.validate_point(&Point::new([2, 0], 5)),
            Err(CoreError::InvalidOffset {
                path: Path::from([2, 0]),
                offset: 5
            })
        );
        assert_eq!(
            doc.validate_point(&Point::new([2], 0)),
            Err(CoreError::NotText(Path::from([2])))
        );
    }
}
