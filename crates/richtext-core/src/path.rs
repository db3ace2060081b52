//! Paths, points and selections.
//!
//! A [`Path`] addresses a node by the child index at every level, starting from the
//! document's top-level nodes. Paths order lexicographically, which is document order:
//! an ancestor sorts before its descendants, and a node before its later siblings.

use std::fmt;

/// Child-index path from the document root to a node.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Path(Vec<usize>);

impl Path {
    /// Create a path from child indices.
    pub fn new(indices: Vec<usize>) -> Self {
        Self(indices)
    }

    /// The empty path (the document itself).
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Child indices.
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// Depth of the addressed node (`0` for the root).
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` for the root path.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Index of the addressed node within its parent.
    pub fn last(&self) -> Option<usize> {
        self.0.last().copied()
    }

    /// Path of the parent node; `None` for the root.
    pub fn parent(&self) -> Option<Path> {
        let (_, init) = self.0.split_last()?;
        Some(Path(init.to_vec()))
    }

    /// Path of the `index`-th child.
    pub fn child(&self, index: usize) -> Path {
        let mut indices = self.0.clone();
        indices.push(index);
        Path(indices)
    }

    /// Path of the next sibling; `None` for the root.
    pub fn next_sibling(&self) -> Option<Path> {
        let last = self.last()?;
        let mut indices = self.0.clone();
        *indices.last_mut()? = last + 1;
        Some(Path(indices))
    }

    /// Proper ancestors from the outermost to the parent (the root is excluded).
    pub fn ancestors(&self) -> Vec<Path> {
        (1..self.0.len()).map(|len| Path(self.0[..len].to_vec())).collect()
    }

    /// Returns `true` if `self` is a proper ancestor of `other`.
    pub fn is_ancestor_of(&self, other: &Path) -> bool {
        self.0.len() < other.0.len() && other.0.starts_with(&self.0)
    }

    /// Returns `true` if `self` equals `other` or is one of its ancestors.
    pub fn contains(&self, other: &Path) -> bool {
        other.0.starts_with(&self.0)
    }

    pub(crate) fn indices_mut(&mut self) -> &mut Vec<usize> {
        &mut self.0
    }
}

impl From<Vec<usize>> for Path {
    fn from(indices: Vec<usize>) -> Self {
        Self(indices)
    }
}

impl<const N: usize> From<[usize; N]> for Path {
    fn from(indices: [usize; N]) -> Self {
        Self(indices.to_vec())
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, index) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{index}")?;
        }
        f.write_str("]")
    }
}

/// A location inside a text node: the text's path and a character offset.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Point {
    /// Path of a text node.
    pub path: Path,
    /// Offset in characters within the text.
    pub offset: usize,
}

impl Point {
    /// Create a point.
    pub fn new(path: impl Into<Path>, offset: usize) -> Self {
        Self {
            path: path.into(),
            offset,
        }
    }
}

/// A cursor (collapsed) or a range between two points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Where the selection started.
    pub anchor: Point,
    /// Where the selection ends (the moving side).
    pub focus: Point,
}

impl Selection {
    /// Create a selection between two points.
    pub fn new(anchor: Point, focus: Point) -> Self {
        Self { anchor, focus }
    }

    /// Create a collapsed selection (a caret).
    pub fn collapsed(point: Point) -> Self {
        Self {
            anchor: point.clone(),
            focus: point,
        }
    }

    /// Returns `true` if anchor and focus coincide.
    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    /// Returns `true` if the focus comes before the anchor.
    pub fn is_backward(&self) -> bool {
        self.focus < self.anchor
    }

    /// The earlier of the two points.
    pub fn start(&self) -> &Point {
        if self.is_backward() {
            &self.focus
        } else {
            &self.anchor
        }
    }

    /// The later of the two points.
    pub fn end(&self) -> &Point {
        if self.is_backward() {
            &self.anchor
        } else {
            &self.focus
        }
    }
}
