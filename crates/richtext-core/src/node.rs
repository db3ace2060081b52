//! Document node types.
//!
//! A document is a tree of [`Element`]s whose leaves are [`TextSpan`]s. Elements carry a
//! [`BlockKind`] tag and an optional [`Alignment`]; text spans carry their string payload
//! and formatting [`Marks`].

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Identity of an element inside a [`Document`](crate::Document).
///
/// Ids are assigned by the document when an element is inserted and stay stable while the
/// element moves around the tree. Paths change on every structural edit; ids do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u64);

impl NodeId {
    /// Placeholder id for elements that have not been inserted into a document yet.
    pub const UNASSIGNED: Self = Self(0);

    /// Returns `true` if this id has been assigned by a document.
    pub fn is_assigned(self) -> bool {
        self != Self::UNASSIGNED
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Block type tag of an element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BlockKind {
    /// `"paragraph"`
    Paragraph,
    /// `"binary-code"`: text restricted to `0`/`1` digits.
    BinaryCode,
    /// `"block-quote"`
    BlockQuote,
    /// `"heading-one"`
    HeadingOne,
    /// `"heading-two"`
    HeadingTwo,
    /// `"numbered-list"` (wrapper of list items)
    NumberedList,
    /// `"bulleted-list"` (wrapper of list items)
    BulletedList,
    /// `"list-item"`
    ListItem,
    /// `"code-block"`
    CodeBlock,
    /// Any other host-defined tag.
    Custom(String),
}

impl BlockKind {
    /// The string tag of this kind.
    pub fn as_str(&self) -> &str {
        match self {
            BlockKind::Paragraph => "paragraph",
            BlockKind::BinaryCode => "binary-code",
            BlockKind::BlockQuote => "block-quote",
            BlockKind::HeadingOne => "heading-one",
            BlockKind::HeadingTwo => "heading-two",
            BlockKind::NumberedList => "numbered-list",
            BlockKind::BulletedList => "bulleted-list",
            BlockKind::ListItem => "list-item",
            BlockKind::CodeBlock => "code-block",
            BlockKind::Custom(tag) => tag,
        }
    }

    /// Returns `true` for list wrapper kinds.
    pub fn is_list(&self) -> bool {
        matches!(self, BlockKind::NumberedList | BlockKind::BulletedList)
    }
}

impl FromStr for BlockKind {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "paragraph" => BlockKind::Paragraph,
            "binary-code" => BlockKind::BinaryCode,
            "block-quote" => BlockKind::BlockQuote,
            "heading-one" => BlockKind::HeadingOne,
            "heading-two" => BlockKind::HeadingTwo,
            "numbered-list" => BlockKind::NumberedList,
            "bulleted-list" => BlockKind::BulletedList,
            "list-item" => BlockKind::ListItem,
            "code-block" => BlockKind::CodeBlock,
            other => BlockKind::Custom(other.to_string()),
        })
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Horizontal alignment attribute of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Alignment {
    /// `"left"`
    Left,
    /// `"center"`
    Center,
    /// `"right"`
    Right,
    /// `"justify"`
    Justify,
}

impl Alignment {
    /// The string tag of this alignment.
    pub fn as_str(self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Justify => "justify",
        }
    }

    /// Parse an alignment tag. Returns `None` for unknown tags.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "left" => Some(Alignment::Left),
            "center" => Some(Alignment::Center),
            "right" => Some(Alignment::Right),
            "justify" => Some(Alignment::Justify),
            _ => None,
        }
    }
}

/// Formatting flags of a text span.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Marks {
    /// Bold text.
    pub bold: bool,
    /// Italic text.
    pub italic: bool,
    /// Underlined text.
    pub underline: bool,
    /// Inline code.
    pub code: bool,
}

impl Marks {
    /// No formatting.
    pub const NONE: Self = Self {
        bold: false,
        italic: false,
        underline: false,
        code: false,
    };

    /// Only `bold`.
    pub fn bold() -> Self {
        Self {
            bold: true,
            ..Self::NONE
        }
    }

    /// Only `italic`.
    pub fn italic() -> Self {
        Self {
            italic: true,
            ..Self::NONE
        }
    }

    /// Only `code`.
    pub fn code() -> Self {
        Self {
            code: true,
            ..Self::NONE
        }
    }

    /// Returns `true` if no flag is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::NONE
    }

    /// Returns `true` if `mark` is set.
    pub fn has(&self, mark: Mark) -> bool {
        match mark {
            Mark::Bold => self.bold,
            Mark::Italic => self.italic,
            Mark::Underline => self.underline,
            Mark::Code => self.code,
        }
    }

    /// Set or clear `mark`.
    pub fn set(&mut self, mark: Mark, on: bool) {
        let flag = match mark {
            Mark::Bold => &mut self.bold,
            Mark::Italic => &mut self.italic,
            Mark::Underline => &mut self.underline,
            Mark::Code => &mut self.code,
        };
        *flag = on;
    }
}

/// One formatting flag, as toggled by a hotkey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mark {
    /// `"bold"`
    Bold,
    /// `"italic"`
    Italic,
    /// `"underline"`
    Underline,
    /// `"code"`
    Code,
}

/// A leaf text node.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextSpan {
    /// Text payload.
    pub text: String,
    /// Formatting flags.
    pub marks: Marks,
}

impl TextSpan {
    /// Create an unformatted span.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            marks: Marks::NONE,
        }
    }

    /// Replace the formatting flags of this span.
    pub fn with_marks(mut self, marks: Marks) -> Self {
        self.marks = marks;
        self
    }

    /// Length of the payload in characters (offsets are always in `char`s).
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// A block (or inline container) node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Identity; [`NodeId::UNASSIGNED`] until inserted into a document.
    pub id: NodeId,
    /// Block type tag.
    pub kind: BlockKind,
    /// Optional alignment attribute.
    pub align: Option<Alignment>,
    /// Ordered children.
    pub children: Vec<Node>,
}

impl Element {
    /// Create an element that has not been inserted anywhere yet.
    pub fn new(kind: BlockKind, children: Vec<Node>) -> Self {
        Self {
            id: NodeId::UNASSIGNED,
            kind,
            align: None,
            children,
        }
    }

    /// Set the alignment attribute.
    pub fn with_align(mut self, align: Alignment) -> Self {
        self.align = Some(align);
        self
    }

    /// Returns `true` if every child is a text span (a "leaf block").
    ///
    /// Blocks with no children also count; the kernel normalizes them to hold one empty span.
    pub fn is_leaf_block(&self) -> bool {
        self.children.iter().all(|child| matches!(child, Node::Text(_)))
    }

    /// Concatenated text of all descendant spans.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            child.collect_text(&mut out);
        }
        out
    }
}

/// A document node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Container node.
    Element(Element),
    /// Leaf text node.
    Text(TextSpan),
}

impl Node {
    /// Shorthand for an unformatted text node.
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(TextSpan::new(text))
    }

    /// Shorthand for a formatted text node.
    pub fn marked(text: impl Into<String>, marks: Marks) -> Self {
        Node::Text(TextSpan::new(text).with_marks(marks))
    }

    /// Shorthand for an element node.
    pub fn element(kind: BlockKind, children: Vec<Node>) -> Self {
        Node::Element(Element::new(kind, children))
    }

    /// Shorthand for a leaf block holding a single unformatted span.
    pub fn block(kind: BlockKind, text: impl Into<String>) -> Self {
        Node::element(kind, vec![Node::text(text)])
    }

    /// The element payload, if this is an element.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        }
    }

    /// Mutable element payload, if this is an element.
    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        }
    }

    /// The text payload, if this is a text node.
    pub fn as_text(&self) -> Option<&TextSpan> {
        match self {
            Node::Text(span) => Some(span),
            Node::Element(_) => None,
        }
    }

    /// Mutable text payload, if this is a text node.
    pub fn as_text_mut(&mut self) -> Option<&mut TextSpan> {
        match self {
            Node::Text(span) => Some(span),
            Node::Element(_) => None,
        }
    }

    /// Children of an element; empty for text nodes.
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Element(element) => &element.children,
            Node::Text(_) => &[],
        }
    }

    /// Append this node's text content to `out`.
    pub fn collect_text(&self, out: &mut String) {
        match self {
            Node::Text(span) => out.push_str(&span.text),
            Node::Element(element) => {
                for child in &element.children {
                    child.collect_text(out);
                }
            }
        }
    }

    /// Visit the ids of this node and all of its element descendants.
    pub(crate) fn for_each_element_id(&self, f: &mut impl FnMut(NodeId)) {
        if let Node::Element(element) = self {
            f(element.id);
            for child in &element.children {
                child.for_each_element_id(f);
            }
        }
    }
}

impl From<TextSpan> for Node {
    fn from(span: TextSpan) -> Self {
        Node::Text(span)
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}
