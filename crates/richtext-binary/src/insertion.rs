//! The `0`/`1` controls of a binary block.
//!
//! A digit always goes to the end of the block that owns the control, found by the block's
//! [`NodeId`], wherever the user's cursor happens to be.

use crate::error::Recovery;
use richtext_core::{BlockKind, CoreError, Editor, NodeId, Point};
use std::fmt;
use tracing::debug;

/// A binary digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Digit {
    /// `0`
    Zero,
    /// `1`
    One,
}

impl Digit {
    /// Both digits, in control order.
    pub const ALL: [Digit; 2] = [Digit::One, Digit::Zero];

    /// The digit character.
    pub fn as_char(self) -> char {
        match self {
            Digit::Zero => '0',
            Digit::One => '1',
        }
    }

    /// The digit as a one-character string.
    pub fn as_str(self) -> &'static str {
        match self {
            Digit::Zero => "0",
            Digit::One => "1",
        }
    }

    /// Parse `'0'` or `'1'`.
    pub fn from_char(ch: char) -> Option<Self> {
        match ch {
            '0' => Some(Digit::Zero),
            '1' => Some(Digit::One),
            _ => None,
        }
    }
}

impl fmt::Display for Digit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of [`append_digit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The digit was inserted at `at`, the end of `block` before the insertion.
    Inserted {
        /// Target block.
        block: NodeId,
        /// Insertion point.
        at: Point,
    },
    /// Nothing was done for an expected reason.
    Skipped(Recovery),
    /// `block` is no longer a binary block of the document.
    BlockMissing(NodeId),
}

/// Append `digit` at the end of the binary block `block`.
///
/// Does nothing when the editor has no selection. The selection is left where it is unless
/// it sits exactly at the end of `block`, in which case it stays after the new digit.
pub fn append_digit(
    editor: &mut Editor,
    block: NodeId,
    digit: Digit,
) -> Result<InsertOutcome, CoreError> {
    if editor.selection().is_none() {
        debug!(
            recovery = %Recovery::NoActiveSelection,
            block = %block,
            digit = digit.as_str(),
            "digit control ignored"
        );
        return Ok(InsertOutcome::Skipped(Recovery::NoActiveSelection));
    }

    let doc = editor.document();
    let Some((path, element)) = doc.element_by_id(block) else {
        return Ok(InsertOutcome::BlockMissing(block));
    };
    if element.kind != BlockKind::BinaryCode {
        return Ok(InsertOutcome::BlockMissing(block));
    }
    let Some(end) = doc.end_point(&path) else {
        return Ok(InsertOutcome::BlockMissing(block));
    };

    editor.insert_text_at(&end, digit.as_str())?;
    debug!(block = %block, digit = digit.as_str(), at = %end.path, "digit appended");
    Ok(InsertOutcome::Inserted { block, at: end })
}

#[cfg(test)]
mod tests {
    use super::*;
    use richtext_core::{Node, Path, Selection};

    fn editor() -> Editor {
        Editor::from_nodes(vec![
            Node::block(BlockKind::Paragraph, "intro"),
            Node::block(BlockKind::BinaryCode, "0110"),
            Node::block(BlockKind::BinaryCode, "1"),
        ])
    }

    fn id_at(editor: &Editor, index: usize) -> NodeId {
        editor
            .document()
            .element(&Path::from([index]))
            .map(|element| element.id)
            .unwrap()
    }

    #[test]
    fn test_no_selection_is_noop() {
        let mut editor = editor();
        let block = id_at(&editor, 1);
        assert_eq!(
            append_digit(&mut editor, block, Digit::One),
            Ok(InsertOutcome::Skipped(Recovery::NoActiveSelection))
        );
        assert_eq!(editor.document().string(&Path::from([1])), "0110");
        assert_eq!(editor.version(), 0);
    }

    #[test]
    fn test_appends_at_block_end_not_at_cursor() {
        let mut editor = editor();
        let block = id_at(&editor, 1);
        let caret = Selection::collapsed(Point::new([0, 0], 2));
        editor.set_selection(caret.clone()).unwrap();

        let outcome = append_digit(&mut editor, block, Digit::Zero).unwrap();
        assert_eq!(
            outcome,
            InsertOutcome::Inserted {
                block,
                at: Point::new([1, 0], 4)
            }
        );
        assert_eq!(editor.document().string(&Path::from([1])), "01100");
        assert_eq!(editor.document().string(&Path::from([0])), "intro");
        assert_eq!(editor.selection(), Some(&caret));
    }

    #[test]
    fn test_unknown_or_converted_block_is_missing() {
        let mut editor = editor();
        editor
            .set_selection(Selection::collapsed(Point::new([0, 0], 0)))
            .unwrap();
        assert_eq!(
            append_digit(&mut editor, NodeId(999), Digit::One),
            Ok(InsertOutcome::BlockMissing(NodeId(999)))
        );

        let intro = id_at(&editor, 0);
        assert_eq!(
            append_digit(&mut editor, intro, Digit::One),
            Ok(InsertOutcome::BlockMissing(intro))
        );
        assert_eq!(editor.document().string(&Path::from([0])), "intro");
    }

    #[test]
    fn test_digit_char_round_trip() {
        for digit in Digit::ALL {
            assert_eq!(Digit::from_char(digit.as_char()), Some(digit));
        }
        assert_eq!(Digit::from_char('2'), None);
    }
}
