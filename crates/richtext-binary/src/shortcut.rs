//! Markdown-style shortcut: a paragraph holding only ```` ``` ```` becomes a binary block
//! when a space is typed.

use richtext_core::{BlockKind, CoreError, Editor, NodeProperties, Operation};
use tracing::debug;

/// Text that triggers the conversion.
pub const FENCE: &str = "```";

/// Handle a typed space. If the text under the selection start is exactly [`FENCE`] and
/// sits in a paragraph, the paragraph becomes an empty binary block and `Ok(true)` is
/// returned: the space is consumed. Otherwise nothing changes and the host inserts the space
/// as usual.
pub fn apply_fence_shortcut(editor: &mut Editor) -> Result<bool, CoreError> {
    let Some(selection) = editor.selection() else {
        return Ok(false);
    };
    let start = selection.start().clone();
    let doc = editor.document();
    let Some(span) = doc.text(&start.path) else {
        return Ok(false);
    };
    if span.text != FENCE {
        return Ok(false);
    }
    let Some((block_path, block)) = doc.enclosing_block(&start.path) else {
        return Ok(false);
    };
    if block.kind != BlockKind::Paragraph {
        return Ok(false);
    }

    let properties = NodeProperties {
        kind: block.kind.clone(),
        align: block.align,
    };
    let new_properties = NodeProperties {
        kind: BlockKind::BinaryCode,
        ..properties.clone()
    };
    let id = block.id;
    let ops = vec![
        Operation::SetNode {
            path: block_path,
            properties,
            new_properties,
        },
        Operation::RemoveText {
            path: start.path,
            offset: 0,
            text: FENCE.to_string(),
        },
    ];
    editor.apply_operations(ops)?;
    debug!(block = %id, "fence converted to binary block");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use richtext_core::{Node, Path, Point, Selection};

    #[test]
    fn test_fence_becomes_empty_binary_block() {
        let mut editor = Editor::from_nodes(vec![
            Node::block(BlockKind::Paragraph, "before"),
            Node::block(BlockKind::Paragraph, FENCE),
        ]);
        editor
            .set_selection(Selection::collapsed(Point::new([1, 0], 3)))
            .unwrap();

        assert_eq!(apply_fence_shortcut(&mut editor), Ok(true));
        let block = editor.document().element(&Path::from([1])).unwrap();
        assert_eq!(block.kind, BlockKind::BinaryCode);
        assert_eq!(block.text(), "");
        assert_eq!(
            editor.selection(),
            Some(&Selection::collapsed(Point::new([1, 0], 0)))
        );
    }

    #[test]
    fn test_other_text_is_left_alone() {
        let mut editor = Editor::from_nodes(vec![
            Node::block(BlockKind::Paragraph, "``"),
            Node::block(BlockKind::BlockQuote, FENCE),
        ]);
        assert_eq!(apply_fence_shortcut(&mut editor), Ok(false));

        for path in [[0, 0], [1, 0]] {
            editor
                .set_selection(Selection::collapsed(Point::new(path, 2)))
                .unwrap();
            assert_eq!(apply_fence_shortcut(&mut editor), Ok(false));
        }
        assert_eq!(editor.document().string(&Path::from([1])), FENCE);
    }
}
