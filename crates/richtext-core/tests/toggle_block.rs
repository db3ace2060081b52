use pretty_assertions::assert_eq;
use richtext_core::{Alignment, BlockKind, Editor, Mark, Marks, Node, Path, Point, Selection};

fn kinds(editor: &Editor) -> Vec<String> {
    editor
        .document()
        .children()
        .iter()
        .map(|node| {
            let element = node.as_element().unwrap();
            let inner: Vec<&str> = element
                .children
                .iter()
                .filter_map(|child| child.as_element().map(|e| e.kind.as_str()))
                .collect();
            if inner.is_empty() {
                element.kind.as_str().to_string()
            } else {
                format!("{}[{}]", element.kind, inner.join(","))
            }
        })
        .collect()
}

#[test]
fn test_toggle_paragraph_into_binary_and_back() {
    let mut editor = Editor::from_nodes(vec![
        Node::block(BlockKind::Paragraph, "0110"),
        Node::block(BlockKind::Paragraph, "text"),
    ]);
    let id = editor.document().element(&Path::from([0])).unwrap().id;
    editor
        .set_selection(Selection::collapsed(Point::new([0, 0], 2)))
        .unwrap();

    assert!(editor.toggle_block(BlockKind::BinaryCode).unwrap());
    assert_eq!(kinds(&editor), vec!["binary-code", "paragraph"]);
    assert!(editor.is_block_active(&BlockKind::BinaryCode));
    // Identity survives a kind change.
    assert_eq!(editor.document().element(&Path::from([0])).unwrap().id, id);

    assert!(editor.toggle_block(BlockKind::BinaryCode).unwrap());
    assert_eq!(kinds(&editor), vec!["paragraph", "paragraph"]);
}

#[test]
fn test_toggle_without_selection_does_nothing() {
    let mut editor = Editor::from_nodes(vec![Node::block(BlockKind::Paragraph, "x")]);
    assert_eq!(editor.toggle_block(BlockKind::BinaryCode), Ok(false));
    assert_eq!(editor.version(), 0);
}

#[test]
fn test_toggle_list_wraps_contiguous_blocks() {
    let mut editor = Editor::from_nodes(vec![
        Node::block(BlockKind::Paragraph, "a"),
        Node::block(BlockKind::Paragraph, "b"),
        Node::block(BlockKind::Paragraph, "c"),
    ]);
    editor
        .set_selection(Selection::new(Point::new([0, 0], 0), Point::new([1, 0], 1)))
        .unwrap();

    editor.toggle_block(BlockKind::BulletedList).unwrap();
    assert_eq!(
        kinds(&editor),
        vec!["bulleted-list[list-item,list-item]", "paragraph"]
    );
    assert_eq!(
        editor.selection(),
        Some(&Selection::new(
            Point::new([0, 0, 0], 0),
            Point::new([0, 1, 0], 1)
        ))
    );
}

#[test]
fn test_toggle_middle_list_item_splits_list() {
    let mut editor = Editor::from_nodes(vec![Node::element(
        BlockKind::NumberedList,
        vec![
            Node::block(BlockKind::ListItem, "a"),
            Node::block(BlockKind::ListItem, "b"),
            Node::block(BlockKind::ListItem, "c"),
        ],
    )]);
    editor
        .set_selection(Selection::collapsed(Point::new([0, 1, 0], 1)))
        .unwrap();

    editor.toggle_block(BlockKind::BinaryCode).unwrap();
    assert_eq!(
        kinds(&editor),
        vec![
            "numbered-list[list-item]",
            "binary-code",
            "numbered-list[list-item]"
        ]
    );
    assert_eq!(editor.document().string(&Path::from([1])), "b");
    assert_eq!(
        editor.selection(),
        Some(&Selection::collapsed(Point::new([1, 0], 1)))
    );
}

#[test]
fn test_toggle_active_list_unwraps_to_paragraphs() {
    let mut editor = Editor::from_nodes(vec![Node::element(
        BlockKind::BulletedList,
        vec![
            Node::block(BlockKind::ListItem, "a"),
            Node::block(BlockKind::ListItem, "b"),
        ],
    )]);
    editor
        .set_selection(Selection::new(
            Point::new([0, 0, 0], 0),
            Point::new([0, 1, 0], 1),
        ))
        .unwrap();

    editor.toggle_block(BlockKind::BulletedList).unwrap();
    assert_eq!(kinds(&editor), vec!["paragraph", "paragraph"]);
    assert_eq!(editor.document().string(&Path::root()), "ab");
}

#[test]
fn test_toggle_alignment() {
    let mut editor = Editor::from_nodes(vec![Node::block(BlockKind::Paragraph, "x")]);
    editor
        .set_selection(Selection::collapsed(Point::new([0, 0], 0)))
        .unwrap();

    editor.toggle_alignment(Alignment::Center).unwrap();
    assert_eq!(
        editor.document().element(&Path::from([0])).unwrap().align,
        Some(Alignment::Center)
    );
    editor.toggle_alignment(Alignment::Center).unwrap();
    assert_eq!(editor.document().element(&Path::from([0])).unwrap().align, None);
}

fn spans(editor: &Editor, block: usize) -> Vec<(String, Marks)> {
    editor
        .document()
        .element(&Path::from([block]))
        .unwrap()
        .children
        .iter()
        .filter_map(|node| node.as_text())
        .map(|span| (span.text.clone(), span.marks))
        .collect()
}

#[test]
fn test_toggle_mark_splits_span_at_selection_edges() {
    let mut editor = Editor::from_nodes(vec![Node::block(BlockKind::Paragraph, "abcdef")]);
    editor
        .set_selection(Selection::new(Point::new([0, 0], 2), Point::new([0, 0], 4)))
        .unwrap();

    assert!(!editor.is_mark_active(Mark::Bold));
    assert!(editor.toggle_mark(Mark::Bold).unwrap());
    assert_eq!(
        spans(&editor, 0),
        vec![
            ("ab".to_string(), Marks::NONE),
            ("cd".to_string(), Marks::bold()),
            ("ef".to_string(), Marks::NONE),
        ]
    );
    assert_eq!(
        editor.selection(),
        Some(&Selection::new(Point::new([0, 1], 0), Point::new([0, 1], 2)))
    );
    assert!(editor.is_mark_active(Mark::Bold));

    // Same characters are still selected, so a second toggle clears the mark.
    assert!(editor.toggle_mark(Mark::Bold).unwrap());
    assert_eq!(spans(&editor, 0)[1], ("cd".to_string(), Marks::NONE));
    assert_eq!(editor.document().string(&Path::from([0])), "abcdef");
}

#[test]
fn test_toggle_mark_across_spans_sets_when_partly_marked() {
    let mut editor = Editor::from_nodes(vec![Node::element(
        BlockKind::Paragraph,
        vec![Node::marked("ab", Marks::italic()), Node::text("cd")],
    )]);
    // Backward selection from "c|d" to "a|b".
    editor
        .set_selection(Selection::new(Point::new([0, 1], 1), Point::new([0, 0], 1)))
        .unwrap();
    assert!(!editor.is_mark_active(Mark::Italic));

    editor.toggle_mark(Mark::Italic).unwrap();
    assert_eq!(
        spans(&editor, 0),
        vec![
            ("ab".to_string(), Marks::italic()),
            ("c".to_string(), Marks::italic()),
            ("d".to_string(), Marks::NONE),
        ]
    );
    let selection = editor.selection().unwrap();
    assert!(selection.is_backward());
    assert_eq!(selection.start(), &Point::new([0, 0], 1));
    assert_eq!(selection.end(), &Point::new([0, 1], 1));
    assert!(editor.is_mark_active(Mark::Italic));
}

#[test]
fn test_toggle_mark_needs_a_range() {
    let mut editor = Editor::from_nodes(vec![Node::block(BlockKind::Paragraph, "abc")]);
    assert_eq!(editor.toggle_mark(Mark::Code), Ok(false));
    editor
        .set_selection(Selection::collapsed(Point::new([0, 0], 1)))
        .unwrap();
    let version = editor.version();
    assert_eq!(editor.toggle_mark(Mark::Code), Ok(false));
    assert_eq!(editor.version(), version);
}
