//! Commit path validation: random edits against a plain-string reference model, and
//! change notifications.

use rand::Rng;
use richtext_core::{
    BlockKind, ChangeKind, DocumentChange, Editor, Node, Operation, Path, Point, Selection,
};
use std::sync::{Arc, Mutex};

#[test]
fn test_random_text_edits_match_reference() {
    let mut rng = rand::thread_rng();
    let mut editor = Editor::from_nodes(vec![Node::block(BlockKind::Paragraph, "seed")]);
    let mut reference: Vec<char> = "seed".chars().collect();
    let text_path = Path::from([0, 0]);

    for _ in 0..500 {
        if reference.is_empty() || rng.gen_bool(0.6) {
            let offset = rng.gen_range(0..=reference.len());
            let ch = if rng.gen_bool(0.2) { 'é' } else { rng.gen_range('a'..='z') };
            editor
                .insert_text_at(&Point::new(text_path.clone(), offset), &ch.to_string())
                .unwrap();
            reference.insert(offset, ch);
        } else {
            let start = rng.gen_range(0..reference.len());
            let end = rng.gen_range(start..=reference.len());
            editor.delete_range(&text_path, start..end).unwrap();
            reference.drain(start..end);
        }
        let expected: String = reference.iter().collect();
        assert_eq!(editor.document().string(&Path::from([0])), expected);
    }
}

#[test]
fn test_change_records_touched_blocks() {
    let mut editor = Editor::from_nodes(vec![
        Node::block(BlockKind::Paragraph, "a"),
        Node::block(BlockKind::BinaryCode, "01"),
    ]);
    let first = editor.document().element(&Path::from([0])).unwrap().id;
    let second = editor.document().element(&Path::from([1])).unwrap().id;

    let seen: Arc<Mutex<Vec<DocumentChange>>> = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = Arc::clone(&seen);
    editor.subscribe(move |change| {
        seen_clone.lock().unwrap().push(change.clone());
    });

    editor
        .insert_text_at(&Point::new([1, 0], 2), "1")
        .unwrap();
    editor
        .set_selection(Selection::collapsed(Point::new([0, 0], 0)))
        .unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].kind, ChangeKind::DocumentModified);
    assert!(seen[0].touches(second));
    assert!(!seen[0].touches(first));
    assert_eq!(
        &*seen[0].operations,
        &[Operation::InsertText {
            path: Path::from([1, 0]),
            offset: 2,
            text: "1".to_string(),
        }]
    );
    assert_eq!(seen[1].kind, ChangeKind::SelectionChanged);
    assert_eq!(seen[1].old_version, 1);
    assert_eq!(seen[1].new_version, 2);
}

#[test]
fn test_removed_block_is_reported_as_touched() {
    let mut editor = Editor::from_nodes(vec![
        Node::block(BlockKind::Paragraph, "a"),
        Node::block(BlockKind::BinaryCode, "01"),
    ]);
    let binary = editor.document().element(&Path::from([1])).unwrap().id;
    let touched = Arc::new(Mutex::new(Vec::new()));
    let touched_clone = Arc::clone(&touched);
    editor.subscribe(move |change| {
        touched_clone.lock().unwrap().extend(change.touched.iter().copied());
    });

    editor.remove_node(&Path::from([1])).unwrap();
    assert!(touched.lock().unwrap().contains(&binary));
    assert_eq!(editor.document().path_of(binary), None);
}

#[test]
fn test_noop_edits_do_not_bump_version() {
    let mut editor = Editor::from_nodes(vec![Node::block(BlockKind::Paragraph, "a")]);
    assert_eq!(editor.insert_text_at(&Point::new([0, 0], 0), ""), Ok(false));
    assert_eq!(editor.set_block_kind(&Path::from([0]), BlockKind::Paragraph), Ok(false));
    assert_eq!(editor.version(), 0);
}

#[test]
fn test_replace_text_is_one_change() {
    let mut editor = Editor::from_nodes(vec![Node::block(BlockKind::Paragraph, "hello")]);
    editor.replace_text(&Path::from([0, 0]), 1..4, "ipp").unwrap();
    assert_eq!(editor.document().string(&Path::root()), "hippo");
    assert_eq!(editor.version(), 1);
}
