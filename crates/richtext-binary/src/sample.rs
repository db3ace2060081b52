//! Demo content.

use richtext_core::{Alignment, BlockKind, Document, Element, Marks, Node};

/// "hi" as binary digits.
pub const HI: &str = "0110100001101001";

/// "HelloWorld" as binary digits, 80 digits without separators.
pub const HELLO_WORLD: &str =
    "01001000011001010110110001101100011011110101011101101111011100100110110001100100";

/// "HelloWorld" as space-separated bytes.
pub const HELLO_WORLD_SPACED: &str =
    "01001000 01100101 01101100 01101100 01101111 01010111 01101111 01110010 01101100 01100100";

/// A small document mixing rich paragraphs with two binary blocks.
///
/// The third block is a paragraph holding space-separated bytes: toggling it to a binary
/// block shows the validator stripping the separators.
pub fn sample_document() -> Document {
    Document::new(vec![
        Node::element(
            BlockKind::Paragraph,
            vec![
                Node::text("This is editable "),
                Node::marked("rich", Marks::bold()),
                Node::text(" text, "),
                Node::marked("much", Marks::italic()),
                Node::text(" better than a "),
                Node::marked("<textarea>", Marks::code()),
                Node::text("!"),
            ],
        ),
        Node::block(BlockKind::BinaryCode, HI),
        Node::block(BlockKind::Paragraph, HELLO_WORLD_SPACED),
        Node::block(BlockKind::BinaryCode, HELLO_WORLD),
        Node::element(
            BlockKind::Paragraph,
            vec![
                Node::text("Hover a binary block to read it, focus it to see every bit, or type "),
                Node::marked("```", Marks::code()),
                Node::text(" and a space in an empty paragraph to start a new one."),
            ],
        ),
        Node::block(BlockKind::BlockQuote, "A wise quote."),
        Node::Element(
            Element::new(BlockKind::Paragraph, vec![Node::text("Try it out for yourself!")])
                .with_align(Alignment::Center),
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::{decode, strip_whitespace};
    use richtext_core::Path;

    #[test]
    fn test_sample_binary_blocks_decode() {
        let doc = sample_document();
        let binary: Vec<String> = doc
            .elements_matching(|element| element.kind == BlockKind::BinaryCode)
            .into_iter()
            .map(|(_, element)| decode(&element.text()).unwrap())
            .collect();
        assert_eq!(binary, vec!["hi", "HelloWorld"]);
        assert_eq!(strip_whitespace(HELLO_WORLD_SPACED), HELLO_WORLD);
        assert_eq!(
            doc.element(&Path::from([6])).and_then(|element| element.align),
            Some(Alignment::Center)
        );
    }
}
