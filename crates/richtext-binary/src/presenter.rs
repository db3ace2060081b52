//! Per-block presentation state.
//!
//! Each mounted binary block owns one [`BlockPresenter`]. The presenter is a small state
//! machine driven by host UI events:
//!
//! ```text
//!            Focus                      PointerEnter (non-blank content)
//! Unfocused ──────▶ Focused     hidden ─────────────────────────────────▶ visible
//!           ◀──────                    ◀─────────────────────────────────
//!             Blur                      PointerLeave
//! ```
//!
//! Nothing is shared between presenters, so two blocks can be focused, hovered or
//! decoded independently. [`BlockPresenter::view`] turns the current state into a
//! [`BlockView`] the host can render.

use crate::config::{BinaryBlockConfig, Palette, Rgb, TooltipTracking, WhitespacePolicy};
use crate::decoder::{decode, strip_whitespace};
use crate::insertion::Digit;
use crate::layout::LineLayout;
use crate::validator::validate;
use richtext_core::{Alignment, Document, DocumentChange, Marks, NodeId};
use tracing::{debug, trace};

/// Keyboard focus of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusState {
    /// Text rendered verbatim.
    #[default]
    Unfocused,
    /// Every digit rendered as an individually styled unit.
    Focused,
}

/// Hover tooltip showing the decoded text.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Tooltip {
    /// Whether the tooltip is shown.
    pub visible: bool,
    /// Decoded block content.
    pub text: String,
    /// Pointer x coordinate.
    pub x: f64,
    /// Pointer y coordinate.
    pub y: f64,
}

/// UI events a presenter reacts to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PresenterEvent {
    /// The block received keyboard focus.
    Focus,
    /// The block lost keyboard focus.
    Blur,
    /// The pointer entered the block at `(x, y)`.
    PointerEnter {
        /// Pointer x coordinate.
        x: f64,
        /// Pointer y coordinate.
        y: f64,
    },
    /// The pointer moved within the block.
    PointerMove {
        /// Pointer x coordinate.
        x: f64,
        /// Pointer y coordinate.
        y: f64,
    },
    /// The pointer left the block.
    PointerLeave,
    /// A pointer button went down on a digit control.
    ControlPointerDown(Digit),
    /// A digit control was activated.
    ControlClick(Digit),
}

/// What the host should do after delivering an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventDisposition {
    /// State updated; re-render.
    Handled,
    /// Suppress the host's default action (focus moving to the control).
    PreventDefault,
    /// Append a digit to this block.
    AppendDigit(Digit),
    /// Nothing changed.
    Ignored,
}

/// Style of one character of a focused block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigitStyle {
    /// A `1`.
    One,
    /// A `0`.
    Zero,
    /// Anything else.
    Neutral,
}

/// A renderable piece of a block's content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// A text span rendered verbatim (unfocused block).
    Span {
        /// Span text.
        text: String,
        /// Span marks.
        marks: Marks,
    },
    /// A single styled character (focused block).
    Digit {
        /// The character.
        ch: char,
        /// Its style.
        style: DigitStyle,
        /// Its colour; `None` inherits.
        color: Option<Rgb>,
    },
}

/// A digit control next to the block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DigitControl {
    /// Digit appended by the control.
    pub digit: Digit,
    /// Button label.
    pub label: &'static str,
    /// Whether the control may take keyboard focus. Always `false`.
    pub focusable: bool,
}

impl DigitControl {
    fn new(digit: Digit) -> Self {
        Self {
            digit,
            label: digit.as_str(),
            focusable: false,
        }
    }
}

/// Everything a host needs to render a binary block.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockView {
    /// Block id.
    pub block: NodeId,
    /// Text alignment of the block.
    pub alignment: Option<Alignment>,
    /// Focus state.
    pub focus: FocusState,
    /// Content, verbatim or per character depending on `focus`.
    pub segments: Vec<Segment>,
    /// Hover tooltip.
    pub tooltip: Tooltip,
    /// The `1` and `0` controls.
    pub controls: [DigitControl; 2],
    /// Byte-aligned line layout.
    pub layout: LineLayout,
}

/// Presentation state of one binary block.
#[derive(Debug, Clone)]
pub struct BlockPresenter {
    block: NodeId,
    palette: Palette,
    tracking: TooltipTracking,
    focus: FocusState,
    tooltip: Tooltip,
    /// Pointer position while the pointer is over the block.
    pointer: Option<(f64, f64)>,
    digits: String,
    decoded: String,
}

impl BlockPresenter {
    /// Create a presenter for `block` and read its current content from `doc`.
    pub fn new(block: NodeId, config: &BinaryBlockConfig, doc: &Document) -> Self {
        let mut presenter = Self {
            block,
            palette: config.palette,
            tracking: config.tooltip_tracking,
            focus: FocusState::Unfocused,
            tooltip: Tooltip::default(),
            pointer: None,
            digits: String::new(),
            decoded: String::new(),
        };
        presenter.refresh(doc);
        presenter
    }

    /// The block this presenter belongs to.
    pub fn block(&self) -> NodeId {
        self.block
    }

    /// Current focus state.
    pub fn focus(&self) -> FocusState {
        self.focus
    }

    /// Current tooltip.
    pub fn tooltip(&self) -> &Tooltip {
        &self.tooltip
    }

    /// Decoded content (the decodable prefix; trailing partial bytes are left out).
    pub fn decoded(&self) -> &str {
        &self.decoded
    }

    /// Feed one UI event.
    pub fn handle_event(&mut self, event: PresenterEvent) -> EventDisposition {
        match event {
            PresenterEvent::Focus => self.set_focus(FocusState::Focused),
            PresenterEvent::Blur => self.set_focus(FocusState::Unfocused),
            PresenterEvent::PointerEnter { x, y } => {
                self.pointer = Some((x, y));
                self.show_tooltip(x, y);
                EventDisposition::Handled
            }
            PresenterEvent::PointerMove { x, y } => {
                if self.tracking != TooltipTracking::Continuous || self.pointer.is_none() {
                    return EventDisposition::Ignored;
                }
                self.pointer = Some((x, y));
                if self.tooltip.visible {
                    self.tooltip.x = x;
                    self.tooltip.y = y;
                    EventDisposition::Handled
                } else {
                    EventDisposition::Ignored
                }
            }
            PresenterEvent::PointerLeave => {
                self.pointer = None;
                self.tooltip = Tooltip::default();
                EventDisposition::Handled
            }
            PresenterEvent::ControlPointerDown(_) => EventDisposition::PreventDefault,
            PresenterEvent::ControlClick(digit) => EventDisposition::AppendDigit(digit),
        }
    }

    /// React to a committed change. Returns `true` if the block was touched and its decoded
    /// content recomputed.
    pub fn on_document_change(&mut self, doc: &Document, change: &DocumentChange) -> bool {
        if !change.touches(self.block) {
            return false;
        }
        self.refresh(doc);
        true
    }

    /// Re-read the block content from `doc`.
    pub fn refresh(&mut self, doc: &Document) {
        let Some((_, element)) = doc.element_by_id(self.block) else {
            return;
        };
        self.digits = strip_whitespace(&element.text());
        self.decoded = match decode(&self.digits) {
            Ok(text) => text,
            Err(err) => {
                debug!(block = %self.block, error = %err, "decoding unvalidated content");
                decode(&validate(&self.digits, WhitespacePolicy::Strip)).unwrap_or_default()
            }
        };
        trace!(block = %self.block, decoded = %self.decoded, "block content refreshed");

        if self.digits.is_empty() {
            self.tooltip = Tooltip::default();
        } else if self.tooltip.visible {
            self.tooltip.text.clone_from(&self.decoded);
        } else if let Some((x, y)) = self.pointer {
            // Digits arrived while hovered.
            self.show_tooltip(x, y);
        }
    }

    /// Renderable state of the block, or `None` if the block is gone from `doc`.
    pub fn view(&self, doc: &Document, layout: LineLayout) -> Option<BlockView> {
        let (path, element) = doc.element_by_id(self.block)?;
        let spans = doc
            .descendants_at(&path)
            .filter_map(|(_, node)| node.as_text());
        let segments = match self.focus {
            FocusState::Unfocused => spans
                .map(|span| Segment::Span {
                    text: span.text.clone(),
                    marks: span.marks,
                })
                .collect(),
            FocusState::Focused => spans
                .flat_map(|span| span.text.chars())
                .map(|ch| self.styled(ch))
                .collect(),
        };
        Some(BlockView {
            block: self.block,
            alignment: element.align,
            focus: self.focus,
            segments,
            tooltip: self.tooltip.clone(),
            controls: [DigitControl::new(Digit::One), DigitControl::new(Digit::Zero)],
            layout,
        })
    }

    fn styled(&self, ch: char) -> Segment {
        let (style, color) = match ch {
            '1' => (DigitStyle::One, Some(self.palette.one)),
            '0' => (DigitStyle::Zero, Some(self.palette.zero)),
            _ => (DigitStyle::Neutral, self.palette.neutral),
        };
        Segment::Digit { ch, style, color }
    }

    fn set_focus(&mut self, focus: FocusState) -> EventDisposition {
        if self.focus == focus {
            return EventDisposition::Ignored;
        }
        self.focus = focus;
        EventDisposition::Handled
    }

    fn show_tooltip(&mut self, x: f64, y: f64) {
        // Nothing to decode: no tooltip.
        if self.digits.is_empty() {
            return;
        }
        self.tooltip = Tooltip {
            visible: true,
            text: self.decoded.clone(),
            x,
            y,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use richtext_core::{BlockKind, Node, Operation, Path};

    fn doc(text: &str) -> Document {
        Document::new(vec![Node::block(BlockKind::BinaryCode, text)])
    }

    fn presenter(doc: &Document) -> BlockPresenter {
        let id = doc.element(&Path::from([0])).map(|e| e.id).unwrap();
        BlockPresenter::new(id, &BinaryBlockConfig::default(), doc)
    }

    #[test]
    fn test_hover_shows_decoded_text_at_pointer() {
        let doc = doc("0110100001101001");
        let mut presenter = presenter(&doc);
        assert_eq!(
            presenter.handle_event(PresenterEvent::PointerEnter { x: 10.0, y: 20.0 }),
            EventDisposition::Handled
        );
        assert_eq!(
            presenter.tooltip(),
            &Tooltip {
                visible: true,
                text: "hi".to_string(),
                x: 10.0,
                y: 20.0
            }
        );

        presenter.handle_event(PresenterEvent::PointerMove { x: 15.0, y: 25.0 });
        assert_eq!((presenter.tooltip().x, presenter.tooltip().y), (15.0, 25.0));

        presenter.handle_event(PresenterEvent::PointerLeave);
        assert_eq!(presenter.tooltip(), &Tooltip::default());
    }

    #[test]
    fn test_blank_block_never_shows_tooltip() {
        for text in ["", "   "] {
            let doc = doc(text);
            let mut presenter = presenter(&doc);
            presenter.handle_event(PresenterEvent::PointerEnter { x: 1.0, y: 1.0 });
            assert!(!presenter.tooltip().visible);
        }
    }

    #[test]
    fn test_tooltip_appears_when_digits_arrive_while_hovered() {
        let empty = doc("");
        let mut presenter = presenter(&empty);
        presenter.handle_event(PresenterEvent::PointerEnter { x: 2.0, y: 3.0 });
        presenter.handle_event(PresenterEvent::PointerMove { x: 5.0, y: 6.0 });
        assert!(!presenter.tooltip().visible);

        // Same block id, now holding one byte.
        let mut filled = empty.clone();
        let id = presenter.block();
        let path = filled.path_of(id).unwrap();
        Operation::InsertText {
            path: path.child(0),
            offset: 0,
            text: "01101000".to_string(),
        }
        .apply(&mut filled)
        .unwrap();
        presenter.refresh(&filled);
        assert_eq!(
            presenter.tooltip(),
            &Tooltip {
                visible: true,
                text: "h".to_string(),
                x: 5.0,
                y: 6.0
            }
        );

        presenter.handle_event(PresenterEvent::PointerLeave);
        presenter.refresh(&filled);
        assert!(!presenter.tooltip().visible);
    }

    #[test]
    fn test_entry_tracking_keeps_entry_position() {
        let doc = doc("01101000");
        let id = doc.element(&Path::from([0])).map(|e| e.id).unwrap();
        let config = BinaryBlockConfig {
            tooltip_tracking: TooltipTracking::Entry,
            ..BinaryBlockConfig::default()
        };
        let mut presenter = BlockPresenter::new(id, &config, &doc);
        presenter.handle_event(PresenterEvent::PointerEnter { x: 3.0, y: 4.0 });
        assert_eq!(
            presenter.handle_event(PresenterEvent::PointerMove { x: 9.0, y: 9.0 }),
            EventDisposition::Ignored
        );
        assert_eq!((presenter.tooltip().x, presenter.tooltip().y), (3.0, 4.0));
    }

    #[test]
    fn test_focus_styles_every_digit() {
        let doc = doc("10");
        let mut presenter = presenter(&doc);

        let view = presenter.view(&doc, LineLayout::UNAVAILABLE).unwrap();
        assert_eq!(
            view.segments,
            vec![Segment::Span {
                text: "10".to_string(),
                marks: Marks::NONE
            }]
        );

        assert_eq!(presenter.handle_event(PresenterEvent::Focus), EventDisposition::Handled);
        assert_eq!(presenter.handle_event(PresenterEvent::Focus), EventDisposition::Ignored);
        let palette = Palette::default();
        let view = presenter.view(&doc, LineLayout::UNAVAILABLE).unwrap();
        assert_eq!(view.focus, FocusState::Focused);
        assert_eq!(
            view.segments,
            vec![
                Segment::Digit {
                    ch: '1',
                    style: DigitStyle::One,
                    color: Some(palette.one)
                },
                Segment::Digit {
                    ch: '0',
                    style: DigitStyle::Zero,
                    color: Some(palette.zero)
                },
            ]
        );

        presenter.handle_event(PresenterEvent::Blur);
        assert_eq!(presenter.focus(), FocusState::Unfocused);
    }

    #[test]
    fn test_controls_do_not_take_focus() {
        let doc = doc("");
        let mut presenter = presenter(&doc);
        assert_eq!(
            presenter.handle_event(PresenterEvent::ControlPointerDown(Digit::One)),
            EventDisposition::PreventDefault
        );
        assert_eq!(
            presenter.handle_event(PresenterEvent::ControlClick(Digit::One)),
            EventDisposition::AppendDigit(Digit::One)
        );
        assert_eq!(presenter.focus(), FocusState::Unfocused);

        let view = presenter.view(&doc, LineLayout::UNAVAILABLE).unwrap();
        assert!(view.controls.iter().all(|control| !control.focusable));
        assert_eq!(view.controls.map(|control| control.label), ["1", "0"]);
    }

    #[test]
    fn test_partial_byte_shows_decodable_prefix() {
        let doc = doc("011010000110");
        let presenter = presenter(&doc);
        assert_eq!(presenter.decoded(), "h");
    }
}
