#![warn(missing_docs)]
//! Richtext Binary - Binary-Code Blocks for `richtext-core`
//!
//! # Overview
//!
//! A `binary-code` block holds a string of `0`/`1` digits and shows it as text: hovering
//! it decodes the digits 8 at a time, focusing it colours every digit, and its two
//! controls append a digit to the end of that very block.
//!
//! # Core Features
//!
//! - **Validation**: [`BinaryValidator`] keeps binary blocks digits-only inside every commit
//! - **Decoding**: [`decode`] turns digits into characters, dropping a trailing partial byte
//! - **Byte-Aligned Layout**: [`compute_layout`] never breaks a line mid-byte
//! - **Presentation**: [`BlockPresenter`] tracks focus and the hover tooltip per block
//! - **Insertion**: [`append_digit`] targets a block by identity, not by cursor
//! - **Extension Host**: [`BinaryBlocks`] wires all of the above to an [`Editor`]
//!
//! # Quick Start
//!
//! ```rust
//! use richtext_binary::{BinaryBlockConfig, BinaryBlocks, Digit, append_digit, decode};
//! use richtext_core::{BlockKind, Editor, Node, Path, Point, Selection};
//!
//! let mut editor = Editor::from_nodes(vec![
//!     Node::block(BlockKind::Paragraph, "caret here"),
//!     Node::block(BlockKind::BinaryCode, "0110100"),
//! ]);
//! BinaryBlocks::new(BinaryBlockConfig::default())
//!     .install(&mut editor)
//!     .unwrap();
//!
//! editor.set_selection(Selection::collapsed(Point::new([0, 0], 0))).unwrap();
//! let block = editor.document().element(&Path::from([1])).unwrap().id;
//! append_digit(&mut editor, block, Digit::Zero).unwrap();
//!
//! assert_eq!(decode(&editor.document().string(&Path::from([1]))).unwrap(), "h");
//! ```
//!
//! # Module Description
//!
//! - [`validator`] - digits-only normalizer
//! - [`decoder`] - digit to character decoding
//! - [`layout`] - byte-aligned line layout and the layout registry
//! - [`presenter`] - per-block focus/tooltip state and the renderable view
//! - [`insertion`] - the `0`/`1` controls
//! - [`host`] - the extension wired to one editor
//!
//! [`Editor`]: richtext_core::Editor

pub mod config;
pub mod decoder;
mod error;
pub mod host;
pub mod insertion;
pub mod layout;
pub mod presenter;
pub mod sample;
pub mod shortcut;
pub mod validator;

pub use config::{BinaryBlockConfig, InvalidColor, Palette, Rgb, TooltipTracking, WhitespacePolicy};
pub use decoder::{BITS_PER_BYTE, Decoded, decode, decode_detailed, digit_count, strip_whitespace};
pub use error::{BinaryBlockError, ConfigError, DecodeError, Recovery};
pub use host::{BinaryBlocks, SyncReport};
pub use insertion::{Digit, InsertOutcome, append_digit};
pub use layout::{
    DisplayMode, LayoutRegistry, LineLayout, Measurement, MeasurementProvider, compute_layout,
    wrap_lines,
};
pub use presenter::{
    BlockPresenter, BlockView, DigitControl, DigitStyle, EventDisposition, FocusState,
    PresenterEvent, Segment, Tooltip,
};
pub use sample::sample_document;
pub use shortcut::{FENCE, apply_fence_shortcut};
pub use validator::{BinaryValidator, invalid_runs, is_allowed, validate};
