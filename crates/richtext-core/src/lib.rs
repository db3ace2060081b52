#![warn(missing_docs)]
//! Richtext Core - Headless Rich-Text Document Kernel
//!
//! # Overview
//!
//! `richtext-core` is a headless rich-text kernel focused on the document tree, the
//! mutation commit path and change notifications. It does not render anything; hosts
//! draw the [`Document`] however they like and feed edits back through the [`Editor`].
//!
//! # Core Features
//!
//! - **Document Tree**: typed blocks ([`BlockKind`]) with alignment, formatted text spans
//! - **Stable Identity**: every element carries a [`NodeId`] that survives structural edits
//! - **Invertible Operations**: all edits are [`Operation`]s in character offsets
//! - **Normalization**: pluggable [`Normalizer`] rules run inside every commit
//! - **Change Notifications**: versioned [`DocumentChange`] records for subscribers
//! - **Block Toggles**: toolbar-style block-type and alignment toggles
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Toggle Commands                            │  ← Toolbar / hotkeys
//! ├─────────────────────────────────────────────┤
//! │  Editor (commit path, selection, notify)    │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  Normalization Pass                         │  ← Content invariants
//! ├─────────────────────────────────────────────┤
//! │  Operations (apply / invert / transform)    │  ← Edit format
//! ├─────────────────────────────────────────────┤
//! │  Document Tree + Paths                      │  ← Storage & queries
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use richtext_core::{BlockKind, Editor, Node, Path, Point, Selection};
//!
//! let mut editor = Editor::from_nodes(vec![
//!     Node::block(BlockKind::Paragraph, "0110"),
//! ]);
//!
//! editor.set_selection(Selection::collapsed(Point::new([0, 0], 4))).unwrap();
//! editor.toggle_block(BlockKind::BinaryCode).unwrap();
//!
//! let block = editor.document().element(&Path::from([0])).unwrap();
//! assert_eq!(block.kind, BlockKind::BinaryCode);
//! ```
//!
//! # Module Description
//!
//! - [`node`] - node types (elements, text spans, marks, ids)
//! - [`path`] - paths, points and selections
//! - [`document`] - document tree and queries
//! - [`ops`] - invertible operations
//! - [`normalize`] - normalization rules
//! - [`state`] - editor state, commit path and notifications

pub mod document;
mod error;
pub mod node;
pub mod normalize;
pub mod ops;
pub mod path;
pub mod state;
mod toggle;

pub use document::{Descendants, Document};
pub use error::CoreError;
pub use node::{Alignment, BlockKind, Element, Mark, Marks, Node, NodeId, TextSpan};
pub use normalize::{EnsureTextChild, Normalizer};
pub use ops::{NodeProperties, Operation};
pub use path::{Path, Point, Selection};
pub use state::{ChangeCallback, ChangeKind, DocumentChange, Editor};
