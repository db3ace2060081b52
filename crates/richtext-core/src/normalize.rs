//! Post-mutation normalization.
//!
//! After every committed change, the [`Editor`](crate::Editor) walks the elements whose
//! subtree was touched (the "dirty" paths) and asks each registered [`Normalizer`] for
//! corrective operations. Corrections are applied through the same commit path and can
//! dirty further paths; the pass ends when no normalizer has anything left to fix.
//!
//! Extensions (`richtext-*`) implement [`Normalizer`] to enforce content invariants on their
//! own block kinds and register it with
//! [`Editor::register_normalizer`](crate::Editor::register_normalizer).

use crate::document::Document;
use crate::node::{Element, Node};
use crate::ops::Operation;
use crate::path::Path;

/// Iteration budget per dirty path before a pass is considered non-terminating.
pub const MAX_ITERATIONS_PER_DIRTY_PATH: usize = 42;

/// A content rule enforced on every element touched by a mutation.
pub trait Normalizer: Send {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Return the operations that bring `element` (at `path`) back in line with this rule.
    ///
    /// Implementations must not mutate `doc`; they return edits that the editor applies.
    /// Returning an empty list means the element already satisfies the rule. Rules must be
    /// idempotent: once their operations are applied, they return nothing for the element.
    fn normalize(&self, doc: &Document, path: &Path, element: &Element) -> Vec<Operation>;
}

/// Kernel rule: every element has at least one child, so every block has an end point.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnsureTextChild;

impl Normalizer for EnsureTextChild {
    fn name(&self) -> &'static str {
        "ensure-text-child"
    }

    fn normalize(&self, _doc: &Document, path: &Path, element: &Element) -> Vec<Operation> {
        if !element.children.is_empty() {
            return Vec::new();
        }
        vec![Operation::InsertNode {
            path: path.child(0),
            node: Node::text(""),
        }]
    }
}
