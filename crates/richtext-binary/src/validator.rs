//! Digits-only invariant for binary blocks.
//!
//! [`BinaryValidator`] is a [`Normalizer`]: after every change that touches a
//! `binary-code` element, it deletes each character of the element's text spans that is not
//! a binary digit. Only runs that actually need deleting produce operations, so content that
//! is already valid never causes a write.

use crate::config::WhitespacePolicy;
use crate::error::Recovery;
use richtext_core::{BlockKind, Document, Element, Normalizer, Operation, Path};
use std::borrow::Cow;
use tracing::debug;

/// Returns `true` if `ch` may appear in a binary block under `policy`.
pub fn is_allowed(ch: char, policy: WhitespacePolicy) -> bool {
    match ch {
        '0' | '1' => true,
        ' ' => policy == WhitespacePolicy::Preserve,
        _ => false,
    }
}

/// `text` with every disallowed character removed, in original order.
///
/// Borrows when `text` is already valid.
///
/// ```rust
/// use richtext_binary::{WhitespacePolicy, validate};
///
/// assert_eq!(validate("01 0a1!b0", WhitespacePolicy::Strip), "01010");
/// assert_eq!(validate("01 0a1!b0", WhitespacePolicy::Preserve), "01 010");
/// ```
pub fn validate(text: &str, policy: WhitespacePolicy) -> Cow<'_, str> {
    if text.chars().all(|ch| is_allowed(ch, policy)) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.chars().filter(|ch| is_allowed(*ch, policy)).collect())
    }
}

/// Maximal runs of disallowed characters as `(char offset, run)`, in order.
pub fn invalid_runs(text: &str, policy: WhitespacePolicy) -> Vec<(usize, String)> {
    let mut runs: Vec<(usize, String)> = Vec::new();
    let mut previous_invalid = false;
    for (offset, ch) in text.chars().enumerate() {
        if is_allowed(ch, policy) {
            previous_invalid = false;
            continue;
        }
        match runs.last_mut() {
            Some((_, run)) if previous_invalid => run.push(ch),
            _ => runs.push((offset, ch.to_string())),
        }
        previous_invalid = true;
    }
    runs
}

/// Normalizer enforcing the digits-only invariant on `binary-code` elements.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryValidator {
    policy: WhitespacePolicy,
}

impl BinaryValidator {
    /// Create a validator with the given whitespace policy.
    pub fn new(policy: WhitespacePolicy) -> Self {
        Self { policy }
    }

    /// The whitespace policy in effect.
    pub fn policy(&self) -> WhitespacePolicy {
        self.policy
    }
}

impl Normalizer for BinaryValidator {
    fn name(&self) -> &'static str {
        "binary-validator"
    }

    fn normalize(&self, doc: &Document, path: &Path, element: &Element) -> Vec<Operation> {
        if element.kind != BlockKind::BinaryCode {
            return Vec::new();
        }
        let mut ops = Vec::new();
        for (text_path, node) in doc.descendants_at(path) {
            let Some(span) = node.as_text() else {
                continue;
            };
            // Highest offset first: earlier offsets stay valid while later runs go away.
            for (offset, run) in invalid_runs(&span.text, self.policy).into_iter().rev() {
                ops.push(Operation::RemoveText {
                    path: text_path.clone(),
                    offset,
                    text: run,
                });
            }
        }
        if !ops.is_empty() {
            debug!(
                recovery = %Recovery::InvalidContentCorrected,
                block = %element.id,
                runs = ops.len(),
                "removed non-binary characters"
            );
        }
        ops
    }
}
