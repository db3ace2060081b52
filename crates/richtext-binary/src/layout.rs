//! Byte-aligned wrapping for binary blocks.
//!
//! A binary block never breaks a line in the middle of a byte. Given the measured width of
//! the block's container and of its rendered text, [`compute_layout`] picks the largest
//! multiple of 8 digits that fits on a line and reports the horizontal space left over, so
//! the renderer can pad the block instead of letting the text reflow at arbitrary digits.
//!
//! Measuring is the host's job (pixels in a browser, cells in a terminal); this module only
//! consumes [`Measurement`]s through a [`MeasurementProvider`].

use crate::decoder::BITS_PER_BYTE;
use crate::error::Recovery;
use richtext_core::NodeId;
use std::collections::BTreeMap;
use tracing::trace;

/// Rendered metrics of one block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    /// Width available to the block's content.
    pub container_width: f64,
    /// Width currently taken by the block's full text on one line.
    pub rendered_text_width: f64,
    /// Number of digits in the block's text.
    pub digit_count: usize,
}

/// How the block's content box is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayMode {
    /// Content fits on one line (or nothing could be measured).
    #[default]
    Inline,
    /// Content wraps over several byte-aligned lines.
    Block,
}

/// Result of [`compute_layout`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LineLayout {
    /// Digits per line, always a multiple of 8. `0` means no wrapping is applied.
    pub characters_per_line: usize,
    /// Horizontal space left after the last whole byte of a full line, never negative.
    pub trailing_padding: f64,
    /// Inline or block presentation.
    pub display_mode: DisplayMode,
}

impl LineLayout {
    /// Layout used before a real measurement exists: no wrap, no padding.
    pub const UNAVAILABLE: LineLayout = LineLayout {
        characters_per_line: 0,
        trailing_padding: 0.0,
        display_mode: DisplayMode::Inline,
    };

    /// Returns `true` if the content is split over several lines.
    pub fn is_wrapping(&self) -> bool {
        self.display_mode == DisplayMode::Block
    }
}

fn usable(width: f64) -> bool {
    width.is_finite() && width >= 0.0
}

/// Compute the byte-aligned line layout of one block.
///
/// ```rust
/// use richtext_binary::{DisplayMode, Measurement, compute_layout};
///
/// // 80 digits, 10px each, in a 250px container: 25 digits fit, 24 are used.
/// let layout = compute_layout(&Measurement {
///     container_width: 250.0,
///     rendered_text_width: 800.0,
///     digit_count: 80,
/// });
/// assert_eq!(layout.characters_per_line, 24);
/// assert_eq!(layout.trailing_padding, 10.0);
/// assert_eq!(layout.display_mode, DisplayMode::Block);
/// ```
pub fn compute_layout(measurement: &Measurement) -> LineLayout {
    let Measurement {
        container_width,
        rendered_text_width,
        digit_count,
    } = *measurement;
    if digit_count == 0
        || !usable(container_width)
        || !usable(rendered_text_width)
        || rendered_text_width == 0.0
    {
        trace!(
            recovery = %Recovery::MeasurementUnavailable,
            digit_count,
            container_width,
            rendered_text_width,
            "layout deferred"
        );
        return LineLayout::UNAVAILABLE;
    }

    let char_width = rendered_text_width / digit_count as f64;
    let max_fit = (container_width / char_width).floor() as usize;
    let characters_per_line = max_fit / BITS_PER_BYTE * BITS_PER_BYTE;
    let occupied = characters_per_line as f64 * char_width;
    let trailing_padding = (container_width - occupied).max(0.0);
    let display_mode = if characters_per_line > 0 && characters_per_line < digit_count {
        DisplayMode::Block
    } else {
        DisplayMode::Inline
    };

    LineLayout {
        characters_per_line,
        trailing_padding,
        display_mode,
    }
}

/// Split `text` into lines of `characters_per_line` digits each.
///
/// Only digits count towards the limit; any other character stays on the line it follows.
/// `characters_per_line == 0` yields the whole text as a single line.
pub fn wrap_lines(text: &str, characters_per_line: usize) -> Vec<&str> {
    if characters_per_line == 0 || text.is_empty() {
        return vec![text];
    }
    let mut lines = Vec::new();
    let mut line_start = 0;
    let mut digits = 0;
    for (byte, ch) in text.char_indices() {
        if !matches!(ch, '0' | '1') {
            continue;
        }
        if digits == characters_per_line {
            lines.push(&text[line_start..byte]);
            line_start = byte;
            digits = 0;
        }
        digits += 1;
    }
    lines.push(&text[line_start..]);
    lines
}

/// Source of rendered metrics, implemented by the host.
pub trait MeasurementProvider {
    /// Measure the block `block`, or `None` if it is not rendered yet.
    fn measure(&self, block: NodeId) -> Option<Measurement>;
}

impl<F> MeasurementProvider for F
where
    F: Fn(NodeId) -> Option<Measurement>,
{
    fn measure(&self, block: NodeId) -> Option<Measurement> {
        self(block)
    }
}

/// Layouts of the currently mounted binary blocks.
#[derive(Debug, Default)]
pub struct LayoutRegistry {
    layouts: BTreeMap<NodeId, LineLayout>,
}

impl LayoutRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking `block` with the unavailable layout.
    pub fn mount(&mut self, block: NodeId) {
        self.layouts.entry(block).or_insert(LineLayout::UNAVAILABLE);
    }

    /// Mount `block` and compute its layout once.
    pub fn on_mount(&mut self, block: NodeId, provider: &dyn MeasurementProvider) -> LineLayout {
        let layout = Self::measure_one(block, provider);
        self.layouts.insert(block, layout);
        layout
    }

    /// Stop tracking `block`.
    pub fn unmount(&mut self, block: NodeId) -> bool {
        self.layouts.remove(&block).is_some()
    }

    /// Returns `true` if `block` is mounted.
    pub fn is_mounted(&self, block: NodeId) -> bool {
        self.layouts.contains_key(&block)
    }

    /// Mounted block ids, in id order.
    pub fn mounted(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.layouts.keys().copied()
    }

    /// Recompute every mounted block. Blocks are independent of each other.
    pub fn on_resize(&mut self, provider: &dyn MeasurementProvider) {
        for (block, layout) in self.layouts.iter_mut() {
            *layout = Self::measure_one(*block, provider);
        }
        trace!(blocks = self.layouts.len(), "layouts recomputed");
    }

    /// Recompute a single mounted block (after its content changed).
    pub fn refresh(&mut self, block: NodeId, provider: &dyn MeasurementProvider) {
        if let Some(layout) = self.layouts.get_mut(&block) {
            *layout = Self::measure_one(block, provider);
        }
    }

    /// Last computed layout of `block`.
    pub fn layout(&self, block: NodeId) -> Option<LineLayout> {
        self.layouts.get(&block).copied()
    }

    fn measure_one(block: NodeId, provider: &dyn MeasurementProvider) -> LineLayout {
        match provider.measure(block) {
            Some(measurement) => compute_layout(&measurement),
            None => {
                trace!(
                    recovery = %Recovery::MeasurementUnavailable,
                    block = %block,
                    "block not rendered"
                );
                LineLayout::UNAVAILABLE
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn measure(container_width: f64, char_width: f64, digit_count: usize) -> Measurement {
        Measurement {
            container_width,
            rendered_text_width: char_width * digit_count as f64,
            digit_count,
        }
    }

    #[test]
    fn test_rounds_down_to_whole_bytes() {
        let layout = compute_layout(&measure(330.0, 10.0, 80));
        assert_eq!(layout.characters_per_line, 32);
        assert_eq!(layout.trailing_padding, 10.0);
        assert!(layout.is_wrapping());
    }

    #[test]
    fn test_content_that_fits_is_inline() {
        let layout = compute_layout(&measure(1000.0, 10.0, 16));
        assert_eq!(layout.characters_per_line, 96);
        assert_eq!(layout.display_mode, DisplayMode::Inline);
        assert_eq!(layout.trailing_padding, 40.0);
    }

    #[test]
    fn test_zero_digits_is_unavailable() {
        assert_eq!(
            compute_layout(&Measurement {
                container_width: 500.0,
                rendered_text_width: 0.0,
                digit_count: 0,
            }),
            LineLayout::UNAVAILABLE
        );
        assert_eq!(
            compute_layout(&measure(f64::NAN, 10.0, 8)),
            LineLayout::UNAVAILABLE
        );
    }

    #[test]
    fn test_container_narrower_than_a_byte() {
        let layout = compute_layout(&measure(50.0, 10.0, 16));
        assert_eq!(layout.characters_per_line, 0);
        assert_eq!(layout.trailing_padding, 50.0);
        assert_eq!(layout.display_mode, DisplayMode::Inline);
    }

    #[test]
    fn test_random_measurements_stay_byte_aligned() {
        let mut rng = rand::thread_rng();
        for _ in 0..500 {
            let container: f64 = rng.gen_range(0.0..2000.0);
            let char_width: f64 = rng.gen_range(0.5..30.0);
            let digits = rng.gen_range(1..400);
            let layout = compute_layout(&measure(container, char_width, digits));
            assert_eq!(layout.characters_per_line % BITS_PER_BYTE, 0);
            assert!(layout.trailing_padding >= 0.0);
            assert!(layout.characters_per_line as f64 * char_width <= container + 1e-6);
        }
    }

    #[test]
    fn test_wrap_lines_on_byte_boundaries() {
        let text = "0100100001100101011011000110110001101111";
        let lines = wrap_lines(text, 16);
        assert_eq!(
            lines,
            vec!["0100100001100101", "0110110001101100", "01101111"]
        );
        assert_eq!(wrap_lines(text, 0), vec![text]);
        assert_eq!(wrap_lines("01001000 01101001", 8), vec!["01001000 ", "01101001"]);
    }

    #[test]
    fn test_registry_recomputes_each_mounted_block() {
        let narrow = NodeId(1);
        let wide = NodeId(2);
        let mut registry = LayoutRegistry::new();
        registry.mount(narrow);
        registry.mount(wide);
        assert_eq!(registry.layout(narrow), Some(LineLayout::UNAVAILABLE));

        let provider = |block: NodeId| match block {
            NodeId(1) => Some(measure(100.0, 10.0, 80)),
            NodeId(2) => Some(measure(1000.0, 10.0, 80)),
            _ => None,
        };
        registry.on_resize(&provider);
        assert_eq!(registry.layout(narrow).map(|l| l.characters_per_line), Some(8));
        assert_eq!(registry.layout(wide).map(|l| l.characters_per_line), Some(96));

        assert!(registry.unmount(narrow));
        assert!(!registry.is_mounted(narrow));
        assert_eq!(registry.mounted().collect::<Vec<_>>(), vec![wide]);
    }
}
