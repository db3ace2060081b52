//! Extension configuration.
//!
//! Every field has a default, so an empty JSON object (`{}`) is a valid configuration:
//!
//! ```rust
//! use richtext_binary::{BinaryBlockConfig, TooltipTracking, WhitespacePolicy};
//!
//! let config = BinaryBlockConfig::from_json_str(r##"{
//!     "whitespace": "preserve",
//!     "tooltip_tracking": "entry",
//!     "palette": { "one": "#00ff00" }
//! }"##).unwrap();
//!
//! assert_eq!(config.whitespace, WhitespacePolicy::Preserve);
//! assert_eq!(config.tooltip_tracking, TooltipTracking::Entry);
//! assert_eq!(config.palette.one.to_string(), "#00ff00");
//! assert!(config.fence_shortcut);
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// What the validator does with whitespace inside a binary block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WhitespacePolicy {
    /// Delete every character other than `0` and `1`.
    #[default]
    Strip,
    /// Keep ASCII spaces as visual byte separators; delete everything else.
    Preserve,
}

/// How the hover tooltip follows the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TooltipTracking {
    /// Position captured when the pointer enters the block.
    Entry,
    /// Position updated on every pointer move while hovered.
    #[default]
    Continuous,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid color {0:?}: expected #rrggbb")]
/// A colour string that is not `#rrggbb`.
pub struct InvalidColor(pub String);

/// An sRGB colour, written as `#rrggbb` in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb {
    /// Create a colour from channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl TryFrom<String> for Rgb {
    type Error = InvalidColor;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let hex = value
            .strip_prefix('#')
            .filter(|hex| hex.len() == 6 && hex.chars().all(|ch| ch.is_ascii_hexdigit()))
            .ok_or_else(|| InvalidColor(value.clone()))?;
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| InvalidColor(value.clone()))
        };
        Ok(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }
}

impl From<Rgb> for String {
    fn from(rgb: Rgb) -> Self {
        rgb.to_string()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Colours for per-digit highlighting while a block is focused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    /// Colour of `1` digits.
    pub one: Rgb,
    /// Colour of `0` digits.
    pub zero: Rgb,
    /// Colour of any other character; `None` inherits the surrounding text colour.
    pub neutral: Option<Rgb>,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            one: Rgb::new(0x00, 0x80, 0x00),
            zero: Rgb::new(0xff, 0x00, 0x00),
            neutral: None,
        }
    }
}

/// Configuration of the binary block extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinaryBlockConfig {
    /// Whitespace handling of the validator.
    pub whitespace: WhitespacePolicy,
    /// Focus highlighting colours.
    pub palette: Palette,
    /// Tooltip pointer tracking.
    pub tooltip_tracking: TooltipTracking,
    /// Convert a paragraph holding only "```" into a binary block when a space is typed.
    pub fence_shortcut: bool,
}

impl Default for BinaryBlockConfig {
    fn default() -> Self {
        Self {
            whitespace: WhitespacePolicy::default(),
            palette: Palette::default(),
            tooltip_tracking: TooltipTracking::default(),
            fence_shortcut: true,
        }
    }
}

impl BinaryBlockConfig {
    /// Parse a configuration from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_is_default() {
        assert_eq!(
            BinaryBlockConfig::from_json_str("{}").unwrap(),
            BinaryBlockConfig::default()
        );
    }

    #[test]
    fn test_bad_color_is_rejected() {
        let err = BinaryBlockConfig::from_json_str(r#"{"palette": {"zero": "red"}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
        assert!(err.to_string().contains("expected #rrggbb"));
    }

    #[test]
    fn test_color_needs_six_hex_digits() {
        for bad in ["#+1+2+3", "#12345", "#12345g", "123456", "#ééé"] {
            assert_eq!(
                Rgb::try_from(bad.to_string()),
                Err(InvalidColor(bad.to_string())),
                "{bad}"
            );
        }
        assert_eq!(Rgb::try_from("#0aFf10".to_string()), Ok(Rgb::new(0x0a, 0xff, 0x10)));
    }

    #[test]
    fn test_palette_round_trips_through_json() {
        let config = BinaryBlockConfig {
            palette: Palette {
                neutral: Some(Rgb::new(0x12, 0xab, 0xef)),
                ..Palette::default()
            },
            ..BinaryBlockConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"#12abef\""));
        assert_eq!(BinaryBlockConfig::from_json_str(&json).unwrap(), config);
    }
}
