use richtext_core::CoreError;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Errors produced by [`decode`](crate::decode).
pub enum DecodeError {
    #[error("invalid binary digit {ch:?} at index {index}")]
    /// A character other than `0`, `1` or whitespace was found.
    InvalidDigit {
        /// The offending character.
        ch: char,
        /// Character index in the input (whitespace included).
        index: usize,
    },
}

#[derive(Debug, Error)]
/// Errors produced while loading a [`BinaryBlockConfig`](crate::BinaryBlockConfig).
pub enum ConfigError {
    #[error("JSON parse error: {0}")]
    /// JSON parsing failed.
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    /// Filesystem I/O failed.
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
/// Umbrella error for the binary block extension.
pub enum BinaryBlockError {
    #[error(transparent)]
    /// A document operation failed.
    Core(#[from] CoreError),

    #[error(transparent)]
    /// Decoding failed.
    Decode(#[from] DecodeError),

    #[error(transparent)]
    /// Configuration could not be loaded.
    Config(#[from] ConfigError),
}

/// Expected, non-fatal conditions. These are resolved locally (silent correction or no-op)
/// and never surface as errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Recovery {
    /// A non-binary character was typed or pasted into a binary block and removed.
    InvalidContentCorrected,
    /// An insertion was requested with no live cursor context.
    NoActiveSelection,
    /// The digit count was not a multiple of 8; the trailing digits were not decoded.
    DecodeUnderrun,
    /// Layout was requested before the block had measurable content.
    MeasurementUnavailable,
}

impl Recovery {
    /// Stable tag used in log fields.
    pub fn as_str(self) -> &'static str {
        match self {
            Recovery::InvalidContentCorrected => "invalid-content-corrected",
            Recovery::NoActiveSelection => "no-active-selection",
            Recovery::DecodeUnderrun => "decode-underrun",
            Recovery::MeasurementUnavailable => "measurement-unavailable",
        }
    }
}

impl fmt::Display for Recovery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
