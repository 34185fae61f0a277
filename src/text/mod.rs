//! Text measurement and line wrapping.
//!
//! The wrapper only ever sees a width function; faces (outline fonts or the
//! built-in bitmap fallback) plug in through [`TextMeasure`].

mod bitmap;
mod face;
mod wrap;

use thiserror::Error;

pub use bitmap::BitmapFont;
pub use face::{
    BOLD_CANDIDATES, Face, Faces, FontError, FontLocator, FontRole, REGULAR_CANDIDATES,
};
pub use wrap::{MeasuredLine, WrapResult, wrap};

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("failed to measure {text:?}: {reason}")]
    Measure { text: String, reason: String },
}

/// Pixel metrics of a face at a fixed size.
pub trait TextMeasure {
    /// Rendered width of `text` in pixels.
    fn text_width(&self, text: &str) -> Result<u32, LayoutError>;

    /// Height of one line, without any extra spacing.
    fn line_height(&self) -> u32;
}

impl<T: TextMeasure + ?Sized> TextMeasure for &T {
    fn text_width(&self, text: &str) -> Result<u32, LayoutError> {
        (**self).text_width(text)
    }

    fn line_height(&self) -> u32 {
        (**self).line_height()
    }
}

/// Wrap `text` to `max_width` using the metrics of `face`.
pub fn wrap_with<M: TextMeasure + ?Sized>(
    face: &M,
    text: &str,
    max_width: u32,
) -> Result<WrapResult, LayoutError> {
    wrap(text, max_width, |candidate| face.text_width(candidate))
}
