//! Core library for laying out and rendering exhibition info cards.
//!
//! Text is wrapped by [`wrap`] (word-level first, character-level for runs
//! without spaces such as CJK), stacked by [`compose`] and rasterised by
//! [`render_card`]. [`compress_dir`] handles gallery image thumbnails.

mod batch;
mod card;
mod record;
mod text;
mod thumbnail;

pub use batch::{BatchReport, RenderFailure, card_path, render_all, render_to_file};
pub use card::{
    CardError, CardLayout, CardSpec, CodeError, Colour, Field, FontSizes, Labels, LayoutCursor,
    OverflowPolicy, Palette, PlacedField, RasterSurface, RenderedCard, Surface, compose,
    render_card, render_code,
};
pub use record::{WorkRecord, load_records, parse_records};
pub use text::{
    BOLD_CANDIDATES, BitmapFont, Face, Faces, FontError, FontLocator, FontRole, LayoutError,
    MeasuredLine, REGULAR_CANDIDATES, TextMeasure, WrapResult, wrap, wrap_with,
};
pub use thumbnail::{
    CompressFailure, CompressOptions, CompressReport, SUPPORTED_EXTENSIONS, ThumbnailError,
    compress_dir, compress_file, is_supported,
};

/// Probe fonts for every card role at the sizes configured in `spec`.
pub fn load_faces(spec: &CardSpec, locator: &FontLocator) -> Faces<Face> {
    Faces::probe(locator, |role| spec.fonts.get(role))
}
