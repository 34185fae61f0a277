//! Card composition and rasterisation.

mod code;
mod compose;
mod spec;
mod surface;

use image::RgbaImage;
use thiserror::Error;

use crate::record::WorkRecord;
use crate::text::{Face, Faces, LayoutError};

pub use code::{CodeError, render_code};
pub use compose::{CardLayout, Field, LayoutCursor, PlacedField, compose};
pub use spec::{CardSpec, Colour, FontSizes, Labels, OverflowPolicy, Palette};
pub use surface::{RasterSurface, Surface};

#[derive(Debug, Error)]
pub enum CardError {
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error(transparent)]
    Code(#[from] CodeError),
    #[error("text of card '{id}' ends at y={text_bottom}, below the caption at y={floor}")]
    Overflow {
        id: String,
        text_bottom: i64,
        floor: i64,
    },
}

/// A finished card and the layout it was drawn with.
#[derive(Debug, Clone)]
pub struct RenderedCard {
    pub image: RgbaImage,
    pub layout: CardLayout,
}

/// Render `record` to an RGBA image, QR link included.
pub fn render_card(
    record: &WorkRecord,
    spec: &CardSpec,
    faces: &Faces<Face>,
) -> Result<RenderedCard, CardError> {
    let code = render_code(&spec.link_for(&record.id), spec.code_size)?;
    let mut surface = RasterSurface::new(spec.width, spec.height, spec.palette.background.into());
    let layout = compose(record, spec, faces, &code, &mut surface)?;
    Ok(RenderedCard {
        image: surface.into_image(),
        layout,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::FontRole;
    use pretty_assertions::assert_eq;

    fn bitmap_faces(spec: &CardSpec) -> Faces<Face> {
        Faces {
            title: Face::fallback(spec.fonts.get(FontRole::Title)),
            subtitle: Face::fallback(spec.fonts.get(FontRole::Subtitle)),
            body: Face::fallback(spec.fonts.get(FontRole::Body)),
            small: Face::fallback(spec.fonts.get(FontRole::Small)),
        }
    }

    #[test]
    fn renders_full_size_card_with_code_in_corner() {
        let spec = CardSpec::default();
        let record = WorkRecord {
            id: "a1".to_string(),
            creator: "Lin".to_string(),
            title: "Morning".to_string(),
            medium: "Watercolor".to_string(),
            ..WorkRecord::default()
        };
        let card = render_card(&record, &spec, &bitmap_faces(&spec)).unwrap();
        assert_eq!(card.image.dimensions(), (700, 1500));
        assert_eq!(*card.image.get_pixel(0, 0), spec.palette.border.0);
        assert_eq!(*card.image.get_pixel(350, 900), spec.palette.background.0);
        // quiet zone of the code image is white
        assert_eq!(card.image.get_pixel(412, 1212).0, [255, 255, 255, 255]);
        assert!(!card.layout.overflows());
    }
}
