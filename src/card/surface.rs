//! Drawing backends the composer paints onto.

use image::imageops::overlay;
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;

use crate::text::{Face, TextMeasure};

/// Primitive drawing operations on a fixed-size canvas.
pub trait Surface {
    /// Face type this surface knows how to draw.
    type Face: TextMeasure;

    fn fill(&mut self, color: Rgba<u8>);

    /// One-pixel outline around the whole canvas.
    fn draw_border(&mut self, color: Rgba<u8>);

    /// Draw a single line of text with its top-left corner at `(x, y)`.
    fn draw_text(&mut self, x: i64, y: i64, text: &str, face: &Self::Face, color: Rgba<u8>);

    fn draw_rule(&mut self, from: (i64, i64), to: (i64, i64), thickness: u32, color: Rgba<u8>);

    fn paste(&mut self, image: &RgbaImage, x: i64, y: i64);
}

/// An in-memory RGBA canvas.
#[derive(Debug, Clone)]
pub struct RasterSurface {
    image: RgbaImage,
}

impl RasterSurface {
    pub fn new(width: u32, height: u32, background: Rgba<u8>) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, background),
        }
    }

    #[cfg(test)]
    fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }
}

impl Surface for RasterSurface {
    type Face = Face;

    fn fill(&mut self, color: Rgba<u8>) {
        for pixel in self.image.pixels_mut() {
            *pixel = color;
        }
    }

    fn draw_border(&mut self, color: Rgba<u8>) {
        let (width, height) = self.image.dimensions();
        if width == 0 || height == 0 {
            return;
        }
        draw_hollow_rect_mut(&mut self.image, Rect::at(0, 0).of_size(width, height), color);
    }

    fn draw_text(&mut self, x: i64, y: i64, text: &str, face: &Face, color: Rgba<u8>) {
        if text.is_empty() {
            return;
        }
        face.draw(&mut self.image, clamp_i32(x), clamp_i32(y), color, text);
    }

    fn draw_rule(&mut self, from: (i64, i64), to: (i64, i64), thickness: u32, color: Rgba<u8>) {
        let thickness = thickness.max(1);
        let half = i64::from(thickness / 2);
        let (x0, y0) = from;
        let (x1, y1) = to;
        if y0 == y1 || x0 == x1 {
            // Axis-aligned rules become a filled rectangle centred on the line.
            let (left, top, width, height) = if y0 == y1 {
                (x0.min(x1), y0 - half, x0.abs_diff(x1) as u32 + 1, thickness)
            } else {
                (x0 - half, y0.min(y1), thickness, y0.abs_diff(y1) as u32 + 1)
            };
            let rect = Rect::at(clamp_i32(left), clamp_i32(top)).of_size(width, height);
            draw_filled_rect_mut(&mut self.image, rect, color);
            return;
        }
        for offset in 0..i64::from(thickness) {
            let shift = (offset - half) as f32;
            draw_line_segment_mut(
                &mut self.image,
                (x0 as f32, y0 as f32 + shift),
                (x1 as f32, y1 as f32 + shift),
                color,
            );
        }
    }

    fn paste(&mut self, image: &RgbaImage, x: i64, y: i64) {
        overlay(&mut self.image, image, x, y);
    }
}

fn clamp_i32(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const INK: Rgba<u8> = Rgba([10, 20, 30, 255]);

    #[test]
    fn horizontal_rule_is_centred_and_thick() {
        let mut surface = RasterSurface::new(50, 50, WHITE);
        surface.draw_rule((5, 20), (44, 20), 2, INK);
        let image = surface.image();
        assert_eq!(*image.get_pixel(5, 19), INK);
        assert_eq!(*image.get_pixel(44, 20), INK);
        assert_eq!(*image.get_pixel(20, 21), WHITE);
        assert_eq!(*image.get_pixel(4, 20), WHITE);
    }

    #[test]
    fn border_outlines_the_canvas() {
        let mut surface = RasterSurface::new(10, 8, WHITE);
        surface.draw_border(INK);
        let image = surface.image();
        assert_eq!(*image.get_pixel(0, 0), INK);
        assert_eq!(*image.get_pixel(9, 7), INK);
        assert_eq!(*image.get_pixel(5, 4), WHITE);
    }

    #[test]
    fn paste_clips_at_the_edges() {
        let mut surface = RasterSurface::new(10, 10, WHITE);
        let stamp = RgbaImage::from_pixel(4, 4, INK);
        surface.paste(&stamp, 8, 8);
        let image = surface.image();
        assert_eq!(*image.get_pixel(9, 9), INK);
        assert_eq!(*image.get_pixel(7, 7), WHITE);
    }
}
