//! Built-in 5x7 bitmap face, used when no outline font can be loaded.
//!
//! Covers ASCII letters (case-folded), digits and common punctuation. Any
//! other character, CJK included, is drawn as a hollow box so missing fonts
//! are obvious on the rendered card.

use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;

const GLYPH_WIDTH: u32 = 5;
const GLYPH_HEIGHT: u32 = 7;

type Glyph = [u8; GLYPH_HEIGHT as usize];

/// Block glyphs scaled up to approximate a pixel size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitmapFont {
    size: u32,
    scale: u32,
}

impl BitmapFont {
    /// Pick the largest integer scale whose glyph cell fits in `size` pixels.
    pub fn new(size: u32) -> Self {
        let scale = (size / (GLYPH_HEIGHT + 2)).max(1);
        Self { size, scale }
    }

    #[cfg(test)]
    fn scale(&self) -> u32 {
        self.scale
    }

    /// Horizontal distance between the origins of two glyphs.
    pub fn advance(&self) -> u32 {
        (GLYPH_WIDTH + 1) * self.scale
    }

    /// Width of `text` without the gap after the last glyph.
    pub fn text_width(&self, text: &str) -> u32 {
        let count = text.chars().count() as u32;
        if count == 0 {
            return 0;
        }
        count * self.advance() - self.scale
    }

    /// Draw `text` with its top-left corner at `(x, y)`.
    pub fn draw(&self, image: &mut RgbaImage, x: i32, y: i32, color: Rgba<u8>, text: &str) {
        let scale = self.scale as i32;
        let top = y + (self.size as i32 - GLYPH_HEIGHT as i32 * scale).max(0) / 2;
        for (idx, ch) in text.chars().enumerate() {
            let left = x + idx as i32 * self.advance() as i32;
            match glyph(ch) {
                Some(pattern) => paint_glyph(image, left, top, &pattern, color, self.scale),
                None if ch.is_whitespace() => {}
                None => {
                    let rect = Rect::at(left, top)
                        .of_size(GLYPH_WIDTH * self.scale, GLYPH_HEIGHT * self.scale);
                    draw_hollow_rect_mut(image, rect, color);
                }
            }
        }
    }
}

fn paint_glyph(
    image: &mut RgbaImage,
    x: i32,
    y: i32,
    pattern: &Glyph,
    color: Rgba<u8>,
    scale: u32,
) {
    for (row, bits) in pattern.iter().enumerate() {
        for col in 0..GLYPH_WIDTH {
            if bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                continue;
            }
            let px = x + (col * scale) as i32;
            let py = y + (row as u32 * scale) as i32;
            draw_filled_rect_mut(image, Rect::at(px, py).of_size(scale, scale), color);
        }
    }
}

fn glyph(ch: char) -> Option<Glyph> {
    let folded = ch.to_ascii_uppercase();
    GLYPHS
        .iter()
        .find(|(key, _)| *key == folded)
        .map(|(_, pattern)| *pattern)
}

#[rustfmt::skip]
static GLYPHS: &[(char, Glyph)] = &[
    (' ', [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]),
    ('0', [0x0e, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0e]),
    ('1', [0x04, 0x0c, 0x04, 0x04, 0x04, 0x04, 0x0e]),
    ('2', [0x0e, 0x11, 0x01, 0x06, 0x08, 0x10, 0x1f]),
    ('3', [0x1e, 0x01, 0x01, 0x0e, 0x01, 0x01, 0x1e]),
    ('4', [0x02, 0x06, 0x0a, 0x12, 0x1f, 0x02, 0x02]),
    ('5', [0x1f, 0x10, 0x1e, 0x01, 0x01, 0x11, 0x0e]),
    ('6', [0x06, 0x08, 0x10, 0x1e, 0x11, 0x11, 0x0e]),
    ('7', [0x1f, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08]),
    ('8', [0x0e, 0x11, 0x11, 0x0e, 0x11, 0x11, 0x0e]),
    ('9', [0x0e, 0x11, 0x11, 0x0f, 0x01, 0x02, 0x0c]),
    ('A', [0x0e, 0x11, 0x11, 0x1f, 0x11, 0x11, 0x11]),
    ('B', [0x1e, 0x11, 0x11, 0x1e, 0x11, 0x11, 0x1e]),
    ('C', [0x0e, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0e]),
    ('D', [0x1e, 0x11, 0x11, 0x11, 0x11, 0x11, 0x1e]),
    ('E', [0x1f, 0x10, 0x10, 0x1e, 0x10, 0x10, 0x1f]),
    ('F', [0x1f, 0x10, 0x10, 0x1e, 0x10, 0x10, 0x10]),
    ('G', [0x0e, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0e]),
    ('H', [0x11, 0x11, 0x11, 0x1f, 0x11, 0x11, 0x11]),
    ('I', [0x0e, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0e]),
    ('J', [0x07, 0x02, 0x02, 0x02, 0x12, 0x12, 0x0c]),
    ('K', [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11]),
    ('L', [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1f]),
    ('M', [0x11, 0x1b, 0x15, 0x15, 0x11, 0x11, 0x11]),
    ('N', [0x11, 0x11, 0x19, 0x15, 0x13, 0x11, 0x11]),
    ('O', [0x0e, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0e]),
    ('P', [0x1e, 0x11, 0x11, 0x1e, 0x10, 0x10, 0x10]),
    ('Q', [0x0e, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0d]),
    ('R', [0x1e, 0x11, 0x11, 0x1e, 0x14, 0x12, 0x11]),
    ('S', [0x0f, 0x10, 0x10, 0x0e, 0x01, 0x01, 0x1e]),
    ('T', [0x1f, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04]),
    ('U', [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0e]),
    ('V', [0x11, 0x11, 0x11, 0x0a, 0x0a, 0x04, 0x04]),
    ('W', [0x11, 0x11, 0x11, 0x15, 0x15, 0x15, 0x0a]),
    ('X', [0x11, 0x11, 0x0a, 0x04, 0x0a, 0x11, 0x11]),
    ('Y', [0x11, 0x11, 0x0a, 0x04, 0x04, 0x04, 0x04]),
    ('Z', [0x1f, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1f]),
    ('-', [0x00, 0x00, 0x00, 0x1f, 0x00, 0x00, 0x00]),
    ('&', [0x0c, 0x12, 0x14, 0x08, 0x15, 0x12, 0x0d]),
    ('/', [0x01, 0x02, 0x04, 0x08, 0x10, 0x10, 0x00]),
    (':', [0x00, 0x04, 0x00, 0x00, 0x04, 0x00, 0x00]),
    ('#', [0x0a, 0x1f, 0x0a, 0x0a, 0x1f, 0x0a, 0x0a]),
    ('@', [0x0e, 0x11, 0x17, 0x15, 0x17, 0x10, 0x0e]),
    ('\'', [0x04, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00]),
    ('=', [0x00, 0x1f, 0x00, 0x00, 0x1f, 0x00, 0x00]),
    ('"', [0x0a, 0x0a, 0x00, 0x00, 0x00, 0x00, 0x00]),
    ('.', [0x00, 0x00, 0x00, 0x00, 0x00, 0x06, 0x06]),
    (',', [0x00, 0x00, 0x00, 0x00, 0x06, 0x04, 0x08]),
    ('<', [0x02, 0x04, 0x08, 0x10, 0x08, 0x04, 0x02]),
    ('>', [0x08, 0x04, 0x02, 0x01, 0x02, 0x04, 0x08]),
    ('(', [0x02, 0x04, 0x08, 0x08, 0x08, 0x04, 0x02]),
    (')', [0x08, 0x04, 0x02, 0x02, 0x02, 0x04, 0x08]),
    ('+', [0x04, 0x04, 0x1f, 0x04, 0x04, 0x00, 0x00]),
    ('!', [0x04, 0x04, 0x04, 0x04, 0x04, 0x00, 0x04]),
    ('?', [0x0e, 0x11, 0x02, 0x04, 0x04, 0x00, 0x04]),
    ('%', [0x19, 0x1a, 0x04, 0x08, 0x16, 0x06, 0x00]),
    ('*', [0x04, 0x15, 0x0e, 0x15, 0x04, 0x00, 0x00]),
    (';', [0x00, 0x04, 0x00, 0x00, 0x06, 0x04, 0x08]),
    ('_', [0x00, 0x00, 0x00, 0x00, 0x00, 0x1f, 0x00]),
    ('|', [0x04, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04]),
    ('$', [0x04, 0x0f, 0x14, 0x0e, 0x05, 0x1e, 0x04]),
    ('·', [0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00]),
];

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn scale_follows_pixel_size() {
        assert_eq!(BitmapFont::new(46).scale(), 5);
        assert_eq!(BitmapFont::new(22).scale(), 2);
        assert_eq!(BitmapFont::new(4).scale(), 1);
    }

    #[test]
    fn width_is_linear_in_char_count() {
        let font = BitmapFont::new(27);
        assert_eq!(font.text_width(""), 0);
        assert_eq!(font.text_width("A"), 15);
        assert_eq!(font.text_width("AB"), 33);
        assert_eq!(font.text_width("作品"), 33);
    }

    #[test]
    fn lowercase_folds_to_uppercase_glyphs() {
        assert_eq!(glyph('q'), glyph('Q'));
        assert!(glyph('作').is_none());
    }

    #[test]
    fn unknown_characters_draw_a_box() {
        let font = BitmapFont::new(9);
        let background = Rgba([255, 255, 255, 255]);
        let ink = Rgba([0, 0, 0, 255]);
        let mut image = RgbaImage::from_pixel(20, 20, background);
        font.draw(&mut image, 0, 0, ink, "作");
        assert_eq!(*image.get_pixel(0, 1), ink);
        assert_eq!(*image.get_pixel(2, 3), background);
    }
}
