//! Fixed card geometry, palette and label strings.
//!
//! Every field has a default, so a JSON layout file only needs the values it
//! wants to change.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use image::Rgba;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

use crate::text::FontRole;

const DEFAULT_BASE_URL: &str = "https://ccucolorfun-32.github.io/template/index.html";

/// An opaque sRGB colour written as `#rrggbb` in layout files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Colour(pub Rgba<u8>);

impl Colour {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Colour(Rgba([r, g, b, 0xff]))
    }
}

impl From<Colour> for Rgba<u8> {
    fn from(value: Colour) -> Self {
        value.0
    }
}

impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, _] = self.0.0;
        write!(f, "#{r:02x}{g:02x}{b:02x}")
    }
}

impl FromStr for Colour {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let hex = s
            .strip_prefix('#')
            .ok_or_else(|| anyhow!("colour '{}' must start with '#'", s))?;
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(anyhow!("colour '{}' must be #rrggbb", s));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).with_context(|| format!("invalid colour '{}'", s))
        };
        Ok(Colour::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl Serialize for Colour {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Colour {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// Colours used on the card face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub background: Colour,
    pub border: Colour,
    pub creator: Colour,
    pub grade: Colour,
    pub divider: Colour,
    pub body: Colour,
    pub caption: Colour,
    pub footer: Colour,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: Colour::rgb(0xf5, 0xf6, 0xfa),
            border: Colour::rgb(0x00, 0x00, 0x00),
            creator: Colour::rgb(0x1f, 0x29, 0x37),
            grade: Colour::rgb(0x4b, 0x55, 0x63),
            divider: Colour::rgb(0xcb, 0xd5, 0xe1),
            body: Colour::rgb(0x11, 0x18, 0x27),
            caption: Colour::rgb(0x1f, 0x29, 0x37),
            footer: Colour::rgb(0x4b, 0x55, 0x63),
        }
    }
}

/// Fixed strings printed on every card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Labels {
    pub medium: String,
    pub size: String,
    pub concept: String,
    pub story: String,
    pub caption: String,
    pub footer: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            medium: "媒材：".to_string(),
            size: "尺寸：".to_string(),
            concept: "作品理念：".to_string(),
            story: "創作故事：".to_string(),
            caption: "作品詳情".to_string(),
            footer: "32 屆 · 美術社期末成果展".to_string(),
        }
    }
}

/// Pixel size of each font role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontSizes {
    pub title: u32,
    pub subtitle: u32,
    pub body: u32,
    pub small: u32,
}

impl FontSizes {
    pub fn get(&self, role: FontRole) -> u32 {
        match role {
            FontRole::Title => self.title,
            FontRole::Subtitle => self.subtitle,
            FontRole::Body => self.body,
            FontRole::Small => self.small,
        }
    }
}

impl Default for FontSizes {
    fn default() -> Self {
        Self {
            title: 46,
            subtitle: 32,
            body: 28,
            small: 22,
        }
    }
}

/// What to do when the text flow runs into the code caption.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Fail the card.
    #[default]
    Error,
    /// Log a warning and keep the card.
    Allow,
}

/// Card geometry and content configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardSpec {
    pub width: u32,
    pub height: u32,
    pub margin: u32,
    /// Extra space below every text line.
    pub line_spacing: u32,
    /// Distance from the cursor to the divider rule.
    pub divider_offset: u32,
    /// Cursor advance for the divider block.
    pub divider_advance: u32,
    pub divider_thickness: u32,
    pub section_gap: u32,
    pub story_gap: u32,
    pub code_size: u32,
    /// Space between the caption and the code image.
    pub caption_gap: u32,
    pub include_story: bool,
    pub overflow: OverflowPolicy,
    pub base_url: String,
    pub fonts: FontSizes,
    pub palette: Palette,
    pub labels: Labels,
}

impl Default for CardSpec {
    fn default() -> Self {
        Self {
            width: 700,
            height: 1500,
            margin: 70,
            line_spacing: 8,
            divider_offset: 20,
            divider_advance: 60,
            divider_thickness: 2,
            section_gap: 18,
            story_gap: 28,
            code_size: 220,
            caption_gap: 6,
            include_story: false,
            overflow: OverflowPolicy::Error,
            base_url: DEFAULT_BASE_URL.to_string(),
            fonts: FontSizes::default(),
            palette: Palette::default(),
            labels: Labels::default(),
        }
    }
}

impl CardSpec {
    /// Read a (possibly partial) layout from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read layout {}", path.display()))?;
        let spec: CardSpec = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse layout {}", path.display()))?;
        spec.validate()
            .with_context(|| format!("invalid layout in {}", path.display()))?;
        Ok(spec)
    }

    /// Check that the text column and the code image fit on the canvas.
    pub fn validate(&self) -> Result<()> {
        if self.usable_width() == 0 {
            return Err(anyhow!(
                "margins of {}px leave no room on a {}px wide card",
                self.margin,
                self.width
            ));
        }
        let code_extent = u64::from(self.margin) + u64::from(self.code_size);
        if code_extent > u64::from(self.width) || code_extent > u64::from(self.height) {
            return Err(anyhow!(
                "a {}px code image does not fit inside a {}x{} card with {}px margins",
                self.code_size,
                self.width,
                self.height,
                self.margin
            ));
        }
        Ok(())
    }

    /// Width available to wrapped text.
    pub fn usable_width(&self) -> u32 {
        self.width.saturating_sub(self.margin.saturating_mul(2))
    }

    /// Top-left corner of the code image, anchored bottom-right.
    pub fn code_origin(&self) -> (i64, i64) {
        let offset = i64::from(self.margin) + i64::from(self.code_size);
        (
            i64::from(self.width) - offset,
            i64::from(self.height) - offset,
        )
    }

    /// Top of the caption drawn above the code image.
    pub fn caption_origin(&self, small_line_height: u32) -> (i64, i64) {
        let (x, y) = self.code_origin();
        (x, y - i64::from(small_line_height) - i64::from(self.caption_gap))
    }

    /// Top of the footer line.
    pub fn footer_origin(&self, small_line_height: u32) -> (i64, i64) {
        (
            i64::from(self.margin),
            i64::from(self.height) - i64::from(self.margin) - i64::from(small_line_height),
        )
    }

    /// Lowest y the flowing text may reach: the top of the code caption.
    pub fn text_floor(&self, small_line_height: u32) -> i64 {
        let (_, caption_y) = self.caption_origin(small_line_height);
        let (_, footer_y) = self.footer_origin(small_line_height);
        caption_y.min(footer_y)
    }

    /// Link encoded in the code image for a record.
    pub fn link_for(&self, id: &str) -> String {
        format!("{}?id={}", self.base_url, id)
    }
}
