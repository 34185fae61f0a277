//! Font faces and the ordered font-file fallback.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use ab_glyph::{FontVec, PxScale};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::bitmap::BitmapFont;
use super::{LayoutError, TextMeasure};

/// Regular-weight font files tried in order; CJK-capable faces first.
pub const REGULAR_CANDIDATES: &[&str] = &[
    "NotoSansTC-Regular.otf",
    "NotoSansTC-Regular.ttf",
    "NotoSansTC-Medium.otf",
    "msjh.ttc",
    "mingliu.ttc",
    "arialuni.ttf",
    "arial.ttf",
];

/// Bold-weight font files tried in order.
pub const BOLD_CANDIDATES: &[&str] = &[
    "NotoSansTC-Bold.otf",
    "NotoSansTC-Bold.ttf",
    "NotoSansTC-Medium.otf",
    "msjhbd.ttc",
    "arialbd.ttf",
];

const DEFAULT_FONT_DIRS: &[&str] = &[
    "fonts",
    "/usr/share/fonts",
    "/usr/local/share/fonts",
    "/Library/Fonts",
    "/System/Library/Fonts",
    "C:\\Windows\\Fonts",
];

const MAX_SCAN_DEPTH: usize = 4;

#[derive(Debug, Error)]
pub enum FontError {
    #[error("failed to read font file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path} is not a usable font: {reason}")]
    Invalid { path: PathBuf, reason: String },
}

/// The typographic roles used on a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontRole {
    Title,
    Subtitle,
    Body,
    Small,
}

impl FontRole {
    pub const ALL: [FontRole; 4] = [
        FontRole::Title,
        FontRole::Subtitle,
        FontRole::Body,
        FontRole::Small,
    ];

    pub fn is_bold(self) -> bool {
        matches!(self, FontRole::Title | FontRole::Subtitle)
    }

    pub fn candidates(self) -> &'static [&'static str] {
        if self.is_bold() {
            BOLD_CANDIDATES
        } else {
            REGULAR_CANDIDATES
        }
    }
}

impl fmt::Display for FontRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FontRole::Title => write!(f, "title"),
            FontRole::Subtitle => write!(f, "subtitle"),
            FontRole::Body => write!(f, "body"),
            FontRole::Small => write!(f, "small"),
        }
    }
}

enum Glyphs {
    Outline { font: FontVec, source: PathBuf },
    Bitmap(BitmapFont),
}

/// A font at a fixed pixel size. The line height is the pixel size.
pub struct Face {
    size: u32,
    glyphs: Glyphs,
}

impl Face {
    /// Load an outline font (TTF, OTF or the first face of a TTC).
    pub fn load(path: &Path, size: u32) -> Result<Self, FontError> {
        let data = fs::read(path).map_err(|source| FontError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let font = FontVec::try_from_vec_and_index(data, 0).map_err(|err| FontError::Invalid {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
        Ok(Self {
            size,
            glyphs: Glyphs::Outline {
                font,
                source: path.to_path_buf(),
            },
        })
    }

    /// The built-in bitmap face.
    pub fn fallback(size: u32) -> Self {
        Self {
            size,
            glyphs: Glyphs::Bitmap(BitmapFont::new(size)),
        }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// File the face was loaded from, `None` for the built-in face.
    pub fn source(&self) -> Option<&Path> {
        match &self.glyphs {
            Glyphs::Outline { source, .. } => Some(source),
            Glyphs::Bitmap(_) => None,
        }
    }

    #[cfg(test)]
    fn is_fallback(&self) -> bool {
        matches!(self.glyphs, Glyphs::Bitmap(_))
    }

    /// Draw `text` with its top-left corner at `(x, y)`.
    pub fn draw(&self, image: &mut RgbaImage, x: i32, y: i32, color: Rgba<u8>, text: &str) {
        match &self.glyphs {
            Glyphs::Outline { font, .. } => {
                draw_text_mut(image, color, x, y, self.scale(), font, text);
            }
            Glyphs::Bitmap(bitmap) => bitmap.draw(image, x, y, color, text),
        }
    }

    fn scale(&self) -> PxScale {
        PxScale::from(self.size as f32)
    }
}

impl TextMeasure for Face {
    fn text_width(&self, text: &str) -> Result<u32, LayoutError> {
        let width = match &self.glyphs {
            Glyphs::Outline { font, .. } => text_size(self.scale(), font, text).0,
            Glyphs::Bitmap(bitmap) => bitmap.text_width(text),
        };
        Ok(width)
    }

    fn line_height(&self) -> u32 {
        self.size
    }
}

impl fmt::Debug for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.glyphs {
            Glyphs::Outline { source, .. } => f
                .debug_struct("Face")
                .field("size", &self.size)
                .field("source", source)
                .finish(),
            Glyphs::Bitmap(_) => f
                .debug_struct("Face")
                .field("size", &self.size)
                .field("source", &"built-in")
                .finish(),
        }
    }
}

/// One face per [`FontRole`].
#[derive(Debug)]
pub struct Faces<F> {
    pub title: F,
    pub subtitle: F,
    pub body: F,
    pub small: F,
}

impl<F> Faces<F> {
    pub fn get(&self, role: FontRole) -> &F {
        match role {
            FontRole::Title => &self.title,
            FontRole::Subtitle => &self.subtitle,
            FontRole::Body => &self.body,
            FontRole::Small => &self.small,
        }
    }
}

impl Faces<Face> {
    /// Resolve every role through `locator`, sizing each face with `size_of`.
    pub fn probe(locator: &FontLocator, size_of: impl Fn(FontRole) -> u32) -> Self {
        let load = |role: FontRole| {
            let face = locator.face(role.candidates(), size_of(role));
            match face.source() {
                Some(path) => {
                    info!(%role, path = %path.display(), size = face.size(), "font resolved")
                }
                None => warn!(
                    %role,
                    size = face.size(),
                    "no font file found; using built-in bitmap face"
                ),
            }
            face
        };
        Self {
            title: load(FontRole::Title),
            subtitle: load(FontRole::Subtitle),
            body: load(FontRole::Body),
            small: load(FontRole::Small),
        }
    }
}

/// Finds font files by name in a list of directories.
///
/// Directories are scanned once, recursively, when the locator is built.
/// Earlier directories win when the same file name appears twice.
#[derive(Debug, Clone, Default)]
pub struct FontLocator {
    dirs: Vec<PathBuf>,
    index: HashMap<String, PathBuf>,
}

impl FontLocator {
    /// Search `extra` first, then the usual platform font directories.
    pub fn new<I>(extra: I) -> Self
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let dirs = extra
            .into_iter()
            .chain(DEFAULT_FONT_DIRS.iter().map(PathBuf::from))
            .collect();
        Self::with_dirs(dirs)
    }

    /// Search only `dirs`.
    pub fn with_dirs(dirs: Vec<PathBuf>) -> Self {
        let mut index = HashMap::new();
        for dir in &dirs {
            scan_dir(dir, 0, &mut index);
        }
        debug!(dirs = dirs.len(), files = index.len(), "font directories scanned");
        Self { dirs, index }
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Path of a font file by (case-insensitive) file name.
    pub fn find(&self, name: &str) -> Option<&Path> {
        self.index.get(&name.to_lowercase()).map(PathBuf::as_path)
    }

    /// Load the first candidate that parses; fall back to the bitmap face.
    pub fn face(&self, candidates: &[&str], size: u32) -> Face {
        for name in candidates {
            let Some(path) = self.find(name) else {
                continue;
            };
            match Face::load(path, size) {
                Ok(face) => return face,
                Err(err) => debug!(error = %err, "skipping font candidate"),
            }
        }
        Face::fallback(size)
    }
}

fn scan_dir(dir: &Path, depth: usize, index: &mut HashMap<String, PathBuf>) {
    if depth > MAX_SCAN_DEPTH {
        return;
    }
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    let mut subdirs = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            subdirs.push(path);
        } else if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            index.entry(name.to_lowercase()).or_insert(path);
        }
    }
    subdirs.sort();
    for sub in subdirs {
        scan_dir(&sub, depth + 1, index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn bold_roles_use_bold_candidates() {
        assert_eq!(FontRole::Title.candidates(), BOLD_CANDIDATES);
        assert_eq!(FontRole::Subtitle.candidates(), BOLD_CANDIDATES);
        assert_eq!(FontRole::Body.candidates(), REGULAR_CANDIDATES);
        assert_eq!(FontRole::Small.candidates(), REGULAR_CANDIDATES);
    }

    #[test]
    fn fallback_face_reports_pixel_size_as_line_height() {
        let face = Face::fallback(28);
        assert!(face.is_fallback());
        assert_eq!(face.source(), None);
        assert_eq!(face.line_height(), 28);
        assert_eq!(face.text_width("").unwrap(), 0);
    }

    #[test]
    fn missing_directories_are_ignored() {
        let locator = FontLocator::with_dirs(vec![PathBuf::from("/definitely/not/here")]);
        assert!(locator.find("arial.ttf").is_none());
        assert!(locator.face(REGULAR_CANDIDATES, 22).is_fallback());
    }

    /// Smallest sfnt file that parses: `head`, `hhea` and `maxp` only.
    fn tiny_font() -> Vec<u8> {
        fn table(tag: &[u8; 4], offset: u32, len: u32) -> Vec<u8> {
            let mut record = tag.to_vec();
            record.extend_from_slice(&0u32.to_be_bytes());
            record.extend_from_slice(&offset.to_be_bytes());
            record.extend_from_slice(&len.to_be_bytes());
            record
        }

        let mut head = vec![0u8; 54];
        head[0..4].copy_from_slice(&0x0001_0000u32.to_be_bytes());
        head[12..16].copy_from_slice(&0x5f0f_3cf5u32.to_be_bytes());
        head[18..20].copy_from_slice(&1000u16.to_be_bytes());
        let mut hhea = vec![0u8; 36];
        hhea[0..4].copy_from_slice(&0x0001_0000u32.to_be_bytes());
        hhea[4..6].copy_from_slice(&800i16.to_be_bytes());
        hhea[6..8].copy_from_slice(&(-200i16).to_be_bytes());
        hhea[34..36].copy_from_slice(&1u16.to_be_bytes());
        let mut maxp = 0x0000_5000u32.to_be_bytes().to_vec();
        maxp.extend_from_slice(&1u16.to_be_bytes());

        let mut font = 0x0001_0000u32.to_be_bytes().to_vec();
        for field in [3u16, 32, 1, 16] {
            font.extend_from_slice(&field.to_be_bytes());
        }
        font.extend(table(b"head", 60, 54));
        font.extend(table(b"hhea", 116, 36));
        font.extend(table(b"maxp", 152, 6));
        font.extend(head);
        font.extend([0, 0]);
        font.extend(hhea);
        font.extend(maxp);
        font
    }

    fn two_dirs() -> (tempfile::TempDir, PathBuf, PathBuf) {
        let root = tempfile::tempdir().unwrap();
        let first = root.path().join("first");
        let second = root.path().join("second");
        fs::create_dir_all(&first).unwrap();
        fs::create_dir_all(&second).unwrap();
        (root, first, second)
    }

    #[test]
    fn unparsable_candidate_is_skipped_for_the_next_one() {
        let (_root, first, second) = two_dirs();
        fs::write(first.join("NotoSansTC-Bold.otf"), b"not a font").unwrap();
        fs::write(second.join("NotoSansTC-Bold.ttf"), tiny_font()).unwrap();

        let locator = FontLocator::with_dirs(vec![first, second.clone()]);
        let face = locator.face(BOLD_CANDIDATES, 46);
        let expected = second.join("NotoSansTC-Bold.ttf");
        assert_eq!(face.source(), Some(expected.as_path()));
        assert_eq!(face.line_height(), 46);
    }

    #[test]
    fn earlier_directory_wins_for_the_same_file_name() {
        let (_root, first, second) = two_dirs();
        fs::write(first.join("arial.ttf"), tiny_font()).unwrap();
        fs::write(second.join("arial.ttf"), tiny_font()).unwrap();

        let locator = FontLocator::with_dirs(vec![first.clone(), second]);
        let expected = first.join("arial.ttf");
        assert_eq!(locator.find("ARIAL.TTF"), Some(expected.as_path()));
        assert_eq!(
            locator.face(REGULAR_CANDIDATES, 22).source(),
            Some(expected.as_path())
        );
    }

    #[test]
    fn no_loadable_candidate_falls_back_to_bitmap() {
        let (_root, first, second) = two_dirs();
        for name in BOLD_CANDIDATES {
            fs::write(first.join(name), b"garbage").unwrap();
        }
        let truncated = tiny_font()[..40].to_vec();
        fs::write(second.join("arialbd.ttf"), truncated).unwrap();

        let locator = FontLocator::with_dirs(vec![first, second]);
        let face = locator.face(BOLD_CANDIDATES, 46);
        assert!(face.is_fallback());
        assert_eq!(face.line_height(), 46);
    }
}
