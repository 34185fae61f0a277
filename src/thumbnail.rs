//! Batch downscaling and re-encoding of gallery images.
//!
//! Each image keeps its original format. Colour profiles and EXIF blocks are
//! carried over when the encoder can embed them.

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::codecs::webp::WebPEncoder;
use image::imageops::FilterType;
use image::{ColorType, DynamicImage, ImageDecoder, ImageEncoder, ImageFormat, ImageReader};
use thiserror::Error;
use tracing::{error, info, instrument, warn};

/// File extensions picked up by [`compress_dir`], compared case-insensitively.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

#[derive(Debug, Error)]
pub enum ThumbnailError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot determine the image format of {0}")]
    UnknownFormat(PathBuf),
    #[error(transparent)]
    Image(#[from] image::ImageError),
}

/// Re-encoding parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressOptions {
    /// JPEG quality, 1-100.
    pub quality: u8,
    /// Longest edge after resizing, in pixels.
    pub max_size: u32,
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self {
            quality: 95,
            max_size: 800,
        }
    }
}

/// A file that could not be processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of [`compress_dir`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompressReport {
    pub written: Vec<PathBuf>,
    pub failed: Vec<CompressFailure>,
}

impl CompressReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Whether `path` has one of the [`SUPPORTED_EXTENSIONS`].
pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

/// Re-encode every supported image directly inside `input` into `output`.
///
/// Sub-directories are not visited. A file that fails is logged and
/// reported without stopping the batch.
#[instrument(skip_all, fields(input = %input.display(), output = %output.display()))]
pub fn compress_dir(
    input: &Path,
    output: &Path,
    options: &CompressOptions,
) -> Result<CompressReport> {
    if !output.exists() {
        fs::create_dir_all(output)
            .with_context(|| format!("failed to create output directory {}", output.display()))?;
        info!(path = %output.display(), "created output directory");
    }

    let mut sources: Vec<PathBuf> = fs::read_dir(input)
        .with_context(|| format!("failed to list {}", input.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && is_supported(path))
        .collect();
    sources.sort();

    let mut report = CompressReport::default();
    for source in sources {
        let Some(name) = source.file_name() else {
            continue;
        };
        let target = output.join(name);
        match compress_file(&source, &target, options) {
            Ok(()) => {
                info!(file = %source.display(), "compressed");
                report.written.push(target);
            }
            Err(err) => {
                let reason = err.to_string();
                error!(file = %source.display(), error = %reason, "compression failed");
                report.failed.push(CompressFailure {
                    path: source,
                    reason,
                });
            }
        }
    }
    Ok(report)
}

/// Downscale `source` to fit `options.max_size` and write it to `target` in its own format.
pub fn compress_file(
    source: &Path,
    target: &Path,
    options: &CompressOptions,
) -> Result<(), ThumbnailError> {
    let reader = ImageReader::open(source)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|source_err| ThumbnailError::Read {
            path: source.to_path_buf(),
            source: source_err,
        })?;
    let format = reader
        .format()
        .ok_or_else(|| ThumbnailError::UnknownFormat(source.to_path_buf()))?;
    let mut decoder = reader.into_decoder()?;
    let icc_profile = decoder.icc_profile()?;
    let exif = decoder.exif_metadata()?;
    let mut image = DynamicImage::from_decoder(decoder)?;

    if image.width().max(image.height()) > options.max_size {
        image = image.resize(options.max_size, options.max_size, FilterType::Lanczos3);
    }

    let metadata = Metadata { icc_profile, exif };
    let bytes = encode(&image, format, options, metadata)?;
    fs::write(target, bytes).map_err(|source_err| ThumbnailError::Write {
        path: target.to_path_buf(),
        source: source_err,
    })
}

fn encode(
    image: &DynamicImage,
    format: ImageFormat,
    options: &CompressOptions,
    metadata: Metadata,
) -> Result<Vec<u8>, ThumbnailError> {
    let mut out = Vec::new();
    match format {
        ImageFormat::Jpeg => {
            let quality = options.quality.clamp(1, 100);
            let mut encoder = JpegEncoder::new_with_quality(&mut out, quality);
            metadata.attach(&mut encoder);
            // JPEG has no alpha channel and no palette.
            let flattened;
            let image = if matches!(image.color(), ColorType::L8 | ColorType::Rgb8) {
                image
            } else {
                flattened = DynamicImage::ImageRgb8(image.to_rgb8());
                &flattened
            };
            image.write_with_encoder(encoder)?;
        }
        ImageFormat::Png => {
            let mut encoder =
                PngEncoder::new_with_quality(&mut out, CompressionType::Best, PngFilter::Adaptive);
            metadata.attach(&mut encoder);
            image.write_with_encoder(encoder)?;
        }
        ImageFormat::WebP => {
            let mut encoder = WebPEncoder::new_lossless(&mut out);
            metadata.attach(&mut encoder);
            let converted;
            let image = if matches!(image.color(), ColorType::Rgb8 | ColorType::Rgba8) {
                image
            } else {
                converted = DynamicImage::ImageRgba8(image.to_rgba8());
                &converted
            };
            image.write_with_encoder(encoder)?;
        }
        other => {
            image.write_to(&mut Cursor::new(&mut out), other)?;
        }
    }
    Ok(out)
}

/// Colour profile and EXIF block read from the source image.
struct Metadata {
    icc_profile: Option<Vec<u8>>,
    exif: Option<Vec<u8>>,
}

impl Metadata {
    fn attach<E: ImageEncoder>(self, encoder: &mut E) {
        if let Some(profile) = self.icc_profile {
            if let Err(err) = encoder.set_icc_profile(profile) {
                warn!(error = %err, "encoder cannot embed the ICC profile; dropping it");
            }
        }
        if let Some(exif) = self.exif {
            if let Err(err) = encoder.set_exif_metadata(exif) {
                warn!(error = %err, "encoder cannot embed EXIF metadata; dropping it");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extensions_match_case_insensitively() {
        assert!(is_supported(Path::new("a/b/photo.JPG")));
        assert!(is_supported(Path::new("scan.webp")));
        assert!(!is_supported(Path::new("notes.txt")));
        assert!(!is_supported(Path::new("README")));
    }
}
