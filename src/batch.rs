//! Rendering a whole data file of records to PNG cards.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{error, info, instrument, warn};

use crate::card::{CardSpec, render_card};
use crate::record::WorkRecord;
use crate::text::{Face, Faces};

/// A record that could not be rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderFailure {
    pub id: String,
    pub reason: String,
}

/// Outcome of [`render_all`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub written: Vec<PathBuf>,
    pub failed: Vec<RenderFailure>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Card file for `record` inside `output_dir`.
pub fn card_path(output_dir: &Path, record: &WorkRecord) -> PathBuf {
    output_dir.join(format!("{}.png", record.file_stem()))
}

/// Render and save one card.
pub fn render_to_file(
    record: &WorkRecord,
    spec: &CardSpec,
    faces: &Faces<Face>,
    output_dir: &Path,
) -> Result<PathBuf> {
    let card = render_card(record, spec, faces)
        .with_context(|| format!("failed to render card '{}'", record.file_stem()))?;
    let path = card_path(output_dir, record);
    card.image
        .save(&path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

/// Render every record into `output_dir`.
///
/// A record that fails is logged and reported; the remaining records are
/// still rendered. Only failing to create `output_dir` aborts the batch.
#[instrument(skip_all, fields(records = records.len(), output = %output_dir.display()))]
pub fn render_all(
    records: &[WorkRecord],
    spec: &CardSpec,
    faces: &Faces<Face>,
    output_dir: &Path,
) -> Result<BatchReport> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create output directory {}", output_dir.display()))?;

    let mut report = BatchReport::default();
    let mut seen = HashSet::new();
    for record in records {
        let stem = record.file_stem();
        if !seen.insert(stem) {
            warn!(id = stem, "duplicate id; the earlier card will be overwritten");
        }
        match render_to_file(record, spec, faces, output_dir) {
            Ok(path) => {
                info!(path = %path.display(), "generated");
                report.written.push(path);
            }
            Err(err) => {
                let reason = format!("{err:#}");
                error!(id = stem, error = %reason, "card failed");
                report.failed.push(RenderFailure {
                    id: stem.to_string(),
                    reason,
                });
            }
        }
    }
    Ok(report)
}
