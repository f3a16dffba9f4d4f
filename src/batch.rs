//! Batch export of every property include file under a directory tree.
use crate::binder::{bind_property, BindOutcome, SkipReason};
use crate::export::{export_property, ExportRecord, ExportSink};
use crate::grid::Grid;
use crate::keyword::KeywordPolicy;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extension of property include files.
pub const PROPERTY_EXTENSION: &str = "grdecl";

/// Counts for one batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub discovered: usize,
    pub exported: usize,
    pub skipped_empty: usize,
    pub skipped_not_text: usize,
    pub skipped_long_line: usize,
    pub skipped_malformed: usize,
    pub records: Vec<ExportRecord>,
}

impl BatchSummary {
    fn record_skip(&mut self, reason: &SkipReason) {
        match reason {
            SkipReason::EmptyKeyword => self.skipped_empty += 1,
            SkipReason::NotText => self.skipped_not_text += 1,
            SkipReason::LineTooLong { .. } => self.skipped_long_line += 1,
            SkipReason::Malformed { .. } => self.skipped_malformed += 1,
        }
    }

    pub fn skipped(&self) -> usize {
        self.skipped_empty
            + self.skipped_not_text
            + self.skipped_long_line
            + self.skipped_malformed
    }
}

/// Include directory for a deck: the grandparent of the datafile.
///
/// `eclipse/model/DROGON-0.DATA` gives `eclipse`.
pub fn include_root(datafile: &Path) -> PathBuf {
    parent_or_current(&parent_or_current(datafile))
}

fn parent_or_current(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if parent.as_os_str().is_empty() => PathBuf::from("."),
        Some(parent) => parent.to_path_buf(),
        // Filesystem root, or already empty.
        None => path.to_path_buf(),
    }
}

/// Property files under `root`, sorted by name within each directory.
///
/// Symbolic links are followed; candidates keep their link path.
pub fn discover_candidates(root: &Path) -> Result<Vec<PathBuf>> {
    let mut candidates = Vec::new();
    for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
        let entry =
            entry.with_context(|| format!("walk include directory {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let is_property = entry
            .path()
            .extension()
            .is_some_and(|ext| ext == PROPERTY_EXTENSION);
        if is_property {
            candidates.push(entry.into_path());
        }
    }
    Ok(candidates)
}

/// Bind and export every property file under `root` against `grid`.
///
/// Skipped candidates are counted; any other failure ends the batch.
pub fn run_batch(
    root: &Path,
    grid: &Grid,
    policy: KeywordPolicy,
    sink: &mut dyn ExportSink,
) -> Result<BatchSummary> {
    let candidates = discover_candidates(root)?;
    tracing::info!(
        root = %root.display(),
        candidates = candidates.len(),
        "discovered property files"
    );

    let mut summary = BatchSummary {
        discovered: candidates.len(),
        ..BatchSummary::default()
    };
    for path in &candidates {
        tracing::debug!(path = %path.display(), "property candidate");
        match bind_property(path, grid, policy)? {
            BindOutcome::Bound(property) => {
                let record = export_property(sink, &property)
                    .with_context(|| format!("export property from {}", path.display()))?;
                summary.exported += 1;
                summary.records.push(record);
            }
            BindOutcome::Skipped(reason) => summary.record_skip(&reason),
        }
    }

    tracing::info!(
        discovered = summary.discovered,
        exported = summary.exported,
        skipped = summary.skipped(),
        "property export complete"
    );
    Ok(summary)
}
