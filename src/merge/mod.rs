//! Ordered assembly of page files into one edition document
//!
//! The [`Assembler`] owns everything that is policy: candidate discovery,
//! numeric page ordering, the size floor, and atomic publication. The
//! actual PDF surgery sits behind the [`MergeEngine`] trait so the engine
//! is swappable at composition time; the shipped engine drives
//! `pdf_oxide`.

use std::path::{Path, PathBuf};

use pdf_oxide::editor::{DocumentEditor, EditableDocument, SaveOptions};
use tracing::{debug, info, warn};

use crate::error::MergeError;
use crate::fetch::MIN_PAGE_BYTES;

/// Appends ordered page files into a composite document
///
/// Implementations must treat any unparsable input as fatal: a partial or
/// silently malformed composite is worse than none.
pub trait MergeEngine: Send + Sync {
    /// Merge `inputs` in the given order and write the composite to `dest`
    fn merge(&self, inputs: &[PathBuf], dest: &Path) -> Result<(), MergeError>;
}

/// Merge engine backed by `pdf_oxide`'s document editor
pub struct PdfOxideEngine;

impl MergeEngine for PdfOxideEngine {
    fn merge(&self, inputs: &[PathBuf], dest: &Path) -> Result<(), MergeError> {
        let (first, rest) = inputs.split_first().ok_or(MergeError::NoValidPages)?;

        let mut editor = DocumentEditor::open(first).map_err(|err| MergeError::Corrupt {
            file: first.display().to_string(),
            reason: err.to_string(),
        })?;

        for input in rest {
            editor.merge_from(input).map_err(|err| MergeError::Corrupt {
                file: input.display().to_string(),
                reason: err.to_string(),
            })?;
        }

        editor
            .save_with_options(dest, SaveOptions::full_rewrite())
            .map_err(|err| MergeError::Engine(err.to_string()))?;
        Ok(())
    }
}

/// Collects, orders, filters, and merges a workspace of page files
pub struct Assembler {
    engine: Box<dyn MergeEngine>,
    min_bytes: u64,
}

impl Assembler {
    pub fn new(engine: Box<dyn MergeEngine>) -> Self {
        Self {
            engine,
            min_bytes: MIN_PAGE_BYTES,
        }
    }

    /// List candidate page files ordered by their embedded page number
    ///
    /// File stems end in a 2-digit page number; ordering is numeric on that
    /// suffix, never lexical on the whole name, so page 10 sorts after
    /// page 2. Files without such a suffix are ignored with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::Io`] if the workspace cannot be read.
    pub fn collect(&self, workspace: &Path) -> Result<Vec<(u32, PathBuf)>, MergeError> {
        let mut candidates = Vec::new();

        for entry in std::fs::read_dir(workspace)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("pdf") {
                continue;
            }
            let Some(page) = trailing_page_number(&path) else {
                warn!(file = %path.display(), "ignoring file without page-number suffix");
                continue;
            };
            candidates.push((page, path));
        }

        candidates.sort_by_key(|(page, _)| *page);
        Ok(candidates)
    }

    /// Merge the workspace into `dest`
    ///
    /// Undersized files are skipped with a warning; corrupt retained files
    /// abort the merge. The composite is saved to a sibling `.part` path
    /// and renamed onto `dest` only after the save completes, so the
    /// canonical path never holds a half-written document.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::NoValidPages`] when nothing survives the
    /// filter (nothing is written), or the engine's failure.
    pub fn assemble(&self, workspace: &Path, dest: &Path) -> Result<usize, MergeError> {
        let mut inputs = Vec::new();

        for (page, path) in self.collect(workspace)? {
            let size = std::fs::metadata(&path)?.len();
            if size < self.min_bytes {
                warn!(
                    file = %path.display(),
                    page,
                    size,
                    "skipping undersized page file"
                );
                continue;
            }
            debug!(file = %path.display(), page, size, "page file queued for merge");
            inputs.push(path);
        }

        if inputs.is_empty() {
            return Err(MergeError::NoValidPages);
        }

        let staging = dest.with_extension("pdf.part");
        if let Err(err) = self.engine.merge(&inputs, &staging) {
            let _ = std::fs::remove_file(&staging);
            return Err(err);
        }
        std::fs::rename(&staging, dest)?;

        info!(
            dest = %dest.display(),
            pages = inputs.len(),
            "merged edition written"
        );
        Ok(inputs.len())
    }
}

/// Parse the trailing 2-digit page number from a file stem
fn trailing_page_number(path: &Path) -> Option<u32> {
    let stem = path.file_stem()?.to_str()?;
    if stem.len() < 2 || !stem.is_char_boundary(stem.len() - 2) {
        return None;
    }
    stem[stem.len() - 2..].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_page_number() {
        assert_eq!(trailing_page_number(Path::new("rmrb2024010507.pdf")), Some(7));
        assert_eq!(trailing_page_number(Path::new("rmrb2024010510.pdf")), Some(10));
        assert_eq!(trailing_page_number(Path::new("notes.pdf")), None);
        assert_eq!(trailing_page_number(Path::new("x7.pdf")), None);
        assert_eq!(trailing_page_number(Path::new("报纸.pdf")), None);
    }
}
