//! Batch document validation
//!
//! Decodes many HX files in parallel. Each file is decoded independently, so
//! the work is spread over the rayon pool with no shared state beyond the
//! progress counters.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use walkdir::WalkDir;

use crate::formats::document::DocumentSummary;
use crate::formats::{DecodeOptions, decode_document_with};

/// File extension of binary HX documents.
pub const DOCUMENT_EXTENSION: &str = "hx";

/// Progress of a batch run, reported once per file as it starts.
#[derive(Debug, Clone)]
pub struct ValidateProgress {
    pub current: usize,
    pub total: usize,
    /// Path of the file being decoded, for display.
    pub path: String,
}

/// Outcome of decoding one file.
#[derive(Debug, Clone)]
pub struct FileReport {
    pub path: PathBuf,
    /// Set when the file decoded.
    pub summary: Option<DocumentSummary>,
    /// Set when reading or decoding failed.
    pub error: Option<String>,
    /// Byte offset of a decode failure.
    pub error_offset: Option<u64>,
}

impl FileReport {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }
}

/// Result of a batch validation
#[derive(Debug, Clone)]
pub struct BatchValidateResult {
    /// Number of files that decoded
    pub success_count: usize,
    /// Number of files that failed
    pub fail_count: usize,
    /// One report per input file, in input order
    pub reports: Vec<FileReport>,
}

/// Find all .hx files in a directory
///
/// # Arguments
/// * `dir` - Directory to search
/// * `recursive` - Descend into subdirectories
///
/// # Returns
/// A sorted list of paths to .hx files.
pub fn find_documents<P: AsRef<Path>>(dir: P, recursive: bool) -> Vec<PathBuf> {
    let walker = WalkDir::new(dir).follow_links(true);
    let walker = if recursive { walker } else { walker.max_depth(1) };

    let mut files: Vec<_> = walker
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| {
            e.path().is_file()
                && e.path()
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(DOCUMENT_EXTENSION))
        })
        .map(|e| e.path().to_path_buf())
        .collect();

    files.sort();
    files
}

/// Read and decode one file
#[must_use]
pub fn validate_file(path: &Path, options: &DecodeOptions) -> FileReport {
    let decoded = std::fs::read(path)
        .map_err(crate::Error::from)
        .and_then(|bytes| decode_document_with(&bytes, options));

    match decoded {
        Ok(doc) => FileReport {
            path: path.to_path_buf(),
            summary: Some(doc.summary()),
            error: None,
            error_offset: None,
        },
        Err(e) => {
            tracing::debug!("{}: {}", path.display(), e);
            FileReport {
                path: path.to_path_buf(),
                summary: None,
                error_offset: e.offset(),
                error: Some(e.to_string()),
            }
        }
    }
}

/// Validate files in parallel
///
/// # Arguments
/// * `files` - Files to decode
/// * `options` - Decoder settings applied to every file
/// * `progress` - Callback for progress updates
///
/// # Returns
/// Summary of the batch, with reports in the order of `files`.
pub fn batch_validate<F>(
    files: &[PathBuf],
    options: &DecodeOptions,
    progress: F,
) -> BatchValidateResult
where
    F: Fn(&ValidateProgress) + Send + Sync,
{
    let success_counter = AtomicUsize::new(0);
    let fail_counter = AtomicUsize::new(0);
    let processed = AtomicUsize::new(0);
    let total = files.len();

    let reports: Vec<FileReport> = files
        .par_iter()
        .map(|path| {
            let current = processed.fetch_add(1, Ordering::SeqCst) + 1;
            progress(&ValidateProgress {
                current,
                total,
                path: path.to_string_lossy().to_string(),
            });

            let report = validate_file(path, options);
            if report.is_valid() {
                success_counter.fetch_add(1, Ordering::SeqCst);
            } else {
                fail_counter.fetch_add(1, Ordering::SeqCst);
            }
            report
        })
        .collect();

    tracing::info!(
        "Validated {} files: {} ok, {} failed",
        total,
        success_counter.load(Ordering::SeqCst),
        fail_counter.load(Ordering::SeqCst)
    );

    BatchValidateResult {
        success_count: success_counter.load(Ordering::SeqCst),
        fail_count: fail_counter.load(Ordering::SeqCst),
        reports,
    }
}
