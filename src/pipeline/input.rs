//! Input resolution: turn a user selection into a [`CandidateFile`].
//!
//! A browser hands the workflow a `File` whose type comes from the file name.
//! The CLI does the same from a path: it stats the file, derives the declared
//! media type from the extension and leaves the bytes on disk until the
//! request body is built. Drag-and-drop and the file picker are different
//! sources, but both end up in the same validator.

use crate::error::ScanError;
use crate::model::{CandidateFile, FileContent};
use std::path::Path;
use tracing::debug;

/// Media type reported for extensions we do not recognise.
pub const UNKNOWN_MEDIA_TYPE: &str = "application/octet-stream";

/// How the file reached the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionSource {
    FilePicker,
    DragDrop,
}

impl std::fmt::Display for SelectionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SelectionSource::FilePicker => f.write_str("file picker"),
            SelectionSource::DragDrop => f.write_str("drag and drop"),
        }
    }
}

/// Declared media type for a file name, by extension (case-insensitive).
pub fn media_type_for(name: &str) -> &'static str {
    let ext = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("pdf") => "application/pdf",
        _ => UNKNOWN_MEDIA_TYPE,
    }
}

/// Resolve a local path into a disk-backed candidate.
///
/// `media_type` overrides the extension-derived type when given.
pub fn resolve_path(
    path: impl AsRef<Path>,
    media_type: Option<&str>,
) -> Result<CandidateFile, ScanError> {
    let path = path.as_ref().to_path_buf();

    let meta = match std::fs::metadata(&path) {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(ScanError::PermissionDenied { path });
        }
        Err(_) => return Err(ScanError::FileNotFound { path }),
    };
    if !meta.is_file() {
        return Err(ScanError::NotAFile { path });
    }

    let name = file_name(&path);
    let media_type = media_type
        .map(str::to_string)
        .unwrap_or_else(|| media_type_for(&name).to_string());

    debug!(
        "Resolved {} ({}, {} bytes)",
        path.display(),
        media_type,
        meta.len()
    );

    Ok(CandidateFile {
        name,
        media_type,
        size: meta.len(),
        content: FileContent::Disk(path),
    })
}

/// A drop event can carry several files; only the first one is used.
pub fn first_dropped(files: Vec<CandidateFile>) -> Option<CandidateFile> {
    let count = files.len();
    let first = files.into_iter().next();
    if count > 1 {
        debug!("Drop carried {} files; using the first", count);
    }
    first
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_string()
}
