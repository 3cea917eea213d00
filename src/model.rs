//! Data carried through the upload workflow.
//!
//! A [`CandidateFile`] exists only between selection and the end of one
//! request. An [`ExtractionResult`] is what the service sends back; it is
//! never mutated after it has been decoded.

use crate::error::ScanError;
use crate::pipeline::validate::MAX_FILE_BYTES;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;

/// Where the bytes of a candidate file live.
///
/// Disk-backed content is not read until the request body is built, so a
/// file that fails validation is never loaded into memory.
#[derive(Debug, Clone)]
pub enum FileContent {
    /// Bytes already held in memory.
    Memory(Vec<u8>),
    /// A regular file on disk.
    Disk(PathBuf),
}

/// A user-selected file pending validation or submission.
#[derive(Debug, Clone)]
pub struct CandidateFile {
    /// File name sent with the multipart part (no directory components).
    pub name: String,
    /// Declared media type, e.g. `image/png`.
    pub media_type: String,
    /// Size in bytes as reported at selection time.
    pub size: u64,
    pub content: FileContent,
}

impl CandidateFile {
    /// Build a candidate from in-memory bytes; `size` is the buffer length.
    pub fn from_bytes(
        name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            size: bytes.len() as u64,
            content: FileContent::Memory(bytes),
        }
    }

    /// Metadata snapshot kept in the workflow state while submitting.
    pub fn info(&self) -> FileInfo {
        FileInfo {
            name: self.name.clone(),
            media_type: self.media_type.clone(),
            size: self.size,
        }
    }

    /// Consume the candidate and return its bytes.
    ///
    /// Disk content is read at most one byte past the validated `size`. A
    /// file whose length no longer matches is [`ScanError::FileChanged`], so
    /// the bytes uploaded are always the bytes that passed validation.
    pub async fn into_bytes(self) -> Result<Vec<u8>, ScanError> {
        let expected = self.size;
        let path = match self.content {
            FileContent::Memory(bytes) => return Ok(bytes),
            FileContent::Disk(path) => path,
        };

        let read = read_bounded(&path, expected).await;
        let bytes = read.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ScanError::FileNotFound { path: path.clone() },
            std::io::ErrorKind::PermissionDenied => ScanError::PermissionDenied {
                path: path.clone(),
            },
            _ => ScanError::Internal(format!("Failed to read '{}': {}", path.display(), e)),
        })?;

        let actual = bytes.len() as u64;
        if actual != expected {
            return Err(ScanError::FileChanged {
                path,
                expected,
                actual,
            });
        }
        Ok(bytes)
    }
}

async fn read_bounded(path: &Path, limit: u64) -> std::io::Result<Vec<u8>> {
    let file = tokio::fs::File::open(path).await?;
    let mut bytes = Vec::with_capacity(limit.min(MAX_FILE_BYTES) as usize);
    file.take(limit.saturating_add(1))
        .read_to_end(&mut bytes)
        .await?;
    Ok(bytes)
}

/// Name, media type and size of the file being submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    pub name: String,
    pub media_type: String,
    pub size: u64,
}

/// Structured fields returned by the extraction service.
///
/// Field order here is the field order of the JSON export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Full OCR text of the document.
    pub raw_text: String,
    #[serde(default)]
    pub vendor: Option<String>,
    /// Opaque label; the service does not commit to a date format.
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub total_amount: Option<f64>,
    #[serde(default)]
    pub category: Option<String>,
    /// Extraction certainty in `[0, 1]`.
    pub confidence: f64,
}

impl ExtractionResult {
    /// Decode a success body, enforcing the numeric ranges serde cannot.
    pub fn from_json(body: &[u8]) -> Result<Self, ScanError> {
        let result: ExtractionResult =
            serde_json::from_slice(body).map_err(|e| ScanError::MalformedResponse {
                reason: e.to_string(),
            })?;
        result.check()?;
        Ok(result)
    }

    fn check(&self) -> Result<(), ScanError> {
        if !self.confidence.is_finite() || !(0.0..=1.0).contains(&self.confidence) {
            return Err(ScanError::MalformedResponse {
                reason: format!("confidence {} is outside [0, 1]", self.confidence),
            });
        }
        if let Some(total) = self.total_amount {
            if !total.is_finite() || total < 0.0 {
                return Err(ScanError::MalformedResponse {
                    reason: format!("total_amount {} is negative", total),
                });
            }
        }
        Ok(())
    }

    pub fn vendor(&self) -> Option<&str> {
        non_blank(self.vendor.as_deref())
    }

    pub fn date(&self) -> Option<&str> {
        non_blank(self.date.as_deref())
    }

    pub fn category(&self) -> Option<&str> {
        non_blank(self.category.as_deref())
    }
}

// Blank strings from the service mean "not detected".
fn non_blank(s: Option<&str>) -> Option<&str> {
    s.filter(|v| !v.trim().is_empty())
}
