//! Downloadable artifacts for the held result.
//!
//! An [`Export`] is built entirely from an [`ExtractionResult`] that is
//! already in memory; no network call is involved. [`write_export`] saves
//! it with the same write-to-temp-then-rename dance the rest of the crate
//! uses, so a crash never leaves a half-written file behind.

use crate::error::ScanError;
use crate::model::ExtractionResult;
use crate::pipeline::present;
use std::path::{Path, PathBuf};
use tracing::info;

/// The two export formats offered to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    /// Download file name.
    pub fn file_name(self) -> &'static str {
        match self {
            ExportFormat::Json => "extracted-data.json",
            ExportFormat::Csv => "extracted-data.csv",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Csv => "text/csv",
        }
    }

    fn encode(self, result: &ExtractionResult) -> Vec<u8> {
        match self {
            ExportFormat::Json => present::to_json(result),
            ExportFormat::Csv => present::to_csv(result),
        }
    }
}

/// Encoded bytes ready to be saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    pub format: ExportFormat,
    pub bytes: Vec<u8>,
}

impl Export {
    pub fn new(format: ExportFormat, result: &ExtractionResult) -> Self {
        Self {
            format,
            bytes: format.encode(result),
        }
    }

    pub fn file_name(&self) -> &'static str {
        self.format.file_name()
    }
}

/// Save `export` under its default file name inside `dir`.
pub async fn write_export(export: &Export, dir: impl AsRef<Path>) -> Result<PathBuf, ScanError> {
    let path = dir.as_ref().join(export.file_name());
    write_export_to(export, &path).await?;
    Ok(path)
}

/// Save `export` at exactly `path`, creating parent directories.
pub async fn write_export_to(export: &Export, path: impl AsRef<Path>) -> Result<(), ScanError> {
    let path = path.as_ref();
    let fail = |source: std::io::Error| ScanError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await.map_err(fail)?;
        }
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp_path = PathBuf::from(tmp);

    tokio::fs::write(&tmp_path, &export.bytes).await.map_err(fail)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(fail)?;

    info!("Wrote {} ({} bytes)", path.display(), export.bytes.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ExtractionResult {
        ExtractionResult {
            raw_text: "MOCK INVOICE DATA\nRestaurant ABC".into(),
            vendor: Some("Restaurant ABC".into()),
            date: Some("12/25/2023".into()),
            total_amount: Some(20.24),
            category: Some("Food & Dining".into()),
            confidence: 0.884,
        }
    }

    #[test]
    fn file_names_and_mime_types() {
        assert_eq!(ExportFormat::Json.file_name(), "extracted-data.json");
        assert_eq!(ExportFormat::Csv.file_name(), "extracted-data.csv");
        assert_eq!(ExportFormat::Csv.mime_type(), "text/csv");
    }

    #[test]
    fn export_bytes_match_presenter() {
        let r = sample();
        assert_eq!(Export::new(ExportFormat::Json, &r).bytes, present::to_json(&r));
        assert_eq!(Export::new(ExportFormat::Csv, &r).bytes, present::to_csv(&r));
    }

    #[tokio::test]
    async fn writes_into_directory() {
        let dir = tempfile::tempdir().unwrap();
        let export = Export::new(ExportFormat::Csv, &sample());

        let path = write_export(&export, dir.path().join("nested")).await.unwrap();
        assert_eq!(path.file_name().unwrap(), "extracted-data.csv");

        let written = std::fs::read(&path).unwrap();
        assert_eq!(written, export.bytes);
        assert!(!dir.path().join("nested/extracted-data.csv.tmp").exists());
    }

    #[tokio::test]
    async fn overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        std::fs::write(&path, b"old").unwrap();

        let export = Export::new(ExportFormat::Json, &sample());
        write_export_to(&export, &path).await.unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("\"vendor\": \"Restaurant ABC\""));
    }
}
