//! Error types for the docscan library.
//!
//! Two distinct types reflect two distinct failure modes:
//!
//! * [`Rejection`] — **Local**: the selected file never leaves the machine
//!   because its declared media type or size is not acceptable. The workflow
//!   stays `Idle` and the caller shows the reason to the user.
//!
//! * [`ScanError`] — **Attempt-terminal**: reading the file, reaching the
//!   extraction service, or decoding its answer failed. Inside the workflow
//!   these are normalised into `Failed(message)` via
//!   [`ScanError::failure_message`]; outside it they are returned as `Err`.

use std::path::PathBuf;
use thiserror::Error;

/// Message used when the service fails without a usable `detail`.
pub const GENERIC_FAILURE: &str = "Failed to process file";

/// Why the validator refused a candidate file.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
#[serde(tag = "reason", rename_all = "kebab-case")]
pub enum Rejection {
    /// Declared media type is not JPEG, PNG or PDF.
    #[error("Please upload a valid image (JPG, PNG) or PDF file")]
    UnsupportedType { media_type: String },

    /// File is larger than the upload limit.
    #[error("File size must be less than 10MB")]
    TooLarge { size: u64, limit: u64 },
}

/// All errors returned by the docscan library.
#[derive(Debug, Error)]
pub enum ScanError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Selected file was not found at the given path.
    #[error("File not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The path exists but is a directory or other non-regular file.
    #[error("'{path}' is not a regular file")]
    NotAFile { path: PathBuf },

    /// The file's length on disk no longer matches the size that was
    /// validated at selection time.
    #[error("'{path}' changed after selection: {expected} bytes validated, {actual} now")]
    FileChanged {
        path: PathBuf,
        expected: u64,
        actual: u64,
    },

    /// The validator refused the file; no request was issued.
    #[error(transparent)]
    Rejected(#[from] Rejection),

    // ── Workflow errors ───────────────────────────────────────────────────
    /// A new selection arrived while a request is still outstanding.
    #[error("Request #{active} is still in flight; wait for it or reset first")]
    RequestInFlight { active: u64 },

    /// Export was requested but the workflow holds no result.
    #[error("No extraction result is available to export")]
    NoResult,

    // ── Service errors ────────────────────────────────────────────────────
    /// The request never produced an HTTP response.
    #[error("Could not reach the extraction service at '{url}': {reason}")]
    Transport { url: String, reason: String },

    /// The transport gave up waiting for the service.
    #[error("The extraction service at '{url}' timed out")]
    Timeout { url: String },

    /// The service answered with a non-success status.
    ///
    /// `message` is the service's `detail` string when it sent one, otherwise
    /// [`GENERIC_FAILURE`].
    #[error("{message}")]
    Service { status: u16, message: String },

    /// A success status whose body is not an extraction result.
    #[error("Malformed response from the extraction service: {reason}")]
    MalformedResponse { reason: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an export file.
    #[error("Failed to write export file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ScanError {
    /// The text stored in `WorkflowState::Failed` for this error.
    ///
    /// Service errors surface their message verbatim so a `detail` string
    /// reaches the user unchanged.
    pub fn failure_message(&self) -> String {
        match self {
            ScanError::Service { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// True for errors produced while talking to the extraction service.
    pub fn is_service_failure(&self) -> bool {
        matches!(
            self,
            ScanError::Transport { .. }
                | ScanError::Timeout { .. }
                | ScanError::Service { .. }
                | ScanError::MalformedResponse { .. }
        )
    }
}
