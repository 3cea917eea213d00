//! File validation: decide whether a candidate may be uploaded.
//!
//! Only the declared media type and the byte size are inspected; content is
//! never parsed here. The check is pure so it can run before any request is
//! built, and both the file-picker and drag-and-drop paths share it.

use crate::error::Rejection;
use crate::model::CandidateFile;

/// Upload size limit, inclusive: 10 MiB.
pub const MAX_FILE_BYTES: u64 = 10 * 1024 * 1024;

/// Media types the extraction service accepts.
///
/// `image/jpg` is not registered but some platforms report it for `.jpg`.
pub const ACCEPTED_MEDIA_TYPES: [&str; 4] =
    ["image/jpeg", "image/jpg", "image/png", "application/pdf"];

/// Result of validating one candidate file.
#[derive(Debug)]
pub enum ValidationOutcome {
    Accepted(CandidateFile),
    Rejected(Rejection),
}

/// Validate a candidate file.
///
/// The type check runs first, so an oversized file of the wrong type is
/// reported as an unsupported type.
pub fn validate(file: CandidateFile) -> ValidationOutcome {
    match check(&file.media_type, file.size) {
        Ok(()) => ValidationOutcome::Accepted(file),
        Err(rejection) => ValidationOutcome::Rejected(rejection),
    }
}

/// The same decision as [`validate`], on metadata alone.
pub fn check(media_type: &str, size: u64) -> Result<(), Rejection> {
    if !is_accepted_type(media_type) {
        return Err(Rejection::UnsupportedType {
            media_type: media_type.to_string(),
        });
    }
    if size > MAX_FILE_BYTES {
        return Err(Rejection::TooLarge {
            size,
            limit: MAX_FILE_BYTES,
        });
    }
    Ok(())
}

/// Exact match against [`ACCEPTED_MEDIA_TYPES`].
pub fn is_accepted_type(media_type: &str) -> bool {
    ACCEPTED_MEDIA_TYPES.contains(&media_type)
}
