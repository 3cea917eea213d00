//! Pipeline stages for one upload.
//!
//! Each submodule implements exactly one step. The state machine in
//! [`crate::controller`] is the only place that sequences them.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ validate ──▶ client ──▶ present
//! (path)    (type/size)  (HTTP)     (view / JSON / CSV)
//! ```
//!
//! 1. [`input`]    — turn a picked or dropped file into a `CandidateFile`
//! 2. [`validate`] — pure accept/reject on media type and size
//! 3. [`client`]   — multipart upload and response decoding; the only stage
//!    with network I/O
//! 4. [`present`]  — fallback labels, formatting, confidence tiers, exports

pub mod client;
pub mod input;
pub mod present;
pub mod validate;
