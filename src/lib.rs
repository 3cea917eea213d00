//! # docscan
//!
//! Send an invoice or receipt (JPEG, PNG or PDF) to a document extraction
//! service and get back structured fields: vendor, date, total, category and
//! a confidence score, plus JSON and CSV exports of the result.
//!
//! ## Workflow
//!
//! ```text
//! selection
//!  │
//!  ├─ 1. Input     picked or dropped file → CandidateFile
//!  ├─ 2. Validate  image/jpeg, image/png, application/pdf; ≤ 10 MiB
//!  ├─ 3. Submit    one multipart POST, tagged with a RequestId
//!  ├─ 4. Resolve   Succeeded(result) | Failed(message); stale ids dropped
//!  └─ 5. Present   view data, extracted-data.json, extracted-data.csv
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docscan::{
//!     input, ExportFormat, HttpExtractionClient, ScanConfig, SelectionSource, UploadController,
//!     WorkflowState,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ScanConfig::default();
//!     let client = HttpExtractionClient::new(&config)?;
//!     let mut workflow = UploadController::with_config(&config);
//!
//!     let file = input::resolve_path("receipt.png", None)?;
//!     let state = workflow.run(&client, file, SelectionSource::FilePicker).await?.clone();
//!     match state {
//!         WorkflowState::Succeeded(result) => {
//!             let view = docscan::present(&result);
//!             println!("{} — {} ({})", view.vendor, view.total_amount, view.confidence);
//!             let csv = workflow.export(ExportFormat::Csv)?;
//!             std::fs::write(csv.file_name(), &csv.bytes)?;
//!         }
//!         WorkflowState::Failed(message) => eprintln!("{message}"),
//!         _ => {}
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `docscan` CLI (clap, anyhow, tracing-subscriber, indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod controller;
pub mod error;
pub mod export;
pub mod model;
pub mod observer;
pub mod pipeline;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ScanConfig, ScanConfigBuilder, DEFAULT_ENDPOINT};
pub use controller::{
    RequestId, Resolution, Selection, StateKind, Submission, UploadController, WorkflowState,
};
pub use error::{Rejection, ScanError, GENERIC_FAILURE};
pub use export::{write_export, write_export_to, Export, ExportFormat};
pub use model::{CandidateFile, ExtractionResult, FileContent, FileInfo};
pub use observer::{NoopObserver, SharedObserver, WorkflowObserver};
pub use pipeline::client::{ExtractionClient, HealthStatus, HttpExtractionClient};
pub use pipeline::input::{self, SelectionSource};
pub use pipeline::present::{present, to_csv, to_json, ConfidenceTier, ViewData};
pub use pipeline::validate::{validate, ValidationOutcome, ACCEPTED_MEDIA_TYPES, MAX_FILE_BYTES};
