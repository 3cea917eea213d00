//! Observer trait for workflow events.
//!
//! Inject an [`Arc<dyn WorkflowObserver>`] via
//! [`crate::config::ScanConfigBuilder::observer`] to be told about every
//! state transition. The CLI uses this to drive its spinner; a GUI shell
//! would re-render from it.
//!
//! # Example
//!
//! ```rust
//! use docscan::{ScanConfig, StateKind, WorkflowObserver};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountSubmissions(AtomicUsize);
//!
//! impl WorkflowObserver for CountSubmissions {
//!     fn on_transition(&self, _from: StateKind, to: StateKind) {
//!         if to == StateKind::Submitting {
//!             self.0.fetch_add(1, Ordering::SeqCst);
//!         }
//!     }
//! }
//!
//! let config = ScanConfig::builder()
//!     .observer(Arc::new(CountSubmissions(AtomicUsize::new(0))))
//!     .build()
//!     .unwrap();
//! ```

use crate::controller::{RequestId, StateKind};
use crate::error::Rejection;
use std::sync::Arc;

/// Called by [`crate::controller::UploadController`] as the workflow moves.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait WorkflowObserver: Send + Sync {
    /// Called after every state change, including the transient pass
    /// through `Validating`.
    fn on_transition(&self, from: StateKind, to: StateKind) {
        let _ = (from, to);
    }

    /// Called when the validator refuses a selection.
    fn on_rejected(&self, rejection: &Rejection) {
        let _ = rejection;
    }

    /// Called when a response arrives for a request that is no longer active.
    fn on_stale_response(&self, id: RequestId) {
        let _ = id;
    }
}

/// A no-op implementation for callers that don't need events.
pub struct NoopObserver;

impl WorkflowObserver for NoopObserver {}

/// Convenience alias matching the type stored in [`crate::config::ScanConfig`].
pub type SharedObserver = Arc<dyn WorkflowObserver>;
