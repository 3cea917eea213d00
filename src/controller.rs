//! The upload workflow state machine.
//!
//! ```text
//! Idle ──select──▶ Validating ──rejected──▶ Idle
//!                      │
//!                      └──accepted──▶ Submitting ──ok───▶ Succeeded
//!                                         │
//!                                         └──────err──▶ Failed
//!
//! Succeeded | Failed | Submitting ──reset──▶ Idle
//! Succeeded | Failed ──select──▶ Validating (the old payload is dropped)
//! ```
//!
//! The controller never blocks. [`UploadController::select`] validates and,
//! for an accepted file, hands back a [`Submission`] carrying a fresh
//! [`RequestId`] and the file itself; the caller runs the request however it
//! likes and reports back through [`UploadController::resolve`]. Outcomes
//! whose id is no longer the active one (the user reset, or moved on) are
//! discarded, so a late response can never overwrite newer state.
//!
//! [`UploadController::run`] strings the three steps together for callers
//! that simply await the request.

use crate::config::ScanConfig;
use crate::error::{Rejection, ScanError};
use crate::export::{Export, ExportFormat};
use crate::model::{CandidateFile, ExtractionResult, FileInfo};
use crate::observer::SharedObserver;
use crate::pipeline::client::ExtractionClient;
use crate::pipeline::input::SelectionSource;
use crate::pipeline::present::{self, ViewData};
use crate::pipeline::validate::{self, ValidationOutcome};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, error, info, warn};

/// Identifies one submission. Strictly increasing per controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The single source of truth for what the user sees.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowState {
    Idle,
    /// Transient: a selection is being checked.
    Validating,
    /// A request is outstanding for `file`.
    Submitting { id: RequestId, file: FileInfo },
    Succeeded(ExtractionResult),
    Failed(String),
}

/// Payload-free discriminant of [`WorkflowState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StateKind {
    Idle,
    Validating,
    Submitting,
    Succeeded,
    Failed,
}

impl WorkflowState {
    pub fn kind(&self) -> StateKind {
        match self {
            WorkflowState::Idle => StateKind::Idle,
            WorkflowState::Validating => StateKind::Validating,
            WorkflowState::Submitting { .. } => StateKind::Submitting,
            WorkflowState::Succeeded(_) => StateKind::Succeeded,
            WorkflowState::Failed(_) => StateKind::Failed,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkflowState::Succeeded(_) | WorkflowState::Failed(_))
    }
}

/// What happened to a selection.
#[derive(Debug)]
pub enum Selection {
    /// The validator refused the file. The workflow is `Idle`.
    Rejected(Rejection),
    /// The workflow is `Submitting`; send `file` and report back with `id`.
    Submitted(Submission),
}

/// An accepted file on its way to the service.
///
/// The submission owns the file content; it is dropped once the request
/// completes.
#[derive(Debug)]
pub struct Submission {
    pub id: RequestId,
    pub file: CandidateFile,
}

/// Whether [`UploadController::resolve`] changed the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Applied,
    /// The outcome belonged to an abandoned request and was dropped.
    Stale,
}

/// Owns the workflow state for one session.
pub struct UploadController {
    state: WorkflowState,
    last_id: u64,
    notice: Option<Rejection>,
    observer: Option<SharedObserver>,
}

impl fmt::Debug for UploadController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadController")
            .field("state", &self.state)
            .field("last_id", &self.last_id)
            .field("notice", &self.notice)
            .finish()
    }
}

impl Default for UploadController {
    fn default() -> Self {
        Self::new()
    }
}

impl UploadController {
    pub fn new() -> Self {
        Self {
            state: WorkflowState::Idle,
            last_id: 0,
            notice: None,
            observer: None,
        }
    }

    /// A controller that reports to the observer configured in `config`.
    pub fn with_config(config: &ScanConfig) -> Self {
        Self {
            observer: config.observer.clone(),
            ..Self::new()
        }
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    /// The id of the outstanding request, if any.
    pub fn active_request(&self) -> Option<RequestId> {
        match &self.state {
            WorkflowState::Submitting { id, .. } => Some(*id),
            _ => None,
        }
    }

    /// True while a request is outstanding; selection input should be disabled.
    pub fn is_busy(&self) -> bool {
        self.active_request().is_some()
    }

    /// The last validation rejection, kept until the next selection or reset.
    pub fn notice(&self) -> Option<&Rejection> {
        self.notice.as_ref()
    }

    /// The held result, only while `Succeeded`.
    pub fn result(&self) -> Option<&ExtractionResult> {
        match &self.state {
            WorkflowState::Succeeded(r) => Some(r),
            _ => None,
        }
    }

    /// View data for the held result.
    pub fn view(&self) -> Option<ViewData> {
        self.result().map(present::present)
    }

    /// Export the held result. Fails with [`ScanError::NoResult`] unless `Succeeded`.
    pub fn export(&self, format: ExportFormat) -> Result<Export, ScanError> {
        self.result()
            .map(|r| Export::new(format, r))
            .ok_or(ScanError::NoResult)
    }

    /// Handle a file selection.
    ///
    /// Any previous result or error is discarded before validation, so no
    /// stale payload is visible alongside a new request. While a request is
    /// outstanding this returns [`ScanError::RequestInFlight`] and changes
    /// nothing.
    pub fn select(
        &mut self,
        file: CandidateFile,
        source: SelectionSource,
    ) -> Result<Selection, ScanError> {
        if let Some(active) = self.active_request() {
            warn!("Ignoring selection of {}: request {} in flight", file.name, active);
            return Err(ScanError::RequestInFlight { active: active.0 });
        }

        debug!("Selected {} via {}", file.name, source);
        self.notice = None;
        self.transition(WorkflowState::Validating);

        match validate::validate(file) {
            ValidationOutcome::Rejected(rejection) => {
                info!("Rejected selection: {}", rejection);
                self.transition(WorkflowState::Idle);
                if let Some(ref o) = self.observer {
                    o.on_rejected(&rejection);
                }
                self.notice = Some(rejection.clone());
                Ok(Selection::Rejected(rejection))
            }
            ValidationOutcome::Accepted(file) => {
                self.last_id += 1;
                let id = RequestId(self.last_id);
                info!("Submitting {} as request {}", file.name, id);
                self.transition(WorkflowState::Submitting {
                    id,
                    file: file.info(),
                });
                Ok(Selection::Submitted(Submission { id, file }))
            }
        }
    }

    /// Apply the outcome of request `id`.
    ///
    /// Only the active request may move the workflow; anything else is
    /// reported as [`Resolution::Stale`] and ignored.
    pub fn resolve(
        &mut self,
        id: RequestId,
        outcome: Result<ExtractionResult, ScanError>,
    ) -> Resolution {
        if self.active_request() != Some(id) {
            warn!("Discarding response for abandoned request {}", id);
            if let Some(ref o) = self.observer {
                o.on_stale_response(id);
            }
            return Resolution::Stale;
        }

        let next = match outcome {
            Ok(result) => {
                info!(
                    "Request {} succeeded (confidence {:.3})",
                    id, result.confidence
                );
                WorkflowState::Succeeded(result)
            }
            Err(e) => {
                if e.is_service_failure() {
                    warn!("Request {} failed at the service: {}", id, e);
                } else {
                    error!("Request {} failed before upload: {}", id, e);
                }
                WorkflowState::Failed(e.failure_message())
            }
        };
        self.transition(next);
        Resolution::Applied
    }

    /// Return to `Idle`, dropping any result, error or outstanding request.
    pub fn reset(&mut self) {
        self.notice = None;
        if self.state == WorkflowState::Idle {
            return;
        }
        if let Some(active) = self.active_request() {
            debug!("Reset abandons request {}", active);
        }
        self.transition(WorkflowState::Idle);
    }

    /// Select `file`, await `client`, and resolve.
    ///
    /// A rejected selection is returned as `Err(ScanError::Rejected)` with
    /// the workflow `Idle`. Service failures are not errors here: they land
    /// in `Failed` and the final state is returned.
    pub async fn run<C>(
        &mut self,
        client: &C,
        file: CandidateFile,
        source: SelectionSource,
    ) -> Result<&WorkflowState, ScanError>
    where
        C: ExtractionClient + ?Sized,
    {
        match self.select(file, source)? {
            Selection::Rejected(rejection) => Err(ScanError::Rejected(rejection)),
            Selection::Submitted(Submission { id, file }) => {
                let outcome = client.extract(file).await;
                self.resolve(id, outcome);
                Ok(&self.state)
            }
        }
    }

    fn transition(&mut self, next: WorkflowState) {
        let from = self.state.kind();
        let to = next.kind();
        self.state = next;
        debug!("Workflow {:?} → {:?}", from, to);
        if let Some(ref o) = self.observer {
            o.on_transition(from, to);
        }
    }
}
