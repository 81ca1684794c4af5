//! One-at-a-time coordinator for asynchronous document transforms.
//!
//! # Responsibility
//! - Gate transforms with an explicit `Idle -> Pending -> Idle` state machine.
//! - Snapshot the baseline at submission and read the live document at
//!   completion, then install the reconciled result.
//!
//! # Invariants
//! - At most one `TransformRequest` is pending; a second `submit` is rejected
//!   synchronously with `AlreadyInProgress` and never queued.
//! - A failed transform leaves the document untouched.
//! - Only `Content` transforms may replace the body; summaries are inserted
//!   ahead of it.
//! - The coordinator returns to `Idle` whether the pending action succeeds,
//!   fails, or is dropped unresolved.
//! - Document borrows are never held across the transform await point.
//!
//! # See also
//! - `editor::reconcile::merge`

use crate::editor::reconcile::{merge, MergeResult};
use crate::editor::transform::{ContentTransformer, TransformError, TransformKind, TransformTarget};
use crate::logging::sanitize_message;
use crate::model::document::Document;
use log::{info, warn};
use std::cell::RefCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;
use std::time::Instant;
use uuid::Uuid;

const MAX_LOGGED_REASON_CHARS: usize = 160;

/// Live document handle shared between the editor and the coordinator.
///
/// Single-threaded by construction (`Rc<RefCell<_>>`).
#[derive(Debug, Clone, Default)]
pub struct SharedDocument {
    inner: Rc<RefCell<Document>>,
}

impl SharedDocument {
    pub fn new(document: Document) -> Self {
        Self {
            inner: Rc::new(RefCell::new(document)),
        }
    }

    /// Copy of the current document.
    pub fn snapshot(&self) -> Document {
        self.inner.borrow().clone()
    }

    pub fn content(&self) -> String {
        self.inner.borrow().content.clone()
    }

    pub fn title(&self) -> String {
        self.inner.borrow().title.clone()
    }

    /// Applies one local edit.
    pub fn edit<R>(&self, apply: impl FnOnce(&mut Document) -> R) -> R {
        apply(&mut self.inner.borrow_mut())
    }

    pub fn set_content(&self, content: impl Into<String>) {
        self.edit(|document| document.content = content.into());
    }

    pub fn set_title(&self, title: impl Into<String>) {
        self.edit(|document| document.title = title.into());
    }
}

/// Immutable submission snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformRequest {
    pub id: Uuid,
    pub kind: TransformKind,
    pub baseline_content: String,
    pub baseline_title: String,
    pub submitted_at: Instant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoordinatorState {
    Idle,
    Pending(TransformRequest),
}

/// What a resolved transform did to the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Content replaced by the reconciled result.
    ContentMerged {
        request_id: Uuid,
        merge: MergeResult,
    },
    /// Title suggestion. `applied` is `false` when the user retitled the
    /// document meanwhile; their title is kept and the suggestion returned.
    TitleSuggested {
        request_id: Uuid,
        suggestion: String,
        applied: bool,
    },
    /// Summary inserted ahead of the live body, which is kept verbatim.
    SummaryInserted { request_id: Uuid, summary: String },
}

impl ActionOutcome {
    pub fn request_id(&self) -> Uuid {
        match self {
            Self::ContentMerged { request_id, .. }
            | Self::TitleSuggested { request_id, .. }
            | Self::SummaryInserted { request_id, .. } => *request_id,
        }
    }

    /// `true` when the user must review the result manually.
    pub fn is_degraded(&self) -> bool {
        match self {
            Self::ContentMerged { merge, .. } => merge.degraded,
            Self::TitleSuggested { applied, .. } => !applied,
            Self::SummaryInserted { .. } => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoordinatorError {
    AlreadyInProgress {
        pending: TransformKind,
    },
    TransformFailed {
        kind: TransformKind,
        cause: TransformError,
    },
}

impl Display for CoordinatorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyInProgress { pending } => {
                write!(f, "a `{pending}` transform is already in progress")
            }
            Self::TransformFailed { kind, cause } => write!(f, "`{kind}` {cause}"),
        }
    }
}

impl Error for CoordinatorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::TransformFailed { cause, .. } => Some(cause),
            Self::AlreadyInProgress { .. } => None,
        }
    }
}

/// Drives transforms against one editor document.
pub struct ActionCoordinator<T: ContentTransformer> {
    transformer: T,
    state: RefCell<CoordinatorState>,
}

impl<T: ContentTransformer> ActionCoordinator<T> {
    pub fn new(transformer: T) -> Self {
        Self {
            transformer,
            state: RefCell::new(CoordinatorState::Idle),
        }
    }

    pub fn state(&self) -> CoordinatorState {
        self.state.borrow().clone()
    }

    pub fn is_pending(&self) -> bool {
        matches!(*self.state.borrow(), CoordinatorState::Pending(_))
    }

    /// Captures the baseline and marks the coordinator pending.
    ///
    /// The transform starts when the returned handle is resolved.
    ///
    /// # Errors
    /// - `AlreadyInProgress` while another request is pending.
    pub fn submit<'a>(
        &'a self,
        kind: TransformKind,
        document: &SharedDocument,
    ) -> Result<PendingAction<'a, T>, CoordinatorError> {
        let mut state = self.state.borrow_mut();
        if let CoordinatorState::Pending(pending) = &*state {
            info!(
                "event=transform_submit module=editor status=rejected kind={} pending_kind={} pending_id={}",
                kind, pending.kind, pending.id
            );
            return Err(CoordinatorError::AlreadyInProgress {
                pending: pending.kind,
            });
        }

        let baseline = document.snapshot();
        let request = TransformRequest {
            id: Uuid::new_v4(),
            kind,
            baseline_content: baseline.content,
            baseline_title: baseline.title,
            submitted_at: Instant::now(),
        };
        *state = CoordinatorState::Pending(request.clone());
        info!(
            "event=transform_submit module=editor status=ok kind={} request_id={} baseline_len={}",
            kind,
            request.id,
            request.baseline_content.len()
        );

        Ok(PendingAction {
            coordinator: self,
            request,
            document: document.clone(),
        })
    }

    /// Submits and resolves in one call.
    pub async fn run(
        &self,
        kind: TransformKind,
        document: &SharedDocument,
    ) -> Result<ActionOutcome, CoordinatorError> {
        self.submit(kind, document)?.resolve().await
    }

    fn release(&self, request_id: Uuid) {
        let mut state = self.state.borrow_mut();
        if matches!(&*state, CoordinatorState::Pending(pending) if pending.id == request_id) {
            *state = CoordinatorState::Idle;
        }
    }
}

/// The single in-flight transform.
///
/// Dropping it without resolving returns the coordinator to `Idle`.
pub struct PendingAction<'a, T: ContentTransformer> {
    coordinator: &'a ActionCoordinator<T>,
    request: TransformRequest,
    document: SharedDocument,
}

impl<T: ContentTransformer> PendingAction<'_, T> {
    pub fn request(&self) -> &TransformRequest {
        &self.request
    }

    /// Awaits the transform and installs its reconciled result.
    pub async fn resolve(self) -> Result<ActionOutcome, CoordinatorError> {
        let kind = self.request.kind;
        let result = self
            .coordinator
            .transformer
            .transform(kind, self.request.baseline_content.as_str())
            .await;
        let elapsed_ms = self.request.submitted_at.elapsed().as_millis();

        match result {
            Ok(output) => {
                let outcome = self.install(output);
                info!(
                    "event=transform_complete module=editor status=ok kind={} request_id={} degraded={} duration_ms={}",
                    kind,
                    self.request.id,
                    outcome.is_degraded(),
                    elapsed_ms
                );
                Ok(outcome)
            }
            Err(cause) => {
                warn!(
                    "event=transform_complete module=editor status=error kind={} request_id={} duration_ms={} reason={}",
                    kind,
                    self.request.id,
                    elapsed_ms,
                    sanitize_message(cause.reason.as_str(), MAX_LOGGED_REASON_CHARS)
                );
                Err(CoordinatorError::TransformFailed { kind, cause })
            }
        }
    }

    // Reads the live document and writes the result in one borrow.
    fn install(&self, output: String) -> ActionOutcome {
        let request_id = self.request.id;
        match self.request.kind.target() {
            TransformTarget::Content => self.document.edit(|live| {
                let merge = merge(
                    self.request.baseline_content.as_str(),
                    output.as_str(),
                    live.content.as_str(),
                );
                live.content = merge.content.clone();
                ActionOutcome::ContentMerged { request_id, merge }
            }),
            TransformTarget::Title => self.document.edit(|live| {
                let applied = live.title == self.request.baseline_title;
                if applied {
                    live.title = output.clone();
                }
                ActionOutcome::TitleSuggested {
                    request_id,
                    suggestion: output,
                    applied,
                }
            }),
            TransformTarget::Prepend => self.document.edit(|live| {
                live.content.insert_str(0, output.as_str());
                ActionOutcome::SummaryInserted {
                    request_id,
                    summary: output,
                }
            }),
        }
    }
}

impl<T: ContentTransformer> Drop for PendingAction<'_, T> {
    fn drop(&mut self) {
        self.coordinator.release(self.request.id);
    }
}
