//! Create-tag form controller.
//!
//! `CreateTagForm` is an explicit state object independent of any UI binding.
//! A host renders `view()`, forwards edits through `set_title`/`blur`, and
//! wires `submit`/`cancel` to its buttons. Outcomes are reported both as the
//! return value of `submit` and through `FormHooks`.

use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;
use tracing::{debug, info, warn};

use crate::Error;
use super::client::TagService;
use super::validation::{Field, FieldError};
use super::{TagDraft, TagRecord};

pub const SLUG_TAKEN_MESSAGE: &str = "A tag with this slug already exists";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FormState {
    Idle,
    Validating,
    Submitting,
    Succeeded,
    Failed,
    Closed,
}

impl FormState {
    pub fn is_settled(&self) -> bool {
        matches!(self, FormState::Succeeded | FormState::Failed)
    }
}

/// Callbacks supplied by the container hosting the form.
pub trait FormHooks: Send + Sync {
    /// The tag was stored. Hosts usually close their dialog here.
    fn created(&self, _record: &TagRecord) {}

    fn failed(&self, _error: &Error) {}

    /// The user dismissed the form without saving.
    fn cancelled(&self) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoHooks;

impl FormHooks for NoHooks {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Created(TagRecord),
    /// Local validation failed; nothing was sent.
    Invalid(FieldError),
    /// The server refused the tag for a field-level reason.
    Rejected(FieldError),
    Failed(String),
    /// A submission is already in flight; nothing was sent.
    Busy,
    /// The form was closed before the request settled.
    Cancelled,
}

/// Snapshot of everything a host needs to render the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormView {
    pub title: String,
    pub slug: String,
    pub title_error: Option<String>,
    pub slug_error: Option<String>,
    pub submit_error: Option<String>,
    pub in_flight: bool,
    pub state: FormState,
    pub can_submit: bool,
}

#[derive(Debug)]
struct FormInner {
    draft: TagDraft,
    title_error: Option<FieldError>,
    slug_error: Option<FieldError>,
    submit_error: Option<String>,
    in_flight: bool,
    // Once a submit was attempted, edits revalidate immediately.
    submitted: bool,
    state: FormState,
    // Bumped on close/reset; a response from an older generation is dropped.
    generation: u64,
}

impl FormInner {
    fn fresh(generation: u64) -> Self {
        Self {
            draft: TagDraft::default(),
            title_error: None,
            slug_error: None,
            submit_error: None,
            in_flight: false,
            submitted: false,
            state: FormState::Idle,
            generation,
        }
    }
}

#[derive(Clone)]
pub struct CreateTagForm {
    inner: Arc<Mutex<FormInner>>,
    service: Arc<dyn TagService>,
    hooks: Arc<dyn FormHooks>,
    abort: Arc<Notify>,
}

impl std::fmt::Debug for CreateTagForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateTagForm")
            .field("inner", &self.inner)
            .field("service", &self.service)
            .finish_non_exhaustive()
    }
}

impl CreateTagForm {
    pub fn new(service: Arc<dyn TagService>, hooks: Arc<dyn FormHooks>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(FormInner::fresh(0))),
            service,
            hooks,
            abort: Arc::new(Notify::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FormInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn title(&self) -> String {
        self.lock().draft.title.clone()
    }

    pub fn slug(&self) -> String {
        self.lock().draft.slug()
    }

    pub fn state(&self) -> FormState {
        self.lock().state
    }

    pub fn is_in_flight(&self) -> bool {
        self.lock().in_flight
    }

    pub fn view(&self) -> FormView {
        let inner = self.lock();
        FormView {
            title: inner.draft.title.clone(),
            slug: inner.draft.slug(),
            title_error: inner.title_error.as_ref().map(|e| e.message.clone()),
            slug_error: inner.slug_error.as_ref().map(|e| e.message.clone()),
            submit_error: inner.submit_error.clone(),
            in_flight: inner.in_flight,
            state: inner.state,
            can_submit: !inner.in_flight && inner.state != FormState::Closed,
        }
    }

    /// Replace the title. Allowed while a submission is pending.
    pub fn set_title(&self, title: impl Into<String>) {
        let mut inner = self.lock();
        if inner.state == FormState::Closed {
            return;
        }

        inner.draft.title = title.into();
        inner.slug_error = None;
        if !inner.in_flight {
            inner.submit_error = None;
        }
        if inner.submitted {
            inner.title_error = inner.draft.validate().err();
        }
        if inner.state.is_settled() {
            inner.state = FormState::Idle;
        }
    }

    /// Validate the title as the field loses focus.
    pub fn blur(&self) -> Option<FieldError> {
        let mut inner = self.lock();
        if inner.state == FormState::Closed {
            return None;
        }
        inner.title_error = inner.draft.validate().err();
        inner.title_error.clone()
    }

    /// Validate and send the draft. Issues at most one request per call and
    /// none while another submission is pending.
    pub async fn submit(&self) -> SubmitOutcome {
        let (tag, generation, aborted) = {
            let mut inner = self.lock();
            match inner.state {
                FormState::Closed => return SubmitOutcome::Cancelled,
                _ if inner.in_flight => {
                    debug!("Submit ignored, request already in flight");
                    return SubmitOutcome::Busy;
                }
                _ => {}
            }

            inner.submitted = true;
            inner.state = FormState::Validating;
            inner.submit_error = None;
            inner.slug_error = None;

            if let Err(err) = inner.draft.validate() {
                debug!("Tag draft rejected: {}", err);
                inner.title_error = Some(err.clone());
                inner.state = FormState::Idle;
                return SubmitOutcome::Invalid(err);
            }

            inner.title_error = None;
            inner.state = FormState::Submitting;
            inner.in_flight = true;

            // Registered under the lock: any later close or reset wakes it.
            let aborted = self.abort.notified();
            (inner.draft.to_new_tag(), inner.generation, aborted)
        };

        info!("Submitting tag '{}' ({})", tag.title, tag.slug);

        let result = tokio::select! {
            result = self.service.create_tag(&tag) => result,
            _ = aborted => Err(Error::Cancelled),
        };

        self.settle(generation, result)
    }

    fn settle(&self, generation: u64, result: crate::Result<TagRecord>) -> SubmitOutcome {
        let mut inner = self.lock();
        if inner.generation != generation || inner.state == FormState::Closed {
            debug!("Dropping response for a closed or reset form");
            return SubmitOutcome::Cancelled;
        }
        inner.in_flight = false;

        match result {
            Ok(record) => {
                inner.state = FormState::Succeeded;
                inner.draft = TagDraft::default();
                inner.submitted = false;
                inner.title_error = None;
                drop(inner);

                self.hooks.created(&record);
                SubmitOutcome::Created(record)
            }
            Err(Error::Cancelled) => {
                inner.state = FormState::Idle;
                SubmitOutcome::Cancelled
            }
            Err(err) if err.is_conflict() => {
                let field_error = FieldError::new(Field::Slug, SLUG_TAKEN_MESSAGE);
                inner.slug_error = Some(field_error.clone());
                inner.state = FormState::Failed;
                drop(inner);

                warn!("Tag rejected: {}", err);
                self.hooks.failed(&err);
                SubmitOutcome::Rejected(field_error)
            }
            Err(err) => {
                let message = err.user_message();
                inner.submit_error = Some(message.clone());
                inner.state = FormState::Failed;
                drop(inner);

                warn!("Tag submission failed: {}", err);
                self.hooks.failed(&err);
                SubmitOutcome::Failed(message)
            }
        }
    }

    /// Close without saving and notify the host.
    pub fn cancel(&self) {
        if self.dispose() {
            self.hooks.cancelled();
        }
    }

    /// Dispose the form without notifying the host. A pending request is
    /// abandoned and its result discarded.
    pub fn close(&self) {
        self.dispose();
    }

    fn dispose(&self) -> bool {
        let mut inner = self.lock();
        if inner.state == FormState::Closed {
            return false;
        }
        if inner.in_flight {
            debug!("Abandoning in-flight tag request");
        }
        let generation = inner.generation + 1;
        *inner = FormInner::fresh(generation);
        inner.state = FormState::Closed;
        drop(inner);

        self.abort.notify_waiters();
        true
    }

    /// Start over with an empty draft, e.g. when the dialog is reopened.
    pub fn reset(&self) {
        let mut inner = self.lock();
        let generation = inner.generation + 1;
        *inner = FormInner::fresh(generation);
        drop(inner);

        self.abort.notify_waiters();
    }
}
