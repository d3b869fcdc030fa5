//! Single-shot classification controller.
//!
//! Unlike the conversation, the draft survives a submission so the user can
//! edit and resubmit the same plot.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use shared::domain::{LifecycleState, Prediction};
use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, info, warn};

use crate::{
    error::{ClientError, ErrorSurface, CLASSIFY_EMPTY_DRAFT},
    lifecycle::{Lifecycle, Rejection, Ticket},
    presets::{DraftStats, ExamplePlot},
    transport::ClassificationTransport,
    Settlement,
};

/// Exactly one of these is visible at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Outcome {
    #[default]
    Empty,
    Result(Prediction),
    Error(String),
}

impl Outcome {
    pub fn prediction(&self) -> Option<&Prediction> {
        match self {
            Self::Result(prediction) => Some(prediction),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct ClassificationStore {
    outcome: Outcome,
    draft: String,
    notice: Option<String>,
}

impl ClassificationStore {
    pub fn set_result(&mut self, label: impl Into<String>) {
        self.outcome = Outcome::Result(Prediction::new(label));
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.outcome = Outcome::Error(message.into());
    }

    pub fn clear(&mut self) {
        self.outcome = Outcome::Empty;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassificationView {
    pub draft: String,
    pub draft_stats: DraftStats,
    pub state: LifecycleState,
    pub outcome: Outcome,
    pub notice: Option<String>,
}

#[derive(Debug, Default)]
struct Session {
    lifecycle: Lifecycle,
    store: ClassificationStore,
}

impl Session {
    fn view(&self) -> ClassificationView {
        ClassificationView {
            draft: self.store.draft.clone(),
            draft_stats: DraftStats::of(&self.store.draft),
            state: self.lifecycle.state(),
            outcome: self.store.outcome.clone(),
            notice: self.store.notice.clone(),
        }
    }
}

struct Shared {
    session: Mutex<Session>,
    views: watch::Sender<ClassificationView>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, session: &Session) {
        self.views.send_replace(session.view());
    }
}

pub struct ClassificationController {
    shared: Arc<Shared>,
    transport: Arc<dyn ClassificationTransport>,
}

impl ClassificationController {
    pub fn new(transport: Arc<dyn ClassificationTransport>) -> Self {
        let (views, _) = watch::channel(ClassificationView::default());
        Self {
            shared: Arc::new(Shared {
                session: Mutex::new(Session::default()),
                views,
            }),
            transport,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ClassificationView> {
        self.shared.views.subscribe()
    }

    pub fn view(&self) -> ClassificationView {
        self.shared.lock().view()
    }

    pub fn set_draft(&self, text: impl Into<String>) {
        let mut session = self.shared.lock();
        session.store.draft = text.into();
        session.store.notice = None;
        self.shared.publish(&session);
    }

    pub fn use_example(&self, example: ExamplePlot) {
        self.set_draft(example.text());
    }

    /// Synchronous half of a submission: clears the previous outcome and
    /// enters `pending` before returning.
    pub fn begin_submit(&self) -> Result<PendingClassification, Rejection> {
        let mut guard = self.shared.lock();
        let session = &mut *guard;
        let ticket = match session.lifecycle.begin(&session.store.draft) {
            Ok(ticket) => ticket,
            Err(Rejection::EmptyDraft) => {
                debug!("classification submission rejected: empty draft");
                session.store.notice = Some(CLASSIFY_EMPTY_DRAFT.to_string());
                self.shared.publish(session);
                return Err(Rejection::EmptyDraft);
            }
            Err(Rejection::InFlight) => {
                debug!("classification submission ignored: request in flight");
                return Err(Rejection::InFlight);
            }
        };

        session.store.clear();
        session.store.notice = None;
        let text = session.store.draft.clone();
        self.shared.publish(session);
        debug!(
            generation = ticket.generation(),
            chars = text.chars().count(),
            "classification request dispatched"
        );

        Ok(PendingClassification {
            shared: Arc::downgrade(&self.shared),
            transport: self.transport.clone(),
            ticket,
            text,
            settled: false,
        })
    }

    pub fn submit(&self) -> Result<JoinHandle<Settlement>, Rejection> {
        let pending = self.begin_submit()?;
        Ok(tokio::spawn(pending.run()))
    }

    pub async fn submit_and_wait(&self) -> Result<Settlement, Rejection> {
        let pending = self.begin_submit()?;
        Ok(pending.run().await)
    }

    /// Clears draft and outcome; an in-flight request is abandoned.
    pub fn reset(&self) {
        let mut session = self.shared.lock();
        session.lifecycle.reset();
        session.store = ClassificationStore::default();
        self.shared.publish(&session);
    }
}

/// Dropping this before [`PendingClassification::run`] completes settles the
/// request as a connection failure.
#[must_use = "a pending classification does nothing until it is run"]
pub struct PendingClassification {
    shared: Weak<Shared>,
    transport: Arc<dyn ClassificationTransport>,
    ticket: Ticket,
    text: String,
    settled: bool,
}

impl PendingClassification {
    pub async fn run(mut self) -> Settlement {
        let outcome = self.transport.predict(&self.text).await;
        self.settled = true;
        settle(&self.shared, self.ticket, outcome)
    }
}

impl Drop for PendingClassification {
    fn drop(&mut self) {
        if !self.settled {
            settle(&self.shared, self.ticket, Err(ClientError::Abandoned));
        }
    }
}

fn settle(shared: &Weak<Shared>, ticket: Ticket, outcome: Result<String, ClientError>) -> Settlement {
    let Some(shared) = shared.upgrade() else {
        debug!(
            generation = ticket.generation(),
            "classification controller dropped; discarding response"
        );
        return Settlement::Stale;
    };
    let mut session = shared.lock();
    if !session.lifecycle.is_current(ticket) {
        debug!(
            generation = ticket.generation(),
            "discarding stale classification response"
        );
        return Settlement::Stale;
    }

    match outcome {
        Ok(label) => {
            info!(generation = ticket.generation(), %label, "classification received");
            session.store.set_result(label);
            session.lifecycle.succeed(ticket);
        }
        Err(err) => {
            warn!(
                generation = ticket.generation(),
                kind = %err.kind(),
                error = %err,
                "classification request failed"
            );
            session
                .store
                .set_error(err.user_message(ErrorSurface::Classification));
            session.lifecycle.fail(ticket);
        }
    }
    shared.publish(&session);
    Settlement::Applied
}

#[cfg(test)]
#[path = "tests/classification_tests.rs"]
mod tests;
