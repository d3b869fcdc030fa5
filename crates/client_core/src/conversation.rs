//! Multi-turn chat controller.
//!
//! User turns are written optimistically when a submission is accepted;
//! assistant turns are written only once the request settles. Failures are
//! ordinary assistant turns carrying the user-facing error text.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use shared::domain::{LifecycleState, Message};
use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, info, warn};

use crate::{
    error::{ClientError, ErrorSurface, CHAT_EMPTY_DRAFT},
    lifecycle::{Lifecycle, Rejection, Ticket},
    presets::QuickQuestion,
    transport::ConversationTransport,
    Settlement,
};

#[derive(Debug, Default)]
pub struct ConversationStore {
    history: Vec<Message>,
    draft: String,
    notice: Option<String>,
}

impl ConversationStore {
    pub fn append_user_turn(&mut self, text: impl Into<String>) {
        self.history.push(Message::user(text));
    }

    pub fn append_assistant_turn(&mut self, text: impl Into<String>) {
        self.history.push(Message::assistant(text));
    }

    pub fn append_error_turn(&mut self, text: impl Into<String>) {
        self.history.push(Message::assistant(text));
    }
}

/// What the renderer sees. `notice` is the inline validation message and is
/// never part of the history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationView {
    pub history: Vec<Message>,
    pub draft: String,
    pub state: LifecycleState,
    pub notice: Option<String>,
}

#[derive(Debug, Default)]
struct Session {
    lifecycle: Lifecycle,
    store: ConversationStore,
}

impl Session {
    fn view(&self) -> ConversationView {
        ConversationView {
            history: self.store.history.clone(),
            draft: self.store.draft.clone(),
            state: self.lifecycle.state(),
            notice: self.store.notice.clone(),
        }
    }
}

struct Shared {
    session: Mutex<Session>,
    views: watch::Sender<ConversationView>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, session: &Session) {
        self.views.send_replace(session.view());
    }
}

pub struct ConversationController {
    shared: Arc<Shared>,
    transport: Arc<dyn ConversationTransport>,
}

impl ConversationController {
    pub fn new(transport: Arc<dyn ConversationTransport>) -> Self {
        let (views, _) = watch::channel(ConversationView::default());
        Self {
            shared: Arc::new(Shared {
                session: Mutex::new(Session::default()),
                views,
            }),
            transport,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ConversationView> {
        self.shared.views.subscribe()
    }

    pub fn view(&self) -> ConversationView {
        self.shared.lock().view()
    }

    pub fn set_draft(&self, text: impl Into<String>) {
        let mut session = self.shared.lock();
        session.store.draft = text.into();
        session.store.notice = None;
        self.shared.publish(&session);
    }

    /// Fills the draft; the user still has to submit it.
    pub fn use_quick_question(&self, question: QuickQuestion) {
        self.set_draft(question.text());
    }

    /// Synchronous half of a submission. On acceptance the lifecycle is
    /// already `pending`, the user turn is in the history and the draft is
    /// cleared before this returns; the network call happens in
    /// [`PendingTurn::run`].
    pub fn begin_submit(&self) -> Result<PendingTurn, Rejection> {
        let mut guard = self.shared.lock();
        let session = &mut *guard;
        let ticket = match session.lifecycle.begin(&session.store.draft) {
            Ok(ticket) => ticket,
            Err(Rejection::EmptyDraft) => {
                debug!("conversation submission rejected: empty draft");
                session.store.notice = Some(CHAT_EMPTY_DRAFT.to_string());
                self.shared.publish(session);
                return Err(Rejection::EmptyDraft);
            }
            Err(Rejection::InFlight) => {
                debug!("conversation submission ignored: request in flight");
                return Err(Rejection::InFlight);
            }
        };

        let message = std::mem::take(&mut session.store.draft);
        session.store.notice = None;
        session.store.append_user_turn(message.clone());
        self.shared.publish(session);
        debug!(generation = ticket.generation(), "conversation request dispatched");

        Ok(PendingTurn {
            shared: Arc::downgrade(&self.shared),
            transport: self.transport.clone(),
            ticket,
            message,
            settled: false,
        })
    }

    /// Accepts the submission and drives it on the current tokio runtime.
    pub fn submit(&self) -> Result<JoinHandle<Settlement>, Rejection> {
        let pending = self.begin_submit()?;
        Ok(tokio::spawn(pending.run()))
    }

    pub async fn submit_and_wait(&self) -> Result<Settlement, Rejection> {
        let pending = self.begin_submit()?;
        Ok(pending.run().await)
    }

    /// Starts a new conversation. Any request still in flight is abandoned.
    pub fn reset(&self) {
        let mut session = self.shared.lock();
        session.lifecycle.reset();
        session.store = ConversationStore::default();
        self.shared.publish(&session);
    }
}

/// An accepted conversation submission whose request has not run yet.
///
/// Dropping it before [`PendingTurn::run`] completes (including an aborted
/// or panicked task) settles the turn as a connection failure.
#[must_use = "a pending turn does nothing until it is run"]
pub struct PendingTurn {
    shared: Weak<Shared>,
    transport: Arc<dyn ConversationTransport>,
    ticket: Ticket,
    message: String,
    settled: bool,
}

impl PendingTurn {
    pub async fn run(mut self) -> Settlement {
        let outcome = self.transport.send(&self.message).await;
        self.settled = true;
        settle(&self.shared, self.ticket, outcome)
    }
}

impl Drop for PendingTurn {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        debug!(
            generation = self.ticket.generation(),
            "conversation turn dropped before completion"
        );
        settle(&self.shared, self.ticket, Err(ClientError::Abandoned));
    }
}

fn settle(shared: &Weak<Shared>, ticket: Ticket, outcome: Result<String, ClientError>) -> Settlement {
    let Some(shared) = shared.upgrade() else {
        debug!(
            generation = ticket.generation(),
            "conversation controller dropped; discarding response"
        );
        return Settlement::Stale;
    };
    let mut session = shared.lock();
    if !session.lifecycle.is_current(ticket) {
        debug!(
            generation = ticket.generation(),
            "discarding stale conversation response"
        );
        return Settlement::Stale;
    }

    match outcome {
        Ok(reply) => {
            info!(generation = ticket.generation(), "conversation reply received");
            session.store.append_assistant_turn(reply);
            session.lifecycle.succeed(ticket);
        }
        Err(err) => {
            warn!(
                generation = ticket.generation(),
                kind = %err.kind(),
                error = %err,
                "conversation request failed"
            );
            session
                .store
                .append_error_turn(err.user_message(ErrorSurface::Conversation));
            session.lifecycle.fail(ticket);
        }
    }
    shared.publish(&session);
    Settlement::Applied
}

#[cfg(test)]
#[path = "tests/conversation_tests.rs"]
mod tests;
