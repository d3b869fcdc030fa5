use super::*;

use std::{
    collections::HashMap,
    sync::atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use shared::domain::Role;
use tokio::sync::oneshot;

use crate::error::{ClientError, CHAT_CONNECT_FAILURE};

type Reply = Result<String, ClientError>;

/// Answers every call with the next scripted reply.
struct ScriptedChat {
    replies: Mutex<Vec<Reply>>,
    calls: AtomicUsize,
}

impl ScriptedChat {
    fn new(replies: Vec<Reply>) -> Arc<Self> {
        let mut replies = replies;
        replies.reverse();
        Arc::new(Self {
            replies: Mutex::new(replies),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConversationTransport for ScriptedChat {
    async fn send(&self, _message: &str) -> Result<String, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.replies
            .lock()
            .expect("replies")
            .pop()
            .unwrap_or_else(|| Ok("default reply".to_string()))
    }
}

/// Holds each call until the test releases the gate registered for that
/// message.
#[derive(Default)]
struct GatedChat {
    gates: Mutex<HashMap<String, oneshot::Receiver<Reply>>>,
}

impl GatedChat {
    fn gate(&self, message: &str) -> oneshot::Sender<Reply> {
        let (tx, rx) = oneshot::channel();
        self.gates
            .lock()
            .expect("gates")
            .insert(message.to_string(), rx);
        tx
    }
}

#[async_trait]
impl ConversationTransport for GatedChat {
    async fn send(&self, message: &str) -> Result<String, ClientError> {
        let gate = self
            .gates
            .lock()
            .expect("gates")
            .remove(message)
            .expect("gate registered for message");
        gate.await.expect("gate released")
    }
}

fn transport_failure() -> ClientError {
    ClientError::transport("http://127.0.0.1:5000/api/chat", "connection refused")
}

#[tokio::test]
async fn reply_becomes_last_assistant_turn() {
    let transport = ScriptedChat::new(vec![Ok("X".to_string())]);
    let controller = ConversationController::new(transport.clone());

    controller.set_draft("hello");
    let settlement = controller.submit_and_wait().await.expect("accepted");

    assert_eq!(settlement, Settlement::Applied);
    let view = controller.view();
    assert_eq!(view.state, LifecycleState::Success);
    assert_eq!(view.history.last(), Some(&Message::assistant("X")));
    assert_eq!(view.history.first(), Some(&Message::user("hello")));
    assert_eq!(view.draft, "");
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn history_holds_one_pair_per_accepted_submission() {
    let transport = ScriptedChat::new(vec![
        Ok("one".to_string()),
        Err(transport_failure()),
        Ok("three".to_string()),
    ]);
    let controller = ConversationController::new(transport.clone());

    for text in ["first", "second", "third"] {
        controller.set_draft(text);
        controller.submit_and_wait().await.expect("accepted");
    }
    controller.set_draft("   ");
    assert!(matches!(
        controller.submit_and_wait().await,
        Err(Rejection::EmptyDraft)
    ));

    let history = controller.view().history;
    assert_eq!(history.len(), 6);
    for pair in history.chunks(2) {
        assert_eq!(pair[0].role(), Role::User);
        assert_eq!(pair[1].role(), Role::Assistant);
    }
    assert_eq!(history[3], Message::assistant(CHAT_CONNECT_FAILURE));
    assert_eq!(transport.calls(), 3);
}

#[tokio::test]
async fn submitting_while_pending_changes_nothing() {
    let transport = Arc::new(GatedChat::default());
    let release = transport.gate("first");
    let controller = ConversationController::new(transport.clone());

    controller.set_draft("first");
    let pending = controller.begin_submit().expect("accepted");
    controller.set_draft("typed while waiting");
    let before = controller.view();

    assert!(matches!(
        controller.begin_submit(),
        Err(Rejection::InFlight)
    ));
    assert_eq!(controller.view(), before);
    assert_eq!(before.state, LifecycleState::Pending);

    release.send(Ok("done".to_string())).expect("release");
    assert_eq!(pending.run().await, Settlement::Applied);
    let view = controller.view();
    assert_eq!(view.history.len(), 2);
    assert_eq!(view.draft, "typed while waiting");
}

#[tokio::test]
async fn empty_draft_never_reaches_transport() {
    let transport = ScriptedChat::new(Vec::new());
    let controller = ConversationController::new(transport.clone());

    controller.set_draft(" \n\t");
    assert!(matches!(
        controller.begin_submit(),
        Err(Rejection::EmptyDraft)
    ));

    let view = controller.view();
    assert_eq!(transport.calls(), 0);
    assert!(view.history.is_empty());
    assert_eq!(view.state, LifecycleState::Idle);
    assert_eq!(view.notice.as_deref(), Some(CHAT_EMPTY_DRAFT));
}

#[tokio::test]
async fn editing_draft_clears_validation_notice() {
    let controller = ConversationController::new(ScriptedChat::new(Vec::new()));

    assert!(controller.begin_submit().is_err());
    assert!(controller.view().notice.is_some());

    controller.set_draft("now with text");
    assert_eq!(controller.view().notice, None);
}

#[tokio::test]
async fn transport_failure_keeps_history_and_appends_error_turn() {
    let transport = ScriptedChat::new(vec![Ok("hi".to_string()), Err(transport_failure())]);
    let controller = ConversationController::new(transport);

    controller.set_draft("one");
    controller.submit_and_wait().await.expect("accepted");
    controller.set_draft("two");
    controller.submit_and_wait().await.expect("accepted");

    let view = controller.view();
    assert_eq!(view.state, LifecycleState::Error);
    assert_eq!(
        view.history,
        vec![
            Message::user("one"),
            Message::assistant("hi"),
            Message::user("two"),
            Message::assistant(CHAT_CONNECT_FAILURE),
        ]
    );
}

#[tokio::test]
async fn user_turn_is_visible_before_reply_arrives() {
    let transport = Arc::new(GatedChat::default());
    let release = transport.gate("question");
    let controller = ConversationController::new(transport.clone());
    let views = controller.subscribe();

    controller.set_draft("question");
    let handle = controller.submit().expect("accepted");

    {
        let view = views.borrow();
        assert_eq!(view.state, LifecycleState::Pending);
        assert_eq!(view.history, vec![Message::user("question")]);
        assert_eq!(view.draft, "");
    }

    release.send(Ok("answer".to_string())).expect("release");
    assert_eq!(handle.await.expect("join"), Settlement::Applied);
    assert_eq!(
        views.borrow().history,
        vec![Message::user("question"), Message::assistant("answer")]
    );
}

#[tokio::test]
async fn response_from_before_reset_is_discarded() {
    let transport = Arc::new(GatedChat::default());
    let release_old = transport.gate("old");
    let release_new = transport.gate("new");
    let controller = ConversationController::new(transport.clone());

    controller.set_draft("old");
    let old = controller.submit().expect("accepted");
    controller.reset();

    controller.set_draft("new");
    let new = controller.submit().expect("accepted after reset");
    release_new.send(Ok("fresh".to_string())).expect("release");
    assert_eq!(new.await.expect("join"), Settlement::Applied);

    release_old.send(Ok("late".to_string())).expect("release");
    assert_eq!(old.await.expect("join"), Settlement::Stale);

    let view = controller.view();
    assert_eq!(view.state, LifecycleState::Success);
    assert_eq!(
        view.history,
        vec![Message::user("new"), Message::assistant("fresh")]
    );
}

#[tokio::test]
async fn response_after_controller_dropped_is_discarded() {
    let transport = Arc::new(GatedChat::default());
    let release = transport.gate("bye");
    let controller = ConversationController::new(transport.clone());

    controller.set_draft("bye");
    let pending = controller.begin_submit().expect("accepted");
    drop(controller);

    release.send(Ok("too late".to_string())).expect("release");
    assert_eq!(pending.run().await, Settlement::Stale);
}

#[tokio::test]
async fn quick_question_fills_draft_without_sending() {
    let transport = ScriptedChat::new(Vec::new());
    let controller = ConversationController::new(transport.clone());

    controller.use_quick_question(QuickQuestion::TechStack);

    let view = controller.view();
    assert_eq!(view.draft, QuickQuestion::TechStack.text());
    assert_eq!(view.state, LifecycleState::Idle);
    assert_eq!(transport.calls(), 0);
}

struct PanickingChat;

#[async_trait]
impl ConversationTransport for PanickingChat {
    async fn send(&self, _message: &str) -> Result<String, ClientError> {
        panic!("transport blew up");
    }
}

#[tokio::test]
async fn dropped_turn_settles_as_connection_failure() {
    let transport = Arc::new(GatedChat::default());
    let _release = transport.gate("never answered");
    let controller = ConversationController::new(transport.clone());

    controller.set_draft("never answered");
    let pending = controller.begin_submit().expect("accepted");
    drop(pending);

    let view = controller.view();
    assert_eq!(view.state, LifecycleState::Error);
    assert_eq!(
        view.history,
        vec![
            Message::user("never answered"),
            Message::assistant(CHAT_CONNECT_FAILURE),
        ]
    );

    let release = transport.gate("retry");
    controller.set_draft("retry");
    let handle = controller.submit().expect("accepted after abandoned turn");
    release.send(Ok("back".to_string())).expect("release");
    assert_eq!(handle.await.expect("join"), Settlement::Applied);
    assert_eq!(controller.view().state, LifecycleState::Success);
}

#[tokio::test]
async fn aborted_task_does_not_leave_controller_pending() {
    let transport = Arc::new(GatedChat::default());
    let _release = transport.gate("slow");
    let controller = ConversationController::new(transport.clone());

    controller.set_draft("slow");
    let handle = controller.submit().expect("accepted");
    handle.abort();
    assert!(handle.await.expect_err("aborted").is_cancelled());

    let view = controller.view();
    assert_eq!(view.state, LifecycleState::Error);
    assert_eq!(view.history.last(), Some(&Message::assistant(CHAT_CONNECT_FAILURE)));

    controller.set_draft("again");
    assert!(controller.begin_submit().is_ok());
}

#[tokio::test]
async fn panicking_transport_settles_as_error() {
    let controller = ConversationController::new(Arc::new(PanickingChat));

    controller.set_draft("hello");
    let handle = controller.submit().expect("accepted");
    assert!(handle.await.expect_err("panicked").is_panic());

    let view = controller.view();
    assert_eq!(view.state, LifecycleState::Error);
    assert_eq!(view.history.last(), Some(&Message::assistant(CHAT_CONNECT_FAILURE)));
}

#[tokio::test]
async fn dropped_turn_after_reset_leaves_new_session_alone() {
    let transport = Arc::new(GatedChat::default());
    let _release = transport.gate("old");
    let controller = ConversationController::new(transport.clone());

    controller.set_draft("old");
    let pending = controller.begin_submit().expect("accepted");
    controller.reset();
    drop(pending);

    let view = controller.view();
    assert_eq!(view.state, LifecycleState::Idle);
    assert!(view.history.is_empty());
}
