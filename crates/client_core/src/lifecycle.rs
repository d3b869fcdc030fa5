//! Single-flight request lifecycle shared by both controllers.
//!
//! `idle -> pending -> {success, error}`, and from either settled state a new
//! submission goes straight back to `pending`. Every accepted submission gets
//! a [`Ticket`] carrying the generation it started in; a completion whose
//! ticket no longer matches is stale and must not touch the store.

use shared::domain::LifecycleState;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("a request is already in flight")]
    InFlight,
    #[error("draft input is empty")]
    EmptyDraft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
}

impl Ticket {
    pub fn generation(self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Default)]
pub struct Lifecycle {
    state: LifecycleState,
    generation: u64,
}

impl Lifecycle {
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Guards are checked in order: in-flight first, then the trimmed draft.
    /// On rejection nothing changes.
    pub fn begin(&mut self, draft: &str) -> Result<Ticket, Rejection> {
        if self.state.is_pending() {
            return Err(Rejection::InFlight);
        }
        if draft.trim().is_empty() {
            return Err(Rejection::EmptyDraft);
        }

        self.generation += 1;
        self.state = LifecycleState::Pending;
        Ok(Ticket {
            generation: self.generation,
        })
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.state.is_pending() && ticket.generation == self.generation
    }

    /// Returns false, leaving the state untouched, for a stale ticket.
    pub fn succeed(&mut self, ticket: Ticket) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.state = LifecycleState::Success;
        true
    }

    /// The user-facing text lives in the owning store, not here.
    pub fn fail(&mut self, ticket: Ticket) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.state = LifecycleState::Error;
        true
    }

    /// Abandons any in-flight request; its completion becomes stale.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.state = LifecycleState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_moves_idle_to_pending() {
        let mut lifecycle = Lifecycle::default();
        let ticket = lifecycle.begin("hello").expect("accepted");
        assert_eq!(lifecycle.state(), LifecycleState::Pending);
        assert!(lifecycle.is_current(ticket));
    }

    #[test]
    fn second_begin_while_pending_is_rejected_without_changes() {
        let mut lifecycle = Lifecycle::default();
        let ticket = lifecycle.begin("first").expect("accepted");
        let generation = lifecycle.generation();

        assert_eq!(lifecycle.begin("second"), Err(Rejection::InFlight));
        assert_eq!(lifecycle.state(), LifecycleState::Pending);
        assert_eq!(lifecycle.generation(), generation);
        assert!(lifecycle.is_current(ticket));
    }

    #[test]
    fn whitespace_draft_is_rejected() {
        let mut lifecycle = Lifecycle::default();
        assert_eq!(lifecycle.begin(" \n\t "), Err(Rejection::EmptyDraft));
        assert_eq!(lifecycle.state(), LifecycleState::Idle);
    }

    #[test]
    fn in_flight_guard_is_checked_before_draft() {
        let mut lifecycle = Lifecycle::default();
        lifecycle.begin("first").expect("accepted");
        assert_eq!(lifecycle.begin(""), Err(Rejection::InFlight));
    }

    #[test]
    fn settles_exactly_once() {
        let mut lifecycle = Lifecycle::default();
        let ticket = lifecycle.begin("x").expect("accepted");
        assert!(lifecycle.fail(ticket));
        assert_eq!(lifecycle.state(), LifecycleState::Error);

        assert!(!lifecycle.succeed(ticket));
        assert_eq!(lifecycle.state(), LifecycleState::Error);
    }

    #[test]
    fn settled_states_accept_a_new_submission() {
        let mut lifecycle = Lifecycle::default();
        let first = lifecycle.begin("x").expect("accepted");
        assert!(lifecycle.succeed(first));

        let second = lifecycle.begin("y").expect("accepted again");
        assert_eq!(lifecycle.state(), LifecycleState::Pending);
        assert!(!lifecycle.is_current(first));
        assert!(lifecycle.is_current(second));
    }

    #[test]
    fn reset_makes_in_flight_ticket_stale() {
        let mut lifecycle = Lifecycle::default();
        let stale = lifecycle.begin("x").expect("accepted");
        lifecycle.reset();
        assert_eq!(lifecycle.state(), LifecycleState::Idle);

        let fresh = lifecycle.begin("y").expect("accepted");
        assert!(!lifecycle.succeed(stale));
        assert!(lifecycle.succeed(fresh));
    }
}
