//! Policy-violation events and their publication.
//!
//! A [`StateMachine`](crate::machine::StateMachine) publishes an event
//! synchronously before it returns an `IllegalAction` or a state-mismatch
//! `InvalidState` error. Publication goes through the narrow
//! [`EventPublisher`] interface so callers can wire any bus, or none.

mod publisher;

pub use publisher::{EventPublisher, InMemoryPublisher, NoopPublisher, PublishError, TracingPublisher};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An action was attempted in a state that does not permit it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IllegalActionEvent {
    pub id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub current_state: String,
    pub action: String,
}

impl IllegalActionEvent {
    pub fn new(current_state: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            current_state: current_state.into(),
            action: action.into(),
        }
    }
}

/// The current state was not among the states an operation required.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InvalidStateEvent {
    pub id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub current_state: String,
    pub expected_states: Vec<String>,
}

impl InvalidStateEvent {
    pub fn new(current_state: impl Into<String>, expected_states: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            current_state: current_state.into(),
            expected_states,
        }
    }
}

/// Any event a state machine publishes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StateMachineEvent {
    IllegalAction(IllegalActionEvent),
    InvalidState(InvalidStateEvent),
}

impl StateMachineEvent {
    pub fn id(&self) -> Uuid {
        match self {
            Self::IllegalAction(e) => e.id,
            Self::InvalidState(e) => e.id,
        }
    }

    pub fn current_state(&self) -> &str {
        match self {
            Self::IllegalAction(e) => &e.current_state,
            Self::InvalidState(e) => &e.current_state,
        }
    }
}

impl From<IllegalActionEvent> for StateMachineEvent {
    fn from(event: IllegalActionEvent) -> Self {
        Self::IllegalAction(event)
    }
}

impl From<InvalidStateEvent> for StateMachineEvent {
    fn from(event: InvalidStateEvent) -> Self {
        Self::InvalidState(event)
    }
}
