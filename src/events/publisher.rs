//! Event publisher interface and bundled implementations.

use super::StateMachineEvent;
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

/// Publication failed; the policy error that triggered it is still raised.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("event publication failed: {0}")]
pub struct PublishError(pub String);

/// Sink for state machine events.
///
/// Publishing is synchronous and must be safe to call from many threads.
pub trait EventPublisher: Send + Sync {
    fn publish(&self, event: &StateMachineEvent) -> Result<(), PublishError>;
}

impl<F> EventPublisher for F
where
    F: Fn(&StateMachineEvent) -> Result<(), PublishError> + Send + Sync,
{
    fn publish(&self, event: &StateMachineEvent) -> Result<(), PublishError> {
        self(event)
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPublisher;

impl EventPublisher for NoopPublisher {
    fn publish(&self, _event: &StateMachineEvent) -> Result<(), PublishError> {
        Ok(())
    }
}

/// Emits every event as a `tracing` warning.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingPublisher;

impl EventPublisher for TracingPublisher {
    fn publish(&self, event: &StateMachineEvent) -> Result<(), PublishError> {
        match event {
            StateMachineEvent::IllegalAction(e) => tracing::warn!(
                event_id = %e.id,
                current_state = %e.current_state,
                action = %e.action,
                "illegal action"
            ),
            StateMachineEvent::InvalidState(e) => tracing::warn!(
                event_id = %e.id,
                current_state = %e.current_state,
                expected_states = ?e.expected_states,
                "invalid state"
            ),
        }
        Ok(())
    }
}

/// Records events in memory, in publication order.
#[derive(Debug, Default)]
pub struct InMemoryPublisher {
    events: Mutex<Vec<StateMachineEvent>>,
}

impl InMemoryPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events recorded so far.
    pub fn events(&self) -> Vec<StateMachineEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drain the recorded events.
    pub fn take(&self) -> Vec<StateMachineEvent> {
        std::mem::take(&mut *self.events.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn len(&self) -> usize {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventPublisher for InMemoryPublisher {
    fn publish(&self, event: &StateMachineEvent) -> Result<(), PublishError> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{IllegalActionEvent, InvalidStateEvent};
    use std::sync::Arc;

    #[test]
    fn in_memory_publisher_records_in_order() {
        let publisher = InMemoryPublisher::new();
        publisher
            .publish(&IllegalActionEvent::new("A", "GO").into())
            .unwrap();
        publisher
            .publish(&InvalidStateEvent::new("A", vec!["B".into()]).into())
            .unwrap();

        let events = publisher.events();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], StateMachineEvent::IllegalAction(_)));
        assert!(matches!(events[1], StateMachineEvent::InvalidState(_)));
    }

    #[test]
    fn take_drains_recorded_events() {
        let publisher = InMemoryPublisher::new();
        publisher
            .publish(&IllegalActionEvent::new("A", "GO").into())
            .unwrap();

        assert_eq!(publisher.take().len(), 1);
        assert!(publisher.is_empty());
    }

    #[test]
    fn closures_are_publishers() {
        let failing = |_: &StateMachineEvent| -> Result<(), PublishError> {
            Err(PublishError("bus offline".into()))
        };
        let err = failing
            .publish(&IllegalActionEvent::new("A", "GO").into())
            .unwrap_err();
        assert_eq!(err.to_string(), "event publication failed: bus offline");
    }

    #[test]
    fn publishers_are_shareable_across_threads() {
        let publisher = Arc::new(InMemoryPublisher::new());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let publisher = Arc::clone(&publisher);
                std::thread::spawn(move || {
                    publisher
                        .publish(&IllegalActionEvent::new(format!("S{i}"), "GO").into())
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(publisher.len(), 4);
    }

    #[test]
    fn noop_and_tracing_publishers_accept_everything() {
        let event: StateMachineEvent = InvalidStateEvent::new("A", vec![]).into();
        assert!(NoopPublisher.publish(&event).is_ok());
        assert!(TracingPublisher.publish(&event).is_ok());
    }
}
