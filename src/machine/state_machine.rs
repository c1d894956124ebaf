//! Action authorization, state assertions, and next-state queries.

use crate::builder::StateMachineBuilder;
use crate::core::{CallContext, StateDefinition, StateMachineConfig, Transition, Variables};
use crate::error::{ConfigError, InvalidState, Result, StateMachineError};
use crate::events::{EventPublisher, IllegalActionEvent, InvalidStateEvent, StateMachineEvent};
use crate::resolver::TransitionResolver;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Immutable index built from a configuration.
struct Definition {
    states: Vec<StateDefinition>,
    state_by_name: HashMap<String, usize>,
    transitions_by_origin: HashMap<String, Vec<Transition>>,
}

impl Definition {
    fn index(config: StateMachineConfig) -> Self {
        let state_by_name = config
            .states
            .iter()
            .enumerate()
            .map(|(i, s)| (s.state.clone(), i))
            .collect();

        let mut transitions_by_origin: HashMap<String, Vec<Transition>> = HashMap::new();
        for transition in config.transitions {
            transitions_by_origin
                .entry(transition.origin().to_string())
                .or_default()
                .push(transition);
        }

        Self {
            states: config.states,
            state_by_name,
            transitions_by_origin,
        }
    }
}

/// A configured, immutable state machine.
///
/// Cloning is cheap; clones share the configuration, resolver, and
/// publisher.
#[derive(Clone)]
pub struct StateMachine {
    definition: Arc<Definition>,
    resolver: TransitionResolver,
    publisher: Arc<dyn EventPublisher>,
}

impl StateMachine {
    /// Validate `config` and build a machine around it.
    pub fn new(
        config: StateMachineConfig,
        resolver: TransitionResolver,
        publisher: Arc<dyn EventPublisher>,
    ) -> Result<Self, ConfigError> {
        config.validate(resolver.evaluator().as_ref())?;

        let definition = Definition::index(config);
        tracing::info!(
            states = definition.states.len(),
            origins = definition.transitions_by_origin.len(),
            "state machine built"
        );

        Ok(Self {
            definition: Arc::new(definition),
            resolver,
            publisher,
        })
    }

    pub fn builder() -> StateMachineBuilder {
        StateMachineBuilder::new()
    }

    /// Whether `action` is permitted in `state`. Unknown states permit
    /// nothing.
    pub fn is_action_allowed(&self, state: &str, action: &str) -> bool {
        self.state(state).is_some_and(|s| s.allows(action))
    }

    /// Fail with `IllegalAction` unless `action` is permitted in `state`.
    pub fn require_action_allowed(&self, state: &str, action: &str) -> Result<()> {
        if self.is_action_allowed(state, action) {
            return Ok(());
        }

        self.publish(IllegalActionEvent::new(state, action).into());
        Err(StateMachineError::IllegalAction {
            state: state.to_string(),
            action: action.to_string(),
        })
    }

    /// Fail with `InvalidState` unless `current` equals `expected`.
    pub fn require_state(&self, current: &str, expected: &str) -> Result<()> {
        if current == expected {
            return Ok(());
        }

        self.publish(InvalidStateEvent::new(current, vec![expected.to_string()]).into());
        Err(InvalidState::Mismatch {
            current: current.to_string(),
            expected: expected.to_string(),
        }
        .into())
    }

    /// Fail with `InvalidState` unless `current` is one of `expected`.
    ///
    /// An empty `expected` list is a caller error and publishes no event.
    pub fn require_one_state_of<S: AsRef<str>>(&self, current: &str, expected: &[S]) -> Result<()> {
        if self.is_in_one_state_of(current, expected)? {
            return Ok(());
        }

        let expected: Vec<String> = expected.iter().map(|s| s.as_ref().to_string()).collect();
        self.publish(InvalidStateEvent::new(current, expected.clone()).into());
        Err(InvalidState::NotOneOf {
            current: current.to_string(),
            expected,
        }
        .into())
    }

    /// Whether `current` is one of `expected`; an empty list is an error.
    pub fn is_in_one_state_of<S: AsRef<str>>(&self, current: &str, expected: &[S]) -> Result<bool> {
        if expected.is_empty() {
            return Err(InvalidState::NoExpectedStates {
                current: current.to_string(),
            }
            .into());
        }
        Ok(expected.iter().any(|s| s.as_ref() == current))
    }

    pub fn next_state_for_success(&self, current: &str) -> Result<&str> {
        self.next_state(&CallContext::success(current, &Variables::new()))
    }

    pub fn next_state_for_success_with(&self, current: &str, variables: &Variables) -> Result<&str> {
        self.next_state(&CallContext::success(current, variables))
    }

    pub fn next_state_for_error(&self, current: &str) -> Result<&str> {
        self.next_state(&CallContext::failure(current, &Variables::new()))
    }

    pub fn next_state_for_error_with(&self, current: &str, variables: &Variables) -> Result<&str> {
        self.next_state(&CallContext::failure(current, variables))
    }

    /// Resolve the next state for an arbitrary call context.
    pub fn next_state(&self, context: &CallContext<'_>) -> Result<&str> {
        let transitions = self.transitions_from(context.current_state).ok_or_else(|| {
            InvalidState::NoTransitions {
                current: context.current_state.to_string(),
            }
        })?;

        self.resolver.resolve(context, transitions)
    }

    pub fn state(&self, name: &str) -> Option<&StateDefinition> {
        self.definition
            .state_by_name
            .get(name)
            .map(|&i| &self.definition.states[i])
    }

    /// Declared states in document order.
    pub fn states(&self) -> &[StateDefinition] {
        &self.definition.states
    }

    /// Transitions declared for `state`, in document order.
    pub fn transitions_from(&self, state: &str) -> Option<&[Transition]> {
        self.definition
            .transitions_by_origin
            .get(state)
            .map(Vec::as_slice)
    }

    fn publish(&self, event: StateMachineEvent) {
        if let Err(err) = self.publisher.publish(&event) {
            tracing::error!(
                error = %err,
                event_id = %event.id(),
                current_state = event.current_state(),
                "failed to publish state machine event"
            );
        }
    }
}

impl fmt::Debug for StateMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateMachine")
            .field("states", &self.definition.states.len())
            .field("origins", &self.definition.transitions_by_origin.len())
            .finish_non_exhaustive()
    }
}
