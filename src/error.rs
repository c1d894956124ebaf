//! Error types surfaced by the engine.

use crate::core::{DocumentFormat, Transition, TransitionKind};
use crate::expression::ExpressionError;
use std::fmt::Display;
use std::path::PathBuf;
use thiserror::Error;

/// Result alias used across the public API.
pub type Result<T, E = StateMachineError> = std::result::Result<T, E>;

/// Errors returned by state machine and registry operations.
#[derive(Debug, Error)]
pub enum StateMachineError {
    #[error("No state machine found with name '{name}'. Available: [{}]", .available.join(", "))]
    UnknownStateMachine {
        name: String,
        available: Vec<String>,
    },

    #[error("Action '{action}' is not allowed in current state '{state}'")]
    IllegalAction { state: String, action: String },

    #[error(transparent)]
    InvalidState(#[from] InvalidState),

    #[error(transparent)]
    Configuration(#[from] ConfigError),

    #[error("Expression evaluation failed: {0}")]
    Expression(#[from] ExpressionError),
}

/// Coarse classification of a [`StateMachineError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UnknownStateMachine,
    IllegalAction,
    InvalidState,
    Configuration,
    Expression,
}

impl StateMachineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownStateMachine { .. } => ErrorKind::UnknownStateMachine,
            Self::IllegalAction { .. } => ErrorKind::IllegalAction,
            Self::InvalidState(_) => ErrorKind::InvalidState,
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Expression(_) => ErrorKind::Expression,
        }
    }
}

/// The distinct ways a state can be invalid for the requested operation.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum InvalidState {
    #[error("Expected state '{expected}' does not match actual state '{current}'")]
    Mismatch { current: String, expected: String },

    #[error("Expected states [{}] do not contain actual state '{current}'", .expected.join(", "))]
    NotOneOf {
        current: String,
        expected: Vec<String>,
    },

    #[error("Invalid call - no expected states provided (current state: '{current}')")]
    NoExpectedStates { current: String },

    #[error("No transitions defined for state '{current}'")]
    NoTransitions { current: String },

    #[error(
        "No valid next state found for current state '{current}'. Defined transitions: [{}]",
        join(.transitions)
    )]
    NoMatchingTransition {
        current: String,
        transitions: Vec<Transition>,
    },
}

/// Errors raised while loading or assembling configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse {format} document: {reason}")]
    Parse {
        format: DocumentFormat,
        reason: String,
    },

    #[error("Invalid state machine configuration: {}", join(.0))]
    Invalid(Vec<ConfigViolation>),

    #[error("No state machine definition supplied. Provide a document or a parsed configuration")]
    MissingDefinition,

    #[error("Resource not found: '{path}'")]
    ResourceNotFound { path: String },

    #[error("Resource path '{path}' must be relative and stay inside the resource root")]
    InvalidResourcePath { path: String },

    #[error("Failed to read resource '{}'", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Both `definition` and `definitions` are set; configure exactly one")]
    ConflictingModes,

    #[error("State machine '{0}' is registered more than once")]
    DuplicateMachine(String),

    #[error("State machine '{name}' could not be built: {source}")]
    Machine {
        name: String,
        #[source]
        source: Box<ConfigError>,
    },
}

impl ConfigError {
    /// Violations carried by [`ConfigError::Invalid`], looking through
    /// [`ConfigError::Machine`]; empty otherwise.
    pub fn violations(&self) -> &[ConfigViolation] {
        match self {
            Self::Invalid(violations) => violations,
            Self::Machine { source, .. } => source.violations(),
            _ => &[],
        }
    }
}

/// A single problem found by load-time validation.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigViolation {
    #[error("state '{state}' is declared more than once")]
    DuplicateState { state: String },

    #[error("action '{action}' is declared more than once in state '{state}'")]
    DuplicateAction { state: String, action: String },

    #[error("{kind} transition originates from undeclared state '{from}'")]
    UnknownSourceState { from: String, kind: TransitionKind },

    #[error("transition from '{from}' targets undeclared state '{to}'")]
    UnknownTargetState { from: String, to: String },

    #[error("condition '{expression}' on transition from '{from}' is invalid: {reason}")]
    InvalidExpression {
        from: String,
        expression: String,
        reason: String,
    },
}

fn join<T: Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
