//! Simple State Machine: a configuration-driven deterministic state machine
//! engine.
//!
//! A state machine is declared in a JSON or YAML document: a set of states,
//! each with the actions it permits, and a set of transitions. The engine
//! answers two kinds of question for a caller that tracks its own current
//! state:
//!
//! - **Authorization**: may this action run in this state? Violations are
//!   published as events before the error is returned.
//! - **Navigation**: given that the task in this state succeeded (or
//!   failed), which state comes next? Conditional transitions pick their
//!   target by evaluating boolean expressions against caller variables.
//!
//! The engine never stores or mutates a current state. A built
//! [`StateMachine`] is immutable and can be shared freely across threads.
//!
//! # Core Concepts
//!
//! - **Configuration**: [`core::StateMachineConfig`], validated once at load
//! - **Transitions**: `SUCCESS`, `ERROR`, and `CONDITIONAL` with ordered
//!   `when`/`else` clauses
//! - **Expressions**: pluggable via [`expression::ExpressionEvaluator`]
//! - **Events**: pluggable via [`events::EventPublisher`]
//! - **Registry**: many named machines, optionally bootstrapped from
//!   settings
//!
//! # Example
//!
//! ```rust
//! use simple_state_machine::{variables, StateMachine};
//!
//! let machine = StateMachine::builder()
//!     .yaml(r##"
//! states:
//!   - state: CREATED
//!   - state: PROCESSING
//!   - state: REVIEW
//!     allowedActions: [APPROVE, REJECT]
//!   - state: APPROVED
//! transitions:
//!   - type: SUCCESS
//!     from: CREATED
//!     to: PROCESSING
//!   - type: CONDITIONAL
//!     from: PROCESSING
//!     conditions:
//!       - when: "#order.totalAmount > 1000"
//!         to: REVIEW
//!       - else: APPROVED
//! "##)
//!     .build()
//!     .unwrap();
//!
//! let small = variables! { "order" => { "totalAmount": 250 } };
//! assert_eq!(machine.next_state_for_success_with("PROCESSING", &small).unwrap(), "APPROVED");
//! assert!(machine.require_action_allowed("REVIEW", "APPROVE").is_ok());
//! ```

pub mod builder;
pub mod core;
pub mod error;
pub mod events;
pub mod expression;
pub mod machine;
pub mod registry;
pub mod resolver;

#[doc(hidden)]
pub use serde_json as __serde_json;

// Re-export commonly used types
pub use builder::{RegistryBuilder, StateMachineBuilder};
pub use crate::core::{CallContext, StateMachineConfig, Variables};
pub use error::{ConfigError, ErrorKind, InvalidState, Result, StateMachineError};
pub use events::{EventPublisher, StateMachineEvent};
pub use expression::{ExpressionEvaluator, StandardEvaluator};
pub use machine::StateMachine;
pub use registry::{Bootstrap, BootstrapSettings, StateMachineRegistry};
