//! Configuration model for state machines.
//!
//! This module contains the declarative side of the engine:
//! - State definitions and their permitted actions
//! - The transition sum type and conditional clauses
//! - Document parsing (JSON/YAML) and load-time validation
//! - The call context handed to resolvers
//!
//! Nothing here holds mutable state; a parsed configuration is a plain
//! value.

mod config;
mod context;
mod state;
mod transition;
mod validation;

pub use config::{DocumentFormat, StateMachineConfig};
pub use context::{CallContext, Variables};
pub use state::StateDefinition;
pub use transition::{Condition, ConditionalTransition, DirectTransition, Transition, TransitionKind};
