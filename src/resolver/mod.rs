//! Transition resolution.
//!
//! [`TransitionResolver`] walks the transitions declared for the current
//! state; conditional entries are delegated to [`ConditionalResolver`],
//! which in turn asks the injected expression evaluator. Both resolvers are
//! immutable and cheap to clone, so one pair can serve many machines.

mod conditional;
mod transition;

pub use conditional::ConditionalResolver;
pub use transition::TransitionResolver;
