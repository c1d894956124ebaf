//! Build errors for the fluent configuration builders.

use thiserror::Error;

/// Errors that can occur when assembling transitions in code.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BuildError {
    #[error("Transition source state not specified. Call .from(state)")]
    MissingFromState,

    #[error("Transition target state not specified. Call .to(state)")]
    MissingToState,

    #[error("Conditional transition has no clauses. Add .when(expr, state) or .otherwise(state)")]
    NoConditions,

    #[error("Direct transitions take a single target; remove .when()/.otherwise() clauses")]
    UnexpectedConditions,
}
