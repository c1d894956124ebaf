//! Call context supplied with each next-state query.

use serde_json::Value;
use std::collections::HashMap;

/// Named values made available to condition expressions.
pub type Variables = HashMap<String, Value>;

/// Everything a resolver needs to pick the next state.
///
/// The binding is borrowed and never mutated.
#[derive(Clone, Copy, Debug)]
pub struct CallContext<'a> {
    pub current_state: &'a str,
    pub completed_successfully: bool,
    pub variables: &'a Variables,
}

impl<'a> CallContext<'a> {
    pub fn new(current_state: &'a str, completed_successfully: bool, variables: &'a Variables) -> Self {
        Self {
            current_state,
            completed_successfully,
            variables,
        }
    }

    /// Context for a task that completed successfully.
    pub fn success(current_state: &'a str, variables: &'a Variables) -> Self {
        Self::new(current_state, true, variables)
    }

    /// Context for a task that failed.
    pub fn failure(current_state: &'a str, variables: &'a Variables) -> Self {
        Self::new(current_state, false, variables)
    }
}
