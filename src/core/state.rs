//! State definitions and their permitted actions.
//!
//! A state is a named position in the machine. It carries the set of
//! actions callers may perform while an entity sits in that state.

use serde::{Deserialize, Serialize};

/// A declared state together with the actions permitted within it.
///
/// Action membership is the only question ever asked of `allowed_actions`,
/// so declaration order carries no meaning.
///
/// # Example
///
/// ```rust
/// use simple_state_machine::core::StateDefinition;
///
/// let review = StateDefinition::new("REVIEW", ["APPROVE", "REJECT"]);
///
/// assert!(review.allows("APPROVE"));
/// assert!(!review.allows("CANCEL"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateDefinition {
    /// Unique state identifier.
    pub state: String,

    /// Actions permitted while in this state.
    #[serde(rename = "allowedActions", default)]
    pub allowed_actions: Vec<String>,
}

impl StateDefinition {
    /// Create a state definition from an identifier and its actions.
    pub fn new<I, A>(state: impl Into<String>, allowed_actions: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        Self {
            state: state.into(),
            allowed_actions: allowed_actions.into_iter().map(Into::into).collect(),
        }
    }

    /// State identifier.
    pub fn name(&self) -> &str {
        &self.state
    }

    /// Whether `action` is permitted in this state.
    pub fn allows(&self, action: &str) -> bool {
        self.allowed_actions.iter().any(|a| a == action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_declared_actions_only() {
        let state = StateDefinition::new("REVIEW", ["APPROVE", "REJECT"]);

        assert!(state.allows("APPROVE"));
        assert!(state.allows("REJECT"));
        assert!(!state.allows("approve"));
        assert!(!state.allows("CANCEL"));
    }

    #[test]
    fn state_without_actions_allows_nothing() {
        let state = StateDefinition::new("CREATED", Vec::<String>::new());
        assert!(!state.allows("APPROVE"));
        assert_eq!(state.name(), "CREATED");
    }

    #[test]
    fn deserializes_camel_case_actions() {
        let json = r#"{ "state": "REVIEW", "allowedActions": ["APPROVE"] }"#;
        let state: StateDefinition = serde_json::from_str(json).unwrap();

        assert_eq!(state.state, "REVIEW");
        assert_eq!(state.allowed_actions, vec!["APPROVE".to_string()]);
    }

    #[test]
    fn missing_actions_default_to_empty() {
        let state: StateDefinition = serde_json::from_str(r#"{ "state": "DONE" }"#).unwrap();
        assert!(state.allowed_actions.is_empty());
    }
}
