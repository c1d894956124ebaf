//! Configuration document model and parsing.

use super::state::StateDefinition;
use super::transition::Transition;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Encoding of a configuration document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum DocumentFormat {
    #[default]
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Pick the format from a file extension; anything but `.yaml`/`.yml`
    /// is read as JSON.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        match path.as_ref().extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                Self::Yaml
            }
            _ => Self::Json,
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => f.write_str("JSON"),
            Self::Yaml => f.write_str("YAML"),
        }
    }
}

/// Declarative description of a state machine.
///
/// # Example
///
/// ```rust
/// use simple_state_machine::core::StateMachineConfig;
///
/// let config = StateMachineConfig::from_json_str(r#"{
///     "states": [
///         { "state": "CREATED", "allowedActions": ["CANCEL"] },
///         { "state": "PROCESSING", "allowedActions": [] }
///     ],
///     "transitions": [
///         { "type": "SUCCESS", "from": "CREATED", "to": "PROCESSING" }
///     ]
/// }"#).unwrap();
///
/// assert_eq!(config.states.len(), 2);
/// assert_eq!(config.transitions.len(), 1);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateMachineConfig {
    #[serde(default)]
    pub states: Vec<StateDefinition>,
    #[serde(default)]
    pub transitions: Vec<Transition>,
}

impl StateMachineConfig {
    pub fn new(states: Vec<StateDefinition>, transitions: Vec<Transition>) -> Self {
        Self {
            states,
            transitions,
        }
    }

    pub fn from_json_str(document: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(document).map_err(|e| ConfigError::Parse {
            format: DocumentFormat::Json,
            reason: e.to_string(),
        })
    }

    pub fn from_json_slice(document: &[u8]) -> Result<Self, ConfigError> {
        serde_json::from_slice(document).map_err(|e| ConfigError::Parse {
            format: DocumentFormat::Json,
            reason: e.to_string(),
        })
    }

    pub fn from_yaml_str(document: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(document).map_err(|e| ConfigError::Parse {
            format: DocumentFormat::Yaml,
            reason: e.to_string(),
        })
    }

    /// Parse raw document bytes in the given format.
    pub fn from_slice(document: &[u8], format: DocumentFormat) -> Result<Self, ConfigError> {
        match format {
            DocumentFormat::Json => Self::from_json_slice(document),
            DocumentFormat::Yaml => serde_yaml::from_slice(document).map_err(|e| {
                ConfigError::Parse {
                    format: DocumentFormat::Yaml,
                    reason: e.to_string(),
                }
            }),
        }
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            format: DocumentFormat::Json,
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Condition;

    const ORDER_YAML: &str = r##"
states:
  - state: CREATED
    allowedActions: [CANCEL]
  - state: PROCESSING
  - state: REVIEW
    allowedActions: [APPROVE, REJECT]
  - state: APPROVED
transitions:
  - type: SUCCESS
    from: CREATED
    to: PROCESSING
  - type: CONDITIONAL
    from: PROCESSING
    conditions:
      - else: APPROVED
      - when: "#order.totalAmount > 1000"
        to: REVIEW
"##;

    #[test]
    fn format_follows_extension() {
        assert_eq!(DocumentFormat::from_path("m/order.yaml"), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::from_path("order.YML"), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::from_path("order.json"), DocumentFormat::Json);
        assert_eq!(DocumentFormat::from_path("order"), DocumentFormat::Json);
    }

    #[test]
    fn parses_yaml_document() {
        let config = StateMachineConfig::from_yaml_str(ORDER_YAML).unwrap();

        assert_eq!(config.states.len(), 4);
        assert!(config.states[1].allowed_actions.is_empty());
        assert_eq!(
            config.transitions[1],
            Transition::conditional(
                "PROCESSING",
                vec![
                    Condition::when("#order.totalAmount > 1000", "REVIEW"),
                    Condition::otherwise("APPROVED"),
                ]
            )
        );
    }

    #[test]
    fn json_and_yaml_agree() {
        let from_yaml = StateMachineConfig::from_yaml_str(ORDER_YAML).unwrap();
        let json = from_yaml.to_json_string().unwrap();
        let from_json = StateMachineConfig::from_slice(json.as_bytes(), DocumentFormat::Json).unwrap();

        assert_eq!(from_yaml, from_json);
    }

    #[test]
    fn unknown_transition_type_fails_to_load() {
        let err = StateMachineConfig::from_json_str(
            r#"{ "states": [], "transitions": [{ "type": "RETRY", "from": "A", "to": "B" }] }"#,
        )
        .unwrap_err();

        assert!(matches!(
            err,
            ConfigError::Parse {
                format: DocumentFormat::Json,
                ..
            }
        ));
    }

    #[test]
    fn malformed_clause_fails_to_load() {
        let err = StateMachineConfig::from_json_str(
            r#"{ "transitions": [{ "type": "CONDITIONAL", "from": "A", "conditions": [{ "to": "B" }] }] }"#,
        )
        .unwrap_err();

        assert!(err.to_string().contains("only valid together with `when`"));
    }

    #[test]
    fn yaml_errors_name_the_format() {
        let err = StateMachineConfig::from_slice(b"states: [", DocumentFormat::Yaml).unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse YAML document"));
    }
}
