//! Builder for a registry of named state machines.

use super::DocumentSource;
use crate::builder::StateMachineBuilder;
use crate::core::{DocumentFormat, StateMachineConfig};
use crate::error::ConfigError;
use crate::events::{EventPublisher, NoopPublisher};
use crate::expression::{ExpressionEvaluator, StandardEvaluator};
use crate::registry::StateMachineRegistry;
use crate::resolver::TransitionResolver;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Builder for a [`StateMachineRegistry`].
///
/// Every machine shares one resolver (and so one evaluator) and one
/// publisher. Names must be unique.
#[derive(Default)]
pub struct RegistryBuilder {
    entries: Vec<(String, DocumentSource)>,
    evaluator: Option<Arc<dyn ExpressionEvaluator>>,
    publisher: Option<Arc<dyn EventPublisher>>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(self, name: impl Into<String>, config: StateMachineConfig) -> Self {
        self.entry(name, DocumentSource::Parsed(config))
    }

    pub fn json(self, name: impl Into<String>, document: impl Into<String>) -> Self {
        self.document(name, document.into().into_bytes(), DocumentFormat::Json)
    }

    pub fn yaml(self, name: impl Into<String>, document: impl Into<String>) -> Self {
        self.document(name, document.into().into_bytes(), DocumentFormat::Yaml)
    }

    pub fn document(
        self,
        name: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
        format: DocumentFormat,
    ) -> Self {
        self.entry(
            name,
            DocumentSource::Raw {
                bytes: bytes.into(),
                format,
            },
        )
    }

    pub fn evaluator(mut self, evaluator: Arc<dyn ExpressionEvaluator>) -> Self {
        self.evaluator = Some(evaluator);
        self
    }

    pub fn publisher(mut self, publisher: Arc<dyn EventPublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    fn entry(mut self, name: impl Into<String>, source: DocumentSource) -> Self {
        self.entries.push((name.into(), source));
        self
    }

    /// Build every machine. The first entry that fails aborts the build.
    pub fn build(self) -> Result<StateMachineRegistry, ConfigError> {
        let evaluator = self
            .evaluator
            .unwrap_or_else(|| Arc::new(StandardEvaluator::new()));
        let resolver = TransitionResolver::with_evaluator(evaluator);
        let publisher: Arc<dyn EventPublisher> =
            self.publisher.unwrap_or_else(|| Arc::new(NoopPublisher));

        let mut machines = BTreeMap::new();
        for (name, source) in self.entries {
            if machines.contains_key(&name) {
                return Err(ConfigError::DuplicateMachine(name));
            }

            let machine = StateMachineBuilder::new()
                .source(source)
                .resolver(resolver.clone())
                .publisher(Arc::clone(&publisher))
                .build()
                .map_err(|source| ConfigError::Machine {
                    name: name.clone(),
                    source: Box::new(source),
                })?;

            tracing::debug!(name = %name, "registered state machine");
            machines.insert(name, machine);
        }

        let registry = StateMachineRegistry::new(machines);
        tracing::info!(
            machines = registry.len(),
            names = ?registry.names(),
            "state machine registry built"
        );
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::InMemoryPublisher;

    const TOGGLE: &str = r#"{
        "states": [{ "state": "OFF", "allowedActions": ["PRESS"] }, { "state": "ON" }],
        "transitions": [{ "type": "SUCCESS", "from": "OFF", "to": "ON" }]
    }"#;

    #[test]
    fn builds_named_machines() {
        let registry = RegistryBuilder::new()
            .json("toggle", TOGGLE)
            .yaml(
                "door",
                "states:\n  - state: OPEN\n  - state: SHUT\n\
                 transitions:\n  - type: SUCCESS\n    from: OPEN\n    to: SHUT\n",
            )
            .build()
            .unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(
            registry.get("toggle").unwrap().next_state_for_success("OFF").unwrap(),
            "ON"
        );
        assert_eq!(
            registry.get("door").unwrap().next_state_for_success("OPEN").unwrap(),
            "SHUT"
        );
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let result = RegistryBuilder::new()
            .json("toggle", TOGGLE)
            .json("toggle", TOGGLE)
            .build();

        assert!(matches!(result, Err(ConfigError::DuplicateMachine(name)) if name == "toggle"));
    }

    #[test]
    fn failing_entry_is_named() {
        let err = RegistryBuilder::new()
            .json("toggle", TOGGLE)
            .json("broken", r#"{ "states": [], "transitions": [
                { "type": "SUCCESS", "from": "X", "to": "Y" }
            ] }"#)
            .build()
            .unwrap_err();

        assert!(err.to_string().starts_with("State machine 'broken' could not be built"));
        assert_eq!(err.violations().len(), 2);
    }

    #[test]
    fn publisher_is_shared() {
        let publisher = Arc::new(InMemoryPublisher::new());
        let registry = RegistryBuilder::new()
            .json("a", TOGGLE)
            .json("b", TOGGLE)
            .publisher(publisher.clone())
            .build()
            .unwrap();

        for name in ["a", "b"] {
            let machine = registry.get(name).unwrap();
            assert!(machine.require_action_allowed("ON", "PRESS").is_err());
        }
        assert_eq!(publisher.len(), 2);
    }

    #[test]
    fn empty_registry_is_allowed() {
        let registry = RegistryBuilder::new().build().unwrap();
        assert!(registry.is_empty());
    }
}
