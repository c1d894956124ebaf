//! Builder for a single state machine.

use super::DocumentSource;
use crate::core::{DocumentFormat, StateMachineConfig};
use crate::error::ConfigError;
use crate::events::{EventPublisher, NoopPublisher};
use crate::expression::{ExpressionEvaluator, StandardEvaluator};
use crate::machine::StateMachine;
use crate::resolver::TransitionResolver;
use std::sync::Arc;

/// Builder for a [`StateMachine`] with a fluent API.
///
/// A document source is required. The evaluator defaults to
/// [`StandardEvaluator`] and the publisher to [`NoopPublisher`].
#[derive(Default)]
pub struct StateMachineBuilder {
    source: Option<DocumentSource>,
    evaluator: Option<Arc<dyn ExpressionEvaluator>>,
    resolver: Option<TransitionResolver>,
    publisher: Option<Arc<dyn EventPublisher>>,
}

impl StateMachineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an already parsed configuration.
    pub fn config(mut self, config: StateMachineConfig) -> Self {
        self.source = Some(DocumentSource::Parsed(config));
        self
    }

    /// Parse a JSON document at build time.
    pub fn json(self, document: impl Into<String>) -> Self {
        self.document(document.into().into_bytes(), DocumentFormat::Json)
    }

    /// Parse a YAML document at build time.
    pub fn yaml(self, document: impl Into<String>) -> Self {
        self.document(document.into().into_bytes(), DocumentFormat::Yaml)
    }

    /// Parse raw document bytes in the given format at build time.
    pub fn document(mut self, bytes: impl Into<Vec<u8>>, format: DocumentFormat) -> Self {
        self.source = Some(DocumentSource::Raw {
            bytes: bytes.into(),
            format,
        });
        self
    }

    /// Evaluator for `when` expressions. Ignored when a resolver is set.
    pub fn evaluator(mut self, evaluator: Arc<dyn ExpressionEvaluator>) -> Self {
        self.evaluator = Some(evaluator);
        self
    }

    /// Share an existing resolver, and with it its evaluator.
    pub fn resolver(mut self, resolver: TransitionResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn publisher(mut self, publisher: Arc<dyn EventPublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    pub(crate) fn source(mut self, source: DocumentSource) -> Self {
        self.source = Some(source);
        self
    }

    /// Parse, validate, and index the configuration.
    pub fn build(self) -> Result<StateMachine, ConfigError> {
        let config = self
            .source
            .ok_or(ConfigError::MissingDefinition)?
            .into_config()?;

        let resolver = match (self.resolver, self.evaluator) {
            (Some(resolver), _) => resolver,
            (None, Some(evaluator)) => TransitionResolver::with_evaluator(evaluator),
            (None, None) => TransitionResolver::with_evaluator(Arc::new(StandardEvaluator::new())),
        };
        let publisher = self
            .publisher
            .unwrap_or_else(|| Arc::new(NoopPublisher));

        StateMachine::new(config, resolver, publisher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{StateDefinition, Transition};
    use crate::events::InMemoryPublisher;
    use crate::expression::ExpressionError;
    use crate::variables;

    const DOCUMENT: &str = r##"{
        "states": [
            { "state": "PENDING" },
            { "state": "AUTHORIZED", "allowedActions": ["CAPTURE"] },
            { "state": "FAILED" }
        ],
        "transitions": [
            { "type": "SUCCESS", "from": "PENDING", "to": "AUTHORIZED" },
            { "type": "ERROR", "from": "PENDING", "to": "FAILED" }
        ]
    }"##;

    #[test]
    fn builder_requires_a_document() {
        let result = StateMachineBuilder::new().build();
        assert!(matches!(result, Err(ConfigError::MissingDefinition)));
    }

    #[test]
    fn builds_from_json_with_defaults() {
        let machine = StateMachineBuilder::new().json(DOCUMENT).build().unwrap();

        assert_eq!(machine.next_state_for_success("PENDING").unwrap(), "AUTHORIZED");
        assert_eq!(machine.next_state_for_error("PENDING").unwrap(), "FAILED");
        assert!(machine.is_action_allowed("AUTHORIZED", "CAPTURE"));
    }

    #[test]
    fn builds_from_yaml() {
        let machine = StateMachineBuilder::new()
            .yaml(
                "states:\n  - state: A\n  - state: B\n\
                 transitions:\n  - type: SUCCESS\n    from: A\n    to: B\n",
            )
            .build()
            .unwrap();

        assert_eq!(machine.next_state_for_success("A").unwrap(), "B");
    }

    #[test]
    fn builds_from_parsed_config() {
        let config = StateMachineConfig::new(
            vec![
                StateDefinition::new("A", Vec::<String>::new()),
                StateDefinition::new("B", Vec::<String>::new()),
            ],
            vec![Transition::error("A", "B")],
        );
        let machine = StateMachineBuilder::new().config(config).build().unwrap();

        assert_eq!(machine.next_state_for_error("A").unwrap(), "B");
    }

    #[test]
    fn parse_errors_surface_from_build() {
        let result = StateMachineBuilder::new().json("{ not json").build();
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn custom_evaluator_drives_conditions() {
        let always = |_: &str, _: &crate::core::Variables| -> Result<bool, ExpressionError> {
            Ok(true)
        };
        let machine = StateMachineBuilder::new()
            .json(
                r#"{
                    "states": [{ "state": "A" }, { "state": "B" }, { "state": "C" }],
                    "transitions": [{ "type": "CONDITIONAL", "from": "A", "conditions": [
                        { "when": "anything goes here", "to": "B" },
                        { "else": "C" }
                    ] }]
                }"#,
            )
            .evaluator(Arc::new(always))
            .build()
            .unwrap();

        assert_eq!(
            machine
                .next_state_for_success_with("A", &variables! {})
                .unwrap(),
            "B"
        );
    }

    #[test]
    fn publisher_receives_violations() {
        let publisher = Arc::new(InMemoryPublisher::new());
        let machine = StateMachineBuilder::new()
            .json(DOCUMENT)
            .publisher(publisher.clone())
            .build()
            .unwrap();

        assert!(machine.require_action_allowed("PENDING", "CAPTURE").is_err());
        assert_eq!(publisher.len(), 1);
    }
}
