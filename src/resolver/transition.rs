//! Next-state selection across all transitions of an origin state.

use super::conditional::ConditionalResolver;
use crate::core::{CallContext, Transition};
use crate::error::{InvalidState, StateMachineError};
use crate::expression::{ExpressionError, ExpressionEvaluator};
use std::sync::Arc;

/// Chooses the next state from the transitions declared for a state.
///
/// Transitions are tried in declaration order and the first one that yields
/// a destination wins:
/// - `SUCCESS` yields its target when the task succeeded
/// - `ERROR` yields its target when the task failed
/// - `CONDITIONAL` defers to the [`ConditionalResolver`] when the task
///   succeeded
#[derive(Clone, Debug)]
pub struct TransitionResolver {
    conditional: ConditionalResolver,
}

impl TransitionResolver {
    pub fn new(conditional: ConditionalResolver) -> Self {
        Self { conditional }
    }

    pub fn with_evaluator(evaluator: Arc<dyn ExpressionEvaluator>) -> Self {
        Self::new(ConditionalResolver::new(evaluator))
    }

    pub fn evaluator(&self) -> &Arc<dyn ExpressionEvaluator> {
        self.conditional.evaluator()
    }

    /// Resolve the next state from `transitions`, the ordered list declared
    /// for `context.current_state`.
    pub fn resolve<'t>(
        &self,
        context: &CallContext<'_>,
        transitions: &'t [Transition],
    ) -> Result<&'t str, StateMachineError> {
        for transition in transitions {
            if let Some(next) = self.candidate(context, transition)? {
                tracing::debug!(
                    current_state = context.current_state,
                    completed_successfully = context.completed_successfully,
                    next_state = next,
                    kind = %transition.kind(),
                    "resolved next state"
                );
                return Ok(next);
            }
        }

        Err(InvalidState::NoMatchingTransition {
            current: context.current_state.to_string(),
            transitions: transitions.to_vec(),
        }
        .into())
    }

    fn candidate<'t>(
        &self,
        context: &CallContext<'_>,
        transition: &'t Transition,
    ) -> Result<Option<&'t str>, ExpressionError> {
        match transition {
            Transition::Success(t) => Ok(context.completed_successfully.then_some(t.to.as_str())),
            Transition::Error(t) => Ok((!context.completed_successfully).then_some(t.to.as_str())),
            Transition::Conditional(t) if context.completed_successfully => {
                self.conditional.resolve(context, t)
            }
            Transition::Conditional(_) => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Condition, Variables};
    use crate::expression::StandardEvaluator;
    use serde_json::json;

    fn resolver() -> TransitionResolver {
        TransitionResolver::with_evaluator(Arc::new(StandardEvaluator::new()))
    }

    fn processing() -> Vec<Transition> {
        vec![
            Transition::error("PROCESSING", "ERROR_PROCESSING"),
            Transition::conditional(
                "PROCESSING",
                vec![
                    Condition::when("#order.totalAmount > 1000", "REVIEW"),
                    Condition::otherwise("APPROVED"),
                ],
            ),
        ]
    }

    #[test]
    fn success_transition_requires_success() {
        let transitions = vec![Transition::success("CREATED", "PROCESSING")];
        let vars = Variables::new();

        let next = resolver()
            .resolve(&CallContext::success("CREATED", &vars), &transitions)
            .unwrap();
        assert_eq!(next, "PROCESSING");

        let err = resolver()
            .resolve(&CallContext::failure("CREATED", &vars), &transitions)
            .unwrap_err();
        assert!(matches!(
            err,
            StateMachineError::InvalidState(InvalidState::NoMatchingTransition { .. })
        ));
    }

    #[test]
    fn error_transition_requires_failure() {
        let vars = Variables::new();
        let transitions = processing();
        let next = resolver()
            .resolve(&CallContext::failure("PROCESSING", &vars), &transitions)
            .unwrap();
        assert_eq!(next, "ERROR_PROCESSING");
    }

    #[test]
    fn conditional_is_skipped_on_failure() {
        let transitions = vec![Transition::conditional(
            "PROCESSING",
            vec![Condition::otherwise("APPROVED")],
        )];
        let vars = Variables::new();

        let err = resolver()
            .resolve(&CallContext::failure("PROCESSING", &vars), &transitions)
            .unwrap_err();
        assert!(matches!(
            err,
            StateMachineError::InvalidState(InvalidState::NoMatchingTransition { .. })
        ));
    }

    #[test]
    fn conditional_resolves_on_success() {
        let vars = Variables::from([("order".to_string(), json!({ "totalAmount": 1500 }))]);
        let transitions = processing();
        let next = resolver()
            .resolve(&CallContext::success("PROCESSING", &vars), &transitions)
            .unwrap();
        assert_eq!(next, "REVIEW");
    }

    #[test]
    fn earlier_declaration_takes_precedence() {
        let transitions = vec![
            Transition::conditional("S", vec![Condition::otherwise("FROM_CONDITIONAL")]),
            Transition::success("S", "FROM_SUCCESS"),
        ];
        let vars = Variables::new();
        let next = resolver()
            .resolve(&CallContext::success("S", &vars), &transitions)
            .unwrap();
        assert_eq!(next, "FROM_CONDITIONAL");

        let reversed: Vec<_> = transitions.into_iter().rev().collect();
        let next = resolver()
            .resolve(&CallContext::success("S", &vars), &reversed)
            .unwrap();
        assert_eq!(next, "FROM_SUCCESS");
    }

    #[test]
    fn unmatched_conditional_falls_through_to_later_transitions() {
        let transitions = vec![
            Transition::conditional("S", vec![Condition::when("#flag", "FLAGGED")]),
            Transition::success("S", "DEFAULT"),
        ];
        let vars = Variables::from([("flag".to_string(), json!(false))]);
        let next = resolver()
            .resolve(&CallContext::success("S", &vars), &transitions)
            .unwrap();
        assert_eq!(next, "DEFAULT");
    }

    #[test]
    fn no_match_reports_declared_transitions() {
        let transitions = vec![Transition::success("DONE", "ARCHIVED")];
        let vars = Variables::new();
        let err = resolver()
            .resolve(&CallContext::failure("DONE", &vars), &transitions)
            .unwrap_err();

        match err {
            StateMachineError::InvalidState(InvalidState::NoMatchingTransition {
                current,
                transitions: reported,
            }) => {
                assert_eq!(current, "DONE");
                assert_eq!(reported, transitions);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn expression_errors_surface_as_expression_kind() {
        let vars = Variables::new();
        let err = resolver()
            .resolve(&CallContext::success("PROCESSING", &vars), &processing())
            .unwrap_err();
        assert!(matches!(err, StateMachineError::Expression(_)));
    }
}
