//! Clause selection for conditional transitions.

use crate::core::{CallContext, Condition, ConditionalTransition};
use crate::expression::{ExpressionError, ExpressionEvaluator};
use std::fmt;
use std::sync::Arc;

/// Picks the destination of a conditional transition.
///
/// Clauses are tried in canonical order (`when` before `else`, declared
/// order within each group). The first `when` whose expression is true wins;
/// otherwise the first `else` does.
#[derive(Clone)]
pub struct ConditionalResolver {
    evaluator: Arc<dyn ExpressionEvaluator>,
}

impl ConditionalResolver {
    pub fn new(evaluator: Arc<dyn ExpressionEvaluator>) -> Self {
        Self { evaluator }
    }

    pub fn evaluator(&self) -> &Arc<dyn ExpressionEvaluator> {
        &self.evaluator
    }

    /// Destination chosen for `context`, or `None` when no clause selects.
    ///
    /// A failed task never selects a conditional destination. Expression
    /// errors propagate; later clauses are not tried.
    pub fn resolve<'t>(
        &self,
        context: &CallContext<'_>,
        transition: &'t ConditionalTransition,
    ) -> Result<Option<&'t str>, ExpressionError> {
        if !context.completed_successfully {
            return Ok(None);
        }

        for condition in transition.conditions() {
            let selected = match condition {
                Condition::When { when, .. } => self.evaluator.evaluate(when, context.variables)?,
                Condition::Else { .. } => true,
            };
            if selected {
                tracing::debug!(
                    current_state = context.current_state,
                    clause = %condition,
                    "conditional clause selected"
                );
                return Ok(Some(condition.target()));
            }
        }

        Ok(None)
    }
}

impl fmt::Debug for ConditionalResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConditionalResolver").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Variables;
    use crate::expression::StandardEvaluator;
    use serde_json::json;
    use std::sync::Mutex;

    fn resolver() -> ConditionalResolver {
        ConditionalResolver::new(Arc::new(StandardEvaluator::new()))
    }

    fn order(total: i64) -> Variables {
        Variables::from([("order".to_string(), json!({ "totalAmount": total }))])
    }

    fn review_or_approve() -> ConditionalTransition {
        ConditionalTransition::new(
            "PROCESSING",
            vec![
                Condition::when("#order.totalAmount > 1000", "REVIEW"),
                Condition::otherwise("APPROVED"),
            ],
        )
    }

    #[test]
    fn first_true_when_clause_wins() {
        let vars = order(1500);
        let ctx = CallContext::success("PROCESSING", &vars);
        assert_eq!(resolver().resolve(&ctx, &review_or_approve()).unwrap(), Some("REVIEW"));
    }

    #[test]
    fn else_clause_is_the_fallback() {
        let vars = order(500);
        let ctx = CallContext::success("PROCESSING", &vars);
        assert_eq!(resolver().resolve(&ctx, &review_or_approve()).unwrap(), Some("APPROVED"));
    }

    #[test]
    fn failed_task_selects_nothing() {
        let vars = order(1500);
        let ctx = CallContext::failure("PROCESSING", &vars);
        assert_eq!(resolver().resolve(&ctx, &review_or_approve()).unwrap(), None);
    }

    #[test]
    fn no_matching_clause_without_else() {
        let transition = ConditionalTransition::new(
            "PROCESSING",
            vec![Condition::when("#order.totalAmount > 1000", "REVIEW")],
        );
        let vars = order(10);
        let ctx = CallContext::success("PROCESSING", &vars);
        assert_eq!(resolver().resolve(&ctx, &transition).unwrap(), None);
    }

    #[test]
    fn else_declared_first_is_still_tried_last() {
        let transition = ConditionalTransition::new(
            "S",
            vec![
                Condition::otherwise("FALLBACK"),
                Condition::when("#n > 1", "BIG"),
                Condition::when("#n > 0", "POSITIVE"),
            ],
        );
        let big = Variables::from([("n".to_string(), json!(5))]);
        let one = Variables::from([("n".to_string(), json!(1))]);
        let zero = Variables::from([("n".to_string(), json!(0))]);

        let r = resolver();
        assert_eq!(r.resolve(&CallContext::success("S", &big), &transition).unwrap(), Some("BIG"));
        assert_eq!(r.resolve(&CallContext::success("S", &one), &transition).unwrap(), Some("POSITIVE"));
        assert_eq!(r.resolve(&CallContext::success("S", &zero), &transition).unwrap(), Some("FALLBACK"));
    }

    #[test]
    fn expression_errors_propagate() {
        let vars = Variables::new();
        let ctx = CallContext::success("PROCESSING", &vars);
        let err = resolver().resolve(&ctx, &review_or_approve()).unwrap_err();
        assert_eq!(err, ExpressionError::UnknownVariable { name: "order".into() });
    }

    #[test]
    fn evaluation_stops_at_first_selected_clause() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&seen);
        let evaluator = move |expression: &str, _: &Variables| -> Result<bool, ExpressionError> {
            log.lock().unwrap().push(expression.to_string());
            Ok(expression == "second")
        };
        let transition = ConditionalTransition::new(
            "S",
            vec![
                Condition::when("first", "A"),
                Condition::when("second", "B"),
                Condition::when("third", "C"),
            ],
        );

        let vars = Variables::new();
        let resolved = ConditionalResolver::new(Arc::new(evaluator))
            .resolve(&CallContext::success("S", &vars), &transition)
            .unwrap();

        assert_eq!(resolved, Some("B"));
        assert_eq!(*seen.lock().unwrap(), vec!["first".to_string(), "second".to_string()]);
    }
}
