//! Load-time validation of a configuration document.
//!
//! Every check runs and every violation is reported, so a broken document
//! can be fixed in one pass instead of one error at a time.

use super::config::StateMachineConfig;
use super::transition::{Condition, Transition};
use crate::error::{ConfigError, ConfigViolation};
use crate::expression::ExpressionEvaluator;
use std::collections::HashSet;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

type Check = Validation<(), NonEmptyVec<ConfigViolation>>;

impl StateMachineConfig {
    /// Validate the document, accumulating ALL violations.
    ///
    /// `evaluator` checks the syntax of every `when` expression.
    pub fn validate(&self, evaluator: &dyn ExpressionEvaluator) -> Result<(), ConfigError> {
        let declared: HashSet<&str> = self.states.iter().map(|s| s.name()).collect();

        let mut checks: Vec<Check> = Vec::new();
        checks.extend(self.unique_states());
        checks.extend(self.unique_actions());
        for transition in &self.transitions {
            checks.push(known_source(transition, &declared));
            checks.extend(known_targets(transition, &declared));
            checks.extend(valid_expressions(transition, evaluator));
        }

        self.warn_on_smells();

        match Validation::all_vec(checks) {
            Validation::Success(_) => Ok(()),
            Validation::Failure(violations) => Err(ConfigError::Invalid(
                violations.iter().cloned().collect(),
            )),
        }
    }

    fn unique_states(&self) -> Vec<Check> {
        let mut seen = HashSet::new();
        let mut reported = HashSet::new();
        self.states
            .iter()
            .filter(|s| !seen.insert(s.name()) && reported.insert(s.name()))
            .map(|s| {
                Validation::fail(ConfigViolation::DuplicateState {
                    state: s.state.clone(),
                })
            })
            .collect()
    }

    fn unique_actions(&self) -> Vec<Check> {
        let mut checks = Vec::new();
        for state in &self.states {
            let mut seen = HashSet::new();
            let mut reported = HashSet::new();
            for action in &state.allowed_actions {
                if !seen.insert(action.as_str()) && reported.insert(action.as_str()) {
                    checks.push(Validation::fail(ConfigViolation::DuplicateAction {
                        state: state.state.clone(),
                        action: action.clone(),
                    }));
                }
            }
        }
        checks
    }

    fn warn_on_smells(&self) {
        for transition in &self.transitions {
            let Transition::Conditional(conditional) = transition else {
                continue;
            };
            if conditional.conditions().is_empty() {
                tracing::warn!(
                    from = %conditional.from,
                    "conditional transition has no clauses and never matches"
                );
            }
            if conditional.fallback_count() > 1 {
                tracing::warn!(
                    from = %conditional.from,
                    else_clauses = conditional.fallback_count(),
                    "only the first else clause of a conditional transition is reachable"
                );
            }
        }
    }
}

fn known_source(transition: &Transition, declared: &HashSet<&str>) -> Check {
    if declared.contains(transition.origin()) {
        Validation::success(())
    } else {
        Validation::fail(ConfigViolation::UnknownSourceState {
            from: transition.origin().to_string(),
            kind: transition.kind(),
        })
    }
}

fn known_targets(transition: &Transition, declared: &HashSet<&str>) -> Vec<Check> {
    transition
        .targets()
        .into_iter()
        .filter(|to| !declared.contains(to))
        .map(|to| {
            Validation::fail(ConfigViolation::UnknownTargetState {
                from: transition.origin().to_string(),
                to: to.to_string(),
            })
        })
        .collect()
}

fn valid_expressions(transition: &Transition, evaluator: &dyn ExpressionEvaluator) -> Vec<Check> {
    let Transition::Conditional(conditional) = transition else {
        return Vec::new();
    };
    conditional
        .conditions()
        .iter()
        .filter_map(|condition| match condition {
            Condition::When { when, .. } => evaluator.check(when).err().map(|e| {
                Validation::fail(ConfigViolation::InvalidExpression {
                    from: conditional.from.clone(),
                    expression: when.clone(),
                    reason: e.to_string(),
                })
            }),
            Condition::Else { .. } => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{StateDefinition, TransitionKind};
    use crate::expression::StandardEvaluator;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    fn states(names: &[&str]) -> Vec<StateDefinition> {
        names
            .iter()
            .map(|n| StateDefinition::new(*n, Vec::<String>::new()))
            .collect()
    }

    #[test]
    fn valid_document_passes() {
        let config = StateMachineConfig::new(
            states(&["CREATED", "PROCESSING", "REVIEW", "APPROVED"]),
            vec![
                Transition::success("CREATED", "PROCESSING"),
                Transition::conditional(
                    "PROCESSING",
                    vec![
                        Condition::when("#order.totalAmount > 1000", "REVIEW"),
                        Condition::otherwise("APPROVED"),
                    ],
                ),
            ],
        );

        assert!(config.validate(&StandardEvaluator::new()).is_ok());
    }

    #[test]
    fn accumulates_all_violations() {
        let mut declared = states(&["A", "A", "B"]);
        declared[2].allowed_actions = vec!["GO".into(), "GO".into()];
        let config = StateMachineConfig::new(
            declared,
            vec![
                Transition::success("GHOST", "B"),
                Transition::error("A", "NOWHERE"),
                Transition::conditional("B", vec![Condition::when("#x >", "A")]),
            ],
        );

        let err = config.validate(&StandardEvaluator::new()).unwrap_err();
        let violations = err.violations();

        assert_eq!(violations.len(), 5);
        assert!(violations.contains(&ConfigViolation::DuplicateState { state: "A".into() }));
        assert!(violations.contains(&ConfigViolation::DuplicateAction {
            state: "B".into(),
            action: "GO".into(),
        }));
        assert!(violations.contains(&ConfigViolation::UnknownSourceState {
            from: "GHOST".into(),
            kind: TransitionKind::Success,
        }));
        assert!(violations.contains(&ConfigViolation::UnknownTargetState {
            from: "A".into(),
            to: "NOWHERE".into(),
        }));
        assert!(violations
            .iter()
            .any(|v| matches!(v, ConfigViolation::InvalidExpression { from, .. } if from == "B")));
    }

    #[test]
    fn each_duplicate_is_reported_once() {
        let config = StateMachineConfig::new(states(&["A", "A", "A"]), Vec::new());
        let err = config.validate(&StandardEvaluator::new()).unwrap_err();
        assert_eq!(err.violations().len(), 1);
    }

    #[test]
    fn clause_targets_are_checked() {
        let config = StateMachineConfig::new(
            states(&["A"]),
            vec![Transition::conditional(
                "A",
                vec![Condition::when("true", "B"), Condition::otherwise("C")],
            )],
        );

        let err = config.validate(&StandardEvaluator::new()).unwrap_err();
        assert_eq!(err.violations().len(), 2);
    }

    #[test]
    fn custom_evaluator_default_check_accepts_anything() {
        let evaluator = |_: &str,
                         _: &crate::core::Variables|
         -> Result<bool, crate::expression::ExpressionError> { Ok(true) };
        let config = StateMachineConfig::new(
            states(&["A", "B"]),
            vec![Transition::conditional("A", vec![Condition::when("((", "B")])],
        );

        assert!(config.validate(&evaluator).is_ok());
    }

    #[test]
    fn smells_are_logged_but_accepted() {
        let config = StateMachineConfig::new(
            states(&["A", "B", "C"]),
            vec![
                Transition::conditional("A", Vec::new()),
                Transition::conditional(
                    "B",
                    vec![Condition::otherwise("A"), Condition::otherwise("C")],
                ),
            ],
        );
        let logs = Captured::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        let result = tracing::subscriber::with_default(subscriber, || {
            config.validate(&StandardEvaluator::new())
        });

        assert!(result.is_ok());
        let text = logs.text();
        assert!(text.contains("WARN"));
        assert!(text.contains("conditional transition has no clauses and never matches"));
        assert!(text.contains("only the first else clause of a conditional transition is reachable"));
    }

    #[test]
    fn overly_deep_expressions_are_rejected_at_load() {
        let chain = vec!["#n > 0"; 20_000].join(" && ");
        let parens = format!("{}true{}", "(".repeat(5_000), ")".repeat(5_000));
        let config = StateMachineConfig::new(
            states(&["A", "B", "C"]),
            vec![Transition::conditional(
                "A",
                vec![Condition::when(chain, "B"), Condition::when(parens, "C")],
            )],
        );

        let err = config.validate(&StandardEvaluator::new()).unwrap_err();

        assert_eq!(err.violations().len(), 2);
        assert!(err.violations().iter().all(|v| matches!(
            v,
            ConfigViolation::InvalidExpression { from, reason, .. }
                if from == "A" && reason.contains("expression nested too deeply")
        )));
    }
}
