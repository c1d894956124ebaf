//! Fluent builders for assembling a configuration in code.

use crate::builder::error::BuildError;
use crate::core::{Condition, StateDefinition, StateMachineConfig, Transition, TransitionKind};

/// Builder for a single [`Transition`].
///
/// # Example
///
/// ```
/// use simple_state_machine::builder::TransitionBuilder;
///
/// let review = TransitionBuilder::conditional()
///     .from("PROCESSING")
///     .when("#order.totalAmount > 1000", "REVIEW")
///     .otherwise("APPROVED")
///     .build()
///     .unwrap();
///
/// assert_eq!(review.targets(), vec!["REVIEW", "APPROVED"]);
/// ```
#[derive(Debug, Clone)]
pub struct TransitionBuilder {
    kind: TransitionKind,
    from: Option<String>,
    to: Option<String>,
    conditions: Vec<Condition>,
}

impl TransitionBuilder {
    fn new(kind: TransitionKind) -> Self {
        Self {
            kind,
            from: None,
            to: None,
            conditions: Vec::new(),
        }
    }

    /// Transition taken when the task completed successfully.
    pub fn success() -> Self {
        Self::new(TransitionKind::Success)
    }

    /// Transition taken when the task failed.
    pub fn error() -> Self {
        Self::new(TransitionKind::Error)
    }

    /// Transition whose target is picked by its clauses.
    pub fn conditional() -> Self {
        Self::new(TransitionKind::Conditional)
    }

    /// Set the source state (required).
    pub fn from(mut self, state: impl Into<String>) -> Self {
        self.from = Some(state.into());
        self
    }

    /// Set the target state (required for success and error transitions).
    pub fn to(mut self, state: impl Into<String>) -> Self {
        self.to = Some(state.into());
        self
    }

    /// Add a `when` clause.
    pub fn when(mut self, expression: impl Into<String>, to: impl Into<String>) -> Self {
        self.conditions.push(Condition::when(expression, to));
        self
    }

    /// Add an `else` clause.
    pub fn otherwise(mut self, to: impl Into<String>) -> Self {
        self.conditions.push(Condition::otherwise(to));
        self
    }

    pub fn build(self) -> Result<Transition, BuildError> {
        let from = self.from.ok_or(BuildError::MissingFromState)?;

        match self.kind {
            TransitionKind::Conditional => {
                if self.conditions.is_empty() {
                    return Err(BuildError::NoConditions);
                }
                Ok(Transition::conditional(from, self.conditions))
            }
            TransitionKind::Success | TransitionKind::Error => {
                if !self.conditions.is_empty() {
                    return Err(BuildError::UnexpectedConditions);
                }
                let to = self.to.ok_or(BuildError::MissingToState)?;
                Ok(match self.kind {
                    TransitionKind::Success => Transition::success(from, to),
                    _ => Transition::error(from, to),
                })
            }
        }
    }
}

/// Builder for a [`StateMachineConfig`].
///
/// The result is validated when it is turned into a machine, not here.
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    states: Vec<StateDefinition>,
    transitions: Vec<Transition>,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a state with no allowed actions.
    pub fn state(self, name: impl Into<String>) -> Self {
        self.state_with_actions(name, Vec::<String>::new())
    }

    /// Declare a state and the actions it permits.
    pub fn state_with_actions<I, A>(mut self, name: impl Into<String>, actions: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        self.states.push(StateDefinition::new(name, actions));
        self
    }

    /// Add a transition using a builder.
    /// Returns an error if the builder is incomplete.
    pub fn transition(mut self, builder: TransitionBuilder) -> Result<Self, BuildError> {
        self.transitions.push(builder.build()?);
        Ok(self)
    }

    /// Add a pre-built transition.
    pub fn add_transition(mut self, transition: Transition) -> Self {
        self.transitions.push(transition);
        self
    }

    /// Add multiple transitions at once.
    pub fn transitions(mut self, transitions: impl IntoIterator<Item = Transition>) -> Self {
        self.transitions.extend(transitions);
        self
    }

    pub fn build(self) -> StateMachineConfig {
        StateMachineConfig::new(self.states, self.transitions)
    }
}
