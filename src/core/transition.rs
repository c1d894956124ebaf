//! Transition rules and conditional clauses.
//!
//! Transitions are a tagged sum over three kinds. The `type` field of the
//! document drives deserialization; clauses inside a conditional transition
//! are told apart by which properties they carry.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind tag of a [`Transition`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransitionKind {
    Success,
    Error,
    Conditional,
}

impl fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Self::Success => "SUCCESS",
            Self::Error => "ERROR",
            Self::Conditional => "CONDITIONAL",
        };
        f.write_str(tag)
    }
}

/// A rule yielding the next state for an origin state and task outcome.
///
/// # Example
///
/// ```rust
/// use simple_state_machine::core::{Transition, TransitionKind};
///
/// let json = r#"{ "type": "SUCCESS", "from": "CREATED", "to": "PROCESSING" }"#;
/// let transition: Transition = serde_json::from_str(json).unwrap();
///
/// assert_eq!(transition, Transition::success("CREATED", "PROCESSING"));
/// assert_eq!(transition.kind(), TransitionKind::Success);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Transition {
    /// Taken when the preceding task succeeded.
    #[serde(rename = "SUCCESS")]
    Success(DirectTransition),

    /// Taken when the preceding task failed.
    #[serde(rename = "ERROR")]
    Error(DirectTransition),

    /// Chooses among clauses when the preceding task succeeded.
    #[serde(rename = "CONDITIONAL")]
    Conditional(ConditionalTransition),
}

impl Transition {
    pub fn success(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::Success(DirectTransition::new(from, to))
    }

    pub fn error(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::Error(DirectTransition::new(from, to))
    }

    pub fn conditional(from: impl Into<String>, conditions: Vec<Condition>) -> Self {
        Self::Conditional(ConditionalTransition::new(from, conditions))
    }

    /// Origin state this transition is declared for.
    pub fn origin(&self) -> &str {
        match self {
            Self::Success(t) | Self::Error(t) => &t.from,
            Self::Conditional(t) => &t.from,
        }
    }

    pub fn kind(&self) -> TransitionKind {
        match self {
            Self::Success(_) => TransitionKind::Success,
            Self::Error(_) => TransitionKind::Error,
            Self::Conditional(_) => TransitionKind::Conditional,
        }
    }

    /// Every destination this transition can produce, in evaluation order.
    pub fn targets(&self) -> Vec<&str> {
        match self {
            Self::Success(t) | Self::Error(t) => vec![t.to.as_str()],
            Self::Conditional(t) => t.conditions().iter().map(Condition::target).collect(),
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success(t) | Self::Error(t) => {
                write!(f, "{} {} -> {}", self.kind(), t.from, t.to)
            }
            Self::Conditional(t) => {
                write!(f, "{} {} [", self.kind(), t.from)?;
                for (i, condition) in t.conditions().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{condition}")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// Unconditional edge used by both success and error transitions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectTransition {
    pub from: String,
    pub to: String,
}

impl DirectTransition {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Ordered list of guarded clauses with an optional fallback.
///
/// Clauses are kept in canonical order: every `when` clause precedes every
/// `else` clause, and clauses of equal priority keep their declared order.
/// The order is fixed on construction so evaluation never re-sorts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ConditionalDocument")]
pub struct ConditionalTransition {
    pub from: String,
    conditions: Vec<Condition>,
}

impl ConditionalTransition {
    pub fn new(from: impl Into<String>, mut conditions: Vec<Condition>) -> Self {
        // sort_by_key is stable
        conditions.sort_by_key(Condition::priority);
        Self {
            from: from.into(),
            conditions,
        }
    }

    /// Clauses in evaluation order.
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Number of `else` clauses; anything past the first is unreachable.
    pub fn fallback_count(&self) -> usize {
        self.conditions
            .iter()
            .filter(|c| matches!(c, Condition::Else { .. }))
            .count()
    }
}

#[derive(Deserialize)]
struct ConditionalDocument {
    from: String,
    #[serde(default)]
    conditions: Vec<Condition>,
}

impl From<ConditionalDocument> for ConditionalTransition {
    fn from(doc: ConditionalDocument) -> Self {
        Self::new(doc.from, doc.conditions)
    }
}

/// A clause of a conditional transition.
///
/// In documents a clause is `{ "when": "<expr>", "to": "<state>" }` or
/// `{ "else": "<state>" }`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ConditionDocument", into = "ConditionDocument")]
pub enum Condition {
    /// Selected when `when` evaluates to true.
    When { when: String, to: String },

    /// Selected unconditionally once every `when` clause has been tried.
    Else { to: String },
}

impl Condition {
    pub fn when(expression: impl Into<String>, to: impl Into<String>) -> Self {
        Self::When {
            when: expression.into(),
            to: to.into(),
        }
    }

    pub fn otherwise(to: impl Into<String>) -> Self {
        Self::Else { to: to.into() }
    }

    /// Evaluation priority; lower runs first.
    pub fn priority(&self) -> u8 {
        match self {
            Self::When { .. } => 1,
            Self::Else { .. } => 2,
        }
    }

    pub fn target(&self) -> &str {
        match self {
            Self::When { to, .. } | Self::Else { to } => to,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::When { when, to } => write!(f, "when '{when}' -> {to}"),
            Self::Else { to } => write!(f, "else -> {to}"),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
struct ConditionDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    when: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    to: Option<String>,
    #[serde(rename = "else", default, skip_serializing_if = "Option::is_none")]
    otherwise: Option<String>,
}

impl TryFrom<ConditionDocument> for Condition {
    type Error = String;

    fn try_from(doc: ConditionDocument) -> Result<Self, Self::Error> {
        match (doc.when, doc.to, doc.otherwise) {
            (Some(when), Some(to), None) => Ok(Self::When { when, to }),
            (None, None, Some(to)) => Ok(Self::Else { to }),
            (Some(_), None, None) => Err("`when` clause is missing its `to` state".to_string()),
            (Some(_), _, Some(_)) => {
                Err("condition clause cannot declare both `when` and `else`".to_string())
            }
            (None, Some(_), _) => Err("`to` is only valid together with `when`".to_string()),
            (None, None, None) => {
                Err("condition clause must declare `when` with `to`, or `else`".to_string())
            }
        }
    }
}

impl From<Condition> for ConditionDocument {
    fn from(condition: Condition) -> Self {
        match condition {
            Condition::When { when, to } => Self {
                when: Some(when),
                to: Some(to),
                otherwise: None,
            },
            Condition::Else { to } => Self {
                when: None,
                to: None,
                otherwise: Some(to),
            },
        }
    }
}
