//! Boolean predicate evaluation for conditional clauses.
//!
//! The engine depends only on [`ExpressionEvaluator`]: evaluate an
//! expression string against a variable binding and coerce the result to a
//! boolean. [`StandardEvaluator`] is the bundled implementation, a small
//! expression language over `serde_json::Value`:
//!
//! - variables are referenced as `#name`, properties as `.field` (or `?.field`
//!   to yield `null` instead of failing on a `null` target), elements as
//!   `[0]` or `['key']`
//! - comparison: `==`, `!=`, `<`, `<=`, `>`, `>=` (or `eq`, `ne`, `lt`, `le`,
//!   `gt`, `ge`)
//! - logic: `&&`/`and`, `||`/`or`, `!`/`not`
//! - arithmetic: `+`, `-`, `*`, `/`, `%`; `+` concatenates strings
//!
//! # Example
//!
//! ```rust
//! use simple_state_machine::core::Variables;
//! use simple_state_machine::expression::{ExpressionEvaluator, StandardEvaluator};
//! use serde_json::json;
//!
//! let mut variables = Variables::new();
//! variables.insert("order".to_string(), json!({ "totalAmount": 1500 }));
//!
//! let evaluator = StandardEvaluator::new();
//! assert!(evaluator.evaluate("#order.totalAmount > 1000", &variables).unwrap());
//! ```

mod interpreter;
mod lexer;
mod parser;

use crate::core::Variables;
use interpreter::{type_name, Interpreter};
use parser::Node;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use thiserror::Error;

/// Errors raised while parsing or evaluating an expression.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ExpressionError {
    #[error("syntax error in '{expression}' at position {position}: {message}")]
    Syntax {
        expression: String,
        position: usize,
        message: String,
    },

    #[error("unknown variable '#{name}'")]
    UnknownVariable { name: String },

    #[error("property '{property}' not found")]
    UnknownProperty { property: String },

    #[error("index {index} out of bounds for array of length {len}")]
    IndexOutOfBounds { index: i64, len: usize },

    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    #[error("expression '{expression}' evaluated to {actual}, expected a boolean")]
    NotBoolean { expression: String, actual: String },

    #[error("division by zero")]
    DivisionByZero,

    #[error("{0}")]
    Evaluation(String),
}

/// Evaluates boolean predicates against caller-supplied variables.
///
/// Implementations must be pure: the same expression and binding always
/// produce the same result, and the binding is never modified.
///
/// Any `Fn(&str, &Variables) -> Result<bool, ExpressionError>` closure is an
/// evaluator:
///
/// ```rust
/// use simple_state_machine::core::Variables;
/// use simple_state_machine::expression::{ExpressionError, ExpressionEvaluator};
///
/// let flags = |expression: &str, variables: &Variables| -> Result<bool, ExpressionError> {
///     Ok(variables.contains_key(expression))
/// };
///
/// assert!(!flags.evaluate("urgent", &Variables::new()).unwrap());
/// ```
pub trait ExpressionEvaluator: Send + Sync {
    /// Evaluate `expression` with `variables` bound by name.
    fn evaluate(&self, expression: &str, variables: &Variables) -> Result<bool, ExpressionError>;

    /// Check that `expression` is well formed without evaluating it.
    ///
    /// Called once per clause when a machine is built. The default accepts
    /// every expression.
    fn check(&self, _expression: &str) -> Result<(), ExpressionError> {
        Ok(())
    }
}

impl<F> ExpressionEvaluator for F
where
    F: Fn(&str, &Variables) -> Result<bool, ExpressionError> + Send + Sync,
{
    fn evaluate(&self, expression: &str, variables: &Variables) -> Result<bool, ExpressionError> {
        self(expression, variables)
    }
}

/// A parsed expression that can be evaluated repeatedly.
#[derive(Clone, Debug, PartialEq)]
pub struct Expression {
    source: String,
    root: Node,
}

impl Expression {
    pub fn parse(source: &str) -> Result<Self, ExpressionError> {
        Ok(Self {
            source: source.to_string(),
            root: parser::parse(source)?,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Evaluate and require a boolean result.
    pub fn evaluate(&self, variables: &Variables) -> Result<bool, ExpressionError> {
        let value = Interpreter::new(variables).eval(&self.root)?;
        match value.as_ref() {
            serde_json::Value::Bool(b) => Ok(*b),
            other => Err(ExpressionError::NotBoolean {
                expression: self.source.clone(),
                actual: type_name(other).to_string(),
            }),
        }
    }
}

/// Parsed expressions kept per evaluator. Clause expressions come from
/// configuration documents, so the bound is only reached by callers
/// evaluating ad hoc strings, which are then parsed on every call.
const CACHE_CAPACITY: usize = 1024;

/// The bundled expression language.
///
/// Each distinct expression is parsed once: [`check`](ExpressionEvaluator::check)
/// at build time keeps the parse, and [`evaluate`](ExpressionEvaluator::evaluate)
/// reuses it.
#[derive(Debug, Default)]
pub struct StandardEvaluator {
    parsed: RwLock<HashMap<String, Arc<Expression>>>,
}

impl StandardEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of parsed expressions currently held.
    pub fn cached(&self) -> usize {
        self.parsed.read().map(|parsed| parsed.len()).unwrap_or(0)
    }

    fn expression(&self, source: &str) -> Result<Arc<Expression>, ExpressionError> {
        if let Some(expression) = self
            .parsed
            .read()
            .ok()
            .and_then(|parsed| parsed.get(source).cloned())
        {
            return Ok(expression);
        }

        let expression = Arc::new(Expression::parse(source)?);
        // a poisoned lock only costs the cache entry
        if let Ok(mut parsed) = self.parsed.write() {
            if parsed.len() < CACHE_CAPACITY {
                parsed.insert(source.to_string(), Arc::clone(&expression));
            }
        }
        Ok(expression)
    }
}

impl ExpressionEvaluator for StandardEvaluator {
    fn evaluate(&self, expression: &str, variables: &Variables) -> Result<bool, ExpressionError> {
        self.expression(expression)?.evaluate(variables)
    }

    fn check(&self, expression: &str) -> Result<(), ExpressionError> {
        self.expression(expression).map(|_| ())
    }
}
