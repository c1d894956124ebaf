//! Tree-walking interpreter over `serde_json::Value` bindings.

use super::parser::{BinaryOp, Node, UnaryOp};
use super::ExpressionError;
use crate::core::Variables;
use serde_json::{Number, Value};
use std::borrow::Cow;
use std::cmp::Ordering;

pub(crate) struct Interpreter<'v> {
    variables: &'v Variables,
}

impl<'v> Interpreter<'v> {
    pub fn new(variables: &'v Variables) -> Self {
        Self { variables }
    }

    pub fn eval(&self, node: &Node) -> Result<Cow<'v, Value>, ExpressionError> {
        match node {
            Node::Literal(value) => Ok(Cow::Owned(value.clone())),
            Node::Variable(name) => self
                .variables
                .get(name)
                .map(Cow::Borrowed)
                .ok_or_else(|| ExpressionError::UnknownVariable { name: name.clone() }),
            Node::Property {
                target,
                name,
                null_safe,
            } => {
                let target = self.eval(target)?;
                property(target, name, *null_safe)
            }
            Node::Index { target, index } => {
                let target = self.eval(target)?;
                let index = self.eval(index)?;
                element(target, &index)
            }
            Node::Unary { op, operand } => {
                let value = self.eval(operand)?;
                unary(*op, &value).map(Cow::Owned)
            }
            Node::Binary { op, lhs, rhs } => self.binary(*op, lhs, rhs).map(Cow::Owned),
        }
    }

    fn binary(&self, op: BinaryOp, lhs: &Node, rhs: &Node) -> Result<Value, ExpressionError> {
        match op {
            BinaryOp::And => {
                if !self.boolean(lhs, "and")? {
                    return Ok(Value::Bool(false));
                }
                self.boolean(rhs, "and").map(Value::Bool)
            }
            BinaryOp::Or => {
                if self.boolean(lhs, "or")? {
                    return Ok(Value::Bool(true));
                }
                self.boolean(rhs, "or").map(Value::Bool)
            }
            _ => {
                let a = self.eval(lhs)?;
                let b = self.eval(rhs)?;
                apply(op, &a, &b)
            }
        }
    }

    fn boolean(&self, node: &Node, operator: &str) -> Result<bool, ExpressionError> {
        match self.eval(node)?.as_ref() {
            Value::Bool(b) => Ok(*b),
            other => Err(ExpressionError::TypeMismatch(format!(
                "'{operator}' requires boolean operands, found {}",
                type_name(other)
            ))),
        }
    }
}

fn property<'v>(
    target: Cow<'v, Value>,
    name: &str,
    null_safe: bool,
) -> Result<Cow<'v, Value>, ExpressionError> {
    let missing = || ExpressionError::UnknownProperty {
        property: name.to_string(),
    };
    match target {
        Cow::Borrowed(Value::Object(map)) => map.get(name).map(Cow::Borrowed).ok_or_else(missing),
        Cow::Owned(Value::Object(mut map)) => map.remove(name).map(Cow::Owned).ok_or_else(missing),
        Cow::Borrowed(Value::Null) | Cow::Owned(Value::Null) if null_safe => {
            Ok(Cow::Owned(Value::Null))
        }
        other => Err(ExpressionError::TypeMismatch(format!(
            "cannot read property '{name}' of {}",
            type_name(&other)
        ))),
    }
}

fn element<'v>(target: Cow<'v, Value>, index: &Value) -> Result<Cow<'v, Value>, ExpressionError> {
    match (target, index) {
        (Cow::Borrowed(Value::Array(items)), Value::Number(n)) => {
            let i = array_index(n, items.len())?;
            Ok(Cow::Borrowed(&items[i]))
        }
        (Cow::Owned(Value::Array(mut items)), Value::Number(n)) => {
            let i = array_index(n, items.len())?;
            Ok(Cow::Owned(items.swap_remove(i)))
        }
        (target, Value::String(key)) if target.is_object() => property(target, key, false),
        (target, index) => Err(ExpressionError::TypeMismatch(format!(
            "cannot index {} with {}",
            type_name(&target),
            type_name(index)
        ))),
    }
}

fn array_index(n: &Number, len: usize) -> Result<usize, ExpressionError> {
    let index = n.as_i64().ok_or_else(|| {
        ExpressionError::TypeMismatch(format!("array index must be an integer, found {n}"))
    })?;
    usize::try_from(index)
        .ok()
        .filter(|i| *i < len)
        .ok_or(ExpressionError::IndexOutOfBounds { index, len })
}

fn unary(op: UnaryOp, value: &Value) -> Result<Value, ExpressionError> {
    match (op, value) {
        (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
        (UnaryOp::Negate, Value::Number(n)) => match Numeric::of(n) {
            Numeric::Int(i) => match i.checked_neg() {
                Some(v) => Ok(Value::from(v)),
                None => float(-(i as f64)),
            },
            Numeric::Float(f) => float(-f),
        },
        (UnaryOp::Not, other) => Err(ExpressionError::TypeMismatch(format!(
            "'not' requires a boolean operand, found {}",
            type_name(other)
        ))),
        (UnaryOp::Negate, other) => Err(ExpressionError::TypeMismatch(format!(
            "cannot negate {}",
            type_name(other)
        ))),
    }
}

fn apply(op: BinaryOp, a: &Value, b: &Value) -> Result<Value, ExpressionError> {
    match op {
        BinaryOp::Eq => Ok(Value::Bool(loosely_equal(a, b))),
        BinaryOp::Ne => Ok(Value::Bool(!loosely_equal(a, b))),
        BinaryOp::Lt => compare(a, b).map(|o| Value::Bool(o == Ordering::Less)),
        BinaryOp::Le => compare(a, b).map(|o| Value::Bool(o != Ordering::Greater)),
        BinaryOp::Gt => compare(a, b).map(|o| Value::Bool(o == Ordering::Greater)),
        BinaryOp::Ge => compare(a, b).map(|o| Value::Bool(o != Ordering::Less)),
        BinaryOp::Add => match (a, b) {
            (Value::String(x), y) => Ok(Value::String(format!("{x}{}", display(y)))),
            (x, Value::String(y)) => Ok(Value::String(format!("{}{y}", display(x)))),
            _ => arithmetic(op, a, b),
        },
        BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => arithmetic(op, a, b),
        BinaryOp::And | BinaryOp::Or => Err(ExpressionError::Evaluation(format!(
            "{op:?} must be evaluated with short-circuiting"
        ))),
    }
}

#[derive(Clone, Copy)]
enum Numeric {
    Int(i64),
    Float(f64),
}

impl Numeric {
    fn of(n: &Number) -> Self {
        match n.as_i64() {
            Some(i) => Self::Int(i),
            None => Self::Float(n.as_f64().unwrap_or(f64::NAN)),
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Self::Int(i) => i as f64,
            Self::Float(f) => f,
        }
    }
}

fn numbers(a: &Value, b: &Value) -> Option<(Numeric, Numeric)> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => Some((Numeric::of(x), Numeric::of(y))),
        _ => None,
    }
}

/// Structural equality where numbers compare by value at any depth, so
/// `[1] == [1.0]` holds.
fn loosely_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (Numeric::of(x), Numeric::of(y)) {
            (Numeric::Int(x), Numeric::Int(y)) => x == y,
            (x, y) => x.as_f64() == y.as_f64(),
        },
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| loosely_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(key, x)| ys.get(key).is_some_and(|y| loosely_equal(x, y)))
        }
        _ => a == b,
    }
}

fn compare(a: &Value, b: &Value) -> Result<Ordering, ExpressionError> {
    if let Some(pair) = numbers(a, b) {
        let ordering = match pair {
            (Numeric::Int(x), Numeric::Int(y)) => Some(x.cmp(&y)),
            (x, y) => x.as_f64().partial_cmp(&y.as_f64()),
        };
        return ordering.ok_or_else(|| ExpressionError::TypeMismatch("NaN is not ordered".into()));
    }
    match (a, b) {
        (Value::String(x), Value::String(y)) => Ok(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Ok(x.cmp(y)),
        _ => Err(ExpressionError::TypeMismatch(format!(
            "cannot compare {} with {}",
            type_name(a),
            type_name(b)
        ))),
    }
}

fn arithmetic(op: BinaryOp, a: &Value, b: &Value) -> Result<Value, ExpressionError> {
    let Some((x, y)) = numbers(a, b) else {
        return Err(ExpressionError::TypeMismatch(format!(
            "arithmetic requires numbers, found {} and {}",
            type_name(a),
            type_name(b)
        )));
    };

    if let (Numeric::Int(x), Numeric::Int(y)) = (x, y) {
        let exact = match op {
            BinaryOp::Add => x.checked_add(y),
            BinaryOp::Sub => x.checked_sub(y),
            BinaryOp::Mul => x.checked_mul(y),
            BinaryOp::Div | BinaryOp::Rem if y == 0 => {
                return Err(ExpressionError::DivisionByZero)
            }
            BinaryOp::Div => x.checked_div(y),
            BinaryOp::Rem => x.checked_rem(y),
            _ => None,
        };
        if let Some(v) = exact {
            return Ok(Value::from(v));
        }
    }

    let (x, y) = (x.as_f64(), y.as_f64());
    match op {
        BinaryOp::Add => float(x + y),
        BinaryOp::Sub => float(x - y),
        BinaryOp::Mul => float(x * y),
        BinaryOp::Div | BinaryOp::Rem if y == 0.0 => Err(ExpressionError::DivisionByZero),
        BinaryOp::Div => float(x / y),
        BinaryOp::Rem => float(x % y),
        _ => Err(ExpressionError::Evaluation(format!(
            "{op:?} is not an arithmetic operator"
        ))),
    }
}

fn float(value: f64) -> Result<Value, ExpressionError> {
    Number::from_f64(value)
        .map(Value::Number)
        .ok_or_else(|| ExpressionError::Evaluation(format!("result {value} is not finite")))
}

fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
