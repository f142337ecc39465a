//! Wait-for conditionals over command responses.
//!
//! A conditional is one boolean predicate of the form `<key> <op> <value>`,
//! where the key is a path into the latest response list, e.g.
//! `result[0].name == router` or `result[1] contains ether1`. Evaluation is
//! pure and re-runs from scratch against every fresh response snapshot; a
//! key path that does not resolve simply evaluates to false.

use regex::Regex;
use serde_json::Value;

use crate::error::CommandError;

/// One step of a conditional's key path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Object member access.
    Key(String),
    /// Array element access. The first index selects the response within
    /// the batch result list.
    Index(usize),
}

/// Comparison operator of a conditional.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    Eq,
    Neq,
    Gt,
    Ge,
    Lt,
    Le,
    Contains,
    Matches,
}

impl ComparisonOp {
    fn parse(token: &str) -> Option<Self> {
        let op = match token {
            "eq" | "==" => Self::Eq,
            "neq" | "ne" | "!=" => Self::Neq,
            "gt" | ">" => Self::Gt,
            "ge" | ">=" => Self::Ge,
            "lt" | "<" => Self::Lt,
            "le" | "<=" => Self::Le,
            "contains" => Self::Contains,
            "matches" => Self::Matches,
            _ => return None,
        };
        Some(op)
    }
}

/// A parsed wait-for expression.
///
/// Immutable once parsed; the retry loop removes satisfied conditionals
/// from its pending set and reports the rest by their [`raw`](Self::raw)
/// text on exhaustion.
#[derive(Debug, Clone)]
pub struct Conditional {
    /// The original expression text.
    pub raw: String,

    key_path: Vec<PathSegment>,
    op: ComparisonOp,
    operand: String,
    /// Compiled operand, present when `op` is `Matches`.
    pattern: Option<Regex>,
}

impl Conditional {
    /// Parses `expression` into a conditional.
    ///
    /// Fails with [`CommandError::InvalidConditional`] when the expression
    /// does not have the `<key> <op> <value>` shape, the key does not start
    /// at `result`, or a `matches` operand is not a valid regex.
    pub fn parse(expression: &str) -> Result<Self, CommandError> {
        let invalid = |reason: &str| CommandError::InvalidConditional {
            expression: expression.to_string(),
            reason: reason.to_string(),
        };

        let parts: Vec<&str> = expression.split_whitespace().collect();
        if parts.len() < 3 {
            return Err(invalid("expected `<key> <op> <value>`"));
        }
        let key = parts[0];
        let op_token = parts[1];
        let value = parts[2..].join(" ");
        let value = value.as_str();

        let key_path = parse_key_path(key).map_err(|reason| invalid(&reason))?;
        let op = ComparisonOp::parse(op_token)
            .ok_or_else(|| invalid(&format!("unknown operator `{op_token}`")))?;

        let operand = value
            .strip_prefix('"')
            .and_then(|rest| rest.strip_suffix('"'))
            .unwrap_or(value)
            .to_string();

        let pattern = match op {
            ComparisonOp::Matches => Some(
                Regex::new(&operand)
                    .map_err(|err| invalid(&format!("bad regex operand: {err}")))?,
            ),
            _ => None,
        };

        Ok(Self {
            raw: expression.to_string(),
            key_path,
            op,
            operand,
            pattern,
        })
    }

    /// Evaluates the conditional against a fresh response list.
    pub fn evaluate(&self, responses: &[Value]) -> bool {
        let Some(target) = self.resolve(responses) else {
            return false;
        };

        match self.op {
            ComparisonOp::Eq => loose_eq(target, &self.operand),
            ComparisonOp::Neq => !loose_eq(target, &self.operand),
            ComparisonOp::Gt => numeric_cmp(target, &self.operand, |a, b| a > b),
            ComparisonOp::Ge => numeric_cmp(target, &self.operand, |a, b| a >= b),
            ComparisonOp::Lt => numeric_cmp(target, &self.operand, |a, b| a < b),
            ComparisonOp::Le => numeric_cmp(target, &self.operand, |a, b| a <= b),
            ComparisonOp::Contains => contains(target, &self.operand),
            ComparisonOp::Matches => match &self.pattern {
                Some(pattern) => pattern.is_match(&scalar_text(target)),
                None => false,
            },
        }
    }

    fn resolve<'a>(&self, responses: &'a [Value]) -> Option<&'a Value> {
        let mut segments = self.key_path.iter();

        // The leading index selects a response from the batch list.
        let mut current = match segments.next()? {
            PathSegment::Index(index) => responses.get(*index)?,
            PathSegment::Key(_) => return None,
        };

        for segment in segments {
            current = match segment {
                PathSegment::Key(key) => current.get(key.as_str())?,
                PathSegment::Index(index) => current.get(*index)?,
            };
        }

        Some(current)
    }
}

fn parse_key_path(key: &str) -> Result<Vec<PathSegment>, String> {
    let rest = key
        .strip_prefix("result")
        .ok_or_else(|| format!("key `{key}` must start with `result`"))?;

    let mut segments = Vec::new();
    let mut chars = rest.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '[' => {
                let mut digits = String::new();
                for digit in chars.by_ref() {
                    if digit == ']' {
                        break;
                    }
                    digits.push(digit);
                }
                let index = digits
                    .parse::<usize>()
                    .map_err(|_| format!("bad index `{digits}` in key `{key}`"))?;
                segments.push(PathSegment::Index(index));
            }
            '.' => {
                let mut name = String::new();
                while let Some(next) = chars.peek() {
                    if *next == '.' || *next == '[' {
                        break;
                    }
                    name.push(*next);
                    chars.next();
                }
                if name.is_empty() {
                    return Err(format!("empty segment in key `{key}`"));
                }
                segments.push(PathSegment::Key(name));
            }
            _ => return Err(format!("unexpected `{ch}` in key `{key}`")),
        }
    }

    match segments.first() {
        Some(PathSegment::Index(_)) => Ok(segments),
        _ => Err(format!("key `{key}` must index a response, e.g. `result[0]`")),
    }
}

/// Scalar text form used for string comparison and regex matching.
fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn loose_eq(target: &Value, operand: &str) -> bool {
    if let (Some(lhs), Ok(rhs)) = (as_number(target), operand.parse::<f64>()) {
        return lhs == rhs;
    }
    scalar_text(target) == operand
}

fn numeric_cmp(target: &Value, operand: &str, cmp: impl Fn(f64, f64) -> bool) -> bool {
    match (as_number(target), operand.parse::<f64>()) {
        (Some(lhs), Ok(rhs)) => cmp(lhs, rhs),
        _ => false,
    }
}

fn contains(target: &Value, operand: &str) -> bool {
    match target {
        Value::String(text) => text.contains(operand),
        Value::Array(items) => items.iter().any(|item| loose_eq(item, operand)),
        Value::Object(map) => map.contains_key(operand),
        _ => false,
    }
}
