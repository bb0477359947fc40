//! # Selector Predicate Language
//!
//! A JSON predicate over stored records, in the style of document-store
//! selectors:
//!
//! ```json
//! {"selector": {"status": "InTransit", "manufactureDate": {"$gte": "2026-01-01T00:00:00.000000Z"}}}
//! ```
//!
//! The `{"selector": ...}` envelope is optional. Sibling clauses are
//! conjoined. Field names may be dot paths, and a nested object without
//! operators addresses nested fields (`{"a": {"b": 1}}` means `a.b == 1`).
//!
//! ## Operators
//!
//! `$eq $ne $gt $gte $lt $lte $in $exists`, combinators `$and $or`.
//! Ordering operators compare numbers numerically and strings
//! lexicographically. Mixed types never order. `$ne` requires the field to
//! be present.

use serde_json::{Map, Value};
use thiserror::Error;

/// Rejected selector input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    /// The text is not JSON.
    #[error("selector is not valid JSON: {0}")]
    Json(String),

    /// A selector or combinator operand is not an object.
    #[error("expected a JSON object, got {fragment}")]
    NotAnObject {
        /// The offending fragment.
        fragment: String,
    },

    /// An operator outside the supported set.
    #[error("unsupported selector operator {operator:?}")]
    UnknownOperator {
        /// The operator as written.
        operator: String,
    },

    /// An operator was given an operand of the wrong shape.
    #[error("invalid operand for {operator}: {fragment}")]
    InvalidOperand {
        /// The operator.
        operator: String,
        /// The offending operand.
        fragment: String,
    },

    /// A field condition mixes operators and nested field names.
    #[error("condition on {field:?} mixes operators and field names")]
    MixedCondition {
        /// The field path.
        field: String,
    },

    /// The envelope carries keys other than `selector`.
    #[error("unsupported query option {option:?}")]
    UnsupportedOption {
        /// The extra envelope key.
        option: String,
    },
}

/// A single-field condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Field equals the value.
    Eq(Value),
    /// Field is present and differs from the value.
    Ne(Value),
    /// Field orders strictly after the value.
    Gt(Value),
    /// Field orders after or equal to the value.
    Gte(Value),
    /// Field orders strictly before the value.
    Lt(Value),
    /// Field orders before or equal to the value.
    Lte(Value),
    /// Field equals one of the values.
    In(Vec<Value>),
    /// Field presence.
    Exists(bool),
}

/// A parsed predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    /// All sub-selectors hold. Empty matches everything.
    And(Vec<Selector>),
    /// Some sub-selector holds.
    Or(Vec<Selector>),
    /// A condition on the field at a dot path.
    Field {
        /// Path segments.
        path: Vec<String>,
        /// Condition on the value found there.
        condition: Condition,
    },
}

impl Selector {
    /// Matches every record.
    pub fn all() -> Self {
        Self::And(Vec::new())
    }

    /// A condition on a dot-path field.
    pub fn field(path: &str, condition: Condition) -> Self {
        Self::Field {
            path: split_path(path),
            condition,
        }
    }

    /// Shorthand for an equality condition.
    pub fn field_eq(path: &str, value: impl Into<Value>) -> Self {
        Self::field(path, Condition::Eq(value.into()))
    }

    /// Parse selector text.
    pub fn parse(text: &str) -> Result<Self, SelectorError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| SelectorError::Json(e.to_string()))?;
        Self::from_value(&value)
    }

    /// Parse an already-decoded selector, with or without the envelope.
    pub fn from_value(value: &Value) -> Result<Self, SelectorError> {
        let object = as_object(value)?;
        match object.get("selector") {
            Some(inner) => {
                if let Some(extra) = object.keys().find(|k| k.as_str() != "selector") {
                    return Err(SelectorError::UnsupportedOption {
                        option: extra.clone(),
                    });
                }
                parse_clauses(as_object(inner)?, &[])
            }
            None => parse_clauses(object, &[]),
        }
    }

    /// Evaluate against a JSON document.
    pub fn matches(&self, doc: &Value) -> bool {
        match self {
            Self::And(parts) => parts.iter().all(|s| s.matches(doc)),
            Self::Or(parts) => parts.iter().any(|s| s.matches(doc)),
            Self::Field { path, condition } => condition.holds(lookup(doc, path)),
        }
    }
}

impl Condition {
    fn holds(&self, found: Option<&Value>) -> bool {
        match (self, found) {
            (Self::Exists(want), found) => found.is_some() == *want,
            (_, None) => false,
            (Self::Eq(v), Some(f)) => values_equal(f, v),
            (Self::Ne(v), Some(f)) => !values_equal(f, v),
            (Self::Gt(v), Some(f)) => order(f, v).is_some_and(|o| o.is_gt()),
            (Self::Gte(v), Some(f)) => order(f, v).is_some_and(|o| o.is_ge()),
            (Self::Lt(v), Some(f)) => order(f, v).is_some_and(|o| o.is_lt()),
            (Self::Lte(v), Some(f)) => order(f, v).is_some_and(|o| o.is_le()),
            (Self::In(vs), Some(f)) => vs.iter().any(|v| values_equal(f, v)),
        }
    }
}

// ─── Parsing ─────────────────────────────────────────────────────────

fn as_object(value: &Value) -> Result<&Map<String, Value>, SelectorError> {
    value.as_object().ok_or_else(|| SelectorError::NotAnObject {
        fragment: value.to_string(),
    })
}

fn split_path(path: &str) -> Vec<String> {
    path.split('.').map(str::to_string).collect()
}

fn parse_clauses(object: &Map<String, Value>, prefix: &[String]) -> Result<Selector, SelectorError> {
    let mut clauses = Vec::with_capacity(object.len());
    for (key, value) in object {
        if let Some(op) = key.strip_prefix('$') {
            clauses.push(parse_combinator(op, value, prefix)?);
        } else {
            let mut path = prefix.to_vec();
            path.extend(split_path(key));
            clauses.push(parse_field(path, value)?);
        }
    }
    Ok(match clauses.len() {
        1 => clauses.remove(0),
        _ => Selector::And(clauses),
    })
}

fn parse_combinator(op: &str, value: &Value, prefix: &[String]) -> Result<Selector, SelectorError> {
    let invalid = || SelectorError::InvalidOperand {
        operator: format!("${op}"),
        fragment: value.to_string(),
    };
    let build: fn(Vec<Selector>) -> Selector = match op {
        "and" => Selector::And,
        "or" => Selector::Or,
        _ => {
            return Err(SelectorError::UnknownOperator {
                operator: format!("${op}"),
            })
        }
    };
    let items = value.as_array().filter(|a| !a.is_empty()).ok_or_else(invalid)?;
    let parts = items
        .iter()
        .map(|item| parse_clauses(as_object(item)?, prefix))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(build(parts))
}

fn parse_field(path: Vec<String>, value: &Value) -> Result<Selector, SelectorError> {
    let Some(object) = value.as_object().filter(|o| !o.is_empty()) else {
        return Ok(Selector::Field {
            path,
            condition: Condition::Eq(value.clone()),
        });
    };

    let operators = object.keys().filter(|k| k.starts_with('$')).count();
    if operators == 0 {
        return parse_clauses(object, &path);
    }
    if operators != object.len() {
        return Err(SelectorError::MixedCondition {
            field: path.join("."),
        });
    }

    let mut conditions = object
        .iter()
        .map(|(op, operand)| parse_condition(op, operand))
        .map(|c| {
            c.map(|condition| Selector::Field {
                path: path.clone(),
                condition,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(match conditions.len() {
        1 => conditions.remove(0),
        _ => Selector::And(conditions),
    })
}

fn parse_condition(op: &str, operand: &Value) -> Result<Condition, SelectorError> {
    let invalid = || SelectorError::InvalidOperand {
        operator: op.to_string(),
        fragment: operand.to_string(),
    };
    let orderable = || match operand {
        Value::Number(_) | Value::String(_) => Ok(operand.clone()),
        _ => Err(invalid()),
    };
    Ok(match op {
        "$eq" => Condition::Eq(operand.clone()),
        "$ne" => Condition::Ne(operand.clone()),
        "$gt" => Condition::Gt(orderable()?),
        "$gte" => Condition::Gte(orderable()?),
        "$lt" => Condition::Lt(orderable()?),
        "$lte" => Condition::Lte(orderable()?),
        "$in" => Condition::In(operand.as_array().cloned().ok_or_else(invalid)?),
        "$exists" => Condition::Exists(operand.as_bool().ok_or_else(invalid)?),
        other => {
            return Err(SelectorError::UnknownOperator {
                operator: other.to_string(),
            })
        }
    })
}

// ─── Evaluation ──────────────────────────────────────────────────────

fn lookup<'a>(doc: &'a Value, path: &[String]) -> Option<&'a Value> {
    path.iter().try_fold(doc, |node, segment| node.get(segment.as_str()))
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| values_equal(x, y)))
        }
        _ => a == b,
    }
}

fn order(a: &Value, b: &Value) -> Option<std::cmp::Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => None,
    }
}
