//! JSON rule exchange format.
//!
//! Rule documents come from the form builder as an object keyed by
//! conditional id:
//!
//! ```text
//! {
//!   "con_1": {
//!     "name": "Hide note",
//!     "type": "hide",
//!     "group": {
//!       "cl_1": { "field": "fld_A", "compare": "is", "value": "yes" }
//!     },
//!     "fields": ["fld_B"]
//!   }
//! }
//! ```
//!
//! Key order is the rule set order. A `value` written `%fld_X%` refers to the
//! current value of `fld_X`.

use serde::Deserialize;
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::{Action, Comparator, Conditional, Line, Operand};

/// Errors that can occur when decoding a rule document.
#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("malformed rule document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{context} must be an object keyed by id")]
    NotAnObject { context: String },

    #[error("conditional '{conditional}' has unknown type '{action}'")]
    UnknownAction { conditional: String, action: String },
}

#[derive(Debug, Deserialize)]
struct RawConditional {
    #[serde(default)]
    name: String,
    #[serde(default, rename = "type")]
    action: String,
    #[serde(default)]
    group: Value,
    #[serde(default)]
    fields: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawLine {
    #[serde(default)]
    field: String,
    #[serde(default)]
    compare: String,
    #[serde(default)]
    value: Value,
}

/// Decode a rule document into conditionals, keeping document order.
pub(crate) fn decode(input: &str) -> Result<Vec<Conditional>, ExchangeError> {
    let document: Value = serde_json::from_str(input)?;
    let Value::Object(entries) = document else {
        return Err(ExchangeError::NotAnObject {
            context: "rule document".to_owned(),
        });
    };

    entries
        .into_iter()
        .map(|(id, entry)| decode_conditional(id, entry))
        .collect()
}

fn decode_conditional(id: String, entry: Value) -> Result<Conditional, ExchangeError> {
    let raw: RawConditional = serde_json::from_value(entry)?;
    let action = Action::parse(&raw.action).map_err(|()| ExchangeError::UnknownAction {
        conditional: id.clone(),
        action: raw.action.clone(),
    })?;

    let group = match raw.group {
        Value::Object(lines) => lines
            .into_iter()
            .map(|(line_id, line)| decode_line(line_id, line))
            .collect::<Result<Vec<_>, _>>()?,
        // an untouched conditional has no group yet
        Value::Null => Vec::new(),
        _ => {
            return Err(ExchangeError::NotAnObject {
                context: format!("group of '{id}'"),
            })
        }
    };

    Ok(Conditional {
        id,
        name: raw.name,
        action,
        group,
        targets: raw.fields,
    })
}

fn decode_line(id: String, line: Value) -> Result<Line, ExchangeError> {
    let raw: RawLine = serde_json::from_value(line)?;
    let value = match raw.value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    };
    Ok(Line {
        id,
        field: raw.field,
        compare: Comparator::from(raw.compare.as_str()),
        value: Operand::parse(&value),
    })
}

/// Encode conditionals into a rule document, in iteration order.
pub(crate) fn encode<'a>(conditionals: impl IntoIterator<Item = &'a Conditional>) -> Value {
    let mut document = Map::new();
    for conditional in conditionals {
        let group: Map<String, Value> = conditional
            .group
            .iter()
            .map(|line| {
                (
                    line.id.clone(),
                    json!({
                        "field": line.field,
                        "compare": line.compare.as_str(),
                        "value": line.value.encode(),
                    }),
                )
            })
            .collect();
        document.insert(
            conditional.id.clone(),
            json!({
                "name": conditional.name,
                "type": conditional.action.map_or("", Action::as_str),
                "group": group,
                "fields": conditional.targets,
            }),
        );
    }
    Value::Object(document)
}
