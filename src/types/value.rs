use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A field's value as held by the [`FieldValueStore`](super::FieldValueStore).
///
/// Equality is structural. `List` values compare as multisets, so the order
/// in which checkbox options were ticked never matters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FieldValue {
    /// Free text, or the selected option of a single-choice field.
    Text(String),
    /// A numeric entry.
    Number(f64),
    /// A toggle state.
    Bool(bool),
    /// The selected options of a multi-value field.
    List(Vec<String>),
}

impl FieldValue {
    /// Textual representation used by the string comparators.
    #[must_use]
    pub fn to_text(&self) -> Cow<'_, str> {
        match self {
            FieldValue::Text(v) => Cow::Borrowed(v),
            FieldValue::Number(v) => Cow::Owned(v.to_string()),
            FieldValue::Bool(true) => Cow::Borrowed("true"),
            FieldValue::Bool(false) => Cow::Borrowed("false"),
            FieldValue::List(items) => Cow::Owned(items.join(", ")),
        }
    }

    /// Best-effort numeric reading. Text is trimmed before parsing;
    /// booleans and lists never read as numbers.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(v) => Some(*v),
            FieldValue::Text(v) => v.trim().parse::<f64>().ok(),
            FieldValue::Bool(_) | FieldValue::List(_) => None,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(v) => v.is_empty(),
            FieldValue::List(items) => items.is_empty(),
            FieldValue::Number(_) | FieldValue::Bool(_) => false,
        }
    }

    /// The empty text value that stands in for an unset field.
    #[must_use]
    pub fn unset() -> Self {
        FieldValue::Text(String::new())
    }
}

impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FieldValue::Text(a), FieldValue::Text(b)) => a == b,
            // NaN equals itself so re-entering it is not a change
            (FieldValue::Number(a), FieldValue::Number(b)) => a == b || (a.is_nan() && b.is_nan()),
            (FieldValue::Bool(a), FieldValue::Bool(b)) => a == b,
            (FieldValue::List(a), FieldValue::List(b)) => same_items(a, b),
            _ => false,
        }
    }
}

fn same_items(a: &[String], b: &[String]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut a: Vec<&str> = a.iter().map(String::as_str).collect();
    let mut b: Vec<&str> = b.iter().map(String::as_str).collect();
    a.sort_unstable();
    b.sort_unstable();
    a == b
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Number(v)
    }
}

impl From<i64> for FieldValue {
    #[allow(clippy::cast_precision_loss)]
    fn from(v: i64) -> Self {
        FieldValue::Number(v as f64)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(v: Vec<String>) -> Self {
        FieldValue::List(v)
    }
}

impl From<Vec<&str>> for FieldValue {
    fn from(v: Vec<&str>) -> Self {
        FieldValue::List(v.into_iter().map(str::to_owned).collect())
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(v) => write!(f, "\"{v}\""),
            FieldValue::Number(v) => write!(f, "{v}"),
            FieldValue::Bool(v) => write!(f, "{v}"),
            FieldValue::List(items) => write!(f, "[{}]", items.join(", ")),
        }
    }
}
