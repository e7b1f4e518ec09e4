//! Comparator library.
//!
//! Every comparator is a pure, total function of the tested field's value, the
//! resolved operand, and the field's type. None of them can fail: input that
//! cannot be compared yields `false`.
//!
//! An unset field reads as empty text. A checkbox holding a single text value
//! is read as a one-element set.

use std::borrow::Cow;

use crate::{Comparator, FieldType, FieldValue};

/// Apply `op` to a field value and operand.
#[must_use]
pub fn compare(
    op: &Comparator,
    value: Option<&FieldValue>,
    operand: &FieldValue,
    field_type: &FieldType,
) -> bool {
    match op {
        Comparator::Is => is(value, operand, field_type),
        Comparator::IsNot => is_not(value, operand, field_type),
        Comparator::Greater => greater(value, operand, field_type),
        Comparator::Smaller => smaller(value, operand, field_type),
        Comparator::StartsWith => starts_with(value, operand, field_type),
        Comparator::EndsWith => ends_with(value, operand, field_type),
        Comparator::Contains => contains(value, operand, field_type),
        Comparator::Unknown(_) => false,
    }
}

/// Equality. Against a multi-value field a single operand means membership;
/// two sets compare ignoring order.
#[must_use]
pub fn is(value: Option<&FieldValue>, operand: &FieldValue, field_type: &FieldType) -> bool {
    let value = normalize(value, field_type);
    match (value.as_ref(), operand) {
        (FieldValue::List(_), FieldValue::List(_)) => value.as_ref() == operand,
        (FieldValue::List(items), single) => {
            let single = single.to_text();
            items.iter().any(|item| *item == *single)
        }
        (single, FieldValue::List(items)) => {
            items.len() == 1 && items[0] == *single.to_text()
        }
        (a, b) => a.to_text() == b.to_text(),
    }
}

#[must_use]
pub fn is_not(value: Option<&FieldValue>, operand: &FieldValue, field_type: &FieldType) -> bool {
    !is(value, operand, field_type)
}

#[must_use]
pub fn greater(value: Option<&FieldValue>, operand: &FieldValue, field_type: &FieldType) -> bool {
    numeric(value, operand, field_type).is_some_and(|(a, b)| a > b)
}

#[must_use]
pub fn smaller(value: Option<&FieldValue>, operand: &FieldValue, field_type: &FieldType) -> bool {
    numeric(value, operand, field_type).is_some_and(|(a, b)| a < b)
}

#[must_use]
pub fn starts_with(
    value: Option<&FieldValue>,
    operand: &FieldValue,
    field_type: &FieldType,
) -> bool {
    textual(value, operand, field_type, |v, o| v.starts_with(o))
}

#[must_use]
pub fn ends_with(
    value: Option<&FieldValue>,
    operand: &FieldValue,
    field_type: &FieldType,
) -> bool {
    textual(value, operand, field_type, |v, o| v.ends_with(o))
}

#[must_use]
pub fn contains(value: Option<&FieldValue>, operand: &FieldValue, field_type: &FieldType) -> bool {
    textual(value, operand, field_type, |v, o| v.contains(o))
}

fn normalize<'a>(value: Option<&'a FieldValue>, field_type: &FieldType) -> Cow<'a, FieldValue> {
    match value {
        None if field_type.is_multi_value() => Cow::Owned(FieldValue::List(Vec::new())),
        None => Cow::Owned(FieldValue::unset()),
        Some(FieldValue::Text(v)) if field_type.is_multi_value() => {
            let items = if v.is_empty() { Vec::new() } else { vec![v.clone()] };
            Cow::Owned(FieldValue::List(items))
        }
        Some(v) => Cow::Borrowed(v),
    }
}

fn numeric(
    value: Option<&FieldValue>,
    operand: &FieldValue,
    field_type: &FieldType,
) -> Option<(f64, f64)> {
    let value = normalize(value, field_type);
    Some((value.as_number()?, operand.as_number()?))
}

fn textual(
    value: Option<&FieldValue>,
    operand: &FieldValue,
    field_type: &FieldType,
    test: impl Fn(&str, &str) -> bool,
) -> bool {
    let value = normalize(value, field_type);
    let text = value.to_text();
    if text.is_empty() {
        return false;
    }
    test(&text, &operand.to_text())
}
