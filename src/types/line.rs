use std::fmt;

use serde::{Deserialize, Serialize};

/// Comparison operators a line can apply.
///
/// The set is closed. Anything else read from a rule document is kept as
/// `Unknown` so it survives a round trip, and always evaluates to `false`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comparator {
    Is,
    IsNot,
    Greater,
    Smaller,
    StartsWith,
    EndsWith,
    Contains,
    Unknown(String),
}

impl Comparator {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Comparator::Is => "is",
            Comparator::IsNot => "isnot",
            Comparator::Greater => "greater",
            Comparator::Smaller => "smaller",
            Comparator::StartsWith => "startswith",
            Comparator::EndsWith => "endswith",
            Comparator::Contains => "contains",
            Comparator::Unknown(raw) => raw,
        }
    }

    #[must_use]
    pub fn is_known(&self) -> bool {
        !matches!(self, Comparator::Unknown(_))
    }
}

impl From<&str> for Comparator {
    fn from(raw: &str) -> Self {
        match raw {
            "is" => Comparator::Is,
            "isnot" => Comparator::IsNot,
            "greater" => Comparator::Greater,
            "smaller" => Comparator::Smaller,
            "startswith" => Comparator::StartsWith,
            "endswith" => Comparator::EndsWith,
            "contains" => Comparator::Contains,
            other => Comparator::Unknown(other.to_owned()),
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Right-hand side of a line: a literal, or another field's live value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operand {
    Literal(String),
    Field(String),
}

impl Operand {
    /// Decode the exchange form: `%fld_id%` references a field, anything
    /// else is a literal.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.strip_prefix('%').and_then(|s| s.strip_suffix('%')) {
            Some(inner) if !inner.is_empty() && !inner.contains('%') => {
                Operand::Field(inner.to_owned())
            }
            _ => Operand::Literal(raw.to_owned()),
        }
    }

    /// Inverse of [`parse`](Self::parse).
    #[must_use]
    pub fn encode(&self) -> String {
        match self {
            Operand::Literal(v) => v.clone(),
            Operand::Field(id) => format!("%{id}%"),
        }
    }

    #[must_use]
    pub fn referenced_field(&self) -> Option<&str> {
        match self {
            Operand::Field(id) => Some(id),
            Operand::Literal(_) => None,
        }
    }
}

impl From<&str> for Operand {
    fn from(v: &str) -> Self {
        Operand::Literal(v.to_owned())
    }
}

impl From<String> for Operand {
    fn from(v: String) -> Self {
        Operand::Literal(v)
    }
}

impl From<i64> for Operand {
    fn from(v: i64) -> Self {
        Operand::Literal(v.to_string())
    }
}

impl From<f64> for Operand {
    fn from(v: f64) -> Self {
        Operand::Literal(v.to_string())
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Literal(v) => write!(f, "\"{v}\""),
            Operand::Field(id) => write!(f, "%{id}%"),
        }
    }
}

/// One comparison inside a conditional's group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    pub id: String,
    pub field: String,
    pub compare: Comparator,
    pub value: Operand,
}

impl Line {
    /// A line can only ever be true if it names a field and a known comparator.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        !self.field.is_empty() && self.compare.is_known()
    }

    /// Fields whose values this line reads: the tested field and, for a
    /// field-reference operand, the referenced one.
    pub fn referenced_fields(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.field.as_str())
            .chain(self.value.referenced_field())
            .filter(|f| !f.is_empty())
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.field, self.compare, self.value)
    }
}

/// Intermediate builder for a line. Created by [`line()`]; a comparison
/// method turns it into a [`Line`].
#[derive(Debug, Clone)]
pub struct LineExpr {
    field: String,
}

impl LineExpr {
    #[must_use]
    pub fn compare(self, compare: Comparator, value: impl Into<Operand>) -> Line {
        Line {
            id: String::new(),
            field: self.field,
            compare,
            value: value.into(),
        }
    }

    #[must_use]
    pub fn is(self, value: impl Into<Operand>) -> Line {
        self.compare(Comparator::Is, value)
    }

    #[must_use]
    pub fn isnot(self, value: impl Into<Operand>) -> Line {
        self.compare(Comparator::IsNot, value)
    }

    #[must_use]
    pub fn greater(self, value: impl Into<Operand>) -> Line {
        self.compare(Comparator::Greater, value)
    }

    #[must_use]
    pub fn smaller(self, value: impl Into<Operand>) -> Line {
        self.compare(Comparator::Smaller, value)
    }

    #[must_use]
    pub fn startswith(self, value: impl Into<Operand>) -> Line {
        self.compare(Comparator::StartsWith, value)
    }

    #[must_use]
    pub fn endswith(self, value: impl Into<Operand>) -> Line {
        self.compare(Comparator::EndsWith, value)
    }

    #[must_use]
    pub fn contains(self, value: impl Into<Operand>) -> Line {
        self.compare(Comparator::Contains, value)
    }
}

#[must_use]
pub fn line(field: &str) -> LineExpr {
    LineExpr {
        field: field.to_owned(),
    }
}

/// Operand that reads another field's current value at evaluation time.
#[must_use]
pub fn field_ref(field: &str) -> Operand {
    Operand::Field(field.to_owned())
}
