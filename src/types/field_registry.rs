use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::value::FieldValue;

/// Type tag of a form field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    Text,
    Dropdown,
    Checkbox,
    Radio,
    Toggle,
    FilteredSelect,
    File,
    Hidden,
    Other(String),
}

impl FieldType {
    /// Whether the field offers a fixed list of options to pick from.
    #[must_use]
    pub fn has_options(&self) -> bool {
        matches!(
            self,
            FieldType::Dropdown
                | FieldType::Checkbox
                | FieldType::Radio
                | FieldType::Toggle
                | FieldType::FilteredSelect
        )
    }

    /// Whether the field holds a set of values rather than a single one.
    #[must_use]
    pub fn is_multi_value(&self) -> bool {
        matches!(self, FieldType::Checkbox)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            FieldType::Text => "text",
            FieldType::Dropdown => "dropdown",
            FieldType::Checkbox => "checkbox",
            FieldType::Radio => "radio",
            FieldType::Toggle => "toggle_switch",
            FieldType::FilteredSelect => "filtered_select2",
            FieldType::File => "file",
            FieldType::Hidden => "hidden",
            FieldType::Other(tag) => tag,
        }
    }
}

impl From<&str> for FieldType {
    fn from(tag: &str) -> Self {
        match tag {
            "text" => FieldType::Text,
            "dropdown" => FieldType::Dropdown,
            "checkbox" => FieldType::Checkbox,
            "radio" => FieldType::Radio,
            "toggle" | "toggle_switch" => FieldType::Toggle,
            "filtered_select" | "filtered_select2" => FieldType::FilteredSelect,
            "file" | "advanced_file" | "cf2_file" => FieldType::File,
            "hidden" => FieldType::Hidden,
            other => FieldType::Other(other.to_owned()),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declaration of one field of the form: identity, type, options and default.
///
/// Identity is the id alone; labels and slugs live in the rendering layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    id: String,
    field_type: FieldType,
    options: Vec<String>,
    default: Option<FieldValue>,
}

impl Field {
    #[must_use]
    pub fn new(id: &str, field_type: impl Into<FieldType>) -> Self {
        Self {
            id: id.to_owned(),
            field_type: field_type.into(),
            options: Vec::new(),
            default: None,
        }
    }

    #[must_use]
    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    /// Value seeded into the store when the form loads or resets.
    #[must_use]
    pub fn with_default(mut self, value: impl Into<FieldValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn field_type(&self) -> &FieldType {
        &self.field_type
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn default_value(&self) -> Option<&FieldValue> {
        self.default.as_ref()
    }
}

static UNDECLARED: FieldType = FieldType::Text;

/// The declared fields of one form, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct FieldRegistry {
    fields: Vec<Field>,
    index: HashMap<String, usize>,
}

impl FieldRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Register a field declaration. Returns `false` if the id is already taken.
    pub(crate) fn register(&mut self, field: Field) -> bool {
        if self.index.contains_key(field.id()) {
            return false;
        }
        self.index.insert(field.id().to_owned(), self.fields.len());
        self.fields.push(field);
        true
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Field> {
        self.index.get(id).map(|&idx| &self.fields[idx])
    }

    /// Type of the field; undeclared fields read as plain text.
    #[must_use]
    pub fn field_type(&self, id: &str) -> &FieldType {
        self.get(id).map_or(&UNDECLARED, Field::field_type)
    }

    /// Fields that carry a configured default.
    pub fn defaults(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields
            .iter()
            .filter_map(|f| f.default_value().map(|v| (f.id(), v)))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter()
    }
}
