use std::collections::HashMap;

use super::FieldValue;

/// Current values of every field in one form instance.
///
/// A plain store: it reports whether a write changed anything and leaves
/// re-evaluation to the caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldValueStore {
    values: HashMap<String, FieldValue>,
}

impl FieldValueStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style write, for seeding initial values.
    #[must_use]
    pub fn with(mut self, field: &str, value: impl Into<FieldValue>) -> Self {
        let _ = self.set(field, value);
        self
    }

    /// Look up a field's value. `None` means unset.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    /// Store a value. Returns `true` if the stored value changed.
    #[must_use = "a change has to be propagated to dependent conditionals"]
    pub fn set(&mut self, field: &str, value: impl Into<FieldValue>) -> bool {
        let value = value.into();
        if self.values.get(field) == Some(&value) {
            return false;
        }
        self.values.insert(field.to_owned(), value);
        true
    }

    /// Remove a value. Returns `true` if there was one.
    #[must_use = "a change has to be propagated to dependent conditionals"]
    pub fn clear(&mut self, field: &str) -> bool {
        self.values.remove(field).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for FieldValueStore {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
