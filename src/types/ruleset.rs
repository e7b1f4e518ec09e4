use std::collections::HashMap;
use std::fmt;

use super::conditional::{Action, CompiledConditional, Conditional};
use super::error::RuleSetError;
use super::field_registry::{Field, FieldRegistry};
use super::line::Line;
use super::store::FieldValueStore;
use crate::index::DependencyIndex;

/// Builder for constructing a [`RuleSet`].
///
/// Conditionals keep the order they are added in. That order decides
/// conflicts: when two firing conditionals act on the same field, the later
/// one wins.
///
/// # Example
///
/// ```
/// use fieldgate::{line, Field, FieldType, RuleSetBuilder};
///
/// let ruleset = RuleSetBuilder::new()
///     .field(Field::new("fld_A", FieldType::Radio).with_options(["yes", "no"]))
///     .field(Field::new("fld_B", FieldType::Text))
///     .conditional("con_1", |c| c.hide().when(line("fld_A").is("yes")).target("fld_B"))
///     .compile()
///     .unwrap();
/// assert_eq!(ruleset.affected_by("fld_A"), vec!["con_1"]);
/// ```
#[derive(Debug, Default)]
pub struct RuleSetBuilder {
    fields: Vec<Field>,
    conditionals: Vec<Conditional>,
}

/// Intermediate builder passed to the conditional definition closure.
///
/// The name defaults to the conditional's id.
#[derive(Debug)]
pub struct ConditionalBuilder {
    name: String,
    action: Option<Action>,
    group: Vec<Line>,
    targets: Vec<String>,
}

impl RuleSetBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a form field.
    #[must_use]
    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Define a conditional. Lines added without an id get `cl_<n>`.
    #[must_use]
    pub fn conditional(
        mut self,
        id: &str,
        f: impl FnOnce(ConditionalBuilder) -> ConditionalBuilder,
    ) -> Self {
        let builder = f(ConditionalBuilder {
            name: id.to_owned(),
            action: None,
            group: Vec::new(),
            targets: Vec::new(),
        });
        let group = builder
            .group
            .into_iter()
            .enumerate()
            .map(|(n, mut line)| {
                if line.id.is_empty() {
                    line.id = format!("cl_{n}");
                }
                line
            })
            .collect();
        self.conditionals.push(Conditional {
            id: id.to_owned(),
            name: builder.name,
            action: builder.action,
            group,
            targets: builder.targets,
        });
        self
    }

    /// Append an already assembled conditional.
    #[must_use]
    pub fn push(mut self, conditional: Conditional) -> Self {
        self.conditionals.push(conditional);
        self
    }

    /// Append the conditionals of an exchange-format rule document.
    ///
    /// # Errors
    ///
    /// Returns [`ExchangeError`](crate::ExchangeError) if the document is malformed.
    pub fn with_json(mut self, input: &str) -> Result<Self, crate::ExchangeError> {
        self.conditionals.extend(crate::exchange::decode(input)?);
        Ok(self)
    }

    /// Validate and index the conditionals into an immutable `RuleSet`.
    ///
    /// # Errors
    ///
    /// Returns [`RuleSetError`] if validation fails.
    pub fn compile(self) -> Result<RuleSet, RuleSetError> {
        crate::compile::compile(self.fields, self.conditionals)
    }
}

impl ConditionalBuilder {
    /// Human label. An empty name leaves the conditional inactive.
    #[must_use]
    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_owned();
        self
    }

    #[must_use]
    pub fn action(mut self, action: Action) -> Self {
        self.action = Some(action);
        self
    }

    #[must_use]
    pub fn show(self) -> Self {
        self.action(Action::Show)
    }

    #[must_use]
    pub fn hide(self) -> Self {
        self.action(Action::Hide)
    }

    #[must_use]
    pub fn disable(self) -> Self {
        self.action(Action::Disable)
    }

    /// Add a line to the group. Lines are AND-combined.
    #[must_use]
    pub fn when(mut self, line: Line) -> Self {
        self.group.push(line);
        self
    }

    /// Same as [`when`](Self::when); reads better for the second and later lines.
    #[must_use]
    pub fn and(self, line: Line) -> Self {
        self.when(line)
    }

    #[must_use]
    pub fn target(mut self, field: &str) -> Self {
        self.targets.push(field.to_owned());
        self
    }

    #[must_use]
    pub fn targets<'a>(mut self, fields: impl IntoIterator<Item = &'a str>) -> Self {
        self.targets.extend(fields.into_iter().map(str::to_owned));
        self
    }
}

/// A validated, immutable rule set for one form. Designed to live behind
/// `Arc` and be shared by every engine rendering the same form.
#[derive(Debug)]
pub struct RuleSet {
    pub(crate) conditionals: Vec<CompiledConditional>,
    pub(crate) fields: FieldRegistry,
    pub(crate) index: DependencyIndex,
    pub(crate) conditional_indices: HashMap<String, usize>,
}

impl RuleSet {
    /// Decode an exchange-format rule document and compile it.
    ///
    /// # Errors
    ///
    /// Returns [`FieldgateError`](crate::FieldgateError) on decode or
    /// validation failure.
    pub fn from_json(input: &str) -> Result<Self, crate::FieldgateError> {
        let ruleset = RuleSetBuilder::new().with_json(input)?.compile()?;
        Ok(ruleset)
    }

    /// Read an exchange-format rule document from a file and compile it.
    ///
    /// # Errors
    ///
    /// Returns [`FieldgateError`](crate::FieldgateError) on I/O, decode, or
    /// validation failure.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, crate::FieldgateError> {
        let input = std::fs::read_to_string(path)?;
        Self::from_json(&input)
    }

    /// Encode the conditionals back into the exchange format.
    #[must_use]
    pub fn to_json(&self) -> String {
        crate::exchange::encode(self.conditionals.iter().map(|c| &c.conditional)).to_string()
    }

    /// Evaluate the given conditionals against `store`.
    ///
    /// Unknown ids and inactive conditionals are left out of the result.
    #[must_use]
    pub fn evaluate(&self, ids: &[&str], store: &FieldValueStore) -> HashMap<String, bool> {
        let indices: Vec<usize> = ids
            .iter()
            .filter_map(|id| self.conditional_indices.get(*id).copied())
            .collect();
        crate::evaluate::evaluate(self, &indices, store)
            .into_iter()
            .map(|(idx, fired)| (self.conditionals[idx].id().to_owned(), fired))
            .collect()
    }

    /// Conditional ids in rule set order.
    #[must_use]
    pub fn conditional_order(&self) -> Vec<&str> {
        self.conditionals.iter().map(CompiledConditional::id).collect()
    }

    #[must_use]
    pub fn conditional(&self, id: &str) -> Option<&Conditional> {
        self.conditional_indices
            .get(id)
            .map(|&idx| &self.conditionals[idx].conditional)
    }

    /// Ids of the active conditionals whose group reads `field`.
    #[must_use]
    pub fn affected_by(&self, field: &str) -> Vec<&str> {
        self.index
            .affected_by(field)
            .iter()
            .map(|&idx| self.conditionals[idx].id())
            .collect()
    }

    /// Fields at least one active conditional acts on, in order of first
    /// appearance. Every other field always resolves to `visible`.
    #[must_use]
    pub fn targeted_fields(&self) -> &[String] {
        self.index.targeted_fields()
    }

    /// Target fields of a conditional. `None` if the id is unknown.
    #[must_use]
    pub fn targets_of(&self, id: &str) -> Option<&[String]> {
        self.conditional(id).map(|c| c.targets.as_slice())
    }

    /// Fields a conditional may not target. `None` if the id is unknown.
    #[must_use]
    pub fn fields_not_allowed(&self, id: &str) -> Option<Vec<&str>> {
        self.conditional(id).map(Conditional::fields_not_allowed)
    }

    #[must_use]
    pub fn fields(&self) -> &FieldRegistry {
        &self.fields
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.conditionals.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conditionals.is_empty()
    }

    pub(crate) fn active_count(&self) -> usize {
        self.conditionals.iter().filter(|c| c.active).count()
    }
}

#[cfg(feature = "binary-cache")]
impl RuleSet {
    /// Serialize this rule set to a byte vector.
    ///
    /// The optional `source_text` is hashed (BLAKE3) and embedded in the
    /// payload metadata, so callers can tell when the rule document the
    /// cache was built from has changed.
    ///
    /// # Errors
    ///
    /// Returns [`SerializeError`](crate::serial::SerializeError) if encoding fails.
    pub fn to_bytes(
        &self,
        source_text: Option<&str>,
    ) -> Result<Vec<u8>, crate::serial::SerializeError> {
        crate::serial::encode(self, source_text)
    }

    /// Deserialize a rule set previously produced by [`to_bytes`](Self::to_bytes).
    /// The decoded conditionals are validated again.
    ///
    /// # Errors
    ///
    /// Returns [`DeserializeError`](crate::serial::DeserializeError) on
    /// format, integrity, or validation failure.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, crate::serial::DeserializeError> {
        crate::serial::decode(bytes)
    }

    /// Serialize this rule set and write it to a file.
    ///
    /// # Errors
    ///
    /// Returns [`SerializeError`](crate::serial::SerializeError) on
    /// encoding or I/O failure.
    pub fn to_binary_file(
        &self,
        path: impl AsRef<std::path::Path>,
        source_text: Option<&str>,
    ) -> Result<(), crate::serial::SerializeError> {
        let bytes = self.to_bytes(source_text)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Read a file and deserialize the rule set it contains.
    ///
    /// # Errors
    ///
    /// Returns [`DeserializeError`](crate::serial::DeserializeError) on
    /// I/O, format, integrity, or validation failure.
    pub fn from_binary_file(
        path: impl AsRef<std::path::Path>,
    ) -> Result<Self, crate::serial::DeserializeError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }
}

impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RuleSet({} conditionals, {} active, {} fields)",
            self.conditionals.len(),
            self.active_count(),
            self.fields.len(),
        )
    }
}
