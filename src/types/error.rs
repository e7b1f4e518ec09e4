use thiserror::Error;

/// Validation failures raised while constructing a [`RuleSet`](super::RuleSet).
///
/// These are the only errors the engine surfaces; everything that goes wrong
/// during evaluation fails closed instead.
#[derive(Debug, Error)]
pub enum RuleSetError {
    #[error("conditional id must not be empty")]
    EmptyConditionalId,

    #[error("duplicate conditional id '{id}'")]
    DuplicateConditional { id: String },

    #[error("conditional '{conditional}' targets field '{field}' that its own group reads")]
    SelfTarget { conditional: String, field: String },

    #[error("field '{id}' declared more than once")]
    DuplicateField { id: String },
}
