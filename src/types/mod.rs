mod conditional;
mod error;
mod field_registry;
mod line;
mod options;
mod pass_report;
mod resolved;
mod ruleset;
mod store;
mod value;

pub use conditional::{Action, Conditional};
pub(crate) use conditional::CompiledConditional;
pub use error::RuleSetError;
pub use field_registry::{Field, FieldRegistry, FieldType};
pub use line::{Comparator, Line, LineExpr, Operand, field_ref, line};
pub use options::EngineOptions;
pub use pass_report::{Diagnostic, PassReport};
pub use resolved::{ResolvedAction, ResolvedState, SideEffect, StateChange};
pub use ruleset::{ConditionalBuilder, RuleSet, RuleSetBuilder};
pub use store::FieldValueStore;
pub use value::FieldValue;
