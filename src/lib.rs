//! Conditional logic for dynamic forms.
//!
//! A [`RuleSet`] holds the conditionals of one form: each pairs a group of
//! field comparisons with an action (`show`, `hide`, `disable`) and the
//! fields it acts on. An [`Engine`] owns the live values of one form
//! instance and, on every change, re-evaluates the affected conditionals,
//! resolves conflicts, clears the values of fields that become hidden, and
//! cascades until the form is stable.
//!
//! ```
//! use fieldgate::{line, Engine, FieldValueStore, ResolvedAction, RuleSetBuilder};
//!
//! let ruleset = RuleSetBuilder::new()
//!     .conditional("con_1", |c| c.show().when(line("fld_A").is("yes")).target("fld_B"))
//!     .compile()
//!     .unwrap();
//!
//! let mut engine = Engine::initialize(ruleset, FieldValueStore::new());
//! assert_eq!(engine.resolved_action("fld_B"), ResolvedAction::Hidden);
//!
//! engine.on_field_changed("fld_A", "yes");
//! assert_eq!(engine.resolved_action("fld_B"), ResolvedAction::Visible);
//! ```

pub mod compare;
mod compile;
mod engine;
mod error;
mod evaluate;
mod exchange;
mod index;
mod reconcile;
#[cfg(feature = "binary-cache")]
pub mod serial;
mod types;

pub use engine::Engine;
pub use error::FieldgateError;
pub use exchange::ExchangeError;
#[cfg(feature = "binary-cache")]
pub use serial::{DeserializeError, SerializeError};
pub use types::{
    Action, Comparator, Conditional, ConditionalBuilder, Diagnostic, EngineOptions, Field,
    FieldRegistry, FieldType, FieldValue, FieldValueStore, Line, LineExpr, Operand, PassReport,
    ResolvedAction, ResolvedState, RuleSet, RuleSetBuilder, RuleSetError, SideEffect, StateChange,
    field_ref, line,
};
