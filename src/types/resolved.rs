use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The visibility/enablement a field ends up with after evaluation.
///
/// Visibility and enablement collapse into one value per field: at most one
/// conditional's action applies to a field at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ResolvedAction {
    #[default]
    Visible,
    Hidden,
    Disabled,
    Enabled,
}

impl ResolvedAction {
    #[must_use]
    pub fn is_visible(self) -> bool {
        !matches!(self, ResolvedAction::Hidden)
    }

    /// Whether the field's value goes out with the form.
    #[must_use]
    pub fn is_submittable(self) -> bool {
        matches!(self, ResolvedAction::Visible | ResolvedAction::Enabled)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ResolvedAction::Visible => "visible",
            ResolvedAction::Hidden => "hidden",
            ResolvedAction::Disabled => "disabled",
            ResolvedAction::Enabled => "enabled",
        }
    }
}

impl fmt::Display for ResolvedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field id to currently applied action, ordered by field id. Fields without
/// an entry are `Visible`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedState {
    actions: BTreeMap<String, ResolvedAction>,
}

impl ResolvedState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, field: &str) -> ResolvedAction {
        self.actions.get(field).copied().unwrap_or_default()
    }

    /// Record `action` for `field`, returning the action it replaces.
    pub(crate) fn set(&mut self, field: &str, action: ResolvedAction) -> ResolvedAction {
        self.actions
            .insert(field.to_owned(), action)
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ResolvedAction)> {
        self.actions.iter().map(|(k, v)| (k.as_str(), *v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// One field's resolved action moving from `from` to `to`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateChange {
    pub field: String,
    pub from: ResolvedAction,
    pub to: ResolvedAction,
}

impl fmt::Display for StateChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} -> {}", self.field, self.from, self.to)
    }
}

/// A mutation the rendering layer has to mirror.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SideEffect {
    Show(String),
    Hide(String),
    Disable(String),
    Enable(String),
    /// The field's stored value was removed; it must not be submitted.
    ClearValue(String),
    /// A field the user never filled in was shown again and got its
    /// configured default back.
    RestoreDefault(String),
}

impl SideEffect {
    #[must_use]
    pub fn field(&self) -> &str {
        match self {
            SideEffect::Show(f)
            | SideEffect::Hide(f)
            | SideEffect::Disable(f)
            | SideEffect::Enable(f)
            | SideEffect::ClearValue(f)
            | SideEffect::RestoreDefault(f) => f,
        }
    }
}

impl fmt::Display for SideEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SideEffect::Show(field) => write!(f, "show {field}"),
            SideEffect::Hide(field) => write!(f, "hide {field}"),
            SideEffect::Disable(field) => write!(f, "disable {field}"),
            SideEffect::Enable(field) => write!(f, "enable {field}"),
            SideEffect::ClearValue(field) => write!(f, "clear {field}"),
            SideEffect::RestoreDefault(field) => write!(f, "restore default of {field}"),
        }
    }
}
