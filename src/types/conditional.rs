use std::fmt;

use serde::{Deserialize, Serialize};

use super::line::Line;
use super::resolved::ResolvedAction;

/// What a conditional does to its targets when its group holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Show,
    Hide,
    Disable,
}

impl Action {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Show => "show",
            Action::Hide => "hide",
            Action::Disable => "disable",
        }
    }

    /// Parse an exchange-format `type`. `Ok(None)` is the empty type of a
    /// conditional that has not been configured yet.
    pub(crate) fn parse(raw: &str) -> Result<Option<Action>, ()> {
        match raw {
            "" => Ok(None),
            "show" => Ok(Some(Action::Show)),
            "hide" => Ok(Some(Action::Hide)),
            "disable" => Ok(Some(Action::Disable)),
            _ => Err(()),
        }
    }

    /// Resolved action of a target while the group holds.
    #[must_use]
    pub fn when_fired(self) -> ResolvedAction {
        match self {
            Action::Show => ResolvedAction::Visible,
            Action::Hide => ResolvedAction::Hidden,
            Action::Disable => ResolvedAction::Disabled,
        }
    }

    /// Resolved action of a target while the group does not hold.
    #[must_use]
    pub fn otherwise(self) -> ResolvedAction {
        match self {
            Action::Show => ResolvedAction::Hidden,
            Action::Hide => ResolvedAction::Visible,
            Action::Disable => ResolvedAction::Enabled,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named rule: when every line of `group` holds, `action` applies to `targets`.
///
/// A conditional without a name, an action, or any lines is inactive and has
/// no effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conditional {
    pub id: String,
    pub name: String,
    pub action: Option<Action>,
    pub group: Vec<Line>,
    pub targets: Vec<String>,
}

impl Conditional {
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.name.trim().is_empty() && self.action.is_some() && !self.group.is_empty()
    }

    /// Every field the group reads, in line order. May contain repeats.
    pub fn referenced_fields(&self) -> impl Iterator<Item = &str> {
        self.group.iter().flat_map(Line::referenced_fields)
    }

    /// Fields this conditional may not target because its group reads them.
    #[must_use]
    pub fn fields_not_allowed(&self) -> Vec<&str> {
        let mut fields: Vec<&str> = Vec::new();
        for field in self.referenced_fields() {
            if !fields.contains(&field) {
                fields.push(field);
            }
        }
        fields
    }
}

/// A conditional placed at its position in the rule set.
///
/// `index` is the RuleSet position and decides conflicts: higher wins.
#[derive(Debug, Clone)]
pub(crate) struct CompiledConditional {
    pub(crate) conditional: Conditional,
    pub(crate) index: usize,
    pub(crate) active: bool,
}

impl CompiledConditional {
    pub(crate) fn new(conditional: Conditional, index: usize) -> Self {
        let active = conditional.is_active();
        Self {
            conditional,
            index,
            active,
        }
    }

    pub(crate) fn id(&self) -> &str {
        &self.conditional.id
    }
}
