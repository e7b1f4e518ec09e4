use std::borrow::Cow;

use tracing::debug;

use crate::types::FieldRegistry;
use crate::{compare, Conditional, FieldValue, FieldValueStore, Line, Operand, ResolvedAction, RuleSet};

/// Evaluate the conditionals at `indices`. Inactive ones are skipped.
pub(crate) fn evaluate(
    ruleset: &RuleSet,
    indices: &[usize],
    store: &FieldValueStore,
) -> Vec<(usize, bool)> {
    indices
        .iter()
        .map(|&idx| &ruleset.conditionals[idx])
        .filter(|c| c.active)
        .map(|c| {
            let fired = eval_conditional(&c.conditional, store, &ruleset.fields);
            debug!(conditional = %c.id(), fired, "evaluated conditional");
            (c.index, fired)
        })
        .collect()
}

/// AND over the group, stopping at the first line that does not hold.
fn eval_conditional(conditional: &Conditional, store: &FieldValueStore, fields: &FieldRegistry) -> bool {
    conditional
        .group
        .iter()
        .all(|line| eval_line(line, store, fields))
}

fn eval_line(line: &Line, store: &FieldValueStore, fields: &FieldRegistry) -> bool {
    if line.field.is_empty() {
        return false;
    }
    let operand = resolve_operand(&line.value, store);
    compare::compare(
        &line.compare,
        store.get(&line.field),
        &operand,
        fields.field_type(&line.field),
    )
}

fn resolve_operand<'a>(operand: &Operand, store: &'a FieldValueStore) -> Cow<'a, FieldValue> {
    match operand {
        Operand::Literal(v) => Cow::Owned(FieldValue::Text(v.clone())),
        Operand::Field(id) => store
            .get(id)
            .map_or_else(|| Cow::Owned(FieldValue::unset()), Cow::Borrowed),
    }
}

/// Resolve one target from the latest outcome of every conditional acting on it.
///
/// The last firing conditional in rule set order wins. If none fires, the
/// last evaluated one contributes its "otherwise" action. `None` when no
/// conditional acting on the field has been evaluated yet.
pub(crate) fn resolve_target(
    ruleset: &RuleSet,
    field: &str,
    outcomes: &[Option<bool>],
) -> Option<ResolvedAction> {
    let mut fired = None;
    let mut otherwise = None;
    for &idx in ruleset.index.targeting(field) {
        let (Some(outcome), Some(action)) = (outcomes[idx], ruleset.conditionals[idx].conditional.action)
        else {
            continue;
        };
        if outcome {
            fired = Some(action.when_fired());
        } else {
            otherwise = Some(action.otherwise());
        }
    }
    fired.or(otherwise)
}
