use crate::{EngineOptions, ResolvedAction, ResolvedState, SideEffect, StateChange};

/// State transitions and the side effects they require, in application order.
#[derive(Debug, Default)]
pub(crate) struct Reconciliation {
    pub(crate) changes: Vec<StateChange>,
    pub(crate) effects: Vec<SideEffect>,
}

/// Apply freshly resolved actions to `state`, recording only real transitions.
///
/// Value clearing is only emitted here; the engine applies it to the store
/// and propagates the change.
pub(crate) fn reconcile(
    state: &mut ResolvedState,
    resolutions: &[(String, ResolvedAction)],
    options: &EngineOptions,
) -> Reconciliation {
    let mut out = Reconciliation::default();
    for (field, to) in resolutions {
        let from = state.set(field, *to);
        if from == *to {
            continue;
        }
        transition_effects(field, from, *to, options, &mut out.effects);
        out.changes.push(StateChange {
            field: field.clone(),
            from,
            to: *to,
        });
    }
    out
}

fn transition_effects(
    field: &str,
    from: ResolvedAction,
    to: ResolvedAction,
    options: &EngineOptions,
    effects: &mut Vec<SideEffect>,
) {
    match to {
        ResolvedAction::Hidden => {
            effects.push(SideEffect::Hide(field.to_owned()));
            if options.clear_hidden_values {
                effects.push(SideEffect::ClearValue(field.to_owned()));
            }
        }
        ResolvedAction::Disabled => {
            if from == ResolvedAction::Hidden {
                effects.push(SideEffect::Show(field.to_owned()));
            }
            effects.push(SideEffect::Disable(field.to_owned()));
        }
        // visible and enabled differ only in name
        ResolvedAction::Visible | ResolvedAction::Enabled => match from {
            ResolvedAction::Hidden => effects.push(SideEffect::Show(field.to_owned())),
            ResolvedAction::Disabled => effects.push(SideEffect::Enable(field.to_owned())),
            ResolvedAction::Visible | ResolvedAction::Enabled => {}
        },
    }
}
