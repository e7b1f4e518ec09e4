use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, warn};

use crate::evaluate::{evaluate, resolve_target};
use crate::reconcile::reconcile;
use crate::{
    Diagnostic, EngineOptions, Field, FieldValue, FieldValueStore, PassReport, ResolvedAction,
    ResolvedState, RuleSet, SideEffect, StateChange,
};

/// Conditional logic for one live form instance.
///
/// Owns the form's value store and resolved state. Every entry point runs a
/// complete propagation pass, cascades included, before it returns, so
/// callers on the form's event loop never observe a half-applied change.
/// Engines for different forms share nothing but an optional `Arc<RuleSet>`.
///
/// # Example
///
/// ```
/// use fieldgate::{line, Engine, FieldValueStore, ResolvedAction, RuleSetBuilder};
///
/// let ruleset = RuleSetBuilder::new()
///     .conditional("con_1", |c| c.hide().when(line("fld_A").is("yes")).target("fld_B"))
///     .compile()
///     .unwrap();
///
/// let mut engine = Engine::initialize(ruleset, FieldValueStore::new().with("fld_B", "note"));
/// let report = engine.on_field_changed("fld_A", "yes");
///
/// assert_eq!(engine.resolved_action("fld_B"), ResolvedAction::Hidden);
/// assert_eq!(engine.value("fld_B"), None);
/// assert_eq!(report.delta().len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Engine {
    ruleset: Arc<RuleSet>,
    options: EngineOptions,
    store: FieldValueStore,
    /// Values the form was loaded with, layered over the rule set's defaults.
    initial_values: FieldValueStore,
    /// Fields the user has edited since load or the last reset.
    touched: HashSet<String>,
    resolved: ResolvedState,
    /// Latest outcome per conditional position; `None` until evaluated.
    outcomes: Vec<Option<bool>>,
    diagnostics: Vec<Diagnostic>,
}

impl Engine {
    /// Load a form: seed values (declared defaults first, then
    /// `initial_values`) and run one full evaluation pass.
    pub fn initialize(ruleset: impl Into<Arc<RuleSet>>, initial_values: FieldValueStore) -> Self {
        Self::initialize_with(ruleset, initial_values, EngineOptions::default())
    }

    /// [`initialize`](Self::initialize) with explicit options.
    pub fn initialize_with(
        ruleset: impl Into<Arc<RuleSet>>,
        initial_values: FieldValueStore,
        options: EngineOptions,
    ) -> Self {
        let ruleset = ruleset.into();
        let mut engine = Self {
            outcomes: vec![None; ruleset.len()],
            ruleset,
            options,
            store: FieldValueStore::new(),
            initial_values,
            touched: HashSet::new(),
            resolved: ResolvedState::new(),
            diagnostics: Vec::new(),
        };
        engine.store = engine.seeded_store();
        let _ = engine.full_pass();
        engine
    }

    /// A field changed on the form. Re-evaluates only the conditionals that
    /// read it and cascades through cleared values.
    ///
    /// Setting a field to the value it already holds is a no-op.
    pub fn on_field_changed(&mut self, field: &str, value: impl Into<FieldValue>) -> PassReport {
        self.touch(field);
        if !self.store.set(field, value) {
            return PassReport::unchanged();
        }
        self.propagate(field)
    }

    /// A field was emptied on the form.
    pub fn on_field_cleared(&mut self, field: &str) -> PassReport {
        self.touch(field);
        if !self.store.clear(field) {
            return PassReport::unchanged();
        }
        self.propagate(field)
    }

    /// Swap in a new rule set and re-evaluate every conditional against the
    /// current values. Fields no longer targeted return to `visible`.
    pub fn on_rule_set_changed(&mut self, ruleset: impl Into<Arc<RuleSet>>) -> PassReport {
        self.ruleset = ruleset.into();
        self.outcomes = vec![None; self.ruleset.len()];
        self.diagnostics.clear();
        self.full_pass()
    }

    /// Form reset: restore the load-time values, over the current rule
    /// set's defaults, and evaluate from scratch.
    pub fn reset(&mut self) -> PassReport {
        self.store = self.seeded_store();
        self.touched.clear();
        self.outcomes = vec![None; self.ruleset.len()];
        self.diagnostics.clear();
        self.full_pass()
    }

    /// Action the rendering layer should apply to `field`.
    #[must_use]
    pub fn resolved_action(&self, field: &str) -> ResolvedAction {
        self.resolved.get(field)
    }

    #[must_use]
    pub fn resolved_state(&self) -> &ResolvedState {
        &self.resolved
    }

    #[must_use]
    pub fn value(&self, field: &str) -> Option<&FieldValue> {
        self.store.get(field)
    }

    #[must_use]
    pub fn store(&self) -> &FieldValueStore {
        &self.store
    }

    #[must_use]
    pub fn ruleset(&self) -> &Arc<RuleSet> {
        &self.ruleset
    }

    #[must_use]
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Diagnostics recorded since the rule set was loaded or the form reset.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Values that go out with the form: everything not hidden or disabled.
    #[must_use]
    pub fn submission(&self) -> BTreeMap<String, FieldValue> {
        self.store
            .iter()
            .filter(|(field, _)| self.resolved.get(field).is_submittable())
            .map(|(field, value)| (field.to_owned(), value.clone()))
            .collect()
    }

    /// Declared defaults of the current rule set, then the load-time values.
    fn seeded_store(&self) -> FieldValueStore {
        let mut store = FieldValueStore::new();
        for (field, value) in self.ruleset.fields().defaults() {
            let _ = store.set(field, value.clone());
        }
        for (field, value) in self.initial_values.iter() {
            let _ = store.set(field, value.clone());
        }
        store
    }

    fn touch(&mut self, field: &str) {
        if !self.touched.contains(field) {
            self.touched.insert(field.to_owned());
        }
    }

    fn full_pass(&mut self) -> PassReport {
        let start = Instant::now();
        debug!(conditionals = self.ruleset.len(), "full evaluation pass");
        let mut pass = Pass::new(self.options.max_pass_visits);

        // fields left over from a previous rule set fall back to the default
        let stale: Vec<(String, ResolvedAction)> = self
            .resolved
            .iter()
            .filter(|(field, _)| !self.ruleset.index.is_targeted(field))
            .map(|(field, _)| (field.to_owned(), ResolvedAction::default()))
            .collect();
        if !stale.is_empty() {
            self.apply(&stale, None, &mut pass);
        }

        let all: Vec<usize> = (0..self.ruleset.len()).collect();
        self.run_conditionals(&all, None, &mut pass);

        // a reset can restore values under fields that never left `hidden`
        if self.options.clear_hidden_values {
            let refilled: Vec<String> = self
                .resolved
                .iter()
                .filter(|&(field, action)| {
                    action == ResolvedAction::Hidden && self.store.get(field).is_some()
                })
                .map(|(field, _)| field.to_owned())
                .collect();
            for field in refilled {
                if self.store.clear(&field) {
                    pass.visit(&field, None);
                    pass.side_effects.push(SideEffect::ClearValue(field));
                }
            }
        }
        self.drain(&mut pass);
        self.finish(pass, start)
    }

    fn propagate(&mut self, field: &str) -> PassReport {
        let start = Instant::now();
        debug!(field, "propagation pass");
        let mut pass = Pass::new(self.options.max_pass_visits);
        pass.visit(field, None);
        self.drain(&mut pass);
        self.finish(pass, start)
    }

    fn drain(&mut self, pass: &mut Pass) {
        while let Some(field) = pass.queue.pop_front() {
            let ruleset = Arc::clone(&self.ruleset);
            self.run_conditionals(ruleset.index.affected_by(&field), Some(field.as_str()), pass);
        }
    }

    /// Evaluate `indices`, resolve their targets, and apply the transitions.
    fn run_conditionals(&mut self, indices: &[usize], cause: Option<&str>, pass: &mut Pass) {
        let ruleset = Arc::clone(&self.ruleset);
        let results = evaluate(&ruleset, indices, &self.store);

        let mut targets: Vec<&str> = Vec::new();
        for &(idx, fired) in &results {
            self.outcomes[idx] = Some(fired);
            let compiled = &ruleset.conditionals[idx];
            pass.evaluated.push((compiled.id().to_owned(), fired));
            for target in &compiled.conditional.targets {
                if !targets.contains(&target.as_str()) {
                    targets.push(target);
                }
            }
        }

        let resolutions: Vec<(String, ResolvedAction)> = targets
            .into_iter()
            .filter_map(|t| resolve_target(&ruleset, t, &self.outcomes).map(|a| (t.to_owned(), a)))
            .collect();
        self.apply(&resolutions, cause, pass);
    }

    fn apply(
        &mut self,
        resolutions: &[(String, ResolvedAction)],
        cause: Option<&str>,
        pass: &mut Pass,
    ) {
        let outcome = reconcile(&mut self.resolved, resolutions, &self.options);
        let mut revealed = Vec::new();
        for change in outcome.changes {
            if change.from == ResolvedAction::Hidden && change.to != ResolvedAction::Hidden {
                revealed.push(change.field.clone());
            }
            pass.record(change);
        }
        for effect in outcome.effects {
            if let SideEffect::ClearValue(field) = &effect {
                if self.store.clear(field) {
                    pass.visit(field, cause);
                }
            }
            pass.side_effects.push(effect);
        }

        // a field the user never filled in comes back with its default
        let ruleset = Arc::clone(&self.ruleset);
        for field in revealed {
            if self.touched.contains(&field) || self.store.get(&field).is_some() {
                continue;
            }
            let Some(default) = ruleset.fields().get(&field).and_then(Field::default_value) else {
                continue;
            };
            if self.store.set(&field, default.clone()) {
                pass.side_effects.push(SideEffect::RestoreDefault(field.clone()));
                pass.visit(&field, cause);
            }
        }
    }

    fn finish(&mut self, pass: Pass, start: Instant) -> PassReport {
        self.diagnostics.extend(pass.diagnostics.iter().cloned());
        let delta = pass
            .delta
            .into_iter()
            .filter(|change| change.from != change.to)
            .collect();
        PassReport::new(
            delta,
            pass.side_effects,
            pass.diagnostics,
            pass.evaluated,
            start.elapsed(),
        )
    }
}

/// Bookkeeping for one propagation pass.
struct Pass {
    queue: VecDeque<String>,
    visited: HashSet<String>,
    /// Field that caused each visit; roots map to `None`.
    parents: HashMap<String, Option<String>>,
    visits: usize,
    limit: usize,
    stopped: bool,
    delta: Vec<StateChange>,
    delta_positions: HashMap<String, usize>,
    side_effects: Vec<SideEffect>,
    diagnostics: Vec<Diagnostic>,
    evaluated: Vec<(String, bool)>,
}

impl Pass {
    fn new(limit: usize) -> Self {
        Self {
            queue: VecDeque::new(),
            visited: HashSet::new(),
            parents: HashMap::new(),
            visits: 0,
            limit,
            stopped: false,
            delta: Vec::new(),
            delta_positions: HashMap::new(),
            side_effects: Vec::new(),
            diagnostics: Vec::new(),
            evaluated: Vec::new(),
        }
    }

    /// Queue `field` for propagation unless it was already visited this pass.
    fn visit(&mut self, field: &str, cause: Option<&str>) {
        if self.stopped {
            return;
        }
        if self.visited.contains(field) {
            let mut path = self.path_to(cause);
            path.push(field.to_owned());
            warn!(field, path = %path.join(" -> "), "cycle in conditional rules, propagation truncated");
            self.diagnostics.push(Diagnostic::Cycle {
                field: field.to_owned(),
                path,
            });
            return;
        }
        if self.visits >= self.limit {
            warn!(limit = self.limit, "propagation visit limit reached");
            self.stopped = true;
            self.queue.clear();
            self.diagnostics.push(Diagnostic::VisitLimit { limit: self.limit });
            return;
        }
        self.visits += 1;
        self.visited.insert(field.to_owned());
        self.parents.insert(field.to_owned(), cause.map(str::to_owned));
        self.queue.push_back(field.to_owned());
    }

    /// Chain of fields from the root of the cascade down to `field`.
    fn path_to(&self, field: Option<&str>) -> Vec<String> {
        let mut path = Vec::new();
        let mut current = field.map(str::to_owned);
        while let Some(f) = current {
            if path.contains(&f) {
                break;
            }
            current = self.parents.get(&f).cloned().flatten();
            path.push(f);
        }
        path.reverse();
        path
    }

    /// Merge a transition into the delta so each field appears once.
    fn record(&mut self, change: StateChange) {
        if let Some(&pos) = self.delta_positions.get(&change.field) {
            self.delta[pos].to = change.to;
        } else {
            self.delta_positions.insert(change.field.clone(), self.delta.len());
            self.delta.push(change);
        }
    }
}
