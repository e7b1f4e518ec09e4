use std::collections::HashMap;

use crate::types::CompiledConditional;

/// Derived lookups over the active conditionals of a rule set.
///
/// `watchers` answers "which conditionals read this field" so that a change
/// only re-evaluates what depends on it. `targeting` answers "which
/// conditionals act on this field" for conflict resolution. Both hold RuleSet
/// positions in ascending order.
#[derive(Debug, Clone, Default)]
pub(crate) struct DependencyIndex {
    watchers: HashMap<String, Vec<usize>>,
    targeting: HashMap<String, Vec<usize>>,
    targeted: Vec<String>,
}

impl DependencyIndex {
    pub(crate) fn build(conditionals: &[CompiledConditional]) -> Self {
        let mut index = Self::default();
        for compiled in conditionals.iter().filter(|c| c.active) {
            for field in compiled.conditional.referenced_fields() {
                push_unique(index.watchers.entry(field.to_owned()).or_default(), compiled.index);
            }
            for target in &compiled.conditional.targets {
                let entry = index.targeting.entry(target.clone()).or_default();
                if entry.is_empty() {
                    index.targeted.push(target.clone());
                }
                push_unique(entry, compiled.index);
            }
        }
        index
    }

    /// Conditionals whose group reads `field`.
    pub(crate) fn affected_by(&self, field: &str) -> &[usize] {
        self.watchers.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    /// Conditionals that act on `field`.
    pub(crate) fn targeting(&self, field: &str) -> &[usize] {
        self.targeting.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    /// Every targeted field, in order of first appearance in the rule set.
    pub(crate) fn targeted_fields(&self) -> &[String] {
        &self.targeted
    }

    pub(crate) fn is_targeted(&self, field: &str) -> bool {
        self.targeting.contains_key(field)
    }
}

fn push_unique(entry: &mut Vec<usize>, index: usize) {
    if entry.last() != Some(&index) {
        entry.push(index);
    }
}
