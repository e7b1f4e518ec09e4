use std::collections::{HashMap, HashSet};

use tracing::warn;

use crate::index::DependencyIndex;
use crate::types::{CompiledConditional, FieldRegistry};
use crate::{Conditional, Field, RuleSet, RuleSetError};

pub(crate) fn compile(
    fields: Vec<Field>,
    conditionals: Vec<Conditional>,
) -> Result<RuleSet, RuleSetError> {
    let fields = register_fields(fields)?;
    check_ids(&conditionals)?;
    check_self_targets(&conditionals)?;
    report_malformed_lines(&conditionals);

    let compiled: Vec<CompiledConditional> = conditionals
        .into_iter()
        .enumerate()
        .map(|(index, c)| CompiledConditional::new(c, index))
        .collect();

    let index = DependencyIndex::build(&compiled);
    let conditional_indices: HashMap<String, usize> = compiled
        .iter()
        .map(|c| (c.id().to_owned(), c.index))
        .collect();

    Ok(RuleSet {
        conditionals: compiled,
        fields,
        index,
        conditional_indices,
    })
}

fn register_fields(fields: Vec<Field>) -> Result<FieldRegistry, RuleSetError> {
    let mut registry = FieldRegistry::new();
    for field in fields {
        let id = field.id().to_owned();
        if !registry.register(field) {
            return Err(RuleSetError::DuplicateField { id });
        }
    }
    Ok(registry)
}

fn check_ids(conditionals: &[Conditional]) -> Result<(), RuleSetError> {
    let mut seen = HashSet::new();
    for conditional in conditionals {
        if conditional.id.is_empty() {
            return Err(RuleSetError::EmptyConditionalId);
        }
        if !seen.insert(conditional.id.as_str()) {
            return Err(RuleSetError::DuplicateConditional {
                id: conditional.id.clone(),
            });
        }
    }
    Ok(())
}

/// A conditional must not act on a field its own group reads.
fn check_self_targets(conditionals: &[Conditional]) -> Result<(), RuleSetError> {
    for conditional in conditionals {
        let read: HashSet<&str> = conditional.referenced_fields().collect();
        if let Some(field) = conditional.targets.iter().find(|t| read.contains(t.as_str())) {
            return Err(RuleSetError::SelfTarget {
                conditional: conditional.id.clone(),
                field: field.clone(),
            });
        }
    }
    Ok(())
}

/// Malformed lines are accepted and fail closed; say so once, up front.
fn report_malformed_lines(conditionals: &[Conditional]) {
    for conditional in conditionals.iter().filter(|c| c.is_active()) {
        for line in conditional.group.iter().filter(|l| !l.is_well_formed()) {
            warn!(
                conditional = %conditional.id,
                line = %line.id,
                field = %line.field,
                compare = %line.compare,
                "malformed line never holds"
            );
        }
    }
}
