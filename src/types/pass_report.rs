use std::fmt;
use std::time::Duration;

use super::resolved::{SideEffect, StateChange};

/// A problem found during a pass. Recorded, never raised: the form stays
/// interactive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A field would have been visited a second time in one pass. `path` runs
    /// from the field that started the cascade to the revisited field.
    Cycle { field: String, path: Vec<String> },
    /// The pass hit [`EngineOptions::max_pass_visits`](crate::EngineOptions)
    /// and stopped.
    VisitLimit { limit: usize },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::Cycle { field, path } => {
                write!(f, "cycle at '{field}': {}", path.join(" -> "))
            }
            Diagnostic::VisitLimit { limit } => {
                write!(f, "propagation stopped after {limit} field visits")
            }
        }
    }
}

/// Outcome of one propagation pass, returned by
/// [`Engine::on_field_changed()`](crate::Engine::on_field_changed) and the
/// full-evaluation entry points.
///
/// The delta holds one entry per field whose resolved action differs from
/// before the pass. Side effects are listed in the order they were applied.
#[derive(Debug, Clone, Default)]
#[must_use]
pub struct PassReport {
    delta: Vec<StateChange>,
    side_effects: Vec<SideEffect>,
    diagnostics: Vec<Diagnostic>,
    evaluated: Vec<(String, bool)>,
    duration: Duration,
}

impl PassReport {
    pub(crate) fn new(
        delta: Vec<StateChange>,
        side_effects: Vec<SideEffect>,
        diagnostics: Vec<Diagnostic>,
        evaluated: Vec<(String, bool)>,
        duration: Duration,
    ) -> Self {
        Self {
            delta,
            side_effects,
            diagnostics,
            evaluated,
            duration,
        }
    }

    /// Report of a pass that did nothing.
    pub(crate) fn unchanged() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn delta(&self) -> &[StateChange] {
        &self.delta
    }

    #[must_use]
    pub fn side_effects(&self) -> &[SideEffect] {
        &self.side_effects
    }

    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Conditionals evaluated during the pass with their outcome, in
    /// evaluation order. A conditional can appear more than once when a
    /// cascade re-evaluates it.
    #[must_use]
    pub fn evaluated(&self) -> &[(String, bool)] {
        &self.evaluated
    }

    /// Wall-clock duration of the pass.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// `true` if the pass changed no resolved action and applied no side effect.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.delta.is_empty() && self.side_effects.is_empty()
    }
}

impl fmt::Display for PassReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let delta: Vec<String> = self.delta.iter().map(ToString::to_string).collect();
        write!(f, "delta: [{}]", delta.join(", "))?;
        let effects: Vec<String> = self.side_effects.iter().map(ToString::to_string).collect();
        write!(f, ", effects: [{}]", effects.join(", "))?;
        if !self.diagnostics.is_empty() {
            write!(f, ", diagnostics: {}", self.diagnostics.len())?;
        }
        write!(f, ", duration: {:?}", self.duration)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ResolvedAction;

    fn hide_b() -> PassReport {
        PassReport::new(
            vec![StateChange {
                field: "fld_B".into(),
                from: ResolvedAction::Visible,
                to: ResolvedAction::Hidden,
            }],
            vec![
                SideEffect::Hide("fld_B".into()),
                SideEffect::ClearValue("fld_B".into()),
            ],
            vec![],
            vec![("con_1".into(), true)],
            Duration::from_nanos(500),
        )
    }

    #[test]
    fn report_accessors() {
        let report = hide_b();
        assert_eq!(report.delta().len(), 1);
        assert_eq!(report.side_effects().len(), 2);
        assert!(report.diagnostics().is_empty());
        assert_eq!(report.evaluated(), &[("con_1".to_owned(), true)]);
        assert_eq!(report.duration(), Duration::from_nanos(500));
        assert!(!report.is_noop());
    }

    #[test]
    fn unchanged_is_noop() {
        assert!(PassReport::unchanged().is_noop());
    }

    #[test]
    fn report_display() {
        let s = hide_b().to_string();
        assert!(s.contains("delta: [fld_B: visible -> hidden]"));
        assert!(s.contains("effects: [hide fld_B, clear fld_B]"));
        assert!(!s.contains("diagnostics"));
    }

    #[test]
    fn cycle_display() {
        let d = Diagnostic::Cycle {
            field: "fld_X".into(),
            path: vec!["fld_X".into(), "fld_Y".into(), "fld_X".into()],
        };
        assert_eq!(d.to_string(), "cycle at 'fld_X': fld_X -> fld_Y -> fld_X");
    }
}
