/// Tunables of an [`Engine`](crate::Engine).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    /// Clear a field's stored value when it becomes hidden.
    pub clear_hidden_values: bool,
    /// Ceiling on field visits in one propagation pass, on top of the
    /// once-per-field guard.
    pub max_pass_visits: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            clear_hidden_values: true,
            max_pass_visits: usize::MAX,
        }
    }
}

impl EngineOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_clear_hidden_values(mut self, clear: bool) -> Self {
        self.clear_hidden_values = clear;
        self
    }

    #[must_use]
    pub fn with_max_pass_visits(mut self, limit: usize) -> Self {
        self.max_pass_visits = limit;
        self
    }
}
