#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::unify::Unifier;

/// Settings for a [`QueryEngine`](crate::QueryEngine)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Reject bindings that would make a variable occur in its own value
    pub occurs_check: bool,
    /// Maximum resolution depth; `None` searches without bound
    pub max_depth: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            occurs_check: true,
            max_depth: None,
        }
    }
}

impl EngineConfig {
    /// Enable or disable the occurs check
    #[must_use]
    pub fn with_occurs_check(mut self, occurs_check: bool) -> Self {
        self.occurs_check = occurs_check;
        self
    }

    /// Bound the resolution depth
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    pub(crate) fn unifier(&self) -> Unifier {
        Unifier::new(self.occurs_check)
    }
}
