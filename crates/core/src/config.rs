//! Solver configuration schema shared by the library and the command-line tools.
//! This module exists so budgets have one serde-backed definition with unbounded defaults.
//! It does not own file discovery or command-line overrides.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Optional search budgets. `None` means unbounded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchLimits {
    pub max_expanded: Option<usize>,
    pub time_limit_ms: Option<u64>,
}

impl SearchLimits {
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_ms.map(Duration::from_millis)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolverConfig {
    pub search: SearchLimits,
}
