//! Solver config file loading and command-line overrides.
//! This module exists so budgets resolve the same way for every entry point.
//! It does not own the config schema; that lives in `trapwalk_core::config`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use trapwalk_core::{SearchLimits, SolverConfig};

pub fn load_solver_config(path: Option<&Path>) -> Result<SolverConfig> {
    let Some(path) = path else {
        return Ok(SolverConfig::default());
    };
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Command-line values win over file values; unset flags keep the file's budget.
pub fn apply_overrides(
    limits: SearchLimits,
    max_expanded: Option<usize>,
    time_limit_ms: Option<u64>,
) -> SearchLimits {
    SearchLimits {
        max_expanded: max_expanded.or(limits.max_expanded),
        time_limit_ms: time_limit_ms.or(limits.time_limit_ms),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn missing_path_yields_unbounded_defaults() {
        let config = load_solver_config(None).expect("defaults");
        assert_eq!(config, SolverConfig::default());
    }

    #[test]
    fn search_table_is_read_from_toml() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("solver.toml");
        fs::write(&path, "[search]\nmax_expanded = 5000\ntime_limit_ms = 250\n").expect("write");

        let config = load_solver_config(Some(&path)).expect("config parses");
        assert_eq!(
            config.search,
            SearchLimits { max_expanded: Some(5000), time_limit_ms: Some(250) }
        );
    }

    #[test]
    fn unknown_keys_and_missing_files_are_errors() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("typo.toml");
        fs::write(&path, "[search]\nmax_expand = 3\n").expect("write");
        assert!(load_solver_config(Some(&path)).is_err());

        let missing = dir.path().join("missing.toml");
        let error = load_solver_config(Some(&missing)).expect_err("missing file");
        assert!(error.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn flags_override_file_budgets() {
        let file = SearchLimits { max_expanded: Some(10), time_limit_ms: Some(20) };
        assert_eq!(
            apply_overrides(file, Some(3), None),
            SearchLimits { max_expanded: Some(3), time_limit_ms: Some(20) }
        );
        assert_eq!(apply_overrides(SearchLimits::default(), None, None), SearchLimits::default());
    }
}
