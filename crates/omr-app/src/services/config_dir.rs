// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-aware configuration file resolution.

use std::path::{Path, PathBuf};

use omr_core::{GraderConfig, Result};
use tracing::debug;

const CONFIG_FILE: &str = "config.json";

/// Default location of the grader configuration file.
///
/// `$XDG_CONFIG_HOME/omr/config.json`, else `~/.config/omr/config.json`.
pub fn default_config_path() -> PathBuf {
    config_base().join("omr").join(CONFIG_FILE)
}

/// Load the configuration the grader should run with.
///
/// An explicit path must exist and parse. Without one, the default location
/// is used when the file is present, otherwise the built-in defaults.
pub fn resolve_config(explicit: Option<&Path>) -> Result<GraderConfig> {
    if let Some(path) = explicit {
        return GraderConfig::load(path);
    }
    let path = default_config_path();
    if path.is_file() {
        return GraderConfig::load(&path);
    }
    debug!(path = %path.display(), "no configuration file, using defaults");
    Ok(GraderConfig::default())
}

fn config_base() -> PathBuf {
    // Try XDG config dir, then fallback to home
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME")
        && !xdg.is_empty()
    {
        return PathBuf::from(xdg);
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".config");
    }
    // Last resort
    PathBuf::from(".")
}

#[cfg(test)]
mod tests {
    use super::*;
    use omr_core::{GradingPolicy, OmrError};

    #[test]
    fn default_path_ends_in_omr_config() {
        let path = default_config_path();
        assert!(path.ends_with("omr/config.json"), "{}", path.display());
    }

    #[test]
    fn explicit_path_is_loaded() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("grader.json");
        let config = GraderConfig {
            grading: GradingPolicy::ExactMatch,
            ..GraderConfig::default()
        };
        config.save(&path).expect("save");

        let loaded = resolve_config(Some(&path)).expect("load");
        assert_eq!(loaded.grading, GradingPolicy::ExactMatch);
    }

    #[test]
    fn missing_explicit_path_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = resolve_config(Some(&dir.path().join("absent.json"))).unwrap_err();
        assert!(matches!(err, OmrError::Io(_)));
    }
}
