//! Runbook YAML parser.
//!
//! Structural shape comes from serde; the cross-step rules (integration
//! categories, method allow-lists, unique ids, context references) are
//! enforced by [`Runbook::validate`]. Every failure carries the file path.

use glob::glob;
use std::path::{Path, PathBuf};
use tracing::warn;

use runbook_domain::runbook::definition::Runbook;
use runbook_domain::RunbookError;

pub struct RunbookParser;

impl RunbookParser {
    /// Parse and validate runbook YAML. `path` is used only for error
    /// reporting and the runbook's `source_path`.
    pub fn parse_str(path: &str, raw: &str) -> Result<Runbook, RunbookError> {
        let value: serde_yaml::Value = serde_yaml::from_str(raw)
            .map_err(|e| RunbookError::parse(path, format!("Invalid YAML: {e}")))?;

        if !value.is_mapping() {
            return Err(RunbookError::parse(
                path,
                "Top-level value must be a YAML mapping",
            ));
        }

        let mut runbook: Runbook = serde_yaml::from_value(value)
            .map_err(|e| RunbookError::parse(path, e.to_string()))?;

        runbook
            .validate()
            .map_err(|reason| RunbookError::parse(path, reason))?;

        runbook.source_path = Some(path.to_string());
        Ok(runbook)
    }

    /// Load and validate a single YAML file.
    pub fn load_file(path: impl AsRef<Path>) -> Result<Runbook, RunbookError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| RunbookError::parse(&display, format!("Cannot read file: {e}")))?;
        Self::parse_str(&display, &raw)
    }

    /// Load all `*.yaml` and `*.yml` files from a directory, sorted by name.
    /// Files that fail to parse are skipped with a warning.
    pub fn load_directory(directory: impl AsRef<Path>) -> Vec<Runbook> {
        let mut runbooks = Vec::new();
        for path in Self::list_runbooks(directory) {
            match Self::load_file(&path) {
                Ok(runbook) => runbooks.push(runbook),
                Err(e) => warn!(path = %path.display(), error = %e, "skipping runbook"),
            }
        }
        runbooks
    }

    /// Paths of all YAML files in a directory without parsing them.
    pub fn list_runbooks(directory: impl AsRef<Path>) -> Vec<PathBuf> {
        let directory = directory.as_ref();
        let mut paths: Vec<PathBuf> = Vec::new();
        for extension in ["yaml", "yml"] {
            let pattern = directory.join(format!("*.{extension}"));
            let mut matched: Vec<PathBuf> = glob(&pattern.to_string_lossy())
                .map(|entries| entries.filter_map(Result::ok).collect())
                .unwrap_or_default();
            matched.sort();
            paths.extend(matched);
        }
        paths
    }
}
