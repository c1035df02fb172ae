use std::{env, path::PathBuf, str::FromStr};

use tracing::warn;

use crate::history::DEFAULT_CAPACITY;
use crate::writer::DEFAULT_INDENT;

pub const HISTORY_VAR: &str = "SCADTREE_HISTORY";
pub const INDENT_VAR: &str = "SCADTREE_INDENT";
pub const LOG_VAR: &str = "SCADTREE_LOG";
pub const LOG_FILE_VAR: &str = "SCADTREE_LOG_FILE";

/// Columns per nesting level in the tree view.
pub const DEFAULT_DISPLAY_INDENT: usize = 4;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditorConfig {
    /// Maximum number of undo snapshots kept.
    pub history_capacity: usize,
    /// Spaces per level when saving a document.
    pub writer_indent: usize,
    pub display_indent: usize,
    /// Rows moved by page up/down; 0 means the viewport height.
    pub page_size: usize,
    /// `tracing` filter directive for the log file.
    pub log_filter: String,
    /// Logging stays off unless this is set.
    pub log_file: Option<PathBuf>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_CAPACITY,
            writer_indent: DEFAULT_INDENT,
            display_indent: DEFAULT_DISPLAY_INDENT,
            page_size: 0,
            log_filter: "info".to_string(),
            log_file: None,
        }
    }
}

impl EditorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by `SCADTREE_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Like [`EditorConfig::from_env`], reading variables through `lookup`.
    /// Values that fail to parse are skipped with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(capacity) = parse_var(&lookup, HISTORY_VAR) {
            config.history_capacity = capacity;
        }
        if let Some(indent) = parse_var(&lookup, INDENT_VAR) {
            config.writer_indent = indent;
        }
        if let Some(filter) = lookup(LOG_VAR).filter(|value| !value.trim().is_empty()) {
            config.log_filter = filter;
        }
        config.log_file = lookup(LOG_FILE_VAR)
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);
        config
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "ignoring invalid setting");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = EditorConfig::default();
        assert_eq!(config.history_capacity, 100);
        assert_eq!(config.writer_indent, 2);
        assert_eq!(config.display_indent, 4);
        assert_eq!(config.log_filter, "info");
        assert!(config.log_file.is_none());
    }

    #[test]
    fn empty_environment_gives_defaults() {
        assert_eq!(EditorConfig::from_lookup(lookup(&[])), EditorConfig::default());
    }

    #[test]
    fn overrides_from_environment() {
        let config = EditorConfig::from_lookup(lookup(&[
            (HISTORY_VAR, "25"),
            (INDENT_VAR, " 4 "),
            (LOG_VAR, "scad_tree=debug"),
            (LOG_FILE_VAR, "/tmp/scadtree.log"),
        ]));
        assert_eq!(config.history_capacity, 25);
        assert_eq!(config.writer_indent, 4);
        assert_eq!(config.log_filter, "scad_tree=debug");
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/scadtree.log")));
    }

    #[test]
    fn invalid_values_are_ignored() {
        let config = EditorConfig::from_lookup(lookup(&[
            (HISTORY_VAR, "lots"),
            (INDENT_VAR, "-1"),
            (LOG_VAR, "  "),
            (LOG_FILE_VAR, ""),
        ]));
        assert_eq!(config, EditorConfig::default());
    }
}
