//! Engine settings read from the environment.

use std::path::PathBuf;

/// Rule database root. Defaults to `./data`.
pub const DATA_DIR_VAR: &str = "MCTRANSLATE_DATA";
/// `0` or `false` turns off filling output trees from their templates.
pub const PREPOPULATE_VAR: &str = "MCTRANSLATE_PREPOPULATE";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub pre_populate_defaults: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            pre_populate_defaults: true,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            data_dir: var(DATA_DIR_VAR)
                .filter(|dir| !dir.is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            pre_populate_defaults: var(PREPOPULATE_VAR)
                .map(|value| !matches!(value.trim().to_ascii_lowercase().as_str(), "0" | "false"))
                .unwrap_or(defaults.pre_populate_defaults),
        }
    }

    /// One line for the metrics report header.
    pub fn summary(&self) -> String {
        format!(
            "data={} prepopulate={}",
            self.data_dir.display(),
            self.pre_populate_defaults
        )
    }
}
