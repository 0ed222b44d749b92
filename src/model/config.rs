use serde::{Deserialize, Serialize};

use super::profile::ScopeProfile;

/// Configuration from config.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Task file; `~` expands to the home directory
    #[serde(default = "default_todo_file")]
    pub todo_file: String,
    /// Sort the list after every change
    #[serde(default)]
    pub keep_sorted: bool,
    /// Stamp today's date on added tasks
    #[serde(default)]
    pub prepend_date: bool,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub scan: ScanConfig,
    /// Extra scan profiles, tried before the built-in ones
    #[serde(default)]
    pub profiles: Vec<ScopeProfile>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            todo_file: default_todo_file(),
            keep_sorted: false,
            prepend_date: false,
            search: SearchConfig::default(),
            scan: ScanConfig::default(),
            profiles: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchConfig {
    #[serde(default)]
    pub strict: bool,
    #[serde(default)]
    pub case_sensitive: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScanConfig {
    /// Comment keywords, most specific spelling first
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,
    /// Priority letter for each category, by position
    #[serde(default = "default_priorities")]
    pub priorities: Vec<String>,
    /// On a file's first line, excludes the whole file
    #[serde(default = "default_skip_marker")]
    pub skip_marker: String,
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Larger files are skipped (bytes)
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        ScanConfig {
            categories: default_categories(),
            priorities: default_priorities(),
            skip_marker: default_skip_marker(),
            max_depth: default_max_depth(),
            max_file_size: default_max_file_size(),
        }
    }
}

fn default_todo_file() -> String {
    "~/.sol/todo.txt".to_string()
}

pub fn default_categories() -> Vec<String> {
    ["UPSTREAM", "IDEA", "TODO?", "TODO", "FIXME"] // sscs: skip
        .iter()
        .map(|s| s.to_string())
        .collect()
}

pub fn default_priorities() -> Vec<String> {
    ["D", "C", "C", "B", "A"].iter().map(|s| s.to_string()).collect()
}

pub fn default_skip_marker() -> String {
    "sscs: skip".to_string()
}

pub fn default_max_depth() -> usize {
    4
}

/// 1 MiB
pub fn default_max_file_size() -> u64 {
    1024 * 1024
}
