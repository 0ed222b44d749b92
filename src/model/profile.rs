use std::path::Path;

use serde::{Deserialize, Serialize};

/// A named allow/deny policy deciding which files and directories a scan
/// may enter.
///
/// Extensions are compared without their leading dot, so `.log` and `log`
/// name the same entry; `""` stands for files without an extension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScopeProfile {
    pub name: String,
    /// Any of these present in the scan root selects this profile
    #[serde(default)]
    pub indicator_files: Vec<String>,
    #[serde(default)]
    pub allowed_extensions: Vec<String>,
    #[serde(default)]
    pub denied_extensions: Vec<String>,
    #[serde(default)]
    pub allowed_files: Vec<String>,
    #[serde(default)]
    pub denied_files: Vec<String>,
    #[serde(default)]
    pub allowed_directories: Vec<String>,
    #[serde(default)]
    pub denied_directories: Vec<String>,
}

impl ScopeProfile {
    pub fn new(name: impl Into<String>) -> Self {
        ScopeProfile {
            name: name.into(),
            ..ScopeProfile::default()
        }
    }

    /// Exact file-name matches decide first (allow before deny); otherwise a
    /// non-empty extension allow-list governs, else the extension deny-list.
    pub fn is_file_allowed(&self, path: &Path) -> bool {
        let name = file_name(path);

        if self.allowed_files.iter().any(|f| *f == name) {
            return true;
        }
        if self.denied_files.iter().any(|f| *f == name) {
            return false;
        }

        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default();

        if !self.allowed_extensions.is_empty() {
            contains_extension(&self.allowed_extensions, &ext)
        } else {
            !contains_extension(&self.denied_extensions, &ext)
        }
    }

    /// A non-empty directory allow-list governs, else the deny-list.
    pub fn is_dir_allowed(&self, path: &Path) -> bool {
        let name = file_name(path);

        if !self.allowed_directories.is_empty() {
            self.allowed_directories.iter().any(|d| *d == name)
        } else {
            !self.denied_directories.iter().any(|d| *d == name)
        }
    }

    /// Whether one of the indicator files exists directly in `root`.
    pub fn matches_root(&self, root: &Path) -> bool {
        self.indicator_files
            .iter()
            .any(|indicator| root.join(indicator).is_file())
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn contains_extension(list: &[String], ext: &str) -> bool {
    list.iter().any(|entry| entry.trim_start_matches('.') == ext)
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Profiles known without any configuration, most specific first.
pub fn builtin_profiles() -> Vec<ScopeProfile> {
    vec![
        ScopeProfile {
            name: "rust".to_string(),
            indicator_files: strings(&["Cargo.toml", "Cargo.lock"]),
            denied_directories: strings(&["target", ".git"]),
            denied_extensions: strings(&[".log"]),
            denied_files: strings(&["todo.txt"]),
            ..ScopeProfile::default()
        },
        ScopeProfile {
            name: "python".to_string(),
            indicator_files: strings(&["pyproject.toml", "Pipfile", "setup.py"]),
            denied_directories: strings(&[".git", ".mypy_cache", ".venv"]),
            denied_extensions: strings(&[".log"]),
            denied_files: strings(&["todo.txt"]),
            ..ScopeProfile::default()
        },
    ]
}

/// The profile used when no indicator file matches.
pub fn default_profile() -> ScopeProfile {
    ScopeProfile {
        name: "default".to_string(),
        denied_directories: strings(&[".git"]),
        ..ScopeProfile::default()
    }
}

/// First profile whose indicator files appear in `root`, or `fallback`.
pub fn select_profile<'a>(
    root: &Path,
    profiles: &'a [ScopeProfile],
    fallback: &'a ScopeProfile,
) -> &'a ScopeProfile {
    profiles
        .iter()
        .find(|profile| profile.matches_root(root))
        .unwrap_or(fallback)
}

/// Look a profile up by name.
pub fn find_profile<'a>(profiles: &'a [ScopeProfile], name: &str) -> Option<&'a ScopeProfile> {
    profiles.iter().find(|profile| profile.name == name)
}
