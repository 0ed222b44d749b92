use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::model::config::ScanConfig;
use crate::model::profile::ScopeProfile;
use crate::model::task::{Priority, TaskRecord};

/// Error type for scans that cannot start
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("cannot scan {path}: {source}")]
    Root { path: PathBuf, source: io::Error },
    #[error("invalid scan options: {0}")]
    InvalidOptions(String),
    #[error("could not build comment pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Tunables for a comment scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    /// Comment keywords, tried in order; put longer spellings first
    pub categories: Vec<String>,
    /// Priority letter per category, by position
    pub priorities: Vec<String>,
    pub skip_marker: String,
    /// Levels below the root to look at; 0 scans nothing
    pub max_depth: usize,
    pub max_file_size: u64,
}

impl Default for ScanOptions {
    fn default() -> Self {
        ScanOptions::from(&ScanConfig::default())
    }
}

impl From<&ScanConfig> for ScanOptions {
    fn from(cfg: &ScanConfig) -> Self {
        ScanOptions {
            categories: cfg.categories.clone(),
            priorities: cfg.priorities.clone(),
            skip_marker: cfg.skip_marker.clone(),
            max_depth: cfg.max_depth,
            max_file_size: cfg.max_file_size,
        }
    }
}

/// A line that names a category but could not be turned into a task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoftError {
    pub path: PathBuf,
    /// 1-based
    pub line: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    pub tasks: Vec<TaskRecord>,
    pub errors: Vec<SoftError>,
}

impl ScanReport {
    fn merge(&mut self, other: ScanReport) {
        self.tasks.extend(other.tasks);
        self.errors.extend(other.errors);
    }
}

/// Walks a source tree and turns annotated comments into tasks.
pub struct CommentScanner<'a> {
    root: PathBuf,
    profile: &'a ScopeProfile,
    options: ScanOptions,
    priorities: Vec<Priority>,
    pattern: Regex,
}

impl<'a> CommentScanner<'a> {
    pub fn new(
        root: impl Into<PathBuf>,
        profile: &'a ScopeProfile,
        options: ScanOptions,
    ) -> Result<Self, ScanError> {
        if options.categories.is_empty() {
            return Err(ScanError::InvalidOptions("no categories".to_string()));
        }
        if options.categories.len() != options.priorities.len() {
            return Err(ScanError::InvalidOptions(format!(
                "{} categories but {} priorities",
                options.categories.len(),
                options.priorities.len()
            )));
        }
        if options.categories.iter().any(|c| c.is_empty()) {
            return Err(ScanError::InvalidOptions("empty category".to_string()));
        }
        if options.skip_marker.is_empty() {
            return Err(ScanError::InvalidOptions("empty skip marker".to_string()));
        }
        let priorities = options
            .priorities
            .iter()
            .map(|p| p.parse::<Priority>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ScanError::InvalidOptions(e.to_string()))?;

        let alternation = options
            .categories
            .iter()
            .map(|c| regex::escape(c))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = Regex::new(&format!(
            r"^.*?(?P<category>{alternation})\s*(?P<msg>.+)$"
        ))?;

        Ok(CommentScanner {
            root: root.into(),
            profile,
            options,
            priorities,
            pattern,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn profile(&self) -> &ScopeProfile {
        self.profile
    }

    /// Scan the tree. Unreadable, oversized or excluded entries are skipped;
    /// only an unreadable root fails the scan. Tasks come back sorted.
    pub fn scan(&self) -> Result<ScanReport, ScanError> {
        fs::read_dir(&self.root).map_err(|source| ScanError::Root {
            path: self.root.clone(),
            source,
        })?;

        let mut report = ScanReport::default();
        if self.options.max_depth == 0 {
            return Ok(report);
        }

        let walker = WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(self.options.max_depth)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                if e.depth() == 0 || !e.file_type().is_dir() {
                    return true;
                }
                let allowed = self.profile.is_dir_allowed(e.path());
                if !allowed {
                    debug!(path = %e.path().display(), "skipping directory");
                }
                allowed
            });

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    debug!("skipping unreadable entry: {}", err);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            match entry.metadata() {
                Ok(meta) if meta.len() > self.options.max_file_size => {
                    debug!(path = %path.display(), size = meta.len(), "skipping oversized file");
                    continue;
                }
                Ok(_) => {}
                Err(err) => {
                    debug!(path = %path.display(), "skipping file: {}", err);
                    continue;
                }
            }
            if !self.profile.is_file_allowed(path) {
                debug!(path = %path.display(), "skipping file");
                continue;
            }

            report.merge(self.scan_file(path));
        }

        report.tasks.sort();
        info!(
            root = %self.root.display(),
            profile = %self.profile.name,
            tasks = report.tasks.len(),
            errors = report.errors.len(),
            "scan finished"
        );
        Ok(report)
    }

    /// Scan a single file. A file that cannot be read as text yields nothing.
    pub fn scan_file(&self, path: &Path) -> ScanReport {
        let mut report = ScanReport::default();

        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) => {
                debug!(path = %path.display(), "skipping unreadable file: {}", err);
                return report;
            }
        };

        for (idx, line) in text.lines().enumerate() {
            if line.contains(&self.options.skip_marker) {
                if idx == 0 {
                    debug!(path = %path.display(), "file opted out of scanning");
                    return ScanReport::default();
                }
                continue;
            }
            if !self
                .options
                .categories
                .iter()
                .any(|c| line.contains(c.as_str()))
            {
                continue;
            }

            match self.parse_line(path, idx + 1, line.trim()) {
                Some(task) => report.tasks.push(task),
                None => {
                    warn!(path = %path.display(), line = idx + 1, "could not parse comment");
                    report.errors.push(SoftError {
                        path: path.to_path_buf(),
                        line: idx + 1,
                    });
                }
            }
        }

        report
    }

    fn parse_line(&self, path: &Path, line_no: usize, line: &str) -> Option<TaskRecord> {
        let caps = self.pattern.captures(line)?;
        let found = caps.name("category")?;
        let category = found.as_str();
        // A shorter category must not stand in for a longer one at the same spot
        let longest = self
            .options
            .categories
            .iter()
            .filter(|c| line[found.start()..].starts_with(c.as_str()))
            .map(|c| c.len())
            .max()?;
        if category.len() != longest {
            return None;
        }
        let text = caps.name("msg")?.as_str();
        let index = self.options.categories.iter().position(|c| c == category)?;
        let (project, context) = self.location(path);

        let message = format!("c:{category} +{project} @{context} ln:{line_no:03} {text}");
        TaskRecord::new(message)
            .ok()
            .and_then(|task| task.with_priority(&self.priorities[index].to_string()).ok())
    }

    /// Split the path into its first component relative to the root (or
    /// the nearest ancestor of the root that contains it) and the rest.
    fn location(&self, path: &Path) -> (String, String) {
        let relative = self
            .root
            .ancestors()
            .find_map(|base| path.strip_prefix(base).ok())
            .unwrap_or(path);

        let mut parts = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned());
        let project = parts.next().unwrap_or_default();
        let rest: Vec<String> = parts.collect();
        let context = if rest.is_empty() {
            ".".to_string()
        } else {
            rest.join("/")
        };
        (project, context)
    }
}

/// Scan `root` with `profile` and the default options.
pub fn scan_tree(root: &Path, profile: &ScopeProfile) -> Result<ScanReport, ScanError> {
    CommentScanner::new(root, profile, ScanOptions::default())?.scan()
}

/// The footer line appended to printed scan results.
pub fn footer_line(profile: &ScopeProfile) -> String {
    format!(
        "footer:time Generated {} profile:{}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        profile.name
    )
}
