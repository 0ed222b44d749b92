use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::Serialize;

use crate::model::task::TaskRecord;
use crate::ops::scan::SoftError;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TaskJson {
    /// 1-based position in the task file, when the task came from one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    pub line: String,
    pub complete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<NaiveDate>,
    pub message: String,
    pub contexts: Vec<String>,
    pub projects: Vec<String>,
    pub keywords: IndexMap<String, String>,
}

#[derive(Serialize)]
pub struct SoftErrorJson {
    pub path: String,
    pub line: usize,
}

#[derive(Serialize)]
pub struct ScanJson {
    pub profile: String,
    pub tasks: Vec<TaskJson>,
    pub errors: Vec<SoftErrorJson>,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn task_to_json(index: Option<usize>, task: &TaskRecord) -> TaskJson {
    TaskJson {
        index,
        line: task.to_string(),
        complete: task.is_complete(),
        priority: task.priority().map(|p| p.to_string()),
        created: task.created_date(),
        completed: task.completed_date(),
        message: task.message().to_string(),
        contexts: task.contexts().iter().map(|s| s.to_string()).collect(),
        projects: task.projects().iter().map(|s| s.to_string()).collect(),
        keywords: task
            .keywords()
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    }
}

pub fn soft_error_to_json(error: &SoftError) -> SoftErrorJson {
    SoftErrorJson {
        path: error.path.display().to_string(),
        line: error.line,
    }
}

// ---------------------------------------------------------------------------
// Text output
// ---------------------------------------------------------------------------

/// Numbered listing, numbers zero-padded to a common width: `03: (A) Task`
pub fn format_numbered(entries: &[(usize, &TaskRecord)]) -> Vec<String> {
    let width = entries
        .iter()
        .map(|(n, _)| n.to_string().len())
        .max()
        .unwrap_or(1);
    entries
        .iter()
        .map(|(n, task)| format!("{:0width$}: {}", n, task, width = width))
        .collect()
}

/// Summary of comment lines the scanner could not use, grouped by file.
pub fn format_soft_errors(errors: &[SoftError]) -> Vec<String> {
    let mut by_file: IndexMap<String, Vec<usize>> = IndexMap::new();
    for error in errors {
        by_file
            .entry(error.path.display().to_string())
            .or_default()
            .push(error.line);
    }

    let mut lines = Vec::new();
    if !by_file.is_empty() {
        lines.push(format!("Unable to parse {} comment line(s):", errors.len()));
    }
    for (path, numbers) in by_file {
        let numbers: Vec<String> = numbers.iter().map(|n| n.to_string()).collect();
        lines.push(format!("  {}: {}", path, numbers.join(", ")));
    }
    lines
}
