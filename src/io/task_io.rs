use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::model::task_list::TaskList;
use crate::parse::{ParseError, parse_task, serialize_tasks};

/// Error type for task file I/O
#[derive(Debug, thiserror::Error)]
pub enum TaskListError {
    #[error("could not read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("could not write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("{path}:{line}: {source}")]
    Parse {
        path: PathBuf,
        line: usize,
        source: ParseError,
    },
    #[error("task list has no file to persist to")]
    NoPath,
}

impl TaskList {
    /// Load a task file. Blank lines are skipped; any other line that fails
    /// to decode fails the whole load.
    pub fn load(path: impl AsRef<Path>) -> Result<TaskList, TaskListError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| TaskListError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let mut tasks = Vec::new();
        for (idx, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let task = parse_task(line).map_err(|source| TaskListError::Parse {
                path: path.to_path_buf(),
                line: idx + 1,
                source,
            })?;
            tasks.push(task);
        }

        debug!(path = %path.display(), count = tasks.len(), "loaded task file");
        Ok(TaskList::from_tasks(tasks, Some(path.to_path_buf())))
    }

    /// Load `path`, or start an empty list bound to it if the file does not
    /// exist yet.
    pub fn load_or_new(path: impl AsRef<Path>) -> Result<TaskList, TaskListError> {
        let path = path.as_ref();
        if path.exists() {
            TaskList::load(path)
        } else {
            debug!(path = %path.display(), "no task file yet");
            Ok(TaskList::with_path(path))
        }
    }

    /// Overwrite the associated file with one encoded task per line.
    pub fn persist(&self) -> Result<(), TaskListError> {
        let path = self.path().ok_or(TaskListError::NoPath)?;
        let mut content = serialize_tasks(self).join("\n");
        if !content.is_empty() {
            content.push('\n');
        }

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|source| TaskListError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        }
        atomic_write(path, content.as_bytes()).map_err(|source| TaskListError::Write {
            path: path.to_path_buf(),
            source,
        })?;

        info!(path = %path.display(), count = self.len(), "wrote task file");
        Ok(())
    }
}

/// Write `content` to `path` atomically using a temp file + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::TaskRecord;
    use tempfile::TempDir;

    #[test]
    fn test_load_skips_blank_lines() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("todo.txt");
        fs::write(&path, "(A) First\n\n   \nx Second\n").unwrap();

        let list = TaskList::load(&path).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list.path(), Some(path.as_path()));
        assert!(list.safe_get(2).unwrap().is_complete());
    }

    #[test]
    fn test_load_fails_whole_file_on_bad_line() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("todo.txt");
        fs::write(&path, "Fine\n\n(A) 2020-13-01 Broken\nAlso fine\n").unwrap();

        match TaskList::load(&path) {
            Err(TaskListError::Parse { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_load_missing_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("absent.txt");
        assert!(matches!(TaskList::load(&path), Err(TaskListError::Read { .. })));

        let list = TaskList::load_or_new(&path).unwrap();
        assert!(list.is_empty());
        assert_eq!(list.path(), Some(path.as_path()));
    }

    #[test]
    fn test_persist_requires_path() {
        let list = TaskList::from_tasks(vec![TaskRecord::new("a").unwrap()], None);
        assert!(matches!(list.persist(), Err(TaskListError::NoPath)));
    }

    #[test]
    fn test_persist_overwrites() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested/todo.txt");
        let mut list = TaskList::with_path(&path);
        list.append(TaskRecord::new("one").unwrap());
        list.append(TaskRecord::new("two").unwrap());
        list.persist().unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "one\ntwo\n");

        list.safe_pop(1);
        list.persist().unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "two\n");
    }
}
