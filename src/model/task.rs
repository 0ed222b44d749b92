use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use chrono::{Local, NaiveDate};
use indexmap::IndexMap;

use crate::parse::task_parser::{strip_completion, strip_date, strip_priority};

/// Error type for building or mutating a task
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    #[error("task message must not be empty")]
    EmptyMessage,
    #[error("task message must fit on a single line")]
    MultilineMessage,
    #[error("{0:?} is not a valid priority ([A-Z]?)")]
    InvalidPriority(String),
    #[error("only a completed task can have a completion date")]
    CompletionDateWithoutCompletion,
    #[error("a completed task with a creation date needs a completion date")]
    MissingCompletionDate,
    #[error("message {0:?} starts with a token that reads as a task field")]
    AmbiguousMessage(String),
}

/// Task priority, a single letter `A` (highest) to `Z` (lowest)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Priority(char);

impl Priority {
    pub fn new(letter: char) -> Result<Self, TaskError> {
        if letter.is_ascii_uppercase() {
            Ok(Priority(letter))
        } else {
            Err(TaskError::InvalidPriority(letter.to_string()))
        }
    }

    pub fn letter(self) -> char {
        self.0
    }

    /// Parse the `[A-Z]?` form: the empty string means "no priority".
    pub fn parse_optional(value: &str) -> Result<Option<Self>, TaskError> {
        if value.is_empty() {
            Ok(None)
        } else {
            value.parse().map(Some)
        }
    }
}

impl FromStr for Priority {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Priority::new(c),
            _ => Err(TaskError::InvalidPriority(s.to_string())),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Loose field set used to build a [`TaskRecord`]
#[derive(Debug, Clone, Default)]
pub struct TaskParts {
    pub message: String,
    pub complete: bool,
    pub priority: Option<Priority>,
    pub created_date: Option<NaiveDate>,
    pub completed_date: Option<NaiveDate>,
}

/// A single todo.txt task.
///
/// Contexts, projects and keywords are not stored; they are read out of the
/// message on demand. Fields are private so that every record in circulation
/// satisfies the constructor's checks and survives an encode/decode round trip.
#[derive(Debug, Clone)]
pub struct TaskRecord {
    message: String,
    complete: bool,
    priority: Option<Priority>,
    created_date: Option<NaiveDate>,
    completed_date: Option<NaiveDate>,
}

impl TaskRecord {
    /// An open task without priority or dates.
    pub fn new(message: impl Into<String>) -> Result<Self, TaskError> {
        Self::from_parts(TaskParts {
            message: message.into(),
            ..TaskParts::default()
        })
    }

    pub fn from_parts(parts: TaskParts) -> Result<Self, TaskError> {
        let task = TaskRecord {
            message: parts.message.trim().to_string(),
            complete: parts.complete,
            priority: parts.priority,
            created_date: parts.created_date,
            completed_date: parts.completed_date,
        };
        task.validate()?;
        Ok(task)
    }

    /// Builder-style priority setter taking the `[A-Z]?` string form.
    pub fn with_priority(mut self, priority: &str) -> Result<Self, TaskError> {
        self.set_priority(priority)?;
        Ok(self)
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn priority(&self) -> Option<Priority> {
        self.priority
    }

    pub fn created_date(&self) -> Option<NaiveDate> {
        self.created_date
    }

    pub fn completed_date(&self) -> Option<NaiveDate> {
        self.completed_date
    }

    /// `@context` tags, in message order, without the `@`
    pub fn contexts(&self) -> Vec<&str> {
        tags(&self.message, '@')
    }

    /// `+project` tags, in message order, without the `+`
    pub fn projects(&self) -> Vec<&str> {
        tags(&self.message, '+')
    }

    /// `key:value` tokens. The first occurrence of a key wins.
    pub fn keywords(&self) -> IndexMap<&str, &str> {
        let mut keywords = IndexMap::new();
        for word in self.message.split_whitespace() {
            if let Some((key, value)) = word.split_once(':')
                && !key.is_empty()
                && !value.is_empty()
                && !value.contains(':')
            {
                keywords.entry(key).or_insert(value);
            }
        }
        keywords
    }

    /// Whether any `/`-separated alternative of `term` occurs in the encoded line.
    pub fn contains_term(&self, term: &str) -> bool {
        let line = self.to_string();
        term.split('/').any(|sub| line.contains(sub))
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Completing stamps today as the completion date; reopening clears it.
    pub fn set_complete(&mut self, complete: bool) -> Result<(), TaskError> {
        if self.complete == complete {
            return Ok(());
        }
        let completed_date = complete.then(|| Local::now().date_naive());
        self.update(|task| {
            task.complete = complete;
            task.completed_date = completed_date;
        })
    }

    pub fn toggle(&mut self) -> Result<(), TaskError> {
        self.set_complete(!self.complete)
    }

    pub fn set_priority(&mut self, priority: &str) -> Result<(), TaskError> {
        let priority = Priority::parse_optional(priority)?;
        self.update(|task| task.priority = priority)
    }

    pub fn clear_priority(&mut self) -> Result<(), TaskError> {
        self.update(|task| task.priority = None)
    }

    pub fn set_message(&mut self, message: &str) -> Result<(), TaskError> {
        let message = message.trim().to_string();
        self.update(|task| task.message = message)
    }

    pub fn append_text(&mut self, text: &str) -> Result<(), TaskError> {
        let message = format!("{} {}", self.message, text.trim());
        self.set_message(&message)
    }

    pub fn prepend_text(&mut self, text: &str) -> Result<(), TaskError> {
        let message = format!("{} {}", text.trim(), self.message);
        self.set_message(&message)
    }

    pub fn set_created_date(&mut self, date: Option<NaiveDate>) -> Result<(), TaskError> {
        self.update(|task| task.created_date = date)
    }

    /// Stamp `date` as the creation date. A completed task without a
    /// completion date gets the same date there too, since a lone date after
    /// `x ` reads as the completion date.
    pub fn stamp_created(&mut self, date: NaiveDate) -> Result<(), TaskError> {
        self.update(|task| {
            if task.complete && task.completed_date.is_none() {
                task.completed_date = Some(date);
            }
            task.created_date = Some(date);
        })
    }

    /// Apply `change` to a copy, and keep it only if the copy is still valid.
    fn update(&mut self, change: impl FnOnce(&mut TaskRecord)) -> Result<(), TaskError> {
        let mut candidate = self.clone();
        change(&mut candidate);
        candidate.validate()?;
        *self = candidate;
        Ok(())
    }

    fn validate(&self) -> Result<(), TaskError> {
        if self.message.is_empty() {
            return Err(TaskError::EmptyMessage);
        }
        if self.message.contains(['\n', '\r']) {
            return Err(TaskError::MultilineMessage);
        }
        if self.completed_date.is_some() && !self.complete {
            return Err(TaskError::CompletionDateWithoutCompletion);
        }
        // A lone date after `x ` always decodes as the completion date.
        if self.complete && self.created_date.is_some() && self.completed_date.is_none() {
            return Err(TaskError::MissingCompletionDate);
        }
        if self.leading_token_clashes() {
            return Err(TaskError::AmbiguousMessage(self.message.clone()));
        }
        Ok(())
    }

    /// Whether the decoder would eat the start of the message as a field that
    /// this record leaves empty.
    fn leading_token_clashes(&self) -> bool {
        if self.created_date.is_some() {
            return false;
        }
        let msg = self.message.as_str();
        let priority_open = self.priority.is_none() && self.completed_date.is_none();
        let completion_open = !self.complete && priority_open;

        (completion_open && strip_completion(msg).is_some())
            || (priority_open && strip_priority(msg).is_some())
            || strip_date(msg).is_some()
    }
}

fn tags(message: &str, sigil: char) -> Vec<&str> {
    message
        .split_whitespace()
        .filter_map(|word| word.strip_prefix(sigil))
        .filter(|tag| !tag.is_empty())
        .collect()
}

/// Absent values sort after present ones.
fn cmp_absent_last<T: Ord>(a: &Option<T>, b: &Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

impl Ord for TaskRecord {
    /// Open before complete, then priority, creation date, completion date
    /// and message.
    fn cmp(&self, other: &Self) -> Ordering {
        self.complete
            .cmp(&other.complete)
            .then_with(|| cmp_absent_last(&self.priority, &other.priority))
            .then_with(|| cmp_absent_last(&self.created_date, &other.created_date))
            .then_with(|| cmp_absent_last(&self.completed_date, &other.completed_date))
            .then_with(|| self.message.cmp(&other.message))
    }
}

impl PartialOrd for TaskRecord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for TaskRecord {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for TaskRecord {}

impl Hash for TaskRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.complete.hash(state);
        self.priority.hash(state);
        self.created_date.hash(state);
        self.completed_date.hash(state);
        self.message.hash(state);
    }
}

impl fmt::Display for TaskRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::parse::serialize_task(self))
    }
}
