use chrono::NaiveDate;

use crate::model::task::{Priority, TaskError, TaskParts, TaskRecord};

/// Error type for decoding a task line
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid date {date:?} in {line:?}")]
    InvalidDate { date: String, line: String },
    #[error("invalid task {line:?}: {source}")]
    InvalidTask {
        line: String,
        #[source]
        source: TaskError,
    },
}

/// Decode one todo.txt line:
/// `[x ][(P) ][completed-date ][created-date ]message`.
///
/// Each prefix is optional but the order is fixed. The completion date is
/// only looked for after the `x ` marker.
pub fn parse_task(line: &str) -> Result<TaskRecord, ParseError> {
    let mut rest = line.trim_start();

    let complete = match strip_completion(rest) {
        Some(after) => {
            rest = after;
            true
        }
        None => false,
    };

    let priority = match strip_priority(rest) {
        Some((letter, after)) => {
            rest = after;
            Some(Priority::new(letter).map_err(|source| invalid_task(line, source))?)
        }
        None => None,
    };

    let completed_date = if complete {
        take_date(&mut rest, line)?
    } else {
        None
    };
    let created_date = take_date(&mut rest, line)?;

    TaskRecord::from_parts(TaskParts {
        message: rest.trim().to_string(),
        complete,
        priority,
        created_date,
        completed_date,
    })
    .map_err(|source| invalid_task(line, source))
}

fn invalid_task(line: &str, source: TaskError) -> ParseError {
    ParseError::InvalidTask {
        line: line.to_string(),
        source,
    }
}

/// Consume a leading `YYYY-MM-DD ` token. A token with the right shape that
/// is not a calendar date is an error, not a miss.
fn take_date(rest: &mut &str, line: &str) -> Result<Option<NaiveDate>, ParseError> {
    let Some((token, after)) = strip_date(rest) else {
        return Ok(None);
    };
    let date = NaiveDate::parse_from_str(token, "%Y-%m-%d").map_err(|_| ParseError::InvalidDate {
        date: token.to_string(),
        line: line.to_string(),
    })?;
    *rest = after;
    Ok(Some(date))
}

/// `x ` completion marker
pub(crate) fn strip_completion(s: &str) -> Option<&str> {
    s.strip_prefix("x ")
}

/// `(P) ` with any single character except `)`
pub(crate) fn strip_priority(s: &str) -> Option<(char, &str)> {
    let inner = s.strip_prefix('(')?;
    let mut chars = inner.chars();
    let letter = chars.next().filter(|c| *c != ')')?;
    let after = chars.as_str().strip_prefix(") ")?;
    Some((letter, after))
}

/// A `dddd-dd-dd ` token by shape only; returns the date text and the rest.
pub(crate) fn strip_date(s: &str) -> Option<(&str, &str)> {
    let bytes = s.as_bytes();
    if bytes.len() < 11 || bytes[10] != b' ' {
        return None;
    }
    let shape_ok = bytes[..10].iter().enumerate().all(|(i, b)| match i {
        4 | 7 => *b == b'-',
        _ => b.is_ascii_digit(),
    });
    shape_ok.then(|| (&s[..10], &s[11..]))
}
