use crate::model::task::TaskRecord;
use crate::model::task_list::TaskList;

/// Which part of a task a query is checked against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter<'a> {
    Message(&'a str),
    /// The priority letter, or `""` for no priority
    Priority(&'a str),
    Context(&'a str),
    Project(&'a str),
    /// A bare token (checked against keys and values) or a `key:value` pair
    Keyword(&'a str),
    Complete(bool),
}

/// How text queries compare. The default is substring matching, ignoring
/// ASCII case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchOptions {
    /// Require equality instead of substring containment
    pub strict: bool,
    pub case_sensitive: bool,
}

/// Error type for filtering
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterError {
    #[error("match options do not apply to the completion filter")]
    OptionsNotApplicable,
    #[error("{0:?} is not a priority class (letters A-Z and ranges like A-C)")]
    InvalidPriorityClass(String),
}

impl TaskList {
    /// Tasks matching `filter`, as a new list tied to the same file.
    ///
    /// `options` of `None` means [`MatchOptions::default`]; passing options
    /// with [`Filter::Complete`] is an error.
    pub fn filter_by(
        &self,
        filter: Filter<'_>,
        options: Option<MatchOptions>,
    ) -> Result<TaskList, FilterError> {
        if matches!(filter, Filter::Complete(_)) && options.is_some() {
            return Err(FilterError::OptionsNotApplicable);
        }
        let options = options.unwrap_or_default();

        let tasks = self
            .iter()
            .filter(|task| task_matches(task, filter, options))
            .cloned()
            .collect();

        Ok(TaskList::from_tasks(tasks, self.path().map(|p| p.to_path_buf())))
    }

    /// Tasks whose priority falls in `class`: letters and `X-Y` ranges,
    /// case-insensitive. An empty class keeps every prioritized task.
    pub fn filter_priorities(&self, class: &str) -> Result<TaskList, FilterError> {
        let letters = parse_priority_class(class)?;
        let tasks = self
            .iter()
            .filter(|task| match task.priority() {
                Some(p) => letters.is_empty() || letters.contains(&p.letter()),
                None => false,
            })
            .cloned()
            .collect();

        Ok(TaskList::from_tasks(tasks, self.path().map(|p| p.to_path_buf())))
    }

    /// Tasks whose line contains every term; terms starting with `/`
    /// exclude instead. Alternatives inside a term are split on `/`.
    pub fn filter_terms<S: AsRef<str>>(&self, terms: &[S]) -> TaskList {
        let (negative, positive): (Vec<&str>, Vec<&str>) = terms
            .iter()
            .map(|t| t.as_ref())
            .partition(|t| t.starts_with('/'));

        let tasks = self
            .iter()
            .filter(|task| {
                !negative.iter().any(|t| task.contains_term(&t[1..]))
                    && positive.iter().all(|t| task.contains_term(t))
            })
            .cloned()
            .collect();

        TaskList::from_tasks(tasks, self.path().map(|p| p.to_path_buf()))
    }
}

fn parse_priority_class(class: &str) -> Result<Vec<char>, FilterError> {
    let invalid = || FilterError::InvalidPriorityClass(class.to_string());
    let chars: Vec<char> = class.trim().to_ascii_uppercase().chars().collect();

    let mut letters = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let start = chars[i];
        if !start.is_ascii_uppercase() {
            return Err(invalid());
        }
        if chars.get(i + 1) == Some(&'-') {
            let end = *chars.get(i + 2).ok_or_else(invalid)?;
            if !end.is_ascii_uppercase() || end < start {
                return Err(invalid());
            }
            letters.extend(start..=end);
            i += 3;
        } else {
            letters.push(start);
            i += 1;
        }
    }
    Ok(letters)
}

fn task_matches(task: &TaskRecord, filter: Filter<'_>, options: MatchOptions) -> bool {
    match filter {
        Filter::Complete(complete) => task.is_complete() == complete,
        Filter::Message(query) => text_matches(task.message(), query, options),
        Filter::Priority(query) => {
            let priority = task.priority().map(|p| p.to_string()).unwrap_or_default();
            text_matches(&priority, query, options)
        }
        Filter::Context(query) => task
            .contexts()
            .iter()
            .any(|tag| text_matches(tag, query, options)),
        Filter::Project(query) => task
            .projects()
            .iter()
            .any(|tag| text_matches(tag, query, options)),
        Filter::Keyword(query) => {
            let keywords = task.keywords();
            match query.split_once(':') {
                Some((key, value)) => keywords.iter().any(|(k, v)| {
                    text_matches(k, key, options) && text_matches(v, value, options)
                }),
                None => keywords.iter().any(|(k, v)| {
                    text_matches(k, query, options) || text_matches(v, query, options)
                }),
            }
        }
    }
}

fn text_matches(field: &str, query: &str, options: MatchOptions) -> bool {
    if options.case_sensitive {
        compare(field, query, options.strict)
    } else {
        compare(
            &field.to_ascii_lowercase(),
            &query.to_ascii_lowercase(),
            options.strict,
        )
    }
}

fn compare(field: &str, query: &str, strict: bool) -> bool {
    if strict {
        field == query
    } else {
        field.contains(query)
    }
}
