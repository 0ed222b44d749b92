use crate::model::task::TaskRecord;

/// Encode a task as a todo.txt line. Fields are emitted in grammar order and
/// only when present; tags stay inside the message as written.
pub fn serialize_task(task: &TaskRecord) -> String {
    let mut line = String::new();

    if task.is_complete() {
        line.push_str("x ");
    }
    if let Some(priority) = task.priority() {
        line.push_str(&format!("({}) ", priority));
    }
    if let Some(date) = task.completed_date() {
        line.push_str(&format!("{} ", date.format("%Y-%m-%d")));
    }
    if let Some(date) = task.created_date() {
        line.push_str(&format!("{} ", date.format("%Y-%m-%d")));
    }
    line.push_str(task.message());

    line
}

/// Encode a list of tasks, one line each.
pub fn serialize_tasks<'a>(tasks: impl IntoIterator<Item = &'a TaskRecord>) -> Vec<String> {
    tasks.into_iter().map(serialize_task).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::{Priority, TaskParts};
    use chrono::NaiveDate;

    #[test]
    fn test_serialize_minimal_task() {
        let task = TaskRecord::new("Fix parser crash").unwrap();
        assert_eq!(serialize_task(&task), "Fix parser crash");
    }

    #[test]
    fn test_serialize_all_fields() {
        let task = TaskRecord::from_parts(TaskParts {
            message: "Buy milk @store".into(),
            complete: true,
            priority: Some(Priority::new('A').unwrap()),
            created_date: NaiveDate::from_ymd_opt(2020, 1, 1),
            completed_date: NaiveDate::from_ymd_opt(2020, 1, 2),
        })
        .unwrap();
        assert_eq!(
            serialize_task(&task),
            "x (A) 2020-01-02 2020-01-01 Buy milk @store"
        );
    }

    #[test]
    fn test_serialize_created_only() {
        let task = TaskRecord::from_parts(TaskParts {
            message: "Plan trip +holiday".into(),
            created_date: NaiveDate::from_ymd_opt(2021, 3, 4),
            ..TaskParts::default()
        })
        .unwrap()
        .with_priority("C")
        .unwrap();
        assert_eq!(serialize_task(&task), "(C) 2021-03-04 Plan trip +holiday");
    }

    #[test]
    fn test_serialize_tasks_keeps_order() {
        let tasks = [
            TaskRecord::new("second").unwrap(),
            TaskRecord::new("first").unwrap(),
        ];
        assert_eq!(serialize_tasks(&tasks), vec!["second", "first"]);
    }
}
