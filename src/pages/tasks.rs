use std::fmt::Write;

use crate::core::task::{Priority, Task};

use super::progress_bar;

/// Listing filters, all optional.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub search: Option<String>,
    pub priority: Option<Priority>,
    pub show_completed: bool,
}

impl TaskFilter {
    pub fn keeps(&self, task: &Task) -> bool {
        if !self.show_completed && task.completed {
            return false;
        }
        if let Some(priority) = self.priority {
            if task.priority != priority {
                return false;
            }
        }
        if let Some(ref query) = self.search {
            if !task.matches(query) {
                return false;
            }
        }
        true
    }
}

/// Task list with a completion header, filtered.
pub fn tasks_view(tasks: &[Task], filter: &TaskFilter) -> String {
    let mut out = String::new();

    let done = tasks.iter().filter(|t| t.completed).count();
    let percent = if tasks.is_empty() {
        0.0
    } else {
        done as f64 / tasks.len() as f64 * 100.0
    };
    let _ = writeln!(
        out,
        "Progress {} {}/{} ({:.0}%)",
        progress_bar(percent, 20),
        done,
        tasks.len(),
        percent
    );
    let _ = writeln!(out);

    let visible: Vec<&Task> = tasks.iter().filter(|t| filter.keeps(t)).collect();
    if visible.is_empty() {
        let _ = writeln!(out, "No tasks match. Adjust the filters or add one.");
        return out;
    }

    for task in visible {
        let mark = if task.completed { "x" } else { " " };
        let due = task
            .due_local()
            .map(|dt| dt.format("  due %-d %b %H:%M").to_string())
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "[{}] {:<8} {}  {}{}",
            mark,
            task.priority.label(),
            short_id(task),
            task.title,
            due
        );
        if let Some(ref description) = task.description {
            let _ = writeln!(out, "             {}", description);
        }
    }

    out
}

/// Leading id segment, enough to address a task from the command line.
pub fn short_id(task: &Task) -> String {
    task.id.to_string().chars().take(8).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn filter_respects_all_dimensions() {
        let owner = Uuid::new_v4();
        let mut done = Task::new(owner, "Call the bank");
        done.completed = true;
        let mut urgent = Task::new(owner, "Book a checkup");
        urgent.priority = Priority::High;

        let default = TaskFilter::default();
        assert!(!default.keeps(&done));
        assert!(default.keeps(&urgent));

        let by_priority = TaskFilter {
            priority: Some(Priority::High),
            ..Default::default()
        };
        assert!(by_priority.keeps(&urgent));

        let by_search = TaskFilter {
            search: Some("bank".to_string()),
            show_completed: true,
            ..Default::default()
        };
        assert!(by_search.keeps(&done));
        assert!(!by_search.keeps(&urgent));
    }
}
