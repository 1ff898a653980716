use std::fmt::Write;

use chrono::NaiveDate;

use crate::core::cycle::{self, PhaseMarker};
use crate::core::mood::MoodEntry;
use crate::core::reminder::ReminderSummary;
use crate::core::task::Task;

use super::progress_bar;

/// The "today" dashboard: date heading, task progress, latest mood,
/// cycle phase and what is coming up.
pub fn overview_view(
    today: NaiveDate,
    tasks: &[Task],
    latest_mood: Option<&MoodEntry>,
    markers: &[PhaseMarker],
    summary: &ReminderSummary,
) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", today.format("%A, %-d %B %Y"));
    let _ = writeln!(out);

    // Progress over today's tasks.
    let todays: Vec<&Task> = tasks.iter().filter(|t| t.is_due_on(today)).collect();
    let done = todays.iter().filter(|t| t.completed).count();
    let percent = if todays.is_empty() {
        0.0
    } else {
        done as f64 / todays.len() as f64 * 100.0
    };
    let _ = writeln!(
        out,
        "Tasks today   {} {}/{} ({:.0}%)",
        progress_bar(percent, 20),
        done,
        todays.len(),
        percent
    );

    match latest_mood {
        Some(entry) => {
            let _ = writeln!(
                out,
                "Mood          {} {}",
                entry.mood.emoji(),
                entry.mood.label()
            );
        }
        None => {
            let _ = writeln!(out, "Mood          not recorded yet");
        }
    }

    match cycle::marker_for(markers, today) {
        Some(phase) => {
            let _ = writeln!(out, "Cycle         {}", phase.label());
        }
        None => {
            let _ = writeln!(out, "Cycle         no annotation for today");
        }
    }

    if !summary.is_empty() {
        let _ = writeln!(
            out,
            "Reminders     {} ({} overdue, {} upcoming)",
            summary.total(),
            summary.overdue.len(),
            summary.upcoming.len()
        );
    }

    // Today's schedule, pending first, by time.
    let mut planned: Vec<&Task> = todays.iter().filter(|t| !t.completed).copied().collect();
    planned.sort_by_key(|t| t.due_at);
    if !planned.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Planned today:");
        for task in planned {
            let time = task
                .due_local()
                .map(|dt| dt.format("%H:%M").to_string())
                .unwrap_or_default();
            let _ = writeln!(out, "  {}  {} [{}]", time, task.title, task.priority.label());
        }
    }

    out
}
