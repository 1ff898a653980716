use std::fmt::Write;

use chrono::{Duration, NaiveDate};

use crate::core::calendar::{self, ViewMode};
use crate::core::cycle::PhaseMarker;
use crate::core::task::Task;

/// Render the calendar page for the given mode and reference date.
pub fn calendar_view(
    reference: NaiveDate,
    mode: ViewMode,
    today: NaiveDate,
    tasks: &[Task],
    markers: &[PhaseMarker],
) -> String {
    match mode {
        ViewMode::Month => month_view(reference, today, tasks, markers),
        ViewMode::Week => week_view(reference, tasks),
        ViewMode::Day => day_view(reference, tasks),
    }
}

/// Month grid: Sunday-led weekday header, one row per week, a dot for
/// days with due tasks and a phase glyph for annotated days.
fn month_view(
    reference: NaiveDate,
    today: NaiveDate,
    tasks: &[Task],
    markers: &[PhaseMarker],
) -> String {
    let mut out = String::new();

    let label = calendar::period_label(reference, ViewMode::Month);
    let _ = writeln!(out, "{:^35}", label);
    let _ = writeln!(out, " Su   Mo   Tu   We   Th   Fr   Sa");

    let grid = calendar::month_grid(reference, tasks, markers);
    for (i, cell) in grid.iter().enumerate() {
        match cell {
            None => out.push_str("     "),
            Some(cell) => {
                let here = if cell.date == today { '>' } else { ' ' };
                let busy = if cell.tasks.is_empty() { ' ' } else { '·' };
                let phase = cell.phase.map(|p| p.glyph()).unwrap_or(' ');
                let _ = write!(out, "{}{:>2}{}{}", here, cell.day, busy, phase);
            }
        }
        if i % 7 == 6 {
            out.push('\n');
        }
    }
    if grid.len() % 7 != 0 {
        out.push('\n');
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "· tasks due   P period   F fertile   O ovulation");

    // Detail lines for annotated or busy days.
    for cell in grid.iter().flatten() {
        for task in &cell.tasks {
            let time = task
                .due_local()
                .map(|dt| dt.format("%H:%M").to_string())
                .unwrap_or_default();
            let _ = writeln!(
                out,
                "{:>2} {}  {} [{}]",
                cell.day,
                time,
                task.title,
                task.priority.label()
            );
        }
    }

    out
}

/// Seven days from the reference date, with that day's tasks.
fn week_view(reference: NaiveDate, tasks: &[Task]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", calendar::period_label(reference, ViewMode::Week));
    let _ = writeln!(out);

    for offset in 0..7 {
        let day = reference + Duration::days(offset);
        let due: Vec<&Task> = tasks.iter().filter(|t| t.is_due_on(day)).collect();
        let _ = writeln!(out, "{}", day.format("%a %-d %b"));
        if due.is_empty() {
            let _ = writeln!(out, "    -");
        }
        for task in due {
            let time = task
                .due_local()
                .map(|dt| dt.format("%H:%M").to_string())
                .unwrap_or_default();
            let _ = writeln!(out, "    {}  {}", time, task.title);
        }
    }

    out
}

fn day_view(reference: NaiveDate, tasks: &[Task]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", calendar::period_label(reference, ViewMode::Day));
    let _ = writeln!(out);

    let mut due: Vec<&Task> = tasks.iter().filter(|t| t.is_due_on(reference)).collect();
    due.sort_by_key(|t| t.due_at);
    if due.is_empty() {
        let _ = writeln!(out, "Nothing scheduled.");
    }
    for task in due {
        let time = task
            .due_local()
            .map(|dt| dt.format("%H:%M").to_string())
            .unwrap_or_default();
        let mark = if task.completed { "x" } else { " " };
        let _ = writeln!(out, "[{}] {}  {} [{}]", mark, time, task.title, task.priority.label());
    }

    out
}
