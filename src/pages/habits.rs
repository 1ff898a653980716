use std::fmt::Write;

use chrono::NaiveDate;

use crate::core::habit::{self, HabitLog};

use super::progress_bar;

const STRIP_DAYS: u32 = 14;

/// Habit tracker page: today's completion rate and a 14-day strip with
/// streaks per habit.
pub fn habits_view(logs: &[HabitLog], today: NaiveDate) -> String {
    let mut out = String::new();

    let done = logs.iter().filter(|l| l.is_done_on(today)).count();
    let rate = habit::completion_rate(done, logs.len());
    let _ = writeln!(
        out,
        "Today {} {}/{} ({:.0}%)",
        progress_bar(rate, 20),
        done,
        logs.len(),
        rate
    );
    let _ = writeln!(out);

    if logs.is_empty() {
        let _ = writeln!(out, "No habits yet. Add the first one to start tracking.");
        return out;
    }

    for log in logs {
        let strip: String = log
            .strip(today, STRIP_DAYS)
            .into_iter()
            .map(|done| if done { '\u{25CF}' } else { '\u{25CB}' })
            .collect();
        let status = if log.is_done_on(today) { "done" } else { "    " };
        let _ = writeln!(
            out,
            "{}  {}  streak {} (best {})  [{}]",
            strip,
            status,
            log.current_streak(today),
            log.best_streak(today),
            log.habit.name
        );
    }

    out
}
