use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Habit {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Habit {
    pub fn new(owner_id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            name: name.into(),
            created_at: Utc::now(),
        }
    }
}

/// One completed day for a habit. Presence of a row means "done that day";
/// un-marking deletes the row. At most one entry per (habit_id, entry_date).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HabitEntry {
    pub id: Uuid,
    pub habit_id: Uuid,
    pub owner_id: Uuid,
    pub entry_date: NaiveDate,
    pub completed_at: DateTime<Utc>,
}

impl HabitEntry {
    pub fn new(habit: &Habit, entry_date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            habit_id: habit.id,
            owner_id: habit.owner_id,
            entry_date,
            completed_at: Utc::now(),
        }
    }
}

/// A habit together with its completion history.
#[derive(Debug, Clone)]
pub struct HabitLog {
    pub habit: Habit,
    pub entries: Vec<HabitEntry>,
}

impl HabitLog {
    pub fn new(habit: Habit, mut entries: Vec<HabitEntry>) -> Self {
        entries.retain(|e| e.habit_id == habit.id);
        Self { habit, entries }
    }

    pub fn is_done_on(&self, day: NaiveDate) -> bool {
        self.entries.iter().any(|e| e.entry_date == day)
    }

    pub fn is_due(&self, today: NaiveDate) -> bool {
        !self.is_done_on(today)
    }

    /// Consecutive completed days ending at today (or yesterday, so an
    /// unfinished today does not break the run).
    pub fn current_streak(&self, today: NaiveDate) -> u32 {
        let dates = self.sorted_dates();
        if dates.is_empty() {
            return 0;
        }

        let mut streak = 0u32;
        let mut check_date = today;

        if !dates.contains(&today) {
            check_date = today.pred_opt().unwrap_or(today);
        }

        for date in dates.iter().rev() {
            if *date == check_date {
                streak += 1;
                check_date = check_date.pred_opt().unwrap_or(check_date);
            } else if *date < check_date {
                break;
            }
        }

        streak
    }

    /// Longest run of consecutive completed days anywhere in the history.
    pub fn best_streak(&self, today: NaiveDate) -> u32 {
        let dates = self.sorted_dates();
        if dates.is_empty() {
            return 0;
        }

        let mut best = 0u32;
        let mut current = 1u32;
        for window in dates.windows(2) {
            let diff = (window[1] - window[0]).num_days();
            if diff == 1 {
                current += 1;
            } else {
                best = best.max(current);
                current = 1;
            }
        }
        best.max(current).max(self.current_streak(today))
    }

    /// Completion strip for the trailing `days` days, oldest first.
    pub fn strip(&self, today: NaiveDate, days: u32) -> Vec<bool> {
        (0..days)
            .rev()
            .map(|ago| {
                let date = today - Duration::days(ago as i64);
                self.is_done_on(date)
            })
            .collect()
    }

    fn sorted_dates(&self) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> = self.entries.iter().map(|e| e.entry_date).collect();
        dates.sort();
        dates.dedup();
        dates
    }
}

/// Share of habits completed, as a percentage. Zero habits means zero.
pub fn completion_rate(done: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        done as f64 / total as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log_with_days(days: &[NaiveDate]) -> HabitLog {
        let habit = Habit::new(Uuid::new_v4(), "Morning yoga");
        let entries = days.iter().map(|d| HabitEntry::new(&habit, *d)).collect();
        HabitLog::new(habit, entries)
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn presence_means_done() {
        let log = log_with_days(&[day(2026, 3, 7)]);
        assert!(log.is_done_on(day(2026, 3, 7)));
        assert!(!log.is_done_on(day(2026, 3, 8)));
        assert!(log.is_due(day(2026, 3, 8)));
    }

    #[test]
    fn streak_counts_consecutive_days() {
        let log = log_with_days(&[day(2026, 3, 5), day(2026, 3, 6), day(2026, 3, 7)]);
        assert_eq!(log.current_streak(day(2026, 3, 7)), 3);
    }

    #[test]
    fn unfinished_today_does_not_break_streak() {
        let log = log_with_days(&[day(2026, 3, 5), day(2026, 3, 6)]);
        assert_eq!(log.current_streak(day(2026, 3, 7)), 2);
    }

    #[test]
    fn gap_resets_streak() {
        let log = log_with_days(&[day(2026, 3, 1), day(2026, 3, 2), day(2026, 3, 7)]);
        assert_eq!(log.current_streak(day(2026, 3, 7)), 1);
        assert_eq!(log.best_streak(day(2026, 3, 7)), 2);
    }

    #[test]
    fn empty_history_has_no_streak() {
        let log = log_with_days(&[]);
        assert_eq!(log.current_streak(day(2026, 3, 7)), 0);
        assert_eq!(log.best_streak(day(2026, 3, 7)), 0);
    }

    #[test]
    fn strip_is_oldest_first() {
        let today = day(2026, 3, 7);
        let log = log_with_days(&[today, day(2026, 3, 4)]);
        let strip = log.strip(today, 4);
        assert_eq!(strip, vec![true, false, false, true]);
    }

    #[test]
    fn completion_rate_handles_zero_habits() {
        assert_eq!(completion_rate(0, 0), 0.0);
        assert_eq!(completion_rate(1, 2), 50.0);
        assert_eq!(completion_rate(3, 3), 100.0);
    }
}
