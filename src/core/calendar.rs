use chrono::{Datelike, Duration, Months, NaiveDate};

use super::cycle::{self, CyclePhase, PhaseMarker};
use super::task::Task;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Month,
    Week,
    Day,
}

impl ViewMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "month" => Some(Self::Month),
            "week" => Some(Self::Week),
            "day" => Some(Self::Day),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Month => "month",
            Self::Week => "week",
            Self::Day => "day",
        }
    }
}

/// Human-readable label for the period around the reference date.
pub fn period_label(date: NaiveDate, mode: ViewMode) -> String {
    match mode {
        ViewMode::Month => date.format("%B %Y").to_string(),
        ViewMode::Week => format!("Week of {}", date.format("%-d %b")),
        ViewMode::Day => date.format("%A, %-d %B %Y").to_string(),
    }
}

/// Step the reference date by `step` units of the view mode.
///
/// Month steps clamp the day-of-month to the target month's length, so
/// Jan 31 moves to Feb 28 (29 in a leap year) rather than an invalid date.
pub fn navigate(date: NaiveDate, mode: ViewMode, step: i32) -> NaiveDate {
    match mode {
        ViewMode::Month => {
            let months = Months::new(step.unsigned_abs());
            let stepped = if step >= 0 {
                date.checked_add_months(months)
            } else {
                date.checked_sub_months(months)
            };
            stepped.unwrap_or(date)
        }
        ViewMode::Week => date + Duration::days(7 * step as i64),
        ViewMode::Day => date + Duration::days(step as i64),
    }
}

/// Calendar cells for the month containing `date`: leading `None` cells
/// equal to the Sunday-based weekday index of day 1, then `Some(1..=last)`.
pub fn month_cells(date: NaiveDate) -> Vec<Option<u32>> {
    let first = first_of_month(date);
    let offset = first.weekday().num_days_from_sunday() as usize;
    let last = days_in_month(first.year(), first.month());

    let mut cells: Vec<Option<u32>> = vec![None; offset];
    cells.extend((1..=last).map(Some));
    cells
}

/// One populated day of the month grid, with the tasks due that day and
/// any caller-supplied cycle-phase marker.
#[derive(Debug, Clone)]
pub struct DayCell<'a> {
    pub day: u32,
    pub date: NaiveDate,
    pub tasks: Vec<&'a Task>,
    pub phase: Option<CyclePhase>,
}

/// The month grid with per-day data. Task association compares the due
/// moment's local calendar day, not the exact timestamp.
pub fn month_grid<'a>(
    date: NaiveDate,
    tasks: &'a [Task],
    markers: &[PhaseMarker],
) -> Vec<Option<DayCell<'a>>> {
    let first = first_of_month(date);

    month_cells(date)
        .into_iter()
        .map(|cell| {
            cell.map(|day| {
                let cell_date = first.with_day(day).unwrap_or(first);
                DayCell {
                    day,
                    date: cell_date,
                    tasks: tasks.iter().filter(|t| t.is_due_on(cell_date)).collect(),
                    phase: cycle::marker_for(markers, cell_date),
                }
            })
        })
        .collect()
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn days_in_month(year: i32, month: u32) -> u32 {
    NaiveDate::from_ymd_opt(
        if month == 12 { year + 1 } else { year },
        if month == 12 { 1 } else { month + 1 },
        1,
    )
    .unwrap()
    .pred_opt()
    .unwrap()
    .day()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone, Utc};
    use uuid::Uuid;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn leap_february_has_29_cells() {
        let populated = month_cells(day(2028, 2, 10))
            .iter()
            .filter(|c| c.is_some())
            .count();
        assert_eq!(populated, 29);
    }

    #[test]
    fn plain_february_has_28_cells() {
        let populated = month_cells(day(2026, 2, 10))
            .iter()
            .filter(|c| c.is_some())
            .count();
        assert_eq!(populated, 28);
    }

    #[test]
    fn leading_blanks_match_sunday_based_weekday() {
        // March 1st 2026 is a Sunday: no leading blanks.
        let cells = month_cells(day(2026, 3, 15));
        assert_eq!(cells[0], Some(1));

        // June 1st 2026 is a Monday: one leading blank.
        let cells = month_cells(day(2026, 6, 15));
        assert_eq!(cells[0], None);
        assert_eq!(cells[1], Some(1));
    }

    #[test]
    fn month_navigation_is_its_own_inverse() {
        let start = day(2026, 3, 15);
        let there = navigate(start, ViewMode::Month, 1);
        let back = navigate(there, ViewMode::Month, -1);
        assert_eq!((back.year(), back.month()), (start.year(), start.month()));
    }

    #[test]
    fn month_step_clamps_day_of_month() {
        assert_eq!(navigate(day(2026, 1, 31), ViewMode::Month, 1), day(2026, 2, 28));
        assert_eq!(navigate(day(2028, 1, 31), ViewMode::Month, 1), day(2028, 2, 29));
        assert_eq!(navigate(day(2026, 3, 31), ViewMode::Month, -1), day(2026, 2, 28));
    }

    #[test]
    fn month_navigation_rolls_the_year() {
        assert_eq!(navigate(day(2026, 12, 10), ViewMode::Month, 1), day(2027, 1, 10));
        assert_eq!(navigate(day(2026, 1, 10), ViewMode::Month, -1), day(2025, 12, 10));
    }

    #[test]
    fn week_and_day_steps() {
        assert_eq!(navigate(day(2026, 3, 1), ViewMode::Week, 1), day(2026, 3, 8));
        assert_eq!(navigate(day(2026, 3, 1), ViewMode::Week, -1), day(2026, 2, 22));
        assert_eq!(navigate(day(2026, 3, 1), ViewMode::Day, 1), day(2026, 3, 2));
        assert_eq!(navigate(day(2026, 1, 1), ViewMode::Day, -1), day(2025, 12, 31));
    }

    #[test]
    fn period_labels() {
        assert_eq!(period_label(day(2026, 3, 8), ViewMode::Month), "March 2026");
        assert_eq!(period_label(day(2026, 3, 8), ViewMode::Week), "Week of 8 Mar");
        assert_eq!(
            period_label(day(2026, 3, 8), ViewMode::Day),
            "Sunday, 8 March 2026"
        );
    }

    #[test]
    fn grid_associates_tasks_by_local_day() {
        let owner = Uuid::new_v4();
        let mut due = Task::new(owner, "Dentist");
        let local = Local.with_ymd_and_hms(2026, 3, 12, 9, 30, 0).unwrap();
        due.due_at = Some(local.with_timezone(&Utc));
        let undated = Task::new(owner, "Someday");
        let tasks = vec![due, undated];

        let markers = vec![PhaseMarker {
            date: day(2026, 3, 14),
            phase: CyclePhase::Ovulation,
        }];

        let grid = month_grid(day(2026, 3, 1), &tasks, &markers);
        let cell_12 = grid
            .iter()
            .flatten()
            .find(|c| c.day == 12)
            .expect("day 12 present");
        assert_eq!(cell_12.tasks.len(), 1);
        assert_eq!(cell_12.tasks[0].title, "Dentist");
        assert_eq!(cell_12.phase, None);

        let cell_14 = grid
            .iter()
            .flatten()
            .find(|c| c.day == 14)
            .expect("day 14 present");
        assert!(cell_14.tasks.is_empty());
        assert_eq!(cell_14.phase, Some(CyclePhase::Ovulation));
    }
}
