use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use super::task::Task;

/// Where a pending task sits relative to its due moment. Variants are
/// ordered by proximity to (and past) the due moment; the scanner only
/// ever moves a task forward through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReminderPhase {
    Dormant,
    Upcoming15,
    Upcoming5,
    DueNow,
    Overdue,
}

impl ReminderPhase {
    /// Classify a due-minus-now difference.
    ///
    /// A difference of exactly zero is DueNow, never Overdue. The DueNow
    /// window extends one minute past the due moment so a scan landing
    /// just after it still announces the task.
    pub fn classify(diff: Duration) -> Self {
        if diff > Duration::minutes(15) {
            Self::Dormant
        } else if diff > Duration::minutes(5) {
            Self::Upcoming15
        } else if diff > Duration::zero() {
            Self::Upcoming5
        } else if diff > Duration::seconds(-60) {
            Self::DueNow
        } else {
            Self::Overdue
        }
    }

    /// Human label of the remaining time, for the phases that announce.
    pub fn label(&self) -> Option<&'static str> {
        match self {
            Self::Upcoming15 => Some("15 минут"),
            Self::Upcoming5 => Some("5 минут"),
            Self::DueNow => Some("сейчас"),
            Self::Dormant | Self::Overdue => None,
        }
    }
}

/// One notification to dispatch.
#[derive(Debug, Clone)]
pub struct Firing {
    pub task_id: Uuid,
    pub title: String,
    pub phase: ReminderPhase,
    pub label: &'static str,
}

/// Classifies pending tasks on each scan tick and decides what to announce.
///
/// The last announced phase is kept per task id and transitions are
/// forward-only, so each threshold fires at most once per task no matter
/// how the scan cadence relates to the threshold spacing. A scan that
/// skips a threshold entirely (a long pause, a lagging fetch) still fires
/// the phase that was reached.
#[derive(Debug, Default)]
pub struct ReminderScanner {
    last: HashMap<Uuid, ReminderPhase>,
}

impl ReminderScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one classification pass. Completed tasks and tasks without a
    /// due moment are never classified; their tracked state is dropped so
    /// a task re-opened later starts from Dormant again.
    pub fn scan(&mut self, tasks: &[Task], now: DateTime<Utc>) -> Vec<Firing> {
        let mut firings = Vec::new();
        let mut seen: HashSet<Uuid> = HashSet::new();

        for task in tasks {
            if task.completed {
                continue;
            }
            let Some(due_at) = task.due_at else {
                continue;
            };
            seen.insert(task.id);

            let phase = ReminderPhase::classify(due_at - now);
            let previous = self
                .last
                .get(&task.id)
                .copied()
                .unwrap_or(ReminderPhase::Dormant);

            if phase <= previous {
                continue;
            }
            self.last.insert(task.id, phase);

            if let Some(label) = phase.label() {
                log::debug!("Reminder {:?} for '{}'", phase, task.title);
                firings.push(Firing {
                    task_id: task.id,
                    title: task.title.clone(),
                    phase,
                    label,
                });
            }
        }

        self.last.retain(|id, _| seen.contains(id));
        firings
    }
}

/// Standing counts and detail for the bell indicator, recomputed on demand.
#[derive(Debug, Clone, Default)]
pub struct ReminderSummary {
    /// Pending tasks whose due moment has passed, soonest first.
    pub overdue: Vec<Task>,
    /// Pending tasks due within the next hour, soonest first.
    pub upcoming: Vec<Task>,
}

impl ReminderSummary {
    pub fn build(tasks: &[Task], now: DateTime<Utc>) -> Self {
        let horizon = now + Duration::hours(1);
        let mut overdue = Vec::new();
        let mut upcoming = Vec::new();

        for task in tasks {
            if task.completed {
                continue;
            }
            let Some(due_at) = task.due_at else {
                continue;
            };
            if due_at < now {
                overdue.push(task.clone());
            } else if due_at <= horizon {
                upcoming.push(task.clone());
            }
        }

        overdue.sort_by_key(|t| t.due_at);
        upcoming.sort_by_key(|t| t.due_at);
        Self { overdue, upcoming }
    }

    pub fn total(&self) -> usize {
        self.overdue.len() + self.upcoming.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task_due_in(minutes: i64, now: DateTime<Utc>) -> Task {
        let mut t = Task::new(Uuid::new_v4(), format!("due in {} min", minutes));
        t.due_at = Some(now + Duration::minutes(minutes));
        t
    }

    fn now() -> DateTime<Utc> {
        "2026-03-08T12:00:00Z".parse().unwrap()
    }

    #[test]
    fn exactly_due_is_due_now_not_overdue() {
        assert_eq!(ReminderPhase::classify(Duration::zero()), ReminderPhase::DueNow);
        assert_eq!(
            ReminderPhase::classify(Duration::seconds(-1)),
            ReminderPhase::DueNow
        );
        assert_eq!(
            ReminderPhase::classify(Duration::seconds(-61)),
            ReminderPhase::Overdue
        );
        assert_eq!(
            ReminderPhase::classify(Duration::minutes(10)),
            ReminderPhase::Upcoming15
        );
        assert_eq!(
            ReminderPhase::classify(Duration::minutes(20)),
            ReminderPhase::Dormant
        );
    }

    #[test]
    fn four_minutes_out_fires_five_minute_label_once() {
        let now = now();
        let task = task_due_in(4, now);
        let mut scanner = ReminderScanner::new();

        let firings = scanner.scan(std::slice::from_ref(&task), now);
        assert_eq!(firings.len(), 1);
        assert_eq!(firings[0].label, "5 минут");

        // Same phase on the next tick: nothing new fires.
        let firings = scanner.scan(std::slice::from_ref(&task), now + Duration::seconds(60));
        assert!(firings.is_empty());
    }

    #[test]
    fn completed_tasks_are_never_classified() {
        let now = now();
        let mut task = task_due_in(4, now);
        task.completed = true;

        let mut scanner = ReminderScanner::new();
        assert!(scanner.scan(std::slice::from_ref(&task), now).is_empty());

        let summary = ReminderSummary::build(std::slice::from_ref(&task), now);
        assert!(summary.is_empty());
    }

    #[test]
    fn phases_fire_in_order_once_each() {
        let now = now();
        let task = task_due_in(20, now);
        let mut scanner = ReminderScanner::new();

        assert!(scanner.scan(std::slice::from_ref(&task), now).is_empty());

        let firings = scanner.scan(std::slice::from_ref(&task), now + Duration::minutes(6));
        assert_eq!(firings.len(), 1);
        assert_eq!(firings[0].label, "15 минут");

        let firings = scanner.scan(std::slice::from_ref(&task), now + Duration::minutes(16));
        assert_eq!(firings.len(), 1);
        assert_eq!(firings[0].label, "5 минут");

        let firings = scanner.scan(std::slice::from_ref(&task), now + Duration::minutes(20));
        assert_eq!(firings.len(), 1);
        assert_eq!(firings[0].label, "сейчас");

        // Well past due: overdue, nothing more to announce.
        let firings = scanner.scan(std::slice::from_ref(&task), now + Duration::minutes(30));
        assert!(firings.is_empty());
    }

    #[test]
    fn skipped_threshold_still_fires_the_reached_phase() {
        let now = now();
        let task = task_due_in(20, now);
        let mut scanner = ReminderScanner::new();

        assert!(scanner.scan(std::slice::from_ref(&task), now).is_empty());

        // A long pause jumps straight past the 15-minute threshold.
        let firings = scanner.scan(std::slice::from_ref(&task), now + Duration::minutes(17));
        assert_eq!(firings.len(), 1);
        assert_eq!(firings[0].label, "5 минут");
    }

    #[test]
    fn scanner_never_moves_backward() {
        let now = now();
        let task = task_due_in(4, now);
        let mut scanner = ReminderScanner::new();

        assert_eq!(scanner.scan(std::slice::from_ref(&task), now).len(), 1);

        // A stale snapshot makes the task look further from due again.
        let firings = scanner.scan(std::slice::from_ref(&task), now - Duration::minutes(10));
        assert!(firings.is_empty());
    }

    #[test]
    fn completing_a_task_resets_its_tracking() {
        let now = now();
        let mut task = task_due_in(4, now);
        let mut scanner = ReminderScanner::new();

        assert_eq!(scanner.scan(std::slice::from_ref(&task), now).len(), 1);

        task.completed = true;
        assert!(scanner.scan(std::slice::from_ref(&task), now).is_empty());

        // Re-opened: the task starts over from Dormant and fires again.
        task.completed = false;
        assert_eq!(scanner.scan(std::slice::from_ref(&task), now).len(), 1);
    }

    #[test]
    fn summary_buckets_overdue_and_upcoming() {
        let now = now();
        let overdue = task_due_in(-24 * 60, now);
        let mut done_overdue = task_due_in(-24 * 60, now);
        done_overdue.completed = true;
        let soon = task_due_in(30, now);
        let later = task_due_in(90, now);
        let boundary = task_due_in(0, now);

        let tasks = vec![overdue.clone(), done_overdue, soon, later, boundary];
        let summary = ReminderSummary::build(&tasks, now);

        assert_eq!(summary.overdue.len(), 1);
        assert_eq!(summary.overdue[0].id, overdue.id);
        // Due-exactly-now counts as upcoming, and the 90-minute task is
        // beyond the one-hour horizon.
        assert_eq!(summary.upcoming.len(), 2);
        assert_eq!(summary.total(), 3);
    }

    #[test]
    fn summary_sorts_soonest_first() {
        let now = now();
        let in_50 = task_due_in(50, now);
        let in_10 = task_due_in(10, now);
        let summary = ReminderSummary::build(&[in_50, in_10.clone()], now);
        assert_eq!(summary.upcoming[0].id, in_10.id);
    }
}
