use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "high" | "h" => Some(Self::High),
            "medium" | "m" => Some(Self::Medium),
            "low" | "l" => Some(Self::Low),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub due_at: Option<DateTime<Utc>>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl Task {
    pub fn new(owner_id: Uuid, title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            title: title.into(),
            description: None,
            priority: Priority::Medium,
            due_at: None,
            completed: false,
            created_at: Utc::now(),
        }
    }

    /// Due moment in the user's timezone, for display and day bucketing.
    pub fn due_local(&self) -> Option<DateTime<Local>> {
        self.due_at.map(|dt| dt.with_timezone(&Local))
    }

    /// Whether the due moment falls on the given calendar day,
    /// compared by local year/month/day rather than exact timestamp.
    pub fn is_due_on(&self, day: NaiveDate) -> bool {
        self.due_local().is_some_and(|dt| dt.date_naive() == day)
    }

    /// Case-insensitive match against title and description.
    pub fn matches(&self, query: &str) -> bool {
        let needle = query.to_lowercase();
        self.title.to_lowercase().contains(&needle)
            || self
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn priority_round_trip() {
        for p in [Priority::High, Priority::Medium, Priority::Low] {
            assert_eq!(Priority::parse(p.as_str()), Some(p));
        }
        assert_eq!(Priority::parse("urgent"), None);
    }

    #[test]
    fn priority_sorts_high_first() {
        let mut ps = vec![Priority::Low, Priority::High, Priority::Medium];
        ps.sort();
        assert_eq!(ps, vec![Priority::High, Priority::Medium, Priority::Low]);
    }

    #[test]
    fn due_on_compares_local_day() {
        let owner = Uuid::new_v4();
        let mut task = Task::new(owner, "Doctor appointment");
        let local = Local.with_ymd_and_hms(2026, 3, 8, 14, 30, 0).unwrap();
        task.due_at = Some(local.with_timezone(&Utc));

        let day = NaiveDate::from_ymd_opt(2026, 3, 8).unwrap();
        assert!(task.is_due_on(day));
        assert!(!task.is_due_on(day.succ_opt().unwrap()));
    }

    #[test]
    fn no_due_date_never_matches_a_day() {
        let task = Task::new(Uuid::new_v4(), "Someday");
        assert!(!task.is_due_on(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()));
    }

    #[test]
    fn search_matches_title_and_description() {
        let mut task = Task::new(Uuid::new_v4(), "Buy a gift");
        task.description = Some("Birthday is coming up".to_string());
        assert!(task.matches("GIFT"));
        assert!(task.matches("birthday"));
        assert!(!task.matches("groceries"));
    }
}
