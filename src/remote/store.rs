use chrono::{DateTime, Datelike, Duration, NaiveDate, SecondsFormat, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::core::calendar::{self, ViewMode};
use crate::core::habit::{Habit, HabitEntry};
use crate::core::mood::{Mood, MoodEntry};
use crate::core::task::{Priority, Task};

use super::rest::{Filter, Order, RestClient};
use super::StoreError;

const TASKS: &str = "tasks";
const HABITS: &str = "habits";
const HABIT_ENTRIES: &str = "habit_entries";
const MOOD_ENTRIES: &str = "mood_entries";

/// Typed, owner-scoped operations over the row API.
///
/// Every query built here carries an `owner_id` filter for the signed-in
/// user, and every inserted row carries that owner id; there is no path
/// around the scoping. The service's row-level security enforces the same
/// boundary for id-addressed updates and deletes.
#[derive(Clone)]
pub struct Store {
    client: RestClient,
    owner: Uuid,
}

impl Store {
    pub fn new(client: RestClient, owner: Uuid) -> Self {
        Self { client, owner }
    }

    pub fn owner(&self) -> Uuid {
        self.owner
    }

    fn owned(&self) -> Filter {
        Filter::eq("owner_id", self.owner)
    }

    // --- tasks ---

    /// All of the owner's tasks, oldest first.
    pub async fn tasks(&self) -> Result<Vec<Task>, StoreError> {
        let rows = self
            .client
            .select(TASKS, &[self.owned()], Some(&Order::asc("created_at")))
            .await?;
        log::debug!("Fetched {} tasks", rows.len());
        rows.into_iter()
            .map(|r| serde_json::from_value(r).map_err(Into::into))
            .collect()
    }

    /// Tasks with a due moment inside the inclusive window, soonest first.
    pub async fn tasks_due_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Task>, StoreError> {
        let rows = self
            .client
            .select(
                TASKS,
                &[
                    self.owned(),
                    Filter::gte("due_at", rfc3339(from)),
                    Filter::lte("due_at", rfc3339(to)),
                ],
                Some(&Order::asc("due_at")),
            )
            .await?;
        rows.into_iter()
            .map(|r| serde_json::from_value(r).map_err(Into::into))
            .collect()
    }

    /// Tasks due inside the calendar month containing `reference`.
    ///
    /// The fetch window is padded one day on each side so local-day
    /// bucketing never misses a task whose UTC timestamp falls across a
    /// timezone boundary; the calendar grid filters to exact days.
    pub async fn month_tasks(&self, reference: NaiveDate) -> Result<Vec<Task>, StoreError> {
        let first = reference.with_day(1).unwrap_or(reference);
        let next_month = calendar::navigate(first, ViewMode::Month, 1);
        let from = (first - Duration::days(1)).and_hms_opt(0, 0, 0).unwrap().and_utc();
        let to = (next_month + Duration::days(1))
            .and_hms_opt(23, 59, 59)
            .unwrap()
            .and_utc();
        self.tasks_due_between(from, to).await
    }

    /// Create a task. The title is required; everything else is optional.
    pub async fn insert_task(
        &self,
        title: &str,
        description: Option<String>,
        priority: Priority,
        due_at: Option<DateTime<Utc>>,
    ) -> Result<Task, StoreError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(StoreError::validation("title", "must not be empty"));
        }

        let mut task = Task::new(self.owner, title);
        task.description = description.filter(|d| !d.trim().is_empty());
        task.priority = priority;
        task.due_at = due_at;

        let row = self.client.insert(TASKS, serde_json::to_value(&task)?).await?;
        log::info!("Created task '{}'", task.title);
        Ok(serde_json::from_value(row)?)
    }

    /// Flip the completion flag. Completion is toggled, never inferred.
    pub async fn set_task_completed(&self, id: Uuid, completed: bool) -> Result<(), StoreError> {
        self.client
            .update(TASKS, id, json!({ "completed": completed }))
            .await?;
        log::info!(
            "Task {} marked {}",
            id,
            if completed { "completed" } else { "pending" }
        );
        Ok(())
    }

    pub async fn delete_task(&self, id: Uuid) -> Result<(), StoreError> {
        self.client.delete(TASKS, id).await?;
        log::info!("Deleted task {}", id);
        Ok(())
    }

    // --- habits ---

    /// All of the owner's habits, oldest first.
    pub async fn habits(&self) -> Result<Vec<Habit>, StoreError> {
        let rows = self
            .client
            .select(HABITS, &[self.owned()], Some(&Order::asc("created_at")))
            .await?;
        rows.into_iter()
            .map(|r| serde_json::from_value(r).map_err(Into::into))
            .collect()
    }

    pub async fn insert_habit(&self, name: &str) -> Result<Habit, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::validation("name", "must not be empty"));
        }

        let habit = Habit::new(self.owner, name);
        let row = self
            .client
            .insert(HABITS, serde_json::to_value(&habit)?)
            .await?;
        log::info!("Created habit '{}'", habit.name);
        Ok(serde_json::from_value(row)?)
    }

    /// Delete a habit and its entry history.
    pub async fn delete_habit(&self, id: Uuid) -> Result<(), StoreError> {
        for entry in self.entries_for_habit(id).await? {
            self.client.delete(HABIT_ENTRIES, entry.id).await?;
        }
        self.client.delete(HABITS, id).await?;
        log::info!("Deleted habit {}", id);
        Ok(())
    }

    /// Entries for one calendar day across all habits.
    pub async fn entries_on(&self, day: NaiveDate) -> Result<Vec<HabitEntry>, StoreError> {
        let rows = self
            .client
            .select(
                HABIT_ENTRIES,
                &[self.owned(), Filter::eq("entry_date", day)],
                None,
            )
            .await?;
        rows.into_iter()
            .map(|r| serde_json::from_value(r).map_err(Into::into))
            .collect()
    }

    /// Full entry history for one habit, oldest first.
    pub async fn entries_for_habit(&self, habit_id: Uuid) -> Result<Vec<HabitEntry>, StoreError> {
        let rows = self
            .client
            .select(
                HABIT_ENTRIES,
                &[self.owned(), Filter::eq("habit_id", habit_id)],
                Some(&Order::asc("entry_date")),
            )
            .await?;
        rows.into_iter()
            .map(|r| serde_json::from_value(r).map_err(Into::into))
            .collect()
    }

    /// Mark or un-mark a habit for a day. Presence of the entry row is the
    /// completion state, so toggling means insert or delete; toggling twice
    /// restores the original state. Returns whether the habit is now done.
    pub async fn toggle_habit(&self, habit: &Habit, day: NaiveDate) -> Result<bool, StoreError> {
        let existing = self
            .client
            .select(
                HABIT_ENTRIES,
                &[
                    self.owned(),
                    Filter::eq("habit_id", habit.id),
                    Filter::eq("entry_date", day),
                ],
                None,
            )
            .await?;

        if let Some(row) = existing.first() {
            let entry: HabitEntry = serde_json::from_value(row.clone())?;
            self.client.delete(HABIT_ENTRIES, entry.id).await?;
            log::info!("Unmarked habit '{}' for {}", habit.name, day);
            Ok(false)
        } else {
            let entry = HabitEntry::new(habit, day);
            self.client
                .insert(HABIT_ENTRIES, serde_json::to_value(&entry)?)
                .await?;
            log::info!("Marked habit '{}' done for {}", habit.name, day);
            Ok(true)
        }
    }

    // --- mood ---

    /// Mood journal, newest first.
    pub async fn moods(&self) -> Result<Vec<MoodEntry>, StoreError> {
        let rows = self
            .client
            .select(
                MOOD_ENTRIES,
                &[self.owned()],
                Some(&Order::desc("recorded_at")),
            )
            .await?;
        rows.into_iter()
            .map(|r| serde_json::from_value(r).map_err(Into::into))
            .collect()
    }

    pub async fn record_mood(
        &self,
        mood: Mood,
        note: Option<String>,
    ) -> Result<MoodEntry, StoreError> {
        let entry = MoodEntry::new(self.owner, mood, note);
        let row = self
            .client
            .insert(MOOD_ENTRIES, serde_json::to_value(&entry)?)
            .await?;
        log::info!("Recorded mood {}", entry.mood.as_str());
        Ok(serde_json::from_value(row)?)
    }
}

fn rfc3339(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}
