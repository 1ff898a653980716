use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Local, LocalResult, NaiveDate, NaiveDateTime, Utc};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::config::Config;
use crate::core::calendar::{self, ViewMode};
use crate::core::habit::{Habit, HabitLog};
use crate::core::mood::Mood;
use crate::core::reminder::{ReminderScanner, ReminderSummary};
use crate::core::task::{Priority, Task};
use crate::notify::Notifier;
use crate::pages;
use crate::pages::tasks::TaskFilter;
use crate::remote::auth::{AuthClient, Session};
use crate::remote::credentials;
use crate::remote::rest::RestClient;
use crate::remote::store::Store;
use crate::remote::StoreError;

/// Owns the session and the fetched state, and runs the user's commands.
/// All mutation happens here, in response to a command or a watch tick.
pub struct App {
    config: Config,
    auth: AuthClient,
    session: Option<Session>,
    store: Option<Store>,
}

impl App {
    /// Build the app and re-establish a session from stored credentials
    /// when there are any. A rejected or missing credential is not fatal;
    /// the app starts signed out.
    pub async fn connect(config: Config) -> Result<Self, StoreError> {
        if !config.is_configured() {
            return Err(StoreError::validation(
                "config",
                format!(
                    "set service_url and service_key in {}",
                    Config::path().display()
                ),
            ));
        }

        let auth = AuthClient::new(&config.service_url, &config.service_key)?;
        let mut app = Self {
            config,
            auth,
            session: None,
            store: None,
        };
        app.restore_session().await;
        Ok(app)
    }

    async fn restore_session(&mut self) {
        match credentials::load_credentials(&self.config.service_url).await {
            Ok(Some((email, password))) => {
                match self.auth.sign_in(&email, &password).await {
                    Ok(session) => {
                        if let Err(e) = self.install_session(session) {
                            log::warn!("Failed to set up store: {}", e);
                        }
                    }
                    Err(e) => log::warn!("Stored credentials rejected: {}", e),
                }
            }
            Ok(None) => {}
            Err(e) => log::warn!("Keyring unavailable: {}", e),
        }
    }

    fn install_session(&mut self, session: Session) -> Result<(), StoreError> {
        let client = RestClient::new(
            &self.config.service_url,
            &self.config.service_key,
            &session.access_token,
        )?;
        self.store = Some(Store::new(client, session.user.id));
        self.session = Some(session);
        Ok(())
    }

    fn store(&self) -> Result<&Store, StoreError> {
        self.store.as_ref().ok_or(StoreError::NoSession)
    }

    // --- session commands ---

    pub async fn login(&mut self, email: &str, password: &str) -> Result<(), StoreError> {
        let session = self.auth.sign_in(email, password).await?;
        if let Err(e) = credentials::store_credentials(&self.config.service_url, email, password).await
        {
            log::warn!("Could not remember credentials: {}", e);
        }
        println!("Signed in as {}", session.user.email);
        self.install_session(session)
    }

    pub async fn logout(&mut self) -> Result<(), StoreError> {
        if let Some(session) = self.session.take() {
            if let Err(e) = self.auth.sign_out(&session.access_token).await {
                log::warn!("Sign-out call failed: {}", e);
            }
        }
        self.store = None;
        credentials::delete_credentials(&self.config.service_url).await?;
        println!("Signed out.");
        Ok(())
    }

    pub async fn whoami(&self) -> Result<(), StoreError> {
        match &self.session {
            Some(session) => match self.auth.current_user(&session.access_token).await? {
                Some(user) => println!("{} ({})", user.email, user.id),
                None => println!("Session expired. Sign in again."),
            },
            None => println!("Not signed in."),
        }
        Ok(())
    }

    // --- pages ---

    pub async fn overview(&self) -> Result<(), StoreError> {
        let store = self.store()?;
        let tasks = store.tasks().await?;
        let moods = store.moods().await?;
        let today = Local::now().date_naive();
        let summary = ReminderSummary::build(&tasks, Utc::now());
        print!(
            "{}",
            pages::overview::overview_view(
                today,
                &tasks,
                moods.first(),
                &self.config.cycle_markers,
                &summary,
            )
        );
        Ok(())
    }

    pub async fn tasks(&self, filter: &TaskFilter) -> Result<(), StoreError> {
        let tasks = self.store()?.tasks().await?;
        print!("{}", pages::tasks::tasks_view(&tasks, filter));
        Ok(())
    }

    pub async fn add_task(
        &self,
        title: &str,
        description: Option<String>,
        priority: Priority,
        due: Option<&str>,
    ) -> Result<(), StoreError> {
        let due_at = due.map(parse_due).transpose()?;
        let task = self
            .store()?
            .insert_task(title, description, priority, due_at)
            .await?;
        println!(
            "Added task {} '{}'",
            pages::tasks::short_id(&task),
            task.title
        );
        Ok(())
    }

    pub async fn set_task_done(&self, needle: &str, done: bool) -> Result<(), StoreError> {
        let store = self.store()?;
        let tasks = store.tasks().await?;
        let task = resolve_task(&tasks, needle)?;
        store.set_task_completed(task.id, done).await?;
        println!(
            "'{}' is now {}",
            task.title,
            if done { "done" } else { "pending" }
        );
        Ok(())
    }

    pub async fn remove_task(&self, needle: &str) -> Result<(), StoreError> {
        let store = self.store()?;
        let tasks = store.tasks().await?;
        let task = resolve_task(&tasks, needle)?;
        store.delete_task(task.id).await?;
        println!("Removed '{}'", task.title);
        Ok(())
    }

    pub async fn reminders(&self) -> Result<(), StoreError> {
        let tasks = self.store()?.tasks().await?;
        let summary = ReminderSummary::build(&tasks, Utc::now());
        if summary.is_empty() {
            println!("No reminders.");
            return Ok(());
        }
        if !summary.overdue.is_empty() {
            println!("Overdue ({}):", summary.overdue.len());
            for task in &summary.overdue {
                println!("  {}  {}", format_due(task), task.title);
            }
        }
        if !summary.upcoming.is_empty() {
            println!("Due soon ({}):", summary.upcoming.len());
            for task in &summary.upcoming {
                println!("  {}  {}", format_due(task), task.title);
            }
        }
        Ok(())
    }

    pub async fn calendar(&self, mode: ViewMode, offset: i32) -> Result<(), StoreError> {
        let today = Local::now().date_naive();
        let reference = calendar::navigate(today, mode, offset);
        let store = self.store()?;

        let tasks = match mode {
            ViewMode::Month => store.month_tasks(reference).await?,
            ViewMode::Week => {
                store
                    .tasks_due_between(
                        day_start_utc(reference - Duration::days(1)),
                        day_end_utc(reference + Duration::days(7)),
                    )
                    .await?
            }
            ViewMode::Day => {
                store
                    .tasks_due_between(
                        day_start_utc(reference - Duration::days(1)),
                        day_end_utc(reference + Duration::days(1)),
                    )
                    .await?
            }
        };

        print!(
            "{}",
            pages::calendar::calendar_view(
                reference,
                mode,
                today,
                &tasks,
                &self.config.cycle_markers,
            )
        );
        Ok(())
    }

    // --- habits ---

    pub async fn habits(&self) -> Result<(), StoreError> {
        let logs = self.habit_logs().await?;
        let today = Local::now().date_naive();
        print!("{}", pages::habits::habits_view(&logs, today));
        Ok(())
    }

    pub async fn add_habit(&self, name: &str) -> Result<(), StoreError> {
        let habit = self.store()?.insert_habit(name).await?;
        println!("Added habit '{}'", habit.name);
        Ok(())
    }

    pub async fn toggle_habit(&self, needle: &str) -> Result<(), StoreError> {
        let store = self.store()?;
        let habits = store.habits().await?;
        let habit = resolve_habit(&habits, needle)?;
        let today = Local::now().date_naive();
        let done = store.toggle_habit(habit, today).await?;
        println!(
            "'{}' {} for today",
            habit.name,
            if done { "marked done" } else { "unmarked" }
        );
        Ok(())
    }

    pub async fn remove_habit(&self, needle: &str) -> Result<(), StoreError> {
        let store = self.store()?;
        let habits = store.habits().await?;
        let habit = resolve_habit(&habits, needle)?;
        store.delete_habit(habit.id).await?;
        println!("Removed habit '{}'", habit.name);
        Ok(())
    }

    async fn habit_logs(&self) -> Result<Vec<HabitLog>, StoreError> {
        let store = self.store()?;
        let habits = store.habits().await?;
        let mut logs = Vec::with_capacity(habits.len());
        for habit in habits {
            let entries = store.entries_for_habit(habit.id).await?;
            logs.push(HabitLog::new(habit, entries));
        }
        Ok(logs)
    }

    // --- mood ---

    pub async fn mood(&self) -> Result<(), StoreError> {
        let entries = self.store()?.moods().await?;
        print!("{}", pages::mood::mood_view(&entries));
        Ok(())
    }

    pub async fn record_mood(&self, kind: &str, note: Option<String>) -> Result<(), StoreError> {
        let Some(mood) = Mood::parse(kind) else {
            return Err(StoreError::validation(
                "mood",
                format!(
                    "unknown mood '{}'; one of: {}",
                    kind,
                    Mood::ALL.map(|m| m.as_str()).join(", ")
                ),
            ));
        };
        let entry = self.store()?.record_mood(mood, note).await?;
        println!("Recorded {} {}", entry.mood.emoji(), entry.mood.label());
        Ok(())
    }

    // --- watch ---

    /// Run the reminder loop until interrupted. The periodic work lives in
    /// a task owned by this call; interrupting stops and aborts it, and an
    /// aborted in-flight refresh discards its result.
    pub async fn watch(&self) -> Result<(), StoreError> {
        let store = self.store()?.clone();
        println!(
            "Watching reminders every {}s. Ctrl-C to stop.",
            self.config.scan_interval_secs
        );

        let task = WatchTask::start(
            store,
            self.config.scan_interval_secs,
            self.config.refresh_every_ticks,
            self.config.toast_cap,
        );

        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for interrupt: {}", e);
        }
        task.stop();
        println!("\nStopped.");
        Ok(())
    }
}

/// The reminder loop as a capability-scoped lifecycle object: started
/// explicitly, stopped by aborting the owned task. Dropping the handle
/// stops the loop too, so a torn-down owner cannot leak the timer.
pub struct WatchTask {
    handle: JoinHandle<()>,
}

impl WatchTask {
    pub fn start(store: Store, scan_interval_secs: u64, refresh_every_ticks: u32, toast_cap: usize) -> Self {
        let handle = tokio::spawn(async move {
            let mut notifier = Notifier::new(toast_cap);
            notifier.request_permission();

            let mut scanner = ReminderScanner::new();
            let mut interval =
                tokio::time::interval(StdDuration::from_secs(scan_interval_secs.max(1)));
            // A tick must finish before the next is scheduled; a late tick
            // shifts the cadence instead of bunching up.
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            let refresh_every = refresh_every_ticks.max(1);
            let mut tasks: Vec<Task> = Vec::new();
            let mut ticks_until_refresh = 0u32;
            let mut last_total: Option<usize> = None;

            loop {
                interval.tick().await;

                // Refresh on a coarser cadence than the classification.
                if ticks_until_refresh == 0 {
                    match store.tasks().await {
                        Ok(fresh) => tasks = fresh,
                        Err(e) => log::error!("Task refresh failed: {}", e),
                    }
                    ticks_until_refresh = refresh_every;
                }
                ticks_until_refresh -= 1;

                let now = Utc::now();
                for firing in scanner.scan(&tasks, now) {
                    notifier.remind(&firing.title, firing.label);
                    println!(
                        "{} 🔔 Напоминание: {} - {}",
                        Local::now().format("%H:%M"),
                        firing.title,
                        firing.label
                    );
                }

                let summary = ReminderSummary::build(&tasks, now);
                if last_total != Some(summary.total()) {
                    last_total = Some(summary.total());
                    if !summary.is_empty() {
                        println!(
                            "{} ⏰ {} reminders ({} overdue, {} due within the hour)",
                            Local::now().format("%H:%M"),
                            summary.total(),
                            summary.overdue.len(),
                            summary.upcoming.len()
                        );
                    }
                }
            }
        });

        Self { handle }
    }

    pub fn stop(self) {
        self.handle.abort();
    }
}

impl Drop for WatchTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Parse a due moment: `YYYY-MM-DD HH:MM`, or a bare `YYYY-MM-DD` meaning
/// the end of that day. Interpreted in the local timezone.
pub fn parse_due(input: &str) -> Result<DateTime<Utc>, StoreError> {
    let s = input.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M") {
        return local_to_utc(dt);
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return local_to_utc(d.and_hms_opt(23, 59, 0).unwrap());
    }
    Err(StoreError::validation(
        "due",
        "expected YYYY-MM-DD or 'YYYY-MM-DD HH:MM'",
    ))
}

fn local_to_utc(dt: NaiveDateTime) -> Result<DateTime<Utc>, StoreError> {
    match dt.and_local_timezone(Local) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earlier, _) => Ok(earlier.with_timezone(&Utc)),
        LocalResult::None => Err(StoreError::validation(
            "due",
            "time does not exist in the local timezone",
        )),
    }
}

fn day_start_utc(day: NaiveDate) -> DateTime<Utc> {
    day.and_hms_opt(0, 0, 0).unwrap().and_utc()
}

fn day_end_utc(day: NaiveDate) -> DateTime<Utc> {
    day.and_hms_opt(23, 59, 59).unwrap().and_utc()
}

fn format_due(task: &Task) -> String {
    task.due_local()
        .map(|dt| dt.format("%-d %b %H:%M").to_string())
        .unwrap_or_default()
}

/// Find one task by id prefix or title fragment.
fn resolve_task<'a>(tasks: &'a [Task], needle: &str) -> Result<&'a Task, StoreError> {
    let lower = needle.to_lowercase();
    let matches: Vec<&Task> = tasks
        .iter()
        .filter(|t| {
            t.id.to_string().starts_with(&lower) || t.title.to_lowercase().contains(&lower)
        })
        .collect();
    match matches.as_slice() {
        [] => Err(StoreError::validation(
            "task",
            format!("nothing matches '{}'", needle),
        )),
        [task] => Ok(task),
        many => Err(StoreError::validation(
            "task",
            format!("'{}' is ambiguous ({} matches)", needle, many.len()),
        )),
    }
}

/// Find one habit by id prefix or name fragment.
fn resolve_habit<'a>(habits: &'a [Habit], needle: &str) -> Result<&'a Habit, StoreError> {
    let lower = needle.to_lowercase();
    let matches: Vec<&Habit> = habits
        .iter()
        .filter(|h| {
            h.id.to_string().starts_with(&lower) || h.name.to_lowercase().contains(&lower)
        })
        .collect();
    match matches.as_slice() {
        [] => Err(StoreError::validation(
            "habit",
            format!("nothing matches '{}'", needle),
        )),
        [habit] => Ok(habit),
        many => Err(StoreError::validation(
            "habit",
            format!("'{}' is ambiguous ({} matches)", needle, many.len()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn due_parse_round_trips_local_time() {
        let due = parse_due("2026-03-08 14:30").unwrap();
        let local = due.with_timezone(&Local);
        assert_eq!(
            local.naive_local(),
            NaiveDateTime::parse_from_str("2026-03-08 14:30", "%Y-%m-%d %H:%M").unwrap()
        );
    }

    #[test]
    fn bare_date_means_end_of_day() {
        let due = parse_due("2026-03-08").unwrap();
        let local = due.with_timezone(&Local);
        assert_eq!(local.format("%H:%M").to_string(), "23:59");
    }

    #[test]
    fn junk_due_is_rejected_locally() {
        assert!(parse_due("next tuesday").is_err());
    }

    #[test]
    fn task_resolution_by_prefix_and_title() {
        let owner = Uuid::new_v4();
        let call = Task::new(owner, "Call the clinic");
        let yoga = Task::new(owner, "Yoga");
        let tasks = vec![call.clone(), yoga];

        assert_eq!(resolve_task(&tasks, "clinic").unwrap().id, call.id);
        let prefix: String = call.id.to_string().chars().take(8).collect();
        assert_eq!(resolve_task(&tasks, &prefix).unwrap().id, call.id);
        assert!(resolve_task(&tasks, "nothing-like-this").is_err());
    }

    #[test]
    fn ambiguous_resolution_is_an_error() {
        let owner = Uuid::new_v4();
        let tasks = vec![Task::new(owner, "Call mom"), Task::new(owner, "Call bank")];
        assert!(resolve_task(&tasks, "call").is_err());
    }
}
