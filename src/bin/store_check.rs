use chrono::{Local, Utc};

#[tokio::main]
async fn main() {
    if let Ok(journal) = systemd_journal_logger::JournalLog::new() {
        let _ = journal
            .with_syslog_identifier("petal-store-check".to_string())
            .install();
        log::set_max_level(log::LevelFilter::Info);
    }

    let config = petal::config::Config::load();

    println!("=== Hosted Store Check ===\n");

    let service_url = config.service_url.trim();
    if service_url.is_empty() {
        println!("No service URL configured.");
        println!("Edit {}", petal::config::Config::path().display());
        return;
    }

    println!("--- Service: {} ---", service_url);

    let creds = petal::remote::credentials::load_credentials(service_url).await;
    let (email, password) = match creds {
        Ok(Some(pair)) => pair,
        Ok(None) => {
            println!("  No stored credentials. Run: petal login <email>");
            return;
        }
        Err(e) => {
            println!("  Keyring error: {}", e);
            return;
        }
    };

    let auth = match petal::remote::auth::AuthClient::new(service_url, &config.service_key) {
        Ok(a) => a,
        Err(e) => {
            println!("  Client error: {}", e);
            return;
        }
    };

    let session = match auth.sign_in(&email, &password).await {
        Ok(s) => s,
        Err(e) => {
            println!("  Sign-in failed: {}", e);
            return;
        }
    };
    println!("  Signed in as {} ({})", session.user.email, session.user.id);

    let client = match petal::remote::rest::RestClient::new(
        service_url,
        &config.service_key,
        &session.access_token,
    ) {
        Ok(c) => c,
        Err(e) => {
            println!("  Client error: {}", e);
            return;
        }
    };
    let store = petal::remote::store::Store::new(client, session.user.id);

    println!();

    match store.tasks().await {
        Ok(tasks) => {
            let pending = tasks.iter().filter(|t| !t.completed).count();
            println!("  Tasks: {} ({} pending)", tasks.len(), pending);

            let summary = petal::core::reminder::ReminderSummary::build(&tasks, Utc::now());
            if summary.is_empty() {
                println!("  Reminders: none");
            } else {
                println!(
                    "  Reminders: {} overdue, {} due within the hour",
                    summary.overdue.len(),
                    summary.upcoming.len()
                );
                for task in summary.overdue.iter().chain(summary.upcoming.iter()) {
                    let due = task
                        .due_local()
                        .map(|dt| dt.format("%-d %b %H:%M").to_string())
                        .unwrap_or_default();
                    println!("    [{}] {}", due, task.title);
                }
            }
        }
        Err(e) => println!("  Error listing tasks: {}", e),
    }

    match store.habits().await {
        Ok(habits) => {
            println!("  Habits: {}", habits.len());
            let today = Local::now().date_naive();
            match store.entries_on(today).await {
                Ok(entries) => {
                    println!("  Habit entries today: {}", entries.len());
                }
                Err(e) => println!("  Error listing habit entries: {}", e),
            }
        }
        Err(e) => println!("  Error listing habits: {}", e),
    }

    match store.moods().await {
        Ok(moods) => {
            println!("  Mood entries: {}", moods.len());
            if let Some(latest) = moods.first() {
                println!(
                    "  Latest mood: {} at {}",
                    latest.mood.label(),
                    latest
                        .recorded_at
                        .with_timezone(&Local)
                        .format("%-d %b %H:%M")
                );
            }
        }
        Err(e) => println!("  Error listing moods: {}", e),
    }

    println!("\n=== Done ===");
}
