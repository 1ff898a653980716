use petal::app::App;
use petal::config::Config;
use petal::core::calendar::ViewMode;
use petal::core::task::Priority;
use petal::pages::tasks::TaskFilter;
use petal::remote::StoreError;

const USAGE: &str = "\
petal - personal planner

Usage:
  petal [overview]                     today's dashboard
  petal tasks [--search Q] [--priority P] [--all]
  petal tasks add <title> [--due 'YYYY-MM-DD HH:MM'] [--priority P] [--note N]
  petal tasks done|undone|rm <id-prefix or title fragment>
  petal reminders                      overdue and due-soon summary
  petal calendar [--mode month|week|day] [--offset N]
  petal habits                         tracker with streaks
  petal habits add <name>
  petal habits toggle|rm <name>
  petal mood                           journal and statistics
  petal mood record <kind> [note...]   kind: happy calm energetic sad anxious
  petal login <email> | logout | whoami
  petal watch                          reminder loop (Ctrl-C stops)
";

fn main() {
    let config = Config::load();
    if let Err(e) = config.ensure() {
        eprintln!("warning: could not write default config: {}", e);
    }

    // Log to the systemd user journal (`journalctl --user -t petal -f`).
    // Wrapper filters: petal crate at info/debug (per config), everything else at warn.
    {
        struct FilteredJournal {
            inner: systemd_journal_logger::JournalLog,
        }

        impl log::Log for FilteredJournal {
            fn enabled(&self, metadata: &log::Metadata) -> bool {
                let target = metadata.target();
                if target.starts_with("petal") {
                    let max = if petal::debug_logging() {
                        log::LevelFilter::Debug
                    } else {
                        log::LevelFilter::Info
                    };
                    metadata.level() <= max
                } else {
                    metadata.level() <= log::LevelFilter::Warn
                }
            }
            fn log(&self, record: &log::Record) {
                if self.enabled(record.metadata()) {
                    self.inner.log(record);
                }
            }
            fn flush(&self) {
                self.inner.flush();
            }
        }

        petal::set_debug_logging(config.debug_logging);

        match systemd_journal_logger::JournalLog::new() {
            Ok(journal) => {
                let journal = journal.with_syslog_identifier("petal".to_string());
                if log::set_boxed_logger(Box::new(FilteredJournal { inner: journal })).is_ok() {
                    // Global max must be Debug so petal debug logs can pass through when toggled.
                    log::set_max_level(log::LevelFilter::Debug);
                }
            }
            Err(e) => eprintln!("warning: journal logging unavailable: {}", e),
        }
    }

    let args: Vec<String> = std::env::args().skip(1).collect();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: failed to start runtime: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(run(config, args)) {
        log::error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: Config, mut args: Vec<String>) -> Result<(), Box<dyn std::error::Error>> {
    let command = if args.is_empty() {
        "overview".to_string()
    } else {
        args.remove(0)
    };

    if matches!(command.as_str(), "help" | "--help" | "-h") {
        print!("{}", USAGE);
        return Ok(());
    }

    let mut app = App::connect(config).await?;

    match command.as_str() {
        "overview" => app.overview().await?,
        "tasks" => run_tasks(&app, args).await?,
        "reminders" => app.reminders().await?,
        "calendar" => {
            let mode = match take_value(&mut args, "--mode") {
                Some(m) => ViewMode::parse(&m).ok_or_else(|| {
                    StoreError::validation("mode", "one of: month, week, day")
                })?,
                None => ViewMode::Month,
            };
            let offset = match take_value(&mut args, "--offset") {
                Some(n) => n
                    .parse::<i32>()
                    .map_err(|_| StoreError::validation("offset", "expected an integer"))?,
                None => 0,
            };
            app.calendar(mode, offset).await?;
        }
        "habits" => run_habits(&app, args).await?,
        "mood" => run_mood(&app, args).await?,
        "login" => {
            let email = args
                .first()
                .ok_or_else(|| StoreError::validation("email", "usage: petal login <email>"))?;
            let password = prompt_password()?;
            app.login(email, &password).await?;
        }
        "logout" => app.logout().await?,
        "whoami" => app.whoami().await?,
        "watch" => app.watch().await?,
        other => {
            eprintln!("Unknown command '{}'\n", other);
            print!("{}", USAGE);
        }
    }

    Ok(())
}

async fn run_tasks(app: &App, mut args: Vec<String>) -> Result<(), StoreError> {
    let sub = args.first().cloned();
    match sub.as_deref() {
        Some("add") => {
            args.remove(0);
            let due = take_value(&mut args, "--due");
            let priority = match take_value(&mut args, "--priority") {
                Some(p) => parse_priority(&p)?,
                None => Priority::Medium,
            };
            let note = take_value(&mut args, "--note");
            let title = args.join(" ");
            app.add_task(&title, note, priority, due.as_deref()).await
        }
        Some("done") => {
            args.remove(0);
            app.set_task_done(&args.join(" "), true).await
        }
        Some("undone") => {
            args.remove(0);
            app.set_task_done(&args.join(" "), false).await
        }
        Some("rm") => {
            args.remove(0);
            app.remove_task(&args.join(" ")).await
        }
        _ => {
            let filter = TaskFilter {
                search: take_value(&mut args, "--search"),
                priority: match take_value(&mut args, "--priority") {
                    Some(p) => Some(parse_priority(&p)?),
                    None => None,
                },
                show_completed: take_flag(&mut args, "--all"),
            };
            app.tasks(&filter).await
        }
    }
}

async fn run_habits(app: &App, mut args: Vec<String>) -> Result<(), StoreError> {
    let sub = args.first().cloned();
    match sub.as_deref() {
        Some("add") => {
            args.remove(0);
            app.add_habit(&args.join(" ")).await
        }
        Some("toggle") => {
            args.remove(0);
            app.toggle_habit(&args.join(" ")).await
        }
        Some("rm") => {
            args.remove(0);
            app.remove_habit(&args.join(" ")).await
        }
        _ => app.habits().await,
    }
}

async fn run_mood(app: &App, mut args: Vec<String>) -> Result<(), StoreError> {
    let sub = args.first().cloned();
    match sub.as_deref() {
        Some("record") => {
            args.remove(0);
            let kind = args
                .first()
                .cloned()
                .ok_or_else(|| StoreError::validation("mood", "usage: petal mood record <kind>"))?;
            let note = if args.len() > 1 {
                Some(args[1..].join(" "))
            } else {
                None
            };
            app.record_mood(&kind, note).await
        }
        _ => app.mood().await,
    }
}

fn parse_priority(s: &str) -> Result<Priority, StoreError> {
    Priority::parse(s).ok_or_else(|| {
        StoreError::validation("priority", format!("unknown priority '{}'; one of: high, medium, low", s))
    })
}

/// Remove `--name value` from the args, returning the value.
fn take_value(args: &mut Vec<String>, name: &str) -> Option<String> {
    let pos = args.iter().position(|a| a == name)?;
    if pos + 1 >= args.len() {
        args.remove(pos);
        return None;
    }
    let value = args.remove(pos + 1);
    args.remove(pos);
    Some(value)
}

/// Remove a bare `--name` from the args, reporting whether it was present.
fn take_flag(args: &mut Vec<String>, name: &str) -> bool {
    match args.iter().position(|a| a == name) {
        Some(pos) => {
            args.remove(pos);
            true
        }
        None => false,
    }
}

fn prompt_password() -> std::io::Result<String> {
    use std::io::Write;
    print!("Password: ");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\n', '\r']).to_string())
}
