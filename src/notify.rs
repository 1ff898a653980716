use std::collections::VecDeque;

use chrono::{DateTime, Local};

/// Platform notification permission, mirroring the three-state model of
/// the native permission API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
    Default,
}

/// An in-app transient notification.
#[derive(Debug, Clone)]
pub struct Toast {
    pub title: String,
    pub body: String,
    pub posted_at: DateTime<Local>,
}

/// Dual-channel notification dispatch: a best-effort native desktop
/// notification plus an in-app toast feed.
///
/// The native channel is only used once permission has been granted, and
/// a failure to post there is logged and otherwise ignored. The toast
/// channel always receives the message, so a denied permission silently
/// degrades to in-app only.
pub struct Notifier {
    permission: Permission,
    toasts: VecDeque<Toast>,
    cap: usize,
}

impl Notifier {
    pub fn new(cap: usize) -> Self {
        Self {
            permission: Permission::Default,
            toasts: VecDeque::new(),
            cap: cap.max(1),
        }
    }

    pub fn permission(&self) -> Permission {
        self.permission
    }

    /// Probe the desktop notification service once and settle the
    /// permission. Asking again after a decision is a no-op.
    pub fn request_permission(&mut self) -> Permission {
        if self.permission == Permission::Default {
            self.permission = match notify_rust::get_capabilities() {
                Ok(_) => Permission::Granted,
                Err(e) => {
                    log::info!("Desktop notifications unavailable: {}", e);
                    Permission::Denied
                }
            };
        }
        self.permission
    }

    /// Post the same text on both channels.
    pub fn notify(&mut self, title: &str, body: &str) {
        self.post_native(title, body);
        self.push_toast(title, body);
    }

    /// Announce a task reminder with the remaining-time label.
    pub fn remind(&mut self, task_title: &str, time_left: &str) {
        self.post_native(
            &format!("Напоминание: {}", task_title),
            &format!("Задача должна быть выполнена {}", time_left),
        );
        self.push_toast(
            "🔔 Напоминание",
            &format!("{} - {}", task_title, time_left),
        );
    }

    /// Most recent toasts, newest first.
    pub fn toasts(&self) -> impl Iterator<Item = &Toast> {
        self.toasts.iter()
    }

    fn post_native(&self, title: &str, body: &str) {
        if self.permission != Permission::Granted {
            return;
        }
        if let Err(e) = notify_rust::Notification::new()
            .summary(title)
            .body(body)
            .appname("petal")
            .show()
        {
            log::warn!("Failed to post desktop notification: {}", e);
        }
    }

    fn push_toast(&mut self, title: &str, body: &str) {
        self.toasts.push_front(Toast {
            title: title.to_string(),
            body: body.to_string(),
            posted_at: Local::now(),
        });
        self.toasts.truncate(self.cap);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_undecided() {
        let notifier = Notifier::new(8);
        assert_eq!(notifier.permission(), Permission::Default);
    }

    #[test]
    fn toast_always_lands_even_without_permission() {
        let mut notifier = Notifier::new(8);
        notifier.permission = Permission::Denied;
        notifier.remind("Yoga", "5 минут");

        let toasts: Vec<&Toast> = notifier.toasts().collect();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].title, "🔔 Напоминание");
        assert_eq!(toasts[0].body, "Yoga - 5 минут");
    }

    #[test]
    fn feed_is_newest_first_and_bounded() {
        let mut notifier = Notifier::new(2);
        notifier.permission = Permission::Denied;
        notifier.notify("one", "");
        notifier.notify("two", "");
        notifier.notify("three", "");

        let titles: Vec<&str> = notifier.toasts().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["three", "two"]);
    }
}
