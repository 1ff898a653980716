use std::fmt::Write;

use crate::core::mood::{Mood, MoodEntry, MoodStats};

use super::progress_bar;

const STATS_WINDOW: usize = 7;
const RECENT_SHOWN: usize = 5;

/// Mood journal page: recent-window stats plus the latest entries.
pub fn mood_view(entries: &[MoodEntry]) -> String {
    let mut out = String::new();

    let stats = MoodStats::build(entries, STATS_WINDOW);
    match stats.dominant {
        Some(mood) => {
            let _ = writeln!(
                out,
                "Dominant mood over the last {} entries: {} {}",
                stats.total,
                mood.emoji(),
                mood.label()
            );
        }
        None => {
            let _ = writeln!(out, "No mood entries yet. Record how you feel.");
            return out;
        }
    }
    let _ = writeln!(out);

    for mood in Mood::ALL {
        let _ = writeln!(
            out,
            "{} {:<10} {} {}",
            mood.emoji(),
            mood.label(),
            progress_bar(stats.share(mood), 10),
            stats.count(mood)
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Recent entries:");
    for entry in entries.iter().take(RECENT_SHOWN) {
        let stamp = entry
            .recorded_at
            .with_timezone(&chrono::Local)
            .format("%-d %b %H:%M");
        let _ = writeln!(out, "  {} {}  {}", entry.mood.emoji(), entry.mood.label(), stamp);
        if let Some(ref note) = entry.note {
            let _ = writeln!(out, "      {}", note);
        }
    }

    out
}
