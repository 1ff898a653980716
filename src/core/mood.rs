use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Calm,
    Energetic,
    Sad,
    Anxious,
}

impl Mood {
    pub const ALL: [Mood; 5] = [
        Mood::Happy,
        Mood::Calm,
        Mood::Energetic,
        Mood::Sad,
        Mood::Anxious,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Happy => "happy",
            Self::Calm => "calm",
            Self::Energetic => "energetic",
            Self::Sad => "sad",
            Self::Anxious => "anxious",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "happy" => Some(Self::Happy),
            "calm" => Some(Self::Calm),
            "energetic" => Some(Self::Energetic),
            "sad" => Some(Self::Sad),
            "anxious" => Some(Self::Anxious),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Happy => "Happy",
            Self::Calm => "Calm",
            Self::Energetic => "Energetic",
            Self::Sad => "Sad",
            Self::Anxious => "Anxious",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Happy => "\u{1F60A}",
            Self::Calm => "\u{1F60C}",
            Self::Energetic => "\u{26A1}",
            Self::Sad => "\u{1F622}",
            Self::Anxious => "\u{1F630}",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoodEntry {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub mood: Mood,
    pub note: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl MoodEntry {
    pub fn new(owner_id: Uuid, mood: Mood, note: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            mood,
            note: note.filter(|n| !n.trim().is_empty()),
            recorded_at: Utc::now(),
        }
    }
}

/// Aggregates over the most recent entries.
#[derive(Debug, Clone)]
pub struct MoodStats {
    counts: Vec<(Mood, usize)>,
    pub dominant: Option<Mood>,
    pub total: usize,
}

impl MoodStats {
    /// Build stats over the `window` most recent of `entries`.
    ///
    /// `entries` must be ordered newest first, which is how the store
    /// returns them. Ties for the dominant mood go to the mood seen most
    /// recently among the tied contenders.
    pub fn build(entries: &[MoodEntry], window: usize) -> Self {
        let recent = &entries[..entries.len().min(window)];

        let mut counts: Vec<(Mood, usize)> = Mood::ALL.iter().map(|m| (*m, 0)).collect();
        for entry in recent {
            if let Some(slot) = counts.iter_mut().find(|(m, _)| *m == entry.mood) {
                slot.1 += 1;
            }
        }

        let top = counts.iter().map(|(_, n)| *n).max().unwrap_or(0);
        let dominant = if top == 0 {
            None
        } else {
            // Newest-first order makes the first tied mood the most recent one.
            recent
                .iter()
                .map(|e| e.mood)
                .find(|m| counts.iter().any(|(cm, n)| cm == m && *n == top))
        };

        Self {
            counts,
            dominant,
            total: recent.len(),
        }
    }

    pub fn count(&self, mood: Mood) -> usize {
        self.counts
            .iter()
            .find(|(m, _)| *m == mood)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }

    /// Share of the window taken by `mood`, as a percentage.
    pub fn share(&self, mood: Mood) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.count(mood) as f64 / self.total as f64 * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn entries(moods: &[Mood]) -> Vec<MoodEntry> {
        // Index 0 is the newest entry.
        let owner = Uuid::new_v4();
        let now = Utc::now();
        moods
            .iter()
            .enumerate()
            .map(|(i, m)| {
                let mut e = MoodEntry::new(owner, *m, None);
                e.recorded_at = now - Duration::hours(i as i64);
                e
            })
            .collect()
    }

    #[test]
    fn counts_recent_window_only() {
        let es = entries(&[
            Mood::Happy,
            Mood::Happy,
            Mood::Calm,
            Mood::Sad,
            Mood::Sad,
            Mood::Sad,
            Mood::Sad,
            Mood::Anxious,
        ]);
        let stats = MoodStats::build(&es, 7);
        assert_eq!(stats.total, 7);
        assert_eq!(stats.count(Mood::Sad), 4);
        assert_eq!(stats.count(Mood::Anxious), 0);
    }

    #[test]
    fn dominant_is_most_frequent() {
        let es = entries(&[Mood::Calm, Mood::Happy, Mood::Calm]);
        let stats = MoodStats::build(&es, 7);
        assert_eq!(stats.dominant, Some(Mood::Calm));
    }

    #[test]
    fn dominant_tie_goes_to_most_recent() {
        let es = entries(&[Mood::Energetic, Mood::Happy, Mood::Happy, Mood::Energetic]);
        let stats = MoodStats::build(&es, 7);
        assert_eq!(stats.dominant, Some(Mood::Energetic));
    }

    #[test]
    fn no_entries_no_dominant() {
        let stats = MoodStats::build(&[], 7);
        assert_eq!(stats.dominant, None);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.share(Mood::Happy), 0.0);
    }

    #[test]
    fn blank_note_is_dropped() {
        let e = MoodEntry::new(Uuid::new_v4(), Mood::Happy, Some("   ".to_string()));
        assert_eq!(e.note, None);
    }
}
