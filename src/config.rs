use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::core::cycle::PhaseMarker;

fn default_scan_interval() -> u64 {
    60
}

fn default_refresh_ticks() -> u32 {
    5
}

fn default_toast_cap() -> usize {
    32
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Config {
    /// Base URL of the hosted data service.
    #[serde(default)]
    pub service_url: String,
    /// Public (anon) key of the hosted data service.
    #[serde(default)]
    pub service_key: String,
    /// Reminder scan period in seconds.
    #[serde(default = "default_scan_interval")]
    pub scan_interval_secs: u64,
    /// Task refetch cadence for the watch loop, in scan ticks.
    #[serde(default = "default_refresh_ticks")]
    pub refresh_every_ticks: u32,
    /// Upper bound on the in-app toast feed.
    #[serde(default = "default_toast_cap")]
    pub toast_cap: usize,
    #[serde(default)]
    pub debug_logging: bool,
    /// Cycle-phase day annotations shown on the calendar. Maintained by
    /// the user or an external tracker; never computed by petal.
    #[serde(default)]
    pub cycle_markers: Vec<PhaseMarker>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_url: String::new(),
            service_key: String::new(),
            scan_interval_secs: default_scan_interval(),
            refresh_every_ticks: default_refresh_ticks(),
            toast_cap: default_toast_cap(),
            debug_logging: false,
            cycle_markers: Vec::new(),
        }
    }
}

impl Config {
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("petal")
    }

    pub fn path() -> PathBuf {
        Self::config_dir().join("config.json")
    }

    /// Load the config, falling back to defaults for a missing or
    /// unreadable file. An invalid file is reported, not fatal.
    pub fn load() -> Self {
        match std::fs::read_to_string(Self::path()) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(config) => config,
                Err(e) => {
                    log::warn!("Invalid config at {}: {}", Self::path().display(), e);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(Self::config_dir())?;
        let text = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(Self::path(), text)
    }

    /// Write the file on first run so the user has something to edit.
    pub fn ensure(&self) -> std::io::Result<()> {
        if !Self::path().exists() {
            self.save()?;
        }
        Ok(())
    }

    pub fn is_configured(&self) -> bool {
        !self.service_url.trim().is_empty() && !self.service_key.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let config: Config = serde_json::from_str(r#"{ "service_url": "https://db.example" }"#)
            .unwrap();
        assert_eq!(config.service_url, "https://db.example");
        assert_eq!(config.scan_interval_secs, 60);
        assert_eq!(config.refresh_every_ticks, 5);
        assert!(config.cycle_markers.is_empty());
        assert!(!config.is_configured());
    }

    #[test]
    fn round_trips_markers() {
        let mut config = Config::default();
        config.cycle_markers = vec![PhaseMarker {
            date: chrono::NaiveDate::from_ymd_opt(2026, 3, 12).unwrap(),
            phase: crate::core::cycle::CyclePhase::Fertile,
        }];
        let text = serde_json::to_string(&config).unwrap();
        let back: Config = serde_json::from_str(&text).unwrap();
        assert_eq!(back, config);
    }
}
