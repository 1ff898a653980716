use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Reproductive-cycle phase for one calendar day. Supplied by the caller
/// (configuration or an external tracker), never computed here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CyclePhase {
    Period,
    Fertile,
    Ovulation,
}

impl CyclePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Period => "period",
            Self::Fertile => "fertile",
            Self::Ovulation => "ovulation",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "period" => Some(Self::Period),
            "fertile" => Some(Self::Fertile),
            "ovulation" => Some(Self::Ovulation),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Period => "Period",
            Self::Fertile => "Fertile window",
            Self::Ovulation => "Ovulation",
        }
    }

    /// Single-character marker used in the calendar grid.
    pub fn glyph(&self) -> char {
        match self {
            Self::Period => 'P',
            Self::Fertile => 'F',
            Self::Ovulation => 'O',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseMarker {
    pub date: NaiveDate,
    pub phase: CyclePhase,
}

pub fn marker_for(markers: &[PhaseMarker], day: NaiveDate) -> Option<CyclePhase> {
    markers.iter().find(|m| m.date == day).map(|m| m.phase)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_marker_by_day() {
        let day = NaiveDate::from_ymd_opt(2026, 3, 12).unwrap();
        let markers = vec![
            PhaseMarker {
                date: day,
                phase: CyclePhase::Period,
            },
            PhaseMarker {
                date: day.succ_opt().unwrap(),
                phase: CyclePhase::Period,
            },
        ];
        assert_eq!(marker_for(&markers, day), Some(CyclePhase::Period));
        assert_eq!(
            marker_for(&markers, NaiveDate::from_ymd_opt(2026, 3, 20).unwrap()),
            None
        );
    }

    #[test]
    fn phase_round_trip() {
        for phase in [CyclePhase::Period, CyclePhase::Fertile, CyclePhase::Ovulation] {
            assert_eq!(CyclePhase::parse(phase.as_str()), Some(phase));
        }
    }
}
