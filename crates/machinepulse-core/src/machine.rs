//! Machine records and the seed roster.
//!
//! A [`MachineReading`] is one card on the dashboard: display metadata, a
//! status badge, the current vibration load and a fixed-length history window
//! feeding the chart. The simulation never adds or removes machines, and never
//! touches `id`, `name`, `location` or `temperature_c`.

use serde::{Deserialize, Serialize};

/// Id of the machine the demo script drives into failure.
pub const DESIGNATED_MACHINE_ID: &str = "MP-104";

/// Length of the history window in the seed data.
pub const SEED_HISTORY_LEN: usize = 10;

/// Upper bound of the vibration domain (percent).
pub const VIBRATION_MAX: u8 = 100;

// ---------------------------------------------------------------------------
// MachineStatus
// ---------------------------------------------------------------------------

/// Operating status shown on a machine's badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MachineStatus {
    #[default]
    Running,
    Warning,
    Critical,
    Offline,
}

impl MachineStatus {
    /// Badge text.
    pub fn label(self) -> &'static str {
        match self {
            Self::Running => "RUNNING",
            Self::Warning => "WARNING",
            Self::Critical => "CRITICAL",
            Self::Offline => "OFFLINE",
        }
    }

    /// Hex color the chart line is drawn in.
    pub fn chart_color(self) -> &'static str {
        match self {
            Self::Critical => "#ef4444",
            _ => "#10b981",
        }
    }

    pub fn is_critical(self) -> bool {
        self == Self::Critical
    }
}

impl std::fmt::Display for MachineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Running => write!(f, "Running"),
            Self::Warning => write!(f, "Warning"),
            Self::Critical => write!(f, "Critical"),
            Self::Offline => write!(f, "Offline"),
        }
    }
}

// ---------------------------------------------------------------------------
// MachineReading
// ---------------------------------------------------------------------------

/// One row of simulated telemetry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineReading {
    pub id: String,
    pub name: String,
    pub location: String,
    pub status: MachineStatus,
    /// Vibration load in percent, always within `0..=100`.
    pub vibration: u8,
    /// Static in the simulation.
    pub temperature_c: i16,
    /// Most recent reading last.
    pub history: Vec<u8>,
}

impl MachineReading {
    pub fn new(
        id: &str,
        name: &str,
        location: &str,
        status: MachineStatus,
        vibration: u8,
        temperature_c: i16,
        history: &[u8],
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            location: location.to_string(),
            status,
            vibration: vibration.min(VIBRATION_MAX),
            temperature_c,
            history: history.to_vec(),
        }
    }

    /// Same machine with a new reading; metadata is carried over untouched.
    pub fn with_reading(&self, status: MachineStatus, vibration: u8, history: Vec<u8>) -> Self {
        Self {
            status,
            vibration,
            history,
            ..self.clone()
        }
    }
}

/// The fixed dataset every session starts from.
pub fn seed_roster() -> Vec<MachineReading> {
    vec![
        MachineReading::new(
            "MP-101",
            "CNC Lathe (Main)",
            "Zone A",
            MachineStatus::Running,
            12,
            45,
            &[10, 12, 11, 13, 12, 11, 12, 12, 13, 12],
        ),
        MachineReading::new(
            "MP-102",
            "Hydraulic Press #3",
            "Zone B",
            MachineStatus::Running,
            24,
            52,
            &[22, 24, 23, 25, 24, 23, 24, 25, 24, 24],
        ),
        MachineReading::new(
            DESIGNATED_MACHINE_ID,
            "Bearing Assembly Arm",
            "Zone C",
            MachineStatus::Critical,
            88,
            82,
            &[45, 50, 62, 70, 75, 82, 85, 88, 89, 92],
        ),
        MachineReading::new(
            "MP-105",
            "Conveyor Motor 2",
            "Zone A",
            MachineStatus::Warning,
            65,
            60,
            &[50, 52, 55, 58, 60, 62, 64, 63, 65, 66],
        ),
    ]
}

/// Find a machine by id.
pub fn find<'a>(roster: &'a [MachineReading], id: &str) -> Option<&'a MachineReading> {
    roster.iter().find(|m| m.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn seed_roster_has_four_machines() {
        let roster = seed_roster();
        assert_eq!(roster.len(), 4);
    }

    #[test]
    fn seed_ids_are_unique() {
        let roster = seed_roster();
        let ids: HashSet<&str> = roster.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids.len(), roster.len());
    }

    #[test]
    fn seed_histories_share_window_length() {
        for m in seed_roster() {
            assert_eq!(m.history.len(), SEED_HISTORY_LEN, "{}", m.id);
        }
    }

    #[test]
    fn designated_machine_is_seeded_critical() {
        let roster = seed_roster();
        let arm = find(&roster, DESIGNATED_MACHINE_ID).unwrap();
        assert_eq!(arm.status, MachineStatus::Critical);
        assert_eq!(arm.vibration, 88);
        assert_eq!(arm.temperature_c, 82);
    }

    #[test]
    fn new_clamps_vibration() {
        let m = MachineReading::new("X", "x", "z", MachineStatus::Running, 250, 20, &[]);
        assert_eq!(m.vibration, VIBRATION_MAX);
    }

    #[test]
    fn with_reading_keeps_metadata() {
        let roster = seed_roster();
        let next = roster[0].with_reading(MachineStatus::Warning, 50, vec![1, 2, 3]);
        assert_eq!(next.id, roster[0].id);
        assert_eq!(next.name, roster[0].name);
        assert_eq!(next.location, roster[0].location);
        assert_eq!(next.temperature_c, roster[0].temperature_c);
        assert_eq!(next.status, MachineStatus::Warning);
        assert_eq!(next.history, vec![1, 2, 3]);
    }

    #[test]
    fn chart_color_red_only_when_critical() {
        assert_eq!(MachineStatus::Critical.chart_color(), "#ef4444");
        assert_eq!(MachineStatus::Warning.chart_color(), "#10b981");
        assert_eq!(MachineStatus::Running.chart_color(), "#10b981");
        assert_eq!(MachineStatus::Offline.chart_color(), "#10b981");
    }

    #[test]
    fn status_labels() {
        assert_eq!(MachineStatus::Running.label(), "RUNNING");
        assert_eq!(MachineStatus::Critical.label(), "CRITICAL");
        assert_eq!(MachineStatus::Warning.to_string(), "Warning");
    }

    #[test]
    fn find_missing_is_none() {
        assert!(find(&seed_roster(), "MP-999").is_none());
    }
}
