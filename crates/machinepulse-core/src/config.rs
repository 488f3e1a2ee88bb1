//! Simulation configuration.
//!
//! Every field has a default matching the stock demo, so a JSON config file
//! only needs the keys it overrides:
//!
//! ```json
//! { "tick_ms": 500, "background_max": 100 }
//! ```
//!
//! Precedence is defaults, then the file, then command-line flags.

use std::io;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::driver::DemoScript;
use crate::history::HistoryWindow;
use crate::machine::{DESIGNATED_MACHINE_ID, SEED_HISTORY_LEN, VIBRATION_MAX};

/// Inclusive integer band, e.g. the 15..=19 calm level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Band {
    pub low: u8,
    pub high: u8,
}

impl Band {
    pub const fn new(low: u8, high: u8) -> Self {
        Self { low, high }
    }
}

/// Background clamp ceiling while the demo script runs.
pub const SCRIPTED_BACKGROUND_MAX: u8 = 40;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Machine driven by the script. `None` jitters every machine.
    pub designated_id: Option<String>,
    /// Timer period in milliseconds.
    pub tick_ms: u64,
    /// History window length.
    pub history_len: usize,
    /// Background noise amplitude: draws come from `-jitter..=jitter`.
    pub jitter: u8,
    /// Clamp ceiling for non-designated machines.
    pub background_max: u8,
    pub calm_band: Band,
    pub climb_step: u8,
    pub failure_band: Band,
    /// First tick of the climb phase.
    pub climb_at: u64,
    /// First tick of the failure phase.
    pub failure_at: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            designated_id: Some(DESIGNATED_MACHINE_ID.to_string()),
            tick_ms: 1000,
            history_len: SEED_HISTORY_LEN,
            jitter: 2,
            background_max: SCRIPTED_BACKGROUND_MAX,
            calm_band: Band::new(15, 19),
            climb_step: 15,
            failure_band: Band::new(95, 99),
            climb_at: 4,
            failure_at: 8,
        }
    }
}

impl SimulationConfig {
    /// Plain jitter for every machine over the full `0..=100` range.
    pub fn unscripted() -> Self {
        Self::default().into_unscripted()
    }

    pub fn into_unscripted(mut self) -> Self {
        self.designated_id = None;
        self.background_max = VIBRATION_MAX;
        self
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    /// The phase schedule this config describes.
    pub fn script(&self) -> DemoScript {
        DemoScript {
            designated_id: self.designated_id.clone(),
            jitter: self.jitter,
            background_max: self.background_max,
            calm_band: self.calm_band,
            climb_step: self.climb_step,
            failure_band: self.failure_band,
            climb_at: self.climb_at,
            failure_at: self.failure_at,
            window: HistoryWindow::new(self.history_len),
        }
    }

    /// Reject settings the driver cannot honour.
    pub fn validate(&self) -> io::Result<()> {
        let invalid = |msg: String| io::Error::new(io::ErrorKind::InvalidInput, msg);

        if self.tick_ms == 0 {
            return Err(invalid("tick_ms must be greater than zero".into()));
        }
        if self.history_len == 0 {
            return Err(invalid("history_len must be greater than zero".into()));
        }
        if self.background_max > VIBRATION_MAX {
            return Err(invalid(format!(
                "background_max {} exceeds {VIBRATION_MAX}",
                self.background_max
            )));
        }
        for (name, band) in [("calm_band", self.calm_band), ("failure_band", self.failure_band)] {
            if band.low > band.high {
                return Err(invalid(format!(
                    "{name} is inverted ({} > {})",
                    band.low, band.high
                )));
            }
            if band.high > VIBRATION_MAX {
                return Err(invalid(format!("{name} exceeds {VIBRATION_MAX}")));
            }
        }
        if self.climb_at > self.failure_at {
            return Err(invalid(format!(
                "climb_at ({}) must not come after failure_at ({})",
                self.climb_at, self.failure_at
            )));
        }
        Ok(())
    }
}

/// Load a config from a JSON file. Missing keys keep their defaults.
pub fn load_config_from_path(path: &Path) -> io::Result<SimulationConfig> {
    let raw = std::fs::read_to_string(path)?;
    let config = serde_json::from_str::<SimulationConfig>(&raw).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("failed to parse config JSON: {e}"),
        )
    })?;
    config.validate()?;
    Ok(config)
}
