//! # machinepulse-core
//!
//! **A factory floor that fails on cue.**
//!
//! `machinepulse-core` simulates a small roster of machines for a monitoring
//! dashboard demo. Background machines jitter around their readings while one
//! designated machine is walked through a scripted failure: calm, climbing,
//! then critical with an alarm on every tick.
//!
//! ## Quick Start
//!
//! ```
//! use std::time::Instant;
//! use machinepulse_core::{DemoSession, RandomNoise, SimulationConfig};
//!
//! let mut session = DemoSession::new(SimulationConfig::default(), RandomNoise::seeded(7));
//! session.start(Instant::now());
//!
//! for _ in 0..10 {
//!     let report = session.tick().unwrap();
//!     if report.alarm {
//!         println!("tick {}: predictive failure detected", report.tick);
//!     }
//! }
//! assert_eq!(session.alarms_raised(), 2);
//! ```
//!
//! ## Architecture
//!
//! Timer → Session → Driver (+ history window) → new roster snapshot
//!
//! - [`advance`] is a pure transform over a roster snapshot; randomness comes
//!   in through the [`NoiseSource`] trait.
//! - [`DemoSession`] owns the roster, the tick counter and the [`Ticker`].
//! - The alarm is a flag on the [`TickReport`]; the caller fires an
//!   [`AlarmEmitter`] through [`sound_alarm`], which isolates failures.

pub mod alarm;
pub mod config;
pub mod driver;
pub mod history;
pub mod machine;
pub mod noise;
pub mod session;

pub use alarm::{AlarmEmitter, sound_alarm};
pub use config::{Band, SCRIPTED_BACKGROUND_MAX, SimulationConfig, load_config_from_path};
pub use driver::{DemoScript, Phase, TickOutcome, advance};
pub use history::{HistoryWindow, push_reading};
pub use machine::{
    DESIGNATED_MACHINE_ID, MachineReading, MachineStatus, SEED_HISTORY_LEN, VIBRATION_MAX,
    seed_roster,
};
pub use noise::{NoiseSource, RandomNoise};
pub use session::{DemoSession, TickReport, Ticker};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
