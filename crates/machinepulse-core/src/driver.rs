//! Simulation driver: one tick of the demo.
//!
//! [`advance`] is a pure transform from one roster snapshot to the next. The
//! only impurity is the injected [`NoiseSource`].
//!
//! The designated machine follows a three-phase script keyed on the tick
//! counter:
//!
//! ```text
//!   tick:   0 .. climb_at      climb_at .. failure_at     failure_at ..
//!           ┌───────────┐      ┌───────────┐              ┌────────────┐
//!           │   Calm    │ ───► │   Climb   │ ───────────► │  Failure   │ ──┐
//!           │ 15..=19   │      │ prev + 15 │              │  95..=99   │ ◄─┘
//!           │ Running   │      │ Warning   │              │  Critical  │
//!           └───────────┘      └───────────┘              └────────────┘
//! ```
//!
//! Every other machine takes a bounded random walk. While the designated
//! machine is in Failure the outcome carries an alarm signal; the caller
//! decides what to do with it.

use serde::Serialize;

use crate::config::{Band, SimulationConfig};
use crate::history::HistoryWindow;
use crate::machine::{MachineReading, MachineStatus, VIBRATION_MAX};
use crate::noise::NoiseSource;

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// Stage of the designated machine's trajectory. Ordered: phases only move
/// forward as the tick counter grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Phase {
    Calm,
    Climb,
    Failure,
}

impl Phase {
    /// Status the designated machine reports in this phase.
    pub fn status(self) -> MachineStatus {
        match self {
            Self::Calm => MachineStatus::Running,
            Self::Climb => MachineStatus::Warning,
            Self::Failure => MachineStatus::Critical,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Calm => "calm",
            Self::Climb => "climb",
            Self::Failure => "failure",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// DemoScript
// ---------------------------------------------------------------------------

/// Parameters of one tick: who is scripted, the phase thresholds and the
/// numeric bands each phase draws from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoScript {
    pub designated_id: Option<String>,
    pub jitter: u8,
    pub background_max: u8,
    pub calm_band: Band,
    pub climb_step: u8,
    pub failure_band: Band,
    pub climb_at: u64,
    pub failure_at: u64,
    pub window: HistoryWindow,
}

impl Default for DemoScript {
    fn default() -> Self {
        SimulationConfig::default().script()
    }
}

impl DemoScript {
    /// Phase for a given tick count.
    pub fn phase_at(&self, elapsed_ticks: u64) -> Phase {
        if elapsed_ticks < self.climb_at {
            Phase::Calm
        } else if elapsed_ticks < self.failure_at {
            Phase::Climb
        } else {
            Phase::Failure
        }
    }

    pub fn is_designated(&self, id: &str) -> bool {
        self.designated_id.as_deref() == Some(id)
    }

    /// Whether the designated machine is present in `roster`.
    pub fn finds_designated(&self, roster: &[MachineReading]) -> bool {
        roster.iter().any(|m| self.is_designated(&m.id))
    }

    /// Ceiling applied to a machine's vibration after an update.
    pub fn ceiling_for(&self, id: &str) -> u8 {
        if self.is_designated(id) {
            VIBRATION_MAX
        } else {
            self.background_max.min(VIBRATION_MAX)
        }
    }

    fn scripted_vibration(&self, phase: Phase, previous: u8, noise: &mut impl NoiseSource) -> i32 {
        match phase {
            Phase::Calm => draw_band(noise, self.calm_band),
            Phase::Climb => previous as i32 + self.climb_step as i32,
            Phase::Failure => draw_band(noise, self.failure_band),
        }
    }

    fn jittered_vibration(&self, previous: u8, noise: &mut impl NoiseSource) -> i32 {
        let j = self.jitter as i32;
        previous as i32 + noise.draw(-j..=j)
    }
}

fn draw_band(noise: &mut impl NoiseSource, band: Band) -> i32 {
    noise.draw(band.low as i32..=band.high as i32)
}

fn clamp_to(value: i32, ceiling: u8) -> u8 {
    value.clamp(0, ceiling as i32) as u8
}

// ---------------------------------------------------------------------------
// advance
// ---------------------------------------------------------------------------

/// Result of one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickOutcome {
    /// Next roster snapshot, same machines in the same order.
    pub roster: Vec<MachineReading>,
    /// Designated machine's phase, `None` when unscripted or the id is absent.
    pub phase: Option<Phase>,
    /// Raised on every tick the designated machine spends in Failure.
    pub alarm: bool,
    /// Histories that had the wrong length and were reinitialized.
    pub history_resets: usize,
}

/// Produce the next roster from the current one.
///
/// Never fails: values are clamped rather than rejected, and a designated id
/// missing from the roster simply leaves every machine on background jitter.
pub fn advance(
    roster: &[MachineReading],
    elapsed_ticks: u64,
    noise: &mut impl NoiseSource,
    script: &DemoScript,
) -> TickOutcome {
    let phase = script.phase_at(elapsed_ticks);
    let mut scripted = false;
    let mut history_resets = 0;

    let next: Vec<MachineReading> = roster
        .iter()
        .map(|m| {
            let (status, raw) = if script.is_designated(&m.id) {
                scripted = true;
                (phase.status(), script.scripted_vibration(phase, m.vibration, noise))
            } else {
                (m.status, script.jittered_vibration(m.vibration, noise))
            };
            let vibration = clamp_to(raw, script.ceiling_for(&m.id));
            let (history, reset) = script.window.push(&m.history, m.vibration, vibration);
            if reset {
                history_resets += 1;
            }
            m.with_reading(status, vibration, history)
        })
        .collect();

    let phase = scripted.then_some(phase);
    let alarm = phase == Some(Phase::Failure);
    log::debug!(
        "tick {elapsed_ticks}: phase={} alarm={alarm}",
        phase.map_or("unscripted", Phase::label)
    );

    TickOutcome {
        roster: next,
        phase,
        alarm,
        history_resets,
    }
}
