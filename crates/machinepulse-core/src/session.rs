//! Demo session: the roster, the tick counter and the timer that drives them.
//!
//! A [`DemoSession`] owns everything a running demo needs. Nothing is global:
//! the dashboard and the headless runner each hold their own session and poll
//! it from their event loop.
//!
//! # Timer
//!
//! [`Ticker`] is a poll-driven recurring deadline. Arming it makes the first
//! tick due immediately; after that ticks fall due once per period. A poll
//! fires at most one tick, so a stalled loop never replays a backlog.
//! Cancelling clears the deadline: no tick can run after [`DemoSession::stop`].
//!
//! Ticks are serialized by construction: every mutation goes through
//! `&mut self`, so two ticks can never overlap.

use std::time::{Duration, Instant};

use serde::Serialize;

use crate::config::SimulationConfig;
use crate::driver::{DemoScript, Phase, advance};
use crate::machine::{MachineReading, seed_roster};
use crate::noise::{NoiseSource, RandomNoise};

// ---------------------------------------------------------------------------
// Ticker
// ---------------------------------------------------------------------------

/// Recurring deadline polled from an event loop.
#[derive(Debug, Clone)]
pub struct Ticker {
    period: Duration,
    next_due: Option<Instant>,
}

impl Ticker {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            next_due: None,
        }
    }

    /// Arm the timer; the first tick is due at `now`.
    pub fn arm(&mut self, now: Instant) {
        self.next_due = Some(now);
    }

    pub fn cancel(&mut self) {
        self.next_due = None;
    }

    pub fn is_armed(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Change the period. Takes effect from the next scheduled deadline.
    pub fn set_period(&mut self, period: Duration) {
        self.period = period;
    }

    /// Time left until the next tick, `None` when disarmed.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.next_due.map(|due| due.saturating_duration_since(now))
    }

    /// Returns true when a tick is due, and schedules the following one.
    pub fn poll(&mut self, now: Instant) -> bool {
        let Some(due) = self.next_due else {
            return false;
        };
        if now < due {
            return false;
        }
        let mut next = due + self.period;
        if next <= now {
            next = now + self.period;
        }
        self.next_due = Some(next);
        true
    }
}

// ---------------------------------------------------------------------------
// TickReport
// ---------------------------------------------------------------------------

/// What happened on one tick, for the caller to act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TickReport {
    /// Tick counter value the tick ran with (0 for the first tick).
    pub tick: u64,
    pub phase: Option<Phase>,
    /// Caller should fire the alarm emitter.
    pub alarm: bool,
    /// Set when this tick moved the designated machine into a new phase.
    pub entered: Option<Phase>,
}

// ---------------------------------------------------------------------------
// DemoSession
// ---------------------------------------------------------------------------

pub struct DemoSession<N = RandomNoise> {
    config: SimulationConfig,
    script: DemoScript,
    initial: Vec<MachineReading>,
    roster: Vec<MachineReading>,
    elapsed_ticks: u64,
    phase: Option<Phase>,
    ticker: Ticker,
    alarms_raised: u64,
    noise: N,
}

impl<N: NoiseSource> DemoSession<N> {
    /// Session over the seed roster.
    pub fn new(config: SimulationConfig, noise: N) -> Self {
        Self::with_roster(config, noise, seed_roster())
    }

    /// Session over a custom starting roster.
    pub fn with_roster(config: SimulationConfig, noise: N, roster: Vec<MachineReading>) -> Self {
        let script = config.script();
        let ticker = Ticker::new(config.tick_period());
        Self {
            config,
            script,
            initial: roster.clone(),
            roster,
            elapsed_ticks: 0,
            phase: None,
            ticker,
            alarms_raised: 0,
            noise,
        }
    }

    /// Start (or restart) the demo.
    ///
    /// The roster goes back to its starting snapshot and the tick counter to
    /// zero, then the timer is armed. The first tick overwrites whatever state
    /// the designated machine was seeded with.
    pub fn start(&mut self, now: Instant) {
        self.roster = self.initial.clone();
        self.elapsed_ticks = 0;
        self.phase = None;
        self.alarms_raised = 0;
        self.ticker.arm(now);

        match self.script.designated_id.as_deref() {
            Some(id) if !self.script.finds_designated(&self.roster) => {
                log::warn!("designated machine {id} not in roster; running jitter only");
            }
            Some(id) => log::info!("demo started, scripting {id}"),
            None => log::info!("demo started unscripted"),
        }
    }

    /// Cancel the timer. The roster is left as the last tick produced it.
    pub fn stop(&mut self) {
        if self.ticker.is_armed() {
            log::info!("demo stopped after {} ticks", self.elapsed_ticks);
        }
        self.ticker.cancel();
    }

    pub fn is_running(&self) -> bool {
        self.ticker.is_armed()
    }

    /// Run a tick if the timer says one is due.
    pub fn poll(&mut self, now: Instant) -> Option<TickReport> {
        if self.ticker.poll(now) {
            self.tick()
        } else {
            None
        }
    }

    /// Run one tick immediately. Does nothing while stopped.
    pub fn tick(&mut self) -> Option<TickReport> {
        if !self.ticker.is_armed() {
            return None;
        }

        let tick = self.elapsed_ticks;
        let outcome = advance(&self.roster, tick, &mut self.noise, &self.script);

        if outcome.history_resets > 0 {
            log::warn!(
                "tick {tick}: reinitialized {} history window(s) to length {}",
                outcome.history_resets,
                self.script.window.len()
            );
        }

        let entered = match outcome.phase {
            Some(p) if self.phase != Some(p) => {
                log::info!("tick {tick}: designated machine entered {p} phase");
                Some(p)
            }
            _ => None,
        };
        if outcome.alarm {
            self.alarms_raised += 1;
        }

        self.roster = outcome.roster;
        self.phase = outcome.phase;
        self.elapsed_ticks += 1;

        Some(TickReport {
            tick,
            phase: outcome.phase,
            alarm: outcome.alarm,
            entered,
        })
    }

    // --- Accessors ---

    pub fn roster(&self) -> &[MachineReading] {
        &self.roster
    }

    pub fn elapsed_ticks(&self) -> u64 {
        self.elapsed_ticks
    }

    /// Designated machine's phase as of the last tick.
    pub fn phase(&self) -> Option<Phase> {
        self.phase
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn script(&self) -> &DemoScript {
        &self.script
    }

    pub fn alarms_raised(&self) -> u64 {
        self.alarms_raised
    }

    /// Whether the designated machine is currently in Failure.
    pub fn is_alarming(&self) -> bool {
        self.phase == Some(Phase::Failure)
    }

    pub fn period(&self) -> Duration {
        self.ticker.period()
    }

    pub fn set_period(&mut self, period: Duration) {
        self.ticker.set_period(period);
    }

    pub fn until_next_tick(&self, now: Instant) -> Option<Duration> {
        self.ticker.remaining(now)
    }
}
