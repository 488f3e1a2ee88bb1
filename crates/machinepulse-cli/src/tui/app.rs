//! TUI application state and event loop.
//!
//! Design: one [`DemoSession`] owned by the app, polled from the same loop that
//! reads the keyboard. Ticks run inline on the UI thread; each one finishes
//! before the next key or frame is handled. Quitting stops the session so no
//! tick can land after teardown.

use std::collections::VecDeque;
use std::io;
use std::time::{Duration, Instant};

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;

use machinepulse_core::{
    AlarmEmitter, DemoSession, MachineReading, Phase, RandomNoise, SimulationConfig, TickReport,
    sound_alarm,
};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Event log lines retained.
const MAX_EVENTS: usize = 50;

/// Keyboard poll interval; also bounds timer latency.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// How long the alarm banner stays lit after the last alarm tick.
const ALARM_FLASH: Duration = Duration::from_millis(600);

const MIN_PERIOD_SECS: f64 = 0.1;
const MAX_PERIOD_SECS: f64 = 10.0;

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

pub struct App {
    session: DemoSession<RandomNoise>,
    alarm: Box<dyn AlarmEmitter>,
    running: bool,
    paused: bool,
    autostart: bool,
    cursor: usize,
    /// Most recent line last.
    events: VecDeque<String>,
    last_alarm: Option<Instant>,
    alarm_failures: u64,
    /// Set after a failed alarm; a caught emitter panic has already run the
    /// panic hook, which left the alternate screen.
    reclaim_terminal: bool,
}

impl App {
    pub fn new(
        config: SimulationConfig,
        noise: RandomNoise,
        alarm: Box<dyn AlarmEmitter>,
        autostart: bool,
    ) -> Self {
        let session = DemoSession::new(config, noise);
        let cursor = session
            .script()
            .designated_id
            .as_deref()
            .and_then(|id| session.roster().iter().position(|m| m.id == id))
            .unwrap_or(0);

        Self {
            session,
            alarm,
            running: true,
            paused: false,
            autostart,
            cursor,
            events: VecDeque::new(),
            last_alarm: None,
            alarm_failures: 0,
            reclaim_terminal: false,
        }
    }

    pub fn run(&mut self) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        // Install panic hook that restores terminal before printing the panic.
        let original_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen, crossterm::cursor::Show);
            original_hook(info);
        }));

        let result = self.run_loop(&mut terminal);

        // Always restore terminal, even if the loop returned an error.
        let _ = std::panic::take_hook();
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            crossterm::cursor::Show
        )?;

        self.session.stop();
        if self.session.elapsed_ticks() > 0 {
            println!(
                "Demo ran {} ticks, {} alarm(s)",
                self.session.elapsed_ticks(),
                self.session.alarms_raised()
            );
        }

        result
    }

    fn run_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> io::Result<()> {
        if self.autostart {
            self.start_demo(Instant::now());
        }

        while self.running {
            terminal.draw(|f| super::ui::draw(f, self))?;

            if event::poll(POLL_INTERVAL)?
                && let Event::Key(key) = event::read()?
                && key.kind == KeyEventKind::Press
            {
                self.handle_key(key.code, Instant::now());
            }

            self.poll_session(Instant::now());

            if std::mem::take(&mut self.reclaim_terminal) {
                enable_raw_mode()?;
                execute!(terminal.backend_mut(), EnterAlternateScreen)?;
                terminal.clear()?;
            }
        }

        Ok(())
    }

    /// Run a tick if one is due and the dashboard isn't paused.
    fn poll_session(&mut self, now: Instant) -> Option<TickReport> {
        if self.paused {
            return None;
        }
        let report = self.session.poll(now)?;
        self.on_tick(&report, now);
        Some(report)
    }

    fn on_tick(&mut self, report: &TickReport, now: Instant) {
        if let Some(phase) = report.entered {
            let id = self.designated_id().unwrap_or("?").to_string();
            self.push_event(format!(
                "tick {}: {id} entered {phase} phase ({})",
                report.tick,
                phase.status()
            ));
        }
        if report.alarm {
            self.last_alarm = Some(now);
            if !sound_alarm(self.alarm.as_mut()) {
                self.alarm_failures += 1;
                self.reclaim_terminal = true;
            }
        }
    }

    fn start_demo(&mut self, now: Instant) {
        let restart = self.session.elapsed_ticks() > 0;
        self.session.start(now);
        self.paused = false;
        self.last_alarm = None;
        let label = if restart { "restarted" } else { "started" };
        let found = self.session.script().finds_designated(self.session.roster());
        let line = match self.designated_id() {
            Some(id) if found => format!("demo {label}: scripting {id}"),
            Some(id) => format!("demo {label}: {id} not on the floor, jitter only"),
            None => format!("demo {label}: unscripted"),
        };
        self.push_event(line);
    }

    fn stop_demo(&mut self) {
        if self.session.is_running() {
            self.session.stop();
            self.push_event(format!(
                "demo stopped after {} ticks",
                self.session.elapsed_ticks()
            ));
        }
    }

    fn push_event(&mut self, line: String) {
        self.events.push_back(line);
        if self.events.len() > MAX_EVENTS {
            self.events.pop_front();
        }
    }

    fn handle_key(&mut self, key: KeyCode, now: Instant) {
        match key {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.stop_demo();
                self.running = false;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.cursor = self.cursor.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.cursor < self.session.roster().len().saturating_sub(1) {
                    self.cursor += 1;
                }
            }
            KeyCode::Char('d') | KeyCode::Char(' ') | KeyCode::Enter => self.start_demo(now),
            KeyCode::Char('x') => self.stop_demo(),
            KeyCode::Char('p') => self.paused = !self.paused,
            KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Char(']') => {
                let secs = (self.session.period().as_secs_f64() / 2.0).max(MIN_PERIOD_SECS);
                self.session.set_period(Duration::from_secs_f64(secs));
            }
            KeyCode::Char('-') | KeyCode::Char('[') => {
                let secs = (self.session.period().as_secs_f64() * 2.0).min(MAX_PERIOD_SECS);
                self.session.set_period(Duration::from_secs_f64(secs));
            }
            _ => {}
        }
    }

    // --- Public accessors ---

    pub fn roster(&self) -> &[MachineReading] {
        self.session.roster()
    }
    pub fn cursor(&self) -> usize {
        self.cursor
    }
    pub fn focused(&self) -> Option<&MachineReading> {
        self.session.roster().get(self.cursor)
    }
    pub fn is_running(&self) -> bool {
        self.session.is_running()
    }
    pub fn is_paused(&self) -> bool {
        self.paused
    }
    pub fn elapsed_ticks(&self) -> u64 {
        self.session.elapsed_ticks()
    }
    pub fn phase(&self) -> Option<Phase> {
        self.session.phase()
    }
    pub fn period_secs(&self) -> f64 {
        self.session.period().as_secs_f64()
    }
    pub fn designated_id(&self) -> Option<&str> {
        self.session.script().designated_id.as_deref()
    }
    pub fn alarm_name(&self) -> &str {
        self.alarm.name()
    }
    pub fn alarm_failures(&self) -> u64 {
        self.alarm_failures
    }
    pub fn events(&self) -> &VecDeque<String> {
        &self.events
    }

    /// Whether the designated machine is in Failure.
    pub fn is_alarming(&self) -> bool {
        self.session.is_alarming()
    }

    /// Alarm banner blink state: lit shortly after each alarm tick.
    pub fn alarm_lit(&self, now: Instant) -> bool {
        self.last_alarm
            .is_some_and(|t| now.saturating_duration_since(t) < ALARM_FLASH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alarm::SilentAlarm;
    use machinepulse_core::{DESIGNATED_MACHINE_ID, MachineStatus};

    fn app() -> App {
        App::new(
            SimulationConfig::default(),
            RandomNoise::seeded(42),
            Box::new(SilentAlarm),
            false,
        )
    }

    /// Drive `n` ticks at one-second spacing starting from `start`.
    fn tick_n(app: &mut App, start: Instant, n: u64) -> Vec<TickReport> {
        (0..n)
            .filter_map(|i| app.poll_session(start + Duration::from_secs(i)))
            .collect()
    }

    #[test]
    fn cursor_starts_on_designated_machine() {
        let app = app();
        assert_eq!(app.focused().unwrap().id, DESIGNATED_MACHINE_ID);
    }

    #[test]
    fn idle_until_started() {
        let mut app = app();
        assert!(!app.is_running());
        assert!(app.poll_session(Instant::now()).is_none());
        assert_eq!(app.elapsed_ticks(), 0);
    }

    #[test]
    fn d_key_starts_demo() {
        let mut app = app();
        let now = Instant::now();
        app.handle_key(KeyCode::Char('d'), now);
        assert!(app.is_running());
        let reports = tick_n(&mut app, now, 10);
        assert_eq!(reports.len(), 10);
        assert_eq!(app.phase(), Some(Phase::Failure));
        assert_eq!(app.focused().unwrap().status, MachineStatus::Critical);
        assert!(app.is_alarming());
        assert!(app.alarm_lit(now + Duration::from_secs(9)));
        assert_eq!(app.alarm_failures(), 0);
    }

    #[test]
    fn phase_transitions_are_logged() {
        let mut app = app();
        let now = Instant::now();
        app.handle_key(KeyCode::Char(' '), now);
        tick_n(&mut app, now, 9);
        let log: Vec<&String> = app.events().iter().collect();
        assert!(log[0].contains("demo started"));
        assert!(log.iter().any(|l| l.contains("entered calm")));
        assert!(log.iter().any(|l| l.contains("entered climb")));
        assert!(log.iter().any(|l| l.contains("entered failure")));
    }

    #[test]
    fn x_key_stops_ticks() {
        let mut app = app();
        let now = Instant::now();
        app.handle_key(KeyCode::Char('d'), now);
        tick_n(&mut app, now, 3);
        app.handle_key(KeyCode::Char('x'), now);
        assert!(!app.is_running());
        assert!(app.poll_session(now + Duration::from_secs(60)).is_none());
        assert_eq!(app.elapsed_ticks(), 3);
    }

    #[test]
    fn pause_holds_ticks() {
        let mut app = app();
        let now = Instant::now();
        app.handle_key(KeyCode::Char('d'), now);
        app.handle_key(KeyCode::Char('p'), now);
        assert!(app.poll_session(now).is_none());
        app.handle_key(KeyCode::Char('p'), now);
        assert!(app.poll_session(now).is_some());
    }

    #[test]
    fn quit_stops_session() {
        let mut app = app();
        let now = Instant::now();
        app.handle_key(KeyCode::Char('d'), now);
        app.handle_key(KeyCode::Char('q'), now);
        assert!(!app.running);
        assert!(!app.is_running());
    }

    #[test]
    fn restart_resets_demo() {
        let mut app = app();
        let now = Instant::now();
        app.handle_key(KeyCode::Char('d'), now);
        tick_n(&mut app, now, 10);
        app.handle_key(KeyCode::Char('d'), now);
        assert_eq!(app.elapsed_ticks(), 0);
        assert_eq!(app.phase(), None);
        assert!(!app.alarm_lit(now));
        assert!(app.events().back().unwrap().contains("restarted"));
    }

    #[test]
    fn cursor_is_bounded() {
        let mut app = app();
        let now = Instant::now();
        for _ in 0..10 {
            app.handle_key(KeyCode::Down, now);
        }
        assert_eq!(app.cursor(), app.roster().len() - 1);
        for _ in 0..10 {
            app.handle_key(KeyCode::Char('k'), now);
        }
        assert_eq!(app.cursor(), 0);
    }

    #[test]
    fn period_keys_are_clamped() {
        let mut app = app();
        let now = Instant::now();
        for _ in 0..10 {
            app.handle_key(KeyCode::Char('+'), now);
        }
        assert!((app.period_secs() - MIN_PERIOD_SECS).abs() < 1e-9);
        for _ in 0..10 {
            app.handle_key(KeyCode::Char('-'), now);
        }
        assert!((app.period_secs() - MAX_PERIOD_SECS).abs() < 1e-9);
    }

    #[test]
    fn missing_designated_is_reported() {
        let config = SimulationConfig {
            designated_id: Some("MP-999".into()),
            ..Default::default()
        };
        let mut app = App::new(config, RandomNoise::seeded(1), Box::new(SilentAlarm), false);
        assert_eq!(app.cursor(), 0);
        app.handle_key(KeyCode::Char('d'), Instant::now());
        assert!(app.events()[0].contains("not on the floor"));
    }

    struct PanickingAlarm;

    impl AlarmEmitter for PanickingAlarm {
        fn name(&self) -> &str {
            "panicking"
        }
        fn trigger(&mut self) -> io::Result<()> {
            panic!("speaker unplugged");
        }
    }

    #[test]
    fn failed_alarm_reclaims_terminal_and_keeps_ticking() {
        let mut app = App::new(
            SimulationConfig::default(),
            RandomNoise::seeded(8),
            Box::new(PanickingAlarm),
            false,
        );
        let now = Instant::now();
        app.handle_key(KeyCode::Char('d'), now);
        tick_n(&mut app, now, 9);
        assert_eq!(app.alarm_failures(), 1);
        assert!(app.reclaim_terminal);

        app.reclaim_terminal = false;
        assert!(app.poll_session(now + Duration::from_secs(9)).is_some());
        assert_eq!(app.alarm_failures(), 2);
        assert!(app.reclaim_terminal);
        assert!(app.is_running());
    }

    #[test]
    fn clean_alarm_leaves_terminal_alone() {
        let mut app = app();
        let now = Instant::now();
        app.handle_key(KeyCode::Char('d'), now);
        tick_n(&mut app, now, 10);
        assert!(app.is_alarming());
        assert!(!app.reclaim_terminal);
    }

    #[test]
    fn event_log_is_bounded() {
        let mut app = app();
        for i in 0..(MAX_EVENTS + 20) {
            app.push_event(format!("line {i}"));
        }
        assert_eq!(app.events().len(), MAX_EVENTS);
        assert_eq!(app.events().back().unwrap(), &format!("line {}", MAX_EVENTS + 19));
    }
}
