//! Concrete alarm emitters selectable with `--alarm`.

use std::io::{self, Write};

use machinepulse_core::AlarmEmitter;

/// Rings the terminal bell (BEL, 0x07).
///
/// Writes to stderr by default so stdout stays clean for `run --json`.
pub struct TerminalBell<W = io::Stderr> {
    out: W,
}

impl TerminalBell {
    pub fn new() -> Self {
        Self::with_writer(io::stderr())
    }
}

impl Default for TerminalBell {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> TerminalBell<W> {
    pub fn with_writer(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> AlarmEmitter for TerminalBell<W> {
    fn name(&self) -> &str {
        "bell"
    }

    fn trigger(&mut self) -> io::Result<()> {
        self.out.write_all(b"\x07")?;
        self.out.flush()
    }
}

/// Writes a warning through the logger instead of making a sound.
pub struct LogAlarm;

impl AlarmEmitter for LogAlarm {
    fn name(&self) -> &str {
        "log"
    }

    fn trigger(&mut self) -> io::Result<()> {
        log::warn!("ALARM: predictive failure detected");
        Ok(())
    }
}

/// Does nothing.
pub struct SilentAlarm;

impl AlarmEmitter for SilentAlarm {
    fn name(&self) -> &str {
        "silent"
    }

    fn trigger(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Pick an emitter by name.
pub fn make_alarm(kind: &str) -> Box<dyn AlarmEmitter> {
    match kind {
        "bell" => Box::new(TerminalBell::new()),
        "log" => Box::new(LogAlarm),
        "silent" | "none" | "off" => Box::new(SilentAlarm),
        _ => {
            eprintln!("Unknown alarm '{kind}', using bell");
            Box::new(TerminalBell::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use machinepulse_core::sound_alarm;

    #[test]
    fn make_alarm_by_name() {
        assert_eq!(make_alarm("bell").name(), "bell");
        assert_eq!(make_alarm("log").name(), "log");
        assert_eq!(make_alarm("silent").name(), "silent");
        assert_eq!(make_alarm("off").name(), "silent");
    }

    #[test]
    fn make_alarm_unknown_defaults_bell() {
        assert_eq!(make_alarm("klaxon").name(), "bell");
        assert_eq!(make_alarm("BELL").name(), "bell"); // case-sensitive, falls through
    }

    #[test]
    fn bell_writes_bel_to_its_writer() {
        let mut buf = Vec::new();
        let mut bell = TerminalBell::with_writer(&mut buf);
        assert!(sound_alarm(&mut bell));
        assert!(sound_alarm(&mut bell));
        assert_eq!(buf, b"\x07\x07");
    }

    #[test]
    fn silent_and_log_always_succeed() {
        assert!(sound_alarm(&mut SilentAlarm));
        assert!(sound_alarm(&mut LogAlarm));
    }
}
