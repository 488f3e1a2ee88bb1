//! Alarm emitter seam.
//!
//! The driver only raises a flag; whoever owns the session decides how to make
//! noise. Emitters are fire-and-forget: [`sound_alarm`] swallows both errors
//! and panics so a broken audio path can never stall the tick loop.

use std::io;
use std::panic::{AssertUnwindSafe, catch_unwind};

/// Something that can sound the alarm.
pub trait AlarmEmitter {
    /// Short name used in log lines.
    fn name(&self) -> &str;

    /// Fire once. Called on every tick the alarm signal is raised.
    fn trigger(&mut self) -> io::Result<()>;
}

impl<A: AlarmEmitter + ?Sized> AlarmEmitter for Box<A> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn trigger(&mut self) -> io::Result<()> {
        (**self).trigger()
    }
}

/// Trigger `emitter`, isolating any failure. Returns whether it fired cleanly.
///
/// A caught panic still runs the process panic hook first. Callers that
/// install a hook with side effects (a TUI restoring the terminal, say) should
/// undo them when this returns `false`.
pub fn sound_alarm(emitter: &mut dyn AlarmEmitter) -> bool {
    let result = catch_unwind(AssertUnwindSafe(|| emitter.trigger()));
    match result {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            log::warn!("alarm emitter {} failed: {e}", emitter.name());
            false
        }
        Err(_) => {
            log::warn!("alarm emitter {} panicked", emitter.name());
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counting {
        fired: usize,
    }

    impl AlarmEmitter for Counting {
        fn name(&self) -> &str {
            "counting"
        }
        fn trigger(&mut self) -> io::Result<()> {
            self.fired += 1;
            Ok(())
        }
    }

    struct Broken;

    impl AlarmEmitter for Broken {
        fn name(&self) -> &str {
            "broken"
        }
        fn trigger(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::NotFound, "no audio device"))
        }
    }

    struct Panicking;

    impl AlarmEmitter for Panicking {
        fn name(&self) -> &str {
            "panicking"
        }
        fn trigger(&mut self) -> io::Result<()> {
            panic!("audio backend exploded");
        }
    }

    #[test]
    fn successful_trigger_reports_true() {
        let mut c = Counting { fired: 0 };
        assert!(sound_alarm(&mut c));
        assert!(sound_alarm(&mut c));
        assert_eq!(c.fired, 2);
    }

    #[test]
    fn error_is_swallowed() {
        assert!(!sound_alarm(&mut Broken));
    }

    #[test]
    fn panic_is_swallowed() {
        assert!(!sound_alarm(&mut Panicking));
    }

    #[test]
    fn boxed_emitter_forwards() {
        let mut boxed: Box<dyn AlarmEmitter> = Box::new(Counting { fired: 0 });
        assert_eq!(boxed.name(), "counting");
        assert!(sound_alarm(&mut boxed));
    }
}
