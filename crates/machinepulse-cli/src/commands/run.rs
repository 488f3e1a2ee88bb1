use std::io::{self, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use machinepulse_core::{
    AlarmEmitter, DemoSession, MachineReading, NoiseSource, TickReport, sound_alarm,
};
use serde::Serialize;

/// Upper bound on a single sleep so Ctrl+C is noticed promptly.
const MAX_WAIT: Duration = Duration::from_millis(50);

#[derive(Serialize)]
struct TickLine<'a> {
    #[serde(flatten)]
    report: TickReport,
    machines: &'a [MachineReading],
}

/// How the headless loop paces and prints.
#[derive(Debug, Clone, Copy)]
struct RunOptions {
    /// 0 = until interrupted.
    ticks: u64,
    json: bool,
    fast: bool,
}

pub fn run(sim: &super::SimulationArgs, ticks: u64, json: bool, fast: bool, alarm: &str) {
    let config = super::config_or_exit(sim);
    let mut emitter = crate::alarm::make_alarm(alarm);
    let mut session = DemoSession::new(config, super::make_noise(sim.seed));

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    }) {
        log::warn!("could not install Ctrl+C handler: {e}");
    }

    let opts = RunOptions { ticks, json, fast };
    let mut out = io::stdout().lock();
    if let Err(e) = drive(&mut session, emitter.as_mut(), opts, &running, &mut out) {
        eprintln!("run failed: {e}");
        std::process::exit(1);
    }
}

/// Start the session and print ticks to `out` until done or interrupted.
///
/// Only tick output goes to `out`; the emitter is expected to write
/// elsewhere so `--json` lines stay parseable.
fn drive<N: NoiseSource>(
    session: &mut DemoSession<N>,
    emitter: &mut dyn AlarmEmitter,
    opts: RunOptions,
    running: &AtomicBool,
    out: &mut impl Write,
) -> io::Result<()> {
    if !opts.json {
        write_header(session, out)?;
    }

    session.start(Instant::now());
    while running.load(Ordering::SeqCst)
        && (opts.ticks == 0 || session.elapsed_ticks() < opts.ticks)
    {
        let report = if opts.fast {
            session.tick()
        } else {
            let now = Instant::now();
            match session.poll(now) {
                Some(report) => Some(report),
                None => {
                    let wait = session.until_next_tick(now).unwrap_or(MAX_WAIT);
                    std::thread::sleep(wait.min(MAX_WAIT));
                    continue;
                }
            }
        };
        let Some(report) = report else { break };

        if report.alarm {
            sound_alarm(emitter);
        }
        if opts.json {
            write_json(&report, session.roster(), out)?;
        } else {
            writeln!(out, "{}", format_tick(&report, session.roster()))?;
        }
        out.flush()?;
    }
    session.stop();

    if !opts.json {
        writeln!(
            out,
            "\n{} ticks, {} alarm(s)",
            session.elapsed_ticks(),
            session.alarms_raised()
        )?;
    }
    Ok(())
}

fn write_header<N: NoiseSource>(session: &DemoSession<N>, out: &mut impl Write) -> io::Result<()> {
    let config = session.config();
    writeln!(out, "MachinePulse demo")?;
    match &config.designated_id {
        Some(id) => writeln!(out, "  Scripted:  {id}")?,
        None => writeln!(out, "  Scripted:  none (jitter only)")?,
    }
    writeln!(out, "  Tick:      {}ms", config.tick_ms)?;
    writeln!(out, "  Ceiling:   {}% for background machines", config.background_max)?;
    writeln!(out)
}

fn write_json(
    report: &TickReport,
    machines: &[MachineReading],
    out: &mut impl Write,
) -> io::Result<()> {
    let line = TickLine {
        report: *report,
        machines,
    };
    match serde_json::to_string(&line) {
        Ok(s) => writeln!(out, "{s}"),
        Err(e) => {
            log::warn!("tick {}: could not encode JSON: {e}", report.tick);
            Ok(())
        }
    }
}

/// One text line per tick: counter, phase, then every machine.
fn format_tick(report: &TickReport, machines: &[MachineReading]) -> String {
    let phase = report.phase.map_or("-", |p| p.label());
    let mut line = format!("#{:<4} {:<8}", report.tick, phase);
    for m in machines {
        line.push_str(&format!("  {} {:>3}% {:<8}", m.id, m.vibration, m.status.label()));
    }
    if report.alarm {
        line.push_str("  \u{26a0} ALARM");
    }
    line.trim_end().to_string()
}
