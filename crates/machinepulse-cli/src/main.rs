//! CLI for machinepulse: a factory floor that fails on cue.

mod alarm;
mod commands;
mod tui;

use clap::{Parser, Subcommand};

use commands::SimulationArgs;

#[derive(Parser)]
#[command(name = "machinepulse")]
#[command(about = "machinepulse: simulated factory monitoring dashboard")]
#[command(version = machinepulse_core::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Live machine dashboard (TUI). Press d to start the failure demo.
    Monitor {
        #[command(flatten)]
        sim: SimulationArgs,

        /// Start the demo as soon as the dashboard opens
        #[arg(long)]
        autostart: bool,

        /// How the alarm is sounded (`log` is unavailable: the dashboard owns the terminal)
        #[arg(long, default_value = "bell", value_parser = ["bell", "silent"])]
        alarm: String,
    },

    /// Run the demo headless, printing one line per tick
    Run {
        #[command(flatten)]
        sim: SimulationArgs,

        /// Number of ticks to run (0 = until Ctrl+C)
        #[arg(long, default_value = "10")]
        ticks: u64,

        /// Print one JSON object per tick instead of a text line
        #[arg(long)]
        json: bool,

        /// Don't wait for the timer between ticks
        #[arg(long)]
        fast: bool,

        /// How the alarm is sounded
        #[arg(long, default_value = "log", value_parser = ["bell", "log", "silent"])]
        alarm: String,
    },

    /// Print the seed roster
    Roster,
}

fn main() {
    let cli = Cli::parse();

    let default_filter = match cli.command {
        // The dashboard owns the terminal; stay quiet unless RUST_LOG asks.
        Commands::Monitor { .. } => "off",
        _ => "warn",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match cli.command {
        Commands::Monitor {
            sim,
            autostart,
            alarm,
        } => commands::monitor::run(&sim, autostart, &alarm),
        Commands::Run {
            sim,
            ticks,
            json,
            fast,
            alarm,
        } => commands::run::run(&sim, ticks, json, fast, &alarm),
        Commands::Roster => commands::roster::run(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monitor_rejects_log_alarm() {
        assert!(Cli::try_parse_from(["machinepulse", "monitor", "--alarm", "log"]).is_err());
        assert!(Cli::try_parse_from(["machinepulse", "monitor", "--alarm", "silent"]).is_ok());
    }

    #[test]
    fn run_accepts_log_alarm() {
        let cli = Cli::try_parse_from(["machinepulse", "run", "--alarm", "log", "--json"]).unwrap();
        match cli.command {
            Commands::Run { alarm, json, .. } => {
                assert_eq!(alarm, "log");
                assert!(json);
            }
            _ => panic!("expected run"),
        }
    }
}
