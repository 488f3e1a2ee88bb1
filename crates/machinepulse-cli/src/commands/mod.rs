pub mod monitor;
pub mod roster;
pub mod run;

use std::io;
use std::path::PathBuf;

use clap::Args;
use machinepulse_core::{RandomNoise, SimulationConfig, load_config_from_path};

/// Simulation flags shared by `monitor` and `run`.
#[derive(Args, Debug, Clone, Default)]
pub struct SimulationArgs {
    /// JSON config file; flags below override it
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Id of the machine the demo drives into failure
    #[arg(long)]
    pub designated: Option<String>,

    /// Jitter every machine over 0-100%, no scripted failure
    #[arg(long, conflicts_with = "designated")]
    pub unscripted: bool,

    /// Tick period in milliseconds
    #[arg(long)]
    pub tick_ms: Option<u64>,

    /// Clamp ceiling for background machines (0-100)
    #[arg(long)]
    pub background_max: Option<u8>,

    /// Seed the noise source for a reproducible run
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Layer defaults, the optional config file and command-line flags.
pub fn build_config(args: &SimulationArgs) -> io::Result<SimulationConfig> {
    let mut config = match &args.config {
        Some(path) => load_config_from_path(path)?,
        None => SimulationConfig::default(),
    };

    if args.unscripted {
        config = config.into_unscripted();
    }
    if let Some(id) = &args.designated {
        config.designated_id = Some(id.clone());
    }
    if let Some(ms) = args.tick_ms {
        config.tick_ms = ms;
    }
    if let Some(max) = args.background_max {
        config.background_max = max;
    }

    config.validate()?;
    Ok(config)
}

/// Seeded noise when asked for, OS entropy otherwise.
pub fn make_noise(seed: Option<u64>) -> RandomNoise {
    match seed {
        Some(seed) => RandomNoise::seeded(seed),
        None => RandomNoise::from_os(),
    }
}

/// Build the config or bail out of the process with a message.
pub fn config_or_exit(args: &SimulationArgs) -> SimulationConfig {
    match build_config(args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn no_flags_gives_defaults() {
        let config = build_config(&SimulationArgs::default()).unwrap();
        assert_eq!(config, SimulationConfig::default());
    }

    #[test]
    fn unscripted_flag() {
        let args = SimulationArgs {
            unscripted: true,
            ..Default::default()
        };
        let config = build_config(&args).unwrap();
        assert!(config.designated_id.is_none());
        assert_eq!(config.background_max, 100);
    }

    #[test]
    fn flags_override_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "tick_ms": 250, "background_max": 30 }}"#).unwrap();
        let args = SimulationArgs {
            config: Some(file.path().to_path_buf()),
            tick_ms: Some(500),
            designated: Some("MP-101".into()),
            ..Default::default()
        };
        let config = build_config(&args).unwrap();
        assert_eq!(config.tick_ms, 500);
        assert_eq!(config.background_max, 30);
        assert_eq!(config.designated_id.as_deref(), Some("MP-101"));
    }

    #[test]
    fn explicit_ceiling_beats_unscripted_default() {
        let args = SimulationArgs {
            unscripted: true,
            background_max: Some(60),
            ..Default::default()
        };
        assert_eq!(build_config(&args).unwrap().background_max, 60);
    }

    #[test]
    fn invalid_flag_is_rejected() {
        let args = SimulationArgs {
            tick_ms: Some(0),
            ..Default::default()
        };
        let err = build_config(&args).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let args = SimulationArgs {
            config: Some(PathBuf::from("/nonexistent/machinepulse.json")),
            ..Default::default()
        };
        assert!(build_config(&args).is_err());
    }

    #[test]
    fn seeded_noise_is_reproducible() {
        use machinepulse_core::NoiseSource;
        let mut a = make_noise(Some(5));
        let mut b = make_noise(Some(5));
        assert_eq!(a.draw(0..=1000), b.draw(0..=1000));
    }
}
