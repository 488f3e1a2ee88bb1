pub fn run(sim: &super::SimulationArgs, autostart: bool, alarm: &str) {
    let config = super::config_or_exit(sim);
    let noise = super::make_noise(sim.seed);
    let emitter = crate::alarm::make_alarm(alarm);

    let mut app = crate::tui::app::App::new(config, noise, emitter, autostart);
    if let Err(e) = app.run() {
        eprintln!("TUI error: {e}");
        std::process::exit(1);
    }
}
