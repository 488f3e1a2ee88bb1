use machinepulse_core::{DESIGNATED_MACHINE_ID, seed_roster};

pub fn run() {
    let roster = seed_roster();

    println!("Seed roster ({} machines):\n", roster.len());
    println!(
        "  {:<8} {:<22} {:<8} {:<9} {:>5} {:>6}",
        "ID", "NAME", "ZONE", "STATUS", "VIB", "TEMP"
    );
    for m in &roster {
        let marker = if m.id == DESIGNATED_MACHINE_ID {
            "  \u{2190} demo"
        } else {
            ""
        };
        println!(
            "  {:<8} {:<22} {:<8} {:<9} {:>4}% {:>4}\u{00b0}C{marker}",
            m.id,
            m.name,
            m.location,
            m.status.label(),
            m.vibration,
            m.temperature_c,
        );
    }
}
