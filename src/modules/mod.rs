use std::env;
use std::io;
use std::sync::Arc;

use log::info;

use shared_resources::config::SystemSettings;

use crate::utilities::clock::SystemClock;
use crate::utilities::metrics::InMemoryMetricsCollector;

pub mod console;
pub mod dispatcher;
pub mod elevator;
pub mod fleet;

pub fn run() -> io::Result<()> {
    // READ CONFIGURATION
    let args: Vec<String> = env::args().collect();
    let settings = SystemSettings::load(&args).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
    info!(
        "{} local, {} express, {} freight elevators, {:?} scheduler",
        settings.local_elevator_count, settings.express_elevator_count, settings.freight_elevator_count, settings.scheduler
    );

    // INITIALIZE FLEET
    let metrics = Arc::new(InMemoryMetricsCollector::new());
    let fleet = fleet::Fleet::from_settings(settings, Arc::new(SystemClock), metrics.clone())?;

    // INITIALIZE CONSOLE
    let line_rx = console::spawn_stdin_reader()?;
    console::main(&fleet, &metrics, line_rx)?;

    fleet.shutdown();
    info!("final metrics: {}", serde_json::to_string(&metrics.snapshot())?);
    Ok(())
}
