/// ----- FLEET MODULE -----
/// Owns the fixed set of elevators and the dispatcher, runs each of them on
/// its own thread, and is the only entry point for new requests.

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::{error, info};
use parking_lot::Mutex;

use shared_resources::config::SystemSettings;
use shared_resources::elevator_config::ElevatorConfiguration;
use shared_resources::elevator_snapshot::ElevatorSnapshot;
use shared_resources::request::Request;

use crate::modules::dispatcher::Dispatcher;
use crate::modules::elevator::Elevator;
use crate::utilities::clock::{CancelToken, Clock};
use crate::utilities::error::{FloorRole, SubmitError};
use crate::utilities::metrics::MetricsCollector;
use crate::utilities::scheduler::{scheduler_for, Scheduler};

pub struct Fleet {
    settings: SystemSettings,
    elevators: Vec<Arc<Elevator>>,
    dispatcher: Arc<Dispatcher>,
    shutdown: CancelToken,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Fleet {
    /// Builds the fleet described by `settings` and starts it.
    pub fn from_settings(
        settings: SystemSettings,
        clock: Arc<dyn Clock>,
        metrics: Arc<dyn MetricsCollector>,
    ) -> io::Result<Self> {
        let configurations = settings.elevator_configurations();
        let scheduler = scheduler_for(settings.scheduler);
        Self::start(settings, configurations, scheduler, clock, metrics)
    }

    pub fn start(
        settings: SystemSettings,
        configurations: Vec<ElevatorConfiguration>,
        scheduler: Box<dyn Scheduler>,
        clock: Arc<dyn Clock>,
        metrics: Arc<dyn MetricsCollector>,
    ) -> io::Result<Self> {
        let elevators: Vec<Arc<Elevator>> = configurations
            .into_iter()
            .enumerate()
            .map(|(index, configuration)| Arc::new(Elevator::new(index, configuration, clock.clone(), metrics.clone())))
            .collect();

        let dispatcher = Arc::new(Dispatcher::new(
            elevators.clone(),
            scheduler,
            clock,
            metrics,
            settings.global_timeout(),
            settings.retry_backoff(),
        ));

        let fleet = Fleet {
            settings,
            elevators,
            dispatcher,
            shutdown: CancelToken::new(),
            handles: Mutex::new(Vec::new()),
        };
        // on a failed spawn, dropping `fleet` stops whatever already started
        fleet.spawn_threads()?;
        info!(
            "fleet started with {} elevators, floors {}..={}",
            fleet.elevators.len(),
            fleet.settings.min_floor,
            fleet.settings.max_floor
        );
        Ok(fleet)
    }

    fn spawn_threads(&self) -> io::Result<()> {
        let mut handles = self.handles.lock();

        // INITIALIZE ONE THREAD PER ELEVATOR
        for elevator in &self.elevators {
            let elevator = elevator.clone();
            let shutdown = self.shutdown.clone();
            let handle = thread::Builder::new()
                .name(format!("elevator-{}", elevator.index()))
                .spawn(move || elevator.run(shutdown))?;
            handles.push(handle);
        }

        // INITIALIZE THREAD FOR DISPATCHER
        {
            let dispatcher = self.dispatcher.clone();
            let shutdown = self.shutdown.clone();
            let handle = thread::Builder::new()
                .name("dispatcher".to_string())
                .spawn(move || dispatcher.run(shutdown))?;
            handles.push(handle);
        }
        Ok(())
    }

    /// Admits `request` if both floors lie within the building.
    pub fn submit_request(&self, request: Request) -> Result<(), SubmitError> {
        let checks = [
            (FloorRole::Pickup, request.pickup_floor),
            (FloorRole::Destination, request.destination_floor),
        ];
        for (role, floor) in checks {
            if !self.settings.is_within_bounds(floor) {
                return Err(SubmitError::InvalidFloor {
                    role,
                    floor,
                    min: self.settings.min_floor,
                    max: self.settings.max_floor,
                });
            }
        }
        self.dispatcher.enqueue_request(request);
        Ok(())
    }

    pub fn elevators(&self) -> &[Arc<Elevator>] {
        &self.elevators
    }

    pub fn snapshots(&self) -> Vec<ElevatorSnapshot> {
        self.elevators.iter().map(|elevator| elevator.snapshot()).collect()
    }

    /// Stops every loop and waits for them. A leg in progress is abandoned;
    /// queued requests are left where they are.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
        let handles: Vec<JoinHandle<()>> = self.handles.lock().drain(..).collect();
        if handles.is_empty() {
            return;
        }
        for handle in handles {
            let name = handle.thread().name().unwrap_or("unnamed").to_string();
            if handle.join().is_err() {
                error!("thread {} panicked before shutdown", name);
            }
        }
        info!("fleet stopped");
    }
}

impl Drop for Fleet {
    fn drop(&mut self) {
        self.shutdown();
    }
}
