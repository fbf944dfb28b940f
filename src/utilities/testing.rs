use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use uuid::Uuid;

use shared_resources::elevator_state::ElevatorState;
use shared_resources::request::Request;

use super::metrics::MetricsCollector;

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    StateChanged(Uuid, ElevatorState, ElevatorState),
    FloorReached(Uuid, i32),
    /// Request id, elevator id, and the elapsed time reported with it.
    Completed(Uuid, Uuid, Duration),
    DeadLettered(Uuid),
}

/// Collector that keeps every notification in arrival order.
#[derive(Debug, Default)]
pub struct RecordingMetrics {
    events: Mutex<Vec<Event>>,
}

impl RecordingMetrics {
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    pub fn floors_reached(&self, elevator_id: Uuid) -> Vec<i32> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::FloorReached(id, floor) if id == elevator_id => Some(floor),
                _ => None,
            })
            .collect()
    }

    pub fn completed(&self) -> Vec<Uuid> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::Completed(request_id, _, _) => Some(request_id),
                _ => None,
            })
            .collect()
    }

    pub fn completion_time(&self, request_id: Uuid) -> Option<Duration> {
        self.events().into_iter().find_map(|event| match event {
            Event::Completed(id, _, elapsed) if id == request_id => Some(elapsed),
            _ => None,
        })
    }

    pub fn dead_lettered(&self) -> Vec<Uuid> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::DeadLettered(request_id) => Some(request_id),
                _ => None,
            })
            .collect()
    }
}

impl MetricsCollector for RecordingMetrics {
    fn on_state_changed(&self, elevator_id: Uuid, old_state: ElevatorState, new_state: ElevatorState) {
        self.events.lock().push(Event::StateChanged(elevator_id, old_state, new_state));
    }

    fn on_floor_reached(&self, elevator_id: Uuid, floor: i32) {
        self.events.lock().push(Event::FloorReached(elevator_id, floor));
    }

    fn on_request_completed(&self, request: &Request, elevator_id: Uuid, elapsed: Duration) {
        self.events.lock().push(Event::Completed(request.id, elevator_id, elapsed));
    }

    fn on_request_dead_lettered(&self, request: &Request, _waited: Duration) {
        self.events.lock().push(Event::DeadLettered(request.id));
    }
}

/// Polls `condition` until it holds or five seconds pass.
pub fn wait_until<F: FnMut() -> bool>(mut condition: F) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    condition()
}
