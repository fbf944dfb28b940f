/// ----- METRICS -----
/// Observer interface the elevators and the dispatcher report to. Callbacks
/// run on the emitting thread, after any elevator lock has been released,
/// so implementations must be quick and must not call back into the fleet.
/// A transition made by an operator call and one made by the car's own loop
/// may race, so consecutive `on_state_changed` calls for one car are not
/// guaranteed to chain `new_state` into the next `old_state`.

use std::collections::HashMap;
use std::time::Duration;

use parking_lot::Mutex;
use uuid::Uuid;

use shared_resources::elevator_state::ElevatorState;
use shared_resources::request::Request;

pub trait MetricsCollector: Send + Sync {
    fn on_state_changed(&self, elevator_id: Uuid, old_state: ElevatorState, new_state: ElevatorState);

    fn on_floor_reached(&self, _elevator_id: Uuid, _floor: i32) {}

    fn on_request_completed(&self, request: &Request, elevator_id: Uuid, elapsed: Duration);

    /// The request waited longer than the global timeout and was dropped.
    fn on_request_dead_lettered(&self, _request: &Request, _waited: Duration) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMetrics;

impl MetricsCollector for NoopMetrics {
    fn on_state_changed(&self, _elevator_id: Uuid, _old_state: ElevatorState, _new_state: ElevatorState) {}

    fn on_request_completed(&self, _request: &Request, _elevator_id: Uuid, _elapsed: Duration) {}
}

#[derive(serde::Serialize, Debug, Clone, PartialEq)]
pub struct MetricsSnapshot {
    pub requests_completed: usize,
    pub requests_dead_lettered: usize,
    pub state_transitions: usize,
    pub average_wait_ms: f64,
    pub longest_wait_ms: f64,
    /// Completed requests per elevator.
    pub elevator_utilization: HashMap<Uuid, usize>,
}

#[derive(Debug, Default)]
struct Totals {
    completed: usize,
    total_wait: Duration,
    longest_wait: Duration,
    dead_lettered: usize,
    state_transitions: usize,
    utilization: HashMap<Uuid, usize>,
}

/// Keeps running totals in memory for the operator console.
#[derive(Debug, Default)]
pub struct InMemoryMetricsCollector {
    totals: Mutex<Totals>,
}

impl InMemoryMetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let totals = self.totals.lock();
        let completed = totals.completed;
        let average_wait_ms = if completed == 0 {
            0.0
        } else {
            totals.total_wait.as_secs_f64() * 1000.0 / completed as f64
        };

        MetricsSnapshot {
            requests_completed: completed,
            requests_dead_lettered: totals.dead_lettered,
            state_transitions: totals.state_transitions,
            average_wait_ms,
            longest_wait_ms: totals.longest_wait.as_secs_f64() * 1000.0,
            elevator_utilization: totals.utilization.clone(),
        }
    }
}

impl MetricsCollector for InMemoryMetricsCollector {
    fn on_state_changed(&self, _elevator_id: Uuid, _old_state: ElevatorState, _new_state: ElevatorState) {
        self.totals.lock().state_transitions += 1;
    }

    fn on_request_completed(&self, _request: &Request, elevator_id: Uuid, elapsed: Duration) {
        let mut totals = self.totals.lock();
        totals.completed += 1;
        totals.total_wait += elapsed;
        totals.longest_wait = totals.longest_wait.max(elapsed);
        *totals.utilization.entry(elevator_id).or_insert(0) += 1;
    }

    fn on_request_dead_lettered(&self, _request: &Request, _waited: Duration) {
        self.totals.lock().dead_lettered += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_collector_reports_zeroes() {
        let snapshot = InMemoryMetricsCollector::new().snapshot();
        assert_eq!(snapshot.requests_completed, 0);
        assert_eq!(snapshot.average_wait_ms, 0.0);
        assert_eq!(snapshot.longest_wait_ms, 0.0);
        assert!(snapshot.elevator_utilization.is_empty());
    }

    #[test]
    fn completions_are_averaged_and_attributed() {
        let metrics = InMemoryMetricsCollector::new();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let request = Request::new(1, 4);

        metrics.on_request_completed(&request, first, Duration::from_millis(100));
        metrics.on_request_completed(&request, first, Duration::from_millis(300));
        metrics.on_request_completed(&request, second, Duration::from_millis(200));
        metrics.on_request_dead_lettered(&request, Duration::from_secs(11));
        metrics.on_state_changed(first, ElevatorState::Idle, ElevatorState::MovingUp);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.requests_completed, 3);
        assert_eq!(snapshot.requests_dead_lettered, 1);
        assert_eq!(snapshot.state_transitions, 1);
        assert!((snapshot.average_wait_ms - 200.0).abs() < 1e-6);
        assert!((snapshot.longest_wait_ms - 300.0).abs() < 1e-6);
        assert_eq!(snapshot.elevator_utilization[&first], 2);
        assert_eq!(snapshot.elevator_utilization[&second], 1);
    }

    #[test]
    fn long_runs_keep_constant_size_totals() {
        let metrics = InMemoryMetricsCollector::new();
        let elevator_id = Uuid::new_v4();
        let request = Request::new(1, 2);
        for millis in 1..=10_000u64 {
            metrics.on_request_completed(&request, elevator_id, Duration::from_millis(millis));
        }

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.requests_completed, 10_000);
        assert!((snapshot.average_wait_ms - 5000.5).abs() < 1e-6);
        assert!((snapshot.longest_wait_ms - 10_000.0).abs() < 1e-6);
        assert_eq!(snapshot.elevator_utilization[&elevator_id], 10_000);
    }

    #[test]
    fn snapshot_serializes_with_elevator_ids_as_keys() {
        let metrics = InMemoryMetricsCollector::new();
        let elevator_id = Uuid::new_v4();
        metrics.on_request_completed(&Request::new(2, 3), elevator_id, Duration::from_millis(50));

        let json: serde_json::Value = serde_json::to_value(metrics.snapshot()).unwrap();
        assert_eq!(json["requests_completed"], 1);
        assert_eq!(json["elevator_utilization"][elevator_id.to_string()], 1);
    }
}
