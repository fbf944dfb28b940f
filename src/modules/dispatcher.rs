/// ----- DISPATCHER MODULE -----
/// Single consumer of the inbound request queue. Each request is checked for
/// expiry, matched against the elevators allowed to serve it, and handed to
/// the chosen one. Requests nobody can take right now are retried after a
/// short backoff until they expire.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{select, unbounded, Receiver, Sender};
use log::{debug, warn};
use uuid::Uuid;

use shared_resources::elevator_snapshot::ElevatorSnapshot;
use shared_resources::request::Request;

use crate::modules::elevator::Elevator;
use crate::utilities::clock::{CancelToken, Clock};
use crate::utilities::metrics::MetricsCollector;
use crate::utilities::scheduler::Scheduler;

/// Outcome of evaluating one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Assigned(Uuid),
    Deferred,
    Expired,
}

/// Whether a car may take `request` at all, before any policy ranks it.
pub fn is_eligible(elevator: &ElevatorSnapshot, request: &Request) -> bool {
    if elevator.state.is_suspended() {
        return false;
    }
    elevator.serves_floor(request.pickup_floor) && elevator.serves_floor(request.destination_floor)
}

pub struct Dispatcher {
    elevators: Vec<Arc<Elevator>>,
    scheduler: Box<dyn Scheduler>,
    clock: Arc<dyn Clock>,
    metrics: Arc<dyn MetricsCollector>,
    global_timeout: Duration,
    retry_backoff: Duration,
    request_tx: Sender<Request>,
    request_rx: Receiver<Request>,
}

impl Dispatcher {
    pub fn new(
        elevators: Vec<Arc<Elevator>>,
        scheduler: Box<dyn Scheduler>,
        clock: Arc<dyn Clock>,
        metrics: Arc<dyn MetricsCollector>,
        global_timeout: Duration,
        retry_backoff: Duration,
    ) -> Self {
        let (request_tx, request_rx) = unbounded();
        Dispatcher {
            elevators,
            scheduler,
            clock,
            metrics,
            global_timeout,
            retry_backoff,
            request_tx,
            request_rx,
        }
    }

    /// Appends to the inbound queue. Never blocks.
    pub fn enqueue_request(&self, request: Request) {
        // the receiver lives as long as `self`
        self.request_tx.send(request).ok();
    }

    pub fn queued(&self) -> usize {
        self.request_rx.len()
    }

    /// Body of the dispatcher thread. Returns once `shutdown` is cancelled.
    pub fn run(&self, shutdown: CancelToken) {
        debug!("dispatcher started with {} scheduler", self.scheduler.name());
        let mut retries: VecDeque<(Instant, Request)> = VecDeque::new();

        while !shutdown.is_cancelled() {
            // backoff is fixed, so retries come due in insertion order
            let now = self.clock.now();
            while retries.front().is_some_and(|(due, _)| *due <= now) {
                if let Some((_, request)) = retries.pop_front() {
                    self.enqueue_request(request);
                }
            }
            let next_retry = retries
                .front()
                .map_or(Duration::from_secs(1), |(due, _)| due.saturating_duration_since(now));

            select! {
                recv(self.request_rx) -> msg => {
                    let Ok(request) = msg else { break };
                    if self.dispatch(&request) == Dispatch::Deferred {
                        retries.push_back((self.clock.now() + self.retry_backoff, request));
                    }
                },
                recv(shutdown.receiver()) -> _ => break,
                default(next_retry) => {},
            }
        }
        debug!("dispatcher stopped with {} requests waiting for retry", retries.len());
    }

    /// Evaluates one request against the fleet as it is right now.
    pub fn dispatch(&self, request: &Request) -> Dispatch {
        let waited = self.clock.now().saturating_duration_since(request.timestamp);
        if waited > self.global_timeout {
            warn!(
                "[DLQ] request {} dropped, waited {:?} for an elevator (timeout {:?})",
                request.id, waited, self.global_timeout
            );
            self.metrics.on_request_dead_lettered(request, waited);
            return Dispatch::Expired;
        }

        let candidates: Vec<ElevatorSnapshot> = self
            .elevators
            .iter()
            .map(|elevator| elevator.snapshot())
            .filter(|snapshot| is_eligible(snapshot, request))
            .collect();

        let chosen = self
            .scheduler
            .select(request, &candidates)
            .and_then(|snapshot| self.elevators.iter().find(|elevator| elevator.id() == snapshot.id));

        match chosen {
            Some(elevator) => {
                debug!("request {} assigned to elevator {}", request.id, elevator.index());
                elevator.add_destination(request.clone());
                Dispatch::Assigned(elevator.id())
            },
            None => {
                debug!("no elevator for request {} yet, retrying in {:?}", request.id, self.retry_backoff);
                Dispatch::Deferred
            },
        }
    }
}
