/// ----- ELEVATOR MODULE -----
/// One car: its floor, its state machine and its own destination queue, plus
/// the loop that drives it leg by leg. Everything mutable sits behind a single
/// per-car lock; no other car's state is ever touched from here.

use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{bounded, select, Receiver, Sender};
use log::{debug, info, warn};
use parking_lot::Mutex;
use uuid::Uuid;

use shared_resources::direction::Direction;
use shared_resources::elevator_config::ElevatorConfiguration;
use shared_resources::elevator_snapshot::ElevatorSnapshot;
use shared_resources::elevator_state::ElevatorState;
use shared_resources::request::Request;

use crate::utilities::clock::{CancelToken, Clock};
use crate::utilities::destination_queue::{priority_score, DestinationQueue};
use crate::utilities::error::{ElevatorError, Interrupted};
use crate::utilities::metrics::MetricsCollector;

/// How long an idle or suspended car sleeps before looking at its queue again.
pub const IDLE_POLL: Duration = Duration::from_millis(100);

type Transition = Option<(ElevatorState, ElevatorState)>;

struct Car {
    floor: i32,
    state: ElevatorState,
    destinations: DestinationQueue,
    /// Cancelled by maintenance and emergency stop, replaced on exit.
    interrupt: CancelToken,
}

impl Car {
    fn set_state(&mut self, new_state: ElevatorState) -> Transition {
        if self.state == new_state {
            return None;
        }
        let old_state = self.state;
        self.state = new_state;
        Some((old_state, new_state))
    }
}

enum Step {
    Park,
    Serve(Request, CancelToken),
}

pub struct Elevator {
    id: Uuid,
    index: usize,
    configuration: ElevatorConfiguration,
    car: Mutex<Car>,
    wake_tx: Sender<()>,
    wake_rx: Receiver<()>,
    clock: Arc<dyn Clock>,
    metrics: Arc<dyn MetricsCollector>,
}

impl Elevator {
    pub fn new(
        index: usize,
        configuration: ElevatorConfiguration,
        clock: Arc<dyn Clock>,
        metrics: Arc<dyn MetricsCollector>,
    ) -> Self {
        let (wake_tx, wake_rx) = bounded(1);
        Elevator {
            id: Uuid::new_v4(),
            index,
            car: Mutex::new(Car {
                floor: configuration.spawn_floor(),
                state: ElevatorState::Idle,
                destinations: DestinationQueue::new(),
                interrupt: CancelToken::new(),
            }),
            configuration,
            wake_tx,
            wake_rx,
            clock,
            metrics,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn configuration(&self) -> &ElevatorConfiguration {
        &self.configuration
    }

    pub fn current_floor(&self) -> i32 {
        self.car.lock().floor
    }

    pub fn state(&self) -> ElevatorState {
        self.car.lock().state
    }

    pub fn pending_count(&self) -> usize {
        self.car.lock().destinations.len()
    }

    pub fn snapshot(&self) -> ElevatorSnapshot {
        let car = self.car.lock();
        ElevatorSnapshot {
            id: self.id,
            index: self.index,
            elevator_type: self.configuration.elevator_type,
            floor: car.floor,
            state: car.state,
            pending: car.destinations.len(),
            allowed_floors: self.configuration.allowed_floors.clone(),
        }
    }

    /// Queues `request` by priority score. An idle car starts toward the
    /// pickup straight away.
    pub fn add_destination(&self, request: Request) {
        let transition = {
            let mut car = self.car.lock();
            let score = priority_score(&request, car.floor, car.state);
            debug!(
                "elevator {} queued request {} ({} -> {}) with score {}",
                self.index, request.id, request.pickup_floor, request.destination_floor, score
            );
            let pickup_floor = request.pickup_floor;
            car.destinations.push(request, score);

            if car.state == ElevatorState::Idle {
                let next_state = match Direction::between(car.floor, pickup_floor) {
                    Direction::Up => ElevatorState::MovingUp,
                    Direction::Down => ElevatorState::MovingDown,
                    Direction::None => ElevatorState::DoorsOpening,
                };
                car.set_state(next_state)
            } else {
                None
            }
        };
        self.notify_state(transition);
        self.wake();
    }

    /// Suspends the car. The leg in progress is abandoned, the queue is kept.
    pub fn enter_maintenance(&self) {
        let transition = {
            let mut car = self.car.lock();
            car.interrupt.cancel();
            car.set_state(ElevatorState::Maintenance)
        };
        info!("elevator {} entering maintenance", self.index);
        self.notify_state(transition);
    }

    /// Takes the car out of service and drops every pending request.
    /// Returns how many were dropped.
    pub fn emergency_stop(&self) -> usize {
        let (transition, dropped) = {
            let mut car = self.car.lock();
            car.interrupt.cancel();
            let dropped = car.destinations.clear();
            (car.set_state(ElevatorState::OutOfService), dropped)
        };
        warn!("elevator {} emergency stop, {} pending requests dropped", self.index, dropped);
        self.notify_state(transition);
        dropped
    }

    pub fn exit_maintenance(&self) -> Result<(), ElevatorError> {
        let transition = {
            let mut car = self.car.lock();
            if !car.state.is_suspended() {
                return Err(ElevatorError::NotSuspended { state: car.state });
            }
            if car.interrupt.is_cancelled() {
                car.interrupt = CancelToken::new();
            }
            car.set_state(ElevatorState::Idle)
        };
        info!("elevator {} back in service", self.index);
        self.notify_state(transition);
        self.wake();
        Ok(())
    }

    /// Body of the car's thread. Returns once `shutdown` is cancelled.
    pub fn run(&self, shutdown: CancelToken) {
        debug!("elevator {} started at floor {}", self.index, self.current_floor());
        while !shutdown.is_cancelled() {
            match self.next_step() {
                Step::Park => self.park(&shutdown),
                Step::Serve(request, interrupt) => {
                    match self.serve(&request, &interrupt, &shutdown) {
                        Ok(()) => self.complete(&request),
                        Err(Interrupted) => {
                            debug!("elevator {} abandoned request {}", self.index, request.id);
                        },
                    }
                },
            }
        }
        debug!("elevator {} stopped", self.index);
    }

    fn next_step(&self) -> Step {
        let (step, transition) = {
            let mut car = self.car.lock();
            if car.state.is_suspended() {
                (Step::Park, None)
            } else if let Some(request) = car.destinations.pop() {
                (Step::Serve(request, car.interrupt.clone()), None)
            } else {
                (Step::Park, car.set_state(ElevatorState::Idle))
            }
        };
        self.notify_state(transition);
        step
    }

    fn park(&self, shutdown: &CancelToken) {
        select! {
            recv(self.wake_rx) -> _ => {},
            recv(shutdown.receiver()) -> _ => {},
            default(IDLE_POLL) => {},
        }
    }

    fn wake(&self) {
        // a full channel already holds a pending wake-up
        self.wake_tx.try_send(()).ok();
    }

    fn serve(&self, request: &Request, interrupt: &CancelToken, shutdown: &CancelToken) -> Result<(), Interrupted> {
        self.travel_to(request.pickup_floor, interrupt, shutdown)?;
        self.cycle_doors(interrupt, shutdown)?;
        self.travel_to(request.destination_floor, interrupt, shutdown)?;
        self.cycle_doors(interrupt, shutdown)
    }

    fn travel_to(&self, target_floor: i32, interrupt: &CancelToken, shutdown: &CancelToken) -> Result<(), Interrupted> {
        let (moving, step) = match Direction::between(self.current_floor(), target_floor) {
            Direction::Up => (ElevatorState::MovingUp, 1),
            Direction::Down => (ElevatorState::MovingDown, -1),
            Direction::None => return Ok(()),
        };
        self.transition(moving, interrupt)?;

        loop {
            self.clock.delay(self.configuration.floor_travel_time, &[interrupt, shutdown])?;
            let floor = {
                let mut car = self.car.lock();
                if interrupt.is_cancelled() {
                    return Err(Interrupted);
                }
                car.floor += step;
                car.floor
            };
            debug!("elevator {} reached floor {}", self.index, floor);
            self.metrics.on_floor_reached(self.id, floor);
            if floor == target_floor {
                return Ok(());
            }
        }
    }

    fn cycle_doors(&self, interrupt: &CancelToken, shutdown: &CancelToken) -> Result<(), Interrupted> {
        let tokens = [interrupt, shutdown];
        let full = self.configuration.door_operation_time;
        let half = full / 2;

        self.transition(ElevatorState::DoorsOpening, interrupt)?;
        self.clock.delay(half, &tokens)?;
        self.transition(ElevatorState::DoorsOpen, interrupt)?;
        self.clock.delay(full, &tokens)?;
        self.transition(ElevatorState::DoorsClosing, interrupt)?;
        self.clock.delay(half, &tokens)
    }

    /// State change made by the loop itself. Refused once `interrupt` fired,
    /// so an operator's maintenance or stop is never overwritten.
    fn transition(&self, new_state: ElevatorState, interrupt: &CancelToken) -> Result<(), Interrupted> {
        let transition = {
            let mut car = self.car.lock();
            if interrupt.is_cancelled() {
                return Err(Interrupted);
            }
            car.set_state(new_state)
        };
        self.notify_state(transition);
        Ok(())
    }

    fn complete(&self, request: &Request) {
        let elapsed = self.clock.now().saturating_duration_since(request.timestamp);
        info!(
            "elevator {} completed request {} ({} -> {}) in {:?}",
            self.index, request.id, request.pickup_floor, request.destination_floor, elapsed
        );
        self.metrics.on_request_completed(request, self.id, elapsed);
    }

    fn notify_state(&self, transition: Transition) {
        if let Some((old_state, new_state)) = transition {
            debug!("elevator {} changed state {} -> {}", self.index, old_state, new_state);
            self.metrics.on_state_changed(self.id, old_state, new_state);
        }
    }
}
