/// ----- SCHEDULER -----
/// Stateless policies picking which elevator serves a request. The candidates
/// handed in are already eligible (in service, floors allowed); a policy only
/// ranks them. Candidates are snapshots, so every policy is a pure function.

use shared_resources::config::SchedulerKind;
use shared_resources::direction::Direction;
use shared_resources::elevator_config::ElevatorType;
use shared_resources::elevator_snapshot::ElevatorSnapshot;
use shared_resources::elevator_state::ElevatorState;
use shared_resources::request::Request;

pub const LOAD_WEIGHT: i64 = 10;
pub const EXPRESS_BONUS: i64 = -1_000;
pub const VIP_BUSY_PENALTY: i64 = 5_000;

pub trait Scheduler: Send + Sync {
    fn name(&self) -> &'static str;

    fn select<'a>(&self, request: &Request, candidates: &'a [ElevatorSnapshot]) -> Option<&'a ElevatorSnapshot>;
}

pub fn scheduler_for(kind: SchedulerKind) -> Box<dyn Scheduler> {
    match kind {
        SchedulerKind::Fifo => Box::new(FifoScheduler),
        SchedulerKind::Closest => Box::new(ClosestElevatorScheduler),
        SchedulerKind::Scan => Box::new(ScanScheduler),
        SchedulerKind::Look => Box::new(LookScheduler),
    }
}

/// Moving toward `pickup` without having to reverse.
fn heading_towards(elevator: &ElevatorSnapshot, pickup_floor: i32) -> bool {
    match elevator.state {
        ElevatorState::MovingUp => pickup_floor >= elevator.floor,
        ElevatorState::MovingDown => pickup_floor <= elevator.floor,
        _ => false,
    }
}

/// Moving toward the pickup, and in the direction the rider wants to go.
fn heading_with(elevator: &ElevatorSnapshot, request: &Request) -> bool {
    let travelling = match elevator.state {
        ElevatorState::MovingUp => Direction::Up,
        ElevatorState::MovingDown => Direction::Down,
        _ => return false,
    };
    travelling == request.direction && heading_towards(elevator, request.pickup_floor)
}

fn distance(elevator: &ElevatorSnapshot, request: &Request) -> i64 {
    i64::from((elevator.floor - request.pickup_floor).abs())
}

fn least_loaded(candidates: &[ElevatorSnapshot]) -> Option<&ElevatorSnapshot> {
    candidates.iter().min_by_key(|elevator| elevator.pending)
}

/// First idle car, otherwise the one with the shortest queue.
#[derive(Debug, Default, Clone, Copy)]
pub struct FifoScheduler;

impl Scheduler for FifoScheduler {
    fn name(&self) -> &'static str {
        "fifo"
    }

    fn select<'a>(&self, _request: &Request, candidates: &'a [ElevatorSnapshot]) -> Option<&'a ElevatorSnapshot> {
        candidates
            .iter()
            .find(|elevator| elevator.state == ElevatorState::Idle)
            .or_else(|| least_loaded(candidates))
    }
}

/// Lowest composite cost among idle or on-path cars: distance, queue length,
/// a bonus for express cars and a penalty for busy cars when the rider is VIP.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClosestElevatorScheduler;

impl ClosestElevatorScheduler {
    pub fn cost(elevator: &ElevatorSnapshot, request: &Request) -> i64 {
        let mut cost = distance(elevator, request) + LOAD_WEIGHT * elevator.pending as i64;
        if elevator.elevator_type == ElevatorType::Express {
            cost += EXPRESS_BONUS;
        }
        if request.is_vip && elevator.pending > 0 {
            cost += VIP_BUSY_PENALTY;
        }
        cost
    }
}

impl Scheduler for ClosestElevatorScheduler {
    fn name(&self) -> &'static str {
        "closest"
    }

    fn select<'a>(&self, request: &Request, candidates: &'a [ElevatorSnapshot]) -> Option<&'a ElevatorSnapshot> {
        candidates
            .iter()
            .filter(|elevator| elevator.state == ElevatorState::Idle || heading_with(elevator, request))
            .min_by_key(|elevator| Self::cost(elevator, request))
            .or_else(|| least_loaded(candidates))
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ScanScheduler;

impl Scheduler for ScanScheduler {
    fn name(&self) -> &'static str {
        "scan"
    }

    fn select<'a>(&self, request: &Request, candidates: &'a [ElevatorSnapshot]) -> Option<&'a ElevatorSnapshot> {
        candidates
            .iter()
            .find(|elevator| heading_with(elevator, request))
            .or_else(|| candidates.iter().find(|elevator| elevator.state == ElevatorState::Idle))
            .or_else(|| least_loaded(candidates))
    }
}

/// Reversal is left to the cars themselves: their queues re-rank on every
/// arrival, so here it is enough to pick the nearest idle or approaching car.
#[derive(Debug, Default, Clone, Copy)]
pub struct LookScheduler;

impl Scheduler for LookScheduler {
    fn name(&self) -> &'static str {
        "look"
    }

    fn select<'a>(&self, request: &Request, candidates: &'a [ElevatorSnapshot]) -> Option<&'a ElevatorSnapshot> {
        candidates
            .iter()
            .filter(|elevator| {
                elevator.state == ElevatorState::Idle || heading_towards(elevator, request.pickup_floor)
            })
            .min_by_key(|elevator| distance(elevator, request))
            .or_else(|| least_loaded(candidates))
    }
}
