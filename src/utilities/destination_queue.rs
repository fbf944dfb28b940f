/// ----- DESTINATION QUEUE -----
/// Pending requests of a single elevator, served lowest score first.
/// Scores are fixed when a request is inserted; equal scores keep arrival order.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use shared_resources::direction::Direction;
use shared_resources::elevator_state::ElevatorState;
use shared_resources::request::Request;

pub const VIP_BONUS: i64 = -10_000;
pub const ON_PATH_BONUS: i64 = -5_000;

/// Lower is served sooner.
pub fn priority_score(request: &Request, current_floor: i32, state: ElevatorState) -> i64 {
    let mut score = if request.is_vip { VIP_BONUS } else { 0 };

    let on_path = match state {
        ElevatorState::MovingUp => {
            request.pickup_floor >= current_floor && request.direction == Direction::Up
        },
        ElevatorState::MovingDown => {
            request.pickup_floor <= current_floor && request.direction == Direction::Down
        },
        _ => false,
    };
    if on_path {
        score += ON_PATH_BONUS;
    }

    score + i64::from((current_floor - request.pickup_floor).abs())
}

#[derive(Debug)]
struct Entry {
    score: i64,
    sequence: u64,
    request: Request,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.score, self.sequence).cmp(&(other.score, other.sequence))
    }
}

#[derive(Debug, Default)]
pub struct DestinationQueue {
    heap: BinaryHeap<Reverse<Entry>>,
    next_sequence: u64,
}

impl DestinationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, request: Request, score: i64) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.heap.push(Reverse(Entry { score, sequence, request }));
    }

    pub fn pop(&mut self) -> Option<Request> {
        self.heap.pop().map(|Reverse(entry)| entry.request)
    }

    /// Drops everything and returns how many requests were discarded.
    pub fn clear(&mut self) -> usize {
        let dropped = self.heap.len();
        self.heap.clear();
        dropped
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowest_score_comes_out_first() {
        let mut queue = DestinationQueue::new();
        let far = Request::new(9, 1);
        let near = Request::new(2, 5);
        queue.push(far.clone(), 8);
        queue.push(near.clone(), 1);
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.pop().map(|r| r.id), Some(near.id));
        assert_eq!(queue.pop().map(|r| r.id), Some(far.id));
        assert!(queue.pop().is_none());
    }

    #[test]
    fn equal_scores_keep_arrival_order() {
        let mut queue = DestinationQueue::new();
        let requests: Vec<Request> = (0..5).map(|i| Request::new(3, 4 + i)).collect();
        for request in &requests {
            queue.push(request.clone(), 2);
        }
        for request in &requests {
            assert_eq!(queue.pop().map(|r| r.id), Some(request.id));
        }
    }

    #[test]
    fn clear_reports_dropped_count() {
        let mut queue = DestinationQueue::new();
        for floor in 1..=4 {
            queue.push(Request::new(floor, 10), i64::from(floor));
        }
        assert_eq!(queue.clear(), 4);
        assert!(queue.is_empty());
    }

    #[test]
    fn vip_beats_regular_rider_at_same_pickup() {
        let regular = Request::new(6, 8);
        let vip = Request::new(6, 8).vip(true);
        let mut queue = DestinationQueue::new();
        queue.push(regular.clone(), priority_score(&regular, 1, ElevatorState::Idle));
        queue.push(vip.clone(), priority_score(&vip, 1, ElevatorState::Idle));
        assert_eq!(queue.pop().map(|r| r.id), Some(vip.id));
    }

    #[test]
    fn on_path_pickup_beats_closer_summons() {
        // car at 3 heading up: a rider at 8 going up is on the way
        let on_path = priority_score(&Request::new(8, 10), 3, ElevatorState::MovingUp);
        let behind = priority_score(&Request::new(2, 1), 3, ElevatorState::MovingUp);
        assert!(on_path < behind);
        assert_eq!(on_path, ON_PATH_BONUS + 5);
        assert_eq!(behind, 1);
    }

    #[test]
    fn wrong_direction_gets_no_bonus() {
        assert_eq!(priority_score(&Request::new(8, 2), 3, ElevatorState::MovingUp), 5);
        assert_eq!(priority_score(&Request::new(1, 0), 3, ElevatorState::MovingDown), ON_PATH_BONUS + 2);
        assert_eq!(priority_score(&Request::new(5, 9), 3, ElevatorState::DoorsOpen), 2);
    }
}
