use std::time::Instant;

use uuid::Uuid;

use super::direction::Direction;

/// A single ride intent: board at `pickup_floor`, leave at `destination_floor`.
///
/// Requests are immutable once created. The `timestamp` is the moment of first
/// submission and is never refreshed, so waiting time is always measured from
/// when the rider first asked.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub id: Uuid,
    pub pickup_floor: i32,
    pub destination_floor: i32,
    pub direction: Direction,
    pub timestamp: Instant,
    pub is_vip: bool,
}

impl Request {
    pub fn new(pickup_floor: i32, destination_floor: i32) -> Self {
        Self::with_timestamp(pickup_floor, destination_floor, Instant::now())
    }

    pub fn with_timestamp(pickup_floor: i32, destination_floor: i32, timestamp: Instant) -> Self {
        Request {
            id: Uuid::new_v4(),
            pickup_floor,
            destination_floor,
            direction: Direction::between(pickup_floor, destination_floor),
            timestamp,
            is_vip: false,
        }
    }

    pub fn vip(mut self, is_vip: bool) -> Self {
        self.is_vip = is_vip;
        self
    }
}
