use std::fmt;

use shared_resources::elevator_state::ElevatorState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloorRole {
    Pickup,
    Destination,
}

impl fmt::Display for FloorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FloorRole::Pickup => f.write_str("pickup"),
            FloorRole::Destination => f.write_str("destination"),
        }
    }
}

/// Raised synchronously by `Fleet::submit_request`. The request is never queued.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error("{role} floor {floor} is invalid, valid range: {min}-{max}")]
    InvalidFloor {
        role: FloorRole,
        floor: i32,
        min: i32,
        max: i32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ElevatorError {
    #[error("elevator is {state}, not in maintenance or out of service")]
    NotSuspended { state: ElevatorState },
}

/// A wait was cancelled before it ran out. Handled inside the elevator loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("operation interrupted")]
pub struct Interrupted;
