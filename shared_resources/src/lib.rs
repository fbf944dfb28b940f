pub mod config;
pub mod direction;
pub mod elevator_config;
pub mod elevator_snapshot;
pub mod elevator_state;
pub mod request;
