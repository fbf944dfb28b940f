pub mod clock;
pub mod debug;
pub mod destination_queue;
pub mod error;
pub mod metrics;
pub mod scheduler;
/// Helpers shared by unit and integration tests.
pub mod testing;
