use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ElevatorType {
    Local,
    Express,
    Freight,
}

impl fmt::Display for ElevatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElevatorType::Local => "local",
            ElevatorType::Express => "express",
            ElevatorType::Freight => "freight",
        };
        f.write_str(name)
    }
}

/// Fixed physical description of one car, handed over when the car is built.
#[derive(Debug, Clone, PartialEq)]
pub struct ElevatorConfiguration {
    pub elevator_type: ElevatorType,
    /// Floors the car may serve. Empty means every floor.
    pub allowed_floors: BTreeSet<i32>,
    pub floor_travel_time: Duration,
    /// One full open-wait-close cycle.
    pub door_operation_time: Duration,
}

impl ElevatorConfiguration {
    pub fn new(elevator_type: ElevatorType) -> Self {
        ElevatorConfiguration {
            elevator_type,
            allowed_floors: BTreeSet::new(),
            floor_travel_time: Duration::from_secs(2),
            door_operation_time: Duration::from_secs(3),
        }
    }

    pub fn with_allowed_floors<I: IntoIterator<Item = i32>>(mut self, floors: I) -> Self {
        self.allowed_floors = floors.into_iter().collect();
        self
    }

    pub fn with_timing(mut self, floor_travel_time: Duration, door_operation_time: Duration) -> Self {
        self.floor_travel_time = floor_travel_time;
        self.door_operation_time = door_operation_time;
        self
    }

    /// Lowest allowed floor, or the ground floor for an unrestricted car.
    pub fn spawn_floor(&self) -> i32 {
        self.allowed_floors.iter().next().copied().unwrap_or(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrestricted_car_spawns_on_ground_floor() {
        let config = ElevatorConfiguration::new(ElevatorType::Local);
        assert!(config.allowed_floors.is_empty());
        assert_eq!(config.spawn_floor(), 1);
    }

    #[test]
    fn restricted_car_spawns_on_lowest_allowed_floor() {
        let config = ElevatorConfiguration::new(ElevatorType::Express)
            .with_allowed_floors([20, 10, 15]);
        assert_eq!(config.allowed_floors.len(), 3);
        assert_eq!(config.spawn_floor(), 10);
    }
}
