use std::collections::BTreeSet;

use uuid::Uuid;

use super::elevator_config::ElevatorType;
use super::elevator_state::ElevatorState;

/// Point-in-time view of one car, as seen by the dispatcher and the console.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
pub struct ElevatorSnapshot {
    pub id: Uuid,
    pub index: usize,
    pub elevator_type: ElevatorType,
    pub floor: i32,
    pub state: ElevatorState,
    pub pending: usize,
    pub allowed_floors: BTreeSet<i32>,
}

impl ElevatorSnapshot {
    pub fn is_restricted(&self) -> bool {
        !self.allowed_floors.is_empty()
    }

    /// An unrestricted car serves every floor.
    pub fn serves_floor(&self, floor: i32) -> bool {
        !self.is_restricted() || self.allowed_floors.contains(&floor)
    }

    pub fn allowed_floors_as_string(&self) -> String {
        if !self.is_restricted() {
            return String::from("all");
        }
        self.allowed_floors
            .iter()
            .map(|floor| floor.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(allowed_floors: &[i32]) -> ElevatorSnapshot {
        ElevatorSnapshot {
            id: Uuid::new_v4(),
            index: 0,
            elevator_type: ElevatorType::Freight,
            floor: 1,
            state: ElevatorState::Idle,
            pending: 0,
            allowed_floors: allowed_floors.iter().copied().collect(),
        }
    }

    #[test]
    fn unrestricted_car_serves_every_floor() {
        let unrestricted = snapshot(&[]);
        assert!(!unrestricted.is_restricted());
        assert!(unrestricted.serves_floor(-3));
        assert!(unrestricted.serves_floor(40));
        assert_eq!(unrestricted.allowed_floors_as_string(), "all");
    }

    #[test]
    fn restricted_car_serves_only_its_floors() {
        let freight = snapshot(&[5, 1, 3]);
        assert!(freight.is_restricted());
        assert!(freight.serves_floor(3));
        assert!(!freight.serves_floor(4));
        assert_eq!(freight.allowed_floors_as_string(), "1,3,5");
    }
}
