use std::fmt;

#[derive(serde::Serialize, serde::Deserialize, PartialEq, Eq, Debug, Clone, Copy, Hash)]
pub enum ElevatorState {
    Idle,
    MovingUp,
    MovingDown,
    DoorsOpening,
    DoorsOpen,
    DoorsClosing,
    Maintenance,
    OutOfService,
}

impl ElevatorState {
    pub fn as_string(&self) -> String {
        match self {
            ElevatorState::Idle => String::from("idle"),
            ElevatorState::MovingUp => String::from("movingUp"),
            ElevatorState::MovingDown => String::from("movingDown"),
            ElevatorState::DoorsOpening => String::from("doorsOpening"),
            ElevatorState::DoorsOpen => String::from("doorsOpen"),
            ElevatorState::DoorsClosing => String::from("doorsClosing"),
            ElevatorState::Maintenance => String::from("maintenance"),
            ElevatorState::OutOfService => String::from("outOfService"),
        }
    }

    /// Administrative states: the unit keeps its loop alive but serves nothing.
    pub fn is_suspended(&self) -> bool {
        matches!(self, ElevatorState::Maintenance | ElevatorState::OutOfService)
    }
}

impl fmt::Display for ElevatorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_string())
    }
}
