use std::cmp::Ordering;

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Down,
    None,
    Up,
}

impl Direction {
    /// Direction of travel needed to get from `from` to `to`.
    pub fn between(from: i32, to: i32) -> Self {
        match to.cmp(&from) {
            Ordering::Greater => Direction::Up,
            Ordering::Less => Direction::Down,
            Ordering::Equal => Direction::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_follows_floor_order() {
        assert_eq!(Direction::between(1, 10), Direction::Up);
        assert_eq!(Direction::between(7, -1), Direction::Down);
        assert_eq!(Direction::between(3, 3), Direction::None);
    }
}
