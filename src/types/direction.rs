use std::fmt;
use std::fmt::Display;

use crate::config::Floor;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectionState {
    #[default]
    Idle,
    Up,
    Down,
}

impl Display for DirectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DirectionState::Idle => write!(f, "I"),
            DirectionState::Up => write!(f, "U"),
            DirectionState::Down => write!(f, "D"),
        }
    }
}

pub fn reverse(state: DirectionState) -> DirectionState {
    match state {
        DirectionState::Up => DirectionState::Down,
        DirectionState::Down => DirectionState::Up,
        DirectionState::Idle => DirectionState::Idle,
    }
}

pub fn choose_state(from: Floor, to: Floor) -> DirectionState {
    match to.cmp(&from) {
        std::cmp::Ordering::Greater => DirectionState::Up,
        std::cmp::Ordering::Less => DirectionState::Down,
        std::cmp::Ordering::Equal => DirectionState::Idle,
    }
}
