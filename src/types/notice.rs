use std::fmt;
use std::fmt::Display;

use crate::config::Floor;
use crate::elevator::ElevatorId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Assigned { elevator: ElevatorId, floor: Floor },
    Backlogged(Floor),
    Rejected(Floor),
    Stopped { elevator: ElevatorId, floor: Floor },
}

impl Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Assigned { elevator, floor } => write!(f, "A{elevator}:{floor}"),
            Notice::Backlogged(floor) => write!(f, "B{floor}"),
            Notice::Rejected(floor) => write!(f, "X{floor}"),
            Notice::Stopped { elevator, floor } => write!(f, "S{elevator}:{floor}"),
        }
    }
}
