use thiserror::Error;

use crate::config::Floor;
use crate::elevator::ElevatorId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("floor {floor} is outside [{min}, {max}]")]
    FloorOutOfRange { floor: i32, min: i32, max: i32 },
    #[error("no up call from the top floor {0}")]
    UpFromTopFloor(Floor),
    #[error("no down call from the bottom floor {0}")]
    DownFromBottomFloor(Floor),
    #[error("call at floor {0} has no direction")]
    NoDirection(Floor),
    #[error("no elevator with id {0}")]
    UnknownElevator(ElevatorId),
    #[error("invalid building: min floor {min} is above max floor {max}")]
    InvalidBuilding { min: i32, max: i32 },
}
