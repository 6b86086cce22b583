use crate::error::DispatchError;
use crate::types::direction::DirectionState;

pub type Floor = i32;

pub const MIN_FLOOR: Floor = 0;
pub const MAX_FLOOR: Floor = 10;

/// Floor bounds shared by the controller and every elevator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Building {
    min_floor: Floor,
    max_floor: Floor,
}

impl Default for Building {
    fn default() -> Self {
        Building {
            min_floor: MIN_FLOOR,
            max_floor: MAX_FLOOR,
        }
    }
}

impl Building {
    pub fn new(min_floor: Floor, max_floor: Floor) -> Result<Self, DispatchError> {
        if min_floor > max_floor || max_floor.abs_diff(min_floor) == u32::MAX {
            return Err(DispatchError::InvalidBuilding {
                min: min_floor,
                max: max_floor,
            });
        }
        Ok(Building {
            min_floor,
            max_floor,
        })
    }

    pub fn min_floor(&self) -> Floor {
        self.min_floor
    }

    pub fn max_floor(&self) -> Floor {
        self.max_floor
    }

    /// Number of floors served, also an upper bound no distance can reach.
    pub fn floors_count(&self) -> u32 {
        self.max_floor.abs_diff(self.min_floor) + 1
    }

    pub fn contains(&self, level: Floor) -> bool {
        (self.min_floor..=self.max_floor).contains(&level)
    }

    pub fn validate_floor(&self, level: Floor) -> Result<(), DispatchError> {
        if self.contains(level) {
            Ok(())
        } else {
            Err(DispatchError::FloorOutOfRange {
                floor: level,
                min: self.min_floor,
                max: self.max_floor,
            })
        }
    }

    /// Checks a hall call: the floor must exist and the building must extend
    /// in the requested direction.
    pub fn validate_call(&self, level: Floor, direction: DirectionState) -> Result<(), DispatchError> {
        match direction {
            DirectionState::Up if level == self.max_floor => {
                Err(DispatchError::UpFromTopFloor(level))
            }
            DirectionState::Down if level == self.min_floor => {
                Err(DispatchError::DownFromBottomFloor(level))
            }
            DirectionState::Idle => Err(DispatchError::NoDirection(level)),
            _ => self.validate_floor(level),
        }
    }
}
