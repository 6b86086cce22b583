use std::collections::VecDeque;

use crate::config::Floor;
use crate::elevator::ElevatorId;

/// Receives an elevator's id whenever its direction state changes.
pub trait StateObserver {
    fn on_state_change(&mut self, elevator: ElevatorId);
}

impl StateObserver for VecDeque<ElevatorId> {
    fn on_state_change(&mut self, elevator: ElevatorId) {
        self.push_back(elevator);
    }
}

/// The in-cabin keypad, consulted each time an elevator stops at a floor.
pub trait CabinPanel {
    fn request(&mut self, elevator: ElevatorId, floor: Floor) -> Option<Floor>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyCabin;

impl CabinPanel for EmptyCabin {
    fn request(&mut self, _elevator: ElevatorId, _floor: Floor) -> Option<Floor> {
        None
    }
}

impl<F> CabinPanel for F
where
    F: FnMut(ElevatorId, Floor) -> Option<Floor>,
{
    fn request(&mut self, elevator: ElevatorId, floor: Floor) -> Option<Floor> {
        self(elevator, floor)
    }
}
