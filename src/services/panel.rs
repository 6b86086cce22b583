use std::collections::{HashMap, VecDeque};

use crate::config::Floor;
use crate::elevator::ElevatorId;
use crate::observer::CabinPanel;

/// Cabin buttons pressed while a car was travelling. One is released per
/// stop, the rest once the car goes idle.
#[derive(Debug, Default)]
pub struct PanelBuffer {
    pressed: HashMap<ElevatorId, VecDeque<Floor>>,
}

impl PanelBuffer {
    pub fn push(&mut self, elevator: ElevatorId, floor: Floor) {
        let pressed = self.pressed.entry(elevator).or_default();
        if !pressed.contains(&floor) {
            pressed.push_back(floor);
        }
    }

    pub fn drain(&mut self, elevator: ElevatorId) -> Vec<Floor> {
        self.pressed
            .remove(&elevator)
            .map(Vec::from)
            .unwrap_or_default()
    }

    pub fn pending(&self, elevator: ElevatorId) -> usize {
        self.pressed.get(&elevator).map_or(0, VecDeque::len)
    }
}

impl CabinPanel for PanelBuffer {
    fn request(&mut self, elevator: ElevatorId, _floor: Floor) -> Option<Floor> {
        self.pressed.get_mut(&elevator)?.pop_front()
    }
}
