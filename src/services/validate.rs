use log::warn;
use tower::BoxError;
use tower::filter::Predicate;

use crate::config::Building;
use crate::types::event::Event;

/// Drops events naming floors or cars that do not exist before they reach
/// the dispatcher.
#[derive(Debug, Clone)]
pub struct FloorBounds {
    building: Building,
    elevators: usize,
}

impl FloorBounds {
    pub fn new(building: Building, elevators: usize) -> Self {
        FloorBounds {
            building,
            elevators,
        }
    }
}

impl Predicate<Event> for FloorBounds {
    type Request = Event;

    fn check(&mut self, event: Event) -> Result<Self::Request, BoxError> {
        let valid = match event {
            Event::HallUp(f) | Event::HallDown(f) => self.building.contains(f),
            Event::CabinPressed(elevator, f) => {
                (1..=self.elevators).contains(&elevator.0) && self.building.contains(f)
            }
            Event::Tick(count) => {
                u32::try_from(count).is_ok_and(|c| c <= self.building.floors_count())
            }
        };
        if !valid {
            warn!("invalid event: {event:?}");
            return Err(BoxError::from("invalid event"));
        }
        Ok(event)
    }
}
