use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::fmt;
use std::fmt::Display;

use log::{debug, info, warn};

use crate::config::{Building, Floor};
use crate::observer::{CabinPanel, StateObserver};
use crate::types::direction::{DirectionState, choose_state, reverse};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElevatorId(pub usize);

impl Display for ElevatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One car and its pending stops.
///
/// Stops are kept in two heaps: `up_queue` pops the lowest floor first and
/// `down_queue` pops the highest. Whichever heap matches the current travel
/// direction is the active queue, the other one holds the stops deferred
/// until the car reverses.
#[derive(Debug, Clone)]
pub struct Elevator {
    id: ElevatorId,
    building: Building,
    current_level: Floor,
    state: DirectionState,
    up_queue: BinaryHeap<Reverse<Floor>>,
    down_queue: BinaryHeap<Floor>,
}

impl Elevator {
    pub fn new(id: ElevatorId, building: Building, current_level: Floor) -> Self {
        debug_assert!(building.contains(current_level));
        Elevator {
            id,
            building,
            current_level,
            state: DirectionState::Idle,
            up_queue: BinaryHeap::new(),
            down_queue: BinaryHeap::new(),
        }
    }

    pub fn id(&self) -> ElevatorId {
        self.id
    }

    pub fn current_level(&self) -> Floor {
        self.current_level
    }

    pub fn state(&self) -> DirectionState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == DirectionState::Idle
    }

    /// Dispatch score for a call, lower is better. `None` when the car is
    /// travelling the other way or has already passed the floor.
    pub fn priority(&self, level: Floor, direction: DirectionState) -> Option<u32> {
        match self.state {
            DirectionState::Idle => Some(self.distance(level)),
            state if state == direction && self.is_floor_in_way(level) => {
                Some(self.distance(level))
            }
            _ => None,
        }
    }

    pub fn distance(&self, level: Floor) -> u32 {
        self.current_level.abs_diff(level)
    }

    pub fn is_floor_in_way(&self, level: Floor) -> bool {
        match self.state {
            DirectionState::Up => level >= self.current_level,
            DirectionState::Down => level <= self.current_level,
            DirectionState::Idle => false,
        }
    }

    pub fn next_stop(&self) -> Option<Floor> {
        match self.state {
            DirectionState::Up => self.up_queue.peek().map(|&Reverse(f)| f),
            DirectionState::Down => self.down_queue.peek().copied(),
            DirectionState::Idle => None,
        }
    }

    /// Active stops, nearest first.
    pub fn active_stops(&self) -> Vec<Floor> {
        self.stops_for(self.state)
    }

    /// Deferred stops in the order they will be served after reversing.
    pub fn deferred_stops(&self) -> Vec<Floor> {
        self.stops_for(reverse(self.state))
    }

    pub fn has_stop(&self, level: Floor) -> bool {
        self.up_queue.iter().any(|&Reverse(f)| f == level)
            || self.down_queue.iter().any(|&f| f == level)
    }

    fn stops_for(&self, direction: DirectionState) -> Vec<Floor> {
        match direction {
            DirectionState::Up => {
                let mut stops: Vec<Floor> = self.up_queue.iter().map(|&Reverse(f)| f).collect();
                stops.sort_unstable();
                stops
            }
            DirectionState::Down => {
                let mut stops: Vec<Floor> = self.down_queue.iter().copied().collect();
                stops.sort_unstable_by(|a, b| b.cmp(a));
                stops
            }
            DirectionState::Idle => Vec::new(),
        }
    }

    fn active_is_empty(&self) -> bool {
        match self.state {
            DirectionState::Up => self.up_queue.is_empty(),
            DirectionState::Down => self.down_queue.is_empty(),
            DirectionState::Idle => true,
        }
    }

    fn deferred_is_empty(&self) -> bool {
        match self.state {
            DirectionState::Up => self.down_queue.is_empty(),
            DirectionState::Down => self.up_queue.is_empty(),
            DirectionState::Idle => true,
        }
    }

    fn push_stop(&mut self, direction: DirectionState, level: Floor) {
        if self.has_stop(level) {
            debug!("elevator {}: floor {level} already queued", self.id);
            return;
        }
        match direction {
            DirectionState::Up => self.up_queue.push(Reverse(level)),
            DirectionState::Down => self.down_queue.push(level),
            DirectionState::Idle => {}
        }
    }

    fn pop_next_stop(&mut self) -> Option<Floor> {
        match self.state {
            DirectionState::Up => self.up_queue.pop().map(|Reverse(f)| f),
            DirectionState::Down => self.down_queue.pop(),
            DirectionState::Idle => None,
        }
    }

    /// Takes a floor request, either dispatched by the controller or pressed
    /// inside the cabin. Requesting the floor the car is on counts as served.
    pub fn add_floor(&mut self, level: Floor, observer: &mut dyn StateObserver) {
        debug_assert!(self.building.contains(level));
        if level == self.current_level {
            if self.active_is_empty() {
                self.check_queued_floors(observer);
            }
            return;
        }

        if self.state == DirectionState::Idle {
            self.state = choose_state(self.current_level, level);
            self.push_stop(self.state, level);
            info!(
                "elevator {} leaving floor {} {:?} for {level}",
                self.id, self.current_level, self.state
            );
            observer.on_state_change(self.id);
        } else if self.is_floor_in_way(level) {
            debug!("elevator {}: stop {level} on the way", self.id);
            self.push_stop(self.state, level);
        } else {
            debug!("elevator {}: stop {level} deferred", self.id);
            self.push_stop(reverse(self.state), level);
        }
    }

    /// Handles the car reaching its next stop.
    ///
    /// # Panics
    ///
    /// When there is no active stop or the car is not at it; both mean the
    /// motion driver and the queues disagree.
    pub fn arrived(&mut self, panel: &mut dyn CabinPanel, observer: &mut dyn StateObserver) {
        let floor = self.pop_next_stop();
        assert_eq!(
            floor,
            Some(self.current_level),
            "elevator {} arrived at {} without a matching stop",
            self.id,
            self.current_level
        );
        debug!("elevator {} stopped at floor {}", self.id, self.current_level);

        if let Some(level) = panel.request(self.id, self.current_level) {
            match self.building.validate_floor(level) {
                Ok(()) => self.add_floor(level, observer),
                Err(e) => warn!("elevator {}: cabin request ignored: {e}", self.id),
            }
        }

        if !self.is_idle() && self.active_is_empty() {
            self.check_queued_floors(observer);
        }
    }

    /// Called once the active queue runs dry, or when the car would leave the
    /// shaft. Turns around for deferred stops, otherwise goes idle.
    pub fn check_queued_floors(&mut self, observer: &mut dyn StateObserver) {
        if !self.deferred_is_empty() {
            self.state = reverse(self.state);
            info!(
                "elevator {} reversing {:?} at floor {}",
                self.id, self.state, self.current_level
            );
        } else if self.active_is_empty() {
            self.state = DirectionState::Idle;
            info!("elevator {} idle at floor {}", self.id, self.current_level);
        }
        observer.on_state_change(self.id);
    }

    pub fn step(&mut self, panel: &mut dyn CabinPanel, observer: &mut dyn StateObserver) {
        let target = match self.state {
            DirectionState::Up => self.current_level + 1,
            DirectionState::Down => self.current_level - 1,
            DirectionState::Idle => return,
        };
        if !self.building.contains(target) {
            self.check_queued_floors(observer);
            return;
        }

        self.current_level = target;
        if self.next_stop() == Some(target) {
            self.arrived(panel, observer);
        }
    }
}
