use std::collections::VecDeque;

use log::{debug, info, warn};

use crate::config::{Building, Floor};
use crate::elevator::{Elevator, ElevatorId};
use crate::error::DispatchError;
use crate::observer::{CabinPanel, StateObserver};
use crate::types::direction::DirectionState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stop {
    pub elevator: ElevatorId,
    pub floor: Floor,
}

/// Remembers every arrival before handing the cabin request on.
struct RecordingPanel<'a> {
    inner: &'a mut dyn CabinPanel,
    stops: &'a mut Vec<Stop>,
}

impl CabinPanel for RecordingPanel<'_> {
    fn request(&mut self, elevator: ElevatorId, floor: Floor) -> Option<Floor> {
        self.stops.push(Stop { elevator, floor });
        self.inner.request(elevator, floor)
    }
}

/// Owns the fleet and the backlog of calls nobody could take yet.
///
/// Elevators report state changes into a queue that every public operation
/// drains before returning, so callers always observe a settled system.
#[derive(Debug, Default)]
pub struct Controller {
    building: Building,
    elevators: Vec<Elevator>,
    backlog: Vec<Floor>,
}

impl Controller {
    pub fn new(building: Building) -> Self {
        Controller {
            building,
            elevators: Vec::new(),
            backlog: Vec::new(),
        }
    }

    pub fn building(&self) -> Building {
        self.building
    }

    pub fn elevators(&self) -> &[Elevator] {
        &self.elevators
    }

    pub fn elevator(&self, id: ElevatorId) -> Option<&Elevator> {
        self.index(id).map(|idx| &self.elevators[idx])
    }

    pub fn backlog(&self) -> &[Floor] {
        &self.backlog
    }

    pub fn add_elevator(&mut self, current_level: Floor) -> Result<ElevatorId, DispatchError> {
        self.building.validate_floor(current_level)?;
        let id = ElevatorId(self.elevators.len() + 1);
        self.elevators.push(Elevator::new(id, self.building, current_level));
        info!("elevator {id} added at floor {current_level}");
        Ok(id)
    }

    pub fn create_elevators(&mut self, count: usize) -> Vec<ElevatorId> {
        let min_floor = self.building.min_floor();
        (0..count)
            .filter_map(|_| self.add_elevator(min_floor).ok())
            .collect()
    }

    fn index(&self, id: ElevatorId) -> Option<usize> {
        id.0.checked_sub(1).filter(|&idx| idx < self.elevators.len())
    }

    fn try_index(&self, id: ElevatorId) -> Result<usize, DispatchError> {
        self.index(id).ok_or(DispatchError::UnknownElevator(id))
    }

    /// Hall call from `level` wanting to go `direction`.
    ///
    /// Returns the elevator that will stop there, or `None` if the call went
    /// to the backlog.
    pub fn call(
        &mut self,
        level: Floor,
        direction: DirectionState,
    ) -> Result<Option<ElevatorId>, DispatchError> {
        if let Err(e) = self.building.validate_call(level, direction) {
            warn!("call rejected: {e}");
            return Err(e);
        }

        if let Some(owner) = self.elevators.iter().find(|e| e.has_stop(level)) {
            debug!("floor {level} already pending on elevator {}", owner.id());
            return Ok(Some(owner.id()));
        }
        if self.backlog.contains(&level) {
            debug!("floor {level} already in backlog");
            return Ok(None);
        }

        match self.decide_elevator(level, direction) {
            Some(id) => {
                debug!("floor {level} {direction:?} assigned to elevator {id}");
                let mut changes: VecDeque<ElevatorId> = VecDeque::new();
                if let Some(idx) = self.index(id) {
                    self.elevators[idx].add_floor(level, &mut changes);
                }
                self.settle(changes);
                Ok(Some(id))
            }
            None => {
                debug!("floor {level} {direction:?} backlogged");
                self.backlog.push(level);
                Ok(None)
            }
        }
    }

    /// Best-placed elevator for a call. Ties go to the lowest id.
    pub fn decide_elevator(&self, level: Floor, direction: DirectionState) -> Option<ElevatorId> {
        let mut best = None;
        let mut best_distance = self.building.floors_count();
        for elevator in &self.elevators {
            if let Some(priority) = elevator.priority(level, direction) {
                if priority < best_distance {
                    best_distance = priority;
                    best = Some(elevator.id());
                }
            }
        }
        best
    }

    /// Floor request from inside the cabin of `id`. The elevator now owns the
    /// floor, so it leaves the backlog.
    pub fn press(&mut self, id: ElevatorId, level: Floor) -> Result<(), DispatchError> {
        let idx = self.try_index(id)?;
        self.building.validate_floor(level)?;
        let mut changes: VecDeque<ElevatorId> = VecDeque::new();
        self.elevators[idx].add_floor(level, &mut changes);
        self.backlog.retain(|&pending| pending != level);
        self.settle(changes);
        Ok(())
    }

    /// Reacts to `id` changing state, as its elevator would have reported.
    pub fn notify_state_change(&mut self, id: ElevatorId) -> Result<(), DispatchError> {
        self.try_index(id)?;
        self.settle(VecDeque::from([id]));
        Ok(())
    }

    /// Hands the nearest backlog floor to an elevator that just went idle.
    pub fn decide_from_queue(&mut self, id: ElevatorId) -> Result<bool, DispatchError> {
        let idx = self.try_index(id)?;
        let mut changes: VecDeque<ElevatorId> = VecDeque::new();
        let assigned = self.assign_nearest(idx, &mut changes);
        self.settle(changes);
        Ok(assigned)
    }

    /// Sweeps every backlog floor the elevator can now take on its way.
    pub fn add_from_queue(&mut self, id: ElevatorId) -> Result<(), DispatchError> {
        let idx = self.try_index(id)?;
        let mut changes: VecDeque<ElevatorId> = VecDeque::new();
        self.assign_reachable(idx, &mut changes);
        self.settle(changes);
        Ok(())
    }

    pub fn progress(&mut self, count: usize, panel: &mut dyn CabinPanel) -> Vec<Stop> {
        let mut stops = Vec::new();
        for _ in 0..count {
            for idx in 0..self.elevators.len() {
                let mut changes: VecDeque<ElevatorId> = VecDeque::new();
                let mut recorder = RecordingPanel {
                    inner: &mut *panel,
                    stops: &mut stops,
                };
                self.elevators[idx].step(&mut recorder, &mut changes);
                self.settle(changes);
            }
        }
        stops
    }

    fn settle(&mut self, mut changes: VecDeque<ElevatorId>) {
        while let Some(id) = changes.pop_front() {
            if let Some(idx) = self.index(id) {
                self.handle_state_change(idx, &mut changes);
            }
        }
    }

    fn handle_state_change(&mut self, idx: usize, changes: &mut dyn StateObserver) {
        if self.elevators[idx].is_idle() {
            // a backlog floor at the car's own level leaves it idle; it has
            // already re-reported itself and picks again on the next pass
            if self.assign_nearest(idx, changes) && !self.elevators[idx].is_idle() {
                self.assign_reachable(idx, changes);
            }
        } else {
            self.assign_reachable(idx, changes);
        }
    }

    fn assign_nearest(&mut self, idx: usize, changes: &mut dyn StateObserver) -> bool {
        let elevator = &self.elevators[idx];
        let closest = self
            .backlog
            .iter()
            .enumerate()
            .min_by_key(|&(_, &level)| elevator.distance(level))
            .map(|(pos, _)| pos);

        match closest {
            Some(pos) => {
                let level = self.backlog.remove(pos);
                debug!("backlog floor {level} handed to elevator {}", elevator.id());
                self.elevators[idx].add_floor(level, changes);
                true
            }
            None => false,
        }
    }

    fn assign_reachable(&mut self, idx: usize, changes: &mut dyn StateObserver) {
        let snapshot = self.backlog.clone();
        let mut taken = Vec::new();
        for level in snapshot {
            let elevator = &mut self.elevators[idx];
            if elevator.priority(level, elevator.state()).is_some() {
                debug!("backlog floor {level} swept up by elevator {}", elevator.id());
                elevator.add_floor(level, changes);
                taken.push(level);
            }
        }
        self.backlog.retain(|level| !taken.contains(level));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::EmptyCabin;

    fn two_elevators() -> Controller {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut controller = Controller::new(Building::default());
        controller.create_elevators(2);
        controller
    }

    fn elevator(controller: &Controller, id: usize) -> &Elevator {
        controller.elevator(ElevatorId(id)).unwrap()
    }

    fn assert_settled(controller: &Controller) {
        for elevator in controller.elevators() {
            let empty = elevator.active_stops().is_empty() && elevator.deferred_stops().is_empty();
            assert_eq!(elevator.is_idle(), empty, "{elevator:?}");
        }
        for level in controller.backlog() {
            assert!(controller.elevators().iter().all(|e| !e.has_stop(*level)));
        }
    }

    #[test]
    fn idle_tie_goes_to_lowest_id() {
        let mut controller = two_elevators();

        let assigned = controller.call(5, DirectionState::Up).unwrap();

        assert_eq!(assigned, Some(ElevatorId(1)));
        let first = elevator(&controller, 1);
        assert_eq!(first.distance(5), 5);
        assert_eq!(first.state(), DirectionState::Up);
        assert_eq!(first.active_stops(), vec![5]);
        assert!(elevator(&controller, 2).is_idle());
        assert_settled(&controller);
    }

    #[test]
    fn floor_in_way_joins_active_queue() {
        let mut controller = Controller::new(Building::default());
        let a = controller.add_elevator(3).unwrap();
        controller.press(a, 7).unwrap();

        assert_eq!(controller.call(5, DirectionState::Up).unwrap(), Some(a));
        assert_eq!(elevator(&controller, 1).active_stops(), vec![5, 7]);
    }

    #[test]
    fn floor_behind_goes_to_backlog() {
        let mut controller = Controller::new(Building::default());
        let a = controller.add_elevator(3).unwrap();
        controller.press(a, 7).unwrap();

        assert_eq!(controller.call(2, DirectionState::Up).unwrap(), None);
        assert_eq!(controller.backlog(), &[2]);
        assert_eq!(elevator(&controller, 1).active_stops(), vec![7]);
        assert_settled(&controller);
    }

    #[test]
    fn idle_elevator_takes_nearest_backlog_floor() {
        let mut controller = Controller::new(Building::default());
        let a = controller.add_elevator(5).unwrap();
        controller.press(a, 8).unwrap();
        assert_eq!(controller.call(2, DirectionState::Up).unwrap(), None);
        assert_eq!(controller.call(9, DirectionState::Down).unwrap(), None);
        assert_eq!(controller.backlog(), &[2, 9]);

        let stops = controller.progress(3, &mut EmptyCabin);

        assert_eq!(stops, vec![Stop { elevator: a, floor: 8 }]);
        let a = elevator(&controller, 1);
        assert_eq!(a.state(), DirectionState::Up);
        assert_eq!(a.active_stops(), vec![9]);
        assert_eq!(controller.backlog(), &[2]);
        assert_settled(&controller);
    }

    #[test]
    fn notify_on_idle_elevator_drains_backlog() {
        let mut controller = Controller::new(Building::default());
        let a = controller.add_elevator(5).unwrap();
        controller.press(a, 6).unwrap();
        controller.call(1, DirectionState::Up).unwrap();
        controller.call(3, DirectionState::Up).unwrap();
        controller.progress(1, &mut EmptyCabin);

        // arrival at 6 already pulled 3, then swept 1 on the way down
        let a = elevator(&controller, 1);
        assert_eq!(a.state(), DirectionState::Down);
        assert_eq!(a.active_stops(), vec![3, 1]);
        assert!(controller.backlog().is_empty());

        controller.notify_state_change(ElevatorId(1)).unwrap();
        assert_eq!(elevator(&controller, 1).active_stops(), vec![3, 1]);
    }

    #[test]
    fn decide_from_queue_prefers_earliest_on_tie() {
        let mut parked = Controller::new(Building::default());
        let b = parked.add_elevator(5).unwrap();
        parked.backlog = vec![7, 3];
        assert!(parked.decide_from_queue(b).unwrap());
        assert_eq!(parked.backlog(), &[3]);
        assert_eq!(elevator(&parked, 1).state(), DirectionState::Up);
        assert_eq!(elevator(&parked, 1).active_stops(), vec![7]);
    }

    #[test]
    fn press_for_backlogged_floor_claims_it() {
        let mut controller = Controller::new(Building::default());
        let a = controller.add_elevator(3).unwrap();
        let b = controller.add_elevator(5).unwrap();
        controller.press(a, 7).unwrap();
        controller.press(b, 6).unwrap();
        assert_eq!(controller.call(2, DirectionState::Up).unwrap(), None);

        controller.press(a, 2).unwrap();

        assert!(controller.backlog().is_empty());
        assert_eq!(elevator(&controller, 1).deferred_stops(), vec![2]);
        assert_settled(&controller);

        controller.progress(1, &mut EmptyCabin);

        assert!(elevator(&controller, 2).is_idle());
        assert!(!elevator(&controller, 2).has_stop(2));
        assert!(elevator(&controller, 1).has_stop(2));
        assert_settled(&controller);
    }

    #[test]
    fn idle_car_on_backlogged_floor_still_takes_nearest() {
        let mut controller = Controller::new(Building::default());
        let a = controller.add_elevator(5).unwrap();
        controller.backlog = vec![1, 5, 6];

        controller.notify_state_change(a).unwrap();

        let a = elevator(&controller, 1);
        assert_eq!(a.state(), DirectionState::Up);
        assert_eq!(a.active_stops(), vec![6]);
        assert!(a.deferred_stops().is_empty());
        assert_eq!(controller.backlog(), &[1]);
        assert_settled(&controller);
    }

    #[test]
    fn add_from_queue_takes_only_floors_in_way() {
        let mut controller = Controller::new(Building::default());
        let a = controller.add_elevator(4).unwrap();
        controller.press(a, 5).unwrap();
        controller.backlog = vec![2, 9, 6, 3, 8];

        controller.add_from_queue(a).unwrap();

        assert_eq!(elevator(&controller, 1).active_stops(), vec![5, 6, 8, 9]);
        assert_eq!(controller.backlog(), &[2, 3]);
    }

    #[test]
    fn pending_floor_is_not_assigned_twice() {
        let mut controller = two_elevators();
        controller.call(6, DirectionState::Up).unwrap();
        controller.progress(4, &mut EmptyCabin);

        // elevator 1 cannot take a down call, but 6 is already on its way
        assert_eq!(controller.call(6, DirectionState::Down).unwrap(), Some(ElevatorId(1)));
        assert!(elevator(&controller, 2).is_idle());

        let mut busy = Controller::new(Building::default());
        let a = busy.add_elevator(3).unwrap();
        busy.press(a, 7).unwrap();
        busy.call(1, DirectionState::Up).unwrap();
        busy.call(1, DirectionState::Up).unwrap();
        assert_eq!(busy.backlog(), &[1]);
    }

    #[test]
    fn zero_distance_beats_everyone() {
        let mut controller = Controller::new(Building::default());
        controller.add_elevator(0).unwrap();
        let b = controller.add_elevator(4).unwrap();

        assert_eq!(controller.decide_elevator(4, DirectionState::Up), Some(b));
        assert_eq!(controller.call(4, DirectionState::Up).unwrap(), Some(b));
        assert!(elevator(&controller, 2).is_idle());
    }

    #[test]
    fn invalid_calls_are_rejected() {
        let mut controller = two_elevators();

        assert_eq!(
            controller.call(10, DirectionState::Up),
            Err(DispatchError::UpFromTopFloor(10))
        );
        assert_eq!(
            controller.call(0, DirectionState::Down),
            Err(DispatchError::DownFromBottomFloor(0))
        );
        assert!(matches!(
            controller.call(11, DirectionState::Down),
            Err(DispatchError::FloorOutOfRange { floor: 11, .. })
        ));
        assert_eq!(
            controller.press(ElevatorId(3), 4),
            Err(DispatchError::UnknownElevator(ElevatorId(3)))
        );
        assert!(controller.backlog().is_empty());
        assert!(controller.elevators().iter().all(Elevator::is_idle));
    }

    #[test]
    fn top_floor_arrival_goes_idle_and_stays_served() {
        let mut controller = Controller::new(Building::default());
        let a = controller.add_elevator(9).unwrap();
        controller.call(10, DirectionState::Down).unwrap();

        let stops = controller.progress(3, &mut EmptyCabin);

        assert_eq!(stops, vec![Stop { elevator: a, floor: 10 }]);
        assert!(elevator(&controller, 1).is_idle());
        assert_eq!(controller.call(10, DirectionState::Down).unwrap(), Some(a));
        assert!(elevator(&controller, 1).is_idle());
        assert!(controller.backlog().is_empty());
    }

    #[test]
    fn backlog_converges_under_steady_motion() {
        let mut controller = two_elevators();
        let calls = [
            (5, DirectionState::Up),
            (2, DirectionState::Down),
            (9, DirectionState::Down),
            (1, DirectionState::Up),
            (7, DirectionState::Up),
            (3, DirectionState::Down),
            (8, DirectionState::Down),
        ];
        let mut stops = Vec::new();
        for (level, direction) in calls {
            controller.call(level, direction).unwrap();
            stops.extend(controller.progress(1, &mut EmptyCabin));
            assert_settled(&controller);
        }
        for _ in 0..60 {
            stops.extend(controller.progress(1, &mut EmptyCabin));
            assert_settled(&controller);
        }

        assert!(controller.backlog().is_empty());
        assert!(controller.elevators().iter().all(Elevator::is_idle));
        for (level, _) in calls {
            assert!(stops.iter().any(|s| s.floor == level), "floor {level} never served");
        }
    }

    #[test]
    fn cabin_requests_after_arrival_keep_the_car_busy() {
        let mut controller = Controller::new(Building::default());
        let a = controller.add_elevator(0).unwrap();
        controller.call(3, DirectionState::Up).unwrap();

        let mut panel = |_: ElevatorId, floor: Floor| -> Option<Floor> {
            match floor {
                3 => Some(6),
                6 => Some(1),
                _ => None,
            }
        };
        let stops = controller.progress(20, &mut panel);

        let floors: Vec<Floor> = stops.iter().map(|s| s.floor).collect();
        assert_eq!(floors, vec![3, 6, 1]);
        assert!(stops.iter().all(|s| s.elevator == a));
        assert!(elevator(&controller, 1).is_idle());
    }
}
