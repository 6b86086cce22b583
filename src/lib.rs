pub mod config;
pub mod controller;
pub mod elevator;
pub mod error;
pub mod observer;
pub mod services;
pub mod types;

pub use config::{Building, Floor};
pub use controller::{Controller, Stop};
pub use elevator::{Elevator, ElevatorId};
pub use error::DispatchError;
pub use observer::{CabinPanel, EmptyCabin, StateObserver};
pub use types::direction::DirectionState;
pub use types::event::Event;
pub use types::notice::Notice;
