pub mod direction;
pub mod event;
pub mod notice;
