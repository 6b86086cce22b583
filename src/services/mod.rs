pub mod dispatch;
pub mod panel;
pub mod sink;
pub mod udp_event;
pub mod validate;
