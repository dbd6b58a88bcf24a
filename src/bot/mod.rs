//! Discord side of the relay: trigger filter, status notices, event handler.

pub mod handler;
pub mod notices;
pub mod trigger;

pub use handler::Handler;
