//! Admin server HTTP handlers.

mod health;
mod trigger;

pub use health::health_handler;
pub use trigger::trigger_handler;
