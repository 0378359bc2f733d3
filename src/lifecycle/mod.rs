//! Startup, settings and shutdown of the tracking system.

pub mod config;
pub mod tracing;
pub mod tracking_system;

pub use config::*;
pub use self::tracing::setup_tracing;
pub use tracking_system::*;
