//! Driver movement simulation.
//!
//! - [`LocationSource`] - the seam a position provider plugs into
//! - [`SimulatedDriver`] - a source that moves by [`MovementStrategy`] on every poll
//! - [`LocationTicker`] - the periodic task feeding fixes to the order actor

pub mod driver;
pub mod source;
pub mod ticker;

pub use driver::*;
pub use source::*;
pub use ticker::*;
