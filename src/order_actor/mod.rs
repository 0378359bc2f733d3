//! # Order Actor
//!
//! Owns every [`TrackedOrder`] and applies status changes, driver fixes and route
//! estimates to them.
//!
//! ## Structure
//!
//! - [`entity`] - [`ActorEntity`](crate::framework::ActorEntity) implementation for [`TrackedOrder`]
//! - [`error`] - [`OrderError`]
//! - [`actions`] - [`OrderAction`] and [`OrderActionResult`]
//! - [`new()`] - Factory function that creates the actor and client
//!
//! ## Usage
//!
//! ```rust,no_run
//! use delivery_tracker::clients::TrackingClient;
//! use delivery_tracker::model::{Coordinate, EstimatorSettings, OrderCreate};
//! use delivery_tracker::order_actor;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (actor, generic_client) = order_actor::new(32);
//!     let client = TrackingClient::new(generic_client);
//!     tokio::spawn(actor.run(EstimatorSettings::default()));
//!
//!     let id = client
//!         .create_order(OrderCreate {
//!             customer_address: "Av. Providencia 1234".into(),
//!             items: vec!["Premium board".into()],
//!             total: 41_000,
//!             destination: Coordinate::new(-33.4489, -70.6693),
//!             driver: None,
//!             driver_location: None,
//!         })
//!         .await?;
//!     client.advance_status(id).await?;
//!     Ok(())
//! }
//! ```

pub mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;

use crate::framework::{ResourceActor, ResourceClient};
use crate::model::TrackedOrder;

/// Creates a new order actor and its client.
pub fn new(buffer_size: usize) -> (ResourceActor<TrackedOrder>, ResourceClient<TrackedOrder>) {
    ResourceActor::new(buffer_size)
}
