//! # Delivery Tracker
//!
//! > **A simulated delivery: an order walking through its status timeline while a
//! > driver drifts toward the drop-off.**
//!
//! Everything is in memory and made up: orders are created with mock values, the
//! driver's GPS fix is perturbed on a timer, and distance and ETA are derived from
//! the two coordinates with the Haversine formula.
//!
//! ## Architecture Notes
//!
//! ### 1. One actor owns every order
//! Orders live inside a single [`ResourceActor`](framework::ResourceActor) task.
//! Status changes from the user and location fixes from the tickers arrive as
//! messages and are applied one at a time, so an order is never mutated
//! concurrently.
//!
//! ### 2. Tickers are separate tasks
//! Each tracked order gets a [`LocationTicker`](simulation::LocationTicker) that
//! polls a [`LocationSource`](simulation::LocationSource) on a Tokio interval and
//! reports the fix through the [`TrackingClient`](clients::TrackingClient).
//! Stopping or dropping its [`TickerHandle`](simulation::TickerHandle) ends the
//! task; no fix is reported afterwards.
//!
//! ### 3. Typed errors end to end
//! The entity returns [`OrderError`](order_actor::OrderError); the framework boxes
//! it into [`FrameworkError`](framework::FrameworkError) for transport and the
//! client unboxes it again, so callers match on the variant the entity returned.
//!
//! ### 4. Observability
//! `tracing` everywhere. Customer-facing status notifications are `info!` events.
//! See [`lifecycle::tracing`].
//!
//! ## Module Tour
//!
//! - [`framework`]: generic actor, client and mock.
//! - [`model`]: coordinates and geo maths, statuses, the timeline, the order DTOs.
//! - [`order_actor`]: the [`ActorEntity`](framework::ActorEntity) impl for
//!   [`TrackedOrder`](model::TrackedOrder).
//! - [`clients`]: the domain client.
//! - [`simulation`]: driver movement and the location ticker.
//! - [`lifecycle`]: [`TrackingSystem`](lifecycle::TrackingSystem), settings and
//!   logging setup.
//!
//! ## Running the Demo
//!
//! ```bash
//! RUST_LOG=info cargo run
//! ```

pub mod clients;
pub mod framework;
pub mod lifecycle;
pub mod model;
pub mod order_actor;
pub mod simulation;
