//! Generic actor framework the tracker is built on.
//!
//! # Main Components
//!
//! - [`ActorEntity`] - Trait that resource types implement to be managed by actors
//! - [`ResourceActor`] - Generic actor that owns the entities
//! - [`ResourceClient`] - Type-safe handle for sending requests
//! - [`FrameworkError`] - Common error types
//!
//! # Testing
//!
//! See [`mock`] for utilities to test clients without spawning a real actor.

pub mod core;
pub mod mock;

pub use self::core::*;
