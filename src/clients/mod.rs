//! Type-safe wrappers around [`ResourceClient`](crate::framework::ResourceClient).

pub mod actor_client;
pub mod tracking_client;

pub use actor_client::*;
pub use tracking_client::*;
