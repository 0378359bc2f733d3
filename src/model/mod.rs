//! Pure data structures: coordinates, statuses, timelines and the tracked order
//! itself, which implements the [`ActorEntity`](crate::framework::ActorEntity) trait.

pub mod geo;
pub mod order;
pub mod route;
pub mod status;
pub mod timeline;

pub use geo::*;
pub use order::*;
pub use route::*;
pub use status::*;
pub use timeline::*;
