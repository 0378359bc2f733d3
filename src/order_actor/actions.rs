//! Custom actions for the order actor.
//!
//! These are the operations on a [`TrackedOrder`](crate::model::TrackedOrder) that
//! go beyond CRUD: walking the status timeline, cancelling, accepting driver fixes
//! and deriving the route estimate. They are handled by
//! [`ActorEntity::handle_action`](crate::framework::ActorEntity::handle_action).

use crate::model::{Coordinate, OrderStatus, RouteEstimate};

#[derive(Debug, Clone)]
pub enum OrderAction {
    /// Moves the order one step along its timeline ("simulate update").
    AdvanceStatus,
    /// Short-circuits the order to `Cancelled`.
    Cancel,
    /// Records a new driver fix.
    ReportLocation(Coordinate),
    /// Distance and ETA from the latest driver fix to the drop-off.
    EstimateRoute,
}

/// Results from [`OrderAction`]s - variants match 1:1 with the actions.
#[derive(Debug, Clone)]
pub enum OrderActionResult {
    AdvanceStatus(StatusChange),
    Cancel(StatusChange),
    /// Speed in km/h derived from the last two fixes, once there are two.
    ReportLocation(Option<f64>),
    EstimateRoute(RouteEstimate),
}

/// Outcome of a status transition request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub from: OrderStatus,
    pub to: OrderStatus,
}

impl StatusChange {
    pub fn changed(&self) -> bool {
        self.from != self.to
    }
}
