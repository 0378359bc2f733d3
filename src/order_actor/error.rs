//! Error types for the order actor.

use crate::model::OrderStatus;
use thiserror::Error;

/// Errors that can occur during order operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    /// The requested order was not found.
    #[error("Order not found: {0}")]
    NotFound(String),

    /// The requested status change is not allowed from the current status.
    #[error("Invalid transition: {from} -> {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// The order is delivered or cancelled and no longer accepts changes.
    #[error("Order {id} is closed ({status})")]
    OrderClosed { id: String, status: OrderStatus },

    /// A coordinate outside the valid latitude/longitude ranges.
    #[error("Invalid coordinate: ({latitude}, {longitude})")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    /// A route was requested before any driver fix arrived.
    #[error("No driver location for order {0}")]
    NoDriverLocation(String),

    /// The actor answered with a result for a different action.
    #[error("Unexpected action result: {0}")]
    UnexpectedResult(String),

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}
