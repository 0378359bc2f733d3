use crate::model::Coordinate;
use thiserror::Error;

/// Why a location fix could not be produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Location unavailable")]
    PositionUnavailable,
    #[error("Location request timed out")]
    Timeout,
}

/// Anything that can be polled for the driver's current position.
///
/// Polled once per ticker period. A failure ends the ticker; it is not retried.
pub trait LocationSource: Send + 'static {
    fn next_fix(&mut self) -> Result<Coordinate, LocationError>;
}

impl<F> LocationSource for F
where
    F: FnMut() -> Result<Coordinate, LocationError> + Send + 'static,
{
    fn next_fix(&mut self) -> Result<Coordinate, LocationError> {
        self()
    }
}
