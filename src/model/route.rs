use super::geo::{estimate_minutes, format_eta, haversine_km, straight_route, Coordinate};
use serde::{Deserialize, Serialize};

/// Parameters for turning two coordinates into display figures.
///
/// Injected into the order actor as its runtime context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimatorSettings {
    pub average_speed_kmh: f64,
    pub route_steps: usize,
    pub arriving_km: f64,
    pub very_close_km: f64,
    /// Driver fixes kept per order.
    pub history_limit: usize,
}

impl Default for EstimatorSettings {
    fn default() -> Self {
        Self {
            average_speed_kmh: 25.0,
            route_steps: 10,
            arriving_km: 0.1,
            very_close_km: 0.5,
            history_limit: 50,
        }
    }
}

/// How close the driver is to the drop-off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Proximity {
    Arriving,
    VeryClose,
    EnRoute,
}

impl Proximity {
    pub fn classify(distance_km: f64, settings: &EstimatorSettings) -> Self {
        if distance_km < settings.arriving_km {
            Proximity::Arriving
        } else if distance_km < settings.very_close_km {
            Proximity::VeryClose
        } else {
            Proximity::EnRoute
        }
    }
}

impl std::fmt::Display for Proximity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Proximity::Arriving => write!(f, "Arriving"),
            Proximity::VeryClose => write!(f, "Very close"),
            Proximity::EnRoute => write!(f, "On the way"),
        }
    }
}

/// Distance, ETA and a straight-line route from the driver to the drop-off.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteEstimate {
    pub driver: Coordinate,
    pub destination: Coordinate,
    pub distance_km: f64,
    pub eta_minutes: u32,
    pub route: Vec<Coordinate>,
    pub proximity: Proximity,
}

impl RouteEstimate {
    pub fn compute(driver: &Coordinate, destination: &Coordinate, settings: &EstimatorSettings) -> Self {
        let distance_km = haversine_km(driver, destination);
        Self {
            driver: *driver,
            destination: *destination,
            distance_km,
            eta_minutes: estimate_minutes(distance_km, settings.average_speed_kmh),
            route: straight_route(driver, destination, settings.route_steps),
            proximity: Proximity::classify(distance_km, settings),
        }
    }

    pub fn eta_display(&self) -> String {
        format_eta(self.eta_minutes)
    }
}
