//! Coordinates and the great-circle maths used for distance and ETA figures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Mean Earth radius used by [`haversine_km`].
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A single GPS fix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: DateTime<Utc>,
    /// Ground speed in km/h, when the source reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed_kmh: Option<f64>,
    /// Heading in degrees clockwise from north.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<f64>,
    /// Horizontal accuracy in metres.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy_m: Option<f64>,
}

impl Coordinate {
    /// A fix stamped with the current time.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self::at(latitude, longitude, Utc::now())
    }

    pub fn at(latitude: f64, longitude: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            latitude,
            longitude,
            timestamp,
            speed_kmh: None,
            heading: None,
            accuracy_m: None,
        }
    }

    /// True when both components are finite and inside their ranges.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    pub fn distance_km(&self, other: &Coordinate) -> f64 {
        haversine_km(self, other)
    }
}

/// Great-circle distance in kilometres.
///
/// Inputs are not validated: non-finite components yield NaN.
pub fn haversine_km(a: &Coordinate, b: &Coordinate) -> f64 {
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lng = (b.longitude - a.longitude).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.latitude.to_radians().cos() * b.latitude.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

/// Moves `fraction` of the way from `from` to `to`, component-wise.
///
/// This is a planar approximation; it is only meant for short urban hops.
pub fn interpolate(from: &Coordinate, to: &Coordinate, fraction: f64) -> Coordinate {
    Coordinate::new(
        from.latitude + (to.latitude - from.latitude) * fraction,
        from.longitude + (to.longitude - from.longitude) * fraction,
    )
}

/// `steps + 1` evenly spaced points from `start` to `end`, both included.
pub fn straight_route(start: &Coordinate, end: &Coordinate, steps: usize) -> Vec<Coordinate> {
    if steps == 0 {
        return vec![*start];
    }
    (0..=steps)
        .map(|i| interpolate(start, end, i as f64 / steps as f64))
        .collect()
}

/// Minutes needed to cover `distance_km` at `average_speed_kmh`, rounded.
pub fn estimate_minutes(distance_km: f64, average_speed_kmh: f64) -> u32 {
    (distance_km / average_speed_kmh * 60.0).round().max(0.0) as u32
}

/// "25 min" below an hour, "1h 5min" otherwise.
pub fn format_eta(minutes: u32) -> String {
    if minutes < 60 {
        format!("{} min", minutes)
    } else {
        format!("{}h {}min", minutes / 60, minutes % 60)
    }
}

/// Initial great-circle bearing from `from` to `to`, in degrees clockwise from
/// north, within `[0, 360)`.
pub fn bearing_deg(from: &Coordinate, to: &Coordinate) -> f64 {
    let (lat1, lat2) = (from.latitude.to_radians(), to.latitude.to_radians());
    let d_lng = (to.longitude - from.longitude).to_radians();
    let y = d_lng.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lng.cos();
    y.atan2(x).to_degrees().rem_euclid(360.0)
}

/// Speed in km/h between two consecutive fixes, `None` if no time elapsed.
pub fn speed_between(previous: &Coordinate, current: &Coordinate) -> Option<f64> {
    let elapsed_ms = (current.timestamp - previous.timestamp).num_milliseconds();
    if elapsed_ms <= 0 {
        return None;
    }
    let hours = elapsed_ms as f64 / 3_600_000.0;
    Some(haversine_km(previous, current) / hours)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn santiago_centre() -> Coordinate {
        Coordinate::new(-33.4489, -70.6693)
    }

    fn driver_start() -> Coordinate {
        Coordinate::new(-33.4569, -70.6483)
    }

    #[test]
    fn distance_to_self_is_zero() {
        let a = santiago_centre();
        assert_eq!(haversine_km(&a, &a), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = santiago_centre();
        let b = driver_start();
        assert_eq!(haversine_km(&a, &b), haversine_km(&b, &a));
    }

    #[test]
    fn distance_matches_known_value() {
        // ~2.1 km across central Santiago
        let d = haversine_km(&driver_start(), &santiago_centre());
        assert!((2.0..2.3).contains(&d), "got {d}");

        // one degree of latitude along a meridian
        let d = haversine_km(&Coordinate::new(0.0, 0.0), &Coordinate::new(1.0, 0.0));
        assert!((d - 111.19).abs() < 0.01, "got {d}");
    }

    #[test]
    fn invalid_input_is_not_guarded() {
        let d = haversine_km(&Coordinate::new(f64::NAN, 0.0), &santiago_centre());
        assert!(d.is_nan());
    }

    #[test]
    fn validity_checks_ranges() {
        assert!(santiago_centre().is_valid());
        assert!(Coordinate::new(90.0, -180.0).is_valid());
        assert!(!Coordinate::new(90.5, 0.0).is_valid());
        assert!(!Coordinate::new(0.0, 181.0).is_valid());
        assert!(!Coordinate::new(f64::INFINITY, 0.0).is_valid());
    }

    #[test]
    fn repeated_interpolation_converges() {
        let target = santiago_centre();
        let mut current = driver_start();
        let mut last = haversine_km(&current, &target);
        let epsilon = 0.001;

        let mut steps = 0;
        while last >= epsilon {
            current = interpolate(&current, &target, 0.2);
            let now = haversine_km(&current, &target);
            assert!(now < last, "distance went from {last} to {now}");
            last = now;
            steps += 1;
            assert!(steps < 1_000);
        }
    }

    #[test]
    fn route_includes_both_ends() {
        let start = driver_start();
        let end = santiago_centre();
        let route = straight_route(&start, &end, 10);
        assert_eq!(route.len(), 11);
        assert_eq!(route[0].latitude, start.latitude);
        assert!((route[10].latitude - end.latitude).abs() < 1e-12);
        assert!((route[10].longitude - end.longitude).abs() < 1e-12);
        assert!((route[5].latitude - (start.latitude + end.latitude) / 2.0).abs() < 1e-12);
    }

    #[test]
    fn eta_rounds_and_formats() {
        assert_eq!(estimate_minutes(2.14, 25.0), 5);
        assert_eq!(estimate_minutes(0.0, 25.0), 0);
        assert_eq!(format_eta(5), "5 min");
        assert_eq!(format_eta(59), "59 min");
        assert_eq!(format_eta(60), "1h 0min");
        assert_eq!(format_eta(125), "2h 5min");
    }

    #[test]
    fn speed_uses_elapsed_time() {
        let t0 = Utc::now();
        let a = Coordinate::at(0.0, 0.0, t0);
        let b = Coordinate::at(1.0, 0.0, t0 + Duration::hours(2));
        let speed = speed_between(&a, &b).unwrap();
        assert!((speed - 55.6).abs() < 0.1, "got {speed}");

        assert!(speed_between(&b, &a).is_none());
        assert!(speed_between(&a, &a).is_none());
    }

    #[test]
    fn bearing_points_along_compass() {
        let origin = Coordinate::new(0.0, 0.0);
        assert!(bearing_deg(&origin, &Coordinate::new(1.0, 0.0)).abs() < 1e-9);
        assert!((bearing_deg(&origin, &Coordinate::new(0.0, 1.0)) - 90.0).abs() < 1e-9);
        assert!((bearing_deg(&origin, &Coordinate::new(-1.0, 0.0)) - 180.0).abs() < 1e-9);
        assert!((bearing_deg(&origin, &Coordinate::new(0.0, -1.0)) - 270.0).abs() < 1e-9);
    }
}
