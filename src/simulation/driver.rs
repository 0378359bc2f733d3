//! The simulated courier: a position nudged on every poll.

use super::source::{LocationError, LocationSource};
use crate::model::{bearing_deg, haversine_km, interpolate, Coordinate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

/// How the simulated position moves between two polls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MovementStrategy {
    /// Adds an independent uniform offset in `[-max_delta / 2, max_delta / 2]`
    /// degrees to latitude and longitude.
    RandomWalk { max_delta: f64 },
    /// Covers `fraction` of the remaining way to `target`.
    Approach { target: Coordinate, fraction: f64 },
}

impl MovementStrategy {
    pub fn step<R: Rng + ?Sized>(&self, current: &Coordinate, rng: &mut R) -> Coordinate {
        match *self {
            MovementStrategy::RandomWalk { max_delta } => Coordinate::new(
                current.latitude + (rng.gen::<f64>() - 0.5) * max_delta,
                current.longitude + (rng.gen::<f64>() - 0.5) * max_delta,
            ),
            MovementStrategy::Approach { target, fraction } => interpolate(current, &target, fraction),
        }
    }
}

/// A simulated courier.
///
/// Every fix it produces carries the heading of the last step. Once the polling
/// period is known (see [`with_period`](Self::with_period)) it also carries the
/// speed that step implies.
pub struct SimulatedDriver {
    position: Coordinate,
    strategy: MovementStrategy,
    period: Option<Duration>,
    rng: StdRng,
}

impl SimulatedDriver {
    pub fn new(start: Coordinate, strategy: MovementStrategy) -> Self {
        Self {
            position: start,
            strategy,
            period: None,
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible random walks for tests.
    pub fn with_seed(start: Coordinate, strategy: MovementStrategy, seed: u64) -> Self {
        Self {
            position: start,
            strategy,
            period: None,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Time between two polls, used to derive the reported speed.
    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = (!period.is_zero()).then_some(period);
        self
    }

    pub fn position(&self) -> Coordinate {
        self.position
    }
}

impl LocationSource for SimulatedDriver {
    fn next_fix(&mut self) -> Result<Coordinate, LocationError> {
        let previous = self.position;
        let mut fix = self.strategy.step(&previous, &mut self.rng);

        let step_km = haversine_km(&previous, &fix);
        if step_km > 0.0 {
            fix.heading = Some(bearing_deg(&previous, &fix));
        }
        fix.speed_kmh = self.period.map(|period| step_km / (period.as_secs_f64() / 3600.0));

        self.position = fix;
        Ok(fix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::haversine_km;

    #[test]
    fn random_walk_stays_within_delta() {
        let start = Coordinate::new(-33.4569, -70.6483);
        let mut driver = SimulatedDriver::with_seed(start, MovementStrategy::RandomWalk { max_delta: 0.001 }, 7);
        let mut previous = start;
        for _ in 0..200 {
            let fix = driver.next_fix().unwrap();
            assert!((fix.latitude - previous.latitude).abs() <= 0.0005 + 1e-12);
            assert!((fix.longitude - previous.longitude).abs() <= 0.0005 + 1e-12);
            previous = fix;
        }
        assert_eq!(driver.position(), previous);
    }

    #[test]
    fn same_seed_same_walk() {
        let start = Coordinate::new(-33.4569, -70.6483);
        let strategy = MovementStrategy::RandomWalk { max_delta: 0.001 };
        let mut a = SimulatedDriver::with_seed(start, strategy, 42);
        let mut b = SimulatedDriver::with_seed(start, strategy, 42);
        for _ in 0..10 {
            let (fa, fb) = (a.next_fix().unwrap(), b.next_fix().unwrap());
            assert_eq!((fa.latitude, fa.longitude), (fb.latitude, fb.longitude));
        }
    }

    #[test]
    fn approach_closes_in_on_target() {
        let target = Coordinate::new(-33.4489, -70.6693);
        let start = Coordinate::new(-33.4569, -70.6483);
        let mut driver = SimulatedDriver::new(start, MovementStrategy::Approach { target, fraction: 0.25 });

        let mut last = haversine_km(&start, &target);
        while last > 0.001 {
            let fix = driver.next_fix().unwrap();
            let now = haversine_km(&fix, &target);
            assert!(now < last);
            last = now;
        }
    }

    #[test]
    fn fixes_carry_heading_and_speed() {
        // Due north by 0.009 degrees of latitude, about 1 km.
        let start = Coordinate::new(0.0, 0.0);
        let target = Coordinate::new(0.018, 0.0);
        let strategy = MovementStrategy::Approach { target, fraction: 0.5 };

        let mut driver = SimulatedDriver::new(start, strategy).with_period(Duration::from_secs(60));
        let fix = driver.next_fix().unwrap();
        assert!(fix.heading.unwrap().abs() < 1e-6);
        let speed = fix.speed_kmh.unwrap();
        assert!((speed - 60.0).abs() < 0.1, "got {speed}");

        let mut unpaced = SimulatedDriver::new(start, strategy);
        let fix = unpaced.next_fix().unwrap();
        assert!(fix.speed_kmh.is_none());
        assert!(fix.heading.is_some());
    }
}
