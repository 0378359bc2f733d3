//! An order being tracked from checkout to the customer's door.
//!
//! # Actor Framework
//! [`TrackedOrder`] implements the [`ActorEntity`](crate::framework::ActorEntity) trait,
//! so it can be managed by a [`ResourceActor`](crate::framework::ResourceActor).
//!
//! The implementation lives in [`crate::order_actor::entity`], covering:
//! - Creation parameters ([`OrderCreate`])
//! - Update parameters ([`OrderUpdate`])
//! - Custom actions ([`OrderAction`](crate::order_actor::OrderAction))

use super::geo::{speed_between, Coordinate};
use super::status::OrderStatus;
use super::timeline::Timeline;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt::Display;
use std::str::FromStr;

/// Type-safe identifier for orders, shown as `ORD-001`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrderId(pub u32);

impl From<u32> for OrderId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ORD-{:03}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Malformed order id: {0}")]
pub struct MalformedOrderId(pub String);

impl FromStr for OrderId {
    type Err = MalformedOrderId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix("ORD-")
            .and_then(|n| n.parse::<u32>().ok())
            .map(OrderId)
            .ok_or_else(|| MalformedOrderId(s.to_string()))
    }
}

/// The courier assigned to an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverInfo {
    pub name: String,
    pub phone: String,
    pub vehicle: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrackedOrder {
    pub id: OrderId,
    pub placed_at: DateTime<Utc>,
    pub customer_address: String,
    pub items: Vec<String>,
    /// Order total in whole currency units.
    pub total: u32,
    pub destination: Coordinate,
    pub driver: Option<DriverInfo>,
    pub driver_location: Option<Coordinate>,
    /// Most recent fixes, oldest first.
    pub location_history: VecDeque<Coordinate>,
    pub status: OrderStatus,
    pub timeline: Timeline,
}

/// Payload for creating a new order.
#[derive(Debug, Clone)]
pub struct OrderCreate {
    pub customer_address: String,
    pub items: Vec<String>,
    pub total: u32,
    pub destination: Coordinate,
    pub driver: Option<DriverInfo>,
    /// Where the driver starts, if one is already assigned.
    pub driver_location: Option<Coordinate>,
}

/// Payload for editing an order that has not finished yet.
#[derive(Debug, Clone, Default)]
pub struct OrderUpdate {
    pub customer_address: Option<String>,
    pub destination: Option<Coordinate>,
    pub driver: Option<DriverInfo>,
}

impl TrackedOrder {
    /// Creates a pending order whose timeline starts at `placed_at`.
    pub fn new(id: OrderId, params: OrderCreate, placed_at: DateTime<Utc>) -> Self {
        let mut location_history = VecDeque::new();
        if let Some(start) = params.driver_location {
            location_history.push_back(start);
        }
        Self {
            id,
            placed_at,
            customer_address: params.customer_address,
            items: params.items,
            total: params.total,
            destination: params.destination,
            driver: params.driver,
            driver_location: params.driver_location,
            location_history,
            status: OrderStatus::Pending,
            timeline: Timeline::delivery(placed_at),
        }
    }

    pub fn progress_percent(&self) -> f64 {
        self.timeline.progress_percent()
    }

    /// Stores a driver fix, keeping at most `limit` of them.
    pub fn record_fix(&mut self, fix: Coordinate, limit: usize) {
        self.driver_location = Some(fix);
        self.location_history.push_back(fix);
        while self.location_history.len() > limit {
            self.location_history.pop_front();
        }
    }

    /// The speed the latest fix reports, or else the speed derived from the two
    /// most recent fixes.
    pub fn current_speed_kmh(&self) -> Option<f64> {
        let latest = self.location_history.back()?;
        if let Some(speed) = latest.speed_kmh {
            return Some(speed);
        }
        let n = self.location_history.len();
        if n < 2 {
            return None;
        }
        speed_between(&self.location_history[n - 2], latest)
    }
}

/// Criteria for the order history view.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    /// Case-insensitive match against the order id and item names.
    pub search: Option<String>,
}

impl OrderFilter {
    pub fn with_status(status: OrderStatus) -> Self {
        Self {
            status: Some(status),
            search: None,
        }
    }

    pub fn with_search(term: impl Into<String>) -> Self {
        Self {
            status: None,
            search: Some(term.into()),
        }
    }

    pub fn matches(&self, order: &TrackedOrder) -> bool {
        if let Some(status) = self.status {
            if order.status != status {
                return false;
            }
        }
        match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let term = term.to_lowercase();
                order.id.to_string().to_lowercase().contains(&term)
                    || order.items.iter().any(|item| item.to_lowercase().contains(&term))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample(id: u32, items: &[&str]) -> TrackedOrder {
        TrackedOrder::new(
            OrderId(id),
            OrderCreate {
                customer_address: "Av. Providencia 1234".into(),
                items: items.iter().map(|s| s.to_string()).collect(),
                total: 41_000,
                destination: Coordinate::new(-33.4489, -70.6693),
                driver: None,
                driver_location: Some(Coordinate::new(-33.4569, -70.6483)),
            },
            Utc::now(),
        )
    }

    #[test]
    fn order_id_display_and_parse() {
        assert_eq!(OrderId(1).to_string(), "ORD-001");
        assert_eq!(OrderId(1234).to_string(), "ORD-1234");
        assert_eq!("ORD-004".parse::<OrderId>().unwrap(), OrderId(4));
        assert!("4".parse::<OrderId>().is_err());
        assert!("ORD-x".parse::<OrderId>().is_err());
    }

    #[test]
    fn new_order_is_pending_with_start_fix() {
        let order = sample(1, &["Premium board"]);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.timeline.current_index(), 0);
        assert_eq!(order.location_history.len(), 1);
        assert_eq!(order.progress_percent(), 0.0);
    }

    #[test]
    fn history_is_capped() {
        let mut order = sample(1, &[]);
        for i in 0..10 {
            order.record_fix(Coordinate::new(-33.45 + i as f64 * 0.001, -70.65), 4);
        }
        assert_eq!(order.location_history.len(), 4);
        let last = order.location_history.back().unwrap();
        assert_eq!(order.driver_location, Some(*last));
        assert!((last.latitude - (-33.45 + 9.0 * 0.001)).abs() < 1e-12);
    }

    #[test]
    fn speed_from_last_two_fixes() {
        let mut order = sample(1, &[]);
        order.location_history.clear();
        assert!(order.current_speed_kmh().is_none());

        let t0 = Utc::now();
        order.record_fix(Coordinate::at(0.0, 0.0, t0), 50);
        order.record_fix(Coordinate::at(0.1, 0.0, t0 + Duration::minutes(30)), 50);
        let speed = order.current_speed_kmh().unwrap();
        assert!((speed - 22.24).abs() < 0.01, "got {speed}");
    }

    #[test]
    fn reported_speed_wins_over_derived() {
        let mut order = sample(1, &[]);
        let t0 = Utc::now();
        order.record_fix(Coordinate::at(0.0, 0.0, t0), 50);

        let mut reported = Coordinate::at(0.1, 0.0, t0 + Duration::minutes(30));
        reported.speed_kmh = Some(30.0);
        order.record_fix(reported, 50);
        assert_eq!(order.current_speed_kmh(), Some(30.0));

        // A lone fix with its own speed needs no predecessor.
        let mut single = sample(2, &[]);
        single.location_history.clear();
        single.record_fix(reported, 50);
        assert_eq!(single.current_speed_kmh(), Some(30.0));
    }

    #[test]
    fn filter_by_status_and_search() {
        let mut delivered = sample(2, &["Red wine reserve", "Classic board"]);
        delivered.status = OrderStatus::Delivered;
        let pending = sample(1, &["Pisco sour x2"]);

        let by_status = OrderFilter::with_status(OrderStatus::Delivered);
        assert!(by_status.matches(&delivered));
        assert!(!by_status.matches(&pending));

        assert!(OrderFilter::with_search("WINE").matches(&delivered));
        assert!(OrderFilter::with_search("ord-001").matches(&pending));
        assert!(!OrderFilter::with_search("whisky").matches(&pending));
        assert!(OrderFilter::with_search("  ").matches(&pending));
        assert!(OrderFilter::default().matches(&pending));
    }
}
