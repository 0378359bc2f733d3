//! [`ActorEntity`] implementation for [`TrackedOrder`].
//!
//! Status transitions, location reports and route estimates all run here, inside
//! the order actor's task, so they are applied one request at a time.

use super::actions::{OrderAction, OrderActionResult, StatusChange};
use super::error::OrderError;
use crate::framework::ActorEntity;
use crate::model::{
    Coordinate, EstimatorSettings, OrderCreate, OrderId, OrderStatus, OrderUpdate, RouteEstimate, TrackedOrder,
};
use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info};

fn ensure_valid(coordinate: &Coordinate) -> Result<(), OrderError> {
    if coordinate.is_valid() {
        Ok(())
    } else {
        Err(OrderError::InvalidCoordinate {
            latitude: coordinate.latitude,
            longitude: coordinate.longitude,
        })
    }
}

fn notify(order: &TrackedOrder) {
    info!(order_id = %order.id, status = order.status.as_str(), "{}", order.status.notification());
}

impl TrackedOrder {
    fn ensure_open(&self) -> Result<(), OrderError> {
        if self.status.is_terminal() {
            Err(OrderError::OrderClosed {
                id: self.id.to_string(),
                status: self.status,
            })
        } else {
            Ok(())
        }
    }

    fn advance_status(&mut self) -> StatusChange {
        let from = self.status;
        if from.is_terminal() || !self.timeline.advance(Utc::now()) {
            return StatusChange { from, to: from };
        }
        // The timeline has one step per status in the fulfilment sequence.
        if let Some(status) = OrderStatus::from_step_index(self.timeline.current_index()) {
            self.status = status;
        }
        notify(self);
        StatusChange { from, to: self.status }
    }

    fn cancel(&mut self) -> Result<StatusChange, OrderError> {
        let from = self.status;
        match from {
            OrderStatus::Cancelled => Ok(StatusChange { from, to: from }),
            OrderStatus::Delivered => Err(OrderError::InvalidTransition {
                from,
                to: OrderStatus::Cancelled,
            }),
            _ => {
                self.status = OrderStatus::Cancelled;
                notify(self);
                Ok(StatusChange {
                    from,
                    to: OrderStatus::Cancelled,
                })
            }
        }
    }
}

#[async_trait]
impl ActorEntity for TrackedOrder {
    type Id = OrderId;
    type Create = OrderCreate;
    type Update = OrderUpdate;
    type Action = OrderAction;
    type ActionResult = OrderActionResult;
    type Context = EstimatorSettings;
    type Error = OrderError;

    /// Validates the coordinates and starts the order as `Pending`.
    fn from_create_params(id: OrderId, params: OrderCreate) -> Result<Self, OrderError> {
        ensure_valid(&params.destination)?;
        if let Some(start) = &params.driver_location {
            ensure_valid(start)?;
        }
        Ok(Self::new(id, params, Utc::now()))
    }

    async fn on_create(&mut self, _ctx: &EstimatorSettings) -> Result<(), OrderError> {
        notify(self);
        Ok(())
    }

    /// Edits address, drop-off point or driver of an open order.
    async fn on_update(&mut self, update: OrderUpdate, _ctx: &EstimatorSettings) -> Result<(), OrderError> {
        self.ensure_open()?;
        if let Some(destination) = &update.destination {
            ensure_valid(destination)?;
        }
        if let Some(address) = update.customer_address {
            self.customer_address = address;
        }
        if let Some(destination) = update.destination {
            self.destination = destination;
        }
        if let Some(driver) = update.driver {
            self.driver = Some(driver);
        }
        Ok(())
    }

    /// # Actions
    /// - `AdvanceStatus`: one step forward; no-op for delivered or cancelled orders
    /// - `Cancel`: any open order; no-op if already cancelled, error once delivered
    /// - `ReportLocation`: stores a validated fix on an open order
    /// - `EstimateRoute`: needs at least one driver fix
    async fn handle_action(
        &mut self,
        action: OrderAction,
        ctx: &EstimatorSettings,
    ) -> Result<OrderActionResult, OrderError> {
        match action {
            OrderAction::AdvanceStatus => Ok(OrderActionResult::AdvanceStatus(self.advance_status())),
            OrderAction::Cancel => self.cancel().map(OrderActionResult::Cancel),
            OrderAction::ReportLocation(fix) => {
                ensure_valid(&fix)?;
                self.ensure_open()?;
                self.record_fix(fix, ctx.history_limit);
                let speed = self.current_speed_kmh();
                debug!(order_id = %self.id, lat = fix.latitude, lng = fix.longitude, ?speed, "Driver fix");
                Ok(OrderActionResult::ReportLocation(speed))
            }
            OrderAction::EstimateRoute => {
                let driver = self
                    .driver_location
                    .ok_or_else(|| OrderError::NoDriverLocation(self.id.to_string()))?;
                Ok(OrderActionResult::EstimateRoute(RouteEstimate::compute(
                    &driver,
                    &self.destination,
                    ctx,
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StepState;

    fn create(driver_location: Option<Coordinate>) -> TrackedOrder {
        TrackedOrder::from_create_params(
            OrderId(1),
            OrderCreate {
                customer_address: "Av. Providencia 1234".into(),
                items: vec!["Premium board".into()],
                total: 41_000,
                destination: Coordinate::new(-33.4489, -70.6693),
                driver: None,
                driver_location,
            },
        )
        .unwrap()
    }

    #[tokio::test]
    async fn advance_walks_every_status_then_stops() {
        let ctx = EstimatorSettings::default();
        let mut order = create(None);

        for expected in &OrderStatus::SEQUENCE[1..] {
            let result = order.handle_action(OrderAction::AdvanceStatus, &ctx).await.unwrap();
            let OrderActionResult::AdvanceStatus(change) = result else {
                panic!("wrong result variant");
            };
            assert!(change.changed());
            assert_eq!(change.to, *expected);
            assert_eq!(order.status, *expected);
            assert!(order.timeline.is_consistent());
        }

        assert!(order.timeline.steps().iter().all(|s| s.state == StepState::Completed));
        let before = order.timeline.clone();
        let result = order.handle_action(OrderAction::AdvanceStatus, &ctx).await.unwrap();
        assert!(matches!(result, OrderActionResult::AdvanceStatus(c) if !c.changed()));
        assert_eq!(order.timeline, before);
    }

    #[tokio::test]
    async fn cancel_short_circuits_and_freezes() {
        let ctx = EstimatorSettings::default();
        let mut order = create(None);
        order.handle_action(OrderAction::AdvanceStatus, &ctx).await.unwrap();

        let result = order.handle_action(OrderAction::Cancel, &ctx).await.unwrap();
        assert!(matches!(
            result,
            OrderActionResult::Cancel(StatusChange { from: OrderStatus::Confirmed, to: OrderStatus::Cancelled })
        ));

        // Further advances and cancels are no-ops
        let index = order.timeline.current_index();
        order.handle_action(OrderAction::AdvanceStatus, &ctx).await.unwrap();
        assert_eq!(order.timeline.current_index(), index);
        assert_eq!(order.status, OrderStatus::Cancelled);
        let again = order.handle_action(OrderAction::Cancel, &ctx).await.unwrap();
        assert!(matches!(again, OrderActionResult::Cancel(c) if !c.changed()));
    }

    #[tokio::test]
    async fn delivered_order_cannot_be_cancelled() {
        let ctx = EstimatorSettings::default();
        let mut order = create(None);
        while !order.status.is_terminal() {
            order.handle_action(OrderAction::AdvanceStatus, &ctx).await.unwrap();
        }
        let err = order.handle_action(OrderAction::Cancel, &ctx).await.unwrap_err();
        assert_eq!(
            err,
            OrderError::InvalidTransition {
                from: OrderStatus::Delivered,
                to: OrderStatus::Cancelled
            }
        );
    }

    #[tokio::test]
    async fn location_reports_are_validated() {
        let ctx = EstimatorSettings::default();
        let mut order = create(None);

        let err = order
            .handle_action(OrderAction::ReportLocation(Coordinate::new(123.0, 0.0)), &ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::InvalidCoordinate { .. }));
        assert!(order.driver_location.is_none());

        let err = order.handle_action(OrderAction::EstimateRoute, &ctx).await.unwrap_err();
        assert_eq!(err, OrderError::NoDriverLocation("ORD-001".into()));

        let fix = Coordinate::new(-33.4569, -70.6483);
        order.handle_action(OrderAction::ReportLocation(fix), &ctx).await.unwrap();
        assert_eq!(order.driver_location, Some(fix));

        let result = order.handle_action(OrderAction::EstimateRoute, &ctx).await.unwrap();
        let OrderActionResult::EstimateRoute(estimate) = result else {
            panic!("wrong result variant");
        };
        assert!((estimate.distance_km - 2.14).abs() < 0.01);

        order.handle_action(OrderAction::Cancel, &ctx).await.unwrap();
        let err = order
            .handle_action(OrderAction::ReportLocation(fix), &ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::OrderClosed { status: OrderStatus::Cancelled, .. }));
    }

    #[tokio::test]
    async fn update_rejected_once_closed() {
        let ctx = EstimatorSettings::default();
        let mut order = create(None);
        let update = OrderUpdate {
            customer_address: Some("Los Leones 45".into()),
            ..Default::default()
        };
        order.on_update(update.clone(), &ctx).await.unwrap();
        assert_eq!(order.customer_address, "Los Leones 45");

        order.handle_action(OrderAction::Cancel, &ctx).await.unwrap();
        assert!(order.on_update(update, &ctx).await.is_err());
    }

    #[test]
    fn create_rejects_bad_destination() {
        let err = TrackedOrder::from_create_params(
            OrderId(1),
            OrderCreate {
                customer_address: String::new(),
                items: Vec::new(),
                total: 0,
                destination: Coordinate::new(f64::NAN, 0.0),
                driver: None,
                driver_location: None,
            },
        )
        .unwrap_err();
        assert!(matches!(err, OrderError::InvalidCoordinate { .. }));
    }
}
