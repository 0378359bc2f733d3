use crate::clients::actor_client::ActorClient;
use crate::framework::{FrameworkError, ResourceClient};
use crate::model::{Coordinate, OrderCreate, OrderFilter, OrderId, OrderUpdate, RouteEstimate, TrackedOrder};
use crate::order_actor::{OrderAction, OrderActionResult, OrderError, StatusChange};
use async_trait::async_trait;
use tracing::{debug, info, instrument};

/// Client for interacting with the order actor.
///
/// Every method is a single request to the actor; the transition rules live in
/// the entity's action handler.
#[derive(Clone)]
pub struct TrackingClient {
    inner: ResourceClient<TrackedOrder>,
}

impl TrackingClient {
    pub fn new(inner: ResourceClient<TrackedOrder>) -> Self {
        Self { inner }
    }

    #[instrument(skip(self, params))]
    pub async fn create_order(&self, params: OrderCreate) -> Result<OrderId, OrderError> {
        debug!(?params, "create_order called");
        let id = self.inner.create(params).await.map_err(Self::map_error)?;
        info!(order_id = %id, "Order placed");
        Ok(id)
    }

    /// Like [`ActorClient::get`], but a missing order is an error.
    #[instrument(skip(self))]
    pub async fn order(&self, id: OrderId) -> Result<TrackedOrder, OrderError> {
        self.get(id)
            .await?
            .ok_or_else(|| OrderError::NotFound(id.to_string()))
    }

    #[instrument(skip(self))]
    pub async fn update_order(&self, id: OrderId, update: OrderUpdate) -> Result<TrackedOrder, OrderError> {
        debug!("Sending request");
        self.inner.update(id, update).await.map_err(Self::map_error)
    }

    /// Order history, newest first.
    #[instrument(skip(self))]
    pub async fn list_orders(&self, filter: OrderFilter) -> Result<Vec<TrackedOrder>, OrderError> {
        let mut orders: Vec<_> = self
            .list()
            .await?
            .into_iter()
            .filter(|order| filter.matches(order))
            .collect();
        orders.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(orders)
    }

    #[instrument(skip(self))]
    pub async fn advance_status(&self, id: OrderId) -> Result<StatusChange, OrderError> {
        match self.perform(id, OrderAction::AdvanceStatus).await? {
            OrderActionResult::AdvanceStatus(change) => Ok(change),
            other => Err(OrderError::UnexpectedResult(format!("{:?}", other))),
        }
    }

    #[instrument(skip(self))]
    pub async fn cancel_order(&self, id: OrderId) -> Result<StatusChange, OrderError> {
        match self.perform(id, OrderAction::Cancel).await? {
            OrderActionResult::Cancel(change) => Ok(change),
            other => Err(OrderError::UnexpectedResult(format!("{:?}", other))),
        }
    }

    /// Records a driver fix and returns the derived speed, if any.
    pub async fn report_location(&self, id: OrderId, fix: Coordinate) -> Result<Option<f64>, OrderError> {
        match self.perform(id, OrderAction::ReportLocation(fix)).await? {
            OrderActionResult::ReportLocation(speed) => Ok(speed),
            other => Err(OrderError::UnexpectedResult(format!("{:?}", other))),
        }
    }

    #[instrument(skip(self))]
    pub async fn estimate_route(&self, id: OrderId) -> Result<RouteEstimate, OrderError> {
        match self.perform(id, OrderAction::EstimateRoute).await? {
            OrderActionResult::EstimateRoute(estimate) => Ok(estimate),
            other => Err(OrderError::UnexpectedResult(format!("{:?}", other))),
        }
    }

    async fn perform(&self, id: OrderId, action: OrderAction) -> Result<OrderActionResult, OrderError> {
        self.inner.perform_action(id, action).await.map_err(Self::map_error)
    }
}

#[async_trait]
impl ActorClient<TrackedOrder> for TrackingClient {
    type Error = OrderError;

    fn inner(&self) -> &ResourceClient<TrackedOrder> {
        &self.inner
    }

    /// Recovers the typed [`OrderError`] the entity returned, when there is one.
    fn map_error(e: FrameworkError) -> Self::Error {
        match e {
            FrameworkError::NotFound(id) => OrderError::NotFound(id),
            FrameworkError::EntityError(inner) => match inner.downcast::<OrderError>() {
                Ok(err) => *err,
                Err(other) => OrderError::ActorCommunicationError(other.to_string()),
            },
            other => OrderError::ActorCommunicationError(other.to_string()),
        }
    }
}
