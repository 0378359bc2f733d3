use crate::clients::TrackingClient;
use crate::lifecycle::config::{ConfigError, SimulationConfig};
use crate::model::OrderId;
use crate::order_actor::{self, OrderError};
use crate::simulation::{LocationSource, LocationTicker, SimulatedDriver, TickerExit, TickerHandle};
use std::collections::HashMap;
use std::time::Duration;
use tokio::task::JoinError;
use tracing::{error, info};

/// How a started tracker moves the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingMode {
    /// Linear approach to the order's destination on the approach interval.
    Approach,
    /// Jitter around the current position on the random-walk interval.
    RandomWalk,
}

/// Runs the order actor and the location tickers attached to its orders.
///
/// # Example
///
/// ```ignore
/// let mut system = TrackingSystem::new(SimulationConfig::default())?;
/// let id = system.tracking_client.create_order(params).await?;
/// system.start_driver_tracking(id, TrackingMode::Approach).await?;
/// // ...
/// system.shutdown().await?;
/// ```
pub struct TrackingSystem {
    pub tracking_client: TrackingClient,
    config: SimulationConfig,
    trackers: HashMap<OrderId, TickerHandle>,
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl TrackingSystem {
    /// Validates `config`, then spawns the order actor with its estimator settings.
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let (order_actor, client) = order_actor::new(config.channel_buffer);
        let order_handle = tokio::spawn(order_actor.run(config.estimator_settings()));

        Ok(Self {
            tracking_client: TrackingClient::new(client),
            config,
            trackers: HashMap::new(),
            handles: vec![order_handle],
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Starts a simulated driver from the order's last known driver location.
    ///
    /// Replaces any tracker already running for the order.
    pub async fn start_driver_tracking(&mut self, id: OrderId, mode: TrackingMode) -> Result<(), OrderError> {
        let order = self.tracking_client.order(id).await?;
        let start = order
            .driver_location
            .ok_or_else(|| OrderError::NoDriverLocation(id.to_string()))?;

        let (strategy, period) = match mode {
            TrackingMode::Approach => (
                self.config.approach_strategy(order.destination),
                self.config.approach_interval(),
            ),
            TrackingMode::RandomWalk => (self.config.random_walk_strategy(), self.config.random_walk_interval()),
        };
        info!(order_id = %id, ?mode, "Starting driver tracking");
        let driver = SimulatedDriver::new(start, strategy).with_period(period);
        self.attach(id, driver, period).await;
        Ok(())
    }

    /// Attaches an arbitrary location source to an order. `period` must be non-zero.
    pub async fn start_tracking_with<S: LocationSource>(
        &mut self,
        id: OrderId,
        source: S,
        period: Duration,
    ) -> Result<(), ConfigError> {
        if period.is_zero() {
            return Err(ConfigError::Invalid {
                field: "period",
                reason: "must be positive".to_string(),
            });
        }
        self.attach(id, source, period).await;
        Ok(())
    }

    async fn attach<S: LocationSource>(&mut self, id: OrderId, source: S, period: Duration) {
        if let Some(previous) = self.trackers.remove(&id) {
            let exit = previous.stop().await;
            info!(order_id = %id, ?exit, "Replaced tracker");
        }
        let handle = LocationTicker::spawn(self.tracking_client.clone(), id, source, period);
        self.trackers.insert(id, handle);
    }

    /// Stops the order's tracker. `None` if none was running.
    pub async fn stop_driver_tracking(&mut self, id: OrderId) -> Option<TickerExit> {
        let handle = self.trackers.remove(&id)?;
        let exit = handle.stop().await;
        info!(order_id = %id, ?exit, "Stopped driver tracking");
        Some(exit)
    }

    /// True while a tracker for the order is still running.
    pub fn is_tracking(&self, id: OrderId) -> bool {
        self.trackers.get(&id).is_some_and(|handle| !handle.is_finished())
    }

    /// Stops every tracker, then closes the order actor and waits for it.
    pub async fn shutdown(self) -> Result<(), JoinError> {
        info!(trackers = self.trackers.len(), "Shutting down tracking system...");

        for (id, handle) in self.trackers {
            let exit = handle.stop().await;
            info!(order_id = %id, ?exit, "Tracker stopped");
        }

        // The actor exits once every client clone has been dropped.
        drop(self.tracking_client);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!(error = %e, "Actor task failed");
                return Err(e);
            }
        }

        info!("Tracking system shutdown complete.");
        Ok(())
    }
}
