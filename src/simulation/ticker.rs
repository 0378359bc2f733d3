//! Periodic driver location reports.
//!
//! A [`LocationTicker`] polls a [`LocationSource`] on a fixed period and forwards
//! each fix to the order actor. It runs until it is stopped, its handle is
//! dropped, the source fails, or the actor rejects a fix.

use super::source::{LocationError, LocationSource};
use crate::clients::TrackingClient;
use crate::model::OrderId;
use crate::order_actor::OrderError;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn, Instrument};

/// Why a ticker task ended.
#[derive(Debug, Clone, PartialEq)]
pub enum TickerExit {
    Stopped,
    SourceFailed(LocationError),
    Rejected(OrderError),
    /// The task panicked; carries the join error's message.
    Panicked(String),
}

pub struct LocationTicker;

impl LocationTicker {
    /// Spawns the ticker task. The first fix is taken one `period` after the call.
    ///
    /// `period` must be non-zero; a zero period makes the task panic on its first
    /// poll, which [`TickerHandle::stop`] reports as [`TickerExit::Panicked`].
    pub fn spawn<S: LocationSource>(
        client: TrackingClient,
        order_id: OrderId,
        mut source: S,
        period: Duration,
    ) -> TickerHandle {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
        let span = tracing::info_span!("location_ticker", %order_id);

        let handle = tokio::spawn(
            async move {
                let mut interval = tokio::time::interval(period);
                interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                // `interval` fires immediately; skip that one.
                interval.tick().await;
                info!(period_ms = period.as_millis() as u64, "Ticker started");

                loop {
                    tokio::select! {
                        biased;
                        _ = &mut shutdown_rx => {
                            info!("Ticker stopped");
                            return TickerExit::Stopped;
                        }
                        _ = interval.tick() => {}
                    }

                    let fix = match source.next_fix() {
                        Ok(fix) => fix,
                        Err(e) => {
                            warn!(error = %e, "Location source failed");
                            return TickerExit::SourceFailed(e);
                        }
                    };

                    match client.report_location(order_id, fix).await {
                        Ok(speed) => debug!(lat = fix.latitude, lng = fix.longitude, ?speed, "Fix reported"),
                        Err(e) => {
                            warn!(error = %e, "Fix rejected");
                            return TickerExit::Rejected(e);
                        }
                    }
                }
            }
            .instrument(span),
        );

        TickerHandle {
            shutdown: Some(shutdown_tx),
            task: Some(handle),
        }
    }
}

/// Owner of a running ticker. Dropping it aborts the task.
pub struct TickerHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<TickerExit>>,
}

impl TickerHandle {
    /// Signals the task and waits for it; no fix is reported after this returns.
    pub async fn stop(mut self) -> TickerExit {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        let Some(task) = self.task.take() else {
            return TickerExit::Stopped;
        };
        match task.await {
            Ok(exit) => exit,
            Err(e) if e.is_panic() => {
                error!(error = %e, "Ticker task panicked");
                TickerExit::Panicked(e.to_string())
            }
            // Cancelled by runtime shutdown.
            Err(_) => TickerExit::Stopped,
        }
    }

    /// True once the task has ended on its own (source failure, rejection or panic).
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, |task| task.is_finished())
    }
}

impl Drop for TickerHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
