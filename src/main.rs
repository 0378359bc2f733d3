//! # Delivery Tracker demo
//!
//! Places one order in Santiago, puts a simulated driver on it, walks the order
//! through its timeline to delivery and logs the route estimate along the way.
//!
//! Settings come from the JSON file named by `DELIVERY_TRACKER_CONFIG`. Without
//! one the demo speeds the driver up so the run takes a few seconds.

use delivery_tracker::lifecycle::{setup_tracing, SimulationConfig, TrackingMode, TrackingSystem, CONFIG_ENV};
use delivery_tracker::model::{Coordinate, DriverInfo, OrderCreate};
use std::error::Error;
use tracing::{info, warn, Instrument};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    setup_tracing();

    let config = if std::env::var_os(CONFIG_ENV).is_some() {
        SimulationConfig::load()?
    } else {
        SimulationConfig {
            approach_interval_ms: 400,
            approach_fraction: 0.15,
            ..SimulationConfig::default()
        }
    };
    let tick = config.approach_interval();

    info!("Starting delivery tracker demo");
    let mut system = TrackingSystem::new(config)?;

    let params = OrderCreate {
        customer_address: "Av. Libertador Bernardo O'Higgins 1449, Santiago".to_string(),
        items: vec!["Skateboard deck".to_string(), "Bearings ABEC-7".to_string()],
        total: 64_990,
        destination: Coordinate::new(-33.4489, -70.6693),
        driver: Some(DriverInfo {
            name: "Carlos Mendoza".to_string(),
            phone: "+56 9 8765 4321".to_string(),
            vehicle: "Motorcycle".to_string(),
        }),
        driver_location: Some(Coordinate::new(-33.4569, -70.6483)),
    };

    let span = tracing::info_span!("order_placement");
    let order_id = async {
        info!("Placing order");
        system.tracking_client.create_order(params).await
    }
    .instrument(span)
    .await?;

    system.start_driver_tracking(order_id, TrackingMode::Approach).await?;

    loop {
        tokio::time::sleep(tick * 3).await;

        let estimate = system.tracking_client.estimate_route(order_id).await?;
        info!(
            order_id = %order_id,
            distance_km = %format!("{:.2}", estimate.distance_km),
            eta = %estimate.eta_display(),
            proximity = %estimate.proximity,
            "Route estimate"
        );

        let change = system.tracking_client.advance_status(order_id).await?;
        if !change.changed() {
            break;
        }
        let order = system.tracking_client.order(order_id).await?;
        info!(
            order_id = %order_id,
            status = %order.status,
            progress = %format!("{:.0}%", order.progress_percent()),
            "Status advanced"
        );
    }

    match system.stop_driver_tracking(order_id).await {
        Some(exit) => info!(?exit, "Driver tracking ended"),
        None => warn!("No tracker was running"),
    }

    system.shutdown().await?;
    info!("Demo completed successfully");
    Ok(())
}
