//! # Logging
//!
//! [`setup_tracing`] installs a compact `tracing-subscriber` formatter filtered by
//! `RUST_LOG`. Call it once, at the start of `main`.
//!
//! ```bash
//! # status changes, notifications, ticker start/stop
//! RUST_LOG=info cargo run
//!
//! # every fix and every actor request with its payload
//! RUST_LOG=debug cargo run
//! ```
//!
//! Ticker events run inside a `location_ticker{order_id=ORD-001}` span, so a
//! compact line reads like:
//!
//! ```text
//! DEBUG location_ticker: Fix reported order_id=ORD-001 lat=-33.45 lng=-70.66 speed=Some(21.4)
//! INFO Your order is on the way order_id=ORD-001 status="in_transit"
//! ```

pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
