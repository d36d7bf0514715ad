//! Smoke check against a running rosbridge endpoint.
//!
//! Runs the delivery workflow once, end to end, and prints one line per step.
//! Exits non-zero when connecting fails; every other step reports its result
//! record and carries on.

use anyhow::{Context, Result};
use clap::Parser;
use delivery_core::{DeliveryLocation, DeliveryService, OrderRequest, ToolResult};
use rosbridge_client::{Connector, WsConnector};
use serde::Serialize;
use std::{sync::Arc, time::Duration};

#[derive(Parser)]
#[command(name = "live-check")]
#[command(about = "Exercise a live rosbridge endpoint with the delivery workflow")]
struct Cli {
    /// rosbridge WebSocket URL; falls back to ROS2_WS_URL
    #[arg(long)]
    bridge_url: Option<String>,

    /// Status polling budget in seconds
    #[arg(short, long, default_value = "30")]
    duration: u64,

    /// Connect timeout in seconds
    #[arg(long, default_value = "10")]
    connect_timeout: u64,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn report<T: Serialize>(step: &str, result: &ToolResult<T>) {
    let marker = if result.is_success() { "ok  " } else { "FAIL" };
    let body = serde_json::to_string(result).unwrap_or_else(|e| format!("<unprintable: {}>", e));
    println!("[{}] {}: {}", marker, step, body);
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .init();

    let bridge_url = match cli.bridge_url {
        Some(url) => url,
        None => std::env::var("ROS2_WS_URL").context("No --bridge-url given and ROS2_WS_URL is unset")?,
    };
    let connector = Arc::new(
        WsConnector::new(bridge_url.clone())
            .with_connect_timeout(Duration::from_secs(cli.connect_timeout)),
    );

    println!("Checking rosbridge at {}", bridge_url);

    let mut bridge = connector
        .connect()
        .await
        .with_context(|| format!("Could not connect to {}", bridge_url))?;
    bridge.close().await.context("Closing the probe connection failed")?;
    println!("[ok  ] connect/close");

    let service = DeliveryService::new(connector);

    let restaurants = service.get_restaurant_options().await;
    report("restaurants", &restaurants);

    let request = OrderRequest::new(
        "rest_123",
        "Live Check",
        DeliveryLocation {
            lat: 37.7749,
            lng: -122.4194,
        },
        vec!["pizza".to_string(), "soda".to_string()],
    )
    .special_instructions("Smoke test order");
    let placed = service.create_delivery_order(request).await;
    report("create order", &placed);

    let Some(order) = placed.payload() else {
        println!("[skip] track status: no order id");
        return Ok(());
    };
    let status = service
        .track_order_status(&order.order_id, Duration::from_secs(cli.duration))
        .await;
    report("track status", &status);

    Ok(())
}
