//! OPD Telescope HTTP Server Binary
//!
//! Connects the configured mount, starts the status polling loop and serves
//! the REST control surface.
//!
//! # Usage
//!
//! ```bash
//! # Simulated mount with default OPD site
//! cargo run --bin opd-server
//!
//! # Custom configuration and telemetry receiver
//! MOUNT_CONFIG=./mount.toml RUST_LOG=debug cargo run --bin opd-server
//! ```
//!
//! # Environment Variables
//!
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 8080)
//! - `MOUNT_CONFIG`: Path to the TOML configuration (default: search `mount.toml`)
//! - `MOUNT_DEVICE`: Override the configured device type
//! - `RUST_LOG`: Log level (default: info)

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use opd_telescope::device::DeviceFactory;
use opd_telescope::http::{create_router, AppState};
use opd_telescope::services::{PointingController, Poller, TelemetryPublisher};
use opd_telescope::MountConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting OPD telescope server");

    let config = MountConfig::from_env()?;
    let site = config.site()?;
    info!(
        "Observer site lat={:.4}° lon={:.4}°",
        site.latitude(),
        site.longitude()
    );

    let device = DeviceFactory::from_config(&config)?;
    info!("Mount driver: {}", device.name());

    let controller = Arc::new(PointingController::new(device, site));
    if let Err(e) = controller.connect().await {
        warn!("Mount not connected at startup: {}", e);
    }

    let publisher = telemetry_publisher(&config)?;
    let poller = Poller::spawn(controller.clone(), publisher, config.poll_interval());

    let state = AppState::new(
        controller.clone(),
        config.command_cooldown(),
        config.controller.jog_rate,
    );
    info!("Command cooldown: {:?}", state.gate.cooldown());
    let app = create_router(state);

    // Determine bind address
    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8080);
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down");
    poller.shutdown().await;
    if let Err(e) = controller.disconnect().await {
        warn!("Disconnect failed: {}", e);
    }

    Ok(())
}

#[cfg(feature = "http-telemetry")]
fn telemetry_publisher(config: &MountConfig) -> anyhow::Result<Option<TelemetryPublisher>> {
    use opd_telescope::services::HttpSink;

    let Some(url) = config.telemetry.url.as_deref() else {
        info!("No telemetry URL configured, publishing disabled");
        return Ok(None);
    };
    let sink = HttpSink::new(url, &config.telemetry.path, config.telemetry_timeout())
        .map_err(|e| anyhow::anyhow!(e))?;
    info!("Publishing telemetry to {}", sink.endpoint());
    Ok(Some(TelemetryPublisher::new(
        Arc::new(sink),
        config.telemetry_timeout(),
    )))
}

#[cfg(not(feature = "http-telemetry"))]
fn telemetry_publisher(config: &MountConfig) -> anyhow::Result<Option<TelemetryPublisher>> {
    if config.telemetry.url.is_some() {
        warn!("Telemetry URL configured but the http-telemetry feature is disabled");
    }
    Ok(None)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
}
