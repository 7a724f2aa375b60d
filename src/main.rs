use std::process::ExitCode;

use pihole_influx_forwarder::config::{Config, ConfigError};
use pihole_influx_forwarder::services::forwarder::{wait_for_signal, Forwarder};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pihole_influx_forwarder=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(ConfigError::Missing(missing)) => {
            for var in missing {
                tracing::error!("{} missing. Current value: {}=", var.description, var.name);
            }
            return ExitCode::from(1);
        }
        Err(e) => {
            tracing::error!("{}", e);
            return ExitCode::from(1);
        }
    };

    let forwarder = Forwarder::from_config(&config);
    forwarder.start();

    let signal = wait_for_signal().await;
    tracing::info!("{} received", signal);
    forwarder.stop(signal).await;

    ExitCode::SUCCESS
}
