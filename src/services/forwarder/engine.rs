use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::modules::pihole::StatusSnapshot;
use crate::services::forwarder::mapper::map_snapshot;
use crate::services::influx::{InfluxError, InfluxWriter, PointSink, WriteHandle};
use crate::services::pihole::{PiHoleClient, PiHoleError};

#[derive(Debug, thiserror::Error)]
pub enum ForwardError {
    #[error("An error occurred requesting pihole data: {0}")]
    Fetch(#[from] PiHoleError),
    #[error("Error occurred writing data to InfluxDB: {0}")]
    Sink(#[from] InfluxError),
}

/// One scrape-map-write pass, shared by every tick
struct ForwardCycle {
    upstream: PiHoleClient,
    sink: Arc<dyn PointSink>,
    measurement: String,
}

impl ForwardCycle {
    async fn fetch(&self) -> Result<StatusSnapshot, PiHoleError> {
        self.upstream.fetch_summary().await
    }

    async fn handle_snapshot(&self, snapshot: &StatusSnapshot) -> Result<(), InfluxError> {
        tracing::debug!("Converting pihole response to influx points");
        let points = map_snapshot(snapshot, &self.measurement);

        if let Some(updated_at) = snapshot.gravity_last_updated.updated_at() {
            tracing::debug!("Gravity last updated at {}", updated_at);
        }

        tracing::debug!("Writing points to InfluxDB");
        let mut handle = WriteHandle::new(self.sink.as_ref());
        for point in points {
            handle.write_point(point);
        }

        handle.flush().await
    }

    async fn run(&self) -> Result<(), ForwardError> {
        let snapshot = self.fetch().await?;
        self.handle_snapshot(&snapshot).await?;
        Ok(())
    }

    /// Errors stop at the tick boundary
    async fn tick(&self) {
        tracing::debug!("Starting data scraping");
        if let Err(e) = self.run().await {
            tracing::error!("{}", e);
        }
    }
}

struct Running {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

/// Periodically forwards Pi-hole summary counters to InfluxDB
pub struct Forwarder {
    cycle: Arc<ForwardCycle>,
    interval: Duration,
    running: Mutex<Option<Running>>,
}

impl Forwarder {
    pub fn new(
        upstream: PiHoleClient,
        sink: Arc<dyn PointSink>,
        measurement: impl Into<String>,
        interval: Duration,
    ) -> Self {
        Self {
            cycle: Arc::new(ForwardCycle {
                upstream,
                sink,
                measurement: measurement.into(),
            }),
            interval,
            running: Mutex::new(None),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let sink = InfluxWriter::new(
            &config.sink_url,
            config.sink_token.clone(),
            config.sink_org.clone(),
            config.sink_bucket.clone(),
            config.sink_precision,
        );

        Self::new(
            PiHoleClient::new(config.upstream_url.clone()),
            Arc::new(sink),
            config.measurement_name.clone(),
            config.scrape_interval,
        )
    }

    pub fn is_running(&self) -> bool {
        self.lock_running().is_some()
    }

    /// Start the background polling loop. The first tick fires one interval
    /// from now. Does nothing if the loop is already running.
    pub fn start(&self) {
        let mut running = self.lock_running();
        if running.is_some() {
            tracing::debug!("Forwarder already running");
            return;
        }

        tracing::info!("Application to forward PiHole metrics to InfluxDB started");
        tracing::info!(
            "Forwarding at an interval of {} seconds",
            self.interval.as_secs_f64()
        );

        let token = CancellationToken::new();
        let handle = tokio::spawn(run_loop(
            self.cycle.clone(),
            self.interval,
            token.clone(),
        ));

        *running = Some(Running { token, handle });
    }

    /// Stop the polling loop. Returns false when no loop was running.
    pub async fn stop(&self, signal: &str) -> bool {
        tracing::info!("Stop signal received: {}", signal);

        let running = self.lock_running().take();
        let Some(Running { token, handle }) = running else {
            return false;
        };

        token.cancel();
        if let Err(e) = handle.await {
            tracing::error!("Forwarder loop ended abnormally: {}", e);
        }

        true
    }

    /// Fetch the current snapshot from the upstream endpoint
    pub async fn fetch(&self) -> Result<StatusSnapshot, PiHoleError> {
        self.cycle.fetch().await
    }

    /// Map a snapshot, write both points and wait for the flush
    pub async fn handle_snapshot(&self, snapshot: &StatusSnapshot) -> Result<(), InfluxError> {
        self.cycle.handle_snapshot(snapshot).await
    }

    /// Run a single fetch-map-write pass outside of the timer
    pub async fn run_once(&self) -> Result<(), ForwardError> {
        self.cycle.run().await
    }

    fn lock_running(&self) -> std::sync::MutexGuard<'_, Option<Running>> {
        // The guarded state is a plain Option, so a poisoned lock is still usable
        self.running.lock().unwrap_or_else(|e| e.into_inner())
    }
}

async fn run_loop(cycle: Arc<ForwardCycle>, period: Duration, token: CancellationToken) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    // Ticks are not serialised: a slow cycle may still be running when the next one starts
    let mut in_flight = JoinSet::new();

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = ticker.tick() => {
                while in_flight.try_join_next().is_some() {}
                let cycle = cycle.clone();
                in_flight.spawn(async move { cycle.tick().await });
            }
        }
    }

    if !in_flight.is_empty() {
        tracing::warn!("Abandoning {} in-flight scrape(s)", in_flight.len());
    }
    in_flight.shutdown().await;
}
