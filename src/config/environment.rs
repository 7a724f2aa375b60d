use std::env;
use std::time::Duration;

use crate::services::influx::WritePrecision;

pub const DEFAULT_SINK_URL: &str = "http://localhost:8086";
pub const DEFAULT_BUCKET: &str = "pihole";
pub const DEFAULT_MEASUREMENT_NAME: &str = "pihole";
pub const DEFAULT_SCRAPE_INTERVAL_MS: u64 = 60_000;

/// A required variable that was unset or empty at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingVar {
    pub name: &'static str,
    pub description: &'static str,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variables: {}", names(.0))]
    Missing(Vec<MissingVar>),
    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

fn names(missing: &[MissingVar]) -> String {
    missing.iter().map(|m| m.name).collect::<Vec<_>>().join(", ")
}

/// Environment configuration
/// Resolved once at startup and handed to the forwarder
#[derive(Debug, Clone)]
pub struct Config {
    pub sink_url: String,
    pub sink_token: String,
    pub sink_org: String,
    pub sink_bucket: String,
    pub measurement_name: String,
    pub sink_precision: WritePrecision,
    pub upstream_url: String,
    pub scrape_interval: Duration,
}

impl Config {
    /// Read the process environment; `.env` loading is left to the binary
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Resolve configuration from an arbitrary key lookup.
    /// Empty values are treated the same as unset ones.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let mut missing = Vec::new();
        let mut required = |name: &'static str, description: &'static str| {
            get(name).unwrap_or_else(|| {
                missing.push(MissingVar { name, description });
                String::new()
            })
        };

        let sink_token = required("SINK_TOKEN", "Sink API token");
        let sink_org = required("SINK_ORG", "Sink organisation");
        let upstream_url = required("UPSTREAM_URL", "Upstream status endpoint URL");

        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        let sink_precision = match get("SINK_PRECISION") {
            Some(value) => value
                .parse::<WritePrecision>()
                .map_err(|_| ConfigError::Invalid { name: "SINK_PRECISION", value })?,
            None => WritePrecision::default(),
        };

        Ok(Self {
            sink_url: get("SINK_URL").unwrap_or_else(|| DEFAULT_SINK_URL.to_string()),
            sink_token,
            sink_org,
            sink_bucket: get("SINK_BUCKET").unwrap_or_else(|| DEFAULT_BUCKET.to_string()),
            measurement_name: get("SINK_MEASUREMENT_NAME")
                .unwrap_or_else(|| DEFAULT_MEASUREMENT_NAME.to_string()),
            sink_precision,
            upstream_url,
            scrape_interval: parse_interval(get("SCRAPE_INTERVAL").as_deref()),
        })
    }
}

/// Unparsable or zero intervals fall back to the default
fn parse_interval(raw: Option<&str>) -> Duration {
    let millis = raw
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|ms| *ms > 0)
        .unwrap_or_else(|| {
            if let Some(v) = raw {
                tracing::warn!("Ignoring SCRAPE_INTERVAL={}, using {}ms", v, DEFAULT_SCRAPE_INTERVAL_MS);
            }
            DEFAULT_SCRAPE_INTERVAL_MS
        });
    Duration::from_millis(millis)
}
