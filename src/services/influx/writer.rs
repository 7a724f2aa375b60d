use async_trait::async_trait;
use reqwest::Client;

use crate::services::influx::{InfluxError, MetricPoint, WritePrecision};

/// Destination for metric points
#[async_trait]
pub trait PointSink: Send + Sync {
    /// Send one batch and wait for the server to accept it
    async fn write_batch(&self, points: &[MetricPoint]) -> Result<(), InfluxError>;
}

/// Per-tick write handle: buffers points until `flush`.
/// Each tick owns its own handle, so overlapping ticks never share a batch.
pub struct WriteHandle<'a> {
    sink: &'a dyn PointSink,
    pending: Vec<MetricPoint>,
}

impl<'a> WriteHandle<'a> {
    pub fn new(sink: &'a dyn PointSink) -> Self {
        Self {
            sink,
            pending: Vec::new(),
        }
    }

    pub fn write_point(&mut self, point: MetricPoint) {
        self.pending.push(point);
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Send every buffered point. A failed batch is dropped, never retried.
    pub async fn flush(&mut self) -> Result<(), InfluxError> {
        let batch = std::mem::take(&mut self.pending);
        if batch.is_empty() {
            return Ok(());
        }
        self.sink.write_batch(&batch).await
    }
}

/// InfluxDB v2 write API client.
/// One instance is shared by every tick for the life of the process.
pub struct InfluxWriter {
    client: Client,
    write_url: String,
    token: String,
    org: String,
    bucket: String,
    precision: WritePrecision,
}

impl InfluxWriter {
    pub fn new(
        url: &str,
        token: impl Into<String>,
        org: impl Into<String>,
        bucket: impl Into<String>,
        precision: WritePrecision,
    ) -> Self {
        Self {
            client: Client::new(),
            write_url: format!("{}/api/v2/write", url.trim_end_matches('/')),
            token: token.into(),
            org: org.into(),
            bucket: bucket.into(),
            precision,
        }
    }

    pub fn precision(&self) -> WritePrecision {
        self.precision
    }
}

#[async_trait]
impl PointSink for InfluxWriter {
    async fn write_batch(&self, points: &[MetricPoint]) -> Result<(), InfluxError> {
        let body = points
            .iter()
            .filter_map(|point| point.to_line_protocol(self.precision))
            .collect::<Vec<_>>()
            .join("\n");

        if body.is_empty() {
            return Ok(());
        }

        let response = self
            .client
            .post(&self.write_url)
            .query(&[
                ("org", self.org.as_str()),
                ("bucket", self.bucket.as_str()),
                ("precision", self.precision.as_str()),
            ])
            .header("Authorization", format!("Token {}", self.token))
            .header("Content-Type", "text/plain; charset=utf-8")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(InfluxError::Status {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!("Wrote {} points to InfluxDB", points.len());
        Ok(())
    }
}
