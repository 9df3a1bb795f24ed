//! Telemetry publishing.
//!
//! Every poll produces a [`TelemetryRecord`] that is pushed to a
//! [`TelemetrySink`]. Publishing is best effort: failures are logged and the
//! next tick supersedes the lost record.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::task::JoinHandle;

use crate::error::{PointingError, PointingResult};
use crate::models::TelescopeStatus;

/// A telemetry record as a JSON object.
pub type Record = Map<String, Value>;

/// Fixed field set sent to the telemetry receiver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    pub tag: i32,
    pub hour_angle: f64,
    pub declination: f64,
    pub azimuth: f64,
    pub elevation: f64,
    pub tracking: bool,
    /// Reserved for dome hardware.
    pub dome_position: i32,
    /// Reserved for dome hardware.
    pub slit_status: i32,
}

impl TelemetryRecord {
    pub fn from_status(status: &TelescopeStatus) -> Self {
        Self {
            tag: 0,
            hour_angle: status.hour_angle,
            declination: status.declination,
            azimuth: status.azimuth,
            elevation: status.elevation,
            tracking: status.tracking,
            dome_position: 0,
            slit_status: 0,
        }
    }

    pub fn to_map(&self) -> Record {
        let mut map = Map::new();
        map.insert("tag".into(), self.tag.into());
        map.insert("hour_angle".into(), self.hour_angle.into());
        map.insert("declination".into(), self.declination.into());
        map.insert("azimuth".into(), self.azimuth.into());
        map.insert("elevation".into(), self.elevation.into());
        map.insert("tracking".into(), self.tracking.into());
        map.insert("dome_position".into(), self.dome_position.into());
        map.insert("slit_status".into(), self.slit_status.into());
        map
    }
}

/// Destination for telemetry records.
#[async_trait]
pub trait TelemetrySink: Send + Sync {
    /// Deliver one record. No acknowledgement beyond success or failure.
    async fn send(&self, record: &Record) -> Result<(), String>;
}

/// In-memory sink, for tests and for running without a receiver.
#[derive(Default)]
pub struct MemorySink {
    records: Mutex<Vec<Record>>,
    failure: Mutex<Option<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following `send` fail with `message`.
    pub fn fail_with(&self, message: impl Into<String>) {
        *self.failure.lock() = Some(message.into());
    }

    pub fn recover(&self) {
        *self.failure.lock() = None;
    }

    pub fn records(&self) -> Vec<Record> {
        self.records.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

#[async_trait]
impl TelemetrySink for MemorySink {
    async fn send(&self, record: &Record) -> Result<(), String> {
        let failure = self.failure.lock().clone();
        if let Some(message) = failure {
            return Err(message);
        }
        self.records.lock().push(record.clone());
        Ok(())
    }
}

/// Sink that POSTs each record as JSON.
#[cfg(feature = "http-telemetry")]
pub struct HttpSink {
    client: reqwest::Client,
    endpoint: String,
}

#[cfg(feature = "http-telemetry")]
impl HttpSink {
    /// `base_url` + `path`, e.g. `http://dome:5000` + `/api/telescope/position`.
    pub fn new(base_url: &str, path: &str, timeout: Duration) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| format!("Failed to build HTTP client: {}", e))?;
        let endpoint = format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[cfg(feature = "http-telemetry")]
#[async_trait]
impl TelemetrySink for HttpSink {
    async fn send(&self, record: &Record) -> Result<(), String> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(record)
            .send()
            .await
            .map_err(|e| format!("Failed to post telemetry: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<empty response>".to_string());
            return Err(format!(
                "Telemetry receiver answered {}: {}",
                status,
                body.trim()
            ));
        }
        Ok(())
    }
}

/// Publishes status snapshots to a sink with a bounded wait.
#[derive(Clone)]
pub struct TelemetryPublisher {
    sink: Arc<dyn TelemetrySink>,
    timeout: Duration,
}

impl TelemetryPublisher {
    pub fn new(sink: Arc<dyn TelemetrySink>, timeout: Duration) -> Self {
        Self { sink, timeout }
    }

    /// Serialize and send one snapshot.
    ///
    /// # Errors
    /// `Sink` when delivery fails or exceeds the timeout. The failure is
    /// already logged; callers are not expected to retry.
    pub async fn publish(&self, status: &TelescopeStatus) -> PointingResult<()> {
        let record = TelemetryRecord::from_status(status).to_map();
        let outcome = match tokio::time::timeout(self.timeout, self.sink.send(&record)).await {
            Ok(result) => result,
            Err(_) => Err(format!("no answer within {:?}", self.timeout)),
        };

        outcome.map_err(|message| {
            log::warn!("Telemetry publish failed: {}", message);
            PointingError::Sink(message)
        })
    }

    /// Publish on a separate task so the caller never waits on the sink.
    pub fn publish_in_background(&self, status: TelescopeStatus) -> JoinHandle<PointingResult<()>> {
        let publisher = self.clone();
        tokio::spawn(async move { publisher.publish(&status).await })
    }
}
