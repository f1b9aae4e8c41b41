//! Live activity metrics for users with a connected wearable.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use rand::Rng;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::entities::wearable::WearableMetrics;

/// Device reported by the simulated provider
pub const SIMULATED_DEVICE: &str = "Apple Watch Series 7";

const HEART_RATE_READINGS: usize = 24;
const HEART_RATE_MIN: i32 = 40;
const HEART_RATE_MAX: i32 = 120;

/// Metrics provider errors
#[derive(Debug, Error)]
pub enum MetricsError {
    /// The user id cannot be looked up
    #[error("Invalid user id: {0}")]
    InvalidUser(String),

    /// The upstream source did not answer
    #[error("Metrics provider unavailable: {0}")]
    Unavailable(String),
}

/// Source of live wearable metrics
#[async_trait]
pub trait WearableMetricsProvider: Send + Sync {
    /// Fetch the current metrics of one user
    async fn fetch_metrics(&self, user_id: &str) -> Result<WearableMetrics, MetricsError>;
}

/// Provider that fabricates plausible metrics after a fixed delay
#[derive(Debug, Clone)]
pub struct SimulatedMetricsProvider {
    latency: Duration,
}

impl SimulatedMetricsProvider {
    /// Delay used when none is configured
    pub const DEFAULT_LATENCY: Duration = Duration::from_millis(500);

    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }
}

impl Default for SimulatedMetricsProvider {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LATENCY)
    }
}

#[async_trait]
impl WearableMetricsProvider for SimulatedMetricsProvider {
    #[instrument(skip(self))]
    async fn fetch_metrics(&self, user_id: &str) -> Result<WearableMetrics, MetricsError> {
        if user_id.trim().is_empty() {
            return Err(MetricsError::InvalidUser("user id is empty".to_string()));
        }

        tokio::time::sleep(self.latency).await;

        let metrics = generate_metrics(&mut rand::thread_rng(), Utc::now());
        debug!("Simulated {} steps for {}", metrics.steps, user_id);
        Ok(metrics)
    }
}

/// Random metrics within realistic daily ranges
pub fn generate_metrics<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Utc>) -> WearableMetrics {
    WearableMetrics {
        steps: rng.gen_range(5000..20000),
        heart_rate: generate_heart_rate(rng),
        calories_burned: Some(rng.gen_range(200..1000)),
        sleep_hours: Some(rng.gen_range(6.0..10.0)),
        distance: Some(rng.gen_range(2.0..12.0)),
        device_type: Some(SIMULATED_DEVICE.to_string()),
        last_updated: now,
    }
}

/// Hourly readings scattered around a resting base rate
fn generate_heart_rate<R: Rng + ?Sized>(rng: &mut R) -> Vec<u16> {
    let base: i32 = rng.gen_range(60..80);

    (0..HEART_RATE_READINGS)
        .map(|_| {
            let variation: i32 = rng.gen_range(-10..10);
            (base + variation).clamp(HEART_RATE_MIN, HEART_RATE_MAX) as u16
        })
        .collect()
}

/// Fetch metrics for several users concurrently.
///
/// A user whose fetch fails gets an empty record; the batch itself never fails.
pub async fn fetch_metrics_for_users(
    provider: &dyn WearableMetricsProvider,
    user_ids: &[String],
) -> BTreeMap<String, WearableMetrics> {
    let fetches = user_ids.iter().map(|user_id| async move {
        let metrics = match provider.fetch_metrics(user_id).await {
            Ok(metrics) => metrics,
            Err(e) => {
                warn!("Error fetching metrics for user {}: {}", user_id, e);
                WearableMetrics::empty(Utc::now())
            }
        };
        (user_id.clone(), metrics)
    });

    join_all(fetches).await.into_iter().collect()
}
