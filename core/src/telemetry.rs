use std::time::{Duration, SystemTime};

use serde::Serialize;
use tokio::sync::Mutex;

use crate::error::PredictError;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StatsSnapshot {
    pub requests: u64,
    pub succeeded: u64,
    pub client_errors: u64,
    pub server_errors: u64,
    pub uptime: String,
}

#[derive(Debug, Default)]
struct StatsCounters {
    requests: u64,
    succeeded: u64,
    client_errors: u64,
    server_errors: u64,
}

pub struct TelemetryStore {
    start_time: SystemTime,
    stats: Mutex<StatsCounters>,
}

impl Default for TelemetryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryStore {
    pub fn new() -> Self {
        TelemetryStore {
            start_time: SystemTime::now(),
            stats: Mutex::new(StatsCounters::default()),
        }
    }

    pub async fn record<T>(&self, outcome: &Result<T, PredictError>) {
        let mut stats = self.stats.lock().await;
        stats.requests += 1;
        match outcome {
            Ok(_) => stats.succeeded += 1,
            Err(error) if error.is_client_error() => stats.client_errors += 1,
            Err(_) => stats.server_errors += 1,
        }
    }

    pub async fn snapshot_stats(&self) -> StatsSnapshot {
        let stats = self.stats.lock().await;
        StatsSnapshot {
            requests: stats.requests,
            succeeded: stats.succeeded,
            client_errors: stats.client_errors,
            server_errors: stats.server_errors,
            uptime: format_uptime(
                SystemTime::now()
                    .duration_since(self.start_time)
                    .unwrap_or(Duration::from_secs(0)),
            ),
        }
    }
}

fn format_uptime(duration: Duration) -> String {
    let total_minutes = duration.as_secs() / 60;
    let days = total_minutes / (24 * 60);
    let hours = (total_minutes / 60) % 24;
    let minutes = total_minutes % 60;
    format!("{}d {}h {}m", days, hours, minutes)
}
