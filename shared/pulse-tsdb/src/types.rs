//! Common Types for the Telemetry Store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single heart-rate sample or pre-aggregated bucket value.
///
/// Rows from the raw hypertable carry per-second samples; rows from the
/// continuous aggregates carry the bucket start time and the bucket average.
/// Ordered by timestamp ascending within a series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartRatePoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    pub user_id: String,
}

/// A registered user with basic coverage statistics from the raw hypertable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserEntry {
    pub user_id: String,
    pub record_count: i64,
    pub first_record: DateTime<Utc>,
    pub last_record: DateTime<Utc>,
}
