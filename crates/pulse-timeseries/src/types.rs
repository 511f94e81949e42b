//! Response Assembly Types

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TimeseriesError;
use crate::tier::TierDescriptor;
use pulse_tsdb::HeartRatePoint;

/// Output bucket width for explicit re-aggregation.
///
/// A closed set of granularities selected by their wire labels; parsing an
/// unknown label is an [`TimeseriesError::InvalidInterval`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BucketInterval {
    #[serde(rename = "1s")]
    Second,
    #[serde(rename = "1m")]
    Minute,
    #[serde(rename = "1h")]
    Hour,
    #[serde(rename = "1d")]
    Day,
}

impl BucketInterval {
    /// Wire label, as echoed in query metadata.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Second => "1s",
            Self::Minute => "1m",
            Self::Hour => "1h",
            Self::Day => "1d",
        }
    }

    /// Argument for TimescaleDB's `time_bucket`.
    pub fn pg_interval(&self) -> &'static str {
        match self {
            Self::Second => "1 second",
            Self::Minute => "1 minute",
            Self::Hour => "1 hour",
            Self::Day => "1 day",
        }
    }
}

impl FromStr for BucketInterval {
    type Err = TimeseriesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1s" => Ok(Self::Second),
            "1m" => Ok(Self::Minute),
            "1h" => Ok(Self::Hour),
            "1d" => Ok(Self::Day),
            other => Err(TimeseriesError::InvalidInterval(other.to_string())),
        }
    }
}

impl fmt::Display for BucketInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Metadata describing the query a response was served from.
///
/// One instance per logical query; a multi-user response shares a single
/// `QueryInfo` since every user in one call resolves to the same tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryInfo {
    pub interval: String,
    pub table_used: String,
    #[serde(rename = "table_description")]
    pub description: String,
}

impl QueryInfo {
    /// Build metadata for a resolved tier, echoing the explicit output
    /// interval when one was requested.
    pub fn new(tier: &TierDescriptor, interval: Option<BucketInterval>) -> Self {
        Self {
            interval: interval
                .map(|i| i.label().to_string())
                .unwrap_or_else(|| tier.label.to_string()),
            table_used: tier.table.to_string(),
            description: tier.description.to_string(),
        }
    }
}

/// One user's ordered series for a single request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSeries {
    pub user_id: String,
    #[serde(rename = "data")]
    pub points: Vec<HeartRatePoint>,
    pub count: usize,
}

impl UserSeries {
    pub fn new(user_id: String, points: Vec<HeartRatePoint>) -> Self {
        Self {
            count: points.len(),
            user_id,
            points,
        }
    }
}
