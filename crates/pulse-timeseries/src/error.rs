//! Query Engine Error Types

use chrono::{DateTime, Utc};
use thiserror::Error;

use pulse_tsdb::TsdbError;

pub type Result<T> = std::result::Result<T, TimeseriesError>;

#[derive(Debug, Error)]
pub enum TimeseriesError {
    /// The requested range is inverted or empty. Rejected before tier
    /// selection; the engine never reorders a caller's range.
    #[error("Invalid time range: start {start} is not before end {end}")]
    InvalidRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("Invalid interval '{0}'. Valid options: 1s, 1m, 1h, 1d")]
    InvalidInterval(String),

    #[error("Date range spans {days} days, exceeding the {max_days}-day limit")]
    RangeTooLarge { days: i64, max_days: i64 },

    #[error("{requested} users requested, exceeding the limit of {max}")]
    TooManyUsers { requested: usize, max: usize },

    /// A storage round-trip failed while fetching one user's series. In the
    /// multi-user fan-out the first such failure aborts the whole call.
    #[error("Storage query failed for user '{user_id}': {source}")]
    UserFetch {
        user_id: String,
        #[source]
        source: TsdbError,
    },

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[from] TsdbError),

    #[error("Fan-out task failed: {0}")]
    TaskJoin(String),
}
