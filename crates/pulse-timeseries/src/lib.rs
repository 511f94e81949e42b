//! Pulse Timeseries Query Engine
//!
//! Automatic query-resolution and multi-table aggregation for heart-rate
//! telemetry stored in TimescaleDB:
//! - Resolution selector: routes a time range to the raw hypertable or one of
//!   the 1m/1h/1d continuous aggregates, bounding the rows scanned regardless
//!   of the requested span.
//! - Query builder: parameterized range + group-by queries over whichever
//!   read path was selected, with optional re-aggregation to an explicit
//!   output interval.
//! - Single-user fetch and concurrent multi-user fan-out, preserving the
//!   caller's user ordering.
//!
//! The HTTP layer, ETL pipeline, and data generator live in sibling services;
//! this crate is the library surface they call into.

mod config;
mod error;
mod query;
mod service;
mod store;
mod tier;
mod types;


pub use config::QueryLimits;
pub use error::{Result, TimeseriesError};
pub use query::{build_series_query, round2, SeriesQuery, UserFilter};
pub use service::TimeseriesService;
pub use store::{PgSeriesStore, SeriesStore};
pub use tier::{select_tier, TierDescriptor};
pub use types::{BucketInterval, QueryInfo, UserSeries};

/// Re-export the row-level types for callers that only pull in this crate.
pub use pulse_tsdb::{HeartRatePoint, UserEntry};
