//! Pulse TimescaleDB Client
//!
//! PostgreSQL wire-protocol access to the heart-rate telemetry store.
//! Provides connection pooling, schema bootstrap for the raw hypertable and
//! its continuous aggregates, and the row-level domain types.

mod error;
mod pool;
mod schema;
mod types;

pub use error::{Result, TsdbError};
pub use pool::{PoolConfig, PoolStats, TsdbPool};
pub use schema::ensure_schema;
pub use types::*;

/// Re-export tokio-postgres types for convenience
pub use tokio_postgres::{types::ToSql, Row, Statement};
