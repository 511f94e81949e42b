//! Storage Seam
//!
//! The engine reaches storage through the [`SeriesStore`] trait so the fetch
//! and fan-out layers can be exercised against an in-memory fake. The
//! production implementation wraps the shared TimescaleDB pool and performs
//! exactly one pooled round-trip per call.

use async_trait::async_trait;
use tracing::debug;

use crate::query::{round2, SeriesQuery, UserFilter};
use pulse_tsdb::{HeartRatePoint, ToSql, TsdbError, TsdbPool, UserEntry};

/// Read access to the telemetry store.
#[async_trait]
pub trait SeriesStore: Send + Sync + 'static {
    /// Execute a built series query and return its typed rows.
    async fn fetch_points(&self, query: &SeriesQuery) -> pulse_tsdb::Result<Vec<HeartRatePoint>>;

    /// List distinct known users with coverage statistics, excluding the
    /// given reserved ids.
    async fn fetch_users(&self, excluded: &[String]) -> pulse_tsdb::Result<Vec<UserEntry>>;
}

const USERS_SQL: &str = "SELECT user_id, COUNT(*) AS record_count, \
     MIN(timestamp) AS first_record, MAX(timestamp) AS last_record \
     FROM activities_heart_intraday \
     WHERE user_id IS NOT NULL AND user_id <> '' AND user_id <> ALL($1) \
     GROUP BY user_id \
     ORDER BY last_record DESC, user_id ASC";

/// [`SeriesStore`] backed by the TimescaleDB connection pool.
pub struct PgSeriesStore {
    pool: TsdbPool,
}

impl PgSeriesStore {
    pub fn new(pool: TsdbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SeriesStore for PgSeriesStore {
    async fn fetch_points(&self, query: &SeriesQuery) -> pulse_tsdb::Result<Vec<HeartRatePoint>> {
        let conn = self.pool.get().await?;

        debug!(sql = query.sql.as_str(), "Executing series query");

        let rows = match &query.filter {
            UserFilter::One(user_id) => {
                let params: [&(dyn ToSql + Sync); 3] = [&query.start, &query.end, user_id];
                conn.query(query.sql.as_str(), &params).await
            }
            UserFilter::Many(user_ids) => {
                let params: [&(dyn ToSql + Sync); 3] = [&query.start, &query.end, user_ids];
                conn.query(query.sql.as_str(), &params).await
            }
        }
        .map_err(TsdbError::Query)?;

        let points = rows
            .iter()
            .map(|row| HeartRatePoint {
                timestamp: row.get(0),
                value: round2(row.get(1)),
                user_id: row.get(2),
            })
            .collect();

        Ok(points)
    }

    async fn fetch_users(&self, excluded: &[String]) -> pulse_tsdb::Result<Vec<UserEntry>> {
        let conn = self.pool.get().await?;
        let excluded = excluded.to_vec();

        let rows = conn
            .query(USERS_SQL, &[&excluded])
            .await
            .map_err(TsdbError::Query)?;

        let users = rows
            .iter()
            .map(|row| UserEntry {
                user_id: row.get(0),
                record_count: row.get(1),
                first_record: row.get(2),
                last_record: row.get(3),
            })
            .collect();

        Ok(users)
    }
}
