//! Schema bootstrap for the heart-rate hypertable and its aggregates.
//!
//! Idempotent: every statement is guarded with IF NOT EXISTS so the bootstrap
//! can run on every deployment start. Continuous aggregate creation cannot run
//! inside a transaction block, so each statement executes on its own.

use tracing::info;

use crate::{Result, TsdbError, TsdbPool};

const CREATE_RAW_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS activities_heart_intraday (
        timestamp TIMESTAMPTZ NOT NULL,
        value DOUBLE PRECISION,
        user_id TEXT NOT NULL
    )";

const CREATE_HYPERTABLE: &str =
    "SELECT create_hypertable('activities_heart_intraday', 'timestamp', if_not_exists => TRUE)";

// Composite key index backing the ETL's upsert path.
const CREATE_UNIQUE_INDEX: &str = "
    CREATE UNIQUE INDEX IF NOT EXISTS idx_activities_heart_intraday_timestamp_user_id
    ON activities_heart_intraday (timestamp, user_id)";

const CREATE_1M_VIEW: &str = "
    CREATE MATERIALIZED VIEW IF NOT EXISTS activities_heart_intraday_1m
    WITH (timescaledb.continuous) AS
    SELECT
      user_id,
      time_bucket('1 minute', timestamp) AS minute,
      ROUND(MIN(value)::numeric, 2) AS min_heart_rate,
      ROUND(MAX(value)::numeric, 2) AS max_heart_rate,
      ROUND(AVG(value)::numeric, 2) AS avg_heart_rate,
      COUNT(*) AS record_count
    FROM activities_heart_intraday
    GROUP BY user_id, minute
    WITH NO DATA";

const CREATE_1H_VIEW: &str = "
    CREATE MATERIALIZED VIEW IF NOT EXISTS activities_heart_intraday_1h
    WITH (timescaledb.continuous) AS
    SELECT
      user_id,
      time_bucket('1 hour', timestamp) AS hour,
      ROUND(MIN(value)::numeric, 2) AS min_heart_rate,
      ROUND(MAX(value)::numeric, 2) AS max_heart_rate,
      ROUND(AVG(value)::numeric, 2) AS avg_heart_rate,
      COUNT(*) AS record_count
    FROM activities_heart_intraday
    GROUP BY user_id, hour
    WITH NO DATA";

const CREATE_1D_VIEW: &str = "
    CREATE MATERIALIZED VIEW IF NOT EXISTS activities_heart_intraday_1d
    WITH (timescaledb.continuous) AS
    SELECT
      user_id,
      time_bucket('1 day', timestamp) AS day,
      ROUND(MIN(value)::numeric, 2) AS min_heart_rate,
      ROUND(MAX(value)::numeric, 2) AS max_heart_rate,
      ROUND(AVG(value)::numeric, 2) AS avg_heart_rate,
      COUNT(*) AS record_count
    FROM activities_heart_intraday
    GROUP BY user_id, day
    WITH NO DATA";

/// Create the raw hypertable, its upsert index, and the 1m/1h/1d continuous
/// aggregates if they do not exist yet.
///
/// The query engine treats these four read paths as pre-provisioned; this
/// bootstrap is what provisions them on a fresh database.
pub async fn ensure_schema(pool: &TsdbPool) -> Result<()> {
    let conn = pool.get().await?;

    conn.batch_execute(CREATE_RAW_TABLE)
        .await
        .map_err(TsdbError::Query)?;
    conn.batch_execute(CREATE_HYPERTABLE)
        .await
        .map_err(TsdbError::Query)?;
    conn.batch_execute(CREATE_UNIQUE_INDEX)
        .await
        .map_err(TsdbError::Query)?;

    for (label, ddl) in [
        ("1m", CREATE_1M_VIEW),
        ("1h", CREATE_1H_VIEW),
        ("1d", CREATE_1D_VIEW),
    ] {
        conn.batch_execute(ddl).await.map_err(TsdbError::Query)?;
        info!(view = label, "Continuous aggregate view ready");
    }

    info!("Telemetry schema bootstrap complete");
    Ok(())
}
