//! Time-Series Query Service
//!
//! The upward-facing surface of the engine: single-series fetch, concurrent
//! multi-series fan-out, and the users registry passthrough. Range and
//! fan-out limits are applied here, before any storage round-trip.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::config::QueryLimits;
use crate::error::{Result, TimeseriesError};
use crate::query::{build_series_query, UserFilter};
use crate::store::{PgSeriesStore, SeriesStore};
use crate::tier::{select_tier, TierDescriptor};
use crate::types::{BucketInterval, QueryInfo, UserSeries};
use pulse_telemetry::Counter;
use pulse_tsdb::{TsdbPool, UserEntry};

/// Service for querying heart-rate series with automatic tier resolution.
pub struct TimeseriesService<S: SeriesStore = PgSeriesStore> {
    store: Arc<S>,
    limits: QueryLimits,
    query_counter: Counter,
}

impl TimeseriesService<PgSeriesStore> {
    /// Create a service over the shared TimescaleDB pool.
    pub fn from_pool(pool: TsdbPool, limits: QueryLimits) -> Self {
        Self::new(Arc::new(PgSeriesStore::new(pool)), limits)
    }
}

impl<S: SeriesStore> TimeseriesService<S> {
    pub fn new(store: Arc<S>, limits: QueryLimits) -> Self {
        Self {
            store,
            limits,
            query_counter: Counter::new("timeseries_queries_total"),
        }
    }

    /// Fetch one user's series over `[start, end]`.
    ///
    /// Selects the tier, builds the query, performs a single storage
    /// round-trip, and maps rows into an ordered [`UserSeries`]. Zero rows
    /// is a successful empty series. No retries happen at this layer.
    pub async fn fetch_series(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        interval: Option<BucketInterval>,
    ) -> Result<(UserSeries, QueryInfo)> {
        let tier = select_tier(start, end)?;
        check_range(start, end, self.limits.max_range_days)?;

        let info = QueryInfo::new(&tier, interval);
        let series = fetch_user_series(
            Arc::clone(&self.store),
            self.query_counter.clone(),
            tier,
            start,
            end,
            interval,
            user_id.to_string(),
        )
        .await?;

        Ok((series, info))
    }

    /// Fetch series for several users concurrently.
    ///
    /// The tier and its [`QueryInfo`] are resolved once (every user shares
    /// the same range, hence the same tier). One task per user runs against
    /// the pool; results are reassembled in input order no matter which
    /// backend round-trip finishes first. The first per-user failure aborts
    /// the whole call and the remaining tasks with it: all-or-nothing, no
    /// partial results. An empty user list returns an empty result without
    /// touching storage.
    pub async fn fetch_multi(
        &self,
        user_ids: &[String],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        interval: Option<BucketInterval>,
    ) -> Result<(Vec<UserSeries>, QueryInfo)> {
        let tier = select_tier(start, end)?;
        let info = QueryInfo::new(&tier, interval);

        if user_ids.is_empty() {
            return Ok((Vec::new(), info));
        }
        if user_ids.len() > self.limits.max_fanout_users {
            return Err(TimeseriesError::TooManyUsers {
                requested: user_ids.len(),
                max: self.limits.max_fanout_users,
            });
        }
        check_range(start, end, self.limits.max_multi_range_days)?;

        info!(
            users = user_ids.len(),
            table = tier.table,
            "Dispatching multi-user fan-out"
        );

        let mut tasks: JoinSet<(usize, Result<UserSeries>)> = JoinSet::new();
        for (idx, user_id) in user_ids.iter().enumerate() {
            let store = Arc::clone(&self.store);
            let counter = self.query_counter.clone();
            let user_id = user_id.clone();
            tasks.spawn(async move {
                let result =
                    fetch_user_series(store, counter, tier, start, end, interval, user_id).await;
                (idx, result)
            });
        }

        let mut slots: Vec<Option<UserSeries>> = user_ids.iter().map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            let (idx, result) = joined.map_err(|e| TimeseriesError::TaskJoin(e.to_string()))?;
            match result {
                Ok(series) => slots[idx] = Some(series),
                Err(err) => {
                    // Dropping the JoinSet aborts every outstanding fetch.
                    warn!(error = %err, "Fan-out aborted");
                    return Err(err);
                }
            }
        }

        let results = slots
            .into_iter()
            .map(|s| s.ok_or_else(|| TimeseriesError::TaskJoin("missing fan-out result".into())))
            .collect::<Result<Vec<_>>>()?;

        Ok((results, info))
    }

    /// List known users with coverage statistics, hiding the configured
    /// reserved ids.
    pub async fn list_users(&self) -> Result<Vec<UserEntry>> {
        self.query_counter.inc();
        let users = self.store.fetch_users(&self.limits.excluded_user_ids).await?;
        debug!(count = users.len(), "Listed users");
        Ok(users)
    }

    /// Total storage queries issued by this service instance.
    pub fn queries_issued(&self) -> u64 {
        self.query_counter.get()
    }
}

async fn fetch_user_series<S: SeriesStore>(
    store: Arc<S>,
    counter: Counter,
    tier: TierDescriptor,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    interval: Option<BucketInterval>,
    user_id: String,
) -> Result<UserSeries> {
    let query = build_series_query(
        &tier,
        start,
        end,
        UserFilter::One(user_id.clone()),
        interval,
    );

    counter.inc();
    debug!(user_id = %user_id, table = tier.table, "Fetching series");

    let points = store
        .fetch_points(&query)
        .await
        .map_err(|source| TimeseriesError::UserFetch {
            user_id: user_id.clone(),
            source,
        })?;

    Ok(UserSeries::new(user_id, points))
}

fn check_range(start: DateTime<Utc>, end: DateTime<Utc>, max_days: i64) -> Result<()> {
    let days = (end - start).num_days();
    if days > max_days {
        return Err(TimeseriesError::RangeTooLarge { days, max_days });
    }
    Ok(())
}
