//! Query Builder
//!
//! Builds parameterized range + group-by queries against whichever read path
//! the resolution selector chose. Table and column names come from the
//! closed set of tier descriptors and the closed interval enum; every
//! caller-supplied value is bound through `$n` placeholders.

use chrono::{DateTime, Utc};

use crate::tier::TierDescriptor;
use crate::types::BucketInterval;

/// User-id constraint for a series query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserFilter {
    One(String),
    Many(Vec<String>),
}

impl UserFilter {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::One(_) => false,
            Self::Many(ids) => ids.is_empty(),
        }
    }

    fn predicate(&self) -> &'static str {
        match self {
            Self::One(_) => "user_id = $3",
            Self::Many(_) => "user_id = ANY($3)",
        }
    }
}

/// A built series query: SQL text plus the typed values the store binds as
/// `$1` (range start), `$2` (range end), and `$3` (user filter).
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesQuery {
    pub sql: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub filter: UserFilter,
}

/// Build the range query for a resolved tier.
///
/// Without an explicit interval the tier is read natively: its rows are
/// already at the right granularity, so no grouping is needed. With an
/// explicit interval the output is re-aggregated on top of the tier via
/// `time_bucket`, which also covers requesting coarser output than the
/// selector chose (e.g. hourly buckets over a raw-tier range).
///
/// The range predicate is inclusive on both ends. Rows are ordered by time
/// then user_id so multi-user result sets interleave deterministically.
pub fn build_series_query(
    tier: &TierDescriptor,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    filter: UserFilter,
    interval: Option<BucketInterval>,
) -> SeriesQuery {
    let time = tier.time_column;
    let value = tier.value_column;
    let user_pred = filter.predicate();

    let sql = match interval {
        Some(bucket) => {
            let iv = bucket.pg_interval();
            format!(
                "SELECT time_bucket('{iv}', {time}) AS timestamp, \
                 ROUND(AVG({value})::numeric, 2)::float8 AS value, user_id \
                 FROM {table} \
                 WHERE {time} >= $1 AND {time} <= $2 AND {user_pred} AND {value} IS NOT NULL \
                 GROUP BY time_bucket('{iv}', {time}), user_id \
                 ORDER BY timestamp ASC, user_id ASC",
                table = tier.table,
            )
        }
        None => format!(
            "SELECT {time} AS timestamp, \
             ROUND({value}::numeric, 2)::float8 AS value, user_id \
             FROM {table} \
             WHERE {time} >= $1 AND {time} <= $2 AND {user_pred} AND {value} IS NOT NULL \
             ORDER BY {time} ASC, user_id ASC",
            table = tier.table,
        ),
    };

    SeriesQuery {
        sql,
        start,
        end,
        filter,
    }
}

/// Round to two decimals, half away from zero.
///
/// Matches Postgres `ROUND(numeric, 2)`, so values rounded by the database
/// and values rounded at the mapping layer agree.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tier::select_tier;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, 6, 1, 3, 0).unwrap()
    }

    fn raw_tier() -> TierDescriptor {
        select_tier(t0(), t0() + Duration::seconds(60)).unwrap()
    }

    fn day_tier() -> TierDescriptor {
        select_tier(t0(), t0() + Duration::days(10)).unwrap()
    }

    #[test]
    fn test_native_single_user_query_shape() {
        let q = build_series_query(
            &raw_tier(),
            t0(),
            t0() + Duration::seconds(60),
            UserFilter::One("user1".to_string()),
            None,
        );
        assert!(q.sql.contains("FROM activities_heart_intraday"));
        assert!(q.sql.contains("timestamp >= $1 AND timestamp <= $2"));
        assert!(q.sql.contains("user_id = $3"));
        assert!(q.sql.contains("value IS NOT NULL"));
        assert!(q.sql.contains("ORDER BY timestamp ASC, user_id ASC"));
        assert!(!q.sql.contains("GROUP BY"));
    }

    #[test]
    fn test_native_query_rounds_to_two_decimals() {
        let q = build_series_query(
            &day_tier(),
            t0(),
            t0() + Duration::days(10),
            UserFilter::One("user1".to_string()),
            None,
        );
        assert!(q.sql.contains("ROUND(avg_heart_rate::numeric, 2)"));
        assert!(q.sql.contains("FROM activities_heart_intraday_1d"));
        assert!(q.sql.contains("day >= $1 AND day <= $2"));
    }

    #[test]
    fn test_explicit_interval_reaggregates_on_top_of_tier() {
        // Short range resolves to raw, but hourly output was requested:
        // the builder re-buckets the raw rows at query time.
        let q = build_series_query(
            &raw_tier(),
            t0(),
            t0() + Duration::seconds(60),
            UserFilter::One("user1".to_string()),
            Some(BucketInterval::Hour),
        );
        assert!(q.sql.contains("time_bucket('1 hour', timestamp)"));
        assert!(q.sql.contains("ROUND(AVG(value)::numeric, 2)"));
        assert!(q.sql.contains("GROUP BY time_bucket('1 hour', timestamp), user_id"));
        assert!(q.sql.contains("ORDER BY timestamp ASC, user_id ASC"));
    }

    #[test]
    fn test_many_users_uses_set_membership() {
        let q = build_series_query(
            &day_tier(),
            t0(),
            t0() + Duration::days(10),
            UserFilter::Many(vec!["user1".to_string(), "user2".to_string()]),
            Some(BucketInterval::Day),
        );
        assert!(q.sql.contains("user_id = ANY($3)"));
        assert!(q.sql.contains("GROUP BY time_bucket('1 day', day), user_id"));
    }

    #[test]
    fn test_empty_filter_is_flagged_empty() {
        assert!(UserFilter::Many(vec![]).is_empty());
        assert!(!UserFilter::One("user1".to_string()).is_empty());
        assert!(!UserFilter::Many(vec!["user1".to_string()]).is_empty());
    }

    #[test]
    fn test_round2_half_away_from_zero() {
        // avg{70, 71} and avg{70, 71, 71}, the documented rounding contract
        assert_eq!(round2(141.0 / 2.0), 70.5);
        assert_eq!(round2(212.0 / 3.0), 70.67);
        assert_eq!(round2(70.005), 70.01);
        assert_eq!(round2(-70.005), -70.01);
        assert_eq!(round2(72.0), 72.0);
    }
}
