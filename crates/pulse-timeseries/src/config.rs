//! Query Limits Configuration
//!
//! Request caps and registry exclusions, passed explicitly into
//! [`TimeseriesService`](crate::TimeseriesService) instead of living as
//! ambient state in the caller layer. Default substitution of user ids or
//! dates stays with the caller; only validation limits live here.

/// Limits applied to query entry points before any storage round-trip.
#[derive(Debug, Clone)]
pub struct QueryLimits {
    /// Maximum range span for single-series queries, in days.
    pub max_range_days: i64,
    /// Maximum range span for multi-series queries, in days.
    pub max_multi_range_days: i64,
    /// Maximum number of users per multi-series fan-out.
    pub max_fanout_users: usize,
    /// User ids hidden from the registry (ETL sentinel rows).
    pub excluded_user_ids: Vec<String>,
}

impl Default for QueryLimits {
    fn default() -> Self {
        Self {
            max_range_days: 365,
            max_multi_range_days: 180,
            max_fanout_users: 5,
            excluded_user_ids: vec!["default_user".to_string()],
        }
    }
}

impl QueryLimits {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_range_days: std::env::var("PULSE_MAX_RANGE_DAYS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_range_days),
            max_multi_range_days: std::env::var("PULSE_MAX_MULTI_RANGE_DAYS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_multi_range_days),
            max_fanout_users: std::env::var("PULSE_MAX_FANOUT_USERS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_fanout_users),
            excluded_user_ids: std::env::var("PULSE_EXCLUDED_USER_IDS")
                .map(|v| {
                    v.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or(defaults.excluded_user_ids),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limits_default() {
        let limits = QueryLimits::default();
        assert_eq!(limits.max_range_days, 365);
        assert_eq!(limits.max_multi_range_days, 180);
        assert_eq!(limits.max_fanout_users, 5);
        assert_eq!(limits.excluded_user_ids, vec!["default_user".to_string()]);
    }
}
