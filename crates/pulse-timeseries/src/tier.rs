//! Resolution Selector
//!
//! Maps a requested time range to the read path that bounds the number of
//! rows scanned: raw per-second data for sub-2-minute ranges, then the 1m,
//! 1h, and 1d continuous aggregates as the range grows. Raw data at 1 Hz
//! over 7 days would be ~604,800 rows per user; routing the same span to
//! hourly aggregates caps it at 168.

use chrono::{DateTime, Duration, Utc};

use crate::error::{Result, TimeseriesError};
use crate::types::BucketInterval;

/// The resolved read path for one request: table or view name plus the
/// column-naming convention the query builder substitutes in. Every tier
/// exposes the same (time, value, user_id) shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierDescriptor {
    pub table: &'static str,
    pub time_column: &'static str,
    pub value_column: &'static str,
    /// Nominal bucket width of the pre-aggregated source; `None` for raw
    /// per-second rows.
    pub interval: Option<BucketInterval>,
    pub label: &'static str,
    pub description: &'static str,
}

const RAW: TierDescriptor = TierDescriptor {
    table: "activities_heart_intraday",
    time_column: "timestamp",
    value_column: "value",
    interval: None,
    label: "raw",
    description: "Raw heart rate data (per second)",
};

const MINUTE: TierDescriptor = TierDescriptor {
    table: "activities_heart_intraday_1m",
    time_column: "minute",
    value_column: "avg_heart_rate",
    interval: Some(BucketInterval::Minute),
    label: "1m",
    description: "1-minute aggregated heart rate data",
};

const HOUR: TierDescriptor = TierDescriptor {
    table: "activities_heart_intraday_1h",
    time_column: "hour",
    value_column: "avg_heart_rate",
    interval: Some(BucketInterval::Hour),
    label: "1h",
    description: "1-hour aggregated heart rate data",
};

const DAY: TierDescriptor = TierDescriptor {
    table: "activities_heart_intraday_1d",
    time_column: "day",
    value_column: "avg_heart_rate",
    interval: Some(BucketInterval::Day),
    label: "1d",
    description: "1-day aggregated heart rate data",
};

/// Resolve the read path for a time range.
///
/// Dispatch rules, first match wins:
/// - under 2 minutes: raw per-second data
/// - 2 minutes up to and including 2 hours: 1-minute aggregates
/// - over 2 hours up to and including 7 days: 1-hour aggregates
/// - over 7 days: 1-day aggregates
///
/// Fails only when `end <= start`; every entry point routes through here
/// before touching storage, so inverted ranges never reach the backend.
pub fn select_tier(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<TierDescriptor> {
    if end <= start {
        return Err(TimeseriesError::InvalidRange { start, end });
    }

    let duration = end - start;
    let tier = if duration < Duration::minutes(2) {
        RAW
    } else if duration <= Duration::hours(2) {
        MINUTE
    } else if duration <= Duration::days(7) {
        HOUR
    } else {
        DAY
    };
    Ok(tier)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, 6, 1, 0, 0).unwrap()
    }

    #[test]
    fn test_short_range_uses_raw() {
        let tier = select_tier(t0(), t0() + Duration::seconds(60)).unwrap();
        assert_eq!(tier.table, "activities_heart_intraday");
        assert_eq!(tier.label, "raw");
        assert_eq!(tier.interval, None);
    }

    #[test]
    fn test_exactly_two_minutes_uses_minute_tier() {
        let tier = select_tier(t0(), t0() + Duration::minutes(2)).unwrap();
        assert_eq!(tier.table, "activities_heart_intraday_1m");
        assert_eq!(tier.time_column, "minute");
    }

    #[test]
    fn test_exactly_two_hours_uses_minute_tier() {
        let tier = select_tier(t0(), t0() + Duration::hours(2)).unwrap();
        assert_eq!(tier.label, "1m");
    }

    #[test]
    fn test_just_over_two_hours_uses_hour_tier() {
        let tier = select_tier(t0(), t0() + Duration::hours(2) + Duration::seconds(1)).unwrap();
        assert_eq!(tier.table, "activities_heart_intraday_1h");
        assert_eq!(tier.value_column, "avg_heart_rate");
    }

    #[test]
    fn test_exactly_seven_days_uses_hour_tier() {
        let tier = select_tier(t0(), t0() + Duration::days(7)).unwrap();
        assert_eq!(tier.label, "1h");
    }

    #[test]
    fn test_over_seven_days_uses_day_tier() {
        let tier = select_tier(t0(), t0() + Duration::days(7) + Duration::seconds(1)).unwrap();
        assert_eq!(tier.table, "activities_heart_intraday_1d");
        assert_eq!(tier.time_column, "day");
    }

    #[test]
    fn test_inverted_range_rejected() {
        let err = select_tier(t0(), t0() - Duration::seconds(1)).unwrap_err();
        assert!(matches!(err, TimeseriesError::InvalidRange { .. }));
    }

    #[test]
    fn test_empty_range_rejected() {
        let err = select_tier(t0(), t0()).unwrap_err();
        assert!(matches!(err, TimeseriesError::InvalidRange { .. }));
    }

    #[test]
    fn test_granularity_monotonic_in_duration() {
        fn rank(label: &str) -> u8 {
            match label {
                "raw" => 0,
                "1m" => 1,
                "1h" => 2,
                "1d" => 3,
                _ => unreachable!(),
            }
        }

        let durations = [
            Duration::seconds(1),
            Duration::seconds(119),
            Duration::minutes(2),
            Duration::minutes(30),
            Duration::hours(2),
            Duration::hours(3),
            Duration::days(1),
            Duration::days(7),
            Duration::days(8),
            Duration::days(30),
            Duration::days(365),
        ];

        let mut last_rank = 0;
        for d in durations {
            let tier = select_tier(t0(), t0() + d).unwrap();
            let r = rank(tier.label);
            assert!(
                r >= last_rank,
                "granularity regressed at duration {d}: {} after rank {last_rank}",
                tier.label
            );
            last_rank = r;
        }
    }
}
