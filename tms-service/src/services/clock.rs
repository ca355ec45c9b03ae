//! Civil time in the operator's timezone.
//!
//! Reminder dates and times are civil values in Asia/Seoul regardless
//! of where the service runs. Storage stays in UTC; conversion happens
//! at the scheduling boundary only.

use chrono::{DateTime, NaiveDate, NaiveTime, Timelike, Utc};
use chrono_tz::Asia::Seoul;

/// Civil date and wall-clock time in Seoul for a UTC instant. The time
/// is truncated to the minute, matching the granularity reminders are
/// scheduled at.
pub fn kst_civil_now(now_utc: DateTime<Utc>) -> (NaiveDate, NaiveTime) {
    let local = now_utc.with_timezone(&Seoul);
    let date = local.date_naive();
    let time = local
        .time()
        .with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or_else(|| local.time());
    (date, time)
}

/// Seoul date for a UTC instant.
pub fn kst_today(now_utc: DateTime<Utc>) -> NaiveDate {
    kst_civil_now(now_utc).0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_kst_is_nine_hours_ahead() {
        // 23:30 UTC is already the next day in Seoul
        let utc = Utc.with_ymd_and_hms(2025, 3, 1, 23, 30, 0).unwrap();
        let (date, time) = kst_civil_now(utc);
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 3, 2).unwrap());
        assert_eq!(time, NaiveTime::from_hms_opt(8, 30, 0).unwrap());
    }

    #[test]
    fn test_seconds_truncated() {
        let utc = Utc.with_ymd_and_hms(2025, 3, 1, 0, 15, 59).unwrap();
        let (_, time) = kst_civil_now(utc);
        assert_eq!(time, NaiveTime::from_hms_opt(9, 15, 0).unwrap());
    }

    #[test]
    fn test_same_day_before_offset_boundary() {
        let utc = Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap();
        assert_eq!(
            kst_today(utc),
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
        );
    }
}
