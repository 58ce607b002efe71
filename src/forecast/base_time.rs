//! Forecast base-time arithmetic.
//!
//! The short-term forecast is issued every three hours (02, 05, 08, ..., 23
//! KST) and becomes available some minutes after the issue hour. Requests
//! must name a base time that has already been published.

use crate::forecast::error::ForecastError;
use chrono::{Duration, NaiveDateTime, NaiveTime, Timelike, Utc};

pub const DEFAULT_DELAY_MINUTES: u32 = 30;

/// How far ahead of the base time the stored slice lies.
pub const FORECAST_LEAD_HOURS: i64 = 4;

const KST_OFFSET_HOURS: i64 = 9;

/// Current wall-clock time in Korea Standard Time, independent of the host timezone.
pub fn now_kst() -> NaiveDateTime {
    Utc::now().naive_utc() + Duration::hours(KST_OFFSET_HOURS)
}

/// Parses an explicit base time in the API's `YYYYMMDD HHMM` form.
pub fn parse_base_time(value: &str) -> Result<NaiveDateTime, ForecastError> {
    NaiveDateTime::parse_from_str(value.trim(), "%Y%m%d %H%M")
        .map_err(|_| ForecastError::InvalidBaseTime(value.to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaseTimeResolver {
    delay_minutes: u32,
}

impl Default for BaseTimeResolver {
    fn default() -> Self {
        Self {
            delay_minutes: DEFAULT_DELAY_MINUTES,
        }
    }
}

impl BaseTimeResolver {
    pub fn new(delay_minutes: u32) -> Result<Self, ForecastError> {
        if delay_minutes >= 60 {
            return Err(ForecastError::InvalidDelay(delay_minutes));
        }
        Ok(Self { delay_minutes })
    }

    pub fn delay_minutes(&self) -> u32 {
        self.delay_minutes
    }

    /// Most recent base time at or before `now`.
    ///
    /// Hours 0 and 1 roll back to 23 of the previous day. Otherwise the hour
    /// becomes `h - ((h + 1) % 3)` on the same day, so 2..=4 map to 2,
    /// 5..=7 to 5, and so on. The minute is always the publication delay,
    /// whatever the current minute is.
    pub fn last_base(&self, now: NaiveDateTime) -> NaiveDateTime {
        let hour = now.hour();
        let (date, base_hour) = if hour < 2 {
            (now.date() - Duration::days(1), 23)
        } else {
            (now.date(), hour - ((hour + 1) % 3))
        };

        date.and_time(NaiveTime::MIN)
            + Duration::hours(base_hour as i64)
            + Duration::minutes(self.delay_minutes as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, NaiveDate};

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_same_day_hours() {
        let resolver = BaseTimeResolver::default();
        for h in 2..=23 {
            let base = resolver.last_base(at(2019, 5, 10, h, 47));
            assert_eq!(base.date(), NaiveDate::from_ymd_opt(2019, 5, 10).unwrap());
            assert_eq!(base.hour(), h - ((h + 1) % 3), "hour {h}");
            assert_eq!(base.minute(), 30);
            assert_eq!(base.second(), 0);
        }
    }

    #[test]
    fn test_early_hours_roll_back_a_day() {
        let resolver = BaseTimeResolver::default();
        for h in 0..2 {
            let base = resolver.last_base(at(2019, 5, 10, h, 5));
            assert_eq!(base, at(2019, 5, 9, 23, 30));
        }
    }

    #[test]
    fn test_rollback_crosses_month_and_year() {
        let resolver = BaseTimeResolver::default();
        assert_eq!(resolver.last_base(at(2019, 3, 1, 1, 0)), at(2019, 2, 28, 23, 30));
        assert_eq!(resolver.last_base(at(2020, 1, 1, 0, 59)), at(2019, 12, 31, 23, 30));
    }

    #[test]
    fn test_two_to_four_round_down_to_two() {
        let resolver = BaseTimeResolver::default();
        for (h, min) in [(2, 0), (3, 15), (4, 59)] {
            assert_eq!(resolver.last_base(at(2019, 5, 10, h, min)), at(2019, 5, 10, 2, 30));
        }
    }

    #[test]
    fn test_minute_is_forced_to_delay() {
        let resolver = BaseTimeResolver::new(10).unwrap();
        // 05:03 is before the 05:10 publication but the hour rule still picks 05.
        assert_eq!(resolver.last_base(at(2019, 5, 10, 5, 3)), at(2019, 5, 10, 5, 10));
        assert_eq!(resolver.last_base(at(2019, 5, 10, 23, 59)), at(2019, 5, 10, 23, 10));
    }

    #[test]
    fn test_invalid_delay() {
        assert!(matches!(
            BaseTimeResolver::new(60),
            Err(ForecastError::InvalidDelay(60))
        ));
        assert!(BaseTimeResolver::new(59).is_ok());
    }

    #[test]
    fn test_now_kst_is_nine_hours_ahead_of_utc() {
        let utc = Utc::now().naive_utc();
        let kst = now_kst();
        let diff = kst - utc;
        assert!(diff >= Duration::hours(9) && diff < Duration::hours(9) + Duration::seconds(5));
        assert!(kst.year() >= 2019);
    }

    #[test]
    fn test_parse_base_time() {
        assert_eq!(parse_base_time("20190510 1430").unwrap(), at(2019, 5, 10, 14, 30));
        for bad in ["2019-05-10 14:30", "20190510", "20191310 1430", ""] {
            assert!(matches!(parse_base_time(bad), Err(ForecastError::InvalidBaseTime(_))));
        }
    }
}
