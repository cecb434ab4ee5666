//! Injectable time source.
//!
//! All "today" computations read UTC so results do not depend on the host
//! timezone or DST transitions.

use chrono::{DateTime, NaiveDate, Utc};

/// Source of the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Current UTC calendar date.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    /// Current instant as Unix epoch milliseconds.
    fn now_epoch_ms(&self) -> i64 {
        self.now().timestamp_millis()
    }
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    instant: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self { instant }
    }

    /// Pins the clock to midnight UTC of `date`.
    pub fn at_date(date: NaiveDate) -> Self {
        Self::new(date.and_time(chrono::NaiveTime::MIN).and_utc())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.instant
    }
}

#[cfg(test)]
mod tests {
    use super::{Clock, FixedClock};
    use chrono::{NaiveDate, TimeZone, Utc};

    #[test]
    fn fixed_clock_reports_utc_date_regardless_of_time_of_day() {
        let late = Utc.with_ymd_and_hms(2024, 1, 31, 23, 59, 59).unwrap();
        let clock = FixedClock::new(late);
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
    }

    #[test]
    fn at_date_starts_at_midnight() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let clock = FixedClock::at_date(date);
        assert_eq!(clock.today(), date);
        assert_eq!(clock.now_epoch_ms() % 86_400_000, 0);
    }
}
