//! Wall-clock access.
//!
//! Day boundaries are keyed to the device's local calendar date, so the
//! clock reports "now" with its UTC offset attached. DST and time zone
//! changes are not special-cased: a reset happens whenever the date
//! differs, not after 24 elapsed hours.

use std::cell::Cell;

use chrono::{DateTime, Duration, FixedOffset, Local, NaiveDate, TimeZone, Utc};

/// Source of the current time and local calendar date.
pub trait Clock {
    /// Current instant in the user's local offset.
    fn now(&self) -> DateTime<FixedOffset>;

    /// Current calendar date in the user's local time zone.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<FixedOffset> {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for std::rc::Rc<C> {
    fn now(&self) -> DateTime<FixedOffset> {
        (**self).now()
    }
}

/// The device clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// A hand-driven clock for tests and simulations.
#[derive(Debug)]
pub struct ManualClock {
    now: Cell<DateTime<FixedOffset>>,
}

impl ManualClock {
    /// Creates a clock fixed at the given instant.
    pub const fn new(now: DateTime<FixedOffset>) -> Self {
        Self {
            now: Cell::new(now),
        }
    }

    /// Creates a UTC clock at noon on the given date.
    pub fn at_noon(date: NaiveDate) -> Self {
        let noon = date.and_hms_opt(12, 0, 0).unwrap_or_default();
        Self::new(Utc.from_utc_datetime(&noon).fixed_offset())
    }

    /// Moves the clock forward.
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    /// Moves the clock forward by whole days.
    pub fn advance_days(&self, days: i64) {
        self.advance(Duration::days(days));
    }

    /// Jumps to an arbitrary instant.
    pub fn set(&self, now: DateTime<FixedOffset>) {
        self.now.set(now);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_manual_clock_reports_local_date() {
        let clock = ManualClock::at_noon(date(2025, 3, 9));
        assert_eq!(clock.today(), date(2025, 3, 9));
    }

    #[test]
    fn test_advancing_past_midnight_changes_today() {
        let clock = ManualClock::at_noon(date(2025, 3, 9));
        clock.advance(Duration::hours(11));
        assert_eq!(clock.today(), date(2025, 3, 9));
        clock.advance(Duration::hours(1));
        assert_eq!(clock.today(), date(2025, 3, 10));
    }

    #[test]
    fn test_today_uses_the_local_offset() {
        let offset = FixedOffset::east_opt(9 * 3600).unwrap();
        let now = offset
            .from_local_datetime(&date(2025, 1, 2).and_hms_opt(1, 0, 0).unwrap())
            .unwrap();
        let clock = ManualClock::new(now);
        // 01:00 local on the 2nd is still the 1st in UTC.
        assert_eq!(clock.today(), date(2025, 1, 2));
    }

    #[test]
    fn test_set_jumps_across_days_in_either_direction() {
        let clock = ManualClock::at_noon(date(2025, 3, 9));
        let offset = FixedOffset::west_opt(5 * 3600).unwrap();
        let late = offset
            .from_local_datetime(&date(2025, 3, 9).and_hms_opt(23, 30, 0).unwrap())
            .unwrap();
        clock.set(late);
        assert_eq!(clock.now(), late);
        assert_eq!(clock.today(), date(2025, 3, 9));

        clock.set(late - Duration::days(2));
        assert_eq!(clock.today(), date(2025, 3, 7));
    }
}
