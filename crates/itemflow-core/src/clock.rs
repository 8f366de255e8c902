//! Time sources for derived timestamp fields
//!
//! [`Clock`] is injected into the mapper so timestamps can be pinned in
//! tests and reproducible runs.

use chrono::{DateTime, SecondsFormat, Utc};
use std::sync::Arc;

/// Source of the current instant
pub trait Clock: Send + Sync {
    /// Current time
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at one instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    /// Create clock pinned to `instant`
    #[inline]
    #[must_use]
    pub const fn new(instant: DateTime<Utc>) -> Self {
        Self(instant)
    }

    /// Parse an RFC 3339 instant
    ///
    /// # Errors
    /// Returns error if `text` is not RFC 3339
    pub fn parse(text: &str) -> Result<Self, chrono::ParseError> {
        let instant = DateTime::parse_from_rfc3339(text)?;
        Ok(Self(instant.with_timezone(&Utc)))
    }

    /// The pinned instant
    #[inline]
    #[must_use]
    pub const fn instant(&self) -> DateTime<Utc> {
        self.0
    }
}

impl Clock for FixedClock {
    #[inline]
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    #[inline]
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    #[inline]
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for Box<C> {
    #[inline]
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

/// Render an instant the way workflow hosts do: UTC, milliseconds, `Z`
#[inline]
#[must_use]
pub fn iso8601(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn iso8601_matches_host_format() {
        let instant = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        assert_eq!(iso8601(instant), "2024-05-01T12:00:00.000Z");
    }

    #[test]
    fn fixed_clock_parses_offsets_into_utc() {
        let clock = FixedClock::parse("2024-05-01T14:30:00+02:00").unwrap();
        assert_eq!(iso8601(clock.now()), "2024-05-01T12:30:00.000Z");
        assert!(FixedClock::parse("yesterday").is_err());
    }

    #[test]
    fn clock_through_references() {
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap());
        let shared: Arc<dyn Clock> = Arc::new(clock);
        assert_eq!((&clock).now(), clock.instant());
        assert_eq!(shared.now(), clock.instant());
    }

    #[test]
    fn system_clock_moves_forward() {
        let first = SystemClock.now();
        let second = SystemClock.now();
        assert!(second >= first);
    }
}
