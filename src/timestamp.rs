//! Tick-based UTC instants.

use std::{fmt, ops, time};

use crate::Error;

/// Number of ticks in a second.
pub const TICKS_PER_SECOND: i64 = 10_000_000;

/// Nanoseconds per tick.
const NANOS_PER_TICK: i64 = 100;

/// Ticks between 0001-01-01T00:00:00Z and the Unix epoch.
const UNIX_EPOCH_TICKS: i64 = 621_355_968_000_000_000;

/// Represents a UTC instant as a count of 100-nanosecond ticks since 0001-01-01T00:00:00Z.
///
/// The valid range is `[0, 3_155_378_975_999_999_999]` ticks, i.e. up to the last tick of year
/// 9999. Arithmetic that would leave this range fails instead of wrapping.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use timeguid::Timestamp;
///
/// let ts = Timestamp::from_ticks(636_078_885_598_735_027)?;
/// let floored = ts.floor(Duration::from_secs(1))?;
/// assert_eq!(floored.ticks(), 636_078_885_590_000_000);
/// assert_eq!((floored + Duration::from_millis(1)).ticks(), 636_078_885_590_010_000);
/// # Ok::<(), timeguid::Error>(())
/// ```
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Timestamp(i64);

impl Timestamp {
    /// The earliest representable instant (0001-01-01T00:00:00Z).
    pub const MIN: Self = Self(0);

    /// The latest representable instant (9999-12-31T23:59:59.9999999Z).
    pub const MAX: Self = Self(3_155_378_975_999_999_999);

    /// The Unix epoch (1970-01-01T00:00:00Z).
    pub const UNIX_EPOCH: Self = Self(UNIX_EPOCH_TICKS);

    /// Creates a timestamp from a tick count, failing if it is out of range.
    pub const fn from_ticks(ticks: i64) -> Result<Self, Error> {
        if ticks < Self::MIN.0 || ticks > Self::MAX.0 {
            Err(Error::TimestampOutOfRange {
                ticks,
                min: Self::MIN.0,
                max: Self::MAX.0,
            })
        } else {
            Ok(Self(ticks))
        }
    }

    /// Creates a timestamp from a tick count known to be in range.
    pub(crate) const fn from_ticks_unchecked(ticks: i64) -> Self {
        debug_assert!(Self::MIN.0 <= ticks && ticks <= Self::MAX.0);
        Self(ticks)
    }

    /// Returns the number of ticks since 0001-01-01T00:00:00Z.
    pub const fn ticks(&self) -> i64 {
        self.0
    }

    /// Returns the current wall-clock time.
    ///
    /// This is a raw reading of the system clock, which may step backwards. Use
    /// [`PreciseClock`](crate::PreciseClock) for strictly increasing values.
    pub fn now() -> Self {
        Self::from_ticks_unchecked(system_time_to_ticks(time::SystemTime::now()))
    }

    /// Returns the timestamp shifted by a signed number of ticks, failing if the result is out of
    /// range.
    pub fn add_ticks(self, ticks: i64) -> Result<Self, Error> {
        match self.0.checked_add(ticks) {
            Some(sum) => Self::from_ticks(sum),
            None => Err(Error::TimestampOutOfRange {
                ticks: if ticks < 0 { i64::MIN } else { i64::MAX },
                min: Self::MIN.0,
                max: Self::MAX.0,
            }),
        }
    }

    /// Returns `self + duration`, or `None` if the result is out of range.
    pub fn checked_add(self, duration: time::Duration) -> Option<Self> {
        self.add_ticks(duration_to_ticks(duration)?).ok()
    }

    /// Returns `self - duration`, or `None` if the result is out of range.
    pub fn checked_sub(self, duration: time::Duration) -> Option<Self> {
        self.add_ticks(duration_to_ticks(duration)?.checked_neg()?).ok()
    }

    /// Returns the signed number of ticks from `earlier` to `self`.
    pub const fn ticks_since(&self, earlier: Self) -> i64 {
        self.0 - earlier.0
    }

    /// Rounds the timestamp down to a multiple of `precision`.
    ///
    /// Fails if `precision` is shorter than one tick.
    pub fn floor(self, precision: time::Duration) -> Result<Self, Error> {
        match duration_to_ticks(precision) {
            Some(p) if p > 0 => Ok(Self(self.0 / p * p)),
            _ => Err(Error::InvalidPrecision(precision)),
        }
    }

    /// Converts the timestamp into a [`SystemTime`](time::SystemTime).
    pub fn to_system_time(self) -> time::SystemTime {
        let delta = self.0 - UNIX_EPOCH_TICKS;
        let magnitude = ticks_to_duration(delta.unsigned_abs());
        if delta >= 0 {
            time::UNIX_EPOCH + magnitude
        } else {
            time::UNIX_EPOCH - magnitude
        }
    }
}

impl TryFrom<time::SystemTime> for Timestamp {
    type Error = Error;

    /// Converts a [`SystemTime`](time::SystemTime), truncating to whole ticks.
    fn try_from(src: time::SystemTime) -> Result<Self, Self::Error> {
        Self::from_ticks(system_time_to_ticks(src))
    }
}

impl From<Timestamp> for time::SystemTime {
    fn from(src: Timestamp) -> Self {
        src.to_system_time()
    }
}

impl ops::Add<time::Duration> for Timestamp {
    type Output = Self;

    /// # Panics
    ///
    /// Panics if the result is out of range.
    fn add(self, rhs: time::Duration) -> Self::Output {
        self.checked_add(rhs)
            .expect("overflow when adding duration to timestamp")
    }
}

impl ops::Sub<time::Duration> for Timestamp {
    type Output = Self;

    /// # Panics
    ///
    /// Panics if the result is out of range.
    fn sub(self, rhs: time::Duration) -> Self::Output {
        self.checked_sub(rhs)
            .expect("overflow when subtracting duration from timestamp")
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({self})")
    }
}

impl fmt::Display for Timestamp {
    /// Writes the ISO 8601 UTC form with seven fractional digits, e.g.
    /// `2016-08-26T11:15:59.8735027Z`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let days = self.0 / (TICKS_PER_SECOND * 86_400);
        let in_day = self.0 % (TICKS_PER_SECOND * 86_400);
        let (year, month, day) = civil_from_days(days);
        let secs = in_day / TICKS_PER_SECOND;
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.{:07}Z",
            year,
            month,
            day,
            secs / 3600,
            secs / 60 % 60,
            secs % 60,
            in_day % TICKS_PER_SECOND
        )
    }
}

/// Converts days since 0001-01-01 into a proleptic Gregorian `(year, month, day)`.
fn civil_from_days(days: i64) -> (i64, i64, i64) {
    // shift the origin to 0000-03-01 so that leap days fall at the end of each year
    let z = days + 306;
    let era = z / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = era * 400 + yoe + i64::from(month <= 2);
    (year, month, day)
}

fn duration_to_ticks(duration: time::Duration) -> Option<i64> {
    i64::try_from(duration.as_nanos() / NANOS_PER_TICK as u128).ok()
}

fn ticks_to_duration(ticks: u64) -> time::Duration {
    time::Duration::new(
        ticks / TICKS_PER_SECOND as u64,
        (ticks % TICKS_PER_SECOND as u64) as u32 * NANOS_PER_TICK as u32,
    )
}

/// Converts a [`SystemTime`](time::SystemTime) to ticks, truncating toward negative infinity.
pub(crate) fn system_time_to_ticks(src: time::SystemTime) -> i64 {
    match src.duration_since(time::UNIX_EPOCH) {
        Ok(after) => UNIX_EPOCH_TICKS.saturating_add(duration_to_ticks(after).unwrap_or(i64::MAX)),
        Err(err) => {
            let before = err.duration().as_nanos();
            let ticks = before.div_ceil(NANOS_PER_TICK as u128);
            UNIX_EPOCH_TICKS.saturating_sub(i64::try_from(ticks).unwrap_or(i64::MAX))
        }
    }
    .clamp(Timestamp::MIN.0, Timestamp::MAX.0)
}

#[cfg(test)]
mod tests {
    use super::{Timestamp, TICKS_PER_SECOND};
    use crate::ErrorKind;
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    /// Returns a timestamp from Unix seconds and a sub-second tick count
    fn unix(secs: i64, sub_ticks: i64) -> Timestamp {
        Timestamp::from_ticks(Timestamp::UNIX_EPOCH.ticks() + secs * TICKS_PER_SECOND + sub_ticks)
            .unwrap()
    }

    /// Rejects out-of-range ticks
    #[test]
    fn rejects_out_of_range_ticks() {
        assert_eq!(Timestamp::MIN.ticks(), 0);
        assert!(Timestamp::from_ticks(-1).is_err());
        assert!(Timestamp::from_ticks(3_155_378_975_999_999_999).is_ok());
        let err = Timestamp::from_ticks(3_155_378_975_999_999_999 + 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Range);
        assert!(Timestamp::MAX.add_ticks(1).is_err());
        assert!(Timestamp::MIN.add_ticks(-1).is_err());
        assert!(Timestamp::MAX.add_ticks(i64::MAX).is_err());
        assert!(Timestamp::MIN.add_ticks(i64::MIN).is_err());
        assert_eq!(Timestamp::MAX.checked_add(Duration::from_nanos(100)), None);
        assert_eq!(Timestamp::MIN.checked_sub(Duration::from_nanos(100)), None);
        assert_eq!(Timestamp::MAX.checked_add(Duration::MAX), None);
    }

    /// Panics on operator overflow
    #[test]
    #[should_panic(expected = "overflow")]
    fn panics_on_operator_overflow() {
        let _ = Timestamp::MAX + Duration::from_secs(1);
    }

    /// Adds and subtracts durations
    #[test]
    fn adds_and_subtracts_durations() {
        let ts = unix(1_472_210_159, 8_735_027);
        assert_eq!((ts + Duration::from_secs(1)).ticks(), ts.ticks() + TICKS_PER_SECOND);
        assert_eq!((ts - Duration::from_secs(1)).ticks(), ts.ticks() - TICKS_PER_SECOND);
        assert_eq!(ts + Duration::from_nanos(99), ts);
        assert_eq!(ts.add_ticks(-7).unwrap().ticks_since(ts), -7);
        assert!(ts < ts + Duration::from_nanos(100));
    }

    /// Converts from and to system time
    #[test]
    fn converts_from_and_to_system_time() {
        let st = UNIX_EPOCH + Duration::new(1_472_210_159, 873_502_700);
        let ts = Timestamp::try_from(st).unwrap();
        assert_eq!(ts, unix(1_472_210_159, 8_735_027));
        assert_eq!(SystemTime::from(ts), st);

        let before = UNIX_EPOCH - Duration::new(86_400, 50);
        let ts = Timestamp::try_from(before).unwrap();
        assert_eq!(ts.ticks(), Timestamp::UNIX_EPOCH.ticks() - 86_400 * TICKS_PER_SECOND - 1);
        assert_eq!(ts.to_system_time(), UNIX_EPOCH - Duration::new(86_400, 100));
    }

    /// Reads current time close to system time
    #[test]
    fn reads_current_time_close_to_system_time() {
        let expected = Timestamp::try_from(SystemTime::now()).unwrap();
        let actual = Timestamp::now();
        assert!(actual.ticks_since(expected).abs() < 100 * 10_000);
    }

    /// Formats as ISO 8601
    #[test]
    fn formats_as_iso_8601() {
        assert_eq!(Timestamp::MIN.to_string(), "0001-01-01T00:00:00.0000000Z");
        assert_eq!(Timestamp::MAX.to_string(), "9999-12-31T23:59:59.9999999Z");
        assert_eq!(Timestamp::UNIX_EPOCH.to_string(), "1970-01-01T00:00:00.0000000Z");
        assert_eq!(unix(1_472_210_159, 8_735_027).to_string(), "2016-08-26T11:15:59.8735027Z");
        assert_eq!(unix(951_782_400, 0).to_string(), "2000-02-29T00:00:00.0000000Z");
        assert_eq!(
            Timestamp::from_ticks(499_163_040_000_000_000).unwrap().to_string(),
            "1582-10-15T00:00:00.0000000Z"
        );
        assert_eq!(
            format!("{:?}", Timestamp::UNIX_EPOCH),
            "Timestamp(1970-01-01T00:00:00.0000000Z)"
        );
    }

    /// Rejects non-positive floor precision
    #[test]
    fn rejects_non_positive_floor_precision() {
        let ts = Timestamp::now();
        assert_eq!(ts.floor(Duration::ZERO).unwrap_err().kind(), ErrorKind::Range);
        assert!(ts.floor(Duration::from_nanos(99)).is_err());
    }

    /// Floors to prepared precisions
    #[test]
    fn floors_to_prepared_precisions() {
        // 2016-08-26T11:15:59Z
        let base = 1_472_210_159;
        let cases = [
            (unix(base, 8_735_027), Duration::from_nanos(100), unix(base, 8_735_027)),
            (unix(base, 8_735_021), Duration::from_nanos(200), unix(base, 8_735_020)),
            (unix(base, 8_735_029), Duration::from_nanos(200), unix(base, 8_735_028)),
            (unix(base, 8_735_027), Duration::from_nanos(500), unix(base, 8_735_025)),
            (unix(base, 8_735_020), Duration::from_millis(3), unix(base, 8_710_000)),
            (unix(base, 8_695_020), Duration::from_millis(3), unix(base, 8_680_000)),
            (unix(base, 8_710_000), Duration::from_secs(1), unix(base, 0)),
            (unix(base - 58, 8_735_020), Duration::from_secs(13), unix(base - 60, 0)),
            (unix(base, 8_735_020), Duration::from_secs(13), unix(base - 8, 0)),
            (unix(base, 8_710_000), Duration::from_secs(60), unix(base - 59, 0)),
            (unix(base, 8_710_000), Duration::from_secs(3600), unix(base - 959, 0)),
            (unix(base, 8_710_000), Duration::from_secs(86_400), unix(base - 40_559, 0)),
        ];

        for (input, precision, expected) in cases {
            assert_eq!(input.floor(precision).unwrap(), expected, "{input} / {precision:?}");
        }
    }
}
