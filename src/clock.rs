//! Strictly increasing, microsecond-quantized timestamps.

use std::{
    sync::{Mutex, PoisonError},
    time::{Duration, Instant, SystemTime},
};

use crate::{timestamp::system_time_to_ticks, Error, Timestamp};

/// Distance between two consecutive values handed out by [`PreciseClock`]: one microsecond.
pub const QUANTUM_TICKS: i64 = 10;

/// A source of wall-clock readings and of a monotonic elapsed-time counter.
pub trait TimeSource {
    /// Returns the wall-clock time in ticks since 0001-01-01T00:00:00Z.
    fn wall_ticks(&self) -> i64;

    /// Returns the monotonic counter in ticks from an arbitrary fixed origin.
    fn monotonic_ticks(&self) -> i64;
}

/// The [`TimeSource`] backed by [`SystemTime`] and [`Instant`].
#[derive(Clone, Debug)]
pub struct SystemTimeSource {
    origin: Instant,
}

impl Default for SystemTimeSource {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl TimeSource for SystemTimeSource {
    fn wall_ticks(&self) -> i64 {
        system_time_to_ticks(SystemTime::now())
    }

    fn monotonic_ticks(&self) -> i64 {
        duration_ticks(self.origin.elapsed())
    }
}

/// Tuning of a [`PreciseClock`].
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct ClockConfig {
    /// How long the monotonic counter is trusted before the base point is re-read from the wall
    /// clock.
    pub sync_period: Duration,

    /// Largest tolerated gap between a computed value and the wall clock before falling back to
    /// the wall clock.
    pub max_allowed_divergence: Duration,
}

impl Default for ClockConfig {
    /// One-second sync period and 100-millisecond divergence allowance.
    fn default() -> Self {
        Self {
            sync_period: Duration::from_secs(1),
            max_allowed_divergence: Duration::from_millis(100),
        }
    }
}

#[derive(Debug)]
struct ClockState {
    base_wall: i64,
    base_monotonic: i64,
    last: i64,
}

/// Produces strictly increasing timestamps by combining a coarse wall clock with a monotonic
/// counter.
///
/// Every call returns a value at least one microsecond after the value returned by the
/// previous call, including calls from other threads. Between resynchronizations the value
/// advances with the monotonic counter; whenever it drifts more than
/// [`ClockConfig::max_allowed_divergence`] from the wall clock, or the counter runs backwards,
/// the clock follows the wall clock instead while still refusing to go back.
///
/// A clock is an ordinary value. Share one instance (e.g. through an `Arc` or a `static`) where
/// process-wide ordering is needed.
///
/// # Examples
///
/// ```rust
/// use timeguid::PreciseClock;
///
/// let clock = PreciseClock::new();
/// let a = clock.now();
/// let b = clock.now();
/// assert!(a < b);
/// assert!(b.ticks() - a.ticks() >= 10);
/// ```
#[derive(Debug)]
pub struct PreciseClock<T = SystemTimeSource> {
    source: T,
    sync_period: i64,
    max_allowed_divergence: i64,
    state: Mutex<ClockState>,
}

impl PreciseClock {
    /// Creates a clock reading the system time with the default configuration.
    pub fn new() -> Self {
        Self::build(SystemTimeSource::default(), ClockConfig::default())
    }

    /// Creates a clock reading the system time with a custom configuration.
    ///
    /// # Errors
    ///
    /// Fails with a range error if `config.sync_period` is zero.
    pub fn with_config(config: ClockConfig) -> Result<Self, Error> {
        Self::with_time_source(SystemTimeSource::default(), config)
    }
}

impl Default for PreciseClock {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: TimeSource> PreciseClock<T> {
    /// Creates a clock reading from `source`.
    ///
    /// # Errors
    ///
    /// Fails with a range error if `config.sync_period` is zero.
    pub fn with_time_source(source: T, config: ClockConfig) -> Result<Self, Error> {
        if config.sync_period.is_zero() {
            return Err(Error::NonPositiveSyncPeriod);
        }
        Ok(Self::build(source, config))
    }

    fn build(source: T, config: ClockConfig) -> Self {
        let base_wall = clamp_wall(source.wall_ticks());
        let base_monotonic = source.monotonic_ticks();
        Self {
            source,
            sync_period: duration_ticks(config.sync_period),
            max_allowed_divergence: duration_ticks(config.max_allowed_divergence),
            state: Mutex::new(ClockState {
                base_wall,
                base_monotonic,
                last: quantize(base_wall),
            }),
        }
    }

    /// Returns the next timestamp.
    pub fn now(&self) -> Timestamp {
        Timestamp::from_ticks_unchecked(self.now_ticks())
    }

    /// Returns the next timestamp as a tick count.
    pub fn now_ticks(&self) -> i64 {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        let now = clamp_wall(self.source.wall_ticks());
        let monotonic = self.source.monotonic_ticks();
        let mut elapsed = monotonic - state.base_monotonic;
        let counter_anomaly = elapsed < 0;
        if counter_anomaly || elapsed > self.sync_period {
            log::trace!("resynchronizing clock base point after {elapsed} ticks");
            state.base_wall = now;
            state.base_monotonic = monotonic;
            elapsed = 0;
        }

        let min_next = state.last + QUANTUM_TICKS;
        let candidate = quantize(state.base_wall + elapsed).max(min_next);
        let result = if counter_anomaly || (candidate - now).abs() > self.max_allowed_divergence {
            log::debug!(
                "clock diverged from wall time (candidate {candidate}, wall {now}, counter anomaly: {counter_anomaly})"
            );
            quantize(now).max(min_next)
        } else {
            candidate
        };

        state.last = result;
        result
    }
}

/// Rounds ticks down to a multiple of [`QUANTUM_TICKS`].
const fn quantize(ticks: i64) -> i64 {
    ticks - ticks.rem_euclid(QUANTUM_TICKS)
}

const fn clamp_wall(ticks: i64) -> i64 {
    if ticks < Timestamp::MIN.ticks() {
        Timestamp::MIN.ticks()
    } else if ticks > Timestamp::MAX.ticks() {
        Timestamp::MAX.ticks()
    } else {
        ticks
    }
}

fn duration_ticks(duration: Duration) -> i64 {
    i64::try_from(duration.as_nanos() / 100).unwrap_or(i64::MAX)
}
