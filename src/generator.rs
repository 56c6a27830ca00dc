//! Time-based GUID generator and related types.

use std::{
    iter::FusedIterator,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, MutexGuard, PoisonError,
    },
};

use rand::{
    rngs::{adapter::ReseedingRng, OsRng},
    RngCore, SeedableRng,
};
use rand_chacha::ChaCha12Core;

use crate::{
    clock::{PreciseClock, SystemTimeSource, TimeSource},
    layout::{
        self, Node, GREGORIAN_CALENDAR_END, GREGORIAN_CALENDAR_START, MAX_CLOCK_SEQUENCE,
        NODE_SIZE,
    },
    Error, TimeGuid, Timestamp,
};

pub mod with_rand08;

/// Number of bits the clock sequence occupies in a packed node slot.
const CLOCK_SEQUENCE_BITS: u32 = 14;

/// Mask selecting the 48 node bits and 14 clock sequence bits of a packed slot.
const SLOT_MASK: u64 = (1 << (NODE_SIZE as u32 * 8 + CLOCK_SEQUENCE_BITS)) - 1;

/// A trait that defines the minimum random number generator interface for
/// [`TimeGuidGenerator`].
pub trait RandSource {
    /// Returns the next random `u32`.
    fn next_u32(&mut self) -> u32;

    /// Returns the next random `u64`.
    fn next_u64(&mut self) -> u64;

    /// Fills `dest` with random data.
    fn fill_bytes(&mut self, dest: &mut [u8]);
}

/// The random number generator used by [`TimeGuidGenerator::new`].
///
/// It employs [`ChaCha12Core`] with a [`ReseedingRng`] wrapper that pulls a fresh seed from the
/// operating system every 64 KiB of output, emulating the strategy of
/// [`rand::rngs::ThreadRng`] while remaining `Send`.
#[derive(Debug)]
pub struct DefaultRng(ReseedingRng<ChaCha12Core, OsRng>);

impl Default for DefaultRng {
    /// # Panics
    ///
    /// Panics if the operating system cannot provide an initial seed.
    fn default() -> Self {
        Self(ReseedingRng::new(ChaCha12Core::from_entropy(), 1024 * 64, OsRng))
    }
}

impl RandSource for DefaultRng {
    fn next_u32(&mut self) -> u32 {
        self.0.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.0.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.0.fill_bytes(dest)
    }
}

/// Tuning of a [`TimeGuidGenerator`].
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct GeneratorConfig {
    /// Number of identifiers generated from the current time before the node and clock sequence
    /// are replaced with fresh random values.
    pub node_rotation_period: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            node_rotation_period: 1000,
        }
    }
}

/// Represents a time-based GUID generator.
///
/// Identifiers made from the current time take their timestamps from a shared [`PreciseClock`],
/// so every call returns a value greater than the one returned by any earlier call against the
/// same clock. The node and clock sequence are random and reused across
/// [`GeneratorConfig::node_rotation_period`] calls, after which a fresh pair is swapped in
/// atomically. Identifiers made from a caller-supplied timestamp get a fresh random node and
/// clock sequence every time.
///
/// The generator is `Send + Sync` when its random source is `Send`, and every method takes
/// `&self`, so a single instance can be shared across threads.
///
/// # Examples
///
/// ```rust
/// use std::{sync::Arc, thread};
/// use timeguid::TimeGuidGenerator;
///
/// let g = Arc::new(TimeGuidGenerator::new());
/// thread::scope(|s| {
///     for i in 0..4 {
///         let g = Arc::clone(&g);
///         s.spawn(move || {
///             for _ in 0..8 {
///                 println!("{} by thread {}", g.now(), i);
///                 thread::yield_now();
///             }
///         });
///     }
/// });
/// ```
#[derive(Debug)]
pub struct TimeGuidGenerator<R = DefaultRng, T = SystemTimeSource> {
    clock: Arc<PreciseClock<T>>,
    rng: Mutex<R>,

    /// Packed node (upper 48 bits) and clock sequence (lower 14 bits) shared by [`Self::now`].
    slot: AtomicU64,
    uses: AtomicU64,
    node_rotation_period: u64,
}

impl TimeGuidGenerator {
    /// Creates a generator with its own clock, the default random number generator, and the
    /// default configuration.
    pub fn new() -> Self {
        Self::build(
            Arc::new(PreciseClock::new()),
            DefaultRng::default(),
            GeneratorConfig::default().node_rotation_period,
        )
    }
}

impl Default for TimeGuidGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RandSource, T: TimeSource> TimeGuidGenerator<R, T> {
    /// Creates a generator that reads time from `clock` and randomness from `rng`.
    ///
    /// Generators sharing one clock produce identifiers with strictly increasing timestamps
    /// across all of them.
    ///
    /// # Errors
    ///
    /// Fails with a range error if `config.node_rotation_period` is zero.
    pub fn with_clock(
        clock: Arc<PreciseClock<T>>,
        rng: R,
        config: GeneratorConfig,
    ) -> Result<Self, Error> {
        if config.node_rotation_period == 0 {
            return Err(Error::NonPositiveRotationPeriod);
        }
        Ok(Self::build(clock, rng, config.node_rotation_period))
    }

    pub(crate) fn build(
        clock: Arc<PreciseClock<T>>,
        mut rng: R,
        node_rotation_period: u32,
    ) -> Self {
        let slot = rng.next_u64() & SLOT_MASK;
        Self {
            clock,
            rng: Mutex::new(rng),
            slot: AtomicU64::new(slot),
            uses: AtomicU64::new(0),
            node_rotation_period: u64::from(node_rotation_period),
        }
    }

    /// Returns the clock this generator reads.
    pub fn clock(&self) -> &PreciseClock<T> {
        &self.clock
    }

    /// Generates a new identifier from the current time.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use timeguid::TimeGuidGenerator;
    ///
    /// let g = TimeGuidGenerator::new();
    /// let x = g.now();
    /// let y = g.now();
    /// assert!(x < y);
    /// assert!(x.timestamp() < y.timestamp());
    /// ```
    pub fn now(&self) -> TimeGuid {
        let (clock_sequence, node) = unpack_slot(self.next_slot());
        let timestamp = self.clock.now();
        if timestamp < GREGORIAN_CALENDAR_START || timestamp > GREGORIAN_CALENDAR_END {
            log::warn!("clock reading {timestamp} is outside the Gregorian calendar range");
        }
        TimeGuid::from_encoded(layout::format_saturating(timestamp, clock_sequence, node))
    }

    /// Generates an identifier for `timestamp` with a random node and clock sequence.
    ///
    /// # Errors
    ///
    /// Fails with a range error if `timestamp` is outside the Gregorian calendar range.
    pub fn at(&self, timestamp: Timestamp) -> Result<TimeGuid, Error> {
        let clock_sequence = self.random_clock_sequence();
        TimeGuid::new(timestamp, clock_sequence, self.random_node())
    }

    /// Generates an identifier for `timestamp` and `clock_sequence` with a random node.
    ///
    /// # Errors
    ///
    /// Fails with a range error if `timestamp` is outside the Gregorian calendar range or
    /// `clock_sequence` is greater than 16383.
    pub fn at_with_clock_sequence(
        &self,
        timestamp: Timestamp,
        clock_sequence: u16,
    ) -> Result<TimeGuid, Error> {
        TimeGuid::new(timestamp, clock_sequence, self.random_node())
    }

    /// Returns a uniformly random node.
    pub fn random_node(&self) -> Node {
        let mut node = [0u8; NODE_SIZE];
        self.lock_rng().fill_bytes(&mut node);
        Node::from(node)
    }

    /// Returns a uniformly random clock sequence in `0..=16383`.
    pub fn random_clock_sequence(&self) -> u16 {
        (self.lock_rng().next_u32() & u32::from(MAX_CLOCK_SEQUENCE)) as u16
    }

    /// Returns the slot to use for the current call, swapping in a fresh one every
    /// `node_rotation_period` calls.
    fn next_slot(&self) -> u64 {
        let used = self.uses.fetch_add(1, Ordering::Relaxed);
        if used == 0 || used % self.node_rotation_period != 0 {
            return self.slot.load(Ordering::Acquire);
        }

        let fresh = self.lock_rng().next_u64() & SLOT_MASK;
        let stale = self.slot.swap(fresh, Ordering::AcqRel);
        log::trace!("rotated node slot after {used} uses (previous {stale:#018x})");
        fresh
    }

    fn lock_rng(&self) -> MutexGuard<'_, R> {
        self.rng.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Splits a packed slot into a clock sequence and a node.
fn unpack_slot(slot: u64) -> (u16, Node) {
    let clock_sequence = (slot & u64::from(MAX_CLOCK_SEQUENCE)) as u16;
    let bytes = (slot >> CLOCK_SEQUENCE_BITS).to_be_bytes();
    let mut node = [0u8; NODE_SIZE];
    node.copy_from_slice(&bytes[bytes.len() - NODE_SIZE..]);
    (clock_sequence, Node::from(node))
}

/// Supports operations as an infinite iterator that produces a new identifier for each call of
/// `next()`.
///
/// # Examples
///
/// ```rust
/// use timeguid::TimeGuidGenerator;
///
/// let g = TimeGuidGenerator::new();
/// (&g).enumerate()
///     .skip(4)
///     .take(4)
///     .for_each(|(i, e)| println!("[{}] {}", i, e));
/// ```
impl<R: RandSource, T: TimeSource> Iterator for &TimeGuidGenerator<R, T> {
    type Item = TimeGuid;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.now())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}

impl<R: RandSource, T: TimeSource> FusedIterator for &TimeGuidGenerator<R, T> {}
