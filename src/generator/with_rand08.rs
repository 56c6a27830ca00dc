//! Integration with `rand` (v0.8) crate.

use std::sync::Arc;

use super::{GeneratorConfig, RandSource, TimeGuidGenerator};
use crate::clock::PreciseClock;
use rand::RngCore;

/// An adapter that implements [`RandSource`] for [`RngCore`] types.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct Adapter<T>(/** The wrapped [`RngCore`] type. */ pub T);

impl<T: RngCore> RandSource for Adapter<T> {
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

impl<T: RngCore> TimeGuidGenerator<Adapter<T>> {
    /// Creates a generator object with its own clock and a specified random number generator
    /// that implements [`RngCore`] from `rand` (v0.8) crate.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rand::{rngs::StdRng, SeedableRng};
    /// use timeguid::TimeGuidGenerator;
    ///
    /// let g = TimeGuidGenerator::with_rand08(StdRng::seed_from_u64(42));
    /// println!("{}", g.now());
    /// ```
    pub fn with_rand08(rng: T) -> Self {
        Self::build(
            Arc::new(PreciseClock::new()),
            Adapter(rng),
            GeneratorConfig::default().node_rotation_period,
        )
    }
}
