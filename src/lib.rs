//! Time-based (version 1) GUIDs ordered the way Cassandra's `TimeUUIDType` orders them
//!
//! ```rust
//! use timeguid::TimeGuidGenerator;
//!
//! let g = TimeGuidGenerator::new();
//! let guid = g.now();
//! println!("{}", guid); // e.g. "5b9ad3e1-2c6b-11ef-a3d1-c9f2b2e07d14"
//! println!("{}", guid.timestamp()); // e.g. "2024-06-17T08:21:43.1234560Z"
//! println!("{:?}", guid.as_bytes()); // as 16-byte array in wire order
//! ```
//!
//! # Field and bit layout
//!
//! Identifiers follow RFC 4122 version 1 with a 60-bit timestamp counted in 100-nanosecond ticks
//! since the Gregorian calendar reform (1582-10-15), a 14-bit clock sequence, and a 6-byte node.
//! The clock sequence and node octets are stored with their sign bits flipped so that Cassandra,
//! which compares those octets as signed bytes, sorts them in numeric order. See [`layout`] for
//! the exact octet positions.
//!
//! Comparing two [`TimeGuid`]s yields the order Cassandra uses: by timestamp, then by clock
//! sequence, and then by node.
//!
//! # Monotonic generation
//!
//! [`PreciseClock`] hands out strictly increasing timestamps with microsecond resolution by
//! combining the wall clock with a monotonic counter, and [`TimeGuidGenerator::now`] builds on it
//! so that identifiers generated through one clock never repeat and never go backwards, even
//! across threads. Generators and clocks are ordinary values: create one and share it where a
//! single sequence is needed.
//!
//! # Range queries
//!
//! [`TimeGuid::min_for_timestamp`], [`TimeGuid::max_for_timestamp`], and [`TimeGuid::before`]
//! build inclusive bounds for scans over identifiers:
//!
//! ```rust
//! use timeguid::{TimeGuid, Timestamp};
//!
//! let from = TimeGuid::min_for_timestamp(Timestamp::UNIX_EPOCH)?;
//! let until = "13814000-1dd2-11b2-92b4-818283848586".parse::<TimeGuid>()?.before()?;
//! assert!(from <= until);
//! # Ok::<(), timeguid::Error>(())
//! ```
//!
//! # Crate features
//!
//! - `uuid`: enables conversion between [`TimeGuid`] and the [`uuid`](https://crates.io/crates/uuid)
//!   crate's `Uuid`.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]

pub mod bytes;
pub mod layout;

mod timestamp;
pub use timestamp::{Timestamp, TICKS_PER_SECOND};

mod clock;
pub use clock::{ClockConfig, PreciseClock, SystemTimeSource, TimeSource, QUANTUM_TICKS};

mod id;
pub use id::TimeGuid;

mod error;
pub use error::{Error, ErrorKind};

pub mod generator;
#[doc(inline)]
pub use generator::{GeneratorConfig, TimeGuidGenerator};

pub use layout::{GuidVersion, Node};
