//! Bit layout of time-based identifiers.
//!
//! Packs a `(timestamp, clock_sequence, node)` triple into 16 bytes compatible with RFC 4122
//! version 1 UUIDs and with Cassandra's `TimeUUIDType`:
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                           time_low                            |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |           time_mid            |  ver  |        time_hi        |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |var| clkseq_hi |  clkseq_low   |           node(0-1)           |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                           node(2-5)                           |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```
//!
//! The 60-bit timestamp counts 100-nanosecond ticks since 1582-10-15T00:00:00Z. Octets 8 to 15
//! are stored XOR-ed with `0x80` because Cassandra compares them as signed bytes; flipping the
//! sign bit turns that signed comparison into the numeric order of `(clock_sequence, node)`.

use std::{cmp::Ordering, fmt};

use crate::{Error, Timestamp};

/// Length of an encoded identifier in bytes.
pub const TIME_GUID_SIZE: usize = 16;

/// Length of a node in bytes.
pub const NODE_SIZE: usize = 6;

/// Smallest clock sequence.
pub const MIN_CLOCK_SEQUENCE: u16 = 0;

/// Largest clock sequence (14 bits).
pub const MAX_CLOCK_SEQUENCE: u16 = 0x3fff;

/// Ticks of 1582-10-15T00:00:00Z, the zero point of the timestamp field.
const GREGORIAN_CALENDAR_START_TICKS: i64 = 499_163_040_000_000_000;

/// Largest value of the 60-bit timestamp field.
const MAX_TIMESTAMP_FIELD: u64 = (1 << 60) - 1;

/// Earliest timestamp representable by a time-based identifier (1582-10-15T00:00:00Z).
pub const GREGORIAN_CALENDAR_START: Timestamp =
    Timestamp::from_ticks_unchecked(GREGORIAN_CALENDAR_START_TICKS);

/// Latest timestamp representable by a time-based identifier (~5236-03-31T21:21:00Z).
pub const GREGORIAN_CALENDAR_END: Timestamp =
    Timestamp::from_ticks_unchecked(GREGORIAN_CALENDAR_START_TICKS + MAX_TIMESTAMP_FIELD as i64);

/// Encoding of `(GREGORIAN_CALENDAR_START, MIN_CLOCK_SEQUENCE, Node::MIN)`.
pub const MIN_TIME_GUID: [u8; 16] = encode(0, MIN_CLOCK_SEQUENCE, &Node::MIN.0);

/// Encoding of `(GREGORIAN_CALENDAR_END, MAX_CLOCK_SEQUENCE, Node::MAX)`.
pub const MAX_TIME_GUID: [u8; 16] = encode(MAX_TIMESTAMP_FIELD, MAX_CLOCK_SEQUENCE, &Node::MAX.0);

const SIGN_BIT_MASK: u8 = 0x80;

const VERSION_OFFSET: usize = 6;
const VERSION_BYTE_MASK: u8 = 0x0f;
const VERSION_BYTE_SHIFT: u32 = 4;

const VARIANT_OFFSET: usize = 8;
const VARIANT_BYTE_MASK: u8 = 0x3f;
const VARIANT_BITS_VALUE: u8 = 0x80;

const NODE_OFFSET: usize = 10;

/// UUID versions as stored in the high nibble of octet 6.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[repr(u8)]
pub enum GuidVersion {
    /// Version 1, built from a timestamp, clock sequence, and node.
    TimeBased = 1,

    /// Version 2, DCE security.
    Dce = 2,

    /// Version 3, name-based with MD5.
    NameBased = 3,

    /// Version 4, random.
    Random = 4,
}

impl TryFrom<u8> for GuidVersion {
    type Error = Error;

    fn try_from(src: u8) -> Result<Self, Self::Error> {
        match src {
            1 => Ok(Self::TimeBased),
            2 => Ok(Self::Dce),
            3 => Ok(Self::NameBased),
            4 => Ok(Self::Random),
            version => Err(Error::NotTimeBased { version }),
        }
    }
}

/// Six-byte identifier of the process or machine that produced an identifier.
///
/// # Examples
///
/// ```rust
/// use timeguid::Node;
///
/// let node = Node::from([0x12, 0x34, 0x56, 0x78, 0xfe, 0xff]);
/// assert_eq!(node.increment()?, Node::from([0x12, 0x34, 0x56, 0x78, 0xff, 0x00]));
/// assert!(Node::MAX.increment().is_err());
/// # Ok::<(), timeguid::Error>(())
/// ```
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
pub struct Node([u8; NODE_SIZE]);

impl Node {
    /// All-zero node.
    pub const MIN: Self = Self([0x00; NODE_SIZE]);

    /// All-`0xff` node.
    pub const MAX: Self = Self([0xff; NODE_SIZE]);

    /// Returns a reference to the underlying byte array.
    pub const fn as_bytes(&self) -> &[u8; NODE_SIZE] {
        &self.0
    }

    /// Returns the next node in big-endian order, or an error for [`Node::MAX`].
    pub fn increment(&self) -> Result<Self, Error> {
        let mut node = self.0;
        for e in node.iter_mut().rev() {
            let (digit, carry) = e.overflowing_add(1);
            *e = digit;
            if !carry {
                return Ok(Self(node));
            }
        }
        Err(Error::NodeOverflow)
    }

    /// Returns the previous node in big-endian order, or an error for [`Node::MIN`].
    pub fn decrement(&self) -> Result<Self, Error> {
        let mut node = self.0;
        for e in node.iter_mut().rev() {
            let (digit, borrow) = e.overflowing_sub(1);
            *e = digit;
            if !borrow {
                return Ok(Self(node));
            }
        }
        Err(Error::NodeUnderflow)
    }
}

impl From<[u8; NODE_SIZE]> for Node {
    fn from(src: [u8; NODE_SIZE]) -> Self {
        Self(src)
    }
}

impl From<Node> for [u8; NODE_SIZE] {
    fn from(src: Node) -> Self {
        src.0
    }
}

impl TryFrom<&[u8]> for Node {
    type Error = Error;

    fn try_from(src: &[u8]) -> Result<Self, Self::Error> {
        <[u8; NODE_SIZE]>::try_from(src)
            .map(Self)
            .map_err(|_| Error::InvalidNodeLength(src.len()))
    }
}

impl AsRef<[u8]> for Node {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node(")?;
        for e in self.0 {
            write!(f, "{e:02x}")?;
        }
        write!(f, ")")
    }
}

/// Encodes a timestamp, clock sequence, and node into the 16-byte layout.
///
/// # Errors
///
/// Fails with a range error if `timestamp` lies outside
/// [`GREGORIAN_CALENDAR_START`]`..=`[`GREGORIAN_CALENDAR_END`] or `clock_sequence` exceeds
/// [`MAX_CLOCK_SEQUENCE`].
///
/// # Examples
///
/// ```rust
/// use timeguid::{layout, Node};
///
/// let bytes = layout::format(layout::GREGORIAN_CALENDAR_START, 0, Node::MIN)?;
/// assert_eq!(bytes, [0, 0, 0, 0, 0, 0, 0x10, 0, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80]);
/// # Ok::<(), timeguid::Error>(())
/// ```
pub fn format(timestamp: Timestamp, clock_sequence: u16, node: Node) -> Result<[u8; 16], Error> {
    if timestamp < GREGORIAN_CALENDAR_START || timestamp > GREGORIAN_CALENDAR_END {
        return Err(Error::TimestampOutOfRange {
            ticks: timestamp.ticks(),
            min: GREGORIAN_CALENDAR_START.ticks(),
            max: GREGORIAN_CALENDAR_END.ticks(),
        });
    }
    if clock_sequence > MAX_CLOCK_SEQUENCE {
        return Err(Error::ClockSequenceOutOfRange(clock_sequence));
    }

    let ticks = timestamp.ticks_since(GREGORIAN_CALENDAR_START) as u64;
    Ok(encode(ticks, clock_sequence, &node.0))
}

/// Encodes fields after clamping `timestamp` into the Gregorian calendar range and truncating
/// `clock_sequence` to 14 bits.
pub(crate) fn format_saturating(timestamp: Timestamp, clock_sequence: u16, node: Node) -> [u8; 16] {
    let timestamp = timestamp.clamp(GREGORIAN_CALENDAR_START, GREGORIAN_CALENDAR_END);
    let ticks = timestamp.ticks_since(GREGORIAN_CALENDAR_START) as u64;
    encode(ticks, clock_sequence & MAX_CLOCK_SEQUENCE, &node.0)
}

/// Lays out already validated fields.
const fn encode(ticks: u64, clock_sequence: u16, node: &[u8; NODE_SIZE]) -> [u8; 16] {
    let t = ticks.to_le_bytes();
    let c = clock_sequence.to_be_bytes();
    let mut bytes = [
        t[3],
        t[2],
        t[1],
        t[0],
        t[5],
        t[4],
        t[7],
        t[6],
        c[0] ^ SIGN_BIT_MASK,
        c[1] ^ SIGN_BIT_MASK,
        node[0] ^ SIGN_BIT_MASK,
        node[1] ^ SIGN_BIT_MASK,
        node[2] ^ SIGN_BIT_MASK,
        node[3] ^ SIGN_BIT_MASK,
        node[4] ^ SIGN_BIT_MASK,
        node[5] ^ SIGN_BIT_MASK,
    ];

    // octets[ver_and_timestamp_hi] := 0001xxxx
    bytes[VERSION_OFFSET] &= VERSION_BYTE_MASK;
    bytes[VERSION_OFFSET] |= (GuidVersion::TimeBased as u8) << VERSION_BYTE_SHIFT;

    // octets[variant_and_clock_sequence] := 10xxxxxx
    bytes[VARIANT_OFFSET] &= VARIANT_BYTE_MASK;
    bytes[VARIANT_OFFSET] |= VARIANT_BITS_VALUE;

    bytes
}

/// Returns the version nibble.
pub const fn version(bytes: &[u8; 16]) -> u8 {
    bytes[VERSION_OFFSET] >> VERSION_BYTE_SHIFT
}

/// Returns `true` if the top two bits of octet 8 hold the RFC 4122 variant `10`.
pub const fn has_rfc4122_variant(bytes: &[u8; 16]) -> bool {
    bytes[VARIANT_OFFSET] & !VARIANT_BYTE_MASK == VARIANT_BITS_VALUE
}

/// Decodes the timestamp field.
pub const fn timestamp(bytes: &[u8; 16]) -> Timestamp {
    let ticks = u64::from_le_bytes([
        bytes[3],
        bytes[2],
        bytes[1],
        bytes[0],
        bytes[5],
        bytes[4],
        bytes[7],
        // octets[ver_and_timestamp_hi] := 0000xxxx
        bytes[6] & VERSION_BYTE_MASK,
    ]);
    Timestamp::from_ticks_unchecked(GREGORIAN_CALENDAR_START_TICKS + ticks as i64)
}

/// Decodes the clock sequence field.
pub const fn clock_sequence(bytes: &[u8; 16]) -> u16 {
    u16::from_be_bytes([
        (bytes[VARIANT_OFFSET] ^ SIGN_BIT_MASK) & VARIANT_BYTE_MASK,
        bytes[VARIANT_OFFSET + 1] ^ SIGN_BIT_MASK,
    ])
}

/// Decodes the node field.
pub const fn node(bytes: &[u8; 16]) -> Node {
    let mut node = [0u8; NODE_SIZE];
    let mut i = 0;
    while i < NODE_SIZE {
        node[i] = bytes[NODE_OFFSET + i] ^ SIGN_BIT_MASK;
        i += 1;
    }
    Node(node)
}

/// Compares two encodings the way Cassandra's `TimeUUIDType` does: by the 60-bit timestamp,
/// then by octets 8 to 15 as signed bytes.
pub fn compare_encoded(a: &[u8; 16], b: &[u8; 16]) -> Ordering {
    timestamp(a).cmp(&timestamp(b)).then_with(|| {
        let lhs = a[VARIANT_OFFSET..].iter().map(|&e| e as i8);
        let rhs = b[VARIANT_OFFSET..].iter().map(|&e| e as i8);
        lhs.cmp(rhs)
    })
}
