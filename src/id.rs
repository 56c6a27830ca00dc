use std::{cmp::Ordering, fmt, hash, str};

use fstr::FStr;

use crate::{
    bytes,
    layout::{self, Node, MAX_CLOCK_SEQUENCE, MIN_CLOCK_SEQUENCE, TIME_GUID_SIZE},
    Error, Timestamp,
};

/// Represents a time-based (version 1) GUID laid out for Cassandra's `TimeUUIDType`.
///
/// The value is an immutable 16-byte array in wire order. Its [`Ord`] implementation compares
/// the timestamp first, then the clock sequence, and then the node, exactly like the storage
/// engine does. Equality and hashing work on the raw bytes.
#[derive(Copy, Clone)]
pub struct TimeGuid([u8; TIME_GUID_SIZE]);

impl TimeGuid {
    /// The smallest identifier (00000000-0000-1000-8080-808080808080).
    pub const MIN: Self = Self(layout::MIN_TIME_GUID);

    /// The largest identifier (ffffffff-ffff-1fff-bf7f-7f7f7f7f7f7f).
    pub const MAX: Self = Self(layout::MAX_TIME_GUID);

    /// Creates an identifier from its field values.
    ///
    /// # Errors
    ///
    /// Returns a range error if `timestamp` is outside the Gregorian calendar range or
    /// `clock_sequence` is greater than 16383.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use timeguid::{Node, TimeGuid, Timestamp};
    ///
    /// let x = TimeGuid::new(Timestamp::UNIX_EPOCH, 0x1234, Node::from([1, 2, 3, 4, 5, 6]))?;
    /// assert_eq!(x.to_string(), "13814000-1dd2-11b2-92b4-818283848586");
    /// assert_eq!(x.timestamp(), Timestamp::UNIX_EPOCH);
    /// assert_eq!(x.clock_sequence(), 0x1234);
    /// # Ok::<(), timeguid::Error>(())
    /// ```
    pub fn new(timestamp: Timestamp, clock_sequence: u16, node: Node) -> Result<Self, Error> {
        layout::format(timestamp, clock_sequence, node).map(Self)
    }

    /// Creates an identifier from a byte slice in wire order.
    ///
    /// # Errors
    ///
    /// Returns a format error if `src` is not 16 bytes long or octet 8 lacks the RFC 4122 variant
    /// bits, and a version error if the version nibble is not `1`.
    pub fn from_slice(src: &[u8]) -> Result<Self, Error> {
        <[u8; TIME_GUID_SIZE]>::try_from(src)
            .map_err(|_| Error::InvalidLength(src.len()))
            .and_then(Self::try_from)
    }

    /// Returns the identifier with the smallest clock sequence and node for `timestamp`.
    pub fn min_for_timestamp(timestamp: Timestamp) -> Result<Self, Error> {
        Self::new(timestamp, MIN_CLOCK_SEQUENCE, Node::MIN)
    }

    /// Returns the identifier with the largest clock sequence and node for `timestamp`.
    pub fn max_for_timestamp(timestamp: Timestamp) -> Result<Self, Error> {
        Self::new(timestamp, MAX_CLOCK_SEQUENCE, Node::MAX)
    }

    /// Wraps bytes produced by the codec.
    pub(crate) const fn from_encoded(bytes: [u8; TIME_GUID_SIZE]) -> Self {
        Self(bytes)
    }

    /// Returns `true` if `src` is the canonical text of a time-based GUID.
    pub fn is_time_guid(src: &str) -> bool {
        src.parse::<Self>().is_ok()
    }

    /// Returns a reference to the underlying byte array.
    pub const fn as_bytes(&self) -> &[u8; TIME_GUID_SIZE] {
        &self.0
    }

    /// Returns a copy of the underlying byte array.
    pub const fn to_bytes(self) -> [u8; TIME_GUID_SIZE] {
        self.0
    }

    /// Returns the decoded timestamp.
    pub const fn timestamp(&self) -> Timestamp {
        layout::timestamp(&self.0)
    }

    /// Returns the decoded 14-bit clock sequence.
    pub const fn clock_sequence(&self) -> u16 {
        layout::clock_sequence(&self.0)
    }

    /// Returns the decoded node.
    pub const fn node(&self) -> Node {
        layout::node(&self.0)
    }

    /// Returns the identifier immediately preceding this one in the total order.
    ///
    /// No identifier lies strictly between the result and `self`, so the result serves as an
    /// inclusive upper bound equivalent to "strictly before `self`".
    ///
    /// # Errors
    ///
    /// Returns a range error if `self` is the minimum identifier of the Gregorian calendar start,
    /// which has no predecessor.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use timeguid::{Node, TimeGuid, Timestamp};
    ///
    /// let x = TimeGuid::new(Timestamp::UNIX_EPOCH, 7, Node::MIN)?;
    /// let y = x.before()?;
    /// assert!(y < x);
    /// assert_eq!(y.clock_sequence(), 6);
    /// assert_eq!(y.node(), Node::MAX);
    /// # Ok::<(), timeguid::Error>(())
    /// ```
    pub fn before(&self) -> Result<Self, Error> {
        let timestamp = self.timestamp();
        let clock_sequence = self.clock_sequence();
        let node = self.node();
        if node != Node::MIN {
            Self::new(timestamp, clock_sequence, node.decrement()?)
        } else if clock_sequence != MIN_CLOCK_SEQUENCE {
            Self::new(timestamp, clock_sequence - 1, Node::MAX)
        } else {
            Self::max_for_timestamp(timestamp.add_ticks(-1)?)
        }
    }

    /// Returns the 8-4-4-4-12 hexadecimal string representation stored in a stack-allocated
    /// string.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use timeguid::TimeGuid;
    ///
    /// let x = "13814000-1dd2-11b2-92b4-818283848586".parse::<TimeGuid>()?;
    /// let y = x.encode();
    /// assert_eq!(&y as &str, "13814000-1dd2-11b2-92b4-818283848586");
    /// assert_eq!(format!("{}", y), "13814000-1dd2-11b2-92b4-818283848586");
    /// # Ok::<(), timeguid::Error>(())
    /// ```
    pub fn encode(&self) -> FStr<36> {
        const DIGITS: &[u8; 16] = b"0123456789abcdef";

        let mut buffer = [b'-'; 36];
        let mut pos = 0;
        for (i, e) in self.0.iter().enumerate() {
            buffer[pos] = DIGITS[(e >> 4) as usize];
            buffer[pos + 1] = DIGITS[(e & 15) as usize];
            pos += if i == 3 || i == 5 || i == 7 || i == 9 { 3 } else { 2 };
        }
        debug_assert!(buffer.is_ascii());
        // SAFETY: every byte written is an ASCII hex digit or hyphen
        unsafe { FStr::from_bytes_unchecked(buffer) }
    }
}

impl PartialEq for TimeGuid {
    fn eq(&self, other: &Self) -> bool {
        bytes::equals(&self.0, &other.0)
    }
}

impl Eq for TimeGuid {}

impl hash::Hash for TimeGuid {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        state.write_u32(bytes::hash(&self.0));
    }
}

impl PartialOrd for TimeGuid {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimeGuid {
    fn cmp(&self, other: &Self) -> Ordering {
        layout::compare_encoded(&self.0, &other.0)
    }
}

impl fmt::Display for TimeGuid {
    /// Returns the 8-4-4-4-12 canonical hexadecimal string representation.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl fmt::Debug for TimeGuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TimeGuid({}, {}, {})",
            self.encode(),
            self.timestamp(),
            self.clock_sequence()
        )
    }
}

impl str::FromStr for TimeGuid {
    type Err = Error;

    /// Creates an object from the 8-4-4-4-12 hexadecimal string representation.
    fn from_str(src: &str) -> Result<Self, Self::Err> {
        const ERR: Error = Error::InvalidString;
        let mut dst = [0u8; TIME_GUID_SIZE];
        let mut iter = src.chars();
        for (i, e) in dst.iter_mut().enumerate() {
            let hi = iter.next().ok_or(ERR)?.to_digit(16).ok_or(ERR)? as u8;
            let lo = iter.next().ok_or(ERR)?.to_digit(16).ok_or(ERR)? as u8;
            *e = (hi << 4) | lo;
            if (i == 3 || i == 5 || i == 7 || i == 9) && iter.next().ok_or(ERR)? != '-' {
                return Err(ERR);
            }
        }
        if iter.next().is_none() {
            Self::try_from(dst)
        } else {
            Err(ERR)
        }
    }
}

impl TryFrom<[u8; TIME_GUID_SIZE]> for TimeGuid {
    type Error = Error;

    /// Validates the version nibble and variant bits of a byte array in wire order.
    fn try_from(src: [u8; TIME_GUID_SIZE]) -> Result<Self, Self::Error> {
        match layout::version(&src) {
            1 if layout::has_rfc4122_variant(&src) => Ok(Self(src)),
            1 => Err(Error::InvalidVariant(src[8])),
            version => Err(Error::NotTimeBased { version }),
        }
    }
}

impl From<TimeGuid> for [u8; TIME_GUID_SIZE] {
    fn from(src: TimeGuid) -> Self {
        src.0
    }
}

impl AsRef<[u8]> for TimeGuid {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

#[cfg(feature = "uuid")]
#[cfg_attr(docsrs, doc(cfg(feature = "uuid")))]
mod uuid_support {
    use super::TimeGuid;
    use crate::Error;

    impl From<TimeGuid> for uuid::Uuid {
        fn from(src: TimeGuid) -> Self {
            uuid::Uuid::from_bytes(src.0)
        }
    }

    impl TryFrom<uuid::Uuid> for TimeGuid {
        type Error = Error;

        fn try_from(src: uuid::Uuid) -> Result<Self, Self::Error> {
            Self::try_from(src.into_bytes())
        }
    }
}
