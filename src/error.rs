//! Error type shared by every fallible operation of the crate.

/// Coarse classification of an [`Error`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorKind {
    /// A value lies outside the range the operation accepts.
    Range,

    /// Raw bytes or text are malformed.
    Format,

    /// Well-formed input that does not carry a time-based (version 1) identifier.
    Version,
}

/// Error returned by constructors, parsers, and the codec.
#[derive(Clone, Eq, PartialEq, Hash, Debug, thiserror::Error)]
pub enum Error {
    /// A timestamp lies outside the range the operation accepts.
    #[error("timestamp of {ticks} ticks is out of range [{min}, {max}]")]
    TimestampOutOfRange {
        /// Rejected tick count.
        ticks: i64,
        /// Smallest accepted tick count.
        min: i64,
        /// Largest accepted tick count.
        max: i64,
    },

    /// A clock sequence does not fit in 14 bits.
    #[error("clock sequence {0} must not be greater than 16383")]
    ClockSequenceOutOfRange(u16),

    /// A node was built from a slice that is not 6 bytes long.
    #[error("node must be 6 bytes long, got {0}")]
    InvalidNodeLength(usize),

    /// A clock was configured with a zero sync period.
    #[error("clock sync period must be positive")]
    NonPositiveSyncPeriod,

    /// A generator was configured with a zero node rotation period.
    #[error("node rotation period must be positive")]
    NonPositiveRotationPeriod,

    /// A timestamp was floored to a precision shorter than one tick.
    #[error("invalid precision: {0:?}")]
    InvalidPrecision(std::time::Duration),

    /// The all-`0xff` node has no successor.
    #[error("cannot increment max node")]
    NodeOverflow,

    /// The all-zero node has no predecessor.
    #[error("cannot decrement min node")]
    NodeUnderflow,

    /// Raw bytes are not 16 bytes long.
    #[error("bytes must be 16 bytes long, got {0}")]
    InvalidLength(usize),

    /// Text is not in the canonical 8-4-4-4-12 hexadecimal form.
    #[error("invalid string representation")]
    InvalidString,

    /// Octet 8 does not carry the RFC 4122 variant bits `10`.
    #[error("invalid variant octet {0:#04x}")]
    InvalidVariant(u8),

    /// The version nibble is not `1`.
    #[error("invalid v1 guid: version {version}")]
    NotTimeBased {
        /// Version nibble found in octet 6.
        version: u8,
    },
}

impl Error {
    /// Returns the class of this error.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::TimestampOutOfRange { .. }
            | Self::ClockSequenceOutOfRange(_)
            | Self::InvalidNodeLength(_)
            | Self::NonPositiveSyncPeriod
            | Self::NonPositiveRotationPeriod
            | Self::InvalidPrecision(_)
            | Self::NodeOverflow
            | Self::NodeUnderflow => ErrorKind::Range,
            Self::InvalidLength(_) | Self::InvalidString | Self::InvalidVariant(_) => {
                ErrorKind::Format
            }
            Self::NotTimeBased { .. } => ErrorKind::Version,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Error, ErrorKind};

    /// Classifies variants into the three error kinds
    #[test]
    fn classifies_variants_into_the_three_error_kinds() {
        assert_eq!(Error::ClockSequenceOutOfRange(16384).kind(), ErrorKind::Range);
        assert_eq!(Error::NodeUnderflow.kind(), ErrorKind::Range);
        assert_eq!(Error::InvalidLength(15).kind(), ErrorKind::Format);
        assert_eq!(Error::InvalidString.kind(), ErrorKind::Format);
        assert_eq!(Error::InvalidVariant(0x12).kind(), ErrorKind::Format);
        assert_eq!(Error::NotTimeBased { version: 4 }.kind(), ErrorKind::Version);
    }

    /// Renders human readable messages
    #[test]
    fn renders_human_readable_messages() {
        assert_eq!(
            Error::ClockSequenceOutOfRange(65535).to_string(),
            "clock sequence 65535 must not be greater than 16383"
        );
        assert_eq!(
            Error::InvalidNodeLength(4).to_string(),
            "node must be 6 bytes long, got 4"
        );
        assert_eq!(
            Error::InvalidVariant(0x12).to_string(),
            "invalid variant octet 0x12"
        );
        assert_eq!(
            Error::NotTimeBased { version: 4 }.to_string(),
            "invalid v1 guid: version 4"
        );
    }
}
