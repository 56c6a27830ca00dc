//! Lexicographic comparison, equality, and hashing over raw byte sequences.
//!
//! The comparator orders bytes as unsigned values, and a strict prefix sorts before the longer
//! sequence. Equal-length prefixes are compared eight bytes at a time as big-endian words, which
//! yields the same result as a byte-at-a-time walk.

use std::cmp::Ordering;

const WORD_SIZE: usize = 8;

/// Compares two byte sequences in unsigned lexicographic order.
///
/// # Examples
///
/// ```rust
/// use std::cmp::Ordering;
/// use timeguid::bytes;
///
/// assert_eq!(bytes::compare(&[0x01, 0xff], &[0x02]), Ordering::Less);
/// assert_eq!(bytes::compare(&[0x01, 0x02], &[0x01]), Ordering::Greater);
/// assert_eq!(bytes::compare(b"same", b"same"), Ordering::Equal);
/// ```
pub fn compare(a: &[u8], b: &[u8]) -> Ordering {
    let n = a.len().min(b.len());
    memcmp(&a[..n], &b[..n]).then(a.len().cmp(&b.len()))
}

/// Returns `true` if `a` and `b` hold the same bytes.
pub fn equals(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && memcmp(a, b) == Ordering::Equal
}

/// Returns `true` if `a` sorts strictly before `b`.
pub fn less_than(a: &[u8], b: &[u8]) -> bool {
    compare(a, b) == Ordering::Less
}

/// Returns `true` if `a` sorts strictly after `b`.
pub fn greater_than(a: &[u8], b: &[u8]) -> bool {
    compare(a, b) == Ordering::Greater
}

/// Computes a fast, non-cryptographic hash from the first four bytes.
///
/// Missing bytes count as zero. The result is only as good as the entropy of the leading bytes,
/// so this must not be relied upon for adversarial input.
pub fn hash(a: &[u8]) -> u32 {
    let mut word = [0u8; 4];
    let n = a.len().min(word.len());
    word[..n].copy_from_slice(&a[..n]);
    u32::from_le_bytes(word)
}

/// Compares two equal-length sequences.
fn memcmp(a: &[u8], b: &[u8]) -> Ordering {
    debug_assert_eq!(a.len(), b.len());
    let mut lhs = a.chunks_exact(WORD_SIZE);
    let mut rhs = b.chunks_exact(WORD_SIZE);
    for (l, r) in lhs.by_ref().zip(rhs.by_ref()) {
        let (l, r) = (load_word(l), load_word(r));
        if l != r {
            return l.cmp(&r);
        }
    }

    for (l, r) in lhs.remainder().iter().zip(rhs.remainder()) {
        if l != r {
            return l.cmp(r);
        }
    }
    Ordering::Equal
}

/// Reads a big-endian word from a chunk of exactly [`WORD_SIZE`] bytes.
fn load_word(chunk: &[u8]) -> u64 {
    let mut word = [0u8; WORD_SIZE];
    // panics on a short chunk; `chunks_exact` never yields one
    word.copy_from_slice(chunk);
    u64::from_be_bytes(word)
}
