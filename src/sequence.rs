//! 32-bit TCP sequence numbers with wrapping (serial number) comparison.
//! 带回绕（序列号算术）比较的32位TCP序列号。

use std::cmp::Ordering;
use std::fmt;
use std::ops::Add;

/// A TCP sequence number.
///
/// Ordering follows serial number arithmetic: `a < b` when `b - a`, taken
/// modulo 2^32, lies in the lower half of the space. This order is only
/// partial and not transitive across the whole space, so the type does not
/// implement `Ord`. Numbers exactly half the space apart are incomparable.
///
/// TCP序列号。排序遵循序列号算术，只是偏序；相距恰好半个空间的序列号不可比较。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SequenceNumber(u32);

impl SequenceNumber {
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub const fn value(self) -> u32 {
        self.0
    }

    /// Number of bytes from `earlier` up to `self`, modulo 2^32.
    /// 从 `earlier` 到 `self` 的字节数（模 2^32）。
    pub const fn distance_from(self, earlier: SequenceNumber) -> u32 {
        self.0.wrapping_sub(earlier.0)
    }
}

impl From<u32> for SequenceNumber {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl Add<u32> for SequenceNumber {
    type Output = SequenceNumber;

    fn add(self, rhs: u32) -> Self::Output {
        Self(self.0.wrapping_add(rhs))
    }
}

impl PartialOrd for SequenceNumber {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.0 == other.0 {
            return Some(Ordering::Equal);
        }
        match other.0.wrapping_sub(self.0).cmp(&(1 << 31)) {
            Ordering::Less => Some(Ordering::Less),
            Ordering::Greater => Some(Ordering::Greater),
            Ordering::Equal => None,
        }
    }
}

impl fmt::Display for SequenceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::SequenceNumber;

    #[test]
    fn test_plain_ordering() {
        let a = SequenceNumber::new(1000);
        let b = SequenceNumber::new(2000);
        assert!(a < b);
        assert!(b > a);
        assert_eq!(b.distance_from(a), 1000);
    }

    #[test]
    fn test_ordering_across_wrap() {
        let before = SequenceNumber::new(u32::MAX - 10);
        let after = before + 100;
        assert_eq!(after.value(), 89);
        assert!(before < after);
        assert_eq!(after.distance_from(before), 100);
    }

    #[test]
    fn test_half_space_apart_is_incomparable() {
        let a = SequenceNumber::new(0);
        let b = SequenceNumber::new(1 << 31);
        assert_eq!(a.partial_cmp(&b), None);
        assert_eq!(b.partial_cmp(&a), None);
        assert_ne!(a, b);
    }

    #[test]
    fn test_ordering_is_local_to_each_pair() {
        // Three numbers spread over the space compare in a cycle.
        let a = SequenceNumber::new(0);
        let b = SequenceNumber::new(0x6000_0000);
        let c = SequenceNumber::new(0xC000_0000);
        assert!(a < b);
        assert!(b < c);
        assert!(c < a);
    }
}
