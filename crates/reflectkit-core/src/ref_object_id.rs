//! Stable cross-context object identity.
//!
//! [`RefObjectId`] is a 128-bit value (four 32-bit words) identifying a
//! managed object across plugin load/unload boundaries and serialization
//! round-trips. [`RefObjectId::zero`] is a reserved sentinel meaning
//! "no identity".

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Error parsing a [`RefObjectId`] from its string form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid object id: {0:?}")]
pub struct ParseRefObjectIdError(pub String);

/// A 128-bit stable object identity.
///
/// Equality and ordering are total; [`RefObjectId::generate`] produces a
/// statistically unique value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RefObjectId {
    a: u32,
    b: u32,
    c: u32,
    d: u32,
}

impl RefObjectId {
    /// Construct from four words.
    pub const fn new(a: u32, b: u32, c: u32, d: u32) -> Self {
        Self { a, b, c, d }
    }

    /// The reserved "no identity" sentinel.
    pub const fn zero() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Check whether this is the sentinel.
    pub fn is_zero(&self) -> bool {
        *self == Self::zero()
    }

    /// Generate a statistically unique identity.
    ///
    /// Never returns [`RefObjectId::zero`].
    pub fn generate() -> Self {
        loop {
            let id = Self::new(
                rand::random::<u32>(),
                rand::random::<u32>(),
                rand::random::<u32>(),
                rand::random::<u32>(),
            );
            if !id.is_zero() {
                return id;
            }
        }
    }

    /// Fold the four words into a 64-bit hash.
    pub fn hash64(&self) -> u64 {
        let mut seed = 0u64;
        for word in [self.a, self.b, self.c, self.d] {
            seed = seed
                .rotate_left(13)
                .wrapping_mul(0x9e37_79b9_7f4a_7c15)
                .wrapping_add(u64::from(word));
        }
        seed
    }
}

impl fmt::Display for RefObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:08X}.{:08X}.{:08X}.{:08X}",
            self.a, self.b, self.c, self.d
        )
    }
}

impl FromStr for RefObjectId {
    type Err = ParseRefObjectIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = [0u32; 4];
        let mut parts = s.split('.');
        for word in &mut words {
            let part = parts
                .next()
                .ok_or_else(|| ParseRefObjectIdError(s.to_string()))?;
            *word = u32::from_str_radix(part, 16)
                .map_err(|_| ParseRefObjectIdError(s.to_string()))?;
        }
        if parts.next().is_some() {
            return Err(ParseRefObjectIdError(s.to_string()));
        }
        Ok(Self::new(words[0], words[1], words[2], words[3]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_sentinel() {
        assert!(RefObjectId::zero().is_zero());
        assert!(!RefObjectId::new(1, 0, 0, 0).is_zero());
    }

    #[test]
    fn generate_is_nonzero_and_unique() {
        let a = RefObjectId::generate();
        let b = RefObjectId::generate();
        assert!(!a.is_zero());
        assert_ne!(a, b);
    }

    #[test]
    fn string_round_trip() {
        let id = RefObjectId::new(0xDEADBEEF, 0x01234567, 0x89ABCDEF, 0x000000FF);
        let text = id.to_string();
        assert_eq!(text, "DEADBEEF.01234567.89ABCDEF.000000FF");
        let parsed: RefObjectId = text.parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn parse_rejects_malformed() {
        assert!("".parse::<RefObjectId>().is_err());
        assert!("DEADBEEF".parse::<RefObjectId>().is_err());
        assert!("XX.00.00.00".parse::<RefObjectId>().is_err());
        assert!("1.2.3.4.5".parse::<RefObjectId>().is_err());
    }

    #[test]
    fn ordering_is_word_major() {
        let low = RefObjectId::new(1, 0xFFFF_FFFF, 0xFFFF_FFFF, 0xFFFF_FFFF);
        let high = RefObjectId::new(2, 0, 0, 0);
        assert!(low < high);
    }

    #[test]
    fn hash_distinguishes_word_order() {
        let a = RefObjectId::new(1, 2, 3, 4);
        let b = RefObjectId::new(4, 3, 2, 1);
        assert_ne!(a.hash64(), b.hash64());
    }
}
