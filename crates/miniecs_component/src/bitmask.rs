//! Component masks.
//!
//! A [`Bitmask`] records which component kinds an entity holds (or a query
//! requires). Bit `i` set means "has the kind assigned bit index `i`". The
//! bits live in a [`FixedBitSet`] grown on demand; unused capacity never
//! affects equality, hashing, or the canonical key.

use std::fmt;
use std::hash::{Hash, Hasher};

use fixedbitset::{FixedBitSet, Ones};

/// A growable set of small non-negative integers.
#[derive(Debug, Clone, Default)]
pub struct Bitmask {
    bits: FixedBitSet,
}

impl Bitmask {
    /// Create an empty mask with no backing storage.
    #[must_use]
    pub fn new() -> Self {
        Self {
            bits: FixedBitSet::new(),
        }
    }

    /// Create an empty mask with room for `bits` bits before it has to grow.
    #[must_use]
    pub fn with_capacity(bits: usize) -> Self {
        Self {
            bits: FixedBitSet::with_capacity(bits),
        }
    }

    /// Set bit `bit`, growing the storage if needed.
    pub fn add(&mut self, bit: usize) {
        if bit >= self.bits.len() {
            self.bits.grow(bit + 1);
        }
        self.bits.insert(bit);
    }

    /// Clear bit `bit`. Bits beyond the current storage are already clear.
    pub fn remove(&mut self, bit: usize) {
        if bit < self.bits.len() {
            self.bits.set(bit, false);
        }
    }

    /// Returns `true` if bit `bit` is set.
    #[must_use]
    pub fn has(&self, bit: usize) -> bool {
        self.bits.contains(bit)
    }

    /// Number of bits set in `self` but not in `other`.
    ///
    /// The result is zero exactly when `self` is a subset of `other`, which is
    /// how query masks are tested against entity masks.
    #[must_use]
    pub fn difference_size(&self, other: &Bitmask) -> usize {
        self.bits.difference(&other.bits).count()
    }

    /// Returns `true` if every bit set in `self` is also set in `other`.
    #[must_use]
    pub fn is_subset_of(&self, other: &Bitmask) -> bool {
        self.difference_size(other) == 0
    }

    /// Number of bits set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bits.count_ones(..)
    }

    /// Returns `true` if no bit is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bits.ones().next().is_none()
    }

    /// Iterate over the set bits in ascending order.
    #[must_use]
    pub fn iter(&self) -> Ones<'_> {
        self.bits.ones()
    }

    /// Canonical string for the exact set of set bits, e.g. `{0,3,5}`.
    ///
    /// Two masks with the same set bits always produce the same key, no
    /// matter how much storage each one has grown.
    #[must_use]
    pub fn to_canonical_key(&self) -> String {
        self.to_string()
    }
}

impl PartialEq for Bitmask {
    fn eq(&self, other: &Self) -> bool {
        self.iter().eq(other.iter())
    }
}

impl Eq for Bitmask {}

impl Hash for Bitmask {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let mut count = 0usize;
        for bit in self.iter() {
            bit.hash(state);
            count += 1;
        }
        count.hash(state);
    }
}

impl fmt::Display for Bitmask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, bit) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{bit}")?;
        }
        f.write_str("}")
    }
}

impl FromIterator<usize> for Bitmask {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut mask = Bitmask::new();
        mask.extend(iter);
        mask
    }
}

impl Extend<usize> for Bitmask {
    fn extend<I: IntoIterator<Item = usize>>(&mut self, iter: I) {
        for bit in iter {
            self.add(bit);
        }
    }
}

impl<'a> IntoIterator for &'a Bitmask {
    type Item = usize;
    type IntoIter = Ones<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
