//! Bit-addressable view over a byte buffer.
//!
//! [`BitField`] is the substrate for both the value bits and the knowledge mask of every
//! emulated value. It does not own any storage: it borrows (or wraps) a byte buffer and
//! exposes individual-bit access and bitwise operations over it.
//!
//! # Bit Order
//!
//! Bit `i` lives in byte `i / 8` at sub-bit `i % 8`. Both the byte order and the bit order
//! within a byte are little-endian, which matches the raw in-memory layout of the emulated
//! machine words.
//!
//! # Example
//!
//! ```rust
//! use emuscope::utils::BitField;
//!
//! let mut buffer = [0u8; 2];
//! let mut field = BitField::new(&mut buffer[..]);
//!
//! field.set(9, true)?;
//! assert!(field.get(9)?);
//! assert_eq!(buffer, [0x00, 0x02]);
//! # Ok::<(), emuscope::Error>(())
//! ```

use crate::{Error, Result};

/// A bit-addressable view over a byte buffer.
///
/// `B` is anything that can be viewed as a byte slice. Read access only requires
/// `B: AsRef<[u8]>`, mutation additionally requires `B: AsMut<[u8]>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BitField<B> {
    bytes: B,
}

impl<B: AsRef<[u8]>> BitField<B> {
    /// Creates a new view over `bytes`.
    pub const fn new(bytes: B) -> Self {
        Self { bytes }
    }

    /// Returns the number of addressable bits.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.as_ref().len() * 8
    }

    /// Returns `true` if the backing buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.as_ref().is_empty()
    }

    /// Returns the backing bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.bytes.as_ref()
    }

    /// Consumes the view and returns the backing buffer.
    pub fn into_inner(self) -> B {
        self.bytes
    }

    /// Reads the bit at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] if `index >= self.len()`.
    pub fn get(&self, index: usize) -> Result<bool> {
        self.check_index(index)?;
        Ok(self.bytes.as_ref()[index / 8] >> (index % 8) & 1 == 1)
    }

    /// Returns an iterator over all bits, least significant first.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        let bytes = self.bytes.as_ref();
        (0..bytes.len() * 8).map(move |i| bytes[i / 8] >> (i % 8) & 1 == 1)
    }

    /// Returns `true` if at least one bit is set.
    #[must_use]
    pub fn any(&self) -> bool {
        self.bytes.as_ref().iter().any(|&b| b != 0)
    }

    /// Returns `true` if every bit is set.
    #[must_use]
    pub fn all(&self) -> bool {
        self.bytes.as_ref().iter().all(|&b| b == 0xFF)
    }

    /// Returns the index of the most significant set bit, if any.
    #[must_use]
    pub fn highest_set(&self) -> Option<usize> {
        let bytes = self.bytes.as_ref();
        bytes
            .iter()
            .enumerate()
            .rev()
            .find(|&(_, &b)| b != 0)
            .map(|(i, &b)| i * 8 + (7 - b.leading_zeros() as usize))
    }

    fn check_index(&self, index: usize) -> Result<()> {
        let len = self.len();
        if index >= len {
            return Err(Error::OutOfBounds { index, len });
        }
        Ok(())
    }

    fn check_len(&self, other: &[u8]) -> Result<()> {
        let expected = self.bytes.as_ref().len();
        if other.len() != expected {
            return Err(Error::SizeMismatch {
                expected,
                actual: other.len(),
            });
        }
        Ok(())
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> BitField<B> {
    /// Writes the bit at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] if `index >= self.len()`.
    pub fn set(&mut self, index: usize, value: bool) -> Result<()> {
        self.check_index(index)?;
        let byte = &mut self.bytes.as_mut()[index / 8];
        let bit = 1u8 << (index % 8);
        if value {
            *byte |= bit;
        } else {
            *byte &= !bit;
        }
        Ok(())
    }

    /// Computes the bitwise AND with `other` (in place).
    ///
    /// # Errors
    ///
    /// Returns [`Error::SizeMismatch`] if `other` has a different length.
    pub fn and(&mut self, other: &[u8]) -> Result<()> {
        self.check_len(other)?;
        for (a, b) in self.bytes.as_mut().iter_mut().zip(other) {
            *a &= *b;
        }
        Ok(())
    }

    /// Computes the bitwise OR with `other` (in place).
    ///
    /// # Errors
    ///
    /// Returns [`Error::SizeMismatch`] if `other` has a different length.
    pub fn or(&mut self, other: &[u8]) -> Result<()> {
        self.check_len(other)?;
        for (a, b) in self.bytes.as_mut().iter_mut().zip(other) {
            *a |= *b;
        }
        Ok(())
    }

    /// Computes the bitwise XOR with `other` (in place).
    ///
    /// # Errors
    ///
    /// Returns [`Error::SizeMismatch`] if `other` has a different length.
    pub fn xor(&mut self, other: &[u8]) -> Result<()> {
        self.check_len(other)?;
        for (a, b) in self.bytes.as_mut().iter_mut().zip(other) {
            *a ^= *b;
        }
        Ok(())
    }

    /// Inverts every bit (in place).
    pub fn not(&mut self) {
        for byte in self.bytes.as_mut() {
            *byte = !*byte;
        }
    }

    /// Sets every bit to `value`.
    pub fn fill(&mut self, value: bool) {
        let byte = if value { 0xFF } else { 0x00 };
        self.bytes.as_mut().fill(byte);
    }
}
