//! Integers with bit-level uncertainty.
//!
//! [`IntegerNValue`] is an arbitrary-width two's complement integer where every bit is
//! tracked as a [`Trilean`]. Arithmetic ripples three-valued carries through the bit vector,
//! so a result bit only becomes unknown where the inputs (or an incoming carry) leave it
//! undetermined.
//!
//! The floating point model manufactures these values to extract exponents and
//! significands and to carry out alignment and addition; they are plain stack-local values
//! and are discarded after use.

use std::fmt;

use crate::{
    emulation::value::{check_size, Trilean, Value},
    utils::BitField,
    Error, Result,
};

/// The integer capability the floating point model builds on.
///
/// Semantics are exact two's complement. Masks are propagated bit-for-bit through shifts,
/// and [`IntegerValue::add`] / [`IntegerValue::subtract`] only produce unknown bits where
/// the operands (or the carries they generate) are unknown.
pub trait IntegerValue: Value {
    /// Reads bit `index` as a three-valued bit.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] if `index >= self.size() * 8`.
    fn get_bit(&self, index: usize) -> Result<Trilean>;

    /// Adds `other` to `self` (in place, wrapping).
    ///
    /// # Errors
    ///
    /// Returns [`Error::SizeMismatch`] if the operands differ in size.
    fn add(&mut self, other: &dyn IntegerValue) -> Result<()>;

    /// Subtracts `other` from `self` (in place, wrapping).
    ///
    /// # Errors
    ///
    /// Returns [`Error::SizeMismatch`] if the operands differ in size.
    fn subtract(&mut self, other: &dyn IntegerValue) -> Result<()>;

    /// Shifts left by `count` bits, filling with known zeroes.
    fn left_shift(&mut self, count: usize);

    /// Shifts right by `count` bits.
    ///
    /// Vacated bits are copies of the sign bit (including its knowledge) when `sign_extend`
    /// is set, and known zeroes otherwise.
    fn right_shift(&mut self, count: usize, sign_extend: bool);

    /// Index of the most significant bit that is known to be set, or `-1` if there is none.
    fn index_of_most_significant_nonzero_bit(&self) -> i32;

    /// Interprets the value as a signed native integer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotKnown`] if any bit is unknown, and [`Error::NotSupported`] if
    /// the value is wider than 64 bits.
    fn as_i64(&self) -> Result<i64>;
}

/// An arbitrary-width integer with a knowledge mask.
///
/// Unknown bits are always stored as `0` in the bits buffer, so two values with the same
/// knowledge compare equal.
///
/// # Examples
///
/// ```rust
/// use emuscope::emulation::{IntegerNValue, IntegerValue, Trilean, Value};
///
/// // 0b0000_01?1
/// let mut value = IntegerNValue::from_parts(0b101, 0b1111_1101, 1);
/// value.add(&IntegerNValue::from_u64(1, 1))?;
///
/// assert_eq!(value.to_string(), "0b0000???0");
/// assert_eq!(value.get_bit(0)?, Trilean::False);
/// assert!(!value.is_known());
/// # Ok::<(), emuscope::Error>(())
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct IntegerNValue {
    bits: Vec<u8>,
    mask: Vec<u8>,
}

impl IntegerNValue {
    /// Creates a value from little-endian bit and mask buffers.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SizeMismatch`] if the buffers differ in length.
    pub fn new(bits: &[u8], mask: &[u8]) -> Result<Self> {
        check_size(bits.len(), mask)?;
        let mut value = Self {
            bits: bits.to_vec(),
            mask: mask.to_vec(),
        };
        value.normalize();
        Ok(value)
    }

    /// Creates a fully known value of `size` bytes, truncating or zero-extending `value`.
    #[must_use]
    pub fn from_u64(value: u64, size: usize) -> Self {
        Self::from_parts(value, u64::MAX, size)
    }

    /// Creates a fully known value of `size` bytes, truncating or sign-extending `value`.
    #[must_use]
    pub fn from_i64(value: i64, size: usize) -> Self {
        let mut result = Self::from_u64(value as u64, size);
        if value < 0 {
            for byte in result.bits.iter_mut().skip(8) {
                *byte = 0xFF;
            }
        }
        result
    }

    /// Creates a value of `size` bytes from the low 64 bits of `bits` and `mask`.
    ///
    /// Bytes beyond the eighth are known zeroes.
    #[must_use]
    pub fn from_parts(bits: u64, mask: u64, size: usize) -> Self {
        let mut result = Self {
            bits: vec![0; size],
            mask: vec![0xFF; size],
        };
        for (i, (b, m)) in bits
            .to_le_bytes()
            .into_iter()
            .zip(mask.to_le_bytes())
            .take(size)
            .enumerate()
        {
            result.bits[i] = b;
            result.mask[i] = m;
        }
        result.normalize();
        result
    }

    /// Creates a known zero of `size` bytes.
    #[must_use]
    pub fn zero(size: usize) -> Self {
        Self::from_u64(0, size)
    }

    /// Creates a value of `size` bytes where no bit is known.
    #[must_use]
    pub fn fully_unknown(size: usize) -> Self {
        Self {
            bits: vec![0; size],
            mask: vec![0; size],
        }
    }

    /// The raw bits (little-endian, unknown bits read as `0`).
    #[must_use]
    pub fn bits(&self) -> &[u8] {
        &self.bits
    }

    /// The knowledge mask (little-endian).
    #[must_use]
    pub fn mask(&self) -> &[u8] {
        &self.mask
    }

    /// Writes bit `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] if `index >= self.size() * 8`.
    pub fn set_bit(&mut self, index: usize, value: Trilean) -> Result<()> {
        BitField::new(&mut self.bits[..]).set(index, value.is_true())?;
        BitField::new(&mut self.mask[..]).set(index, value.is_known())
    }

    /// Interprets the value as an unsigned native integer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotKnown`] if any bit is unknown, and [`Error::NotSupported`] if
    /// the value is wider than 64 bits.
    pub fn as_u64(&self) -> Result<u64> {
        if !self.is_known() {
            return Err(Error::NotKnown);
        }
        if self.bits.len() > 8 {
            return Err(Error::NotSupported("integer wider than 64 bits"));
        }
        let mut raw = [0u8; 8];
        raw[..self.bits.len()].copy_from_slice(&self.bits);
        Ok(u64::from_le_bytes(raw))
    }

    /// Index of the most significant unknown bit, or `-1` if the value is fully known.
    #[must_use]
    pub fn index_of_most_significant_unknown_bit(&self) -> i32 {
        let mut unknown = BitField::new(self.mask.clone());
        unknown.not();
        unknown.highest_set().map_or(-1, |i| i as i32)
    }

    /// Adds a known native integer (in place, wrapping).
    pub fn add_i64(&mut self, delta: i64) {
        let rhs = Self::from_i64(delta, self.bits.len());
        self.ripple(&rhs.trits(), false, Trilean::False);
    }

    /// The low 64 bits of the bits and mask buffers.
    pub(crate) fn low_parts(&self) -> (u64, u64) {
        let mut bits = [0u8; 8];
        let mut mask = [0u8; 8];
        let len = self.bits.len().min(8);
        bits[..len].copy_from_slice(&self.bits[..len]);
        mask[..len].copy_from_slice(&self.mask[..len]);
        (u64::from_le_bytes(bits), u64::from_le_bytes(mask))
    }

    /// Two's complement negation (in place).
    pub fn negate(&mut self) {
        let mut zero = Self::zero(self.bits.len());
        zero.ripple(&self.trits(), true, Trilean::True);
        *self = zero;
    }

    /// Three-valued bitwise AND (in place).
    ///
    /// # Errors
    ///
    /// Returns [`Error::SizeMismatch`] if the operands differ in size.
    pub fn and(&mut self, other: &Self) -> Result<()> {
        self.zip_with(other, |a, b| a & b)
    }

    /// Three-valued bitwise OR (in place).
    ///
    /// # Errors
    ///
    /// Returns [`Error::SizeMismatch`] if the operands differ in size.
    pub fn or(&mut self, other: &Self) -> Result<()> {
        self.zip_with(other, |a, b| a | b)
    }

    /// Three-valued bitwise XOR (in place).
    ///
    /// # Errors
    ///
    /// Returns [`Error::SizeMismatch`] if the operands differ in size.
    pub fn xor(&mut self, other: &Self) -> Result<()> {
        self.zip_with(other, |a, b| a ^ b)
    }

    /// Bitwise NOT (in place). Knowledge is unaffected.
    pub fn not(&mut self) {
        let mut bits = BitField::new(&mut self.bits[..]);
        bits.not();
        self.normalize();
    }

    fn zip_with(&mut self, other: &Self, op: impl Fn(Trilean, Trilean) -> Trilean) -> Result<()> {
        check_size(self.bits.len(), &other.bits)?;
        let result: Vec<Trilean> = self
            .trits()
            .into_iter()
            .zip(other.trits())
            .map(|(a, b)| op(a, b))
            .collect();
        self.store(&result);
        Ok(())
    }

    /// Full adder over three-valued bits: `self += (invert ? !rhs : rhs) + carry`.
    fn ripple(&mut self, rhs: &[Trilean], invert: bool, carry_in: Trilean) {
        let mut carry = carry_in;
        let sum: Vec<Trilean> = self
            .trits()
            .into_iter()
            .zip(rhs)
            .map(|(a, &b)| {
                let b = if invert { !b } else { b };
                let s = a ^ b ^ carry;
                carry = a.majority(b, carry);
                s
            })
            .collect();
        self.store(&sum);
    }

    fn operand_trits(&self, other: &dyn IntegerValue) -> Result<Vec<Trilean>> {
        if other.size() != self.size() {
            return Err(Error::SizeMismatch {
                expected: self.size(),
                actual: other.size(),
            });
        }
        let mut bits = vec![0u8; other.size()];
        let mut mask = vec![0u8; other.size()];
        other.get_bits(&mut bits)?;
        other.get_mask(&mut mask)?;
        Ok(unpack(&bits, &mask))
    }

    fn trits(&self) -> Vec<Trilean> {
        unpack(&self.bits, &self.mask)
    }

    fn store(&mut self, trits: &[Trilean]) {
        self.bits.fill(0);
        self.mask.fill(0);
        for (i, trit) in trits.iter().enumerate() {
            let bit = 1u8 << (i % 8);
            if trit.is_true() {
                self.bits[i / 8] |= bit;
            }
            if trit.is_known() {
                self.mask[i / 8] |= bit;
            }
        }
    }

    fn normalize(&mut self) {
        for (bit, known) in self.bits.iter_mut().zip(&self.mask) {
            *bit &= known;
        }
    }
}

fn unpack(bits: &[u8], mask: &[u8]) -> Vec<Trilean> {
    BitField::new(bits)
        .iter()
        .zip(BitField::new(mask).iter())
        .map(|(bit, known)| Trilean::from_bit(bit, known))
        .collect()
}

impl Value for IntegerNValue {
    fn size(&self) -> usize {
        self.bits.len()
    }

    fn is_known(&self) -> bool {
        BitField::new(&self.mask[..]).all()
    }

    fn get_bits(&self, buffer: &mut [u8]) -> Result<()> {
        check_size(self.size(), buffer)?;
        buffer.copy_from_slice(&self.bits);
        Ok(())
    }

    fn get_mask(&self, buffer: &mut [u8]) -> Result<()> {
        check_size(self.size(), buffer)?;
        buffer.copy_from_slice(&self.mask);
        Ok(())
    }

    fn set_bits(&mut self, bits: &[u8], mask: &[u8]) -> Result<()> {
        check_size(self.size(), bits)?;
        check_size(self.size(), mask)?;
        self.bits.copy_from_slice(bits);
        self.mask.copy_from_slice(mask);
        self.normalize();
        Ok(())
    }

    fn mark_fully_unknown(&mut self) {
        self.bits.fill(0);
        self.mask.fill(0);
    }

    fn is_zero(&self) -> Trilean {
        if BitField::new(&self.bits[..]).any() {
            Trilean::False
        } else if self.is_known() {
            Trilean::True
        } else {
            Trilean::Unknown
        }
    }

    fn sign(&self) -> Trilean {
        match self.bits.len() {
            0 => Trilean::False,
            n => self.trits()[n * 8 - 1],
        }
    }
}

impl IntegerValue for IntegerNValue {
    fn get_bit(&self, index: usize) -> Result<Trilean> {
        let bit = BitField::new(&self.bits[..]).get(index)?;
        let known = BitField::new(&self.mask[..]).get(index)?;
        Ok(Trilean::from_bit(bit, known))
    }

    fn add(&mut self, other: &dyn IntegerValue) -> Result<()> {
        let rhs = self.operand_trits(other)?;
        self.ripple(&rhs, false, Trilean::False);
        Ok(())
    }

    fn subtract(&mut self, other: &dyn IntegerValue) -> Result<()> {
        let rhs = self.operand_trits(other)?;
        self.ripple(&rhs, true, Trilean::True);
        Ok(())
    }

    fn left_shift(&mut self, count: usize) {
        let trits = self.trits();
        let shifted: Vec<Trilean> = (0..trits.len())
            .map(|i| {
                i.checked_sub(count)
                    .map_or(Trilean::False, |source| trits[source])
            })
            .collect();
        self.store(&shifted);
    }

    fn right_shift(&mut self, count: usize, sign_extend: bool) {
        let trits = self.trits();
        let fill = if sign_extend {
            trits.last().copied().unwrap_or(Trilean::False)
        } else {
            Trilean::False
        };
        let shifted: Vec<Trilean> = (0..trits.len())
            .map(|i| {
                i.checked_add(count)
                    .and_then(|source| trits.get(source).copied())
                    .unwrap_or(fill)
            })
            .collect();
        self.store(&shifted);
    }

    fn index_of_most_significant_nonzero_bit(&self) -> i32 {
        BitField::new(&self.bits[..])
            .highest_set()
            .map_or(-1, |i| i as i32)
    }

    fn as_i64(&self) -> Result<i64> {
        let raw = self.as_u64()?;
        let width = self.bits.len() * 8;
        if width == 0 || width >= 64 {
            return Ok(raw as i64);
        }
        let shift = 64 - width;
        Ok(((raw << shift) as i64) >> shift)
    }
}

impl fmt::Display for IntegerNValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0b")?;
        for trit in self.trits().into_iter().rev() {
            let c = match trit {
                Trilean::False => '0',
                Trilean::True => '1',
                Trilean::Unknown => '?',
            };
            write!(f, "{c}")?;
        }
        Ok(())
    }
}
