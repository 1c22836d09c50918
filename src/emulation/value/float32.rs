//! IEEE-754 binary32 values.

use std::{
    fmt,
    hash::{Hash, Hasher},
};

use crate::{
    emulation::{
        config::ArithmeticConfig,
        value::{
            check_size,
            float::{self, FloatFormat, FloatValue},
            Trilean, Value,
        },
    },
    Result,
};

/// A (partially) known 32 bit floating point value.
///
/// The value carries an explicit knowledge mask: bit `i` of [`Float32Value::value`]'s raw
/// representation is known iff bit `i` of [`Float32Value::mask`] is set. Values created from
/// a native `f32` are fully known.
///
/// # Examples
///
/// ```rust
/// use emuscope::emulation::{Float32Value, FloatValue, Trilean};
///
/// let value = Float32Value::from(f32::NEG_INFINITY);
/// assert_eq!(value.is_infinity(), Trilean::True);
/// assert_eq!(value.is_negative_infinity(), Trilean::True);
/// assert_eq!(value.to_string(), "-∞");
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Float32Value {
    value: f32,
    mask: u32,
}

impl Float32Value {
    /// The mask of a fully known value.
    pub const FULLY_KNOWN_MASK: u32 = 0xFFFF_FFFF;

    /// Creates a fully known value.
    #[must_use]
    pub const fn new(value: f32) -> Self {
        Self {
            value,
            mask: Self::FULLY_KNOWN_MASK,
        }
    }

    /// Creates a partially known value.
    #[must_use]
    pub const fn with_mask(value: f32, mask: u32) -> Self {
        Self { value, mask }
    }

    /// Creates a value from a raw bit pattern and mask.
    #[must_use]
    pub fn from_raw(bits: u32, mask: u32) -> Self {
        Self {
            value: f32::from_bits(bits),
            mask,
        }
    }

    /// Creates a value where no bit is known.
    #[must_use]
    pub fn fully_unknown() -> Self {
        Self::from_raw(0, 0)
    }

    /// The stored native value. Unknown bits hold arbitrary content.
    #[must_use]
    pub const fn value(&self) -> f32 {
        self.value
    }

    /// The knowledge mask.
    #[must_use]
    pub const fn mask(&self) -> u32 {
        self.mask
    }

    /// Replaces the value with a fully known native value.
    pub fn set_value(&mut self, value: f32) {
        self.value = value;
        self.mask = Self::FULLY_KNOWN_MASK;
    }

    /// Replaces the knowledge mask.
    pub fn set_mask(&mut self, mask: u32) {
        self.mask = mask;
    }

    // Unknown positions hold arbitrary content and take no part in comparisons.
    fn known_bits(&self) -> u32 {
        self.value.to_bits() & self.mask
    }
}

impl From<f32> for Float32Value {
    fn from(value: f32) -> Self {
        Self::new(value)
    }
}

impl Default for Float32Value {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl PartialEq for Float32Value {
    fn eq(&self, other: &Self) -> bool {
        self.known_bits() == other.known_bits() && self.mask == other.mask
    }
}

impl Eq for Float32Value {}

impl Hash for Float32Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.known_bits().hash(state);
        self.mask.hash(state);
    }
}

impl Value for Float32Value {
    fn size(&self) -> usize {
        std::mem::size_of::<f32>()
    }

    fn is_known(&self) -> bool {
        self.mask == Self::FULLY_KNOWN_MASK
    }

    fn get_bits(&self, buffer: &mut [u8]) -> Result<()> {
        check_size(self.size(), buffer)?;
        buffer.copy_from_slice(&self.value.to_bits().to_le_bytes());
        Ok(())
    }

    fn get_mask(&self, buffer: &mut [u8]) -> Result<()> {
        check_size(self.size(), buffer)?;
        buffer.copy_from_slice(&self.mask.to_le_bytes());
        Ok(())
    }

    fn set_bits(&mut self, bits: &[u8], mask: &[u8]) -> Result<()> {
        check_size(self.size(), bits)?;
        check_size(self.size(), mask)?;
        let mut raw = [0u8; 4];
        raw.copy_from_slice(bits);
        self.value = f32::from_bits(u32::from_le_bytes(raw));
        raw.copy_from_slice(mask);
        self.mask = u32::from_le_bytes(raw);
        Ok(())
    }

    fn mark_fully_unknown(&mut self) {
        self.value = 0.0;
        self.mask = 0;
    }

    fn is_zero(&self) -> Trilean {
        float::zero_state(FloatFormat::BINARY32, self.raw_bits(), self.raw_mask())
    }

    fn sign(&self) -> Trilean {
        float::sign_state(FloatFormat::BINARY32, self.raw_bits(), self.raw_mask())
    }
}

impl FloatValue for Float32Value {
    fn format(&self) -> FloatFormat {
        FloatFormat::BINARY32
    }

    fn raw_bits(&self) -> u64 {
        u64::from(self.value.to_bits())
    }

    fn raw_mask(&self) -> u64 {
        u64::from(self.mask)
    }

    fn copy(&self) -> Box<dyn FloatValue> {
        Box::new(*self)
    }

    fn set_sign(&mut self, sign: Trilean) -> Result<()> {
        const SIGN: u32 = 1 << 31;
        let mut bits = self.value.to_bits();
        match sign {
            Trilean::True => bits |= SIGN,
            _ => bits &= !SIGN,
        }
        self.value = f32::from_bits(bits);
        if sign.is_known() {
            self.mask |= SIGN;
        } else {
            self.mask &= !SIGN;
        }
        Ok(())
    }

    fn add_with(&mut self, other: &dyn FloatValue, config: &ArithmeticConfig) -> Result<()> {
        float::check_operand(self.format(), other)?;
        if config.native_fast_path && self.is_known() && other.is_known() {
            // Same format checked above, so the low 32 bits hold the whole value.
            self.value += f32::from_bits(other.raw_bits() as u32);
            self.mask = Self::FULLY_KNOWN_MASK;
            return Ok(());
        }
        float::add_bitwise(self, other)
    }
}

impl fmt::Display for Float32Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        float::fmt_float(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{emulation::value::IntegerValue, Error};

    #[test]
    fn test_is_zero() {
        let value = Float32Value::new(0.0);
        assert_eq!(value.is_zero(), Trilean::True);
        assert_eq!(value.is_non_zero(), Trilean::False);

        // The sign bit of -0.0 is set.
        let negative = Float32Value::new(-0.0);
        assert_eq!(negative.is_zero(), Trilean::False);
        assert_eq!(negative.is_negative(), Trilean::True);

        let partial = Float32Value::with_mask(0.0, 0xFFFF_FFFE);
        assert_eq!(partial.is_zero(), Trilean::Unknown);

        let unknown_sign = Float32Value::with_mask(0.0, 0x7FFF_FFFF);
        assert_eq!(unknown_sign.is_zero(), Trilean::Unknown);

        assert_eq!(Float32Value::new(1.0).is_zero(), Trilean::False);
    }

    #[test]
    fn test_is_positive_infinity() {
        let value = Float32Value::new(f32::INFINITY);
        assert_eq!(value.is_infinity(), Trilean::True);
        assert_eq!(value.is_positive_infinity(), Trilean::True);
        assert_eq!(value.is_negative_infinity(), Trilean::False);
        assert_eq!(value.is_nan(), Trilean::False);
    }

    #[test]
    fn test_is_negative_infinity() {
        let value = Float32Value::new(f32::NEG_INFINITY);
        assert_eq!(value.is_infinity(), Trilean::True);
        assert_eq!(value.is_positive_infinity(), Trilean::False);
        assert_eq!(value.is_negative_infinity(), Trilean::True);
    }

    #[test]
    fn test_is_nan() {
        let value = Float32Value::new(f32::NAN);
        assert_eq!(value.is_nan(), Trilean::True);
        assert_eq!(value.is_infinity(), Trilean::False);

        assert_eq!(Float32Value::new(1.0).is_nan(), Trilean::False);
    }

    #[test]
    fn test_partial_nan_and_infinity() {
        // Exponent all ones, significand completely unknown.
        let value = Float32Value::from_raw(0x7F80_0000, 0xFF80_0000);
        assert_eq!(value.is_nan(), Trilean::Unknown);
        assert_eq!(value.is_infinity(), Trilean::Unknown);
        assert_eq!(value.is_positive_infinity(), Trilean::Unknown);
        assert_eq!(value.is_negative_infinity(), Trilean::False);

        // One exponent bit unknown: can not be NaN by definition, might be infinity.
        let value = Float32Value::from_raw(0x7F80_0000, 0xFF7F_FFFF);
        assert_eq!(value.is_nan(), Trilean::False);
        assert_eq!(value.is_infinity(), Trilean::Unknown);

        // A known set significand bit rules infinity out.
        let value = Float32Value::from_raw(0x7F80_0001, 0xFF00_0001);
        assert_eq!(value.is_infinity(), Trilean::False);
    }

    #[test]
    fn test_persistent_bits() {
        let mut value = Float32Value::new(0.123);

        let mut bits = [0u8; 4];
        let mut mask = [0u8; 4];
        value.get_bits(&mut bits).unwrap();
        value.get_mask(&mut mask).unwrap();
        value.set_bits(&bits, &mask).unwrap();

        assert_eq!(value.value(), 0.123);
        assert!(value.is_known());
    }

    #[test]
    fn test_buffer_size_mismatch() {
        let mut value = Float32Value::new(1.0);
        let mut small = [0u8; 2];
        assert_eq!(
            value.get_bits(&mut small),
            Err(Error::SizeMismatch {
                expected: 4,
                actual: 2
            })
        );
        assert!(value.set_bits(&[0; 8], &[0; 8]).is_err());
        assert_eq!(value.value(), 1.0);
    }

    #[test]
    fn test_exponent_and_significand() {
        let value = Float32Value::new(6.0);
        assert_eq!(value.exponent().as_i64().unwrap(), 2);
        assert_eq!(value.significand().as_i64().unwrap(), 0xC0_0000);

        let value = Float32Value::new(0.25);
        assert_eq!(value.exponent().as_i64().unwrap(), -2);

        let zero = Float32Value::new(0.0);
        assert_eq!(zero.exponent().as_i64().unwrap(), 0);
        assert_eq!(zero.significand().is_zero(), Trilean::True);
    }

    #[test]
    fn test_subnormal_fields() {
        let value = Float32Value::from_raw(0x0000_0001, 0xFFFF_FFFF);
        assert_eq!(value.exponent().as_i64().unwrap(), -126);
        assert_eq!(value.significand().as_i64().unwrap(), 1);
    }

    #[test]
    fn test_partial_fields() {
        // Lowest exponent bit unknown.
        let value = Float32Value::with_mask(1.0, 0xFF7F_FFFF);
        assert!(!value.exponent().is_known());
        assert_eq!(value.significand().get_bit(23).unwrap(), Trilean::True);

        // Exponent known all zero: zero or subnormal, the implicit bit is 0 either way.
        let value = Float32Value::with_mask(0.0, 0xFFFF_FFFE);
        assert_eq!(value.significand().get_bit(23).unwrap(), Trilean::False);

        // Zero-ness unknown with an unknown exponent bit leaves the implicit bit unknown.
        let value = Float32Value::with_mask(0.0, 0xFF7F_FFFF);
        assert_eq!(value.significand().get_bit(23).unwrap(), Trilean::Unknown);
        assert_eq!(value.significand().get_bit(24).unwrap(), Trilean::False);
    }

    #[test]
    fn test_add_fully_known() {
        let mut value = Float32Value::new(1.5);
        value.add(&Float32Value::new(1.25)).unwrap();
        assert_eq!(value.value(), 2.75);
        assert!(value.is_known());
    }

    #[test]
    fn test_add_bit_precise_matches_native() {
        let cases = [
            (1.5f32, 1.25f32),
            (2.75, -1.25),
            (1.25, -2.75),
            (-1.5, 1.25),
            (-3.0, -0.5),
            (1024.0, 0.125),
            (0.0, 7.5),
            (7.5, 0.0),
        ];
        for (a, b) in cases {
            let mut value = Float32Value::new(a);
            value
                .add_with(&Float32Value::new(b), &ArithmeticConfig::bit_precise())
                .unwrap();
            assert_eq!(value.value(), a + b, "{a} + {b}");
            assert!(value.is_known(), "{a} + {b}");
        }
    }

    #[test]
    fn test_add_cancellation_is_positive_zero() {
        let mut value = Float32Value::new(-2.5);
        value
            .add_with(&Float32Value::new(2.5), &ArithmeticConfig::bit_precise())
            .unwrap();
        assert_eq!(value.value().to_bits(), 0);

        let mut value = Float32Value::new(-0.0);
        value
            .add_with(&Float32Value::new(0.0), &ArithmeticConfig::bit_precise())
            .unwrap();
        assert_eq!(value.value().to_bits(), 0);
    }

    #[test]
    fn test_add_overflow_to_infinity() {
        let mut value = Float32Value::new(f32::MAX);
        value
            .add_with(&Float32Value::new(f32::MAX), &ArithmeticConfig::bit_precise())
            .unwrap();
        assert_eq!(value.is_positive_infinity(), Trilean::True);
    }

    #[test]
    fn test_add_unknown_sign() {
        let mut value = Float32Value::with_mask(1.5, 0x7FFF_FFFF);
        value.add(&Float32Value::new(2.0)).unwrap();
        assert!(!value.is_known());
        assert_eq!(value.mask(), 0);
        assert_eq!(value.value().to_bits(), 0);
    }

    #[test]
    fn test_add_unknown_exponent() {
        let mut value = Float32Value::new(1.5);
        value.add(&Float32Value::with_mask(2.0, 0xFF7F_FFFF)).unwrap();
        assert_eq!(value.mask(), 0);
    }

    #[test]
    fn test_add_special_operand() {
        let mut value = Float32Value::new(1.0);
        value
            .add_with(&Float32Value::new(f32::INFINITY), &ArithmeticConfig::bit_precise())
            .unwrap();
        assert_eq!(value.mask(), 0);
    }

    #[test]
    fn test_add_partial_significand() {
        // 1.5 with the lowest significand bit unknown, plus 1.0.
        let mut value = Float32Value::with_mask(1.5, 0xFFFF_FFFE);
        value.add(&Float32Value::new(1.0)).unwrap();

        assert_eq!(value.sign(), Trilean::False);
        assert_eq!(value.mask() & 0xFF80_0000, 0xFF80_0000);
        // 2.5 = 1.01b x 2^1; the unknown bit was shifted out by renormalization.
        assert_eq!(value.value(), 2.5);
        assert_eq!(value.mask(), 0xFFFF_FFFF);
    }

    #[test]
    fn test_add_partial_significand_kept() {
        // Bit 1 unknown survives an addition without renormalization shift.
        let mut value = Float32Value::with_mask(1.0, 0xFFFF_FFFD);
        value.add(&Float32Value::new(0.5)).unwrap();
        assert_eq!(value.exponent().as_i64().unwrap(), 0);
        assert_eq!(value.mask(), 0xFFFF_FFFD);
        assert_eq!(value.value(), 1.5);
    }

    #[test]
    fn test_add_format_mismatch() {
        let mut value = Float32Value::new(1.0);
        let other = crate::emulation::value::Float64Value::new(1.0);
        assert_eq!(
            value.add(&other),
            Err(Error::SizeMismatch {
                expected: 4,
                actual: 8
            })
        );
        assert_eq!(value.value(), 1.0);
    }

    #[test]
    fn test_mark_fully_unknown_idempotent() {
        let mut once = Float32Value::new(3.0);
        once.mark_fully_unknown();
        let mut twice = once;
        twice.mark_fully_unknown();

        assert_eq!(once, twice);
        assert_eq!(twice.mask(), 0);
        assert_eq!(twice.value().to_bits(), 0);
        assert_eq!(twice.is_zero(), Trilean::Unknown);
    }

    #[test]
    fn test_set_sign() {
        let mut value = Float32Value::new(2.0);
        value.set_sign(Trilean::True).unwrap();
        assert_eq!(value.value(), -2.0);

        value.set_sign(Trilean::Unknown).unwrap();
        assert_eq!(value.sign(), Trilean::Unknown);
        assert_eq!(value.mask(), 0x7FFF_FFFF);
    }

    #[test]
    fn test_eq_ignores_unknown_bits() {
        let a = Float32Value::from_raw(0x3F80_0001, 0xFFFF_FF00);
        let b = Float32Value::from_raw(0x3F80_00FE, 0xFFFF_FF00);
        assert_eq!(a, b);

        let mut set = std::collections::HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));

        assert_ne!(a, Float32Value::from_raw(0x3F80_0001, 0xFFFF_FFFF));
    }

    #[test]
    fn test_copy_is_independent() {
        let mut value = Float32Value::with_mask(1.0, 0xFFFF_FF00);
        let copy = value.copy();
        value.mark_fully_unknown();

        assert_eq!(copy.raw_mask(), 0xFFFF_FF00);
        assert_eq!(copy.raw_bits(), u64::from(1.0f32.to_bits()));
    }

    #[test]
    fn test_display() {
        assert_eq!(
            Float32Value::new(1.5).to_string(),
            "+1.10000000000000000000000×2^0"
        );
        assert_eq!(
            Float32Value::new(-0.75).to_string(),
            "-1.10000000000000000000000×2^-1"
        );
        assert_eq!(
            Float32Value::with_mask(1.0, 0x7FFF_FFFC).to_string(),
            "±1.000000000000000000000??×2^0"
        );
        assert_eq!(
            Float32Value::with_mask(1.0, 0xFF7F_FFFF).to_string(),
            "+1.00000000000000000000000×2^?"
        );
        assert_eq!(Float32Value::new(f32::NAN).to_string(), "NaN");
    }
}
