//! IEEE-754 binary64 values.

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

/// A (partially) known 64 bit floating point value.
///
/// The value carries an explicit knowledge mask: bit `i` of [`Float64Value::value`]'s raw
/// representation is known iff bit `i` of [`Float64Value::mask`] is set. Values created from
/// a native `f64` are fully known.
///
/// # Examples
///
/// ```rust
/// use emuscope::emulation::{Float64Value, FloatValue, Trilean};
///
/// let value = Float64Value::from(f64::NEG_INFINITY);
/// assert_eq!(value.is_infinity(), Trilean::True);
/// assert_eq!(value.is_negative_infinity(), Trilean::True);
/// assert_eq!(value.to_string(), "-∞");
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Float64Value {
    value: f64,
    mask: u64,
}

impl Float64Value {
    /// The mask of a fully known value.
    pub const FULLY_KNOWN_MASK: u64 = 0xFFFF_FFFF_FFFF_FFFF;

    /// Creates a fully known value.
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Self {
            value,
            mask: Self::FULLY_KNOWN_MASK,
        }
    }

    /// Creates a partially known value.
    #[must_use]
    pub const fn with_mask(value: f64, mask: u64) -> Self {
        Self { value, mask }
    }

    /// Creates a value from a raw bit pattern and mask.
    #[must_use]
    pub fn from_raw(bits: u64, mask: u64) -> Self {
        Self {
            value: f64::from_bits(bits),
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
    pub const fn value(&self) -> f64 {
        self.value
    }

    /// The knowledge mask.
    #[must_use]
    pub const fn mask(&self) -> u64 {
        self.mask
    }

    /// Replaces the value with a fully known native value.
    pub fn set_value(&mut self, value: f64) {
        self.value = value;
        self.mask = Self::FULLY_KNOWN_MASK;
    }

    /// Replaces the knowledge mask.
    pub fn set_mask(&mut self, mask: u64) {
        self.mask = mask;
    }

    // Unknown positions hold arbitrary content and take no part in comparisons.
    fn known_bits(&self) -> u64 {
        self.value.to_bits() & self.mask
    }
}

impl From<f64> for Float64Value {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl Default for Float64Value {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl PartialEq for Float64Value {
    fn eq(&self, other: &Self) -> bool {
        self.known_bits() == other.known_bits() && self.mask == other.mask
    }
}

impl Eq for Float64Value {}

impl Hash for Float64Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.known_bits().hash(state);
        self.mask.hash(state);
    }
}

impl Value for Float64Value {
    fn size(&self) -> usize {
        std::mem::size_of::<f64>()
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
        let mut raw = [0u8; 8];
        raw.copy_from_slice(bits);
        self.value = f64::from_bits(u64::from_le_bytes(raw));
        raw.copy_from_slice(mask);
        self.mask = u64::from_le_bytes(raw);
        Ok(())
    }

    fn mark_fully_unknown(&mut self) {
        self.value = 0.0;
        self.mask = 0;
    }

    fn is_zero(&self) -> Trilean {
        float::zero_state(FloatFormat::BINARY64, self.raw_bits(), self.raw_mask())
    }

    fn sign(&self) -> Trilean {
        float::sign_state(FloatFormat::BINARY64, self.raw_bits(), self.raw_mask())
    }
}

impl FloatValue for Float64Value {
    fn format(&self) -> FloatFormat {
        FloatFormat::BINARY64
    }

    fn raw_bits(&self) -> u64 {
        self.value.to_bits()
    }

    fn raw_mask(&self) -> u64 {
        self.mask
    }

    fn copy(&self) -> Box<dyn FloatValue> {
        Box::new(*self)
    }

    fn set_sign(&mut self, sign: Trilean) -> Result<()> {
        const SIGN: u64 = 1 << 63;
        let mut bits = self.value.to_bits();
        match sign {
            Trilean::True => bits |= SIGN,
            _ => bits &= !SIGN,
        }
        self.value = f64::from_bits(bits);
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
            self.value += f64::from_bits(other.raw_bits());
            self.mask = Self::FULLY_KNOWN_MASK;
            return Ok(());
        }
        float::add_bitwise(self, other)
    }
}

impl fmt::Display for Float64Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        float::fmt_float(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        emulation::value::{Float32Value, IntegerValue},
        Error,
    };

    #[test]
    fn test_format_parameters() {
        let value = Float64Value::new(1.0);
        assert_eq!(value.size(), 8);
        assert_eq!(value.exponent_size(), 11);
        assert_eq!(value.significand_size(), 52);
        assert_eq!(value.exponent_bias(), 1023);
    }

    #[test]
    fn test_persistent_bits() {
        let mut value = Float64Value::new(0.123);

        let mut bits = [0u8; 8];
        let mut mask = [0u8; 8];
        value.get_bits(&mut bits).unwrap();
        value.get_mask(&mut mask).unwrap();
        value.set_bits(&bits, &mask).unwrap();

        assert_eq!(value.value(), 0.123);
        assert!(value.is_known());
    }

    #[test]
    fn test_predicates() {
        assert_eq!(Float64Value::new(0.0).is_zero(), Trilean::True);
        assert_eq!(Float64Value::new(-0.0).is_zero(), Trilean::False);
        assert_eq!(Float64Value::new(-4.0).is_negative(), Trilean::True);
        assert_eq!(Float64Value::new(4.0).is_positive(), Trilean::True);
        assert_eq!(
            Float64Value::new(f64::INFINITY).is_positive_infinity(),
            Trilean::True
        );
        assert_eq!(Float64Value::new(f64::NAN).is_nan(), Trilean::True);
        assert_eq!(Float64Value::new(f64::MAX).is_infinity(), Trilean::False);

        let unknown = Float64Value::fully_unknown();
        assert_eq!(unknown.is_zero(), Trilean::Unknown);
        assert_eq!(unknown.sign(), Trilean::Unknown);
        // An unknown exponent bit rules NaN out.
        assert_eq!(unknown.is_nan(), Trilean::False);
        assert_eq!(unknown.is_infinity(), Trilean::Unknown);
    }

    #[test]
    fn test_exponent_and_significand() {
        let value = Float64Value::new(-12.0);
        assert_eq!(value.exponent().as_i64().unwrap(), 3);
        assert_eq!(value.significand().as_i64().unwrap(), 0x18_0000_0000_0000);

        let subnormal = Float64Value::from_raw(0x0000_0000_0000_0001, u64::MAX);
        assert_eq!(subnormal.exponent().as_i64().unwrap(), -1022);
        assert_eq!(subnormal.significand().as_i64().unwrap(), 1);
    }

    #[test]
    fn test_add_fully_known_values() {
        let mut value = Float64Value::new(1.5);
        value.add(&Float64Value::new(1.25)).unwrap();
        assert_eq!(value.value(), 2.75);

        let mut value = Float64Value::new(100.5);
        value.add(&Float64Value::new(1.25)).unwrap();
        assert_eq!(value.value(), 101.75);
    }

    #[test]
    fn test_add_fully_known_values_bit_precise() {
        let config = ArithmeticConfig::bit_precise();

        let mut value = Float64Value::new(1.5);
        value.add_with(&Float64Value::new(1.25), &config).unwrap();
        assert_eq!(value.value(), 2.75);
        assert!(value.is_known());

        let mut value = Float64Value::new(100.5);
        value.add_with(&Float64Value::new(1.25), &config).unwrap();
        assert_eq!(value.value(), 101.75);
        assert!(value.is_known());

        let mut value = Float64Value::new(-100.5);
        value.add_with(&Float64Value::new(1.25), &config).unwrap();
        assert_eq!(value.value(), -99.25);
    }

    #[test]
    fn test_add_underflow_to_subnormal() {
        let mut value = Float64Value::new(f64::MIN_POSITIVE);
        // -2^-1023, the largest power of two that is subnormal.
        let half = Float64Value::from_raw(0x8008_0000_0000_0000, u64::MAX);
        value
            .add_with(&half, &ArithmeticConfig::bit_precise())
            .unwrap();

        assert_eq!(value.value(), f64::MIN_POSITIVE / 2.0);
        assert_eq!(value.value().to_bits(), 0x0008_0000_0000_0000);
    }

    #[test]
    fn test_plus() {
        let a = Float64Value::new(0.5);
        let sum = a.plus(&Float64Value::new(0.25)).unwrap();
        assert_eq!(sum.value(), 0.75);
        assert_eq!(a.value(), 0.5);
    }

    #[test]
    fn test_add_unknown_sign() {
        let mut value = Float64Value::new(1.0);
        value
            .add(&Float64Value::with_mask(1.0, 0x7FFF_FFFF_FFFF_FFFF))
            .unwrap();
        assert_eq!(value.mask(), 0);
        assert_eq!(value.is_zero(), Trilean::Unknown);
    }

    #[test]
    fn test_add_format_mismatch() {
        let mut value = Float64Value::new(1.0);
        assert_eq!(
            value.add(&Float32Value::new(1.0)),
            Err(Error::SizeMismatch {
                expected: 8,
                actual: 4
            })
        );
    }

    #[test]
    fn test_eq_ignores_unknown_bits() {
        let a = Float64Value::from_raw(0x4000_0000_0000_0003, !0xF);
        let b = Float64Value::from_raw(0x4000_0000_0000_000C, !0xF);
        assert_eq!(a, b);
        assert_ne!(a, Float64Value::new(2.0));
    }

    #[test]
    fn test_display() {
        assert_eq!(
            Float64Value::new(1.5).to_string(),
            format!("+1.1{}×2^0", "0".repeat(51))
        );
        assert_eq!(
            Float64Value::new(-8.0).to_string(),
            format!("-1.{}×2^3", "0".repeat(52))
        );
        assert_eq!(Float64Value::new(f64::INFINITY).to_string(), "+∞");
    }
}
