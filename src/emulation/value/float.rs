//! IEEE-754 floating point values with bit-level uncertainty.
//!
//! [`FloatValue`] is the shared contract of the concrete formats. A format only supplies its
//! raw bits and mask plus its field widths (a [`FloatFormat`]); every predicate, the field
//! extraction and the bit-level addition are implemented once here against that surface.
//!
//! # Field Layout
//!
//! With bit 0 being the least significant bit:
//!
//! | Field       | Bits                                   |
//! |-------------|----------------------------------------|
//! | significand | `[0, S)`                               |
//! | exponent    | `[S, S + E)`                           |
//! | sign        | `S + E`                                |
//!
//! where `S` is the significand size and `E` the exponent size. The exponent is stored with
//! a bias of `2^(E-1) - 1`.
//!
//! # Addition
//!
//! The bit-level addition aligns both significands to the larger exponent, adds or subtracts
//! the magnitudes depending on the operand signs, renormalizes and writes the fields back.
//! Bits shifted out during alignment or renormalization are dropped (no guard, round or
//! sticky bits), so the result is truncated rather than rounded. Whenever the result can not
//! be determined bit-exactly (unknown sign, unknown exponent, a possible NaN or infinity
//! operand, ...) the receiver is marked fully unknown instead.

use std::fmt;

use crate::{
    emulation::{
        config::ArithmeticConfig,
        value::{IntegerNValue, IntegerValue, Trilean, Value},
    },
    Error, Result,
};

/// Field widths of a binary floating point format.
///
/// Formats are limited to 64 bits in total.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FloatFormat {
    /// Number of bits in the exponent field.
    pub exponent_size: u32,
    /// Number of bits in the stored significand field (excluding the implicit bit).
    pub significand_size: u32,
}

impl FloatFormat {
    /// IEEE-754 binary32 (`float`).
    pub const BINARY32: FloatFormat = FloatFormat {
        exponent_size: 8,
        significand_size: 23,
    };

    /// IEEE-754 binary64 (`double`).
    pub const BINARY64: FloatFormat = FloatFormat {
        exponent_size: 11,
        significand_size: 52,
    };

    /// Size of a value of this format in bytes.
    #[must_use]
    pub const fn size(self) -> usize {
        (1 + self.exponent_size as usize + self.significand_size as usize).div_ceil(8)
    }

    /// The exponent bias, `2^(E-1) - 1`.
    #[must_use]
    pub const fn exponent_bias(self) -> i64 {
        (1i64 << (self.exponent_size - 1)) - 1
    }

    /// Index of the sign bit.
    #[must_use]
    pub const fn sign_index(self) -> u32 {
        self.exponent_size + self.significand_size
    }

    /// Mask selecting the sign bit.
    #[must_use]
    pub const fn sign_field_mask(self) -> u64 {
        1u64 << self.sign_index()
    }

    /// Mask selecting the exponent field.
    #[must_use]
    pub const fn exponent_field_mask(self) -> u64 {
        self.max_biased_exponent() << self.significand_size
    }

    /// Mask selecting the stored significand field.
    #[must_use]
    pub const fn significand_field_mask(self) -> u64 {
        (1u64 << self.significand_size) - 1
    }

    /// The all-ones biased exponent reserved for infinities and NaNs.
    #[must_use]
    pub const fn max_biased_exponent(self) -> u64 {
        (1u64 << self.exponent_size) - 1
    }

    /// Byte width of the integers produced by [`FloatValue::exponent`].
    ///
    /// Two bits wider than the field, so unbiased exponents keep their sign and re-biasing
    /// can not wrap.
    #[must_use]
    pub const fn exponent_value_size(self) -> usize {
        (self.exponent_size as usize + 2).div_ceil(8)
    }

    /// Byte width of the integers produced by [`FloatValue::significand`].
    ///
    /// Leaves room for the implicit bit, a carry and a sign.
    #[must_use]
    pub const fn significand_value_size(self) -> usize {
        (self.significand_size as usize + 3).div_ceil(8)
    }
}

/// A floating point value that might contain unknown bits.
///
/// Implementors supply the raw bits and mask (through [`Value`] and the `raw_*` accessors)
/// and their [`FloatFormat`]. All predicates are derived from the current bits and mask on
/// every call, so they stay consistent across mutation.
pub trait FloatValue: Value {
    /// The field widths of this value's format.
    fn format(&self) -> FloatFormat;

    /// The raw bit pattern, zero-extended to 64 bits.
    fn raw_bits(&self) -> u64;

    /// The knowledge mask, zero-extended to 64 bits.
    fn raw_mask(&self) -> u64;

    /// Creates an independent value with identical observable state.
    fn copy(&self) -> Box<dyn FloatValue>;

    /// Number of bits that make up the exponent.
    fn exponent_size(&self) -> u32 {
        self.format().exponent_size
    }

    /// Number of bits that make up the stored significand.
    fn significand_size(&self) -> u32 {
        self.format().significand_size
    }

    /// The bias subtracted from the stored exponent field.
    fn exponent_bias(&self) -> i64 {
        self.format().exponent_bias()
    }

    /// Sets the sign bit.
    ///
    /// # Errors
    ///
    /// The generic model can not mutate the sign independently of the shared bit buffer and
    /// returns [`Error::NotSupported`]; concrete formats override this.
    fn set_sign(&mut self, _sign: Trilean) -> Result<()> {
        Err(Error::NotSupported(
            "the sign is not independently settable on this value",
        ))
    }

    /// Determines whether the value is a NaN.
    ///
    /// The exponent must be known to be all ones. A known set significand bit then makes the
    /// value a NaN; unknown significand bits without a known set one leave it undetermined.
    fn is_nan(&self) -> Trilean {
        let format = self.format();
        let (bits, mask) = (self.raw_bits(), self.raw_mask());
        let exponent = format.exponent_field_mask();
        let significand = format.significand_field_mask();

        if mask & exponent != exponent || bits & exponent != exponent {
            return Trilean::False;
        }
        if bits & mask & significand != 0 {
            Trilean::True
        } else if mask & significand != significand {
            Trilean::Unknown
        } else {
            Trilean::False
        }
    }

    /// Determines whether the value is positive or negative infinity.
    fn is_infinity(&self) -> Trilean {
        let format = self.format();
        let (bits, mask) = (self.raw_bits(), self.raw_mask());
        let exponent = format.exponent_field_mask();
        let significand = format.significand_field_mask();

        let exponent_has_zero = mask & !bits & exponent != 0;
        let significand_has_one = bits & mask & significand != 0;
        if exponent_has_zero || significand_has_one {
            return Trilean::False;
        }

        let fields = exponent | significand;
        if mask & fields == fields {
            Trilean::True
        } else {
            Trilean::Unknown
        }
    }

    /// Determines whether the value is positive infinity.
    fn is_positive_infinity(&self) -> Trilean {
        self.is_infinity() & !self.sign()
    }

    /// Determines whether the value is negative infinity.
    fn is_negative_infinity(&self) -> Trilean {
        self.is_infinity() & self.sign()
    }

    /// Extracts the unbiased exponent.
    ///
    /// Exponent bits that are unknown remain unknown in the result. A known zero yields a
    /// known `0`, a subnormal (exponent field known to be all zeroes) yields `1 - bias`.
    fn exponent(&self) -> IntegerNValue {
        let format = self.format();
        let size = format.exponent_value_size();
        if magnitude_zero(self) == Trilean::True {
            return IntegerNValue::zero(size);
        }

        let shift = format.significand_size;
        let field = format.max_biased_exponent();
        let bits = (self.raw_bits() >> shift) & field;
        let mask = (self.raw_mask() >> shift) & field;

        if mask == field && bits == 0 {
            return IntegerNValue::from_i64(1 - format.exponent_bias(), size);
        }

        let mut exponent = IntegerNValue::from_parts(bits, mask | !field, size);
        exponent.add_i64(-format.exponent_bias());
        exponent
    }

    /// Extracts the significand including its implicit leading bit.
    ///
    /// The implicit bit is a known `1` when the value is known to be non-zero, a known `0`
    /// for subnormals and unknown when zero-ness is unknown. Bits above it are known zeroes.
    fn significand(&self) -> IntegerNValue {
        let format = self.format();
        let size = format.significand_value_size();
        let is_zero = magnitude_zero(self);
        if is_zero == Trilean::True {
            return IntegerNValue::zero(size);
        }

        let field = format.significand_field_mask();
        let implicit = 1u64 << format.significand_size;
        let mut bits = self.raw_bits() & field;
        let mut mask = (self.raw_mask() & field) | !field;

        let exponent = format.exponent_field_mask();
        let subnormal = self.raw_mask() & exponent == exponent && self.raw_bits() & exponent == 0;
        if !subnormal {
            match is_zero {
                Trilean::False => bits |= implicit,
                _ => mask &= !implicit,
            }
        }

        IntegerNValue::from_parts(bits, mask, size)
    }

    /// Adds `other` to this value (in place), using the default [`ArithmeticConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::SizeMismatch`] if `other` has a different size, or
    /// [`Error::NotSupported`] if it has the same size but a different format.
    fn add(&mut self, other: &dyn FloatValue) -> Result<()> {
        self.add_with(other, &ArithmeticConfig::default())
    }

    /// Adds `other` to this value (in place).
    ///
    /// The generic implementation always runs the bit-level algorithm; concrete formats
    /// override it to use native arithmetic for fully known operands when
    /// [`ArithmeticConfig::native_fast_path`] is set.
    ///
    /// # Errors
    ///
    /// Same as [`FloatValue::add`].
    fn add_with(&mut self, other: &dyn FloatValue, _config: &ArithmeticConfig) -> Result<()> {
        add_bitwise(self, other)
    }

    /// Returns the sum of this value and `other` as a new value.
    ///
    /// # Errors
    ///
    /// Same as [`FloatValue::add`].
    fn plus(&self, other: &dyn FloatValue) -> Result<Self>
    where
        Self: Sized + Clone,
    {
        let mut result = self.clone();
        result.add(other)?;
        Ok(result)
    }
}

/// Determines whether the stored bit pattern is all zeroes, sign included.
///
/// Only `+0.0` is zero here; `-0.0` has a set bit. Arithmetic treats both zeroes alike
/// through `magnitude_zero`.
pub(crate) fn zero_state(format: FloatFormat, bits: u64, mask: u64) -> Trilean {
    let fields =
        format.sign_field_mask() | format.exponent_field_mask() | format.significand_field_mask();
    pattern_zero(bits, mask, fields)
}

/// Zero-ness of the magnitude, ignoring the sign.
fn magnitude_zero<F: FloatValue + ?Sized>(value: &F) -> Trilean {
    let format = value.format();
    let fields = format.exponent_field_mask() | format.significand_field_mask();
    pattern_zero(value.raw_bits(), value.raw_mask(), fields)
}

fn pattern_zero(bits: u64, mask: u64, fields: u64) -> Trilean {
    if bits & mask & fields != 0 {
        Trilean::False
    } else if mask & fields == fields {
        Trilean::True
    } else {
        Trilean::Unknown
    }
}

/// Reads the sign bit.
pub(crate) fn sign_state(format: FloatFormat, bits: u64, mask: u64) -> Trilean {
    let sign = format.sign_field_mask();
    Trilean::from_bit(bits & sign != 0, mask & sign != 0)
}

/// Checks that `other` can be combined with a value of `format`.
pub(crate) fn check_operand(format: FloatFormat, other: &dyn FloatValue) -> Result<()> {
    if other.size() != format.size() {
        return Err(Error::SizeMismatch {
            expected: format.size(),
            actual: other.size(),
        });
    }
    if other.format() != format {
        return Err(Error::NotSupported(
            "operands use different floating point formats",
        ));
    }
    Ok(())
}

/// The bit-level addition shared by all formats.
pub(crate) fn add_bitwise<F: FloatValue + ?Sized>(this: &mut F, other: &dyn FloatValue) -> Result<()> {
    let format = this.format();
    check_operand(format, other)?;

    let (Some(self_negative), Some(other_negative)) =
        (this.sign().to_bool(), other.sign().to_bool())
    else {
        collapse(this, "unknown sign");
        return Ok(());
    };

    let self_exponent = this.exponent();
    let other_exponent = other.exponent();
    if !self_exponent.is_known() || !other_exponent.is_known() {
        collapse(this, "unknown exponent");
        return Ok(());
    }

    if is_special(&*this) || is_special(other) {
        collapse(this, "NaN or infinity operand");
        return Ok(());
    }

    // A zero of the opposite sign turns a zero into +0 and leaves anything else alone, so the
    // sign is only known when the zero-ness of the other side is.
    let self_zero = magnitude_zero(&*this);
    let other_zero = magnitude_zero(other);
    if other_zero == Trilean::True {
        if self_negative != other_negative {
            match self_zero {
                Trilean::True => return write_fields(this, format, false, 0, 0, 0),
                Trilean::Unknown => return forget_sign(this, format),
                Trilean::False => {}
            }
        }
        return Ok(());
    }
    if self_zero == Trilean::True {
        let size = format.size();
        let bits = other.raw_bits().to_le_bytes();
        let mask = other.raw_mask().to_le_bytes();
        this.set_bits(&bits[..size], &mask[..size])?;
        if self_negative != other_negative && other_zero == Trilean::Unknown {
            return forget_sign(this, format);
        }
        return Ok(());
    }

    let mut self_significand = this.significand();
    let mut other_significand = other.significand();

    let delta = self_exponent.as_i64()? - other_exponent.as_i64()?;
    let distance = usize::try_from(delta.unsigned_abs()).unwrap_or(usize::MAX);
    let mut exponent = if delta >= 0 {
        other_significand.right_shift(distance, false);
        self_exponent
    } else {
        self_significand.right_shift(distance, false);
        other_exponent
    };

    let mut negative = self_negative;
    if self_negative == other_negative {
        self_significand.add(&other_significand)?;
    } else {
        let mut difference = self_significand.clone();
        difference.subtract(&other_significand)?;
        match difference.sign() {
            Trilean::False => self_significand = difference,
            Trilean::True => {
                other_significand.subtract(&self_significand)?;
                self_significand = other_significand;
                negative = other_negative;
            }
            Trilean::Unknown => {
                collapse(this, "undetermined sign of the difference");
                return Ok(());
            }
        }
    }
    let mut significand = self_significand;

    match significand.is_zero() {
        Trilean::True => return write_fields(this, format, false, 0, 0, 0),
        Trilean::Unknown if significand.index_of_most_significant_nonzero_bit() < 0 => {
            collapse(this, "undetermined cancellation");
            return Ok(());
        }
        _ => {}
    }

    let msb = significand.index_of_most_significant_nonzero_bit();
    if significand.index_of_most_significant_unknown_bit() > msb {
        collapse(this, "unknown normalization distance");
        return Ok(());
    }

    let shift = i64::from(msb) - i64::from(format.significand_size);
    match shift {
        s if s > 0 => significand.right_shift(s.unsigned_abs() as usize, false),
        s if s < 0 => significand.left_shift(s.unsigned_abs() as usize),
        _ => {}
    }
    exponent.add_i64(shift);
    exponent.add_i64(format.exponent_bias());

    let biased = exponent.as_i64()?;
    let max_biased = format.max_biased_exponent() as i64;
    if biased >= max_biased {
        return write_fields(this, format, negative, format.max_biased_exponent(), 0, u64::MAX);
    }

    let biased = if biased <= 0 {
        significand.right_shift((1 - biased) as usize, false);
        0
    } else {
        biased as u64
    };

    let (bits, mask) = significand.low_parts();
    write_fields(this, format, negative, biased, bits, mask)
}

fn is_special<F: FloatValue + ?Sized>(value: &F) -> bool {
    value.is_nan() != Trilean::False || value.is_infinity() != Trilean::False
}

fn collapse<F: FloatValue + ?Sized>(value: &mut F, reason: &str) {
    log::trace!("float addition: {reason}, marking the receiver fully unknown");
    value.mark_fully_unknown();
}

/// Clears the knowledge of the sign bit, keeping every other bit.
fn forget_sign<F: FloatValue + ?Sized>(value: &mut F, format: FloatFormat) -> Result<()> {
    let size = format.size();
    let bits = value.raw_bits().to_le_bytes();
    let mask = (value.raw_mask() & !format.sign_field_mask()).to_le_bytes();
    value.set_bits(&bits[..size], &mask[..size])
}

/// Assembles sign, biased exponent and significand and persists them through `set_bits`.
///
/// Sign and exponent are always known, the significand knowledge is taken from `mask`.
fn write_fields<F: FloatValue + ?Sized>(
    value: &mut F,
    format: FloatFormat,
    negative: bool,
    biased_exponent: u64,
    significand: u64,
    significand_mask: u64,
) -> Result<()> {
    let field = format.significand_field_mask();
    let mut bits = (biased_exponent << format.significand_size) & format.exponent_field_mask();
    bits |= significand & significand_mask & field;
    if negative {
        bits |= format.sign_field_mask();
    }
    let mask = format.sign_field_mask() | format.exponent_field_mask() | (significand_mask & field);

    let size = format.size();
    value.set_bits(&bits.to_le_bytes()[..size], &mask.to_le_bytes()[..size])
}

/// Renders `±significand×2^exponent` with `?` for unknown significand bits.
pub(crate) fn fmt_float<F: FloatValue + ?Sized>(value: &F, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let sign = match value.sign() {
        Trilean::False => '+',
        Trilean::True => '-',
        Trilean::Unknown => '±',
    };

    if value.is_nan() == Trilean::True {
        return write!(f, "NaN");
    }
    if value.is_infinity() == Trilean::True {
        return write!(f, "{sign}∞");
    }

    write!(f, "{sign}")?;
    let significand = value.significand();
    let width = value.significand_size() as usize;
    for index in (0..=width).rev() {
        let c = match significand.get_bit(index) {
            Ok(Trilean::False) => '0',
            Ok(Trilean::True) => '1',
            _ => '?',
        };
        write!(f, "{c}")?;
        if index == width {
            write!(f, ".")?;
        }
    }

    match value.exponent().as_i64() {
        Ok(exponent) => write!(f, "×2^{exponent}"),
        Err(_) => write!(f, "×2^?"),
    }
}
