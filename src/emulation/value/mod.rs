//! Partially known values for the emulator.
//!
//! Every register, stack slot and memory cell of the emulated machine holds a value whose
//! individual bits may be definitely `0`, definitely `1`, or unknown. Each value owns two
//! byte buffers of the same fixed size:
//!
//! - the **bits** buffer, holding the stored bit pattern, and
//! - the **mask** buffer, where a set bit marks the corresponding value bit as known.
//!
//! Bits whose mask bit is clear are unconstrained; their stored value carries no meaning.
//!
//! # Key Components
//!
//! - [`Trilean`] - Three-valued logic used for every predicate
//! - [`Value`] - The narrow surface the emulator uses to read, write and query values
//! - [`IntegerValue`] / [`IntegerNValue`] - Arbitrary-width integers with bit-level uncertainty
//! - [`FloatValue`] - Shared IEEE-754 predicates, field extraction and addition
//! - [`Float32Value`] / [`Float64Value`] - binary32 / binary64 instantiations
//!
//! # Epistemic Collapse
//!
//! When an operation cannot compute an exact or partially exact result (an unknown sign
//! makes the choice between addition and subtraction impossible, an unknown exponent makes
//! the alignment distance impossible, ...) the receiver is marked fully unknown. This is
//! not reported as an error.
//!
//! # Example
//!
//! ```rust
//! use emuscope::emulation::{Float32Value, FloatValue, Trilean, Value};
//!
//! let mut a = Float32Value::new(1.5);
//! a.add(&Float32Value::new(1.25))?;
//! assert_eq!(a.value(), 2.75);
//!
//! // Clear the knowledge of the sign bit.
//! let mut b = Float32Value::with_mask(1.5, 0x7FFF_FFFF);
//! assert_eq!(b.sign(), Trilean::Unknown);
//!
//! b.add(&Float32Value::new(1.0))?;
//! assert!(!b.is_known());
//! # Ok::<(), emuscope::Error>(())
//! ```

mod float;
mod float32;
mod float64;
mod integer;
mod trilean;

pub use float::{FloatFormat, FloatValue};
pub use float32::Float32Value;
pub use float64::Float64Value;
pub use integer::{IntegerNValue, IntegerValue};
pub use trilean::Trilean;

use crate::Result;

/// The surface every emulated value exposes to the emulator.
///
/// Buffers passed to [`Value::get_bits`], [`Value::get_mask`] and [`Value::set_bits`] must
/// be exactly [`Value::size`] bytes long and are interpreted little-endian. No reference to
/// a caller-supplied buffer is retained beyond the call.
pub trait Value {
    /// Size of the value in bytes.
    fn size(&self) -> usize;

    /// Returns `true` if every bit of the value is known.
    fn is_known(&self) -> bool;

    /// Returns `true` if the value is passed by value (always the case at this layer).
    fn is_value_type(&self) -> bool {
        true
    }

    /// Copies the raw bits into `buffer`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::SizeMismatch`] if `buffer.len() != self.size()`.
    fn get_bits(&self, buffer: &mut [u8]) -> Result<()>;

    /// Copies the knowledge mask into `buffer`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::SizeMismatch`] if `buffer.len() != self.size()`.
    fn get_mask(&self, buffer: &mut [u8]) -> Result<()>;

    /// Replaces the raw bits and the knowledge mask.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::SizeMismatch`] if either buffer is not `self.size()` bytes long.
    /// The value is left untouched in that case.
    fn set_bits(&mut self, bits: &[u8], mask: &[u8]) -> Result<()>;

    /// Zeroes all bits and clears the mask.
    fn mark_fully_unknown(&mut self);

    /// Determines whether every bit of the value is zero.
    ///
    /// `True` only when the whole value is known to be all zeroes, `False` as soon as one
    /// known bit is set.
    fn is_zero(&self) -> Trilean;

    /// Determines whether the value is non-zero.
    fn is_non_zero(&self) -> Trilean {
        !self.is_zero()
    }

    /// The sign of the value (`True` means negative).
    fn sign(&self) -> Trilean;

    /// Determines whether the value is positive.
    fn is_positive(&self) -> Trilean {
        !self.sign()
    }

    /// Determines whether the value is negative.
    fn is_negative(&self) -> Trilean {
        self.sign()
    }
}

/// Checks that `buffer` is exactly `expected` bytes long.
pub(crate) fn check_size(expected: usize, buffer: &[u8]) -> Result<()> {
    if buffer.len() != expected {
        return Err(crate::Error::SizeMismatch {
            expected,
            actual: buffer.len(),
        });
    }
    Ok(())
}
