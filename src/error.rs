use thiserror::Error;

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// All errors are local and synchronous. None of them describe a state that a retry could
/// fix; they indicate that the caller handed in buffers or values that do not fit together.
///
/// Note that a value becoming fully unknown is *not* an error. Operations that cannot
/// compute a (partially) exact result degrade the receiver through
/// [`crate::emulation::Value::mark_fully_unknown`] and return `Ok(())`.
///
/// # Error Categories
///
/// - [`Error::SizeMismatch`] - Two buffers or values of different byte size were combined
/// - [`Error::OutOfBounds`] - A bit index outside of a [`crate::utils::BitField`] was accessed
/// - [`Error::NotSupported`] - The value representation can not perform the requested mutation
/// - [`Error::NotKnown`] - A definite answer was requested from a value that is not fully known
///
/// # Examples
///
/// ```rust
/// use emuscope::{Error, emulation::{Float32Value, Float64Value, FloatValue}};
///
/// let mut a = Float32Value::new(1.0);
/// let b = Float64Value::new(1.0);
///
/// match a.add(&b) {
///     Err(Error::SizeMismatch { expected, actual }) => {
///         assert_eq!((expected, actual), (4, 8));
///     }
///     _ => unreachable!(),
/// }
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Two operands or buffers do not share the same size.
    ///
    /// Values are never silently truncated or padded; the receiver of the failed
    /// operation is left untouched.
    ///
    /// # Fields
    ///
    /// * `expected` - The size (in bytes) of the receiving value or buffer
    /// * `actual` - The size (in bytes) that was provided
    #[error("Size mismatch - expected {expected} bytes, got {actual}")]
    SizeMismatch {
        /// The size of the receiving value in bytes
        expected: usize,
        /// The size of the provided operand in bytes
        actual: usize,
    },

    /// An out of bound bit access was attempted.
    ///
    /// This indicates a bug in the caller, correct use never triggers it.
    #[error("Bit index {index} is out of bounds for a field of {len} bits")]
    OutOfBounds {
        /// The offending bit index
        index: usize,
        /// The number of bits in the field
        len: usize,
    },

    /// The requested operation is not supported by this value representation.
    #[error("This operation is not supported - {0}")]
    NotSupported(&'static str),

    /// A definite result was requested from a value that is (partially) unknown.
    #[error("The value is not fully known")]
    NotKnown,
}
