//! Arithmetic configuration for the value model.
//!
//! Values that are fully known can be combined with the host's native floating point unit,
//! which is both faster and correctly rounded. Partially known values always go through the
//! bit-level algorithm of [`crate::emulation::FloatValue`].
//!
//! # Presets
//!
//! - [`ArithmeticConfig::native()`] - Use native arithmetic whenever both operands are known (default)
//! - [`ArithmeticConfig::bit_precise()`] - Always run the bit-level algorithm
//!
//! # Example
//!
//! ```rust
//! use emuscope::emulation::{ArithmeticConfig, Float64Value, FloatValue};
//!
//! let mut value = Float64Value::new(100.5);
//! value.add_with(&Float64Value::new(1.25), &ArithmeticConfig::bit_precise())?;
//! assert_eq!(value.value(), 101.75);
//! # Ok::<(), emuscope::Error>(())
//! ```

/// Controls how arithmetic on emulated values is carried out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArithmeticConfig {
    /// Whether fully known operands of the same format are combined natively.
    ///
    /// When disabled, every operation runs the bit-level algorithm, which truncates instead
    /// of rounding. Mostly useful to exercise and compare the bit-level path.
    pub native_fast_path: bool,
}

impl Default for ArithmeticConfig {
    fn default() -> Self {
        Self::native()
    }
}

impl ArithmeticConfig {
    /// Use native arithmetic for fully known operands.
    #[must_use]
    pub const fn native() -> Self {
        Self {
            native_fast_path: true,
        }
    }

    /// Always use the bit-level algorithm.
    #[must_use]
    pub const fn bit_precise() -> Self {
        Self {
            native_fast_path: false,
        }
    }

    /// Sets whether the native fast path is used.
    #[must_use]
    pub const fn with_native_fast_path(mut self, enabled: bool) -> Self {
        self.native_fast_path = enabled;
        self
    }
}
