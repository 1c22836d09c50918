//! Value layer of the bytecode emulator.
//!
//! Obfuscated code frequently computes constants at runtime from inputs that are only partly
//! available to a static analysis. The emulator therefore tracks, for every bit of every
//! value, whether that bit is known, and keeps computing with whatever is left.
//!
//! # Architecture
//!
//! - Bit-addressable buffers from [`crate::utils::BitField`] hold raw bits and knowledge masks
//! - [`Trilean`] answers every predicate (`True`, `False` or `Unknown`)
//! - Integer values provide the arithmetic that float field manipulation is built on
//! - Float values implement IEEE-754 decomposition and addition once, for every format
//! - [`ArithmeticConfig`] chooses between native and bit-level arithmetic for known operands
//!
//! # Key Components
//!
//! ## Value System
//! - [`crate::emulation::Value`] - Common surface: size, bits, mask, zero and sign queries
//! - [`crate::emulation::IntegerNValue`] - Arbitrary-width integer with per-bit knowledge
//! - [`crate::emulation::Float32Value`] - IEEE-754 binary32 with per-bit knowledge
//! - [`crate::emulation::Float64Value`] - IEEE-754 binary64 with per-bit knowledge
//!
//! ## Configuration
//! - [`crate::emulation::ArithmeticConfig`] - Native fast path or bit-precise arithmetic
//!
//! # Usage Examples
//!
//! ```rust
//! use emuscope::emulation::{Float64Value, FloatValue, IntegerValue, Trilean, Value};
//!
//! // The exponent is known, the two lowest significand bits are not.
//! let mut value = Float64Value::with_mask(1.0, !0b11);
//! value.add(&Float64Value::new(2.0))?;
//!
//! assert_eq!(value.sign(), Trilean::False);
//! assert_eq!(value.exponent().as_i64()?, 1);
//! assert!(!value.is_known());
//! # Ok::<(), emuscope::Error>(())
//! ```
//!
//! # Thread Safety
//!
//! All value types are plain owned data and are `Send` and `Sync`. Mutation requires
//! exclusive access; callers sharing a value across threads must synchronize externally.

mod config;
mod value;

pub use config::ArithmeticConfig;

// Re-export primary types from value module
pub use value::{
    Float32Value, Float64Value, FloatFormat, FloatValue, IntegerNValue, IntegerValue, Trilean,
    Value,
};
