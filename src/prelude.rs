//! # emuscope Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the emuscope library. Import it to get the value types together with the traits
//! that carry their operations.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all emuscope operations
pub use crate::Error;

/// The result type used throughout emuscope
pub use crate::Result;

// ================================================================================================
// Value Traits
// ================================================================================================

/// Common surface of all values, plus the integer and float operations
pub use crate::emulation::{FloatValue, IntegerValue, Value};

// ================================================================================================
// Value Types
// ================================================================================================

/// Three-valued logic
pub use crate::emulation::Trilean;

/// Concrete values
pub use crate::emulation::{Float32Value, Float64Value, IntegerNValue};

/// IEEE-754 format parameters
pub use crate::emulation::FloatFormat;

// ================================================================================================
// Configuration and Utilities
// ================================================================================================

/// Arithmetic configuration
pub use crate::emulation::ArithmeticConfig;

/// Bit-addressable buffers
pub use crate::utils::BitField;
