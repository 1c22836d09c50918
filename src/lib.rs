// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # emuscope
//!
//! [![License](https://img.shields.io/badge/license-Apache--2.0-blue.svg)](https://www.apache.org/licenses/LICENSE-2.0)
//!
//! Partially known numeric values for bytecode emulation. Every bit of an `emuscope` value is
//! either definitely `0`, definitely `1`, or unknown, and arithmetic keeps as much knowledge
//! as it soundly can instead of giving up on the first unknown input.
//!
//! ## Features
//!
//! - **🔢 Three-valued logic** - [`emulation::Trilean`] with Kleene semantics for every predicate
//! - **🧮 Bit-precise integers** - Arbitrary-width integers with per-bit knowledge
//! - **🌊 IEEE-754 floats** - binary32 and binary64 with sign, exponent and significand inspection
//! - **⚡ Native fast path** - Fully known operands use the host FPU
//! - **🛡️ Sound by construction** - A bit is only reported known when it is the same for every
//!   concretization of the inputs
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! emuscope = "0.1"
//! ```
//!
//! ### Using the Prelude
//!
//! ```rust
//! use emuscope::prelude::*;
//!
//! let mut value = Float32Value::new(1.5);
//! value.add(&Float32Value::new(1.25))?;
//!
//! assert_eq!(value.value(), 2.75);
//! assert_eq!(value.is_zero(), Trilean::False);
//! # Ok::<(), emuscope::Error>(())
//! ```
//!
//! ### Partial Knowledge
//!
//! ```rust
//! use emuscope::prelude::*;
//!
//! // Nothing is known about the sign bit of this value.
//! let mut value = Float64Value::with_mask(-3.0, 0x7FFF_FFFF_FFFF_FFFF);
//! assert_eq!(value.sign(), Trilean::Unknown);
//! assert_eq!(value.is_zero(), Trilean::False);
//!
//! // Addition can not decide between adding and subtracting magnitudes.
//! value.add(&Float64Value::new(1.0))?;
//! assert_eq!(value.is_zero(), Trilean::Unknown);
//! # Ok::<(), emuscope::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`prelude`] - Convenient re-exports of commonly used types and traits
//! - [`emulation`] - The value model: [`emulation::Value`], integers and floats
//! - [`utils`] - Bit-addressable buffers backing every value
//! - [`Error`] and [`Result`] - Error handling
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T, Error>`](Result). Losing knowledge is never an
//! error: values that can not be computed precisely are marked fully unknown instead.
//!
//! ```rust
//! use emuscope::{Error, prelude::*};
//!
//! let mut value = Float32Value::new(1.0);
//! match value.add(&Float64Value::new(1.0)) {
//!     Ok(()) => println!("added"),
//!     Err(Error::SizeMismatch { expected, actual }) => {
//!         println!("can not add {actual} bytes to {expected} bytes")
//!     }
//!     Err(e) => println!("Other error: {}", e),
//! }
//! ```
//!
//! ## Development and Testing
//!
//! ```bash
//! cargo test
//! cargo bench
//! ```
//!
//! Diagnostics about precision loss are emitted through the [`log`](https://docs.rs/log)
//! facade at `trace` level; install any logger to see them.

pub(crate) mod error;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use emuscope::prelude::*;
///
/// let value = IntegerNValue::from_u64(42, 4);
/// assert_eq!(value.as_i64()?, 42);
/// # Ok::<(), emuscope::Error>(())
/// ```
pub mod prelude;

/// Partially known values and the arithmetic over them.
///
/// # Key Types
///
/// - [`emulation::Value`] - Read, write and query any value
/// - [`emulation::Trilean`] - Three-valued logic
/// - [`emulation::IntegerNValue`] - Arbitrary-width integer
/// - [`emulation::Float32Value`] / [`emulation::Float64Value`] - IEEE-754 floats
/// - [`emulation::ArithmeticConfig`] - Native versus bit-precise arithmetic
pub mod emulation;

/// Utility types used throughout the crate.
pub mod utils;

/// `emuscope` Result type
///
/// A type alias for `std::result::Result<T, Error>` where the error type is always
/// [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `emuscope` Error type
///
/// The main error type for all operations in this crate.
pub use error::Error;
