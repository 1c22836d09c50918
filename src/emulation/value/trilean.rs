//! Three-valued boolean logic.
//!
//! Every predicate the value model exposes (sign, zero-ness, NaN-ness, ...) answers with a
//! [`Trilean`] rather than a plain `bool`, since a partially known value may not allow a
//! definite answer.
//!
//! The connectives follow strong Kleene logic: `Unknown` only propagates when the known
//! operand does not already decide the result.
//!
//! | `a`       | `b`       | `a & b`   | `a \| b`  | `a ^ b`   |
//! |-----------|-----------|-----------|-----------|-----------|
//! | `False`   | `Unknown` | `False`   | `Unknown` | `Unknown` |
//! | `True`    | `Unknown` | `Unknown` | `True`    | `Unknown` |
//! | `Unknown` | `Unknown` | `Unknown` | `Unknown` | `Unknown` |

use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Not};

use strum::{Display, EnumCount, EnumIter};

use crate::{Error, Result};

/// A three-valued boolean: definitely false, definitely true, or unknown.
///
/// Conversion from `bool` is lossless. There is no lossy conversion back: callers branch on
/// [`Trilean::is_known`] (or use [`Trilean::to_bool`]) before extracting a definite value.
///
/// # Examples
///
/// ```rust
/// use emuscope::emulation::Trilean;
///
/// let sign = Trilean::Unknown;
/// assert_eq!(sign & Trilean::False, Trilean::False);
/// assert_eq!(sign | Trilean::True, Trilean::True);
/// assert_eq!(!sign, Trilean::Unknown);
/// assert_eq!(Trilean::from(true).to_bool(), Some(true));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display, EnumIter, EnumCount)]
#[repr(u8)]
pub enum Trilean {
    /// Definitely false.
    False = 0,
    /// Definitely true.
    True = 1,
    /// Could be either.
    #[default]
    Unknown = 2,
}

impl Trilean {
    /// Returns `true` if the value is either [`Trilean::True`] or [`Trilean::False`].
    #[must_use]
    pub const fn is_known(self) -> bool {
        !matches!(self, Trilean::Unknown)
    }

    /// Returns `true` only if the value is [`Trilean::True`].
    #[must_use]
    pub const fn is_true(self) -> bool {
        matches!(self, Trilean::True)
    }

    /// Returns `true` only if the value is [`Trilean::False`].
    #[must_use]
    pub const fn is_false(self) -> bool {
        matches!(self, Trilean::False)
    }

    /// Converts to `bool` if the value is known.
    #[must_use]
    pub const fn to_bool(self) -> Option<bool> {
        match self {
            Trilean::False => Some(false),
            Trilean::True => Some(true),
            Trilean::Unknown => None,
        }
    }

    /// Builds a value from a bit and its knowledge flag.
    ///
    /// `known == false` always yields [`Trilean::Unknown`], regardless of `bit`.
    #[must_use]
    pub const fn from_bit(bit: bool, known: bool) -> Self {
        match (known, bit) {
            (false, _) => Trilean::Unknown,
            (true, false) => Trilean::False,
            (true, true) => Trilean::True,
        }
    }

    /// Returns the canonical discriminant (`0` = false, `1` = true, `2` = unknown).
    #[must_use]
    pub const fn discriminant(self) -> u8 {
        self as u8
    }

    /// Three-valued majority of `self`, `b` and `c`.
    ///
    /// This is the carry-out of a full adder over three-valued bits.
    #[must_use]
    pub fn majority(self, b: Self, c: Self) -> Self {
        (self & b) | (self & c) | (b & c)
    }
}

impl From<bool> for Trilean {
    fn from(value: bool) -> Self {
        if value {
            Trilean::True
        } else {
            Trilean::False
        }
    }
}

impl From<Option<bool>> for Trilean {
    fn from(value: Option<bool>) -> Self {
        value.map_or(Trilean::Unknown, Trilean::from)
    }
}

impl TryFrom<Trilean> for bool {
    type Error = Error;

    fn try_from(value: Trilean) -> Result<Self> {
        value.to_bool().ok_or(Error::NotKnown)
    }
}

impl PartialEq<bool> for Trilean {
    fn eq(&self, other: &bool) -> bool {
        self.to_bool() == Some(*other)
    }
}

impl Not for Trilean {
    type Output = Self;

    fn not(self) -> Self {
        match self {
            Trilean::False => Trilean::True,
            Trilean::True => Trilean::False,
            Trilean::Unknown => Trilean::Unknown,
        }
    }
}

impl BitAnd for Trilean {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        match (self, rhs) {
            (Trilean::False, _) | (_, Trilean::False) => Trilean::False,
            (Trilean::True, Trilean::True) => Trilean::True,
            _ => Trilean::Unknown,
        }
    }
}

impl BitOr for Trilean {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        match (self, rhs) {
            (Trilean::True, _) | (_, Trilean::True) => Trilean::True,
            (Trilean::False, Trilean::False) => Trilean::False,
            _ => Trilean::Unknown,
        }
    }
}

impl BitXor for Trilean {
    type Output = Self;

    fn bitxor(self, rhs: Self) -> Self {
        match (self.to_bool(), rhs.to_bool()) {
            (Some(a), Some(b)) => Trilean::from(a ^ b),
            _ => Trilean::Unknown,
        }
    }
}

impl BitAndAssign for Trilean {
    fn bitand_assign(&mut self, rhs: Self) {
        *self = *self & rhs;
    }
}

impl BitOrAssign for Trilean {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = *self | rhs;
    }
}

impl BitXorAssign for Trilean {
    fn bitxor_assign(&mut self, rhs: Self) {
        *self = *self ^ rhs;
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    use super::Trilean::{False as F, True as T, Unknown as U};

    #[test]
    fn test_trilean_and_table() {
        assert_eq!(F & F, F);
        assert_eq!(F & T, F);
        assert_eq!(F & U, F);
        assert_eq!(T & T, T);
        assert_eq!(T & U, U);
        assert_eq!(U & U, U);
    }

    #[test]
    fn test_trilean_or_table() {
        assert_eq!(F | F, F);
        assert_eq!(F | T, T);
        assert_eq!(F | U, U);
        assert_eq!(T | T, T);
        assert_eq!(T | U, T);
        assert_eq!(U | U, U);
    }

    #[test]
    fn test_trilean_xor_not() {
        assert_eq!(F ^ T, T);
        assert_eq!(T ^ T, F);
        assert_eq!(T ^ U, U);
        assert_eq!(!F, T);
        assert_eq!(!T, F);
        assert_eq!(!U, U);
    }

    #[test]
    fn test_trilean_commutative_and_de_morgan() {
        for a in Trilean::iter() {
            for b in Trilean::iter() {
                assert_eq!(a & b, b & a);
                assert_eq!(a | b, b | a);
                assert_eq!(a ^ b, b ^ a);
                assert_eq!(!(a & b), !a | !b, "{a} {b}");
                assert_eq!(!(a | b), !a & !b, "{a} {b}");
            }
        }
        assert_eq!(Trilean::COUNT, 3);
    }

    #[test]
    fn test_trilean_majority() {
        assert_eq!(T.majority(T, U), T);
        assert_eq!(F.majority(F, U), F);
        assert_eq!(T.majority(F, U), U);
        assert_eq!(T.majority(F, T), T);
    }

    #[test]
    fn test_trilean_conversions() {
        assert_eq!(Trilean::from(true), T);
        assert_eq!(Trilean::from(false), F);
        assert_eq!(Trilean::from(None::<bool>), U);
        assert!(bool::try_from(T).unwrap());
        assert_eq!(bool::try_from(U), Err(Error::NotKnown));
        assert!(T == true);
        assert!(U != true && U != false);
        assert_eq!(Trilean::from_bit(true, false), U);
        assert_eq!(Trilean::from_bit(true, true), T);
        assert_eq!(U.discriminant(), 2);
        assert!(T.is_known() && !U.is_known());
    }

    #[test]
    fn test_trilean_assign_ops() {
        let mut value = T;
        value &= U;
        assert_eq!(value, U);
        value |= T;
        assert_eq!(value, T);
        value ^= T;
        assert_eq!(value, F);
    }
}
