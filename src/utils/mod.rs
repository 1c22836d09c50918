//! Low-level helpers shared by the value model.

mod bitfield;

pub use bitfield::BitField;
