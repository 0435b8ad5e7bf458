//! Weighted color folding and avatar-wide global colors.

pub mod global;
