//! Shared primitives: error taxonomy, small math helpers, and core value
//! types used across every component.

pub mod core;
pub mod error;
pub(crate) mod math;
