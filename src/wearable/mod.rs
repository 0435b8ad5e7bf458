//! Wearables, the per-category wearable stack, and record persistence.

pub mod model;
pub mod persist;
pub mod stack;
