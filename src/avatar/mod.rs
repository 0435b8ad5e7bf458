//! The top-level appearance engine.

pub mod engine;
