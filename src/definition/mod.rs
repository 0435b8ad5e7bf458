//! Immutable definition data supplied by the host's definition loader.

pub mod model;
