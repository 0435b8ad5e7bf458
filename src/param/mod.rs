//! Live visual parameters, the shared registry, and driver links.

pub mod driver;
pub mod model;
pub mod registry;
