//! Geometry consumers of parameter weights: morph targets and skeletal
//! distortions.

pub mod morph;
pub mod skeletal;
