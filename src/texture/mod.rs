//! Texture layer compositing: images, rasterization, masks, and bake sets.

pub mod images;
pub mod layer;
pub mod mask;
pub mod raster;
pub mod set;
