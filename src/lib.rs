//! Vesture is a layered character appearance engine.
//!
//! Vesture turns a set of weighted visual parameters, stacked wearables,
//! and texture layer definitions into baked per-region textures, morph
//! deltas, and skeletal distortions.
//!
//! # Pipeline overview
//!
//! 1. **Define**: a host loader supplies an immutable [`AppearanceConfig`]
//!    (parameters, driver links, layer sets, morphs, distortions).
//! 2. **Mutate**: [`Appearance`] applies weight changes and wearable
//!    composition changes, propagating driver links eagerly so dependent
//!    state is never half-updated.
//! 3. **Bake**: texture layer sets composite lazily into RGBA8
//!    [`BakedTexture`]s through a [`Rasterizer`]; morphs and distortions
//!    accumulate incrementally into host-owned mesh buffers and joint
//!    trees.
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic-by-default**: compositing the same weights twice
//!   yields byte-for-byte identical bakes.
//! - **No IO in the core**: images are front-loaded in a
//!   [`StaticImageCache`]; the engine never reads files or issues raw
//!   graphics calls itself.
//! - **Best-effort output**: unresolved links, missing joints, and missing
//!   textures are recorded and skipped, never fatal to a bake.
#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![allow(missing_docs_in_private_items)]

mod avatar;
mod color;
mod definition;
mod foundation;
mod mesh;
mod param;
mod texture;
mod wearable;

pub use avatar::engine::Appearance;
pub use color::global::{GlobalColor, fold_base, fold_color_params};
pub use definition::model::{
    AlphaParamDefinition, AppearanceConfig, BoneDeltaDefinition, ColorOp, ColorParamDefinition,
    ColorSourceDefinition, DrivenLinkDefinition, DriverDefinition, GlobalColorDefinition,
    LayerDefinition, LayerSetDefinition, MaskBlend, MorphTargetDefinition, ParameterDefinition,
    RenderPass, SkeletalDistortionDefinition, TextureSourceDefinition, WearableCategory,
};
pub use foundation::core::{CompositeCanvas, ParamId, Rgba, Sex, SexMask};
pub use foundation::error::{VestureError, VestureResult};
pub use mesh::morph::{MeshBuffers, MorphTarget};
pub use mesh::skeletal::{JointTree, SimpleSkeleton, SkeletalDistortion};
pub use param::driver::{DrivenUpdate, DriverParam, LinkFailure, ParamLocation, remap_driven};
pub use param::model::Parameter;
pub use param::registry::ParameterRegistry;
pub use texture::images::{
    FileImageCache, ImageBuffer, MaskBuffer, MemoryImageCache, StaticImageCache,
};
pub use texture::layer::{CompositeContext, LAYER_ALPHA_MIN, NetColor, resolve_net_color};
pub use texture::mask::{MaskCache, accumulate_layer_mask, mask_fingerprint, resample_mask};
pub use texture::raster::{BlendMode, CpuRasterizer, Rasterizer};
pub use texture::set::{BakedTexture, TextureLayerSet};
pub use wearable::model::{LocalTexture, Wearable};
pub use wearable::persist;
pub use wearable::stack::{MAX_WEARABLES_PER_CATEGORY, WearableStack};
