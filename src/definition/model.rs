use glam::Vec3;

use crate::foundation::core::{ParamId, Rgba, SexMask};
use crate::foundation::error::{VestureError, VestureResult};

/// Body-part or clothing kind a wearable (and its parameters) belongs to.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum WearableCategory {
    /// Body shape.
    Shape,
    /// Skin.
    Skin,
    /// Hair.
    Hair,
    /// Eyes.
    Eyes,
    /// Shirt.
    Shirt,
    /// Pants.
    Pants,
    /// Shoes.
    Shoes,
    /// Socks.
    Socks,
    /// Jacket.
    Jacket,
    /// Gloves.
    Gloves,
    /// Undershirt.
    Undershirt,
    /// Underpants.
    Underpants,
    /// Skirt.
    Skirt,
}

impl WearableCategory {
    /// All categories, in stable order.
    pub const ALL: [WearableCategory; 13] = [
        WearableCategory::Shape,
        WearableCategory::Skin,
        WearableCategory::Hair,
        WearableCategory::Eyes,
        WearableCategory::Shirt,
        WearableCategory::Pants,
        WearableCategory::Shoes,
        WearableCategory::Socks,
        WearableCategory::Jacket,
        WearableCategory::Gloves,
        WearableCategory::Undershirt,
        WearableCategory::Underpants,
        WearableCategory::Skirt,
    ];

    /// Stable lowercase name used by the persistence record.
    pub fn as_str(self) -> &'static str {
        match self {
            WearableCategory::Shape => "shape",
            WearableCategory::Skin => "skin",
            WearableCategory::Hair => "hair",
            WearableCategory::Eyes => "eyes",
            WearableCategory::Shirt => "shirt",
            WearableCategory::Pants => "pants",
            WearableCategory::Shoes => "shoes",
            WearableCategory::Socks => "socks",
            WearableCategory::Jacket => "jacket",
            WearableCategory::Gloves => "gloves",
            WearableCategory::Undershirt => "undershirt",
            WearableCategory::Underpants => "underpants",
            WearableCategory::Skirt => "skirt",
        }
    }

    /// Inverse of [`WearableCategory::as_str`].
    pub fn from_str_name(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == s)
    }
}

/// Immutable definition of one visual parameter.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ParameterDefinition {
    /// Stable unique id.
    pub id: ParamId,
    /// Authoring/debugging name.
    pub name: String,
    /// Category whose wearables own clones of this parameter.
    pub category: WearableCategory,
    /// Lower weight bound.
    pub min_weight: f32,
    /// Upper weight bound.
    pub max_weight: f32,
    /// Default weight, also the effective weight when the sex mask does not match.
    pub default_weight: f32,
    /// Sex applicability.
    #[serde(default)]
    pub sex: SexMask,
}

/// One driver → driven mapping with its 4-point remap breakpoints.
///
/// Breakpoints are driver-weight positions and must be non-decreasing:
/// `min1 <= max1 <= max2 <= min2`. `min1`/`min2` equal to the driver's own
/// bounds request extrapolation instead of flat clamping (see
/// [`crate::DriverParam`]).
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub struct DrivenLinkDefinition {
    /// Id of the driven parameter.
    pub driven_id: ParamId,
    /// Driver weight below which the driven value sits at its floor.
    pub min1: f32,
    /// Driver weight where the up-slope reaches the driven maximum.
    pub max1: f32,
    /// Driver weight where the plateau ends.
    pub max2: f32,
    /// Driver weight above which the driven value sits at its ceiling.
    pub min2: f32,
}

/// A driver parameter and the links it propagates through.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct DriverDefinition {
    /// Id of the driving parameter.
    pub driver_id: ParamId,
    /// Category hosting the driver (its own wearable slot).
    pub category: WearableCategory,
    /// Driven links, applied in order.
    pub driven: Vec<DrivenLinkDefinition>,
}

/// How weighted color parameters fold into a net layer color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ColorOp {
    /// Accumulate weighted contributions.
    Add,
    /// Component-wise product of weighted contributions.
    Multiply,
    /// Linear interpolation toward each parameter's color by its weight.
    Blend,
}

/// One weighted color parameter inside a color source.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ColorParamDefinition {
    /// Backing visual parameter.
    pub id: ParamId,
    /// Color contributed at full normalized weight.
    pub color: Rgba,
}

/// Where a layer's net color comes from. Exactly one branch resolves,
/// tried in this priority order.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub enum ColorSourceDefinition {
    /// Weighted color-parameter chain folded with an operation.
    Params {
        /// Fold operation.
        op: ColorOp,
        /// Parameters folded in order.
        params: Vec<ColorParamDefinition>,
        /// Optional base: start from this named global color instead of the
        /// operation's neutral start value.
        #[serde(default)]
        global_base: Option<String>,
        /// Optional base: start from this fixed color.
        #[serde(default)]
        fixed_base: Option<Rgba>,
    },
    /// A bare reference to a named global color.
    Global(String),
    /// A fixed opaque color.
    Fixed(Rgba),
    /// No explicit color: the layer draws with opaque white.
    Default,
}

/// How a mask-source alpha parameter blends into the accumulated mask.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum MaskBlend {
    /// Multiply into the accumulated mask (approximates `min`).
    Multiply,
    /// Add into the accumulated mask (approximates `max`).
    Add,
}

/// One alpha source of a layer: a weighted parameter, optionally backed by a
/// static greyscale image swept through a domain-and-weight function.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct AlphaParamDefinition {
    /// Backing visual parameter.
    pub id: ParamId,
    /// Static greyscale mask image name, if any. Without one the source
    /// contributes a flat fill at its normalized effective weight.
    #[serde(default)]
    pub static_mask: Option<String>,
    /// Softness of the threshold sweep applied to the static mask.
    /// Zero means a hard threshold.
    #[serde(default)]
    pub domain: f32,
    /// Invert the static mask before thresholding.
    #[serde(default)]
    pub invert: bool,
    /// Blend mode into the accumulated mask.
    pub blend: MaskBlend,
}

/// Where a layer's texture pixels come from.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum TextureSourceDefinition {
    /// A wearable-local texture slot, resolved on the category's top wearable.
    LocalSlot(u32),
    /// A named static image.
    Static(String),
    /// No texture: the layer fills with its net color only.
    None,
}

/// Which render pass a layer belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum RenderPass {
    /// Diffuse color pass.
    Color,
    /// Bump/normal pass.
    Bump,
}

/// Immutable definition of one texture layer.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct LayerDefinition {
    /// Layer name, unique within its set.
    pub name: String,
    /// Render pass.
    pub render_pass: RenderPass,
    /// True for layers that only gate visibility of the whole set.
    #[serde(default)]
    pub is_visibility_mask: bool,
    /// Replace all channels instead of alpha-blending when drawing.
    #[serde(default)]
    pub write_all_channels: bool,
    /// Net color source.
    pub color_source: ColorSourceDefinition,
    /// Alpha sources accumulated into the layer's morph/alpha mask.
    #[serde(default)]
    pub alpha_sources: Vec<AlphaParamDefinition>,
    /// Texture pixel source.
    pub texture_source: TextureSourceDefinition,
}

/// Immutable definition of one bake region's layer set.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct LayerSetDefinition {
    /// Body-region name (e.g. "head", "upper_body").
    pub name: String,
    /// Category whose top wearable supplies local texture slots.
    pub category: WearableCategory,
    /// Color layers, compositing bottom → top.
    pub layers: Vec<LayerDefinition>,
    /// Mask layers applied after color layers to cut alpha.
    #[serde(default)]
    pub mask_layers: Vec<LayerDefinition>,
    /// Reset alpha to opaque before applying mask layers even when no static
    /// alpha image is present.
    #[serde(default)]
    pub clear_alpha: bool,
    /// Static image whose alpha channel replaces the baked alpha outright.
    #[serde(default)]
    pub static_alpha_image: Option<String>,
}

/// Immutable definition of one morph target.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct MorphTargetDefinition {
    /// Morph name.
    pub name: String,
    /// Backing visual parameter.
    pub param_id: ParamId,
    /// Affected vertex indices.
    pub vertex_indices: Vec<u32>,
    /// Per-index coordinate deltas at full weight.
    pub coord_deltas: Vec<Vec3>,
    /// Per-index normal deltas at full weight.
    pub normal_deltas: Vec<Vec3>,
    /// Per-index binormal deltas at full weight.
    pub binormal_deltas: Vec<Vec3>,
}

/// Per-joint scale/position delta of a skeletal distortion.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct BoneDeltaDefinition {
    /// Joint name looked up in the external joint tree.
    pub bone_name: String,
    /// Scale delta at full weight.
    pub scale_delta: Vec3,
    /// Optional position delta at full weight.
    #[serde(default)]
    pub position_delta: Option<Vec3>,
}

/// Immutable definition of one skeletal distortion.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct SkeletalDistortionDefinition {
    /// Distortion name.
    pub name: String,
    /// Backing visual parameter.
    pub param_id: ParamId,
    /// Per-joint deltas.
    pub bones: Vec<BoneDeltaDefinition>,
}

/// Immutable definition of one avatar-wide derived color (skin/hair/eyes).
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct GlobalColorDefinition {
    /// Global color name referenced by layer color sources.
    pub name: String,
    /// Fold operation.
    pub op: ColorOp,
    /// Parameters folded in order.
    pub params: Vec<ColorParamDefinition>,
}

/// Complete immutable appearance configuration built once at startup and
/// passed by reference into every component.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct AppearanceConfig {
    /// Texture name designating "fully invisible"; a mask layer whose alpha
    /// source resolves to it hides its whole layer set.
    pub invisible_texture: String,
    /// All parameter definitions.
    pub parameters: Vec<ParameterDefinition>,
    /// All driver definitions.
    #[serde(default)]
    pub drivers: Vec<DriverDefinition>,
    /// All layer-set definitions, one per bake region.
    #[serde(default)]
    pub layer_sets: Vec<LayerSetDefinition>,
    /// All morph-target definitions.
    #[serde(default)]
    pub morphs: Vec<MorphTargetDefinition>,
    /// All skeletal-distortion definitions.
    #[serde(default)]
    pub distortions: Vec<SkeletalDistortionDefinition>,
    /// All global-color definitions.
    #[serde(default)]
    pub global_colors: Vec<GlobalColorDefinition>,
}

impl AppearanceConfig {
    /// Validate every definition record. Malformed input from the loader is
    /// rejected here, before it can reach the runtime components.
    pub fn validate(&self) -> VestureResult<()> {
        if self.invisible_texture.trim().is_empty() {
            return Err(VestureError::definition(
                "invisible_texture must be non-empty",
            ));
        }

        let mut seen = std::collections::BTreeSet::new();
        for p in &self.parameters {
            if !seen.insert(p.id) {
                return Err(VestureError::definition(format!(
                    "duplicate parameter id {}",
                    p.id.0
                )));
            }
            for (field, v) in [
                ("min_weight", p.min_weight),
                ("max_weight", p.max_weight),
                ("default_weight", p.default_weight),
            ] {
                if !v.is_finite() {
                    return Err(VestureError::definition(format!(
                        "parameter {} {field} must be finite",
                        p.id.0
                    )));
                }
            }
            if p.min_weight > p.max_weight {
                return Err(VestureError::definition(format!(
                    "parameter {} min_weight must be <= max_weight",
                    p.id.0
                )));
            }
            if p.default_weight < p.min_weight || p.default_weight > p.max_weight {
                return Err(VestureError::definition(format!(
                    "parameter {} default_weight must lie in [min, max]",
                    p.id.0
                )));
            }
        }

        for d in &self.drivers {
            if !seen.contains(&d.driver_id) {
                return Err(VestureError::definition(format!(
                    "driver references unknown parameter id {}",
                    d.driver_id.0
                )));
            }
            for link in &d.driven {
                if !(link.min1 <= link.max1 && link.max1 <= link.max2 && link.max2 <= link.min2) {
                    return Err(VestureError::definition(format!(
                        "driver {} link to {} has decreasing breakpoints",
                        d.driver_id.0, link.driven_id.0
                    )));
                }
            }
        }

        let mut set_names = std::collections::BTreeSet::new();
        for set in &self.layer_sets {
            if set.name.trim().is_empty() {
                return Err(VestureError::definition("layer set name must be non-empty"));
            }
            if !set_names.insert(set.name.as_str()) {
                return Err(VestureError::definition(format!(
                    "duplicate layer set '{}'",
                    set.name
                )));
            }
            for layer in set.layers.iter().chain(set.mask_layers.iter()) {
                validate_layer(&set.name, layer, &seen)?;
            }
        }

        for m in &self.morphs {
            let n = m.vertex_indices.len();
            if m.coord_deltas.len() != n
                || m.normal_deltas.len() != n
                || m.binormal_deltas.len() != n
            {
                return Err(VestureError::definition(format!(
                    "morph '{}' delta lists must match vertex_indices length",
                    m.name
                )));
            }
            if !seen.contains(&m.param_id) {
                return Err(VestureError::definition(format!(
                    "morph '{}' references unknown parameter id {}",
                    m.name, m.param_id.0
                )));
            }
        }

        for d in &self.distortions {
            if !seen.contains(&d.param_id) {
                return Err(VestureError::definition(format!(
                    "distortion '{}' references unknown parameter id {}",
                    d.name, d.param_id.0
                )));
            }
            for bone in &d.bones {
                if bone.bone_name.trim().is_empty() {
                    return Err(VestureError::definition(format!(
                        "distortion '{}' has a bone with an empty name",
                        d.name
                    )));
                }
            }
        }

        let mut color_names = std::collections::BTreeSet::new();
        for g in &self.global_colors {
            if !color_names.insert(g.name.as_str()) {
                return Err(VestureError::definition(format!(
                    "duplicate global color '{}'",
                    g.name
                )));
            }
            if g.params.is_empty() {
                return Err(VestureError::definition(format!(
                    "global color '{}' must have at least one parameter",
                    g.name
                )));
            }
            for cp in &g.params {
                if !seen.contains(&cp.id) {
                    return Err(VestureError::definition(format!(
                        "global color '{}' references unknown parameter id {}",
                        g.name, cp.id.0
                    )));
                }
            }
        }

        Ok(())
    }

    /// Lookup a parameter definition by id.
    pub fn parameter(&self, id: ParamId) -> Option<&ParameterDefinition> {
        self.parameters.iter().find(|p| p.id == id)
    }

    /// Lookup a global color definition by name.
    pub fn global_color(&self, name: &str) -> Option<&GlobalColorDefinition> {
        self.global_colors.iter().find(|g| g.name == name)
    }
}

fn validate_layer(
    set_name: &str,
    layer: &LayerDefinition,
    known_ids: &std::collections::BTreeSet<ParamId>,
) -> VestureResult<()> {
    if layer.name.trim().is_empty() {
        return Err(VestureError::definition(format!(
            "layer set '{set_name}' has a layer with an empty name"
        )));
    }
    if let ColorSourceDefinition::Params { params, .. } = &layer.color_source {
        if params.is_empty() {
            return Err(VestureError::definition(format!(
                "layer '{}' color params must be non-empty",
                layer.name
            )));
        }
        for cp in params {
            if !known_ids.contains(&cp.id) {
                return Err(VestureError::definition(format!(
                    "layer '{}' references unknown color parameter id {}",
                    layer.name, cp.id.0
                )));
            }
        }
    }
    for a in &layer.alpha_sources {
        if !known_ids.contains(&a.id) {
            return Err(VestureError::definition(format!(
                "layer '{}' references unknown alpha parameter id {}",
                layer.name, a.id.0
            )));
        }
        if !a.domain.is_finite() || a.domain < 0.0 {
            return Err(VestureError::definition(format!(
                "layer '{}' alpha domain must be finite and >= 0",
                layer.name
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/definition/model.rs"]
mod tests;
