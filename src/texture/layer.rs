use crate::color::global::{GlobalColor, fold_color_params};
use crate::definition::model::{
    AppearanceConfig, ColorSourceDefinition, LayerDefinition, TextureSourceDefinition,
    WearableCategory,
};
use crate::foundation::core::{ParamId, Rgba, Sex};
use crate::param::registry::ParameterRegistry;
use crate::texture::images::StaticImageCache;
use crate::wearable::stack::WearableStack;

/// Net color alpha below which a layer is considered invisible and skipped.
pub const LAYER_ALPHA_MIN: f32 = 1.0 / 255.0;

/// Read-only view over everything a composite pass needs to resolve layer
/// inputs: parameter weights (top wearable first, shared registry as
/// fallback), global colors, local textures, and static images.
pub struct CompositeContext<'a> {
    /// Validated immutable configuration.
    pub config: &'a AppearanceConfig,
    /// Character sex for effective-weight resolution.
    pub sex: Sex,
    /// Current wearable composition.
    pub stack: &'a WearableStack,
    /// Shared parameter registry.
    pub registry: &'a ParameterRegistry,
    /// Current global colors.
    pub globals: &'a [GlobalColor],
    /// Static image source.
    pub images: &'a dyn StaticImageCache,
}

impl CompositeContext<'_> {
    /// Normalized effective weight of a parameter, resolved on the top
    /// wearable of the parameter's own category when one is worn, else on
    /// the shared registry.
    pub fn normalized_weight(&self, id: ParamId) -> Option<f32> {
        let category = self.config.parameter(id)?.category;
        if let Some(top) = self.stack.top(category)
            && let Some(p) = top.param(id)
        {
            return Some(p.normalized_effective(self.sex));
        }
        self.registry.get(id).map(|p| p.normalized_effective(self.sex))
    }

    /// Current value of a named global color.
    pub fn global_color(&self, name: &str) -> Option<Rgba> {
        self.globals
            .iter()
            .find(|g| g.name() == name)
            .map(GlobalColor::color)
    }

    /// Image name carried by a local texture slot on the top wearable of
    /// `category`.
    pub fn local_texture(&self, category: WearableCategory, slot: u32) -> Option<&str> {
        self.stack
            .top(category)?
            .texture(slot)
            .map(|t| t.image.as_str())
    }
}

/// A layer's resolved net color.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NetColor {
    /// A color was specified; the layer draws a color pass.
    Explicit(Rgba),
    /// No color source: the layer draws with opaque white and no separate
    /// color pass.
    DefaultWhite,
}

impl NetColor {
    /// The color value, opaque white for the default branch.
    pub fn rgba(self) -> Rgba {
        match self {
            NetColor::Explicit(c) => c,
            NetColor::DefaultWhite => Rgba::WHITE,
        }
    }

    /// True when a color was explicitly specified.
    pub fn is_explicit(self) -> bool {
        matches!(self, NetColor::Explicit(_))
    }
}

/// Resolve a layer's net color. Exactly one [`ColorSourceDefinition`]
/// branch applies; the parameter-chain branch starts from its global-color
/// base, else its fixed base, else transparent black, and folds each
/// parameter's weighted contribution with the chain's operation.
pub fn resolve_net_color(layer: &LayerDefinition, ctx: &CompositeContext<'_>) -> NetColor {
    match &layer.color_source {
        ColorSourceDefinition::Params {
            op,
            params,
            global_base,
            fixed_base,
        } => {
            let base = global_base
                .as_deref()
                .and_then(|name| ctx.global_color(name))
                .or(*fixed_base)
                .unwrap_or(Rgba::TRANSPARENT);
            NetColor::Explicit(fold_color_params(*op, params, base, |id| {
                ctx.normalized_weight(id)
            }))
        }
        ColorSourceDefinition::Global(name) => match ctx.global_color(name) {
            Some(c) => NetColor::Explicit(c),
            None => {
                tracing::warn!(layer = %layer.name, global = %name, "unknown global color");
                NetColor::DefaultWhite
            }
        },
        ColorSourceDefinition::Fixed(c) => NetColor::Explicit(*c),
        ColorSourceDefinition::Default => NetColor::DefaultWhite,
    }
}

/// Resolve a layer's texture source to an image name, if any.
pub fn resolve_texture<'a>(
    layer: &'a LayerDefinition,
    ctx: &'a CompositeContext<'_>,
    set_category: WearableCategory,
) -> Option<&'a str> {
    match &layer.texture_source {
        TextureSourceDefinition::LocalSlot(slot) => ctx.local_texture(set_category, *slot),
        TextureSourceDefinition::Static(name) => Some(name.as_str()),
        TextureSourceDefinition::None => None,
    }
}

/// True when this layer is a visibility mask whose texture resolves to the
/// designated fully-invisible image, hiding its whole layer set.
pub fn is_invisible_mask(
    layer: &LayerDefinition,
    ctx: &CompositeContext<'_>,
    set_category: WearableCategory,
) -> bool {
    layer.is_visibility_mask
        && resolve_texture(layer, ctx, set_category) == Some(ctx.config.invisible_texture.as_str())
}

#[cfg(test)]
#[path = "../../tests/unit/texture/layer.rs"]
mod tests;
