//! Composite of one bake region's layer stack into an RGBA8 bake.

use crate::definition::model::{LayerSetDefinition, RenderPass};
use crate::foundation::core::{CompositeCanvas, Rgba};
use crate::foundation::error::{VestureError, VestureResult};
use crate::texture::layer::{
    CompositeContext, LAYER_ALPHA_MIN, is_invisible_mask, resolve_net_color, resolve_texture,
};
use crate::texture::mask::{MaskCache, accumulate_layer_mask, mask_fingerprint, resample_mask};
use crate::texture::raster::{BlendMode, Rasterizer};

/// Finished bake output for one region.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BakedTexture {
    /// Surface the bake was produced at.
    pub canvas: CompositeCanvas,
    /// Row-major straight-alpha RGBA8 bytes.
    pub pixels: Vec<u8>,
}

/// Runtime state of one bake region: its immutable layer definitions, a
/// dirty bit, and the most recent bake.
///
/// A clean set returns its cached bake without touching the rasterizer, so
/// repeated composites with unchanged inputs are byte-for-byte identical.
pub struct TextureLayerSet {
    def: LayerSetDefinition,
    dirty: bool,
    baked: Option<BakedTexture>,
}

impl TextureLayerSet {
    /// New set, initially dirty.
    pub fn new(def: LayerSetDefinition) -> Self {
        Self {
            def,
            dirty: true,
            baked: None,
        }
    }

    /// Region name.
    pub fn name(&self) -> &str {
        &self.def.name
    }

    /// The set's immutable definition.
    pub fn definition(&self) -> &LayerSetDefinition {
        &self.def
    }

    /// True when the next composite will re-render.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Force the next composite to re-render.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// The most recent bake, if any.
    pub fn baked(&self) -> Option<&BakedTexture> {
        self.baked.as_ref()
    }

    /// False when any visibility-mask layer resolves to the designated
    /// fully-invisible texture; an invisible set bakes fully transparent.
    pub fn is_visible(&self, ctx: &CompositeContext<'_>) -> bool {
        !self
            .def
            .layers
            .iter()
            .chain(&self.def.mask_layers)
            .any(|layer| is_invisible_mask(layer, ctx, self.def.category))
    }

    /// Composite the set into a bake at `canvas`, reusing the cached bake
    /// when the set is clean and the surface size is unchanged.
    pub fn composite(
        &mut self,
        canvas: CompositeCanvas,
        ctx: &CompositeContext<'_>,
        raster: &mut dyn Rasterizer,
        masks: &mut MaskCache,
    ) -> VestureResult<&BakedTexture> {
        let reusable = !self.dirty && self.baked.as_ref().is_some_and(|b| b.canvas == canvas);
        if !reusable {
            let pixels = self.render(canvas, ctx, raster, masks)?;
            self.baked = Some(BakedTexture { canvas, pixels });
            self.dirty = false;
        }
        match &self.baked {
            Some(baked) => Ok(baked),
            None => Err(VestureError::raster("composite produced no bake")),
        }
    }

    #[tracing::instrument(level = "debug", skip_all, fields(set = %self.def.name))]
    fn render(
        &self,
        canvas: CompositeCanvas,
        ctx: &CompositeContext<'_>,
        raster: &mut dyn Rasterizer,
        masks: &mut MaskCache,
    ) -> VestureResult<Vec<u8>> {
        if !self.is_visible(ctx) {
            tracing::debug!("set hidden by visibility mask");
            return Ok(vec![0u8; canvas.area() * 4]);
        }

        raster.begin(canvas)?;

        for layer in &self.def.layers {
            if layer.render_pass != RenderPass::Color || layer.is_visibility_mask {
                continue;
            }
            self.render_layer(layer, canvas, ctx, raster, masks)?;
        }

        self.finalize_alpha(canvas, ctx, raster, masks)?;
        raster.read_pixels()
    }

    fn render_layer(
        &self,
        layer: &crate::definition::model::LayerDefinition,
        canvas: CompositeCanvas,
        ctx: &CompositeContext<'_>,
        raster: &mut dyn Rasterizer,
        masks: &mut MaskCache,
    ) -> VestureResult<()> {
        let net = resolve_net_color(layer, ctx);
        let color = net.rgba();
        if net.is_explicit() && color.a < LAYER_ALPHA_MIN {
            return Ok(());
        }

        let mut texture = resolve_texture(layer, ctx, self.def.category);
        if let Some(name) = texture
            && !raster.bind_texture(name)
        {
            tracing::warn!(layer = %layer.name, texture = %name, "missing layer texture");
            texture = None;
        }

        if !layer.alpha_sources.is_empty() {
            let key = mask_fingerprint(&self.def.name, layer, ctx, canvas, texture, color.a);
            let mask = masks.get_or_build(key, || {
                accumulate_layer_mask(layer, ctx, canvas, texture, color.a)
            });
            let opaque = Rgba { a: 1.0, ..color };
            return raster.draw_masked_rect(texture, opaque, &mask);
        }

        if let Some(name) = texture {
            let blend = if layer.write_all_channels {
                BlendMode::Replace
            } else {
                BlendMode::Alpha
            };
            return raster.draw_textured_rect(name, color, blend);
        }

        if net.is_explicit() {
            return raster.draw_rect(color, BlendMode::Alpha);
        }

        // Default white with no texture and no alpha sources draws nothing.
        Ok(())
    }

    fn finalize_alpha(
        &self,
        canvas: CompositeCanvas,
        ctx: &CompositeContext<'_>,
        raster: &mut dyn Rasterizer,
        masks: &mut MaskCache,
    ) -> VestureResult<()> {
        let static_alpha = self
            .def
            .static_alpha_image
            .as_deref()
            .and_then(|name| match ctx.images.get_mask_image(name) {
                Some(mask) => Some(mask),
                None => {
                    tracing::warn!(set = %self.def.name, image = %name, "missing static alpha image");
                    None
                }
            });

        if let Some(mask) = static_alpha {
            raster.replace_alpha(&resample_mask(canvas, &mask))?;
        } else if self.def.clear_alpha || !self.def.mask_layers.is_empty() {
            raster.fill_alpha(255)?;
        }

        for layer in &self.def.mask_layers {
            let net = resolve_net_color(layer, ctx);
            let texture = resolve_texture(layer, ctx, self.def.category);
            let key = mask_fingerprint(&self.def.name, layer, ctx, canvas, texture, net.rgba().a);
            let mask = masks.get_or_build(key, || {
                accumulate_layer_mask(layer, ctx, canvas, texture, net.rgba().a)
            });
            raster.multiply_alpha(&mask)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/texture/set.rs"]
mod tests;
