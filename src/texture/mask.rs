//! Alpha mask accumulation and the bounded per-bake mask cache.
//!
//! A layer's coverage mask folds its alpha parameter sources (static
//! greyscale images swept by a weight, or flat weight fills) together,
//! then multiplies in the layer texture's own alpha and the net color
//! alpha. Accumulated masks are cached by a fingerprint over everything
//! that feeds them, so repeated bakes with unchanged inputs reuse bytes.

use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::Arc;

use crate::definition::model::{AlphaParamDefinition, LayerDefinition, MaskBlend};
use crate::foundation::core::CompositeCanvas;
use crate::foundation::math::{Fnv1a64, mul_div255};
use crate::texture::images::MaskBuffer;
use crate::texture::layer::CompositeContext;

/// Sweep a mask sample against a weight.
///
/// `domain` widens the transition band: at zero the sweep is a hard
/// threshold (samples at or above `1 - weight` pass fully), and a positive
/// domain ramps coverage linearly over that band.
fn sweep(sample: u8, weight: f32, domain: f32) -> u8 {
    let m = f32::from(sample) / 255.0;
    let edge = 1.0 - weight.clamp(0.0, 1.0);
    let coverage = if domain <= 0.0 {
        if m >= edge { 1.0 } else { 0.0 }
    } else {
        ((m - edge) / domain).clamp(0.0, 1.0)
    };
    (coverage * 255.0).round() as u8
}

fn blend_into(dst: &mut [u8], blend: MaskBlend, src: impl Fn(usize) -> u8) {
    match blend {
        MaskBlend::Multiply => {
            for (i, d) in dst.iter_mut().enumerate() {
                *d = mul_div255(u16::from(*d), u16::from(src(i)));
            }
        }
        MaskBlend::Add => {
            for (i, d) in dst.iter_mut().enumerate() {
                *d = d.saturating_add(src(i));
            }
        }
    }
}

/// Resample a greyscale image to one byte per canvas pixel.
pub fn resample_mask(canvas: CompositeCanvas, mask: &MaskBuffer) -> Vec<u8> {
    let (w, h) = (canvas.width as usize, canvas.height as usize);
    let mut out = vec![0u8; canvas.area()];
    for y in 0..h {
        let v = y as f32 / h as f32;
        for x in 0..w {
            let u = x as f32 / w as f32;
            out[y * w + x] = mask.sample(u, v);
        }
    }
    out
}

/// Accumulate a layer's coverage mask over the canvas.
///
/// The buffer starts fully opaque; when the first source does not blend
/// multiplicatively it is cleared to zero first so additive sources build
/// coverage up from nothing. A missing static mask image contributes
/// nothing and is reported once per accumulation.
pub fn accumulate_layer_mask(
    layer: &LayerDefinition,
    ctx: &CompositeContext<'_>,
    canvas: CompositeCanvas,
    texture: Option<&str>,
    net_alpha: f32,
) -> Vec<u8> {
    let mut out = vec![255u8; canvas.area()];

    for (i, source) in layer.alpha_sources.iter().enumerate() {
        if i == 0 && source.blend != MaskBlend::Multiply {
            out.fill(0);
        }
        let weight = ctx.normalized_weight(source.id).unwrap_or(0.0);
        match &source.static_mask {
            Some(name) => match ctx.images.get_mask_image(name) {
                Some(mask) => {
                    let samples = resample_mask(canvas, &mask);
                    let invert = source.invert;
                    let domain = source.domain;
                    blend_into(&mut out, source.blend, |i| {
                        let s = if invert { 255 - samples[i] } else { samples[i] };
                        sweep(s, weight, domain)
                    });
                }
                None => {
                    tracing::warn!(layer = %layer.name, mask = %name, "missing alpha mask image");
                }
            },
            None => {
                // No image: the weight itself is the coverage.
                let flat = (weight.clamp(0.0, 1.0) * 255.0).round() as u8;
                let flat = if source.invert { 255 - flat } else { flat };
                blend_into(&mut out, source.blend, |_| flat);
            }
        }
    }

    if let Some(name) = texture
        && let Some(image) = ctx.images.get_image(name)
    {
        let (w, h) = (canvas.width as usize, canvas.height as usize);
        for y in 0..h {
            let v = y as f32 / h as f32;
            for x in 0..w {
                let u = x as f32 / w as f32;
                let a = image.sample(u, v)[3];
                let d = &mut out[y * w + x];
                *d = mul_div255(u16::from(*d), u16::from(a));
            }
        }
    }

    if net_alpha < 1.0 {
        let a = (net_alpha.clamp(0.0, 1.0) * 255.0).round() as u16;
        for d in &mut out {
            *d = mul_div255(u16::from(*d), a);
        }
    }

    out
}

fn hash_alpha_source(h: &mut Fnv1a64, source: &AlphaParamDefinition, weight: f32) {
    h.write_i32(source.id.0);
    h.write_f32_bits(weight);
    h.write_f32_bits(source.domain);
    h.write_u8(u8::from(source.invert));
    h.write_u8(match source.blend {
        MaskBlend::Multiply => 0,
        MaskBlend::Add => 1,
    });
    match &source.static_mask {
        Some(name) => h.write_bytes(name.as_bytes()),
        None => h.write_u8(0),
    }
}

fn write_mask_inputs(
    h: &mut Fnv1a64,
    set_name: &str,
    layer: &LayerDefinition,
    ctx: &CompositeContext<'_>,
    canvas: CompositeCanvas,
    texture: Option<&str>,
    net_alpha: f32,
) {
    h.write_bytes(set_name.as_bytes());
    h.write_bytes(layer.name.as_bytes());
    h.write_u32(canvas.width);
    h.write_u32(canvas.height);
    for source in &layer.alpha_sources {
        let weight = ctx.normalized_weight(source.id).unwrap_or(0.0);
        hash_alpha_source(h, source, weight);
    }
    match texture {
        Some(name) => h.write_bytes(name.as_bytes()),
        None => h.write_u8(0),
    }
    h.write_f32_bits(net_alpha);
}

/// Fingerprint of every input that feeds a layer's accumulated mask.
///
/// The key packs two independently seeded 64-bit hashes of the same
/// input stream, so a collision requires both halves to collide at once.
pub fn mask_fingerprint(
    set_name: &str,
    layer: &LayerDefinition,
    ctx: &CompositeContext<'_>,
    canvas: CompositeCanvas,
    texture: Option<&str>,
    net_alpha: f32,
) -> u128 {
    let mut hi = Fnv1a64::new_default();
    let mut lo = Fnv1a64::with_seed(Fnv1a64::ALT_BASIS);
    write_mask_inputs(&mut hi, set_name, layer, ctx, canvas, texture, net_alpha);
    write_mask_inputs(&mut lo, set_name, layer, ctx, canvas, texture, net_alpha);
    (u128::from(hi.finish()) << 64) | u128::from(lo.finish())
}

/// Bounded cache of accumulated masks, keyed by [`mask_fingerprint`].
///
/// Eviction is oldest-insertion-first. The capacity is small by intent:
/// masks are cheap to rebuild and the cache exists to make steady-state
/// rebakes byte-for-byte reuses, not to hold history.
pub struct MaskCache {
    capacity: usize,
    entries: HashMap<u128, Arc<Vec<u8>>>,
    order: VecDeque<u128>,
}

impl MaskCache {
    /// Cache slots reserved for the locally controlled character.
    pub const SELF_CAPACITY: usize = 4;
    /// Cache slots for remotely observed characters.
    pub const OTHER_CAPACITY: usize = 1;

    /// Cache bounded to `capacity` entries; a zero capacity disables reuse.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    /// Number of cached masks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fetch the mask for `key`, building and inserting it on a miss.
    pub fn get_or_build(&mut self, key: u128, build: impl FnOnce() -> Vec<u8>) -> Arc<Vec<u8>> {
        if let Some(found) = self.entries.get(&key) {
            return Arc::clone(found);
        }
        let built = Arc::new(build());
        if self.capacity == 0 {
            return built;
        }
        while self.entries.len() >= self.capacity {
            match self.order.pop_front() {
                Some(oldest) => {
                    self.entries.remove(&oldest);
                }
                None => break,
            }
        }
        self.entries.insert(key, Arc::clone(&built));
        self.order.push_back(key);
        built
    }
}

#[cfg(test)]
#[path = "../../tests/unit/texture/mask.rs"]
mod tests;
