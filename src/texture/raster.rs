use std::sync::Arc;

use crate::foundation::core::{CompositeCanvas, Rgba};
use crate::foundation::error::{VestureError, VestureResult};
use crate::foundation::math::mul_div255;
use crate::texture::images::StaticImageCache;

/// Blend mode for full-rect draws into the bake surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlendMode {
    /// Source-over with straight alpha.
    Alpha,
    /// Saturating add, scaled by source alpha.
    Add,
    /// Component-wise multiply.
    Multiply,
    /// Replace all channels.
    Replace,
}

/// The drawing interface the compositor targets.
///
/// The core decides what to draw and in what order/blend mode; producing
/// pixels is the implementor's job. All draws cover the full bake surface.
pub trait Rasterizer {
    /// Start a bake surface cleared to transparent black.
    fn begin(&mut self, canvas: CompositeCanvas) -> VestureResult<()>;

    /// True when the named texture is available for drawing.
    fn bind_texture(&mut self, name: &str) -> bool;

    /// Fill the surface with a flat color.
    fn draw_rect(&mut self, color: Rgba, blend: BlendMode) -> VestureResult<()>;

    /// Draw the named texture stretched over the surface, tinted by `tint`.
    fn draw_textured_rect(
        &mut self,
        texture: &str,
        tint: Rgba,
        blend: BlendMode,
    ) -> VestureResult<()>;

    /// Draw a color (optionally textured) gated by a per-pixel coverage
    /// mask: destination-alpha, one-minus-destination-alpha semantics with
    /// `mask` standing in for the destination alpha. Leaves surface alpha
    /// untouched.
    fn draw_masked_rect(
        &mut self,
        texture: Option<&str>,
        tint: Rgba,
        mask: &[u8],
    ) -> VestureResult<()>;

    /// Set every alpha byte to `value`.
    fn fill_alpha(&mut self, value: u8) -> VestureResult<()>;

    /// Replace surface alpha from a single-channel buffer.
    fn replace_alpha(&mut self, alpha: &[u8]) -> VestureResult<()>;

    /// Multiply surface alpha by a single-channel buffer.
    fn multiply_alpha(&mut self, alpha: &[u8]) -> VestureResult<()>;

    /// Read back the surface alpha channel.
    fn read_alpha_channel(&self) -> VestureResult<Vec<u8>>;

    /// Read back the full RGBA8 surface.
    fn read_pixels(&self) -> VestureResult<Vec<u8>>;
}

/// CPU reference rasterizer over a straight-alpha RGBA8 surface.
pub struct CpuRasterizer {
    images: Arc<dyn StaticImageCache>,
    canvas: Option<CompositeCanvas>,
    pixels: Vec<u8>,
}

impl CpuRasterizer {
    /// Build a rasterizer sourcing textures from `images`.
    pub fn new(images: Arc<dyn StaticImageCache>) -> Self {
        Self {
            images,
            canvas: None,
            pixels: Vec::new(),
        }
    }

    fn canvas(&self) -> VestureResult<CompositeCanvas> {
        self.canvas
            .ok_or_else(|| VestureError::raster("no active bake surface; call begin first"))
    }

    fn check_channel_len(&self, len: usize) -> VestureResult<CompositeCanvas> {
        let canvas = self.canvas()?;
        if len != canvas.area() {
            return Err(VestureError::raster(format!(
                "channel buffer length {len} does not match surface area {}",
                canvas.area()
            )));
        }
        Ok(canvas)
    }

    fn blend_pixel(dst: &mut [u8], src: [u8; 4], blend: BlendMode) {
        match blend {
            BlendMode::Alpha => {
                let sa = u16::from(src[3]);
                let inv = 255 - sa;
                for i in 0..3 {
                    dst[i] = mul_div255(u16::from(src[i]), sa)
                        .saturating_add(mul_div255(u16::from(dst[i]), inv));
                }
                dst[3] = (sa as u8).saturating_add(mul_div255(u16::from(dst[3]), inv));
            }
            BlendMode::Add => {
                let sa = u16::from(src[3]);
                for i in 0..3 {
                    dst[i] = dst[i].saturating_add(mul_div255(u16::from(src[i]), sa));
                }
                dst[3] = dst[3].saturating_add(src[3]);
            }
            BlendMode::Multiply => {
                for i in 0..4 {
                    dst[i] = mul_div255(u16::from(dst[i]), u16::from(src[i]));
                }
            }
            BlendMode::Replace => {
                dst.copy_from_slice(&src);
            }
        }
    }

    fn tinted(texel: [u8; 4], tint: [u8; 4]) -> [u8; 4] {
        [
            mul_div255(u16::from(texel[0]), u16::from(tint[0])),
            mul_div255(u16::from(texel[1]), u16::from(tint[1])),
            mul_div255(u16::from(texel[2]), u16::from(tint[2])),
            mul_div255(u16::from(texel[3]), u16::from(tint[3])),
        ]
    }
}

impl Rasterizer for CpuRasterizer {
    fn begin(&mut self, canvas: CompositeCanvas) -> VestureResult<()> {
        self.pixels.clear();
        self.pixels.resize(canvas.area() * 4, 0);
        self.canvas = Some(canvas);
        Ok(())
    }

    fn bind_texture(&mut self, name: &str) -> bool {
        self.images.get_image(name).is_some()
    }

    fn draw_rect(&mut self, color: Rgba, blend: BlendMode) -> VestureResult<()> {
        self.canvas()?;
        let src = color.to_rgba8();
        for px in self.pixels.chunks_exact_mut(4) {
            Self::blend_pixel(px, src, blend);
        }
        Ok(())
    }

    fn draw_textured_rect(
        &mut self,
        texture: &str,
        tint: Rgba,
        blend: BlendMode,
    ) -> VestureResult<()> {
        let canvas = self.canvas()?;
        let image = self
            .images
            .get_image(texture)
            .ok_or_else(|| VestureError::raster(format!("unknown texture '{texture}'")))?;
        let tint = tint.to_rgba8();
        let (w, h) = (canvas.width as usize, canvas.height as usize);
        for y in 0..h {
            let v = y as f32 / h as f32;
            for x in 0..w {
                let u = x as f32 / w as f32;
                let src = Self::tinted(image.sample(u, v), tint);
                let i = (y * w + x) * 4;
                Self::blend_pixel(&mut self.pixels[i..i + 4], src, blend);
            }
        }
        Ok(())
    }

    fn draw_masked_rect(
        &mut self,
        texture: Option<&str>,
        tint: Rgba,
        mask: &[u8],
    ) -> VestureResult<()> {
        let canvas = self.check_channel_len(mask.len())?;
        let image = match texture {
            Some(name) => Some(
                self.images
                    .get_image(name)
                    .ok_or_else(|| VestureError::raster(format!("unknown texture '{name}'")))?,
            ),
            None => None,
        };
        let tint = tint.to_rgba8();
        let (w, h) = (canvas.width as usize, canvas.height as usize);
        for y in 0..h {
            let v = y as f32 / h as f32;
            for x in 0..w {
                let u = x as f32 / w as f32;
                let src = match &image {
                    Some(img) => Self::tinted(img.sample(u, v), tint),
                    None => tint,
                };
                let idx = y * w + x;
                let cov = u16::from(mask[idx]);
                let inv = 255 - cov;
                let px = &mut self.pixels[idx * 4..idx * 4 + 4];
                for i in 0..3 {
                    px[i] = mul_div255(u16::from(src[i]), cov)
                        .saturating_add(mul_div255(u16::from(px[i]), inv));
                }
                // Alpha is finalized by a later pass; gated draws leave it.
            }
        }
        Ok(())
    }

    fn fill_alpha(&mut self, value: u8) -> VestureResult<()> {
        self.canvas()?;
        for px in self.pixels.chunks_exact_mut(4) {
            px[3] = value;
        }
        Ok(())
    }

    fn replace_alpha(&mut self, alpha: &[u8]) -> VestureResult<()> {
        self.check_channel_len(alpha.len())?;
        for (px, &a) in self.pixels.chunks_exact_mut(4).zip(alpha) {
            px[3] = a;
        }
        Ok(())
    }

    fn multiply_alpha(&mut self, alpha: &[u8]) -> VestureResult<()> {
        self.check_channel_len(alpha.len())?;
        for (px, &a) in self.pixels.chunks_exact_mut(4).zip(alpha) {
            px[3] = mul_div255(u16::from(px[3]), u16::from(a));
        }
        Ok(())
    }

    fn read_alpha_channel(&self) -> VestureResult<Vec<u8>> {
        self.canvas()?;
        Ok(self.pixels.chunks_exact(4).map(|px| px[3]).collect())
    }

    fn read_pixels(&self) -> VestureResult<Vec<u8>> {
        self.canvas()?;
        Ok(self.pixels.clone())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/texture/raster.rs"]
mod tests;
