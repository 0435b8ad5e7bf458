use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;

use crate::foundation::error::{VestureError, VestureResult};

/// A decoded straight-alpha RGBA8 image.
#[derive(Clone, Debug)]
pub struct ImageBuffer {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major RGBA8 bytes.
    pub rgba8: Arc<Vec<u8>>,
}

impl ImageBuffer {
    /// Sample with nearest-neighbor at normalized coordinates.
    pub fn sample(&self, u: f32, v: f32) -> [u8; 4] {
        let x = ((u * self.width as f32) as u32).min(self.width.saturating_sub(1));
        let y = ((v * self.height as f32) as u32).min(self.height.saturating_sub(1));
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.rgba8[i],
            self.rgba8[i + 1],
            self.rgba8[i + 2],
            self.rgba8[i + 3],
        ]
    }
}

/// A decoded single-channel greyscale image used as an alpha mask source.
#[derive(Clone, Debug)]
pub struct MaskBuffer {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major greyscale bytes.
    pub grey: Arc<Vec<u8>>,
}

impl MaskBuffer {
    /// Sample with nearest-neighbor at normalized coordinates.
    pub fn sample(&self, u: f32, v: f32) -> u8 {
        let x = ((u * self.width as f32) as u32).min(self.width.saturating_sub(1));
        let y = ((v * self.height as f32) as u32).min(self.height.saturating_sub(1));
        self.grey[y as usize * self.width as usize + x as usize]
    }
}

/// Source of named static images and greyscale masks.
///
/// The core never performs IO during compositing; implementations are
/// expected to front-load decoding.
pub trait StaticImageCache {
    /// Lookup a color image by name.
    fn get_image(&self, name: &str) -> Option<ImageBuffer>;

    /// Lookup a greyscale mask by name.
    fn get_mask_image(&self, name: &str) -> Option<MaskBuffer>;
}

/// In-memory image cache used by hosts that procure pixels themselves and
/// by tests.
#[derive(Clone, Debug, Default)]
pub struct MemoryImageCache {
    images: HashMap<String, ImageBuffer>,
    masks: HashMap<String, MaskBuffer>,
}

impl MemoryImageCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a color image.
    pub fn insert_image(&mut self, name: impl Into<String>, width: u32, height: u32, rgba8: Vec<u8>) {
        self.images.insert(
            name.into(),
            ImageBuffer {
                width,
                height,
                rgba8: Arc::new(rgba8),
            },
        );
    }

    /// Insert a greyscale mask.
    pub fn insert_mask(&mut self, name: impl Into<String>, width: u32, height: u32, grey: Vec<u8>) {
        self.masks.insert(
            name.into(),
            MaskBuffer {
                width,
                height,
                grey: Arc::new(grey),
            },
        );
    }
}

impl StaticImageCache for MemoryImageCache {
    fn get_image(&self, name: &str) -> Option<ImageBuffer> {
        self.images.get(name).cloned()
    }

    fn get_mask_image(&self, name: &str) -> Option<MaskBuffer> {
        self.masks.get(name).cloned()
    }
}

/// File-backed image cache that decodes every named image up front with the
/// `image` crate, so composite passes stay deterministic and IO-free.
#[derive(Clone, Debug)]
pub struct FileImageCache {
    root: PathBuf,
    inner: MemoryImageCache,
}

impl FileImageCache {
    /// Decode `names` (relative paths under `root`) into memory. Color and
    /// mask variants are both prepared for every name; greyscale masks are
    /// taken from the decoded image's luma.
    pub fn prepare(root: impl Into<PathBuf>, names: &[String]) -> VestureResult<Self> {
        let root = root.into();
        let mut inner = MemoryImageCache::new();
        for name in names {
            let path = root.join(Path::new(name));
            let bytes = std::fs::read(&path)
                .with_context(|| format!("read image bytes from '{}'", path.display()))
                .map_err(VestureError::from)?;
            let decoded = image::load_from_memory(&bytes)
                .with_context(|| format!("decode image '{name}'"))
                .map_err(VestureError::from)?;

            let rgba = decoded.to_rgba8();
            let (w, h) = rgba.dimensions();
            inner.insert_image(name.clone(), w, h, rgba.into_raw());

            let grey = decoded.to_luma8();
            inner.insert_mask(name.clone(), w, h, grey.into_raw());
        }
        Ok(Self { root, inner })
    }

    /// Root directory images were loaded from.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl StaticImageCache for FileImageCache {
    fn get_image(&self, name: &str) -> Option<ImageBuffer> {
        self.inner.get_image(name)
    }

    fn get_mask_image(&self, name: &str) -> Option<MaskBuffer> {
        self.inner.get_mask_image(name)
    }
}
