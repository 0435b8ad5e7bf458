use crate::foundation::error::{VestureError, VestureResult};

/// Stable identifier of a visual parameter, unique across categories.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct ParamId(pub i32);

/// Character sex used when resolving effective parameter weights.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Sex {
    /// Female character.
    Female,
    /// Male character.
    Male,
}

/// Which character sexes a parameter applies to.
///
/// A parameter whose mask does not match the character's sex behaves as a
/// constant at its default weight (see [`crate::Parameter::effective_weight`]).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SexMask {
    /// Applies to female characters only.
    Female,
    /// Applies to male characters only.
    Male,
    /// Applies to all characters.
    #[default]
    Both,
}

impl SexMask {
    /// True if this mask applies to `sex`.
    pub fn matches(self, sex: Sex) -> bool {
        match self {
            SexMask::Both => true,
            SexMask::Female => sex == Sex::Female,
            SexMask::Male => sex == Sex::Male,
        }
    }
}

/// Straight-alpha RGBA color with `f32` components in `[0, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Rgba {
    /// Red component.
    pub r: f32,
    /// Green component.
    pub g: f32,
    /// Blue component.
    pub b: f32,
    /// Alpha component.
    pub a: f32,
}

impl Rgba {
    /// Opaque white.
    pub const WHITE: Rgba = Rgba {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };

    /// Fully transparent black.
    pub const TRANSPARENT: Rgba = Rgba {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };

    /// Construct a color from raw components (not clamped).
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Component-wise sum, used by the `Add` color-parameter fold.
    pub fn add(self, other: Rgba) -> Rgba {
        Rgba::new(
            self.r + other.r,
            self.g + other.g,
            self.b + other.b,
            self.a + other.a,
        )
    }

    /// Component-wise product, used by the `Multiply` color-parameter fold.
    pub fn modulate(self, other: Rgba) -> Rgba {
        Rgba::new(
            self.r * other.r,
            self.g * other.g,
            self.b * other.b,
            self.a * other.a,
        )
    }

    /// Linear interpolation toward `other` by `t`, used by the `Blend` fold.
    pub fn lerp(self, other: Rgba, t: f32) -> Rgba {
        Rgba::new(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
            self.a + (other.a - self.a) * t,
        )
    }

    /// Scale all components by `s`.
    pub fn scaled(self, s: f32) -> Rgba {
        Rgba::new(self.r * s, self.g * s, self.b * s, self.a * s)
    }

    /// Clamp every component to `[0, 1]`.
    pub fn clamped(self) -> Rgba {
        Rgba::new(
            self.r.clamp(0.0, 1.0),
            self.g.clamp(0.0, 1.0),
            self.b.clamp(0.0, 1.0),
            self.a.clamp(0.0, 1.0),
        )
    }

    /// Convert to straight-alpha RGBA8 bytes with exact rounding.
    pub fn to_rgba8(self) -> [u8; 4] {
        fn c(v: f32) -> u8 {
            (v.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        [c(self.r), c(self.g), c(self.b), c(self.a)]
    }

    /// Build from straight-alpha RGBA8 bytes.
    pub fn from_rgba8(px: [u8; 4]) -> Self {
        Rgba::new(
            f32::from(px[0]) / 255.0,
            f32::from(px[1]) / 255.0,
            f32::from(px[2]) / 255.0,
            f32::from(px[3]) / 255.0,
        )
    }
}

/// Dimensions of a bake target surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CompositeCanvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl CompositeCanvas {
    /// Construct a canvas, rejecting zero dimensions.
    pub fn new(width: u32, height: u32) -> VestureResult<Self> {
        if width == 0 || height == 0 {
            return Err(VestureError::raster("canvas width/height must be > 0"));
        }
        Ok(Self { width, height })
    }

    /// Pixel count.
    pub fn area(self) -> usize {
        self.width as usize * self.height as usize
    }
}
