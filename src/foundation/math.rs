//! Fingerprint hashing, u8 blend arithmetic, and weight quantization.

#[derive(Clone, Copy, Debug)]
pub(crate) struct Fnv1a64(u64);

impl Fnv1a64 {
    pub(crate) const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    pub(crate) const ALT_BASIS: u64 = 0x9e37_79b9_7f4a_7c15;
    const PRIME: u64 = 0x0000_0100_0000_01B3;

    pub(crate) fn new_default() -> Self {
        Self(Self::OFFSET_BASIS)
    }

    pub(crate) fn with_seed(seed: u64) -> Self {
        Self(seed)
    }

    pub(crate) fn write_u8(&mut self, v: u8) {
        self.write_bytes(&[v]);
    }

    pub(crate) fn write_u32(&mut self, v: u32) {
        self.write_bytes(&v.to_le_bytes());
    }

    pub(crate) fn write_i32(&mut self, v: i32) {
        self.write_u32(v as u32);
    }

    pub(crate) fn write_f32_bits(&mut self, v: f32) {
        self.write_u32(v.to_bits());
    }

    pub(crate) fn write_bytes(&mut self, bytes: &[u8]) {
        let mut h = self.0;
        for &b in bytes {
            h ^= u64::from(b);
            h = h.wrapping_mul(Self::PRIME);
        }
        self.0 = h;
    }

    pub(crate) fn finish(self) -> u64 {
        self.0
    }
}

/// `(x * y + 127) / 255` over u8-range operands, the exact-rounding byte multiply.
pub(crate) fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

/// Quantize `w` onto 255 steps across `[min, max]`.
///
/// Weight changes smaller than one step are treated as no-ops by
/// [`crate::Parameter::set_weight`] so downstream recompute is skipped.
/// A zero-width range quantizes everything to step 0.
pub(crate) fn quantize_weight(w: f32, min: f32, max: f32) -> u8 {
    let span = max - min;
    if span <= f32::EPSILON {
        return 0;
    }
    let t = ((w - min) / span).clamp(0.0, 1.0);
    (t * 255.0).round() as u8
}
