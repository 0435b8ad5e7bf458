use crate::definition::model::{ColorOp, ColorParamDefinition, GlobalColorDefinition};
use crate::foundation::core::{ParamId, Rgba};

/// Fold a weighted color-parameter chain into one color.
///
/// `weight_of` supplies each parameter's normalized effective weight in
/// `[0, 1]`; parameters it cannot answer for contribute at weight 0. Each
/// operation is neutral at weight 0 and contributes the parameter's full
/// color at weight 1, so an undriven chain resolves to `base`.
pub fn fold_color_params(
    op: ColorOp,
    params: &[ColorParamDefinition],
    base: Rgba,
    mut weight_of: impl FnMut(ParamId) -> Option<f32>,
) -> Rgba {
    let mut acc = base;
    for cp in params {
        let w = weight_of(cp.id).unwrap_or(0.0).clamp(0.0, 1.0);
        acc = match op {
            ColorOp::Add => acc.add(cp.color.scaled(w)),
            ColorOp::Multiply => acc.modulate(Rgba::WHITE.lerp(cp.color, w)),
            ColorOp::Blend => acc.lerp(cp.color, w),
        };
    }
    acc.clamped()
}

/// The neutral starting value for a fold operation.
pub fn fold_base(op: ColorOp) -> Rgba {
    match op {
        ColorOp::Add => Rgba::TRANSPARENT,
        ColorOp::Multiply | ColorOp::Blend => Rgba::WHITE,
    }
}

/// An avatar-wide derived color (skin, hair, eye base color) computed from
/// a list of color parameters.
#[derive(Clone, Debug)]
pub struct GlobalColor {
    def: GlobalColorDefinition,
    current: Rgba,
}

impl GlobalColor {
    /// Build from a definition; starts at the fold's neutral base.
    pub fn new(def: GlobalColorDefinition) -> Self {
        let current = fold_base(def.op);
        Self { def, current }
    }

    /// Name referenced by layer color sources.
    pub fn name(&self) -> &str {
        &self.def.name
    }

    /// The most recently computed color.
    pub fn color(&self) -> Rgba {
        self.current
    }

    /// Recompute from current parameter weights. Returns true when the
    /// color changed, so dependent layer sets can be marked dirty.
    pub fn update(&mut self, weight_of: impl FnMut(ParamId) -> Option<f32>) -> bool {
        let next = fold_color_params(self.def.op, &self.def.params, fold_base(self.def.op), weight_of);
        if next == self.current {
            return false;
        }
        self.current = next;
        true
    }
}
