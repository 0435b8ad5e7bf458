use crate::definition::model::{ParameterDefinition, WearableCategory};
use crate::foundation::core::{ParamId, Sex, SexMask};
use crate::foundation::math::quantize_weight;

/// A live, weighted scalar controlling one aspect of appearance.
///
/// Parameters exist in two places: the shared registry, and as private
/// clones owned by wearables of the matching category. Both are constructed
/// from the same immutable [`ParameterDefinition`]; a clone is always built
/// through [`Parameter::clone_for`], never by copying and patching fields.
#[derive(Clone, Debug, PartialEq)]
pub struct Parameter {
    id: ParamId,
    name: String,
    category: WearableCategory,
    min_weight: f32,
    max_weight: f32,
    default_weight: f32,
    sex: SexMask,
    current_weight: f32,
    target_weight: f32,
    is_animating: bool,
}

impl Parameter {
    /// Build a fresh parameter at its default weight.
    pub fn from_definition(def: &ParameterDefinition) -> Self {
        Self {
            id: def.id,
            name: def.name.clone(),
            category: def.category,
            min_weight: def.min_weight,
            max_weight: def.max_weight,
            default_weight: def.default_weight,
            sex: def.sex,
            current_weight: def.default_weight,
            target_weight: def.default_weight,
            is_animating: false,
        }
    }

    /// Construct an independent clone owned by `new_owner`.
    ///
    /// The clone carries the same definition bounds and the current weight
    /// state, but no hidden back-references to the source.
    pub fn clone_for(&self, new_owner: WearableCategory) -> Self {
        Self {
            category: new_owner,
            name: self.name.clone(),
            ..*self
        }
    }

    /// Stable id.
    pub fn id(&self) -> ParamId {
        self.id
    }

    /// Authoring name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Owning category.
    pub fn category(&self) -> WearableCategory {
        self.category
    }

    /// Lower weight bound.
    pub fn min_weight(&self) -> f32 {
        self.min_weight
    }

    /// Upper weight bound.
    pub fn max_weight(&self) -> f32 {
        self.max_weight
    }

    /// Default weight.
    pub fn default_weight(&self) -> f32 {
        self.default_weight
    }

    /// True while an animated transition toward [`Parameter::target_weight`]
    /// is in flight.
    pub fn is_animating(&self) -> bool {
        self.is_animating
    }

    /// Animation target weight.
    pub fn target_weight(&self) -> f32 {
        self.target_weight
    }

    /// The applied weight. Stays inside `[min, max]` unless animating.
    pub fn current_weight(&self) -> f32 {
        self.current_weight
    }

    /// The weight readers should consume: the target while animating,
    /// otherwise the current weight.
    pub fn weight(&self) -> f32 {
        if self.is_animating {
            self.target_weight
        } else {
            self.current_weight
        }
    }

    /// Set the weight. Returns `false` without mutating when the weight is
    /// unchanged, so callers can skip redundant downstream recompute.
    ///
    /// When not animating the weight clamps to `[min, max]` and sub-step
    /// changes collapse through the quantized no-op check. While animating
    /// the weight applies exactly as given (overshoot included), so
    /// consecutive distinct targets always register.
    pub fn set_weight(&mut self, w: f32) -> bool {
        if self.is_animating {
            if self.current_weight.to_bits() == w.to_bits() {
                return false;
            }
            self.current_weight = w;
            return true;
        }
        let w = w.clamp(self.min_weight, self.max_weight);
        let before = quantize_weight(self.current_weight, self.min_weight, self.max_weight);
        let after = quantize_weight(w, self.min_weight, self.max_weight);
        if before == after && self.current_weight.is_finite() {
            return false;
        }
        self.current_weight = w;
        true
    }

    /// Set the weight exactly, bypassing the quantized no-op check, so a
    /// saved weight restores bit-for-bit even when it sits within one
    /// quantization step of the current value.
    pub fn restore_weight(&mut self, w: f32) {
        self.current_weight = w.clamp(self.min_weight, self.max_weight);
    }

    /// Begin animating toward `w`: records the target, applies it
    /// immediately (unclamped, permitting transient overshoot), and raises
    /// the animating flag.
    pub fn set_animation_target(&mut self, w: f32) -> bool {
        self.target_weight = w;
        self.is_animating = true;
        self.set_weight(w)
    }

    /// Stop animating and restore the in-range invariant.
    pub fn stop_animating(&mut self) {
        if self.is_animating {
            self.is_animating = false;
            self.current_weight = self.current_weight.clamp(self.min_weight, self.max_weight);
        }
    }

    /// The weight driven-value computations must use: the readable weight if
    /// the sex mask matches `sex`, else the default weight. Parameters
    /// inapplicable to the character's sex behave as constants.
    pub fn effective_weight(&self, sex: Sex) -> f32 {
        if self.sex.matches(sex) {
            self.weight()
        } else {
            self.default_weight
        }
    }

    /// Effective weight normalized onto `[0, 1]` across `[min, max]`.
    pub fn normalized_effective(&self, sex: Sex) -> f32 {
        let span = self.max_weight - self.min_weight;
        if span <= f32::EPSILON {
            return 0.0;
        }
        ((self.effective_weight(sex) - self.min_weight) / span).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/param/model.rs"]
mod tests;
