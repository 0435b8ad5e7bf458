use std::collections::BTreeMap;

use crate::definition::model::{AppearanceConfig, WearableCategory};
use crate::foundation::core::{ParamId, Sex};
use crate::foundation::error::{VestureError, VestureResult};
use crate::param::model::Parameter;

/// Shared store of live parameters, one per definition id.
///
/// Built once from an [`AppearanceConfig`]; wearables clone the subset
/// matching their category out of this registry at construction.
#[derive(Clone, Debug)]
pub struct ParameterRegistry {
    params: BTreeMap<ParamId, Parameter>,
}

impl ParameterRegistry {
    /// Build the registry from validated definitions.
    pub fn from_config(config: &AppearanceConfig) -> Self {
        let params = config
            .parameters
            .iter()
            .map(|def| (def.id, Parameter::from_definition(def)))
            .collect();
        Self { params }
    }

    /// Number of registered parameters.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// True when no parameters are registered.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Borrow a parameter by id.
    pub fn get(&self, id: ParamId) -> Option<&Parameter> {
        self.params.get(&id)
    }

    /// Mutably borrow a parameter by id.
    pub fn get_mut(&mut self, id: ParamId) -> Option<&mut Parameter> {
        self.params.get_mut(&id)
    }

    /// Iterate parameters in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.params.values()
    }

    /// Iterate parameters belonging to `category`, in id order.
    pub fn iter_category(&self, category: WearableCategory) -> impl Iterator<Item = &Parameter> {
        self.params
            .values()
            .filter(move |p| p.category() == category)
    }

    /// Set a parameter's weight. Returns whether the quantized weight
    /// changed. Unknown ids are hard errors: registry ids come from the
    /// validated config, so a miss is caller misuse, not data drift.
    pub fn set_weight(&mut self, id: ParamId, w: f32) -> VestureResult<bool> {
        self.params
            .get_mut(&id)
            .map(|p| p.set_weight(w))
            .ok_or_else(|| VestureError::link(format!("unknown parameter id {}", id.0)))
    }

    /// Begin animating a parameter toward `w`.
    pub fn set_animation_target(&mut self, id: ParamId, w: f32) -> VestureResult<bool> {
        self.params
            .get_mut(&id)
            .map(|p| p.set_animation_target(w))
            .ok_or_else(|| VestureError::link(format!("unknown parameter id {}", id.0)))
    }

    /// Stop animating a parameter.
    pub fn stop_animating(&mut self, id: ParamId) -> VestureResult<()> {
        self.params
            .get_mut(&id)
            .map(|p| p.stop_animating())
            .ok_or_else(|| VestureError::link(format!("unknown parameter id {}", id.0)))
    }

    /// Effective weight of a parameter for a character of `sex`.
    pub fn effective_weight(&self, id: ParamId, sex: Sex) -> Option<f32> {
        self.params.get(&id).map(|p| p.effective_weight(sex))
    }
}
