use std::collections::BTreeMap;

use crate::definition::model::WearableCategory;
use crate::foundation::core::ParamId;
use crate::param::model::Parameter;
use crate::param::registry::ParameterRegistry;

/// A texture carried in one of a wearable's slots, by image name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocalTexture {
    /// Image name resolved through the static image cache / rasterizer.
    pub image: String,
}

/// An ordered item within one appearance category, owning a private clone
/// of every registry parameter applicable to that category plus a table of
/// local textures.
#[derive(Clone, Debug)]
pub struct Wearable {
    category: WearableCategory,
    params: BTreeMap<ParamId, Parameter>,
    texture_slots: BTreeMap<u32, LocalTexture>,
    saved_weights: BTreeMap<ParamId, f32>,
}

impl Wearable {
    /// Create a wearable for `category`, cloning every matching registry
    /// parameter through [`Parameter::clone_for`]. The initial weights are
    /// immediately recorded as the saved baseline.
    pub fn new(category: WearableCategory, registry: &ParameterRegistry) -> Self {
        let params: BTreeMap<ParamId, Parameter> = registry
            .iter_category(category)
            .map(|p| (p.id(), p.clone_for(category)))
            .collect();
        let saved_weights = params
            .values()
            .map(|p| (p.id(), p.current_weight()))
            .collect();
        Self {
            category,
            params,
            texture_slots: BTreeMap::new(),
            saved_weights,
        }
    }

    /// Owning category.
    pub fn category(&self) -> WearableCategory {
        self.category
    }

    /// Borrow an owned parameter clone by id.
    pub fn param(&self, id: ParamId) -> Option<&Parameter> {
        self.params.get(&id)
    }

    /// Mutably borrow an owned parameter clone by id.
    pub fn param_mut(&mut self, id: ParamId) -> Option<&mut Parameter> {
        self.params.get_mut(&id)
    }

    /// Iterate owned parameters in id order.
    pub fn params(&self) -> impl Iterator<Item = &Parameter> {
        self.params.values()
    }

    /// Number of owned parameters.
    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    /// Set an owned parameter's weight. `None` when the id is not owned
    /// here; otherwise whether the quantized weight changed.
    pub fn set_weight(&mut self, id: ParamId, w: f32) -> Option<bool> {
        self.params.get_mut(&id).map(|p| p.set_weight(w))
    }

    /// Assign a local texture slot.
    pub fn set_texture(&mut self, slot: u32, image: impl Into<String>) {
        self.texture_slots.insert(
            slot,
            LocalTexture {
                image: image.into(),
            },
        );
    }

    /// Lookup a local texture slot.
    pub fn texture(&self, slot: u32) -> Option<&LocalTexture> {
        self.texture_slots.get(&slot)
    }

    /// Iterate texture slots in slot order.
    pub fn textures(&self) -> impl Iterator<Item = (u32, &LocalTexture)> {
        self.texture_slots.iter().map(|(slot, tex)| (*slot, tex))
    }

    /// Record every parameter's current weight as the saved baseline.
    pub fn save_weights(&mut self) {
        self.saved_weights = self
            .params
            .values()
            .map(|p| (p.id(), p.current_weight()))
            .collect();
    }

    /// Restore every parameter to its saved weight exactly.
    pub fn revert_to_saved(&mut self) {
        for (id, weight) in &self.saved_weights {
            if let Some(p) = self.params.get_mut(id) {
                p.stop_animating();
                p.restore_weight(*weight);
            }
        }
    }

    /// Reset every parameter to its definition default.
    pub fn set_weights_to_defaults(&mut self) {
        for p in self.params.values_mut() {
            p.stop_animating();
            let d = p.default_weight();
            p.set_weight(d);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/wearable/model.rs"]
mod tests;
