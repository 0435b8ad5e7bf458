//! The appearance engine: owns the parameter registry, wearable stack,
//! drivers, global colors, layer sets, morphs, and distortions, and keeps
//! them consistent.
//!
//! Mutation is eager and single-threaded: a weight change or composition
//! change runs full driver propagation before it returns, so morphs,
//! distortions, and layer sets never observe a half-propagated state.
//! Compositing stays lazy: layer sets are only marked dirty here and
//! re-render on the next [`Appearance::composite`] call.

use std::sync::Arc;

use crate::color::global::GlobalColor;
use crate::definition::model::{AppearanceConfig, WearableCategory};
use crate::foundation::core::{CompositeCanvas, ParamId, Sex};
use crate::foundation::error::{VestureError, VestureResult};
use crate::mesh::morph::{MeshBuffers, MorphTarget};
use crate::mesh::skeletal::{JointTree, SkeletalDistortion};
use crate::param::driver::{DriverParam, LinkFailure, ParamLocation};
use crate::param::model::Parameter;
use crate::param::registry::ParameterRegistry;
use crate::texture::images::StaticImageCache;
use crate::texture::layer::CompositeContext;
use crate::texture::mask::MaskCache;
use crate::texture::raster::Rasterizer;
use crate::texture::set::{BakedTexture, TextureLayerSet};
use crate::wearable::model::Wearable;
use crate::wearable::stack::WearableStack;

/// One character's complete live appearance state.
pub struct Appearance {
    config: Arc<AppearanceConfig>,
    sex: Sex,
    registry: ParameterRegistry,
    stack: WearableStack,
    drivers: Vec<DriverParam>,
    globals: Vec<GlobalColor>,
    sets: Vec<TextureLayerSet>,
    morphs: Vec<MorphTarget>,
    distortions: Vec<SkeletalDistortion>,
    images: Arc<dyn StaticImageCache>,
    mask_cache: MaskCache,
    link_failures: Vec<LinkFailure>,
    skeleton_serial: u64,
}

impl Appearance {
    /// Build an appearance from a validated config.
    ///
    /// `is_self` sizes the alpha-mask cache: the locally controlled
    /// character rebakes often and gets more slots than observed ones.
    pub fn new(
        config: Arc<AppearanceConfig>,
        sex: Sex,
        images: Arc<dyn StaticImageCache>,
        is_self: bool,
    ) -> VestureResult<Self> {
        config.validate()?;
        let registry = ParameterRegistry::from_config(&config);
        let drivers = config
            .drivers
            .iter()
            .map(|def| DriverParam::from_config(def, &config))
            .collect();
        let globals = config
            .global_colors
            .iter()
            .cloned()
            .map(GlobalColor::new)
            .collect();
        let sets = config
            .layer_sets
            .iter()
            .cloned()
            .map(TextureLayerSet::new)
            .collect();
        let morphs = config
            .morphs
            .iter()
            .cloned()
            .map(MorphTarget::from_definition)
            .collect();
        let distortions = config
            .distortions
            .iter()
            .cloned()
            .map(SkeletalDistortion::from_definition)
            .collect();
        let capacity = if is_self {
            MaskCache::SELF_CAPACITY
        } else {
            MaskCache::OTHER_CAPACITY
        };
        let mut engine = Self {
            config,
            sex,
            registry,
            stack: WearableStack::new(),
            drivers,
            globals,
            sets,
            morphs,
            distortions,
            images,
            mask_cache: MaskCache::new(capacity),
            link_failures: Vec::new(),
            skeleton_serial: 0,
        };
        engine.relink_drivers();
        engine.propagate_all(false);
        engine.refresh_globals();
        Ok(engine)
    }

    /// The character's sex.
    pub fn sex(&self) -> Sex {
        self.sex
    }

    /// The immutable configuration the engine was built from.
    pub fn config(&self) -> &AppearanceConfig {
        &self.config
    }

    /// Current wearable composition.
    pub fn stack(&self) -> &WearableStack {
        &self.stack
    }

    /// Shared parameter registry.
    pub fn registry(&self) -> &ParameterRegistry {
        &self.registry
    }

    /// Driven links that failed to resolve during the most recent linking
    /// pass.
    pub fn link_failures(&self) -> &[LinkFailure] {
        &self.link_failures
    }

    /// Monotonic counter bumped by every weight change that is not purely
    /// an animation step, so consumers can detect stale cached skinning.
    pub fn skeleton_serial(&self) -> u64 {
        self.skeleton_serial
    }

    /// Build a fresh wearable for `category` from the registry's current
    /// parameter state.
    pub fn create_wearable(&self, category: WearableCategory) -> Wearable {
        Wearable::new(category, &self.registry)
    }

    /// Push a wearable on top of its category's stack and re-synchronize
    /// drivers for the changed composition.
    pub fn wear(&mut self, wearable: Wearable) -> VestureResult<()> {
        let category = wearable.category();
        self.stack.push(wearable).map_err(|_| {
            VestureError::link(format!(
                "category '{}' is already at its wearable limit",
                category.as_str()
            ))
        })?;
        self.on_composition_changed(category);
        Ok(())
    }

    /// Pop the top wearable of a category, re-synchronizing drivers.
    pub fn take_off(&mut self, category: WearableCategory) -> Option<Wearable> {
        let removed = self.stack.pop(category)?;
        self.on_composition_changed(category);
        Some(removed)
    }

    /// Swap two wearables within a category; re-synchronizes drivers when
    /// the top changed.
    pub fn swap(&mut self, category: WearableCategory, i: usize, j: usize) -> bool {
        if !self.stack.swap(category, i, j) {
            return false;
        }
        if i != j {
            self.on_composition_changed(category);
        }
        true
    }

    /// Set a parameter's weight on its live instance (top wearable of its
    /// category when worn, else the registry). Returns whether the
    /// quantized weight changed; on change, driver propagation runs and
    /// dependent state is marked dirty before returning.
    pub fn set_weight(&mut self, id: ParamId, w: f32) -> VestureResult<bool> {
        let changed = {
            let param = self
                .live_param_mut(id)
                .ok_or_else(|| VestureError::link(format!("unknown parameter id {}", id.0)))?;
            param.set_weight(w)
        };
        if changed {
            self.propagate_from(id, false);
            self.refresh_globals();
            self.mark_all_dirty();
            self.skeleton_serial += 1;
        }
        Ok(changed)
    }

    /// Begin animating a parameter toward `w`, propagating the target
    /// through any driver chain so driven parameters overshoot with it.
    pub fn set_animation_target(&mut self, id: ParamId, w: f32) -> VestureResult<bool> {
        let changed = {
            let param = self
                .live_param_mut(id)
                .ok_or_else(|| VestureError::link(format!("unknown parameter id {}", id.0)))?;
            param.set_animation_target(w)
        };
        if changed {
            self.propagate_from(id, true);
            self.refresh_globals();
            self.mark_all_dirty();
        }
        Ok(changed)
    }

    /// Stop animating a parameter (and, when it drives others, its driven
    /// parameters), clamping weights back into range.
    pub fn stop_animating(&mut self, id: ParamId) -> VestureResult<()> {
        {
            let param = self
                .live_param_mut(id)
                .ok_or_else(|| VestureError::link(format!("unknown parameter id {}", id.0)))?;
            param.stop_animating();
        }
        let driven: Vec<ParamId> = self
            .drivers
            .iter()
            .filter(|d| d.driver_id() == id)
            .flat_map(DriverParam::driven_ids)
            .collect();
        for driven_id in driven {
            if let Some(p) = self.live_param_mut(driven_id) {
                p.stop_animating();
            }
        }
        self.propagate_from(id, false);
        self.refresh_globals();
        self.mark_all_dirty();
        self.skeleton_serial += 1;
        Ok(())
    }

    /// Effective weight of a parameter, resolved wearable-first.
    pub fn effective_weight(&self, id: ParamId) -> Option<f32> {
        self.live_param(id).map(|p| p.effective_weight(self.sex))
    }

    /// Composite one bake region by name.
    pub fn composite(
        &mut self,
        region: &str,
        canvas: CompositeCanvas,
        raster: &mut dyn Rasterizer,
    ) -> VestureResult<&BakedTexture> {
        let index = self
            .sets
            .iter()
            .position(|s| s.name() == region)
            .ok_or_else(|| VestureError::raster(format!("unknown bake region '{region}'")))?;
        let ctx = CompositeContext {
            config: &self.config,
            sex: self.sex,
            stack: &self.stack,
            registry: &self.registry,
            globals: &self.globals,
            images: &*self.images,
        };
        self.sets[index].composite(canvas, &ctx, raster, &mut self.mask_cache)
    }

    /// The most recent bake of a region, if one exists.
    pub fn baked(&self, region: &str) -> Option<&BakedTexture> {
        self.sets
            .iter()
            .find(|s| s.name() == region)
            .and_then(TextureLayerSet::baked)
    }

    /// Resolve every skeletal distortion's bone names against `skeleton`.
    /// Returns the total number of bone deltas that named missing joints.
    pub fn bind_skeleton(&mut self, skeleton: &impl JointTree) -> usize {
        self.distortions
            .iter_mut()
            .map(|d| d.bind(skeleton))
            .sum()
    }

    /// Accumulate every morph target's pending weight delta into `mesh`.
    /// Returns how many morphs changed the mesh.
    pub fn apply_morphs(&mut self, mesh: &mut MeshBuffers) -> usize {
        let weights: Vec<Option<f32>> = self
            .morphs
            .iter()
            .map(|m| self.effective_weight(m.param_id()))
            .collect();
        let mut applied = 0;
        for (morph, weight) in self.morphs.iter_mut().zip(weights) {
            if let Some(w) = weight
                && morph.apply(mesh, w)
            {
                applied += 1;
            }
        }
        applied
    }

    /// Accumulate every skeletal distortion's pending weight delta into
    /// `skeleton`. Returns how many distortions changed a joint.
    pub fn apply_distortions(&mut self, skeleton: &mut impl JointTree) -> usize {
        let weights: Vec<Option<f32>> = self
            .distortions
            .iter()
            .map(|d| self.effective_weight(d.param_id()))
            .collect();
        let mut applied = 0;
        for (distortion, weight) in self.distortions.iter_mut().zip(weights) {
            if let Some(w) = weight
                && distortion.apply(skeleton, w)
            {
                applied += 1;
            }
        }
        applied
    }

    fn live_param(&self, id: ParamId) -> Option<&Parameter> {
        let category = self.config.parameter(id)?.category;
        if let Some(top) = self.stack.top(category)
            && let Some(p) = top.param(id)
        {
            return Some(p);
        }
        self.registry.get(id)
    }

    fn live_param_mut(&mut self, id: ParamId) -> Option<&mut Parameter> {
        let category = self.config.parameter(id)?.category;
        if self
            .stack
            .top(category)
            .is_some_and(|top| top.param(id).is_some())
        {
            return self.stack.top_mut(category)?.param_mut(id);
        }
        self.registry.get_mut(id)
    }

    /// Re-bind every driver's driven links against the current composition
    /// and refresh the recorded link failures.
    fn relink_drivers(&mut self) {
        let config = Arc::clone(&self.config);
        let stack = &self.stack;
        let registry = &self.registry;
        let mut failures = Vec::new();
        for driver in &mut self.drivers {
            driver.reset_driven_links();
            let resolver = |id: ParamId| -> Option<ParamLocation> {
                let category = config.parameter(id)?.category;
                if stack
                    .top(category)
                    .is_some_and(|top| top.param(id).is_some())
                {
                    return Some(ParamLocation::Wearable(category));
                }
                registry.get(id).map(|_| ParamLocation::Registry)
            };
            failures.extend(driver.link_driven(resolver, false));
        }
        self.link_failures = failures;
    }

    /// Re-propagate drivers after `category`'s top wearable changed, so
    /// cross-category driven parameters pick up correct values again.
    fn on_composition_changed(&mut self, category: WearableCategory) {
        self.relink_drivers();
        let affected: Vec<usize> = self
            .drivers
            .iter()
            .enumerate()
            .filter(|(_, d)| d.affects_category(category))
            .map(|(i, _)| i)
            .collect();
        for index in affected {
            self.propagate_driver(index, false);
        }
        self.refresh_globals();
        self.mark_all_dirty();
        self.skeleton_serial += 1;
    }

    fn propagate_all(&mut self, is_animating: bool) {
        for index in 0..self.drivers.len() {
            self.propagate_driver(index, is_animating);
        }
    }

    /// Propagate every driver whose driving parameter is `id`.
    fn propagate_from(&mut self, id: ParamId, is_animating: bool) {
        let matching: Vec<usize> = self
            .drivers
            .iter()
            .enumerate()
            .filter(|(_, d)| d.driver_id() == id)
            .map(|(i, _)| i)
            .collect();
        for index in matching {
            self.propagate_driver(index, is_animating);
        }
    }

    fn propagate_driver(&mut self, index: usize, is_animating: bool) {
        let updates = {
            let driver = &self.drivers[index];
            let Some(param) = self.live_param(driver.driver_id()) else {
                return;
            };
            let x = param.effective_weight(self.sex);
            let animating = is_animating || param.is_animating();
            let config = &self.config;
            driver.propagate(
                x,
                param.min_weight(),
                param.max_weight(),
                animating,
                |id| {
                    config
                        .parameter(id)
                        .map(|p| (p.min_weight, p.max_weight))
                },
            )
        };
        for update in updates {
            let target = match update.location {
                ParamLocation::Wearable(category) => self
                    .stack
                    .top_mut(category)
                    .and_then(|top| top.param_mut(update.driven_id)),
                ParamLocation::Registry => self.registry.get_mut(update.driven_id),
            };
            let Some(param) = target else {
                continue;
            };
            if is_animating {
                param.set_animation_target(update.value);
            } else {
                param.set_weight(update.value);
            }
        }
    }

    fn refresh_globals(&mut self) {
        let mut changed = false;
        let config = &self.config;
        let stack = &self.stack;
        let registry = &self.registry;
        let sex = self.sex;
        for global in &mut self.globals {
            let weight_of = |id: ParamId| -> Option<f32> {
                let category = config.parameter(id)?.category;
                if let Some(top) = stack.top(category)
                    && let Some(p) = top.param(id)
                {
                    return Some(p.normalized_effective(sex));
                }
                registry.get(id).map(|p| p.normalized_effective(sex))
            };
            changed |= global.update(weight_of);
        }
        if changed {
            tracing::debug!("global colors changed");
        }
    }

    fn mark_all_dirty(&mut self) {
        for set in &mut self.sets {
            set.mark_dirty();
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/avatar/engine.rs"]
mod tests;
