//! Morph target accumulation over a shared mesh buffer.
//!
//! Morphs apply incrementally: each weight change adds
//! `(current - last_applied) * delta` to the affected vertices, so repeated
//! application at the same weight is a no-op and the mesh never needs a
//! full rebuild from the neutral pose.

use glam::Vec3;

use crate::definition::model::MorphTargetDefinition;
use crate::foundation::core::ParamId;

/// Mutable mesh channels morph targets accumulate into.
#[derive(Clone, Debug, Default)]
pub struct MeshBuffers {
    /// Vertex coordinates.
    pub coords: Vec<Vec3>,
    /// Vertex normals.
    pub normals: Vec<Vec3>,
    /// Vertex binormals.
    pub binormals: Vec<Vec3>,
}

impl MeshBuffers {
    /// Buffers for `vertex_count` vertices, all channels zeroed.
    pub fn new(vertex_count: usize) -> Self {
        Self {
            coords: vec![Vec3::ZERO; vertex_count],
            normals: vec![Vec3::ZERO; vertex_count],
            binormals: vec![Vec3::ZERO; vertex_count],
        }
    }
}

/// One morph target bound to a visual parameter, with derived distortion
/// statistics and its last applied weight.
#[derive(Clone, Debug)]
pub struct MorphTarget {
    def: MorphTargetDefinition,
    total_distortion: f32,
    max_distortion: f32,
    avg_distortion: f32,
    last_applied_weight: f32,
}

impl MorphTarget {
    /// Build from a definition and compute its distortion statistics.
    pub fn from_definition(def: MorphTargetDefinition) -> Self {
        let mut total = 0.0f32;
        let mut max = 0.0f32;
        for delta in &def.coord_deltas {
            let len = delta.length();
            total += len;
            max = max.max(len);
        }
        let avg = if def.coord_deltas.is_empty() {
            0.0
        } else {
            total / def.coord_deltas.len() as f32
        };
        Self {
            def,
            total_distortion: total,
            max_distortion: max,
            avg_distortion: avg,
            last_applied_weight: 0.0,
        }
    }

    /// Morph name.
    pub fn name(&self) -> &str {
        &self.def.name
    }

    /// Backing parameter id.
    pub fn param_id(&self) -> ParamId {
        self.def.param_id
    }

    /// Sum of coordinate delta magnitudes at full weight.
    pub fn total_distortion(&self) -> f32 {
        self.total_distortion
    }

    /// Largest single coordinate delta magnitude at full weight.
    pub fn max_distortion(&self) -> f32 {
        self.max_distortion
    }

    /// Mean coordinate delta magnitude at full weight.
    pub fn avg_distortion(&self) -> f32 {
        self.avg_distortion
    }

    /// The weight currently baked into the mesh.
    pub fn last_applied_weight(&self) -> f32 {
        self.last_applied_weight
    }

    /// Accumulate the difference between `weight` and the last applied
    /// weight into `mesh`. Returns false without touching the mesh when the
    /// weight is unchanged or not finite. Out-of-range vertex indices are
    /// skipped.
    pub fn apply(&mut self, mesh: &mut MeshBuffers, weight: f32) -> bool {
        if !weight.is_finite() {
            tracing::warn!(morph = %self.def.name, "ignoring non-finite morph weight");
            return false;
        }
        let delta = weight - self.last_applied_weight;
        if delta == 0.0 {
            return false;
        }
        for (slot, &index) in self.def.vertex_indices.iter().enumerate() {
            let i = index as usize;
            if i >= mesh.coords.len() {
                continue;
            }
            if let Some(d) = self.def.coord_deltas.get(slot) {
                mesh.coords[i] += delta * *d;
            }
            if let Some(d) = self.def.normal_deltas.get(slot) {
                mesh.normals[i] += delta * *d;
            }
            if let Some(d) = self.def.binormal_deltas.get(slot) {
                mesh.binormals[i] += delta * *d;
            }
        }
        self.last_applied_weight = weight;
        true
    }
}

#[cfg(test)]
#[path = "../../tests/unit/mesh/morph.rs"]
mod tests;
