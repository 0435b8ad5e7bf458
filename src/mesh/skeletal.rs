//! Skeletal distortion over an external joint tree.
//!
//! Distortions mutate joint scale/position incrementally, like morphs: each
//! application adds `(weight - last_weight) * delta`. Scale-inheriting
//! children receive a derived scale delta computed once when the distortion
//! is bound to the skeleton.

use glam::Vec3;

use crate::definition::model::SkeletalDistortionDefinition;
use crate::foundation::core::ParamId;

/// External skeleton interface.
///
/// Joints are addressed by index handles so the core holds no references
/// into the host's joint storage between calls.
pub trait JointTree {
    /// Resolve a joint by name.
    fn joint(&self, name: &str) -> Option<usize>;
    /// Joint scale.
    fn scale(&self, joint: usize) -> Vec3;
    /// Set joint scale.
    fn set_scale(&mut self, joint: usize, scale: Vec3);
    /// Joint position relative to its parent.
    fn position(&self, joint: usize) -> Vec3;
    /// Set joint position relative to its parent.
    fn set_position(&mut self, joint: usize, position: Vec3);
    /// Direct children of a joint.
    fn children(&self, joint: usize) -> Vec<usize>;
    /// True when the joint scales its children's positions along with
    /// itself.
    fn inherits_scale(&self, joint: usize) -> bool;
}

/// Minimal array-backed [`JointTree`] for hosts without a skeleton of their
/// own, and for tests.
#[derive(Clone, Debug, Default)]
pub struct SimpleSkeleton {
    joints: Vec<SimpleJoint>,
}

#[derive(Clone, Debug)]
struct SimpleJoint {
    name: String,
    parent: Option<usize>,
    scale: Vec3,
    position: Vec3,
    inherits_scale: bool,
}

impl SimpleSkeleton {
    /// Empty skeleton.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a joint; returns its handle. `parent` must already exist.
    pub fn add_joint(
        &mut self,
        name: impl Into<String>,
        parent: Option<usize>,
        inherits_scale: bool,
    ) -> usize {
        self.joints.push(SimpleJoint {
            name: name.into(),
            parent,
            scale: Vec3::ONE,
            position: Vec3::ZERO,
            inherits_scale,
        });
        self.joints.len() - 1
    }
}

impl JointTree for SimpleSkeleton {
    fn joint(&self, name: &str) -> Option<usize> {
        self.joints.iter().position(|j| j.name == name)
    }

    fn scale(&self, joint: usize) -> Vec3 {
        self.joints[joint].scale
    }

    fn set_scale(&mut self, joint: usize, scale: Vec3) {
        self.joints[joint].scale = scale;
    }

    fn position(&self, joint: usize) -> Vec3 {
        self.joints[joint].position
    }

    fn set_position(&mut self, joint: usize, position: Vec3) {
        self.joints[joint].position = position;
    }

    fn children(&self, joint: usize) -> Vec<usize> {
        self.joints
            .iter()
            .enumerate()
            .filter(|(_, j)| j.parent == Some(joint))
            .map(|(i, _)| i)
            .collect()
    }

    fn inherits_scale(&self, joint: usize) -> bool {
        self.joints[joint].inherits_scale
    }
}

#[derive(Clone, Debug)]
struct BoundDelta {
    joint: usize,
    scale_delta: Vec3,
    position_delta: Option<Vec3>,
}

/// One skeletal distortion bound to a live skeleton.
#[derive(Clone, Debug)]
pub struct SkeletalDistortion {
    def: SkeletalDistortionDefinition,
    bound: Vec<BoundDelta>,
    last_weight: f32,
}

impl SkeletalDistortion {
    /// Build from a definition; unbound until [`Self::bind`] is called.
    pub fn from_definition(def: SkeletalDistortionDefinition) -> Self {
        Self {
            def,
            bound: Vec::new(),
            last_weight: 0.0,
        }
    }

    /// Distortion name.
    pub fn name(&self) -> &str {
        &self.def.name
    }

    /// Backing parameter id.
    pub fn param_id(&self) -> ParamId {
        self.def.param_id
    }

    /// The weight currently baked into the skeleton.
    pub fn last_weight(&self) -> f32 {
        self.last_weight
    }

    /// Resolve bone names against `skeleton` and derive scale deltas for
    /// children flagged as scale-inheriting, from the child's own scale at
    /// bind time. Missing joints are skipped with a warning; returns the
    /// number of bone deltas that did not resolve.
    pub fn bind(&mut self, skeleton: &impl JointTree) -> usize {
        self.bound.clear();
        let mut missing = 0;
        for bone in &self.def.bones {
            let Some(joint) = skeleton.joint(&bone.bone_name) else {
                tracing::warn!(
                    distortion = %self.def.name,
                    bone = %bone.bone_name,
                    "skeletal distortion names an unknown joint"
                );
                missing += 1;
                continue;
            };
            self.bound.push(BoundDelta {
                joint,
                scale_delta: bone.scale_delta,
                position_delta: bone.position_delta,
            });
            for child in skeleton.children(joint) {
                if skeleton.inherits_scale(child) {
                    self.bound.push(BoundDelta {
                        joint: child,
                        scale_delta: bone.scale_delta * skeleton.scale(child),
                        position_delta: None,
                    });
                }
            }
        }
        missing
    }

    /// Accumulate the difference between `weight` and the last applied
    /// weight into every bound joint. Returns false when the weight is
    /// unchanged.
    pub fn apply(&mut self, skeleton: &mut impl JointTree, weight: f32) -> bool {
        let delta = weight - self.last_weight;
        if delta == 0.0 {
            return false;
        }
        for bound in &self.bound {
            let scale = skeleton.scale(bound.joint) + delta * bound.scale_delta;
            skeleton.set_scale(bound.joint, scale);
            if let Some(pd) = bound.position_delta {
                let position = skeleton.position(bound.joint) + delta * pd;
                skeleton.set_position(bound.joint, position);
            }
        }
        self.last_weight = weight;
        true
    }
}

#[cfg(test)]
#[path = "../../tests/unit/mesh/skeletal.rs"]
mod tests;
