use super::*;

use crate::definition::model::BoneDeltaDefinition;

fn skeleton() -> SimpleSkeleton {
    let mut s = SimpleSkeleton::new();
    let pelvis = s.add_joint("pelvis", None, false);
    let spine = s.add_joint("spine", Some(pelvis), true);
    s.set_position(spine, Vec3::new(0.0, 0.5, 0.0));
    s.set_scale(spine, Vec3::new(1.0, 2.0, 1.0));
    s
}

fn def() -> SkeletalDistortionDefinition {
    SkeletalDistortionDefinition {
        name: "torso_length".to_string(),
        param_id: ParamId(8),
        bones: vec![BoneDeltaDefinition {
            bone_name: "pelvis".to_string(),
            scale_delta: Vec3::new(0.0, 0.5, 0.0),
            position_delta: Some(Vec3::new(0.0, 0.1, 0.0)),
        }],
    }
}

#[test]
fn simple_skeleton_lookup_and_children() {
    let s = skeleton();
    let pelvis = s.joint("pelvis").unwrap();
    assert!(s.joint("tail").is_none());
    assert_eq!(s.children(pelvis), vec![1]);
    assert!(!s.inherits_scale(pelvis));
    assert!(s.inherits_scale(1));
}

#[test]
fn bind_derives_scale_deltas_for_inheriting_children() {
    let mut distortion = SkeletalDistortion::from_definition(def());
    let mut s = skeleton();
    assert_eq!(distortion.bind(&s), 0);

    distortion.apply(&mut s, 1.0);
    let pelvis = s.joint("pelvis").unwrap();
    let spine = s.joint("spine").unwrap();
    assert_eq!(s.scale(pelvis), Vec3::new(1.0, 1.5, 1.0));
    assert_eq!(s.position(pelvis), Vec3::new(0.0, 0.1, 0.0));
    // The inheriting child gets `scale_delta * its own scale at bind time`,
    // even though its parent carries no inherit flag.
    assert_eq!(s.scale(spine), Vec3::new(1.0, 3.0, 1.0));
    // Its position is left alone.
    assert_eq!(s.position(spine), Vec3::new(0.0, 0.5, 0.0));
}

#[test]
fn children_without_the_inherit_flag_receive_nothing() {
    let mut s = SimpleSkeleton::new();
    let pelvis = s.add_joint("pelvis", None, true);
    let spine = s.add_joint("spine", Some(pelvis), false);
    s.set_scale(spine, Vec3::new(1.0, 2.0, 1.0));

    let mut distortion = SkeletalDistortion::from_definition(def());
    distortion.bind(&s);
    distortion.apply(&mut s, 1.0);
    assert_eq!(s.scale(spine), Vec3::new(1.0, 2.0, 1.0));
    assert_eq!(s.position(spine), Vec3::ZERO);
}

#[test]
fn apply_is_incremental_and_reversible() {
    let mut distortion = SkeletalDistortion::from_definition(def());
    let mut s = skeleton();
    distortion.bind(&s);

    assert!(distortion.apply(&mut s, 0.5));
    assert!(!distortion.apply(&mut s, 0.5));
    let pelvis = s.joint("pelvis").unwrap();
    let spine = s.joint("spine").unwrap();
    assert_eq!(s.scale(pelvis), Vec3::new(1.0, 1.25, 1.0));

    assert!(distortion.apply(&mut s, 0.0));
    assert_eq!(s.scale(pelvis), Vec3::ONE);
    assert_eq!(s.position(pelvis), Vec3::ZERO);
    assert_eq!(s.scale(spine), Vec3::new(1.0, 2.0, 1.0));
    assert_eq!(distortion.last_weight(), 0.0);
}

#[test]
fn missing_joints_are_counted_and_skipped() {
    let mut bad = def();
    bad.bones.push(BoneDeltaDefinition {
        bone_name: "tail".to_string(),
        scale_delta: Vec3::ONE,
        position_delta: None,
    });
    let mut distortion = SkeletalDistortion::from_definition(bad);
    let mut s = skeleton();
    assert_eq!(distortion.bind(&s), 1);

    // The resolvable bone still applies.
    distortion.apply(&mut s, 1.0);
    let pelvis = s.joint("pelvis").unwrap();
    assert_eq!(s.scale(pelvis), Vec3::new(1.0, 1.5, 1.0));
}
