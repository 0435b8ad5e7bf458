use super::*;

fn def() -> MorphTargetDefinition {
    MorphTargetDefinition {
        name: "brow_arc".to_string(),
        param_id: ParamId(5),
        vertex_indices: vec![0, 2],
        coord_deltas: vec![Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 2.0, 0.0)],
        normal_deltas: vec![Vec3::new(0.0, 0.0, 1.0), Vec3::ZERO],
        binormal_deltas: vec![Vec3::ZERO, Vec3::ZERO],
    }
}

#[test]
fn distortion_statistics_are_derived_from_coord_deltas() {
    let morph = MorphTarget::from_definition(def());
    assert_eq!(morph.total_distortion(), 3.0);
    assert_eq!(morph.max_distortion(), 2.0);
    assert_eq!(morph.avg_distortion(), 1.5);
}

#[test]
fn apply_accumulates_the_weight_delta() {
    let mut morph = MorphTarget::from_definition(def());
    let mut mesh = MeshBuffers::new(3);

    assert!(morph.apply(&mut mesh, 0.5));
    assert_eq!(mesh.coords[0], Vec3::new(0.5, 0.0, 0.0));
    assert_eq!(mesh.coords[2], Vec3::new(0.0, 1.0, 0.0));
    assert_eq!(mesh.normals[0], Vec3::new(0.0, 0.0, 0.5));
    assert_eq!(mesh.coords[1], Vec3::ZERO);

    // Moving down from 0.5 to 0.25 subtracts the difference.
    assert!(morph.apply(&mut mesh, 0.25));
    assert_eq!(mesh.coords[0], Vec3::new(0.25, 0.0, 0.0));
    assert_eq!(morph.last_applied_weight(), 0.25);
}

#[test]
fn reapplying_the_same_weight_is_a_noop() {
    let mut morph = MorphTarget::from_definition(def());
    let mut mesh = MeshBuffers::new(3);
    assert!(morph.apply(&mut mesh, 0.5));
    assert!(!morph.apply(&mut mesh, 0.5));
    assert_eq!(mesh.coords[0], Vec3::new(0.5, 0.0, 0.0));
}

#[test]
fn returning_to_zero_restores_the_neutral_mesh() {
    let mut morph = MorphTarget::from_definition(def());
    let mut mesh = MeshBuffers::new(3);
    morph.apply(&mut mesh, 0.75);
    morph.apply(&mut mesh, 0.0);
    assert_eq!(mesh.coords[0], Vec3::ZERO);
    assert_eq!(mesh.coords[2], Vec3::ZERO);
}

#[test]
fn non_finite_weight_is_rejected() {
    let mut morph = MorphTarget::from_definition(def());
    let mut mesh = MeshBuffers::new(3);
    assert!(!morph.apply(&mut mesh, f32::NAN));
    assert_eq!(mesh.coords[0], Vec3::ZERO);
    assert_eq!(morph.last_applied_weight(), 0.0);
}

#[test]
fn out_of_range_indices_are_skipped() {
    let mut bad = def();
    bad.vertex_indices[1] = 99;
    let mut morph = MorphTarget::from_definition(bad);
    let mut mesh = MeshBuffers::new(3);
    assert!(morph.apply(&mut mesh, 1.0));
    assert_eq!(mesh.coords[0], Vec3::new(1.0, 0.0, 0.0));
}
