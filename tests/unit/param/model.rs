use super::*;

fn def(min: f32, max: f32, default: f32, sex: SexMask) -> ParameterDefinition {
    ParameterDefinition {
        id: ParamId(7),
        name: "torso_muscles".to_string(),
        category: WearableCategory::Shape,
        min_weight: min,
        max_weight: max,
        default_weight: default,
        sex,
    }
}

#[test]
fn starts_at_default_weight() {
    let p = Parameter::from_definition(&def(-1.0, 1.0, 0.25, SexMask::Both));
    assert_eq!(p.current_weight(), 0.25);
    assert_eq!(p.weight(), 0.25);
    assert!(!p.is_animating());
}

#[test]
fn set_weight_clamps_when_not_animating() {
    let mut p = Parameter::from_definition(&def(0.0, 1.0, 0.0, SexMask::Both));
    assert!(p.set_weight(2.5));
    assert_eq!(p.current_weight(), 1.0);
    assert!(p.set_weight(-3.0));
    assert_eq!(p.current_weight(), 0.0);
}

#[test]
fn quantized_noop_is_reported() {
    let mut p = Parameter::from_definition(&def(0.0, 1.0, 0.0, SexMask::Both));
    assert!(p.set_weight(0.5));
    // Under 1/255 of the range away: same quantized step, no change.
    assert!(!p.set_weight(0.5 + 0.001));
    assert_eq!(p.current_weight(), 0.5);
    // A full step away registers.
    assert!(p.set_weight(0.51));
}

#[test]
fn restore_weight_bypasses_quantized_noop() {
    let mut p = Parameter::from_definition(&def(0.0, 1.0, 0.0, SexMask::Both));
    p.set_weight(0.5);
    let exact = 0.5 + 0.001;
    p.restore_weight(exact);
    assert_eq!(p.current_weight(), exact);
}

#[test]
fn animation_target_permits_overshoot() {
    let mut p = Parameter::from_definition(&def(0.0, 1.0, 0.0, SexMask::Both));
    assert!(p.set_animation_target(1.5));
    assert!(p.is_animating());
    assert_eq!(p.target_weight(), 1.5);
    assert_eq!(p.current_weight(), 1.5);
    // Readers consume the target while animating.
    assert_eq!(p.weight(), 1.5);
}

#[test]
fn consecutive_overshoot_targets_both_apply() {
    let mut p = Parameter::from_definition(&def(0.0, 1.0, 0.0, SexMask::Both));
    assert!(p.set_animation_target(1.5));
    // Both overshoots clamp-quantize to the same step, but while animating
    // the new target must still land.
    assert!(p.set_animation_target(2.0));
    assert_eq!(p.current_weight(), 2.0);
    assert_eq!(p.weight(), 2.0);
    // The exact same target again is the only animating no-op.
    assert!(!p.set_animation_target(2.0));
}

#[test]
fn stop_animating_clamps_back_into_range() {
    let mut p = Parameter::from_definition(&def(0.0, 1.0, 0.0, SexMask::Both));
    p.set_animation_target(1.5);
    p.stop_animating();
    assert!(!p.is_animating());
    assert_eq!(p.current_weight(), 1.0);
}

#[test]
fn effective_weight_honors_sex_mask() {
    let mut p = Parameter::from_definition(&def(0.0, 1.0, 0.25, SexMask::Female));
    p.set_weight(0.9);
    assert_eq!(p.effective_weight(Sex::Female), 0.9);
    // Inapplicable to a male character: behaves as the default constant.
    assert_eq!(p.effective_weight(Sex::Male), 0.25);
}

#[test]
fn normalized_effective_maps_bounds_to_unit_interval() {
    let mut p = Parameter::from_definition(&def(-1.0, 3.0, -1.0, SexMask::Both));
    p.set_weight(1.0);
    assert_eq!(p.normalized_effective(Sex::Female), 0.5);
    p.set_weight(-1.0);
    assert_eq!(p.normalized_effective(Sex::Female), 0.0);
}

#[test]
fn clone_for_is_independent() {
    let mut original = Parameter::from_definition(&def(0.0, 1.0, 0.0, SexMask::Both));
    original.set_weight(0.5);
    let mut clone = original.clone_for(WearableCategory::Shirt);
    assert_eq!(clone.category(), WearableCategory::Shirt);
    assert_eq!(clone.current_weight(), 0.5);
    clone.set_weight(1.0);
    assert_eq!(original.current_weight(), 0.5);
}
