use super::*;

use crate::definition::model::ParameterDefinition;
use crate::foundation::core::SexMask;

fn link(min1: f32, max1: f32, max2: f32, min2: f32) -> DrivenLinkDefinition {
    DrivenLinkDefinition {
        driven_id: ParamId(2),
        min1,
        max1,
        max2,
        min2,
    }
}

fn remap(x: f32, l: &DrivenLinkDefinition) -> f32 {
    remap_driven(x, l, 0.0, 1.0, 0.0, 1.0, false)
}

#[test]
fn up_slope_interpolates() {
    let l = link(0.2, 0.6, 0.8, 1.0);
    assert_eq!(remap(0.4, &l), 0.5);
    assert_eq!(remap(0.6, &l), 1.0);
}

#[test]
fn plateau_holds_dmax() {
    let l = link(0.2, 0.4, 0.8, 1.0);
    assert_eq!(remap(0.5, &l), 1.0);
    assert_eq!(remap(0.8, &l), 1.0);
}

#[test]
fn down_slope_interpolates() {
    let l = link(0.0, 0.2, 0.4, 0.8);
    assert_eq!(remap(0.6, &l), 0.5);
    assert_eq!(remap(0.8, &l), 0.0);
}

#[test]
fn floor_below_interior_min1() {
    let l = link(0.2, 0.6, 0.8, 1.0);
    assert_eq!(remap(0.0, &l), 0.0);
    assert_eq!(remap(0.2, &l), 0.0);
}

#[test]
fn ceiling_past_interior_min2() {
    // Driver bounds wider than the curve so min2 is interior.
    let l = link(0.1, 0.3, 0.5, 0.7);
    assert_eq!(remap_driven(0.9, &l, 0.0, 1.0, 0.0, 1.0, false), 0.0);
}

#[test]
fn continuity_at_every_breakpoint() {
    let l = link(0.2, 0.4, 0.6, 0.8);
    let eps = 1e-4;
    for bp in [0.2f32, 0.4, 0.6, 0.8] {
        let lo = remap(bp - eps, &l);
        let hi = remap(bp + eps, &l);
        assert!((lo - hi).abs() < 1e-2, "discontinuity at {bp}: {lo} vs {hi}");
    }
}

#[test]
fn segments_are_monotonic() {
    let l = link(0.2, 0.4, 0.6, 0.8);
    let mut prev = remap(0.2, &l);
    for i in 1..=20 {
        let x = 0.2 + 0.2 * i as f32 / 20.0;
        let v = remap(x, &l);
        assert!(v >= prev - 1e-6, "up-slope not increasing at {x}");
        prev = v;
    }
    let mut prev = remap(0.6, &l);
    for i in 1..=20 {
        let x = 0.6 + 0.2 * i as f32 / 20.0;
        let v = remap(x, &l);
        assert!(v <= prev + 1e-6, "down-slope not decreasing at {x}");
        prev = v;
    }
}

#[test]
fn fully_collapsed_curve_is_a_step_at_driver_min() {
    let l = link(0.0, 0.0, 0.0, 0.0);
    assert_eq!(remap(0.0, &l), 0.0);
    assert_eq!(remap(0.01, &l), 1.0);
    assert_eq!(remap(1.0, &l), 1.0);
}

#[test]
fn half_breakpoint_plateau_scenario() {
    // (min1=0, max1=0.5, max2=0.5, min2=1) over driven bounds (0, 1).
    let l = link(0.0, 0.5, 0.5, 1.0);
    assert_eq!(remap(0.25, &l), 0.5);
    assert_eq!(remap(0.75, &l), 0.5);
}

#[test]
fn extrapolates_below_min1_only_when_idle_and_pinned_to_driver_min() {
    let l = link(0.0, 0.5, 0.5, 1.0);
    // Idle with min1 == driver_min: the up-slope extends below the floor.
    let v = remap_driven(-0.25, &l, 0.0, 1.0, 0.0, 1.0, false);
    assert_eq!(v, -0.5);
    // Animating disables the lower extrapolation.
    let v = remap_driven(-0.25, &l, 0.0, 1.0, 0.0, 1.0, true);
    assert_eq!(v, 0.0);
    // An interior min1 clamps flat either way.
    let interior = link(0.2, 0.5, 0.5, 1.0);
    assert_eq!(remap_driven(0.1, &interior, 0.0, 1.0, 0.0, 1.0, false), 0.0);
}

#[test]
fn extrapolates_past_min2_only_while_animating_and_pinned_to_driver_max() {
    let l = link(0.0, 0.2, 0.4, 1.0);
    // Animating with min2 == driver_max: the down-slope extends past the
    // ceiling.
    let v = remap_driven(1.3, &l, 0.0, 1.0, 0.0, 1.0, true);
    assert!((v - -0.5).abs() < 1e-6);
    // Idle clamps flat to dmin.
    assert_eq!(remap_driven(1.3, &l, 0.0, 1.0, 0.0, 1.0, false), 0.0);
}

#[test]
fn inverted_driven_bounds_flip_the_curve() {
    let l = link(0.0, 1.0, 1.0, 1.0);
    assert_eq!(remap_driven(0.5, &l, 1.0, 0.0, 0.0, 1.0, false), 0.5);
    assert_eq!(remap_driven(1.0, &l, 1.0, 0.0, 0.0, 1.0, false), 0.0);
}

fn config() -> AppearanceConfig {
    let param = |id: i32, category: WearableCategory| ParameterDefinition {
        id: ParamId(id),
        name: format!("p{id}"),
        category,
        min_weight: 0.0,
        max_weight: 1.0,
        default_weight: 0.0,
        sex: SexMask::Both,
    };
    AppearanceConfig {
        invisible_texture: "invisible".to_string(),
        parameters: vec![
            param(1, WearableCategory::Shape),
            param(2, WearableCategory::Shirt),
            param(3, WearableCategory::Shape),
        ],
        drivers: vec![DriverDefinition {
            driver_id: ParamId(1),
            category: WearableCategory::Shape,
            driven: vec![
                DrivenLinkDefinition {
                    driven_id: ParamId(2),
                    min1: 0.0,
                    max1: 1.0,
                    max2: 1.0,
                    min2: 1.0,
                },
                DrivenLinkDefinition {
                    driven_id: ParamId(99),
                    min1: 0.0,
                    max1: 1.0,
                    max2: 1.0,
                    min2: 1.0,
                },
            ],
        }],
        layer_sets: vec![],
        morphs: vec![],
        distortions: vec![],
        global_colors: vec![],
    }
}

#[test]
fn linking_records_failures_and_keeps_going() {
    let config = config();
    let mut driver = DriverParam::from_config(&config.drivers[0], &config);
    let failures = driver.link_driven(
        |id| (id == ParamId(2)).then_some(ParamLocation::Registry),
        false,
    );
    assert_eq!(
        failures,
        vec![LinkFailure {
            driver_id: ParamId(1),
            driven_id: ParamId(99),
        }]
    );

    let updates = driver.propagate(0.5, 0.0, 1.0, false, |_| Some((0.0, 1.0)));
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].driven_id, ParamId(2));
    assert_eq!(updates[0].value, 0.5);
}

#[test]
fn cross_category_only_linking_skips_same_category_links() {
    let mut config = config();
    config.drivers[0].driven[1].driven_id = ParamId(3);
    let mut driver = DriverParam::from_config(&config.drivers[0], &config);
    let failures = driver.link_driven(|_| Some(ParamLocation::Registry), true);
    assert!(failures.is_empty());

    // Only the cross-category link (param 2, shirt) got bound.
    let updates = driver.propagate(1.0, 0.0, 1.0, false, |_| Some((0.0, 1.0)));
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].driven_id, ParamId(2));
}

#[test]
fn reset_clears_bindings() {
    let config = config();
    let mut driver = DriverParam::from_config(&config.drivers[0], &config);
    driver.link_driven(|_| Some(ParamLocation::Registry), false);
    driver.reset_driven_links();
    assert!(driver.propagate(1.0, 0.0, 1.0, false, |_| Some((0.0, 1.0))).is_empty());
}

#[test]
fn affects_category_covers_driver_and_driven_sides() {
    let config = config();
    let driver = DriverParam::from_config(&config.drivers[0], &config);
    assert!(driver.affects_category(WearableCategory::Shape));
    assert!(driver.affects_category(WearableCategory::Shirt));
    assert!(!driver.affects_category(WearableCategory::Hair));
}
