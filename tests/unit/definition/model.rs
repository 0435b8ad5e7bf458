use super::*;

fn param(id: i32) -> ParameterDefinition {
    ParameterDefinition {
        id: ParamId(id),
        name: format!("p{id}"),
        category: WearableCategory::Shape,
        min_weight: 0.0,
        max_weight: 1.0,
        default_weight: 0.0,
        sex: SexMask::Both,
    }
}

fn minimal_config() -> AppearanceConfig {
    AppearanceConfig {
        invisible_texture: "invisible".to_string(),
        parameters: vec![param(1), param(2)],
        drivers: vec![],
        layer_sets: vec![],
        morphs: vec![],
        distortions: vec![],
        global_colors: vec![],
    }
}

#[test]
fn minimal_config_validates() {
    assert!(minimal_config().validate().is_ok());
}

#[test]
fn category_names_round_trip() {
    for category in WearableCategory::ALL {
        assert_eq!(
            WearableCategory::from_str_name(category.as_str()),
            Some(category)
        );
    }
    assert_eq!(WearableCategory::from_str_name("hat"), None);
}

#[test]
fn duplicate_parameter_id_is_rejected() {
    let mut config = minimal_config();
    config.parameters.push(param(1));
    assert!(matches!(
        config.validate(),
        Err(VestureError::Definition(_))
    ));
}

#[test]
fn non_finite_and_inverted_bounds_are_rejected() {
    let mut config = minimal_config();
    config.parameters[0].max_weight = f32::NAN;
    assert!(config.validate().is_err());

    let mut config = minimal_config();
    config.parameters[0].min_weight = 2.0;
    assert!(config.validate().is_err());

    let mut config = minimal_config();
    config.parameters[0].default_weight = 5.0;
    assert!(config.validate().is_err());
}

#[test]
fn driver_breakpoints_must_be_non_decreasing() {
    let mut config = minimal_config();
    config.drivers.push(DriverDefinition {
        driver_id: ParamId(1),
        category: WearableCategory::Shape,
        driven: vec![DrivenLinkDefinition {
            driven_id: ParamId(2),
            min1: 0.5,
            max1: 0.2,
            max2: 0.6,
            min2: 1.0,
        }],
    });
    assert!(config.validate().is_err());

    config.drivers[0].driven[0].max1 = 0.5;
    assert!(config.validate().is_ok());
}

#[test]
fn driver_with_unknown_driver_id_is_rejected() {
    let mut config = minimal_config();
    config.drivers.push(DriverDefinition {
        driver_id: ParamId(42),
        category: WearableCategory::Shape,
        driven: vec![],
    });
    assert!(config.validate().is_err());
}

#[test]
fn morph_delta_lists_must_match_indices() {
    let mut config = minimal_config();
    config.morphs.push(MorphTargetDefinition {
        name: "jaw_jut".to_string(),
        param_id: ParamId(1),
        vertex_indices: vec![0, 1],
        coord_deltas: vec![Vec3::ONE],
        normal_deltas: vec![Vec3::ONE, Vec3::ONE],
        binormal_deltas: vec![Vec3::ONE, Vec3::ONE],
    });
    assert!(config.validate().is_err());
}

#[test]
fn duplicate_layer_set_names_are_rejected() {
    let mut config = minimal_config();
    let set = LayerSetDefinition {
        name: "head".to_string(),
        category: WearableCategory::Skin,
        layers: vec![],
        mask_layers: vec![],
        clear_alpha: false,
        static_alpha_image: None,
    };
    config.layer_sets.push(set.clone());
    config.layer_sets.push(set);
    assert!(config.validate().is_err());
}

#[test]
fn config_round_trips_through_json() {
    let mut config = minimal_config();
    config.global_colors.push(GlobalColorDefinition {
        name: "skin_color".to_string(),
        op: ColorOp::Blend,
        params: vec![ColorParamDefinition {
            id: ParamId(1),
            color: Rgba::new(0.8, 0.6, 0.5, 1.0),
        }],
    });
    let json = serde_json::to_string(&config).unwrap();
    let back: AppearanceConfig = serde_json::from_str(&json).unwrap();
    assert!(back.validate().is_ok());
    assert_eq!(back.parameters.len(), 2);
    assert_eq!(back.global_colors[0].name, "skin_color");
}

#[test]
fn lookup_helpers_find_by_id_and_name() {
    let config = minimal_config();
    assert!(config.parameter(ParamId(1)).is_some());
    assert!(config.parameter(ParamId(9)).is_none());
}
