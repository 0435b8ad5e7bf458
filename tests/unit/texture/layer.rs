use super::*;

use crate::color::global::GlobalColor;
use crate::definition::model::{
    ColorOp, ColorParamDefinition, GlobalColorDefinition, ParameterDefinition, RenderPass,
};
use crate::foundation::core::SexMask;
use crate::texture::images::MemoryImageCache;
use crate::wearable::model::Wearable;

struct Fixture {
    config: AppearanceConfig,
    stack: WearableStack,
    registry: ParameterRegistry,
    globals: Vec<GlobalColor>,
    images: MemoryImageCache,
}

impl Fixture {
    fn new() -> Self {
        let param = |id: i32, category: WearableCategory| ParameterDefinition {
            id: ParamId(id),
            name: format!("p{id}"),
            category,
            min_weight: 0.0,
            max_weight: 1.0,
            default_weight: 0.0,
            sex: SexMask::Both,
        };
        let config = AppearanceConfig {
            invisible_texture: "invisible".to_string(),
            parameters: vec![
                param(1, WearableCategory::Skin),
                param(2, WearableCategory::Shirt),
            ],
            drivers: vec![],
            layer_sets: vec![],
            morphs: vec![],
            distortions: vec![],
            global_colors: vec![GlobalColorDefinition {
                name: "skin_color".to_string(),
                op: ColorOp::Blend,
                params: vec![ColorParamDefinition {
                    id: ParamId(1),
                    color: Rgba::new(0.6, 0.4, 0.2, 1.0),
                }],
            }],
        };
        let registry = ParameterRegistry::from_config(&config);
        let globals = config
            .global_colors
            .iter()
            .cloned()
            .map(GlobalColor::new)
            .collect();
        Self {
            config,
            stack: WearableStack::new(),
            registry,
            globals,
            images: MemoryImageCache::new(),
        }
    }

    fn ctx(&self) -> CompositeContext<'_> {
        CompositeContext {
            config: &self.config,
            sex: Sex::Female,
            stack: &self.stack,
            registry: &self.registry,
            globals: &self.globals,
            images: &self.images,
        }
    }
}

fn layer(color_source: ColorSourceDefinition) -> LayerDefinition {
    LayerDefinition {
        name: "base".to_string(),
        render_pass: RenderPass::Color,
        is_visibility_mask: false,
        write_all_channels: false,
        color_source,
        alpha_sources: vec![],
        texture_source: TextureSourceDefinition::None,
    }
}

#[test]
fn weight_resolves_on_top_wearable_before_registry() {
    let mut fx = Fixture::new();
    fx.registry.set_weight(ParamId(2), 0.25).unwrap();
    let ctx = fx.ctx();
    assert_eq!(ctx.normalized_weight(ParamId(2)), Some(0.25));
    drop(ctx);

    let mut worn = Wearable::new(WearableCategory::Shirt, &fx.registry);
    worn.set_weight(ParamId(2), 0.75).unwrap();
    fx.stack.push(worn).unwrap();
    assert_eq!(fx.ctx().normalized_weight(ParamId(2)), Some(0.75));
    assert_eq!(fx.ctx().normalized_weight(ParamId(9)), None);
}

#[test]
fn fixed_color_source_is_explicit() {
    let fx = Fixture::new();
    let l = layer(ColorSourceDefinition::Fixed(Rgba::new(0.2, 0.4, 0.6, 1.0)));
    let net = resolve_net_color(&l, &fx.ctx());
    assert!(net.is_explicit());
    assert_eq!(net.rgba(), Rgba::new(0.2, 0.4, 0.6, 1.0));
}

#[test]
fn default_color_source_is_opaque_white() {
    let fx = Fixture::new();
    let net = resolve_net_color(&layer(ColorSourceDefinition::Default), &fx.ctx());
    assert!(!net.is_explicit());
    assert_eq!(net.rgba(), Rgba::WHITE);
}

#[test]
fn global_color_source_reads_the_current_global() {
    let mut fx = Fixture::new();
    fx.registry.set_weight(ParamId(1), 1.0).unwrap();
    for g in &mut fx.globals {
        let registry = &fx.registry;
        g.update(|id| registry.get(id).map(|p| p.normalized_effective(Sex::Female)));
    }
    let net = resolve_net_color(
        &layer(ColorSourceDefinition::Global("skin_color".to_string())),
        &fx.ctx(),
    );
    assert_eq!(net.rgba(), Rgba::new(0.6, 0.4, 0.2, 1.0));
}

#[test]
fn unknown_global_falls_back_to_default_white() {
    let fx = Fixture::new();
    let net = resolve_net_color(
        &layer(ColorSourceDefinition::Global("nope".to_string())),
        &fx.ctx(),
    );
    assert!(!net.is_explicit());
}

#[test]
fn param_chain_folds_from_its_base() {
    let mut fx = Fixture::new();
    fx.registry.set_weight(ParamId(2), 0.5).unwrap();
    let l = layer(ColorSourceDefinition::Params {
        op: ColorOp::Blend,
        params: vec![ColorParamDefinition {
            id: ParamId(2),
            color: Rgba::new(1.0, 0.0, 0.0, 1.0),
        }],
        global_base: None,
        fixed_base: Some(Rgba::WHITE),
    });
    let net = resolve_net_color(&l, &fx.ctx());
    assert_eq!(net.rgba(), Rgba::new(1.0, 0.5, 0.5, 1.0));
}

#[test]
fn texture_source_resolves_local_slot_from_top_wearable() {
    let mut fx = Fixture::new();
    let mut l = layer(ColorSourceDefinition::Default);
    l.texture_source = TextureSourceDefinition::LocalSlot(2);
    assert_eq!(resolve_texture(&l, &fx.ctx(), WearableCategory::Shirt), None);

    let mut worn = Wearable::new(WearableCategory::Shirt, &fx.registry);
    worn.set_texture(2, "fabric");
    fx.stack.push(worn).unwrap();
    assert_eq!(
        resolve_texture(&l, &fx.ctx(), WearableCategory::Shirt),
        Some("fabric")
    );

    l.texture_source = TextureSourceDefinition::Static("freckles".to_string());
    assert_eq!(
        resolve_texture(&l, &fx.ctx(), WearableCategory::Shirt),
        Some("freckles")
    );
}

#[test]
fn invisible_mask_requires_flag_and_matching_texture() {
    let mut fx = Fixture::new();
    let mut worn = Wearable::new(WearableCategory::Shirt, &fx.registry);
    worn.set_texture(0, "invisible");
    fx.stack.push(worn).unwrap();

    let mut l = layer(ColorSourceDefinition::Default);
    l.texture_source = TextureSourceDefinition::LocalSlot(0);
    assert!(!is_invisible_mask(&l, &fx.ctx(), WearableCategory::Shirt));
    l.is_visibility_mask = true;
    assert!(is_invisible_mask(&l, &fx.ctx(), WearableCategory::Shirt));
    assert!(!is_invisible_mask(&l, &fx.ctx(), WearableCategory::Pants));
}
