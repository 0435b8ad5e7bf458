//! Builds a two-layer shirt definition, drives it through the engine, and
//! bakes the upper-body region at a few driver weights.

use std::sync::Arc;

use vesture::{
    AlphaParamDefinition, Appearance, AppearanceConfig, ColorOp, ColorParamDefinition,
    ColorSourceDefinition, CompositeCanvas, CpuRasterizer, DrivenLinkDefinition, DriverDefinition,
    LayerDefinition, LayerSetDefinition, MaskBlend, MemoryImageCache, ParamId,
    ParameterDefinition, RenderPass, Rgba, Sex, SexMask, TextureSourceDefinition,
    WearableCategory,
};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let body_fat = ParamId(100);
    let shirt_fit = ParamId(200);

    let config = AppearanceConfig {
        invisible_texture: "invisible".to_string(),
        parameters: vec![
            ParameterDefinition {
                id: body_fat,
                name: "body_fat".to_string(),
                category: WearableCategory::Shape,
                min_weight: 0.0,
                max_weight: 1.0,
                default_weight: 0.0,
                sex: SexMask::Both,
            },
            ParameterDefinition {
                id: shirt_fit,
                name: "shirt_fit".to_string(),
                category: WearableCategory::Shirt,
                min_weight: 0.0,
                max_weight: 1.0,
                default_weight: 0.0,
                sex: SexMask::Both,
            },
        ],
        drivers: vec![DriverDefinition {
            driver_id: body_fat,
            category: WearableCategory::Shape,
            driven: vec![DrivenLinkDefinition {
                driven_id: shirt_fit,
                min1: 0.0,
                max1: 1.0,
                max2: 1.0,
                min2: 1.0,
            }],
        }],
        layer_sets: vec![LayerSetDefinition {
            name: "upper_body".to_string(),
            category: WearableCategory::Shirt,
            layers: vec![LayerDefinition {
                name: "shirt_fabric".to_string(),
                render_pass: RenderPass::Color,
                is_visibility_mask: false,
                write_all_channels: false,
                color_source: ColorSourceDefinition::Params {
                    op: ColorOp::Blend,
                    params: vec![ColorParamDefinition {
                        id: shirt_fit,
                        color: Rgba::new(0.8, 0.1, 0.1, 1.0),
                    }],
                    global_base: None,
                    fixed_base: Some(Rgba::WHITE),
                },
                alpha_sources: vec![],
                texture_source: TextureSourceDefinition::Static("cotton".to_string()),
            }],
            mask_layers: vec![LayerDefinition {
                name: "shirt_cut".to_string(),
                render_pass: RenderPass::Color,
                is_visibility_mask: false,
                write_all_channels: false,
                color_source: ColorSourceDefinition::Default,
                alpha_sources: vec![AlphaParamDefinition {
                    id: shirt_fit,
                    static_mask: Some("shirt_mask".to_string()),
                    domain: 0.1,
                    invert: false,
                    blend: MaskBlend::Multiply,
                }],
                texture_source: TextureSourceDefinition::None,
            }],
            clear_alpha: false,
            static_alpha_image: None,
        }],
        morphs: vec![],
        distortions: vec![],
        global_colors: vec![],
    };

    let mut images = MemoryImageCache::new();
    images.insert_image("cotton", 1, 1, vec![255, 255, 255, 255]);
    let gradient: Vec<u8> = (0..64).map(|x| (x * 255 / 63) as u8).collect();
    images.insert_mask("shirt_mask", 64, 1, gradient);
    let images = Arc::new(images);

    let mut engine = Appearance::new(Arc::new(config), Sex::Female, images.clone(), true)?;
    engine.wear(engine.create_wearable(WearableCategory::Shirt))?;

    let canvas = CompositeCanvas {
        width: 64,
        height: 64,
    };
    let mut raster = CpuRasterizer::new(images);

    for weight in [0.0f32, 0.5, 1.0] {
        engine.set_weight(body_fat, weight)?;
        let baked = engine.composite("upper_body", canvas, &mut raster)?;
        let opaque = baked
            .pixels
            .chunks_exact(4)
            .filter(|px| px[3] == 255)
            .count();
        println!(
            "body_fat {weight}: {opaque}/{} opaque pixels",
            canvas.width * canvas.height
        );
    }

    Ok(())
}
