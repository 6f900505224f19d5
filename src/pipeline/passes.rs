use crate::core::framebuffer::PixelBuffer;
use crate::core::math::transform::TransformStack;
use crate::error::Result;
use crate::io::config::{Config, Shading};
use crate::pipeline::renderer::Renderer;
use crate::pipeline::shaders::depth::DepthShader;
use crate::pipeline::shaders::gouraud::GouraudShader;
use crate::pipeline::shaders::phong::{BlinnPhongShader, LightingUniforms};
use crate::pipeline::shaders::shadowed::ShadowedPhongShader;
use crate::scene::model::Model;
use log::info;

/// Result of the light's depth pass.
#[derive(Debug, Clone)]
pub struct ShadowPass {
    /// Gray ramp of the light's depth, 3 channels.
    pub light_depth: PixelBuffer,
    /// Quantized depth as seen from the light, 1 channel.
    pub shadow_buffer: PixelBuffer,
    /// The stack the pass was drawn with.
    pub stack: TransformStack,
}

/// Result of an eye pass.
#[derive(Debug, Clone)]
pub struct MainPass {
    pub image: PixelBuffer,
    pub z_buffer: PixelBuffer,
    pub stack: TransformStack,
}

/// Every buffer a two-pass frame produces, all with a bottom-left origin.
#[derive(Debug, Clone)]
pub struct FrameOutput {
    pub light_depth: PixelBuffer,
    pub shadow_buffer: PixelBuffer,
    pub image: PixelBuffer,
    pub z_buffer: PixelBuffer,
}

/// Stack for the scene camera: perspective from the eye, output viewport.
fn eye_stack(config: &Config) -> Result<TransformStack> {
    let camera = config.camera.to_camera();
    TransformStack::configure(&camera, camera.perspective_coeff()?, &config.render.viewport())
}

/// Executes the Shadow Mapping Pass.
///
/// The scene is seen orthographically from the light direction, looking at
/// the camera's center, and drawn with the depth shader.
pub fn render_shadow_pass(config: &Config, model: &Model) -> Result<ShadowPass> {
    let render = &config.render;
    let light = config.light.to_light()?;
    let light_camera = light.camera(&config.camera.to_camera());
    let stack = TransformStack::configure(&light_camera, 0.0, &render.viewport())?;

    info!("Shadow pass: light direction {:?}", light.direction());
    let mut renderer = Renderer::new(render.width, render.height, 3)?;
    let mut shader = DepthShader::new(model, render.depth);
    renderer.draw_model(model, &stack, &mut shader)?;

    let (light_depth, shadow_buffer) = renderer.into_buffers();
    Ok(ShadowPass {
        light_depth,
        shadow_buffer,
        stack,
    })
}

/// Executes the Main Rendering Pass with shadows.
///
/// Eye-pass screen points are carried into the light's screen space by
/// `shadow.stack.combined * inverse(eye.combined)` and compared against the
/// shadow buffer.
pub fn render_main_pass(config: &Config, model: &Model, shadow: &ShadowPass) -> Result<MainPass> {
    let render = &config.render;
    let camera = config.camera.to_camera();
    let light = config.light.to_light()?;
    let stack = eye_stack(config)?;

    let uniforms =
        LightingUniforms::new(&stack, &light.direction(), &camera, render.specular_weight)?;
    let m_shadow = shadow.stack.combined() * stack.combined_inverse()?;

    info!("Main pass: eye {:?}", camera.eye);
    let mut renderer = Renderer::new(render.width, render.height, 3)?;
    let mut shader = ShadowedPhongShader::new(model, uniforms, m_shadow, &shadow.shadow_buffer)
        .with_bias(render.shadow_bias);
    renderer.draw_model(model, &stack, &mut shader)?;

    let (image, z_buffer) = renderer.into_buffers();
    Ok(MainPass {
        image,
        z_buffer,
        stack,
    })
}

/// Runs the shadow pass and then the main pass.
pub fn render_frame(config: &Config, model: &Model) -> Result<FrameOutput> {
    let shadow = render_shadow_pass(config, model)?;
    let main = render_main_pass(config, model, &shadow)?;
    Ok(FrameOutput {
        light_depth: shadow.light_depth,
        shadow_buffer: shadow.shadow_buffer,
        image: main.image,
        z_buffer: main.z_buffer,
    })
}

/// One eye pass without a shadow map, shaded with `shading`.
/// [`Shading::Shadow`] is drawn as plain Blinn-Phong.
pub fn render_single_pass(config: &Config, model: &Model, shading: Shading) -> Result<MainPass> {
    let render = &config.render;
    let camera = config.camera.to_camera();
    let light = config.light.to_light()?;
    let stack = eye_stack(config)?;

    info!("Single pass ({:?}): eye {:?}", shading, camera.eye);
    let mut renderer = Renderer::new(render.width, render.height, 3)?;
    match shading {
        Shading::Gouraud => {
            let mut shader = GouraudShader::new(model, light.direction());
            renderer.draw_model(model, &stack, &mut shader)?;
        }
        Shading::Phong | Shading::Shadow => {
            let uniforms = LightingUniforms::new(
                &stack,
                &light.direction(),
                &camera,
                render.specular_weight,
            )?;
            let mut shader = BlinnPhongShader::new(model, uniforms);
            renderer.draw_model(model, &stack, &mut shader)?;
        }
    }

    let (image, z_buffer) = renderer.into_buffers();
    Ok(MainPass {
        image,
        z_buffer,
        stack,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::obj_loader::load_model_from_str;

    const FACING: &str = "
v -0.5 -0.5 0
v 0.5 -0.5 0
v 0 0.5 0
vn 0 0 1
f 1//1 2//1 3//1
";

    fn small_config() -> Config {
        let mut config = Config::default();
        config.render.width = 64;
        config.render.height = 64;
        config
    }

    #[test]
    fn shadow_pass_fills_both_targets() {
        let model = load_model_from_str("facing", FACING).unwrap();
        let shadow = render_shadow_pass(&small_config(), &model).unwrap();
        assert_eq!(shadow.shadow_buffer.channels(), 1);
        assert_eq!(shadow.light_depth.channels(), 3);
        assert!(shadow.shadow_buffer.as_raw().iter().any(|d| *d > 0));
        assert!(shadow.light_depth.as_raw().iter().any(|c| *c > 0));
    }

    #[test]
    fn frame_buffers_share_dimensions() {
        let model = load_model_from_str("facing", FACING).unwrap();
        let frame = render_frame(&small_config(), &model).unwrap();
        for buffer in [&frame.light_depth, &frame.shadow_buffer, &frame.image, &frame.z_buffer] {
            assert_eq!((buffer.width(), buffer.height()), (64, 64));
        }
        assert!(frame.z_buffer.as_raw().iter().any(|d| *d > 0));
    }

    #[test]
    fn single_pass_variants_draw_the_same_coverage() {
        let model = load_model_from_str("facing", FACING).unwrap();
        let config = small_config();
        let gouraud = render_single_pass(&config, &model, Shading::Gouraud).unwrap();
        let phong = render_single_pass(&config, &model, Shading::Phong).unwrap();
        assert_eq!(gouraud.z_buffer, phong.z_buffer);
    }

    #[test]
    fn eye_on_center_is_rejected() {
        let model = load_model_from_str("facing", FACING).unwrap();
        let mut config = small_config();
        config.camera.eye = [0.0, 0.0, 0.0];
        assert!(render_frame(&config, &model).is_err());
    }
}
