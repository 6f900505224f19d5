use crate::core::math::transform::{TransformFactory, Viewport};
use crate::error::{RenderError, Result};
use crate::pipeline::shaders::phong::DEFAULT_SPECULAR_WEIGHT;
use crate::pipeline::shaders::shadowed::DEFAULT_SHADOW_BIAS;
use crate::scene::camera::Camera;
use crate::scene::light::DirectionalLight;
use nalgebra::Vector3;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Render configuration, read from TOML. Every field has a default, so an
/// empty file (or no file) is a valid configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub light: LightConfig,
    #[serde(default)]
    pub assets: AssetsConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Which shader drives the final image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Shading {
    /// Two passes: depth from the light, then Blinn-Phong with shadows.
    #[default]
    Shadow,
    /// Single pass Blinn-Phong without shadows.
    Phong,
    /// Single pass per-vertex diffuse.
    Gouraud,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenderConfig {
    // --- Output ---
    #[serde(default = "default_width")]
    pub width: usize,
    #[serde(default = "default_height")]
    pub height: usize,
    /// Depth range of the viewport; also the largest storable depth.
    #[serde(default = "default_depth")]
    pub depth: f32,
    /// Fraction of the image the viewport covers, centered.
    #[serde(default = "default_viewport_scale")]
    pub viewport_scale: f32,

    // --- Shading ---
    #[serde(default)]
    pub shading: Shading,
    #[serde(default = "default_shadow_bias")]
    pub shadow_bias: f32,
    #[serde(default = "default_specular_weight")]
    pub specular_weight: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            depth: default_depth(),
            viewport_scale: default_viewport_scale(),
            shading: Shading::default(),
            shadow_bias: default_shadow_bias(),
            specular_weight: default_specular_weight(),
        }
    }
}

impl RenderConfig {
    /// The centered viewport covering `viewport_scale` of the image.
    pub fn viewport(&self) -> Viewport {
        let w = self.width as f32 * self.viewport_scale;
        let h = self.height as f32 * self.viewport_scale;
        Viewport::new(
            (self.width as f32 - w) / 2.0,
            (self.height as f32 - h) / 2.0,
            w,
            h,
            self.depth,
        )
    }
}

fn default_width() -> usize {
    800
}
fn default_height() -> usize {
    800
}
fn default_depth() -> f32 {
    255.0
}
fn default_viewport_scale() -> f32 {
    0.75
}
fn default_shadow_bias() -> f32 {
    DEFAULT_SHADOW_BIAS
}
fn default_specular_weight() -> f32 {
    DEFAULT_SPECULAR_WEIGHT
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CameraConfig {
    #[serde(default = "default_eye")]
    pub eye: [f32; 3],
    #[serde(default)]
    pub center: [f32; 3],
    #[serde(default = "default_up")]
    pub up: [f32; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            eye: default_eye(),
            center: Camera::default().center.into(),
            up: default_up(),
        }
    }
}

impl CameraConfig {
    pub fn to_camera(&self) -> Camera {
        Camera::new(
            Vector3::from(self.eye),
            Vector3::from(self.center),
            Vector3::from(self.up),
        )
    }
}

fn default_eye() -> [f32; 3] {
    Camera::default().eye.into()
}
fn default_up() -> [f32; 3] {
    Camera::default().up.into()
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LightConfig {
    /// Direction towards the light; normalized on use.
    #[serde(default = "default_light_direction")]
    pub direction: [f32; 3],
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            direction: default_light_direction(),
        }
    }
}

impl LightConfig {
    pub fn to_light(&self) -> Result<DirectionalLight> {
        DirectionalLight::new(Vector3::from(self.direction))
            .map_err(|_| RenderError::Config("light direction must not be zero".to_string()))
    }
}

fn default_light_direction() -> [f32; 3] {
    [5.0, 5.0, 1.0]
}

/// Mesh and maps rendered when none are given on the command line.
///
/// Without an `[assets]` table the bundled head model is used. Inside the
/// table a map that is not listed is omitted.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssetsConfig {
    #[serde(default = "default_model")]
    pub model: PathBuf,
    #[serde(default)]
    pub diffuse: Option<PathBuf>,
    #[serde(default)]
    pub normal: Option<PathBuf>,
    #[serde(default)]
    pub specular: Option<PathBuf>,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            diffuse: default_diffuse(),
            normal: default_normal(),
            specular: default_specular(),
        }
    }
}

fn default_model() -> PathBuf {
    PathBuf::from("obj/african_head.obj")
}
fn default_diffuse() -> Option<PathBuf> {
    Some(PathBuf::from("obj/african_head_diffuse.tga"))
}
fn default_normal() -> Option<PathBuf> {
    Some(PathBuf::from("obj/african_head_nm.tga"))
}
fn default_specular() -> Option<PathBuf> {
    Some(PathBuf::from("obj/african_head_spec.tga"))
}

/// File names of the produced images, relative to the output directory.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default = "default_light_depth")]
    pub light_depth: String,
    #[serde(default = "default_image")]
    pub image: String,
    #[serde(default = "default_z_buffer")]
    pub z_buffer: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            light_depth: default_light_depth(),
            image: default_image(),
            z_buffer: default_z_buffer(),
        }
    }
}

fn default_light_depth() -> String {
    "depth.tga".to_string()
}
fn default_image() -> String {
    "output.tga".to_string()
}
fn default_z_buffer() -> String {
    "zbuffer.tga".to_string()
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| RenderError::Config(format!("failed to parse TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings no render can use.
    pub fn validate(&self) -> Result<()> {
        let render = &self.render;
        if render.width == 0 || render.height == 0 {
            return Err(RenderError::Config(format!(
                "image size {}x{} must be non-zero",
                render.width, render.height
            )));
        }
        if !(render.depth > 0.0 && render.depth <= 255.0) {
            return Err(RenderError::Config(format!(
                "depth {} must be in (0, 255]",
                render.depth
            )));
        }
        if !(render.viewport_scale > 0.0 && render.viewport_scale.is_finite()) {
            return Err(RenderError::Config(format!(
                "viewport_scale {} must be positive",
                render.viewport_scale
            )));
        }
        let camera = self.camera.to_camera();
        camera.perspective_coeff().map_err(|_| {
            RenderError::Config("camera eye must differ from its center".to_string())
        })?;
        TransformFactory::view(&camera.eye, &camera.center, &camera.up).map_err(|_| {
            RenderError::Config("camera up must not be parallel to its view direction".to_string())
        })?;
        self.light.to_light()?;
        Ok(())
    }
}
