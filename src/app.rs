use crate::core::framebuffer::PixelBuffer;
use crate::io::config::{Config, Shading};
use crate::io::image::save_pixel_buffer;
use crate::io::obj_loader::{ModelPaths, load_model};
use crate::pipeline::passes::{render_frame, render_single_pass};
use anyhow::{Context, bail};
use clap::Parser;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Software rasterizer with two-pass shadow mapping.
#[derive(Parser, Debug)]
#[command(name = "shadow-rasterizer", version)]
#[command(about = "Renders an OBJ model with shadow mapping to TGA images")]
pub struct Cli {
    /// MODEL DIFFUSE NORMAL SPECULAR, all four or none (use the configured assets)
    #[arg(value_name = "FILES")]
    pub assets: Vec<PathBuf>,

    /// Configuration file path (TOML)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory the images are written to
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Overrides the configured shading mode
    #[arg(long, value_enum)]
    pub shading: Option<Shading>,
}

impl Cli {
    /// Resolves the model files: the four positional arguments, or the
    /// configured assets when none are given.
    pub fn model_paths(&self, config: &Config) -> anyhow::Result<ModelPaths> {
        match self.assets.as_slice() {
            [] => Ok(ModelPaths {
                obj: config.assets.model.clone(),
                diffuse: config.assets.diffuse.clone(),
                normal: config.assets.normal.clone(),
                specular: config.assets.specular.clone(),
            }),
            [obj, diffuse, normal, specular] => Ok(ModelPaths {
                obj: obj.clone(),
                diffuse: Some(diffuse.clone()),
                normal: Some(normal.clone()),
                specular: Some(specular.clone()),
            }),
            other => bail!(
                "expected MODEL DIFFUSE NORMAL SPECULAR or no files, got {} argument(s)",
                other.len()
            ),
        }
    }
}

/// Runs a single headless render and writes its images.
///
/// # Returns
/// * the paths of the written images.
pub fn run(cli: &Cli) -> anyhow::Result<Vec<PathBuf>> {
    let mut config = match &cli.config {
        Some(path) => {
            info!("Loading config file: {:?}", path);
            Config::load(path).with_context(|| format!("failed to load config {path:?}"))?
        }
        None => Config::default(),
    };
    if let Some(shading) = cli.shading {
        config.render.shading = shading;
    }

    let paths = cli.model_paths(&config)?;
    let model = load_model(&paths).with_context(|| format!("failed to load model {:?}", paths.obj))?;

    fs::create_dir_all(&cli.output_dir)
        .with_context(|| format!("failed to create output directory {:?}", cli.output_dir))?;

    let start_time = Instant::now();
    let outputs = &config.output;
    let images = match config.render.shading {
        Shading::Shadow => {
            let frame = render_frame(&config, &model)?;
            vec![
                (frame.light_depth, &outputs.light_depth),
                (frame.image, &outputs.image),
                (frame.z_buffer, &outputs.z_buffer),
            ]
        }
        shading => {
            let pass = render_single_pass(&config, &model, shading)?;
            vec![(pass.image, &outputs.image), (pass.z_buffer, &outputs.z_buffer)]
        }
    };
    info!("Render completed in {:.2?}", start_time.elapsed());

    let mut written = Vec::with_capacity(images.len());
    for (buffer, name) in images {
        let path = cli.output_dir.join(name);
        write_flipped(buffer, &path).with_context(|| format!("failed to write {path:?}"))?;
        written.push(path);
    }
    info!("Done.");
    Ok(written)
}

/// Writes a bottom-left buffer in top-left image order.
fn write_flipped(mut buffer: PixelBuffer, path: &Path) -> crate::error::Result<()> {
    buffer.flip_vertically();
    save_pixel_buffer(&buffer, path)
}
