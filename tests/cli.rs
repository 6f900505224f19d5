use assert_cmd::prelude::*;
use predicates::str::contains;
use shadow_rasterizer::core::framebuffer::PixelBuffer;
use shadow_rasterizer::io::image::{load_pixel_buffer, save_pixel_buffer};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

const MODEL: &str = "
v -0.5 -0.5 0
v 0.5 -0.5 0
v 0 0.5 0
vt 0 0
vt 1 0
vt 0.5 1
vn 0 0 1
f 1/1/1 2/2/1 3/3/1
";

/// Writes a one-triangle model with 4x4 maps and returns the four paths.
fn write_assets(dir: &Path) -> Vec<PathBuf> {
    let obj = dir.join("tri.obj");
    fs::write(&obj, MODEL).expect("write obj");

    let diffuse = dir.join("diffuse.tga");
    let normal = dir.join("normal.tga");
    let specular = dir.join("spec.tga");
    let rgb = |pixel: [u8; 3]| PixelBuffer::from_raw(4, 4, 3, pixel.repeat(16)).expect("buffer");
    save_pixel_buffer(&rgb([180, 120, 60]), &diffuse).expect("diffuse");
    save_pixel_buffer(&rgb([128, 128, 255]), &normal).expect("normal");
    save_pixel_buffer(&PixelBuffer::from_raw(4, 4, 1, vec![8; 16]).expect("buffer"), &specular)
        .expect("specular");

    vec![obj, diffuse, normal, specular]
}

fn small_config(dir: &Path, extra: &str) -> PathBuf {
    let path = dir.join("render.toml");
    fs::write(&path, format!("[render]\nwidth = 48\nheight = 40\n{extra}")).expect("write config");
    path
}

#[test]
fn renders_all_three_images() {
    let dir = TempDir::new().expect("temp dir");
    let assets = write_assets(dir.path());
    let out = dir.path().join("out");

    let mut cmd = Command::cargo_bin("shadow-rasterizer").expect("binary exists");
    cmd.args(&assets)
        .arg("--config")
        .arg(small_config(dir.path(), ""))
        .arg("--output-dir")
        .arg(&out);
    cmd.assert().success();

    for name in ["depth.tga", "output.tga", "zbuffer.tga"] {
        let image = load_pixel_buffer(out.join(name)).expect(name);
        assert_eq!((image.width(), image.height()), (48, 40), "{name}");
    }
    let z_buffer = load_pixel_buffer(out.join("zbuffer.tga")).expect("zbuffer");
    assert_eq!(z_buffer.channels(), 1);
    assert!(z_buffer.as_raw().iter().any(|d| *d > 0));
}

#[test]
fn gouraud_mode_skips_the_light_depth_image() {
    let dir = TempDir::new().expect("temp dir");
    let assets = write_assets(dir.path());

    let mut cmd = Command::cargo_bin("shadow-rasterizer").expect("binary exists");
    cmd.args(&assets)
        .arg("--config")
        .arg(small_config(dir.path(), "shading = \"gouraud\"\n"))
        .arg("--output-dir")
        .arg(dir.path());
    cmd.assert().success();

    assert!(dir.path().join("output.tga").exists());
    assert!(dir.path().join("zbuffer.tga").exists());
    assert!(!dir.path().join("depth.tga").exists());
}

#[test]
fn partial_asset_list_is_rejected() {
    let dir = TempDir::new().expect("temp dir");
    let assets = write_assets(dir.path());

    let mut cmd = Command::cargo_bin("shadow-rasterizer").expect("binary exists");
    cmd.args(&assets[..2]).arg("--output-dir").arg(dir.path());
    cmd.assert()
        .failure()
        .stderr(contains("MODEL DIFFUSE NORMAL SPECULAR"));
}

#[test]
fn unknown_config_key_is_rejected() {
    let dir = TempDir::new().expect("temp dir");
    let assets = write_assets(dir.path());

    let mut cmd = Command::cargo_bin("shadow-rasterizer").expect("binary exists");
    cmd.args(&assets)
        .arg("--config")
        .arg(small_config(dir.path(), "samples = 4\n"))
        .arg("--output-dir")
        .arg(dir.path());
    cmd.assert().failure().stderr(contains("failed to load config"));
}

#[test]
fn missing_model_fails_with_context() {
    let dir = TempDir::new().expect("temp dir");

    let mut cmd = Command::cargo_bin("shadow-rasterizer").expect("binary exists");
    cmd.args(["nope.obj", "d.tga", "n.tga", "s.tga"])
        .arg("--output-dir")
        .arg(dir.path());
    cmd.assert().failure().stderr(contains("failed to load model"));
}
