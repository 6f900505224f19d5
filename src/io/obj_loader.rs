use crate::error::{RenderError, Result};
use crate::scene::model::{Face, Model, TextureMaps};
use crate::scene::texture::Texture;
use log::{info, warn};
use nalgebra::{Vector2, Vector3};
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// The files that make up one renderable model. Only the mesh is required.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelPaths {
    pub obj: PathBuf,
    pub diffuse: Option<PathBuf>,
    pub normal: Option<PathBuf>,
    pub specular: Option<PathBuf>,
}

fn load_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        triangulate: true,
        // Keep separate position / texcoord / normal index streams.
        single_index: false,
        ..Default::default()
    }
}

/// Loads an OBJ mesh and its optional maps into a [`Model`].
///
/// # Returns
/// * `Result<Model>` - the model, or the first load error. A map that is
///   listed but cannot be read is an error, not a fallback.
pub fn load_model(paths: &ModelPaths) -> Result<Model> {
    info!("Loading OBJ file: {:?}", paths.obj);

    let (models, _materials) =
        tobj::load_obj(&paths.obj, &load_options()).map_err(|source| RenderError::ObjLoad {
            path: paths.obj.clone(),
            source,
        })?;

    let name = paths.obj.display().to_string();
    let maps = TextureMaps {
        diffuse: load_map(paths.diffuse.as_deref())?,
        normal: load_map(paths.normal.as_deref())?,
        specular: load_map(paths.specular.as_deref())?,
    };
    Ok(build_model(name, &models)?.with_maps(maps))
}

/// Parses OBJ text (no materials, no maps).
pub fn load_model_from_str(name: &str, source: &str) -> Result<Model> {
    let mut reader = BufReader::new(source.as_bytes());
    let (models, _materials) =
        tobj::load_obj_buf(&mut reader, &load_options(), |_| Ok(Default::default())).map_err(
            |source| RenderError::ObjLoad {
                path: PathBuf::from(name),
                source,
            },
        )?;
    build_model(name.to_string(), &models)
}

fn load_map(path: Option<&Path>) -> Result<Option<Texture>> {
    path.map(Texture::load).transpose()
}

/// Merges every object of the file into one model, offsetting indices.
fn build_model(name: String, models: &[tobj::Model]) -> Result<Model> {
    let mut positions: Vec<Vector3<f32>> = Vec::new();
    let mut texcoords: Vec<Vector2<f32>> = Vec::new();
    let mut normals: Vec<Vector3<f32>> = Vec::new();
    let mut faces = Vec::new();
    // Index of the shared (0, 0) texcoord for meshes without texcoords.
    let mut fallback_texcoord: Option<usize> = None;

    for model in models {
        let mesh = &model.mesh;
        let position_offset = positions.len();
        let texcoord_offset = texcoords.len();
        let normal_offset = normals.len();

        positions.extend(mesh.positions.chunks_exact(3).map(|p| Vector3::new(p[0], p[1], p[2])));
        texcoords.extend(mesh.texcoords.chunks_exact(2).map(|t| Vector2::new(t[0], t[1])));
        normals.extend(mesh.normals.chunks_exact(3).map(|n| Vector3::new(n[0], n[1], n[2])));

        let has_texcoords = !mesh.texcoord_indices.is_empty();
        let has_normals = !mesh.normal_indices.is_empty();
        if !has_normals {
            warn!("Mesh '{}' is missing normals. Using flat face normals.", model.name);
        }
        if !has_texcoords {
            warn!("Mesh '{}' is missing texture coordinates. Using (0, 0).", model.name);
        }

        for (tri, corners) in mesh.indices.chunks_exact(3).enumerate() {
            let face_positions = [
                corners[0] as usize + position_offset,
                corners[1] as usize + position_offset,
                corners[2] as usize + position_offset,
            ];

            let face_texcoords = if has_texcoords {
                offset_triangle(&mesh.texcoord_indices, tri, texcoord_offset, "texcoord")?
            } else {
                let index = *fallback_texcoord.get_or_insert_with(|| {
                    texcoords.push(Vector2::zeros());
                    texcoords.len() - 1
                });
                [index; 3]
            };

            let face_normals = if has_normals {
                offset_triangle(&mesh.normal_indices, tri, normal_offset, "normal")?
            } else {
                normals.push(flat_normal(&positions, &face_positions)?);
                [normals.len() - 1; 3]
            };

            faces.push(Face::new(face_positions, face_texcoords, face_normals));
        }
    }

    let model = Model::new(name, positions, texcoords, normals, faces)?;
    info!(
        "OBJ loaded successfully. Vertices: {}, faces: {}",
        model.nverts(),
        model.nfaces()
    );
    Ok(model)
}

fn offset_triangle(indices: &[u32], tri: usize, offset: usize, what: &'static str) -> Result<[usize; 3]> {
    let start = tri * 3;
    match indices.get(start..start + 3) {
        Some(&[a, b, c]) => Ok([a as usize + offset, b as usize + offset, c as usize + offset]),
        _ => Err(RenderError::IndexOutOfBounds {
            what,
            index: start + 2,
            len: indices.len(),
        }),
    }
}

/// Unit normal of the face's plane; degenerate faces get +Z.
fn flat_normal(positions: &[Vector3<f32>], face: &[usize; 3]) -> Result<Vector3<f32>> {
    let corner = |i: usize| {
        positions.get(face[i]).copied().ok_or(RenderError::IndexOutOfBounds {
            what: "position",
            index: face[i],
            len: positions.len(),
        })
    };
    let (a, b, c) = (corner(0)?, corner(1)?, corner(2)?);
    let n = (b - a).cross(&(c - a));
    let norm = n.norm();
    Ok(if norm > 0.0 { n / norm } else { Vector3::z() })
}
