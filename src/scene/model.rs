use crate::core::color::Color;
use crate::error::{RenderError, Result};
use crate::scene::texture::Texture;
use nalgebra::{Vector2, Vector3};

/// One triangle: three position, three texcoord and three normal indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Face {
    pub positions: [usize; 3],
    pub texcoords: [usize; 3],
    pub normals: [usize; 3],
}

impl Face {
    pub fn new(positions: [usize; 3], texcoords: [usize; 3], normals: [usize; 3]) -> Self {
        Self {
            positions,
            texcoords,
            normals,
        }
    }
}

/// Optional texture maps sampled by the shaders.
#[derive(Debug, Clone, Default)]
pub struct TextureMaps {
    pub diffuse: Option<Texture>,
    pub normal: Option<Texture>,
    pub specular: Option<Texture>,
}

/// A Model represents a complete, read-only triangle mesh with its maps.
///
/// Every face index is checked against the attribute arrays when the model
/// is built, so accessors only fail for a bad face or vertex slot.
#[derive(Debug, Clone)]
pub struct Model {
    name: String,
    positions: Vec<Vector3<f32>>,
    texcoords: Vec<Vector2<f32>>,
    normals: Vec<Vector3<f32>>,
    faces: Vec<Face>,
    maps: TextureMaps,
}

impl Model {
    pub fn new(
        name: impl Into<String>,
        positions: Vec<Vector3<f32>>,
        texcoords: Vec<Vector2<f32>>,
        normals: Vec<Vector3<f32>>,
        faces: Vec<Face>,
    ) -> Result<Self> {
        let name = name.into();
        if faces.is_empty() {
            return Err(RenderError::EmptyModel(name));
        }
        for face in &faces {
            check_indices("position", &face.positions, positions.len())?;
            check_indices("texcoord", &face.texcoords, texcoords.len())?;
            check_indices("normal", &face.normals, normals.len())?;
        }

        Ok(Self {
            name,
            positions,
            texcoords,
            normals,
            faces,
            maps: TextureMaps::default(),
        })
    }

    pub fn with_maps(mut self, maps: TextureMaps) -> Self {
        self.maps = maps;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn nfaces(&self) -> usize {
        self.faces.len()
    }

    pub fn nverts(&self) -> usize {
        self.positions.len()
    }

    fn face(&self, face: usize, nth: usize) -> Result<&Face> {
        let f = self.faces.get(face).ok_or(RenderError::IndexOutOfBounds {
            what: "face",
            index: face,
            len: self.faces.len(),
        })?;
        if nth >= 3 {
            return Err(RenderError::IndexOutOfBounds {
                what: "face vertex",
                index: nth,
                len: 3,
            });
        }
        Ok(f)
    }

    /// Object-space position of vertex `nth` of face `face`.
    pub fn vertex(&self, face: usize, nth: usize) -> Result<Vector3<f32>> {
        let f = self.face(face, nth)?;
        Ok(self.positions[f.positions[nth]])
    }

    /// Texture coordinate (in `[0, 1]`) of vertex `nth` of face `face`.
    pub fn texcoord(&self, face: usize, nth: usize) -> Result<Vector2<f32>> {
        let f = self.face(face, nth)?;
        Ok(self.texcoords[f.texcoords[nth]])
    }

    /// Per-vertex normal of vertex `nth` of face `face`.
    pub fn normal(&self, face: usize, nth: usize) -> Result<Vector3<f32>> {
        let f = self.face(face, nth)?;
        Ok(self.normals[f.normals[nth]])
    }

    /// Diffuse color at `uv`; white when the model has no diffuse map.
    pub fn diffuse(&self, uv: &Vector2<f32>) -> Result<Color> {
        match &self.maps.diffuse {
            Some(tex) => tex.texel(uv),
            None => Ok(Color::WHITE),
        }
    }

    /// Normal-map normal at `uv`, or `None` without a normal map.
    pub fn normal_at(&self, uv: &Vector2<f32>) -> Result<Option<Vector3<f32>>> {
        self.maps
            .normal
            .as_ref()
            .map(|tex| tex.normal(uv))
            .transpose()
    }

    /// Specular exponent base at `uv`, or `None` without a specular map.
    pub fn specular(&self, uv: &Vector2<f32>) -> Result<Option<f32>> {
        self.maps
            .specular
            .as_ref()
            .map(|tex| tex.value(uv).map(f32::from))
            .transpose()
    }
}

fn check_indices(what: &'static str, indices: &[usize; 3], len: usize) -> Result<()> {
    match indices.iter().find(|&&i| i >= len) {
        Some(&index) => Err(RenderError::IndexOutOfBounds { what, index, len }),
        None => Ok(()),
    }
}
