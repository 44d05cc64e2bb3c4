/// Surface materials and the per-geometry render state they are copied onto
use nalgebra::{Vector3, Vector4};
use serde::Deserialize;

/// Material description as authored in a scene file
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct Material {
    pub ambient: [f32; 3],
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
    pub shininess: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ambient: [0.2, 0.2, 0.2],
            diffuse: [0.8, 0.8, 0.8],
            specular: [0.0, 0.0, 0.0],
            shininess: 0.0,
        }
    }
}

/// Which material channels track the incoming vertex color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    #[default]
    Off,
    AmbientAndDiffuse,
}

/// Material attribute applied to both faces of a geometry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialAttribute {
    pub ambient: Vector4<f32>,
    pub diffuse: Vector4<f32>,
    pub specular: Vector4<f32>,
    pub shininess: f32,
    pub color_mode: ColorMode,
}

impl MaterialAttribute {
    /// Opaque attribute with the material's colors, recoloring from ambient and diffuse
    pub fn from_material(material: &Material) -> Self {
        let rgba = |c: [f32; 3]| Vector4::new(c[0], c[1], c[2], 1.0);
        Self {
            ambient: rgba(material.ambient),
            diffuse: rgba(material.diffuse),
            specular: rgba(material.specular),
            shininess: material.shininess,
            color_mode: ColorMode::AmbientAndDiffuse,
        }
    }

    /// RGB for a surface lit head-on with the given cosine factor, clamped to [0, 1]
    pub fn shade(&self, lambert: f32) -> Vector3<f32> {
        let lambert = lambert.clamp(0.0, 1.0);
        let highlight = if self.shininess > 0.0 {
            lambert.powf(self.shininess)
        } else {
            0.0
        };

        let color =
            self.ambient.xyz() + self.diffuse.xyz() * lambert + self.specular.xyz() * highlight;
        color.map(|c| c.clamp(0.0, 1.0))
    }
}

/// Render state attached to a geometry node
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RenderState {
    pub material: Option<MaterialAttribute>,
    /// Renormalize normals after transformation
    pub normalize: bool,
}

/// Copy a material onto a render state and enable normal renormalization
pub fn apply_material(material: &Material, state: &mut RenderState) {
    state.material = Some(MaterialAttribute::from_material(material));
    state.normalize = true;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_material_copies_scalars() {
        let material = Material {
            ambient: [0.1, 0.2, 0.3],
            diffuse: [0.4, 0.5, 0.6],
            specular: [0.7, 0.8, 0.9],
            shininess: 42.0,
        };
        let mut state = RenderState::default();
        assert!(!state.normalize);

        apply_material(&material, &mut state);

        let attribute = state.material.unwrap();
        assert_eq!(attribute.ambient, Vector4::new(0.1, 0.2, 0.3, 1.0));
        assert_eq!(attribute.diffuse, Vector4::new(0.4, 0.5, 0.6, 1.0));
        assert_eq!(attribute.specular.w, 1.0);
        assert_eq!(attribute.shininess, 42.0);
        assert_eq!(attribute.color_mode, ColorMode::AmbientAndDiffuse);
        assert!(state.normalize);
    }

    #[test]
    fn test_shade_clamps() {
        let attribute = MaterialAttribute::from_material(&Material {
            ambient: [0.5, 0.0, 0.0],
            diffuse: [1.0, 0.5, 0.0],
            specular: [0.0; 3],
            shininess: 0.0,
        });

        assert_eq!(attribute.shade(0.0), Vector3::new(0.5, 0.0, 0.0));
        assert_eq!(attribute.shade(2.0), Vector3::new(1.0, 0.5, 0.0));
    }
}
