/// Application-side description of windows, interfaces, scenes and objects
use std::path::PathBuf;

use serde::Deserialize;

use crate::material::Material;
use crate::scene_graph::NodeId;
use crate::transform::EulerAngles;

/// A placed mesh with its material
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Object {
    pub name: String,
    pub position: [f64; 3],
    pub rotation: EulerAngles,
    pub mesh: PathBuf,
    pub material: Material,

    /// Transform node mirroring this object, set once it is attached.
    /// The scene graph owns the node.
    #[serde(skip)]
    pub transform: Option<NodeId>,
}

impl Object {
    pub fn new(mesh: impl Into<PathBuf>) -> Self {
        Self {
            mesh: mesh.into(),
            ..Self::default()
        }
    }

    pub fn with_position(mut self, position: [f64; 3]) -> Self {
        self.position = position;
        self
    }

    pub fn with_rotation(mut self, rotation: EulerAngles) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    /// Name for diagnostics, falling back to the mesh path
    pub fn label(&self) -> String {
        if self.name.is_empty() {
            self.mesh.display().to_string()
        } else {
            self.name.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Camera {
    pub position: [f64; 3],
    pub rotation: EulerAngles,
    pub aspect_ratio: f64,
    pub clip_start: f64,
    pub clip_end: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: [0.0, -10.0, 4.0],
            rotation: EulerAngles::zero(),
            aspect_ratio: 4.0 / 3.0,
            clip_start: 0.1,
            clip_end: 1000.0,
        }
    }
}

impl Camera {
    /// Why these values cannot form a perspective projection, if they cannot
    pub fn projection_problem(&self) -> Option<String> {
        if !self.aspect_ratio.is_finite() || self.aspect_ratio <= 0.0 {
            return Some(format!("aspect_ratio must be positive, got {}", self.aspect_ratio));
        }
        if !self.clip_start.is_finite() || self.clip_start <= 0.0 {
            return Some(format!("clip_start must be positive, got {}", self.clip_start));
        }
        if !self.clip_end.is_finite() || self.clip_end <= self.clip_start {
            return Some(format!(
                "clip_end ({}) must lie beyond clip_start ({})",
                self.clip_end, self.clip_start
            ));
        }
        None
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Scene {
    pub camera: Camera,
    pub objects: Vec<Object>,
}

/// What an interface renders; only 3D interfaces take part in the scene graph
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "String")]
pub enum InterfaceKind {
    #[default]
    ThreeD,
    Other(String),
}

impl From<String> for InterfaceKind {
    fn from(kind: String) -> Self {
        if kind == "3D" {
            InterfaceKind::ThreeD
        } else {
            InterfaceKind::Other(kind)
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Interface {
    #[serde(rename = "type")]
    pub kind: InterfaceKind,
    pub scenes: Vec<Scene>,
    pub scene_in_use: usize,
}

impl Interface {
    pub fn new(kind: InterfaceKind, scenes: Vec<Scene>) -> Self {
        Self {
            kind,
            scenes,
            scene_in_use: 0,
        }
    }

    pub fn is_3d(&self) -> bool {
        self.kind == InterfaceKind::ThreeD
    }

    pub fn active_scene(&self) -> Option<&Scene> {
        self.scenes.get(self.scene_in_use)
    }

    pub fn active_scene_mut(&mut self) -> Option<&mut Scene> {
        self.scenes.get_mut(self.scene_in_use)
    }
}

/// Top-level window description
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Window {
    pub name: String,
    pub size_x: u32,
    pub size_y: u32,
    #[serde(rename = "interface")]
    pub interfaces: Vec<Interface>,
}

impl Default for Window {
    fn default() -> Self {
        Self {
            name: String::from("xgn"),
            size_x: 800,
            size_y: 600,
            interfaces: Vec::new(),
        }
    }
}

impl Window {
    /// Active scenes of every 3D interface, in interface order
    pub fn active_3d_scenes_mut(&mut self) -> impl Iterator<Item = &mut Scene> {
        self.interfaces
            .iter_mut()
            .filter(|interface| interface.is_3d())
            .filter_map(Interface::active_scene_mut)
    }
}
