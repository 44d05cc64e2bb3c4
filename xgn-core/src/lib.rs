/// XGN Core Library - scene description to scene graph translation
///
/// This library turns windows, interfaces, scenes and objects into a scene
/// graph of position/attitude transforms and meshes, and configures the
/// viewer camera that looks at it.

pub mod adapter;
pub mod assets;
pub mod config;
pub mod diag;
pub mod geometry;
pub mod material;
pub mod model;
pub mod obj;
pub mod projection;
pub mod scene_graph;
pub mod stl;
pub mod transform;
pub mod viewer;

// Re-export commonly used types
pub use adapter::{Attachment, SetupReport, SkipReason, UpdateOutcome, UpdateReport};
pub use assets::{FileMeshLoader, MeshError, MeshLibrary, MeshSource};
pub use config::{load_window, ConfigError};
pub use geometry::{Mesh, Triangle, Vertex};
pub use material::{Material, MaterialAttribute, RenderState};
pub use model::{Camera, Interface, InterfaceKind, Object, Scene, Window};
pub use projection::ViewCamera;
pub use scene_graph::{Geometry, NodeId, NodeKind, SceneError, SceneGraph};
pub use transform::{compose_rotation, EulerAngles, PositionAttitude, Transform};
pub use viewer::Viewer;
