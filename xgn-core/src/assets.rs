/// Mesh resolution by file path
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::geometry::Mesh;
use crate::obj::{self, ObjError};
use crate::stl::{self, StlError};

#[derive(Debug, Error)]
pub enum MeshError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no mesh registered for {}", path.display())]
    NotFound { path: PathBuf },

    #[error("unsupported mesh format: {}", path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("invalid STL {}: {source}", path.display())]
    Stl {
        path: PathBuf,
        #[source]
        source: StlError,
    },

    #[error("invalid OBJ {}: {source}", path.display())]
    Obj {
        path: PathBuf,
        #[source]
        source: ObjError,
    },
}

impl MeshError {
    /// The path that failed to resolve
    pub fn path(&self) -> &Path {
        match self {
            MeshError::Io { path, .. }
            | MeshError::NotFound { path }
            | MeshError::UnsupportedFormat { path }
            | MeshError::Stl { path, .. }
            | MeshError::Obj { path, .. } => path,
        }
    }
}

/// Anything that can turn a mesh reference into triangles
pub trait MeshSource {
    fn load_mesh(&self, path: &Path) -> Result<Mesh, MeshError>;
}

/// Reads meshes from disk, picking the parser by file extension
#[derive(Debug, Clone, Copy, Default)]
pub struct FileMeshLoader;

impl MeshSource for FileMeshLoader {
    fn load_mesh(&self, path: &Path) -> Result<Mesh, MeshError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        let read = || {
            fs::read(path).map_err(|source| MeshError::Io {
                path: path.to_path_buf(),
                source,
            })
        };

        match extension.as_deref() {
            Some("stl") => stl::parse_stl(&read()?).map_err(|source| MeshError::Stl {
                path: path.to_path_buf(),
                source,
            }),
            Some("obj") => {
                let data = read()?;
                let text = String::from_utf8_lossy(&data);
                obj::parse_obj(&text).map_err(|source| MeshError::Obj {
                    path: path.to_path_buf(),
                    source,
                })
            }
            _ => Err(MeshError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// Meshes registered in memory under a path key
#[derive(Debug, Clone, Default)]
pub struct MeshLibrary {
    meshes: HashMap<PathBuf, Mesh>,
}

impl MeshLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, mesh: Mesh) {
        self.meshes.insert(path.into(), mesh);
    }
}

impl MeshSource for MeshLibrary {
    fn load_mesh(&self, path: &Path) -> Result<Mesh, MeshError> {
        self.meshes
            .get(path)
            .cloned()
            .ok_or_else(|| MeshError::NotFound {
                path: path.to_path_buf(),
            })
    }
}
