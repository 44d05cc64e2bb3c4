/// Loading window descriptions from TOML
///
/// ```toml
/// name = "demo"
/// size_x = 800
/// size_y = 600
///
/// [[interface]]
/// type = "3D"
/// scene_in_use = 0
///
/// [[interface.scenes]]
/// camera = { position = [0, -10, 4], aspect_ratio = 1.33, clip_start = 0.1, clip_end = 100 }
///
/// [[interface.scenes.objects]]
/// mesh = "meshes/cube.stl"
/// position = [0, 0, 0]
/// rotation = [0, 45, 0]
/// material = { diffuse = [0.8, 0.2, 0.2], shininess = 12 }
/// ```
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::model::Window;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid scene description: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("interface {interface}: {reason}")]
    Invalid { interface: usize, reason: String },
}

impl Window {
    /// Parse and validate a window description
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let window: Window = toml::from_str(source)?;
        validate(&window)?;
        Ok(window)
    }
}

/// Read a window description from disk.
///
/// Relative mesh paths are resolved against the file's directory.
pub fn load_window(path: impl AsRef<Path>) -> Result<Window, ConfigError> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut window = Window::from_toml_str(&source)?;
    if let Some(base) = path.parent() {
        rebase_meshes(&mut window, base);
    }
    Ok(window)
}

/// Every interface needs a scene, `scene_in_use` must point at one, and each
/// camera must describe a usable perspective projection
pub fn validate(window: &Window) -> Result<(), ConfigError> {
    for (index, interface) in window.interfaces.iter().enumerate() {
        if interface.scenes.is_empty() {
            return Err(ConfigError::Invalid {
                interface: index,
                reason: "no scenes defined".to_string(),
            });
        }
        if interface.active_scene().is_none() {
            return Err(ConfigError::Invalid {
                interface: index,
                reason: format!(
                    "scene_in_use is {} but only {} scenes exist",
                    interface.scene_in_use,
                    interface.scenes.len()
                ),
            });
        }
        for (scene_index, scene) in interface.scenes.iter().enumerate() {
            if let Some(problem) = scene.camera.projection_problem() {
                return Err(ConfigError::Invalid {
                    interface: index,
                    reason: format!("scene {} camera: {}", scene_index, problem),
                });
            }
        }
    }
    Ok(())
}

fn rebase_meshes(window: &mut Window, base: &Path) {
    let objects = window
        .interfaces
        .iter_mut()
        .flat_map(|interface| interface.scenes.iter_mut())
        .flat_map(|scene| scene.objects.iter_mut());

    for object in objects {
        if object.mesh.is_relative() && !object.mesh.as_os_str().is_empty() {
            object.mesh = base.join(&object.mesh);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::InterfaceKind;
    use crate::transform::EulerAngles;
    use std::env;

    const DEMO: &str = r#"
name = "demo"
size_x = 1024
size_y = 768

[[interface]]
type = "3D"
scene_in_use = 1

[[interface.scenes]]

[[interface.scenes]]
camera = { position = [0, -8, 3], aspect_ratio = 1.5, clip_start = 0.2, clip_end = 80 }

[[interface.scenes.objects]]
name = "crate"
mesh = "meshes/crate.obj"
position = [1, 2, 3]
rotation = [10, 20, 30]
material = { diffuse = [0.8, 0.2, 0.2], shininess = 12 }

[[interface]]
type = "HUD"
"#;

    #[test]
    fn test_parse_window() {
        let source = DEMO.replace("type = \"HUD\"", "type = \"HUD\"\nscenes = [{}]");
        let window = Window::from_toml_str(&source).unwrap();
        assert_eq!(window.name, "demo");
        assert_eq!((window.size_x, window.size_y), (1024, 768));
        assert_eq!(window.interfaces.len(), 2);
        assert_eq!(window.interfaces[1].kind, InterfaceKind::Other("HUD".to_string()));

        let scene = window.interfaces[0].active_scene().unwrap();
        assert_eq!(scene.camera.aspect_ratio, 1.5);
        assert_eq!(scene.camera.position, [0.0, -8.0, 3.0]);

        let object = &scene.objects[0];
        assert_eq!(object.name, "crate");
        assert_eq!(object.rotation, EulerAngles::new(10.0, 20.0, 30.0));
        assert_eq!(object.material.diffuse, [0.8, 0.2, 0.2]);
        assert_eq!(object.material.ambient, [0.2, 0.2, 0.2]);
        assert_eq!(object.transform, None);
    }

    #[test]
    fn test_interface_without_scenes_rejected() {
        let err = Window::from_toml_str(DEMO).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { interface: 1, .. }));
    }

    #[test]
    fn test_scene_in_use_out_of_range_rejected() {
        let source = "[[interface]]\nscene_in_use = 2\n[[interface.scenes]]\n";
        let err = Window::from_toml_str(source).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { interface: 0, .. }));

        assert!(matches!(
            Window::from_toml_str("size_x = \"wide\""),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn test_unusable_camera_rejected() {
        for camera in [
            "{ aspect_ratio = 0 }",
            "{ clip_start = 5, clip_end = 5 }",
            "{ clip_start = 0, clip_end = 10 }",
            "{ clip_start = 10, clip_end = 1 }",
        ] {
            let source = format!(
                "[[interface]]\n[[interface.scenes]]\n[[interface.scenes]]\ncamera = {}\n",
                camera
            );
            match Window::from_toml_str(&source) {
                Err(ConfigError::Invalid {
                    interface: 0,
                    reason,
                }) => assert!(reason.starts_with("scene 1 camera"), "{}", reason),
                other => panic!("{} was accepted: {:?}", camera, other.map(|w| w.name)),
            }
        }

        let source = "[[interface]]\n[[interface.scenes]]\n\
                      camera = { aspect_ratio = 2, clip_start = 1, clip_end = 2 }\n";
        assert!(Window::from_toml_str(source).is_ok());
    }

    #[test]
    fn test_load_window_rebases_meshes() {
        let dir = env::temp_dir().join(format!("xgn-config-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("scene.toml");
        fs::write(
            &path,
            "[[interface]]\n[[interface.scenes]]\n\
             [[interface.scenes.objects]]\nmesh = \"cube.stl\"\n",
        )
        .unwrap();

        let window = load_window(&path).unwrap();
        assert!(window.interfaces[0].is_3d());
        assert_eq!(window.interfaces[0].scenes[0].objects[0].mesh, dir.join("cube.stl"));

        assert!(matches!(
            load_window(dir.join("absent.toml")),
            Err(ConfigError::Io { .. })
        ));
    }
}
