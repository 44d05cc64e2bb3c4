/// Viewer state: window placement, camera and the scene being shown
use crate::projection::ViewCamera;
use crate::scene_graph::SceneGraph;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowTraits {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub title: String,
}

#[derive(Debug, Clone, Default)]
pub struct Viewer {
    window: Option<WindowTraits>,
    camera: ViewCamera,
    scene: Option<SceneGraph>,
}

impl Viewer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the view in a window at the given screen rectangle
    pub fn set_up_view_in_window(&mut self, x: i32, y: i32, width: u32, height: u32) {
        let title = self.window.take().map(|w| w.title).unwrap_or_default();
        self.window = Some(WindowTraits {
            x,
            y,
            width,
            height,
            title,
        });
    }

    /// Retitle the window; has no effect before the view is set up
    pub fn set_window_name(&mut self, name: &str) {
        if let Some(window) = self.window.as_mut() {
            window.title = name.to_string();
        }
    }

    pub fn window(&self) -> Option<&WindowTraits> {
        self.window.as_ref()
    }

    pub fn camera(&self) -> &ViewCamera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut ViewCamera {
        &mut self.camera
    }

    pub fn set_scene_data(&mut self, scene: SceneGraph) {
        self.scene = Some(scene);
    }

    pub fn scene(&self) -> Option<&SceneGraph> {
        self.scene.as_ref()
    }

    pub fn scene_mut(&mut self) -> Option<&mut SceneGraph> {
        self.scene.as_mut()
    }

    /// Split borrow for update passes that touch scene and camera together
    pub fn parts_mut(&mut self) -> (Option<&mut SceneGraph>, &mut ViewCamera) {
        (self.scene.as_mut(), &mut self.camera)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_name_needs_window() {
        let mut viewer = Viewer::new();
        viewer.set_window_name("ignored");
        assert!(viewer.window().is_none());

        viewer.set_up_view_in_window(100, 100, 640, 480);
        viewer.set_window_name("orbit");
        let window = viewer.window().unwrap();
        assert_eq!((window.x, window.width, window.height), (100, 640, 480));
        assert_eq!(window.title, "orbit");
    }
}
