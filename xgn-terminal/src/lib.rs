/// Terminal viewer for XGN window descriptions
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self},
};
use log::info;
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};
use xgn_core::adapter::{self, SetupReport, UpdateReport};
use xgn_core::{EulerAngles, MeshSource, Viewer, Window};

pub mod renderer;

pub use renderer::AsciiRenderer;

/// Degrees per key press
const ROTATE_STEP: f64 = 5.0;
/// Scene units per key press
const MOVE_STEP: f64 = 0.5;
/// Yaw added to every object each frame while spinning
const SPIN_STEP: f64 = 1.5;

/// User input that changes the window description between frames
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Control {
    RotateObjects(EulerAngles),
    MoveCamera([f64; 3]),
    ToggleSpin,
    Quit,
}

impl Control {
    pub fn from_key(code: KeyCode) -> Option<Self> {
        let rotate = |p, y, r| Some(Control::RotateObjects(EulerAngles::new(p, y, r)));
        let step = MOVE_STEP;
        match code {
            KeyCode::Char('q') | KeyCode::Esc => Some(Control::Quit),
            KeyCode::Char(' ') => Some(Control::ToggleSpin),
            KeyCode::Char('w') => rotate(ROTATE_STEP, 0.0, 0.0),
            KeyCode::Char('s') => rotate(-ROTATE_STEP, 0.0, 0.0),
            KeyCode::Char('a') => rotate(0.0, -ROTATE_STEP, 0.0),
            KeyCode::Char('d') => rotate(0.0, ROTATE_STEP, 0.0),
            KeyCode::Char('e') => rotate(0.0, 0.0, ROTATE_STEP),
            KeyCode::Char('r') => rotate(0.0, 0.0, -ROTATE_STEP),
            KeyCode::Left => Some(Control::MoveCamera([-step, 0.0, 0.0])),
            KeyCode::Right => Some(Control::MoveCamera([step, 0.0, 0.0])),
            KeyCode::Up => Some(Control::MoveCamera([0.0, step, 0.0])),
            KeyCode::Down => Some(Control::MoveCamera([0.0, -step, 0.0])),
            KeyCode::PageUp => Some(Control::MoveCamera([0.0, 0.0, step])),
            KeyCode::PageDown => Some(Control::MoveCamera([0.0, 0.0, -step])),
            _ => None,
        }
    }
}

/// Holds the window description and the viewer built from it
pub struct SceneSession {
    window: Window,
    viewer: Viewer,
    spinning: bool,
    camera_moved: bool,
}

impl SceneSession {
    pub fn new(mut window: Window, source: &dyn MeshSource) -> (Self, SetupReport) {
        let (viewer, report) = adapter::setup_viewer(&mut window, source);
        info!(
            "scene ready: {} objects attached, {} skipped",
            report.attached.len(),
            report.skipped.len()
        );
        let session = Self {
            window,
            viewer,
            spinning: true,
            camera_moved: false,
        };
        (session, report)
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn viewer(&self) -> &Viewer {
        &self.viewer
    }

    pub fn is_spinning(&self) -> bool {
        self.spinning
    }

    /// Apply a control; returns false when the session should end
    pub fn apply(&mut self, control: Control) -> bool {
        match control {
            Control::Quit => return false,
            Control::ToggleSpin => self.spinning = !self.spinning,
            Control::RotateObjects(delta) => {
                for scene in self.window.active_3d_scenes_mut() {
                    for object in scene.objects.iter_mut() {
                        object.rotation.rotate(delta.pitch, delta.yaw, delta.roll);
                    }
                }
            }
            Control::MoveCamera(delta) => {
                if let Some(scene) = self.window.active_3d_scenes_mut().next() {
                    for (axis, d) in scene.camera.position.iter_mut().zip(delta) {
                        *axis += d;
                    }
                    self.camera_moved = true;
                }
            }
        }
        true
    }

    /// Advance one frame: spin, then push object and camera state into the viewer
    pub fn tick(&mut self) -> UpdateReport {
        if self.spinning {
            for scene in self.window.active_3d_scenes_mut() {
                for object in scene.objects.iter_mut() {
                    object.rotation.rotate(0.0, SPIN_STEP, 0.0);
                }
            }
        }

        let (scene, view) = self.viewer.parts_mut();
        if self.camera_moved {
            if let Some(active) = self.window.active_3d_scenes_mut().next() {
                adapter::update_camera_position(view, &active.camera);
            }
        }
        match scene {
            Some(graph) => adapter::update_objects(graph, &mut self.window),
            None => UpdateReport::default(),
        }
    }
}

/// Main application struct for terminal 3D rendering
pub struct TerminalApp {
    session: SceneSession,
    renderer: AsciiRenderer,
    running: bool,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(session: SceneSession) -> io::Result<Self> {
        let (width, height) = terminal::size()?;

        Ok(Self {
            session,
            renderer: AsciiRenderer::new(width as usize, height as usize),
            running: true,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn run(&mut self) -> io::Result<()> {
        let title = self
            .session
            .viewer()
            .window()
            .map(|w| w.title.clone())
            .unwrap_or_default();

        terminal::enable_raw_mode()?;
        execute!(
            stdout(),
            terminal::EnterAlternateScreen,
            terminal::SetTitle(&title),
            cursor::Hide
        )?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let target_frame_time = Duration::from_millis(1000 / 30); // 30 FPS target

        while self.running {
            let frame_start = Instant::now();

            if event::poll(Duration::from_millis(0))? {
                self.handle_input()?;
            }

            self.session.tick();
            self.render()?;

            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    fn handle_input(&mut self) -> io::Result<()> {
        if let Event::Key(KeyEvent { code, .. }) = event::read()? {
            if let Some(control) = Control::from_key(code) {
                self.running = self.session.apply(control);
            }
        }
        Ok(())
    }

    fn render(&mut self) -> io::Result<()> {
        self.renderer.clear();

        let viewer = self.session.viewer();
        if let Some(scene) = viewer.scene() {
            self.renderer.render_scene(scene, viewer.camera());
        }

        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;
        self.renderer.draw(&mut stdout)?;

        let name = &self.session.window().name;
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "{} | FPS: {:.1} | WASD/ER=Rotate Arrows/PgUp/PgDn=Camera Space=Spin Q=Quit",
                name, self.fps
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Matrix4, Point3};
    use xgn_core::{Interface, InterfaceKind, Mesh, MeshLibrary, Object, Scene};

    fn session() -> SceneSession {
        let mut library = MeshLibrary::new();
        library.insert("cube", Mesh::cube(1.0));
        let scene = Scene {
            objects: vec![Object::new("cube"), Object::new("missing")],
            ..Scene::default()
        };
        let window = Window {
            interfaces: vec![Interface::new(InterfaceKind::ThreeD, vec![scene])],
            ..Window::default()
        };
        let (session, report) = SceneSession::new(window, &library);
        assert_eq!(report.attached.len(), 1);
        assert_eq!(report.skipped.len(), 1);
        session
    }

    #[test]
    fn test_demo_scene_loads_with_one_missing_mesh() {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../demos/spinning_shapes.toml");
        let window = xgn_core::load_window(path).unwrap();
        let (session, report) = SceneSession::new(window, &xgn_core::FileMeshLoader);

        assert_eq!(report.attached.len(), 2);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(session.viewer().window().unwrap().title, "Spinning shapes");
        assert_eq!(session.viewer().scene().unwrap().geometries().len(), 2);
    }

    #[test]
    fn test_demo_stays_framed_after_camera_move() {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../demos/spinning_shapes.toml");
        let window = xgn_core::load_window(path).unwrap();
        let (mut session, _) = SceneSession::new(window, &xgn_core::FileMeshLoader);
        let shapes = [Point3::new(-2.5, 0.0, 0.0), Point3::new(2.5, 0.0, 0.0)];

        let framed = |session: &SceneSession| {
            shapes.iter().all(|p| {
                session
                    .viewer()
                    .camera()
                    .project_to_screen(p, &Matrix4::identity(), 80, 40)
                    .is_some()
            })
        };

        assert!(framed(&session));
        let setup_view = *session.viewer().camera().view_matrix();

        session.apply(Control::from_key(KeyCode::Left).unwrap());
        session.tick();
        assert_ne!(session.viewer().camera().view_matrix(), &setup_view);
        assert!(framed(&session));
    }

    #[test]
    fn test_key_mapping() {
        assert_eq!(Control::from_key(KeyCode::Char('q')), Some(Control::Quit));
        assert_eq!(
            Control::from_key(KeyCode::Char('d')),
            Some(Control::RotateObjects(EulerAngles::new(0.0, ROTATE_STEP, 0.0)))
        );
        assert_eq!(Control::from_key(KeyCode::Char('x')), None);
    }

    #[test]
    fn test_tick_updates_attached_objects_only() {
        let mut session = session();
        let report = session.tick();
        assert_eq!(report.updated, 1);
        assert_eq!(report.not_attached, 1);

        let object = &session.window().interfaces[0].scenes[0].objects[0];
        assert_eq!(object.rotation.yaw, SPIN_STEP);
    }

    #[test]
    fn test_controls_mutate_window() {
        let mut session = session();
        assert!(session.apply(Control::ToggleSpin));
        assert!(!session.is_spinning());

        session.apply(Control::RotateObjects(EulerAngles::new(5.0, 0.0, 0.0)));
        session.apply(Control::MoveCamera([0.0, 0.0, 1.0]));
        let before = *session.viewer().camera().view_matrix();
        session.tick();

        let scene = &session.window().interfaces[0].scenes[0];
        assert_eq!(scene.objects[0].rotation.pitch, 5.0);
        assert_eq!(scene.camera.position[2], 5.0);
        assert_ne!(session.viewer().camera().view_matrix(), &before);
        assert!(!session.apply(Control::Quit));
    }
}
