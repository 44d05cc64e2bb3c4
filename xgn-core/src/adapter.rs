/// Bridges the window/interface/scene/object description onto a scene graph and viewer.
///
/// Setup functions create nodes; the update functions only rewrite
/// transforms that already exist. The graph is always passed in explicitly.
use nalgebra::{Matrix4, Point3, Vector3};
use thiserror::Error;

use crate::assets::{MeshError, MeshSource};
use crate::diag::{self, DiagCode, Severity};
use crate::material::apply_material;
use crate::model::{Camera, Interface, Object, Scene, Window};
use crate::projection::{ViewCamera, FIELD_OF_VIEW_DEGREES};
use crate::scene_graph::{Geometry, NodeId, NodeKind, SceneError, SceneGraph};
use crate::transform::{compose_rotation, PositionAttitude};
use crate::viewer::Viewer;

/// Screen position new viewer windows open at
pub const WINDOW_ORIGIN: (i32, i32) = (100, 100);

/// Why an object was left out of the scene graph
#[derive(Debug, Error)]
pub enum SkipReason {
    #[error(transparent)]
    Mesh(#[from] MeshError),

    #[error(transparent)]
    Scene(#[from] SceneError),
}

/// Result of placing one object
#[derive(Debug)]
pub enum Attachment {
    Attached(NodeId),
    Skipped(SkipReason),
}

impl Attachment {
    pub fn node(&self) -> Option<NodeId> {
        match self {
            Attachment::Attached(id) => Some(*id),
            Attachment::Skipped(_) => None,
        }
    }
}

/// What a bulk setup pass attached and skipped
#[derive(Debug, Default)]
pub struct SetupReport {
    pub attached: Vec<NodeId>,
    pub skipped: Vec<SkipReason>,
}

/// Result of refreshing one object's transform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated,
    /// The object was never placed in the graph
    NotAttached,
    /// The object's node was removed; its handle has been cleared
    Stale,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateReport {
    pub updated: usize,
    pub not_attached: usize,
    pub stale: usize,
}

impl UpdateReport {
    fn record(&mut self, outcome: UpdateOutcome) {
        match outcome {
            UpdateOutcome::Updated => self.updated += 1,
            UpdateOutcome::NotAttached => self.not_attached += 1,
            UpdateOutcome::Stale => self.stale += 1,
        }
    }
}

pub fn setup_root() -> SceneGraph {
    diag::emit(DiagCode::SETUP_ROOT, Severity::Info, None);
    SceneGraph::new()
}

/// Position/attitude transform for an object's current placement
pub fn create_object_transform(object: &Object) -> PositionAttitude {
    diag::emit(DiagCode::CREATE_TRANSFORM, Severity::Info, None);
    PositionAttitude::from_placement(&object.position, &object.rotation)
}

/// Load an object's mesh and hang it under the root beneath its own transform.
///
/// A mesh that fails to resolve is logged and reported as skipped; the
/// graph is left untouched. Objects that are already attached keep their
/// existing transform.
pub fn load_object(
    graph: &mut SceneGraph,
    object: &mut Object,
    source: &dyn MeshSource,
) -> Attachment {
    diag::emit(DiagCode::LOAD_OBJECT, Severity::Info, Some(&object.label()));

    if let Some(id) = object.transform.filter(|id| graph.contains(*id)) {
        return Attachment::Attached(id);
    }

    let mesh = match source.load_mesh(&object.mesh) {
        Ok(mesh) => mesh,
        Err(error) => {
            diag::emit(
                DiagCode::MESH_LOAD_FAILED,
                Severity::Error,
                Some(&format!("Failed to load: {}", error.path().display())),
            );
            return Attachment::Skipped(error.into());
        }
    };

    let mut geometry = Geometry::new(mesh);
    apply_material(&object.material, &mut geometry.state);

    match attach(graph, create_object_transform(object), geometry) {
        Ok(id) => {
            object.transform = Some(id);
            Attachment::Attached(id)
        }
        Err(error) => Attachment::Skipped(error.into()),
    }
}

fn attach(
    graph: &mut SceneGraph,
    transform: PositionAttitude,
    geometry: Geometry,
) -> Result<NodeId, SceneError> {
    let id = graph.add_child(graph.root(), NodeKind::Transform(transform))?;
    graph.add_child(id, NodeKind::Geometry(geometry))?;
    Ok(id)
}

/// Attach every object in the active scene of each 3D interface
pub fn setup_objects(
    graph: &mut SceneGraph,
    window: &mut Window,
    source: &dyn MeshSource,
) -> SetupReport {
    diag::emit(DiagCode::SETUP_OBJECTS, Severity::Info, None);
    let mut report = SetupReport::default();

    for interface in window.interfaces.iter_mut().filter(|i| i.is_3d()) {
        let Some(scene) = active_scene_or_warn(interface) else {
            continue;
        };
        for object in scene.objects.iter_mut() {
            match load_object(graph, object, source) {
                Attachment::Attached(id) => report.attached.push(id),
                Attachment::Skipped(reason) => report.skipped.push(reason),
            }
        }
    }

    report
}

/// Rewrite an attached object's transform from its current position and rotation
pub fn update_object(graph: &mut SceneGraph, object: &mut Object) -> UpdateOutcome {
    let Some(id) = object.transform else {
        return UpdateOutcome::NotAttached;
    };

    match graph.transform_mut(id) {
        Ok(transform) => {
            transform.set_placement(&object.position, &object.rotation);
            UpdateOutcome::Updated
        }
        Err(error) => {
            diag::emit(
                DiagCode::STALE_TRANSFORM,
                Severity::Warning,
                Some(&format!("{}: {}", object.label(), error)),
            );
            object.transform = None;
            UpdateOutcome::Stale
        }
    }
}

/// Refresh every attached object in the active scene of each 3D interface
pub fn update_objects(graph: &mut SceneGraph, window: &mut Window) -> UpdateReport {
    let mut report = UpdateReport::default();

    for interface in window.interfaces.iter_mut().filter(|i| i.is_3d()) {
        let Some(scene) = active_scene_or_warn(interface) else {
            continue;
        };
        for object in scene.objects.iter_mut() {
            report.record(update_object(graph, object));
        }
    }

    report
}

fn active_scene_or_warn(interface: &mut Interface) -> Option<&mut Scene> {
    let index = interface.scene_in_use;
    let count = interface.scenes.len();
    let scene = interface.active_scene_mut();
    if scene.is_none() {
        diag::emit(
            DiagCode::NO_ACTIVE_SCENE,
            Severity::Warning,
            Some(&format!("scene_in_use {} but only {} scenes", index, count)),
        );
    }
    scene
}

/// Initial view: look at the world origin with +Z up, fixed field of view.
///
/// Clip or aspect values that cannot form a projection leave the previous
/// projection in place.
pub fn setup_camera(camera: &Camera, viewer: &mut Viewer) {
    diag::emit(DiagCode::SETUP_CAMERA, Severity::Info, None);
    let view = viewer.camera_mut();

    view.set_view_look_at(&Point3::from(camera.position), &Point3::origin(), &Vector3::z());
    if let Some(problem) = camera.projection_problem() {
        diag::emit(DiagCode::INVALID_CAMERA, Severity::Warning, Some(&problem));
        return;
    }
    view.set_perspective(
        FIELD_OF_VIEW_DEGREES,
        camera.aspect_ratio,
        camera.clip_start,
        camera.clip_end,
    );
}

/// Per-frame view: look one unit down world -Z from the eye, +Y up, with the
/// camera rotation applied ahead of the look-at.
pub fn update_camera_position(view: &mut ViewCamera, camera: &Camera) {
    let rotation = compose_rotation(&camera.rotation);
    let eye = Point3::from(camera.position);
    let center = eye - Vector3::z();

    let look_at = Matrix4::look_at_rh(&eye, &center, &Vector3::y());
    view.set_view_matrix(look_at * rotation.to_homogeneous());
}

/// Size and title the viewer window after the window description
pub fn setup_view(viewer: &mut Viewer, window: &Window) {
    diag::emit(DiagCode::SETUP_VIEW, Severity::Info, None);
    let (x, y) = WINDOW_ORIGIN;
    viewer.set_up_view_in_window(x, y, window.size_x, window.size_y);
    viewer.set_window_name(&window.name);
}

/// Build a viewer for a window: view, camera of the first interface, then objects
pub fn setup_viewer(window: &mut Window, source: &dyn MeshSource) -> (Viewer, SetupReport) {
    let mut viewer = Viewer::new();
    setup_view(&mut viewer, window);

    match window.interfaces.first().and_then(Interface::active_scene) {
        Some(scene) => setup_camera(&scene.camera, &mut viewer),
        None => diag::emit(
            DiagCode::NO_ACTIVE_SCENE,
            Severity::Warning,
            Some("first interface has no active scene, keeping default camera"),
        ),
    }

    let mut root = setup_root();
    let report = setup_objects(&mut root, window, source);
    viewer.set_scene_data(root);

    (viewer, report)
}
