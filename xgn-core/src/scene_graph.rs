/// Arena-backed scene graph with generational node handles
///
/// The graph owns every node. Callers hold [`NodeId`]s, which stop resolving
/// once the node they name is removed, even if its slot is later reused.
use std::fmt;

use nalgebra::Matrix4;
use thiserror::Error;

use crate::geometry::Mesh;
use crate::material::RenderState;
use crate::transform::PositionAttitude;

/// Non-owning handle to a node in a [`SceneGraph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SceneError {
    #[error("node {0} is no longer in the scene graph")]
    StaleHandle(NodeId),

    #[error("node {id} is not a {expected} node")]
    WrongKind { id: NodeId, expected: &'static str },

    #[error("the root node cannot be removed")]
    RootRemoval,
}

/// Renderable triangles plus the state they are drawn with
#[derive(Debug, Clone, Default)]
pub struct Geometry {
    pub mesh: Mesh,
    pub state: RenderState,
}

impl Geometry {
    pub fn new(mesh: Mesh) -> Self {
        Self {
            mesh,
            state: RenderState::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Group,
    Transform(PositionAttitude),
    Geometry(Geometry),
}

#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

#[derive(Debug, Clone)]
pub struct SceneGraph {
    slots: Vec<Slot>,
    free: Vec<u32>,
    root: NodeId,
}

impl SceneGraph {
    /// A graph holding only an empty root group
    pub fn new() -> Self {
        let root = Node {
            kind: NodeKind::Group,
            parent: None,
            children: Vec::new(),
        };
        Self {
            slots: vec![Slot {
                generation: 0,
                node: Some(root),
            }],
            free: Vec::new(),
            root: NodeId {
                index: 0,
                generation: 0,
            },
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of live nodes, root included
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.node.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.children(self.root).is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    /// Children of a node; empty for stale handles
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(Node::children).unwrap_or(&[])
    }

    /// Create a node beneath `parent`
    pub fn add_child(&mut self, parent: NodeId, kind: NodeKind) -> Result<NodeId, SceneError> {
        if !self.contains(parent) {
            return Err(SceneError::StaleHandle(parent));
        }

        let node = Node {
            kind,
            parent: Some(parent),
            children: Vec::new(),
        };
        let id = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.node = Some(node);
                NodeId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                NodeId {
                    index,
                    generation: 0,
                }
            }
        };

        if let Some(parent) = self.get_mut(parent) {
            parent.children.push(id);
        }
        Ok(id)
    }

    /// Detach and drop a node with its whole subtree. Returns how many nodes went away.
    pub fn remove(&mut self, id: NodeId) -> Result<usize, SceneError> {
        if id == self.root {
            return Err(SceneError::RootRemoval);
        }
        let parent = self.get(id).ok_or(SceneError::StaleHandle(id))?.parent;

        if let Some(parent) = parent.and_then(|p| self.get_mut(p)) {
            parent.children.retain(|child| *child != id);
        }

        let mut removed = 0;
        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            let slot = &mut self.slots[next.index as usize];
            if let Some(node) = slot.node.take() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(next.index);
                pending.extend(node.children);
                removed += 1;
            }
        }
        Ok(removed)
    }

    pub fn transform(&self, id: NodeId) -> Result<&PositionAttitude, SceneError> {
        match &self.get(id).ok_or(SceneError::StaleHandle(id))?.kind {
            NodeKind::Transform(transform) => Ok(transform),
            _ => Err(SceneError::WrongKind {
                id,
                expected: "transform",
            }),
        }
    }

    pub fn transform_mut(&mut self, id: NodeId) -> Result<&mut PositionAttitude, SceneError> {
        match &mut self.get_mut(id).ok_or(SceneError::StaleHandle(id))?.kind {
            NodeKind::Transform(transform) => Ok(transform),
            _ => Err(SceneError::WrongKind {
                id,
                expected: "transform",
            }),
        }
    }

    pub fn geometry_mut(&mut self, id: NodeId) -> Result<&mut Geometry, SceneError> {
        match &mut self.get_mut(id).ok_or(SceneError::StaleHandle(id))?.kind {
            NodeKind::Geometry(geometry) => Ok(geometry),
            _ => Err(SceneError::WrongKind {
                id,
                expected: "geometry",
            }),
        }
    }

    /// Every geometry node paired with its local-to-world matrix, depth first
    pub fn geometries(&self) -> Vec<(Matrix4<f64>, &Geometry)> {
        let mut found = Vec::new();
        let mut pending = vec![(self.root, Matrix4::identity())];

        while let Some((id, parent_world)) = pending.pop() {
            let Some(node) = self.get(id) else { continue };
            let world = match &node.kind {
                NodeKind::Transform(transform) => parent_world * transform.matrix(),
                NodeKind::Geometry(geometry) => {
                    found.push((parent_world, geometry));
                    parent_world
                }
                NodeKind::Group => parent_world,
            };
            pending.extend(node.children.iter().rev().map(|child| (*child, world)));
        }

        found
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::EulerAngles;
    use nalgebra::Point3;

    #[test]
    fn test_new_graph_has_only_root() {
        let graph = SceneGraph::new();
        assert_eq!(graph.len(), 1);
        assert!(graph.is_empty());
        assert!(matches!(graph.get(graph.root()).unwrap().kind, NodeKind::Group));
    }

    #[test]
    fn test_removed_handles_go_stale() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let transform = graph
            .add_child(root, NodeKind::Transform(PositionAttitude::identity()))
            .unwrap();
        let geometry = graph
            .add_child(transform, NodeKind::Geometry(Geometry::new(Mesh::cube(1.0))))
            .unwrap();
        assert_eq!(graph.len(), 3);
        assert_eq!(graph.get(geometry).unwrap().parent(), Some(transform));

        assert_eq!(graph.remove(transform), Ok(2));
        assert!(graph.is_empty());
        assert_eq!(graph.transform(transform), Err(SceneError::StaleHandle(transform)));
        assert!(!graph.contains(geometry));

        // The freed slot is reused under a new generation
        let replacement = graph.add_child(root, NodeKind::Group).unwrap();
        assert!(graph.contains(replacement));
        assert!(!graph.contains(transform) && !graph.contains(geometry));
        assert_eq!(graph.remove(root), Err(SceneError::RootRemoval));
    }

    #[test]
    fn test_kind_mismatch() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        assert_eq!(
            graph.transform_mut(root),
            Err(SceneError::WrongKind {
                id: root,
                expected: "transform"
            })
        );
        assert!(graph.geometry_mut(root).is_err());
    }

    #[test]
    fn test_geometry_world_matrix() {
        let mut graph = SceneGraph::new();
        let outer =
            PositionAttitude::from_placement(&[0.0, 0.0, 5.0], &EulerAngles::new(0.0, 0.0, 90.0));
        let inner = PositionAttitude::from_placement(&[1.0, 0.0, 0.0], &EulerAngles::zero());

        let outer_id = graph.add_child(graph.root(), NodeKind::Transform(outer)).unwrap();
        let inner_id = graph.add_child(outer_id, NodeKind::Transform(inner)).unwrap();
        graph
            .add_child(inner_id, NodeKind::Geometry(Geometry::new(Mesh::new())))
            .unwrap();

        let found = graph.geometries();
        assert_eq!(found.len(), 1);
        // Inner offset along X is turned onto Y by the outer roll
        let origin = found[0].0.transform_point(&Point3::origin());
        assert!((origin - Point3::new(0.0, 1.0, 5.0)).norm() < 1e-9);
    }
}
