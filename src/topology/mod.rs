mod build;
mod edit;
pub mod face;
pub mod half_edge;
pub mod side;
mod traverse;
pub mod vertex;

pub use face::{FaceData, FaceId, FaceStatus};
pub use half_edge::{HalfEdgeData, HalfEdgeId};
pub use side::{Side, SideMap, Turn};
pub use traverse::Circulator;
pub use vertex::{NodeCounter, NodeId, NodeKind, VertexData, VertexId};

use std::collections::HashMap;

use crate::error::MeshError;
use slotmap::SlotMap;

/// Half-edge mesh (DCEL) of a planar embedding.
///
/// Entities reference each other via typed IDs (generational indices),
/// avoiding self-referential structures and enabling safe mutation.
/// Every face lies to the right of its half-edges; the vertex rotation
/// is clockwise, so `twin(prev(e))` is the next outgoing half-edge after `e`.
#[derive(Debug, Default, Clone)]
pub struct Mesh {
    vertices: SlotMap<VertexId, VertexData>,
    half_edges: SlotMap<HalfEdgeId, HalfEdgeData>,
    faces: SlotMap<FaceId, FaceData>,
    nodes: HashMap<NodeId, VertexId>,
    external: Option<FaceId>,
}

impl Mesh {
    /// Creates a new, empty mesh.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Vertex operations ---

    /// Inserts an isolated vertex and returns its ID.
    ///
    /// # Errors
    ///
    /// Returns an error if a vertex with the same node id already exists.
    pub fn add_vertex(&mut self, node: NodeId) -> Result<VertexId, MeshError> {
        if self.nodes.contains_key(&node) {
            return Err(MeshError::Inconsistent(format!("duplicate node {node}")));
        }
        let id = self.vertices.insert(VertexData::new(node));
        self.nodes.insert(node, id);
        Ok(id)
    }

    /// Returns a reference to the vertex data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the mesh.
    pub fn vertex(&self, id: VertexId) -> Result<&VertexData, MeshError> {
        self.vertices
            .get(id)
            .ok_or(MeshError::EntityNotFound("vertex"))
    }

    pub(crate) fn vertex_mut(&mut self, id: VertexId) -> Result<&mut VertexData, MeshError> {
        self.vertices
            .get_mut(id)
            .ok_or(MeshError::EntityNotFound("vertex"))
    }

    /// Iterates over all vertices in insertion order.
    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &VertexData)> {
        self.vertices.iter()
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Looks up the vertex carrying `node`.
    #[must_use]
    pub fn vertex_by_node(&self, node: NodeId) -> Option<VertexId> {
        self.nodes.get(&node).copied()
    }

    /// Returns the node id of a vertex.
    ///
    /// # Errors
    ///
    /// Returns an error if the vertex is not found.
    pub fn node(&self, id: VertexId) -> Result<NodeId, MeshError> {
        Ok(self.vertex(id)?.node)
    }

    /// Number of edges incident to a vertex.
    ///
    /// # Errors
    ///
    /// Returns an error if the vertex is not found or its rotation is broken.
    pub fn degree(&self, id: VertexId) -> Result<usize, MeshError> {
        Ok(self.half_edges_around(id)?.count())
    }

    // --- Half-edge operations ---

    /// Returns a reference to the half-edge data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the mesh.
    pub fn half_edge(&self, id: HalfEdgeId) -> Result<&HalfEdgeData, MeshError> {
        self.half_edges
            .get(id)
            .ok_or(MeshError::EntityNotFound("half-edge"))
    }

    pub(crate) fn half_edge_mut(&mut self, id: HalfEdgeId) -> Result<&mut HalfEdgeData, MeshError> {
        self.half_edges
            .get_mut(id)
            .ok_or(MeshError::EntityNotFound("half-edge"))
    }

    /// Iterates over all half-edges in insertion order.
    pub fn half_edges(&self) -> impl Iterator<Item = (HalfEdgeId, &HalfEdgeData)> {
        self.half_edges.iter()
    }

    #[must_use]
    pub fn half_edge_count(&self) -> usize {
        self.half_edges.len()
    }

    /// Number of undirected edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.half_edges.len() / 2
    }

    /// # Errors
    ///
    /// Returns an error if the half-edge is not found.
    pub fn origin(&self, id: HalfEdgeId) -> Result<VertexId, MeshError> {
        Ok(self.half_edge(id)?.origin)
    }

    /// Vertex the half-edge points to.
    ///
    /// # Errors
    ///
    /// Returns an error if the half-edge or its twin is not found.
    pub fn dest(&self, id: HalfEdgeId) -> Result<VertexId, MeshError> {
        self.origin(self.twin(id)?)
    }

    /// # Errors
    ///
    /// Returns an error if the half-edge is not found.
    pub fn twin(&self, id: HalfEdgeId) -> Result<HalfEdgeId, MeshError> {
        Ok(self.half_edge(id)?.twin)
    }

    /// # Errors
    ///
    /// Returns an error if the half-edge is not found.
    pub fn succ(&self, id: HalfEdgeId) -> Result<HalfEdgeId, MeshError> {
        Ok(self.half_edge(id)?.succ)
    }

    /// # Errors
    ///
    /// Returns an error if the half-edge is not found.
    pub fn prev(&self, id: HalfEdgeId) -> Result<HalfEdgeId, MeshError> {
        Ok(self.half_edge(id)?.prev)
    }

    /// Face to the right of the half-edge.
    ///
    /// # Errors
    ///
    /// Returns an error if the half-edge is not found.
    pub fn face_of(&self, id: HalfEdgeId) -> Result<FaceId, MeshError> {
        Ok(self.half_edge(id)?.face)
    }

    /// The half-edge from `from` to `to`, if the two vertices are adjacent.
    ///
    /// # Errors
    ///
    /// Returns an error if `from` is not found.
    pub fn find_half_edge(&self, from: VertexId, to: VertexId) -> Result<Option<HalfEdgeId>, MeshError> {
        for he in self.half_edges_around(from)? {
            if self.dest(he)? == to {
                return Ok(Some(he));
            }
        }
        Ok(None)
    }

    pub(crate) fn insert_half_edge(&mut self, data: HalfEdgeData) -> HalfEdgeId {
        self.half_edges.insert(data)
    }

    /// Makes `b` follow `a` around their face.
    pub(crate) fn link(&mut self, a: HalfEdgeId, b: HalfEdgeId) -> Result<(), MeshError> {
        self.half_edge_mut(a)?.succ = b;
        self.half_edge_mut(b)?.prev = a;
        Ok(())
    }

    // --- Face operations ---

    /// Returns a reference to the face data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the mesh.
    pub fn face(&self, id: FaceId) -> Result<&FaceData, MeshError> {
        self.faces.get(id).ok_or(MeshError::EntityNotFound("face"))
    }

    pub(crate) fn face_mut(&mut self, id: FaceId) -> Result<&mut FaceData, MeshError> {
        self.faces
            .get_mut(id)
            .ok_or(MeshError::EntityNotFound("face"))
    }

    pub(crate) fn insert_face(&mut self, incident: HalfEdgeId) -> FaceId {
        self.faces.insert(FaceData::new(incident))
    }

    pub(crate) fn remove_face(&mut self, id: FaceId) -> Result<(), MeshError> {
        self.faces
            .remove(id)
            .map(|_| ())
            .ok_or(MeshError::EntityNotFound("face"))
    }

    /// Iterates over all faces in insertion order.
    pub fn faces(&self) -> impl Iterator<Item = (FaceId, &FaceData)> {
        self.faces.iter()
    }

    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// The unbounded face.
    ///
    /// # Errors
    ///
    /// Returns an error if no face has been marked external.
    pub fn external_face(&self) -> Result<FaceId, MeshError> {
        self.external.ok_or(MeshError::EntityNotFound("external face"))
    }

    /// Marks `id` as the one external face, clearing the flag elsewhere.
    ///
    /// # Errors
    ///
    /// Returns an error if the face is not found.
    pub fn set_external(&mut self, id: FaceId) -> Result<(), MeshError> {
        self.face(id)?;
        if let Some(old) = self.external.take() {
            if let Some(face) = self.faces.get_mut(old) {
                face.external = false;
            }
        }
        self.face_mut(id)?.external = true;
        self.external = Some(id);
        Ok(())
    }

    /// Moves a face out of `NeedsRefinement`.
    ///
    /// # Errors
    ///
    /// Returns an error if the face is not found or already settled in another state.
    pub fn set_face_status(&mut self, id: FaceId, status: FaceStatus) -> Result<(), MeshError> {
        let face = self.face_mut(id)?;
        if face.status != FaceStatus::NeedsRefinement && face.status != status {
            return Err(MeshError::Inconsistent(format!(
                "face status cannot move from {:?} to {status:?}",
                face.status
            )));
        }
        face.status = status;
        Ok(())
    }

    /// Checks twin symmetry, cycle closure and face/vertex back-references.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), MeshError> {
        for (id, he) in &self.half_edges {
            if self.twin(he.twin)? != id {
                return Err(MeshError::Inconsistent("twin is not an involution".into()));
            }
            if he.twin == id {
                return Err(MeshError::Inconsistent("half-edge is its own twin".into()));
            }
            if self.prev(he.succ)? != id {
                return Err(MeshError::Inconsistent("succ/prev mismatch".into()));
            }
            if self.face_of(he.succ)? != he.face {
                return Err(MeshError::Inconsistent("boundary cycle changes face".into()));
            }
            if self.origin(he.succ)? != self.dest(id)? {
                return Err(MeshError::Inconsistent("boundary cycle is not connected".into()));
            }
        }
        for (id, face) in &self.faces {
            if self.face_of(face.incident)? != id {
                return Err(MeshError::Inconsistent("face incident is off the face".into()));
            }
            self.cycle(face.incident)?;
        }
        for (id, vertex) in &self.vertices {
            if let Some(he) = vertex.incident {
                if self.origin(he)? != id {
                    return Err(MeshError::Inconsistent("vertex incident leaves elsewhere".into()));
                }
            }
        }
        if self.faces.values().filter(|f| f.external).count() > 1 {
            return Err(MeshError::Inconsistent("more than one external face".into()));
        }
        Ok(())
    }
}
