use crate::error::MeshError;

use super::{FaceId, HalfEdgeId, Mesh, VertexId};

#[derive(Debug, Clone, Copy)]
enum Step {
    /// `succ` around a face.
    Boundary,
    /// `twin(prev)`, clockwise around a vertex.
    Rotation,
}

/// Lazy walk around a face boundary or a vertex rotation.
///
/// Stops when it comes back to the start, after at most as many steps as
/// the mesh has half-edges, or at the first dangling link. Clone it to
/// restart from the same element.
#[derive(Debug, Clone)]
pub struct Circulator<'a> {
    mesh: &'a Mesh,
    start: HalfEdgeId,
    next: Option<HalfEdgeId>,
    step: Step,
    remaining: usize,
}

impl<'a> Circulator<'a> {
    fn new(mesh: &'a Mesh, start: HalfEdgeId, step: Step) -> Self {
        Self {
            mesh,
            start,
            next: Some(start),
            step,
            remaining: mesh.half_edge_count(),
        }
    }

    fn empty(mesh: &'a Mesh) -> Self {
        Self {
            mesh,
            start: HalfEdgeId::default(),
            next: None,
            step: Step::Rotation,
            remaining: 0,
        }
    }

    fn advance(&self, current: HalfEdgeId) -> Option<HalfEdgeId> {
        let data = self.mesh.half_edges.get(current)?;
        match self.step {
            Step::Boundary => Some(data.succ),
            Step::Rotation => self.mesh.half_edges.get(data.prev).map(|p| p.twin),
        }
    }
}

impl Iterator for Circulator<'_> {
    type Item = HalfEdgeId;

    fn next(&mut self) -> Option<HalfEdgeId> {
        let current = self.next?;
        if self.remaining == 0 {
            self.next = None;
            return None;
        }
        self.remaining -= 1;
        self.next = self
            .advance(current)
            .filter(|&following| following != self.start);
        Some(current)
    }
}

impl Mesh {
    // --- Traversal ---

    /// Half-edges of the boundary cycle starting at `start`.
    #[must_use]
    pub fn walk_cycle(&self, start: HalfEdgeId) -> Circulator<'_> {
        Circulator::new(self, start, Step::Boundary)
    }

    /// Half-edges bounding `face`, starting at its incident half-edge.
    ///
    /// # Errors
    ///
    /// Returns an error if the face is not found.
    pub fn boundary(&self, face: FaceId) -> Result<Circulator<'_>, MeshError> {
        Ok(self.walk_cycle(self.face(face)?.incident))
    }

    /// Outgoing half-edges of `vertex` in clockwise order.
    ///
    /// # Errors
    ///
    /// Returns an error if the vertex is not found.
    pub fn half_edges_around(&self, vertex: VertexId) -> Result<Circulator<'_>, MeshError> {
        Ok(match self.vertex(vertex)?.incident {
            Some(start) => Circulator::new(self, start, Step::Rotation),
            None => Circulator::empty(self),
        })
    }

    /// Faces around `vertex`, one per corner, in clockwise order.
    ///
    /// # Errors
    ///
    /// Returns an error if the vertex is not found.
    pub fn faces_around(&self, vertex: VertexId) -> Result<impl Iterator<Item = FaceId> + '_, MeshError> {
        Ok(self
            .half_edges_around(vertex)?
            .filter_map(|he| self.half_edges.get(he).map(|data| data.face)))
    }

    /// Collects the cycle through `start`, failing if it does not close.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::OpenCycle`] if the walk does not return to `start`.
    pub fn cycle(&self, start: HalfEdgeId) -> Result<Vec<HalfEdgeId>, MeshError> {
        let mut cycle = Vec::new();
        let mut current = start;
        loop {
            cycle.push(current);
            if cycle.len() > self.half_edge_count() {
                return Err(MeshError::OpenCycle);
            }
            current = self.succ(current)?;
            if current == start {
                return Ok(cycle);
            }
        }
    }

    /// Collects the rotation of `vertex`, failing if it does not close.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::OpenCycle`] if the rotation does not return to its start.
    pub fn rotation(&self, vertex: VertexId) -> Result<Vec<HalfEdgeId>, MeshError> {
        let Some(start) = self.vertex(vertex)?.incident else {
            return Ok(Vec::new());
        };
        let mut rotation = Vec::new();
        let mut current = start;
        loop {
            rotation.push(current);
            if rotation.len() > self.half_edge_count() {
                return Err(MeshError::OpenCycle);
            }
            current = self.twin(self.prev(current)?)?;
            if current == start {
                return Ok(rotation);
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::super::NodeId;
    use super::*;

    /// Hub 0 with leaves 1, 2, 3 in clockwise order.
    fn star() -> (Mesh, VertexId) {
        let nodes: Vec<NodeId> = (0..4).map(NodeId::original).collect();
        let rotation = vec![vec![1, 2, 3], vec![0], vec![0], vec![0]];
        let mesh = Mesh::from_rotation_system(&nodes, &rotation, (1, 0)).unwrap();
        let hub = mesh.vertex_by_node(NodeId::original(0)).unwrap();
        (mesh, hub)
    }

    #[test]
    fn circulators_close_and_restart() {
        let (mesh, hub) = star();
        let around = mesh.half_edges_around(hub).unwrap();
        assert_eq!(around.clone().count(), 3);
        assert_eq!(around.clone().collect::<Vec<_>>(), mesh.rotation(hub).unwrap());

        let ext = mesh.external_face().unwrap();
        let boundary: Vec<_> = mesh.boundary(ext).unwrap().collect();
        assert_eq!(boundary.len(), 6);
        assert_eq!(boundary, mesh.cycle(boundary[0]).unwrap());
    }

    #[test]
    fn leaf_rotation_is_its_only_edge() {
        let (mesh, _) = star();
        let leaf = mesh.vertex_by_node(NodeId::original(2)).unwrap();
        let rotation = mesh.rotation(leaf).unwrap();
        assert_eq!(rotation.len(), 1);
        assert_eq!(mesh.faces_around(leaf).unwrap().count(), 1);
    }

    #[test]
    fn isolated_vertex_has_empty_rotation() {
        let mut mesh = Mesh::new();
        let v = mesh.add_vertex(NodeId::original(0)).unwrap();
        assert_eq!(mesh.half_edges_around(v).unwrap().count(), 0);
        assert!(mesh.rotation(v).unwrap().is_empty());
    }
}
