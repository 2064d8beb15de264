//! Turns an orthogonal representation into a mesh of rectangular faces.
//!
//! Bends become vertices, every half-edge gets a drawing [`Side`], vertices
//! with flat corners are spread apart, the drawing is framed by a border
//! rectangle and every remaining face is cut by dummy edges until it is a
//! rectangle.

mod bends;
mod border;
mod corners;
mod faces;

use std::collections::HashSet;

use slotmap::SecondaryMap;
use tracing::debug;

use crate::error::{MeshError, Result};
use crate::math::GridVector;
use crate::operations::orthogonalize::OrthogonalRepresentation;
use crate::topology::{HalfEdgeId, Mesh, NodeCounter, NodeKind, Side, SideMap, VertexId};

/// Output of [`Rectangularize`].
#[derive(Debug, Clone, Default)]
pub struct Rectangulation {
    pub sides: SideMap,
    /// Port-spreading shift of vertices next to a flat corner, in grid cells.
    pub offsets: SecondaryMap<VertexId, GridVector>,
    /// Drawn edges: the input edges split at crossings and bends.
    pub segments: Vec<(VertexId, VertexId)>,
    /// Zero-length edges closing degenerate triangles; both halves listed.
    pub exempt_edges: HashSet<HalfEdgeId>,
}

impl Rectangulation {
    #[must_use]
    pub fn side(&self, he: HalfEdgeId) -> Option<Side> {
        self.sides.get(he).copied()
    }

    #[must_use]
    pub fn offset(&self, vertex: VertexId) -> GridVector {
        self.offsets.get(vertex).copied().unwrap_or_else(GridVector::zeros)
    }

    #[must_use]
    pub fn is_exempt(&self, he: HalfEdgeId) -> bool {
        self.exempt_edges.contains(&he)
    }
}

/// Refines a planar mesh in place according to an orthogonal shape.
pub struct Rectangularize<'a> {
    shape: &'a OrthogonalRepresentation,
}

impl<'a> Rectangularize<'a> {
    /// Creates a new `Rectangularize` operation for `shape`, which must have
    /// been computed on the mesh later passed to [`Rectangularize::execute`].
    #[must_use]
    pub fn new(shape: &'a OrthogonalRepresentation) -> Self {
        Self { shape }
    }

    /// Executes the rectangularization.
    ///
    /// # Errors
    ///
    /// Returns an error if the shape does not fit the mesh, a vertex cannot
    /// be spread, the border cannot be attached or a face cannot be refined.
    pub fn execute(&self, mesh: &mut Mesh) -> Result<Rectangulation> {
        if mesh.half_edge_count() == 0 {
            return Ok(Rectangulation::default());
        }
        let angles = bends::materialize_bends(mesh, self.shape)?;
        let segments = bends::segments(mesh)?;
        let sides = bends::assign_sides(mesh, &angles)?;

        let mut refiner = Refiner::new(mesh, sides);
        refiner.merge_degenerate_corners()?;
        refiner.attach_border()?;
        refiner.refine_faces()?;

        debug!(
            vertices = refiner.mesh.vertex_count(),
            faces = refiner.mesh.face_count(),
            dummies = refiner.dummies.issued(),
            triangles = refiner.exempt.len() / 2,
            "rectangularized"
        );
        Ok(Rectangulation {
            sides: refiner.sides,
            offsets: refiner.offsets,
            segments,
            exempt_edges: refiner.exempt,
        })
    }
}

/// Mutable state shared by the refinement passes.
struct Refiner<'m> {
    mesh: &'m mut Mesh,
    sides: SideMap,
    offsets: SecondaryMap<VertexId, GridVector>,
    exempt: HashSet<HalfEdgeId>,
    dummies: NodeCounter,
}

impl<'m> Refiner<'m> {
    fn new(mesh: &'m mut Mesh, sides: SideMap) -> Self {
        Self {
            mesh,
            sides,
            offsets: SecondaryMap::new(),
            exempt: HashSet::new(),
            dummies: NodeCounter::new(NodeKind::Dummy),
        }
    }

    fn side(&self, he: HalfEdgeId) -> Result<Side> {
        Ok(*self
            .sides
            .get(he)
            .ok_or(MeshError::EntityNotFound("half-edge side"))?)
    }

    /// Splits `he` with a new dummy vertex; all four halves keep the side
    /// of the edge they came from. `he` ends at the new vertex.
    fn split_with_dummy(&mut self, he: HalfEdgeId) -> Result<VertexId> {
        let side = self.side(he)?;
        let dummy = self.mesh.subdivide(he, self.dummies.next_id())?;
        let ahead = self.mesh.succ(he)?;
        let behind = self.mesh.twin(he)?;
        self.sides.insert(ahead, side);
        self.sides.insert(behind, side.opposite());
        Ok(dummy)
    }

    /// Connects the heads of `a_in` and `b_in` and draws the new edge on `side`.
    fn connect(&mut self, a_in: HalfEdgeId, b_in: HalfEdgeId, side: Side) -> Result<HalfEdgeId> {
        let c = self.mesh.connect_corners(a_in, b_in)?;
        self.sides.insert(c, side);
        self.sides.insert(self.mesh.twin(c)?, side.opposite());
        Ok(c)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::flow::Deadline;
    use crate::math::Point2;
    use crate::operations::embedding::Planarize;
    use crate::operations::orthogonalize::Orthogonalize;
    use crate::topology::{FaceStatus, Turn};

    pub(super) fn rectangulate(coords: &[(f64, f64)], edges: &[(usize, usize)]) -> (Mesh, Rectangulation) {
        let pos: Vec<Point2> = coords.iter().map(|&(x, y)| Point2::new(x, y)).collect();
        let mut mesh = Planarize::new(&pos, edges).execute().unwrap();
        let shape = Orthogonalize::new(Deadline::none()).execute(&mesh).unwrap();
        let rect = Rectangularize::new(&shape).execute(&mut mesh).unwrap();
        (mesh, rect)
    }

    /// Every non-exempt internal face turns right exactly four times.
    pub(super) fn assert_rectangular(mesh: &Mesh, rect: &Rectangulation) {
        mesh.validate().unwrap();
        for (he, data) in mesh.half_edges() {
            assert_eq!(rect.side(he).unwrap(), rect.side(data.twin).unwrap().opposite());
        }
        for (_, face) in mesh.faces() {
            if face.external {
                continue;
            }
            if face.status == FaceStatus::ExemptTriangle {
                assert!(mesh.walk_cycle(face.incident).any(|he| rect.is_exempt(he)));
                continue;
            }
            assert_eq!(face.status, FaceStatus::Rectangle);
            let turns: Vec<Turn> = mesh
                .walk_cycle(face.incident)
                .map(|he| {
                    let next = mesh.succ(he).unwrap();
                    rect.side(he).unwrap().turn_to(rect.side(next).unwrap())
                })
                .collect();
            assert_eq!(turns.iter().filter(|&&t| t == Turn::Right).count(), 4);
            assert!(turns.iter().all(|&t| matches!(t, Turn::Right | Turn::Straight)));
        }
        let ext = mesh.external_face().unwrap();
        let corners = mesh
            .walk_cycle(mesh.face(ext).unwrap().incident)
            .filter(|&he| mesh.node(mesh.origin(he).unwrap()).unwrap().kind == NodeKind::Border)
            .count();
        assert_eq!(corners, 4);
    }

    #[test]
    fn single_edge() {
        let (mesh, rect) = rectangulate(&[(0.0, 0.0), (0.0, 1.0)], &[(0, 1)]);
        assert_rectangular(&mesh, &rect);
        assert_eq!(rect.segments.len(), 1);
        assert!(rect.exempt_edges.is_empty());
    }

    #[test]
    fn square_cycle() {
        let (mesh, rect) = rectangulate(
            &[(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)],
            &[(0, 1), (1, 2), (2, 3), (3, 0)],
        );
        assert_rectangular(&mesh, &rect);
        assert_eq!(rect.segments.len(), 4);
    }

    #[test]
    fn k4() {
        let (mesh, rect) = rectangulate(
            &[(0.0, 0.0), (4.0, 0.0), (2.0, 3.0), (2.0, 1.0)],
            &[(0, 1), (1, 2), (2, 0), (0, 3), (1, 3), (2, 3)],
        );
        assert_rectangular(&mesh, &rect);
    }

    #[test]
    fn star_with_flat_corner_is_spread() {
        let coords = [(0.0, 0.0), (2.0, 0.0), (1.0, 2.0), (-1.0, 2.0), (-2.0, -0.5), (0.5, -2.0)];
        let edges: Vec<(usize, usize)> = (1..=5).map(|leaf| (0, leaf)).collect();
        let (mesh, rect) = rectangulate(&coords, &edges);
        assert_rectangular(&mesh, &rect);
        assert_eq!(rect.exempt_edges.len(), 2);
        assert!(rect.offsets.values().any(|v| *v != GridVector::zeros()));
    }
}
