use tracing::trace;

use crate::error::{LayoutError, Result};
use crate::topology::{FaceId, FaceStatus, HalfEdgeId, Turn};

use super::Refiner;

impl Refiner<'_> {
    /// Cuts every non-rectangular internal face at its reflex corners.
    ///
    /// Each cut runs straight from the reflex corner to a dummy vertex on
    /// the first edge ahead where the boundary has turned right once more
    /// than left.
    pub(super) fn refine_faces(&mut self) -> Result<()> {
        let mut pending: Vec<FaceId> = self
            .mesh
            .faces()
            .filter(|(_, f)| !f.external && f.status == FaceStatus::NeedsRefinement)
            .map(|(id, _)| id)
            .collect();
        pending.reverse();

        let limit = 2 * self.mesh.half_edge_count() + 8;
        let mut splits = 0;
        while let Some(face) = pending.pop() {
            let data = self.mesh.face(face)?;
            if data.external || data.status != FaceStatus::NeedsRefinement {
                continue;
            }
            let Some(he) = self.reflex_corner(data.incident)? else {
                self.mesh.set_face_status(face, FaceStatus::Rectangle)?;
                continue;
            };
            if splits >= limit {
                return Err(LayoutError::RefinementDiverged(splits).into());
            }
            splits += 1;
            let c = self.cut_corner(he)?;
            pending.push(self.mesh.face_of(c)?);
            pending.push(self.mesh.face_of(self.mesh.twin(c)?)?);
        }
        Ok(())
    }

    /// First half-edge of the cycle after which the boundary neither goes
    /// straight nor turns right.
    fn reflex_corner(&self, start: HalfEdgeId) -> Result<Option<HalfEdgeId>> {
        for he in self.mesh.cycle(start)? {
            let turn = self.side(he)?.turn_to(self.side(self.mesh.succ(he)?)?);
            if !matches!(turn, Turn::Straight | Turn::Right) {
                return Ok(Some(he));
            }
        }
        Ok(None)
    }

    fn cut_corner(&mut self, he: HalfEdgeId) -> Result<HalfEdgeId> {
        let front = self.find_front(he)?;
        let side = self.side(he)?;
        let dummy = self.split_with_dummy(front)?;
        let corner = self.mesh.node(self.mesh.dest(he)?)?;
        let dummy = self.mesh.node(dummy)?;
        trace!(%corner, %dummy, ?side, "cut reflex corner");
        self.connect(he, front, side)
    }

    fn find_front(&self, he: HalfEdgeId) -> Result<HalfEdgeId> {
        let mut winding = 0;
        for x in self.mesh.cycle(he)? {
            let next = self.mesh.succ(x)?;
            winding += self.side(x)?.turn_to(self.side(next)?).winding();
            if winding == 1 && !self.exempt.contains(&next) {
                return Ok(next);
            }
        }
        Err(LayoutError::FrontNotFound(self.mesh.node(self.mesh.dest(he)?)?.to_string()).into())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::super::tests::{assert_rectangular, rectangulate};
    use crate::topology::{FaceStatus, NodeKind};

    #[test]
    fn path_is_cut_into_rectangles() {
        let (mesh, rect) = rectangulate(&[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)], &[(0, 1), (1, 2)]);
        assert_rectangular(&mesh, &rect);
        let dummies = mesh
            .vertices()
            .filter(|(_, v)| v.node.kind == NodeKind::Dummy)
            .count();
        assert!(dummies >= 2);
        assert!(mesh.faces().filter(|(_, f)| f.status == FaceStatus::Rectangle).count() >= 2);
    }

    #[test]
    fn triangle_faces_are_rectangles() {
        let (mesh, rect) = rectangulate(&[(0.0, 0.0), (2.0, 0.0), (1.0, 2.0)], &[(0, 1), (1, 2), (2, 0)]);
        assert_rectangular(&mesh, &rect);
        assert_eq!(rect.segments.len(), 4);
    }

    #[test]
    fn crossing_drawing_is_rectangular() {
        let (mesh, rect) = rectangulate(
            &[(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)],
            &[(0, 1), (1, 2), (2, 3), (3, 0), (0, 2), (1, 3)],
        );
        assert_rectangular(&mesh, &rect);
    }
}
