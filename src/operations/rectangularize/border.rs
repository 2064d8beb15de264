use tracing::{trace, warn};

use crate::error::{LayoutError, Result};
use crate::topology::{FaceId, HalfEdgeId, NodeCounter, NodeKind, Side, Turn};

use super::Refiner;

impl Refiner<'_> {
    /// Frames the drawing with a border rectangle and ties the outer
    /// boundary to it with one straight edge.
    ///
    /// The old external face becomes the region between drawing and
    /// border; the outside of the rectangle becomes external.
    pub(super) fn attach_border(&mut self) -> Result<()> {
        let old_ext = self.mesh.external_face()?;
        let outer = self.mesh.cycle(self.mesh.face(old_ext)?.incident)?;
        let (he, side) = self.attachment(&outer)?;

        let walls = self.build_border(old_ext)?;
        let front = walls[side.rotate(1).index()];
        let dummy = self.split_with_dummy(front)?;
        self.connect(he, front, side)?;
        trace!(
            vertex = %self.mesh.node(self.mesh.dest(he)?)?,
            dummy = %self.mesh.node(dummy)?,
            ?side,
            "attached border"
        );
        Ok(())
    }

    /// Builds the four border walls inside `old_ext`; returns the inner
    /// wall half-edges indexed by [`Side::index`].
    fn build_border(&mut self, old_ext: FaceId) -> Result<[HalfEdgeId; 4]> {
        let mut corners = NodeCounter::new(NodeKind::Border);
        let down = self.mesh.add_isolated_edge(corners.next_id(), corners.next_id())?;
        let back = self.mesh.twin(down)?;
        let right = self.mesh.extend_vertex(down, back, corners.next_id())?;
        let right_back = self.mesh.twin(right)?;
        let up = self.mesh.extend_vertex(right, right_back, corners.next_id())?;
        let left = self.mesh.connect_corners(up, back)?;

        let walls = [down, right, up, left];
        for (&wall, side) in walls.iter().zip(Side::ALL) {
            self.sides.insert(wall, side);
            self.sides.insert(self.mesh.twin(wall)?, side.opposite());
        }
        let outside = self.mesh.face_of(self.mesh.twin(left)?)?;
        self.mesh.absorb_cycle(down, old_ext)?;
        self.mesh.set_external(outside)?;
        Ok(walls)
    }

    /// Picks the outer-boundary corner whose straight continuation reaches
    /// the border: a reflex corner at a vertex of degree two or less, else
    /// any left turn.
    fn attachment(&self, outer: &[HalfEdgeId]) -> Result<(HalfEdgeId, Side)> {
        let mut fallback = None;
        for &he in outer {
            let side = self.side(he)?;
            let turn = side.turn_to(self.side(self.mesh.succ(he)?)?);
            if matches!(turn, Turn::Straight | Turn::Right) {
                continue;
            }
            if self.mesh.degree(self.mesh.dest(he)?)? <= 2 {
                return Ok((he, side));
            }
            if turn == Turn::Left && fallback.is_none() {
                fallback = Some((he, side));
            }
        }
        match fallback {
            Some((he, side)) => {
                warn!(
                    vertex = %self.mesh.node(self.mesh.dest(he)?)?,
                    "no low-degree reflex corner on the outer boundary, attaching the border elsewhere"
                );
                Ok((he, side))
            }
            None => Err(LayoutError::NoBorderAttachment.into()),
        }
    }
}
