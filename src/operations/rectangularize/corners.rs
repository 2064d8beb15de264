use std::collections::VecDeque;

use tracing::trace;

use crate::error::{LayoutError, Result};
use crate::math::GridVector;
use crate::topology::{FaceStatus, HalfEdgeId, NodeKind, Side, Turn, VertexId};

use super::Refiner;

/// Where an edge heads once it leaves its first bend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lean {
    Left,
    Middle,
    Right,
}

/// An outgoing half-edge of a vertex together with its lean.
#[derive(Debug, Clone, Copy)]
struct Port {
    he: HalfEdgeId,
    lean: Lean,
}

impl Refiner<'_> {
    /// Separates edges that leave an original vertex on the same side.
    ///
    /// Ports sharing a side are offset perpendicular to it and, from the
    /// middle port outwards, each outer port's first bend is tied to a dummy
    /// on its inner neighbour with a zero-length edge. The degenerate
    /// triangles this creates are exempt from refinement.
    pub(super) fn merge_degenerate_corners(&mut self) -> Result<()> {
        let originals: Vec<VertexId> = self
            .mesh
            .vertices()
            .filter(|(_, v)| v.node.kind.is_original())
            .map(|(id, _)| id)
            .collect();
        for vertex in originals {
            self.spread_vertex(vertex)?;
        }
        Ok(())
    }

    fn spread_vertex(&mut self, vertex: VertexId) -> Result<()> {
        let mut ring = VecDeque::new();
        for he in self.mesh.rotation(vertex)? {
            ring.push_back((he, self.side(he)?));
        }
        // Rotate so that no side group wraps around the ends.
        let mut steps = 0;
        while ring.len() > 1 && ring.front().map(|p| p.1) == ring.back().map(|p| p.1) {
            if steps >= ring.len() {
                return Err(LayoutError::CollapsedVertex(self.mesh.node(vertex)?.to_string()).into());
            }
            ring.rotate_left(1);
            steps += 1;
        }

        let mut groups: [Vec<Port>; 4] = Default::default();
        for (he, side) in ring {
            let dest = self.mesh.dest(he)?;
            let lean = if self.mesh.node(dest)?.kind == NodeKind::Bend {
                match side.turn_to(self.side(self.mesh.succ(he)?)?) {
                    Turn::Right => Lean::Right,
                    Turn::Left => Lean::Left,
                    Turn::Straight | Turn::Reverse => Lean::Middle,
                }
            } else {
                Lean::Middle
            };
            groups[side.index()].push(Port { he, lean });
        }

        for side in Side::ALL {
            let group = std::mem::take(&mut groups[side.index()]);
            if group.is_empty() {
                continue;
            }
            let mid = self.middle_port(&group)?;
            self.shift_ports(side, &group, mid)?;
            for i in (0..mid).rev() {
                self.merge_ports(group[i + 1], group[i])?;
            }
            for i in mid + 1..group.len() {
                self.merge_ports(group[i - 1], group[i])?;
            }
        }
        Ok(())
    }

    /// The port that stays in place: the first straight one, else the
    /// first right-leaning one, else the last.
    fn middle_port(&self, group: &[Port]) -> Result<usize> {
        let mut mid = group
            .iter()
            .position(|p| p.lean == Lean::Middle)
            .or_else(|| group.iter().position(|p| p.lean == Lean::Right))
            .unwrap_or(group.len().saturating_sub(1));

        // A left lean whose bend immediately doubles back must be the one subdivided.
        if mid > 0 && group[mid - 1].lean == Lean::Left && group[mid].lean == Lean::Right {
            let bend_in = self.mesh.succ(group[mid - 1].he)?;
            let bend_out = self.mesh.succ(bend_in)?;
            if self.side(bend_in)? == self.side(bend_out)?.opposite() {
                mid -= 1;
            }
        }
        Ok(mid)
    }

    fn shift_ports(&mut self, side: Side, group: &[Port], mid: usize) -> Result<()> {
        for (i, port) in group.iter().enumerate() {
            let dest = self.mesh.dest(port.he)?;
            #[allow(clippy::cast_possible_wrap)]
            let d = i as i64 - mid as i64;
            let shift = match side {
                Side::Down => GridVector::new(2 * d, 0),
                Side::Right => GridVector::new(0, -d),
                Side::Up => GridVector::new(-2 * d, 0),
                Side::Left => GridVector::new(0, d),
            };
            let current = self.offsets.get(dest).copied().unwrap_or_else(GridVector::zeros);
            self.offsets.insert(dest, current + shift);
        }
        Ok(())
    }

    /// Ties the first bend of `outer` to a new dummy on `inner`.
    fn merge_ports(&mut self, inner: Port, outer: Port) -> Result<()> {
        let bend_out = self.mesh.succ(outer.he)?;
        let toward_trunk = self.side(self.mesh.twin(bend_out)?)?;
        let outer_back = self.mesh.twin(outer.he)?;
        let bend_corner = self.mesh.prev(outer_back)?;
        let trunk_back = self.mesh.twin(inner.he)?;

        let dummy = self.split_with_dummy(inner.he)?;
        let bend = self.mesh.node(self.mesh.dest(outer.he)?)?;
        let dummy = self.mesh.node(dummy)?;
        trace!(%bend, %dummy, lean = ?outer.lean, "merged ports");
        let c = if outer.lean == Lean::Right {
            self.connect(bend_corner, inner.he, toward_trunk)?
        } else {
            self.connect(trunk_back, outer.he, toward_trunk.opposite())?
        };

        let c_twin = self.mesh.twin(c)?;
        let triangle = self.mesh.face_of(c_twin)?;
        self.mesh.set_face_status(triangle, FaceStatus::ExemptTriangle)?;
        self.exempt.insert(c);
        self.exempt.insert(c_twin);
        Ok(())
    }
}
