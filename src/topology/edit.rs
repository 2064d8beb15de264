use crate::error::MeshError;

use super::{FaceId, HalfEdgeData, HalfEdgeId, Mesh, NodeId, Side, SideMap, VertexId};

impl Mesh {
    // --- Structural edits ---

    /// Creates a new component: two vertices joined by one edge, bounded by a fresh face.
    ///
    /// Returns the half-edge from `a` to `b`.
    ///
    /// # Errors
    ///
    /// Returns an error if either node id is already in the mesh.
    pub fn add_isolated_edge(&mut self, a: NodeId, b: NodeId) -> Result<HalfEdgeId, MeshError> {
        let va = self.add_vertex(a)?;
        let vb = self.add_vertex(b)?;
        let h = self.insert_half_edge(HalfEdgeData::detached(va));
        let t = self.insert_half_edge(HalfEdgeData::detached(vb));
        let face = self.insert_face(h);
        for (id, twin) in [(h, t), (t, h)] {
            let data = self.half_edge_mut(id)?;
            data.twin = twin;
            data.face = face;
        }
        self.link(h, t)?;
        self.link(t, h)?;
        self.vertex_mut(va)?.incident = Some(h);
        self.vertex_mut(vb)?.incident = Some(t);
        Ok(h)
    }

    /// Splits the edge of `he` (from `u` to `v`) with a new vertex `n`.
    ///
    /// `he` becomes `u -> n` and its old twin becomes `v -> n`; the two new
    /// half-edges `n -> v` and `n -> u` follow them around the same faces.
    /// Returns the new vertex.
    ///
    /// # Errors
    ///
    /// Returns an error if `he` is not found or `node` already exists.
    pub fn subdivide(&mut self, he: HalfEdgeId, node: NodeId) -> Result<VertexId, MeshError> {
        let t = self.twin(he)?;
        let s = self.succ(he)?;
        let s_twin = self.succ(t)?;
        let face_he = self.face_of(he)?;
        let face_t = self.face_of(t)?;

        let n = self.add_vertex(node)?;
        let he2 = self.insert_half_edge(HalfEdgeData {
            face: face_he,
            twin: t,
            ..HalfEdgeData::detached(n)
        });
        let t2 = self.insert_half_edge(HalfEdgeData {
            face: face_t,
            twin: he,
            ..HalfEdgeData::detached(n)
        });
        self.half_edge_mut(he)?.twin = t2;
        self.half_edge_mut(t)?.twin = he2;

        self.link(he2, s)?;
        self.link(t2, s_twin)?;
        self.link(he, he2)?;
        self.link(t, t2)?;
        self.vertex_mut(n)?.incident = Some(he2);
        Ok(n)
    }

    /// Inserts an edge from the head of `a_in` to the head of `b_in`.
    ///
    /// Both half-edges must bound the same face. If they lie on the same
    /// boundary cycle the face is split: the new half-edge `a -> b` (returned)
    /// keeps the old face and its twin bounds a new one. Otherwise the two
    /// cycles are merged into one.
    ///
    /// # Errors
    ///
    /// Returns an error if the corners are on different faces or at the same vertex.
    pub fn connect_corners(&mut self, a_in: HalfEdgeId, b_in: HalfEdgeId) -> Result<HalfEdgeId, MeshError> {
        let face = self.face_of(a_in)?;
        if self.face_of(b_in)? != face {
            return Err(MeshError::NotOnFace("corner"));
        }
        let a = self.dest(a_in)?;
        let b = self.dest(b_in)?;
        if a == b {
            return Err(MeshError::Inconsistent(format!(
                "cannot connect {} to itself",
                self.node(a)?
            )));
        }
        let a_out = self.succ(a_in)?;
        let b_out = self.succ(b_in)?;
        let same_cycle = self.walk_cycle(a_in).any(|he| he == b_in);

        let c = self.insert_half_edge(HalfEdgeData {
            face,
            ..HalfEdgeData::detached(a)
        });
        let c_twin = self.insert_half_edge(HalfEdgeData {
            face,
            twin: c,
            ..HalfEdgeData::detached(b)
        });
        self.half_edge_mut(c)?.twin = c_twin;

        self.link(a_in, c)?;
        self.link(c, b_out)?;
        self.link(b_in, c_twin)?;
        self.link(c_twin, a_out)?;

        if same_cycle {
            let new_face = self.insert_face(c_twin);
            for he in self.cycle(c_twin)? {
                self.half_edge_mut(he)?.face = new_face;
            }
            self.face_mut(face)?.incident = c;
        }
        Ok(c)
    }

    /// Connects vertices `a` and `b` across `face` with a new edge drawn on `side`.
    ///
    /// When a vertex touches `face` at several corners, the corner whose
    /// angular range contains the new edge's direction is used. Records
    /// `side` for the new `a -> b` half-edge (returned) and the opposite side
    /// for its twin.
    ///
    /// # Errors
    ///
    /// Returns an error if either vertex is not on `face` or the corner is ambiguous.
    pub fn connect_within_face(
        &mut self,
        face: FaceId,
        a: VertexId,
        b: VertexId,
        sides: &mut SideMap,
        side: Side,
    ) -> Result<HalfEdgeId, MeshError> {
        let a_in = self.corner_on_face(face, a, side, sides)?;
        let b_in = self.corner_on_face(face, b, side.opposite(), sides)?;
        let c = self.connect_corners(a_in, b_in)?;
        sides.insert(c, side);
        sides.insert(self.twin(c)?, side.opposite());
        Ok(c)
    }

    /// Adds a new vertex `node` and an edge to it from the head of `prev`,
    /// placed in the corner between `prev` and `succ`.
    ///
    /// Returns the half-edge towards the new vertex.
    ///
    /// # Errors
    ///
    /// Returns an error if `succ` does not follow `prev` around their face.
    pub fn extend_vertex(&mut self, prev: HalfEdgeId, succ: HalfEdgeId, node: NodeId) -> Result<HalfEdgeId, MeshError> {
        if self.succ(prev)? != succ {
            return Err(MeshError::NotOnFace("rotational slot"));
        }
        let a = self.dest(prev)?;
        let face = self.face_of(prev)?;
        let b = self.add_vertex(node)?;
        let c = self.insert_half_edge(HalfEdgeData {
            face,
            ..HalfEdgeData::detached(a)
        });
        let c_twin = self.insert_half_edge(HalfEdgeData {
            face,
            twin: c,
            ..HalfEdgeData::detached(b)
        });
        self.half_edge_mut(c)?.twin = c_twin;
        self.link(prev, c)?;
        self.link(c, c_twin)?;
        self.link(c_twin, succ)?;
        self.vertex_mut(b)?.incident = Some(c_twin);
        Ok(c)
    }

    /// Reassigns the cycle through `start` to `into`, dropping its old face
    /// once nothing references it.
    ///
    /// # Errors
    ///
    /// Returns an error if the cycle is open or a face is missing.
    pub fn absorb_cycle(&mut self, start: HalfEdgeId, into: FaceId) -> Result<(), MeshError> {
        let old = self.face_of(start)?;
        if old == into {
            return Ok(());
        }
        self.face(into)?;
        for he in self.cycle(start)? {
            self.half_edge_mut(he)?.face = into;
        }
        let incident = self.face(old)?.incident;
        if self.face_of(incident)? != old {
            if self.external == Some(old) {
                self.external = None;
            }
            self.remove_face(old)?;
        }
        Ok(())
    }

    /// Finds the half-edge arriving at `vertex` whose corner on `face` can
    /// take a new edge leaving on `leaving`.
    fn corner_on_face(
        &self,
        face: FaceId,
        vertex: VertexId,
        leaving: Side,
        sides: &SideMap,
    ) -> Result<HalfEdgeId, MeshError> {
        let mut candidates = Vec::new();
        for out in self.half_edges_around(vertex)? {
            if self.face_of(out)? == face {
                candidates.push(self.prev(out)?);
            }
        }
        match candidates.as_slice() {
            [] => Err(MeshError::NotOnFace("vertex")),
            [only] => Ok(*only),
            _ => {
                let mut admitting = Vec::new();
                for &x in &candidates {
                    if self.corner_admits(x, leaving, sides)? {
                        admitting.push(x);
                    }
                }
                match admitting.as_slice() {
                    [only] => Ok(*only),
                    _ => Err(MeshError::AmbiguousCorner(self.node(vertex)?.to_string())),
                }
            }
        }
    }

    /// Whether `leaving` lies strictly inside the corner after `arriving`.
    fn corner_admits(&self, arriving: HalfEdgeId, leaving: Side, sides: &SideMap) -> Result<bool, MeshError> {
        let out = self.succ(arriving)?;
        let (Some(&side_in), Some(&side_out)) = (sides.get(arriving), sides.get(out)) else {
            return Ok(false);
        };
        let low = side_out.index();
        let span = if self.twin(arriving)? == out {
            4
        } else {
            (side_in.index() + 2 + 4 - low) % 4
        };
        let offset = (leaving.index() + 4 - low) % 4;
        Ok(offset > 0 && offset < span)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::topology::NodeKind;

    fn node(i: usize) -> NodeId {
        NodeId::original(i)
    }

    /// Axis-aligned unit square 0-1-2-3 drawn clockwise in a y-up plane.
    fn square() -> Mesh {
        let nodes = [node(0), node(1), node(2), node(3)];
        // 0 (0,0), 1 (0,1), 2 (1,1), 3 (1,0)
        let rotation = vec![vec![1, 3], vec![2, 0], vec![3, 1], vec![0, 2]];
        Mesh::from_rotation_system(&nodes, &rotation, (1, 0)).unwrap()
    }

    #[test]
    fn isolated_edge_has_one_face() {
        let mut mesh = Mesh::new();
        let h = mesh.add_isolated_edge(node(0), node(1)).unwrap();
        let t = mesh.twin(h).unwrap();
        assert_eq!(mesh.succ(h).unwrap(), t);
        assert_eq!(mesh.succ(t).unwrap(), h);
        assert_eq!(mesh.face_count(), 1);
        mesh.validate().unwrap();
    }

    #[test]
    fn subdivide_keeps_faces_and_order() {
        let mut mesh = square();
        let v0 = mesh.vertex_by_node(node(0)).unwrap();
        let v1 = mesh.vertex_by_node(node(1)).unwrap();
        let he = mesh.find_half_edge(v0, v1).unwrap().unwrap();
        let face = mesh.face_of(he).unwrap();
        let twin_face = mesh.face_of(mesh.twin(he).unwrap()).unwrap();

        let n = mesh.subdivide(he, NodeId::new(NodeKind::Dummy, 0)).unwrap();
        mesh.validate().unwrap();

        assert_eq!(mesh.dest(he).unwrap(), n);
        let second = mesh.succ(he).unwrap();
        assert_eq!(mesh.origin(second).unwrap(), n);
        assert_eq!(mesh.dest(second).unwrap(), v1);
        assert_eq!(mesh.face_of(second).unwrap(), face);
        let t = mesh.find_half_edge(v1, n).unwrap().unwrap();
        assert_eq!(mesh.face_of(t).unwrap(), twin_face);
        assert_eq!(mesh.degree(n).unwrap(), 2);
        assert_eq!(mesh.boundary(face).unwrap().count(), 5);
    }

    #[test]
    fn subdivide_leaf_edge() {
        let mut mesh = Mesh::new();
        let h = mesh.add_isolated_edge(node(0), node(1)).unwrap();
        mesh.subdivide(h, NodeId::new(NodeKind::Bend, 0)).unwrap();
        mesh.validate().unwrap();
        assert_eq!(mesh.walk_cycle(h).count(), 4);
        assert_eq!(mesh.edge_count(), 2);
    }

    #[test]
    fn connect_corners_splits_face() {
        let mut mesh = square();
        let v0 = mesh.vertex_by_node(node(0)).unwrap();
        let v1 = mesh.vertex_by_node(node(1)).unwrap();
        let v2 = mesh.vertex_by_node(node(2)).unwrap();
        let v3 = mesh.vertex_by_node(node(3)).unwrap();
        let a_in = mesh.find_half_edge(v0, v1).unwrap().unwrap();
        let b_in = mesh.find_half_edge(v2, v3).unwrap().unwrap();
        let inner = mesh.face_of(a_in).unwrap();

        let c = mesh.connect_corners(a_in, b_in).unwrap();
        mesh.validate().unwrap();

        assert_eq!(mesh.face_count(), 3);
        assert_eq!(mesh.face_of(c).unwrap(), inner);
        assert_eq!(mesh.cycle(c).unwrap().len(), 3);
        let other = mesh.twin(c).unwrap();
        assert_ne!(mesh.face_of(other).unwrap(), inner);
        assert_eq!(mesh.cycle(other).unwrap().len(), 3);
        assert!(!mesh.face(mesh.face_of(other).unwrap()).unwrap().external);
    }

    #[test]
    fn connect_corners_rejects_foreign_face() {
        let mut mesh = square();
        let v0 = mesh.vertex_by_node(node(0)).unwrap();
        let v1 = mesh.vertex_by_node(node(1)).unwrap();
        let v2 = mesh.vertex_by_node(node(2)).unwrap();
        let inside = mesh.find_half_edge(v0, v1).unwrap().unwrap();
        let outside = mesh.find_half_edge(v2, v1).unwrap().unwrap();
        assert!(matches!(
            mesh.connect_corners(inside, outside),
            Err(MeshError::NotOnFace(_))
        ));
    }

    #[test]
    fn connect_within_face_picks_corner_by_side() {
        // Path 0-1-2 drawn left to right with a leaf 3 above vertex 2. The
        // middle vertex touches the single face twice.
        let nodes = [node(0), node(1), node(2)];
        let rotation = vec![vec![1], vec![2, 0], vec![1]];
        let mut mesh = Mesh::from_rotation_system(&nodes, &rotation, (0, 1)).unwrap();
        let v0 = mesh.vertex_by_node(node(0)).unwrap();
        let v1 = mesh.vertex_by_node(node(1)).unwrap();
        let v2 = mesh.vertex_by_node(node(2)).unwrap();
        let face = mesh.external_face().unwrap();

        let mut sides = SideMap::new();
        let e01 = mesh.find_half_edge(v0, v1).unwrap().unwrap();
        let e12 = mesh.find_half_edge(v1, v2).unwrap().unwrap();
        for he in [e01, e12] {
            sides.insert(he, Side::Right);
            sides.insert(mesh.twin(he).unwrap(), Side::Left);
        }
        let e21 = mesh.twin(e12).unwrap();
        let leaf = mesh.extend_vertex(e12, e21, node(3)).unwrap();
        sides.insert(leaf, Side::Up);
        sides.insert(mesh.twin(leaf).unwrap(), Side::Down);
        let tip = mesh.dest(leaf).unwrap();
        mesh.validate().unwrap();

        let c = mesh
            .connect_within_face(face, v1, tip, &mut sides, Side::Up)
            .unwrap();
        mesh.validate().unwrap();

        assert_eq!(mesh.prev(c).unwrap(), e01);
        assert_eq!(sides[c], Side::Up);
        assert_eq!(sides[mesh.twin(c).unwrap()], Side::Down);
        assert_eq!(mesh.face_count(), 2);
        assert_eq!(mesh.cycle(mesh.twin(c).unwrap()).unwrap().len(), 3);
    }

    #[test]
    fn extend_vertex_requires_consecutive_half_edges() {
        let mut mesh = square();
        let v0 = mesh.vertex_by_node(node(0)).unwrap();
        let v1 = mesh.vertex_by_node(node(1)).unwrap();
        let v2 = mesh.vertex_by_node(node(2)).unwrap();
        let e01 = mesh.find_half_edge(v0, v1).unwrap().unwrap();
        let e12 = mesh.find_half_edge(v1, v2).unwrap().unwrap();
        let e21 = mesh.twin(e12).unwrap();
        assert!(mesh.extend_vertex(e01, e21, node(9)).is_err());
        let c = mesh.extend_vertex(e01, e12, node(9)).unwrap();
        mesh.validate().unwrap();
        assert_eq!(mesh.degree(v1).unwrap(), 3);
        assert_eq!(mesh.face_of(c).unwrap(), mesh.face_of(e01).unwrap());
    }

    #[test]
    fn absorb_cycle_drops_empty_face() {
        let mut mesh = square();
        let outer = mesh.external_face().unwrap();
        let h = mesh.add_isolated_edge(node(10), node(11)).unwrap();
        assert_eq!(mesh.face_count(), 3);
        mesh.absorb_cycle(h, outer).unwrap();
        assert_eq!(mesh.face_count(), 2);
        assert_eq!(mesh.face_of(h).unwrap(), outer);
        mesh.validate().unwrap();
    }
}
