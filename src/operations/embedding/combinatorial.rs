use std::collections::{HashMap, VecDeque};

use tracing::{debug, trace};

use crate::error::{InputError, MeshError, Result};
use crate::topology::{FaceId, HalfEdgeId, Mesh, NodeCounter, NodeId, NodeKind, VertexId};

use super::planarity::{is_planar, planar_rotation};

/// Builds the initial mesh of a connected graph that comes without a drawing.
///
/// A DFS spanning tree is grown into a maximal planar subgraph by adding the
/// remaining edges in input order while the result stays planar. That
/// subgraph is embedded combinatorially; each edge left out is then routed
/// along a shortest path in the dual, with a [`NodeKind::Crossing`] vertex
/// wherever it cuts an edge. The face with the longest boundary is external.
pub struct Embed<'a> {
    node_count: usize,
    edges: &'a [(usize, usize)],
}

impl<'a> Embed<'a> {
    /// Creates a new `Embed` operation over nodes `0..node_count`.
    #[must_use]
    pub fn new(node_count: usize, edges: &'a [(usize, usize)]) -> Self {
        Self { node_count, edges }
    }

    /// Executes the embedding.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown endpoints or loops, or if the mesh edits fail.
    pub fn execute(&self) -> Result<Mesh> {
        for &(a, b) in self.edges {
            if a >= self.node_count || b >= self.node_count {
                return Err(InputError::UnknownNode(a.max(b)).into());
            }
            if a == b {
                return Err(InputError::SelfLoop(a.to_string()).into());
            }
        }

        let kept = self.planar_subgraph();
        let planar: Vec<(usize, usize)> = self
            .edges
            .iter()
            .zip(&kept)
            .filter_map(|(&edge, &keep)| keep.then_some(edge))
            .collect();
        let rotation = planar_rotation(self.node_count, &planar)
            .ok_or_else(|| MeshError::InvalidRotation("planar subgraph has no embedding".into()))?;

        let nodes: Vec<NodeId> = (0..self.node_count).map(NodeId::original).collect();
        let external = planar.first().copied().unwrap_or_default();
        let mut mesh = Mesh::from_rotation_system(&nodes, &rotation, external)?;

        let mut crossings = NodeCounter::new(NodeKind::Crossing);
        for (&(a, b), _) in self.edges.iter().zip(&kept).filter(|&(_, &keep)| !keep) {
            let u = vertex_of(&mesh, a)?;
            let v = vertex_of(&mesh, b)?;
            let before = crossings.issued();
            route_edge(&mut mesh, u, v, &mut crossings)?;
            trace!(a, b, crossings = crossings.issued() - before, "routed edge through the dual");
        }

        let longest = mesh
            .faces()
            .map(|(id, face)| (id, mesh.walk_cycle(face.incident).count()))
            .min_by_key(|&(_, length)| std::cmp::Reverse(length))
            .map(|(id, _)| id);
        if let Some(face) = longest {
            mesh.set_external(face)?;
        }
        debug!(
            vertices = mesh.vertex_count(),
            deferred = kept.iter().filter(|&&keep| !keep).count(),
            crossings = crossings.issued(),
            faces = mesh.face_count(),
            "embedded graph"
        );
        Ok(mesh)
    }

    /// Marks the edges of a maximal planar subgraph that contains a DFS tree.
    fn planar_subgraph(&self) -> Vec<bool> {
        let mut adjacency: Vec<Vec<(usize, usize)>> = vec![Vec::new(); self.node_count];
        for (index, &(a, b)) in self.edges.iter().enumerate() {
            adjacency[a].push((b, index));
            adjacency[b].push((a, index));
        }

        let mut kept = vec![false; self.edges.len()];
        let mut seen = vec![false; self.node_count];
        for root in 0..self.node_count {
            if seen[root] {
                continue;
            }
            seen[root] = true;
            let mut stack = vec![(root, 0)];
            while let Some((v, next)) = stack.pop() {
                let Some(&(w, index)) = adjacency[v].get(next) else { continue };
                stack.push((v, next + 1));
                if !seen[w] {
                    seen[w] = true;
                    kept[index] = true;
                    stack.push((w, 0));
                }
            }
        }

        let mut planar: Vec<(usize, usize)> = self
            .edges
            .iter()
            .zip(&kept)
            .filter_map(|(&edge, &keep)| keep.then_some(edge))
            .collect();
        for (index, &edge) in self.edges.iter().enumerate() {
            if kept[index] {
                continue;
            }
            planar.push(edge);
            if is_planar(self.node_count, &planar) {
                kept[index] = true;
            } else {
                planar.pop();
            }
        }
        kept
    }
}

fn vertex_of(mesh: &Mesh, index: usize) -> Result<VertexId> {
    Ok(mesh
        .vertex_by_node(NodeId::original(index))
        .ok_or(MeshError::EntityNotFound("vertex"))?)
}

/// Half-edges arriving at `vertex`, keyed by the face they bound. The first corner wins.
fn corners(mesh: &Mesh, vertex: VertexId) -> Result<Vec<(FaceId, HalfEdgeId)>> {
    let mut corners: Vec<(FaceId, HalfEdgeId)> = Vec::new();
    for out in mesh.half_edges_around(vertex)? {
        let arriving = mesh.prev(out)?;
        let face = mesh.face_of(arriving)?;
        if !corners.iter().any(|&(seen, _)| seen == face) {
            corners.push((face, arriving));
        }
    }
    Ok(corners)
}

/// Inserts the edge `u -- v` through the fewest edges of the current mesh.
fn route_edge(mesh: &mut Mesh, u: VertexId, v: VertexId, crossings: &mut NodeCounter) -> Result<()> {
    let starts = corners(mesh, u)?;
    let targets = corners(mesh, v)?;
    let target_corner = |face: FaceId| targets.iter().find(|&&(f, _)| f == face).map(|&(_, he)| he);

    // Breadth-first search over faces; each face remembers the half-edge crossed to leave its parent.
    let mut entered: HashMap<FaceId, Option<HalfEdgeId>> = HashMap::new();
    let mut queue = VecDeque::new();
    for &(face, _) in &starts {
        entered.insert(face, None);
        queue.push_back(face);
    }
    let mut reached = None;
    while let Some(face) = queue.pop_front() {
        if target_corner(face).is_some() {
            reached = Some(face);
            break;
        }
        let incident = mesh.face(face)?.incident;
        for he in mesh.walk_cycle(incident) {
            let next = mesh.face_of(mesh.twin(he)?)?;
            if next == face || entered.contains_key(&next) {
                continue;
            }
            entered.insert(next, Some(he));
            queue.push_back(next);
        }
    }
    let target = reached.ok_or_else(|| MeshError::Inconsistent("no dual path between endpoints".into()))?;
    let end = target_corner(target).ok_or(MeshError::EntityNotFound("corner"))?;

    let mut path = Vec::new();
    let mut face = target;
    while let Some(&Some(he)) = entered.get(&face) {
        path.push(he);
        face = mesh.face_of(he)?;
    }
    path.reverse();
    let mut corner = starts
        .iter()
        .find(|&&(f, _)| f == face)
        .map(|&(_, he)| he)
        .ok_or(MeshError::EntityNotFound("corner"))?;

    for he in path {
        // After the split, the old twin arrives at the crossing from the next face.
        let across = mesh.twin(he)?;
        mesh.subdivide(he, crossings.next_id())?;
        mesh.connect_corners(corner, he)?;
        corner = across;
    }
    mesh.connect_corners(corner, end)?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn crossings(mesh: &Mesh) -> usize {
        mesh.vertices().filter(|(_, v)| v.node.kind == NodeKind::Crossing).count()
    }

    fn complete(n: usize) -> Vec<(usize, usize)> {
        (0..n).flat_map(|a| (a + 1..n).map(move |b| (a, b))).collect()
    }

    #[test]
    fn planar_graph_has_no_crossings() {
        let edges = complete(4);
        let mesh = Embed::new(4, &edges).execute().unwrap();
        mesh.validate().unwrap();
        assert_eq!(crossings(&mesh), 0);
        assert_eq!(mesh.face_count(), 4);
        assert_eq!(mesh.faces().filter(|(_, f)| f.external).count(), 1);
    }

    #[test]
    fn k5_needs_one_crossing() {
        let edges = complete(5);
        let mesh = Embed::new(5, &edges).execute().unwrap();
        mesh.validate().unwrap();
        assert_eq!(crossings(&mesh), 1);
        // Ten edges, two of them split: 12 edges, 6 vertices.
        assert_eq!(mesh.edge_count(), 12);
        let crossing = mesh
            .vertices()
            .find(|(_, v)| v.node.kind == NodeKind::Crossing)
            .map(|(id, _)| id)
            .unwrap();
        assert_eq!(mesh.degree(crossing).unwrap(), 4);
    }

    #[test]
    fn k33_is_drawn_with_crossings() {
        let edges: Vec<(usize, usize)> = (0..3).flat_map(|a| (3..6).map(move |b| (a, b))).collect();
        let mesh = Embed::new(6, &edges).execute().unwrap();
        mesh.validate().unwrap();
        assert!(crossings(&mesh) >= 1);
        let edges_after = 9 + 2 * crossings(&mesh);
        assert_eq!(mesh.edge_count(), edges_after);
        assert_eq!(mesh.face_count(), 2 + edges_after - mesh.vertex_count());
    }

    #[test]
    fn tree_has_one_face() {
        let edges = [(0, 1), (0, 2), (2, 3)];
        let mesh = Embed::new(4, &edges).execute().unwrap();
        mesh.validate().unwrap();
        assert_eq!(mesh.face_count(), 1);
        assert!(mesh.face(mesh.external_face().unwrap()).unwrap().external);
    }

    #[test]
    fn single_node_has_no_faces() {
        let mesh = Embed::new(1, &[]).execute().unwrap();
        assert_eq!(mesh.vertex_count(), 1);
        assert_eq!(mesh.face_count(), 0);
    }

    #[test]
    fn rejects_loops() {
        assert!(Embed::new(2, &[(1, 1)]).execute().is_err());
    }
}
