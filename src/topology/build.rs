use std::collections::HashMap;

use crate::error::MeshError;

use super::{HalfEdgeData, HalfEdgeId, Mesh, NodeId};

impl Mesh {
    /// Builds a connected mesh from a rotation system.
    ///
    /// `rotation[i]` lists the neighbours of `nodes[i]` in clockwise order;
    /// the face to the right of the half-edge `external.0 -> external.1`
    /// becomes the external face. A single isolated node yields a mesh with
    /// one vertex and no faces.
    ///
    /// # Errors
    ///
    /// Returns an error if the rotation is not symmetric, repeats a
    /// neighbour, contains a loop, or names a missing external edge.
    pub fn from_rotation_system(
        nodes: &[NodeId],
        rotation: &[Vec<usize>],
        external: (usize, usize),
    ) -> Result<Self, MeshError> {
        if nodes.len() != rotation.len() {
            return Err(MeshError::InvalidRotation(format!(
                "{} nodes but {} rotations",
                nodes.len(),
                rotation.len()
            )));
        }
        let mut mesh = Self::new();
        let vertices = nodes
            .iter()
            .map(|&node| mesh.add_vertex(node))
            .collect::<Result<Vec<_>, _>>()?;

        let mut directed: HashMap<(usize, usize), HalfEdgeId> = HashMap::new();
        for (u, neighbours) in rotation.iter().enumerate() {
            for &v in neighbours {
                if v >= nodes.len() || v == u {
                    return Err(MeshError::InvalidRotation(format!(
                        "{} has an invalid neighbour {v}",
                        nodes[u]
                    )));
                }
                if !rotation[v].contains(&u) {
                    return Err(MeshError::InvalidRotation(format!(
                        "{} -> {} has no reverse",
                        nodes[u], nodes[v]
                    )));
                }
                if directed.contains_key(&(u, v)) {
                    return Err(MeshError::InvalidRotation(format!(
                        "{} -> {} listed twice",
                        nodes[u], nodes[v]
                    )));
                }
                let he = mesh.insert_half_edge(HalfEdgeData::detached(vertices[u]));
                directed.insert((u, v), he);
            }
        }
        for (&(u, v), &he) in &directed {
            let twin = directed
                .get(&(v, u))
                .copied()
                .ok_or(MeshError::EntityNotFound("twin half-edge"))?;
            mesh.half_edge_mut(he)?.twin = twin;
        }

        // Clockwise neighbours e_i, e_{i+1}: the face of e_i is entered by twin(e_{i+1}).
        for (u, neighbours) in rotation.iter().enumerate() {
            let k = neighbours.len();
            for i in 0..k {
                let e_i = directed[&(u, neighbours[i])];
                let e_next = directed[&(u, neighbours[(i + 1) % k])];
                let entering = mesh.twin(e_next)?;
                mesh.link(entering, e_i)?;
            }
            if let Some(&first) = neighbours.first() {
                mesh.vertex_mut(vertices[u])?.incident = Some(directed[&(u, first)]);
            }
        }

        // Trace faces in insertion order so face ids are deterministic.
        let ordered: Vec<HalfEdgeId> = mesh.half_edges().map(|(id, _)| id).collect();
        let mut traced = slotmap::SecondaryMap::<HalfEdgeId, ()>::new();
        for start in ordered {
            if traced.contains_key(start) {
                continue;
            }
            let face = mesh.insert_face(start);
            for he in mesh.cycle(start)? {
                traced.insert(he, ());
                mesh.half_edge_mut(he)?.face = face;
            }
        }

        if !directed.is_empty() {
            let he = directed
                .get(&external)
                .copied()
                .ok_or(MeshError::EntityNotFound("external half-edge"))?;
            let face = mesh.face_of(he)?;
            mesh.set_external(face)?;
        }
        Ok(mesh)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn nodes(n: usize) -> Vec<NodeId> {
        (0..n).map(NodeId::original).collect()
    }

    #[test]
    fn triangle_has_two_faces() {
        // 0 (0,0), 1 (1,2), 2 (2,0) in a y-up plane.
        let rotation = vec![vec![1, 2], vec![2, 0], vec![0, 1]];
        let mesh = Mesh::from_rotation_system(&nodes(3), &rotation, (1, 0)).unwrap();
        mesh.validate().unwrap();
        assert_eq!(mesh.face_count(), 2);
        assert_eq!(mesh.edge_count(), 3);
        let ext = mesh.external_face().unwrap();
        assert_eq!(mesh.boundary(ext).unwrap().count(), 3);
        assert!(mesh.faces().filter(|(_, f)| f.external).count() == 1);
    }

    #[test]
    fn rotation_order_is_preserved() {
        let rotation = vec![vec![1, 2, 3], vec![0], vec![0], vec![0]];
        let mesh = Mesh::from_rotation_system(&nodes(4), &rotation, (1, 0)).unwrap();
        let hub = mesh.vertex_by_node(NodeId::original(0)).unwrap();
        let order: Vec<usize> = mesh
            .half_edges_around(hub)
            .unwrap()
            .map(|he| mesh.node(mesh.dest(he).unwrap()).unwrap().sequence)
            .collect();
        assert_eq!(order, vec![1, 2, 3]);
        assert_eq!(mesh.face_count(), 1);
        assert_eq!(mesh.faces_around(hub).unwrap().count(), 3);
    }

    #[test]
    fn asymmetric_rotation_is_rejected() {
        let rotation = vec![vec![1], vec![]];
        assert!(matches!(
            Mesh::from_rotation_system(&nodes(2), &rotation, (0, 1)),
            Err(MeshError::InvalidRotation(_))
        ));
    }

    #[test]
    fn single_vertex_has_no_faces() {
        let mesh = Mesh::from_rotation_system(&nodes(1), &[vec![]], (0, 0)).unwrap();
        assert_eq!(mesh.vertex_count(), 1);
        assert_eq!(mesh.face_count(), 0);
        assert!(mesh.external_face().is_err());
    }
}
