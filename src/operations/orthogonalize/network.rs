use slotmap::SecondaryMap;

use crate::error::{MeshError, Result};
use crate::flow::{Flow, FlowNetwork, UNBOUNDED};
use crate::topology::{FaceId, HalfEdgeId, Mesh, NodeKind, VertexId};

use super::representation::{Bend, OrthogonalRepresentation};

/// Angle-assignment network over a planar mesh.
///
/// Node demands are `inflow - outflow`:
/// - vertex: `degree - 4`; it hands out 90° units to its corners,
/// - internal face: `len - 4`, external face: `len + 4`,
/// - one helper per corner of every non-crossing vertex: `0`.
///
/// Arcs:
/// - vertex -> face per outgoing half-edge (capacity 3, cost 0): the corner angle,
/// - face -> opposite face per half-edge (unbounded, cost 1): bends along the edge,
/// - helper -> vertex (capacity 1, cost 0): shrinks the helper's corner by 90°,
/// - face -> neighbouring corner helper across each edge (capacity 1, cost 1):
///   a bend right next to the vertex.
///
/// The two corner-crossing arcs of one edge end form a bundle: at most one
/// of them may carry flow.
#[derive(Debug, Clone)]
pub struct AngleNetwork {
    network: FlowNetwork,
    corner: SecondaryMap<HalfEdgeId, usize>,
    across: SecondaryMap<HalfEdgeId, usize>,
    helper: SecondaryMap<HalfEdgeId, usize>,
    right_to_left: SecondaryMap<HalfEdgeId, usize>,
    left_to_right: SecondaryMap<HalfEdgeId, usize>,
}

impl AngleNetwork {
    /// Builds the network for `mesh`.
    ///
    /// # Errors
    ///
    /// Returns an error if a face cycle or vertex rotation is broken.
    pub fn build(mesh: &Mesh) -> Result<Self> {
        let mut network = FlowNetwork::new("orthogonalization");

        let mut vertex_node: SecondaryMap<VertexId, usize> = SecondaryMap::new();
        for (id, vertex) in mesh.vertices() {
            let demand = signed(mesh.degree(id)?) - 4;
            vertex_node.insert(id, network.add_node(vertex.node.to_string(), demand));
        }

        let mut face_node: SecondaryMap<FaceId, usize> = SecondaryMap::new();
        for (index, (id, face)) in mesh.faces().enumerate() {
            let len = signed(mesh.cycle(face.incident)?.len());
            let (demand, label) = if face.external {
                (len + 4, format!("face {index} (external)"))
            } else {
                (len - 4, format!("face {index}"))
            };
            face_node.insert(id, network.add_node(label, demand));
        }

        let mut helper_node: SecondaryMap<HalfEdgeId, usize> = SecondaryMap::new();
        for (he, data) in mesh.half_edges() {
            let node = mesh.node(data.origin)?;
            if node.kind != NodeKind::Crossing {
                helper_node.insert(he, network.add_node(format!("corner of {node}"), 0));
            }
        }

        let face_of = |he: HalfEdgeId| -> Result<usize> {
            let face = mesh.face_of(he)?;
            Ok(*face_node
                .get(face)
                .ok_or(MeshError::EntityNotFound("face"))?)
        };

        // Plain bends first so equal-cost ties favour them over corner bends.
        let mut across = SecondaryMap::new();
        for (he, data) in mesh.half_edges() {
            let twin_face = mesh.face_of(data.twin)?;
            if data.face != twin_face {
                let arc = network.add_arc(face_of(he)?, face_of(data.twin)?, 0, UNBOUNDED, 1);
                across.insert(he, arc);
            }
        }

        let mut corner = SecondaryMap::new();
        for (he, data) in mesh.half_edges() {
            let from = *vertex_node
                .get(data.origin)
                .ok_or(MeshError::EntityNotFound("vertex"))?;
            corner.insert(he, network.add_arc(from, face_of(he)?, 0, 3, 0));
        }

        let mut helper = SecondaryMap::new();
        let mut right_to_left = SecondaryMap::new();
        let mut left_to_right = SecondaryMap::new();
        for (he, data) in mesh.half_edges() {
            let Some(&own) = helper_node.get(he) else {
                continue;
            };
            let vertex = vertex_node[data.origin];
            helper.insert(he, network.add_arc(own, vertex, 0, 1, 0));

            // The corner on the left of `he` belongs to the previous half-edge
            // in clockwise order.
            let left_corner = mesh.succ(data.twin)?;
            let left_helper = *helper_node
                .get(left_corner)
                .ok_or(MeshError::EntityNotFound("corner helper"))?;
            right_to_left.insert(he, network.add_arc(face_of(he)?, left_helper, 0, 1, 1));
            left_to_right.insert(he, network.add_arc(face_of(data.twin)?, own, 0, 1, 1));
        }

        Ok(Self {
            network,
            corner,
            across,
            helper,
            right_to_left,
            left_to_right,
        })
    }

    #[must_use]
    pub fn network(&self) -> &FlowNetwork {
        &self.network
    }

    /// Arc pairs that may not both carry flow: the two bends next to one
    /// edge end, one on each side.
    #[must_use]
    pub fn bundles(&self) -> Vec<(usize, usize)> {
        self.right_to_left
            .iter()
            .filter_map(|(he, &a)| self.left_to_right.get(he).map(|&b| (a, b)))
            .collect()
    }

    /// Reads angles and bend sequences off a solved flow.
    ///
    /// # Errors
    ///
    /// Returns an error if an angle falls outside `0..=4` or both channels
    /// at one edge end carry flow.
    pub fn representation(&self, mesh: &Mesh, flow: &Flow) -> Result<OrthogonalRepresentation> {
        let value = |arc: usize| flow.values.get(arc).copied().unwrap_or_default();

        let mut angles = SecondaryMap::new();
        for (he, &arc) in &self.corner {
            let shrink = self.helper.get(he).map_or(0, |&h| value(h));
            let angle = value(arc) + 1 - shrink;
            let angle = u8::try_from(angle)
                .ok()
                .filter(|&a| a <= 4)
                .ok_or_else(|| MeshError::Inconsistent(format!("corner angle {angle} out of range")))?;
            angles.insert(he, angle);
        }

        let mut first_bend: SecondaryMap<HalfEdgeId, Bend> = SecondaryMap::new();
        for (he, &rtl) in &self.right_to_left {
            let ltr = self.left_to_right.get(he).map_or(0, |&a| value(a));
            match (value(rtl), ltr) {
                (0, 0) => {}
                (1, 0) => {
                    first_bend.insert(he, Bend::Right);
                }
                (0, 1) => {
                    first_bend.insert(he, Bend::Left);
                }
                _ => {
                    return Err(MeshError::Inconsistent(
                        "both bend channels at one edge end are used".into(),
                    )
                    .into())
                }
            }
        }

        let mut bends: SecondaryMap<HalfEdgeId, Vec<Bend>> = SecondaryMap::new();
        for (he, data) in mesh.half_edges() {
            if bends.contains_key(he) {
                continue;
            }
            let twin = data.twin;
            let forward = self.across.get(he).map_or(0, |&a| value(a));
            let backward = self.across.get(twin).map_or(0, |&a| value(a));
            let net = forward - backward;
            let middle = if net >= 0 { Bend::Right } else { Bend::Left };
            let count = usize::try_from(net.abs()).unwrap_or_default();

            let mut sequence: Vec<Bend> = first_bend.get(he).copied().into_iter().collect();
            sequence.extend(std::iter::repeat_n(middle, count));
            if let Some(&last) = first_bend.get(twin) {
                sequence.push(last.flip());
            }
            let reverse: Vec<Bend> = sequence.iter().rev().map(|b| b.flip()).collect();
            bends.insert(he, sequence);
            bends.insert(twin, reverse);
        }

        Ok(OrthogonalRepresentation {
            angles,
            bends,
            cost: flow.cost,
        })
    }
}

#[allow(clippy::cast_possible_wrap)]
fn signed(n: usize) -> i64 {
    n as i64
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::topology::NodeId;

    fn star(leaves: usize) -> Mesh {
        let nodes: Vec<NodeId> = (0..=leaves).map(NodeId::original).collect();
        let mut rotation = vec![(1..=leaves).collect::<Vec<_>>()];
        rotation.extend((1..=leaves).map(|_| vec![0]));
        Mesh::from_rotation_system(&nodes, &rotation, (0, 1)).unwrap()
    }

    #[test]
    fn demands_balance() {
        let mesh = star(3);
        let net = AngleNetwork::build(&mesh).unwrap();
        let total: i64 = net.network().nodes().iter().map(|n| n.demand).sum();
        assert_eq!(total, 0);
    }

    #[test]
    fn one_bundle_per_edge_end() {
        let mesh = star(3);
        let net = AngleNetwork::build(&mesh).unwrap();
        assert_eq!(net.bundles().len(), mesh.half_edge_count());
    }

    #[test]
    fn crossings_get_no_helpers() {
        let nodes = vec![
            NodeId::original(0),
            NodeId::original(1),
            NodeId::original(2),
            NodeId::original(3),
            NodeId::new(NodeKind::Crossing, 0),
        ];
        // Plus-shaped star around a crossing.
        let rotation = vec![vec![4], vec![4], vec![4], vec![4], vec![0, 1, 2, 3]];
        let mesh = Mesh::from_rotation_system(&nodes, &rotation, (0, 4)).unwrap();
        let net = AngleNetwork::build(&mesh).unwrap();
        // Helpers only at the four leaves.
        assert_eq!(net.bundles().len(), 4);
    }
}
