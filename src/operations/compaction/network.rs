use slotmap::SecondaryMap;

use crate::error::{LayoutError, Result};
use crate::flow::{FlowNetwork, UNBOUNDED};
use crate::operations::rectangularize::Rectangulation;
use crate::topology::{FaceId, HalfEdgeId, Mesh, Side};

/// Edge-length network for one axis of a rectangular mesh.
///
/// Faces are nodes and every half-edge drawn on `target` carries flow
/// from the face on its left to the face on its right; the flow is the
/// length of the edge. Flow enters at the external face and leaves at an
/// extra sink standing for the far side of the border, so each face
/// passes on as much as it receives and opposite sides of a rectangle
/// get equal total length.
#[derive(Debug, Clone)]
pub struct SpacingNetwork {
    network: FlowNetwork,
    arcs: SecondaryMap<HalfEdgeId, usize>,
    source: usize,
    sink: usize,
}

impl SpacingNetwork {
    /// Builds the network for half-edges drawn on `target`, each at least
    /// `min_length` long. Exempt edges are left out.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::UnbalancedFace`] if a face touched by the
    /// network cannot receive or pass on any length.
    pub fn build(mesh: &Mesh, rect: &Rectangulation, target: Side, min_length: i64) -> Result<Self> {
        let name = if target.is_horizontal() { "horizontal spacing" } else { "vertical spacing" };
        let mut network = FlowNetwork::new(name);

        let external = mesh.external_face()?;
        let mut node_of: SecondaryMap<FaceId, usize> = SecondaryMap::new();
        for (index, (id, face)) in mesh.faces().enumerate() {
            let label = if face.external {
                format!("face {index} (external)")
            } else {
                format!("face {index}")
            };
            node_of.insert(id, network.add_node(label, 0));
        }
        let source = node_of[external];
        let sink = network.add_node("beyond border", 0);

        let mut arcs = SecondaryMap::new();
        let mut total = 0_i64;
        for (he, data) in mesh.half_edges() {
            if rect.side(he) != Some(target) || rect.is_exempt(he) || rect.is_exempt(data.twin) {
                continue;
            }
            let from = node_of[mesh.face_of(data.twin)?];
            let to = if data.face == external { sink } else { node_of[data.face] };
            arcs.insert(he, network.add_arc(from, to, min_length, UNBOUNDED, 1));
            total += min_length;
        }
        network.add_arc(source, sink, 0, UNBOUNDED, 0);

        let big = total + 1;
        network.set_demand(source, -big);
        network.set_demand(sink, big);

        let spacing = Self {
            network,
            arcs,
            source,
            sink,
        };
        spacing.check_bounds()?;
        Ok(spacing)
    }

    #[must_use]
    pub fn network(&self) -> &FlowNetwork {
        &self.network
    }

    /// The arc carrying the length of `he`, if `he` is part of this network.
    #[must_use]
    pub fn arc(&self, he: HalfEdgeId) -> Option<usize> {
        self.arcs.get(he).copied()
    }

    fn check_bounds(&self) -> Result<()> {
        let n = self.network.nodes().len();
        let mut lower_in = vec![0_i64; n];
        let mut lower_out = vec![0_i64; n];
        let mut touched = vec![false; n];
        for arc in self.network.arcs() {
            lower_out[arc.from] += arc.lower;
            lower_in[arc.to] += arc.lower;
            touched[arc.from] = true;
            touched[arc.to] = true;
        }
        for node in (0..n).filter(|&node| touched[node]) {
            let label = || self.network.nodes()[node].label.clone();
            if node != self.source && lower_in[node] == 0 {
                return Err(LayoutError::UnbalancedFace(label(), "incoming").into());
            }
            if node != self.sink && lower_out[node] == 0 {
                return Err(LayoutError::UnbalancedFace(label(), "outgoing").into());
            }
        }
        Ok(())
    }
}
