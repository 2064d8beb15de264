use super::face::FaceId;
use super::vertex::VertexId;

slotmap::new_key_type! {
    /// Unique identifier for a half-edge in the mesh.
    pub struct HalfEdgeId;
}

/// Data associated with a directed half-edge.
///
/// The incident face lies to the right of the half-edge; `succ`/`prev`
/// walk that face's boundary cycle.
#[derive(Debug, Clone)]
pub struct HalfEdgeData {
    /// Vertex the half-edge leaves from.
    pub origin: VertexId,
    /// The opposite half-edge of the same undirected edge.
    pub twin: HalfEdgeId,
    /// Next half-edge around the incident face.
    pub succ: HalfEdgeId,
    /// Previous half-edge around the incident face.
    pub prev: HalfEdgeId,
    /// The face this half-edge bounds.
    pub face: FaceId,
}

impl HalfEdgeData {
    /// Creates an unlinked half-edge; links are patched by the mesh.
    pub(crate) fn detached(origin: VertexId) -> Self {
        Self {
            origin,
            twin: HalfEdgeId::default(),
            succ: HalfEdgeId::default(),
            prev: HalfEdgeId::default(),
            face: FaceId::default(),
        }
    }
}
