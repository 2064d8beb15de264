use super::half_edge::HalfEdgeId;

slotmap::new_key_type! {
    /// Unique identifier for a face in the mesh.
    pub struct FaceId;
}

/// Refinement state of a face.
///
/// Transitions only go from `NeedsRefinement` to one of the other two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceStatus {
    NeedsRefinement,
    Rectangle,
    /// Small triangle left by merging bunched edges; skipped by rectangle checks.
    ExemptTriangle,
}

/// Data associated with a face.
#[derive(Debug, Clone)]
pub struct FaceData {
    /// A half-edge on the boundary cycle.
    pub incident: HalfEdgeId,
    /// `true` for the unbounded face.
    pub external: bool,
    pub status: FaceStatus,
}

impl FaceData {
    #[must_use]
    pub fn new(incident: HalfEdgeId) -> Self {
        Self {
            incident,
            external: false,
            status: FaceStatus::NeedsRefinement,
        }
    }
}
