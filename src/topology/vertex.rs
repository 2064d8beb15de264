use std::fmt;

use super::half_edge::HalfEdgeId;

slotmap::new_key_type! {
    /// Unique identifier for a vertex in the mesh.
    pub struct VertexId;
}

/// What a mesh vertex stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKind {
    /// A node of the input graph.
    Original,
    /// An edge crossing inserted by planarization.
    Crossing,
    /// A 90° bend materialized from the orthogonal representation.
    Bend,
    /// A subdivision point introduced while splitting faces into rectangles.
    Dummy,
    /// A corner of the synthetic rectangular border.
    Border,
}

impl NodeKind {
    /// Returns `true` for vertices drawn as boxes.
    #[must_use]
    pub fn is_original(self) -> bool {
        matches!(self, Self::Original)
    }

    /// Returns `true` for vertices that only exist to shape faces and are never drawn.
    #[must_use]
    pub fn is_synthetic(self) -> bool {
        matches!(self, Self::Dummy | Self::Border)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Original => "vertex",
            Self::Crossing => "crossing",
            Self::Bend => "bend",
            Self::Dummy => "dummy",
            Self::Border => "border",
        };
        f.write_str(name)
    }
}

/// Stable identity of a mesh vertex across all pipeline stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    pub kind: NodeKind,
    pub sequence: usize,
}

impl NodeId {
    #[must_use]
    pub fn new(kind: NodeKind, sequence: usize) -> Self {
        Self { kind, sequence }
    }

    #[must_use]
    pub fn original(sequence: usize) -> Self {
        Self::new(NodeKind::Original, sequence)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.kind, self.sequence)
    }
}

/// Hands out increasing [`NodeId`]s of one kind.
///
/// Each stage that introduces synthetic vertices owns its own counter.
#[derive(Debug, Clone)]
pub struct NodeCounter {
    kind: NodeKind,
    next: usize,
}

impl NodeCounter {
    #[must_use]
    pub fn new(kind: NodeKind) -> Self {
        Self { kind, next: 0 }
    }

    /// Returns the next unused id.
    pub fn next_id(&mut self) -> NodeId {
        let id = NodeId::new(self.kind, self.next);
        self.next += 1;
        id
    }

    /// Number of ids handed out so far.
    #[must_use]
    pub fn issued(&self) -> usize {
        self.next
    }
}

/// Data associated with a mesh vertex.
#[derive(Debug, Clone)]
pub struct VertexData {
    /// The vertex identity.
    pub node: NodeId,
    /// One outgoing half-edge, `None` while the vertex is isolated.
    pub incident: Option<HalfEdgeId>,
}

impl VertexData {
    /// Creates an isolated vertex.
    #[must_use]
    pub fn new(node: NodeId) -> Self {
        Self {
            node,
            incident: None,
        }
    }
}
