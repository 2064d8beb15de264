use thiserror::Error;

/// Top-level error type for the orthodraw layout pipeline.
#[derive(Debug, Error)]
pub enum OrthodrawError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Mesh(#[from] MeshError),

    #[error(transparent)]
    Optimization(#[from] OptimizationError),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// Input the pipeline cannot lay out. These are the only user-actionable errors.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("self-loop on node '{0}' is not supported")]
    SelfLoop(String),

    #[error("duplicate edge '{0}' -- '{1}' is not supported")]
    DuplicateEdge(String, String),

    #[error("unknown node index {0}")]
    UnknownNode(usize),

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("degenerate drawing: {0}")]
    DegenerateDrawing(String),
}

/// Structural precondition of the half-edge mesh violated.
#[derive(Debug, Error)]
pub enum MeshError {
    #[error("entity not found: {0}")]
    EntityNotFound(&'static str),

    #[error("{0} is not incident to the expected face")]
    NotOnFace(&'static str),

    #[error("boundary cycle does not close")]
    OpenCycle,

    #[error("ambiguous corner at {0}")]
    AmbiguousCorner(String),

    #[error("invalid rotation system: {0}")]
    InvalidRotation(String),

    #[error("inconsistent mesh: {0}")]
    Inconsistent(String),
}

/// Failures of the flow and integer-program solves.
#[derive(Debug, Error)]
pub enum OptimizationError {
    #[error("network '{network}' is infeasible at node '{node}'")]
    Infeasible { network: String, node: String },

    #[error("network '{network}' has unbalanced demands (supply {supply}, demand {demand})")]
    Unbalanced {
        network: String,
        supply: i64,
        demand: i64,
    },

    #[error("network '{0}' has lower bounds the solver cannot handle")]
    LowerBounds(String),

    #[error("network '{0}' contains a negative cycle")]
    NegativeCycle(String),

    #[error("solver deadline exceeded")]
    DeadlineExceeded,

    #[error("flow violates conservation at node '{0}'")]
    Conservation(String),

    #[error("integer program for network '{network}' failed: {message}")]
    Solver { network: String, message: String },
}

/// Rectangularization and compaction defects.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("no vertex on the outer boundary can be attached to the border")]
    NoBorderAttachment,

    #[error("no front edge found for the corner at {0}")]
    FrontNotFound(String),

    #[error("every edge of {0} leaves on the same side")]
    CollapsedVertex(String),

    #[error("face '{0}' has no lower-bounded {1} flow")]
    UnbalancedFace(String, &'static str),

    #[error("face refinement did not converge after {0} splits")]
    RefinementDiverged(usize),

    #[error("coordinates do not close around {0}")]
    OpenBoundary(String),
}

/// Errors raised while rasterizing a layout.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("point ({x}, {y}) is outside the canvas")]
    OutOfBounds { x: i64, y: i64 },

    #[error("segment ({x0}, {y0}) -> ({x1}, {y1}) is not axis-aligned")]
    NotAxisAligned { x0: i64, y0: i64, x1: i64, y1: i64 },
}

/// Convenience type alias for results using [`OrthodrawError`].
pub type Result<T> = std::result::Result<T, OrthodrawError>;
