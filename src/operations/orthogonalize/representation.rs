use slotmap::SecondaryMap;
use tracing::debug;

use crate::error::{MeshError, Result};
use crate::flow::{check_conservation, BundleSolver, Deadline, FlowSolver, IntegerProgram, SuccessiveShortestPaths};
use crate::topology::{HalfEdgeId, Mesh};

use super::network::AngleNetwork;

/// A 90° turn along an edge, seen walking in the half-edge's direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bend {
    Left,
    Right,
}

impl Bend {
    /// The same bend seen from the twin half-edge.
    #[must_use]
    pub fn flip(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

/// Corner angles and edge bends of an orthogonal shape.
///
/// `angles[e]` counts quarter turns (1..=4, or 0 for a degenerate corner)
/// in the corner between `e` and the next half-edge clockwise around its
/// origin, which lies on the face of `e`.
/// `bends[e]` lists bends in walking order; the twin holds the reversed,
/// flipped sequence.
#[derive(Debug, Clone, Default)]
pub struct OrthogonalRepresentation {
    pub angles: SecondaryMap<HalfEdgeId, u8>,
    pub bends: SecondaryMap<HalfEdgeId, Vec<Bend>>,
    /// Objective value of the solve: bends counted once per side.
    pub cost: i64,
}

impl OrthogonalRepresentation {
    #[must_use]
    pub fn angle(&self, he: HalfEdgeId) -> Option<u8> {
        self.angles.get(he).copied()
    }

    #[must_use]
    pub fn bends(&self, he: HalfEdgeId) -> &[Bend] {
        self.bends.get(he).map_or(&[], Vec::as_slice)
    }

    /// Number of bends over all undirected edges.
    #[must_use]
    pub fn bend_count(&self) -> usize {
        self.bends.values().map(Vec::len).sum::<usize>() / 2
    }
}

/// How the bundle-constrained angle network is solved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AngleSolver {
    /// Integer program on the `microlp` backend.
    #[default]
    IntegerProgram,
    /// Branch and bound over min-cost flow relaxations.
    BranchAndBound,
}

/// Computes a bend-minimal orthogonal representation of a planar mesh.
///
/// Vertices of degree above four get zero-degree corners; the two bends
/// next to one edge end may not turn both ways.
pub struct Orthogonalize {
    deadline: Deadline,
    solver: AngleSolver,
}

impl Orthogonalize {
    #[must_use]
    pub fn new(deadline: Deadline) -> Self {
        Self {
            deadline,
            solver: AngleSolver::default(),
        }
    }

    #[must_use]
    pub fn with_solver(mut self, solver: AngleSolver) -> Self {
        self.solver = solver;
        self
    }

    /// Executes the orthogonalization.
    ///
    /// # Errors
    ///
    /// Returns an error if the network is infeasible, the deadline passes,
    /// or the solution does not describe a valid shape.
    pub fn execute(&self, mesh: &Mesh) -> Result<OrthogonalRepresentation> {
        if mesh.half_edge_count() == 0 {
            return Ok(OrthogonalRepresentation::default());
        }

        let network = AngleNetwork::build(mesh)?;
        let flow = match self.solver {
            AngleSolver::IntegerProgram => {
                IntegerProgram::new(network.bundles()).solve(network.network(), &self.deadline)?
            }
            AngleSolver::BranchAndBound => BundleSolver::new(SuccessiveShortestPaths, network.bundles())
                .solve(network.network(), &self.deadline)?,
        };
        check_conservation(network.network(), &flow)?;

        let shape = network.representation(mesh, &flow)?;
        for (vertex, _) in mesh.vertices() {
            let total: u32 = mesh
                .half_edges_around(vertex)?
                .filter_map(|he| shape.angle(he))
                .map(u32::from)
                .sum();
            if mesh.degree(vertex)? > 0 && total != 4 {
                return Err(MeshError::Inconsistent(format!(
                    "angles around {} sum to {total}",
                    mesh.node(vertex)?
                ))
                .into());
            }
        }
        debug!(
            bends = shape.bend_count(),
            cost = shape.cost,
            "orthogonal representation"
        );
        Ok(shape)
    }
}
