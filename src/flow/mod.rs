mod bundle;
mod integer_program;
mod lower_bound;
mod ssp;

pub use bundle::BundleSolver;
pub use integer_program::IntegerProgram;
pub use lower_bound::LowerBoundTransform;
pub use ssp::SuccessiveShortestPaths;

use std::time::{Duration, Instant};

use crate::error::OptimizationError;

/// Capacity standing in for "unbounded".
pub const UNBOUNDED: i64 = i64::MAX / 4;

/// A node of a flow network.
#[derive(Debug, Clone)]
pub struct FlowNode {
    /// Human-readable identity used in diagnostics.
    pub label: String,
    /// Required `inflow - outflow`; negative for suppliers.
    pub demand: i64,
}

/// A directed arc of a flow network.
#[derive(Debug, Clone)]
pub struct FlowArc {
    pub from: usize,
    pub to: usize,
    pub lower: i64,
    pub capacity: i64,
    pub cost: i64,
}

/// A min-cost-flow problem.
#[derive(Debug, Clone)]
pub struct FlowNetwork {
    name: String,
    nodes: Vec<FlowNode>,
    arcs: Vec<FlowArc>,
}

/// A solution: one value per arc, in arc order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flow {
    pub values: Vec<i64>,
    pub cost: i64,
}

/// Anything that can solve a [`FlowNetwork`].
///
/// Implementations must return a flow honouring every arc bound and node
/// demand with minimum total cost, or an [`OptimizationError`].
pub trait FlowSolver {
    /// # Errors
    ///
    /// Returns an error if the network is infeasible or the deadline passes.
    fn solve(&self, network: &FlowNetwork, deadline: &Deadline) -> Result<Flow, OptimizationError>;
}

/// Wall-clock bound on a solve.
#[derive(Debug, Clone, Copy, Default)]
pub struct Deadline {
    at: Option<Instant>,
}

impl Deadline {
    /// A deadline that never passes.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// A deadline `timeout` from now.
    #[must_use]
    pub fn after(timeout: Duration) -> Self {
        Self {
            at: Instant::now().checked_add(timeout),
        }
    }

    #[must_use]
    pub fn from_timeout(timeout: Option<Duration>) -> Self {
        timeout.map_or_else(Self::none, Self::after)
    }

    #[must_use]
    pub fn expired(&self) -> bool {
        self.at.is_some_and(|at| Instant::now() >= at)
    }

    /// # Errors
    ///
    /// Returns [`OptimizationError::DeadlineExceeded`] once the deadline has passed.
    pub fn check(&self) -> Result<(), OptimizationError> {
        if self.expired() {
            Err(OptimizationError::DeadlineExceeded)
        } else {
            Ok(())
        }
    }
}

impl FlowNetwork {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: Vec::new(),
            arcs: Vec::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Adds a node and returns its index.
    pub fn add_node(&mut self, label: impl Into<String>, demand: i64) -> usize {
        self.nodes.push(FlowNode {
            label: label.into(),
            demand,
        });
        self.nodes.len() - 1
    }

    /// Adds an arc and returns its index.
    pub fn add_arc(&mut self, from: usize, to: usize, lower: i64, capacity: i64, cost: i64) -> usize {
        self.arcs.push(FlowArc {
            from,
            to,
            lower,
            capacity,
            cost,
        });
        self.arcs.len() - 1
    }

    pub fn set_demand(&mut self, node: usize, demand: i64) {
        if let Some(n) = self.nodes.get_mut(node) {
            n.demand = demand;
        }
    }

    #[must_use]
    pub fn nodes(&self) -> &[FlowNode] {
        &self.nodes
    }

    #[must_use]
    pub fn arcs(&self) -> &[FlowArc] {
        &self.arcs
    }

    pub(crate) fn arcs_mut(&mut self) -> &mut [FlowArc] {
        &mut self.arcs
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut [FlowNode] {
        &mut self.nodes
    }

    pub(crate) fn label(&self, node: usize) -> String {
        self.nodes
            .get(node)
            .map_or_else(|| format!("#{node}"), |n| n.label.clone())
    }

    /// Total cost of `values` on this network.
    #[must_use]
    pub fn cost_of(&self, values: &[i64]) -> i64 {
        self.arcs
            .iter()
            .zip(values)
            .map(|(arc, &value)| arc.cost * value)
            .sum()
    }
}

/// Checks arc bounds and `inflow - outflow == demand` at every node.
///
/// # Errors
///
/// Returns [`OptimizationError::Conservation`] naming the first offending node.
pub fn check_conservation(network: &FlowNetwork, flow: &Flow) -> Result<(), OptimizationError> {
    if flow.values.len() != network.arcs.len() {
        return Err(OptimizationError::Conservation(network.name.clone()));
    }
    let mut balance = vec![0_i64; network.nodes.len()];
    for (arc, &value) in network.arcs.iter().zip(&flow.values) {
        if value < arc.lower || value > arc.capacity {
            return Err(OptimizationError::Conservation(network.label(arc.from)));
        }
        balance[arc.from] -= value;
        balance[arc.to] += value;
    }
    for (index, node) in network.nodes.iter().enumerate() {
        if balance[index] != node.demand {
            return Err(OptimizationError::Conservation(node.label.clone()));
        }
    }
    Ok(())
}
