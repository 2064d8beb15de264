use crate::error::OptimizationError;

use super::{Deadline, Flow, FlowNetwork, FlowSolver};

/// Solves lower-bounded networks with a solver that only handles zero bounds.
///
/// Every arc's lower bound is pre-routed: it is removed from the capacity
/// and moved into the endpoint demands. The inner solution is shifted back
/// by the bounds.
#[derive(Debug, Clone, Default)]
pub struct LowerBoundTransform<S> {
    inner: S,
}

impl<S> LowerBoundTransform<S> {
    #[must_use]
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

/// The zero-lower-bound equivalent of `network`.
fn reduce(network: &FlowNetwork) -> FlowNetwork {
    let mut reduced = network.clone();
    let bounds: Vec<(usize, usize, i64)> = reduced
        .arcs()
        .iter()
        .filter(|arc| arc.lower != 0)
        .map(|arc| (arc.from, arc.to, arc.lower))
        .collect();
    for arc in reduced.arcs_mut() {
        arc.capacity -= arc.lower;
        arc.lower = 0;
    }
    let nodes = reduced.nodes_mut();
    for (from, to, lower) in bounds {
        nodes[from].demand += lower;
        nodes[to].demand -= lower;
    }
    reduced
}

impl<S: FlowSolver> FlowSolver for LowerBoundTransform<S> {
    fn solve(&self, network: &FlowNetwork, deadline: &Deadline) -> Result<Flow, OptimizationError> {
        if let Some(arc) = network.arcs().iter().find(|arc| arc.lower > arc.capacity) {
            return Err(OptimizationError::Infeasible {
                network: network.name().to_string(),
                node: network.label(arc.from),
            });
        }
        let reduced = self.inner.solve(&reduce(network), deadline)?;
        let values: Vec<i64> = reduced
            .values
            .iter()
            .zip(network.arcs())
            .map(|(&value, arc)| value + arc.lower)
            .collect();
        let cost = network.cost_of(&values);
        Ok(Flow { values, cost })
    }
}
