use tracing::trace;

use crate::error::OptimizationError;

use super::{Deadline, Flow, FlowNetwork, FlowSolver};

/// Min-cost flow with side constraints `x_a + x_b <= 1` on pairs of arcs.
///
/// The search fallback for [`IntegerProgram`](super::IntegerProgram); it
/// needs nothing but a flow solver. Depth-first branch and bound: each
/// node solves the flow relaxation with some arcs forced to zero, and a
/// violated pair branches into "first arc off" and "second arc off".
/// Branches whose relaxation is no cheaper than the incumbent are pruned.
///
/// The search is exact only when every bundled arc has capacity 1. Then a
/// pair with `x_a + x_b > 1` has both arcs at 1, and every feasible flow has
/// one of them at 0, so the two branches cover the whole feasible set. With
/// larger capacities a pair could be fixed by lowering one arc to 1, which
/// neither branch allows.
#[derive(Debug, Clone)]
pub struct BundleSolver<S> {
    inner: S,
    bundles: Vec<(usize, usize)>,
}

impl<S> BundleSolver<S> {
    #[must_use]
    pub fn new(inner: S, bundles: Vec<(usize, usize)>) -> Self {
        Self { inner, bundles }
    }

    fn first_violation(&self, flow: &Flow) -> Option<(usize, usize)> {
        self.bundles
            .iter()
            .copied()
            .find(|&(a, b)| flow.values[a] + flow.values[b] > 1)
    }
}

impl<S: FlowSolver> FlowSolver for BundleSolver<S> {
    fn solve(&self, network: &FlowNetwork, deadline: &Deadline) -> Result<Flow, OptimizationError> {
        let mut best: Option<Flow> = None;
        let mut first_error = None;
        let mut explored = 0_usize;
        let mut stack: Vec<Vec<usize>> = vec![Vec::new()];

        while let Some(disabled) = stack.pop() {
            deadline.check()?;
            explored += 1;
            let mut restricted = network.clone();
            for &arc in &disabled {
                restricted.arcs_mut()[arc].capacity = 0;
            }
            let flow = match self.inner.solve(&restricted, deadline) {
                Ok(flow) => flow,
                Err(err @ OptimizationError::Infeasible { .. }) => {
                    first_error.get_or_insert(err);
                    continue;
                }
                Err(err) => return Err(err),
            };
            if best.as_ref().is_some_and(|b| flow.cost >= b.cost) {
                continue;
            }
            match self.first_violation(&flow) {
                None => best = Some(flow),
                Some((a, b)) => {
                    let mut off_b = disabled.clone();
                    off_b.push(b);
                    let mut off_a = disabled;
                    off_a.push(a);
                    stack.push(off_b);
                    stack.push(off_a);
                }
            }
        }
        trace!(network = network.name(), explored, "bundle search finished");

        best.ok_or_else(|| {
            first_error.unwrap_or_else(|| OptimizationError::Infeasible {
                network: network.name().to_string(),
                node: network.name().to_string(),
            })
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::flow::{check_conservation, SuccessiveShortestPaths};

    /// Two cheap parallel channels that may not both be used, and one
    /// expensive detour.
    fn channels() -> (FlowNetwork, usize, usize, usize) {
        let mut net = FlowNetwork::new("channels");
        let s = net.add_node("s", -2);
        let t = net.add_node("t", 2);
        let a = net.add_arc(s, t, 0, 1, 1);
        let b = net.add_arc(s, t, 0, 1, 1);
        let detour = net.add_arc(s, t, 0, 2, 5);
        (net, a, b, detour)
    }

    #[test]
    fn relaxation_uses_both_channels() {
        let (net, a, b, _) = channels();
        let flow = SuccessiveShortestPaths
            .solve(&net, &Deadline::none())
            .unwrap();
        assert_eq!(flow.values[a] + flow.values[b], 2);
        assert_eq!(flow.cost, 2);
    }

    #[test]
    fn bundle_forces_one_channel() {
        let (net, a, b, detour) = channels();
        let solver = BundleSolver::new(SuccessiveShortestPaths, vec![(a, b)]);
        let flow = solver.solve(&net, &Deadline::none()).unwrap();
        check_conservation(&net, &flow).unwrap();
        assert_eq!(flow.values[a] + flow.values[b], 1);
        assert_eq!(flow.values[detour], 1);
        assert_eq!(flow.cost, 6);
    }

    #[test]
    fn no_bundles_matches_relaxation() {
        let (net, ..) = channels();
        let solver = BundleSolver::new(SuccessiveShortestPaths, Vec::new());
        let flow = solver.solve(&net, &Deadline::none()).unwrap();
        assert_eq!(flow.cost, 2);
    }

    #[test]
    fn infeasible_branches_surface_error() {
        let mut net = FlowNetwork::new("strict");
        let s = net.add_node("s", -2);
        let t = net.add_node("t", 2);
        let a = net.add_arc(s, t, 0, 1, 1);
        let b = net.add_arc(s, t, 0, 1, 1);
        let solver = BundleSolver::new(SuccessiveShortestPaths, vec![(a, b)]);
        assert!(matches!(
            solver.solve(&net, &Deadline::none()),
            Err(OptimizationError::Infeasible { .. })
        ));
    }

    #[test]
    fn expired_deadline_stops_search() {
        let (net, a, b, _) = channels();
        let solver = BundleSolver::new(SuccessiveShortestPaths, vec![(a, b)]);
        let deadline = Deadline::after(std::time::Duration::ZERO);
        assert!(matches!(
            solver.solve(&net, &deadline),
            Err(OptimizationError::DeadlineExceeded)
        ));
    }
}
