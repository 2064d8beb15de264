use good_lp::{microlp, variable, Expression, ProblemVariables, ResolutionError, Solution, SolverModel, Variable};
use tracing::trace;

use crate::error::OptimizationError;

use super::{Deadline, Flow, FlowNetwork, FlowSolver, UNBOUNDED};

/// Min-cost flow with side constraints `x_a + x_b <= 1`, posed as an
/// integer program and handed to the pure-Rust `microlp` backend.
///
/// One integer variable per arc, bounded by the arc's lower bound and
/// capacity; one equality per node for its demand; one row per bundle.
/// Among optimal flows, the one using the fewest bundled arcs is chosen.
/// The solver has no time hook, so the deadline is checked around the call.
#[derive(Debug, Clone, Default)]
pub struct IntegerProgram {
    bundles: Vec<(usize, usize)>,
}

impl IntegerProgram {
    #[must_use]
    pub fn new(bundles: Vec<(usize, usize)>) -> Self {
        Self { bundles }
    }
}

impl FlowSolver for IntegerProgram {
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    fn solve(&self, network: &FlowNetwork, deadline: &Deadline) -> Result<Flow, OptimizationError> {
        deadline.check()?;
        let mut vars = ProblemVariables::new();
        let x: Vec<Variable> = network
            .arcs()
            .iter()
            .map(|arc| {
                let definition = variable().integer().min(arc.lower as f64);
                if arc.capacity < UNBOUNDED {
                    vars.add(definition.max(arc.capacity as f64))
                } else {
                    vars.add(definition)
                }
            })
            .collect();

        let mut bundled = vec![false; x.len()];
        for &(a, b) in &self.bundles {
            bundled[a] = true;
            bundled[b] = true;
        }
        // Each unit of cost outweighs all bundled arcs together.
        let scale = (bundled.iter().filter(|&&b| b).count() + 1) as f64;

        let mut objective = Expression::with_capacity(x.len());
        let mut balance: Vec<Expression> = network.nodes().iter().map(|_| Expression::with_capacity(4)).collect();
        for ((arc, &var), &tie) in network.arcs().iter().zip(&x).zip(&bundled) {
            objective.add_mul(arc.cost as f64 * scale + f64::from(u8::from(tie)), var);
            balance[arc.to].add_mul(1.0, var);
            balance[arc.from].add_mul(-1.0, var);
        }

        let mut problem = vars.minimise(objective).using(microlp);
        for (node, inflow) in network.nodes().iter().zip(balance) {
            problem = problem.with(inflow.eq(node.demand as f64));
        }
        for &(a, b) in &self.bundles {
            problem = problem.with((x[a] + x[b]).leq(1.0));
        }

        let solution = problem.solve().map_err(|err| match err {
            ResolutionError::Infeasible => OptimizationError::Infeasible {
                network: network.name().to_string(),
                node: network.name().to_string(),
            },
            ResolutionError::Unbounded => OptimizationError::NegativeCycle(network.name().to_string()),
            other => OptimizationError::Solver {
                network: network.name().to_string(),
                message: other.to_string(),
            },
        })?;
        deadline.check()?;

        let values: Vec<i64> = x.iter().map(|&var| solution.value(var).round() as i64).collect();
        let cost = network.cost_of(&values);
        trace!(network = network.name(), cost, bundles = self.bundles.len(), "integer program solved");
        Ok(Flow { values, cost })
    }
}
