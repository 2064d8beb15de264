use std::collections::VecDeque;

use tracing::trace;

use crate::error::OptimizationError;

use super::{Deadline, Flow, FlowNetwork, FlowSolver};

/// Min-cost flow by successive shortest augmenting paths.
///
/// Suppliers hang off a super source and consumers off a super sink;
/// shortest paths are found with a queue-based Bellman-Ford so residual
/// arcs with negative reduced cost are handled. Requires zero lower bounds.
#[derive(Debug, Clone, Copy, Default)]
pub struct SuccessiveShortestPaths;

#[derive(Debug, Clone)]
struct Residual {
    to: usize,
    capacity: i64,
    cost: i64,
    reverse: usize,
}

#[derive(Debug, Default)]
struct ResidualGraph {
    adjacency: Vec<Vec<usize>>,
    edges: Vec<Residual>,
}

impl ResidualGraph {
    fn with_nodes(n: usize) -> Self {
        Self {
            adjacency: vec![Vec::new(); n],
            edges: Vec::new(),
        }
    }

    fn add(&mut self, from: usize, to: usize, capacity: i64, cost: i64) -> usize {
        let forward = self.edges.len();
        self.edges.push(Residual {
            to,
            capacity,
            cost,
            reverse: forward + 1,
        });
        self.edges.push(Residual {
            to: from,
            capacity: 0,
            cost: -cost,
            reverse: forward,
        });
        self.adjacency[from].push(forward);
        self.adjacency[to].push(forward + 1);
        forward
    }

    /// Shortest-path tree from `source`: distance and entering edge per node.
    fn shortest_paths(&self, source: usize) -> Option<(Vec<i64>, Vec<Option<usize>>)> {
        let n = self.adjacency.len();
        let mut dist = vec![i64::MAX; n];
        let mut parent = vec![None; n];
        let mut queued = vec![false; n];
        let mut hops = vec![0_usize; n];
        let mut queue = VecDeque::new();
        dist[source] = 0;
        queue.push_back(source);
        queued[source] = true;

        while let Some(u) = queue.pop_front() {
            queued[u] = false;
            for &e in &self.adjacency[u] {
                let edge = &self.edges[e];
                if edge.capacity <= 0 {
                    continue;
                }
                let candidate = dist[u] + edge.cost;
                if candidate < dist[edge.to] {
                    dist[edge.to] = candidate;
                    parent[edge.to] = Some(e);
                    hops[edge.to] = hops[u] + 1;
                    if hops[edge.to] >= n {
                        return None;
                    }
                    if !queued[edge.to] {
                        queued[edge.to] = true;
                        queue.push_back(edge.to);
                    }
                }
            }
        }
        Some((dist, parent))
    }
}

impl FlowSolver for SuccessiveShortestPaths {
    fn solve(&self, network: &FlowNetwork, deadline: &Deadline) -> Result<Flow, OptimizationError> {
        if network.arcs().iter().any(|arc| arc.lower != 0) {
            return Err(OptimizationError::LowerBounds(network.name().to_string()));
        }
        let n = network.nodes().len();
        let source = n;
        let sink = n + 1;
        let mut graph = ResidualGraph::with_nodes(n + 2);

        let arc_edges: Vec<usize> = network
            .arcs()
            .iter()
            .map(|arc| graph.add(arc.from, arc.to, arc.capacity, arc.cost))
            .collect();

        let mut supply = 0;
        let mut demand = 0;
        let mut terminals = Vec::new();
        for (index, node) in network.nodes().iter().enumerate() {
            if node.demand < 0 {
                supply -= node.demand;
                terminals.push((index, graph.add(source, index, -node.demand, 0)));
            } else if node.demand > 0 {
                demand += node.demand;
                terminals.push((index, graph.add(index, sink, node.demand, 0)));
            }
        }
        if supply != demand {
            return Err(OptimizationError::Unbalanced {
                network: network.name().to_string(),
                supply,
                demand,
            });
        }

        let mut sent = 0;
        let mut augmentations = 0_usize;
        while sent < supply {
            deadline.check()?;
            let (dist, parent) = graph
                .shortest_paths(source)
                .ok_or_else(|| OptimizationError::NegativeCycle(network.name().to_string()))?;
            if dist[sink] == i64::MAX {
                break;
            }

            let mut bottleneck = supply - sent;
            let mut node = sink;
            while let Some(e) = parent[node] {
                bottleneck = bottleneck.min(graph.edges[e].capacity);
                node = graph.edges[graph.edges[e].reverse].to;
            }
            let mut node = sink;
            while let Some(e) = parent[node] {
                graph.edges[e].capacity -= bottleneck;
                let reverse = graph.edges[e].reverse;
                graph.edges[reverse].capacity += bottleneck;
                node = graph.edges[reverse].to;
            }
            sent += bottleneck;
            augmentations += 1;
        }
        trace!(
            network = network.name(),
            augmentations,
            sent,
            "shortest paths finished"
        );

        if sent < supply {
            let unmet = terminals
                .iter()
                .find(|&&(_, e)| graph.edges[e].capacity > 0)
                .map_or_else(|| network.name().to_string(), |&(node, _)| network.label(node));
            return Err(OptimizationError::Infeasible {
                network: network.name().to_string(),
                node: unmet,
            });
        }

        let values: Vec<i64> = network
            .arcs()
            .iter()
            .zip(&arc_edges)
            .map(|(arc, &e)| arc.capacity - graph.edges[e].capacity)
            .collect();
        let cost = network.cost_of(&values);
        Ok(Flow { values, cost })
    }
}
