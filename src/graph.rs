//! Input graphs: simple, undirected, labelled, optionally with positions.

use std::collections::HashMap;

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::{Bfs, EdgeRef};
use tracing::warn;

use crate::error::InputError;
use crate::math::Point2;

/// Node data stored in the petgraph graph.
#[derive(Debug, Clone)]
pub struct NodeData {
    pub label: String,
    /// Position in a y-up plane used to derive the planar embedding.
    pub position: Option<Point2>,
}

/// A simple undirected graph to be drawn.
///
/// Self-loops and parallel edges are rejected on insertion.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    graph: UnGraph<NodeData, ()>,
    by_label: HashMap<String, NodeIndex>,
}

/// One connected component with node indices local to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    pub labels: Vec<String>,
    /// Present only if every node of the component has a position.
    pub positions: Option<Vec<Point2>>,
    pub edges: Vec<(usize, usize)>,
}

impl Graph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the node labelled `label`, creating it if needed.
    pub fn add_node(&mut self, label: &str) -> NodeIndex {
        if let Some(&index) = self.by_label.get(label) {
            return index;
        }
        let index = self.graph.add_node(NodeData {
            label: label.to_string(),
            position: None,
        });
        self.by_label.insert(label.to_string(), index);
        index
    }

    /// Returns the node labelled `label` and places it at `(x, y)`.
    pub fn add_node_at(&mut self, label: &str, x: f64, y: f64) -> NodeIndex {
        let index = self.add_node(label);
        self.graph[index].position = Some(Point2::new(x, y));
        index
    }

    /// Adds the undirected edge `a -- b`.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown nodes, self-loops and duplicate edges.
    pub fn add_edge(&mut self, a: NodeIndex, b: NodeIndex) -> Result<(), InputError> {
        for index in [a, b] {
            if self.graph.node_weight(index).is_none() {
                return Err(InputError::UnknownNode(index.index()));
            }
        }
        if a == b {
            return Err(InputError::SelfLoop(self.graph[a].label.clone()));
        }
        if self.graph.find_edge(a, b).is_some() {
            return Err(InputError::DuplicateEdge(
                self.graph[a].label.clone(),
                self.graph[b].label.clone(),
            ));
        }
        self.graph.add_edge(a, b, ());
        Ok(())
    }

    /// Adds an edge between two labels, creating missing nodes.
    ///
    /// # Errors
    ///
    /// Returns an error for self-loops and duplicate edges.
    pub fn connect(&mut self, a: &str, b: &str) -> Result<(), InputError> {
        let a = self.add_node(a);
        let b = self.add_node(b);
        self.add_edge(a, b)
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    #[must_use]
    pub fn node(&self, index: NodeIndex) -> Option<&NodeData> {
        self.graph.node_weight(index)
    }

    /// Connected components ordered by their first node.
    #[must_use]
    pub fn components(&self) -> Vec<Component> {
        let mut component_of: Vec<Option<usize>> = vec![None; self.graph.node_count()];
        let mut members: Vec<Vec<NodeIndex>> = Vec::new();
        for start in self.graph.node_indices() {
            if component_of[start.index()].is_some() {
                continue;
            }
            let id = members.len();
            let mut nodes = Vec::new();
            let mut bfs = Bfs::new(&self.graph, start);
            while let Some(node) = bfs.next(&self.graph) {
                component_of[node.index()] = Some(id);
                nodes.push(node);
            }
            nodes.sort_unstable();
            members.push(nodes);
        }

        let mut edges: Vec<Vec<(usize, usize)>> = vec![Vec::new(); members.len()];
        let local: HashMap<NodeIndex, usize> = members
            .iter()
            .flat_map(|nodes| nodes.iter().enumerate().map(|(i, &n)| (n, i)))
            .collect();
        for edge in self.graph.edge_references() {
            if let Some(id) = component_of[edge.source().index()] {
                edges[id].push((local[&edge.source()], local[&edge.target()]));
            }
        }

        members
            .into_iter()
            .zip(edges)
            .map(|(nodes, edges)| {
                let labels: Vec<String> = nodes.iter().map(|&n| self.graph[n].label.clone()).collect();
                let placed = nodes.iter().filter(|&&n| self.graph[n].position.is_some()).count();
                if placed > 0 && placed < nodes.len() {
                    warn!(
                        placed,
                        nodes = nodes.len(),
                        first = %labels[0],
                        "component is only partly placed; positions ignored"
                    );
                }
                Component {
                    positions: nodes
                        .iter()
                        .map(|&n| self.graph[n].position)
                        .collect::<Option<Vec<_>>>(),
                    labels,
                    edges,
                }
            })
            .collect()
    }

    /// Parses the edge-list format.
    ///
    /// One item per line: `a b` (or `a -- b`) adds an edge, a lone `a`
    /// declares a node, `pos a X Y` places a node. `#` starts a comment.
    ///
    /// # Errors
    ///
    /// Returns an error naming the offending line.
    pub fn parse(text: &str) -> Result<Self, InputError> {
        let mut graph = Self::new();
        for (number, raw) in text.lines().enumerate() {
            let line = raw.split('#').next().unwrap_or_default().trim();
            if line.is_empty() {
                continue;
            }
            let tokens: Vec<&str> = line.split_whitespace().collect();
            let parse_error = |message: String| InputError::Parse {
                line: number + 1,
                message,
            };
            match tokens.as_slice() {
                ["pos", label, x, y] => {
                    let x: f64 = x
                        .parse()
                        .map_err(|_| parse_error(format!("invalid x coordinate '{x}'")))?;
                    let y: f64 = y
                        .parse()
                        .map_err(|_| parse_error(format!("invalid y coordinate '{y}'")))?;
                    graph.add_node_at(label, x, y);
                }
                [label] => {
                    graph.add_node(label);
                }
                [a, b] | [a, "--", b] => graph.connect(a, b)?,
                _ => return Err(parse_error(format!("cannot parse '{line}'"))),
            }
        }
        Ok(graph)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parse_edges_and_isolated_nodes() {
        let graph = Graph::parse("a b\nb -- c\n# comment\nlonely\n").unwrap();
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn parse_positions() {
        let graph = Graph::parse("pos a 0 0\npos b 1.5 2\na b\n").unwrap();
        let comps = graph.components();
        assert_eq!(comps.len(), 1);
        let positions = comps[0].positions.as_ref().unwrap();
        assert_eq!(positions[1], Point2::new(1.5, 2.0));
    }

    #[test]
    fn self_loop_is_rejected() {
        assert!(matches!(
            Graph::parse("a a"),
            Err(InputError::SelfLoop(label)) if label == "a"
        ));
    }

    #[test]
    fn duplicate_edge_is_rejected() {
        let mut graph = Graph::new();
        graph.connect("a", "b").unwrap();
        assert!(matches!(
            graph.connect("b", "a"),
            Err(InputError::DuplicateEdge(_, _))
        ));
    }

    #[test]
    fn malformed_line_reports_number() {
        assert!(matches!(
            Graph::parse("a b\npos a x 1\n"),
            Err(InputError::Parse { line: 2, .. })
        ));
        assert!(matches!(
            Graph::parse("a b c d e"),
            Err(InputError::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn partial_positions_are_dropped() {
        let graph = Graph::parse("pos a 0 0\na b\nb c\npos d 1 1\npos e 2 2\nd e\n").unwrap();
        let comps = graph.components();
        assert_eq!(comps.len(), 2);
        assert!(comps[0].positions.is_none());
        assert_eq!(comps[0].edges.len(), 2);
        assert_eq!(comps[1].positions.as_ref().map(Vec::len), Some(2));
    }

    #[test]
    fn components_in_input_order() {
        let graph = Graph::parse("x\na b\nb c\nd e\n").unwrap();
        let comps = graph.components();
        assert_eq!(comps.len(), 3);
        assert_eq!(comps[0].labels, vec!["x"]);
        assert_eq!(comps[1].labels, vec!["a", "b", "c"]);
        assert_eq!(comps[1].edges, vec![(0, 1), (1, 2)]);
        assert_eq!(comps[2].labels, vec!["d", "e"]);
        assert!(comps[2].positions.is_none());
    }
}
