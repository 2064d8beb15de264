//! Left-right planarity test with a combinatorial embedding.
//!
//! The DFS runs in three passes: orientation (heights and lowpoints),
//! testing (conflict pairs of back-edge intervals) and embedding (signs
//! resolved through the reference chains). All passes are recursive in the
//! DFS depth.

use std::collections::{HashMap, HashSet};

/// An edge as oriented by the DFS, `(tail, head)`.
type Dart = (usize, usize);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Interval {
    low: Option<Dart>,
    high: Option<Dart>,
}

impl Interval {
    fn single(arc: Dart) -> Self {
        Self {
            low: Some(arc),
            high: Some(arc),
        }
    }

    fn is_empty(self) -> bool {
        self.low.is_none() && self.high.is_none()
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct ConflictPair {
    left: Interval,
    right: Interval,
}

impl ConflictPair {
    fn swap(&mut self) {
        std::mem::swap(&mut self.left, &mut self.right);
    }
}

#[derive(Default)]
struct LeftRight {
    adjacency: Vec<Vec<usize>>,
    height: Vec<Option<usize>>,
    parent: Vec<Option<Dart>>,
    oriented: HashSet<Dart>,
    /// Outgoing arcs per vertex, in orientation order and later by nesting depth.
    ordered: Vec<Vec<usize>>,
    lowpt: HashMap<Dart, usize>,
    lowpt2: HashMap<Dart, usize>,
    nesting: HashMap<Dart, i64>,
    reference: HashMap<Dart, Dart>,
    side: HashMap<Dart, i64>,
    stack: Vec<ConflictPair>,
    stack_bottom: HashMap<Dart, usize>,
    lowpt_edge: HashMap<Dart, Dart>,
    left_ref: Vec<Option<usize>>,
    right_ref: Vec<Option<usize>>,
}

/// Returns a clockwise rotation system of a planar embedding of the graph,
/// or `None` if the graph is not planar.
///
/// `edges` must be simple: no loops and no repeated pairs.
pub(crate) fn planar_rotation(node_count: usize, edges: &[(usize, usize)]) -> Option<Vec<Vec<usize>>> {
    if node_count > 2 && edges.len() > 3 * node_count - 6 {
        return None;
    }
    let mut lr = LeftRight {
        adjacency: vec![Vec::new(); node_count],
        height: vec![None; node_count],
        parent: vec![None; node_count],
        ordered: vec![Vec::new(); node_count],
        left_ref: vec![None; node_count],
        right_ref: vec![None; node_count],
        ..LeftRight::default()
    };
    for &(a, b) in edges {
        lr.adjacency[a].push(b);
        lr.adjacency[b].push(a);
    }

    let mut roots = Vec::new();
    for v in 0..node_count {
        if lr.height[v].is_none() {
            lr.height[v] = Some(0);
            roots.push(v);
            lr.orient(v);
        }
    }
    lr.sort_by_nesting();
    for &root in &roots {
        if !lr.test(root) {
            return None;
        }
    }

    let arcs: Vec<Dart> = lr.oriented.iter().copied().collect();
    for arc in arcs {
        let sign = lr.sign(arc);
        if let Some(depth) = lr.nesting.get_mut(&arc) {
            *depth *= sign;
        }
    }
    lr.sort_by_nesting();

    let mut rotation = lr.ordered.clone();
    for &root in &roots {
        lr.embed(root, &mut rotation);
    }
    Some(rotation)
}

/// Whether the graph has a planar embedding.
pub(crate) fn is_planar(node_count: usize, edges: &[(usize, usize)]) -> bool {
    planar_rotation(node_count, edges).is_some()
}

impl LeftRight {
    fn height_of(&self, v: usize) -> usize {
        self.height[v].unwrap_or_default()
    }

    fn low(&self, arc: Option<Dart>) -> usize {
        arc.and_then(|arc| self.lowpt.get(&arc).copied()).unwrap_or(usize::MAX)
    }

    fn side_of(&self, arc: Dart) -> i64 {
        self.side.get(&arc).copied().unwrap_or(1)
    }

    fn set_reference(&mut self, arc: Option<Dart>, target: Option<Dart>) {
        let Some(arc) = arc else { return };
        match target {
            Some(target) => self.reference.insert(arc, target),
            None => self.reference.remove(&arc),
        };
    }

    fn sort_by_nesting(&mut self) {
        for (v, list) in self.ordered.iter_mut().enumerate() {
            list.sort_by_key(|&w| self.nesting.get(&(v, w)).copied().unwrap_or_default());
        }
    }

    fn orient(&mut self, v: usize) {
        let parent = self.parent[v];
        let hv = self.height_of(v);
        for i in 0..self.adjacency[v].len() {
            let w = self.adjacency[v][i];
            if self.oriented.contains(&(v, w)) || self.oriented.contains(&(w, v)) {
                continue;
            }
            let vw = (v, w);
            self.oriented.insert(vw);
            self.ordered[v].push(w);
            self.lowpt.insert(vw, hv);
            self.lowpt2.insert(vw, hv);
            match self.height[w] {
                None => {
                    self.parent[w] = Some(vw);
                    self.height[w] = Some(hv + 1);
                    self.orient(w);
                }
                Some(hw) => {
                    self.lowpt.insert(vw, hw);
                }
            }

            let low = self.lowpt[&vw];
            let low2 = self.lowpt2[&vw];
            #[allow(clippy::cast_possible_wrap)]
            let mut depth = 2 * low as i64;
            if low2 < hv {
                depth += 1;
            }
            self.nesting.insert(vw, depth);

            if let Some(e) = parent {
                let (le, le2) = (self.lowpt[&e], self.lowpt2[&e]);
                if low < le {
                    self.lowpt2.insert(e, le.min(low2));
                    self.lowpt.insert(e, low);
                } else if low > le {
                    self.lowpt2.insert(e, le2.min(low));
                } else {
                    self.lowpt2.insert(e, le2.min(low2));
                }
            }
        }
    }

    fn test(&mut self, v: usize) -> bool {
        let parent = self.parent[v];
        let hv = self.height_of(v);
        let children = self.ordered[v].clone();
        for (i, &w) in children.iter().enumerate() {
            let ei = (v, w);
            self.stack_bottom.insert(ei, self.stack.len());
            if self.parent[w] == Some(ei) {
                if !self.test(w) {
                    return false;
                }
            } else {
                self.lowpt_edge.insert(ei, ei);
                self.stack.push(ConflictPair {
                    left: Interval::default(),
                    right: Interval::single(ei),
                });
            }

            if self.low(Some(ei)) < hv {
                let Some(e) = parent else { continue };
                if i == 0 {
                    if let Some(&edge) = self.lowpt_edge.get(&ei) {
                        self.lowpt_edge.insert(e, edge);
                    }
                } else if !self.add_constraints(ei, e) {
                    return false;
                }
            }
        }
        if let Some(e) = parent {
            self.remove_back_edges(e);
        }
        true
    }

    fn conflicting(&self, interval: Interval, arc: Dart) -> bool {
        interval
            .high
            .is_some_and(|high| self.low(Some(high)) > self.low(Some(arc)))
    }

    fn lowest(&self, pair: &ConflictPair) -> usize {
        if pair.left.is_empty() {
            self.low(pair.right.low)
        } else if pair.right.is_empty() {
            self.low(pair.left.low)
        } else {
            self.low(pair.left.low).min(self.low(pair.right.low))
        }
    }

    fn add_constraints(&mut self, ei: Dart, e: Dart) -> bool {
        let mut merged = ConflictPair::default();
        let bottom = self.stack_bottom.get(&ei).copied().unwrap_or_default();

        // Intervals of the returning edges of ei all go to one side.
        while let Some(mut q) = self.stack.pop() {
            if !q.left.is_empty() {
                q.swap();
            }
            if !q.left.is_empty() {
                return false;
            }
            if self.low(q.right.low) > self.low(Some(e)) {
                if merged.right.is_empty() {
                    merged.right = q.right;
                } else {
                    self.set_reference(merged.right.low, q.right.high);
                }
                merged.right.low = q.right.low;
            } else {
                let target = self.lowpt_edge.get(&e).copied();
                self.set_reference(q.right.low, target);
            }
            if self.stack.len() <= bottom {
                break;
            }
        }

        // Older pairs that conflict with ei go to the other side.
        while self
            .stack
            .last()
            .is_some_and(|top| self.conflicting(top.left, ei) || self.conflicting(top.right, ei))
        {
            let Some(mut q) = self.stack.pop() else { break };
            if self.conflicting(q.right, ei) {
                q.swap();
            }
            if self.conflicting(q.right, ei) {
                return false;
            }
            self.set_reference(merged.right.low, q.right.high);
            if q.right.low.is_some() {
                merged.right.low = q.right.low;
            }
            if merged.left.is_empty() {
                merged.left = q.left;
            } else {
                self.set_reference(merged.left.low, q.left.high);
            }
            merged.left.low = q.left.low;
        }

        if !(merged.left.is_empty() && merged.right.is_empty()) {
            self.stack.push(merged);
        }
        true
    }

    fn remove_back_edges(&mut self, e: Dart) {
        let u = e.0;
        let hu = self.height_of(u);
        while self.stack.last().is_some_and(|top| self.lowest(top) == hu) {
            if let Some(low) = self.stack.pop().and_then(|pair| pair.left.low) {
                self.side.insert(low, -1);
            }
        }

        if let Some(mut pair) = self.stack.pop() {
            while let Some(high) = pair.left.high.filter(|high| high.1 == u) {
                pair.left.high = self.reference.get(&high).copied();
            }
            if pair.left.high.is_none() {
                if let Some(low) = pair.left.low.take() {
                    self.set_reference(Some(low), pair.right.low);
                    self.side.insert(low, -1);
                }
            }
            while let Some(high) = pair.right.high.filter(|high| high.1 == u) {
                pair.right.high = self.reference.get(&high).copied();
            }
            if pair.right.high.is_none() {
                if let Some(low) = pair.right.low.take() {
                    self.set_reference(Some(low), pair.left.low);
                    self.side.insert(low, -1);
                }
            }
            self.stack.push(pair);
        }

        if self.low(Some(e)) < hu {
            let (hl, hr) = self
                .stack
                .last()
                .map_or((None, None), |top| (top.left.high, top.right.high));
            let target = match (hl, hr) {
                (Some(l), Some(r)) if self.low(Some(l)) > self.low(Some(r)) => Some(l),
                (Some(l), None) => Some(l),
                _ => hr,
            };
            self.set_reference(Some(e), target);
        }
    }

    /// Resolves the side of `arc` relative to its parent, collapsing the reference chain.
    fn sign(&mut self, arc: Dart) -> i64 {
        let mut chain = vec![arc];
        while let Some(&next) = chain.last().and_then(|last| self.reference.get(last)) {
            if chain.contains(&next) {
                break;
            }
            chain.push(next);
        }
        for i in (0..chain.len() - 1).rev() {
            let resolved = self.side_of(chain[i]) * self.side_of(chain[i + 1]);
            self.side.insert(chain[i], resolved);
            self.reference.remove(&chain[i]);
        }
        self.side_of(arc)
    }

    fn embed(&mut self, v: usize, rotation: &mut [Vec<usize>]) {
        let children = self.ordered[v].clone();
        for w in children {
            let ei = (v, w);
            if self.parent[w] == Some(ei) {
                rotation[w].insert(0, v);
                self.left_ref[v] = Some(w);
                self.right_ref[v] = Some(w);
                self.embed(w, rotation);
            } else if self.side_of(ei) == 1 {
                let at = position(&rotation[w], self.right_ref[w]).map_or(rotation[w].len(), |i| i + 1);
                rotation[w].insert(at, v);
            } else {
                let at = position(&rotation[w], self.left_ref[w]).unwrap_or(rotation[w].len());
                rotation[w].insert(at, v);
                self.left_ref[w] = Some(v);
            }
        }
    }
}

fn position(list: &[usize], item: Option<usize>) -> Option<usize> {
    item.and_then(|item| list.iter().position(|&x| x == item))
}
