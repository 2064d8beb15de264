use tracing::debug;

use crate::error::{InputError, Result};
use crate::math::distance_2d::point_to_segment_dist;
use crate::math::intersect_2d::{classify_segments, SegmentContact};
use crate::math::{Point2, TOLERANCE};
use crate::topology::{Mesh, NodeCounter, NodeId, NodeKind};

/// Minimum separation between distinct points of a drawing.
const MIN_SEPARATION: f64 = 1e-7;

/// Builds the initial mesh from a straight-line drawing.
///
/// Every proper crossing becomes a degree-4 [`NodeKind::Crossing`] vertex
/// spliced into both edges. The rotation at each vertex is the clockwise
/// angular order of its neighbours in a y-up plane, and the face right of
/// the edge from the leftmost point to its lowest neighbour is external.
pub struct Planarize<'a> {
    positions: &'a [Point2],
    edges: &'a [(usize, usize)],
}

impl<'a> Planarize<'a> {
    /// Creates a new `Planarize` operation over node positions and edges
    /// given as index pairs into `positions`.
    #[must_use]
    pub fn new(positions: &'a [Point2], edges: &'a [(usize, usize)]) -> Self {
        Self { positions, edges }
    }

    /// Executes the planarization.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::DegenerateDrawing`] when points coincide, an
    /// edge runs through a vertex, edges overlap, or three edges cross in
    /// one point.
    pub fn execute(&self) -> Result<Mesh> {
        let n = self.positions.len();
        self.check_input()?;

        let mut points = self.positions.to_vec();
        let mut along: Vec<Vec<(f64, usize)>> = vec![Vec::new(); self.edges.len()];
        for i in 0..self.edges.len() {
            for j in i + 1..self.edges.len() {
                let (a, b) = self.edges[i];
                let (c, d) = self.edges[j];
                let shared = a == c || a == d || b == c || b == d;
                let contact = classify_segments(
                    &self.positions[a],
                    &self.positions[b],
                    &self.positions[c],
                    &self.positions[d],
                );
                match contact {
                    SegmentContact::Disjoint => {}
                    SegmentContact::Touching { .. } if shared => {}
                    SegmentContact::Crossing { point, t, u } if !shared => {
                        along[i].push((t, points.len()));
                        along[j].push((u, points.len()));
                        points.push(point);
                    }
                    _ => {
                        return Err(InputError::DegenerateDrawing(format!(
                            "edges {a}-{b} and {c}-{d} overlap or touch"
                        ))
                        .into());
                    }
                }
            }
        }
        for (k, p) in points.iter().enumerate().skip(n) {
            if points[..k].iter().any(|q| (p - q).norm() < MIN_SEPARATION) {
                return Err(InputError::DegenerateDrawing(
                    "more than two edges cross in one point".into(),
                )
                .into());
            }
        }

        let mut neighbours: Vec<Vec<usize>> = vec![Vec::new(); points.len()];
        for (edge, crossings) in self.edges.iter().zip(&mut along) {
            crossings.sort_by(|x, y| x.0.total_cmp(&y.0));
            let chain: Vec<usize> = std::iter::once(edge.0)
                .chain(crossings.iter().map(|&(_, p)| p))
                .chain(std::iter::once(edge.1))
                .collect();
            for pair in chain.windows(2) {
                neighbours[pair[0]].push(pair[1]);
                neighbours[pair[1]].push(pair[0]);
            }
        }
        for (p, list) in neighbours.iter_mut().enumerate() {
            let origin = points[p];
            let angle = |q: usize| {
                let d = points[q] - origin;
                d.y.atan2(d.x)
            };
            list.sort_by(|&x, &y| angle(y).total_cmp(&angle(x)));
        }

        let mut crossings = NodeCounter::new(NodeKind::Crossing);
        let nodes: Vec<NodeId> = (0..points.len())
            .map(|p| if p < n { NodeId::original(p) } else { crossings.next_id() })
            .collect();

        let external = Self::external_edge(&points, &neighbours);
        let mesh = Mesh::from_rotation_system(&nodes, &neighbours, external)?;
        debug!(
            vertices = mesh.vertex_count(),
            crossings = crossings.issued(),
            faces = mesh.face_count(),
            "planarized drawing"
        );
        Ok(mesh)
    }

    fn check_input(&self) -> Result<()> {
        let n = self.positions.len();
        for &(a, b) in self.edges {
            if a >= n || b >= n {
                return Err(InputError::UnknownNode(a.max(b)).into());
            }
            if a == b {
                return Err(InputError::SelfLoop(a.to_string()).into());
            }
        }
        for (i, p) in self.positions.iter().enumerate() {
            if !p.x.is_finite() || !p.y.is_finite() {
                return Err(InputError::DegenerateDrawing(format!("node {i} has no finite position")).into());
            }
            if self.positions[..i].iter().any(|q| (p - q).norm() < MIN_SEPARATION) {
                return Err(InputError::DegenerateDrawing(format!("node {i} coincides with another")).into());
            }
        }
        for &(a, b) in self.edges {
            for (v, p) in self.positions.iter().enumerate() {
                if v != a
                    && v != b
                    && point_to_segment_dist(p, &self.positions[a], &self.positions[b]) < TOLERANCE
                {
                    return Err(InputError::DegenerateDrawing(format!("edge {a}-{b} runs through node {v}")).into());
                }
            }
        }
        Ok(())
    }

    /// The directed edge whose right side is the unbounded face.
    fn external_edge(points: &[Point2], neighbours: &[Vec<usize>]) -> (usize, usize) {
        let corner = (0..points.len())
            .min_by(|&a, &b| {
                points[a]
                    .x
                    .total_cmp(&points[b].x)
                    .then(points[a].y.total_cmp(&points[b].y))
            })
            .unwrap_or_default();
        let lowest = neighbours
            .get(corner)
            .and_then(|list| {
                list.iter().copied().min_by(|&a, &b| {
                    let sine = |q: usize| {
                        let d = points[q] - points[corner];
                        d.y / d.norm()
                    };
                    sine(a).total_cmp(&sine(b))
                })
            })
            .unwrap_or(corner);
        (corner, lowest)
    }
}
