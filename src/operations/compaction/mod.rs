//! Assigns integer coordinates to a rectangularized mesh.
//!
//! Edge lengths come from one min-cost flow per axis; coordinates follow
//! by walking the mesh from the external face.

mod network;

pub use network::SpacingNetwork;

use slotmap::SecondaryMap;
use tracing::debug;

use crate::error::{LayoutError, MeshError, Result};
use crate::flow::{Deadline, FlowSolver, LowerBoundTransform, SuccessiveShortestPaths};
use crate::math::{GridPoint, GridVector};
use crate::operations::rectangularize::Rectangulation;
use crate::topology::{HalfEdgeId, Mesh, Side, VertexId};

/// Minimum gaps between drawn elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spacing {
    /// Columns of edge between two boxes side by side.
    pub edge_width: i64,
    /// Rows of edge between two boxes stacked vertically.
    pub edge_height: i64,
    /// Widest label to fit inside a box, `0` without labels.
    pub label_width: usize,
}

impl Default for Spacing {
    fn default() -> Self {
        Self {
            edge_width: 4,
            edge_height: 1,
            label_width: 0,
        }
    }
}

/// Coordinates of every vertex in grid cells, `y` pointing down.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    /// Positions before port spreading.
    pub positions: SecondaryMap<VertexId, GridPoint>,
    pub offsets: SecondaryMap<VertexId, GridVector>,
    pub lengths: SecondaryMap<HalfEdgeId, i64>,
    /// Columns from a box centre to its left or right border.
    pub half_width: i64,
    /// Rows from a box centre to its top or bottom border.
    pub half_height: i64,
}

impl Layout {
    /// Where `vertex` is drawn, port spreading included.
    #[must_use]
    pub fn position(&self, vertex: VertexId) -> Option<GridPoint> {
        let offset = self.offsets.get(vertex).copied().unwrap_or_else(GridVector::zeros);
        self.positions.get(vertex).map(|p| p + offset)
    }

    #[must_use]
    pub fn length(&self, he: HalfEdgeId) -> Option<i64> {
        self.lengths.get(he).copied()
    }
}

/// Computes a compact layout with minimum total edge length.
pub struct Compact<'a> {
    rect: &'a Rectangulation,
    spacing: Spacing,
    deadline: Deadline,
}

impl<'a> Compact<'a> {
    #[must_use]
    pub fn new(rect: &'a Rectangulation, spacing: Spacing, deadline: Deadline) -> Self {
        Self {
            rect,
            spacing,
            deadline,
        }
    }

    /// Executes the compaction on the mesh `rect` was computed for.
    ///
    /// # Errors
    ///
    /// Returns an error if a face has unbalanced sides, a solve fails, or
    /// the coordinates do not close around a face.
    pub fn execute(&self, mesh: &Mesh) -> Result<Layout> {
        let (half_width, half_height) = self.half_extents();
        let mut layout = Layout {
            offsets: self.rect.offsets.clone(),
            half_width,
            half_height,
            ..Layout::default()
        };
        if mesh.half_edge_count() == 0 {
            for (vertex, _) in mesh.vertices() {
                layout.positions.insert(vertex, GridPoint::origin());
            }
            return Ok(layout);
        }

        let horizontal = 2 * half_width + self.spacing.edge_width;
        let vertical = 2 * half_height + self.spacing.edge_height;
        layout.lengths = self.edge_lengths(mesh, horizontal, vertical)?;
        layout.positions = place(mesh, self.rect, &layout.lengths)?;
        debug!(
            vertices = layout.positions.len(),
            half_width, half_height, "compacted"
        );
        Ok(layout)
    }

    /// Half box extents: wide and tall enough for the port offsets, and
    /// wide enough for the label.
    fn half_extents(&self) -> (i64, i64) {
        let dx = self.rect.offsets.values().map(|v| v.x.abs()).max().unwrap_or(0);
        let dy = self.rect.offsets.values().map(|v| v.y.abs()).max().unwrap_or(0);
        let label = i64::try_from(self.spacing.label_width / 2).unwrap_or(i64::MAX - 1);
        ((dx + 1).max(label + 1), dy + 1)
    }

    fn edge_lengths(&self, mesh: &Mesh, horizontal: i64, vertical: i64) -> Result<SecondaryMap<HalfEdgeId, i64>> {
        let solver = LowerBoundTransform::new(SuccessiveShortestPaths);
        let mut lengths = SecondaryMap::new();
        for (target, min_length) in [(Side::Right, horizontal), (Side::Down, vertical)] {
            let spacing = SpacingNetwork::build(mesh, self.rect, target, min_length)?;
            let flow = solver.solve(spacing.network(), &self.deadline)?;
            for (he, data) in mesh.half_edges() {
                if self.rect.side(he) != Some(target) {
                    continue;
                }
                let length = match spacing.arc(he) {
                    Some(arc) => flow.values.get(arc).copied().unwrap_or_default(),
                    None => 0,
                };
                lengths.insert(he, length);
                lengths.insert(data.twin, length);
            }
        }
        Ok(lengths)
    }
}

/// Walks the mesh from the external face, stepping along each half-edge
/// by its side and length.
fn place(
    mesh: &Mesh,
    rect: &Rectangulation,
    lengths: &SecondaryMap<HalfEdgeId, i64>,
) -> Result<SecondaryMap<VertexId, GridPoint>> {
    let mut positions: SecondaryMap<VertexId, GridPoint> = SecondaryMap::new();
    let ext = mesh.external_face()?;
    let mut stack = vec![(mesh.face(ext)?.incident, GridPoint::origin())];

    while let Some((first, at)) = stack.pop() {
        let cycle = mesh.cycle(first)?;
        let mut current = at;
        for &he in &cycle {
            let origin = mesh.origin(he)?;
            match positions.get(origin) {
                Some(&placed) if placed != current => {
                    return Err(LayoutError::OpenBoundary(mesh.node(origin)?.to_string()).into());
                }
                Some(_) => {}
                None => {
                    positions.insert(origin, current);
                }
            }
            let side = rect.side(he).ok_or(MeshError::EntityNotFound("half-edge side"))?;
            let length = lengths
                .get(he)
                .copied()
                .ok_or(MeshError::EntityNotFound("half-edge length"))?;
            current += side.unit() * length;
        }
        if current != at {
            return Err(LayoutError::OpenBoundary(mesh.node(mesh.origin(first)?)?.to_string()).into());
        }

        for &he in &cycle {
            let origin = mesh.origin(he)?;
            let at = positions[origin];
            for out in mesh.half_edges_around(origin)? {
                if !positions.contains_key(mesh.dest(out)?) {
                    stack.push((out, at));
                }
            }
        }
    }
    Ok(positions)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::flow::check_conservation;
    use crate::math::Point2;
    use crate::operations::embedding::Planarize;
    use crate::operations::orthogonalize::Orthogonalize;
    use crate::operations::rectangularize::Rectangularize;
    use crate::topology::{NodeId, NodeKind};

    fn compact(coords: &[(f64, f64)], edges: &[(usize, usize)]) -> (Mesh, Rectangulation, Layout) {
        let pos: Vec<Point2> = coords.iter().map(|&(x, y)| Point2::new(x, y)).collect();
        let mut mesh = Planarize::new(&pos, edges).execute().unwrap();
        let shape = Orthogonalize::new(Deadline::none()).execute(&mesh).unwrap();
        let rect = Rectangularize::new(&shape).execute(&mut mesh).unwrap();
        let layout = Compact::new(&rect, Spacing::default(), Deadline::none())
            .execute(&mesh)
            .unwrap();
        (mesh, rect, layout)
    }

    /// Every half-edge ends where its successor starts.
    fn assert_closed(mesh: &Mesh, rect: &Rectangulation, layout: &Layout) {
        for (he, data) in mesh.half_edges() {
            let from = layout.positions[data.origin];
            let to = layout.positions[mesh.dest(he).unwrap()];
            let step = rect.side(he).unwrap().unit() * layout.length(he).unwrap();
            assert_eq!(from + step, to);
            assert_eq!(layout.length(he), layout.length(data.twin));
        }
    }

    #[test]
    fn single_edge_is_vertical_and_tight() {
        let (mesh, rect, layout) = compact(&[(0.0, 0.0), (0.0, 1.0)], &[(0, 1)]);
        assert_closed(&mesh, &rect, &layout);
        let a = layout.position(mesh.vertex_by_node(NodeId::original(0)).unwrap()).unwrap();
        let b = layout.position(mesh.vertex_by_node(NodeId::original(1)).unwrap()).unwrap();
        assert_eq!(a.x, b.x);
        assert_eq!((b.y - a.y).abs(), 3);
        assert_eq!((layout.half_width, layout.half_height), (1, 1));
    }

    #[test]
    fn square_edges_respect_minimum_length() {
        let (mesh, rect, layout) = compact(
            &[(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)],
            &[(0, 1), (1, 2), (2, 3), (3, 0)],
        );
        assert_closed(&mesh, &rect, &layout);
        for &(a, b) in &rect.segments {
            let pa = layout.position(a).unwrap();
            let pb = layout.position(b).unwrap();
            let d = pb - pa;
            assert!(d.x == 0 || d.y == 0);
            if d.x == 0 {
                assert!(d.y.abs() >= 3);
            } else {
                assert!(d.x.abs() >= 6);
            }
        }
    }

    #[test]
    fn k4_layout_closes() {
        let (mesh, rect, layout) = compact(
            &[(0.0, 0.0), (4.0, 0.0), (2.0, 3.0), (2.0, 1.0)],
            &[(0, 1), (1, 2), (2, 0), (0, 3), (1, 3), (2, 3)],
        );
        assert_closed(&mesh, &rect, &layout);
        let originals: Vec<GridPoint> = mesh
            .vertices()
            .filter(|(_, v)| v.node.kind == NodeKind::Original)
            .map(|(id, _)| layout.position(id).unwrap())
            .collect();
        for (i, p) in originals.iter().enumerate() {
            for q in &originals[i + 1..] {
                assert_ne!(p, q);
            }
        }
    }

    #[test]
    fn star_boxes_grow_with_offsets() {
        let coords = [(0.0, 0.0), (2.0, 0.0), (1.0, 2.0), (-1.0, 2.0), (-2.0, -0.5), (0.5, -2.0)];
        let edges: Vec<(usize, usize)> = (1..=5).map(|leaf| (0, leaf)).collect();
        let (mesh, rect, layout) = compact(&coords, &edges);
        assert_closed(&mesh, &rect, &layout);
        assert!(layout.half_width >= 2 || layout.half_height >= 2);
        for he in &rect.exempt_edges {
            assert_eq!(layout.length(*he), Some(0));
        }
    }

    #[test]
    fn spacing_networks_are_conserved() {
        let pos = [Point2::new(0.0, 0.0), Point2::new(2.0, 0.0), Point2::new(1.0, 2.0)];
        let mut mesh = Planarize::new(&pos, &[(0, 1), (1, 2), (2, 0)]).execute().unwrap();
        let shape = Orthogonalize::new(Deadline::none()).execute(&mesh).unwrap();
        let rect = Rectangularize::new(&shape).execute(&mut mesh).unwrap();
        let solver = LowerBoundTransform::new(SuccessiveShortestPaths);
        for (side, min) in [(Side::Right, 6), (Side::Down, 3)] {
            let spacing = SpacingNetwork::build(&mesh, &rect, side, min).unwrap();
            let flow = solver.solve(spacing.network(), &Deadline::none()).unwrap();
            check_conservation(spacing.network(), &flow).unwrap();
        }
    }

    #[test]
    fn solving_twice_gives_the_same_layout() {
        let (mesh, rect, layout) = compact(
            &[(0.0, 0.0), (4.0, 0.0), (2.0, 3.0), (2.0, 1.0)],
            &[(0, 1), (1, 2), (2, 0), (0, 3), (1, 3), (2, 3)],
        );
        let again = Compact::new(&rect, Spacing::default(), Deadline::none())
            .execute(&mesh)
            .unwrap();
        let lengths = |layout: &Layout| layout.lengths.iter().map(|(he, &l)| (he, l)).collect::<Vec<_>>();
        assert_eq!(lengths(&layout), lengths(&again));
        for (vertex, _) in mesh.vertices() {
            assert_eq!(layout.position(vertex), again.position(vertex));
        }

        let solver = LowerBoundTransform::new(SuccessiveShortestPaths);
        for (side, min) in [(Side::Right, 6), (Side::Down, 3)] {
            let spacing = SpacingNetwork::build(&mesh, &rect, side, min).unwrap();
            let first = solver.solve(spacing.network(), &Deadline::none()).unwrap();
            let second = solver.solve(spacing.network(), &Deadline::none()).unwrap();
            assert_eq!(first, second);
        }
    }

    #[test]
    fn lone_vertex_sits_at_origin() {
        let pos = [Point2::new(3.0, 4.0)];
        let mut mesh = Planarize::new(&pos, &[]).execute().unwrap();
        let shape = Orthogonalize::new(Deadline::none()).execute(&mesh).unwrap();
        let rect = Rectangularize::new(&shape).execute(&mut mesh).unwrap();
        let layout = Compact::new(&rect, Spacing::default(), Deadline::none())
            .execute(&mesh)
            .unwrap();
        let v = mesh.vertex_by_node(NodeId::original(0)).unwrap();
        assert_eq!(layout.position(v), Some(GridPoint::origin()));
    }
}
