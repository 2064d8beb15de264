//! End-to-end drawing of a graph, one connected component at a time.

use std::{panic, thread};

use tracing::{debug, info};

use crate::config::DrawParams;
use crate::error::Result;
use crate::graph::{Component, Graph};
use crate::operations::compaction::{Compact, Layout};
use crate::operations::embedding::{Embed, Planarize};
use crate::operations::orthogonalize::{OrthogonalRepresentation, Orthogonalize};
use crate::operations::rectangularize::{Rectangularize, Rectangulation};
use crate::render::{isolated_box, Render};
use crate::topology::Mesh;

/// Every intermediate result of drawing one component.
#[derive(Debug, Clone)]
pub struct Drawing {
    /// The fully rectangularized mesh.
    pub mesh: Mesh,
    pub shape: OrthogonalRepresentation,
    pub rect: Rectangulation,
    pub layout: Layout,
    pub text: String,
}

/// Draws every component of `graph` and concatenates them in input order.
///
/// # Errors
///
/// Returns the first component failure.
pub fn draw(graph: &Graph, params: &DrawParams) -> Result<String> {
    let parts = draw_components(graph, params).into_iter().collect::<Result<Vec<_>>>()?;
    Ok(parts.concat())
}

/// Draws every component of `graph`; a failing component does not hide the others.
pub fn draw_components(graph: &Graph, params: &DrawParams) -> Vec<Result<String>> {
    let components = graph.components();
    info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        components = components.len(),
        "drawing graph"
    );
    let text = |component: &Component| draw_component(component, params).map(|drawing| drawing.text);
    if !params.parallel || components.len() < 2 {
        return components.iter().map(text).collect();
    }
    thread::scope(|scope| {
        let handles: Vec<_> = components
            .iter()
            .map(|component| scope.spawn(move || text(component)))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap_or_else(|payload| panic::resume_unwind(payload)))
            .collect()
    })
}

/// Runs the whole pipeline on one connected component.
///
/// # Errors
///
/// Returns an error if the component cannot be embedded or a stage fails.
pub fn draw_component(component: &Component, params: &DrawParams) -> Result<Drawing> {
    let mut mesh = embed(component)?;
    let shape = Orthogonalize::new(params.deadline()).execute(&mesh)?;
    let rect = Rectangularize::new(&shape).execute(&mut mesh)?;

    let label_width = component
        .labels
        .iter()
        .map(|label| label.chars().count())
        .max()
        .unwrap_or_default();
    let layout = Compact::new(&rect, params.spacing(label_width), params.deadline()).execute(&mesh)?;

    let labels = params.labels.then_some(component.labels.as_slice());
    let text = if component.edges.is_empty() {
        let label = labels.and_then(|labels| labels.first()).map(String::as_str);
        isolated_box(label)
    } else {
        Render::new(&mesh, &rect, &layout, labels).execute()?
    };
    debug!(
        nodes = component.labels.len(),
        bends = shape.bend_count(),
        rows = text.lines().count(),
        "drew component"
    );
    Ok(Drawing {
        mesh,
        shape,
        rect,
        layout,
        text,
    })
}

/// Planarizes the component's own drawing, or embeds it combinatorially if it has none.
fn embed(component: &Component) -> Result<Mesh> {
    match &component.positions {
        Some(positions) => Planarize::new(positions, &component.edges).execute(),
        None => Embed::new(component.labels.len(), &component.edges).execute(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;

    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;
    use crate::math::Point2;
    use crate::topology::{FaceStatus, NodeKind};

    fn component(coords: &[(f64, f64)], edges: &[(usize, usize)]) -> Component {
        Component {
            labels: (0..coords.len()).map(|i| i.to_string()).collect(),
            positions: Some(coords.iter().map(|&(x, y)| Point2::new(x, y)).collect()),
            edges: edges.to_vec(),
        }
    }

    fn params() -> DrawParams {
        // RUST_LOG=orthodraw=trace shows every stage.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
        DrawParams {
            solve_timeout: None,
            ..DrawParams::default()
        }
    }

    /// Checks the drawing laws every component must satisfy.
    fn check(drawing: &Drawing, nodes: usize) {
        let Drawing {
            mesh,
            rect,
            layout,
            text,
            ..
        } = drawing;
        mesh.validate().unwrap();
        for (he, data) in mesh.half_edges() {
            assert_eq!(rect.side(he).unwrap(), rect.side(data.twin).unwrap().opposite());
            if !rect.is_exempt(he) {
                assert!(layout.length(he).unwrap() > 0);
            }
        }
        for (_, face) in mesh.faces() {
            if !face.external {
                assert_ne!(face.status, FaceStatus::NeedsRefinement);
            }
            if face.status == FaceStatus::Rectangle {
                let corners: Vec<_> = mesh
                    .walk_cycle(face.incident)
                    .map(|he| layout.positions[mesh.origin(he).unwrap()])
                    .collect();
                let xs: HashSet<i64> = corners.iter().map(|p| p.x).collect();
                let ys: HashSet<i64> = corners.iter().map(|p| p.y).collect();
                assert_eq!((xs.len(), ys.len()), (2, 2), "face is not an axis-aligned rectangle");
            }
        }

        let originals: Vec<_> = mesh
            .vertices()
            .filter(|(_, v)| v.node.kind == NodeKind::Original)
            .map(|(id, _)| layout.positions[id])
            .collect();
        assert_eq!(originals.len(), nodes);
        let distinct: HashSet<_> = originals.iter().map(|p| (p.x, p.y)).collect();
        assert_eq!(distinct.len(), nodes);

        assert!(text.ends_with('\n'));
        let widths: HashSet<usize> = text.lines().map(|line| line.chars().count()).collect();
        assert_eq!(widths.len(), 1);
    }

    #[test]
    fn single_vertex() {
        let drawing = draw_component(&component(&[(0.0, 0.0)], &[]), &params()).unwrap();
        assert_eq!(drawing.text, "┏━━━┓\n┃   ┃\n┗━━━┛\n");

        let labelled = DrawParams {
            labels: true,
            ..params()
        };
        let drawing = draw_component(&component(&[(0.0, 0.0)], &[]), &labelled).unwrap();
        assert_eq!(drawing.text, "┏━━━┓\n┃ 0 ┃\n┗━━━┛\n");
    }

    #[test]
    fn k2() {
        let drawing = draw_component(&component(&[(0.0, 0.0), (0.0, 1.0)], &[(0, 1)]), &params()).unwrap();
        check(&drawing, 2);
        assert_eq!(drawing.text, "┏━┓\n┃ ┃\n┗┳┛\n┏┻┓\n┃ ┃\n┗━┛\n");
        assert_eq!(drawing.shape.bend_count(), 0);
    }

    #[test]
    fn path_p3() {
        let drawing = draw_component(
            &component(&[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)], &[(0, 1), (1, 2)]),
            &params(),
        )
        .unwrap();
        check(&drawing, 3);
        assert_eq!(drawing.shape.bend_count(), 0);
    }

    #[test]
    fn cycle_c4() {
        let drawing = draw_component(
            &component(
                &[(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)],
                &[(0, 1), (1, 2), (2, 3), (3, 0)],
            ),
            &params(),
        )
        .unwrap();
        check(&drawing, 4);
        assert_eq!(drawing.shape.bend_count(), 0);
    }

    #[test]
    fn complete_k4() {
        let drawing = draw_component(
            &component(
                &[(0.0, 0.0), (4.0, 0.0), (2.0, 3.0), (2.0, 1.0)],
                &[(0, 1), (1, 2), (2, 0), (0, 3), (1, 3), (2, 3)],
            ),
            &params(),
        )
        .unwrap();
        check(&drawing, 4);
    }

    #[test]
    fn star_s5() {
        let coords = [(0.0, 0.0), (2.0, 0.0), (1.0, 2.0), (-1.0, 2.0), (-2.0, -0.5), (0.5, -2.0)];
        let edges: Vec<(usize, usize)> = (1..=5).map(|leaf| (0, leaf)).collect();
        let drawing = draw_component(&component(&coords, &edges), &params()).unwrap();
        check(&drawing, 6);
        assert!(!drawing.rect.exempt_edges.is_empty());
    }

    #[test]
    #[allow(clippy::cast_precision_loss)]
    fn petersen_with_crossings() {
        let mut coords = Vec::new();
        for radius in [4.0, 2.0] {
            for k in 0..5 {
                let angle = std::f64::consts::FRAC_PI_2 + std::f64::consts::TAU * k as f64 / 5.0;
                coords.push((radius * angle.cos(), radius * angle.sin()));
            }
        }
        let mut edges = Vec::new();
        for k in 0..5 {
            edges.push((k, (k + 1) % 5));
            edges.push((k, k + 5));
            edges.push((k + 5, (k + 2) % 5 + 5));
        }
        let drawing = draw_component(&component(&coords, &edges), &params()).unwrap();
        check(&drawing, 10);
        let crossings = drawing
            .mesh
            .vertices()
            .filter(|(_, v)| v.node.kind == NodeKind::Crossing)
            .count();
        assert_eq!(crossings, 5);
    }

    fn crossings(drawing: &Drawing) -> usize {
        drawing
            .mesh
            .vertices()
            .filter(|(_, v)| v.node.kind == NodeKind::Crossing)
            .count()
    }

    fn only_component(text: &str) -> Component {
        let mut components = Graph::parse(text).unwrap().components();
        assert_eq!(components.len(), 1);
        components.remove(0)
    }

    #[test]
    fn edge_list_k4_has_no_crossings() {
        let k4 = only_component("a b\na c\na d\nb c\nb d\nc d\n");
        assert!(k4.positions.is_none());
        let drawing = draw_component(&k4, &params()).unwrap();
        check(&drawing, 4);
        assert_eq!(crossings(&drawing), 0);
    }

    #[test]
    fn edge_list_grid_has_no_crossings() {
        let mut text = String::new();
        for r in 0..4 {
            for c in 0..4 {
                if c < 3 {
                    text.push_str(&format!("n{r}{c} n{r}{}\n", c + 1));
                }
                if r < 3 {
                    text.push_str(&format!("n{r}{c} n{}{c}\n", r + 1));
                }
            }
        }
        let drawing = draw_component(&only_component(&text), &params()).unwrap();
        check(&drawing, 16);
        assert_eq!(crossings(&drawing), 0);
    }

    #[test]
    fn edge_list_k5_crosses_once() {
        let k5 = only_component("a b\na c\na d\na e\nb c\nb d\nb e\nc d\nc e\nd e\n");
        let drawing = draw_component(&k5, &params()).unwrap();
        check(&drawing, 5);
        assert_eq!(crossings(&drawing), 1);
    }

    #[test]
    fn random_connected_graphs() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..24 {
            let n = rng.random_range(3..=8);
            let mut edges: Vec<(usize, usize)> = (1..n).map(|v| (rng.random_range(0..v), v)).collect();
            for _ in 0..rng.random_range(0..=n) {
                let a = rng.random_range(0..n);
                let b = rng.random_range(0..n);
                let edge = (a.min(b), a.max(b));
                if a != b && !edges.iter().any(|&(x, y)| (x.min(y), x.max(y)) == edge) {
                    edges.push(edge);
                }
            }
            let component = Component {
                labels: (0..n).map(|i| i.to_string()).collect(),
                positions: None,
                edges,
            };
            let drawing = draw_component(&component, &params())
                .unwrap_or_else(|err| panic!("{:?}: {err}", component.edges));
            check(&drawing, n);
        }
    }

    #[test]
    fn components_without_positions_are_embedded() {
        let graph = Graph::parse("a b\nb c\nc a\nlonely\nd e\n").unwrap();
        let results = draw_components(&graph, &params());
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(Result::is_ok));

        let sequential = DrawParams {
            parallel: false,
            ..params()
        };
        assert_eq!(draw(&graph, &params()).unwrap(), draw(&graph, &sequential).unwrap());
    }
}
