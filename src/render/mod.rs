//! Rasterizes a compacted layout into box-drawing text.

mod canvas;
mod glyph;

pub use canvas::Canvas;
pub use glyph::BoxChar;

use tracing::{debug, trace};

use crate::error::{GeometryError, MeshError, Result};
use crate::math::{GridPoint, GridVector};
use crate::operations::compaction::Layout;
use crate::operations::rectangularize::Rectangulation;
use crate::topology::{Mesh, VertexId};

/// Draws original vertices as boxes and segments as heavy lines.
pub struct Render<'a> {
    mesh: &'a Mesh,
    rect: &'a Rectangulation,
    layout: &'a Layout,
    labels: Option<&'a [String]>,
}

impl<'a> Render<'a> {
    /// `labels`, when given, is indexed by the sequence number of each
    /// original vertex and written into its box.
    #[must_use]
    pub fn new(mesh: &'a Mesh, rect: &'a Rectangulation, layout: &'a Layout, labels: Option<&'a [String]>) -> Self {
        Self {
            mesh,
            rect,
            layout,
            labels,
        }
    }

    /// Executes the rendering. Every row ends with a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if a vertex has no position, a segment is not
    /// axis-aligned, or anything falls outside the canvas.
    pub fn execute(&self) -> Result<String> {
        let (hw, hh) = (self.layout.half_width, self.layout.half_height);
        let mut canvas = self.canvas()?;
        debug!(width = canvas.width(), height = canvas.height(), "rendering");

        for &(a, b) in &self.rect.segments {
            self.draw_segment(&mut canvas, a, b)?;
        }
        for (id, vertex) in self.mesh.vertices() {
            if !vertex.node.kind.is_original() {
                continue;
            }
            let centre = self.position(id)?;
            canvas.draw_box(centre, hw, hh)?;
            if let Some(label) = self.label(vertex.node.sequence) {
                let len = i64::try_from(label.chars().count()).unwrap_or_default();
                canvas.write_text(centre.x - len / 2, centre.y, label)?;
            }
        }
        Ok(canvas.render())
    }

    fn label(&self, sequence: usize) -> Option<&'a str> {
        self.labels
            .and_then(|labels| labels.get(sequence))
            .map(String::as_str)
    }

    fn position(&self, vertex: VertexId) -> Result<GridPoint> {
        Ok(self
            .layout
            .position(vertex)
            .ok_or(MeshError::EntityNotFound("vertex position"))?)
    }

    fn is_original(&self, vertex: VertexId) -> Result<bool> {
        Ok(self.mesh.node(vertex)?.kind.is_original())
    }

    /// Canvas spanning every drawn vertex plus a box extent on each side.
    fn canvas(&self) -> Result<Canvas> {
        let mut min = GridPoint::new(i64::MAX, i64::MAX);
        let mut max = GridPoint::new(i64::MIN, i64::MIN);
        for (id, vertex) in self.mesh.vertices() {
            if vertex.node.kind.is_synthetic() {
                continue;
            }
            let p = self.position(id)?;
            min = GridPoint::new(min.x.min(p.x), min.y.min(p.y));
            max = GridPoint::new(max.x.max(p.x), max.y.max(p.y));
        }
        if min.x > max.x {
            return Ok(Canvas::new(GridPoint::origin(), GridPoint::new(-1, -1)));
        }
        let extent = GridVector::new(self.layout.half_width, self.layout.half_height);
        Ok(Canvas::new(min - extent, max + extent))
    }

    /// Draws the segment `a -- b`, from box border to box border.
    ///
    /// A vertex shifted by port spreading is pulled back in line with the
    /// bend next to it.
    fn draw_segment(&self, canvas: &mut Canvas, a: VertexId, b: VertexId) -> Result<()> {
        let (a_original, b_original) = (self.is_original(a)?, self.is_original(b)?);
        let mut p0 = self.position(a)?;
        let mut p1 = self.position(b)?;

        let aligned = |p: GridPoint, q: GridPoint| p.x == q.x || p.y == q.y;
        if b_original && !aligned(p0, p1) {
            if let Some(&offset) = self.layout.offsets.get(a) {
                p1 += offset;
            }
        }
        if a_original && !aligned(p0, p1) {
            if let Some(&offset) = self.layout.offsets.get(b) {
                p0 += offset;
            }
        }
        if p0 == p1 {
            trace!(?p0, "skipping zero-length segment");
            return Ok(());
        }

        let (hw, hh) = (self.layout.half_width, self.layout.half_height);
        if p0.x == p1.x {
            let dir = (p1.y - p0.y).signum();
            if a_original {
                p0.y += dir * hh;
            }
            if b_original {
                p1.y -= dir * hh;
            }
        } else if p0.y == p1.y {
            let dir = (p1.x - p0.x).signum();
            if a_original {
                p0.x += dir * hw;
            }
            if b_original {
                p1.x -= dir * hw;
            }
        } else {
            return Err(GeometryError::NotAxisAligned {
                x0: p0.x,
                y0: p0.y,
                x1: p1.x,
                y1: p1.y,
            }
            .into());
        }
        canvas.draw_line(p0, p1)?;
        Ok(())
    }
}

/// The drawing of a component with a single vertex and no edges.
#[must_use]
pub fn isolated_box(label: Option<&str>) -> String {
    match label {
        Some(label) => {
            let bar = "━".repeat(label.chars().count());
            format!("┏━{bar}━┓\n┃ {label} ┃\n┗━{bar}━┛\n")
        }
        None => "┏━━━┓\n┃   ┃\n┗━━━┛\n".to_string(),
    }
}
