use crate::error::GeometryError;
use crate::math::GridPoint;

use super::glyph::BoxChar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cell {
    Lines(BoxChar),
    Text(char),
}

/// Fixed-size character grid addressed in layout coordinates.
///
/// Writing outside the grid is an error rather than a silent clip.
#[derive(Debug, Clone)]
pub struct Canvas {
    min: GridPoint,
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Canvas {
    /// A blank canvas covering `min..=max` on both axes.
    #[must_use]
    pub fn new(min: GridPoint, max: GridPoint) -> Self {
        let span = |lo: i64, hi: i64| usize::try_from(hi - lo + 1).unwrap_or(0);
        let width = span(min.x, max.x);
        let height = span(min.y, max.y);
        Self {
            min,
            width,
            height,
            cells: vec![Cell::Lines(BoxChar::EMPTY); width * height],
        }
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    fn index(&self, x: i64, y: i64) -> Result<usize, GeometryError> {
        let col = usize::try_from(x - self.min.x).ok().filter(|&c| c < self.width);
        let row = usize::try_from(y - self.min.y).ok().filter(|&r| r < self.height);
        match (col, row) {
            (Some(col), Some(row)) => Ok(row * self.width + col),
            _ => Err(GeometryError::OutOfBounds { x, y }),
        }
    }

    /// Adds arms to the cell at `(x, y)`. Text cells keep their character.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::OutOfBounds`] outside the canvas.
    pub fn merge(&mut self, x: i64, y: i64, arms: BoxChar) -> Result<(), GeometryError> {
        let index = self.index(x, y)?;
        if let Cell::Lines(cell) = &mut self.cells[index] {
            *cell |= arms;
        }
        Ok(())
    }

    /// Writes `text` left to right starting at `(x, y)`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::OutOfBounds`] if any character falls outside.
    pub fn write_text(&mut self, x: i64, y: i64, text: &str) -> Result<(), GeometryError> {
        for (column, ch) in (x..).zip(text.chars()) {
            let index = self.index(column, y)?;
            self.cells[index] = Cell::Text(ch);
        }
        Ok(())
    }

    /// Draws an axis-aligned line between two cells, inclusive.
    ///
    /// # Errors
    ///
    /// Returns an error if an end is outside or the line is diagonal.
    pub fn draw_line(&mut self, from: GridPoint, to: GridPoint) -> Result<(), GeometryError> {
        let (x0, x1) = (from.x.min(to.x), from.x.max(to.x));
        let (y0, y1) = (from.y.min(to.y), from.y.max(to.y));
        self.index(x0, y0)?;
        self.index(x1, y1)?;
        if x0 == x1 {
            self.merge(x0, y0, BoxChar::DOWN)?;
            self.merge(x0, y1, BoxChar::UP)?;
            for y in y0 + 1..y1 {
                self.merge(x0, y, BoxChar::VERTICAL)?;
            }
        } else if y0 == y1 {
            self.merge(x0, y0, BoxChar::RIGHT)?;
            self.merge(x1, y0, BoxChar::LEFT)?;
            for x in x0 + 1..x1 {
                self.merge(x, y0, BoxChar::HORIZONTAL)?;
            }
        } else {
            return Err(GeometryError::NotAxisAligned {
                x0: from.x,
                y0: from.y,
                x1: to.x,
                y1: to.y,
            });
        }
        Ok(())
    }

    /// Outlines the box reaching `half_width` and `half_height` cells from `centre`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::OutOfBounds`] if the box does not fit.
    pub fn draw_box(&mut self, centre: GridPoint, half_width: i64, half_height: i64) -> Result<(), GeometryError> {
        let top_left = GridPoint::new(centre.x - half_width, centre.y - half_height);
        let top_right = GridPoint::new(centre.x + half_width, centre.y - half_height);
        let bottom_left = GridPoint::new(centre.x - half_width, centre.y + half_height);
        let bottom_right = GridPoint::new(centre.x + half_width, centre.y + half_height);
        self.draw_line(top_left, top_right)?;
        self.draw_line(bottom_left, bottom_right)?;
        self.draw_line(top_left, bottom_left)?;
        self.draw_line(top_right, bottom_right)
    }

    /// Every row followed by a newline, trailing blanks kept.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::with_capacity((self.width * 3 + 1) * self.height);
        for row in self.cells.chunks(self.width.max(1)).take(self.height) {
            for cell in row {
                out.push(match *cell {
                    Cell::Lines(arms) => arms.glyph(),
                    Cell::Text(ch) => ch,
                });
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn box_outline() {
        let mut canvas = Canvas::new(GridPoint::new(-1, -1), GridPoint::new(1, 1));
        canvas.draw_box(GridPoint::origin(), 1, 1).unwrap();
        assert_eq!(canvas.render(), "┏━┓\n┃ ┃\n┗━┛\n");
    }

    #[test]
    fn crossing_lines_merge() {
        let mut canvas = Canvas::new(GridPoint::new(0, 0), GridPoint::new(2, 2));
        canvas.draw_line(GridPoint::new(0, 1), GridPoint::new(2, 1)).unwrap();
        canvas.draw_line(GridPoint::new(1, 2), GridPoint::new(1, 0)).unwrap();
        assert_eq!(canvas.render(), " ╻ \n╺╋╸\n ╹ \n");
    }

    #[test]
    fn text_is_not_overdrawn() {
        let mut canvas = Canvas::new(GridPoint::new(0, 0), GridPoint::new(2, 0));
        canvas.write_text(1, 0, "a").unwrap();
        canvas.draw_line(GridPoint::new(0, 0), GridPoint::new(2, 0)).unwrap();
        assert_eq!(canvas.render(), "╺a╸\n");
    }

    #[test]
    fn out_of_bounds_and_diagonal_fail() {
        let mut canvas = Canvas::new(GridPoint::new(0, 0), GridPoint::new(2, 2));
        assert!(matches!(
            canvas.merge(3, 0, BoxChar::UP),
            Err(GeometryError::OutOfBounds { x: 3, y: 0 })
        ));
        assert!(matches!(
            canvas.draw_line(GridPoint::new(0, 0), GridPoint::new(1, 1)),
            Err(GeometryError::NotAxisAligned { .. })
        ));
        assert_eq!((canvas.width(), canvas.height()), (3, 3));
    }
}
