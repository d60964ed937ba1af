//! Geometric primitives.
//!
//! Structure-element bounding boxes and vector-path bounds are expressed in PDF
//! user space (points, y axis pointing up).

use serde::{Deserialize, Serialize};

/// A 2D point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate
    pub x: f32,
    /// Y coordinate
    pub y: f32,
}

impl Point {
    /// Create a new point.
    ///
    /// # Examples
    ///
    /// ```
    /// use tagged_pdf_html::geometry::Point;
    ///
    /// let point = Point::new(10.0, 20.0);
    /// assert_eq!(point.x, 10.0);
    /// assert_eq!(point.y, 20.0);
    /// ```
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A rectangle anchored at its lower-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// X coordinate of the lower-left corner
    pub x: f32,
    /// Y coordinate of the lower-left corner
    pub y: f32,
    /// Width of rectangle
    pub width: f32,
    /// Height of rectangle
    pub height: f32,
}

impl Rect {
    /// Create a new rectangle from position and dimensions.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle from two corner points, normalising their order.
    ///
    /// # Examples
    ///
    /// ```
    /// use tagged_pdf_html::geometry::Rect;
    ///
    /// let rect = Rect::from_points(110.0, 70.0, 10.0, 20.0);
    /// assert_eq!(rect.x, 10.0);
    /// assert_eq!(rect.y, 20.0);
    /// assert_eq!(rect.width, 100.0);
    /// assert_eq!(rect.height, 50.0);
    /// ```
    pub fn from_points(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        let (min_x, max_x) = if x0 <= x1 { (x0, x1) } else { (x1, x0) };
        let (min_y, max_y) = if y0 <= y1 { (y0, y1) } else { (y1, y0) };
        Self {
            x: min_x,
            y: min_y,
            width: max_x - min_x,
            height: max_y - min_y,
        }
    }

    /// Create a rectangle from a PDF `[llx lly urx ury]` array.
    pub fn from_pdf_array(values: &[f32]) -> Option<Self> {
        match values {
            [x0, y0, x1, y1] if values.iter().all(|v| v.is_finite()) => {
                Some(Self::from_points(*x0, *y0, *x1, *y1))
            },
            _ => None,
        }
    }

    /// Get the left edge x-coordinate.
    pub fn left(&self) -> f32 {
        self.x
    }

    /// Get the right edge x-coordinate.
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Get the bottom edge y-coordinate.
    pub fn bottom(&self) -> f32 {
        self.y
    }

    /// Get the top edge y-coordinate.
    pub fn top(&self) -> f32 {
        self.y + self.height
    }

    /// Compute the union of two rectangles.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect::from_points(
            self.left().min(other.left()),
            self.bottom().min(other.bottom()),
            self.right().max(other.right()),
            self.top().max(other.top()),
        )
    }

    /// True when the rectangle encloses no area.
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Running min/max over a set of points.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bounds {
    extent: Option<(f32, f32, f32, f32)>,
}

impl Bounds {
    /// Create empty bounds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Grow the bounds to include a point. Non-finite points are ignored.
    pub fn include(&mut self, p: Point) {
        if !p.x.is_finite() || !p.y.is_finite() {
            return;
        }
        self.extent = Some(match self.extent {
            None => (p.x, p.y, p.x, p.y),
            Some((x0, y0, x1, y1)) => (x0.min(p.x), y0.min(p.y), x1.max(p.x), y1.max(p.y)),
        });
    }

    /// The accumulated rectangle, if any point was included.
    pub fn rect(&self) -> Option<Rect> {
        self.extent
            .map(|(x0, y0, x1, y1)| Rect::from_points(x0, y0, x1, y1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_edges() {
        let rect = Rect::new(10.0, 20.0, 100.0, 50.0);
        assert_eq!(rect.left(), 10.0);
        assert_eq!(rect.right(), 110.0);
        assert_eq!(rect.bottom(), 20.0);
        assert_eq!(rect.top(), 70.0);
    }

    #[test]
    fn test_rect_from_pdf_array() {
        let rect = Rect::from_pdf_array(&[0.0, 0.0, 72.0, 36.0]).unwrap();
        assert_eq!(rect.width, 72.0);
        assert_eq!(rect.height, 36.0);
        assert!(Rect::from_pdf_array(&[0.0, 1.0]).is_none());
        assert!(Rect::from_pdf_array(&[0.0, 0.0, f32::NAN, 1.0]).is_none());
    }

    #[test]
    fn test_rect_union() {
        let r1 = Rect::new(0.0, 0.0, 50.0, 50.0);
        let r2 = Rect::new(25.0, 25.0, 50.0, 50.0);
        let union = r1.union(&r2);
        assert_eq!(union, Rect::new(0.0, 0.0, 75.0, 75.0));
    }

    #[test]
    fn test_bounds_accumulate() {
        let mut bounds = Bounds::new();
        assert!(bounds.rect().is_none());
        bounds.include(Point::new(5.0, 5.0));
        bounds.include(Point::new(-5.0, 15.0));
        bounds.include(Point::new(f32::INFINITY, 0.0));
        assert_eq!(bounds.rect(), Some(Rect::new(-5.0, 5.0, 10.0, 10.0)));
    }
}
