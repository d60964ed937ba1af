//! Graphics state tracking for content stream replay.
//!
//! Tracks the transformation matrix, fill/stroke colors and line width as
//! operators are replayed, either while correlating page content with marked
//! content or while emitting vector markup.

use super::operators::Operator;
use crate::converters::color::Rgb;
use crate::geometry::Point;

/// A 2D transformation matrix.
///
/// PDF uses matrices of the form:
/// ```text
/// [ a  b  0 ]
/// [ c  d  0 ]
/// [ e  f  1 ]
/// ```
///
/// Where (a,b,c,d) define scaling/rotation/skewing and (e,f) define translation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    /// Horizontal scaling component
    pub a: f32,
    /// Rotation/skew component
    pub b: f32,
    /// Rotation/skew component
    pub c: f32,
    /// Vertical scaling component
    pub d: f32,
    /// Horizontal translation
    pub e: f32,
    /// Vertical translation
    pub f: f32,
}

impl Matrix {
    /// Create an identity matrix.
    ///
    /// # Examples
    ///
    /// ```
    /// use tagged_pdf_html::content::Matrix;
    ///
    /// let m = Matrix::identity();
    /// assert_eq!(m.a, 1.0);
    /// assert_eq!(m.d, 1.0);
    /// assert_eq!(m.e, 0.0);
    /// ```
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    /// Create a matrix from its six components.
    pub fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// Create a translation matrix.
    pub fn translation(tx: f32, ty: f32) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    /// Create a scaling matrix.
    pub fn scaling(sx: f32, sy: f32) -> Self {
        Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// Multiply this matrix with another matrix.
    ///
    /// The result applies `self` first, then `other`. A `cm` operand `M`
    /// updates the CTM as `M.multiply(&ctm)`.
    ///
    /// # Examples
    ///
    /// ```
    /// use tagged_pdf_html::content::Matrix;
    ///
    /// let m = Matrix::translation(10.0, 20.0).multiply(&Matrix::scaling(2.0, 2.0));
    /// let p = m.transform_point(5.0, 5.0);
    /// assert_eq!((p.x, p.y), (30.0, 50.0));
    /// ```
    pub fn multiply(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    /// Transform a point using this matrix.
    pub fn transform_point(&self, x: f32, y: f32) -> Point {
        Point {
            x: self.a * x + self.c * y + self.e,
            y: self.b * x + self.d * y + self.f,
        }
    }

    /// Get the determinant of this matrix.
    pub fn determinant(&self) -> f32 {
        self.a * self.d - self.b * self.c
    }

    /// Uniform scale factor applied to lengths (square root of |det|).
    pub fn scale_factor(&self) -> f32 {
        self.determinant().abs().sqrt()
    }

    /// The `cm` operator that reproduces this matrix from identity.
    pub fn to_operator(&self) -> Operator {
        Operator::Cm {
            a: self.a,
            b: self.b,
            c: self.c,
            d: self.d,
            e: self.e,
            f: self.f,
        }
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self::identity()
    }
}

/// Graphics state parameters relevant to path output.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphicsState {
    /// Current transformation matrix
    pub ctm: Matrix,
    /// Fill color
    pub fill: Rgb,
    /// Stroke color
    pub stroke: Rgb,
    /// Line width in user space
    pub line_width: f32,
}

impl GraphicsState {
    /// Create the initial graphics state: identity CTM, black, 1pt lines.
    pub fn new() -> Self {
        Self {
            ctm: Matrix::identity(),
            fill: Rgb::BLACK,
            stroke: Rgb::BLACK,
            line_width: 1.0,
        }
    }

    /// Operators that re-establish this state on top of the initial state.
    ///
    /// Used when operators are lifted out of their page so they can be
    /// replayed in isolation.
    pub fn prelude(&self) -> Vec<Operator> {
        let mut ops = Vec::new();
        if self.ctm != Matrix::identity() {
            ops.push(self.ctm.to_operator());
        }
        if self.fill != Rgb::BLACK {
            ops.push(rgb_operator(self.fill, true));
        }
        if self.stroke != Rgb::BLACK {
            ops.push(rgb_operator(self.stroke, false));
        }
        if self.line_width != 1.0 {
            ops.push(Operator::SetLineWidth {
                width: self.line_width,
            });
        }
        ops
    }
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self::new()
    }
}

fn rgb_operator(color: Rgb, fill: bool) -> Operator {
    let (r, g, b) = (
        color.r as f32 / 255.0,
        color.g as f32 / 255.0,
        color.b as f32 / 255.0,
    );
    if fill {
        Operator::SetFillRgb { r, g, b }
    } else {
        Operator::SetStrokeRgb { r, g, b }
    }
}

/// Graphics state stack for save/restore operations.
///
/// PDF's q (save) and Q (restore) operators push and pop graphics states.
#[derive(Debug, Clone, Default)]
pub struct GraphicsStateStack {
    current: GraphicsState,
    saved: Vec<GraphicsState>,
}

impl GraphicsStateStack {
    /// Create a new graphics state stack with an initial state.
    ///
    /// ```
    /// use tagged_pdf_html::content::GraphicsStateStack;
    ///
    /// let stack = GraphicsStateStack::new();
    /// assert_eq!(stack.depth(), 1);
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a reference to the current graphics state.
    pub fn current(&self) -> &GraphicsState {
        &self.current
    }

    /// Save the current graphics state (q operator).
    pub fn save(&mut self) {
        self.saved.push(self.current.clone());
    }

    /// Restore the previous graphics state (Q operator).
    ///
    /// An unbalanced Q leaves the current state untouched.
    pub fn restore(&mut self) {
        match self.saved.pop() {
            Some(state) => self.current = state,
            None => log::debug!("Q without matching q ignored"),
        }
    }

    /// Get the current stack depth (always at least 1).
    pub fn depth(&self) -> usize {
        self.saved.len() + 1
    }

    /// Apply a state-changing operator. Returns false for operators that do
    /// not affect the tracked state.
    pub fn apply(&mut self, op: &Operator) -> bool {
        match op {
            Operator::SaveState => {
                self.save();
                return true;
            },
            Operator::RestoreState => {
                self.restore();
                return true;
            },
            _ => {},
        }
        let state = &mut self.current;
        match op {
            Operator::Cm { a, b, c, d, e, f } => {
                state.ctm = Matrix::new(*a, *b, *c, *d, *e, *f).multiply(&state.ctm);
            },
            Operator::SetLineWidth { width } => state.line_width = *width,
            Operator::SetFillRgb { r, g, b } => state.fill = Rgb::from_rgb(*r, *g, *b),
            Operator::SetStrokeRgb { r, g, b } => state.stroke = Rgb::from_rgb(*r, *g, *b),
            Operator::SetFillGray { gray } => state.fill = Rgb::from_gray(*gray),
            Operator::SetStrokeGray { gray } => state.stroke = Rgb::from_gray(*gray),
            Operator::SetFillCmyk { c, m, y, k } => state.fill = Rgb::from_cmyk(*c, *m, *y, *k),
            Operator::SetStrokeCmyk { c, m, y, k } => state.stroke = Rgb::from_cmyk(*c, *m, *y, *k),
            Operator::SetFillColor { components } => match Rgb::from_components(components) {
                Some(color) => state.fill = color,
                None => log::debug!("Unsupported fill color with {} components", components.len()),
            },
            Operator::SetStrokeColor { components } => match Rgb::from_components(components) {
                Some(color) => state.stroke = color,
                None => log::debug!("Unsupported stroke color with {} components", components.len()),
            },
            _ => return false,
        }
        true
    }
}
