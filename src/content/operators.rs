//! PDF content stream operators.
//!
//! The object-model provider hands page content over as a sequence of these
//! operators. Text showing operators (`Tj`, `TJ`, `'`, `"`) arrive already
//! decoded through the font's encoding as [`Operator::ShowText`], since glyph
//! decoding belongs to the provider.

use crate::object::{Dictionary, Object};
use serde::{Deserialize, Serialize};

/// A content stream operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operator {
    // Text object operators
    /// Begin text object (BT)
    BeginText,
    /// End text object (ET)
    EndText,

    /// Show text (Tj, TJ, ', ") with the string already decoded to Unicode
    ShowText {
        /// Decoded text
        text: String,
    },

    // Graphics state operators
    /// Save graphics state (q)
    SaveState,
    /// Restore graphics state (Q)
    RestoreState,
    /// Modify current transformation matrix (cm)
    Cm {
        /// Matrix element a
        a: f32,
        /// Matrix element b
        b: f32,
        /// Matrix element c
        c: f32,
        /// Matrix element d
        d: f32,
        /// Matrix element e (x translation)
        e: f32,
        /// Matrix element f (y translation)
        f: f32,
    },
    /// Set line width (w)
    SetLineWidth {
        /// Line width
        width: f32,
    },

    // Color operators
    /// Set RGB fill color (rg)
    SetFillRgb {
        /// Red component (0.0-1.0)
        r: f32,
        /// Green component (0.0-1.0)
        g: f32,
        /// Blue component (0.0-1.0)
        b: f32,
    },
    /// Set RGB stroke color (RG)
    SetStrokeRgb {
        /// Red component (0.0-1.0)
        r: f32,
        /// Green component (0.0-1.0)
        g: f32,
        /// Blue component (0.0-1.0)
        b: f32,
    },
    /// Set gray fill color (g)
    SetFillGray {
        /// Gray level (0.0-1.0)
        gray: f32,
    },
    /// Set gray stroke color (G)
    SetStrokeGray {
        /// Gray level (0.0-1.0)
        gray: f32,
    },
    /// Set CMYK fill color (k)
    SetFillCmyk {
        /// Cyan component (0.0-1.0)
        c: f32,
        /// Magenta component (0.0-1.0)
        m: f32,
        /// Yellow component (0.0-1.0)
        y: f32,
        /// Black component (0.0-1.0)
        k: f32,
    },
    /// Set CMYK stroke color (K)
    SetStrokeCmyk {
        /// Cyan component (0.0-1.0)
        c: f32,
        /// Magenta component (0.0-1.0)
        m: f32,
        /// Yellow component (0.0-1.0)
        y: f32,
        /// Black component (0.0-1.0)
        k: f32,
    },
    /// Set fill color in the current color space (sc, scn).
    /// 1, 3 and 4 components are read as Gray, RGB and CMYK.
    SetFillColor {
        /// Color components
        components: Vec<f32>,
    },
    /// Set stroke color in the current color space (SC, SCN)
    SetStrokeColor {
        /// Color components
        components: Vec<f32>,
    },

    // XObject operators
    /// Paint XObject (Do)
    Do {
        /// XObject name
        name: String,
    },
    /// Inline image (BI...ID...EI sequence), abbreviated keys as written
    InlineImage {
        /// Inline image dictionary
        dict: Dictionary,
        /// Image data bytes
        data: Vec<u8>,
    },

    // Path construction
    /// Move to (m)
    MoveTo {
        /// X coordinate
        x: f32,
        /// Y coordinate
        y: f32,
    },
    /// Line to (l)
    LineTo {
        /// X coordinate
        x: f32,
        /// Y coordinate
        y: f32,
    },
    /// Cubic Bézier curve (c)
    CurveTo {
        /// X coordinate of first control point
        x1: f32,
        /// Y coordinate of first control point
        y1: f32,
        /// X coordinate of second control point
        x2: f32,
        /// Y coordinate of second control point
        y2: f32,
        /// X coordinate of end point
        x3: f32,
        /// Y coordinate of end point
        y3: f32,
    },
    /// Bézier curve with first control point = current point (v)
    CurveToV {
        /// X coordinate of second control point
        x2: f32,
        /// Y coordinate of second control point
        y2: f32,
        /// X coordinate of end point
        x3: f32,
        /// Y coordinate of end point
        y3: f32,
    },
    /// Bézier curve with second control point = end point (y)
    CurveToY {
        /// X coordinate of first control point
        x1: f32,
        /// Y coordinate of first control point
        y1: f32,
        /// X coordinate of end point
        x3: f32,
        /// Y coordinate of end point
        y3: f32,
    },
    /// Close current subpath (h)
    ClosePath,
    /// Rectangle (re)
    Rectangle {
        /// X coordinate
        x: f32,
        /// Y coordinate
        y: f32,
        /// Width
        width: f32,
        /// Height
        height: f32,
    },

    // Path painting
    /// Stroke path (S)
    Stroke,
    /// Close and stroke path (s)
    CloseStroke,
    /// Fill path, non-zero winding (f, F)
    Fill,
    /// Fill path, even-odd (f*)
    FillEvenOdd,
    /// Fill and stroke, non-zero winding (B)
    FillStroke,
    /// Fill and stroke, even-odd (B*)
    FillStrokeEvenOdd,
    /// Close, fill and stroke (b)
    CloseFillStroke,
    /// Close, fill and stroke, even-odd (b*)
    CloseFillStrokeEvenOdd,
    /// End path without filling or stroking (n)
    EndPath,
    /// Modify clipping path using non-zero winding rule (W)
    ClipNonZero,
    /// Modify clipping path using even-odd rule (W*)
    ClipEvenOdd,

    // Marked content operators
    // PDF Spec: ISO 32000-1:2008, Section 14.6 - Marked Content
    /// Begin marked content (BMC)
    BeginMarkedContent {
        /// Tag name identifying the marked content
        tag: String,
    },
    /// Begin marked content with property list (BDC)
    BeginMarkedContentDict {
        /// Tag name identifying the marked content
        tag: String,
        /// Property list, already resolved to a dictionary by the provider
        properties: Object,
    },
    /// End marked content (EMC)
    EndMarkedContent,

    /// Any other operator
    Other {
        /// Operator name
        name: String,
        /// Operands
        #[serde(default)]
        operands: Vec<Object>,
    },
}

impl Operator {
    /// Path construction operators (m, l, c, v, y, h, re).
    pub fn is_path_construction(&self) -> bool {
        matches!(
            self,
            Operator::MoveTo { .. }
                | Operator::LineTo { .. }
                | Operator::CurveTo { .. }
                | Operator::CurveToV { .. }
                | Operator::CurveToY { .. }
                | Operator::ClosePath
                | Operator::Rectangle { .. }
        )
    }

    /// Path painting operators that make marks on the page.
    pub fn is_path_painting(&self) -> bool {
        matches!(
            self,
            Operator::Stroke
                | Operator::CloseStroke
                | Operator::Fill
                | Operator::FillEvenOdd
                | Operator::FillStroke
                | Operator::FillStrokeEvenOdd
                | Operator::CloseFillStroke
                | Operator::CloseFillStrokeEvenOdd
        )
    }

    /// Operators that belong to a path's lifetime, including ones that end
    /// or clip it without painting.
    pub fn is_path_operator(&self) -> bool {
        self.is_path_construction()
            || self.is_path_painting()
            || matches!(self, Operator::EndPath | Operator::ClipNonZero | Operator::ClipEvenOdd)
    }

    /// Operators that change state the vector emitter tracks.
    pub fn is_graphics_state(&self) -> bool {
        matches!(
            self,
            Operator::SaveState
                | Operator::RestoreState
                | Operator::Cm { .. }
                | Operator::SetLineWidth { .. }
                | Operator::SetFillRgb { .. }
                | Operator::SetStrokeRgb { .. }
                | Operator::SetFillGray { .. }
                | Operator::SetStrokeGray { .. }
                | Operator::SetFillCmyk { .. }
                | Operator::SetStrokeCmyk { .. }
                | Operator::SetFillColor { .. }
                | Operator::SetStrokeColor { .. }
        )
    }
}
