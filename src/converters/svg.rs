//! Vector graphics to SVG.
//!
//! Replays a run of path and graphics-state operators and writes each painted
//! path as an SVG `<path>`. Points are transformed by the current matrix and
//! then flipped vertically, so the SVG user space is PDF space upside down.

use super::format_number;
use super::html::escape_html;
use crate::config::ConversionOptions;
use crate::content::{GraphicsState, GraphicsStateStack, Operator};
use crate::error::{Error, Result};
use crate::geometry::{Bounds, Point, Rect};

/// Fill rule used by a painting operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FillRule {
    NonZero,
    EvenOdd,
}

/// What a painting operator does with the current path.
#[derive(Debug, Clone, Copy)]
struct Paint {
    close: bool,
    fill: Option<FillRule>,
    stroke: bool,
}

impl Paint {
    fn for_operator(op: &Operator) -> Option<Self> {
        let (close, fill, stroke) = match op {
            Operator::Stroke => (false, None, true),
            Operator::CloseStroke => (true, None, true),
            Operator::Fill => (false, Some(FillRule::NonZero), false),
            Operator::FillEvenOdd => (false, Some(FillRule::EvenOdd), false),
            Operator::FillStroke => (false, Some(FillRule::NonZero), true),
            Operator::FillStrokeEvenOdd => (false, Some(FillRule::EvenOdd), true),
            Operator::CloseFillStroke => (true, Some(FillRule::NonZero), true),
            Operator::CloseFillStrokeEvenOdd => (true, Some(FillRule::EvenOdd), true),
            _ => return None,
        };
        Some(Self { close, fill, stroke })
    }
}

/// Incremental SVG builder.
#[derive(Debug, Default)]
struct SvgBuilder {
    gs: GraphicsStateStack,
    path: String,
    /// Current point in user space, for `v` and `y` curves
    current: Option<(f32, f32)>,
    bounds: Bounds,
    elements: Vec<String>,
}

impl SvgBuilder {
    fn point(&mut self, x: f32, y: f32) -> String {
        let p = self.gs.current().ctm.transform_point(x, y);
        let flipped = Point::new(p.x, -p.y);
        self.bounds.include(flipped);
        format!("{} {}", format_number(flipped.x as f64), format_number(flipped.y as f64))
    }

    fn segment(&mut self, command: char, points: &[(f32, f32)]) {
        if !self.path.is_empty() {
            self.path.push(' ');
        }
        self.path.push(command);
        let coords: Vec<String> = points.iter().map(|&(x, y)| self.point(x, y)).collect();
        self.path.push_str(&coords.join(" "));
        if let Some(&last) = points.last() {
            self.current = Some(last);
        }
    }

    fn close(&mut self) {
        if !self.path.is_empty() {
            self.path.push_str(" Z");
        }
    }

    fn construct(&mut self, op: &Operator) {
        match *op {
            Operator::MoveTo { x, y } => self.segment('M', &[(x, y)]),
            Operator::LineTo { x, y } => self.segment('L', &[(x, y)]),
            Operator::CurveTo {
                x1,
                y1,
                x2,
                y2,
                x3,
                y3,
            } => self.segment('C', &[(x1, y1), (x2, y2), (x3, y3)]),
            Operator::CurveToV { x2, y2, x3, y3 } => {
                let first = self.current.unwrap_or((x2, y2));
                self.segment('C', &[first, (x2, y2), (x3, y3)]);
            },
            Operator::CurveToY { x1, y1, x3, y3 } => {
                self.segment('C', &[(x1, y1), (x3, y3), (x3, y3)]);
            },
            Operator::Rectangle {
                x,
                y,
                width,
                height,
            } => {
                self.segment('M', &[(x, y)]);
                self.segment('L', &[(x + width, y)]);
                self.segment('L', &[(x + width, y + height)]);
                self.segment('L', &[(x, y + height)]);
                self.close();
                self.current = Some((x, y));
            },
            Operator::ClosePath => self.close(),
            _ => {},
        }
    }

    fn paint(&mut self, paint: Paint) {
        if paint.close {
            self.close();
        }
        let d = std::mem::take(&mut self.path);
        self.current = None;
        if d.is_empty() {
            log::trace!("Painting operator with no current path");
            return;
        }

        let state: &GraphicsState = self.gs.current();
        let mut element = format!("<path d=\"{}\"", d);
        match paint.fill {
            Some(rule) => {
                element.push_str(&format!(" fill=\"{}\"", state.fill));
                if rule == FillRule::EvenOdd {
                    element.push_str(" fill-rule=\"evenodd\"");
                }
            },
            None => element.push_str(" fill=\"none\""),
        }
        if paint.stroke {
            let width = state.line_width * state.ctm.scale_factor();
            element.push_str(&format!(" stroke=\"{}\"", state.stroke));
            if width > 0.0 {
                element.push_str(&format!(" stroke-width=\"{}\"", format_number(width as f64)));
            } else {
                // Zero width is the thinnest line the device can draw.
                element.push_str(" stroke-width=\"1\" vector-effect=\"non-scaling-stroke\"");
            }
        }
        element.push_str("/>");
        self.elements.push(element);
    }

    fn finish(self, bbox: Option<Rect>, title: Option<&str>, options: &ConversionOptions) -> Result<String> {
        if self.elements.is_empty() {
            return Err(Error::Graphics("no painted paths".to_string()));
        }

        let (view, width, height) = match bbox {
            Some(b) => {
                let view = Rect::new(b.left(), -b.top(), b.width, b.height);
                (view, options.to_px(b.width), options.to_px(b.height))
            },
            None => {
                let view = self
                    .bounds
                    .rect()
                    .ok_or_else(|| Error::Graphics("no bounds".to_string()))?;
                let w = view.width * options.px_per_point;
                let h = view.height * options.px_per_point;
                let longest = w.max(h);
                let scale = if longest > options.max_svg_edge && longest > 0.0 {
                    options.max_svg_edge / longest
                } else {
                    1.0
                };
                (view, (w * scale).round() as u32, (h * scale).round() as u32)
            },
        };

        let mut svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="{} {} {} {}" width="{}" height="{}">"#,
            format_number(view.x as f64),
            format_number(view.y as f64),
            format_number(view.width as f64),
            format_number(view.height as f64),
            width,
            height
        );
        if let Some(title) = title {
            svg.insert_str(svg.len() - 1, " role=\"img\"");
            svg.push_str(&format!("<title>{}</title>", escape_html(title)));
        }
        for element in &self.elements {
            svg.push_str(element);
        }
        svg.push_str("</svg>");
        Ok(svg)
    }
}

/// Emit an SVG element for a run of drawing operators.
///
/// With a bounding box the SVG covers exactly that box; without one it covers
/// the bounds of every emitted point, scaled down so that neither edge exceeds
/// `options.max_svg_edge`. A `title` becomes the accessible name of the
/// graphic. Fails when nothing is painted.
pub fn emit_svg(
    ops: &[Operator],
    bbox: Option<Rect>,
    title: Option<&str>,
    options: &ConversionOptions,
) -> Result<String> {
    let mut builder = SvgBuilder::default();

    for op in ops {
        if op.is_path_construction() {
            builder.construct(op);
        } else if let Some(paint) = Paint::for_operator(op) {
            builder.paint(paint);
        } else if matches!(op, Operator::EndPath) {
            builder.path.clear();
            builder.current = None;
        } else if !builder.gs.apply(op) {
            log::trace!("Ignoring operator in vector run: {:?}", op);
        }
    }

    builder.finish(bbox, title, options)
}
