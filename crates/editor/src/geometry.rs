//! Canvas geometry: the zoom viewport, anchor points and edge curves.
//!
//! All graph coordinates are *unscaled* canvas coordinates. The renderer
//! applies `scale(viewport.scale())` around the canvas centre; anything it
//! measures on screen must be divided by the scale before it is compared
//! with node positions, or edges drift off their anchors at zoom != 1.0.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::EditorConfig;
use crate::models::{Position, Size};

/// A point in canvas (or client) space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An on-screen bounding rectangle, as reported by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }
}

// ---------------------------------------------------------------------------
// Viewport
// ---------------------------------------------------------------------------

/// Zoom state of the canvas. The transform origin is the canvas centre.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    scale: f64,
    min: f64,
    max: f64,
    step: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::from_config(&EditorConfig::default())
    }
}

impl Viewport {
    pub fn from_config(config: &EditorConfig) -> Self {
        Self {
            scale: 1.0,
            min: config.min_zoom,
            max: config.max_zoom,
            step: config.zoom_step,
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Set the scale, clamped to the bounds. Returns the applied scale.
    pub fn set_scale(&mut self, scale: f64) -> f64 {
        // Two decimals keep repeated steps from accumulating float error.
        let quantised = (scale * 100.0).round() / 100.0;
        // Bounds may come from an unvalidated config, where `clamp` panics.
        self.scale = quantised.min(self.max).max(self.min);
        self.scale
    }

    pub fn zoom_in(&mut self) -> f64 {
        self.set_scale(self.scale + self.step)
    }

    pub fn zoom_out(&mut self) -> f64 {
        self.set_scale(self.scale - self.step)
    }

    pub fn reset(&mut self) -> f64 {
        self.set_scale(1.0)
    }

    /// Scroll-wheel zoom: scrolling down (positive delta) zooms out.
    pub fn wheel(&mut self, delta_y: f64) -> f64 {
        if delta_y > 0.0 {
            self.zoom_out()
        } else {
            self.zoom_in()
        }
    }

    /// Convert a client-space point to canvas space. `canvas_rect` is the
    /// canvas's on-screen rectangle, i.e. already transformed.
    pub fn client_to_canvas(&self, client: Point, canvas_rect: &Rect) -> Point {
        Point::new(
            (client.x - canvas_rect.left) / self.scale,
            (client.y - canvas_rect.top) / self.scale,
        )
    }

    /// Centre of an on-screen element (e.g. a connection point) in canvas
    /// space.
    pub fn anchor_from_rect(&self, element: &Rect, canvas_rect: &Rect) -> Point {
        Point::new(
            (element.left - canvas_rect.left + element.width / 2.0) / self.scale,
            (element.top - canvas_rect.top + element.height / 2.0) / self.scale,
        )
    }
}

// ---------------------------------------------------------------------------
// Anchors and clamping
// ---------------------------------------------------------------------------

/// Output connection point: bottom centre of the node.
pub fn output_anchor(position: Position, node: Size) -> Point {
    Point::new(position.left + node.width / 2.0, position.top + node.height)
}

/// Input connection point: top centre of the node.
pub fn input_anchor(position: Position, node: Size) -> Point {
    Point::new(position.left + node.width / 2.0, position.top)
}

/// Keep a node's footprint inside the surface. When the surface is smaller
/// than the node the lower bound wins.
pub fn clamp_position(position: Position, surface: Size, node: Size) -> Position {
    let max_left = surface.width - node.width;
    let max_top = surface.height - node.height;
    Position::new(
        position.left.min(max_left).max(0.0),
        position.top.min(max_top).max(0.0),
    )
}

// ---------------------------------------------------------------------------
// BezierPath
// ---------------------------------------------------------------------------

/// A cubic Bezier edge curve, rendered as an SVG path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BezierPath {
    pub start: Point,
    pub control1: Point,
    pub control2: Point,
    pub end: Point,
}

impl BezierPath {
    /// Vertical S-curve between two anchors: each control point sits half
    /// the vertical distance plus `padding` away from its anchor.
    pub fn between(start: Point, end: Point, padding: f64) -> Self {
        let dy = (end.y - start.y).abs() * 0.5 + padding;
        Self {
            start,
            control1: Point::new(start.x, start.y + dy),
            control2: Point::new(end.x, end.y - dy),
            end,
        }
    }

    pub fn point_at(&self, t: f64) -> Point {
        let u = 1.0 - t;
        let (a, b, c, d) = (u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t);
        Point::new(
            a * self.start.x + b * self.control1.x + c * self.control2.x + d * self.end.x,
            a * self.start.y + b * self.control1.y + c * self.control2.y + d * self.end.y,
        )
    }

    /// Polyline approximation of the curve length; the renderer uses it as
    /// the dash length of the draw-in animation.
    pub fn approx_length(&self, segments: usize) -> f64 {
        let segments = segments.max(1);
        let mut length = 0.0;
        let mut prev = self.start;
        for i in 1..=segments {
            let p = self.point_at(i as f64 / segments as f64);
            length += ((p.x - prev.x).powi(2) + (p.y - prev.y).powi(2)).sqrt();
            prev = p;
        }
        length
    }

    /// SVG `d` attribute.
    pub fn to_svg(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for BezierPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "M {} {} C {} {}, {} {}, {} {}",
            self.start.x,
            self.start.y,
            self.control1.x,
            self.control1.y,
            self.control2.x,
            self.control2.y,
            self.end.x,
            self.end.y
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverted_bounds_do_not_panic() {
        let config = EditorConfig { min_zoom: 2.0, max_zoom: 0.5, ..EditorConfig::default() };
        let mut vp = Viewport::from_config(&config);
        assert_eq!(vp.zoom_in(), 2.0);
        assert_eq!(vp.zoom_out(), 2.0);
    }

    #[test]
    fn zoom_is_clamped_to_bounds() {
        let mut vp = Viewport::default();
        for _ in 0..30 {
            vp.zoom_in();
        }
        assert_eq!(vp.scale(), 2.0);
        for _ in 0..30 {
            vp.zoom_out();
        }
        assert_eq!(vp.scale(), 0.5);
        assert_eq!(vp.reset(), 1.0);
    }

    #[test]
    fn zoom_steps_stay_on_the_grid() {
        let mut vp = Viewport::default();
        vp.zoom_in();
        vp.zoom_in();
        vp.zoom_in();
        assert_eq!(vp.scale(), 1.3);
        assert_eq!(vp.wheel(5.0), 1.2);
        assert_eq!(vp.wheel(-5.0), 1.3);
    }

    #[test]
    fn client_points_are_unscaled() {
        let mut vp = Viewport::default();
        vp.set_scale(2.0);
        let canvas = Rect::new(100.0, 50.0, 3200.0, 1800.0);
        let p = vp.client_to_canvas(Point::new(300.0, 250.0), &canvas);
        assert_eq!(p, Point::new(100.0, 100.0));

        let element = Rect::new(290.0, 240.0, 20.0, 20.0);
        assert_eq!(vp.anchor_from_rect(&element, &canvas), Point::new(100.0, 100.0));
    }

    #[test]
    fn curve_matches_reference_shape() {
        let path = BezierPath::between(Point::new(100.0, 80.0), Point::new(400.0, 180.0), 20.0);
        assert_eq!(path.control1, Point::new(100.0, 150.0));
        assert_eq!(path.control2, Point::new(400.0, 110.0));
        assert_eq!(path.to_svg(), "M 100 80 C 100 150, 400 110, 400 180");
    }

    #[test]
    fn curve_endpoints_and_length() {
        let path = BezierPath::between(Point::new(0.0, 0.0), Point::new(0.0, 100.0), 0.0);
        assert_eq!(path.point_at(0.0), path.start);
        assert_eq!(path.point_at(1.0), path.end);
        assert!((path.approx_length(64) - 100.0).abs() < 1e-6);
    }

    #[test]
    fn clamp_keeps_node_inside_surface() {
        let surface = Size::new(1000.0, 500.0);
        let node = Size::new(200.0, 80.0);
        assert_eq!(
            clamp_position(Position::new(-20.0, 900.0), surface, node),
            Position::new(0.0, 420.0)
        );
        let tiny = Size::new(100.0, 50.0);
        assert_eq!(
            clamp_position(Position::new(30.0, 30.0), tiny, node),
            Position::new(0.0, 0.0)
        );
    }
}
