//! Geometry kernel: points, polylines, polygons, circles, and composite shapes.
//!
//! The origin of coordinate system is in top-left corner, one unit per darkness cell.
//! Template shapes are expressed in the same units, centered on the origin.

use {
  euclid::{Point2D, Box2D, Vector2D as V2},
  num_traits::Float
};

pub mod intersection;
pub mod shapes;
pub mod polyline;
pub mod shape;

pub use {
  intersection::*,
  shapes::{Circle, Polygon, COARSE_CIRCLE_EDGES, FINE_CIRCLE_EDGES},
  polyline::{Outline, Polyline},
  shape::Shape,
};

/// Darkness grid coordinate basis
#[derive(Debug, Copy, Clone)]
pub struct CanvasSpace;

pub type Point = Point2D<f64, CanvasSpace>;
pub type Vector = V2<f64, CanvasSpace>;
pub type Bounds = Box2D<f64, CanvasSpace>;

/// Absolute tolerance of every approximate comparison in the crate.
pub const EPSILON: f64 = 1e-6;

pub trait BoundingBox<T, S> {
  fn bounding_box(&self) -> Box2D<T, S>;
}

pub fn approx_eq<T: Float>(a: T, b: T) -> bool {
  (a - b).abs() <= T::from(EPSILON).unwrap_or_else(T::epsilon)
}

pub fn points_approx_eq<T: Float, U>(a: Point2D<T, U>, b: Point2D<T, U>) -> bool {
  approx_eq(a.x, b.x) && approx_eq(a.y, b.y)
}

/// Grow a box by `margin` on every side.
pub fn inflate(bounds: Bounds, margin: f64) -> Bounds {
  Box2D::new(
    bounds.min - V2::splat(margin),
    bounds.max + V2::splat(margin)
  )
}

/// Whether two boxes overlap or share an edge.
pub fn boxes_touch(a: &Bounds, b: &Bounds) -> bool {
  inflate(*a, EPSILON).intersects(b)
}

/// Length of the box diagonal.
pub fn diagonal(bounds: Bounds) -> f64 {
  (bounds.max - bounds.min).length()
}

pub fn mm_to_pixel(millimeters: f64, dpi: f64) -> f64 {
  millimeters * dpi / 25.4
}

pub fn pixel_to_mm(pixels: f64, dpi: f64) -> f64 {
  pixels * 25.4 / dpi
}

/// Rotate `point` by `degrees` around `origin`.
pub fn rotate_point(point: Point, degrees: f64, origin: Point) -> Point {
  let (sin, cos) = degrees.to_radians().sin_cos();
  let d = point - origin;
  Point::new(
    origin.x + d.x * cos - d.y * sin,
    origin.y + d.x * sin + d.y * cos
  )
}

/// Scale `point` by `factor` around `origin`.
pub fn scale_point(point: Point, factor: f64, origin: Point) -> Point {
  origin + (point - origin) * factor
}

pub(crate) fn bounds_of(points: impl IntoIterator<Item = Point>) -> Bounds {
  let mut points = points.into_iter();
  let first = match points.next() {
    Some(p) => p,
    None => return Box2D::zero()
  };
  points.fold(Box2D::new(first, first), |b, p| Box2D::new(b.min.min(p), b.max.max(p)))
}
