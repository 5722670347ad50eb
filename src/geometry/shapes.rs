use {
  super::{
    BoundingBox, Bounds, CanvasSpace, Point, Vector,
    approx_eq, points_approx_eq, rotate_point, scale_point, mm_to_pixel, pixel_to_mm, bounds_of,
    polyline::{Outline, Polyline},
  },
  euclid::Box2D
};

/// Edges used when a circle is sampled for placement.
pub const COARSE_CIRCLE_EDGES: usize = 6;
/// Edges used when a circle is re-sampled for clipping.
pub const FINE_CIRCLE_EDGES: usize = 120;

#[derive(Debug, Clone, PartialEq)]
pub struct Circle {
  pub center: Point,
  pub radius: f64,
}

impl Circle {
  pub fn new(center: Point, radius: f64) -> Self {
    Self { center, radius }
  }

  /// Closed outline through `edges` evenly spaced points, starting at the top.
  pub fn to_polyline(&self, edges: usize) -> Polyline {
    let step = 360.0 / edges as f64;
    let top = self.center - Vector::new(0.0, self.radius);
    let points = (0..=edges)
      .map(|i| rotate_point(top, step * i as f64, self.center))
      .collect();
    Polyline::with_outline(points, Outline::Circle(self.clone()))
  }

  pub fn approx_eq(&self, other: &Self) -> bool {
    points_approx_eq(self.center, other.center) && approx_eq(self.radius, other.radius)
  }

  pub fn rotate(&mut self, degrees: f64, origin: Point) {
    self.center = rotate_point(self.center, degrees, origin);
  }

  pub fn translate(&mut self, offset: Vector) {
    self.center += offset;
  }

  pub fn scale(&mut self, factor: f64, origin: Point) {
    self.radius *= factor;
    self.center = scale_point(self.center, factor, origin);
  }

  pub fn mm_to_pixel(&mut self, dpi: f64) {
    self.center = Point::new(mm_to_pixel(self.center.x, dpi), mm_to_pixel(self.center.y, dpi));
    self.radius = mm_to_pixel(self.radius, dpi);
  }

  pub fn pixel_to_mm(&mut self, dpi: f64) {
    self.center = Point::new(pixel_to_mm(self.center.x, dpi), pixel_to_mm(self.center.y, dpi));
    self.radius = pixel_to_mm(self.radius, dpi);
  }
}

impl BoundingBox<f64, CanvasSpace> for Circle {
  fn bounding_box(&self) -> Bounds {
    Box2D::new(
      self.center - Vector::splat(self.radius),
      self.center + Vector::splat(self.radius)
    )
  }
}

/// Closed polygon; the first vertex is not repeated.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
  pub points: Vec<Point>,
}

impl Polygon {
  pub fn new(points: Vec<Point>) -> Self {
    Self { points }
  }

  /// Outline with the first vertex repeated at the end.
  pub fn to_polyline(&self) -> Polyline {
    Polyline::with_outline(self.closed_points(), Outline::Polygon(self.clone()))
  }

  pub(crate) fn closed_points(&self) -> Vec<Point> {
    let mut points = self.points.clone();
    points.extend(self.points.first().copied());
    points
  }

  /// Same edge set, regardless of starting vertex and winding.
  pub fn approx_eq(&self, other: &Self) -> bool {
    super::polyline::segments_approx_eq(&self.closed_points(), &other.closed_points())
  }

  pub fn rotate(&mut self, degrees: f64, origin: Point) {
    self.points.iter_mut().for_each(|p| *p = rotate_point(*p, degrees, origin));
  }

  pub fn translate(&mut self, offset: Vector) {
    self.points.iter_mut().for_each(|p| *p += offset);
  }

  pub fn scale(&mut self, factor: f64, origin: Point) {
    self.points.iter_mut().for_each(|p| *p = scale_point(*p, factor, origin));
  }

  pub fn mm_to_pixel(&mut self, dpi: f64) {
    self.points.iter_mut()
      .for_each(|p| *p = Point::new(mm_to_pixel(p.x, dpi), mm_to_pixel(p.y, dpi)));
  }

  pub fn pixel_to_mm(&mut self, dpi: f64) {
    self.points.iter_mut()
      .for_each(|p| *p = Point::new(pixel_to_mm(p.x, dpi), pixel_to_mm(p.y, dpi)));
  }
}

impl BoundingBox<f64, CanvasSpace> for Polygon {
  fn bounding_box(&self) -> Bounds {
    bounds_of(self.points.iter().copied())
  }
}
