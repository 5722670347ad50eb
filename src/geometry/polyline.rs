use {
  super::{
    BoundingBox, Bounds, CanvasSpace, Point, Vector,
    points_approx_eq, rotate_point, scale_point, mm_to_pixel, pixel_to_mm, bounds_of,
    shapes::{Circle, Polygon, FINE_CIRCLE_EDGES},
  },
};

/// What a polyline was sampled from.
///
/// Transforms are applied to both the sampled points and the original, so that
/// re-sampling stays consistent with the transformed pose.
#[derive(Debug, Clone, PartialEq)]
pub enum Outline {
  /// A free-form line, may be spliced with other free-form lines.
  Free,
  Polygon(Polygon),
  Circle(Circle),
}

/// Ordered sequence of at least two points.
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
  points: Vec<Point>,
  outline: Outline,
}

impl Polyline {
  /// Free-form polyline.
  pub fn new(points: Vec<Point>) -> Self {
    Self::with_outline(points, Outline::Free)
  }

  pub fn with_outline(points: Vec<Point>, outline: Outline) -> Self {
    assert!(points.len() >= 2, "polyline needs at least 2 points, got {}", points.len());
    Self { points, outline }
  }

  pub fn points(&self) -> &[Point] {
    &self.points
  }

  pub fn outline(&self) -> &Outline {
    &self.outline
  }

  pub fn start(&self) -> Point {
    self.points[0]
  }

  pub fn end(&self) -> Point {
    self.points[self.points.len() - 1]
  }

  /// Only free-form lines take part in line combination.
  pub fn is_combinable(&self) -> bool {
    match self.outline {
      Outline::Free => true,
      Outline::Polygon(_) | Outline::Circle(_) => false,
    }
  }

  /// Replace the points of a free-form line.
  pub(crate) fn set_points(&mut self, points: Vec<Point>) {
    assert!(points.len() >= 2, "polyline needs at least 2 points, got {}", points.len());
    debug_assert!(self.is_combinable());
    self.points = points;
  }

  /// Two-point free-form polylines, one per segment.
  pub fn segments(&self) -> Vec<Polyline> {
    self.points.windows(2)
      .map(|s| Polyline::new(s.to_vec()))
      .collect()
  }

  /// Segments of the finest available outline: circles are re-sampled densely,
  /// polygons rebuilt from their vertices.
  pub fn fine_segments(&self) -> Vec<Polyline> {
    match &self.outline {
      Outline::Free => self.segments(),
      Outline::Polygon(polygon) => polygon.to_polyline().segments(),
      Outline::Circle(circle) => circle.to_polyline(FINE_CIRCLE_EDGES).segments(),
    }
  }

  /// Equality ignoring traversal direction and, for polygons, the starting vertex.
  /// Tagged lines compare their originals.
  pub fn approx_eq(&self, other: &Self) -> bool {
    match (&self.outline, &other.outline) {
      (Outline::Free, Outline::Free) => segments_approx_eq(&self.points, &other.points),
      (Outline::Polygon(a), Outline::Polygon(b)) => a.approx_eq(b),
      (Outline::Circle(a), Outline::Circle(b)) => a.approx_eq(b),
      _ => false,
    }
  }

  pub fn rotate(&mut self, degrees: f64, origin: Point) {
    self.map_points(|p| rotate_point(p, degrees, origin));
    match &mut self.outline {
      Outline::Free => (),
      Outline::Polygon(polygon) => polygon.rotate(degrees, origin),
      Outline::Circle(circle) => circle.rotate(degrees, origin),
    }
  }

  pub fn translate(&mut self, offset: Vector) {
    self.map_points(|p| p + offset);
    match &mut self.outline {
      Outline::Free => (),
      Outline::Polygon(polygon) => polygon.translate(offset),
      Outline::Circle(circle) => circle.translate(offset),
    }
  }

  pub fn scale(&mut self, factor: f64, origin: Point) {
    self.map_points(|p| scale_point(p, factor, origin));
    match &mut self.outline {
      Outline::Free => (),
      Outline::Polygon(polygon) => polygon.scale(factor, origin),
      Outline::Circle(circle) => circle.scale(factor, origin),
    }
  }

  pub fn mm_to_pixel(&mut self, dpi: f64) {
    self.map_points(|p| Point::new(mm_to_pixel(p.x, dpi), mm_to_pixel(p.y, dpi)));
    match &mut self.outline {
      Outline::Free => (),
      Outline::Polygon(polygon) => polygon.mm_to_pixel(dpi),
      Outline::Circle(circle) => circle.mm_to_pixel(dpi),
    }
  }

  pub fn pixel_to_mm(&mut self, dpi: f64) {
    self.map_points(|p| Point::new(pixel_to_mm(p.x, dpi), pixel_to_mm(p.y, dpi)));
    match &mut self.outline {
      Outline::Free => (),
      Outline::Polygon(polygon) => polygon.pixel_to_mm(dpi),
      Outline::Circle(circle) => circle.pixel_to_mm(dpi),
    }
  }

  fn map_points(&mut self, f: impl Fn(Point) -> Point) {
    self.points.iter_mut().for_each(|p| *p = f(*p));
  }
}

impl BoundingBox<f64, CanvasSpace> for Polyline {
  fn bounding_box(&self) -> Bounds {
    bounds_of(self.points.iter().copied())
  }
}

/// Compare two point chains as unordered sets of undirected segments.
pub(crate) fn segments_approx_eq(a: &[Point], b: &[Point]) -> bool {
  if a.len() != b.len() {
    return false;
  }
  let mut unmatched: Vec<_> = b.windows(2).collect();
  a.windows(2).all(|s| {
    let found = unmatched.iter().position(|o|
      points_approx_eq(s[0], o[0]) && points_approx_eq(s[1], o[1]) ||
        points_approx_eq(s[0], o[1]) && points_approx_eq(s[1], o[0])
    );
    match found {
      Some(i) => { unmatched.swap_remove(i); true }
      None => false
    }
  })
}
