use {
  super::{
    BoundingBox, Bounds, CanvasSpace, Point, Vector,
    points_approx_eq, bounds_of,
    polyline::Polyline,
    shapes::{Circle, Polygon, COARSE_CIRCLE_EDGES},
  },
};

/// A placeable stroke: one or more polylines, plus its pre-rotated variants.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
  lines: Vec<Polyline>,
  centroid: Point,
  variants: Vec<Shape>,
}

impl Shape {
  pub fn new(lines: Vec<Polyline>) -> Self {
    let mut shape = Self { lines, centroid: Point::origin(), variants: vec![] };
    shape.update_centroid();
    shape
  }

  /// Single straight segment.
  pub fn line(p1: Point, p2: Point) -> Self {
    Self::polyline(vec![p1, p2])
  }

  /// Single free-form polyline.
  pub fn polyline(points: Vec<Point>) -> Self {
    Self::new(vec![Polyline::new(points)])
  }

  /// Axis-aligned rectangle outline with its top-left corner at `origin`.
  pub fn rectangle(origin: Point, width: f64, height: f64) -> Self {
    Self::from_polygon(Polygon::new(vec![
      origin,
      origin + Vector::new(width, 0.0),
      origin + Vector::new(width, height),
      origin + Vector::new(0.0, height),
    ]))
  }

  pub fn triangle(a: Point, b: Point, c: Point) -> Self {
    Self::from_polygon(Polygon::new(vec![a, b, c]))
  }

  pub fn from_polygon(polygon: Polygon) -> Self {
    Self::new(vec![polygon.to_polyline()])
  }

  /// Circle sampled coarsely for placement; the original is kept for clipping.
  pub fn from_circle(circle: Circle) -> Self {
    Self::new(vec![circle.to_polyline(COARSE_CIRCLE_EDGES)])
  }

  /// Union of the polylines of several shapes.
  pub fn group(shapes: impl IntoIterator<Item = Shape>) -> Self {
    Self::new(shapes.into_iter().flat_map(|s| s.lines).collect())
  }

  pub fn lines(&self) -> &[Polyline] {
    &self.lines
  }

  pub(crate) fn take_lines(&mut self) -> Vec<Polyline> {
    std::mem::take(&mut self.lines)
  }

  pub(crate) fn set_lines(&mut self, lines: Vec<Polyline>) {
    self.lines = lines;
    self.update_centroid();
  }

  /// Swap the points of one free-form line.
  pub(crate) fn replace_points(&mut self, line: usize, points: Vec<Point>) {
    self.lines[line].set_points(points);
    self.update_centroid();
  }

  pub fn is_empty(&self) -> bool {
    self.lines.is_empty()
  }

  /// Center of the axis-aligned bounding box.
  pub fn centroid(&self) -> Point {
    self.centroid
  }

  pub fn variants(&self) -> &[Shape] {
    &self.variants
  }

  fn update_centroid(&mut self) {
    self.centroid = self.bounding_box().center();
  }

  pub fn rotate(&mut self, degrees: f64, origin: Point) {
    self.lines.iter_mut().for_each(|l| l.rotate(degrees, origin));
    self.update_centroid();
  }

  pub fn translate(&mut self, offset: Vector) {
    self.lines.iter_mut().for_each(|l| l.translate(offset));
    self.update_centroid();
  }

  /// Scale about the centroid.
  pub fn scale(&mut self, factor: f64) {
    let origin = self.centroid;
    self.lines.iter_mut().for_each(|l| l.scale(factor, origin));
    self.update_centroid();
  }

  pub fn mm_to_pixel(&mut self, dpi: f64) {
    self.lines.iter_mut().for_each(|l| l.mm_to_pixel(dpi));
    self.update_centroid();
  }

  pub fn pixel_to_mm(&mut self, dpi: f64) {
    self.lines.iter_mut().for_each(|l| l.pixel_to_mm(dpi));
    self.update_centroid();
  }

  pub fn center_on_origin(&mut self) {
    self.translate(-self.centroid.to_vector());
  }

  pub fn center_on_point(&mut self, point: Point) {
    self.center_on_origin();
    self.translate(point.to_vector());
  }

  /// Geometry-only copy moved by `offset`. Variants are not carried along.
  pub fn translated(&self, offset: Vector) -> Self {
    let mut copy = self.geometry();
    copy.translate(offset);
    copy
  }

  pub fn rotated(&self, degrees: f64, origin: Point) -> Self {
    let mut copy = self.geometry();
    copy.rotate(degrees, origin);
    copy
  }

  fn geometry(&self) -> Self {
    Self { lines: self.lines.clone(), centroid: self.centroid, variants: vec![] }
  }

  /// Rotated copies at 0, step, 2 step .. up to `range`, then -step .. down to -range
  /// degrees, each centered on the origin. Near-equal copies are kept once.
  pub fn generate_variants(&mut self, range: f64, step: f64) {
    self.variants.clear();
    if range <= 0.0 || step <= 0.0 {
      let mut copy = self.geometry();
      copy.center_on_origin();
      self.variants.push(copy);
      return;
    }
    let positive = (0..).map(|i| i as f64 * step).take_while(|&a| a <= range);
    let negative = (1..).map(|i| -(i as f64) * step).take_while(|&a| a >= -range);
    for angle in positive.chain(negative) {
      let mut variant = self.rotated(angle, self.centroid);
      variant.center_on_origin();
      if !self.variants.iter().any(|v| v.approx_eq(&variant)) {
        self.variants.push(variant);
      }
    }
  }

  /// Same centroid and the same polylines in any order. Variants are ignored.
  pub fn approx_eq(&self, other: &Self) -> bool {
    if !points_approx_eq(self.centroid, other.centroid) || self.lines.len() != other.lines.len() {
      return false;
    }
    let mut unmatched: Vec<_> = other.lines.iter().collect();
    self.lines.iter().all(|line| {
      match unmatched.iter().position(|o| o.approx_eq(line)) {
        Some(i) => { unmatched.swap_remove(i); true }
        None => false
      }
    })
  }
}

impl BoundingBox<f64, CanvasSpace> for Shape {
  fn bounding_box(&self) -> Bounds {
    bounds_of(self.lines.iter().flat_map(|l| l.points().iter().copied()))
  }
}
