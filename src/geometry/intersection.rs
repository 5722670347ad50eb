//! Segment and polyline intersection primitives.
//!
//! All functions are pure. "No intersection" is reported as `None` / `false`.

use {
  super::approx_eq,
  euclid::Point2D,
  num_traits::Float
};

/// Whether `p` lies on the segment `a---b`: the distances to both endpoints add up to
/// the segment length, within [`EPSILON`](super::EPSILON).
pub fn point_on_segment<T: Float, U>(a: Point2D<T, U>, b: Point2D<T, U>, p: Point2D<T, U>) -> bool {
  approx_eq(a.distance_to(p) + b.distance_to(p), a.distance_to(b))
}

fn counter_clockwise<T: Float, U>(a: Point2D<T, U>, b: Point2D<T, U>, c: Point2D<T, U>) -> bool {
  (c.y - a.y) * (b.x - a.x) > (b.y - a.y) * (c.x - a.x)
}

/// Whether the segments `p1---p2` and `p3---p4` touch or cross.
pub fn segments_intersect<T: Float, U>(
  p1: Point2D<T, U>,
  p2: Point2D<T, U>,
  p3: Point2D<T, U>,
  p4: Point2D<T, U>
) -> bool {
  if point_on_segment(p1, p2, p3) || point_on_segment(p1, p2, p4) {
    return true;
  }
  counter_clockwise(p1, p3, p4) != counter_clockwise(p2, p3, p4) &&
    counter_clockwise(p1, p2, p3) != counter_clockwise(p1, p2, p4)
}

/// The point where `p1---p2` crosses `p3---p4`, from the parametric line equations.
///
/// `None` when the segments are parallel, or the crossing lies outside `[0, 1]`
/// on either segment.
pub fn segment_intersection<T: Float, U>(
  p1: Point2D<T, U>,
  p2: Point2D<T, U>,
  p3: Point2D<T, U>,
  p4: Point2D<T, U>
) -> Option<Point2D<T, U>> {
  let denom = (p4.y - p3.y) * (p2.x - p1.x) - (p4.x - p3.x) * (p2.y - p1.y);
  if denom == T::zero() {
    return None;
  }
  let unit = T::zero()..=T::one();
  let ua = ((p4.x - p3.x) * (p1.y - p3.y) - (p4.y - p3.y) * (p1.x - p3.x)) / denom;
  if !unit.contains(&ua) {
    return None;
  }
  let ub = ((p2.x - p1.x) * (p1.y - p3.y) - (p2.y - p1.y) * (p1.x - p3.x)) / denom;
  if !unit.contains(&ub) {
    return None;
  }
  Some(Point2D::new(p1.x + ua * (p2.x - p1.x), p1.y + ua * (p2.y - p1.y)))
}

/// Whether any segment of `a` touches any segment of `b`.
pub fn polylines_intersect<T: Float, U>(a: &[Point2D<T, U>], b: &[Point2D<T, U>]) -> bool {
  a.windows(2).any(|s| polyline_hits_segment(b, s[0], s[1]))
}

/// Whether any segment of `line` touches `p1---p2`.
pub fn polyline_hits_segment<T: Float, U>(
  line: &[Point2D<T, U>],
  p1: Point2D<T, U>,
  p2: Point2D<T, U>
) -> bool {
  line.windows(2).any(|s| segments_intersect(s[0], s[1], p1, p2))
}

/// How many segments of `a` touch `b`. This is the ink model: a stroke darkens a cell
/// once for every one of its segments crossing the cell border.
pub fn count_intersections<T: Float, U>(a: &[Point2D<T, U>], b: &[Point2D<T, U>]) -> usize {
  a.windows(2)
    .filter(|s| polyline_hits_segment(b, s[0], s[1]))
    .count()
}
