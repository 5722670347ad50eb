//! Clipping of strokes to the canvas rectangle.

use crate::geometry::{Point, Polyline, Shape, points_approx_eq, segment_intersection};

/// Whether `point` lies within `[0, width] x [0, height]`, borders included.
pub fn canvas_contains(point: Point, width: f64, height: f64) -> bool {
  (0.0..=width).contains(&point.x) && (0.0..=height).contains(&point.y)
}

/// First crossing of `p1---p2` with the canvas border, testing the top, right,
/// bottom and left edges in that order.
pub fn border_intersection(p1: Point, p2: Point, width: f64, height: f64) -> Option<Point> {
  let corners = [
    Point::new(0.0, 0.0),
    Point::new(width, 0.0),
    Point::new(width, height),
    Point::new(0.0, height),
  ];
  (0..4).find_map(|i| segment_intersection(p1, p2, corners[i], corners[(i + 1) % 4]))
}

fn clamp(point: Point, width: f64, height: f64) -> Point {
  Point::new(point.x.clamp(0.0, width), point.y.clamp(0.0, height))
}

/// Cut a polyline down to the parts inside the canvas.
///
/// Circles and polygons are first re-sampled from their originals. Segments fully
/// outside are dropped, segments leaving the canvas end at the border (snapped onto
/// it against rounding), and consecutive segments sharing an endpoint are joined
/// again. The pieces are free-form lines.
pub fn cut_line_excess(line: &Polyline, width: f64, height: f64) -> Vec<Polyline> {
  let mut pieces: Vec<Vec<Point>> = vec![];
  for segment in line.fine_segments() {
    let (a, b) = (segment.start(), segment.end());
    let (a, b) = match (canvas_contains(a, width, height), canvas_contains(b, width, height)) {
      (false, false) => continue,
      (true, true) => (a, b),
      (false, true) => (clamp(border_intersection(a, b, width, height).unwrap_or(a), width, height), b),
      (true, false) => (a, clamp(border_intersection(a, b, width, height).unwrap_or(b), width, height)),
    };
    match pieces.last_mut() {
      Some(piece) if piece.last().map_or(false, |&end| points_approx_eq(end, a)) => piece.push(b),
      _ => pieces.push(vec![a, b])
    }
  }
  pieces.into_iter().map(Polyline::new).collect()
}

/// Replace every polyline reaching outside the canvas by its clipped pieces.
pub fn smooth_shape(shape: &mut Shape, width: f64, height: f64) {
  let outside = |line: &Polyline| line.points().iter().any(|&p| !canvas_contains(p, width, height));
  if !shape.lines().iter().any(outside) {
    return;
  }
  let lines = shape.lines().iter()
    .flat_map(|line| if outside(line) {
      cut_line_excess(line, width, height)
    } else {
      vec![line.clone()]
    })
    .collect();
  shape.set_lines(lines);
}
