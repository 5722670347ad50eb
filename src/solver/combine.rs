//! Splicing of free-form lines whose endpoints meet across neighboring tiles.

use crate::geometry::{Point, Polyline, Shape};

/// Points of `l1` joined onto `l2` when a pair of their endpoints lies closer than
/// `tolerance`. Pairs are tried as start-start, start-end, end-end, end-start.
pub fn join(l1: &Polyline, l2: &Polyline, tolerance: f64) -> Option<Vec<Point>> {
  let (a, b) = (l1.points(), l2.points());
  let close = |p: Point, q: Point| p.distance_to(q) < tolerance;

  if close(l1.start(), l2.start()) {
    Some(a.iter().rev().chain(b).copied().collect())
  } else if close(l1.start(), l2.end()) {
    Some(b.iter().chain(a).copied().collect())
  } else if close(l1.end(), l2.end()) {
    Some(a.iter().chain(b.iter().rev()).copied().collect())
  } else if close(l1.end(), l2.start()) {
    Some(a.iter().chain(b).copied().collect())
  } else {
    None
  }
}

/// Splice `line` into the first matching free-form line of a neighbor tile.
fn splice_into_neighbors(
  lists: &mut [&mut Vec<Shape>],
  neighbors: &[usize],
  line: &Polyline,
  tolerance: f64
) -> bool {
  for &n in neighbors {
    for shape in lists[n].iter_mut() {
      let found = shape.lines().iter()
        .enumerate()
        .filter(|(_, other)| other.is_combinable())
        .find_map(|(i, other)| join(line, other, tolerance).map(|points| (i, points)));
      if let Some((i, points)) = found {
        shape.replace_points(i, points);
        return true;
      }
    }
  }
  false
}

/// Repeated passes over all tiles, splicing each free-form line onto a line of a
/// neighboring tile. Stops after a pass without splices, or after `iterations`
/// passes. Shapes left without lines are removed. Returns the number of splices.
pub fn combine_lines(
  lists: &mut [&mut Vec<Shape>],
  neighbors: &[Vec<usize>],
  tolerance: f64,
  iterations: usize
) -> usize {
  let mut total = 0;
  for pass in 1..=iterations {
    let mut spliced = 0;
    for tile in 0..lists.len() {
      for s in 0..lists[tile].len() {
        let lines = lists[tile][s].take_lines();
        let mut kept = Vec::with_capacity(lines.len());
        for line in lines {
          if line.is_combinable() && splice_into_neighbors(lists, &neighbors[tile], &line, tolerance) {
            spliced += 1;
          } else {
            kept.push(line);
          }
        }
        lists[tile][s].set_lines(kept);
      }
    }
    total += spliced;
    tracing::debug!(pass, spliced, "combine pass");
    if spliced == 0 {
      break;
    }
  }
  lists.iter_mut().for_each(|shapes| shapes.retain(|s| !s.is_empty()));
  total
}
