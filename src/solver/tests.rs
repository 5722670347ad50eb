use {
  super::{*, placement::RunContext},
  crate::geometry::{BoundingBox, Circle, EPSILON, Point, Polyline, points_approx_eq},
  anyhow::{Context, Result},
  rand::SeedableRng,
  rand_pcg::Pcg64,
  std::time::Duration,
};

fn p(x: f64, y: f64) -> Point {
  Point::new(x, y)
}

fn config() -> Config {
  Config::default()
    .with_monitor_interval(Duration::from_millis(10))
    .with_stagnation_timeout(Duration::from_secs(5))
}

fn gradient(width: u32, height: u32) -> Vec<u8> {
  itertools::iproduct!(0..height, 0..width)
    .map(|(_, x)| (x * 255 / width) as u8)
    .collect()
}

fn line_templates() -> Vec<Shape> {
  vec![
    Shape::line(p(0.0, 0.0), p(4.0, 0.0)),
    Shape::line(p(0.0, 0.0), p(2.0, 0.0)),
  ]
}

#[test] fn setup_errors() {
  let templates = line_templates();
  assert!(matches!(
    Solver::new(vec![0; 100], 10, 10, vec![], config()),
    Err(Error::NoTemplates)
  ));
  assert!(matches!(
    Solver::new(vec![0; 100], 10, 10, templates.clone(), config().with_workers(0)),
    Err(Error::InvalidConfig(_))
  ));
  assert!(matches!(
    Solver::new(vec![0; 120], 12, 10, templates, config()),
    Err(Error::GridSize { .. })
  ));
}

#[test] fn templates_are_prepared() -> Result<()> {
  let config = config().with_angle_deviation(90.0, 45.0);
  let solver = Solver::new(vec![0; 100], 10, 10, vec![Shape::line(p(3.0, 3.0), p(7.0, 3.0))], config)?;
  let template = &solver.templates()[0];
  assert_eq!(template.centroid(), Point::origin());
  assert_eq!(template.variants().len(), 4);
  // half of the 4 unit long line reaches into the next tile
  assert_eq!(solver.grid().neighbor_range(), 1);
  Ok(())
}

#[test] fn white_canvas_places_nothing() -> Result<()> {
  let mut solver = Solver::new(vec![0; 100], 10, 10, line_templates(), config())?;
  assert_eq!(solver.grid().unfinished_tiles(), 0);
  assert!(solver.run().is_empty());
  assert_eq!(solver.progress().shapes, 0);
  Ok(())
}

#[test] fn single_tile_single_line() -> Result<()> {
  let config = config()
    .with_tile_size(4, 4)
    .with_darkness(18.0, 40.0)
    .with_angle_deviation(0.0, 10.0)
    .with_workers(1);
  let mut solver = Solver::new(vec![20; 16], 4, 4, vec![Shape::line(p(0.0, 0.0), p(0.0, 4.0))], config)?;
  assert_eq!(solver.place(), 1);

  let progress = solver.progress();
  assert_eq!(progress.shapes, 1);
  assert_eq!(progress.unfinished_tiles, 0);
  assert!(progress.mean_darkness <= 18.0);
  // centered on the first darkest cell
  assert_eq!(solver.shapes()[0].centroid(), p(0.5, 0.5));
  Ok(())
}

#[test] fn full_pipeline_keeps_strokes_on_canvas() -> Result<()> {
  let (width, height) = (20, 20);
  let mut templates = line_templates();
  templates.push(Shape::from_circle(Circle::new(p(0.0, 0.0), 1.5)));
  let config = config()
    .with_angle_deviation(90.0, 30.0)
    .with_workers(3);
  let mut solver = Solver::new(gradient(width, height), width, height, templates, config)?;
  let shapes = solver.run();
  assert!(!shapes.is_empty());
  assert_eq!(shapes.len(), solver.progress().shapes);
  for point in shapes.iter().flat_map(|s| s.lines()).flat_map(|l| l.points()) {
    assert!(
      (-EPSILON..=width as f64 + EPSILON).contains(&point.x) &&
        (-EPSILON..=height as f64 + EPSILON).contains(&point.y),
      "{:?} is off canvas", point
    );
  }
  assert!(shapes.iter().all(|s| !s.is_empty()));
  Ok(())
}

#[test] fn single_worker_is_deterministic() -> Result<()> {
  let run = || -> Result<Vec<Shape>> {
    let config = config()
      .with_angle_deviation(90.0, 30.0)
      .with_workers(1)
      .with_seed(42);
    Ok(Solver::new(gradient(20, 20), 20, 20, line_templates(), config)?.run())
  };
  let first = run()?;
  assert!(!first.is_empty());
  assert_eq!(first, run()?);
  Ok(())
}

#[test] fn high_precision_placement() -> Result<()> {
  let config = config()
    .with_high_precision(true)
    .with_angle_deviation(0.0, 10.0)
    .with_workers(2);
  let mut solver = Solver::new(gradient(10, 10), 10, 10, line_templates(), config)?;
  assert!(solver.place() > 0);
  assert_eq!(solver.progress().unfinished_tiles, 0);
  Ok(())
}

#[test] fn stagnation_stops_placement() -> Result<()> {
  // too small to ever cross a cell border
  let speck = Shape::from_circle(Circle::new(p(0.0, 0.0), 0.1));
  let config = config()
    .with_stagnation_timeout(Duration::from_millis(100))
    .with_workers(2);
  let mut solver = Solver::new(vec![255; 100], 10, 10, vec![speck], config)?;
  assert_eq!(solver.place(), 0);
  assert_eq!(solver.progress().unfinished_tiles, 4);
  Ok(())
}

#[test] fn stuck_tiles_are_reported_once() -> Result<()> {
  let speck = Shape::from_circle(Circle::new(p(0.0, 0.0), 0.1));
  let config = config()
    .with_stagnation_timeout(Duration::from_millis(200))
    .with_workers(2);
  let mut solver = Solver::new(vec![255; 100], 10, 10, vec![speck], config)?;
  let context = RunContext::new();
  assert_eq!(solver.place_with(&context), 0);
  assert!(context.stopped());

  let stuck = context.stuck_tiles();
  assert!(!stuck.is_empty());
  assert!(stuck.iter().all(|&tile| tile < 4));
  // repeats are not reported again
  assert!(stuck.iter().all(|&tile| !context.mark_stuck(tile)));
  assert_eq!(context.stuck_tiles(), stuck);
  Ok(())
}

#[test] fn claim_scans_forward_then_backward() -> Result<()> {
  // four tiles in a row, the last one white and therefore done
  let darkness = itertools::iproduct!(0..5, 0..20)
    .map(|(_, x)| if x < 15 { 200 } else { 0 })
    .collect();
  let solver = Solver::new(darkness, 20, 5, line_templates(), config())?;
  assert!(solver.grid().is_done(3));

  let (first, _first) = solver.claim_from(1).context("tile 1 is free")?;
  assert_eq!(first, 1);
  let (second, second_guard) = solver.claim_from(1).context("tile 2 is free")?;
  assert_eq!(second, 2);
  // tile 3 is done, so the scan turns back below the start
  let (third, _third) = solver.claim_from(1).context("tile 0 is free")?;
  assert_eq!(third, 0);
  assert!(solver.claim_from(1).is_none());
  assert!(solver.claim_from(3).is_none());

  drop(second_guard);
  let (reclaimed, _reclaimed) = solver.claim_from(3).context("tile 2 is free again")?;
  assert_eq!(reclaimed, 2);
  Ok(())
}

#[test] fn ties_are_broken_by_seed() -> Result<()> {
  // on a uniform tile the horizontal and the vertical variant score the same
  let config = config()
    .with_tile_size(4, 4)
    .with_angle_deviation(90.0, 90.0);
  let solver = Solver::new(vec![100; 16], 4, 4, vec![Shape::line(p(0.0, 0.0), p(2.0, 0.0))], config)?;
  let horizontal = |seed: u64| -> Result<bool> {
    let candidate = solver.best_candidate(0, &mut Pcg64::seed_from_u64(seed)).context("no candidate")?;
    let size = candidate.shape.bounding_box().size();
    Ok(size.width > size.height)
  };

  let picks = (0..32).map(horizontal).collect::<Result<Vec<_>>>()?;
  assert!(picks.contains(&true));
  assert!(picks.contains(&false));
  for (seed, &pick) in (0..32).zip(&picks) {
    assert_eq!(horizontal(seed)?, pick);
  }
  Ok(())
}

#[test] fn prune_worst_fraction() -> Result<()> {
  let config = config()
    .with_angle_deviation(90.0, 30.0)
    .with_refinement(true, 1, 0.5);
  let mut solver = Solver::new(gradient(20, 20), 20, 20, line_templates(), config)?;
  let placed = solver.place();
  assert_eq!(solver.progress().shapes, placed);

  let scores = solver.score_shapes();
  assert_eq!(scores.len(), placed);
  let removed = solver.prune_worst();
  assert_eq!(removed, placed / 2);
  assert_eq!(solver.progress().shapes, placed - placed / 2);

  // backfill
  solver.place();
  assert_eq!(solver.progress().unfinished_tiles, 0);
  Ok(())
}

#[test] fn prune_worthless_shapes() -> Result<()> {
  let mut darkness = vec![0; 100];
  darkness[0] = 200;
  let mut solver = Solver::new(darkness, 10, 10, line_templates(), config())?;
  let grid = solver.grid();
  for shape in [Shape::line(p(0.5, 0.0), p(0.5, 1.0)), Shape::line(p(3.5, 3.0), p(3.5, 4.0))] {
    let coverage = grid.coverage(0, &shape);
    grid.commit(0, shape, &coverage);
  }
  let scores = solver.score_shapes();
  assert_eq!(scores.iter().filter(|s| s.score == 0.0).count(), 1);
  assert_eq!(solver.prune_worthless(), 1);
  assert_eq!(solver.shapes()[0].centroid(), p(0.5, 0.5));

  // stale indices are skipped
  let stale = ShapeScore { tile: 0, shape: 5, score: 0.0 };
  assert_eq!(solver.remove_scored(vec![stale]), 0);
  Ok(())
}

#[test] fn reversed_output_order() -> Result<()> {
  let config = config().with_reverse_shape_order(true);
  let solver = Solver::new(vec![100; 50], 10, 5, line_templates(), config)?;
  let grid = solver.grid();
  for (tile, x) in [(0, 1.0), (1, 6.0)] {
    let shape = Shape::line(p(x, 1.0), p(x, 2.0));
    let coverage = grid.coverage(tile, &shape);
    grid.commit(tile, shape, &coverage);
  }
  let order: Vec<_> = solver.shapes().iter().map(|s| s.centroid().x).collect();
  assert_eq!(order, vec![6.0, 1.0]);
  Ok(())
}

mod smoothing {
  use {super::*, crate::solver::clip::*};

  #[test] fn segment_leaving_the_canvas() {
    let line = Polyline::new(vec![p(5.0, 5.0), p(5.0, -5.0)]);
    let pieces = cut_line_excess(&line, 10.0, 10.0);
    assert_eq!(pieces.len(), 1);
    assert_eq!(pieces[0].points(), &[p(5.0, 5.0), p(5.0, 0.0)]);
    assert!(pieces[0].is_combinable());
  }

  #[test] fn border_edges_in_order() {
    // crosses the top edge first
    assert_eq!(border_intersection(p(-1.0, -1.0), p(1.0, 1.0), 10.0, 10.0), Some(p(0.0, 0.0)));
    assert_eq!(border_intersection(p(5.0, 5.0), p(15.0, 5.0), 10.0, 10.0), Some(p(10.0, 5.0)));
    assert_eq!(border_intersection(p(5.0, 5.0), p(5.0, 15.0), 10.0, 10.0), Some(p(5.0, 10.0)));
    assert_eq!(border_intersection(p(5.0, 5.0), p(-5.0, 5.0), 10.0, 10.0), Some(p(0.0, 5.0)));
    assert_eq!(border_intersection(p(2.0, 2.0), p(3.0, 3.0), 10.0, 10.0), None);
  }

  #[test] fn segments_fully_outside_are_dropped() {
    let line = Polyline::new(vec![p(-5.0, -5.0), p(-1.0, -1.0), p(2.0, 2.0), p(4.0, 2.0)]);
    let pieces = cut_line_excess(&line, 10.0, 10.0);
    assert_eq!(pieces.len(), 1);
    let expected = [p(0.0, 0.0), p(2.0, 2.0), p(4.0, 2.0)];
    assert_eq!(pieces[0].points().len(), expected.len());
    assert!(pieces[0].points().iter().zip(expected).all(|(&a, b)| points_approx_eq(a, b)));
  }

  #[test] fn circle_is_resampled() {
    let mut shape = Shape::from_circle(Circle::new(p(0.0, 5.0), 2.0));
    smooth_shape(&mut shape, 10.0, 10.0);
    let points: Vec<_> = shape.lines().iter().flat_map(|l| l.points()).collect();
    // half of the fine outline survives
    assert!(points.len() > FINE_HALF);
    assert!(points.iter().all(|q| canvas_contains(**q, 10.0, 10.0)));
    assert!(shape.lines().iter().all(|l| l.is_combinable()));
  }

  const FINE_HALF: usize = crate::geometry::FINE_CIRCLE_EDGES / 2;

  #[test] fn inside_lines_are_untouched() {
    let original = Shape::from_circle(Circle::new(p(5.0, 5.0), 2.0));
    let mut shape = original.clone();
    smooth_shape(&mut shape, 10.0, 10.0);
    assert_eq!(shape, original);
  }
}

mod combining {
  use {super::*, crate::solver::combine::*};

  fn line(a: Point, b: Point) -> Polyline {
    Polyline::new(vec![a, b])
  }

  #[test] fn endpoint_pairings() {
    let l1 = line(p(0.0, 0.0), p(1.0, 0.0));
    let joined = |l2: Polyline| join(&l1, &l2, 0.5);
    assert_eq!(joined(line(p(0.1, 0.0), p(0.0, 5.0))), Some(vec![p(1.0, 0.0), p(0.0, 0.0), p(0.1, 0.0), p(0.0, 5.0)]));
    assert_eq!(joined(line(p(0.0, 5.0), p(0.1, 0.0))), Some(vec![p(0.0, 5.0), p(0.1, 0.0), p(0.0, 0.0), p(1.0, 0.0)]));
    assert_eq!(joined(line(p(5.0, 5.0), p(1.1, 0.0))), Some(vec![p(0.0, 0.0), p(1.0, 0.0), p(1.1, 0.0), p(5.0, 5.0)]));
    assert_eq!(joined(line(p(1.1, 0.0), p(5.0, 5.0))), Some(vec![p(0.0, 0.0), p(1.0, 0.0), p(1.1, 0.0), p(5.0, 5.0)]));
    assert_eq!(joined(line(p(3.0, 3.0), p(5.0, 5.0))), None);
  }

  #[test] fn abutting_tiles_merge() {
    let mut left = vec![Shape::line(p(1.0, 2.0), p(4.8, 2.0))];
    let mut right = vec![Shape::line(p(5.0, 2.0), p(8.0, 2.0))];
    let neighbors = vec![vec![1], vec![0]];
    {
      let mut lists = [&mut left, &mut right];
      assert_eq!(combine_lines(&mut lists, &neighbors, 0.5, 5), 1);
      // fixed point reached, another run changes nothing
      assert_eq!(combine_lines(&mut lists, &neighbors, 0.5, 5), 0);
    }
    assert!(left.is_empty());
    assert_eq!(right.len(), 1);
    assert_eq!(right[0].lines().len(), 1);
    assert_eq!(right[0].lines()[0].points(), &[p(1.0, 2.0), p(4.8, 2.0), p(5.0, 2.0), p(8.0, 2.0)]);
    assert_eq!(right[0].centroid(), p(4.5, 2.0));
  }

  #[test] fn outlines_are_not_merged() {
    let mut left = vec![Shape::from_circle(Circle::new(p(2.0, 2.0), 1.0))];
    let mut right = vec![Shape::line(p(2.0, 1.0), p(8.0, 1.0))];
    let neighbors = vec![vec![1], vec![0]];
    let mut lists = [&mut left, &mut right];
    assert_eq!(combine_lines(&mut lists, &neighbors, 0.5, 5), 0);
    assert_eq!(lists[0].len(), 1);
    assert_eq!(lists[1].len(), 1);
  }

  #[test] fn lines_in_the_same_tile_stay_apart() {
    let mut only = vec![
      Shape::line(p(0.0, 0.0), p(1.0, 0.0)),
      Shape::line(p(1.0, 0.0), p(2.0, 0.0)),
    ];
    let mut lists = [&mut only];
    assert_eq!(combine_lines(&mut lists, &[vec![]], 0.5, 5), 0);
    assert_eq!(only.len(), 2);
  }
}

// profile: 200x200 gradient, 5 workers, default settings
#[test] #[ignore] fn gradient_profile() -> Result<()> {
  let (width, height) = (200, 200);
  let mut templates = line_templates();
  templates.push(Shape::from_circle(Circle::new(p(0.0, 0.0), 2.0)));
  let mut solver = Solver::new(gradient(width, height), width, height, templates, Config::default())?;

  let t0 = std::time::Instant::now();
  let shapes = solver.run();
  println!("{} shapes, {:?}", shapes.len(), solver.grid());
  println!("profile: {}ms", t0.elapsed().as_millis());
  Ok(())
}
