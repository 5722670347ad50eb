//! Fills a radial gradient with short strokes and dots, and writes the result as SVG.
//!
//! `RUST_LOG=stroke_filling=debug cargo run --release --example gradient`

use {
  stroke_filling::{
    config::Config,
    geometry::{Circle, Point, Shape},
    solver::Solver,
  },
  anyhow::Result,
  std::{fmt::Write, time::Instant},
  tracing_subscriber::EnvFilter,
};

const WIDTH: u32 = 300;
const HEIGHT: u32 = 200;

/// Dark in the middle, fading out towards the corners.
fn radial_darkness(width: u32, height: u32) -> Vec<u8> {
  let center = Point::new(width as f64 / 2.0, height as f64 / 2.0);
  let max = center.distance_to(Point::origin());
  itertools::iproduct!(0..height, 0..width)
    .map(|(y, x)| {
      let d = Point::new(x as f64 + 0.5, y as f64 + 0.5).distance_to(center) / max;
      ((1.0 - d).clamp(0.0, 1.0) * 255.0) as u8
    })
    .collect()
}

fn to_svg(shapes: &[Shape]) -> Result<String> {
  let mut svg = String::new();
  writeln!(svg, r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {} {}">"#, WIDTH, HEIGHT)?;
  for line in shapes.iter().flat_map(|s| s.lines()) {
    let points = line.points().iter()
      .map(|p| format!("{:.2},{:.2}", p.x, p.y))
      .collect::<Vec<_>>()
      .join(" ");
    writeln!(svg, r#"  <polyline points="{}" fill="none" stroke="black" stroke-width="0.3"/>"#, points)?;
  }
  writeln!(svg, "</svg>")?;
  Ok(svg)
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env().add_directive("stroke_filling=info".parse()?))
    .init();

  let templates = vec![
    Shape::line(Point::new(0.0, 0.0), Point::new(8.0, 0.0)),
    Shape::line(Point::new(0.0, 0.0), Point::new(4.0, 0.0)),
    Shape::polyline(vec![Point::new(0.0, 0.0), Point::new(3.0, 2.0), Point::new(6.0, 0.0)]),
    Shape::from_circle(Circle::new(Point::origin(), 1.5)),
  ];
  let config = Config::default()
    .with_tile_size(10, 10)
    .with_angle_deviation(90.0, 15.0)
    .with_refinement(true, 2, 0.2);

  let t0 = Instant::now();
  let mut solver = Solver::new(radial_darkness(WIDTH, HEIGHT), WIDTH, HEIGHT, templates, config)?;
  let shapes = solver.run();
  let progress = solver.progress();
  tracing::info!(
    shapes = progress.shapes,
    lines = progress.lines,
    mean_darkness = progress.mean_darkness,
    elapsed = ?t0.elapsed(),
    "done"
  );

  let path = "gradient.svg";
  std::fs::write(path, to_svg(&shapes)?)?;
  println!("written {}", path);
  Ok(())
}
