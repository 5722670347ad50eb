//! Greedy placement of template strokes over a darkness grid, followed by
//! refinement and post-processing passes over the same tiles.
//!
//! The pipeline driven by [`Solver::run`]:
//! 1. place shapes until every tile is done or darkness stagnates;
//! 2. optionally, several times: drop the worst fraction of shapes and place again;
//! 3. drop shapes that contribute nothing;
//! 4. optionally clip strokes to the canvas;
//! 5. optionally splice free-form lines across neighboring tiles.

use {
  crate::{
    config::Config,
    error::{Error, Result},
    geometry::Shape,
    grid::{Grid, neighbor_range},
  },
  rand::SeedableRng,
  rand_pcg::Pcg64,
};

mod placement;
mod refine;
pub mod clip;
pub mod combine;
#[cfg(test)] mod tests;

pub use refine::ShapeScore;

/// Snapshot of the optimizer state.
#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
  pub shapes: usize,
  pub unfinished_tiles: usize,
  pub mean_darkness: f64,
  pub shapes_per_tile: Vec<usize>,
  pub lines: usize,
}

pub struct Solver {
  config: Config,
  grid: Grid,
  templates: Vec<Shape>,
  /// Seeds every worker of every placement run, so a single-worker run is reproducible.
  rng: Pcg64,
}

impl Solver {
  /// Set up a run over a row-major `width` x `height` darkness map.
  ///
  /// Templates are centered on the origin and expanded into their rotational variants;
  /// the neighbor range follows from the largest variant.
  pub fn new(darkness: Vec<u8>, width: u32, height: u32, mut templates: Vec<Shape>, config: Config) -> Result<Self> {
    config.validate()?;
    if templates.is_empty() {
      return Err(Error::NoTemplates);
    }
    for template in templates.iter_mut() {
      template.center_on_origin();
      template.generate_variants(config.angle_deviation_range, config.angle_deviation_step);
    }
    let range = neighbor_range(&templates, config.tile_width, config.tile_height);
    let grid = Grid::new(darkness, width, height, &config, range)?;
    tracing::debug!(?grid, variants = templates.iter().map(|t| t.variants().len()).sum::<usize>(), "solver ready");

    Ok(Self {
      rng: Pcg64::seed_from_u64(config.seed),
      config,
      grid,
      templates,
    })
  }

  pub fn config(&self) -> &Config {
    &self.config
  }

  pub fn grid(&self) -> &Grid {
    &self.grid
  }

  pub fn templates(&self) -> &[Shape] {
    &self.templates
  }

  /// Full pipeline, returns the placed shapes in output order.
  pub fn run(&mut self) -> Vec<Shape> {
    let placed = self.place();
    tracing::info!(placed, "placement finished");

    if self.config.refinement {
      for iteration in 0..self.config.refinement_iterations {
        let _span = tracing::info_span!("refinement", iteration).entered();
        let removed = self.prune_worst();
        let placed = self.place();
        tracing::info!(removed, placed, "refinement finished");
      }
    }

    let removed = self.prune_worthless();
    tracing::info!(removed, "worthless shapes removed");

    if self.config.smooth_edges {
      self.smooth_edges();
    }
    if self.config.combine_shapes {
      self.combine_lines();
    }
    self.shapes()
  }

  /// Placed shapes, in tile order, or reversed tile order if so configured.
  pub fn shapes(&self) -> Vec<Shape> {
    self.grid.shapes(self.config.reverse_shape_order)
  }

  pub fn progress(&self) -> Progress {
    Progress {
      shapes: self.grid.shape_count(),
      unfinished_tiles: self.grid.unfinished_tiles(),
      mean_darkness: self.grid.mean_darkness(),
      shapes_per_tile: self.grid.shape_counts(),
      lines: self.grid.line_count(),
    }
  }

  /// Clip every stroke to the canvas. Shapes lying fully outside are dropped.
  pub fn smooth_edges(&mut self) {
    let _span = tracing::info_span!("smoothing").entered();
    let (width, height) = (self.grid.width as f64, self.grid.height as f64);
    for shapes in self.grid.shape_lists_mut() {
      shapes.iter_mut().for_each(|shape| clip::smooth_shape(shape, width, height));
      shapes.retain(|shape| !shape.is_empty());
    }
    tracing::info!(lines = self.grid.line_count(), "edges smoothed");
  }

  /// Splice free-form lines across neighboring tiles.
  pub fn combine_lines(&mut self) {
    let _span = tracing::info_span!("combining").entered();
    let before = self.grid.line_count();
    let neighbors = self.grid.neighbor_lists();
    let (tolerance, iterations) = (self.config.combine_tolerance, self.config.combine_iterations);
    let mut lists = self.grid.shape_lists_mut();
    let spliced = combine::combine_lines(&mut lists, &neighbors, tolerance, iterations);
    tracing::info!(before, after = self.grid.line_count(), spliced, "lines combined");
  }
}
