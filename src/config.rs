//! Optimizer settings.

use {
  crate::error::{Result, ensure_config},
  std::time::Duration
};

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
  /// Tile size in darkness cells. The canvas must be an exact multiple of it.
  pub tile_width: u32,
  pub tile_height: u32,
  /// A tile is done once its mean adjusted darkness drops to this value.
  pub darkness_threshold: f64,
  /// Darkness removed from a cell by every stroke segment crossing it.
  pub darkness_factor: f64,
  /// Cells with raw darkness at or below this value are considered white.
  pub white_punishment_boundary: u8,
  /// Penalty for every crossing of a white cell.
  pub white_punishment_value: f64,
  pub seed: u64,
  pub workers: usize,
  /// Try every cell midpoint of a tile instead of just the darkest one.
  pub high_precision: bool,
  pub refinement: bool,
  pub refinement_iterations: usize,
  /// Fraction of all placed shapes removed per refinement iteration.
  pub refinement_percentage: f64,
  pub smooth_edges: bool,
  pub combine_shapes: bool,
  pub combine_tolerance: f64,
  pub combine_iterations: usize,
  /// Placement stops once global darkness has not changed for this long.
  pub stagnation_timeout: Duration,
  pub monitor_interval: Duration,
  /// Template rotations, in degrees.
  pub angle_deviation_range: f64,
  pub angle_deviation_step: f64,
  pub reverse_shape_order: bool,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      tile_width: 5,
      tile_height: 5,
      darkness_threshold: 18.0,
      darkness_factor: 40.0,
      white_punishment_boundary: 5,
      white_punishment_value: 0.85,
      seed: 1701,
      workers: 5,
      high_precision: false,
      refinement: true,
      refinement_iterations: 1,
      refinement_percentage: 0.2,
      smooth_edges: true,
      combine_shapes: true,
      combine_tolerance: 0.5,
      combine_iterations: 5,
      stagnation_timeout: Duration::from_secs(30),
      monitor_interval: Duration::from_secs(2),
      angle_deviation_range: 180.0,
      angle_deviation_step: 10.0,
      reverse_shape_order: false,
    }
  }
}

impl Config {
  pub fn with_tile_size(mut self, width: u32, height: u32) -> Self {
    self.tile_width = width;
    self.tile_height = height;
    self
  }

  pub fn with_darkness(mut self, threshold: f64, factor: f64) -> Self {
    self.darkness_threshold = threshold;
    self.darkness_factor = factor;
    self
  }

  pub fn with_white_punishment(mut self, boundary: u8, value: f64) -> Self {
    self.white_punishment_boundary = boundary;
    self.white_punishment_value = value;
    self
  }

  pub fn with_seed(mut self, seed: u64) -> Self {
    self.seed = seed;
    self
  }

  pub fn with_workers(mut self, workers: usize) -> Self {
    self.workers = workers;
    self
  }

  pub fn with_high_precision(mut self, enabled: bool) -> Self {
    self.high_precision = enabled;
    self
  }

  pub fn with_refinement(mut self, enabled: bool, iterations: usize, percentage: f64) -> Self {
    self.refinement = enabled;
    self.refinement_iterations = iterations;
    self.refinement_percentage = percentage;
    self
  }

  pub fn with_smooth_edges(mut self, enabled: bool) -> Self {
    self.smooth_edges = enabled;
    self
  }

  pub fn with_combine_shapes(mut self, enabled: bool, tolerance: f64, iterations: usize) -> Self {
    self.combine_shapes = enabled;
    self.combine_tolerance = tolerance;
    self.combine_iterations = iterations;
    self
  }

  pub fn with_stagnation_timeout(mut self, timeout: Duration) -> Self {
    self.stagnation_timeout = timeout;
    self
  }

  pub fn with_monitor_interval(mut self, interval: Duration) -> Self {
    self.monitor_interval = interval;
    self
  }

  pub fn with_angle_deviation(mut self, range: f64, step: f64) -> Self {
    self.angle_deviation_range = range;
    self.angle_deviation_step = step;
    self
  }

  pub fn with_reverse_shape_order(mut self, enabled: bool) -> Self {
    self.reverse_shape_order = enabled;
    self
  }

  /// Reject settings the optimizer cannot work with.
  pub fn validate(&self) -> Result<()> {
    ensure_config!(self.tile_width > 0 && self.tile_height > 0,
      "tile size must be positive, got {}x{}", self.tile_width, self.tile_height);
    ensure_config!(self.darkness_threshold >= 0.0,
      "darkness threshold must not be negative, got {}", self.darkness_threshold);
    ensure_config!(self.darkness_factor > 0.0,
      "darkness factor must be positive, got {}", self.darkness_factor);
    ensure_config!(self.workers >= 1, "at least one worker is required");
    ensure_config!(self.refinement_iterations > 0, "refinement iterations must be positive");
    ensure_config!(self.refinement_percentage > 0.0 && self.refinement_percentage <= 1.0,
      "refinement percentage must be in (0, 1], got {}", self.refinement_percentage);
    ensure_config!(self.combine_tolerance > 0.0,
      "combine tolerance must be positive, got {}", self.combine_tolerance);
    ensure_config!(self.combine_iterations > 0, "combine iterations must be positive");
    ensure_config!(!self.stagnation_timeout.is_zero(), "stagnation timeout must be positive");
    ensure_config!(!self.monitor_interval.is_zero(), "monitor interval must be positive");
    ensure_config!(self.angle_deviation_range >= 0.0,
      "angle deviation range must not be negative, got {}", self.angle_deviation_range);
    ensure_config!(self.angle_deviation_step > 0.0,
      "angle deviation step must be positive, got {}", self.angle_deviation_step);
    Ok(())
  }
}
