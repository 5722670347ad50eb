//! This is a library for approximating a grayscale darkness map with pen strokes.
//!
//! The canvas is split into rectangular tiles. Worker threads repeatedly pick an unfinished
//! tile, try every rotated variant of every template shape at its darkest cell, and keep the
//! stroke that lowers darkness in the tile's neighborhood the most. Every stroke segment that
//! crosses a cell removes a fixed amount of darkness from it, and crossing white cells is
//! penalized. A tile is done once its mean darkness drops below a threshold.
//!
//! After placement, the worst fraction of strokes may be removed and placed again, strokes
//! are clipped to the canvas, and free-form lines meeting across tiles are spliced together.
//!
//! # Basic usage
//! ```no_run
//! # use {
//! #   stroke_filling::{
//! #     config::Config,
//! #     error::Result,
//! #     geometry::{Circle, Point, Shape},
//! #     solver::Solver,
//! #   },
//! # };
//! # fn main() -> Result<()> {
//! // Row-major darkness values, 0 is white and 255 is black.
//! let (width, height) = (200, 100);
//! let darkness: Vec<u8> = (0..width * height).map(|i| (i % width * 255 / width) as u8).collect();
//!
//! let templates = vec![
//!   Shape::line(Point::new(0.0, 0.0), Point::new(6.0, 0.0)),
//!   Shape::from_circle(Circle::new(Point::origin(), 2.0)),
//! ];
//! // Canvas dimensions must be divisible by the tile size.
//! let config = Config::default()
//!   .with_tile_size(10, 10)
//!   .with_angle_deviation(90.0, 15.0);
//!
//! let mut solver = Solver::new(darkness, width, height, templates, config)?;
//! for shape in solver.run() {
//!   for line in shape.lines() {
//!     println!("{:?}", line.points());
//!   }
//! }
//! #   Ok(())
//! # }
//! ```
//!
//! # Threading
//! Placement workers run on scoped threads, one tile each at a time. A tile's shapes and
//! crossing counts sit behind a read-write lock, and a shape is committed while holding the
//! write locks of its whole neighborhood, taken in ascending tile order. Candidate scoring
//! and refinement scoring only read, and are spread over the rayon pool.
//!
//! With a single worker, the output is a pure function of the input and the seed.

pub mod error;
pub mod config;
pub mod geometry;
pub mod grid;
pub mod solver;

pub use {
  config::Config,
  error::{Error, Result},
  geometry::Shape,
  solver::Solver,
};
